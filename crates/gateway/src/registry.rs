//! Verbindungsregister – Welche Verbindung gehoert wem, in welchem Raum
//!
//! Das Register haelt zwei Indizes, die immer gemeinsam geaendert werden:
//!
//! ```text
//! verbindungen: ConnectionId -> Eintrag { user, sender, bindung }
//! raeume:       RoomId       -> { ConnectionId, ... }
//! ```
//!
//! Jede Verbindung mit `bindung = Some(raum)` steht genau in der Menge
//! von `raum`, und jede Menge enthaelt nur registrierte Verbindungen.
//! Leere Mengen werden entfernt. Alle Methoden sind synchron; das Register
//! liegt in einem `RefCell` und wird nie ueber ein `.await` ausgeliehen.

use std::collections::{HashMap, HashSet};

use raumchat_core::{ConnectionId, RoomId, UserId};
use raumchat_db::models::RaumRecord;
use raumchat_protocol::{BenutzerInfo, ControlMessage};
use tokio::sync::mpsc;

use crate::error::{GatewayError, GatewayResult};

// ---------------------------------------------------------------------------
// Eintrag
// ---------------------------------------------------------------------------

/// Eine authentifizierte Live-Verbindung
#[derive(Debug, Clone)]
pub struct Eintrag {
    pub user: BenutzerInfo,
    /// Ausgehende Queue der Verbindung
    pub sender: mpsc::Sender<ControlMessage>,
    /// Aktueller Raum (None bis zum ersten `join_room`)
    pub bindung: Option<RaumRecord>,
}

// ---------------------------------------------------------------------------
// ConnectionRegistry
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    verbindungen: HashMap<ConnectionId, Eintrag>,
    raeume: HashMap<RoomId, HashSet<ConnectionId>>,
}

impl ConnectionRegistry {
    pub fn neu() -> Self {
        Self::default()
    }

    /// Registriert eine frisch authentifizierte Verbindung (ungebunden)
    pub fn registrieren(
        &mut self,
        conn: ConnectionId,
        user: BenutzerInfo,
        sender: mpsc::Sender<ControlMessage>,
    ) {
        // Doppelte Registrierung ersetzt den alten Eintrag samt Bindung
        self.entfernen(conn);
        tracing::debug!(verbindung = %conn, user_id = %user.id, "Verbindung registriert");
        self.verbindungen.insert(
            conn,
            Eintrag {
                user,
                sender,
                bindung: None,
            },
        );
    }

    /// Bindet die Verbindung an einen Raum und gibt die vorherige Bindung zurueck
    pub fn binden(
        &mut self,
        conn: ConnectionId,
        raum: RaumRecord,
    ) -> GatewayResult<Option<RaumRecord>> {
        let eintrag = self
            .verbindungen
            .get_mut(&conn)
            .ok_or(GatewayError::VerbindungGetrennt(conn))?;

        let neu_id = RoomId::from(raum.id);
        let vorher = eintrag.bindung.replace(raum);

        if let Some(ref alt) = vorher {
            let alt_id = RoomId::from(alt.id);
            if alt_id != neu_id {
                Self::aus_raum_loesen(&mut self.raeume, alt_id, conn);
            }
        }
        self.raeume.entry(neu_id).or_default().insert(conn);

        Ok(vorher)
    }

    /// Setzt die Bindung auf `vorher` zurueck, `None` loest die Verbindung
    ///
    /// Fuer abgebrochene Beitritte. Unbekannte Verbindungen bleiben unbekannt.
    pub fn bindung_zuruecksetzen(&mut self, conn: ConnectionId, vorher: Option<RaumRecord>) {
        let Some(eintrag) = self.verbindungen.get_mut(&conn) else {
            return;
        };

        if let Some(aktuell) = eintrag.bindung.take() {
            Self::aus_raum_loesen(&mut self.raeume, RoomId::from(aktuell.id), conn);
        }
        if let Some(raum) = vorher {
            self.raeume.entry(RoomId::from(raum.id)).or_default().insert(conn);
            eintrag.bindung = Some(raum);
        }
    }

    /// Entfernt die Verbindung aus beiden Indizes
    ///
    /// Idempotent: ein zweiter Aufruf gibt `None` zurueck.
    pub fn entfernen(&mut self, conn: ConnectionId) -> Option<Eintrag> {
        let eintrag = self.verbindungen.remove(&conn)?;
        if let Some(ref raum) = eintrag.bindung {
            Self::aus_raum_loesen(&mut self.raeume, RoomId::from(raum.id), conn);
        }
        tracing::debug!(verbindung = %conn, user_id = %eintrag.user.id, "Verbindung entfernt");
        Some(eintrag)
    }

    fn aus_raum_loesen(
        raeume: &mut HashMap<RoomId, HashSet<ConnectionId>>,
        raum: RoomId,
        conn: ConnectionId,
    ) {
        if let Some(menge) = raeume.get_mut(&raum) {
            menge.remove(&conn);
            if menge.is_empty() {
                raeume.remove(&raum);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Abfragen
    // -----------------------------------------------------------------------

    pub fn eintrag(&self, conn: ConnectionId) -> Option<&Eintrag> {
        self.verbindungen.get(&conn)
    }

    pub fn bindung(&self, conn: ConnectionId) -> Option<RaumRecord> {
        self.verbindungen.get(&conn)?.bindung.clone()
    }

    /// Hat der Benutzer (noch) irgendeine registrierte Verbindung?
    pub fn hat_verbindung(&self, user_id: UserId) -> bool {
        self.verbindungen.values().any(|e| e.user.id == user_id)
    }

    /// Benutzer mit mindestens einer Verbindung im Raum, ohne Duplikate
    pub fn online_benutzer(&self, raum: RoomId) -> Vec<BenutzerInfo> {
        let Some(menge) = self.raeume.get(&raum) else {
            return Vec::new();
        };

        let mut gesehen = HashSet::new();
        let mut benutzer: Vec<BenutzerInfo> = menge
            .iter()
            .filter_map(|conn| self.verbindungen.get(conn))
            .filter(|e| gesehen.insert(e.user.id))
            .map(|e| e.user.clone())
            .collect();
        benutzer.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        benutzer
    }

    pub fn verbindungen_im_raum(&self, raum: RoomId) -> usize {
        self.raeume.get(&raum).map_or(0, HashSet::len)
    }

    pub fn anzahl_verbindungen(&self) -> usize {
        self.verbindungen.len()
    }

    // -----------------------------------------------------------------------
    // Fan-out
    // -----------------------------------------------------------------------

    /// Sendet an alle Verbindungen im Raum
    pub fn an_raum_senden(&self, raum: RoomId, nachricht: ControlMessage) -> usize {
        self.verteilen(raum, None, nachricht)
    }

    /// Sendet an alle Verbindungen im Raum ausser `ausser`
    pub fn an_raum_ausser_senden(
        &self,
        raum: RoomId,
        ausser: ConnectionId,
        nachricht: ControlMessage,
    ) -> usize {
        self.verteilen(raum, Some(ausser), nachricht)
    }

    /// Gibt die Anzahl erfolgreich eingereihter Nachrichten zurueck
    fn verteilen(
        &self,
        raum: RoomId,
        ausser: Option<ConnectionId>,
        nachricht: ControlMessage,
    ) -> usize {
        let empfaenger: Vec<(ConnectionId, mpsc::Sender<ControlMessage>)> = self
            .raeume
            .get(&raum)
            .into_iter()
            .flatten()
            .filter(|conn| Some(**conn) != ausser)
            .filter_map(|conn| self.verbindungen.get(conn).map(|e| (*conn, e.sender.clone())))
            .collect();

        let mut zugestellt = 0;
        for (conn, sender) in empfaenger {
            match sender.try_send(nachricht.clone()) {
                Ok(()) => zugestellt += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!(verbindung = %conn, raum = %raum, "Send-Queue voll – Nachricht verworfen");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    tracing::debug!(verbindung = %conn, "Send-Queue geschlossen (Client getrennt)");
                }
            }
        }
        zugestellt
    }

    /// Prueft die gegenseitige Konsistenz beider Indizes
    pub fn konsistent(&self) -> bool {
        let bindungen_ok = self.verbindungen.iter().all(|(conn, e)| match &e.bindung {
            Some(raum) => self
                .raeume
                .get(&RoomId::from(raum.id))
                .is_some_and(|m| m.contains(conn)),
            None => true,
        });

        let mengen_ok = self.raeume.iter().all(|(raum, menge)| {
            !menge.is_empty()
                && menge.iter().all(|conn| {
                    self.verbindungen
                        .get(conn)
                        .and_then(|e| e.bindung.as_ref())
                        .is_some_and(|b| RoomId::from(b.id) == *raum)
                })
        });

        bindungen_ok && mengen_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use raumchat_protocol::ControlPayload;
    use uuid::Uuid;

    fn raum(name: &str) -> RaumRecord {
        RaumRecord {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: String::new(),
            creator_id: Uuid::new_v4(),
            password_hash: String::new(),
            encryption_key: String::new(),
            max_members: 50,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn benutzer(name: &str) -> BenutzerInfo {
        BenutzerInfo {
            id: UserId::new(),
            username: name.to_lowercase(),
            name: name.to_string(),
            avatar: None,
            color: "#007bff".to_string(),
        }
    }

    fn queue() -> (mpsc::Sender<ControlMessage>, mpsc::Receiver<ControlMessage>) {
        mpsc::channel(8)
    }

    #[test]
    fn registrieren_binden_entfernen() {
        let mut reg = ConnectionRegistry::neu();
        let conn = ConnectionId(1);
        let (tx, _rx) = queue();
        let lobby = raum("Lobby");

        reg.registrieren(conn, benutzer("Alice"), tx);
        assert_eq!(reg.anzahl_verbindungen(), 1);
        assert!(reg.bindung(conn).is_none());

        let vorher = reg.binden(conn, lobby.clone()).unwrap();
        assert!(vorher.is_none());
        assert_eq!(reg.verbindungen_im_raum(RoomId::from(lobby.id)), 1);
        assert!(reg.konsistent());

        let eintrag = reg.entfernen(conn).unwrap();
        assert_eq!(eintrag.bindung.map(|r| r.id), Some(lobby.id));
        assert_eq!(reg.verbindungen_im_raum(RoomId::from(lobby.id)), 0);
        assert!(reg.konsistent());
    }

    #[test]
    fn entfernen_ist_idempotent() {
        let mut reg = ConnectionRegistry::neu();
        let (tx, _rx) = queue();
        reg.registrieren(ConnectionId(7), benutzer("Bob"), tx);

        assert!(reg.entfernen(ConnectionId(7)).is_some());
        assert!(reg.entfernen(ConnectionId(7)).is_none());
        assert!(reg.konsistent());
    }

    #[test]
    fn binden_ohne_registrierung_schlaegt_fehl() {
        let mut reg = ConnectionRegistry::neu();
        let ergebnis = reg.binden(ConnectionId(3), raum("Lobby"));
        assert!(matches!(ergebnis, Err(GatewayError::VerbindungGetrennt(_))));
    }

    #[test]
    fn umbinden_loest_alten_raum() {
        let mut reg = ConnectionRegistry::neu();
        let conn = ConnectionId(1);
        let (tx, _rx) = queue();
        let a = raum("A");
        let b = raum("B");

        reg.registrieren(conn, benutzer("Alice"), tx);
        reg.binden(conn, a.clone()).unwrap();
        let vorher = reg.binden(conn, b.clone()).unwrap();

        assert_eq!(vorher.map(|r| r.id), Some(a.id));
        assert_eq!(reg.verbindungen_im_raum(RoomId::from(a.id)), 0);
        assert_eq!(reg.verbindungen_im_raum(RoomId::from(b.id)), 1);
        assert!(reg.konsistent());
    }

    #[test]
    fn abgebrochenes_umbinden_stellt_alten_raum_her() {
        let mut reg = ConnectionRegistry::neu();
        let conn = ConnectionId(1);
        let (tx, _rx) = queue();
        let a = raum("A");
        let b = raum("B");

        reg.registrieren(conn, benutzer("Alice"), tx);
        reg.binden(conn, a.clone()).unwrap();
        let vorher = reg.binden(conn, b.clone()).unwrap();

        reg.bindung_zuruecksetzen(conn, vorher);
        assert_eq!(reg.bindung(conn).map(|r| r.id), Some(a.id));
        assert_eq!(reg.verbindungen_im_raum(RoomId::from(a.id)), 1);
        assert_eq!(reg.verbindungen_im_raum(RoomId::from(b.id)), 0);
        assert!(reg.konsistent());

        // Ohne vorherige Bindung ist die Verbindung danach ungebunden
        reg.bindung_zuruecksetzen(conn, None);
        assert!(reg.bindung(conn).is_none());
        assert_eq!(reg.verbindungen_im_raum(RoomId::from(a.id)), 0);
        assert!(reg.konsistent());

        // Getrennte Verbindungen werden nicht wieder aufgenommen
        reg.entfernen(conn);
        reg.bindung_zuruecksetzen(conn, Some(a.clone()));
        assert_eq!(reg.anzahl_verbindungen(), 0);
        assert_eq!(reg.verbindungen_im_raum(RoomId::from(a.id)), 0);
        assert!(reg.konsistent());
    }

    #[test]
    fn online_benutzer_ohne_duplikate() {
        let mut reg = ConnectionRegistry::neu();
        let lobby = raum("Lobby");
        let alice = benutzer("Alice");
        let (tx1, _rx1) = queue();
        let (tx2, _rx2) = queue();
        let (tx3, _rx3) = queue();

        // Alice mit zwei Verbindungen
        reg.registrieren(ConnectionId(1), alice.clone(), tx1);
        reg.registrieren(ConnectionId(2), alice.clone(), tx2);
        reg.registrieren(ConnectionId(3), benutzer("Bob"), tx3);
        for c in 1..=3 {
            reg.binden(ConnectionId(c), lobby.clone()).unwrap();
        }

        let online = reg.online_benutzer(RoomId::from(lobby.id));
        assert_eq!(online.len(), 2);
        assert_eq!(online[0].name, "Alice");
        assert_eq!(online[1].name, "Bob");

        reg.entfernen(ConnectionId(1));
        assert!(reg.hat_verbindung(alice.id));
        reg.entfernen(ConnectionId(2));
        assert!(!reg.hat_verbindung(alice.id));
        assert!(reg.konsistent());
    }

    #[test]
    fn fan_out_mit_und_ohne_absender() {
        let mut reg = ConnectionRegistry::neu();
        let lobby = raum("Lobby");
        let raum_id = RoomId::from(lobby.id);
        let (tx1, mut rx1) = queue();
        let (tx2, mut rx2) = queue();

        reg.registrieren(ConnectionId(1), benutzer("Alice"), tx1);
        reg.registrieren(ConnectionId(2), benutzer("Bob"), tx2);
        reg.binden(ConnectionId(1), lobby.clone()).unwrap();
        reg.binden(ConnectionId(2), lobby).unwrap();

        let n = reg.an_raum_senden(raum_id, ControlMessage::ereignis(ControlPayload::Disconnect));
        assert_eq!(n, 2);
        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_ok());

        let n = reg.an_raum_ausser_senden(
            raum_id,
            ConnectionId(1),
            ControlMessage::ereignis(ControlPayload::Disconnect),
        );
        assert_eq!(n, 1);
        assert!(rx1.try_recv().is_err());
        assert!(rx2.try_recv().is_ok());
    }

    #[test]
    fn volle_oder_geschlossene_queue_wird_uebersprungen() {
        let mut reg = ConnectionRegistry::neu();
        let lobby = raum("Lobby");
        let raum_id = RoomId::from(lobby.id);
        let (voll_tx, _voll_rx) = mpsc::channel(1);
        let (zu_tx, zu_rx) = queue();
        let (ok_tx, mut ok_rx) = queue();
        drop(zu_rx);

        reg.registrieren(ConnectionId(1), benutzer("Voll"), voll_tx);
        reg.registrieren(ConnectionId(2), benutzer("Zu"), zu_tx);
        reg.registrieren(ConnectionId(3), benutzer("Ok"), ok_tx);
        for c in 1..=3 {
            reg.binden(ConnectionId(c), lobby.clone()).unwrap();
        }

        let ping = ControlMessage::ereignis(ControlPayload::Disconnect);
        assert_eq!(reg.an_raum_senden(raum_id, ping.clone()), 2);
        // Zweite Nachricht passt nicht mehr in die Queue mit Kapazitaet 1
        assert_eq!(reg.an_raum_senden(raum_id, ping), 1);
        assert!(ok_rx.try_recv().is_ok());
    }
}
