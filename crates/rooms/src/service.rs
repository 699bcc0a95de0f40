//! RoomService – Raeume erstellen, Zugang steuern, Einladungen verwalten

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use raumchat_crypto::{
    einladungscode_generieren, geheimnis_hashen, geheimnis_verifizieren, ist_einladungscode,
    raum_schluessel_generieren, CryptoResult,
};
use raumchat_db::{
    models::{
        EinladungRecord, EinladungsStatus, MitgliedEinfuegen, MitgliedsRolle, NeueEinladung,
        NeuerRaum, RaumRecord, RaumUebersicht,
    },
    DbError, InvitationRepository, RoomRepository, UserRepository,
};

use crate::{
    error::{RaumError, RaumResult},
    types::{
        Beitritt, BeitrittsErgebnis, NeuerRaumAntrag, OffeneEinladung, RaumKonfig,
        ZugangsZustand, BESCHREIBUNG_MAX_LAENGE, MITGLIEDER_BEREICH, NAME_MAX_LAENGE,
    },
};

/// Fuehrt Argon2-Arbeit ausserhalb der Event-Loop aus
async fn blockierend<T, F>(arbeit: F) -> RaumResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> CryptoResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(arbeit)
        .await
        .map_err(|e| RaumError::Intern(format!("Hash-Task abgebrochen: {e}")))?
        .map_err(RaumError::from)
}

/// RoomService verwaltet Raeume, Mitgliedschaften und Einladungen
pub struct RoomService<R, I, U>
where
    R: RoomRepository,
    I: InvitationRepository,
    U: UserRepository,
{
    rooms: Arc<R>,
    invitations: Arc<I>,
    users: Arc<U>,
    konfig: RaumKonfig,
}

impl<R, I, U> RoomService<R, I, U>
where
    R: RoomRepository,
    I: InvitationRepository,
    U: UserRepository,
{
    pub fn neu(rooms: Arc<R>, invitations: Arc<I>, users: Arc<U>, konfig: RaumKonfig) -> Self {
        Self {
            rooms,
            invitations,
            users,
            konfig,
        }
    }

    // -----------------------------------------------------------------------
    // Raeume
    // -----------------------------------------------------------------------

    /// Erstellt einen Raum; der Ersteller wird Admin mit Zugang
    pub async fn raum_erstellen(
        &self,
        ersteller_id: Uuid,
        antrag: NeuerRaumAntrag,
    ) -> RaumResult<RaumRecord> {
        let name = antrag.name.trim();
        if name.is_empty() {
            return Err(RaumError::eingabe("Raumname ist erforderlich"));
        }
        if name.chars().count() > NAME_MAX_LAENGE {
            return Err(RaumError::eingabe(format!(
                "Raumname darf hoechstens {NAME_MAX_LAENGE} Zeichen lang sein"
            )));
        }

        let beschreibung = antrag.description.as_deref().unwrap_or("").trim();
        if beschreibung.chars().count() > BESCHREIBUNG_MAX_LAENGE {
            return Err(RaumError::eingabe(format!(
                "Beschreibung darf hoechstens {BESCHREIBUNG_MAX_LAENGE} Zeichen lang sein"
            )));
        }

        if antrag.password.trim().is_empty() {
            return Err(RaumError::eingabe("Raum-Passwort ist erforderlich"));
        }

        let max_members = antrag
            .max_members
            .unwrap_or(self.konfig.max_mitglieder_standard);
        if !MITGLIEDER_BEREICH.contains(&max_members) {
            return Err(RaumError::eingabe(format!(
                "max_members muss zwischen {} und {} liegen",
                MITGLIEDER_BEREICH.start(),
                MITGLIEDER_BEREICH.end()
            )));
        }

        if self.rooms.active_name_exists(ersteller_id, name).await? {
            return Err(RaumError::DoppelterRaumname(name.to_string()));
        }

        let passwort = antrag.password;
        let password_hash = blockierend(move || geheimnis_hashen(&passwort)).await?;
        let schluessel = raum_schluessel_generieren();

        let raum = self
            .rooms
            .create(NeuerRaum {
                name,
                description: beschreibung,
                creator_id: ersteller_id,
                password_hash: &password_hash,
                encryption_key: &schluessel.als_hex(),
                max_members,
            })
            .await?;

        tracing::info!(
            raum_id = %raum.id,
            ersteller_id = %ersteller_id,
            name = %raum.name,
            "Raum erstellt"
        );
        Ok(raum)
    }

    /// Alle aktiven Raeume des Benutzers
    pub async fn meine_raeume(&self, user_id: Uuid) -> RaumResult<Vec<RaumUebersicht>> {
        Ok(self.rooms.list_for_member(user_id).await?)
    }

    /// Aktueller Zugangszustand des Benutzers
    pub async fn zustand(&self, room_id: Uuid, user_id: Uuid) -> RaumResult<ZugangsZustand> {
        let mitgliedschaft = self.rooms.get_membership(room_id, user_id).await?;
        Ok(ZugangsZustand::aus_mitgliedschaft(mitgliedschaft))
    }

    async fn aktiven_raum_laden(&self, room_id: Uuid) -> RaumResult<RaumRecord> {
        self.rooms
            .get_by_id(room_id)
            .await?
            .filter(|r| r.is_active)
            .ok_or_else(|| RaumError::NichtGefunden(room_id.to_string()))
    }

    async fn passwort_pruefen(&self, passwort: &str, raum: &RaumRecord) -> RaumResult<()> {
        let passwort = passwort.to_string();
        let hash = raum.password_hash.clone();
        if blockierend(move || geheimnis_verifizieren(&passwort, &hash)).await? {
            Ok(())
        } else {
            Err(RaumError::UngueltigesPasswort)
        }
    }

    /// Zugang zu einem Raum erlangen
    ///
    /// Wiederholte Aufrufe mit bestehendem Zugang sind idempotent und
    /// pruefen kein Passwort.
    pub async fn zugang_erlangen(
        &self,
        user_id: Uuid,
        room_id: Uuid,
        passwort: Option<&str>,
    ) -> RaumResult<Beitritt> {
        let raum = self.aktiven_raum_laden(room_id).await?;
        let passwort = passwort.filter(|p| !p.is_empty());

        let ergebnis = match self.zustand(room_id, user_id).await? {
            ZugangsZustand::MitgliedMitZugang(_) => BeitrittsErgebnis::BereitsZugang,

            ZugangsZustand::MitgliedOhneZugang(_) => {
                let passwort = passwort.ok_or(RaumError::PasswortErforderlich)?;
                self.passwort_pruefen(passwort, &raum).await?;
                self.rooms.grant_access(room_id, user_id).await?;
                BeitrittsErgebnis::ZugangGewaehrt
            }

            ZugangsZustand::KeinMitglied => {
                let passwort = passwort.ok_or_else(|| {
                    RaumError::ZugriffVerweigert("Kein Mitglied dieses Raums".into())
                })?;
                self.passwort_pruefen(passwort, &raum).await?;

                match self
                    .rooms
                    .add_member(room_id, user_id, MitgliedsRolle::Member, true)
                    .await?
                {
                    MitgliedEinfuegen::Eingefuegt => BeitrittsErgebnis::Beigetreten,
                    MitgliedEinfuegen::RaumVoll => return Err(RaumError::RaumVoll),
                    MitgliedEinfuegen::BereitsMitglied => {
                        // Parallel per Einladung beigetreten
                        self.rooms.grant_access(room_id, user_id).await?;
                        BeitrittsErgebnis::ZugangGewaehrt
                    }
                }
            }
        };

        if ergebnis != BeitrittsErgebnis::BereitsZugang {
            tracing::info!(
                raum_id = %room_id,
                user_id = %user_id,
                ergebnis = ?ergebnis,
                "Raumzugang erteilt"
            );
        }

        Ok(Beitritt { raum, ergebnis })
    }

    /// Gibt den Raum zurueck wenn der Benutzer Zugang hat
    pub async fn zugang_pruefen(&self, user_id: Uuid, room_id: Uuid) -> RaumResult<RaumRecord> {
        let raum = self.aktiven_raum_laden(room_id).await?;
        if !self.zustand(room_id, user_id).await?.hat_zugang() {
            return Err(RaumError::ZugriffVerweigert(
                "Kein Zugang zu diesem Raum".into(),
            ));
        }
        Ok(raum)
    }

    // -----------------------------------------------------------------------
    // Einladungen
    // -----------------------------------------------------------------------

    /// Laedt einen Benutzer per Name und laedt ihn in den Raum ein
    pub async fn einladen(
        &self,
        einladender_id: Uuid,
        room_id: Uuid,
        username: &str,
    ) -> RaumResult<EinladungRecord> {
        let username = username.trim();
        if username.is_empty() {
            return Err(RaumError::eingabe("Benutzername ist erforderlich"));
        }

        let raum = self.aktiven_raum_laden(room_id).await?;
        if !self.zustand(room_id, einladender_id).await?.ist_mitglied() {
            return Err(RaumError::ZugriffVerweigert(
                "Nur Mitglieder duerfen einladen".into(),
            ));
        }

        let ziel = self
            .users
            .get_by_name(username)
            .await?
            .ok_or_else(|| RaumError::BenutzerNichtGefunden(username.to_string()))?;

        if ziel.id == einladender_id || self.rooms.get_membership(room_id, ziel.id).await?.is_some() {
            return Err(RaumError::BereitsMitglied);
        }

        let jetzt = Utc::now();
        if let Some(offen) = self.invitations.find_pending(room_id, ziel.id).await? {
            if !offen.ist_abgelaufen(jetzt) {
                return Err(RaumError::DoppelteEinladung);
            }
            self.invitations
                .resolve(offen.id, EinladungsStatus::Expired)
                .await?;
        }

        let code = einladungscode_generieren();
        let einladung = self
            .invitations
            .create(NeueEinladung {
                room_id,
                invited_by: einladender_id,
                invited_user: ziel.id,
                invite_code: &code,
                expires_at: jetzt + Duration::days(self.konfig.einladung_gueltig_tage),
            })
            .await
            .map_err(|e| match e {
                DbError::Eindeutigkeit(_) => RaumError::DoppelteEinladung,
                andere => RaumError::Datenbank(andere),
            })?;

        tracing::info!(
            raum_id = %raum.id,
            von = %einladender_id,
            an = %ziel.id,
            "Einladung erstellt"
        );
        Ok(einladung)
    }

    /// Gemeinsame Pruefungen fuer Annehmen und Ablehnen
    async fn offene_einladung_laden(
        &self,
        user_id: Uuid,
        code: &str,
    ) -> RaumResult<(EinladungRecord, RaumRecord)> {
        let code = code.trim();
        if !ist_einladungscode(code) {
            return Err(RaumError::EinladungNichtGefunden);
        }

        let einladung = self
            .invitations
            .get_by_code(code)
            .await?
            .ok_or(RaumError::EinladungNichtGefunden)?;

        let raum = self
            .rooms
            .get_by_id(einladung.room_id)
            .await?
            .filter(|r| r.is_active)
            .ok_or(RaumError::EinladungNichtGefunden)?;

        if einladung.invited_user != user_id {
            return Err(RaumError::ZugriffVerweigert(
                "Diese Einladung gilt einem anderen Benutzer".into(),
            ));
        }

        if einladung.status != EinladungsStatus::Pending {
            return Err(RaumError::EinladungErledigt);
        }

        if einladung.ist_abgelaufen(Utc::now()) {
            self.invitations
                .resolve(einladung.id, EinladungsStatus::Expired)
                .await?;
            return Err(RaumError::EinladungAbgelaufen);
        }

        Ok((einladung, raum))
    }

    /// Nimmt eine Einladung an; der Benutzer wird Mitglied ohne Zugang
    pub async fn einladung_annehmen(&self, user_id: Uuid, code: &str) -> RaumResult<RaumRecord> {
        let (einladung, raum) = self.offene_einladung_laden(user_id, code).await?;

        match self.invitations.accept(&einladung).await {
            Ok(MitgliedEinfuegen::Eingefuegt) => {
                tracing::info!(raum_id = %raum.id, user_id = %user_id, "Einladung angenommen");
                Ok(raum)
            }
            Ok(MitgliedEinfuegen::RaumVoll) => Err(RaumError::RaumVoll),
            Ok(MitgliedEinfuegen::BereitsMitglied) => Err(RaumError::BereitsMitglied),
            // Zwischenzeitlich erledigt
            Err(DbError::UngueltigeDaten(_)) => Err(RaumError::EinladungErledigt),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn einladung_ablehnen(&self, user_id: Uuid, code: &str) -> RaumResult<()> {
        let (einladung, _) = self.offene_einladung_laden(user_id, code).await?;

        if !self
            .invitations
            .resolve(einladung.id, EinladungsStatus::Declined)
            .await?
        {
            return Err(RaumError::EinladungErledigt);
        }

        tracing::info!(einladung_id = %einladung.id, user_id = %user_id, "Einladung abgelehnt");
        Ok(())
    }

    /// Offene, nicht abgelaufene Einladungen an den Benutzer
    pub async fn offene_einladungen(&self, user_id: Uuid) -> RaumResult<Vec<OffeneEinladung>> {
        let einladungen = self
            .invitations
            .list_pending_for(user_id, Utc::now())
            .await?;

        let mut ergebnis = Vec::with_capacity(einladungen.len());
        for einladung in einladungen {
            let Some(raum) = self
                .rooms
                .get_by_id(einladung.room_id)
                .await?
                .filter(|r| r.is_active)
            else {
                continue;
            };
            let eingeladen_von = self
                .users
                .get_by_id(einladung.invited_by)
                .await?
                .map(|u| u.name)
                .unwrap_or_default();

            ergebnis.push(OffeneEinladung {
                einladung,
                raum_name: raum.name,
                eingeladen_von,
            });
        }
        Ok(ergebnis)
    }
}
