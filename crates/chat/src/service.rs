//! ChatService – Nachrichten senden, Verlauf laden, editieren, loeschen

use std::sync::Arc;

use uuid::Uuid;

use raumchat_core::UserId;
use raumchat_crypto::{CryptoResult, NachrichtenCipher, RaumSchluessel};
use raumchat_db::{
    models::{BenutzerRecord, NachrichtRecord, NachrichtenTyp, NeueNachricht, RaumRecord},
    MessageRepository,
};
use raumchat_protocol::{BenutzerInfo, NachrichtenArt};

use crate::{
    error::{ChatError, ChatResult},
    types::{ChatKonfig, ChatNachricht, MAX_NACHRICHTEN_LAENGE, MAX_SEITEN_LIMIT, PLATZHALTER_TEXT},
};

/// ChatService verwaltet verschluesselte Text-Nachrichten in Raeumen
///
/// Der Aufrufer muss den Raumzugang vorher geprueft haben.
pub struct ChatService<M: MessageRepository> {
    repo: Arc<M>,
    cipher: NachrichtenCipher,
    konfig: ChatKonfig,
}

impl<M: MessageRepository> ChatService<M> {
    pub fn neu(repo: Arc<M>, cipher: NachrichtenCipher, konfig: ChatKonfig) -> Self {
        Self {
            repo,
            cipher,
            konfig,
        }
    }

    /// Nachricht verschluesseln und speichern
    pub async fn nachricht_senden(
        &self,
        sender: &BenutzerRecord,
        raum: &RaumRecord,
        text: &str,
    ) -> ChatResult<ChatNachricht> {
        let text = text_pruefen(text)?;
        let verschluesselt = self.verschluesseln(text, raum).await?;

        let record = self
            .repo
            .create(NeueNachricht {
                room_id: raum.id,
                room_name: &raum.name,
                sender_id: sender.id,
                sender_name: &sender.name,
                sender_avatar: sender.avatar.as_deref(),
                sender_color: &sender.color,
                text,
                encrypted_text: &verschluesselt,
                message_type: NachrichtenTyp::Text,
            })
            .await?;

        tracing::debug!(
            nachricht_id = %record.id,
            raum_id = %raum.id,
            sender_id = %sender.id,
            "Nachricht gespeichert"
        );

        Ok(zu_nachricht(record, text.to_string(), None))
    }

    /// Die letzten Nachrichten fuer den Raumbeitritt, chronologisch
    pub async fn verlauf_laden(&self, raum: &RaumRecord) -> ChatResult<Vec<ChatNachricht>> {
        let records = self.repo.page(raum.id, self.konfig.verlauf_limit, 0).await?;
        self.entschluesseln(raum, records).await
    }

    /// Eine Verlaufsseite; `skip` zaehlt vom neuesten Ende
    pub async fn seite_laden(
        &self,
        raum: &RaumRecord,
        limit: Option<i64>,
        skip: Option<i64>,
    ) -> ChatResult<Vec<ChatNachricht>> {
        let limit = limit
            .unwrap_or(self.konfig.seiten_limit_standard)
            .clamp(1, MAX_SEITEN_LIMIT);
        let skip = skip.unwrap_or(0).max(0);

        let records = self.repo.page(raum.id, limit, skip).await?;
        self.entschluesseln(raum, records).await
    }

    /// Raum einer Nachricht, fuer die Zugangspruefung vor Bearbeiten/Loeschen
    pub async fn raum_der_nachricht(&self, message_id: Uuid) -> ChatResult<Uuid> {
        Ok(self.nachricht_laden(message_id).await?.room_id)
    }

    /// Nachricht editieren (nur eigene Nachrichten)
    pub async fn nachricht_bearbeiten(
        &self,
        bearbeiter_id: Uuid,
        raum: &RaumRecord,
        message_id: Uuid,
        neuer_text: &str,
    ) -> ChatResult<ChatNachricht> {
        let text = text_pruefen(neuer_text)?;

        let vorhanden = self.nachricht_laden(message_id).await?;
        if vorhanden.room_id != raum.id {
            return Err(ChatError::NichtGefunden(message_id.to_string()));
        }
        if vorhanden.sender_id != bearbeiter_id {
            return Err(ChatError::KeineBerechtigung(
                "Nur der Verfasser kann die Nachricht editieren".into(),
            ));
        }

        let verschluesselt = self.verschluesseln(text, raum).await?;
        let record = self
            .repo
            .update_text(message_id, text, &verschluesselt)
            .await?;

        Ok(zu_nachricht(record, text.to_string(), None))
    }

    /// Nachricht endgueltig loeschen (nur eigene Nachrichten)
    pub async fn nachricht_loeschen(&self, requester_id: Uuid, message_id: Uuid) -> ChatResult<()> {
        let vorhanden = self.nachricht_laden(message_id).await?;

        if vorhanden.sender_id != requester_id {
            return Err(ChatError::KeineBerechtigung(
                "Nur der Verfasser kann die Nachricht loeschen".into(),
            ));
        }

        if !self.repo.delete(message_id).await? {
            return Err(ChatError::NichtGefunden(message_id.to_string()));
        }

        tracing::debug!(nachricht_id = %message_id, "Nachricht geloescht");
        Ok(())
    }

    async fn nachricht_laden(&self, message_id: Uuid) -> ChatResult<NachrichtRecord> {
        self.repo
            .get_by_id(message_id)
            .await?
            .ok_or_else(|| ChatError::NichtGefunden(message_id.to_string()))
    }

    // -----------------------------------------------------------------------
    // Kryptografie (Argon2 laeuft im Blocking-Pool)
    // -----------------------------------------------------------------------

    async fn verschluesseln(&self, text: &str, raum: &RaumRecord) -> ChatResult<String> {
        let schluessel = RaumSchluessel::aus_hex(&raum.encryption_key)?;
        let cipher = self.cipher.clone();
        let text = text.to_string();

        blockierend(move || cipher.verschluesseln(&text, &schluessel)).await?
            .map_err(ChatError::from)
    }

    async fn entschluesseln(
        &self,
        raum: &RaumRecord,
        records: Vec<NachrichtRecord>,
    ) -> ChatResult<Vec<ChatNachricht>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let schluessel = RaumSchluessel::aus_hex(&raum.encryption_key)?;
        let cipher = self.cipher.clone();
        let tokens: Vec<String> = records.iter().map(|r| r.encrypted_text.clone()).collect();

        let klartexte = blockierend(move || {
            tokens
                .iter()
                .map(|t| cipher.entschluesseln(t, &schluessel))
                .collect::<Vec<CryptoResult<String>>>()
        })
        .await?;

        Ok(records
            .into_iter()
            .zip(klartexte)
            .map(|(record, klartext)| match klartext {
                Ok(text) => zu_nachricht(record, text, None),
                Err(e) => {
                    tracing::warn!(
                        nachricht_id = %record.id,
                        raum_id = %record.room_id,
                        fehler = %e,
                        "Nachricht konnte nicht entschluesselt werden"
                    );
                    zu_nachricht(record, PLATZHALTER_TEXT.to_string(), Some(NachrichtenArt::System))
                }
            })
            .collect())
    }
}

async fn blockierend<T, F>(arbeit: F) -> ChatResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(arbeit)
        .await
        .map_err(|e| ChatError::Intern(format!("Krypto-Task abgebrochen: {e}")))
}

/// Trimmt und prueft die Laenge
fn text_pruefen(text: &str) -> ChatResult<&str> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ChatError::UngueltigeEingabe(
            "Nachrichteninhalt darf nicht leer sein".into(),
        ));
    }
    let laenge = text.chars().count();
    if laenge > MAX_NACHRICHTEN_LAENGE {
        return Err(ChatError::UngueltigeEingabe(format!(
            "Nachricht zu lang: {laenge} Zeichen (Maximum: {MAX_NACHRICHTEN_LAENGE})"
        )));
    }
    Ok(text)
}

fn art(typ: NachrichtenTyp) -> NachrichtenArt {
    match typ {
        NachrichtenTyp::Text => NachrichtenArt::Text,
        NachrichtenTyp::System => NachrichtenArt::System,
        NachrichtenTyp::Invitation => NachrichtenArt::Invitation,
    }
}

/// Konvertiert einen DB-Record mit bereits entschluesseltem Text
fn zu_nachricht(
    record: NachrichtRecord,
    text: String,
    art_ueberschreiben: Option<NachrichtenArt>,
) -> ChatNachricht {
    ChatNachricht {
        id: record.id,
        room_id: record.room_id,
        user: BenutzerInfo {
            id: UserId::from(record.sender_id),
            // Nachrichten speichern keinen Benutzernamen
            username: record.sender_name.clone(),
            name: record.sender_name,
            avatar: record.sender_avatar,
            color: record.sender_color,
        },
        text,
        message_type: art_ueberschreiben.unwrap_or_else(|| art(record.message_type)),
        edited: record.edited,
        edited_at: record.edited_at,
        timestamp: record.created_at,
    }
}
