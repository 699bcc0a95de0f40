//! Oeffentliche Typen fuer den Chat-Service

use chrono::{DateTime, Utc};
use raumchat_core::UserId;
use raumchat_db::models::BenutzerRecord;
use raumchat_protocol::{BenutzerInfo, NachrichtInfo, NachrichtenArt};
use serde::Serialize;
use uuid::Uuid;

/// Ersatztext fuer Nachrichten die sich nicht entschluesseln lassen
pub const PLATZHALTER_TEXT: &str = "[Message could not be decrypted]";

/// Maximale Nachrichtenlaenge in Zeichen (nach Trimmen)
pub const MAX_NACHRICHTEN_LAENGE: usize = 1000;

/// Obergrenze fuer eine Verlaufsseite
pub const MAX_SEITEN_LIMIT: i64 = 100;

/// Limits fuer Verlauf und Seiten
#[derive(Debug, Clone)]
pub struct ChatKonfig {
    /// Anzahl Nachrichten beim Raumbeitritt
    pub verlauf_limit: i64,
    pub seiten_limit_standard: i64,
}

impl Default for ChatKonfig {
    fn default() -> Self {
        Self {
            verlauf_limit: 100,
            seiten_limit_standard: 50,
        }
    }
}

/// Entschluesselte Chat-Nachricht (Domain-Typ, nicht DB-Record)
#[derive(Debug, Clone, Serialize)]
pub struct ChatNachricht {
    pub id: Uuid,
    pub room_id: Uuid,
    /// Absender wie zum Sendezeitpunkt
    pub user: BenutzerInfo,
    pub text: String,
    pub message_type: NachrichtenArt,
    pub edited: bool,
    pub edited_at: Option<DateTime<Utc>>,
    pub timestamp: DateTime<Utc>,
}

impl From<ChatNachricht> for NachrichtInfo {
    fn from(n: ChatNachricht) -> Self {
        NachrichtInfo {
            id: n.id.into(),
            text: n.text,
            user: n.user,
            timestamp: n.timestamp,
            edited: n.edited,
            message_type: n.message_type,
        }
    }
}

/// Oeffentliche Sicht auf einen Benutzer (ohne E-Mail und Passwort-Hash)
pub fn benutzer_info(record: &BenutzerRecord) -> BenutzerInfo {
    BenutzerInfo {
        id: UserId::from(record.id),
        username: record.username.clone(),
        name: record.name.clone(),
        avatar: record.avatar.clone(),
        color: record.color.clone(),
    }
}
