//! Datenbankmodelle fuer Raumchat
//!
//! Diese Typen repraesentieren Datensaetze aus der Datenbank.
//! Sie sind von den Protokoll-Typen getrennt und dienen als reine
//! Datenuebertragungsobjekte. Datensaetze mit Geheimnissen (Passwort-Hash,
//! Raum-Schluessel) sind bewusst nicht `Serialize`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Implementiert `als_str` und `FromStr` fuer ein Text-Enum der Datenbank
macro_rules! text_enum {
    ($name:ident, $bezeichnung:literal, { $($variante:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn als_str(&self) -> &'static str {
                match self {
                    $(Self::$variante => $text,)+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variante),)+
                    other => Err(format!(concat!("Unbekannter ", $bezeichnung, ": {}"), other)),
                }
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Benutzer
// ---------------------------------------------------------------------------

/// Benutzer-Datensatz aus der Datenbank
#[derive(Debug, Clone)]
pub struct BenutzerRecord {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    /// Anzeigename
    pub name: String,
    pub avatar: Option<String>,
    pub color: String,
    pub password_hash: String,
    pub is_online: bool,
    pub last_seen: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Daten zum Erstellen eines neuen Benutzers
#[derive(Debug, Clone)]
pub struct NeuerBenutzer<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub name: &'a str,
    pub avatar: Option<&'a str>,
    pub color: &'a str,
    pub password_hash: &'a str,
}

/// Profilfelder die nachtraeglich geaendert werden koennen
#[derive(Debug, Clone, Default)]
pub struct BenutzerProfilUpdate {
    pub name: Option<String>,
    pub avatar: Option<Option<String>>,
    pub color: Option<String>,
}

// ---------------------------------------------------------------------------
// Raeume
// ---------------------------------------------------------------------------

/// Raum-Datensatz aus der Datenbank
///
/// `encryption_key` ist hex-kodiert und darf nie an Clients gehen.
#[derive(Debug, Clone)]
pub struct RaumRecord {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub creator_id: Uuid,
    pub password_hash: String,
    pub encryption_key: String,
    pub max_members: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Daten zum Erstellen eines neuen Raums
#[derive(Debug, Clone)]
pub struct NeuerRaum<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub creator_id: Uuid,
    pub password_hash: &'a str,
    pub encryption_key: &'a str,
    pub max_members: i64,
}

/// Rolle eines Mitglieds im Raum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MitgliedsRolle {
    Admin,
    Member,
}

text_enum!(MitgliedsRolle, "Rolle", {
    Admin => "admin",
    Member => "member",
});

/// Mitgliedschaft eines Benutzers in einem Raum (hoechstens eine pro Paar)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MitgliedschaftRecord {
    pub room_id: Uuid,
    pub user_id: Uuid,
    pub role: MitgliedsRolle,
    pub has_access: bool,
    pub joined_at: DateTime<Utc>,
}

/// Raum aus Sicht eines Mitglieds (fuer "meine Raeume")
#[derive(Debug, Clone)]
pub struct RaumUebersicht {
    pub raum: RaumRecord,
    pub role: MitgliedsRolle,
    pub has_access: bool,
    pub member_count: i64,
}

/// Ergebnis eines Mitglied-Inserts mit Kapazitaetspruefung
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MitgliedEinfuegen {
    Eingefuegt,
    RaumVoll,
    BereitsMitglied,
}

// ---------------------------------------------------------------------------
// Einladungen
// ---------------------------------------------------------------------------

/// Status einer Einladung; nur `Pending` darf noch wechseln
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EinladungsStatus {
    Pending,
    Accepted,
    Declined,
    Expired,
}

text_enum!(EinladungsStatus, "Einladungsstatus", {
    Pending => "pending",
    Accepted => "accepted",
    Declined => "declined",
    Expired => "expired",
});

/// Einladungs-Datensatz aus der Datenbank
#[derive(Debug, Clone)]
pub struct EinladungRecord {
    pub id: Uuid,
    pub room_id: Uuid,
    pub invited_by: Uuid,
    pub invited_user: Uuid,
    pub invite_code: String,
    pub status: EinladungsStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl EinladungRecord {
    pub fn ist_abgelaufen(&self, jetzt: DateTime<Utc>) -> bool {
        self.expires_at <= jetzt
    }
}

/// Daten zum Erstellen einer Einladung
#[derive(Debug, Clone)]
pub struct NeueEinladung<'a> {
    pub room_id: Uuid,
    pub invited_by: Uuid,
    pub invited_user: Uuid,
    pub invite_code: &'a str,
    pub expires_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Nachrichten
// ---------------------------------------------------------------------------

/// Nachrichtentyp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NachrichtenTyp {
    Text,
    System,
    Invitation,
}

text_enum!(NachrichtenTyp, "Nachrichtentyp", {
    Text => "text",
    System => "system",
    Invitation => "invitation",
});

/// Nachrichten-Datensatz aus der Datenbank
///
/// Die Absender-Felder sind eine Momentaufnahme beim Senden und werden
/// bei Profilaenderungen nicht nachgezogen.
#[derive(Debug, Clone)]
pub struct NachrichtRecord {
    pub id: Uuid,
    pub room_id: Uuid,
    pub room_name: String,
    pub sender_id: Uuid,
    pub sender_name: String,
    pub sender_avatar: Option<String>,
    pub sender_color: String,
    /// Klartext-Kopie
    pub text: String,
    pub encrypted_text: String,
    pub message_type: NachrichtenTyp,
    pub edited: bool,
    pub edited_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Daten zum Speichern einer neuen Nachricht
#[derive(Debug, Clone)]
pub struct NeueNachricht<'a> {
    pub room_id: Uuid,
    pub room_name: &'a str,
    pub sender_id: Uuid,
    pub sender_name: &'a str,
    pub sender_avatar: Option<&'a str>,
    pub sender_color: &'a str,
    pub text: &'a str,
    pub encrypted_text: &'a str,
    pub message_type: NachrichtenTyp,
}
