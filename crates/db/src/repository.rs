//! Repository-Trait-Definitionen
//!
//! Das Repository-Pattern entkoppelt die Geschaeftslogik von der konkreten
//! Datenbank-Implementierung. Services sind generisch ueber diese Traits,
//! Tests verwenden eigene In-Memory-Implementierungen.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::DbError;
use crate::models::{
    BenutzerProfilUpdate, BenutzerRecord, EinladungRecord, EinladungsStatus, MitgliedEinfuegen,
    MitgliedschaftRecord, MitgliedsRolle, NachrichtRecord, NeueEinladung, NeueNachricht,
    NeuerBenutzer, NeuerRaum, RaumRecord, RaumUebersicht,
};

pub type DbResult<T> = Result<T, DbError>;

/// Konfiguration fuer die Datenbankverbindung
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Verbindungs-URL (z.B. "sqlite://raumchat.db")
    pub url: String,
    /// Maximale Anzahl gleichzeitiger Verbindungen im Pool
    pub max_verbindungen: u32,
    /// Ob WAL-Modus aktiviert werden soll
    pub sqlite_wal: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://raumchat.db".into(),
            max_verbindungen: 5,
            sqlite_wal: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Benutzer
// ---------------------------------------------------------------------------

#[allow(async_fn_in_trait)]
pub trait UserRepository: Send + Sync {
    async fn create(&self, data: NeuerBenutzer<'_>) -> DbResult<BenutzerRecord>;

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<BenutzerRecord>>;

    async fn get_by_name(&self, username: &str) -> DbResult<Option<BenutzerRecord>>;

    /// Aendert Anzeigename, Avatar oder Farbe
    async fn update_profile(&self, id: Uuid, data: BenutzerProfilUpdate) -> DbResult<BenutzerRecord>;

    /// Setzt Online-Flag und last_seen
    async fn set_online(&self, id: Uuid, online: bool, zeitpunkt: DateTime<Utc>) -> DbResult<()>;
}

// ---------------------------------------------------------------------------
// Raeume und Mitgliedschaften
// ---------------------------------------------------------------------------

#[allow(async_fn_in_trait)]
pub trait RoomRepository: Send + Sync {
    /// Legt den Raum an und traegt den Ersteller als Admin mit Zugang ein
    async fn create(&self, data: NeuerRaum<'_>) -> DbResult<RaumRecord>;

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<RaumRecord>>;

    /// Gibt true zurueck wenn der Ersteller bereits einen aktiven Raum dieses Namens hat
    async fn active_name_exists(&self, creator_id: Uuid, name: &str) -> DbResult<bool>;

    /// Alle aktiven Raeume in denen der Benutzer Mitglied ist
    async fn list_for_member(&self, user_id: Uuid) -> DbResult<Vec<RaumUebersicht>>;

    async fn get_membership(&self, room_id: Uuid, user_id: Uuid)
        -> DbResult<Option<MitgliedschaftRecord>>;

    /// Fuegt ein Mitglied hinzu, atomar mit der Kapazitaetspruefung
    async fn add_member(
        &self,
        room_id: Uuid,
        user_id: Uuid,
        role: MitgliedsRolle,
        has_access: bool,
    ) -> DbResult<MitgliedEinfuegen>;

    /// Setzt has_access = true; false wenn keine Mitgliedschaft existiert
    async fn grant_access(&self, room_id: Uuid, user_id: Uuid) -> DbResult<bool>;
}

// ---------------------------------------------------------------------------
// Einladungen
// ---------------------------------------------------------------------------

#[allow(async_fn_in_trait)]
pub trait InvitationRepository: Send + Sync {
    async fn create(&self, data: NeueEinladung<'_>) -> DbResult<EinladungRecord>;

    async fn get_by_code(&self, code: &str) -> DbResult<Option<EinladungRecord>>;

    /// Offene Einladung fuer das Paar (Raum, Benutzer)
    async fn find_pending(&self, room_id: Uuid, user_id: Uuid) -> DbResult<Option<EinladungRecord>>;

    /// Offene, noch nicht abgelaufene Einladungen an einen Benutzer
    async fn list_pending_for(&self, user_id: Uuid, jetzt: DateTime<Utc>)
        -> DbResult<Vec<EinladungRecord>>;

    /// Wechselt den Status, aber nur aus `pending` heraus
    async fn resolve(&self, id: Uuid, status: EinladungsStatus) -> DbResult<bool>;

    /// Nimmt die Einladung an: Mitglied ohne Zugang einfuegen und Status setzen
    ///
    /// Bei `RaumVoll` bleibt die Einladung offen. Bei `BereitsMitglied`
    /// gilt sie trotzdem als angenommen.
    async fn accept(&self, einladung: &EinladungRecord) -> DbResult<MitgliedEinfuegen>;
}

// ---------------------------------------------------------------------------
// Nachrichten
// ---------------------------------------------------------------------------

#[allow(async_fn_in_trait)]
pub trait MessageRepository: Send + Sync {
    async fn create(&self, data: NeueNachricht<'_>) -> DbResult<NachrichtRecord>;

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<NachrichtRecord>>;

    /// Die neuesten `limit` Nachrichten nach `skip`, chronologisch sortiert
    async fn page(&self, room_id: Uuid, limit: i64, skip: i64) -> DbResult<Vec<NachrichtRecord>>;

    /// Ersetzt den Text und markiert die Nachricht als bearbeitet
    async fn update_text(&self, id: Uuid, text: &str, encrypted_text: &str)
        -> DbResult<NachrichtRecord>;

    async fn delete(&self, id: Uuid) -> DbResult<bool>;
}
