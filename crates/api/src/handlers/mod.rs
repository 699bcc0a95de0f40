//! REST-Handler und Antwort-Typen
//!
//! Erfolgreiche Antworten haben die Form `{ "success": true, ... }`.

pub mod auth;
pub mod einladungen;
pub mod nachrichten;
pub mod raeume;

use chrono::{DateTime, Utc};
use raumchat_db::models::{BenutzerRecord, RaumRecord};
use serde::Serialize;
use uuid::Uuid;

/// Benutzer aus Sicht des Benutzers selbst (ohne Passwort-Hash)
#[derive(Debug, Serialize)]
pub struct BenutzerAntwort {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub name: String,
    pub avatar: Option<String>,
    pub color: String,
    pub is_online: bool,
    pub last_seen: Option<DateTime<Utc>>,
}

impl From<&BenutzerRecord> for BenutzerAntwort {
    fn from(b: &BenutzerRecord) -> Self {
        Self {
            id: b.id,
            username: b.username.clone(),
            email: b.email.clone(),
            name: b.name.clone(),
            avatar: b.avatar.clone(),
            color: b.color.clone(),
            is_online: b.is_online,
            last_seen: b.last_seen,
        }
    }
}

/// Raum ohne Passwort-Hash und Schluessel
#[derive(Debug, Serialize)]
pub struct RaumAntwort {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub creator_id: Uuid,
    pub max_members: i64,
    pub created_at: DateTime<Utc>,
}

impl From<&RaumRecord> for RaumAntwort {
    fn from(r: &RaumRecord) -> Self {
        Self {
            id: r.id,
            name: r.name.clone(),
            description: r.description.clone(),
            creator_id: r.creator_id,
            max_members: r.max_members,
            created_at: r.created_at,
        }
    }
}
