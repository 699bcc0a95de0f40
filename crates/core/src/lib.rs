//! raumchat-core – Gemeinsame Identifikationstypen
//!
//! Dieses Crate stellt die ID-Typen bereit, die von allen anderen
//! Raumchat-Crates gemeinsam genutzt werden.

pub mod types;

// Re-Exporte fuer bequemen Zugriff
pub use types::{ConnectionId, InvitationId, MessageId, RoomId, UserId};
