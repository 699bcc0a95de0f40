//! Gemeinsame Identifikationstypen fuer Raumchat
//!
//! Alle IDs verwenden das Newtype-Pattern um Verwechslungen zwischen
//! verschiedenen ID-Arten zur Compilezeit auszuschliessen.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Erzeugt einen UUID-basierten ID-Newtype mit Display-Praefix
macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident, $praefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Erstellt eine neue zufaellige ID
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Gibt die innere UUID zurueck
            pub fn inner(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($praefix, ":{}"), self.0)
            }
        }
    };
}

uuid_id!(
    /// Eindeutige Benutzer-ID
    UserId,
    "user"
);

uuid_id!(
    /// Eindeutige Raum-ID
    RoomId,
    "room"
);

uuid_id!(
    /// Eindeutige Nachrichten-ID
    MessageId,
    "msg"
);

uuid_id!(
    /// Eindeutige Einladungs-ID
    InvitationId,
    "invite"
);

/// ID einer Live-Verbindung zum Gateway
///
/// Wird beim Accept fortlaufend vergeben und nie persistiert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionId(pub u64);

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn:{}", self.0)
    }
}
