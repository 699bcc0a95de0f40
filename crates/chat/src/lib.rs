//! raumchat-chat – Verschluesselter Text-Chat
//!
//! Dieses Crate implementiert den ChatService: Nachrichten pruefen,
//! verschluesseln, speichern und den Verlauf entschluesselt laden.
//! Nachrichten die sich nicht entschluesseln lassen werden durch einen
//! Platzhalter ersetzt statt den ganzen Verlauf scheitern zu lassen.
//!
//! # Beispiel
//!
//! ```no_run
//! use std::sync::Arc;
//! use raumchat_chat::{ChatKonfig, ChatService};
//! use raumchat_crypto::{KdfParameter, NachrichtenCipher};
//! use raumchat_db::SqliteDb;
//!
//! #[tokio::main]
//! async fn main() {
//!     let db = Arc::new(SqliteDb::in_memory().await.unwrap());
//!     let cipher = NachrichtenCipher::neu(KdfParameter::default()).unwrap();
//!     let chat = ChatService::neu(db, cipher, ChatKonfig::default());
//! }
//! ```

pub mod error;
pub mod service;
pub mod types;


// Bequeme Re-Exporte
pub use error::{ChatError, ChatResult};
pub use service::ChatService;
pub use types::{benutzer_info, ChatKonfig, ChatNachricht, PLATZHALTER_TEXT};
