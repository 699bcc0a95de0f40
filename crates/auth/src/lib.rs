//! raumchat-auth – Benutzerkonten und Sessions
//!
//! Dieses Crate implementiert:
//! - Registrierung mit Eingabepruefung und Argon2id-Passwort-Hash
//! - Login/Logout mit Bearer-Token
//! - Session-Management (in-memory mit TTL)

pub mod error;
pub mod service;
pub mod session;

// Bequeme Re-Exporte
pub use error::{AuthError, AuthResult};
pub use service::{AuthService, Registrierung};
pub use session::{Session, SessionStore};
