//! # raumchat-crypto
//!
//! Verschluesselungs-Engine fuer Raumchat.
//!
//! Nachrichten werden serverseitig mit einem Raum-Schluessel verschluesselt
//! abgelegt. Der Raum-Schluessel verlaesst den Server nie; es handelt sich
//! also um Schutz der gespeicherten Daten, **nicht** um Ende-zu-Ende-
//! Verschluesselung gegen einen kompromittierten Server.
//!
//! ## Module
//! - `schluessel` - Raum-Schluessel (Erzeugung, Hex-Format)
//! - `cipher` - AES-256-GCM mit Argon2id-abgeleitetem Nachrichtenschluessel
//! - `geheimnis` - Argon2id-Hashing fuer Raum- und Benutzerpasswoerter
//! - `einladung` - Einladungscodes
//! - `error` - Fehlertypen

pub mod cipher;
pub mod einladung;
pub mod error;
pub mod geheimnis;
pub mod schluessel;

// Bequeme Re-Exports
pub use cipher::{KdfParameter, NachrichtenCipher};
pub use einladung::{einladungscode_generieren, ist_einladungscode};
pub use error::{CryptoError, CryptoResult};
pub use geheimnis::{geheimnis_hashen, geheimnis_verifizieren};
pub use schluessel::{raum_schluessel_generieren, RaumSchluessel};
