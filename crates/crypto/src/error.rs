//! Fehlertypen fuer das Kryptografie-Subsystem

use thiserror::Error;

/// Fehler im Kryptografie-Subsystem
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Verschluesselung fehlgeschlagen: {0}")]
    Verschluesselung(String),

    #[error("Entschluesselung fehlgeschlagen: {0}")]
    Entschluesselung(String),

    #[error("Ungueltiger Schluessel: {0}")]
    UngueltigerSchluessel(String),

    #[error("Ungueltige KDF-Parameter: {0}")]
    KdfParameter(String),

    #[error("Hashing fehlgeschlagen: {0}")]
    Hashing(String),
}

pub type CryptoResult<T> = Result<T, CryptoError>;
