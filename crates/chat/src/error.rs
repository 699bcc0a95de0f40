//! Fehlertypen fuer das Chat-Crate

use raumchat_protocol::ErrorCode;
use thiserror::Error;

/// Chat-Fehlertypen
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Nachricht nicht gefunden: {0}")]
    NichtGefunden(String),

    #[error("Keine Berechtigung: {0}")]
    KeineBerechtigung(String),

    #[error("Ungueltige Eingabe: {0}")]
    UngueltigeEingabe(String),

    #[error("Datenbank-Fehler: {0}")]
    Datenbank(#[from] raumchat_db::DbError),

    #[error("Kryptografie-Fehler: {0}")]
    Krypto(#[from] raumchat_crypto::CryptoError),

    #[error("Interner Fehler: {0}")]
    Intern(String),
}

impl ChatError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NichtGefunden(_) => ErrorCode::NotFound,
            Self::KeineBerechtigung(_) => ErrorCode::AccessDenied,
            Self::UngueltigeEingabe(_) => ErrorCode::InvalidInput,
            Self::Datenbank(_) | Self::Krypto(_) | Self::Intern(_) => ErrorCode::InternalError,
        }
    }
}

pub type ChatResult<T> = Result<T, ChatError>;
