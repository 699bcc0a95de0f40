//! Fehlertypen fuer das Gateway

use raumchat_core::ConnectionId;
use raumchat_protocol::ErrorCode;
use thiserror::Error;

/// Fehlertyp fuer das Echtzeit-Gateway
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Ereignis vor erfolgreichem `connect`
    #[error("Nicht authentifiziert")]
    NichtAuthentifiziert,

    /// Verbindung ist an keinen Raum gebunden
    #[error("Nicht in einem Raum")]
    NichtImRaum,

    /// Verbindung ist nicht (mehr) registriert
    #[error("Verbindung getrennt: {0}")]
    VerbindungGetrennt(ConnectionId),

    /// Protokollfehler (ungueltiges Frame, unerwarteter Nachrichtentyp)
    #[error("Protokollfehler: {0}")]
    Protokoll(String),

    /// IO-Fehler (TCP, Socket)
    #[error("IO-Fehler: {0}")]
    Io(#[from] std::io::Error),
}

impl GatewayError {
    pub fn protokoll(msg: impl Into<String>) -> Self {
        Self::Protokoll(msg.into())
    }

    /// Fehlercode fuer die `error`-Antwort an den Client
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NichtAuthentifiziert => ErrorCode::Unauthenticated,
            Self::NichtImRaum => ErrorCode::NotInRoom,
            Self::Protokoll(_) => ErrorCode::InvalidRequest,
            Self::VerbindungGetrennt(_) | Self::Io(_) => ErrorCode::InternalError,
        }
    }
}

/// Result-Typ fuer das Gateway
pub type GatewayResult<T> = Result<T, GatewayError>;
