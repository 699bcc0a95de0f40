//! Fehlertypen fuer das Rooms-Crate

use raumchat_protocol::ErrorCode;
use thiserror::Error;

/// Fehler der Raum-Zugangssteuerung
#[derive(Debug, Error)]
pub enum RaumError {
    #[error("Raum nicht gefunden: {0}")]
    NichtGefunden(String),

    #[error("Benutzer nicht gefunden: {0}")]
    BenutzerNichtGefunden(String),

    #[error("Einladung nicht gefunden oder ungueltig")]
    EinladungNichtGefunden,

    #[error("Zugriff verweigert: {0}")]
    ZugriffVerweigert(String),

    #[error("Passwort fuer den ersten Zugang erforderlich")]
    PasswortErforderlich,

    #[error("Ungueltiges Raum-Passwort")]
    UngueltigesPasswort,

    #[error("Raum ist voll")]
    RaumVoll,

    #[error("Einladung ist abgelaufen")]
    EinladungAbgelaufen,

    #[error("Einladung wurde bereits erledigt")]
    EinladungErledigt,

    #[error("Benutzer hat bereits eine offene Einladung")]
    DoppelteEinladung,

    #[error("Benutzer ist bereits Mitglied")]
    BereitsMitglied,

    #[error("Raum mit diesem Namen existiert bereits: {0}")]
    DoppelterRaumname(String),

    #[error("Ungueltige Eingabe: {0}")]
    UngueltigeEingabe(String),

    #[error("Datenbank-Fehler: {0}")]
    Datenbank(#[from] raumchat_db::DbError),

    #[error("Kryptografie-Fehler: {0}")]
    Krypto(#[from] raumchat_crypto::CryptoError),

    #[error("Interner Fehler: {0}")]
    Intern(String),
}

impl RaumError {
    pub fn eingabe(msg: impl Into<String>) -> Self {
        Self::UngueltigeEingabe(msg.into())
    }

    /// Protokoll-Fehlercode fuer Gateway und REST-API
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NichtGefunden(_) | Self::EinladungNichtGefunden => ErrorCode::NotFound,
            Self::BenutzerNichtGefunden(_) => ErrorCode::UserNotFound,
            Self::ZugriffVerweigert(_) => ErrorCode::AccessDenied,
            Self::PasswortErforderlich | Self::UngueltigesPasswort => ErrorCode::InvalidPassword,
            Self::RaumVoll => ErrorCode::RoomFull,
            Self::EinladungAbgelaufen => ErrorCode::InvitationExpired,
            Self::EinladungErledigt => ErrorCode::InvitationResolved,
            Self::DoppelteEinladung => ErrorCode::DuplicateInvitation,
            Self::BereitsMitglied => ErrorCode::AlreadyMember,
            Self::DoppelterRaumname(_) => ErrorCode::DuplicateRoomName,
            Self::UngueltigeEingabe(_) => ErrorCode::InvalidInput,
            Self::Datenbank(_) | Self::Krypto(_) | Self::Intern(_) => ErrorCode::InternalError,
        }
    }
}

pub type RaumResult<T> = Result<T, RaumError>;
