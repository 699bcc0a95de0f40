//! Fehlertypen fuer den Auth-Service

use thiserror::Error;

/// Alle moeglichen Fehler im Auth-Service
#[derive(Debug, Error)]
pub enum AuthError {
    // --- Authentifizierung ---
    #[error("Benutzername oder Passwort falsch")]
    UngueltigeAnmeldedaten,

    // --- Session ---
    #[error("Session nicht gefunden oder abgelaufen")]
    SessionUngueltig,

    #[error("Session abgelaufen")]
    SessionAbgelaufen,

    // --- Benutzerverwaltung ---
    #[error("Benutzer existiert bereits: {0}")]
    BenutzerExistiert(String),

    #[error("Benutzer nicht gefunden: {0}")]
    BenutzerNichtGefunden(String),

    #[error("Ungueltige Eingabe: {0}")]
    UngueltigeEingabe(String),

    // --- Infrastruktur ---
    #[error("Datenbankfehler: {0}")]
    Datenbank(#[from] raumchat_db::DbError),

    #[error("Kryptografiefehler: {0}")]
    Krypto(#[from] raumchat_crypto::CryptoError),
}

impl AuthError {
    pub fn eingabe(msg: impl Into<String>) -> Self {
        Self::UngueltigeEingabe(msg.into())
    }

    /// Gibt true zurueck wenn der Aufrufer sich (neu) anmelden muss
    pub fn ist_nicht_authentifiziert(&self) -> bool {
        matches!(
            self,
            Self::UngueltigeAnmeldedaten
                | Self::SessionUngueltig
                | Self::SessionAbgelaufen
                | Self::BenutzerNichtGefunden(_)
        )
    }
}

/// Result-Alias fuer den Auth-Service
pub type AuthResult<T> = Result<T, AuthError>;
