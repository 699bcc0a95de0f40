//! Auth-Service fuer Raumchat
//!
//! Zentraler Service fuer Registrierung, Login, Logout und Session-Pruefung.

use std::sync::Arc;

use raumchat_crypto::{geheimnis_hashen, geheimnis_verifizieren};
use raumchat_db::{
    models::{BenutzerRecord, NeuerBenutzer},
    DbError, UserRepository,
};

use crate::{
    error::{AuthError, AuthResult},
    session::{Session, SessionStore},
};

/// Standardfarbe fuer neue Benutzer
pub const STANDARD_FARBE: &str = "#007bff";

const PASSWORT_MIN_LAENGE: usize = 6;

/// Eingabedaten fuer eine Registrierung
#[derive(Debug, Clone, Default)]
pub struct Registrierung {
    pub username: String,
    pub email: String,
    pub passwort: String,
    /// Anzeigename, Standard ist der Benutzername
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub color: Option<String>,
}

/// Geprueft und normalisiert, bereit zum Speichern
struct GepruefteRegistrierung {
    username: String,
    email: String,
    name: String,
    avatar: Option<String>,
    color: String,
}

fn ist_hex_farbe(farbe: &str) -> bool {
    farbe.len() == 7
        && farbe.starts_with('#')
        && farbe[1..].chars().all(|c| c.is_ascii_hexdigit())
}

impl Registrierung {
    fn pruefen(&self) -> AuthResult<GepruefteRegistrierung> {
        let username = self.username.trim();
        let laenge = username.chars().count();
        if !(3..=30).contains(&laenge) {
            return Err(AuthError::eingabe(
                "Benutzername muss 3 bis 30 Zeichen lang sein",
            ));
        }

        let email = self.email.trim().to_lowercase();
        if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
            return Err(AuthError::eingabe("Ungueltige E-Mail-Adresse"));
        }

        if self.passwort.chars().count() < PASSWORT_MIN_LAENGE {
            return Err(AuthError::eingabe(format!(
                "Passwort muss mindestens {PASSWORT_MIN_LAENGE} Zeichen lang sein"
            )));
        }

        let name = self
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(username);
        if name.chars().count() > 50 {
            return Err(AuthError::eingabe("Anzeigename darf hoechstens 50 Zeichen lang sein"));
        }

        let color = match self.color.as_deref().map(str::trim) {
            None | Some("") => STANDARD_FARBE.to_string(),
            Some(farbe) if ist_hex_farbe(farbe) => farbe.to_string(),
            Some(_) => return Err(AuthError::eingabe("Farbe muss im Format #rrggbb sein")),
        };

        Ok(GepruefteRegistrierung {
            username: username.to_string(),
            email,
            name: name.to_string(),
            avatar: self
                .avatar
                .as_deref()
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(String::from),
            color,
        })
    }
}

/// Auth-Service – Einstiegspunkt fuer alle Authentifizierungsvorgaenge
pub struct AuthService<U: UserRepository> {
    user_repo: Arc<U>,
    session_store: Arc<SessionStore>,
}

impl<U: UserRepository> AuthService<U> {
    pub fn neu(user_repo: Arc<U>, session_store: Arc<SessionStore>) -> Self {
        Self {
            user_repo,
            session_store,
        }
    }

    /// Registriert einen neuen Benutzer
    pub async fn registrieren(&self, daten: Registrierung) -> AuthResult<BenutzerRecord> {
        let geprueft = daten.pruefen()?;

        if self.user_repo.get_by_name(&geprueft.username).await?.is_some() {
            return Err(AuthError::BenutzerExistiert(geprueft.username));
        }

        let passwort_hash = geheimnis_hashen(&daten.passwort)?;

        let benutzer = self
            .user_repo
            .create(NeuerBenutzer {
                username: &geprueft.username,
                email: &geprueft.email,
                name: &geprueft.name,
                avatar: geprueft.avatar.as_deref(),
                color: &geprueft.color,
                password_hash: &passwort_hash,
            })
            .await
            .map_err(|e| match e {
                // E-Mail bereits vergeben oder paralleler Insert
                DbError::Eindeutigkeit(msg) => AuthError::BenutzerExistiert(msg),
                andere => AuthError::Datenbank(andere),
            })?;

        tracing::info!(
            user_id = %benutzer.id,
            username = %benutzer.username,
            "Neuer Benutzer registriert"
        );

        Ok(benutzer)
    }

    /// Meldet einen Benutzer an und erstellt eine neue Session
    pub async fn anmelden(&self, username: &str, passwort: &str) -> AuthResult<(BenutzerRecord, Session)> {
        let benutzer = self
            .user_repo
            .get_by_name(username.trim())
            .await?
            .ok_or(AuthError::UngueltigeAnmeldedaten)?;

        if !geheimnis_verifizieren(passwort, &benutzer.password_hash)? {
            tracing::warn!(username = %username, "Fehlgeschlagener Login-Versuch");
            return Err(AuthError::UngueltigeAnmeldedaten);
        }

        let session = self.session_store.erstellen(benutzer.id).await;

        tracing::info!(
            user_id = %benutzer.id,
            username = %benutzer.username,
            "Benutzer angemeldet"
        );

        Ok((benutzer, session))
    }

    /// Invalidiert die Session; ein unbekanntes Token ist kein Fehler
    pub async fn abmelden(&self, token: &str) {
        if self.session_store.invalidieren(token).await {
            tracing::debug!("Session invalidiert (Abmeldung)");
        }
    }

    /// Prueft ein Bearer-Token und laedt den zugehoerigen Benutzer
    pub async fn session_validieren(&self, token: &str) -> AuthResult<BenutzerRecord> {
        let session = self.session_store.validieren(token).await?;

        match self.user_repo.get_by_id(session.user_id).await? {
            Some(benutzer) => Ok(benutzer),
            None => {
                self.session_store.invalidieren(token).await;
                Err(AuthError::BenutzerNichtGefunden(session.user_id.to_string()))
            }
        }
    }
}
