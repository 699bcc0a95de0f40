//! Nachrichten-Verschluesselung
//!
//! Pro Nachricht wird aus Raum-Schluessel und frischem Salt ein
//! Einmal-Schluessel abgeleitet (Argon2id) und damit per AES-256-GCM
//! verschluesselt.
//!
//! ## Format
//! ```text
//! base64( [salt(32)] [nonce(12)] [auth_tag(16)] [ciphertext] )
//! ```
//!
//! Salt und Nonce sind bei jedem Aufruf neu, gleiche Klartexte ergeben
//! also nie gleiche Tokens.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce as AesNonce,
};
use argon2::{Algorithm, Argon2, Params, Version};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::{CryptoError, CryptoResult};
use crate::schluessel::RaumSchluessel;

// ---------------------------------------------------------------------------
// Konstanten
// ---------------------------------------------------------------------------

pub const SALT_LAENGE: usize = 32;
pub const NONCE_LAENGE: usize = 12;
pub const TAG_LAENGE: usize = 16;

/// Abgeleitete Schluessellaenge fuer AES-256
const SCHLUESSEL_LAENGE: usize = 32;

/// Mindestlaenge eines gueltigen Tokens (leerer Klartext)
const KOPF_LAENGE: usize = SALT_LAENGE + NONCE_LAENGE + TAG_LAENGE;

// ---------------------------------------------------------------------------
// KdfParameter
// ---------------------------------------------------------------------------

/// Argon2id-Parameter fuer die Ableitung der Nachrichtenschluessel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParameter {
    /// Speicherbedarf in KiB
    pub speicher_kib: u32,
    /// Anzahl Durchlaeufe
    pub iterationen: u32,
    /// Anzahl Lanes
    pub parallelitaet: u32,
}

impl Default for KdfParameter {
    fn default() -> Self {
        Self {
            speicher_kib: 8 * 1024,
            iterationen: 2,
            parallelitaet: 1,
        }
    }
}

// ---------------------------------------------------------------------------
// NachrichtenCipher
// ---------------------------------------------------------------------------

/// Ver- und Entschluesselt Nachrichtentexte mit einem Raum-Schluessel
#[derive(Clone)]
pub struct NachrichtenCipher {
    argon2: Argon2<'static>,
    parameter: KdfParameter,
}

impl std::fmt::Debug for NachrichtenCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NachrichtenCipher")
            .field("parameter", &self.parameter)
            .finish()
    }
}

impl NachrichtenCipher {
    /// Erstellt einen Cipher mit den gegebenen KDF-Parametern
    pub fn neu(parameter: KdfParameter) -> CryptoResult<Self> {
        let params = Params::new(
            parameter.speicher_kib,
            parameter.iterationen,
            parameter.parallelitaet,
            Some(SCHLUESSEL_LAENGE),
        )
        .map_err(|e| CryptoError::KdfParameter(e.to_string()))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            parameter,
        })
    }

    pub fn parameter(&self) -> KdfParameter {
        self.parameter
    }

    /// Verschluesselt einen Klartext zu einem portablen Base64-Token
    pub fn verschluesseln(&self, klartext: &str, schluessel: &RaumSchluessel) -> CryptoResult<String> {
        let mut salt = [0u8; SALT_LAENGE];
        OsRng.fill_bytes(&mut salt);
        let mut nonce = [0u8; NONCE_LAENGE];
        OsRng.fill_bytes(&mut nonce);

        let cipher = self.cipher_ableiten(schluessel, &salt)?;

        // aes-gcm liefert ciphertext || tag
        let mut ciphertext = cipher
            .encrypt(AesNonce::from_slice(&nonce), klartext.as_bytes())
            .map_err(|e| CryptoError::Verschluesselung(e.to_string()))?;
        let tag = ciphertext.split_off(ciphertext.len() - TAG_LAENGE);

        let mut token = Vec::with_capacity(KOPF_LAENGE + ciphertext.len());
        token.extend_from_slice(&salt);
        token.extend_from_slice(&nonce);
        token.extend_from_slice(&tag);
        token.extend_from_slice(&ciphertext);

        Ok(STANDARD.encode(token))
    }

    /// Entschluesselt ein Token
    ///
    /// Jeder Struktur- oder Authentifizierungsfehler wird zu
    /// `CryptoError::Entschluesselung`.
    pub fn entschluesseln(&self, token: &str, schluessel: &RaumSchluessel) -> CryptoResult<String> {
        let daten = STANDARD
            .decode(token)
            .map_err(|e| CryptoError::Entschluesselung(format!("Base64: {e}")))?;

        if daten.len() < KOPF_LAENGE {
            return Err(CryptoError::Entschluesselung(format!(
                "Token zu kurz: {} Bytes (Minimum: {KOPF_LAENGE})",
                daten.len()
            )));
        }

        let (salt, rest) = daten.split_at(SALT_LAENGE);
        let (nonce, rest) = rest.split_at(NONCE_LAENGE);
        let (tag, ciphertext) = rest.split_at(TAG_LAENGE);

        let mut eingabe = Vec::with_capacity(ciphertext.len() + TAG_LAENGE);
        eingabe.extend_from_slice(ciphertext);
        eingabe.extend_from_slice(tag);

        let cipher = self.cipher_ableiten(schluessel, salt)?;
        let klartext = cipher
            .decrypt(AesNonce::from_slice(nonce), eingabe.as_slice())
            .map_err(|_| CryptoError::Entschluesselung("Auth-Tag ungueltig".into()))?;

        String::from_utf8(klartext)
            .map_err(|e| CryptoError::Entschluesselung(format!("Kein UTF-8: {e}")))
    }

    /// Leitet den Einmal-Schluessel ab und baut den AES-GCM-Cipher
    fn cipher_ableiten(&self, schluessel: &RaumSchluessel, salt: &[u8]) -> CryptoResult<Aes256Gcm> {
        let mut abgeleitet = [0u8; SCHLUESSEL_LAENGE];
        self.argon2
            .hash_password_into(schluessel.as_bytes(), salt, &mut abgeleitet)
            .map_err(|e| CryptoError::KdfParameter(e.to_string()))?;

        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&abgeleitet));
        abgeleitet.iter_mut().for_each(|b| *b = 0);
        Ok(cipher)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
