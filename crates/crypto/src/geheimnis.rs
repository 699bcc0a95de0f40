//! Geheimnis-Hashing mit Argon2id
//!
//! Wird fuer Raum-Passwoerter und Benutzer-Passwoerter verwendet. Der
//! Vergleich beim Verifizieren laeuft ueber den `password-hash`-Verifier
//! und ist damit zeitkonstant.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::error::{CryptoError, CryptoResult};

/// Argon2id-Instanz mit OWASP-Mindestwerten (19 MiB, 2 Iterationen, 1 Lane)
fn argon2_instanz() -> CryptoResult<Argon2<'static>> {
    let params = Params::new(19 * 1024, 2, 1, None)
        .map_err(|e| CryptoError::Hashing(e.to_string()))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hasht ein Geheimnis mit Argon2id und einem zufaelligen Salt
///
/// Gibt den PHC-String zurueck (inkl. Algorithmus, Parameter und Salt).
pub fn geheimnis_hashen(geheimnis: &str) -> CryptoResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    argon2_instanz()?
        .hash_password(geheimnis.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CryptoError::Hashing(e.to_string()))
}

/// Verifiziert ein Geheimnis gegen einen gespeicherten PHC-Hash
///
/// `Ok(false)` bei falschem Geheimnis, `Err` nur bei kaputtem Hash.
pub fn geheimnis_verifizieren(geheimnis: &str, hash: &str) -> CryptoResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| CryptoError::Hashing(format!("Ungueltiges Hash-Format: {e}")))?;

    match argon2_instanz()?.verify_password(geheimnis.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(CryptoError::Hashing(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashen_und_verifizieren() {
        let hash = geheimnis_hashen("secret123").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(geheimnis_verifizieren("secret123", &hash).unwrap());
    }

    #[test]
    fn falsches_geheimnis_wird_abgelehnt() {
        let hash = geheimnis_hashen("secret123").unwrap();
        assert!(!geheimnis_verifizieren("wrong", &hash).unwrap());
    }

    #[test]
    fn gleiche_geheimnisse_unterschiedliche_hashes() {
        let a = geheimnis_hashen("gleich").unwrap();
        let b = geheimnis_hashen("gleich").unwrap();
        assert_ne!(a, b, "Salt muss pro Hash neu sein");
    }

    #[test]
    fn kaputter_hash_gibt_fehler() {
        let ergebnis = geheimnis_verifizieren("egal", "kein_gueltiger_hash");
        assert!(matches!(ergebnis, Err(CryptoError::Hashing(_))));
    }
}
