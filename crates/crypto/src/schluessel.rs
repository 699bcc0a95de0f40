//! Raum-Schluessel
//!
//! Jeder Raum besitzt genau einen langlebigen symmetrischen Schluessel
//! (32 Zufallsbytes). Gespeichert wird er hex-kodiert neben den
//! Raum-Metadaten; wer die Metadaten lesen kann, kann auch die Nachrichten
//! des Raums entschluesseln.

use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::{CryptoError, CryptoResult};

/// Laenge eines Raum-Schluessels in Bytes
pub const RAUM_SCHLUESSEL_LAENGE: usize = 32;

/// Raum-Schluessel (wird beim Drop genullt)
#[derive(Clone, PartialEq, Eq)]
pub struct RaumSchluessel([u8; RAUM_SCHLUESSEL_LAENGE]);

impl RaumSchluessel {
    /// Parst einen hex-kodierten Schluessel aus der Datenbank
    pub fn aus_hex(hex_str: &str) -> CryptoResult<Self> {
        let bytes = hex::decode(hex_str)
            .map_err(|e| CryptoError::UngueltigerSchluessel(e.to_string()))?;
        let array: [u8; RAUM_SCHLUESSEL_LAENGE] = bytes.try_into().map_err(|b: Vec<u8>| {
            CryptoError::UngueltigerSchluessel(format!(
                "erwartet {RAUM_SCHLUESSEL_LAENGE} Bytes, erhalten {}",
                b.len()
            ))
        })?;
        Ok(Self(array))
    }

    /// Hex-Darstellung fuer die Speicherung
    pub fn als_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Drop for RaumSchluessel {
    fn drop(&mut self) {
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

impl std::fmt::Debug for RaumSchluessel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RaumSchluessel([REDACTED])")
    }
}

/// Erzeugt einen frischen Raum-Schluessel aus dem OS-Zufallsgenerator
pub fn raum_schluessel_generieren() -> RaumSchluessel {
    let mut bytes = [0u8; RAUM_SCHLUESSEL_LAENGE];
    OsRng.fill_bytes(&mut bytes);
    RaumSchluessel(bytes)
}
