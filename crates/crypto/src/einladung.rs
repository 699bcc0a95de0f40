//! Einladungscodes
//!
//! 16 Zufallsbytes, als 32 Zeichen Hex in Grossbuchstaben.

use rand::rngs::OsRng;
use rand::RngCore;

/// Anzahl Zufallsbytes pro Code
const CODE_BYTES: usize = 16;

/// Erzeugt einen neuen Einladungscode
pub fn einladungscode_generieren() -> String {
    let mut bytes = [0u8; CODE_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode_upper(bytes)
}

/// Prueft ob ein String das Format eines Einladungscodes hat
pub fn ist_einladungscode(code: &str) -> bool {
    code.len() == CODE_BYTES * 2
        && code
            .chars()
            .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_format() {
        let code = einladungscode_generieren();
        assert_eq!(code.len(), 32);
        assert!(ist_einladungscode(&code));
    }

    #[test]
    fn codes_sind_eindeutig() {
        let codes: std::collections::HashSet<String> =
            (0..100).map(|_| einladungscode_generieren()).collect();
        assert_eq!(codes.len(), 100);
    }

    #[test]
    fn kleinbuchstaben_sind_kein_code() {
        let code = einladungscode_generieren().to_lowercase();
        // Nur relevant wenn der Code ueberhaupt Buchstaben enthaelt
        if code.chars().any(|c| c.is_ascii_alphabetic()) {
            assert!(!ist_einladungscode(&code));
        }
        assert!(!ist_einladungscode("ABC"));
    }
}
