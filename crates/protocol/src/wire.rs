//! Wire-Format fuer Gateway-Verbindungen
//!
//! Frame-basiertes Protokoll: Laenge (u32 big-endian) + JSON-Payload.
//!
//! ```text
//! +--------+--------+--------+--------+----...----+
//! | Laenge (u32 BE)                   | JSON       |
//! +--------+--------+--------+--------+----...----+
//! ```
//!
//! Die Laenge zaehlt nur die Payload-Bytes. Maximale Frame-Groesse ist
//! konfigurierbar (Standard: 1 MiB).
//!
//! Ein vollstaendiger Frame mit unbrauchbarem JSON beendet den Stream nicht:
//! der Decoder liefert dann `Err(UngueltigerFrame)` als Item, der Byte-Strom
//! bleibt synchron.

use bytes::{Buf, BufMut, BytesMut};
use std::io;
use tokio_util::codec::{Decoder, Encoder};

use crate::control::ControlMessage;

/// Standard-maximale Frame-Groesse (1 MiB)
pub const DEFAULT_MAX_FRAME_SIZE: usize = 1024 * 1024;

/// Groesse des Laengen-Felds in Bytes
pub const LENGTH_FIELD_SIZE: usize = 4;

fn ungueltig(meldung: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, meldung)
}

/// Vollstaendig gelesener Frame, der keine gueltige `ControlMessage` ist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UngueltigerFrame {
    /// `request_id` aus dem JSON, sofern lesbar, sonst 0
    pub request_id: u32,
    pub meldung: String,
}

impl UngueltigerFrame {
    fn aus_payload(payload: &[u8], fehler: serde_json::Error) -> Self {
        let request_id = serde_json::from_slice::<serde_json::Value>(payload)
            .ok()
            .and_then(|wert| wert.get("request_id").and_then(|id| id.as_u64()))
            .and_then(|id| u32::try_from(id).ok())
            .unwrap_or(0);

        Self {
            request_id,
            meldung: format!("Ungueltige Nachricht: {fehler}"),
        }
    }
}

// ---------------------------------------------------------------------------
// FrameCodec
// ---------------------------------------------------------------------------

/// tokio-util Codec fuer `Framed<TcpStream, FrameCodec>`
#[derive(Debug, Clone)]
pub struct FrameCodec {
    max_frame_size: usize,
}

impl FrameCodec {
    pub fn new() -> Self {
        Self::with_max_size(DEFAULT_MAX_FRAME_SIZE)
    }

    pub fn with_max_size(max_frame_size: usize) -> Self {
        Self { max_frame_size }
    }

    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }

    fn groesse_pruefen(&self, laenge: usize) -> io::Result<()> {
        if laenge > self.max_frame_size {
            return Err(ungueltig(format!(
                "Frame zu gross: {} Bytes (Maximum: {} Bytes)",
                laenge, self.max_frame_size
            )));
        }
        Ok(())
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for FrameCodec {
    type Item = Result<ControlMessage, UngueltigerFrame>;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < LENGTH_FIELD_SIZE {
            return Ok(None);
        }

        // Laenge lesen ohne den Buffer zu veraendern
        let laenge = u32::from_be_bytes([src[0], src[1], src[2], src[3]]) as usize;
        self.groesse_pruefen(laenge)?;

        let gesamt = LENGTH_FIELD_SIZE + laenge;
        if src.len() < gesamt {
            src.reserve(gesamt - src.len());
            return Ok(None);
        }

        src.advance(LENGTH_FIELD_SIZE);
        let payload = src.split_to(laenge);

        let nachricht = serde_json::from_slice::<ControlMessage>(&payload)
            .map_err(|e| UngueltigerFrame::aus_payload(&payload, e));
        Ok(Some(nachricht))
    }
}

impl Encoder<ControlMessage> for FrameCodec {
    type Error = io::Error;

    fn encode(&mut self, item: ControlMessage, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let json = serde_json::to_vec(&item)
            .map_err(|e| ungueltig(format!("JSON-Serialisierung fehlgeschlagen: {e}")))?;
        self.groesse_pruefen(json.len())?;

        dst.reserve(LENGTH_FIELD_SIZE + json.len());
        dst.put_u32(json.len() as u32);
        dst.put_slice(&json);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
