//! raumchat-rooms – Raeume, Mitgliedschaften und Einladungen
//!
//! Dieses Crate implementiert:
//! - RoomService: Raum erstellen, Zugang erlangen und pruefen
//! - Zugangs-Zustandsmaschine (`ZugangsZustand`)
//! - Einladungen senden, annehmen, ablehnen und auflisten

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

// Bequeme Re-Exporte
pub use error::{RaumError, RaumResult};
pub use service::RoomService;
pub use types::{
    Beitritt, BeitrittsErgebnis, NeuerRaumAntrag, OffeneEinladung, RaumKonfig, ZugangsZustand,
};
