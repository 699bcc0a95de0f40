//! raumchat-api – HTTP-Schnittstelle
//!
//! REST-Endpunkte fuer Registrierung, Login, Raeume, Einladungen und den
//! Nachrichtenverlauf. Alle Endpunkte ausser Registrierung, Login und
//! `/health` verlangen `Authorization: Bearer <token>`.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

#[cfg(test)]
mod tests;

// Bequeme Re-Exporte
pub use error::{ApiError, ApiResult};
pub use server::{app, ApiKonfig, ApiServer};
pub use state::ApiState;
