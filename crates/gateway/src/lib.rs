//! raumchat-gateway – Echtzeit-Gateway
//!
//! Haelt die Live-Verbindungen der Clients, ordnet sie Raeumen zu und
//! verteilt Raum-Ereignisse.
//!
//! ## Architektur
//!
//! ```text
//! TCP Listener (GatewayServer, LocalSet)
//!     |
//!     v
//! ClientConnection (pro Verbindung ein lokaler Task)
//!     |  Framed<TcpStream, FrameCodec>
//!     v
//! MessageDispatcher
//!     |
//!     +-- verbindung (connect, Trennung)
//!     +-- raum       (join_room)
//!     +-- nachricht  (send_message, typing)
//!
//! ConnectionRegistry – Verbindung -> Benutzer/Raum, Raum -> Verbindungen
//! ```
//!
//! Wenn die letzte Verbindung eines Benutzers endet gilt er als offline.

pub mod connection;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod registry;
pub mod state;
pub mod tcp;

#[cfg(test)]
mod tests;

// Bequeme Re-Exporte
pub use connection::ClientConnection;
pub use dispatcher::{MessageDispatcher, VerbindungsKontext};
pub use error::{GatewayError, GatewayResult};
pub use registry::ConnectionRegistry;
pub use state::{GatewayKonfig, GatewayState};
pub use tcp::GatewayServer;
