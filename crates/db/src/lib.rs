//! raumchat-db – Datenbank-Abstraktion
//!
//! Dieses Crate stellt das Repository-Pattern bereit. Die Services der
//! anderen Crates sind generisch ueber die Traits aus [`repository`];
//! [`SqliteDb`] implementiert alle davon.
//!
//! ```text
//!   UserRepository  RoomRepository  InvitationRepository  MessageRepository
//!         \               |                  |                   /
//!          +--------------+---- SqliteDb ----+------------------+
//!                               (sqlx, migrations/)
//! ```

pub mod error;
pub mod models;
pub mod repository;
pub mod sqlite;

pub use error::DbError;
pub use repository::{
    DatabaseConfig, DbResult, InvitationRepository, MessageRepository, RoomRepository,
    UserRepository,
};
pub use sqlite::SqliteDb;
