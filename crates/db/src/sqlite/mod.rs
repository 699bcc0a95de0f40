//! SQLite-Backend-Implementierungen fuer alle Repository-Traits

pub mod invitations;
pub mod messages;
pub mod pool;
pub mod rooms;
pub mod users;
pub(crate) mod zeilen;

pub use pool::SqliteDb;
