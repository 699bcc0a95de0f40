//! Axum-State fuer die HTTP-Schnittstelle

use std::sync::Arc;

use raumchat_auth::AuthService;
use raumchat_chat::ChatService;
use raumchat_db::SqliteDb;
use raumchat_rooms::RoomService;

/// Geteilte Services; Clone kopiert nur die Arcs
///
/// Axum verlangt `Send`-Futures, deshalb arbeitet der State mit dem
/// konkreten SQLite-Backend statt generisch ueber die Repository-Traits.
#[derive(Clone)]
pub struct ApiState {
    pub auth: Arc<AuthService<SqliteDb>>,
    pub rooms: Arc<RoomService<SqliteDb, SqliteDb, SqliteDb>>,
    pub chat: Arc<ChatService<SqliteDb>>,
}

impl ApiState {
    pub fn neu(
        auth: Arc<AuthService<SqliteDb>>,
        rooms: Arc<RoomService<SqliteDb, SqliteDb, SqliteDb>>,
        chat: Arc<ChatService<SqliteDb>>,
    ) -> Self {
        Self { auth, rooms, chat }
    }
}
