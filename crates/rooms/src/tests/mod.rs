
use std::sync::Arc;

use raumchat_db::{models::NeuerBenutzer, SqliteDb, UserRepository};
use uuid::Uuid;

use crate::{service::RoomService, types::RaumKonfig};

pub(super) type TestService = RoomService<SqliteDb, SqliteDb, SqliteDb>;

pub(super) async fn test_umgebung() -> (Arc<SqliteDb>, TestService) {
    let db = Arc::new(
        SqliteDb::in_memory()
            .await
            .expect("In-Memory-DB konnte nicht geoeffnet werden"),
    );
    let service = RoomService::neu(db.clone(), db.clone(), db.clone(), RaumKonfig::default());
    (db, service)
}

pub(super) async fn benutzer_anlegen(db: &SqliteDb, username: &str) -> Uuid {
    let email = format!("{username}@example.org");
    UserRepository::create(
        db,
        NeuerBenutzer {
            username,
            email: &email,
            name: username,
            avatar: None,
            color: "#007bff",
            password_hash: "hash",
        },
    )
    .await
    .expect("User anlegen fehlgeschlagen")
    .id
}
