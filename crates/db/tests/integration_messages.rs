//! Integration-Tests fuer MessageRepository (In-Memory SQLite)

use raumchat_db::{
    models::{NachrichtenTyp, NeueNachricht, NeuerBenutzer, NeuerRaum},
    DbError, MessageRepository, RoomRepository, SqliteDb, UserRepository,
};
use uuid::Uuid;

struct Umgebung {
    db: SqliteDb,
    sender: Uuid,
    raum: Uuid,
}

async fn umgebung() -> Umgebung {
    let db = SqliteDb::in_memory()
        .await
        .expect("In-Memory DB konnte nicht erstellt werden");
    let sender = UserRepository::create(
        &db,
        NeuerBenutzer {
            username: "alice",
            email: "alice@example.org",
            name: "Alice",
            avatar: Some("https://example.org/a.png"),
            color: "#007bff",
            password_hash: "hash",
        },
    )
    .await
    .unwrap()
    .id;
    let raum = RoomRepository::create(
        &db,
        NeuerRaum {
            name: "general",
            description: "",
            creator_id: sender,
            password_hash: "h",
            encryption_key: "00",
            max_members: 50,
        },
    )
    .await
    .unwrap()
    .id;
    Umgebung { db, sender, raum }
}

async fn senden(u: &Umgebung, text: &str) -> Uuid {
    MessageRepository::create(
        &u.db,
        NeueNachricht {
            room_id: u.raum,
            room_name: "general",
            sender_id: u.sender,
            sender_name: "Alice",
            sender_avatar: Some("https://example.org/a.png"),
            sender_color: "#007bff",
            text,
            encrypted_text: "verschluesselt",
            message_type: NachrichtenTyp::Text,
        },
    )
    .await
    .unwrap()
    .id
}

#[tokio::test]
async fn nachricht_speichern_und_laden() {
    let u = umgebung().await;
    let id = senden(&u, "Hallo").await;

    let geladen = MessageRepository::get_by_id(&u.db, id).await.unwrap().unwrap();
    assert_eq!(geladen.text, "Hallo");
    assert_eq!(geladen.sender_name, "Alice");
    assert_eq!(geladen.room_name, "general");
    assert_eq!(geladen.message_type, NachrichtenTyp::Text);
    assert!(!geladen.edited);
}

#[tokio::test]
async fn seite_ist_chronologisch() {
    let u = umgebung().await;
    for i in 0..5 {
        senden(&u, &format!("n{i}")).await;
    }

    let letzte_drei = MessageRepository::page(&u.db, u.raum, 3, 0).await.unwrap();
    let texte: Vec<&str> = letzte_drei.iter().map(|n| n.text.as_str()).collect();
    assert_eq!(texte, vec!["n2", "n3", "n4"]);

    let davor = MessageRepository::page(&u.db, u.raum, 3, 3).await.unwrap();
    let texte: Vec<&str> = davor.iter().map(|n| n.text.as_str()).collect();
    assert_eq!(texte, vec!["n0", "n1"]);
}

#[tokio::test]
async fn nachricht_bearbeiten() {
    let u = umgebung().await;
    let id = senden(&u, "Tippfeler").await;

    let bearbeitet = MessageRepository::update_text(&u.db, id, "Tippfehler", "neu_verschluesselt")
        .await
        .unwrap();
    assert!(bearbeitet.edited);
    assert!(bearbeitet.edited_at.is_some());
    assert_eq!(bearbeitet.text, "Tippfehler");
    assert_eq!(bearbeitet.encrypted_text, "neu_verschluesselt");

    let err = MessageRepository::update_text(&u.db, Uuid::new_v4(), "x", "y")
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::NichtGefunden(_)));
}

#[tokio::test]
async fn nachricht_loeschen() {
    let u = umgebung().await;
    let id = senden(&u, "weg damit").await;

    assert!(MessageRepository::delete(&u.db, id).await.unwrap());
    assert!(MessageRepository::get_by_id(&u.db, id).await.unwrap().is_none());
    assert!(!MessageRepository::delete(&u.db, id).await.unwrap());
}
