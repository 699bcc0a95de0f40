//! Integration-Tests fuer InvitationRepository (In-Memory SQLite)

use chrono::{Duration, Utc};
use raumchat_db::{
    models::{
        EinladungsStatus, MitgliedEinfuegen, MitgliedsRolle, NeueEinladung, NeuerBenutzer,
        NeuerRaum,
    },
    DbError, InvitationRepository, RoomRepository, SqliteDb, UserRepository,
};
use uuid::Uuid;

async fn db() -> SqliteDb {
    SqliteDb::in_memory()
        .await
        .expect("In-Memory DB konnte nicht erstellt werden")
}

async fn erstelle_user(db: &SqliteDb, name: &str) -> Uuid {
    let email = format!("{name}@example.org");
    UserRepository::create(
        db,
        NeuerBenutzer {
            username: name,
            email: &email,
            name,
            avatar: None,
            color: "#007bff",
            password_hash: "hash",
        },
    )
    .await
    .unwrap()
    .id
}

async fn erstelle_raum(db: &SqliteDb, ersteller: Uuid, max: i64) -> Uuid {
    RoomRepository::create(
        db,
        NeuerRaum {
            name: "general",
            description: "",
            creator_id: ersteller,
            password_hash: "raum_hash",
            encryption_key: "00",
            max_members: max,
        },
    )
    .await
    .unwrap()
    .id
}

async fn einladen(db: &SqliteDb, raum: Uuid, von: Uuid, an: Uuid, code: &str) -> DbResultEinladung {
    InvitationRepository::create(
        db,
        NeueEinladung {
            room_id: raum,
            invited_by: von,
            invited_user: an,
            invite_code: code,
            expires_at: Utc::now() + Duration::days(7),
        },
    )
    .await
}

type DbResultEinladung = Result<raumchat_db::models::EinladungRecord, DbError>;

#[tokio::test]
async fn einladung_erstellen_und_laden() {
    let db = db().await;
    let alice = erstelle_user(&db, "alice").await;
    let bob = erstelle_user(&db, "bob").await;
    let raum = erstelle_raum(&db, alice, 50).await;

    let einladung = einladen(&db, raum, alice, bob, "CODE0001").await.unwrap();
    assert_eq!(einladung.status, EinladungsStatus::Pending);

    let per_code = InvitationRepository::get_by_code(&db, "CODE0001")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(per_code.id, einladung.id);
    assert_eq!(per_code.invited_user, bob);

    let offen = InvitationRepository::find_pending(&db, raum, bob).await.unwrap();
    assert_eq!(offen.map(|e| e.id), Some(einladung.id));
}

#[tokio::test]
async fn nur_eine_offene_einladung_pro_paar() {
    let db = db().await;
    let alice = erstelle_user(&db, "alice").await;
    let bob = erstelle_user(&db, "bob").await;
    let raum = erstelle_raum(&db, alice, 50).await;

    einladen(&db, raum, alice, bob, "CODE0001").await.unwrap();
    let err = einladen(&db, raum, alice, bob, "CODE0002").await.unwrap_err();
    assert!(matches!(err, DbError::Eindeutigkeit(_)));
}

#[tokio::test]
async fn abgelehnte_einladung_erlaubt_neue() {
    let db = db().await;
    let alice = erstelle_user(&db, "alice").await;
    let bob = erstelle_user(&db, "bob").await;
    let raum = erstelle_raum(&db, alice, 50).await;

    let erste = einladen(&db, raum, alice, bob, "CODE0001").await.unwrap();
    assert!(InvitationRepository::resolve(&db, erste.id, EinladungsStatus::Declined)
        .await
        .unwrap());

    // Endzustaende wechseln nicht mehr
    assert!(!InvitationRepository::resolve(&db, erste.id, EinladungsStatus::Accepted)
        .await
        .unwrap());

    einladen(&db, raum, alice, bob, "CODE0002").await.unwrap();
}

#[tokio::test]
async fn annehmen_fuegt_mitglied_ohne_zugang_ein() {
    let db = db().await;
    let alice = erstelle_user(&db, "alice").await;
    let bob = erstelle_user(&db, "bob").await;
    let raum = erstelle_raum(&db, alice, 50).await;
    let einladung = einladen(&db, raum, alice, bob, "CODE0001").await.unwrap();

    let ergebnis = InvitationRepository::accept(&db, &einladung).await.unwrap();
    assert_eq!(ergebnis, MitgliedEinfuegen::Eingefuegt);

    let mitglied = RoomRepository::get_membership(&db, raum, bob).await.unwrap().unwrap();
    assert!(!mitglied.has_access);

    let geladen = InvitationRepository::get_by_code(&db, "CODE0001")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(geladen.status, EinladungsStatus::Accepted);

    // Zweites Annehmen derselben Einladung scheitert
    assert!(InvitationRepository::accept(&db, &einladung).await.is_err());
}

#[tokio::test]
async fn annehmen_bei_vollem_raum_laesst_einladung_offen() {
    let db = db().await;
    let alice = erstelle_user(&db, "alice").await;
    let bob = erstelle_user(&db, "bob").await;
    let raum = erstelle_raum(&db, alice, 1).await;
    let einladung = einladen(&db, raum, alice, bob, "CODE0001").await.unwrap();

    let ergebnis = InvitationRepository::accept(&db, &einladung).await.unwrap();
    assert_eq!(ergebnis, MitgliedEinfuegen::RaumVoll);

    let geladen = InvitationRepository::get_by_code(&db, "CODE0001")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(geladen.status, EinladungsStatus::Pending);
    assert!(RoomRepository::get_membership(&db, raum, bob).await.unwrap().is_none());
}

#[tokio::test]
async fn annehmen_als_mitglied_eines_vollen_raums() {
    let db = db().await;
    let alice = erstelle_user(&db, "alice").await;
    let bob = erstelle_user(&db, "bob").await;
    let raum = erstelle_raum(&db, alice, 2).await;
    let einladung = einladen(&db, raum, alice, bob, "CODE0001").await.unwrap();
    RoomRepository::add_member(&db, raum, bob, MitgliedsRolle::Member, true)
        .await
        .unwrap();

    let ergebnis = InvitationRepository::accept(&db, &einladung).await.unwrap();
    assert_eq!(ergebnis, MitgliedEinfuegen::BereitsMitglied);

    let geladen = InvitationRepository::get_by_code(&db, "CODE0001")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(geladen.status, EinladungsStatus::Accepted);
}

#[tokio::test]
async fn offene_einladungen_ohne_abgelaufene() {
    let db = db().await;
    let alice = erstelle_user(&db, "alice").await;
    let bob = erstelle_user(&db, "bob").await;
    let raum_a = erstelle_raum(&db, alice, 50).await;
    let raum_b = RoomRepository::create(
        &db,
        NeuerRaum {
            name: "alt",
            description: "",
            creator_id: alice,
            password_hash: "h",
            encryption_key: "00",
            max_members: 50,
        },
    )
    .await
    .unwrap()
    .id;

    einladen(&db, raum_a, alice, bob, "AKTUELL1").await.unwrap();
    InvitationRepository::create(
        &db,
        NeueEinladung {
            room_id: raum_b,
            invited_by: alice,
            invited_user: bob,
            invite_code: "ABGELAUFEN",
            expires_at: Utc::now() - Duration::hours(1),
        },
    )
    .await
    .unwrap();

    let offen = InvitationRepository::list_pending_for(&db, bob, Utc::now())
        .await
        .unwrap();
    assert_eq!(offen.len(), 1);
    assert_eq!(offen[0].invite_code, "AKTUELL1");
}
