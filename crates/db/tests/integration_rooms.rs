//! Integration-Tests fuer RoomRepository (In-Memory SQLite)

use raumchat_db::{
    models::{MitgliedEinfuegen, MitgliedsRolle, NeuerBenutzer, NeuerRaum},
    RoomRepository, SqliteDb, UserRepository,
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
            color: "#28a745",
            password_hash: "hash",
        },
    )
    .await
    .unwrap()
    .id
}

async fn erstelle_raum(db: &SqliteDb, ersteller: Uuid, name: &str, max: i64) -> Uuid {
    RoomRepository::create(
        db,
        NeuerRaum {
            name,
            description: "Testraum",
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

#[tokio::test]
async fn ersteller_ist_admin_mit_zugang() {
    let db = db().await;
    let alice = erstelle_user(&db, "alice").await;
    let raum_id = erstelle_raum(&db, alice, "general", 50).await;

    let raum = RoomRepository::get_by_id(&db, raum_id).await.unwrap().unwrap();
    assert_eq!(raum.name, "general");
    assert!(raum.is_active);
    assert_eq!(raum.max_members, 50);

    let mitglied = RoomRepository::get_membership(&db, raum_id, alice)
        .await
        .unwrap()
        .expect("Ersteller muss Mitglied sein");
    assert_eq!(mitglied.role, MitgliedsRolle::Admin);
    assert!(mitglied.has_access);
    let raeume = RoomRepository::list_for_member(&db, alice).await.unwrap();
    assert_eq!(raeume[0].member_count, 1);
}

#[tokio::test]
async fn aktiver_name_pro_ersteller() {
    let db = db().await;
    let alice = erstelle_user(&db, "alice").await;
    let bob = erstelle_user(&db, "bob").await;
    erstelle_raum(&db, alice, "general", 50).await;

    assert!(RoomRepository::active_name_exists(&db, alice, "general").await.unwrap());
    assert!(!RoomRepository::active_name_exists(&db, bob, "general").await.unwrap());
    assert!(!RoomRepository::active_name_exists(&db, alice, "random").await.unwrap());
}

#[tokio::test]
async fn mitglied_hinzufuegen_und_zugang_gewaehren() {
    let db = db().await;
    let alice = erstelle_user(&db, "alice").await;
    let bob = erstelle_user(&db, "bob").await;
    let raum_id = erstelle_raum(&db, alice, "general", 50).await;

    let ergebnis = RoomRepository::add_member(&db, raum_id, bob, MitgliedsRolle::Member, false)
        .await
        .unwrap();
    assert_eq!(ergebnis, MitgliedEinfuegen::Eingefuegt);

    let mitglied = RoomRepository::get_membership(&db, raum_id, bob).await.unwrap().unwrap();
    assert!(!mitglied.has_access);

    assert!(RoomRepository::grant_access(&db, raum_id, bob).await.unwrap());
    let mitglied = RoomRepository::get_membership(&db, raum_id, bob).await.unwrap().unwrap();
    assert!(mitglied.has_access);

    // Zweiter Insert erzeugt keine doppelte Mitgliedschaft
    let nochmal = RoomRepository::add_member(&db, raum_id, bob, MitgliedsRolle::Member, true)
        .await
        .unwrap();
    assert_eq!(nochmal, MitgliedEinfuegen::BereitsMitglied);
    let raeume = RoomRepository::list_for_member(&db, bob).await.unwrap();
    assert_eq!(raeume[0].member_count, 2);
}

#[tokio::test]
async fn kapazitaet_wird_beim_insert_geprueft() {
    let db = db().await;
    let alice = erstelle_user(&db, "alice").await;
    let bob = erstelle_user(&db, "bob").await;
    let carol = erstelle_user(&db, "carol").await;
    let raum_id = erstelle_raum(&db, alice, "klein", 2).await;

    let b = RoomRepository::add_member(&db, raum_id, bob, MitgliedsRolle::Member, true)
        .await
        .unwrap();
    assert_eq!(b, MitgliedEinfuegen::Eingefuegt);

    let c = RoomRepository::add_member(&db, raum_id, carol, MitgliedsRolle::Member, true)
        .await
        .unwrap();
    assert_eq!(c, MitgliedEinfuegen::RaumVoll);
    assert!(RoomRepository::get_membership(&db, raum_id, carol).await.unwrap().is_none());
}

#[tokio::test]
async fn voller_raum_meldet_bestehende_mitgliedschaft() {
    let db = db().await;
    let alice = erstelle_user(&db, "alice").await;
    let bob = erstelle_user(&db, "bob").await;
    let raum_id = erstelle_raum(&db, alice, "klein", 2).await;
    RoomRepository::add_member(&db, raum_id, bob, MitgliedsRolle::Member, true)
        .await
        .unwrap();

    // Raum ist voll, bob ist aber schon drin
    let nochmal = RoomRepository::add_member(&db, raum_id, bob, MitgliedsRolle::Member, true)
        .await
        .unwrap();
    assert_eq!(nochmal, MitgliedEinfuegen::BereitsMitglied);
}

#[tokio::test]
async fn raeume_eines_mitglieds_auflisten() {
    let db = db().await;
    let alice = erstelle_user(&db, "alice").await;
    let bob = erstelle_user(&db, "bob").await;
    let r1 = erstelle_raum(&db, alice, "eins", 50).await;
    erstelle_raum(&db, alice, "zwei", 50).await;
    RoomRepository::add_member(&db, r1, bob, MitgliedsRolle::Member, false)
        .await
        .unwrap();

    let von_alice = RoomRepository::list_for_member(&db, alice).await.unwrap();
    assert_eq!(von_alice.len(), 2);
    assert!(von_alice.iter().all(|r| r.role == MitgliedsRolle::Admin && r.has_access));

    let von_bob = RoomRepository::list_for_member(&db, bob).await.unwrap();
    assert_eq!(von_bob.len(), 1);
    assert_eq!(von_bob[0].raum.id, r1);
    assert_eq!(von_bob[0].member_count, 2);
    assert!(!von_bob[0].has_access);
}

#[tokio::test]
async fn zugang_ohne_mitgliedschaft_aendert_nichts() {
    let db = db().await;
    let alice = erstelle_user(&db, "alice").await;
    let raum_id = erstelle_raum(&db, alice, "general", 50).await;

    assert!(!RoomRepository::grant_access(&db, raum_id, Uuid::new_v4()).await.unwrap());
}
