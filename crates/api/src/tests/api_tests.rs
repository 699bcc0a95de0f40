//! Tests fuer die REST-Endpunkte ueber `tower::ServiceExt::oneshot`

use axum::http::{Method, StatusCode};
use raumchat_db::{RoomRepository, UserRepository};
use serde_json::{json, Value};
use uuid::Uuid;

use super::{umgebung, Umgebung};

const RAUM_PASSWORT: &str = "secret123";

fn fehlercode(body: &Value) -> &str {
    assert_eq!(body["success"], false);
    body["error"]["code"].as_str().unwrap_or_default()
}

async fn raum_erstellen(env: &Umgebung, token: &str, name: &str) -> String {
    let (status, body) = env
        .anfrage(
            Method::POST,
            "/api/rooms",
            Some(token),
            Some(json!({ "name": name, "description": "Testraum", "password": RAUM_PASSWORT })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    body["room"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_check() {
    let env = umgebung().await;
    let (status, body) = env.anfrage(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn registrieren_anmelden_abmelden() {
    let env = umgebung().await;
    let token = env.benutzer("alice").await;

    // Doppelte Registrierung
    let (status, body) = env
        .anfrage(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({ "username": "alice", "email": "x@example.org", "password": "passwort123" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(fehlercode(&body), "INVALID_INPUT");

    let (status, body) = env
        .anfrage(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": "alice", "password": "falsch" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(fehlercode(&body), "UNAUTHENTICATED");

    let (status, body) = env.anfrage(Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "alice");
    assert!(body["user"].get("password_hash").is_none());

    let (status, _) = env.anfrage(Method::POST, "/api/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = env.anfrage(Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn ohne_token_nicht_authentifiziert() {
    let env = umgebung().await;

    let (status, body) = env.anfrage(Method::GET, "/api/rooms/mine", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(fehlercode(&body), "UNAUTHENTICATED");

    let (status, _) = env
        .anfrage(Method::GET, "/api/invitations", Some("kein_gueltiger_token"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn einladung_und_passwort_beitritt() {
    let env = umgebung().await;
    let alice = env.benutzer("alice").await;
    let bob = env.benutzer("bob").await;
    let raum_id = raum_erstellen(&env, &alice, "general").await;
    let join = format!("/api/rooms/{raum_id}/join");

    // Nicht-Mitglied ohne Passwort
    let (status, body) = env.anfrage(Method::POST, &join, Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(fehlercode(&body), "ACCESS_DENIED");

    let (status, body) = env
        .anfrage(
            Method::POST,
            &format!("/api/rooms/{raum_id}/invite"),
            Some(&alice),
            Some(json!({ "username": "bob" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["invitation"]["status"], "pending");

    let (status, body) = env.anfrage(Method::GET, "/api/invitations", Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    let einladungen = body["invitations"].as_array().unwrap();
    assert_eq!(einladungen.len(), 1);
    assert_eq!(einladungen[0]["room_name"], "general");
    assert_eq!(einladungen[0]["invited_by"], "alice");
    let code = einladungen[0]["invite_code"].as_str().unwrap().to_string();

    let annehmen = format!("/api/invitations/{code}/accept");
    let (status, body) = env.anfrage(Method::POST, &annehmen, Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["room"]["id"], raum_id.as_str());

    // Mitglied ohne Zugang: Passwort noetig
    let (status, body) = env.anfrage(Method::POST, &join, Some(&bob), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(fehlercode(&body), "INVALID_PASSWORD");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap_or_default()
        .contains("erforderlich"));

    let (status, body) = env
        .anfrage(Method::POST, &join, Some(&bob), Some(json!({ "password": "falsch" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(fehlercode(&body), "INVALID_PASSWORD");

    let (status, body) = env
        .anfrage(Method::POST, &join, Some(&bob), Some(json!({ "password": RAUM_PASSWORT })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "access_granted");

    let (status, body) = env.anfrage(Method::GET, "/api/rooms/mine", Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rooms"][0]["has_access"], true);
    assert_eq!(body["rooms"][0]["member_count"], 2);
    assert_eq!(body["rooms"][0]["role"], "member");

    // Angenommene Einladung ist erledigt
    let (status, body) = env.anfrage(Method::POST, &annehmen, Some(&bob), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(fehlercode(&body), "INVITATION_RESOLVED");
}

#[tokio::test]
async fn verlauf_nur_mit_zugang() {
    let env = umgebung().await;
    let alice = env.benutzer("alice").await;
    let bob = env.benutzer("bob").await;
    let raum_id = raum_erstellen(&env, &alice, "general").await;
    let verlauf = format!("/api/rooms/{raum_id}/messages?limit=10");

    let (status, _) = env.anfrage(Method::GET, &verlauf, Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = env.anfrage(Method::GET, &verlauf, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["messages"].as_array().unwrap().is_empty());

    let unbekannt = format!("/api/rooms/{}/messages", Uuid::new_v4());
    let (status, body) = env.anfrage(Method::GET, &unbekannt, Some(&alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(fehlercode(&body), "NOT_FOUND");
}

#[tokio::test]
async fn nachricht_bearbeiten_und_loeschen() {
    let env = umgebung().await;
    let alice = env.benutzer("alice").await;
    let bob = env.benutzer("bob").await;
    let raum_id = raum_erstellen(&env, &alice, "general").await;

    let (status, _) = env
        .anfrage(
            Method::POST,
            &format!("/api/rooms/{raum_id}/join"),
            Some(&bob),
            Some(json!({ "password": RAUM_PASSWORT })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // Nachricht direkt ueber den ChatService anlegen
    let absender = UserRepository::get_by_name(env.db.as_ref(), "alice")
        .await
        .unwrap()
        .unwrap();
    let raum = RoomRepository::get_by_id(env.db.as_ref(), raum_id.parse().unwrap())
        .await
        .unwrap()
        .unwrap();
    let nachricht = env
        .state
        .chat
        .nachricht_senden(&absender, &raum, "Erste Fassung")
        .await
        .unwrap();
    let pfad = format!("/api/messages/{}", nachricht.id);

    // Nur der Verfasser darf bearbeiten
    let (status, _) = env
        .anfrage(Method::PUT, &pfad, Some(&bob), Some(json!({ "text": "gekapert" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = env
        .anfrage(Method::PUT, &pfad, Some(&alice), Some(json!({ "text": "Zweite Fassung" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"]["text"], "Zweite Fassung");
    assert_eq!(body["message"]["edited"], true);

    let verlauf = format!("/api/rooms/{raum_id}/messages");
    let (_, body) = env.anfrage(Method::GET, &verlauf, Some(&bob), None).await;
    assert_eq!(body["messages"][0]["text"], "Zweite Fassung");

    let (status, _) = env.anfrage(Method::DELETE, &pfad, Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = env.anfrage(Method::DELETE, &pfad, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = env.anfrage(Method::GET, &verlauf, Some(&alice), None).await;
    assert!(body["messages"].as_array().unwrap().is_empty());

    let (status, _) = env.anfrage(Method::DELETE, &pfad, Some(&alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
