mod api_tests;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use raumchat_auth::{AuthService, SessionStore};
use raumchat_chat::{ChatKonfig, ChatService};
use raumchat_crypto::{KdfParameter, NachrichtenCipher};
use raumchat_db::SqliteDb;
use raumchat_rooms::{RaumKonfig, RoomService};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::{server::app, state::ApiState};

pub(super) struct Umgebung {
    pub db: Arc<SqliteDb>,
    pub state: ApiState,
    pub app: Router,
}

pub(super) async fn umgebung() -> Umgebung {
    let db = Arc::new(
        SqliteDb::in_memory()
            .await
            .expect("In-Memory-DB konnte nicht geoeffnet werden"),
    );
    let cipher = NachrichtenCipher::neu(KdfParameter {
        speicher_kib: 64,
        iterationen: 1,
        parallelitaet: 1,
    })
    .expect("KDF-Parameter ungueltig");

    let state = ApiState::neu(
        Arc::new(AuthService::neu(db.clone(), SessionStore::neu())),
        Arc::new(RoomService::neu(
            db.clone(),
            db.clone(),
            db.clone(),
            RaumKonfig::default(),
        )),
        Arc::new(ChatService::neu(db.clone(), cipher, ChatKonfig::default())),
    );
    let app = app(state.clone(), &[]);

    Umgebung { db, state, app }
}

impl Umgebung {
    /// Schickt eine Anfrage durch den Router und liefert Status + JSON-Body
    pub async fn anfrage(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let antwort = self.app.clone().oneshot(request).await.unwrap();
        let status = antwort.status();
        let bytes = axum::body::to_bytes(antwort.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    /// Registriert und meldet an; gibt das Token zurueck
    pub async fn benutzer(&self, username: &str) -> String {
        let (status, _) = self
            .anfrage(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({
                    "username": username,
                    "email": format!("{username}@example.org"),
                    "password": "passwort123",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = self
            .anfrage(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({ "username": username, "password": "passwort123" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }
}
