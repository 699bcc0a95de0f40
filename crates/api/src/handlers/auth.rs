//! REST-Handler fuer Registrierung, Login und Logout

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Json,
};
use raumchat_auth::Registrierung;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiResult;
use crate::handlers::BenutzerAntwort;
use crate::middleware::benutzer_aus_headers;
use crate::state::ApiState;

#[derive(Debug, Deserialize)]
pub struct RegistrierenBody {
    pub username: String,
    pub email: String,
    pub password: String,
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub color: Option<String>,
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<ApiState>,
    Json(body): Json<RegistrierenBody>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let benutzer = state
        .auth
        .registrieren(Registrierung {
            username: body.username,
            email: body.email,
            passwort: body.password,
            name: body.name,
            avatar: body.avatar,
            color: body.color,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "user": BenutzerAntwort::from(&benutzer) })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub username: String,
    pub password: String,
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<ApiState>,
    Json(body): Json<LoginBody>,
) -> ApiResult<Json<Value>> {
    let (benutzer, session) = state.auth.anmelden(&body.username, &body.password).await?;

    Ok(Json(json!({
        "success": true,
        "token": session.token,
        "expires_at": session.laeuft_ab_am,
        "user": BenutzerAntwort::from(&benutzer),
    })))
}

/// POST /api/auth/logout
pub async fn logout(State(state): State<ApiState>, headers: HeaderMap) -> ApiResult<Json<Value>> {
    let angemeldet = benutzer_aus_headers(&headers, &state).await?;
    state.auth.abmelden(&angemeldet.token).await;
    Ok(Json(json!({ "success": true })))
}

/// GET /api/auth/me
pub async fn me(State(state): State<ApiState>, headers: HeaderMap) -> ApiResult<Json<Value>> {
    let angemeldet = benutzer_aus_headers(&headers, &state).await?;
    Ok(Json(json!({
        "success": true,
        "user": BenutzerAntwort::from(&angemeldet.benutzer),
    })))
}
