//! REST-Handler fuer einzelne Nachrichten (nur der Verfasser)

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::middleware::benutzer_aus_headers;
use crate::state::ApiState;

#[derive(Debug, Deserialize)]
pub struct BearbeitenBody {
    pub text: String,
}

/// PUT /api/messages/:id
pub async fn edit_message(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(body): Json<BearbeitenBody>,
) -> ApiResult<Json<Value>> {
    let angemeldet = benutzer_aus_headers(&headers, &state).await?;
    let user_id = angemeldet.benutzer.id;

    let raum_id = state.chat.raum_der_nachricht(id).await?;
    let raum = state.rooms.zugang_pruefen(user_id, raum_id).await?;
    let nachricht = state
        .chat
        .nachricht_bearbeiten(user_id, &raum, id, &body.text)
        .await?;

    Ok(Json(json!({ "success": true, "message": nachricht })))
}

/// DELETE /api/messages/:id
pub async fn delete_message(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    let angemeldet = benutzer_aus_headers(&headers, &state).await?;
    let user_id = angemeldet.benutzer.id;

    let raum_id = state.chat.raum_der_nachricht(id).await?;
    state.rooms.zugang_pruefen(user_id, raum_id).await?;
    state.chat.nachricht_loeschen(user_id, id).await?;

    Ok(Json(json!({ "success": true })))
}
