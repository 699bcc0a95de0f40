//! REST-Handler fuer offene Einladungen

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::Json,
};
use serde_json::{json, Value};

use crate::error::ApiResult;
use crate::handlers::RaumAntwort;
use crate::middleware::benutzer_aus_headers;
use crate::state::ApiState;

/// GET /api/invitations
pub async fn list_invitations(
    State(state): State<ApiState>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    let angemeldet = benutzer_aus_headers(&headers, &state).await?;
    let offene = state.rooms.offene_einladungen(angemeldet.benutzer.id).await?;

    let einladungen: Vec<Value> = offene
        .iter()
        .map(|o| {
            json!({
                "id": o.einladung.id,
                "invite_code": o.einladung.invite_code,
                "room_id": o.einladung.room_id,
                "room_name": o.raum_name,
                "invited_by": o.eingeladen_von,
                "created_at": o.einladung.created_at,
                "expires_at": o.einladung.expires_at,
            })
        })
        .collect();

    Ok(Json(json!({ "success": true, "invitations": einladungen })))
}

/// POST /api/invitations/:code/accept
pub async fn accept_invitation(
    State(state): State<ApiState>,
    Path(code): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    let angemeldet = benutzer_aus_headers(&headers, &state).await?;
    let raum = state
        .rooms
        .einladung_annehmen(angemeldet.benutzer.id, &code)
        .await?;

    Ok(Json(json!({ "success": true, "room": RaumAntwort::from(&raum) })))
}

/// POST /api/invitations/:code/decline
pub async fn decline_invitation(
    State(state): State<ApiState>,
    Path(code): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    let angemeldet = benutzer_aus_headers(&headers, &state).await?;
    state
        .rooms
        .einladung_ablehnen(angemeldet.benutzer.id, &code)
        .await?;

    Ok(Json(json!({ "success": true })))
}
