//! REST-Handler fuer Raeume: erstellen, auflisten, beitreten, einladen, Verlauf

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::Json,
};
use raumchat_rooms::{BeitrittsErgebnis, NeuerRaumAntrag};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::handlers::RaumAntwort;
use crate::middleware::benutzer_aus_headers;
use crate::state::ApiState;

#[derive(Debug, Deserialize)]
pub struct RaumErstellenBody {
    pub name: String,
    pub description: Option<String>,
    pub password: String,
    pub max_members: Option<i64>,
}

/// POST /api/rooms
pub async fn create_room(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(body): Json<RaumErstellenBody>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let angemeldet = benutzer_aus_headers(&headers, &state).await?;
    let raum = state
        .rooms
        .raum_erstellen(
            angemeldet.benutzer.id,
            NeuerRaumAntrag {
                name: body.name,
                description: body.description,
                password: body.password,
                max_members: body.max_members,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "room": RaumAntwort::from(&raum) })),
    ))
}

#[derive(Debug, Serialize)]
struct MeinRaum {
    #[serde(flatten)]
    raum: RaumAntwort,
    role: &'static str,
    has_access: bool,
    member_count: i64,
}

/// GET /api/rooms/mine
pub async fn my_rooms(State(state): State<ApiState>, headers: HeaderMap) -> ApiResult<Json<Value>> {
    let angemeldet = benutzer_aus_headers(&headers, &state).await?;
    let raeume: Vec<MeinRaum> = state
        .rooms
        .meine_raeume(angemeldet.benutzer.id)
        .await?
        .iter()
        .map(|u| MeinRaum {
            raum: RaumAntwort::from(&u.raum),
            role: u.role.als_str(),
            has_access: u.has_access,
            member_count: u.member_count,
        })
        .collect();

    Ok(Json(json!({ "success": true, "rooms": raeume })))
}

#[derive(Debug, Default, Deserialize)]
pub struct BeitretenBody {
    #[serde(default)]
    pub password: Option<String>,
}

/// POST /api/rooms/:id/join
pub async fn join_room(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    body: Option<Json<BeitretenBody>>,
) -> ApiResult<Json<Value>> {
    let angemeldet = benutzer_aus_headers(&headers, &state).await?;
    let body = body.map(|Json(b)| b).unwrap_or_default();

    let beitritt = state
        .rooms
        .zugang_erlangen(angemeldet.benutzer.id, id, body.password.as_deref())
        .await?;

    let ergebnis = match beitritt.ergebnis {
        BeitrittsErgebnis::BereitsZugang => "already_member",
        BeitrittsErgebnis::ZugangGewaehrt => "access_granted",
        BeitrittsErgebnis::Beigetreten => "joined",
    };

    Ok(Json(json!({
        "success": true,
        "result": ergebnis,
        "room": RaumAntwort::from(&beitritt.raum),
    })))
}

#[derive(Debug, Deserialize)]
pub struct EinladenBody {
    pub username: String,
}

/// POST /api/rooms/:id/invite
pub async fn invite(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(body): Json<EinladenBody>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let angemeldet = benutzer_aus_headers(&headers, &state).await?;
    let einladung = state
        .rooms
        .einladen(angemeldet.benutzer.id, id, &body.username)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "invitation": {
                "id": einladung.id,
                "room_id": einladung.room_id,
                "invited_user": einladung.invited_user,
                "invite_code": einladung.invite_code,
                "status": einladung.status.als_str(),
                "expires_at": einladung.expires_at,
            }
        })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct SeitenQuery {
    pub limit: Option<i64>,
    pub skip: Option<i64>,
}

/// GET /api/rooms/:id/messages?limit&skip
pub async fn room_messages(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Query(seite): Query<SeitenQuery>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    let angemeldet = benutzer_aus_headers(&headers, &state).await?;
    let raum = state.rooms.zugang_pruefen(angemeldet.benutzer.id, id).await?;
    let nachrichten = state.chat.seite_laden(&raum, seite.limit, seite.skip).await?;

    Ok(Json(json!({ "success": true, "messages": nachrichten })))
}
