//! Bearer-Authentifizierung fuer die HTTP-Handler

use axum::http::HeaderMap;
use raumchat_db::models::BenutzerRecord;

use crate::error::{ApiError, ApiResult};
use crate::state::ApiState;

/// Extrahiert Bearer-Token aus Authorization-Header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Angemeldeter Benutzer samt Token
pub struct Angemeldet {
    pub benutzer: BenutzerRecord,
    pub token: String,
}

/// Prueft das Bearer-Token gegen den Session-Store
pub async fn benutzer_aus_headers(headers: &HeaderMap, state: &ApiState) -> ApiResult<Angemeldet> {
    let token = bearer_token(headers).ok_or(ApiError::KeinToken)?;
    let benutzer = state.auth.session_validieren(token).await?;
    Ok(Angemeldet {
        benutzer,
        token: token.to_string(),
    })
}
