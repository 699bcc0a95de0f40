//! Fehlertypen fuer die HTTP-Schnittstelle
//!
//! Jeder Fehler wird als `{ "success": false, "error": { "code", "message" } }`
//! mit passendem Statuscode beantwortet.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use raumchat_auth::AuthError;
use raumchat_chat::ChatError;
use raumchat_protocol::ErrorCode;
use raumchat_rooms::RaumError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authorization-Header fehlt")]
    KeinToken,

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Raum(#[from] RaumError),

    #[error(transparent)]
    Chat(#[from] ChatError),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::KeinToken => ErrorCode::Unauthenticated,
            Self::Auth(e) => match e {
                e if e.ist_nicht_authentifiziert() => ErrorCode::Unauthenticated,
                AuthError::BenutzerExistiert(_) | AuthError::UngueltigeEingabe(_) => {
                    ErrorCode::InvalidInput
                }
                _ => ErrorCode::InternalError,
            },
            Self::Raum(e) => e.code(),
            Self::Chat(e) => e.code(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.code() {
            ErrorCode::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorCode::AccessDenied => StatusCode::FORBIDDEN,
            ErrorCode::NotFound | ErrorCode::UserNotFound => StatusCode::NOT_FOUND,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        // Interne Details bleiben im Log
        let nachricht = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(fehler = %self, "Interner Fehler in der HTTP-Schnittstelle");
            "Interner Fehler".to_string()
        } else {
            self.to_string()
        };

        (
            status,
            Json(json!({
                "success": false,
                "error": { "code": code, "message": nachricht }
            })),
        )
            .into_response()
    }
}
