//! Route-Definitionen fuer die REST-API (/api/...)

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::handlers;
use crate::server::health;
use crate::state::ApiState;

/// Erstellt den vollstaendigen Router ohne Layer
pub fn api_router() -> Router<ApiState> {
    Router::new()
        .route("/health", get(health))
        // Auth
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/auth/me", get(handlers::auth::me))
        // Raeume
        .route("/api/rooms", post(handlers::raeume::create_room))
        .route("/api/rooms/mine", get(handlers::raeume::my_rooms))
        .route("/api/rooms/:id/join", post(handlers::raeume::join_room))
        .route("/api/rooms/:id/invite", post(handlers::raeume::invite))
        .route("/api/rooms/:id/messages", get(handlers::raeume::room_messages))
        // Einladungen
        .route("/api/invitations", get(handlers::einladungen::list_invitations))
        .route(
            "/api/invitations/:code/accept",
            post(handlers::einladungen::accept_invitation),
        )
        .route(
            "/api/invitations/:code/decline",
            post(handlers::einladungen::decline_invitation),
        )
        // Nachrichten
        .route(
            "/api/messages/:id",
            put(handlers::nachrichten::edit_message).delete(handlers::nachrichten::delete_message),
        )
}
