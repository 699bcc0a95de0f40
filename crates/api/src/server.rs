//! Axum HTTP-Server fuer Raumchat

use std::net::SocketAddr;

use anyhow::Result;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Json};
use axum::Router;
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::routes::api_router;
use crate::state::ApiState;

/// REST-Server-Konfiguration
#[derive(Debug, Clone)]
pub struct ApiKonfig {
    pub bind_addr: SocketAddr,
    /// Erlaubte CORS-Origins. Leer = alle Origins erlaubt (nur fuer Entwicklung).
    pub cors_origins: Vec<String>,
}

impl Default for ApiKonfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            cors_origins: vec![],
        }
    }
}

/// Router mit Tracing- und CORS-Layer
pub fn app(state: ApiState, cors_origins: &[String]) -> Router {
    let cors = if cors_origins.is_empty() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = cors_origins.iter().filter_map(|o| o.parse().ok()).collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers(tower_http::cors::Any)
    };

    api_router()
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Axum HTTP-Server
pub struct ApiServer {
    konfig: ApiKonfig,
}

impl ApiServer {
    pub fn neu(konfig: ApiKonfig) -> Self {
        Self { konfig }
    }

    /// Laeuft bis `shutdown_rx` `true` meldet
    pub async fn starten(self, state: ApiState, mut shutdown_rx: watch::Receiver<bool>) -> Result<()> {
        let app = app(state, &self.konfig.cors_origins);

        let listener = tokio::net::TcpListener::bind(self.konfig.bind_addr).await?;
        tracing::info!(addr = %self.konfig.bind_addr, "REST-API gestartet");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                while shutdown_rx.changed().await.is_ok() {
                    if *shutdown_rx.borrow() {
                        break;
                    }
                }
            })
            .await?;

        tracing::info!("REST-API gestoppt");
        Ok(())
    }
}

/// GET /health – Health-Check-Endpunkt
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}
