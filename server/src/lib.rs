//! raumchat-server – Bibliotheks-Root
//!
//! Verdrahtet Datenbank, Dienste, REST-API und Echtzeit-Gateway.

pub mod config;

use std::sync::Arc;

use anyhow::Result;
use config::ServerConfig;
use raumchat_api::{ApiKonfig, ApiServer, ApiState};
use raumchat_auth::{AuthService, SessionStore};
use raumchat_chat::ChatService;
use raumchat_crypto::NachrichtenCipher;
use raumchat_db::SqliteDb;
use raumchat_gateway::{GatewayServer, GatewayState};
use raumchat_rooms::RoomService;
use tokio::sync::watch;

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Startet alle Subsysteme und laeuft bis zum Shutdown-Signal
    ///
    /// Reihenfolge:
    /// 1. Datenbank oeffnen und migrieren
    /// 2. Dienste aufbauen (Auth, Raeume, Chat)
    /// 3. REST-API als eigenen Task starten
    /// 4. Gateway im aktuellen Task betreiben bis Ctrl-C
    pub async fn starten(self) -> Result<()> {
        let config = self.config;
        let gateway_addr = config.gateway_bind_adresse()?;
        let api_addr = config.api_bind_adresse()?;

        tracing::info!(
            server_name = %config.server.name,
            gateway = %gateway_addr,
            api = %api_addr,
            "Server startet"
        );

        let db = Arc::new(SqliteDb::oeffnen(&config.datenbank_konfig()).await?);

        let sessions =
            SessionStore::mit_gueltigkeit(chrono::Duration::hours(config.sitzung.gueltigkeit_stunden));
        let cleanup = SessionStore::cleanup_starten(&sessions);

        let cipher = NachrichtenCipher::neu(config.kdf_parameter())?;
        let auth = Arc::new(AuthService::neu(db.clone(), sessions));
        let rooms = Arc::new(RoomService::neu(
            db.clone(),
            db.clone(),
            db.clone(),
            config.raum_konfig(),
        ));
        let chat = Arc::new(ChatService::neu(db.clone(), cipher, config.chat_konfig()));

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let api = ApiServer::neu(ApiKonfig {
            bind_addr: api_addr,
            cors_origins: config.netzwerk.cors_origins.clone(),
        });
        let api_state = ApiState::neu(auth.clone(), rooms.clone(), chat.clone());
        let api_handle = tokio::spawn(api.starten(api_state, shutdown_rx.clone()));

        let gateway_state =
            GatewayState::neu(config.gateway_konfig(), db.clone(), auth, rooms, chat);
        let gateway = GatewayServer::binden(gateway_state, gateway_addr).await?;

        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => tracing::info!("Shutdown-Signal empfangen, Server wird beendet"),
                Err(e) => tracing::error!(fehler = %e, "Ctrl-C-Handler fehlgeschlagen"),
            }
            let _ = shutdown_tx.send(true);
        });

        tracing::info!("Server laeuft. Warte auf Shutdown-Signal (Ctrl-C)...");
        let gateway_ergebnis = gateway.starten(shutdown_rx).await;

        match api_handle.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!(fehler = %e, "REST-API beendet mit Fehler"),
            Err(e) => tracing::error!(fehler = %e, "REST-API-Task abgebrochen"),
        }
        cleanup.abort();
        db.schliessen().await;

        gateway_ergebnis?;
        tracing::info!("Server gestoppt");
        Ok(())
    }
}
