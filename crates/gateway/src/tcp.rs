//! TCP-Listener – Bindet Socket, akzeptiert Verbindungen
//!
//! ## Concurrency-Modell
//! Die Repository-Traits verwenden async fn ohne Send-Garantie und das
//! Register liegt in einem `RefCell`. Alle Verbindungs-Tasks laufen deshalb
//! in einer `tokio::task::LocalSet` auf einem Thread. Zwischen zwei Awaits
//! laeuft ein Handler ohne Unterbrechung durch andere Verbindungen.

use std::net::SocketAddr;
use std::rc::Rc;

use raumchat_db::{InvitationRepository, MessageRepository, RoomRepository, UserRepository};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::LocalSet;

use crate::connection::ClientConnection;
use crate::error::GatewayResult;
use crate::state::GatewayState;

/// TCP-Gateway fuer das Echtzeit-Protokoll
pub struct GatewayServer<D>
where
    D: UserRepository + RoomRepository + InvitationRepository + MessageRepository + 'static,
{
    state: Rc<GatewayState<D>>,
    listener: TcpListener,
}

impl<D> GatewayServer<D>
where
    D: UserRepository + RoomRepository + InvitationRepository + MessageRepository + 'static,
{
    /// Bindet den Listener; Port 0 waehlt einen freien Port
    pub async fn binden(state: Rc<GatewayState<D>>, bind_addr: SocketAddr) -> GatewayResult<Self> {
        let listener = TcpListener::bind(bind_addr).await?;
        Ok(Self { state, listener })
    }

    pub fn lokale_adresse(&self) -> GatewayResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Akzeptiert Verbindungen bis `shutdown_rx` `true` meldet
    pub async fn starten(self, shutdown_rx: watch::Receiver<bool>) -> GatewayResult<()> {
        let local = LocalSet::new();
        let ergebnis = local.run_until(self.accept_loop(shutdown_rx)).await;

        // Verbindungs-Tasks bis zu ihrem Aufraeumen weiterlaufen lassen
        local.await;
        tracing::debug!("Alle Verbindungs-Tasks beendet");
        ergebnis
    }

    async fn accept_loop(self, mut shutdown_rx: watch::Receiver<bool>) -> GatewayResult<()> {
        tracing::info!(adresse = %self.lokale_adresse()?, "TCP-Gateway gestartet");

        loop {
            tokio::select! {
                result = self.listener.accept() => {
                    match result {
                        Ok((stream, peer_addr)) => {
                            if let Err(e) = stream.set_nodelay(true) {
                                tracing::debug!(peer = %peer_addr, fehler = %e, "TCP_NODELAY nicht gesetzt");
                            }
                            let verbindung = ClientConnection::neu(Rc::clone(&self.state), peer_addr);
                            tracing::debug!(peer = %peer_addr, verbindung = %verbindung.id(), "Verbindung akzeptiert");

                            let shutdown = shutdown_rx.clone();
                            tokio::task::spawn_local(async move {
                                verbindung.verarbeiten(stream, shutdown).await;
                            });
                        }
                        Err(e) => {
                            tracing::error!(fehler = %e, "TCP-Accept-Fehler");
                            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                        }
                    }
                }

                Ok(()) = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        tracing::info!("Gateway: Shutdown-Signal empfangen");
                        break;
                    }
                }
            }
        }

        tracing::info!("TCP-Gateway gestoppt");
        Ok(())
    }
}
