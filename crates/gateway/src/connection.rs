//! Client-Connection – Verwaltet eine einzelne TCP-Verbindung
//!
//! Jede Verbindung laeuft als lokaler Task. Die Schleife wartet auf:
//! - eingehende Frames (an den Dispatcher)
//! - Nachrichten aus der eigenen Queue (Raum-Ereignisse vom Register)
//! - den naechsten Keepalive-Ping
//! - das Shutdown-Signal
//!
//! Beim Ende wird die Verbindung in jedem Fall ueber `trennen` aufgeraeumt.

use std::net::SocketAddr;
use std::rc::Rc;
use std::time::Instant;

use futures_util::{SinkExt, StreamExt};
use raumchat_core::ConnectionId;
use raumchat_db::{InvitationRepository, MessageRepository, RoomRepository, UserRepository};
use raumchat_protocol::{ControlMessage, ErrorCode, FrameCodec};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio_util::codec::Framed;

use crate::dispatcher::{jetzt_ms, MessageDispatcher, VerbindungsKontext};
use crate::state::GatewayState;

/// Groesse der ausgehenden Queue pro Verbindung
pub const SEND_QUEUE_GROESSE: usize = 64;

pub struct ClientConnection<D>
where
    D: UserRepository + RoomRepository + InvitationRepository + MessageRepository + 'static,
{
    state: Rc<GatewayState<D>>,
    id: ConnectionId,
    peer_addr: SocketAddr,
}

impl<D> ClientConnection<D>
where
    D: UserRepository + RoomRepository + InvitationRepository + MessageRepository + 'static,
{
    pub fn neu(state: Rc<GatewayState<D>>, peer_addr: SocketAddr) -> Self {
        let id = state.verbindung_id_vergeben();
        Self {
            state,
            id,
            peer_addr,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Laeuft bis der Client trennt, ein Fehler auftritt oder Shutdown kommt
    pub async fn verarbeiten(self, stream: TcpStream, mut shutdown_rx: watch::Receiver<bool>) {
        let peer_addr = self.peer_addr;
        let keepalive = self.state.config.keepalive();
        let timeout_dauer = self.state.config.timeout();

        tracing::info!(verbindung = %self.id, peer = %peer_addr, "Neue Verbindung");

        let mut framed = Framed::new(stream, FrameCodec::new());
        let (sende_tx, mut sende_rx) = mpsc::channel::<ControlMessage>(SEND_QUEUE_GROESSE);

        let mut ctx = VerbindungsKontext::neu(self.id, peer_addr, sende_tx);
        let dispatcher = MessageDispatcher::neu(Rc::clone(&self.state));

        let mut letzter_empfang = Instant::now();
        let mut naechster_ping = tokio::time::Instant::now() + keepalive;
        let mut ping_request_id: u32 = 0;

        loop {
            if letzter_empfang.elapsed() > timeout_dauer {
                tracing::warn!(verbindung = %self.id, peer = %peer_addr, "Verbindungs-Timeout");
                break;
            }

            tokio::select! {
                frame = framed.next() => {
                    match frame {
                        Some(Ok(Ok(nachricht))) => {
                            letzter_empfang = Instant::now();
                            tracing::trace!(
                                verbindung = %self.id,
                                request_id = nachricht.request_id,
                                "Nachricht empfangen"
                            );

                            if let Some(antwort) = dispatcher.dispatch(nachricht, &mut ctx).await {
                                if let Err(e) = framed.send(antwort).await {
                                    tracing::warn!(verbindung = %self.id, fehler = %e, "Senden fehlgeschlagen");
                                    break;
                                }
                            }
                            if ctx.schliessen {
                                break;
                            }
                        }
                        Some(Ok(Err(ungueltig))) => {
                            letzter_empfang = Instant::now();
                            tracing::debug!(
                                verbindung = %self.id,
                                request_id = ungueltig.request_id,
                                fehler = %ungueltig.meldung,
                                "Ungueltige Nachricht verworfen"
                            );

                            let antwort = ControlMessage::error(
                                ungueltig.request_id,
                                ErrorCode::InvalidRequest,
                                ungueltig.meldung,
                            );
                            if let Err(e) = framed.send(antwort).await {
                                tracing::warn!(verbindung = %self.id, fehler = %e, "Senden fehlgeschlagen");
                                break;
                            }
                        }
                        Some(Err(e)) => {
                            tracing::warn!(verbindung = %self.id, peer = %peer_addr, fehler = %e, "Frame-Lesefehler");
                            break;
                        }
                        None => {
                            tracing::info!(verbindung = %self.id, peer = %peer_addr, "Verbindung vom Client getrennt");
                            break;
                        }
                    }
                }

                Some(ausgehend) = sende_rx.recv() => {
                    if let Err(e) = framed.send(ausgehend).await {
                        tracing::warn!(verbindung = %self.id, fehler = %e, "Broadcast-Senden fehlgeschlagen");
                        break;
                    }
                }

                _ = tokio::time::sleep_until(naechster_ping) => {
                    ping_request_id = ping_request_id.wrapping_add(1);
                    if let Err(e) = framed.send(ControlMessage::ping(ping_request_id, jetzt_ms())).await {
                        tracing::warn!(verbindung = %self.id, fehler = %e, "Ping-Senden fehlgeschlagen");
                        break;
                    }
                    naechster_ping = tokio::time::Instant::now() + keepalive;
                }

                Ok(()) = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        tracing::info!(verbindung = %self.id, "Shutdown-Signal – Verbindung wird getrennt");
                        let abschied = ControlMessage::error(
                            0,
                            ErrorCode::InternalError,
                            "Server wird heruntergefahren",
                        );
                        let _ = framed.send(abschied).await;
                        break;
                    }
                }
            }
        }

        dispatcher.verbindung_beendet(&ctx).await;
        tracing::debug!(verbindung = %self.id, "Verbindungs-Task beendet");
    }
}
