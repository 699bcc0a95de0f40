//! Message-Dispatcher – Routet ControlMessages an die richtigen Handler
//!
//! ## Zustandspruefung
//! - Vor einem erfolgreichen `connect` wird jedes Ereignis ausser `connect`
//!   (und eingehenden `pong`s) mit `UNAUTHENTICATED` beantwortet.
//! - Schlaegt `connect` fehl, wird die Verbindung nach der Antwort geschlossen.
//! - Ereignisse die nur der Server sendet werden mit `INVALID_REQUEST` abgelehnt.

use std::net::SocketAddr;
use std::rc::Rc;

use raumchat_core::ConnectionId;
use raumchat_db::{
    models::BenutzerRecord, InvitationRepository, MessageRepository, RoomRepository,
    UserRepository,
};
use raumchat_protocol::{ControlMessage, ControlPayload};
use tokio::sync::mpsc;

use crate::error::GatewayError;
use crate::handlers::{nachricht, raum, verbindung};
use crate::state::GatewayState;

/// Zustand einer einzelnen Verbindung, gehoert dem Verbindungs-Task
pub struct VerbindungsKontext {
    pub id: ConnectionId,
    pub peer_addr: SocketAddr,
    /// Angemeldeter Benutzer (None bis `connect` erfolgreich war)
    pub benutzer: Option<BenutzerRecord>,
    /// Eigene ausgehende Queue; wird beim `connect` im Register hinterlegt
    pub sender: mpsc::Sender<ControlMessage>,
    /// Vom Dispatcher gesetzt wenn die Verbindung enden soll
    pub schliessen: bool,
}

impl VerbindungsKontext {
    pub fn neu(
        id: ConnectionId,
        peer_addr: SocketAddr,
        sender: mpsc::Sender<ControlMessage>,
    ) -> Self {
        Self {
            id,
            peer_addr,
            benutzer: None,
            sender,
            schliessen: false,
        }
    }
}

/// Zentraler Message-Dispatcher
pub struct MessageDispatcher<D>
where
    D: UserRepository + RoomRepository + InvitationRepository + MessageRepository + 'static,
{
    state: Rc<GatewayState<D>>,
}

impl<D> MessageDispatcher<D>
where
    D: UserRepository + RoomRepository + InvitationRepository + MessageRepository + 'static,
{
    pub fn neu(state: Rc<GatewayState<D>>) -> Self {
        Self { state }
    }

    /// Verarbeitet eine eingehende ControlMessage
    ///
    /// Gibt die direkte Antwort an den Absender zurueck, oder `None` wenn
    /// das Ergebnis nur ueber das Register verteilt wird.
    pub async fn dispatch(
        &self,
        message: ControlMessage,
        ctx: &mut VerbindungsKontext,
    ) -> Option<ControlMessage> {
        let request_id = message.request_id;

        // -------------------------------------------------------------------
        // Ohne Anmeldung erlaubt
        // -------------------------------------------------------------------
        let payload = match message.payload {
            ControlPayload::Connect(req) => {
                if ctx.benutzer.is_some() {
                    return Some(fehler(request_id, &GatewayError::protokoll("Bereits verbunden")));
                }
                return Some(verbindung::authentifizieren(req, request_id, ctx, &self.state).await);
            }
            ControlPayload::Pong(_) => {
                tracing::trace!(verbindung = %ctx.id, "Pong empfangen");
                return None;
            }
            andere => andere,
        };

        let Some(benutzer) = ctx.benutzer.clone() else {
            return Some(fehler(request_id, &GatewayError::NichtAuthentifiziert));
        };

        // -------------------------------------------------------------------
        // Nach Anmeldung
        // -------------------------------------------------------------------
        match payload {
            ControlPayload::JoinRoom(req) => {
                Some(raum::raum_beitreten(req, request_id, &benutzer, ctx, &self.state).await)
            }
            ControlPayload::SendMessage(req) => {
                nachricht::nachricht_senden(req, request_id, &benutzer, ctx, &self.state).await
            }
            ControlPayload::Typing(req) => nachricht::tippen(req, request_id, ctx, &self.state),
            ControlPayload::Ping(ping) => Some(ControlMessage::pong(
                request_id,
                ping.timestamp_ms,
                jetzt_ms(),
            )),
            ControlPayload::Disconnect => {
                tracing::debug!(verbindung = %ctx.id, "Client meldet sich ab");
                ctx.schliessen = true;
                None
            }
            andere => {
                tracing::debug!(verbindung = %ctx.id, payload = ?andere, "Unerwartetes Ereignis");
                Some(fehler(
                    request_id,
                    &GatewayError::protokoll("Ereignis wird nur vom Server gesendet"),
                ))
            }
        }
    }

    /// Aufraeumen nach dem Ende der Verbindung
    pub async fn verbindung_beendet(&self, ctx: &VerbindungsKontext) {
        verbindung::trennen(ctx.id, &self.state).await;
    }
}

fn fehler(request_id: u32, e: &GatewayError) -> ControlMessage {
    ControlMessage::error(request_id, e.code(), e.to_string())
}

/// Unix-Zeit in Millisekunden fuer Ping/Pong
pub(crate) fn jetzt_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
