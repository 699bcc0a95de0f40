//! Verbindungs-Handler – Authentifizierung und Trennung
//!
//! `authentifizieren` ist der einzige Handler, der ohne angemeldeten
//! Benutzer laeuft. `trennen` wird vom Verbindungs-Task beim Ende der
//! Verbindung aufgerufen und darf beliebig oft laufen.

use chrono::Utc;
use raumchat_chat::benutzer_info;
use raumchat_core::{ConnectionId, RoomId};
use raumchat_db::{InvitationRepository, MessageRepository, RoomRepository, UserRepository};
use raumchat_protocol::{
    BenutzerEreignis, ConnectRequest, ConnectedResponse, ControlMessage, ControlPayload, ErrorCode,
};

use crate::dispatcher::VerbindungsKontext;
use crate::handlers::online_liste_senden;
use crate::state::GatewayState;

/// Prueft das Session-Token und registriert die Verbindung
///
/// Bei einem Fehler wird die Verbindung nach der Antwort geschlossen.
pub async fn authentifizieren<D>(
    request: ConnectRequest,
    request_id: u32,
    ctx: &mut VerbindungsKontext,
    state: &GatewayState<D>,
) -> ControlMessage
where
    D: UserRepository + RoomRepository + InvitationRepository + MessageRepository + 'static,
{
    match state.auth.session_validieren(&request.token).await {
        Ok(benutzer) => {
            let info = benutzer_info(&benutzer);
            state
                .registry
                .borrow_mut()
                .registrieren(ctx.id, info.clone(), ctx.sender.clone());

            tracing::info!(
                verbindung = %ctx.id,
                peer = %ctx.peer_addr,
                user_id = %benutzer.id,
                "Verbindung authentifiziert"
            );
            ctx.benutzer = Some(benutzer);

            ControlMessage::new(
                request_id,
                ControlPayload::Connected(ConnectedResponse { user: info }),
            )
        }
        Err(e) => {
            tracing::warn!(
                verbindung = %ctx.id,
                peer = %ctx.peer_addr,
                fehler = %e,
                "Authentifizierung fehlgeschlagen"
            );
            ctx.schliessen = true;

            let code = if e.ist_nicht_authentifiziert() {
                ErrorCode::Unauthenticated
            } else {
                ErrorCode::InternalError
            };
            ControlMessage::error(request_id, code, e.to_string())
        }
    }
}

/// Raeumt eine beendete Verbindung auf
///
/// Entfernt sie aus dem Register, markiert den Benutzer offline falls es
/// seine letzte Verbindung war und benachrichtigt den bisherigen Raum.
/// Fehler der Persistenz werden nur geloggt.
pub async fn trennen<D>(conn: ConnectionId, state: &GatewayState<D>)
where
    D: UserRepository + RoomRepository + InvitationRepository + MessageRepository + 'static,
{
    let (eintrag, weitere_verbindung) = {
        let mut registry = state.registry.borrow_mut();
        let Some(eintrag) = registry.entfernen(conn) else {
            return;
        };
        let weitere = registry.hat_verbindung(eintrag.user.id);
        (eintrag, weitere)
    };

    if let Some(raum) = &eintrag.bindung {
        let raum_id = RoomId::from(raum.id);
        state.registry.borrow().an_raum_senden(
            raum_id,
            ControlMessage::ereignis(ControlPayload::UserLeft(BenutzerEreignis {
                user: eintrag.user.clone(),
            })),
        );
        online_liste_senden(state, raum_id);
    }

    if !weitere_verbindung {
        let user_id = eintrag.user.id.inner();
        if let Err(e) = state.db.set_online(user_id, false, Utc::now()).await {
            tracing::error!(user_id = %user_id, fehler = %e, "Offline-Status konnte nicht gespeichert werden");
        }
    }

    tracing::info!(
        verbindung = %conn,
        user_id = %eintrag.user.id,
        raum_id = ?eintrag.bindung.as_ref().map(|r| r.id),
        "Verbindung getrennt"
    );
}
