//! Raum-Handler – Beitritt mit Zugangspruefung, Verlauf und Praesenz

use chrono::Utc;
use raumchat_core::RoomId;
use raumchat_db::{
    models::{BenutzerRecord, RaumRecord},
    InvitationRepository, MessageRepository, RoomRepository, UserRepository,
};
use raumchat_protocol::{
    BenutzerEreignis, BenutzerInfo, ControlMessage, ControlPayload, ErrorCode, JoinRoomRequest,
    NachrichtInfo, RaumInfo, RoomJoinedResponse,
};

use crate::dispatcher::VerbindungsKontext;
use crate::handlers::online_liste_senden;
use crate::state::GatewayState;

/// Verarbeitet `join_room`
///
/// Reihenfolge: Zugang erlangen, online markieren, Verbindung binden,
/// Verlauf laden, alten Raum benachrichtigen, `room_joined` an den
/// Beitretenden, `user_joined` an die anderen und `online_users` an alle
/// im Raum. Scheitert der Verlauf, gilt wieder die vorherige Bindung.
pub async fn raum_beitreten<D>(
    request: JoinRoomRequest,
    request_id: u32,
    benutzer: &BenutzerRecord,
    ctx: &VerbindungsKontext,
    state: &GatewayState<D>,
) -> ControlMessage
where
    D: UserRepository + RoomRepository + InvitationRepository + MessageRepository + 'static,
{
    let beitritt = match state
        .rooms
        .zugang_erlangen(benutzer.id, request.room_id.inner(), request.password.as_deref())
        .await
    {
        Ok(b) => b,
        Err(e) => {
            tracing::debug!(
                user_id = %benutzer.id,
                raum_id = %request.room_id,
                fehler = %e,
                "Raumbeitritt abgelehnt"
            );
            return ControlMessage::error(request_id, e.code(), e.to_string());
        }
    };
    let raum = beitritt.raum;

    if let Err(e) = state.db.set_online(benutzer.id, true, Utc::now()).await {
        tracing::error!(user_id = %benutzer.id, fehler = %e, "Online-Status konnte nicht gespeichert werden");
        return ControlMessage::error(request_id, ErrorCode::InternalError, "Interner Fehler");
    }

    // Die Verbindung kann waehrend der Awaits getrennt worden sein
    let (info, vorher) = {
        let mut registry = state.registry.borrow_mut();
        let Some(info) = registry.eintrag(ctx.id).map(|e| e.user.clone()) else {
            tracing::debug!(verbindung = %ctx.id, "Verbindung vor dem Binden getrennt");
            return ControlMessage::error(request_id, ErrorCode::InternalError, "Verbindung getrennt");
        };
        match registry.binden(ctx.id, raum.clone()) {
            Ok(vorher) => (info, vorher),
            Err(e) => return ControlMessage::error(request_id, e.code(), e.to_string()),
        }
    };

    let neu_id = RoomId::from(raum.id);
    let erneut = vorher.as_ref().is_some_and(|alt| alt.id == raum.id);

    let verlauf = match state.chat.verlauf_laden(&raum).await {
        Ok(v) => v,
        Err(e) => {
            tracing::error!(raum_id = %raum.id, fehler = %e, "Verlauf konnte nicht geladen werden");
            state
                .registry
                .borrow_mut()
                .bindung_zuruecksetzen(ctx.id, vorher);
            return ControlMessage::error(request_id, e.code(), e.to_string());
        }
    };

    if let Some(alt) = vorher.filter(|alt| alt.id != raum.id) {
        raum_verlassen_melden(state, RoomId::from(alt.id), &info);
    }

    if !erneut {
        state.registry.borrow().an_raum_ausser_senden(
            neu_id,
            ctx.id,
            ControlMessage::ereignis(ControlPayload::UserJoined(BenutzerEreignis {
                user: info.clone(),
            })),
        );
    }
    online_liste_senden(state, neu_id);

    tracing::info!(
        verbindung = %ctx.id,
        user_id = %benutzer.id,
        raum_id = %raum.id,
        ergebnis = ?beitritt.ergebnis,
        nachrichten = verlauf.len(),
        "Raum beigetreten"
    );

    ControlMessage::new(
        request_id,
        ControlPayload::RoomJoined(RoomJoinedResponse {
            user: info,
            room: raum_info(&raum),
            messages: verlauf.into_iter().map(NachrichtInfo::from).collect(),
        }),
    )
}

fn raum_verlassen_melden<D>(
    state: &GatewayState<D>,
    raum_id: RoomId,
    user: &BenutzerInfo,
) where
    D: UserRepository + RoomRepository + InvitationRepository + MessageRepository + 'static,
{
    state.registry.borrow().an_raum_senden(
        raum_id,
        ControlMessage::ereignis(ControlPayload::UserLeft(BenutzerEreignis { user: user.clone() })),
    );
    online_liste_senden(state, raum_id);
}

pub(crate) fn raum_info(raum: &RaumRecord) -> RaumInfo {
    RaumInfo {
        id: RoomId::from(raum.id),
        name: raum.name.clone(),
        description: raum.description.clone(),
    }
}
