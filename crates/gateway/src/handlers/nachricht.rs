//! Nachrichten-Handler – Chat-Nachrichten und Tipp-Indikator

use raumchat_core::RoomId;
use raumchat_db::{
    models::BenutzerRecord, InvitationRepository, MessageRepository, RoomRepository,
    UserRepository,
};
use raumchat_protocol::{
    ControlMessage, ControlPayload, NachrichtInfo, SendMessageRequest, TypingRequest,
    UserTypingEvent,
};

use crate::dispatcher::VerbindungsKontext;
use crate::error::GatewayError;
use crate::state::GatewayState;

/// Verarbeitet `send_message`
///
/// Die gespeicherte Nachricht geht als `new_message` an den ganzen Raum,
/// auch an den Absender. Nur Fehler werden direkt beantwortet.
pub async fn nachricht_senden<D>(
    request: SendMessageRequest,
    request_id: u32,
    benutzer: &BenutzerRecord,
    ctx: &VerbindungsKontext,
    state: &GatewayState<D>,
) -> Option<ControlMessage>
where
    D: UserRepository + RoomRepository + InvitationRepository + MessageRepository + 'static,
{
    let bindung = state.registry.borrow().bindung(ctx.id);
    let Some(raum) = bindung else {
        let fehler = GatewayError::NichtImRaum;
        return Some(ControlMessage::error(request_id, fehler.code(), fehler.to_string()));
    };

    match state.chat.nachricht_senden(benutzer, &raum, &request.text).await {
        Ok(nachricht) => {
            tracing::debug!(
                user_id = %benutzer.id,
                raum_id = %raum.id,
                nachricht_id = %nachricht.id,
                "Chat-Nachricht gesendet"
            );
            state.registry.borrow().an_raum_senden(
                RoomId::from(raum.id),
                ControlMessage::ereignis(ControlPayload::NewMessage(NachrichtInfo::from(
                    nachricht,
                ))),
            );
            None
        }
        Err(e) => {
            tracing::warn!(
                user_id = %benutzer.id,
                raum_id = %raum.id,
                fehler = %e,
                "Chat-Nachricht senden fehlgeschlagen"
            );
            Some(ControlMessage::error(request_id, e.code(), e.to_string()))
        }
    }
}

/// Verarbeitet `typing`; geht an alle anderen Verbindungen im Raum
pub fn tippen<D>(
    request: TypingRequest,
    request_id: u32,
    ctx: &VerbindungsKontext,
    state: &GatewayState<D>,
) -> Option<ControlMessage>
where
    D: UserRepository + RoomRepository + InvitationRepository + MessageRepository + 'static,
{
    let registry = state.registry.borrow();
    let Some(eintrag) = registry.eintrag(ctx.id) else {
        let fehler = GatewayError::NichtAuthentifiziert;
        return Some(ControlMessage::error(request_id, fehler.code(), fehler.to_string()));
    };
    let Some(raum) = &eintrag.bindung else {
        let fehler = GatewayError::NichtImRaum;
        return Some(ControlMessage::error(request_id, fehler.code(), fehler.to_string()));
    };

    registry.an_raum_ausser_senden(
        RoomId::from(raum.id),
        ctx.id,
        ControlMessage::ereignis(ControlPayload::UserTyping(UserTypingEvent {
            user: eintrag.user.clone(),
            is_typing: request.is_typing,
        })),
    );
    None
}
