//! Handler fuer die Ereignisse des Echtzeit-Protokolls
//!
//! Jeder Handler bekommt den Verbindungskontext und den gemeinsamen
//! GatewayState. Antworten an den Absender werden zurueckgegeben,
//! Raum-Ereignisse laufen ueber das Verbindungsregister.

pub mod nachricht;
pub mod raum;
pub mod verbindung;

use raumchat_core::RoomId;
use raumchat_db::{InvitationRepository, MessageRepository, RoomRepository, UserRepository};
use raumchat_protocol::{ControlMessage, ControlPayload, OnlineUsersEvent};

use crate::state::GatewayState;

/// Sendet die aktuelle Online-Liste an alle Verbindungen im Raum
pub(crate) fn online_liste_senden<D>(state: &GatewayState<D>, raum_id: RoomId)
where
    D: UserRepository + RoomRepository + InvitationRepository + MessageRepository + 'static,
{
    let registry = state.registry.borrow();
    let users = registry.online_benutzer(raum_id);
    registry.an_raum_senden(
        raum_id,
        ControlMessage::ereignis(ControlPayload::OnlineUsers(OnlineUsersEvent { users })),
    );
}
