//! raumchat-protocol – Echtzeit-Protokoll zwischen Client und Gateway
//!
//! Ereignistypen, Fehler-Codes und der Frame-Codec fuer TCP-Verbindungen.

pub mod control;
pub mod wire;

// Bequeme Re-Exports
pub use control::{
    BenutzerEreignis, BenutzerInfo, ConnectRequest, ConnectedResponse, ControlMessage,
    ControlPayload, ErrorCode, ErrorResponse, JoinRoomRequest, NachrichtInfo, NachrichtenArt,
    OnlineUsersEvent, PingMessage, PongMessage, RaumInfo, RoomJoinedResponse, SendMessageRequest,
    TypingRequest, UserTypingEvent,
};
pub use wire::{FrameCodec, UngueltigerFrame};
