//! Echtzeit-Protokoll des Gateways
//!
//! Definiert alle Ereignisse die ueber die TCP-Verbindung zwischen Client
//! und Gateway ausgetauscht werden.
//!
//! ## Design
//! - Jede Nachricht traegt eine `request_id: u32`, Antworten spiegeln sie
//! - Server-initiierte Ereignisse (Broadcasts) verwenden `request_id = 0`
//! - Tagged Enum mit `type`-Feld, Payload-Felder liegen flach daneben

use chrono::{DateTime, Utc};
use raumchat_core::{MessageId, RoomId, UserId};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Fehler-Codes
// ---------------------------------------------------------------------------

/// Standardisierte Fehler-Codes fuer `error`-Ereignisse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Allgemein
    InternalError,
    InvalidRequest,
    InvalidInput,
    NotFound,
    // Authentifizierung
    Unauthenticated,
    AccessDenied,
    // Raumzugang
    InvalidPassword,
    RoomFull,
    NotInRoom,
    AlreadyMember,
    DuplicateRoomName,
    // Einladungen
    UserNotFound,
    InvitationExpired,
    InvitationResolved,
    DuplicateInvitation,
}

impl ErrorCode {
    /// Textdarstellung wie auf dem Draht (z.B. `ROOM_FULL`)
    pub fn als_str(&self) -> &'static str {
        match self {
            Self::InternalError => "INTERNAL_ERROR",
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::InvalidInput => "INVALID_INPUT",
            Self::NotFound => "NOT_FOUND",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::AccessDenied => "ACCESS_DENIED",
            Self::InvalidPassword => "INVALID_PASSWORD",
            Self::RoomFull => "ROOM_FULL",
            Self::NotInRoom => "NOT_IN_ROOM",
            Self::AlreadyMember => "ALREADY_MEMBER",
            Self::DuplicateRoomName => "DUPLICATE_ROOM_NAME",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::InvitationExpired => "INVITATION_EXPIRED",
            Self::InvitationResolved => "INVITATION_RESOLVED",
            Self::DuplicateInvitation => "DUPLICATE_INVITATION",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.als_str())
    }
}

// ---------------------------------------------------------------------------
// Gemeinsame Strukturen
// ---------------------------------------------------------------------------

/// Oeffentliche Sicht auf einen Benutzer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenutzerInfo {
    pub id: UserId,
    pub username: String,
    /// Anzeigename
    pub name: String,
    pub avatar: Option<String>,
    pub color: String,
}

/// Oeffentliche Sicht auf einen Raum (ohne Schluessel und Passwort)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaumInfo {
    pub id: RoomId,
    pub name: String,
    pub description: String,
}

/// Art einer Chat-Nachricht
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NachrichtenArt {
    Text,
    System,
    Invitation,
}

/// Entschluesselte Nachricht wie sie an Clients geht
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NachrichtInfo {
    pub id: MessageId,
    pub text: String,
    pub user: BenutzerInfo,
    pub timestamp: DateTime<Utc>,
    pub edited: bool,
    pub message_type: NachrichtenArt,
}

// ---------------------------------------------------------------------------
// Client -> Gateway
// ---------------------------------------------------------------------------

/// Anmeldung am Gateway mit dem Bearer-Token aus dem HTTP-Login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectRequest {
    pub token: String,
}

/// Raum betreten; Passwort nur noetig solange kein Zugang besteht
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRoomRequest {
    pub room_id: RoomId,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypingRequest {
    pub is_typing: bool,
}

// ---------------------------------------------------------------------------
// Gateway -> Client
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectedResponse {
    pub user: BenutzerInfo,
}

/// Bestaetigung des Beitritts inklusive Verlauf (chronologisch)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomJoinedResponse {
    pub user: BenutzerInfo,
    pub room: RaumInfo,
    pub messages: Vec<NachrichtInfo>,
}

/// Ereignis das einen einzelnen Benutzer betrifft (`user_joined`, `user_left`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenutzerEreignis {
    pub user: BenutzerInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnlineUsersEvent {
    pub users: Vec<BenutzerInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserTypingEvent {
    pub user: BenutzerInfo,
    pub is_typing: bool,
}

/// Ping (Client -> Gateway oder Gateway -> Client)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PingMessage {
    /// Unix-Timestamp in Millisekunden
    pub timestamp_ms: u64,
}

/// Pong-Antwort (spiegelt Timestamp zurueck)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PongMessage {
    pub echo_timestamp_ms: u64,
    pub server_timestamp_ms: u64,
}

/// Fehler-Ereignis, geht nur an die ausloesende Verbindung
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Haupt-Enum
// ---------------------------------------------------------------------------

/// Alle Ereignisse des Echtzeit-Protokolls
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlPayload {
    // Sitzung
    Connect(ConnectRequest),
    Connected(ConnectedResponse),
    Disconnect,

    // Raum
    JoinRoom(JoinRoomRequest),
    RoomJoined(RoomJoinedResponse),
    UserJoined(BenutzerEreignis),
    UserLeft(BenutzerEreignis),
    OnlineUsers(OnlineUsersEvent),

    // Chat
    SendMessage(SendMessageRequest),
    NewMessage(NachrichtInfo),
    Typing(TypingRequest),
    UserTyping(UserTypingEvent),

    // Keepalive
    Ping(PingMessage),
    Pong(PongMessage),

    Error(ErrorResponse),
}

// ---------------------------------------------------------------------------
// Umschlag
// ---------------------------------------------------------------------------

/// Protokoll-Nachricht mit Request/Response-Zuordnung
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlMessage {
    pub request_id: u32,
    pub payload: ControlPayload,
}

impl ControlMessage {
    pub fn new(request_id: u32, payload: ControlPayload) -> Self {
        Self {
            request_id,
            payload,
        }
    }

    /// Server-initiiertes Ereignis ohne zugehoerige Anfrage
    pub fn ereignis(payload: ControlPayload) -> Self {
        Self::new(0, payload)
    }

    pub fn ping(request_id: u32, timestamp_ms: u64) -> Self {
        Self::new(request_id, ControlPayload::Ping(PingMessage { timestamp_ms }))
    }

    pub fn pong(request_id: u32, echo_timestamp_ms: u64, server_timestamp_ms: u64) -> Self {
        Self::new(
            request_id,
            ControlPayload::Pong(PongMessage {
                echo_timestamp_ms,
                server_timestamp_ms,
            }),
        )
    }

    pub fn error(request_id: u32, code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(
            request_id,
            ControlPayload::Error(ErrorResponse {
                code,
                message: message.into(),
            }),
        )
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
