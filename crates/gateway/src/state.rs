//! Gemeinsamer Gateway-Zustand
//!
//! Haelt die Services und das Verbindungsregister. Der Zustand wird als
//! `Rc` zwischen den lokalen Tasks einer `LocalSet` geteilt.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use raumchat_auth::AuthService;
use raumchat_chat::ChatService;
use raumchat_core::ConnectionId;
use raumchat_db::{InvitationRepository, MessageRepository, RoomRepository, UserRepository};
use raumchat_rooms::RoomService;

use crate::registry::ConnectionRegistry;

/// Konfiguration fuer das Gateway
#[derive(Debug, Clone)]
pub struct GatewayKonfig {
    /// Abstand zwischen zwei Server-Pings
    pub keepalive_sekunden: u64,
    /// Ohne eingehendes Frame in dieser Zeit wird getrennt
    pub verbindungs_timeout_sekunden: u64,
}

impl Default for GatewayKonfig {
    fn default() -> Self {
        Self {
            keepalive_sekunden: 30,
            verbindungs_timeout_sekunden: 90,
        }
    }
}

impl GatewayKonfig {
    pub fn keepalive(&self) -> Duration {
        Duration::from_secs(self.keepalive_sekunden)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.verbindungs_timeout_sekunden)
    }
}

/// Alles was ein Verbindungs-Task braucht
///
/// `D` ist die Persistenzschicht; alle Repository-Traits werden vom
/// selben Backend bedient.
pub struct GatewayState<D>
where
    D: UserRepository + RoomRepository + InvitationRepository + MessageRepository + 'static,
{
    pub config: GatewayKonfig,
    pub db: Arc<D>,
    pub auth: Arc<AuthService<D>>,
    pub rooms: Arc<RoomService<D, D, D>>,
    pub chat: Arc<ChatService<D>>,
    /// Nur synchron ausleihen, nie ueber ein `.await` hinweg
    pub registry: RefCell<ConnectionRegistry>,
    naechste_verbindung: Cell<u64>,
}

impl<D> GatewayState<D>
where
    D: UserRepository + RoomRepository + InvitationRepository + MessageRepository + 'static,
{
    pub fn neu(
        config: GatewayKonfig,
        db: Arc<D>,
        auth: Arc<AuthService<D>>,
        rooms: Arc<RoomService<D, D, D>>,
        chat: Arc<ChatService<D>>,
    ) -> Rc<Self> {
        Rc::new(Self {
            config,
            db,
            auth,
            rooms,
            chat,
            registry: RefCell::new(ConnectionRegistry::neu()),
            naechste_verbindung: Cell::new(1),
        })
    }

    /// Vergibt die naechste fortlaufende Verbindungs-ID
    pub fn verbindung_id_vergeben(&self) -> ConnectionId {
        let id = self.naechste_verbindung.get();
        self.naechste_verbindung.set(id.wrapping_add(1));
        ConnectionId(id)
    }
}
