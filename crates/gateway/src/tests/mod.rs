
use std::net::SocketAddr;
use std::rc::Rc;
use std::sync::Arc;

use raumchat_auth::{AuthService, SessionStore};
use raumchat_chat::{ChatKonfig, ChatService};
use raumchat_crypto::{KdfParameter, NachrichtenCipher};
use raumchat_db::{
    models::{BenutzerRecord, NeuerBenutzer, RaumRecord},
    SqliteDb, UserRepository,
};
use raumchat_protocol::{ControlMessage, ControlPayload};
use raumchat_rooms::{NeuerRaumAntrag, RaumKonfig, RoomService};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::connection::SEND_QUEUE_GROESSE;
use crate::dispatcher::{MessageDispatcher, VerbindungsKontext};
use crate::state::{GatewayKonfig, GatewayState};

pub(super) const RAUM_PASSWORT: &str = "secret123";

pub(super) struct Umgebung {
    pub db: Arc<SqliteDb>,
    pub sessions: Arc<SessionStore>,
    pub state: Rc<GatewayState<SqliteDb>>,
}

pub(super) async fn umgebung() -> Umgebung {
    let db = Arc::new(
        SqliteDb::in_memory()
            .await
            .expect("In-Memory-DB konnte nicht geoeffnet werden"),
    );
    let sessions = SessionStore::neu();

    // Guenstige KDF-Parameter damit die Tests schnell bleiben
    let cipher = NachrichtenCipher::neu(KdfParameter {
        speicher_kib: 64,
        iterationen: 1,
        parallelitaet: 1,
    })
    .expect("KDF-Parameter ungueltig");

    let state = GatewayState::neu(
        GatewayKonfig::default(),
        db.clone(),
        Arc::new(AuthService::neu(db.clone(), sessions.clone())),
        Arc::new(RoomService::neu(
            db.clone(),
            db.clone(),
            db.clone(),
            RaumKonfig::default(),
        )),
        Arc::new(ChatService::neu(db.clone(), cipher, ChatKonfig::default())),
    );

    Umgebung {
        db,
        sessions,
        state,
    }
}

impl Umgebung {
    /// Legt einen Benutzer direkt in der DB an und gibt ein gueltiges Token zurueck
    pub async fn benutzer(&self, username: &str) -> (BenutzerRecord, String) {
        let email = format!("{username}@example.org");
        let benutzer = UserRepository::create(
            self.db.as_ref(),
            NeuerBenutzer {
                username,
                email: &email,
                name: username,
                avatar: None,
                color: "#007bff",
                password_hash: "hash",
            },
        )
        .await
        .expect("User anlegen fehlgeschlagen");

        let session = self.sessions.erstellen(benutzer.id).await;
        (benutzer, session.token)
    }

    pub async fn raum(&self, ersteller: Uuid, name: &str) -> RaumRecord {
        self.state
            .rooms
            .raum_erstellen(
                ersteller,
                NeuerRaumAntrag {
                    name: name.into(),
                    description: Some(format!("Raum {name}")),
                    password: RAUM_PASSWORT.into(),
                    max_members: None,
                },
            )
            .await
            .expect("Raum erstellen fehlgeschlagen")
    }

    pub async fn online(&self, user_id: Uuid) -> BenutzerRecord {
        UserRepository::get_by_id(self.db.as_ref(), user_id)
            .await
            .unwrap()
            .expect("Benutzer fehlt")
    }

    /// Simulierte Verbindung ohne Socket: Dispatcher + eigene Queue
    pub fn verbindung(&self) -> TestVerbindung {
        let (tx, rx) = mpsc::channel(SEND_QUEUE_GROESSE);
        let id = self.state.verbindung_id_vergeben();
        let peer: SocketAddr = "127.0.0.1:40000".parse().unwrap();
        TestVerbindung {
            ctx: VerbindungsKontext::neu(id, peer, tx),
            rx,
            dispatcher: MessageDispatcher::neu(Rc::clone(&self.state)),
        }
    }
}

pub(super) struct TestVerbindung {
    pub ctx: VerbindungsKontext,
    pub rx: mpsc::Receiver<ControlMessage>,
    dispatcher: MessageDispatcher<SqliteDb>,
}

impl TestVerbindung {
    pub async fn senden(&mut self, payload: ControlPayload) -> Option<ControlPayload> {
        self.dispatcher
            .dispatch(ControlMessage::new(1, payload), &mut self.ctx)
            .await
            .map(|m| m.payload)
    }

    pub async fn trennen(&self) {
        self.dispatcher.verbindung_beendet(&self.ctx).await;
    }

    /// Alle bisher eingereihten Raum-Ereignisse
    pub fn ereignisse(&mut self) -> Vec<ControlPayload> {
        let mut alle = Vec::new();
        while let Ok(m) = self.rx.try_recv() {
            alle.push(m.payload);
        }
        alle
    }
}
