//! Server-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! sinnvolle Standardwerte, sodass der Server ohne Konfigurationsdatei
//! lauffaehig ist.

use std::net::SocketAddr;

use raumchat_chat::ChatKonfig;
use raumchat_crypto::KdfParameter;
use raumchat_db::DatabaseConfig;
use raumchat_gateway::GatewayKonfig;
use raumchat_rooms::RaumKonfig;
use serde::{Deserialize, Serialize};

/// Vollstaendige Server-Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub server: ServerEinstellungen,
    pub netzwerk: NetzwerkEinstellungen,
    pub datenbank: DatenbankEinstellungen,
    pub logging: LoggingEinstellungen,
    pub raeume: RaumEinstellungen,
    /// Schluesselableitung fuer die Nachrichten-Verschluesselung
    pub verschluesselung: VerschluesselungsEinstellungen,
    pub sitzung: SitzungsEinstellungen,
}

/// Allgemeine Server-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerEinstellungen {
    /// Anzeigename des Servers
    pub name: String,
}

impl Default for ServerEinstellungen {
    fn default() -> Self {
        Self {
            name: "Raumchat Server".into(),
        }
    }
}

/// Netzwerk-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetzwerkEinstellungen {
    pub bind_adresse: String,
    /// Port fuer das Echtzeit-Gateway (TCP, Frames)
    pub gateway_port: u16,
    /// Port fuer die REST-API
    pub api_port: u16,
    /// CORS-Origins fuer REST (leer = alle erlaubt)
    pub cors_origins: Vec<String>,
    /// Abstand der Server-Pings
    pub keepalive_sekunden: u64,
    /// Ohne eingehende Frames wird die Verbindung danach getrennt
    pub verbindungs_timeout_sekunden: u64,
}

impl Default for NetzwerkEinstellungen {
    fn default() -> Self {
        let gateway = GatewayKonfig::default();
        Self {
            bind_adresse: "127.0.0.1".into(),
            gateway_port: 3001,
            api_port: 3000,
            cors_origins: vec![],
            keepalive_sekunden: gateway.keepalive_sekunden,
            verbindungs_timeout_sekunden: gateway.verbindungs_timeout_sekunden,
        }
    }
}

/// Datenbank-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatenbankEinstellungen {
    pub url: String,
    /// Maximale Verbindungspool-Groesse
    pub max_verbindungen: u32,
}

impl Default for DatenbankEinstellungen {
    fn default() -> Self {
        let db = DatabaseConfig::default();
        Self {
            url: db.url,
            max_verbindungen: db.max_verbindungen,
        }
    }
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

/// Raum- und Verlaufseinstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RaumEinstellungen {
    pub max_mitglieder_standard: i64,
    pub einladung_gueltig_tage: i64,
    /// Anzahl Nachrichten beim Raumbeitritt
    pub verlauf_limit: i64,
    pub seiten_limit_standard: i64,
}

impl Default for RaumEinstellungen {
    fn default() -> Self {
        let raum = RaumKonfig::default();
        let chat = ChatKonfig::default();
        Self {
            max_mitglieder_standard: raum.max_mitglieder_standard,
            einladung_gueltig_tage: raum.einladung_gueltig_tage,
            verlauf_limit: chat.verlauf_limit,
            seiten_limit_standard: chat.seiten_limit_standard,
        }
    }
}

/// Argon2id-Parameter fuer die Ableitung der Nachrichtenschluessel
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerschluesselungsEinstellungen {
    pub kdf_speicher_kib: u32,
    pub kdf_iterationen: u32,
    pub kdf_parallelitaet: u32,
}

impl Default for VerschluesselungsEinstellungen {
    fn default() -> Self {
        let kdf = KdfParameter::default();
        Self {
            kdf_speicher_kib: kdf.speicher_kib,
            kdf_iterationen: kdf.iterationen,
            kdf_parallelitaet: kdf.parallelitaet,
        }
    }
}

/// Sitzungs-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SitzungsEinstellungen {
    pub gueltigkeit_stunden: i64,
}

impl Default for SitzungsEinstellungen {
    fn default() -> Self {
        Self {
            gueltigkeit_stunden: 24,
        }
    }
}

impl ServerConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    pub fn laden(pfad: &str) -> anyhow::Result<Self> {
        match std::fs::read_to_string(pfad) {
            Ok(inhalt) => {
                let config: Self = toml::from_str(&inhalt)
                    .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    pfad = pfad,
                    "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
                );
                Ok(Self::default())
            }
            Err(e) => Err(anyhow::anyhow!(
                "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
            )),
        }
    }

    pub fn gateway_bind_adresse(&self) -> anyhow::Result<SocketAddr> {
        self.adresse(self.netzwerk.gateway_port)
    }

    pub fn api_bind_adresse(&self) -> anyhow::Result<SocketAddr> {
        self.adresse(self.netzwerk.api_port)
    }

    fn adresse(&self, port: u16) -> anyhow::Result<SocketAddr> {
        let text = format!("{}:{}", self.netzwerk.bind_adresse, port);
        text.parse()
            .map_err(|e| anyhow::anyhow!("Ungueltige Bind-Adresse '{text}': {e}"))
    }

    pub fn datenbank_konfig(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.datenbank.url.clone(),
            max_verbindungen: self.datenbank.max_verbindungen,
            ..DatabaseConfig::default()
        }
    }

    pub fn gateway_konfig(&self) -> GatewayKonfig {
        GatewayKonfig {
            keepalive_sekunden: self.netzwerk.keepalive_sekunden,
            verbindungs_timeout_sekunden: self.netzwerk.verbindungs_timeout_sekunden,
        }
    }

    pub fn raum_konfig(&self) -> RaumKonfig {
        RaumKonfig {
            max_mitglieder_standard: self.raeume.max_mitglieder_standard,
            einladung_gueltig_tage: self.raeume.einladung_gueltig_tage,
        }
    }

    pub fn chat_konfig(&self) -> ChatKonfig {
        ChatKonfig {
            verlauf_limit: self.raeume.verlauf_limit,
            seiten_limit_standard: self.raeume.seiten_limit_standard,
        }
    }

    pub fn kdf_parameter(&self) -> KdfParameter {
        KdfParameter {
            speicher_kib: self.verschluesselung.kdf_speicher_kib,
            iterationen: self.verschluesselung.kdf_iterationen,
            parallelitaet: self.verschluesselung.kdf_parallelitaet,
        }
    }
}
