//! Oeffentliche Typen fuer den Room-Service

use raumchat_db::models::{EinladungRecord, MitgliedschaftRecord, RaumRecord};

/// Grenzen und Standardwerte fuer Raeume und Einladungen
#[derive(Debug, Clone)]
pub struct RaumKonfig {
    /// Kapazitaet wenn beim Erstellen nichts angegeben wird
    pub max_mitglieder_standard: i64,
    pub einladung_gueltig_tage: i64,
}

impl Default for RaumKonfig {
    fn default() -> Self {
        Self {
            max_mitglieder_standard: 50,
            einladung_gueltig_tage: 7,
        }
    }
}

/// Erlaubter Bereich fuer `max_members`
pub const MITGLIEDER_BEREICH: std::ops::RangeInclusive<i64> = 2..=500;

pub const NAME_MAX_LAENGE: usize = 50;
pub const BESCHREIBUNG_MAX_LAENGE: usize = 200;

/// Anfrage zum Erstellen eines Raums
#[derive(Debug, Clone, Default)]
pub struct NeuerRaumAntrag {
    pub name: String,
    pub description: Option<String>,
    pub password: String,
    pub max_members: Option<i64>,
}

/// Zugangszustand eines Benutzers zu einem Raum
///
/// Wird aus der optionalen Mitgliedschaft abgeleitet. Erlaubte Uebergaenge:
///
/// ```text
/// KeinMitglied ──(richtiges Passwort)──────────> MitgliedMitZugang
/// KeinMitglied ──(Einladung angenommen)────────> MitgliedOhneZugang
/// MitgliedOhneZugang ──(richtiges Passwort)────> MitgliedMitZugang
/// ```
///
/// `MitgliedMitZugang` ist endgueltig.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZugangsZustand {
    KeinMitglied,
    MitgliedOhneZugang(MitgliedschaftRecord),
    MitgliedMitZugang(MitgliedschaftRecord),
}

impl ZugangsZustand {
    pub fn aus_mitgliedschaft(mitgliedschaft: Option<MitgliedschaftRecord>) -> Self {
        match mitgliedschaft {
            None => Self::KeinMitglied,
            Some(m) if m.has_access => Self::MitgliedMitZugang(m),
            Some(m) => Self::MitgliedOhneZugang(m),
        }
    }

    pub fn ist_mitglied(&self) -> bool {
        !matches!(self, Self::KeinMitglied)
    }

    pub fn hat_zugang(&self) -> bool {
        matches!(self, Self::MitgliedMitZugang(_))
    }
}

/// Wie der Zugang zustande kam
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeitrittsErgebnis {
    /// Zugang bestand schon, kein Passwort geprueft
    BereitsZugang,
    /// Mitglied ohne Zugang hat das Passwort eingegeben
    ZugangGewaehrt,
    /// Neues Mitglied mit Zugang
    Beigetreten,
}

/// Ergebnis von `zugang_erlangen`
#[derive(Debug, Clone)]
pub struct Beitritt {
    pub raum: RaumRecord,
    pub ergebnis: BeitrittsErgebnis,
}

/// Offene Einladung mit Raum- und Absendernamen fuer die Anzeige
#[derive(Debug, Clone)]
pub struct OffeneEinladung {
    pub einladung: EinladungRecord,
    pub raum_name: String,
    /// Anzeigename des Einladenden
    pub eingeladen_von: String,
}
