//! Hilfsfunktionen zum Lesen von SQLite-Zeilen
//!
//! UUIDs und Zeitstempel liegen als TEXT in der Datenbank. Zeitstempel werden
//! immer im selben RFC-3339-Format (UTC, Mikrosekunden) geschrieben, damit
//! die lexikografische Sortierung der zeitlichen entspricht.

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::DbResult;

/// Formatiert einen Zeitstempel fuer die Speicherung
pub(crate) fn zeitstempel(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Aktueller Zeitpunkt, auf Mikrosekunden gekuerzt (entspricht dem gespeicherten Wert)
pub(crate) fn jetzt() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::parse_from_rfc3339(&zeitstempel(&now))
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(now)
}

pub(crate) fn parse_uuid(row: &SqliteRow, col: &str) -> DbResult<Uuid> {
    let s: String = row.try_get(col)?;
    Uuid::parse_str(&s).map_err(|e| DbError::intern(format!("Ungueltige UUID in '{col}': {e}")))
}

pub(crate) fn parse_datetime(row: &SqliteRow, col: &str) -> DbResult<DateTime<Utc>> {
    let s: String = row.try_get(col)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbError::intern(format!("Ungueltige DateTime in '{col}': {e}")))
}

pub(crate) fn parse_opt_datetime(row: &SqliteRow, col: &str) -> DbResult<Option<DateTime<Utc>>> {
    let s: Option<String> = row.try_get(col)?;
    s.as_deref()
        .map(|v| {
            DateTime::parse_from_rfc3339(v)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| DbError::intern(format!("Ungueltige DateTime in '{col}': {e}")))
        })
        .transpose()
}

/// Parst ein Text-Enum (Rolle, Status, Nachrichtentyp)
pub(crate) fn parse_text<T>(row: &SqliteRow, col: &str) -> DbResult<T>
where
    T: std::str::FromStr<Err = String>,
{
    let s: String = row.try_get(col)?;
    s.parse::<T>().map_err(DbError::UngueltigeDaten)
}

pub(crate) fn parse_bool(row: &SqliteRow, col: &str) -> DbResult<bool> {
    let v: i64 = row.try_get(col)?;
    Ok(v != 0)
}

/// Erkennt UNIQUE-Verletzungen
pub(crate) fn ist_unique_verletzung(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .map(|d| d.is_unique_violation())
        .unwrap_or(false)
}
