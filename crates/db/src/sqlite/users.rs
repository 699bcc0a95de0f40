//! SQLite-Implementierung des UserRepository

use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use crate::error::DbError;
use crate::models::{BenutzerProfilUpdate, BenutzerRecord, NeuerBenutzer};
use crate::repository::{DbResult, UserRepository};
use crate::sqlite::pool::SqliteDb;
use crate::sqlite::zeilen::{
    ist_unique_verletzung, jetzt, parse_bool, parse_datetime, parse_opt_datetime, parse_uuid,
    zeitstempel,
};

const SPALTEN: &str = "id, username, email, name, avatar, color, password_hash,
                       is_online, last_seen, created_at";

impl UserRepository for SqliteDb {
    async fn create(&self, data: NeuerBenutzer<'_>) -> DbResult<BenutzerRecord> {
        let id = Uuid::new_v4();
        let now = jetzt();

        sqlx::query(
            "INSERT INTO users (id, username, email, name, avatar, color, password_hash, is_online, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, 0, ?)",
        )
        .bind(id.to_string())
        .bind(data.username)
        .bind(data.email)
        .bind(data.name)
        .bind(data.avatar)
        .bind(data.color)
        .bind(data.password_hash)
        .bind(zeitstempel(&now))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if ist_unique_verletzung(&e) {
                DbError::Eindeutigkeit(format!(
                    "Benutzername '{}' oder E-Mail bereits vergeben",
                    data.username
                ))
            } else {
                DbError::Sqlx(e)
            }
        })?;

        Ok(BenutzerRecord {
            id,
            username: data.username.to_string(),
            email: data.email.to_string(),
            name: data.name.to_string(),
            avatar: data.avatar.map(str::to_string),
            color: data.color.to_string(),
            password_hash: data.password_hash.to_string(),
            is_online: false,
            last_seen: None,
            created_at: now,
        })
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<BenutzerRecord>> {
        let row = sqlx::query(&format!("SELECT {SPALTEN} FROM users WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| row_to_benutzer(&r)).transpose()
    }

    async fn get_by_name(&self, username: &str) -> DbResult<Option<BenutzerRecord>> {
        let row = sqlx::query(&format!("SELECT {SPALTEN} FROM users WHERE username = ?"))
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| row_to_benutzer(&r)).transpose()
    }

    async fn update_profile(&self, id: Uuid, data: BenutzerProfilUpdate) -> DbResult<BenutzerRecord> {
        // Dynamisches UPDATE – nur gesetzte Felder aendern
        let mut sets: Vec<&str> = Vec::new();
        if data.name.is_some() {
            sets.push("name = ?");
        }
        if data.avatar.is_some() {
            sets.push("avatar = ?");
        }
        if data.color.is_some() {
            sets.push("color = ?");
        }

        if !sets.is_empty() {
            let sql = format!("UPDATE users SET {} WHERE id = ?", sets.join(", "));
            let mut q = sqlx::query(&sql);
            if let Some(ref v) = data.name {
                q = q.bind(v);
            }
            if let Some(ref v) = data.avatar {
                q = q.bind(v.as_deref());
            }
            if let Some(ref v) = data.color {
                q = q.bind(v);
            }
            let affected = q.bind(id.to_string()).execute(&self.pool).await?.rows_affected();
            if affected == 0 {
                return Err(DbError::nicht_gefunden(format!("User {id}")));
            }
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::nicht_gefunden(format!("User {id}")))
    }

    async fn set_online(&self, id: Uuid, online: bool, zeitpunkt: DateTime<Utc>) -> DbResult<()> {
        sqlx::query("UPDATE users SET is_online = ?, last_seen = ? WHERE id = ?")
            .bind(online as i64)
            .bind(zeitstempel(&zeitpunkt))
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn row_to_benutzer(row: &sqlx::sqlite::SqliteRow) -> DbResult<BenutzerRecord> {
    Ok(BenutzerRecord {
        id: parse_uuid(row, "id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        name: row.try_get("name")?,
        avatar: row.try_get("avatar")?,
        color: row.try_get("color")?,
        password_hash: row.try_get("password_hash")?,
        is_online: parse_bool(row, "is_online")?,
        last_seen: parse_opt_datetime(row, "last_seen")?,
        created_at: parse_datetime(row, "created_at")?,
    })
}
