//! SQLite-Implementierung des MessageRepository

use sqlx::Row;
use uuid::Uuid;

use crate::error::DbError;
use crate::models::{NachrichtRecord, NeueNachricht};
use crate::repository::{DbResult, MessageRepository};
use crate::sqlite::pool::SqliteDb;
use crate::sqlite::zeilen::{
    jetzt, parse_bool, parse_datetime, parse_opt_datetime, parse_text, parse_uuid, zeitstempel,
};

const SPALTEN: &str = "id, room_id, room_name, sender_id, sender_name, sender_avatar, sender_color,
                       text, encrypted_text, message_type, edited, edited_at, created_at";

impl MessageRepository for SqliteDb {
    async fn create(&self, data: NeueNachricht<'_>) -> DbResult<NachrichtRecord> {
        let id = Uuid::new_v4();
        let now = jetzt();

        sqlx::query(
            "INSERT INTO messages
               (id, room_id, room_name, sender_id, sender_name, sender_avatar, sender_color,
                text, encrypted_text, message_type, edited, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?)",
        )
        .bind(id.to_string())
        .bind(data.room_id.to_string())
        .bind(data.room_name)
        .bind(data.sender_id.to_string())
        .bind(data.sender_name)
        .bind(data.sender_avatar)
        .bind(data.sender_color)
        .bind(data.text)
        .bind(data.encrypted_text)
        .bind(data.message_type.als_str())
        .bind(zeitstempel(&now))
        .execute(&self.pool)
        .await?;

        Ok(NachrichtRecord {
            id,
            room_id: data.room_id,
            room_name: data.room_name.to_string(),
            sender_id: data.sender_id,
            sender_name: data.sender_name.to_string(),
            sender_avatar: data.sender_avatar.map(str::to_string),
            sender_color: data.sender_color.to_string(),
            text: data.text.to_string(),
            encrypted_text: data.encrypted_text.to_string(),
            message_type: data.message_type,
            edited: false,
            edited_at: None,
            created_at: now,
        })
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<NachrichtRecord>> {
        let row = sqlx::query(&format!("SELECT {SPALTEN} FROM messages WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| row_to_nachricht(&r)).transpose()
    }

    async fn page(&self, room_id: Uuid, limit: i64, skip: i64) -> DbResult<Vec<NachrichtRecord>> {
        // Neueste zuerst laden, rowid trennt gleiche Zeitstempel
        let rows = sqlx::query(&format!(
            "SELECT {SPALTEN} FROM messages
             WHERE room_id = ?
             ORDER BY created_at DESC, rowid DESC
             LIMIT ? OFFSET ?"
        ))
        .bind(room_id.to_string())
        .bind(limit)
        .bind(skip)
        .fetch_all(&self.pool)
        .await?;

        // Chronologisch sortieren (aelteste zuerst)
        let mut records: Vec<NachrichtRecord> =
            rows.iter().map(row_to_nachricht).collect::<DbResult<_>>()?;
        records.reverse();
        Ok(records)
    }

    async fn update_text(
        &self,
        id: Uuid,
        text: &str,
        encrypted_text: &str,
    ) -> DbResult<NachrichtRecord> {
        let affected = sqlx::query(
            "UPDATE messages SET text = ?, encrypted_text = ?, edited = 1, edited_at = ?
             WHERE id = ?",
        )
        .bind(text)
        .bind(encrypted_text)
        .bind(zeitstempel(&jetzt()))
        .bind(id.to_string())
        .execute(&self.pool)
        .await?
        .rows_affected();

        if affected == 0 {
            return Err(DbError::nicht_gefunden(format!("Nachricht {id}")));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::intern("Nachricht nach Update nicht gefunden"))
    }

    async fn delete(&self, id: Uuid) -> DbResult<bool> {
        let affected = sqlx::query("DELETE FROM messages WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected > 0)
    }
}

fn row_to_nachricht(row: &sqlx::sqlite::SqliteRow) -> DbResult<NachrichtRecord> {
    Ok(NachrichtRecord {
        id: parse_uuid(row, "id")?,
        room_id: parse_uuid(row, "room_id")?,
        room_name: row.try_get("room_name")?,
        sender_id: parse_uuid(row, "sender_id")?,
        sender_name: row.try_get("sender_name")?,
        sender_avatar: row.try_get("sender_avatar")?,
        sender_color: row.try_get("sender_color")?,
        text: row.try_get("text")?,
        encrypted_text: row.try_get("encrypted_text")?,
        message_type: parse_text(row, "message_type")?,
        edited: parse_bool(row, "edited")?,
        edited_at: parse_opt_datetime(row, "edited_at")?,
        created_at: parse_datetime(row, "created_at")?,
    })
}
