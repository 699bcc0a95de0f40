//! SQLite-Implementierung des InvitationRepository

use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use crate::error::DbError;
use crate::models::{
    EinladungRecord, EinladungsStatus, MitgliedEinfuegen, MitgliedsRolle, NeueEinladung,
};
use crate::repository::{DbResult, InvitationRepository};
use crate::sqlite::pool::SqliteDb;
use crate::sqlite::rooms::mitglied_einfuegen;
use crate::sqlite::zeilen::{
    ist_unique_verletzung, jetzt, parse_datetime, parse_text, parse_uuid, zeitstempel,
};

const SPALTEN: &str = "id, room_id, invited_by, invited_user, invite_code, status,
                       created_at, expires_at";

impl InvitationRepository for SqliteDb {
    async fn create(&self, data: NeueEinladung<'_>) -> DbResult<EinladungRecord> {
        let id = Uuid::new_v4();
        let now = jetzt();

        sqlx::query(
            "INSERT INTO room_invitations
               (id, room_id, invited_by, invited_user, invite_code, status, created_at, expires_at)
             VALUES (?, ?, ?, ?, ?, 'pending', ?, ?)",
        )
        .bind(id.to_string())
        .bind(data.room_id.to_string())
        .bind(data.invited_by.to_string())
        .bind(data.invited_user.to_string())
        .bind(data.invite_code)
        .bind(zeitstempel(&now))
        .bind(zeitstempel(&data.expires_at))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if ist_unique_verletzung(&e) {
                DbError::Eindeutigkeit(format!(
                    "Offene Einladung oder Code '{}' existiert bereits",
                    data.invite_code
                ))
            } else {
                DbError::Sqlx(e)
            }
        })?;

        Ok(EinladungRecord {
            id,
            room_id: data.room_id,
            invited_by: data.invited_by,
            invited_user: data.invited_user,
            invite_code: data.invite_code.to_string(),
            status: EinladungsStatus::Pending,
            created_at: now,
            expires_at: data.expires_at,
        })
    }

    async fn get_by_code(&self, code: &str) -> DbResult<Option<EinladungRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {SPALTEN} FROM room_invitations WHERE invite_code = ?"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| row_to_einladung(&r)).transpose()
    }

    async fn find_pending(&self, room_id: Uuid, user_id: Uuid) -> DbResult<Option<EinladungRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {SPALTEN} FROM room_invitations
             WHERE room_id = ? AND invited_user = ? AND status = 'pending'"
        ))
        .bind(room_id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| row_to_einladung(&r)).transpose()
    }

    async fn list_pending_for(
        &self,
        user_id: Uuid,
        jetzt: DateTime<Utc>,
    ) -> DbResult<Vec<EinladungRecord>> {
        let rows = sqlx::query(&format!(
            "SELECT {SPALTEN} FROM room_invitations
             WHERE invited_user = ? AND status = 'pending' AND expires_at > ?
             ORDER BY created_at DESC"
        ))
        .bind(user_id.to_string())
        .bind(zeitstempel(&jetzt))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_einladung).collect()
    }

    async fn resolve(&self, id: Uuid, status: EinladungsStatus) -> DbResult<bool> {
        let affected = sqlx::query(
            "UPDATE room_invitations SET status = ? WHERE id = ? AND status = 'pending'",
        )
        .bind(status.als_str())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?
        .rows_affected();
        Ok(affected > 0)
    }

    async fn accept(&self, einladung: &EinladungRecord) -> DbResult<MitgliedEinfuegen> {
        let mut tx = self.pool.begin().await?;

        let ergebnis = mitglied_einfuegen(
            &mut *tx,
            einladung.room_id,
            einladung.invited_user,
            MitgliedsRolle::Member,
            false,
        )
        .await?;

        if ergebnis == MitgliedEinfuegen::RaumVoll {
            tx.rollback().await?;
            return Ok(ergebnis);
        }

        let affected = sqlx::query(
            "UPDATE room_invitations SET status = 'accepted' WHERE id = ? AND status = 'pending'",
        )
        .bind(einladung.id.to_string())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if affected == 0 {
            // Zwischenzeitlich von einer anderen Anfrage erledigt
            tx.rollback().await?;
            return Err(DbError::UngueltigeDaten(format!(
                "Einladung {} ist nicht mehr offen",
                einladung.id
            )));
        }

        tx.commit().await?;
        Ok(ergebnis)
    }
}

fn row_to_einladung(row: &sqlx::sqlite::SqliteRow) -> DbResult<EinladungRecord> {
    Ok(EinladungRecord {
        id: parse_uuid(row, "id")?,
        room_id: parse_uuid(row, "room_id")?,
        invited_by: parse_uuid(row, "invited_by")?,
        invited_user: parse_uuid(row, "invited_user")?,
        invite_code: row.try_get("invite_code")?,
        status: parse_text(row, "status")?,
        created_at: parse_datetime(row, "created_at")?,
        expires_at: parse_datetime(row, "expires_at")?,
    })
}
