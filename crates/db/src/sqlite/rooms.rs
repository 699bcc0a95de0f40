//! SQLite-Implementierung des RoomRepository

use sqlx::{Row, SqliteConnection};
use uuid::Uuid;

use crate::error::DbError;
use crate::models::{
    MitgliedEinfuegen, MitgliedschaftRecord, MitgliedsRolle, NeuerRaum, RaumRecord, RaumUebersicht,
};
use crate::repository::{DbResult, RoomRepository};
use crate::sqlite::pool::SqliteDb;
use crate::sqlite::zeilen::{
    ist_unique_verletzung, jetzt, parse_bool, parse_datetime, parse_text, parse_uuid, zeitstempel,
};

const SPALTEN: &str = "r.id, r.name, r.description, r.creator_id, r.password_hash,
                       r.encryption_key, r.max_members, r.is_active, r.created_at";

impl RoomRepository for SqliteDb {
    async fn create(&self, data: NeuerRaum<'_>) -> DbResult<RaumRecord> {
        let id = Uuid::new_v4();
        let now = jetzt();
        let now_str = zeitstempel(&now);

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO rooms
               (id, name, description, creator_id, password_hash, encryption_key,
                max_members, is_active, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, 1, ?)",
        )
        .bind(id.to_string())
        .bind(data.name)
        .bind(data.description)
        .bind(data.creator_id.to_string())
        .bind(data.password_hash)
        .bind(data.encryption_key)
        .bind(data.max_members)
        .bind(&now_str)
        .execute(&mut *tx)
        .await?;

        // Ersteller ist immer Admin mit Zugang
        sqlx::query(
            "INSERT INTO room_members (room_id, user_id, role, has_access, joined_at)
             VALUES (?, ?, 'admin', 1, ?)",
        )
        .bind(id.to_string())
        .bind(data.creator_id.to_string())
        .bind(&now_str)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(RaumRecord {
            id,
            name: data.name.to_string(),
            description: data.description.to_string(),
            creator_id: data.creator_id,
            password_hash: data.password_hash.to_string(),
            encryption_key: data.encryption_key.to_string(),
            max_members: data.max_members,
            is_active: true,
            created_at: now,
        })
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<RaumRecord>> {
        let row = sqlx::query(&format!("SELECT {SPALTEN} FROM rooms r WHERE r.id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| row_to_raum(&r)).transpose()
    }

    async fn active_name_exists(&self, creator_id: Uuid, name: &str) -> DbResult<bool> {
        let anzahl: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM rooms WHERE creator_id = ? AND name = ? AND is_active = 1",
        )
        .bind(creator_id.to_string())
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(anzahl > 0)
    }

    async fn list_for_member(&self, user_id: Uuid) -> DbResult<Vec<RaumUebersicht>> {
        let rows = sqlx::query(&format!(
            "SELECT {SPALTEN}, m.role, m.has_access,
                    (SELECT COUNT(*) FROM room_members c WHERE c.room_id = r.id) AS member_count
             FROM rooms r
             JOIN room_members m ON m.room_id = r.id
             WHERE m.user_id = ? AND r.is_active = 1
             ORDER BY r.created_at DESC"
        ))
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|r| {
                Ok(RaumUebersicht {
                    raum: row_to_raum(r)?,
                    role: parse_text(r, "role")?,
                    has_access: parse_bool(r, "has_access")?,
                    member_count: r.try_get("member_count")?,
                })
            })
            .collect()
    }

    async fn get_membership(
        &self,
        room_id: Uuid,
        user_id: Uuid,
    ) -> DbResult<Option<MitgliedschaftRecord>> {
        let row = sqlx::query(
            "SELECT room_id, user_id, role, has_access, joined_at
             FROM room_members WHERE room_id = ? AND user_id = ?",
        )
        .bind(room_id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| row_to_mitgliedschaft(&r)).transpose()
    }

    async fn add_member(
        &self,
        room_id: Uuid,
        user_id: Uuid,
        role: MitgliedsRolle,
        has_access: bool,
    ) -> DbResult<MitgliedEinfuegen> {
        let mut conn = self.pool.acquire().await?;
        mitglied_einfuegen(&mut *conn, room_id, user_id, role, has_access).await
    }

    async fn grant_access(&self, room_id: Uuid, user_id: Uuid) -> DbResult<bool> {
        let affected = sqlx::query(
            "UPDATE room_members SET has_access = 1 WHERE room_id = ? AND user_id = ?",
        )
        .bind(room_id.to_string())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await?
        .rows_affected();
        Ok(affected > 0)
    }
}

/// Fuegt ein Mitglied ein, sofern der Raum noch Platz hat
///
/// Zaehlung und Insert sind ein einziges Statement, zwei gleichzeitige
/// Beitritte koennen die Kapazitaet also nicht gemeinsam ueberschreiten.
pub(crate) async fn mitglied_einfuegen(
    conn: &mut SqliteConnection,
    room_id: Uuid,
    user_id: Uuid,
    role: MitgliedsRolle,
    has_access: bool,
) -> DbResult<MitgliedEinfuegen> {
    let room_str = room_id.to_string();

    let ergebnis = sqlx::query(
        "INSERT INTO room_members (room_id, user_id, role, has_access, joined_at)
         SELECT ?, ?, ?, ?, ?
         WHERE (SELECT COUNT(*) FROM room_members WHERE room_id = ?)
             < (SELECT max_members FROM rooms WHERE id = ?)",
    )
    .bind(&room_str)
    .bind(user_id.to_string())
    .bind(role.als_str())
    .bind(has_access as i64)
    .bind(zeitstempel(&jetzt()))
    .bind(&room_str)
    .bind(&room_str)
    .execute(&mut *conn)
    .await;

    match ergebnis {
        Ok(r) if r.rows_affected() == 1 => Ok(MitgliedEinfuegen::Eingefuegt),
        Ok(_) => {
            // Bei vollem Raum greift die Kapazitaetsbedingung vor dem UNIQUE-Index
            let vorhanden: Option<i64> = sqlx::query_scalar(
                "SELECT 1 FROM room_members WHERE room_id = ? AND user_id = ?",
            )
            .bind(&room_str)
            .bind(user_id.to_string())
            .fetch_optional(&mut *conn)
            .await?;

            Ok(if vorhanden.is_some() {
                MitgliedEinfuegen::BereitsMitglied
            } else {
                MitgliedEinfuegen::RaumVoll
            })
        }
        Err(e) if ist_unique_verletzung(&e) => Ok(MitgliedEinfuegen::BereitsMitglied),
        Err(e) => Err(DbError::Sqlx(e)),
    }
}

fn row_to_raum(row: &sqlx::sqlite::SqliteRow) -> DbResult<RaumRecord> {
    Ok(RaumRecord {
        id: parse_uuid(row, "id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        creator_id: parse_uuid(row, "creator_id")?,
        password_hash: row.try_get("password_hash")?,
        encryption_key: row.try_get("encryption_key")?,
        max_members: row.try_get("max_members")?,
        is_active: parse_bool(row, "is_active")?,
        created_at: parse_datetime(row, "created_at")?,
    })
}

fn row_to_mitgliedschaft(row: &sqlx::sqlite::SqliteRow) -> DbResult<MitgliedschaftRecord> {
    Ok(MitgliedschaftRecord {
        room_id: parse_uuid(row, "room_id")?,
        user_id: parse_uuid(row, "user_id")?,
        role: parse_text(row, "role")?,
        has_access: parse_bool(row, "has_access")?,
        joined_at: parse_datetime(row, "joined_at")?,
    })
}
