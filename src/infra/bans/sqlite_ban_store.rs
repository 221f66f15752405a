// SQLite-backed ban store.
//
// Table:
// - banlist: one row per recorded ban
//
// The schema is built by the reversible migrations under `migrations/`.
// Snowflakes are u64 but SQLite INTEGER is i64, so ids are cast both ways
// without changing their bits.

use crate::core::bans::{BanError, BanRecord, BanStore, NewBan};
use async_trait::async_trait;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};
use std::path::Path;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub struct SqliteBanStore {
    pool: Pool<Sqlite>,
}

impl SqliteBanStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Open (creating if needed) the database at `database_url` and bring the
    /// schema up to date.
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let path_str = database_url.trim_start_matches("sqlite://");
        if !database_url.contains(":memory:") {
            if let Some(parent) = Path::new(path_str).parent() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn_str = if database_url.starts_with("sqlite:") {
            database_url.to_string()
        } else {
            format!("sqlite://{}?mode=rwc", database_url)
        };

        let pool = SqlitePoolOptions::new().connect(&conn_str).await?;

        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    /// Apply every pending migration.
    pub async fn migrate(&self) -> Result<(), BanError> {
        MIGRATOR
            .run(&self.pool)
            .await
            .map_err(|e| BanError::StorageError(e.to_string()))?;
        tracing::debug!("Banlist migrations applied");
        Ok(())
    }

    /// Revert applied migrations newer than `version`. `0` reverts everything.
    #[cfg(test)]
    pub async fn revert_to(&self, version: i64) -> Result<(), BanError> {
        MIGRATOR
            .undo(&self.pool, version)
            .await
            .map_err(|e| BanError::StorageError(e.to_string()))?;
        tracing::info!(version, "Banlist migrations reverted");
        Ok(())
    }
}

#[async_trait]
impl BanStore for SqliteBanStore {
    async fn insert(&self, ban: NewBan, banned_on: u64) -> Result<BanRecord, BanError> {
        let result = sqlx::query(
            r#"
            INSERT INTO banlist (user_id, display_name, banned_by, reason, banned_on)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(ban.user_id as i64)
        .bind(ban.display_name.as_deref())
        .bind(ban.banned_by as i64)
        .bind(&ban.reason)
        .bind(banned_on as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| BanError::StorageError(e.to_string()))?;

        Ok(BanRecord {
            id: result.last_insert_rowid(),
            user_id: ban.user_id,
            display_name: ban.display_name,
            banned_by: ban.banned_by,
            reason: ban.reason,
            banned_on,
        })
    }

    async fn get(&self, id: i64) -> Result<Option<BanRecord>, BanError> {
        let row = sqlx::query("SELECT * FROM banlist WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| BanError::StorageError(e.to_string()))?;

        Ok(row.as_ref().map(row_to_record))
    }

    async fn find_by_user(&self, user_id: u64) -> Result<Vec<BanRecord>, BanError> {
        let rows = sqlx::query(
            "SELECT * FROM banlist WHERE user_id = ? ORDER BY banned_on DESC, id DESC",
        )
        .bind(user_id as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| BanError::StorageError(e.to_string()))?;

        Ok(rows.iter().map(row_to_record).collect())
    }

    async fn recent(&self, limit: u32) -> Result<Vec<BanRecord>, BanError> {
        let rows = sqlx::query("SELECT * FROM banlist ORDER BY banned_on DESC, id DESC LIMIT ?")
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| BanError::StorageError(e.to_string()))?;

        Ok(rows.iter().map(row_to_record).collect())
    }

    async fn delete(&self, id: i64) -> Result<bool, BanError> {
        let result = sqlx::query("DELETE FROM banlist WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| BanError::StorageError(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_for_user(&self, user_id: u64) -> Result<u64, BanError> {
        let result = sqlx::query("DELETE FROM banlist WHERE user_id = ?")
            .bind(user_id as i64)
            .execute(&self.pool)
            .await
            .map_err(|e| BanError::StorageError(e.to_string()))?;

        Ok(result.rows_affected())
    }
}

fn row_to_record(row: &SqliteRow) -> BanRecord {
    BanRecord {
        id: row.get("id"),
        user_id: row.get::<i64, _>("user_id") as u64,
        display_name: row.get("display_name"),
        banned_by: row.get::<i64, _>("banned_by") as u64,
        reason: row.get("reason"),
        banned_on: row.get::<i64, _>("banned_on") as u64,
    }
}
