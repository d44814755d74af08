use anyhow::{Context, Result};
use chrono::Local;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use shared::domain::ResultId;

/// Most recent rows kept; the oldest excess rows are trimmed on every insert.
pub const RETENTION_CAP: i64 = 15;

/// Fixed, locale-independent timestamp pattern for `recorded_at`.
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredResult {
    pub id: ResultId,
    pub location_name: String,
    pub site_name: String,
    pub volume_liters: f64,
    pub volume_barrels: f64,
    pub recorded_at: String,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        let storage = Self { pool };
        storage.ensure_results_table().await?;
        Ok(storage)
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    async fn ensure_results_table(&self) -> Result<()> {
        // AUTOINCREMENT keeps ids monotonic even after trims delete old rows.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS results (
                id             INTEGER PRIMARY KEY AUTOINCREMENT,
                location_name  TEXT NOT NULL,
                site_name      TEXT NOT NULL,
                volume_liters  REAL NOT NULL,
                volume_barrels REAL NOT NULL,
                recorded_at    TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("failed to ensure results table exists")?;
        Ok(())
    }

    /// Inserts a result and trims the history to the retention cap in the same
    /// transaction, so readers never observe more than the cap.
    pub async fn insert(
        &self,
        location_name: &str,
        site_name: &str,
        volume_liters: f64,
        volume_barrels: f64,
    ) -> Result<ResultId> {
        let mut tx = self.pool.begin().await?;

        let rec = sqlx::query(
            "INSERT INTO results (location_name, site_name, volume_liters, volume_barrels, recorded_at)
             VALUES (?, ?, ?, ?, ?)
             RETURNING id",
        )
        .bind(location_name)
        .bind(site_name)
        .bind(volume_liters)
        .bind(volume_barrels)
        .bind(now_timestamp())
        .fetch_one(&mut *tx)
        .await?;
        let id = ResultId(rec.get::<i64, _>(0));

        sqlx::query(
            "DELETE FROM results
             WHERE id NOT IN (
                SELECT id FROM results
                ORDER BY id DESC
                LIMIT ?
             )",
        )
        .bind(RETENTION_CAP)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(id)
    }

    pub async fn list_all(&self) -> Result<Vec<StoredResult>> {
        let rows = sqlx::query(
            "SELECT id, location_name, site_name, volume_liters, volume_barrels, recorded_at
             FROM results
             ORDER BY id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(row_to_result).collect())
    }

    pub async fn get(&self, id: ResultId) -> Result<Option<StoredResult>> {
        let row = sqlx::query(
            "SELECT id, location_name, site_name, volume_liters, volume_barrels, recorded_at
             FROM results
             WHERE id = ?",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(row_to_result))
    }

    /// Overwrites every field except the id and refreshes the timestamp. Both
    /// volumes are taken verbatim from the caller; nothing is re-derived.
    /// Returns false when no row has the given id.
    pub async fn update(
        &self,
        id: ResultId,
        location_name: &str,
        site_name: &str,
        volume_liters: f64,
        volume_barrels: f64,
    ) -> Result<bool> {
        let updated = sqlx::query(
            "UPDATE results
             SET location_name = ?, site_name = ?, volume_liters = ?, volume_barrels = ?, recorded_at = ?
             WHERE id = ?",
        )
        .bind(location_name)
        .bind(site_name)
        .bind(volume_liters)
        .bind(volume_barrels)
        .bind(now_timestamp())
        .bind(id.0)
        .execute(&self.pool)
        .await?
        .rows_affected();
        Ok(updated > 0)
    }

    /// Returns false when no row had the given id.
    pub async fn delete(&self, id: ResultId) -> Result<bool> {
        let deleted = sqlx::query("DELETE FROM results WHERE id = ?")
            .bind(id.0)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(deleted > 0)
    }

    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM results")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

fn now_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

fn row_to_result(r: sqlx::sqlite::SqliteRow) -> StoredResult {
    StoredResult {
        id: ResultId(r.get::<i64, _>(0)),
        location_name: r.get::<String, _>(1),
        site_name: r.get::<String, _>(2),
        volume_liters: r.get::<f64, _>(3),
        volume_barrels: r.get::<f64, _>(4),
        recorded_at: r.get::<String, _>(5),
    }
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
