use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::debug;

use shared::domain::{Matter, MatterId, MatterStatus};

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

/// Fields accepted when a matter is created. Status may be left unset, in
/// which case the row stores NULL and reads back as `COLLECTION`.
#[derive(Debug, Clone, Default)]
pub struct NewMatter {
    pub name: String,
    pub number: Option<String>,
    pub client_name: Option<String>,
    pub status: Option<MatterStatus>,
}

const MATTER_COLUMNS: &str = "id, name, number, client_name, status, created_at, updated_at";

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // An in-memory database lives per connection, so it must not be pooled wider.
        let max_connections = if database_url.starts_with("sqlite::memory:") {
            1
        } else {
            5
        };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    pub async fn create_matter(&self, matter: &NewMatter) -> Result<MatterId> {
        let now = Utc::now();
        let rec = sqlx::query(
            "INSERT INTO matters (name, number, client_name, status, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING id",
        )
        .bind(&matter.name)
        .bind(matter.number.as_deref())
        .bind(matter.client_name.as_deref())
        .bind(matter.status.map(MatterStatus::as_str))
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .context("failed to insert matter")?;
        Ok(MatterId(rec.get::<i64, _>(0)))
    }

    pub async fn list_matters(&self) -> Result<Vec<Matter>> {
        let rows = sqlx::query(&format!("SELECT {MATTER_COLUMNS} FROM matters ORDER BY id ASC"))
            .fetch_all(&self.pool)
            .await
            .context("failed to list matters")?;
        rows.iter().map(matter_from_row).collect()
    }

    pub async fn get_matter(&self, matter_id: MatterId) -> Result<Option<Matter>> {
        let row = sqlx::query(&format!("SELECT {MATTER_COLUMNS} FROM matters WHERE id = ?"))
            .bind(matter_id.0)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("failed to load matter {matter_id}"))?;
        row.as_ref().map(matter_from_row).transpose()
    }

    /// Persists a new status for one matter. Only `status` and `updated_at`
    /// change. Returns `None` when the matter does not exist.
    pub async fn update_matter_status(
        &self,
        matter_id: MatterId,
        status: MatterStatus,
    ) -> Result<Option<Matter>> {
        let row = sqlx::query(&format!(
            "UPDATE matters SET status = ?, updated_at = ? WHERE id = ? RETURNING {MATTER_COLUMNS}"
        ))
        .bind(status.as_str())
        .bind(Utc::now())
        .bind(matter_id.0)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("failed to update status of matter {matter_id}"))?;

        if row.is_some() {
            debug!(matter_id = %matter_id, %status, "matter status persisted");
        }
        row.as_ref().map(matter_from_row).transpose()
    }
}

fn matter_from_row(row: &SqliteRow) -> Result<Matter> {
    let id = MatterId(row.try_get::<i64, _>("id")?);
    let status = match row.try_get::<Option<String>, _>("status")? {
        Some(raw) => raw
            .parse::<MatterStatus>()
            .with_context(|| format!("matter {id} has an invalid stored status"))?,
        None => MatterStatus::default(),
    };
    Ok(Matter {
        id,
        name: row.try_get("name")?,
        number: row.try_get("number")?,
        client_name: row.try_get("client_name")?,
        status,
        created_at: Some(row.try_get::<DateTime<Utc>, _>("created_at")?),
        updated_at: Some(row.try_get::<DateTime<Utc>, _>("updated_at")?),
    })
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;
    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url.starts_with("sqlite::memory:") || !database_url.starts_with("sqlite:") {
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
