use std::{fs, path::Path, str::FromStr};

use anyhow::{Context, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use tracing::warn;

use shared::domain::Session;

const KEY_TOKEN: &str = "token";
const KEY_EMAIL: &str = "subject_email";

/// Durable client-side session store backed by a sqlite key-value table.
///
/// The store survives process restarts so a reload never forces
/// re-authentication. It is written only by the session controller; the
/// gateway and boot-time initialization read it.
#[derive(Clone)]
pub struct SessionStore {
    pool: Pool<Sqlite>,
}

impl SessionStore {
    pub async fn open(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(connect_options)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS session_kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .context("failed to ensure session_kv table exists")?;

        Ok(Self { pool })
    }

    /// Current session. Never fails outward: a storage error is logged and
    /// reported as the unauthenticated session.
    pub async fn load(&self) -> Session {
        match self.try_load().await {
            Ok(session) => session,
            Err(err) => {
                warn!("session load failed, treating as unauthenticated: {err}");
                Session::default()
            }
        }
    }

    async fn try_load(&self) -> Result<Session> {
        let rows = sqlx::query("SELECT key, value FROM session_kv WHERE key IN (?1, ?2)")
            .bind(KEY_TOKEN)
            .bind(KEY_EMAIL)
            .fetch_all(&self.pool)
            .await?;

        let mut session = Session::default();
        for row in rows {
            let key: String = row.try_get("key")?;
            let value: String = row.try_get("value")?;
            match key.as_str() {
                KEY_TOKEN => session.token = Some(value),
                KEY_EMAIL => session.subject_email = Some(value),
                _ => {}
            }
        }
        Ok(session)
    }

    /// Persists token and email together; both or neither are present.
    pub async fn save(&self, token: &str, subject_email: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for (key, value) in [(KEY_TOKEN, token), (KEY_EMAIL, subject_email)] {
            sqlx::query(
                "INSERT INTO session_kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value=excluded.value",
            )
            .bind(key)
            .bind(value)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await.context("failed to persist session")?;
        Ok(())
    }

    pub async fn clear(&self) -> Result<()> {
        sqlx::query("DELETE FROM session_kv WHERE key IN (?1, ?2)")
            .bind(KEY_TOKEN)
            .bind(KEY_EMAIL)
            .execute(&self.pool)
            .await
            .context("failed to clear session")?;
        Ok(())
    }
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return Ok(());
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();
    if path.is_empty() {
        return Ok(());
    }

    let Some(parent) = Path::new(path).parent() else {
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

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
