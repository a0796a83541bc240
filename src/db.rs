use std::path::Path;

use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::sync_connection_wrapper::SyncConnectionWrapper;
use diesel_async::RunQueryDsl;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use crate::error::{CareTrackError, Result};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

pub type SqliteAsyncConn = SyncConnectionWrapper<SqliteConnection>;
pub type SqlitePool = Pool<SqliteAsyncConn>;
pub type SqlitePooledConn<'a> = PooledConnection<'a, SqliteAsyncConn>;

/// Shared connection pool over one SQLite file. All stores clone this handle.
#[derive(Clone)]
pub struct Db {
    pool: SqlitePool,
}

impl Db {
    pub async fn new(sqlite_path: impl AsRef<str>) -> Result<Self> {
        let sqlite_path = sqlite_path.as_ref();
        ensure_parent_dir(sqlite_path)?;
        run_migrations(sqlite_path).await?;

        let manager = AsyncDieselConnectionManager::<SqliteAsyncConn>::new(sqlite_path);
        let pool: SqlitePool = Pool::builder()
            .build(manager)
            .await
            .map_err(|e| CareTrackError::Database(e.to_string()))?;
        Ok(Self { pool })
    }

    pub async fn conn(&self) -> Result<SqlitePooledConn<'_>> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| CareTrackError::Database(e.to_string()))?;
        apply_session_pragmas(&mut conn).await?;
        Ok(conn)
    }
}

// SQLite leaves foreign keys off unless each session opts in; cascade deletes
// depend on it.
async fn apply_session_pragmas(conn: &mut SqliteAsyncConn) -> Result<()> {
    diesel::sql_query("PRAGMA foreign_keys = ON")
        .execute(conn)
        .await
        .map_err(|e| CareTrackError::Database(e.to_string()))?;
    diesel::sql_query("PRAGMA busy_timeout = 5000")
        .execute(conn)
        .await
        .map_err(|e| CareTrackError::Database(e.to_string()))?;
    Ok(())
}

fn ensure_parent_dir(path: &str) -> Result<()> {
    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| CareTrackError::Runtime(e.to_string()))?;
    }
    Ok(())
}

async fn run_migrations(database_url: &str) -> Result<()> {
    let database_url = database_url.to_string();
    tokio::task::spawn_blocking(move || {
        let mut conn = SqliteConnection::establish(&database_url)
            .map_err(|e| CareTrackError::Database(e.to_string()))?;
        conn.run_pending_migrations(MIGRATIONS)
            .map_err(|e| CareTrackError::Database(e.to_string()))?;
        Ok::<_, CareTrackError>(())
    })
    .await
    .map_err(|e| CareTrackError::Runtime(e.to_string()))??;
    Ok(())
}

pub fn now_ts() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
