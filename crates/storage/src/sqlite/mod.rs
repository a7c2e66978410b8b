use std::sync::Arc;
use std::time::Duration;

use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use thiserror::Error;
use tokio::sync::OnceCell;

use crate::repository::{AttemptRepository, Storage};

mod attempt_repo;
mod mapping;
mod migrate;

/// `SQLite`-backed attempt store.
///
/// The pool is created on first use and then shared by every clone for the
/// rest of the process.
#[derive(Clone)]
pub struct SqliteRepository {
    database_url: Arc<str>,
    pool: Arc<OnceCell<SqlitePool>>,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SqliteInitError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl SqliteRepository {
    /// Point at `database_url` without connecting yet.
    #[must_use]
    pub fn lazy(database_url: impl Into<String>) -> Self {
        let database_url: String = database_url.into();
        Self {
            database_url: Arc::from(database_url),
            pool: Arc::new(OnceCell::new()),
        }
    }

    /// Connect to `SQLite` using the given URL and apply migrations.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if the connection cannot be established or the
    /// schema cannot be created.
    pub async fn connect(database_url: &str) -> Result<Self, SqliteInitError> {
        let repo = Self::lazy(database_url);
        repo.pool().await?;
        Ok(repo)
    }

    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    /// True once the pool has been created.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.pool.initialized()
    }

    /// Shared pool, connecting and migrating on the first call.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if connecting or migrating fails. A failed
    /// attempt leaves the repository closed so the next call retries.
    pub async fn pool(&self) -> Result<&SqlitePool, SqliteInitError> {
        self.pool
            .get_or_try_init(|| async {
                let pool = open_pool(&self.database_url).await?;
                migrate::run_migrations(&pool).await?;
                tracing::debug!(url = %self.database_url, "attempt store opened");
                Ok::<_, SqliteInitError>(pool)
            })
            .await
    }
}

async fn open_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    // Every connection to a plain `:memory:` URL is a separate database.
    let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };
    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                sqlx::query("PRAGMA journal_mode = WAL;")
                    .execute(&mut *conn)
                    .await?;
                sqlx::query("PRAGMA busy_timeout = 5000;")
                    .execute(&mut *conn)
                    .await?;
                Ok(())
            })
        })
        .connect(database_url)
        .await
}

impl Storage {
    /// Build a `Storage` backed by `SQLite`. Nothing is opened until the first
    /// repository call.
    #[must_use]
    pub fn sqlite(database_url: &str) -> Self {
        let repo: Arc<dyn AttemptRepository> = Arc::new(SqliteRepository::lazy(database_url));
        Self { attempts: repo }
    }
}
