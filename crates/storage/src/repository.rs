use async_trait::async_trait;
use quiz_core::model::Attempt;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Append/list store for completed quiz attempts.
///
/// Every record gets a store-assigned, monotonically increasing key that is
/// never reused and never handed back to callers. Each call is its own
/// transaction; nothing is atomic across calls.
#[async_trait]
pub trait AttemptRepository: Send + Sync {
    /// Establish the backing connection and create the schema on first use.
    ///
    /// Safe to call repeatedly; `append_attempt` and `list_attempts` call it
    /// implicitly.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the store cannot be opened.
    async fn open(&self) -> Result<(), StorageError>;

    /// Insert one attempt under a fresh key.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the attempt cannot be stored.
    async fn append_attempt(&self, attempt: &Attempt) -> Result<(), StorageError>;

    /// Fetch every stored attempt, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    async fn list_attempts(&self) -> Result<Vec<Attempt>, StorageError>;
}

#[derive(Default)]
struct InMemoryAttempts {
    next_id: i64,
    rows: Vec<(i64, Attempt)>,
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    attempts: Arc<Mutex<InMemoryAttempts>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AttemptRepository for InMemoryRepository {
    async fn open(&self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn append_attempt(&self, attempt: &Attempt) -> Result<(), StorageError> {
        let mut guard = self
            .attempts
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.next_id += 1;
        let id = guard.next_id;
        guard.rows.push((id, attempt.clone()));
        Ok(())
    }

    async fn list_attempts(&self) -> Result<Vec<Attempt>, StorageError> {
        let guard = self
            .attempts
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.rows.iter().map(|(_, a)| a.clone()).collect())
    }
}

/// Bundles the attempt repository behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub attempts: Arc<dyn AttemptRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            attempts: Arc::new(InMemoryRepository::new()),
        }
    }
}
