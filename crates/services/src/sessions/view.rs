use chrono::{DateTime, Utc};
use std::sync::Arc;

use quiz_core::model::Attempt;
use storage::repository::AttemptRepository;

use crate::error::SessionError;

/// Presentation-agnostic list item for a stored attempt.
///
/// No pre-formatted strings; the UI formats the timestamp as it likes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptListItem {
    pub completed_at: DateTime<Utc>,
    pub score: u32,
    pub total_questions: u32,
    pub percent_correct: u32,
}

impl AttemptListItem {
    #[must_use]
    pub fn from_attempt(attempt: &Attempt) -> Self {
        Self {
            completed_at: attempt.completed_at(),
            score: attempt.score(),
            total_questions: attempt.total_questions(),
            percent_correct: attempt.percent_correct(),
        }
    }
}

/// Aggregate figures over the whole attempt history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HistorySummary {
    pub attempts: usize,
    pub best_score: Option<u32>,
}

impl HistorySummary {
    #[must_use]
    pub fn from_items(items: &[AttemptListItem]) -> Self {
        Self {
            attempts: items.len(),
            best_score: items.iter().map(|item| item.score).max(),
        }
    }
}

/// Read side of the attempt store for the history panel.
#[derive(Clone)]
pub struct AttemptHistoryService {
    attempts: Arc<dyn AttemptRepository>,
}

impl AttemptHistoryService {
    #[must_use]
    pub fn new(attempts: Arc<dyn AttemptRepository>) -> Self {
        Self { attempts }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(storage::repository::InMemoryRepository::new()))
    }

    /// Every stored attempt, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` on repository failures.
    pub async fn list_attempts(&self) -> Result<Vec<AttemptListItem>, SessionError> {
        let attempts = self.attempts.list_attempts().await?;
        Ok(attempts.iter().map(AttemptListItem::from_attempt).collect())
    }

    /// Attempt count and best score.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` on repository failures.
    pub async fn summary(&self) -> Result<HistorySummary, SessionError> {
        let items = self.list_attempts().await?;
        Ok(HistorySummary::from_items(&items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use quiz_core::time::fixed_now;
    use storage::repository::InMemoryRepository;

    #[tokio::test]
    async fn empty_history_has_no_best_score() {
        let svc = AttemptHistoryService::in_memory();
        assert!(svc.list_attempts().await.unwrap().is_empty());
        assert_eq!(svc.summary().await.unwrap(), HistorySummary::default());
    }

    #[tokio::test]
    async fn summary_tracks_best_score() {
        let repo = InMemoryRepository::new();
        for (offset, score) in [(0, 1_u32), (1, 3), (2, 2)] {
            let attempt =
                Attempt::new(fixed_now() + Duration::minutes(offset), score, 4).unwrap();
            repo.append_attempt(&attempt).await.unwrap();
        }
        let svc = AttemptHistoryService::new(Arc::new(repo));

        let items = svc.list_attempts().await.unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[1].percent_correct, 75);
        assert_eq!(items[0].completed_at, fixed_now());

        let summary = svc.summary().await.unwrap();
        assert_eq!(summary.attempts, 3);
        assert_eq!(summary.best_score, Some(3));
    }
}
