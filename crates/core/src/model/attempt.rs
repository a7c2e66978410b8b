use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AttemptError {
    #[error("score ({score}) exceeds total questions ({total})")]
    ScoreExceedsTotal { score: u32, total: u32 },
}

/// Result of one completed quiz session.
///
/// Created once when a session finishes and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    completed_at: DateTime<Utc>,
    score: u32,
    total_questions: u32,
}

impl Attempt {
    /// # Errors
    ///
    /// Returns `AttemptError::ScoreExceedsTotal` if `score > total_questions`.
    pub fn new(
        completed_at: DateTime<Utc>,
        score: u32,
        total_questions: u32,
    ) -> Result<Self, AttemptError> {
        if score > total_questions {
            return Err(AttemptError::ScoreExceedsTotal {
                score,
                total: total_questions,
            });
        }
        Ok(Self {
            completed_at,
            score,
            total_questions,
        })
    }

    /// Rehydrate an attempt from storage, re-checking the score bound.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::ScoreExceedsTotal` if the stored row is inconsistent.
    pub fn from_persisted(
        completed_at: DateTime<Utc>,
        score: u32,
        total_questions: u32,
    ) -> Result<Self, AttemptError> {
        Self::new(completed_at, score, total_questions)
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    /// Share of correct answers, rounded to a whole percent. Zero for an empty quiz.
    #[must_use]
    pub fn percent_correct(&self) -> u32 {
        if self.total_questions == 0 {
            return 0;
        }
        let score = u64::from(self.score);
        let total = u64::from(self.total_questions);
        let rounded = (score * 200 + total) / (total * 2);
        u32::try_from(rounded).unwrap_or(100)
    }
}
