use std::sync::Arc;

use quiz_core::model::{AnswerValue, Attempt, QuestionSet};
use storage::repository::AttemptRepository;

use super::service::{QuizSession, SessionConfig, SessionStep};
use crate::Clock;
use crate::error::SessionError;

/// Outcome of driving a session by one answer or one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizEvent {
    Ticked { remaining: u32 },
    Advanced { index: usize, timed_out: bool },
    /// The session finished. `persisted` is false when the attempt could not
    /// be written; the attempt is still the session's result.
    Finished { attempt: Attempt, persisted: bool },
}

/// Orchestrates sessions and the best-effort persistence of their results.
#[derive(Clone)]
pub struct QuizLoopService {
    clock: Clock,
    questions: Arc<QuestionSet>,
    attempts: Arc<dyn AttemptRepository>,
    config: SessionConfig,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        questions: Arc<QuestionSet>,
        attempts: Arc<dyn AttemptRepository>,
    ) -> Self {
        Self {
            clock,
            questions,
            attempts,
            config: SessionConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn questions(&self) -> &Arc<QuestionSet> {
        &self.questions
    }

    /// A fresh session in `NotStarted`.
    #[must_use]
    pub fn new_session(&self) -> QuizSession {
        QuizSession::new(Arc::clone(&self.questions), self.config)
    }

    /// Start a new session, ready for the first question.
    #[must_use]
    pub fn start_session(&self) -> QuizSession {
        let mut session = self.new_session();
        session.start();
        session
    }

    /// Record an answer for the current question, persisting the attempt if
    /// this finished the session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the session is not in progress. Storage
    /// failures are logged and reported through `QuizEvent::Finished`.
    pub async fn submit_answer(
        &self,
        session: &mut QuizSession,
        value: AnswerValue,
    ) -> Result<QuizEvent, SessionError> {
        let step = session.submit_answer(value, self.clock.now())?;
        Ok(self.complete_step(step).await)
    }

    /// Advance the countdown by one second, persisting the attempt if the
    /// last question timed out.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the session is not in progress.
    pub async fn tick(&self, session: &mut QuizSession) -> Result<QuizEvent, SessionError> {
        let step = session.tick(self.clock.now())?;
        Ok(self.complete_step(step).await)
    }

    async fn complete_step(&self, step: SessionStep) -> QuizEvent {
        match step {
            SessionStep::Ticked { remaining } => QuizEvent::Ticked { remaining },
            SessionStep::Advanced { index, timed_out } => {
                if timed_out {
                    tracing::debug!(index, "question timed out, moving on");
                }
                QuizEvent::Advanced { index, timed_out }
            }
            SessionStep::Finished(attempt) => {
                tracing::debug!(
                    score = attempt.score(),
                    total = attempt.total_questions(),
                    "quiz finished"
                );
                let persisted = self.persist(&attempt).await;
                QuizEvent::Finished { attempt, persisted }
            }
        }
    }

    async fn persist(&self, attempt: &Attempt) -> bool {
        match self.attempts.append_attempt(attempt).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(error = %err, "failed to save attempt");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::Question;
    use quiz_core::time::fixed_clock;
    use storage::repository::InMemoryRepository;

    fn service(repo: &InMemoryRepository) -> QuizLoopService {
        let questions = QuestionSet::new(vec![
            Question::multiple_choice("Pick B", vec!["a".into(), "b".into()], "B").unwrap(),
            Question::numeric("Answer?", 42).unwrap(),
        ])
        .unwrap();
        QuizLoopService::new(fixed_clock(), Arc::new(questions), Arc::new(repo.clone()))
    }

    #[tokio::test]
    async fn finishing_writes_exactly_one_attempt() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);
        let mut session = svc.start_session();

        let event = svc.submit_answer(&mut session, "B".into()).await.unwrap();
        assert!(matches!(event, QuizEvent::Advanced { index: 1, .. }));
        assert!(repo.list_attempts().await.unwrap().is_empty());

        let event = svc.submit_answer(&mut session, 42.into()).await.unwrap();
        let QuizEvent::Finished { attempt, persisted } = event else {
            panic!("expected finish");
        };
        assert!(persisted);
        assert_eq!(attempt.score(), 2);

        assert!(svc.submit_answer(&mut session, 42.into()).await.is_err());
        assert!(svc.tick(&mut session).await.is_err());
        assert_eq!(repo.list_attempts().await.unwrap(), vec![attempt]);
    }

    #[tokio::test]
    async fn abandoned_session_writes_nothing() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);
        let mut session = svc.start_session();
        svc.submit_answer(&mut session, "B".into()).await.unwrap();
        drop(session);

        assert!(repo.list_attempts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn restart_after_finish_persists_a_second_attempt() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);
        let mut session = svc.start_session();
        svc.submit_answer(&mut session, "A".into()).await.unwrap();
        svc.submit_answer(&mut session, 41.into()).await.unwrap();

        session.start();
        svc.submit_answer(&mut session, "B".into()).await.unwrap();
        svc.submit_answer(&mut session, 42.into()).await.unwrap();

        let scores: Vec<u32> = repo
            .list_attempts()
            .await
            .unwrap()
            .iter()
            .map(Attempt::score)
            .collect();
        assert_eq!(scores, vec![0, 2]);
    }
}
