use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use quiz_core::model::{Attempt, Question, QuestionSet};
use quiz_core::time::fixed_clock;
use services::{AttemptHistoryService, QuizEvent, QuizLoopService, SessionState};
use storage::repository::{AttemptRepository, InMemoryRepository, StorageError};
use storage::sqlite::SqliteRepository;

/// Store whose writes always fail, as if the disk quota were exhausted.
#[derive(Default)]
struct FailingRepository {
    append_calls: AtomicUsize,
}

#[async_trait]
impl AttemptRepository for FailingRepository {
    async fn open(&self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn append_attempt(&self, _attempt: &Attempt) -> Result<(), StorageError> {
        self.append_calls.fetch_add(1, Ordering::SeqCst);
        Err(StorageError::Connection("quota exceeded".into()))
    }

    async fn list_attempts(&self) -> Result<Vec<Attempt>, StorageError> {
        Err(StorageError::Connection("store blocked".into()))
    }
}

fn question_set() -> Arc<QuestionSet> {
    Arc::new(
        QuestionSet::new(vec![
            Question::multiple_choice(
                "Which option is B?",
                vec!["alpha".into(), "beta".into(), "gamma".into()],
                "B",
            )
            .unwrap(),
            Question::numeric("What is six times seven?", 42).unwrap(),
        ])
        .unwrap(),
    )
}

#[tokio::test]
async fn timed_out_last_question_is_persisted_with_partial_score() {
    let repo = InMemoryRepository::new();
    let svc = QuizLoopService::new(fixed_clock(), question_set(), Arc::new(repo.clone()));
    let mut session = svc.start_session();

    svc.submit_answer(&mut session, "B".into()).await.unwrap();

    let mut last = None;
    while session.state() == SessionState::InProgress {
        last = Some(svc.tick(&mut session).await.unwrap());
    }

    let Some(QuizEvent::Finished { attempt, persisted }) = last else {
        panic!("expected the timeout to finish the quiz");
    };
    assert!(persisted);
    assert_eq!(attempt.score(), 1);
    assert_eq!(attempt.total_questions(), 2);

    let history = AttemptHistoryService::new(Arc::new(repo));
    let summary = history.summary().await.unwrap();
    assert_eq!(summary.attempts, 1);
    assert_eq!(summary.best_score, Some(1));
}

#[tokio::test]
async fn storage_failure_still_finishes_the_session() {
    let repo = Arc::new(FailingRepository::default());
    let svc = QuizLoopService::new(fixed_clock(), question_set(), repo.clone());
    let mut session = svc.start_session();

    svc.submit_answer(&mut session, "B".into()).await.unwrap();
    let event = svc.submit_answer(&mut session, 42.into()).await.unwrap();

    let QuizEvent::Finished { attempt, persisted } = event else {
        panic!("expected finish");
    };
    assert!(!persisted);
    assert_eq!(attempt.score(), 2);
    assert_eq!(session.state(), SessionState::Finished);
    assert_eq!(session.result(), Some(&attempt));
    assert_eq!(repo.append_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn timeout_finish_against_unopenable_store_is_not_persisted() {
    let repo = Arc::new(SqliteRepository::lazy(
        "sqlite:///nonexistent_quiz_dir/nested/attempts.db",
    ));
    let svc = QuizLoopService::new(fixed_clock(), question_set(), repo.clone());
    let mut session = svc.start_session();

    svc.submit_answer(&mut session, "A".into()).await.unwrap();

    let mut last = None;
    while session.state() == SessionState::InProgress {
        last = Some(svc.tick(&mut session).await.unwrap());
    }

    let Some(QuizEvent::Finished { attempt, persisted }) = last else {
        panic!("expected the timeout to finish the quiz");
    };
    assert!(!persisted);
    assert_eq!(attempt.score(), 0);
    assert_eq!(attempt.total_questions(), 2);
    assert_eq!(session.result(), Some(&attempt));
    assert!(!repo.is_open());
}

#[tokio::test]
async fn history_errors_surface_as_storage_errors() {
    let history = AttemptHistoryService::new(Arc::new(FailingRepository::default()));
    let err = history.list_attempts().await.unwrap_err();
    assert!(matches!(err, services::SessionError::Storage(_)));
}
