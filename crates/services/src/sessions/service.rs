use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

use quiz_core::model::{AnswerValue, Answers, Attempt, Question, QuestionSet};
use quiz_core::scoring;

use super::progress::SessionProgress;
use crate::error::SessionError;

/// Per-question time budget, in ticks.
pub const DEFAULT_SECONDS_PER_QUESTION: u32 = 30;

//
// ─── CONFIG ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub seconds_per_question: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seconds_per_question: DEFAULT_SECONDS_PER_QUESTION,
        }
    }
}

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NotStarted,
    InProgress,
    Finished,
}

/// What a single `submit_answer` or `tick` did to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStep {
    /// The countdown moved but the question did not change.
    Ticked { remaining: u32 },
    /// Moved on to question `index`, either answered or timed out.
    Advanced { index: usize, timed_out: bool },
    /// The last question was answered or timed out.
    Finished(Attempt),
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Quiz progress state machine.
///
/// `NotStarted -> InProgress -> Finished`, with `start` re-entering
/// `InProgress` from any state. The countdown only moves when `tick` is
/// called; whoever drives the session owns the cadence. Timestamps are passed
/// in by the caller so time stays deterministic.
pub struct QuizSession {
    questions: Arc<QuestionSet>,
    config: SessionConfig,
    state: SessionState,
    current: usize,
    answers: Answers,
    time_remaining: u32,
    pending_input: String,
    result: Option<Attempt>,
}

impl QuizSession {
    #[must_use]
    pub fn new(questions: Arc<QuestionSet>, config: SessionConfig) -> Self {
        let answers = Answers::with_len(questions.len());
        Self {
            questions,
            config,
            state: SessionState::NotStarted,
            current: 0,
            answers,
            time_remaining: config.seconds_per_question,
            pending_input: String::new(),
            result: None,
        }
    }

    /// Begin (or restart) the quiz from the first question with a full timer.
    pub fn start(&mut self) {
        self.state = SessionState::InProgress;
        self.current = 0;
        self.answers.clear();
        self.time_remaining = self.config.seconds_per_question;
        self.pending_input.clear();
        self.result = None;
    }

    /// Record `value` for the current question and move on.
    ///
    /// The value is stored as given; callers validate input beforehand (see
    /// `quiz_core::validate_answer`). Answering the last question finishes the
    /// session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotStarted` or `SessionError::Finished` outside
    /// `InProgress`.
    pub fn submit_answer(
        &mut self,
        value: AnswerValue,
        now: DateTime<Utc>,
    ) -> Result<SessionStep, SessionError> {
        self.ensure_in_progress()?;
        self.answers.record(self.current, value)?;
        self.advance(now, false)
    }

    /// Count the timer down by one. Reaching zero skips the question, leaving
    /// its slot unset, or finishes the session on the last question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotStarted` or `SessionError::Finished` outside
    /// `InProgress`.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Result<SessionStep, SessionError> {
        self.ensure_in_progress()?;
        self.time_remaining = self.time_remaining.saturating_sub(1);
        if self.time_remaining > 0 {
            return Ok(SessionStep::Ticked {
                remaining: self.time_remaining,
            });
        }
        self.advance(now, true)
    }

    fn ensure_in_progress(&self) -> Result<(), SessionError> {
        match self.state {
            SessionState::InProgress => Ok(()),
            SessionState::NotStarted => Err(SessionError::NotStarted),
            SessionState::Finished => Err(SessionError::Finished),
        }
    }

    fn advance(&mut self, now: DateTime<Utc>, timed_out: bool) -> Result<SessionStep, SessionError> {
        if self.current >= self.questions.last_index() {
            let attempt = self.finish(now)?;
            return Ok(SessionStep::Finished(attempt));
        }

        self.current += 1;
        self.time_remaining = self.config.seconds_per_question;
        self.pending_input.clear();
        Ok(SessionStep::Advanced {
            index: self.current,
            timed_out,
        })
    }

    fn finish(&mut self, now: DateTime<Utc>) -> Result<Attempt, SessionError> {
        let score = scoring::score(&self.questions, &self.answers);
        let attempt = Attempt::new(now, score, self.questions.total())?;
        self.state = SessionState::Finished;
        self.time_remaining = 0;
        self.result = Some(attempt.clone());
        Ok(attempt)
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state == SessionState::Finished
    }

    #[must_use]
    pub fn config(&self) -> SessionConfig {
        self.config
    }

    #[must_use]
    pub fn questions(&self) -> &QuestionSet {
        &self.questions
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The question on screen, or `None` outside `InProgress`.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if self.state == SessionState::InProgress {
            self.questions.get(self.current)
        } else {
            None
        }
    }

    #[must_use]
    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    #[must_use]
    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    /// Correct answers so far; equals the attempt score once finished.
    #[must_use]
    pub fn score(&self) -> u32 {
        scoring::score(&self.questions, &self.answers)
    }

    /// The attempt built when the session finished.
    #[must_use]
    pub fn result(&self) -> Option<&Attempt> {
        self.result.as_ref()
    }

    /// Raw text the user has typed but not yet submitted.
    #[must_use]
    pub fn pending_input(&self) -> &str {
        &self.pending_input
    }

    pub fn set_pending_input(&mut self, input: impl Into<String>) {
        self.pending_input = input.into();
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            state: self.state,
            index: self.current,
            total: self.questions.len(),
            answered: self.answers.answered_count(),
            time_remaining: self.time_remaining,
            seconds_per_question: self.config.seconds_per_question,
        }
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("state", &self.state)
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("answered", &self.answers.answered_count())
            .field("time_remaining", &self.time_remaining)
            .field("result", &self.result)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
