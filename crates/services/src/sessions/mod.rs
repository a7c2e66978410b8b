mod countdown;
mod progress;
mod service;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use countdown::{Countdown, TICK_PERIOD};
pub use progress::SessionProgress;
pub use service::{
    DEFAULT_SECONDS_PER_QUESTION, QuizSession, SessionConfig, SessionState, SessionStep,
};
pub use view::{AttemptHistoryService, AttemptListItem, HistorySummary};
pub use workflow::{QuizEvent, QuizLoopService};
