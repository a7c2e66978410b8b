mod answer;
mod attempt;
mod question;
mod question_set;

pub use answer::{AnswerSlotError, AnswerValue, Answers};
pub use attempt::{Attempt, AttemptError};
pub use question::{MAX_OPTIONS, Question, QuestionError, QuestionKind, label_index, option_label};
pub use question_set::{QuestionSet, QuestionSetError};
