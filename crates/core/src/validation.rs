//! Input validation for raw answers typed or clicked by a user.
//!
//! The session itself accepts any `AnswerValue`; front ends call
//! [`validate_answer`] first so that malformed input never reaches it.

use thiserror::Error;

use crate::model::{AnswerValue, Question, QuestionKind, label_index, option_label};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AnswerValidationError {
    #[error("answer cannot be empty")]
    Empty,

    #[error("{raw:?} is not one of the options A-{last}")]
    UnknownOption { raw: String, last: char },

    #[error("{raw:?} is not a whole number")]
    NotANumber { raw: String },
}

/// Turn raw user input into an answer of the kind `question` expects.
///
/// Multiple-choice input is an option label, case-insensitive. Numeric input
/// is a base-10 integer, surrounding whitespace ignored.
///
/// # Errors
///
/// Returns `AnswerValidationError` when the input is blank, names no option,
/// or does not parse as an integer.
pub fn validate_answer(question: &Question, raw: &str) -> Result<AnswerValue, AnswerValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AnswerValidationError::Empty);
    }

    match question.kind() {
        QuestionKind::MultipleChoice { options } => {
            let label = trimmed.to_ascii_uppercase();
            match label_index(&label) {
                Some(index) if index < options.len() => Ok(AnswerValue::Label(label)),
                _ => Err(AnswerValidationError::UnknownOption {
                    raw: trimmed.to_owned(),
                    last: option_label(options.len().saturating_sub(1)).unwrap_or('A'),
                }),
            }
        }
        QuestionKind::NumericEntry => trimmed
            .parse::<i64>()
            .map(AnswerValue::Number)
            .map_err(|_| AnswerValidationError::NotANumber {
                raw: trimmed.to_owned(),
            }),
    }
}
