use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::answer::AnswerValue;

/// Labels run `A..=Z`, which caps the option count.
pub const MAX_OPTIONS: usize = 26;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("multiple-choice question needs at least one option")]
    NoOptions,

    #[error("multiple-choice question has {count} options, at most 26 are supported")]
    TooManyOptions { count: usize },

    #[error("option {index} is blank")]
    BlankOption { index: usize },

    #[error("correct answer {label:?} does not name one of the {count} options")]
    CorrectLabelOutOfRange { label: String, count: usize },

    #[error("correct answer kind does not match the question kind")]
    AnswerKindMismatch,
}

//
// ─── LABELS ───────────────────────────────────────────────────────────────────
//

/// Label for the option at `index` (`0 -> 'A'`, `1 -> 'B'`, …).
#[must_use]
pub fn option_label(index: usize) -> Option<char> {
    if index >= MAX_OPTIONS {
        return None;
    }
    let offset = u8::try_from(index).ok()?;
    Some(char::from(b'A' + offset))
}

/// Inverse of [`option_label`]; only upper-case single letters are accepted.
#[must_use]
pub fn label_index(label: &str) -> Option<usize> {
    let mut chars = label.chars();
    let c = chars.next()?;
    if chars.next().is_some() || !c.is_ascii_uppercase() {
        return None;
    }
    Some(usize::from(c as u8 - b'A'))
}

//
// ─── QUESTION ─────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionKind {
    MultipleChoice { options: Vec<String> },
    NumericEntry,
}

impl QuestionKind {
    #[must_use]
    pub fn options(&self) -> &[String] {
        match self {
            Self::MultipleChoice { options } => options,
            Self::NumericEntry => &[],
        }
    }
}

/// A single immutable quiz question.
///
/// Its identifier is its position inside the owning `QuestionSet`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QuestionDraft", into = "QuestionDraft")]
pub struct Question {
    prompt: String,
    kind: QuestionKind,
    correct_answer: AnswerValue,
}

impl Question {
    /// Build a multiple-choice question whose correct answer is an option label.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the prompt is blank, the options are empty,
    /// blank or too many, or the label does not point at an option.
    pub fn multiple_choice(
        prompt: impl Into<String>,
        options: Vec<String>,
        correct_label: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        Self::from_parts(
            prompt.into(),
            QuestionKind::MultipleChoice { options },
            AnswerValue::Label(correct_label.into()),
        )
    }

    /// Build a numeric-entry question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyPrompt` if the prompt is blank.
    pub fn numeric(prompt: impl Into<String>, correct: i64) -> Result<Self, QuestionError> {
        Self::from_parts(
            prompt.into(),
            QuestionKind::NumericEntry,
            AnswerValue::Number(correct),
        )
    }

    fn from_parts(
        prompt: String,
        kind: QuestionKind,
        correct_answer: AnswerValue,
    ) -> Result<Self, QuestionError> {
        let question = Self::unchecked(prompt, kind, correct_answer);
        question.validate()?;
        Ok(question)
    }

    pub(crate) fn unchecked(prompt: String, kind: QuestionKind, correct_answer: AnswerValue) -> Self {
        Self {
            prompt,
            kind,
            correct_answer,
        }
    }

    /// Check the question definition.
    ///
    /// # Errors
    ///
    /// Returns the first `QuestionError` found.
    pub fn validate(&self) -> Result<(), QuestionError> {
        if self.prompt.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }

        match (&self.kind, &self.correct_answer) {
            (QuestionKind::MultipleChoice { options }, AnswerValue::Label(label)) => {
                if options.is_empty() {
                    return Err(QuestionError::NoOptions);
                }
                if options.len() > MAX_OPTIONS {
                    return Err(QuestionError::TooManyOptions {
                        count: options.len(),
                    });
                }
                if let Some(index) = options.iter().position(|o| o.trim().is_empty()) {
                    return Err(QuestionError::BlankOption { index });
                }
                match label_index(label) {
                    Some(i) if i < options.len() => Ok(()),
                    _ => Err(QuestionError::CorrectLabelOutOfRange {
                        label: label.clone(),
                        count: options.len(),
                    }),
                }
            }
            (QuestionKind::NumericEntry, AnswerValue::Number(_)) => Ok(()),
            _ => Err(QuestionError::AnswerKindMismatch),
        }
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn kind(&self) -> &QuestionKind {
        &self.kind
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        self.kind.options()
    }

    #[must_use]
    pub fn correct_answer(&self) -> &AnswerValue {
        &self.correct_answer
    }

    /// Strict comparison: an unset slot or a value of the other kind is wrong.
    #[must_use]
    pub fn is_correct(&self, answer: Option<&AnswerValue>) -> bool {
        answer.is_some_and(|a| *a == self.correct_answer)
    }
}

//
// ─── SERDE SHAPE ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionKindTag {
    MultipleChoice,
    NumericEntry,
}

/// On-disk question shape used by JSON question sets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDraft {
    question: String,
    #[serde(rename = "type")]
    kind: QuestionKindTag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    options: Option<Vec<String>>,
    correct_answer: AnswerValue,
}

impl TryFrom<QuestionDraft> for Question {
    type Error = QuestionError;

    fn try_from(draft: QuestionDraft) -> Result<Self, Self::Error> {
        let kind = match draft.kind {
            QuestionKindTag::MultipleChoice => QuestionKind::MultipleChoice {
                options: draft.options.unwrap_or_default(),
            },
            QuestionKindTag::NumericEntry => QuestionKind::NumericEntry,
        };
        Self::from_parts(draft.question, kind, draft.correct_answer)
    }
}

impl From<Question> for QuestionDraft {
    fn from(question: Question) -> Self {
        let (kind, options) = match question.kind {
            QuestionKind::MultipleChoice { options } => {
                (QuestionKindTag::MultipleChoice, Some(options))
            }
            QuestionKind::NumericEntry => (QuestionKindTag::NumericEntry, None),
        };
        Self {
            question: question.prompt,
            kind,
            options,
            correct_answer: question.correct_answer,
        }
    }
}
