use std::path::Path;

use thiserror::Error;

use crate::model::answer::AnswerValue;
use crate::model::question::{Question, QuestionKind};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuestionSetError {
    #[error("question set must contain at least one question")]
    Empty,

    #[error("failed to read question set: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid question set: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Static, ordered collection of questions loaded once at startup.
///
/// A question's identifier is its index in this set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionSet {
    questions: Vec<Question>,
}

impl QuestionSet {
    /// # Errors
    ///
    /// Returns `QuestionSetError::Empty` if `questions` is empty.
    pub fn new(questions: Vec<Question>) -> Result<Self, QuestionSetError> {
        if questions.is_empty() {
            return Err(QuestionSetError::Empty);
        }
        Ok(Self { questions })
    }

    /// Parse a JSON array of questions.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSetError::Parse` for malformed JSON or invalid questions,
    /// and `QuestionSetError::Empty` for an empty array.
    pub fn from_json_str(json: &str) -> Result<Self, QuestionSetError> {
        let questions: Vec<Question> = serde_json::from_str(json)?;
        Self::new(questions)
    }

    /// Read and parse a JSON question file.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSetError::Io` if the file cannot be read, otherwise the
    /// same errors as [`QuestionSet::from_json_str`].
    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self, QuestionSetError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// The question set shipped with the application.
    #[must_use]
    pub fn builtin() -> Self {
        fn choice(prompt: &str, options: &[&str], correct: &str) -> Question {
            Question::unchecked(
                prompt.to_owned(),
                QuestionKind::MultipleChoice {
                    options: options.iter().map(|o| (*o).to_owned()).collect(),
                },
                AnswerValue::label(correct),
            )
        }

        fn numeric(prompt: &str, correct: i64) -> Question {
            Question::unchecked(
                prompt.to_owned(),
                QuestionKind::NumericEntry,
                AnswerValue::number(correct),
            )
        }

        Self {
            questions: vec![
                choice(
                    "Which planet is known as the Red Planet?",
                    &["Venus", "Mars", "Jupiter", "Saturn"],
                    "B",
                ),
                numeric("What is 7 multiplied by 6?", 42),
                choice(
                    "Which language is used to style web pages?",
                    &["HTML", "Python", "CSS", "SQL"],
                    "C",
                ),
                numeric("How many sides does a hexagon have?", 6),
                choice(
                    "Which data structure serves items in first-in, first-out order?",
                    &["Stack", "Queue", "Binary tree", "Hash map"],
                    "B",
                ),
                numeric("In what year did humans first walk on the Moon?", 1969),
            ],
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Always false for a constructed set; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Question count as stored on an attempt.
    #[must_use]
    pub fn total(&self) -> u32 {
        u32::try_from(self.questions.len()).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    #[must_use]
    pub fn last_index(&self) -> usize {
        self.questions.len().saturating_sub(1)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_questions_are_valid() {
        let set = QuestionSet::builtin();
        assert!(!set.is_empty());
        for (index, question) in set.iter().enumerate() {
            assert!(question.validate().is_ok(), "question {index} is invalid");
        }
        assert_eq!(set.total() as usize, set.len());
        assert_eq!(set.last_index(), set.len() - 1);
    }

    #[test]
    fn empty_set_is_rejected() {
        assert!(matches!(
            QuestionSet::new(Vec::new()),
            Err(QuestionSetError::Empty)
        ));
        assert!(matches!(
            QuestionSet::from_json_str("[]"),
            Err(QuestionSetError::Empty)
        ));
    }

    #[test]
    fn loads_mixed_json_set() {
        let json = r#"[
            {"question": "Pick B", "type": "multiple-choice", "options": ["a", "b"], "correctAnswer": "B"},
            {"question": "Answer?", "type": "numeric-entry", "correctAnswer": 42}
        ]"#;
        let set = QuestionSet::from_json_str(json).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(1).unwrap().correct_answer(), &AnswerValue::number(42));
        assert!(set.get(2).is_none());
    }

    #[test]
    fn invalid_question_fails_the_whole_set() {
        let json = r#"[{"question": "Pick", "type": "multiple-choice", "options": ["a"], "correctAnswer": "D"}]"#;
        assert!(matches!(
            QuestionSet::from_json_str(json),
            Err(QuestionSetError::Parse(_))
        ));
    }
}
