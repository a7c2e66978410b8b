use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnswerSlotError {
    #[error("answer slot {index} is out of range for {len} questions")]
    OutOfRange { index: usize, len: usize },
}

//
// ─── ANSWER VALUE ─────────────────────────────────────────────────────────────
//

/// A recorded answer or an expected correct answer.
///
/// Multiple-choice answers are option labels (`"A"`, `"B"`, …) and numeric-entry
/// answers are integers. Equality never coerces between the two: a label and a
/// number are always different values, even when they spell the same digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Label(String),
    Number(i64),
}

impl AnswerValue {
    #[must_use]
    pub fn label(label: impl Into<String>) -> Self {
        Self::Label(label.into())
    }

    #[must_use]
    pub fn number(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        Self::Label(value.to_owned())
    }
}

impl From<String> for AnswerValue {
    fn from(value: String) -> Self {
        Self::Label(value)
    }
}

impl From<i64> for AnswerValue {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Label(label) => f.write_str(label),
            Self::Number(value) => write!(f, "{value}"),
        }
    }
}

//
// ─── ANSWER SHEET ─────────────────────────────────────────────────────────────
//

/// Answers collected during a session, one slot per question.
///
/// The slot count is fixed when the sheet is created, so it can never grow past
/// the question set it was built for. Unanswered (skipped or timed out) slots
/// stay `None`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Answers {
    slots: Vec<Option<AnswerValue>>,
}

impl Answers {
    #[must_use]
    pub fn with_len(len: usize) -> Self {
        Self {
            slots: vec![None; len],
        }
    }

    /// Store `value` at `index`, returning whatever was there before.
    ///
    /// # Errors
    ///
    /// Returns `AnswerSlotError::OutOfRange` if `index` is past the last slot.
    pub fn record(
        &mut self,
        index: usize,
        value: AnswerValue,
    ) -> Result<Option<AnswerValue>, AnswerSlotError> {
        let len = self.slots.len();
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(AnswerSlotError::OutOfRange { index, len })?;
        Ok(slot.replace(value))
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&AnswerValue> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of slots that hold an answer.
    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&AnswerValue>> {
        self.slots.iter().map(Option::as_ref)
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_and_number_never_compare_equal() {
        assert_ne!(AnswerValue::label("42"), AnswerValue::number(42));
        assert_eq!(AnswerValue::from("B"), AnswerValue::label("B"));
        assert_eq!(AnswerValue::from(7), AnswerValue::number(7));
    }

    #[test]
    fn record_overwrites_previous_value() {
        let mut answers = Answers::with_len(2);
        assert_eq!(answers.record(0, "A".into()).unwrap(), None);
        let previous = answers.record(0, "C".into()).unwrap();
        assert_eq!(previous, Some(AnswerValue::label("A")));
        assert_eq!(answers.get(0), Some(&AnswerValue::label("C")));
        assert_eq!(answers.answered_count(), 1);
    }

    #[test]
    fn record_rejects_out_of_range_slot() {
        let mut answers = Answers::with_len(1);
        let err = answers.record(1, 3.into()).unwrap_err();
        assert_eq!(err, AnswerSlotError::OutOfRange { index: 1, len: 1 });
        assert_eq!(answers.len(), 1);
    }

    #[test]
    fn clear_keeps_slot_count() {
        let mut answers = Answers::with_len(3);
        answers.record(2, 9.into()).unwrap();
        answers.clear();
        assert_eq!(answers.len(), 3);
        assert_eq!(answers.answered_count(), 0);
    }

    #[test]
    fn deserializes_untagged_values() {
        let values: Vec<AnswerValue> = serde_json::from_str(r#"["B", 42]"#).unwrap();
        assert_eq!(values, vec![AnswerValue::label("B"), AnswerValue::number(42)]);
    }
}
