//! Scoring of a finished answer sheet against its question set.

use crate::model::{Answers, QuestionSet};

/// Count the slots whose answer equals the question's correct answer.
///
/// Comparison is strict and kind-aware: an unset slot, a label given for a
/// numeric question or a number given for a multiple-choice question all score
/// zero. The result is bounded by the question count.
#[must_use]
pub fn score(questions: &QuestionSet, answers: &Answers) -> u32 {
    let correct = questions
        .iter()
        .zip(answers.iter())
        .filter(|(question, answer)| question.is_correct(*answer))
        .count();
    u32::try_from(correct).unwrap_or(u32::MAX).min(questions.total())
}

/// Per-question correctness, in question order.
#[must_use]
pub fn breakdown(questions: &QuestionSet, answers: &Answers) -> Vec<bool> {
    questions
        .iter()
        .enumerate()
        .map(|(index, question)| question.is_correct(answers.get(index)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnswerValue, Question};

    fn two_questions() -> QuestionSet {
        QuestionSet::new(vec![
            Question::multiple_choice("Pick B", vec!["a".into(), "b".into()], "B").unwrap(),
            Question::numeric("Answer?", 42).unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn all_correct_scores_full_marks() {
        let set = two_questions();
        let mut answers = Answers::with_len(set.len());
        answers.record(0, "B".into()).unwrap();
        answers.record(1, 42.into()).unwrap();
        assert_eq!(score(&set, &answers), 2);
        assert_eq!(breakdown(&set, &answers), vec![true, true]);
    }

    #[test]
    fn wrong_answers_score_zero() {
        let set = two_questions();
        let mut answers = Answers::with_len(set.len());
        answers.record(0, "A".into()).unwrap();
        answers.record(1, 41.into()).unwrap();
        assert_eq!(score(&set, &answers), 0);
    }

    #[test]
    fn unset_slot_counts_as_wrong() {
        let set = two_questions();
        let mut answers = Answers::with_len(set.len());
        answers.record(0, "B".into()).unwrap();
        assert_eq!(score(&set, &answers), 1);
        assert_eq!(breakdown(&set, &answers), vec![true, false]);
    }

    #[test]
    fn mismatched_kinds_never_match() {
        let set = two_questions();
        let mut answers = Answers::with_len(set.len());
        answers.record(1, AnswerValue::label("42")).unwrap();
        assert_eq!(score(&set, &answers), 0);
    }
}
