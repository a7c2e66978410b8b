use super::service::SessionState;

/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    pub state: SessionState,
    pub index: usize,
    pub total: usize,
    pub answered: usize,
    pub time_remaining: u32,
    pub seconds_per_question: u32,
}

impl SessionProgress {
    /// Remaining time as a fraction of the per-question budget, for a progress bar.
    #[must_use]
    pub fn time_fraction(&self) -> f64 {
        if self.seconds_per_question == 0 {
            return 0.0;
        }
        f64::from(self.time_remaining) / f64::from(self.seconds_per_question)
    }

    /// One-based question number for display.
    #[must_use]
    pub fn question_number(&self) -> usize {
        self.index + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(time_remaining: u32, seconds_per_question: u32) -> SessionProgress {
        SessionProgress {
            state: SessionState::InProgress,
            index: 2,
            total: 5,
            answered: 1,
            time_remaining,
            seconds_per_question,
        }
    }

    #[test]
    fn time_fraction_tracks_remaining_budget() {
        assert!((progress(15, 30).time_fraction() - 0.5).abs() < f64::EPSILON);
        assert!((progress(30, 30).time_fraction() - 1.0).abs() < f64::EPSILON);
        assert!(progress(0, 0).time_fraction().abs() < f64::EPSILON);
    }

    #[test]
    fn question_number_is_one_based() {
        assert_eq!(progress(30, 30).question_number(), 3);
    }
}
