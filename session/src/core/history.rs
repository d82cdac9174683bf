//! Per-trial choice and reward history.
//!
//! Both sequences are append-only and aligned 1:1 by trial index. `None` marks
//! a trial without a choice or without a reward; non-finite values (NaN, ±inf)
//! are stored as `None`.

/// Choice and reward history for one session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    choices: Vec<Option<f64>>,
    rewards: Vec<Option<f64>>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one trial outcome to both sequences.
    pub fn push(&mut self, choice: Option<f64>, reward: Option<f64>) {
        self.choices.push(finite(choice));
        self.rewards.push(finite(reward));
    }

    pub fn choices(&self) -> &[Option<f64>] {
        &self.choices
    }

    pub fn rewards(&self) -> &[Option<f64>] {
        &self.rewards
    }

    /// Number of recorded trials.
    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    /// Sum of all rewards, counting missing rewards as zero.
    pub fn total_reward(&self) -> f64 {
        self.rewards.iter().flatten().sum()
    }

    /// Length of the current failure streak within the last `h` trials.
    ///
    /// Walks backward from the most recent trial and counts trials where a
    /// choice was made but no reward was given. The walk stops at the first
    /// trial that was rewarded or had no choice.
    ///
    /// `h = 0` is an empty window and yields 0; it never means the whole
    /// history.
    pub fn failure_streak(&self, h: usize) -> usize {
        let window = h.min(self.len());
        let start = self.len() - window;
        self.choices[start..]
            .iter()
            .zip(&self.rewards[start..])
            .rev()
            .take_while(|(choice, reward)| choice.is_some() && reward.is_none())
            .count()
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(trials: &[(Option<f64>, Option<f64>)]) -> History {
        let mut history = History::new();
        for (choice, reward) in trials {
            history.push(*choice, *reward);
        }
        history
    }

    #[test]
    fn empty_history_has_no_streak() {
        assert_eq!(History::new().failure_streak(10), 0);
        assert_eq!(History::new().total_reward(), 0.0);
    }

    #[test]
    fn streak_counts_unrewarded_choices() {
        let h = history(&[(Some(1.0), None), (Some(1.0), None), (Some(1.0), None)]);
        assert_eq!(h.failure_streak(10), 3);
    }

    #[test]
    fn streak_is_capped_by_window() {
        let h = history(&[(Some(1.0), None); 6]);
        assert_eq!(h.failure_streak(4), 4);
        assert_eq!(h.failure_streak(0), 0);
    }

    #[test]
    fn rewarded_trial_breaks_streak() {
        let h = history(&[
            (Some(1.0), None),
            (Some(2.0), Some(5.0)),
            (Some(1.0), None),
            (Some(1.0), None),
        ]);
        assert_eq!(h.failure_streak(10), 2);
    }

    #[test]
    fn missing_choice_breaks_streak() {
        let h = history(&[(Some(1.0), None), (None, None)]);
        assert_eq!(h.failure_streak(10), 0);

        let h = history(&[(None, None), (Some(1.0), None)]);
        assert_eq!(h.failure_streak(10), 1);
    }

    #[test]
    fn non_finite_values_are_stored_as_missing() {
        let h = history(&[
            (Some(1.0), Some(f64::NAN)),
            (Some(f64::NAN), None),
            (Some(1.0), Some(f64::INFINITY)),
            (Some(1.0), Some(5.0)),
        ]);
        assert_eq!(h.rewards(), &[None, None, None, Some(5.0)]);
        assert_eq!(h.choices()[1], None);
        assert_eq!(h.total_reward(), 5.0);
    }

    #[test]
    fn nan_reward_counts_as_failure() {
        let h = history(&[(Some(1.0), Some(f64::NAN)), (Some(1.0), Some(f64::NAN))]);
        assert_eq!(h.failure_streak(10), 2);
    }

    #[test]
    fn total_skips_missing_rewards() {
        let h = history(&[(Some(1.0), Some(2.5)), (Some(1.0), None), (None, Some(1.5))]);
        assert_eq!(h.total_reward(), 4.0);
    }
}
