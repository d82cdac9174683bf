//! Satiation gate based on cumulative reward.

/// Returns true when `total_reward` has reached the active cap.
///
/// A non-zero `threshold` takes precedence over `max_reward`. With neither set
/// the session is never considered hydrated.
pub fn is_hydrated(total_reward: f64, threshold: Option<f64>, max_reward: Option<f64>) -> bool {
    match active_cap(threshold).or_else(|| active_cap(max_reward)) {
        Some(cap) => total_reward >= cap,
        None => false,
    }
}

fn active_cap(value: Option<f64>) -> Option<f64> {
    value.filter(|cap| *cap != 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_reward_caps_total() {
        assert!(!is_hydrated(9.9, None, Some(10.0)));
        assert!(is_hydrated(10.0, None, Some(10.0)));
        assert!(is_hydrated(12.0, None, Some(10.0)));
    }

    #[test]
    fn threshold_overrides_max_reward() {
        assert!(is_hydrated(3.0, Some(2.0), Some(10.0)));
        assert!(!is_hydrated(3.0, Some(5.0), Some(1.0)));
    }

    #[test]
    fn zero_threshold_falls_back_to_max_reward() {
        assert!(is_hydrated(10.0, Some(0.0), Some(10.0)));
    }

    #[test]
    fn uncapped_session_is_never_hydrated() {
        assert!(!is_hydrated(1_000.0, None, None));
        assert!(!is_hydrated(1_000.0, None, Some(0.0)));
    }
}
