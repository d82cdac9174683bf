//! Logging collaborator contract consumed by the session tracker.

use serde::{Deserialize, Serialize};

use crate::core::window::SetupInfo;

/// One trial as reported to the logger after `update_history`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub trial_idx: usize,
    pub choice: Option<f64>,
    pub reward: Option<f64>,
    /// Time from session start, in milliseconds.
    pub time_ms: f64,
    /// Cumulative reward after this trial.
    pub total_reward: f64,
}

/// Sink for session totals and source of setup information.
pub trait SessionLogger {
    /// Active window of the setup running this session.
    fn setup_info(&self) -> &SetupInfo;

    fn total_reward(&self) -> f64;

    fn set_total_reward(&mut self, total: f64);

    /// Credit `amount` to the running total.
    ///
    /// A tracker rewrites the total after every trial, so hosts driving one
    /// credit extra reward through `SessionTracker::add_reward` instead.
    fn add_reward(&mut self, amount: f64) {
        let total = self.total_reward() + amount;
        self.set_total_reward(total);
    }

    /// Called once per recorded trial, after the total has been updated.
    fn log_trial(&mut self, _record: &TrialRecord) {}
}

/// Logger that only keeps the running total in memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryLogger {
    pub setup_info: SetupInfo,
    pub total_reward: f64,
}

impl MemoryLogger {
    pub fn new(setup_info: SetupInfo) -> Self {
        Self {
            setup_info,
            total_reward: 0.0,
        }
    }
}

impl SessionLogger for MemoryLogger {
    fn setup_info(&self) -> &SetupInfo {
        &self.setup_info
    }

    fn total_reward(&self) -> f64 {
        self.total_reward
    }

    fn set_total_reward(&mut self, total: f64) {
        self.total_reward = total;
    }
}
