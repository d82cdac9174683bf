//! File-backed session logger (`.session/trials.json`).

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::window::SetupInfo;
use crate::logger::{SessionLogger, TrialRecord};

/// Session logger that keeps every trial so it can be persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TrialLog {
    pub setup_info: SetupInfo,
    pub total_reward: f64,
    pub trials: Vec<TrialRecord>,
}

impl TrialLog {
    pub fn new(setup_info: SetupInfo) -> Self {
        Self {
            setup_info,
            total_reward: 0.0,
            trials: Vec::new(),
        }
    }
}

impl SessionLogger for TrialLog {
    fn setup_info(&self) -> &SetupInfo {
        &self.setup_info
    }

    fn total_reward(&self) -> f64 {
        self.total_reward
    }

    fn set_total_reward(&mut self, total: f64) {
        self.total_reward = total;
    }

    fn log_trial(&mut self, record: &TrialRecord) {
        self.trials.push(record.clone());
    }
}

/// Load a trial log from disk.
pub fn load_trial_log(path: &Path) -> Result<TrialLog> {
    debug!(path = %path.display(), "loading trial log");
    let contents =
        fs::read_to_string(path).with_context(|| format!("read trial log {}", path.display()))?;
    let log: TrialLog = serde_json::from_str(&contents)
        .with_context(|| format!("parse trial log {}", path.display()))?;
    debug!(trials = log.trials.len(), total_reward = log.total_reward, "trial log loaded");
    Ok(log)
}

/// Atomically write a trial log to disk (temp file + rename).
pub fn write_trial_log(path: &Path, log: &TrialLog) -> Result<()> {
    debug!(path = %path.display(), trials = log.trials.len(), "writing trial log");
    let mut buf = serde_json::to_string_pretty(log)?;
    buf.push('\n');
    super::write_atomic(path, &buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trial_log_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("trials.json");

        let mut log = TrialLog::default();
        let record = TrialRecord {
            trial_idx: 0,
            choice: Some(1.0),
            reward: None,
            time_ms: 250.0,
            total_reward: 0.0,
        };
        log.log_trial(&record);
        log.add_reward(2.0);

        write_trial_log(&path, &log).expect("write");
        let loaded = load_trial_log(&path).expect("load");
        assert_eq!(loaded, log);
        assert_eq!(loaded.trials, vec![record]);
        assert_eq!(loaded.total_reward(), 2.0);
    }

    #[test]
    fn missing_values_serialize_as_null() {
        let record = TrialRecord {
            trial_idx: 3,
            choice: None,
            reward: None,
            time_ms: 0.0,
            total_reward: 0.0,
        };
        let value = serde_json::to_value(&record).expect("serialize");
        assert!(value["choice"].is_null());
        assert!(value["reward"].is_null());
    }

    #[test]
    fn load_missing_file_fails_with_path() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("absent.json");
        let err = load_trial_log(&path).expect_err("missing");
        assert!(format!("{err:#}").contains("absent.json"));
    }
}
