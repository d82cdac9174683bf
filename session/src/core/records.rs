//! Record types for the behavior persistence vocabulary.
//!
//! These describe rows owned by the persistence collaborator. The session
//! core only produces [`ConditionTrial`] links; the rest are carried so hosts
//! share one definition of reward types, ports and calibrations.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Lookup row for a reward vocabulary entry (e.g. `water`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardType {
    pub reward_type: String,
    pub measurement_unit: String,
    pub description: String,
}

/// Lookup row for a punishment vocabulary entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PunishmentType {
    pub punishment_type: String,
    pub measurement_unit: String,
    pub description: String,
}

/// Identity of a port on a setup under one configuration version.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PortKey {
    pub setup: String,
    pub port: u8,
    pub conf_version: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    #[serde(flatten)]
    pub key: PortKey,
    pub description: String,
}

/// Liquid measured for one pulse duration during calibration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquidPulse {
    pub pulse_dur_ms: u32,
    pub pulse_num: u32,
    /// Weight of all liquid released, in grams.
    pub weight_g: f64,
    pub timestamp: DateTime<Utc>,
}

/// Liquid delivery calibration of one port. At most one per port per day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortCalibration {
    pub port: PortKey,
    pub date: NaiveDate,
    pub liquid: Vec<LiquidPulse>,
}

impl PortCalibration {
    pub fn key(&self) -> (PortKey, NaiveDate) {
        (self.port.clone(), self.date)
    }

    /// Grams released per pulse at `pulse_dur_ms`.
    ///
    /// Uses the most recent measurement for that duration. Returns `None` when
    /// the duration was not measured or no pulses were counted.
    pub fn volume_per_pulse(&self, pulse_dur_ms: u32) -> Option<f64> {
        self.liquid
            .iter()
            .filter(|pulse| pulse.pulse_dur_ms == pulse_dur_ms && pulse.pulse_num > 0)
            .max_by_key(|pulse| pulse.timestamp)
            .map(|pulse| pulse.weight_g / f64::from(pulse.pulse_num))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortTestResult {
    Passed,
    Failed,
}

/// Outcome of a port self-test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortTest {
    pub port: PortKey,
    pub timestamp: DateTime<Utc>,
    pub result: Option<PortTestResult>,
    pub pulses: Option<u32>,
}

/// Link between a session trial and the condition it ran under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionTrial {
    pub trial_idx: usize,
    pub beh_hash: String,
    /// Time from session start, in milliseconds.
    pub time_ms: u64,
}
