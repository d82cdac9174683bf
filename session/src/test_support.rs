//! Test-only helpers for building sessions and scripted hardware.

use std::collections::VecDeque;
use std::time::Duration;

use anyhow::{Result, anyhow};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::json;

use crate::behavior::{ProbeContact, ProbeSensor};
use crate::core::conditions::{ConditionSpec, condition};
use crate::core::window::SetupInfo;

/// Setup window from `(hour, minute)` bounds.
pub fn window(start: (u32, u32), stop: (u32, u32)) -> SetupInfo {
    SetupInfo {
        start_time: time_of_day(start.0, start.1),
        stop_time: time_of_day(stop.0, stop.1),
    }
}

/// A fixed date at the given time of day.
pub fn at(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 14)
        .expect("valid date")
        .and_time(time_of_day(hour, minute))
}

fn time_of_day(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).expect("valid time of day")
}

/// Condition with the required reward fields only.
pub fn reward_condition(port_id: u8, reward_amount: f64) -> ConditionSpec {
    condition(json!({ "port_id": port_id, "reward_amount": reward_amount }))
}

/// One scripted sensor reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorStep {
    /// Subject held position for this long.
    Held(Duration),
    /// Subject is out of position.
    Away,
    /// Probe touched at `port` at `time_ms`.
    Lick { port: u8, time_ms: f64 },
}

/// Sensor that replays scripted readings and records deliveries.
#[derive(Debug, Default)]
pub struct ScriptedSensor {
    steps: VecDeque<SensorStep>,
    failing_deliveries: usize,
    last_contact: Option<ProbeContact>,
    pub delivered: Vec<(u8, f64)>,
    pub punishments: usize,
    pub released: bool,
}

impl ScriptedSensor {
    pub fn new(steps: impl IntoIterator<Item = SensorStep>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Make the next `count` deliveries fail.
    pub fn fail_deliveries(mut self, count: usize) -> Self {
        self.failing_deliveries = count;
        self
    }

    fn advance(&mut self) -> Option<SensorStep> {
        let step = self.steps.pop_front();
        if let Some(SensorStep::Lick { port, time_ms }) = step {
            self.last_contact = Some(ProbeContact { port, time_ms });
        }
        step
    }
}

impl ProbeSensor for ScriptedSensor {
    fn position_held(&mut self) -> Option<Duration> {
        match self.advance() {
            Some(SensorStep::Held(held)) => Some(held),
            _ => None,
        }
    }

    fn last_contact(&mut self) -> Option<ProbeContact> {
        self.advance();
        self.last_contact
    }

    fn deliver(&mut self, port: u8, amount: f64) -> Result<()> {
        if self.failing_deliveries > 0 {
            self.failing_deliveries -= 1;
            return Err(anyhow!("valve on port {port} did not open"));
        }
        self.delivered.push((port, amount));
        Ok(())
    }

    fn punish(&mut self) -> Result<()> {
        self.punishments += 1;
        Ok(())
    }

    fn release(&mut self) {
        self.released = true;
    }
}
