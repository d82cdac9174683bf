//! Task-specific behavior strategies plugged into the session tracker.
//!
//! [`Behavior`] provides no-op defaults for every hook. [`NullBehavior`] uses
//! them unchanged; [`ProbeBehavior`] drives a lick-port task through a
//! [`ProbeSensor`].

use std::time::Duration;

use anyhow::Result;
use serde_json::Value;
use tracing::{debug, warn};

use crate::core::conditions::ConditionSpec;

/// Hooks the host loop reaches through the tracker.
pub trait Behavior {
    /// Whether the subject is ready to start a trial, and for how long (ms)
    /// the ready condition has held.
    fn is_ready(&mut self, _init_duration: f64, _since: f64) -> (bool, f64) {
        (true, 0.0)
    }

    /// Whether a response was detected after `since` ms.
    fn get_response(&mut self, _since: f64) -> bool {
        false
    }

    /// Persistence tables describing this behavior's conditions.
    fn cond_tables(&self) -> Vec<String> {
        Vec::new()
    }

    /// Deliver a reward. Returns false if delivery failed.
    fn reward(&mut self) -> bool {
        true
    }

    fn punish(&mut self) {}

    /// Release resources acquired during the session.
    fn cleanup(&mut self) {}

    /// Load the condition for the upcoming trial.
    fn prepare(&mut self, _condition: &ConditionSpec) {}
}

/// Behavior without hardware: always ready, never responds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NullBehavior;

impl Behavior for NullBehavior {}

/// A probe contact reported by the sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeContact {
    pub port: u8,
    /// Time from session start, in milliseconds.
    pub time_ms: f64,
}

/// Hardware seam for lick-port tasks.
pub trait ProbeSensor {
    /// How long the subject has held the ready position, if it is in position.
    fn position_held(&mut self) -> Option<Duration>;

    /// Most recent probe contact.
    fn last_contact(&mut self) -> Option<ProbeContact>;

    /// Release `amount` of liquid at `port`.
    fn deliver(&mut self, port: u8, amount: f64) -> Result<()>;

    fn punish(&mut self) -> Result<()> {
        Ok(())
    }

    fn release(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PreparedReward {
    port: u8,
    amount: f64,
}

/// Lick-port behavior: reward is released at the condition's port.
#[derive(Debug)]
pub struct ProbeBehavior<S> {
    sensor: S,
    prepared: Option<PreparedReward>,
}

impl<S: ProbeSensor> ProbeBehavior<S> {
    pub fn new(sensor: S) -> Self {
        Self {
            sensor,
            prepared: None,
        }
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    /// Port that the next reward will be delivered to.
    pub fn prepared_port(&self) -> Option<u8> {
        self.prepared.map(|prepared| prepared.port)
    }
}

impl<S: ProbeSensor> Behavior for ProbeBehavior<S> {
    fn is_ready(&mut self, init_duration: f64, _since: f64) -> (bool, f64) {
        match self.sensor.position_held() {
            Some(held) => {
                let held_ms = held.as_micros() as f64 / 1_000.0;
                (held_ms >= init_duration, held_ms)
            }
            None => (false, 0.0),
        }
    }

    fn get_response(&mut self, since: f64) -> bool {
        self.sensor
            .last_contact()
            .is_some_and(|contact| contact.time_ms > since)
    }

    fn cond_tables(&self) -> Vec<String> {
        vec!["Reward".to_string()]
    }

    fn reward(&mut self) -> bool {
        let Some(prepared) = self.prepared else {
            warn!("reward requested before a condition was prepared");
            return false;
        };
        match self.sensor.deliver(prepared.port, prepared.amount) {
            Ok(()) => {
                debug!(port = prepared.port, amount = prepared.amount, "reward delivered");
                true
            }
            Err(err) => {
                warn!(port = prepared.port, error = %err, "reward delivery failed");
                false
            }
        }
    }

    fn punish(&mut self) {
        if let Err(err) = self.sensor.punish() {
            warn!(error = %err, "punishment failed");
        }
    }

    fn cleanup(&mut self) {
        self.sensor.release();
        self.prepared = None;
    }

    fn prepare(&mut self, condition: &ConditionSpec) {
        let port = condition
            .get("port_id")
            .and_then(Value::as_u64)
            .and_then(|port| u8::try_from(port).ok());
        let amount = condition.get("reward_amount").and_then(Value::as_f64);
        self.prepared = match (port, amount) {
            (Some(port), Some(amount)) => Some(PreparedReward { port, amount }),
            _ => {
                warn!("condition lacks a usable port_id or reward_amount");
                None
            }
        };
    }
}
