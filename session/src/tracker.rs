//! Session state tracker driven by the host experiment loop.
//!
//! The tracker owns the session's choice/reward history, its timer and the
//! gating decisions (time window, hydration). Task hooks are forwarded to a
//! [`Behavior`] strategy and totals are written to a [`SessionLogger`].

use chrono::{Local, NaiveDateTime};
use tracing::{debug, trace};

use crate::behavior::{Behavior, NullBehavior};
use crate::core::conditions::{
    ConditionError, ConditionRegistry, ConditionSpec, RegistrationRequest,
};
use crate::core::history::History;
use crate::core::hydration;
use crate::core::records::ConditionTrial;
use crate::core::timer::Timer;
use crate::io::config::SessionParams;
use crate::logger::{SessionLogger, TrialRecord};

/// Default window for [`SessionTracker::get_false_history`].
pub const DEFAULT_FALSE_HISTORY: usize = 10;

/// Running state of one behavioral session.
#[derive(Debug)]
pub struct SessionTracker<L, B = NullBehavior> {
    logger: L,
    params: SessionParams,
    behavior: B,
    registry: ConditionRegistry,
    history: History,
    timer: Timer,
    rewarded_probes: u32,
    /// Reward credited outside the trial history.
    external_credit: f64,
}

impl<L: SessionLogger> SessionTracker<L> {
    /// Start a session with the no-op behavior.
    pub fn setup(logger: L, params: SessionParams) -> Self {
        Self::with_behavior(logger, params, NullBehavior)
    }
}

impl<L: SessionLogger, B: Behavior> SessionTracker<L, B> {
    /// Start a session: empty history, timer running, counters zeroed.
    ///
    /// Conditions are registered under the behavior's condition tables when
    /// it declares any, otherwise under the default registry's.
    pub fn with_behavior(logger: L, params: SessionParams, behavior: B) -> Self {
        debug!(max_reward = ?params.max_reward, "session setup");
        let default_registry = ConditionRegistry::default();
        let cond_tables = behavior.cond_tables();
        let registry = if cond_tables.is_empty() {
            default_registry
        } else {
            ConditionRegistry::new(
                default_registry.required_fields().to_vec(),
                default_registry.default_key().clone(),
                cond_tables,
            )
        };
        Self {
            logger,
            params,
            behavior,
            registry,
            history: History::new(),
            timer: Timer::start(),
            rewarded_probes: 0,
            external_credit: 0.0,
        }
    }

    /// Replace the registry used by [`Self::make_conditions`].
    pub fn with_registry(mut self, registry: ConditionRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn is_ready(&mut self, init_duration: f64, since: f64) -> (bool, f64) {
        self.behavior.is_ready(init_duration, since)
    }

    pub fn get_response(&mut self, since: f64) -> bool {
        self.behavior.get_response(since)
    }

    pub fn get_cond_tables(&self) -> Vec<String> {
        self.behavior.cond_tables()
    }

    /// Deliver a reward through the behavior. Returns false on failure.
    pub fn reward(&mut self) -> bool {
        let delivered = self.behavior.reward();
        if delivered {
            self.rewarded_probes += 1;
        }
        trace!(delivered, rewarded_probes = self.rewarded_probes, "reward");
        delivered
    }

    pub fn punish(&mut self) {
        self.behavior.punish();
    }

    pub fn cleanup(&mut self) {
        debug!(trials = self.history.len(), "session cleanup");
        self.behavior.cleanup();
    }

    pub fn prepare(&mut self, condition: &ConditionSpec) {
        self.behavior.prepare(condition);
    }

    /// Validate and enrich a batch of conditions for registration.
    pub fn make_conditions(
        &self,
        conditions: Vec<ConditionSpec>,
    ) -> Result<RegistrationRequest, ConditionError> {
        self.registry.make_conditions(conditions)
    }

    /// Record one trial outcome and refresh the logger's reward total.
    ///
    /// The total is the sum of the reward history plus any reward credited
    /// through [`Self::add_reward`].
    pub fn update_history(&mut self, choice: Option<f64>, reward: Option<f64>) {
        self.history.push(choice, reward);
        let choice = self.history.choices().last().copied().flatten();
        let reward = self.history.rewards().last().copied().flatten();
        let total_reward = self.history.total_reward() + self.external_credit;
        self.logger.set_total_reward(total_reward);

        let record = TrialRecord {
            trial_idx: self.history.len() - 1,
            choice,
            reward,
            time_ms: self.timer.elapsed_ms(),
            total_reward,
        };
        trace!(trial_idx = record.trial_idx, ?choice, ?reward, total_reward, "trial recorded");
        self.logger.log_trial(&record);
    }

    /// Credit reward given outside a trial (e.g. free water at session end).
    ///
    /// Counts toward hydration and survives later `update_history` calls.
    pub fn add_reward(&mut self, amount: f64) {
        if !amount.is_finite() {
            return;
        }
        self.external_credit += amount;
        self.logger.add_reward(amount);
        debug!(amount, total_reward = self.logger.total_reward(), "external reward credited");
    }

    /// Current failure streak within the last `h` trials.
    pub fn get_false_history(&self, h: usize) -> usize {
        self.history.failure_streak(h)
    }

    /// True when the local wall clock is outside the setup's active window.
    pub fn is_sleep_time(&self) -> bool {
        self.is_sleep_time_at(Local::now().naive_local())
    }

    pub fn is_sleep_time_at(&self, now: NaiveDateTime) -> bool {
        let setup_info = self.logger.setup_info();
        let sleeping = setup_info.is_sleep_time(now);
        trace!(%now, start = %setup_info.start_time, stop = %setup_info.stop_time, sleeping, "sleep check");
        sleeping
    }

    /// True once cumulative reward reaches `threshold`, or `max_reward` when
    /// no threshold is given.
    pub fn is_hydrated(&self, threshold: Option<f64>) -> bool {
        hydration::is_hydrated(
            self.logger.total_reward(),
            threshold,
            self.params.max_reward,
        )
    }

    /// Link the most recent trial to a registered condition.
    pub fn condition_trial(&self, beh_hash: &str) -> Option<ConditionTrial> {
        let trial_idx = self.history.len().checked_sub(1)?;
        Some(ConditionTrial {
            trial_idx,
            beh_hash: beh_hash.to_string(),
            time_ms: self.timer.elapsed().as_millis() as u64,
        })
    }

    pub fn choice_history(&self) -> &[Option<f64>] {
        self.history.choices()
    }

    pub fn reward_history(&self) -> &[Option<f64>] {
        self.history.rewards()
    }

    /// Milliseconds since setup.
    pub fn elapsed_ms(&self) -> f64 {
        self.timer.elapsed_ms()
    }

    pub fn rewarded_probes(&self) -> u32 {
        self.rewarded_probes
    }

    pub fn params(&self) -> &SessionParams {
        &self.params
    }

    pub fn behavior(&self) -> &B {
        &self.behavior
    }

    pub fn logger(&self) -> &L {
        &self.logger
    }

    pub fn logger_mut(&mut self) -> &mut L {
        &mut self.logger
    }

    /// End the session and hand the logger back to the host.
    pub fn into_logger(self) -> L {
        self.logger
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::window::SetupInfo;
    use crate::logger::MemoryLogger;
    use chrono::{NaiveDate, NaiveTime};
    use serde_json::json;

    use crate::core::conditions::condition;

    fn tracker(max_reward: Option<f64>) -> SessionTracker<MemoryLogger> {
        SessionTracker::setup(MemoryLogger::default(), SessionParams { max_reward })
    }

    #[test]
    fn setup_starts_empty() {
        let tracker = tracker(None);
        assert!(tracker.choice_history().is_empty());
        assert!(tracker.reward_history().is_empty());
        assert_eq!(tracker.rewarded_probes(), 0);
        assert_eq!(tracker.get_false_history(DEFAULT_FALSE_HISTORY), 0);
    }

    #[test]
    fn base_hooks_impose_no_gating() {
        let mut tracker = tracker(None);
        assert_eq!(tracker.is_ready(1_000.0, 0.0), (true, 0.0));
        assert!(!tracker.get_response(0.0));
        assert!(tracker.get_cond_tables().is_empty());
        assert!(tracker.reward());
        assert_eq!(tracker.rewarded_probes(), 1);
        tracker.punish();
        tracker.cleanup();
    }

    #[test]
    fn update_history_keeps_sequences_aligned_and_totals_rewards() {
        let mut tracker = tracker(None);
        tracker.update_history(Some(1.0), Some(2.0));
        tracker.update_history(None, None);
        tracker.update_history(Some(2.0), Some(0.5));

        assert_eq!(tracker.choice_history(), &[Some(1.0), None, Some(2.0)]);
        assert_eq!(tracker.reward_history(), &[Some(2.0), None, Some(0.5)]);
        assert_eq!(tracker.logger().total_reward, 2.5);
    }

    #[test]
    fn failure_streak_accumulates_and_resets() {
        let mut tracker = tracker(None);
        for _ in 0..3 {
            tracker.update_history(Some(1.0), None);
        }
        assert_eq!(tracker.get_false_history(10), 3);

        tracker.update_history(Some(1.0), Some(5.0));
        assert_eq!(tracker.get_false_history(10), 0);
    }

    #[test]
    fn hydration_follows_max_reward() {
        let mut tracker = tracker(Some(10.0));
        tracker.update_history(Some(1.0), Some(6.0));
        assert!(!tracker.is_hydrated(None));
        tracker.update_history(Some(1.0), Some(4.0));
        assert!(tracker.is_hydrated(None));
    }

    #[test]
    fn explicit_threshold_wins_over_cap() {
        let mut tracker = tracker(Some(10.0));
        tracker.update_history(Some(1.0), Some(3.0));
        assert!(tracker.is_hydrated(Some(2.0)));
    }

    #[test]
    fn uncapped_session_is_never_hydrated() {
        let mut tracker = tracker(None);
        tracker.update_history(Some(1.0), Some(500.0));
        assert!(!tracker.is_hydrated(None));
    }

    #[test]
    fn sleep_time_reads_logger_window() {
        let logger = MemoryLogger::new(SetupInfo {
            start_time: NaiveTime::from_hms_opt(22, 0, 0).expect("start"),
            stop_time: NaiveTime::from_hms_opt(6, 0, 0).expect("stop"),
        });
        let tracker = SessionTracker::setup(logger, SessionParams::default());
        let day = NaiveDate::from_ymd_opt(2024, 3, 14).expect("date");
        let at = |hour| day.and_hms_opt(hour, 0, 0).expect("time");

        assert!(!tracker.is_sleep_time_at(at(23)));
        assert!(!tracker.is_sleep_time_at(at(5)));
        assert!(tracker.is_sleep_time_at(at(12)));
    }

    #[test]
    fn make_conditions_uses_registry_defaults() {
        let tracker = tracker(None);
        let request = tracker
            .make_conditions(vec![condition(json!({ "port_id": 1, "reward_amount": 5 }))])
            .expect("register");
        assert_eq!(request.conditions[0]["reward_type"], json!("water"));
        assert_eq!(request.conditions[0]["conf_version"], json!(1));
    }

    #[test]
    fn external_credit_survives_later_trials() {
        let mut tracker = tracker(Some(3.0));
        tracker.add_reward(3.0);
        assert!(tracker.is_hydrated(None));

        tracker.update_history(Some(1.0), Some(1.0));
        assert_eq!(tracker.logger().total_reward, 4.0);
        assert!(tracker.is_hydrated(None));
    }

    #[test]
    fn nan_reward_does_not_disable_hydration() {
        let mut tracker = tracker(Some(1.0));
        tracker.update_history(Some(1.0), Some(f64::NAN));
        assert_eq!(tracker.reward_history(), &[None]);
        assert_eq!(tracker.get_false_history(10), 1);

        tracker.update_history(Some(1.0), Some(5.0));
        assert_eq!(tracker.logger().total_reward, 5.0);
        assert!(tracker.is_hydrated(None));
        assert_eq!(tracker.get_false_history(10), 0);
    }

    struct FreeWater;

    impl Behavior for FreeWater {
        fn cond_tables(&self) -> Vec<String> {
            vec!["FreeWater".to_string()]
        }
    }

    #[test]
    fn registry_follows_behavior_cond_tables() {
        let tracker = SessionTracker::with_behavior(
            MemoryLogger::default(),
            SessionParams::default(),
            FreeWater,
        );
        let request = tracker
            .make_conditions(vec![condition(json!({ "port_id": 1, "reward_amount": 5 }))])
            .expect("register");
        assert_eq!(request.condition_tables, vec!["BehCondition", "FreeWater"]);
        assert_eq!(request.conditions[0]["behavior_class"], json!("FreeWater"));
        assert_eq!(request.conditions[0]["reward_type"], json!("water"));
    }

    #[test]
    fn condition_trial_links_latest_trial() {
        let mut tracker = tracker(None);
        assert_eq!(tracker.condition_trial("abc"), None);
        tracker.update_history(Some(1.0), None);
        tracker.update_history(Some(1.0), None);
        let link = tracker.condition_trial("abc").expect("link");
        assert_eq!(link.trial_idx, 1);
        assert_eq!(link.beh_hash, "abc");
    }
}
