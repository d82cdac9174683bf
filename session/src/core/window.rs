//! Time-of-day window used to decide whether the setup should be idle.

use chrono::{Duration, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Daily active window of a setup, as offsets from midnight.
///
/// A `stop_time` earlier than `start_time` describes a window that spans
/// midnight (e.g. 22:00 → 06:00 the next morning).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupInfo {
    pub start_time: NaiveTime,
    pub stop_time: NaiveTime,
}

impl Default for SetupInfo {
    fn default() -> Self {
        Self {
            start_time: NaiveTime::MIN,
            stop_time: NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999)
                .unwrap_or(NaiveTime::MIN),
        }
    }
}

impl SetupInfo {
    pub fn spans_midnight(&self) -> bool {
        self.stop_time < self.start_time
    }

    /// True when `now` falls outside the active window.
    ///
    /// Both bounds count as active. For windows spanning midnight, the window
    /// that started the previous evening is considered as well.
    pub fn is_sleep_time(&self, now: NaiveDateTime) -> bool {
        let midnight = now.date().and_time(NaiveTime::MIN);
        let start = midnight + offset(self.start_time);
        let mut stop = midnight + offset(self.stop_time);
        if stop < start {
            stop += Duration::days(1);
        }
        let active_today = now >= start && now <= stop;
        let active_since_yesterday =
            self.spans_midnight() && now <= midnight + offset(self.stop_time);
        !(active_today || active_since_yesterday)
    }
}

fn offset(time: NaiveTime) -> Duration {
    time.signed_duration_since(NaiveTime::MIN)
}
