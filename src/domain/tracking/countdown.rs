//! Time remaining / elapsed arithmetic

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::shared::types::{CountdownMode, TrackingSettings};

const MS_PER_SECOND: i64 = 1_000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

/// Remaining time decomposed into whole units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub struct TimeRemaining {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub total_ms: i64,
}

impl TimeRemaining {
    fn from_millis(remaining: i64) -> Self {
        if remaining <= 0 {
            return Self::default();
        }
        Self {
            days: remaining / MS_PER_DAY,
            hours: (remaining % MS_PER_DAY) / MS_PER_HOUR,
            minutes: (remaining % MS_PER_HOUR) / MS_PER_MINUTE,
            seconds: (remaining % MS_PER_MINUTE) / MS_PER_SECOND,
            total_ms: remaining,
        }
    }

    pub fn is_over(&self) -> bool {
        self.total_ms == 0
    }
}

/// Countdown figures in the flavour a deployment selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Countdown {
    Clock(TimeRemaining),
    Days { elapsed: i64, remaining: i64 },
}

/// `days` long window starting at `start`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackingWindow {
    start: DateTime<Utc>,
    days: i64,
}

impl TrackingWindow {
    pub fn new(start: DateTime<Utc>, days: i64) -> Self {
        Self { start, days }
    }

    pub fn from_settings(settings: &TrackingSettings) -> Self {
        Self::new(settings.start, settings.days)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn days(&self) -> i64 {
        self.days
    }

    /// `None` when the end falls outside the representable date range
    pub fn checked_end(&self) -> Option<DateTime<Utc>> {
        Duration::try_days(self.days).and_then(|length| self.start.checked_add_signed(length))
    }

    /// Window end, saturated at the representable date range
    pub fn end(&self) -> DateTime<Utc> {
        self.checked_end().unwrap_or(if self.days < 0 {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        })
    }

    /// End minus now, floored at zero
    pub fn time_remaining(&self, now: DateTime<Utc>) -> TimeRemaining {
        TimeRemaining::from_millis((self.end() - now).num_milliseconds())
    }

    /// Whole days since start, rounded down (negative before start)
    pub fn days_elapsed(&self, now: DateTime<Utc>) -> i64 {
        (now - self.start).num_milliseconds().div_euclid(MS_PER_DAY)
    }

    /// Window length minus elapsed days. Not clamped: goes negative once
    /// the window has lapsed.
    pub fn days_remaining(&self, now: DateTime<Utc>) -> i64 {
        self.days.saturating_sub(self.days_elapsed(now))
    }

    pub fn countdown(&self, mode: CountdownMode, now: DateTime<Utc>) -> Countdown {
        match mode {
            CountdownMode::Clock => Countdown::Clock(self.time_remaining(now)),
            CountdownMode::Days => Countdown::Days {
                elapsed: self.days_elapsed(now),
                remaining: self.days_remaining(now),
            },
        }
    }
}
