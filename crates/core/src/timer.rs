//! Countdown for timed full-exam attempts.
//!
//! Remaining time is always computed from `now - started_at`. Pausing
//! freezes the reference instant; resuming shifts `started_at` forward by
//! the paused span so the same formula keeps holding after a reload.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::time::seconds_between;

/// Remaining time at which the one-off warning fires.
pub const WARNING_THRESHOLD_SECS: u64 = 5 * 60;

/// Duration class of an exam type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationClass {
    Standard,
    Extended,
}

impl DurationClass {
    #[must_use]
    pub fn seconds(self) -> u64 {
        match self {
            DurationClass::Standard => 60 * 60,
            DurationClass::Extended => 120 * 60,
        }
    }
}

/// Maps exam types to a duration class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerPolicy {
    extended_types: BTreeSet<String>,
}

impl TimerPolicy {
    #[must_use]
    pub fn new<I, S>(extended_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extended_types: extended_types
                .into_iter()
                .map(|t| t.as_ref().trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    #[must_use]
    pub fn class_for(&self, exam_type: &str) -> DurationClass {
        if self.extended_types.contains(&exam_type.to_lowercase()) {
            DurationClass::Extended
        } else {
            DurationClass::Standard
        }
    }

    #[must_use]
    pub fn duration_for(&self, exam_type: &str) -> u64 {
        self.class_for(exam_type).seconds()
    }
}

impl Default for TimerPolicy {
    fn default() -> Self {
        Self::new(["final"])
    }
}

/// What a tick means for the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickEvent {
    Running,
    Paused,
    /// Remaining time crossed the warning threshold; fires once.
    Warning,
    /// Time ran out on this tick; the attempt must be submitted.
    Expired,
    /// Already expired earlier; nothing left to do.
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub remaining_secs: u64,
    pub elapsed_secs: u64,
    /// Share of the duration already used, 0..=100.
    pub progress_percent: u8,
    pub event: TickEvent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    duration_secs: u64,
    started_at: DateTime<Utc>,
    paused_at: Option<DateTime<Utc>>,
    warned: bool,
    expired: bool,
}

impl Countdown {
    #[must_use]
    pub fn start(duration_secs: u64, now: DateTime<Utc>) -> Self {
        Self::resume_from(duration_secs, now)
    }

    /// Rebuild a countdown from a persisted start timestamp.
    #[must_use]
    pub fn resume_from(duration_secs: u64, started_at: DateTime<Utc>) -> Self {
        Self {
            duration_secs,
            started_at,
            paused_at: None,
            warned: false,
            expired: false,
        }
    }

    #[must_use]
    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    #[must_use]
    pub fn paused_at(&self) -> Option<DateTime<Utc>> {
        self.paused_at
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expired
    }

    #[must_use]
    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> u64 {
        let reference = self.paused_at.unwrap_or(now);
        seconds_between(self.started_at, reference).min(self.duration_secs)
    }

    #[must_use]
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> u64 {
        self.duration_secs.saturating_sub(self.elapsed_secs(now))
    }

    #[must_use]
    pub fn progress_percent(&self, now: DateTime<Utc>) -> u8 {
        if self.duration_secs == 0 {
            return 100;
        }
        let pct = self.elapsed_secs(now) * 100 / self.duration_secs;
        u8::try_from(pct.min(100)).unwrap_or(100)
    }

    pub fn pause(&mut self, now: DateTime<Utc>) {
        if self.paused_at.is_none() && !self.expired {
            self.paused_at = Some(now);
        }
    }

    pub fn resume(&mut self, now: DateTime<Utc>) {
        if let Some(paused_at) = self.paused_at.take() {
            if now > paused_at {
                self.started_at += now - paused_at;
            }
        }
    }

    /// Restart from the full duration.
    pub fn restart(&mut self, now: DateTime<Utc>) {
        *self = Self::start(self.duration_secs, now);
    }

    /// Advance the countdown to `now`.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Tick {
        let event = if self.expired {
            TickEvent::Stopped
        } else if self.is_paused() {
            TickEvent::Paused
        } else {
            let remaining = self.remaining_secs(now);
            if remaining == 0 {
                self.expired = true;
                self.warned = true;
                TickEvent::Expired
            } else if remaining <= WARNING_THRESHOLD_SECS && !self.warned {
                self.warned = true;
                TickEvent::Warning
            } else {
                TickEvent::Running
            }
        };

        Tick {
            remaining_secs: self.remaining_secs(now),
            elapsed_secs: self.elapsed_secs(now),
            progress_percent: self.progress_percent(now),
            event,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    #[test]
    fn policy_has_two_duration_classes() {
        let policy = TimerPolicy::new(["Final"]);
        assert_eq!(policy.class_for("final"), DurationClass::Extended);
        assert_eq!(policy.duration_for("mock"), 3600);
        assert_eq!(policy.duration_for("FINAL"), 7200);
    }

    #[test]
    fn countdown_decrements_with_wall_clock() {
        let start = fixed_now();
        let mut countdown = Countdown::start(600, start);
        let tick = countdown.tick(start + Duration::seconds(30));
        assert_eq!(tick.remaining_secs, 570);
        assert_eq!(tick.progress_percent, 5);
        assert_eq!(tick.event, TickEvent::Running);
    }

    #[test]
    fn warning_fires_once() {
        let start = fixed_now();
        let mut countdown = Countdown::start(600, start);
        let first = countdown.tick(start + Duration::seconds(300));
        assert_eq!(first.event, TickEvent::Warning);
        let second = countdown.tick(start + Duration::seconds(301));
        assert_eq!(second.event, TickEvent::Running);
        let later = countdown.tick(start + Duration::seconds(500));
        assert_eq!(later.event, TickEvent::Running);
    }

    #[test]
    fn expiry_fires_once_then_stops() {
        let start = fixed_now();
        let mut countdown = Countdown::start(60, start);
        let tick = countdown.tick(start + Duration::seconds(61));
        assert_eq!(tick.event, TickEvent::Expired);
        assert_eq!(tick.remaining_secs, 0);
        assert_eq!(countdown.tick(start + Duration::seconds(62)).event, TickEvent::Stopped);
    }

    #[test]
    fn paused_clock_does_not_move() {
        let start = fixed_now();
        let mut countdown = Countdown::start(600, start);
        countdown.pause(start + Duration::seconds(100));

        let tick = countdown.tick(start + Duration::seconds(400));
        assert_eq!(tick.event, TickEvent::Paused);
        assert_eq!(tick.remaining_secs, 500);

        countdown.resume(start + Duration::seconds(400));
        assert_eq!(countdown.started_at(), start + Duration::seconds(300));
        let tick = countdown.tick(start + Duration::seconds(410));
        assert_eq!(tick.remaining_secs, 490);
    }

    #[test]
    fn resumed_countdown_accrues_time_while_closed() {
        let start = fixed_now();
        let mut countdown = Countdown::resume_from(3600, start);
        let tick = countdown.tick(start + Duration::minutes(20));
        assert_eq!(tick.remaining_secs, 2400);
        assert_eq!(tick.elapsed_secs, 1200);
    }

    #[test]
    fn restart_resets_duration_and_flags() {
        let start = fixed_now();
        let mut countdown = Countdown::start(60, start);
        countdown.tick(start + Duration::seconds(61));
        assert!(countdown.is_expired());
        countdown.restart(start + Duration::seconds(70));
        assert!(!countdown.is_expired());
        assert_eq!(countdown.remaining_secs(start + Duration::seconds(70)), 60);
    }
}
