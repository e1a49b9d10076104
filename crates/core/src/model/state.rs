use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::time::seconds_between;

/// In-progress snapshot of a timed attempt, persisted on every tick.
///
/// `elapsed_time` is always recomputed from `start_time`; it is stored for
/// inspection only and never fed back into the countdown. A paused attempt
/// carries `paused_at`, and elapsed time stops there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamState {
    #[serde(default)]
    answers: BTreeMap<usize, usize>,
    start_time: DateTime<Utc>,
    #[serde(default)]
    elapsed_time: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    paused_at: Option<DateTime<Utc>>,
}

impl ExamState {
    #[must_use]
    pub fn new(start_time: DateTime<Utc>) -> Self {
        Self {
            answers: BTreeMap::new(),
            start_time,
            elapsed_time: 0,
            paused_at: None,
        }
    }

    #[must_use]
    pub fn from_parts(
        answers: BTreeMap<usize, usize>,
        start_time: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            answers,
            start_time,
            elapsed_time: seconds_between(start_time, now),
            paused_at: None,
        }
    }

    /// Marks the snapshot as paused at `at`, freezing the elapsed time.
    #[must_use]
    pub fn paused(mut self, at: Option<DateTime<Utc>>) -> Self {
        if let Some(at) = at {
            self.elapsed_time = seconds_between(self.start_time, at);
        }
        self.paused_at = at;
        self
    }

    #[must_use]
    pub fn answers(&self) -> &BTreeMap<usize, usize> {
        &self.answers
    }

    #[must_use]
    pub fn into_answers(self) -> BTreeMap<usize, usize> {
        self.answers
    }

    #[must_use]
    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    #[must_use]
    pub fn elapsed_time(&self) -> u64 {
        self.elapsed_time
    }

    #[must_use]
    pub fn paused_at(&self) -> Option<DateTime<Utc>> {
        self.paused_at
    }

    /// Elapsed seconds at `now`, derived from the start timestamp.
    #[must_use]
    pub fn elapsed_at(&self, now: DateTime<Utc>) -> u64 {
        seconds_between(self.start_time, self.paused_at.unwrap_or(now))
    }
}
