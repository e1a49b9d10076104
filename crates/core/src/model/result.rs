use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::key::{ExamKey, KeyError};
use crate::model::session::ExamMode;

fn one() -> u32 {
    1
}

/// Best-effort summary of every completed attempt at one exam.
///
/// Last-attempt fields (`score`, `percentage`, `time_taken`, `timestamp`,
/// `last_attempt`) are overwritten on every attempt; `best_*` fields only
/// ever improve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamResult {
    pub subject: String,
    #[serde(rename = "type")]
    pub exam_type: String,
    pub year: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<ExamMode>,
    pub score: u32,
    pub total: u32,
    pub percentage: u32,
    #[serde(default)]
    pub best_score: u32,
    #[serde(default)]
    pub best_percentage: u32,
    #[serde(default = "one")]
    pub attempts: u32,
    pub timestamp: DateTime<Utc>,
    pub last_attempt: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_taken: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_time: Option<u64>,
}

impl ExamResult {
    /// # Errors
    ///
    /// Returns `KeyError` if the stored subject/type/year are not valid.
    pub fn exam_key(&self) -> Result<ExamKey, KeyError> {
        ExamKey::new(&self.subject, &self.exam_type, &self.year)
    }

    #[must_use]
    pub fn title(&self) -> String {
        format!(
            "{} {} - {}",
            self.subject.to_uppercase(),
            self.exam_type.to_uppercase(),
            self.year
        )
    }

    /// Best score, tolerating records written before bests were tracked.
    #[must_use]
    pub fn effective_best_score(&self) -> u32 {
        self.best_score.max(self.score)
    }

    #[must_use]
    pub fn effective_best_percentage(&self) -> u32 {
        self.best_percentage.max(self.percentage)
    }

    #[must_use]
    pub fn is_repeat(&self) -> bool {
        self.attempts > 1
    }

    /// True when the last attempt's time differs from the best time.
    #[must_use]
    pub fn time_differs_from_best(&self) -> bool {
        match (self.time_taken, self.best_time) {
            (Some(taken), Some(best)) => taken != best,
            _ => false,
        }
    }
}

/// Every stored result, keyed by its result storage key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultIndex(BTreeMap<String, ExamResult>);

impl ResultIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&mut self, key: impl Into<String>, result: ExamResult) {
        self.0.insert(key.into(), result);
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ExamResult> {
        self.0.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ExamResult)> {
        self.0.iter()
    }

    /// Results ordered by most recent attempt first.
    ///
    /// Ties fall back to the storage key so the order is stable across calls.
    #[must_use]
    pub fn by_recency(&self) -> Vec<ExamResult> {
        let mut entries: Vec<(&String, &ExamResult)> = self.0.iter().collect();
        entries.sort_by(|(left_key, left), (right_key, right)| {
            right
                .last_attempt
                .cmp(&left.last_attempt)
                .then_with(|| left_key.cmp(right_key))
        });
        entries.into_iter().map(|(_, result)| result.clone()).collect()
    }
}
