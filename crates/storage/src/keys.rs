//! Storage key layout. Values under these keys are JSON except the theme.

use exam_core::model::ExamKey;

pub const THEME_KEY: &str = "theme";
pub const SESSION_KEY: &str = "exam_session";
pub const RESULT_INDEX_KEY: &str = "all_exam_results";

const RESULT_PREFIX: &str = "exam_result_";
const STATE_PREFIX: &str = "exam_state_";

#[must_use]
pub fn result_key(key: &ExamKey) -> String {
    format!("{RESULT_PREFIX}{}", key.storage_suffix())
}

#[must_use]
pub fn state_key(key: &ExamKey) -> String {
    format!("{STATE_PREFIX}{}", key.storage_suffix())
}
