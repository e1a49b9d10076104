use std::sync::Arc;

use exam_core::model::ExamResult;
use storage::{ResultRepository, StorageError};

/// Read side of the result index.
#[derive(Clone)]
pub struct HistoryService {
    results: Arc<dyn ResultRepository>,
}

impl HistoryService {
    #[must_use]
    pub fn new(results: Arc<dyn ResultRepository>) -> Self {
        Self { results }
    }

    /// Every stored result, most recent attempt first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the index cannot be read.
    pub async fn list(&self) -> Result<Vec<ExamResult>, StorageError> {
        let index = self.results.load_index().await?;
        Ok(index.by_recency())
    }
}
