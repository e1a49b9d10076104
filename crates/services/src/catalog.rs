//! Exam availability checks and document loading.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;
use reqwest::header::CACHE_CONTROL;

use exam_core::Clock;
use exam_core::model::{ExamDocument, ExamKey};
use storage::ResultRepository;
use storage::keys::result_key;

use crate::error::{CatalogError, LoadError};

/// Where exam documents live. Paths are relative, e.g. `exams/physics/final/2024.json`.
#[async_trait]
pub trait ExamSource: Send + Sync {
    /// Existence check. Never fails: any error reads as "not there".
    async fn exists(&self, path: &str) -> bool;

    /// Fetch the raw document body, bypassing any cache.
    ///
    /// # Errors
    ///
    /// Returns `LoadError` on transport, status or I/O failures.
    async fn fetch(&self, path: &str) -> Result<String, LoadError>;

    fn describe(&self) -> String;
}

/// Static file host reached over HTTP.
#[derive(Clone)]
pub struct HttpExamSource {
    client: Client,
    base_url: String,
    clock: Clock,
}

impl HttpExamSource {
    #[must_use]
    pub fn new(base_url: impl Into<String>, clock: Clock) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            clock,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl ExamSource for HttpExamSource {
    async fn exists(&self, path: &str) -> bool {
        let response = self
            .client
            .head(self.url(path))
            .header(CACHE_CONTROL, "no-store")
            .send()
            .await;
        match response {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                tracing::debug!(path, error = %err, "availability check failed");
                false
            }
        }
    }

    async fn fetch(&self, path: &str) -> Result<String, LoadError> {
        let url = format!("{}?_={}", self.url(path), self.clock.now().timestamp_millis());
        let response = self
            .client
            .get(url)
            .header(CACHE_CONTROL, "no-store")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}

/// Exam tree on the local filesystem.
#[derive(Debug, Clone)]
pub struct DirExamSource {
    root: PathBuf,
}

impl DirExamSource {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ExamSource for DirExamSource {
    async fn exists(&self, path: &str) -> bool {
        tokio::fs::metadata(self.root.join(path))
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false)
    }

    async fn fetch(&self, path: &str) -> Result<String, LoadError> {
        Ok(tokio::fs::read_to_string(self.root.join(path)).await?)
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

/// Pick an HTTP source for `http(s)://` locations and a directory source otherwise.
#[must_use]
pub fn exam_source_for(location: &str, clock: Clock) -> Arc<dyn ExamSource> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Arc::new(HttpExamSource::new(location, clock))
    } else {
        Arc::new(DirExamSource::new(location))
    }
}

/// Choices offered on the selection panels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    pub subjects: Vec<String>,
    pub exam_types: Vec<String>,
    /// Newest first; listing keeps this order.
    pub years: Vec<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            subjects: ["physics", "chemistry", "biology", "mathematics"]
                .map(String::from)
                .to_vec(),
            exam_types: ["mock", "final"].map(String::from).to_vec(),
            years: (2015..=2025).rev().map(|y: u16| y.to_string()).collect(),
        }
    }
}

/// One entry of the year panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearOption {
    pub year: String,
    pub available: bool,
    /// Best percentage of a stored result, shown as a completion badge.
    pub best_percentage: Option<u32>,
}

#[derive(Clone)]
pub struct ExamCatalog {
    source: Arc<dyn ExamSource>,
    results: Arc<dyn ResultRepository>,
    config: CatalogConfig,
}

impl ExamCatalog {
    #[must_use]
    pub fn new(
        source: Arc<dyn ExamSource>,
        results: Arc<dyn ResultRepository>,
        config: CatalogConfig,
    ) -> Self {
        Self {
            source,
            results,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    #[must_use]
    pub fn source_name(&self) -> String {
        self.source.describe()
    }

    pub async fn check_availability(&self, key: &ExamKey) -> bool {
        let available = self.source.exists(&key.document_path()).await;
        tracing::debug!(exam = %key, available, "checked availability");
        available
    }

    /// Check every configured year concurrently.
    ///
    /// The output keeps the configured year order regardless of which check
    /// finishes first.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Key` for invalid segments and
    /// `CatalogError::Storage` if stored results cannot be read.
    pub async fn list_years(
        &self,
        subject: &str,
        exam_type: &str,
    ) -> Result<Vec<YearOption>, CatalogError> {
        let keys = self
            .config
            .years
            .iter()
            .map(|year| ExamKey::new(subject, exam_type, year))
            .collect::<Result<Vec<_>, _>>()?;

        let checks = join_all(keys.iter().map(|key| self.check_availability(key))).await;
        let index = self.results.load_index().await?;

        Ok(keys
            .iter()
            .zip(checks)
            .map(|(key, available)| YearOption {
                year: key.year().to_string(),
                available,
                best_percentage: index
                    .get(&result_key(key))
                    .map(|result| result.effective_best_percentage()),
            })
            .collect())
    }

    /// Fetch and parse the document for `key`, re-checking availability first.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::Unavailable` if the check fails, otherwise the
    /// fetch or parse failure.
    pub async fn load_exam(&self, key: &ExamKey) -> Result<ExamDocument, LoadError> {
        let loaded = self.fetch_document(key).await;
        match &loaded {
            Ok(document) => tracing::info!(
                exam = %key,
                questions = document.question_count(),
                "loaded exam"
            ),
            Err(err) => tracing::error!(exam = %key, error = %err, "failed to load exam"),
        }
        loaded
    }

    async fn fetch_document(&self, key: &ExamKey) -> Result<ExamDocument, LoadError> {
        if !self.check_availability(key).await {
            return Err(LoadError::Unavailable {
                key: key.to_string(),
            });
        }
        let body = self.source.fetch(&key.document_path()).await?;
        Ok(ExamDocument::from_json(&body)?)
    }
}
