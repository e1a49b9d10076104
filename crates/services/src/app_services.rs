use std::sync::Arc;

use exam_core::navigation::Flow;
use exam_core::timer::TimerPolicy;
use storage::{SessionRepository, Storage};

use crate::Clock;
use crate::attempt::AttemptController;
use crate::catalog::{CatalogConfig, ExamCatalog, ExamSource};
use crate::error::AppServicesError;
use crate::history::HistoryService;
use crate::preferences::PreferenceService;
use crate::results::ResultService;

/// Knobs the composition root reads from configuration.
#[derive(Debug, Clone, Default)]
pub struct ServiceOptions {
    pub flow: Flow,
    pub catalog: CatalogConfig,
    pub timer: TimerPolicy,
}

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    flow: Flow,
    catalog: Arc<ExamCatalog>,
    attempts: Arc<AttemptController>,
    results: Arc<ResultService>,
    history: Arc<HistoryService>,
    preferences: Arc<PreferenceService>,
    sessions: Arc<dyn SessionRepository>,
}

impl AppServices {
    #[must_use]
    pub fn from_storage(
        storage: &Storage,
        source: Arc<dyn ExamSource>,
        options: ServiceOptions,
        clock: Clock,
    ) -> Self {
        let catalog = Arc::new(ExamCatalog::new(
            source,
            Arc::clone(&storage.results),
            options.catalog,
        ));
        let attempts = Arc::new(AttemptController::new(
            clock.clone(),
            options.timer,
            Arc::clone(&storage.exam_states),
        ));
        let results = Arc::new(ResultService::new(
            clock.clone(),
            Arc::clone(&storage.results),
            Arc::clone(&storage.exam_states),
        ));
        let history = Arc::new(HistoryService::new(Arc::clone(&storage.results)));
        let preferences = Arc::new(PreferenceService::new(Arc::clone(&storage.preferences)));

        Self {
            clock,
            flow: options.flow,
            catalog,
            attempts,
            results,
            history,
            preferences,
            sessions: Arc::clone(&storage.sessions),
        }
    }

    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        source: Arc<dyn ExamSource>,
        options: ServiceOptions,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        tracing::info!(source = %source.describe(), "services ready");
        Ok(Self::from_storage(&storage, source, options, clock))
    }

    #[must_use]
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    #[must_use]
    pub fn flow(&self) -> Flow {
        self.flow
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<ExamCatalog> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn attempts(&self) -> Arc<AttemptController> {
        Arc::clone(&self.attempts)
    }

    #[must_use]
    pub fn results(&self) -> Arc<ResultService> {
        Arc::clone(&self.results)
    }

    #[must_use]
    pub fn history(&self) -> Arc<HistoryService> {
        Arc::clone(&self.history)
    }

    #[must_use]
    pub fn preferences(&self) -> Arc<PreferenceService> {
        Arc::clone(&self.preferences)
    }

    #[must_use]
    pub fn sessions(&self) -> Arc<dyn SessionRepository> {
        Arc::clone(&self.sessions)
    }
}
