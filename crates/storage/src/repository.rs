use async_trait::async_trait;
use exam_core::model::{ExamKey, ExamResult, ExamState, ResultIndex, Session, Theme};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::keys::{RESULT_INDEX_KEY, SESSION_KEY, THEME_KEY, result_key, state_key};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn encode<T: Serialize>(value: &T) -> Result<String, StorageError> {
    serde_json::to_string(value).map_err(ser)
}

fn decode<T: DeserializeOwned>(raw: &str) -> Result<T, StorageError> {
    serde_json::from_str(raw).map_err(ser)
}

/// Raw string key/value persistence, the analogue of browser local storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    async fn put(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a key; missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Write several entries as one unit.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if any entry cannot be stored; no entry is
    /// written in that case.
    async fn put_all(&self, entries: &[(String, String)]) -> Result<(), StorageError>;
}

#[async_trait]
pub trait PreferenceRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_theme(&self) -> Result<Option<Theme>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn save_theme(&self, theme: Theme) -> Result<(), StorageError>;
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Load the persisted session. Malformed data is logged and treated as absent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn load_session(&self) -> Result<Option<Session>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend or encoding failures.
    async fn save_session(&self, session: &Session) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn clear_session(&self) -> Result<(), StorageError>;
}

#[async_trait]
pub trait ExamStateRepository: Send + Sync {
    /// Load in-progress state. Malformed data is logged and treated as absent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn load_state(&self, key: &ExamKey) -> Result<Option<ExamState>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend or encoding failures.
    async fn save_state(&self, key: &ExamKey, state: &ExamState) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn delete_state(&self, key: &ExamKey) -> Result<(), StorageError>;
}

#[async_trait]
pub trait ResultRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` on backend or decoding failures.
    async fn get_result(&self, key: &ExamKey) -> Result<Option<ExamResult>, StorageError>;

    /// Persist a result under its own key and mirror it into the index.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend or encoding failures.
    async fn save_result(&self, result: &ExamResult) -> Result<(), StorageError>;

    /// A malformed index reads as empty; the next save rebuilds it.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn load_index(&self) -> Result<ResultIndex, StorageError>;
}

/// Typed repositories layered over any `KeyValueStore`.
#[derive(Clone)]
pub struct KeyValueRepository {
    store: Arc<dyn KeyValueStore>,
}

impl KeyValueRepository {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    async fn load_lenient<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<T>, StorageError> {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                tracing::warn!(key, error = %err, "discarding malformed persisted value");
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl PreferenceRepository for KeyValueRepository {
    async fn get_theme(&self) -> Result<Option<Theme>, StorageError> {
        let raw = self.store.get(THEME_KEY).await?;
        Ok(raw.and_then(|value| value.parse().ok()))
    }

    async fn save_theme(&self, theme: Theme) -> Result<(), StorageError> {
        self.store.put(THEME_KEY, theme.as_str()).await
    }
}

#[async_trait]
impl SessionRepository for KeyValueRepository {
    async fn load_session(&self) -> Result<Option<Session>, StorageError> {
        self.load_lenient(SESSION_KEY).await
    }

    async fn save_session(&self, session: &Session) -> Result<(), StorageError> {
        self.store.put(SESSION_KEY, &encode(session)?).await
    }

    async fn clear_session(&self) -> Result<(), StorageError> {
        self.store.delete(SESSION_KEY).await
    }
}

#[async_trait]
impl ExamStateRepository for KeyValueRepository {
    async fn load_state(&self, key: &ExamKey) -> Result<Option<ExamState>, StorageError> {
        self.load_lenient(&state_key(key)).await
    }

    async fn save_state(&self, key: &ExamKey, state: &ExamState) -> Result<(), StorageError> {
        self.store.put(&state_key(key), &encode(state)?).await
    }

    async fn delete_state(&self, key: &ExamKey) -> Result<(), StorageError> {
        self.store.delete(&state_key(key)).await
    }
}

#[async_trait]
impl ResultRepository for KeyValueRepository {
    async fn get_result(&self, key: &ExamKey) -> Result<Option<ExamResult>, StorageError> {
        match self.store.get(&result_key(key)).await? {
            Some(raw) => decode(&raw).map(Some),
            None => Ok(None),
        }
    }

    async fn save_result(&self, result: &ExamResult) -> Result<(), StorageError> {
        let key = result_key(&result.exam_key().map_err(ser)?);
        let mut index = self.load_index().await?;
        index.upsert(key.clone(), result.clone());

        let entries = vec![
            (key, encode(result)?),
            (RESULT_INDEX_KEY.to_string(), encode(&index)?),
        ];
        self.store.put_all(&entries).await
    }

    async fn load_index(&self) -> Result<ResultIndex, StorageError> {
        Ok(self
            .load_lenient(RESULT_INDEX_KEY)
            .await?
            .unwrap_or_default())
    }
}

/// Simple in-memory store for tests and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a raw value without going through the async trait.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .ok()
            .and_then(|guard| guard.get(key).cloned())
    }

    /// Overwrite a raw value, e.g. to simulate corrupted persisted state.
    pub fn insert_raw(&self, key: &str, value: &str) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.insert(key.to_string(), value.to_string());
        }
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(key);
        Ok(())
    }

    async fn put_all(&self, entries: &[(String, String)]) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        for (key, value) in entries {
            guard.insert(key.clone(), value.clone());
        }
        Ok(())
    }
}

/// Aggregates the typed repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub preferences: Arc<dyn PreferenceRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub exam_states: Arc<dyn ExamStateRepository>,
    pub results: Arc<dyn ResultRepository>,
}

impl Storage {
    #[must_use]
    pub fn from_store(store: Arc<dyn KeyValueStore>) -> Self {
        let repo = KeyValueRepository::new(store);
        Self {
            preferences: Arc::new(repo.clone()),
            sessions: Arc::new(repo.clone()),
            exam_states: Arc::new(repo.clone()),
            results: Arc::new(repo),
        }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(InMemoryStore::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::model::ExamMode;
    use exam_core::time::fixed_now;
    use std::collections::BTreeMap;

    fn key() -> ExamKey {
        ExamKey::new("physics", "final", "2024").unwrap()
    }

    fn result(score: u32) -> ExamResult {
        ExamResult {
            subject: "physics".into(),
            exam_type: "final".into(),
            year: "2024".into(),
            mode: Some(ExamMode::Full),
            score,
            total: 2,
            percentage: score * 50,
            best_score: score,
            best_percentage: score * 50,
            attempts: 1,
            timestamp: fixed_now(),
            last_attempt: fixed_now(),
            time_taken: Some(120),
            best_time: Some(120),
        }
    }

    #[tokio::test]
    async fn result_write_updates_index() {
        let store = InMemoryStore::new();
        let repo = KeyValueRepository::new(Arc::new(store.clone()));

        repo.save_result(&result(1)).await.unwrap();
        repo.save_result(&result(2)).await.unwrap();

        let stored = repo.get_result(&key()).await.unwrap().unwrap();
        let index = repo.load_index().await.unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("exam_result_physics_final_2024"), Some(&stored));
        assert_eq!(stored.score, 2);
        assert!(store.raw(RESULT_INDEX_KEY).is_some());
    }

    #[tokio::test]
    async fn malformed_index_is_rebuilt_on_next_save() {
        let store = InMemoryStore::new();
        store.insert_raw(RESULT_INDEX_KEY, "[not an index");
        let repo = KeyValueRepository::new(Arc::new(store.clone()));

        assert!(repo.load_index().await.unwrap().is_empty());
        repo.save_result(&result(1)).await.unwrap();

        let index = repo.load_index().await.unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("exam_result_physics_final_2024").map(|r| r.score), Some(1));
        assert_ne!(store.raw(RESULT_INDEX_KEY).as_deref(), Some("[not an index"));
    }

    #[tokio::test]
    async fn malformed_exam_state_reads_as_absent() {
        let store = InMemoryStore::new();
        store.insert_raw("exam_state_physics_final_2024", "{broken");
        let repo = KeyValueRepository::new(Arc::new(store));

        assert!(repo.load_state(&key()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn exam_state_round_trip_and_delete() {
        let repo = KeyValueRepository::new(Arc::new(InMemoryStore::new()));
        let mut answers = BTreeMap::new();
        answers.insert(1, 3);
        let state = ExamState::from_parts(answers, fixed_now(), fixed_now());

        repo.save_state(&key(), &state).await.unwrap();
        assert_eq!(repo.load_state(&key()).await.unwrap(), Some(state));

        repo.delete_state(&key()).await.unwrap();
        assert!(repo.load_state(&key()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn theme_is_stored_as_plain_string() {
        let store = InMemoryStore::new();
        let repo = KeyValueRepository::new(Arc::new(store.clone()));
        assert_eq!(repo.get_theme().await.unwrap(), None);

        repo.save_theme(Theme::Light).await.unwrap();
        assert_eq!(store.raw(THEME_KEY).as_deref(), Some("light"));
        assert_eq!(repo.get_theme().await.unwrap(), Some(Theme::Light));
    }

    #[tokio::test]
    async fn session_round_trip_and_clear() {
        let repo = KeyValueRepository::new(Arc::new(InMemoryStore::new()));
        let mut session = Session::new();
        session.set_subject("Biology").unwrap();
        repo.save_session(&session).await.unwrap();
        assert_eq!(repo.load_session().await.unwrap(), Some(session));

        repo.clear_session().await.unwrap();
        assert_eq!(repo.load_session().await.unwrap(), None);
    }
}
