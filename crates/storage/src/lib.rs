#![forbid(unsafe_code)]

pub mod keys;
pub mod repository;
pub mod sqlite;

pub use repository::{
    ExamStateRepository, InMemoryStore, KeyValueRepository, KeyValueStore, PreferenceRepository,
    ResultRepository, SessionRepository, Storage, StorageError,
};
