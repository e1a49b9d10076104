use std::sync::Arc;

use exam_core::model::Theme;
use storage::{PreferenceRepository, StorageError};

#[derive(Clone)]
pub struct PreferenceService {
    preferences: Arc<dyn PreferenceRepository>,
}

impl PreferenceService {
    #[must_use]
    pub fn new(preferences: Arc<dyn PreferenceRepository>) -> Self {
        Self { preferences }
    }

    /// Stored theme, dark when nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the preference cannot be read.
    pub async fn theme(&self) -> Result<Theme, StorageError> {
        Ok(self.preferences.get_theme().await?.unwrap_or_default())
    }

    /// Switch to the other theme and persist it.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the preference cannot be saved.
    pub async fn toggle_theme(&self, current: Theme) -> Result<Theme, StorageError> {
        let next = current.toggled();
        self.preferences.save_theme(next).await?;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::Storage;

    #[tokio::test]
    async fn theme_defaults_to_dark_and_toggles() {
        let prefs = PreferenceService::new(Storage::in_memory().preferences);
        let theme = prefs.theme().await.unwrap();
        assert_eq!(theme, Theme::Dark);
        let next = prefs.toggle_theme(theme).await.unwrap();
        assert_eq!(next, Theme::Light);
        assert_eq!(prefs.theme().await.unwrap(), Theme::Light);
    }
}
