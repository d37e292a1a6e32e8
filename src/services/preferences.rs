use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    db::{KeyValueStore, StoreKey},
    error::AppResult,
    models::{PreferencesUpdate, Theme, UserPreferences},
};

/// Theme and recommendation inputs, each persisted under its own key
pub struct PreferenceService {
    store: Arc<dyn KeyValueStore>,
    write_lock: Mutex<()>,
}

impl PreferenceService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    pub async fn get(&self) -> AppResult<UserPreferences> {
        let theme: Theme = self.store.load(&StoreKey::Theme).await?.unwrap_or_default();
        let viewing_history: String = self
            .store
            .load(&StoreKey::ViewingHistory)
            .await?
            .unwrap_or_default();
        let preferences: String = self
            .store
            .load(&StoreKey::Preferences)
            .await?
            .unwrap_or_default();

        Ok(UserPreferences {
            theme,
            viewing_history,
            preferences,
        })
    }

    /// Applies a partial update and writes back only the fields it touched
    pub async fn update(&self, update: PreferencesUpdate) -> AppResult<UserPreferences> {
        let _guard = self.write_lock.lock().await;

        if let Some(theme) = &update.theme {
            self.store.save(&StoreKey::Theme, theme).await?;
        }
        if let Some(history) = &update.viewing_history {
            self.store.save(&StoreKey::ViewingHistory, history).await?;
        }
        if let Some(preferences) = &update.preferences {
            self.store.save(&StoreKey::Preferences, preferences).await?;
        }

        let mut current = self.get().await?;
        current.apply(update);
        Ok(current)
    }
}
