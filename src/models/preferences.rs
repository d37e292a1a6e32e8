use serde::{Deserialize, Serialize};

/// UI theme preference
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

/// Persisted user preferences
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    pub theme: Theme,
    /// Free text describing what the user has watched
    pub viewing_history: String,
    /// Free text describing what the user likes
    pub preferences: String,
}

/// Partial update of [`UserPreferences`]; unset fields are left alone
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesUpdate {
    pub theme: Option<Theme>,
    pub viewing_history: Option<String>,
    pub preferences: Option<String>,
}

impl UserPreferences {
    pub fn apply(&mut self, update: PreferencesUpdate) {
        if let Some(theme) = update.theme {
            self.theme = theme;
        }
        if let Some(history) = update.viewing_history {
            self.viewing_history = history;
        }
        if let Some(preferences) = update.preferences {
            self.preferences = preferences;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_preferences() {
        let prefs = UserPreferences::default();
        assert_eq!(prefs.theme, Theme::System);
        assert!(prefs.viewing_history.is_empty());
    }

    #[test]
    fn test_apply_partial_update() {
        let mut prefs = UserPreferences {
            theme: Theme::Light,
            viewing_history: "Alien".to_string(),
            preferences: "sci-fi".to_string(),
        };

        prefs.apply(PreferencesUpdate {
            theme: Some(Theme::Dark),
            viewing_history: None,
            preferences: Some("horror".to_string()),
        });

        assert_eq!(prefs.theme, Theme::Dark);
        assert_eq!(prefs.viewing_history, "Alien");
        assert_eq!(prefs.preferences, "horror");
    }

    #[test]
    fn test_theme_serialization() {
        assert_eq!(serde_json::to_string(&Theme::Dark).unwrap(), "\"dark\"");
    }
}
