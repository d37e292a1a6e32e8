use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user-configured content API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceConfig {
    /// Unique identifier for the source
    pub id: Uuid,
    /// Display name (e.g., "Classic Films")
    pub name: String,
    /// Base URL all content and category requests are issued against
    pub url: String,
}

impl SourceConfig {
    /// Creates a new source with a fresh identifier
    pub fn new(name: String, url: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_source_config() {
        let source = SourceConfig::new("Demo".to_string(), "https://demo.example/api".to_string());
        assert_eq!(source.name, "Demo");
        assert_eq!(source.url, "https://demo.example/api");
    }

    #[test]
    fn test_new_sources_get_distinct_ids() {
        let a = SourceConfig::new("A".to_string(), "https://a.example".to_string());
        let b = SourceConfig::new("A".to_string(), "https://a.example".to_string());
        assert_ne!(a.id, b.id);
    }
}
