use std::sync::Arc;

use tokio::sync::RwLock;
use url::Url;
use uuid::Uuid;

use crate::{
    db::{KeyValueStore, StoreKey},
    error::{AppError, AppResult},
    models::SourceConfig,
};

/// Resolves the active source against the current list.
///
/// Keeps `active` when it is still present, otherwise falls back to the first
/// configured source, or `None` for an empty list.
pub fn reconcile_active(sources: &[SourceConfig], active: Option<Uuid>) -> Option<Uuid> {
    match active {
        Some(id) if sources.iter().any(|s| s.id == id) => Some(id),
        _ => sources.first().map(|s| s.id),
    }
}

/// Checks a user-supplied source before it is added
pub fn validate_source(name: &str, url: &str) -> AppResult<(String, String)> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Source name is required".to_string()));
    }

    let url = url.trim();
    let parsed = Url::parse(url)
        .map_err(|_| AppError::Validation(format!("Invalid source URL: {}", url)))?;
    if parsed.cannot_be_a_base() || parsed.host_str().is_none() {
        return Err(AppError::Validation(format!(
            "Source URL must be absolute: {}",
            url
        )));
    }

    Ok((name.to_string(), url.to_string()))
}

#[derive(Clone)]
struct RegistryState {
    sources: Vec<SourceConfig>,
    active: Option<Uuid>,
}

/// The persisted, ordered list of content sources and the active selection.
///
/// The registry is the single writer of both values. Every mutation
/// reconciles the active id and persists the new state; the in-memory state
/// only changes once the store has accepted it.
pub struct SourceRegistry {
    store: Arc<dyn KeyValueStore>,
    state: RwLock<RegistryState>,
}

impl SourceRegistry {
    /// Loads the registry from the store, reconciling whatever was persisted
    pub async fn load(store: Arc<dyn KeyValueStore>) -> AppResult<Self> {
        let sources: Vec<SourceConfig> = store.load(&StoreKey::Sources).await?.unwrap_or_default();
        let stored_active = store
            .load::<Option<Uuid>>(&StoreKey::ActiveSource)
            .await?
            .flatten();
        let active = reconcile_active(&sources, stored_active);

        tracing::info!(
            sources = sources.len(),
            active = ?active,
            backend = store.name(),
            "Source registry loaded"
        );

        Ok(Self {
            store,
            state: RwLock::new(RegistryState { sources, active }),
        })
    }

    pub async fn list(&self) -> Vec<SourceConfig> {
        self.state.read().await.sources.clone()
    }

    pub async fn get(&self, id: Uuid) -> Option<SourceConfig> {
        self.state
            .read()
            .await
            .sources
            .iter()
            .find(|s| s.id == id)
            .cloned()
    }

    pub async fn active_id(&self) -> Option<Uuid> {
        self.state.read().await.active
    }

    pub async fn active(&self) -> Option<SourceConfig> {
        let state = self.state.read().await;
        let id = state.active?;
        state.sources.iter().find(|s| s.id == id).cloned()
    }

    /// Adds a source after validation. Invalid input leaves the list untouched.
    pub async fn add(&self, name: &str, url: &str) -> AppResult<SourceConfig> {
        let (name, url) = validate_source(name, url)?;
        let source = SourceConfig::new(name, url);

        let mut state = self.state.write().await;
        let mut next = state.clone();
        next.sources.push(source.clone());
        next.active = reconcile_active(&next.sources, next.active);
        self.persist(&next).await?;
        *state = next;

        tracing::info!(source_id = %source.id, name = %source.name, "Source added");

        Ok(source)
    }

    pub async fn remove(&self, id: Uuid) -> AppResult<SourceConfig> {
        let mut state = self.state.write().await;
        let index = state
            .sources
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Source {}", id)))?;

        let mut next = state.clone();
        let removed = next.sources.remove(index);
        next.active = reconcile_active(&next.sources, next.active);
        self.persist(&next).await?;
        *state = next;

        tracing::info!(source_id = %id, active = ?state.active, "Source removed");

        Ok(removed)
    }

    /// Selects the active source. Unknown ids fall back like any other
    /// reconciliation; the resolved id is returned.
    pub async fn set_active(&self, id: Option<Uuid>) -> AppResult<Option<Uuid>> {
        let mut state = self.state.write().await;
        let next = RegistryState {
            sources: state.sources.clone(),
            active: reconcile_active(&state.sources, id),
        };
        self.persist(&next).await?;
        *state = next;
        Ok(state.active)
    }

    /// Resolves a source by id, or the active source when no id is given
    pub async fn resolve(&self, id: Option<Uuid>) -> AppResult<Option<SourceConfig>> {
        match id {
            Some(id) => self
                .get(id)
                .await
                .map(Some)
                .ok_or_else(|| AppError::NotFound(format!("Source {}", id))),
            None => Ok(self.active().await),
        }
    }

    async fn persist(&self, state: &RegistryState) -> AppResult<()> {
        self.store.save(&StoreKey::Sources, &state.sources).await?;
        self.store.save(&StoreKey::ActiveSource, &state.active).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    fn source(name: &str) -> SourceConfig {
        SourceConfig::new(name.to_string(), format!("https://{}.example/api", name))
    }

    async fn empty_registry() -> (SourceRegistry, Arc<dyn KeyValueStore>) {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let registry = SourceRegistry::load(store.clone()).await.unwrap();
        (registry, store)
    }

    #[test]
    fn test_reconcile_keeps_present_active() {
        let sources = vec![source("a"), source("b")];
        assert_eq!(reconcile_active(&sources, Some(sources[1].id)), Some(sources[1].id));
    }

    #[test]
    fn test_reconcile_falls_back_to_first() {
        let sources = vec![source("a"), source("b")];
        assert_eq!(reconcile_active(&sources, Some(Uuid::new_v4())), Some(sources[0].id));
        assert_eq!(reconcile_active(&sources, None), Some(sources[0].id));
    }

    #[test]
    fn test_reconcile_empty_list_is_none() {
        assert_eq!(reconcile_active(&[], Some(Uuid::new_v4())), None);
        assert_eq!(reconcile_active(&[], None), None);
    }

    #[test]
    fn test_validate_source() {
        assert!(validate_source("Demo", "https://demo.example/api").is_ok());
        assert!(matches!(
            validate_source("  ", "https://demo.example"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            validate_source("Demo", "not-a-url"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            validate_source("Demo", "mailto:someone@example.com"),
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_first_added_source_becomes_active() {
        let (registry, _) = empty_registry().await;
        assert_eq!(registry.active_id().await, None);

        let first = registry.add("First", "https://first.example").await.unwrap();
        registry.add("Second", "https://second.example").await.unwrap();

        assert_eq!(registry.active_id().await, Some(first.id));
        assert_eq!(registry.list().await.len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_add_leaves_state_unchanged() {
        let (registry, _) = empty_registry().await;
        registry.add("Kept", "https://kept.example").await.unwrap();

        let result = registry.add("Broken", "not-a-url").await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        let names: Vec<_> = registry.list().await.into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Kept".to_string()]);
    }

    #[tokio::test]
    async fn test_removing_active_falls_back_to_first() {
        let (registry, _) = empty_registry().await;
        let a = registry.add("A", "https://a.example").await.unwrap();
        let b = registry.add("B", "https://b.example").await.unwrap();
        let c = registry.add("C", "https://c.example").await.unwrap();

        registry.set_active(Some(c.id)).await.unwrap();
        registry.remove(c.id).await.unwrap();
        assert_eq!(registry.active_id().await, Some(a.id));

        registry.remove(a.id).await.unwrap();
        assert_eq!(registry.active_id().await, Some(b.id));

        registry.remove(b.id).await.unwrap();
        assert_eq!(registry.active_id().await, None);
    }

    #[tokio::test]
    async fn test_remove_unknown_is_not_found() {
        let (registry, _) = empty_registry().await;
        let result = registry.remove(Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_set_active_unknown_reconciles() {
        let (registry, _) = empty_registry().await;
        let a = registry.add("A", "https://a.example").await.unwrap();

        let resolved = registry.set_active(Some(Uuid::new_v4())).await.unwrap();
        assert_eq!(resolved, Some(a.id));
    }

    #[tokio::test]
    async fn test_state_survives_reload() {
        let (registry, store) = empty_registry().await;
        registry.add("A", "https://a.example").await.unwrap();
        let b = registry.add("B", "https://b.example").await.unwrap();
        registry.set_active(Some(b.id)).await.unwrap();

        let reloaded = SourceRegistry::load(store).await.unwrap();
        assert_eq!(reloaded.list().await.len(), 2);
        assert_eq!(reloaded.active_id().await, Some(b.id));
    }

    #[tokio::test]
    async fn test_load_reconciles_stale_active() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let sources = vec![source("a")];
        store.save(&StoreKey::Sources, &sources).await.unwrap();
        store
            .save(&StoreKey::ActiveSource, &Some(Uuid::new_v4()))
            .await
            .unwrap();

        let registry = SourceRegistry::load(store).await.unwrap();
        assert_eq!(registry.active_id().await, Some(sources[0].id));
    }

    /// Store that accepts reads and rejects every write
    struct ReadOnlyStore;

    #[async_trait::async_trait]
    impl KeyValueStore for ReadOnlyStore {
        async fn get_raw(&self, _key: &StoreKey) -> AppResult<Option<String>> {
            Ok(None)
        }

        async fn put_raw(&self, _key: &StoreKey, _value: String) -> AppResult<()> {
            Err(AppError::Internal("store is read-only".to_string()))
        }

        fn name(&self) -> &'static str {
            "read-only"
        }
    }

    #[tokio::test]
    async fn test_failed_persist_leaves_registry_unchanged() {
        let registry = SourceRegistry::load(Arc::new(ReadOnlyStore)).await.unwrap();

        let result = registry.add("Demo", "https://demo.example/api").await;

        assert!(matches!(result, Err(AppError::Internal(_))));
        assert!(registry.list().await.is_empty());
        assert_eq!(registry.active_id().await, None);
    }
}
