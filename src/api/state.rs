use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    config::Config,
    db::{create_redis_client, KeyValueStore, MemoryStore, RedisStore},
    error::{AppError, AppResult},
    services::{
        CatalogSession, ContentLibrary, ContentSource, HttpContentFetcher,
        HttpRecommendationClient, PreferenceService, RecommendationClient, SearchSession,
        SourceRegistry, UnconfiguredRecommendations,
    },
};

/// Upper bound on live sessions of each kind; the oldest is evicted beyond it
const MAX_SESSIONS: usize = 256;

/// Catalog and search sessions keyed by id, oldest first
#[derive(Default)]
pub struct Sessions {
    catalogs: HashMap<Uuid, Arc<CatalogSession>>,
    catalog_order: Vec<Uuid>,
    searches: HashMap<Uuid, Arc<SearchSession>>,
    search_order: Vec<Uuid>,
}

impl Sessions {
    pub fn insert_catalog(&mut self, session: Arc<CatalogSession>) {
        insert_bounded(&mut self.catalogs, &mut self.catalog_order, session.id(), session);
    }

    pub fn insert_search(&mut self, session: Arc<SearchSession>) {
        insert_bounded(&mut self.searches, &mut self.search_order, session.id(), session);
    }

    pub fn catalog(&self, id: Uuid) -> AppResult<Arc<CatalogSession>> {
        self.catalogs
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Catalog session {}", id)))
    }

    pub fn search(&self, id: Uuid) -> AppResult<Arc<SearchSession>> {
        self.searches
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Search session {}", id)))
    }

    pub fn remove_catalog(&mut self, id: Uuid) -> bool {
        self.catalog_order.retain(|existing| *existing != id);
        self.catalogs.remove(&id).is_some()
    }

    pub fn remove_search(&mut self, id: Uuid) -> bool {
        self.search_order.retain(|existing| *existing != id);
        self.searches.remove(&id).is_some()
    }
}

fn insert_bounded<T>(map: &mut HashMap<Uuid, T>, order: &mut Vec<Uuid>, id: Uuid, value: T) {
    if order.len() >= MAX_SESSIONS {
        let evicted = order.remove(0);
        map.remove(&evicted);
        tracing::debug!(session_id = %evicted, "Evicted oldest session");
    }
    order.push(id);
    map.insert(id, value);
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SourceRegistry>,
    pub preferences: Arc<PreferenceService>,
    pub fetcher: Arc<dyn ContentSource>,
    pub library: Arc<ContentLibrary>,
    pub recommender: Arc<dyn RecommendationClient>,
    /// Client used by the proxy endpoint
    pub proxy_client: reqwest::Client,
    pub sessions: Arc<RwLock<Sessions>>,
}

impl AppState {
    /// Wires the state from its collaborators, loading the persisted registry
    pub async fn new(
        store: Arc<dyn KeyValueStore>,
        fetcher: Arc<dyn ContentSource>,
        recommender: Arc<dyn RecommendationClient>,
        proxy_client: reqwest::Client,
    ) -> AppResult<Self> {
        let registry = SourceRegistry::load(store.clone()).await?;

        Ok(Self {
            registry: Arc::new(registry),
            preferences: Arc::new(PreferenceService::new(store)),
            library: Arc::new(ContentLibrary::new(fetcher.clone())),
            fetcher,
            recommender,
            proxy_client,
            sessions: Arc::new(RwLock::new(Sessions::default())),
        })
    }

    /// State backed by an in-memory store and real HTTP clients
    pub async fn in_memory(recommender: Arc<dyn RecommendationClient>) -> AppResult<Self> {
        let timeout = Duration::from_secs(Config::default().request_timeout_secs);
        let fetcher = HttpContentFetcher::new(timeout)?;
        let proxy_client = reqwest::Client::builder().timeout(timeout).build()?;

        Self::new(
            Arc::new(MemoryStore::new()),
            Arc::new(fetcher),
            recommender,
            proxy_client,
        )
        .await
    }

    /// Builds the state described by `config`, seeding sources into an
    /// empty registry
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let timeout = Duration::from_secs(config.request_timeout_secs);

        let store: Arc<dyn KeyValueStore> = match config.redis_url.as_deref() {
            Some(url) => Arc::new(RedisStore::new(create_redis_client(url)?)),
            None => {
                tracing::warn!("REDIS_URL not set, state will not survive a restart");
                Arc::new(MemoryStore::new())
            }
        };

        tracing::info!(store = store.name(), "Persistence backend selected");

        let recommender: Arc<dyn RecommendationClient> = match &config.recommendation_url {
            Some(endpoint) => Arc::new(HttpRecommendationClient::new(endpoint.clone(), timeout)?),
            None => Arc::new(UnconfiguredRecommendations),
        };

        let fetcher = Arc::new(HttpContentFetcher::new(timeout)?);
        let proxy_client = reqwest::Client::builder().timeout(timeout).build()?;
        let state = Self::new(store, fetcher, recommender, proxy_client).await?;

        if state.registry.list().await.is_empty() {
            for (name, url) in config.seed_source_pairs() {
                if let Err(e) = state.registry.add(&name, &url).await {
                    tracing::warn!(name = %name, error = %e, "Skipping invalid seed source");
                }
            }
        }

        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ScrollMode;

    #[tokio::test]
    async fn test_sessions_evict_oldest() {
        let state = AppState::in_memory(Arc::new(UnconfiguredRecommendations))
            .await
            .unwrap();
        let mut sessions = state.sessions.write().await;

        let mut ids = Vec::new();
        for _ in 0..=MAX_SESSIONS {
            let session = Arc::new(CatalogSession::new(state.fetcher.clone(), ScrollMode::Paginated));
            ids.push(session.id());
            sessions.insert_catalog(session);
        }

        assert!(sessions.catalog(ids[0]).is_err());
        assert!(sessions.catalog(ids[MAX_SESSIONS]).is_ok());
    }

    #[tokio::test]
    async fn test_from_config_seeds_empty_registry() {
        let config = Config {
            seed_sources: Some("Demo=https://demo.example/api,Bad=not-a-url".to_string()),
            ..Config::default()
        };

        let state = AppState::from_config(&config).await.unwrap();

        let sources = state.registry.list().await;
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].name, "Demo");
        assert_eq!(state.registry.active_id().await, Some(sources[0].id));
    }
}
