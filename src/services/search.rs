//! Search across every configured source at once.
//!
//! One content fetch per source is put in flight together and results are
//! committed as they arrive, keyed by source, so the running total and the
//! group list grow while slower sources are still pending. A failing source
//! is logged and skipped; it never holds up the others.

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{ContentItem, ContentQuery, SourceConfig},
    services::fetcher::ContentSource,
};

pub const NO_SOURCES_MESSAGE: &str =
    "No content sources configured. Add a source before searching.";

/// Results returned by one source
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchGroup {
    pub source_id: Uuid,
    pub source_name: String,
    pub items: Vec<ContentItem>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSnapshot {
    pub id: Uuid,
    pub query: String,
    pub groups: Vec<SearchGroup>,
    pub active_source_id: Option<Uuid>,
    pub total_results: u64,
    pub is_searching: bool,
    pub pending_sources: usize,
    pub error: Option<String>,
}

impl SearchSnapshot {
    /// The group currently selected for display
    pub fn active_group(&self) -> Option<&SearchGroup> {
        let id = self.active_source_id?;
        self.groups.iter().find(|g| g.source_id == id)
    }
}

#[derive(Debug, Default)]
struct SearchState {
    query: String,
    generation: u64,
    groups: Vec<SearchGroup>,
    active: Option<Uuid>,
    total_results: u64,
    pending: usize,
    error: Option<String>,
}

impl SearchState {
    fn reset(&mut self, query: String) -> u64 {
        self.generation += 1;
        self.query = query;
        self.groups.clear();
        self.active = None;
        self.total_results = 0;
        self.pending = 0;
        self.error = None;
        self.generation
    }

    /// Adds or replaces the group of one source, keeping the total in step
    fn upsert_group(&mut self, group: SearchGroup) {
        let count = group.items.len() as u64;
        match self.groups.iter_mut().find(|g| g.source_id == group.source_id) {
            Some(existing) => {
                self.total_results -= existing.items.len() as u64;
                *existing = group;
            }
            None => {
                if self.active.is_none() {
                    self.active = Some(group.source_id);
                }
                self.groups.push(group);
            }
        }
        self.total_results += count;
    }
}

pub struct SearchSession {
    id: Uuid,
    fetcher: Arc<dyn ContentSource>,
    state: RwLock<SearchState>,
}

impl SearchSession {
    pub fn new(fetcher: Arc<dyn ContentSource>) -> Self {
        Self {
            id: Uuid::new_v4(),
            fetcher,
            state: RwLock::new(SearchState::default()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub async fn snapshot(&self) -> SearchSnapshot {
        let state = self.state.read().await;
        self.snapshot_of(&state)
    }

    /// Runs a search over `sources` and returns once every source has answered.
    ///
    /// A blank query leaves the session idle and an empty source list is an
    /// error state; neither issues a fetch. Starting a new search discards
    /// whatever an older one still has in flight.
    pub async fn search(&self, query: &str, sources: Vec<SourceConfig>) -> SearchSnapshot {
        let query = query.trim().to_string();

        let generation = {
            let mut state = self.state.write().await;
            let generation = state.reset(query.clone());

            if query.is_empty() {
                return self.snapshot_of(&state);
            }
            if sources.is_empty() {
                state.error = Some(NO_SOURCES_MESSAGE.to_string());
                return self.snapshot_of(&state);
            }

            state.pending = sources.len();
            generation
        };

        tracing::info!(
            session_id = %self.id,
            query = %query,
            sources = sources.len(),
            "Searching all sources"
        );

        let content_query = ContentQuery::search(query.clone());
        let mut in_flight: FuturesUnordered<_> = sources
            .into_iter()
            .map(|source| {
                let fetcher = self.fetcher.clone();
                let content_query = content_query.clone();
                async move {
                    let result = fetcher.fetch_content(&source.url, &content_query).await;
                    (source, result)
                }
            })
            .collect();

        while let Some((source, result)) = in_flight.next().await {
            let mut state = self.state.write().await;
            if state.generation != generation {
                tracing::debug!(session_id = %self.id, source_id = %source.id, "Discarding result of superseded search");
                continue;
            }
            state.pending = state.pending.saturating_sub(1);

            match result {
                Ok(page) if !page.items.is_empty() => {
                    tracing::debug!(
                        session_id = %self.id,
                        source_id = %source.id,
                        results = page.items.len(),
                        "Source returned search results"
                    );
                    state.upsert_group(SearchGroup {
                        source_id: source.id,
                        source_name: source.name,
                        items: page.items,
                    });
                }
                Ok(_) => {
                    tracing::debug!(session_id = %self.id, source_id = %source.id, "Source returned no search results");
                }
                Err(e) => {
                    tracing::warn!(
                        session_id = %self.id,
                        source_id = %source.id,
                        source = %source.name,
                        error = %e,
                        "Search failed for source"
                    );
                }
            }
        }

        let state = self.state.read().await;
        if state.generation == generation {
            tracing::info!(
                session_id = %self.id,
                groups = state.groups.len(),
                total_results = state.total_results,
                "Search completed"
            );
        }
        self.snapshot_of(&state)
    }

    /// Changes which group is displayed. Never fetches.
    pub async fn select_source(&self, source_id: Uuid) -> AppResult<SearchSnapshot> {
        let mut state = self.state.write().await;
        if !state.groups.iter().any(|g| g.source_id == source_id) {
            return Err(AppError::NotFound(format!(
                "No search results from source {}",
                source_id
            )));
        }
        state.active = Some(source_id);
        Ok(self.snapshot_of(&state))
    }

    fn snapshot_of(&self, state: &SearchState) -> SearchSnapshot {
        SearchSnapshot {
            id: self.id,
            query: state.query.clone(),
            groups: state.groups.clone(),
            active_source_id: state.active,
            total_results: state.total_results,
            is_searching: state.pending > 0,
            pending_sources: state.pending,
            error: state.error.clone(),
        }
    }
}
