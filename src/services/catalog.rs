//! Catalog browsing for one source, one category and an optional search term.
//!
//! A session keeps the visible item list plus the pagination bookkeeping
//! around it. Every fetch is tagged with the generation it was started
//! under; only a result whose generation is still current may be committed,
//! so a response for an abandoned query or page is dropped on arrival.
//!
//! The state lock is never held across a network call: a fetch is *begun*
//! under the lock, performed without it, and *committed* under it again.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{ContentItem, ContentQuery, PaginatedContentResponse},
    services::{fetcher::ContentSource, mock},
};

/// How pages are presented
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScrollMode {
    /// One page visible at a time, driven by explicit navigation
    #[default]
    Paginated,
    /// Pages accumulate as the end of the list comes into view
    Infinite,
}

/// What the session is currently listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogQuery {
    #[serde(default)]
    pub source_id: Option<Uuid>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub search_term: Option<String>,
}

impl CatalogQuery {
    fn content_query(&self, page: u32) -> ContentQuery {
        ContentQuery {
            page: Some(page),
            category_id: self.category_id.clone(),
            search_term: self.search_term.clone(),
        }
    }

    /// Shareable encoding of the query and page
    pub fn to_query_string(&self, page: u32) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        if let Some(id) = self.source_id {
            serializer.append_pair("source", &id.to_string());
        }
        if let Some(category) = self.category_id.as_deref().filter(|c| !c.is_empty()) {
            serializer.append_pair("category", category);
        }
        if let Some(term) = self.search_term.as_deref().filter(|t| !t.is_empty()) {
            serializer.append_pair("search", term);
        }
        serializer.append_pair("page", &page.to_string());
        serializer.finish()
    }
}

/// Read-only view of a session
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSnapshot {
    pub id: Uuid,
    pub mode: ScrollMode,
    pub query: CatalogQuery,
    pub page: u32,
    pub items: Vec<ContentItem>,
    pub total_pages: u32,
    pub total_items: u64,
    pub is_loading_initial: bool,
    pub is_loading_more: bool,
    pub error: Option<String>,
    pub is_fallback: bool,
    pub query_string: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct CatalogState {
    query: CatalogQuery,
    generation: u64,
    page: u32,
    items: Vec<ContentItem>,
    total_pages: u32,
    total_items: u64,
    loading_initial: bool,
    loading_more: bool,
    errors: Vec<String>,
    is_fallback: bool,
    updated_at: DateTime<Utc>,
}

/// A fetch that has been started but not yet committed
#[derive(Debug, Clone)]
struct FetchTicket {
    generation: u64,
    page: u32,
    previous_page: u32,
    query: CatalogQuery,
}

pub struct CatalogSession {
    id: Uuid,
    mode: ScrollMode,
    fetcher: Arc<dyn ContentSource>,
    state: RwLock<CatalogState>,
}

impl CatalogSession {
    pub fn new(fetcher: Arc<dyn ContentSource>, mode: ScrollMode) -> Self {
        Self {
            id: Uuid::new_v4(),
            mode,
            fetcher,
            state: RwLock::new(CatalogState {
                page: 1,
                updated_at: Utc::now(),
                ..CatalogState::default()
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn mode(&self) -> ScrollMode {
        self.mode
    }

    pub async fn snapshot(&self) -> CatalogSnapshot {
        let state = self.state.read().await;
        self.snapshot_of(&state)
    }

    /// Switches source, category or search term.
    ///
    /// A changed query clears the items, resets to page 1 and loads it. An
    /// unchanged query is a no-op once it has been loaded.
    pub async fn set_query(&self, query: CatalogQuery) -> CatalogSnapshot {
        let ticket = {
            let mut state = self.state.write().await;
            if state.query == query && state.generation > 0 {
                return self.snapshot_of(&state);
            }

            tracing::debug!(
                session_id = %self.id,
                source_id = ?query.source_id,
                category_id = ?query.category_id,
                "Catalog query changed"
            );

            state.query = query;
            state.items.clear();
            state.page = 1;
            state.total_pages = 0;
            state.total_items = 0;
            state.errors.clear();
            state.is_fallback = false;
            Self::begin_fetch(&mut state, 1)
        };

        self.run(ticket).await
    }

    /// Reloads page 1 of the current query
    pub async fn reload(&self) -> CatalogSnapshot {
        let ticket = {
            let mut state = self.state.write().await;
            Self::begin_fetch(&mut state, 1)
        };
        self.run(ticket).await
    }

    /// Loads `page` subject to the over-the-end guard; returns whether a fetch ran
    pub async fn load_page(&self, page: u32) -> (bool, CatalogSnapshot) {
        let ticket = {
            let mut state = self.state.write().await;
            if Self::beyond_last_page(&state, page) {
                tracing::debug!(session_id = %self.id, page, total_pages = state.total_pages, "Skipping fetch past last page");
                return (false, self.snapshot_of(&state));
            }
            Self::begin_fetch(&mut state, page)
        };
        (true, self.run(ticket).await)
    }

    /// Explicit page navigation. Pages outside `[1, total_pages]` are rejected.
    pub async fn go_to_page(&self, page: u32) -> AppResult<CatalogSnapshot> {
        if self.mode != ScrollMode::Paginated {
            return Err(AppError::InvalidInput(
                "Page navigation requires paginated mode".to_string(),
            ));
        }

        let ticket = {
            let mut state = self.state.write().await;
            let last = state.total_pages.max(1);
            if page < 1 || page > last {
                return Err(AppError::InvalidInput(format!(
                    "Page {} is outside 1..={}",
                    page, last
                )));
            }
            Self::begin_fetch(&mut state, page)
        };

        Ok(self.run(ticket).await)
    }

    pub async fn next_page(&self) -> AppResult<CatalogSnapshot> {
        let page = self.state.read().await.page;
        self.go_to_page(page.saturating_add(1)).await
    }

    pub async fn prev_page(&self) -> AppResult<CatalogSnapshot> {
        let page = self.state.read().await.page;
        self.go_to_page(page.saturating_sub(1)).await
    }

    /// Called when the end-of-list sentinel becomes visible.
    ///
    /// Appends the next page only when nothing is in flight and more pages
    /// remain. The check and the in-flight flag are set under one lock, so a
    /// burst of notifications starts at most one fetch.
    pub async fn on_sentinel_visible(&self) -> AppResult<CatalogSnapshot> {
        if self.mode != ScrollMode::Infinite {
            return Err(AppError::InvalidInput(
                "Infinite scrolling requires infinite mode".to_string(),
            ));
        }

        let ticket = {
            let mut state = self.state.write().await;
            let in_flight = state.loading_initial || state.loading_more;
            if in_flight || state.page >= state.total_pages {
                return Ok(self.snapshot_of(&state));
            }
            let next = state.page + 1;
            Self::begin_fetch(&mut state, next)
        };

        Ok(self.run(ticket).await)
    }

    fn beyond_last_page(state: &CatalogState, page: u32) -> bool {
        state.total_pages > 1 && page > state.total_pages && !state.loading_initial
    }

    fn begin_fetch(state: &mut CatalogState, page: u32) -> FetchTicket {
        state.generation += 1;
        let previous_page = state.page;
        state.page = page;
        if page <= 1 {
            state.loading_initial = true;
        } else {
            state.loading_more = true;
        }

        FetchTicket {
            generation: state.generation,
            page,
            previous_page,
            query: state.query.clone(),
        }
    }

    async fn run(&self, ticket: FetchTicket) -> CatalogSnapshot {
        let result = match ticket.query.source_url.as_deref() {
            Some(url) => {
                self.fetcher
                    .fetch_content(url, &ticket.query.content_query(ticket.page))
                    .await
            }
            None => Err(AppError::InvalidInput(
                "No content source selected".to_string(),
            )),
        };

        let mut state = self.state.write().await;
        self.commit(&mut state, &ticket, result);
        self.snapshot_of(&state)
    }

    fn commit(
        &self,
        state: &mut CatalogState,
        ticket: &FetchTicket,
        result: AppResult<PaginatedContentResponse>,
    ) {
        if ticket.generation != state.generation {
            tracing::debug!(
                session_id = %self.id,
                page = ticket.page,
                stale_generation = ticket.generation,
                current_generation = state.generation,
                "Discarding superseded catalog response"
            );
            return;
        }

        state.loading_initial = false;
        state.loading_more = false;
        state.updated_at = Utc::now();

        match result {
            Ok(response) => {
                let appends = self.mode == ScrollMode::Infinite && ticket.page > 1;
                if appends {
                    let mut seen: HashSet<String> =
                        state.items.iter().map(|item| item.id.clone()).collect();
                    let fresh: Vec<ContentItem> = response
                        .items
                        .into_iter()
                        .filter(|item| seen.insert(item.id.clone()))
                        .collect();
                    state.items.extend(fresh);
                } else {
                    state.items = response.items;
                }
                state.total_pages = response.page_count;
                state.total_items = response.total;
                state.is_fallback = false;

                if state.items.is_empty() {
                    self.substitute_mock(state, ticket);
                }
            }
            Err(e) => {
                tracing::warn!(
                    session_id = %self.id,
                    page = ticket.page,
                    error = %e,
                    "Catalog fetch failed"
                );
                state.errors.push(e.to_string());

                if state.items.is_empty() {
                    self.substitute_mock(state, ticket);
                } else {
                    state.page = ticket.previous_page;
                }
            }
        }
    }

    /// Shows mock content; `page` follows the mock page actually displayed
    fn substitute_mock(&self, state: &mut CatalogState, ticket: &FetchTicket) {
        let (page, fallback) = mock::mock_fallback(&ticket.query.content_query(ticket.page));
        tracing::info!(
            session_id = %self.id,
            page,
            items = fallback.items.len(),
            "Using mock catalog page"
        );
        state.page = page;
        state.items = fallback.items;
        state.total_pages = fallback.page_count;
        state.total_items = fallback.total;
        state.is_fallback = true;
    }

    fn snapshot_of(&self, state: &CatalogState) -> CatalogSnapshot {
        CatalogSnapshot {
            id: self.id,
            mode: self.mode,
            query: state.query.clone(),
            page: state.page,
            items: state.items.clone(),
            total_pages: state.total_pages,
            total_items: state.total_items,
            is_loading_initial: state.loading_initial,
            is_loading_more: state.loading_more,
            error: (!state.errors.is_empty()).then(|| state.errors.join("; ")),
            is_fallback: state.is_fallback,
            query_string: state.query.to_query_string(state.page),
            updated_at: state.updated_at,
        }
    }
}
