//! Stateless content reads with mock fallback: category lists, single pages,
//! the merged "all content" listing and detail lookup.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;

use crate::{
    error::{AppError, AppResult},
    models::{ApiCategory, ContentItem, ContentQuery, PaginatedContentResponse, SourceConfig},
    services::{fetcher::ContentSource, mock},
};

/// Pages walked per source when looking up a single item
const MAX_LOOKUP_PAGES: u32 = 5;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryListing {
    pub categories: Vec<ApiCategory>,
    pub is_fallback: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentListing {
    #[serde(flatten)]
    pub page: PaginatedContentResponse,
    /// Page number of the items shown, which differs from the requested one
    /// when an out-of-range mock page was replaced by the first
    pub current_page: u32,
    pub is_fallback: bool,
    pub error: Option<String>,
}

/// Merges item lists, one identifier per entry.
///
/// An identifier keeps the position of its first appearance and the value of
/// its last, so a later list overrides an earlier one.
pub fn merge_by_id<I>(lists: I) -> Vec<ContentItem>
where
    I: IntoIterator<Item = Vec<ContentItem>>,
{
    let mut merged: Vec<ContentItem> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for item in lists.into_iter().flatten() {
        match positions.get(&item.id) {
            Some(&index) => merged[index] = item,
            None => {
                positions.insert(item.id.clone(), merged.len());
                merged.push(item);
            }
        }
    }

    merged
}

pub struct ContentLibrary {
    fetcher: Arc<dyn ContentSource>,
}

impl ContentLibrary {
    pub fn new(fetcher: Arc<dyn ContentSource>) -> Self {
        Self { fetcher }
    }

    /// Categories of a source, or the mock set when it fails or has none
    pub async fn categories(&self, source: Option<&SourceConfig>) -> CategoryListing {
        let result = match source {
            Some(source) => self.fetcher.fetch_categories(&source.url).await,
            None => Err(AppError::InvalidInput("No content source selected".to_string())),
        };

        match result {
            Ok(categories) if !categories.is_empty() => CategoryListing {
                categories,
                is_fallback: false,
                error: None,
            },
            Ok(_) => CategoryListing {
                categories: mock::mock_categories(),
                is_fallback: true,
                error: None,
            },
            Err(e) => {
                tracing::warn!(error = %e, "Category fetch failed, using mock categories");
                CategoryListing {
                    categories: mock::mock_categories(),
                    is_fallback: true,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// One page from a source, or the matching mock page when it fails or is empty
    pub async fn content_page(
        &self,
        source: Option<&SourceConfig>,
        query: &ContentQuery,
    ) -> ContentListing {
        let result = match source {
            Some(source) => self.fetcher.fetch_content(&source.url, query).await,
            None => Err(AppError::InvalidInput("No content source selected".to_string())),
        };

        match result {
            Ok(page) if !page.items.is_empty() => ContentListing {
                page,
                current_page: query.page.unwrap_or(1).max(1),
                is_fallback: false,
                error: None,
            },
            Ok(_) => Self::mock_listing(query, None),
            Err(e) => {
                tracing::warn!(error = %e, "Content fetch failed, using mock page");
                Self::mock_listing(query, Some(e.to_string()))
            }
        }
    }

    fn mock_listing(query: &ContentQuery, error: Option<String>) -> ContentListing {
        let (current_page, page) = mock::mock_fallback(query);
        ContentListing {
            page,
            current_page,
            is_fallback: true,
            error,
        }
    }

    /// First page of every source, fetched together and merged by identifier
    pub async fn all_content(&self, sources: &[SourceConfig]) -> ContentListing {
        let query = ContentQuery::page(1);
        let results = join_all(
            sources
                .iter()
                .map(|source| self.fetcher.fetch_content(&source.url, &query)),
        )
        .await;

        let mut errors = Vec::new();
        let mut lists = Vec::new();
        for (source, result) in sources.iter().zip(results) {
            match result {
                Ok(page) => lists.push(page.items),
                Err(e) => {
                    tracing::warn!(source_id = %source.id, error = %e, "Source skipped in merged listing");
                    errors.push(format!("{}: {}", source.name, e));
                }
            }
        }

        let items = merge_by_id(lists);
        let error = (!errors.is_empty()).then(|| errors.join("; "));

        if items.is_empty() {
            let items = mock::mock_items();
            return ContentListing {
                page: PaginatedContentResponse {
                    total: items.len() as u64,
                    page_count: 1,
                    items,
                },
                current_page: 1,
                is_fallback: true,
                error,
            };
        }

        ContentListing {
            page: PaginatedContentResponse {
                total: items.len() as u64,
                page_count: 1,
                items,
            },
            current_page: 1,
            is_fallback: false,
            error,
        }
    }

    /// Looks an item up in `preferred`, then every other source in order, then
    /// the mock catalog.
    pub async fn find_content(
        &self,
        id: &str,
        preferred: Option<&SourceConfig>,
        sources: &[SourceConfig],
    ) -> AppResult<ContentItem> {
        let ordered = preferred
            .into_iter()
            .chain(sources.iter().filter(|s| Some(s.id) != preferred.map(|p| p.id)));

        for source in ordered {
            if let Some(item) = self.find_in_source(id, source).await {
                return Ok(item);
            }
        }

        mock::mock_item(id).ok_or_else(|| AppError::NotFound(format!("Content {}", id)))
    }

    async fn find_in_source(&self, id: &str, source: &SourceConfig) -> Option<ContentItem> {
        let mut page = 1;
        loop {
            let response = match self
                .fetcher
                .fetch_content(&source.url, &ContentQuery::page(page))
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    tracing::debug!(source_id = %source.id, error = %e, "Lookup fetch failed");
                    return None;
                }
            };

            if let Some(item) = response.items.into_iter().find(|item| item.id == id) {
                return Some(item);
            }
            if page >= response.page_count.min(MAX_LOOKUP_PAGES) {
                return None;
            }
            page += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fetcher::MockContentSource;

    fn item(id: &str, title: &str) -> ContentItem {
        ContentItem::new(id, title, "p")
    }

    fn source(name: &str) -> SourceConfig {
        SourceConfig::new(name.to_string(), format!("https://{}.example", name))
    }

    #[test]
    fn test_merge_by_id_keeps_each_id_once() {
        let merged = merge_by_id(vec![
            vec![item("1", "one"), item("2", "two")],
            vec![item("2", "two again"), item("3", "three")],
        ]);

        let ids: Vec<_> = merged.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(merged[1].title, "two again");
    }

    #[test]
    fn test_merge_within_one_list() {
        let merged = merge_by_id(vec![vec![item("1", "a"), item("1", "b")]]);
        assert_eq!(merged, vec![item("1", "b")]);
    }

    #[tokio::test]
    async fn test_all_content_deduplicates_across_sources() {
        let (a, b) = (source("a"), source("b"));
        let url_a = a.url.clone();
        let mut fetcher = MockContentSource::new();
        fetcher.expect_fetch_content().returning(move |url, _| {
            let items = if url == url_a {
                vec![item("x", "from a"), item("y", "only a")]
            } else {
                vec![item("x", "from b"), item("z", "only b")]
            };
            Ok(PaginatedContentResponse { total: 2, page_count: 1, items })
        });
        let library = ContentLibrary::new(Arc::new(fetcher));

        let listing = library.all_content(&[a, b]).await;

        let ids: Vec<_> = listing.page.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["x", "y", "z"]);
        assert_eq!(listing.page.items[0].title, "from b");
        assert!(!listing.is_fallback);
    }

    #[tokio::test]
    async fn test_all_content_without_results_uses_mock() {
        let mut fetcher = MockContentSource::new();
        fetcher
            .expect_fetch_content()
            .returning(|_, _| Err(AppError::ExternalApi("down".to_string())));
        let library = ContentLibrary::new(Arc::new(fetcher));

        let listing = library.all_content(&[source("a")]).await;

        assert!(listing.is_fallback);
        assert_eq!(listing.page.items, mock::mock_items());
        assert!(listing.error.unwrap().starts_with("a: "));
    }

    #[tokio::test]
    async fn test_categories_fallback() {
        let mut fetcher = MockContentSource::new();
        fetcher.expect_fetch_categories().returning(|_| Ok(vec![]));
        let library = ContentLibrary::new(Arc::new(fetcher));

        let listing = library.categories(Some(&source("a"))).await;
        assert!(listing.is_fallback);
        assert_eq!(listing.categories, mock::mock_categories());

        let listing = library.categories(None).await;
        assert!(listing.is_fallback);
        assert!(listing.error.is_some());
    }

    #[tokio::test]
    async fn test_content_page_passes_through_success() {
        let mut fetcher = MockContentSource::new();
        fetcher.expect_fetch_content().returning(|_, _| {
            Ok(PaginatedContentResponse {
                items: vec![item("1", "real")],
                total: 1,
                page_count: 1,
            })
        });
        let library = ContentLibrary::new(Arc::new(fetcher));

        let listing = library.content_page(Some(&source("a")), &ContentQuery::page(1)).await;
        assert!(!listing.is_fallback);
        assert_eq!(listing.page.items[0].title, "real");
    }

    #[tokio::test]
    async fn test_find_content_walks_pages_then_sources() {
        let (a, b) = (source("a"), source("b"));
        let url_b = b.url.clone();
        let mut fetcher = MockContentSource::new();
        fetcher.expect_fetch_content().returning(move |url, query| {
            let page = query.page.unwrap_or(1);
            let items = if url == url_b && page == 2 {
                vec![item("target", "found")]
            } else {
                vec![item(&format!("filler-{page}"), "filler")]
            };
            Ok(PaginatedContentResponse { items, total: 2, page_count: 2 })
        });
        let library = ContentLibrary::new(Arc::new(fetcher));

        let found = library
            .find_content("target", Some(&a), &[a.clone(), b.clone()])
            .await
            .unwrap();
        assert_eq!(found.title, "found");
    }

    #[tokio::test]
    async fn test_find_content_falls_back_to_mock_then_not_found() {
        let mut fetcher = MockContentSource::new();
        fetcher
            .expect_fetch_content()
            .returning(|_, _| Err(AppError::ExternalApi("down".to_string())));
        let library = ContentLibrary::new(Arc::new(fetcher));
        let sources = [source("a")];

        let mock_hit = library.find_content("mock-2", None, &sources).await.unwrap();
        assert_eq!(mock_hit.title, "Neon Run");

        let missing = library.find_content("missing", None, &sources).await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_content_page_fallback_is_never_empty() {
        let mut fetcher = MockContentSource::new();
        fetcher
            .expect_fetch_content()
            .returning(|_, _| Err(AppError::ExternalApi("down".to_string())));
        let library = ContentLibrary::new(Arc::new(fetcher));

        let unknown_category = ContentQuery {
            category_id: Some("horror".to_string()),
            ..ContentQuery::page(1)
        };
        let listing = library.content_page(Some(&source("a")), &unknown_category).await;
        assert!(listing.is_fallback);
        assert!(!listing.page.items.is_empty());

        let listing = library.content_page(Some(&source("a")), &ContentQuery::page(9)).await;
        assert!(!listing.page.items.is_empty());
        assert_eq!(listing.current_page, 1);
    }
}
