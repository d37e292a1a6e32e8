/// Content fetching against user-configured source APIs
///
/// Every source exposes one base URL. Content lists are requested with
/// `page`, `categoryId` and `searchTerm` query parameters; the category list
/// lives at the same URL with `resource=categories`. Responses go through the
/// shape checks in [`crate::models::raw`] before anything else sees them.
use std::time::Duration;

use reqwest::Client as HttpClient;
use serde_json::Value;

use crate::{
    error::{AppError, AppResult},
    models::{parse_categories, parse_content_page, ApiCategory, ContentQuery, PaginatedContentResponse},
};

/// Query parameter selecting the category listing
const CATEGORY_RESOURCE: (&str, &str) = ("resource", "categories");

/// Trait for anything that can serve content from a source URL
///
/// A failed fetch is always an `Err`; falling back to mock data is the
/// caller's decision.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch the category list of a source
    async fn fetch_categories(&self, base_url: &str) -> AppResult<Vec<ApiCategory>>;

    /// Fetch one page of content
    async fn fetch_content(
        &self,
        base_url: &str,
        query: &ContentQuery,
    ) -> AppResult<PaginatedContentResponse>;
}

#[derive(Clone)]
pub struct HttpContentFetcher {
    http_client: HttpClient,
}

impl HttpContentFetcher {
    pub fn new(timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self { http_client })
    }

    pub fn with_client(http_client: HttpClient) -> Self {
        Self { http_client }
    }

    /// Issues a GET and decodes the body as JSON, mapping every failure to an error
    async fn get_json(&self, base_url: &str, query: &[(&str, String)]) -> AppResult<Value> {
        let response = self.http_client.get(base_url).query(query).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                url = %base_url,
                status = %status,
                "Content source returned an error status"
            );
            return Err(AppError::ExternalApi(format!(
                "Source returned status {}: {}",
                status, body
            )));
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            tracing::warn!(url = %base_url, error = %e, "Content source returned non-JSON body");
            AppError::ExternalApi(format!("Source returned invalid JSON: {}", e))
        })
    }
}

#[async_trait::async_trait]
impl ContentSource for HttpContentFetcher {
    async fn fetch_categories(&self, base_url: &str) -> AppResult<Vec<ApiCategory>> {
        let (name, value) = CATEGORY_RESOURCE;
        let payload = self.get_json(base_url, &[(name, value.to_string())]).await?;

        let categories = parse_categories(payload).map_err(|e| {
            AppError::ExternalApi(format!("Unexpected category list shape: {}", e))
        })?;

        tracing::debug!(url = %base_url, count = categories.len(), "Categories fetched");

        Ok(categories)
    }

    async fn fetch_content(
        &self,
        base_url: &str,
        query: &ContentQuery,
    ) -> AppResult<PaginatedContentResponse> {
        let payload = self.get_json(base_url, &query.to_pairs()).await?;

        let page = parse_content_page(payload).map_err(|e| {
            AppError::ExternalApi(format!("Unexpected content list shape: {}", e))
        })?;

        tracing::info!(
            url = %base_url,
            page = query.page.unwrap_or(1),
            items = page.items.len(),
            total = page.total,
            "Content fetched"
        );

        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher() -> HttpContentFetcher {
        HttpContentFetcher::new(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_content_sends_query_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/catalog"))
            .and(query_param("page", "2"))
            .and(query_param("categoryId", "drama"))
            .and(query_param("searchTerm", "night"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    { "id": "1", "title": "Night Train", "posterUrl": "https://img.example/1.jpg" },
                    { "id": "2", "title": "Missing poster" }
                ],
                "total": 11,
                "pageCount": 2
            })))
            .expect(1)
            .mount(&server)
            .await;

        let query = ContentQuery {
            page: Some(2),
            category_id: Some("drama".to_string()),
            search_term: Some("night".to_string()),
        };
        let page = fetcher()
            .fetch_content(&format!("{}/catalog", server.uri()), &query)
            .await
            .unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].title, "Night Train");
        assert_eq!(page.total, 11);
        assert_eq!(page.page_count, 2);
    }

    #[tokio::test]
    async fn test_fetch_content_error_status_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("down"))
            .mount(&server)
            .await;

        let result = fetcher().fetch_content(&server.uri(), &ContentQuery::page(1)).await;
        assert!(matches!(result, Err(AppError::ExternalApi(msg)) if msg.contains("503")));
    }

    #[tokio::test]
    async fn test_fetch_content_non_json_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let result = fetcher().fetch_content(&server.uri(), &ContentQuery::page(1)).await;
        assert!(matches!(result, Err(AppError::ExternalApi(_))));
    }

    #[tokio::test]
    async fn test_fetch_content_unreachable_is_failure() {
        // Nothing listens on port 9 on the loopback interface
        let result = fetcher()
            .fetch_content("http://127.0.0.1:9/api", &ContentQuery::page(1))
            .await;
        assert!(matches!(result, Err(AppError::HttpClient(_))));
    }

    #[tokio::test]
    async fn test_repeated_fetch_is_identical() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{ "id": "a", "title": "A", "posterUrl": "p" }],
                "total": 1,
                "pageCount": 1
            })))
            .mount(&server)
            .await;

        let fetcher = fetcher();
        let query = ContentQuery::page(1);
        let first = fetcher.fetch_content(&server.uri(), &query).await.unwrap();
        let second = fetcher.fetch_content(&server.uri(), &query).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_fetch_categories() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("resource", "categories"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": "action", "name": "Action" },
                { "id": "comedy", "name": "Comedy" }
            ])))
            .mount(&server)
            .await;

        let categories = fetcher().fetch_categories(&server.uri()).await.unwrap();
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[1].name, "Comedy");
    }
}
