use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    pub viewing_history: String,
    pub preferences: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationResponse {
    pub recommendations: Vec<String>,
}

/// Generates watch recommendations from free-text history and preferences.
///
/// The model behind it is opaque; implementations only move the request and
/// response across the wire.
#[async_trait::async_trait]
pub trait RecommendationClient: Send + Sync {
    async fn recommend(&self, request: &RecommendationRequest) -> AppResult<RecommendationResponse>;
}

/// Calls a generative recommendation flow over HTTP
pub struct HttpRecommendationClient {
    http_client: HttpClient,
    endpoint: String,
}

impl HttpRecommendationClient {
    pub fn new(endpoint: String, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            endpoint,
        })
    }
}

#[async_trait::async_trait]
impl RecommendationClient for HttpRecommendationClient {
    async fn recommend(&self, request: &RecommendationRequest) -> AppResult<RecommendationResponse> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Recommendation service returned status {}: {}",
                status, body
            )));
        }

        let recommendations: RecommendationResponse = response.json().await.map_err(|e| {
            AppError::ExternalApi(format!("Malformed recommendation response: {}", e))
        })?;

        tracing::info!(
            count = recommendations.recommendations.len(),
            "Recommendations generated"
        );

        Ok(recommendations)
    }
}

/// Stand-in used when no recommendation endpoint is configured
pub struct UnconfiguredRecommendations;

#[async_trait::async_trait]
impl RecommendationClient for UnconfiguredRecommendations {
    async fn recommend(&self, _request: &RecommendationRequest) -> AppResult<RecommendationResponse> {
        Err(AppError::Unavailable(
            "Recommendation service is not configured".to_string(),
        ))
    }
}
