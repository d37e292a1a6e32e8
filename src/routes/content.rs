use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    api::AppState,
    error::AppResult,
    models::{ContentItem, ContentQuery},
    services::library::{CategoryListing, ContentListing},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceParams {
    pub source_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentParams {
    pub source_id: Option<Uuid>,
    pub category_id: Option<String>,
    pub search_term: Option<String>,
    pub page: Option<u32>,
}

pub async fn categories(
    State(state): State<AppState>,
    Query(params): Query<SourceParams>,
) -> AppResult<Json<CategoryListing>> {
    let source = state.registry.resolve(params.source_id).await?;
    Ok(Json(state.library.categories(source.as_ref()).await))
}

/// One page of a source, falling back to the mock catalog
pub async fn page(
    State(state): State<AppState>,
    Query(params): Query<ContentParams>,
) -> AppResult<Json<ContentListing>> {
    let source = state.registry.resolve(params.source_id).await?;
    let query = ContentQuery {
        page: Some(params.page.unwrap_or(1).max(1)),
        category_id: params.category_id,
        search_term: params.search_term,
    };

    Ok(Json(state.library.content_page(source.as_ref(), &query).await))
}

pub async fn all(State(state): State<AppState>) -> Json<ContentListing> {
    let sources = state.registry.list().await;
    Json(state.library.all_content(&sources).await)
}

pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<SourceParams>,
) -> AppResult<Json<ContentItem>> {
    let preferred = state.registry.resolve(params.source_id).await?;
    let sources = state.registry.list().await;
    let item = state
        .library
        .find_content(&id, preferred.as_ref(), &sources)
        .await?;
    Ok(Json(item))
}
