use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    api::AppState,
    error::{AppError, AppResult},
    services::{CatalogQuery, CatalogSession, CatalogSnapshot, ScrollMode},
};

/// Selection sent when creating a session or changing its query
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub source_id: Option<Uuid>,
    pub category_id: Option<String>,
    pub search_term: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateCatalogRequest {
    #[serde(default)]
    pub mode: ScrollMode,
    #[serde(flatten)]
    pub query: QueryRequest,
}

async fn build_query(state: &AppState, request: QueryRequest) -> AppResult<CatalogQuery> {
    let source = state.registry.resolve(request.source_id).await?;
    Ok(CatalogQuery {
        source_id: source.as_ref().map(|s| s.id),
        source_url: source.map(|s| s.url),
        category_id: request.category_id.filter(|c| !c.is_empty()),
        search_term: request
            .search_term
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty()),
    })
}

async fn session(state: &AppState, id: Uuid) -> AppResult<Arc<CatalogSession>> {
    state.sessions.read().await.catalog(id)
}

/// Opens a session and loads the first page of its initial query
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateCatalogRequest>,
) -> AppResult<(StatusCode, Json<CatalogSnapshot>)> {
    let query = build_query(&state, request.query).await?;
    let session = Arc::new(CatalogSession::new(state.fetcher.clone(), request.mode));
    state.sessions.write().await.insert_catalog(session.clone());

    tracing::info!(session_id = %session.id(), mode = ?request.mode, "Catalog session opened");

    let snapshot = session.set_query(query).await;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<CatalogSnapshot>> {
    Ok(Json(session(&state, id).await?.snapshot().await))
}

pub async fn close(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<StatusCode> {
    if state.sessions.write().await.remove_catalog(id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Catalog session {}", id)))
    }
}

pub async fn set_query(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<QueryRequest>,
) -> AppResult<Json<CatalogSnapshot>> {
    let session = session(&state, id).await?;
    let query = build_query(&state, request).await?;
    Ok(Json(session.set_query(query).await))
}

pub async fn reload(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<CatalogSnapshot>> {
    Ok(Json(session(&state, id).await?.reload().await))
}

pub async fn go_to_page(
    State(state): State<AppState>,
    Path((id, page)): Path<(Uuid, u32)>,
) -> AppResult<Json<CatalogSnapshot>> {
    Ok(Json(session(&state, id).await?.go_to_page(page).await?))
}

pub async fn next_page(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<CatalogSnapshot>> {
    Ok(Json(session(&state, id).await?.next_page().await?))
}

pub async fn prev_page(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<CatalogSnapshot>> {
    Ok(Json(session(&state, id).await?.prev_page().await?))
}

/// End-of-list notification from an infinitely scrolling client
pub async fn load_more(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<CatalogSnapshot>> {
    Ok(Json(session(&state, id).await?.on_sentinel_visible().await?))
}
