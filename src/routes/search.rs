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
    services::{SearchSession, SearchSnapshot},
};

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectSourceRequest {
    pub source_id: Uuid,
}

async fn session(state: &AppState, id: Uuid) -> AppResult<Arc<SearchSession>> {
    state.sessions.read().await.search(id)
}

/// Runs a search across every registered source and keeps the session for
/// later source selection
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> (StatusCode, Json<SearchSnapshot>) {
    let session = Arc::new(SearchSession::new(state.fetcher.clone()));
    state.sessions.write().await.insert_search(session.clone());

    let sources = state.registry.list().await;
    let snapshot = session.search(&request.query, sources).await;
    (StatusCode::CREATED, Json(snapshot))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SearchSnapshot>> {
    Ok(Json(session(&state, id).await?.snapshot().await))
}

/// Re-runs an existing session with a new query
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SearchRequest>,
) -> AppResult<Json<SearchSnapshot>> {
    let session = session(&state, id).await?;
    let sources = state.registry.list().await;
    Ok(Json(session.search(&request.query, sources).await))
}

pub async fn select_source(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SelectSourceRequest>,
) -> AppResult<Json<SearchSnapshot>> {
    let session = session(&state, id).await?;
    Ok(Json(session.select_source(request.source_id).await?))
}

pub async fn close(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<StatusCode> {
    if state.sessions.write().await.remove_search(id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Search session {}", id)))
    }
}
