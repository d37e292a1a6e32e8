use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{api::AppState, error::AppResult, models::SourceConfig};

#[derive(Debug, Deserialize)]
pub struct CreateSourceRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetActiveRequest {
    pub source_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSourceResponse {
    pub active_source_id: Option<Uuid>,
    pub source: Option<SourceConfig>,
}

pub async fn list(State(state): State<AppState>) -> Json<Vec<SourceConfig>> {
    Json(state.registry.list().await)
}

pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateSourceRequest>,
) -> AppResult<(StatusCode, Json<SourceConfig>)> {
    let source = state.registry.add(&request.name, &request.url).await?;
    Ok((StatusCode::CREATED, Json(source)))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SourceConfig>> {
    Ok(Json(state.registry.remove(id).await?))
}

pub async fn get_active(State(state): State<AppState>) -> Json<ActiveSourceResponse> {
    let source = state.registry.active().await;
    Json(ActiveSourceResponse {
        active_source_id: source.as_ref().map(|s| s.id),
        source,
    })
}

/// Selects the active source; an unknown id falls back to the first source
pub async fn set_active(
    State(state): State<AppState>,
    Json(request): Json<SetActiveRequest>,
) -> AppResult<Json<ActiveSourceResponse>> {
    let active_source_id = state.registry.set_active(request.source_id).await?;
    let source = state.registry.active().await;
    Ok(Json(ActiveSourceResponse {
        active_source_id,
        source,
    }))
}
