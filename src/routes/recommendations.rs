use axum::{extract::State, Json};
use serde::Deserialize;

use crate::{
    api::AppState,
    error::{AppError, AppResult},
    models::PreferencesUpdate,
    services::{RecommendationRequest, RecommendationResponse},
};

/// Both fields are optional; missing ones are taken from stored preferences
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendParams {
    pub viewing_history: Option<String>,
    pub preferences: Option<String>,
}

/// Handler for recommendations endpoint
pub async fn recommend(
    State(state): State<AppState>,
    Json(params): Json<RecommendParams>,
) -> AppResult<Json<RecommendationResponse>> {
    if params.viewing_history.is_some() || params.preferences.is_some() {
        state
            .preferences
            .update(PreferencesUpdate {
                theme: None,
                viewing_history: params.viewing_history.clone(),
                preferences: params.preferences.clone(),
            })
            .await?;
    }

    let stored = state.preferences.get().await?;
    let request = RecommendationRequest {
        viewing_history: params.viewing_history.unwrap_or(stored.viewing_history),
        preferences: params.preferences.unwrap_or(stored.preferences),
    };

    if request.viewing_history.trim().is_empty() && request.preferences.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Provide a viewing history or preferences".to_string(),
        ));
    }

    let response = state.recommender.recommend(&request).await?;
    Ok(Json(response))
}
