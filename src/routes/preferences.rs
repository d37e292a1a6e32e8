use axum::{extract::State, Json};

use crate::{
    api::AppState,
    error::AppResult,
    models::{PreferencesUpdate, UserPreferences},
};

pub async fn get(State(state): State<AppState>) -> AppResult<Json<UserPreferences>> {
    Ok(Json(state.preferences.get().await?))
}

/// Partial update; omitted fields keep their stored value
pub async fn update(
    State(state): State<AppState>,
    Json(update): Json<PreferencesUpdate>,
) -> AppResult<Json<UserPreferences>> {
    Ok(Json(state.preferences.update(update).await?))
}
