use axum::{
    http::StatusCode,
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    api::AppState,
    middleware::request_id::{make_span_with_request_id, request_id_middleware},
};

pub mod catalog;
pub mod content;
pub mod preferences;
pub mod proxy;
pub mod recommendations;
pub mod search;
pub mod sources;

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
}

/// API routes under /api
fn api_routes() -> Router<AppState> {
    Router::new()
        // Source registry
        .route("/sources", get(sources::list).post(sources::create))
        .route("/sources/active", get(sources::get_active).put(sources::set_active))
        .route("/sources/:id", delete(sources::delete))
        // Stateless content reads
        .route("/categories", get(content::categories))
        .route("/content", get(content::page))
        .route("/content/all", get(content::all))
        .route("/content/:id", get(content::detail))
        // Catalog sessions
        .route("/catalog", post(catalog::create))
        .route("/catalog/:id", get(catalog::get).delete(catalog::close))
        .route("/catalog/:id/query", put(catalog::set_query))
        .route("/catalog/:id/reload", post(catalog::reload))
        .route("/catalog/:id/page/:page", post(catalog::go_to_page))
        .route("/catalog/:id/next", post(catalog::next_page))
        .route("/catalog/:id/prev", post(catalog::prev_page))
        .route("/catalog/:id/more", post(catalog::load_more))
        // Search sessions
        .route("/search", post(search::create))
        .route(
            "/search/:id",
            get(search::get).put(search::update).delete(search::close),
        )
        .route("/search/:id/active", put(search::select_source))
        // Preferences and recommendations
        .route("/preferences", get(preferences::get).put(preferences::update))
        .route("/recommendations", post(recommendations::recommend))
        .route("/proxy", get(proxy::proxy))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
