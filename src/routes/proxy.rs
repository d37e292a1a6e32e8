//! Pass-through for source APIs the browser cannot reach directly.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use crate::api::AppState;

#[derive(Debug, Deserialize)]
pub struct ProxyParams {
    pub url: Option<String>,
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

/// Accepts absolute http(s) URLs only
fn target_url(raw: Option<&str>) -> Result<Url, Response> {
    let raw = raw
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| bad_request("Missing url query parameter"))?;

    let url = Url::parse(raw).map_err(|_| bad_request("Invalid url query parameter"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(bad_request("Only http and https URLs can be proxied")),
    }
}

/// Fetches `url` and relays the result.
///
/// JSON bodies are returned verbatim, other bodies are wrapped as
/// `{nonJsonData}`. Upstream error statuses are mirrored.
pub async fn proxy(State(state): State<AppState>, Query(params): Query<ProxyParams>) -> Response {
    let target = match target_url(params.url.as_deref()) {
        Ok(url) => url,
        Err(response) => return response,
    };

    let upstream = match state.proxy_client.get(target.clone()).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(url = %target, error = %e, "Proxy request failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Failed to fetch from the target URL",
                    "details": e.to_string()
                })),
            )
                .into_response();
        }
    };

    let status = StatusCode::from_u16(upstream.status().as_u16())
        .unwrap_or(StatusCode::BAD_GATEWAY);
    let body = match upstream.text().await {
        Ok(body) => body,
        Err(e) => {
            tracing::error!(url = %target, error = %e, "Proxy body read failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Failed to read the upstream response",
                    "details": e.to_string()
                })),
            )
                .into_response();
        }
    };

    if !status.is_success() {
        tracing::warn!(url = %target, status = %status, "Proxy upstream returned an error");
        let mut payload = json!({ "error": format!("Upstream responded with status {}", status) });
        if !body.is_empty() {
            payload["details"] = Value::String(body);
        }
        return (status, Json(payload)).into_response();
    }

    match serde_json::from_str::<Value>(&body) {
        Ok(value) => (StatusCode::OK, Json(value)).into_response(),
        Err(_) => (StatusCode::OK, Json(json!({ "nonJsonData": body }))).into_response(),
    }
}
