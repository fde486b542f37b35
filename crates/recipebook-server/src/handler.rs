use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use serde_json::json;

use recipebook_state::{RequestRecord, RequestTracker};

use crate::app::AppState;
use crate::error::ApiError;

/// Health check handler.
pub async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "name": "recipebook-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    pub loading: bool,
    pub last_error: Option<String>,
    pub requests: Vec<RequestRecord>,
}

impl TrackerSummary {
    /// Summarize `tracker`, then drop the settled requests it reported.
    fn drain(tracker: &RequestTracker, account_id: Option<String>) -> Self {
        let summary = Self {
            account_id,
            loading: tracker.is_loading(),
            last_error: tracker.last_error(),
            requests: tracker.snapshot(),
        };
        tracker.clear_settled();
        summary
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub cached_recipes: usize,
    pub recipes: TrackerSummary,
    pub favorites: Vec<TrackerSummary>,
}

/// Request tracker summary. Settled requests are reported once.
pub async fn status_handler(State(app): State<AppState>) -> Json<StatusResponse> {
    let favorites = app
        .favorite_caches()
        .into_iter()
        .map(|(account, cache)| TrackerSummary::drain(cache.tracker(), Some(account)))
        .collect();
    Json(StatusResponse {
        cached_recipes: app.recipes.len(),
        recipes: TrackerSummary::drain(app.recipes.tracker(), None),
        favorites,
    })
}

/// Serves blobs written by the configured blob store.
pub async fn image_handler(
    State(app): State<AppState>,
    Path(path): Path<String>,
) -> Result<Response, ApiError> {
    let path = path.trim_start_matches('/');
    match app.blobs.download(path).await? {
        Some(data) => Ok(([(header::CONTENT_TYPE, content_type_for(path))], data).into_response()),
        None => Err(ApiError::NotFound(format!("image not found: {path}"))),
    }
}

fn content_type_for(path: &str) -> &'static str {
    let ext = path.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}
