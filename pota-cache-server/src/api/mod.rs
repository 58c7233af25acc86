//! HTTP surface: Overpass-compatible query routes, cache status and reload.

mod error;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use log::{error, info};
use pota_cache_core::{OverpassDocument, SnapshotCache, filter_document, parse_bbox};
use serde::Serialize;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use url::form_urlencoded;

use crate::refresh::Refresher;

pub use error::ApiError;

/// Parameter names that may carry the query text, in lookup order.
const QUERY_KEYS: [&str; 2] = ["data", "query"];

/// Shared handles for request handlers.
#[derive(Clone)]
pub struct AppState {
    cache: Arc<SnapshotCache>,
    refresher: Arc<dyn Refresher>,
}

impl AppState {
    /// State reading from `cache` and reloading through `refresher`.
    #[must_use]
    pub fn new(cache: Arc<SnapshotCache>, refresher: Arc<dyn Refresher>) -> Self {
        Self { cache, refresher }
    }
}

/// Build the application router.
///
/// `reload_path` is the route of the force-refresh endpoint.
pub fn router(state: AppState, reload_path: &str) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/interpreter", get(query_get).post(query_post))
        .route("/api/overpass", get(query_get).post(query_post))
        .route("/api/cache_status", get(cache_status))
        .route(reload_path, get(reload))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
}

async fn query_get(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<OverpassDocument>, ApiError> {
    let text = lookup(|key| params.get(key).map(String::as_str));
    answer(&state, text.map(str::to_owned))
}

async fn query_post(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<OverpassDocument>, ApiError> {
    answer(&state, query_from_body(&body))
}

/// Query text from a form-encoded body, or the raw body when it has no
/// `data`/`query` field.
fn query_from_body(body: &[u8]) -> Option<String> {
    let form: HashMap<String, String> = form_urlencoded::parse(body).into_owned().collect();
    if let Some(text) = lookup(|key| form.get(key).map(String::as_str)) {
        return Some(text.to_owned());
    }
    let raw = std::str::from_utf8(body).ok()?.trim();
    (!raw.is_empty()).then(|| raw.to_owned())
}

fn lookup<'a>(get: impl Fn(&str) -> Option<&'a str>) -> Option<&'a str> {
    QUERY_KEYS
        .into_iter()
        .find_map(|key| get(key).filter(|value| !value.trim().is_empty()))
}

fn answer(state: &AppState, text: Option<String>) -> Result<Json<OverpassDocument>, ApiError> {
    let started = Instant::now();
    let text = text.ok_or(ApiError::MissingQuery)?;
    info!("received query: {text}");
    let bbox = parse_bbox(&text)?;
    let snapshot = state.cache.read().ok_or(ApiError::NoCacheYet)?;

    let filtered = filter_document(&snapshot.document, &bbox);
    info!(
        "returning {} of {} elements from cache. last cache update: {}. processing time: {:.2?}",
        filtered.elements.len(),
        snapshot.element_count(),
        snapshot.fetched_at.to_rfc3339(),
        started.elapsed()
    );
    Ok(Json(filtered))
}

#[derive(Debug, Serialize)]
struct CacheStatusBody {
    status: &'static str,
    elements_count: usize,
    last_update: Option<DateTime<Utc>>,
    cache_refresh_count: u64,
}

async fn cache_status(State(state): State<AppState>) -> Json<CacheStatusBody> {
    let status = state.cache.status();
    Json(CacheStatusBody {
        status: if status.last_update.is_some() {
            "Cache available"
        } else {
            "No data cached"
        },
        elements_count: status.element_count,
        last_update: status.last_update,
        cache_refresh_count: status.refresh_count,
    })
}

#[derive(Debug, Serialize)]
struct ReloadBody {
    status: &'static str,
    message: String,
    elements_count: Option<usize>,
    timestamp: DateTime<Utc>,
}

async fn reload(State(state): State<AppState>) -> (StatusCode, Json<ReloadBody>) {
    match state.refresher.refresh(true).await {
        Ok(report) => (
            StatusCode::OK,
            Json(ReloadBody {
                status: "success",
                message: format!("Cache reloaded with {} elements", report.element_count),
                elements_count: Some(report.element_count),
                timestamp: report.published_at,
            }),
        ),
        Err(err) => {
            error!("forced reload failed: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ReloadBody {
                    status: "error",
                    message: err.to_string(),
                    elements_count: None,
                    timestamp: Utc::now(),
                }),
            )
        }
    }
}
