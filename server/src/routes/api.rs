use std::fmt::Write as _;

use axum::Json;
use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use tracing::warn;

use atlas_shared::catalog::{CATALOG, MapCategory, MapDescriptor, MapLevel, find};
use atlas_shared::{StateStat, find_state_summary};

use crate::state::{AppState, ObservabilitySnapshot};

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let observability = state.observability.snapshot();
    Json(serde_json::json!({
        "status": "ok",
        "catalog_size": CATALOG.len(),
        "preview_cache_size": state.preview_cache.len(),
        "district_table_fetched": state.stat_cache.district_fetched_at().is_some(),
        "state_table_fetched": state.stat_cache.state_fetched_at().is_some(),
        "observability": {
            "catalog_requests_total": observability.catalog_requests_total,
            "summary_requests_total": observability.summary_requests_total,
            "preview_requests_total": observability.preview_requests_total,
            "preview_renders_total": observability.preview_renders_total,
            "preview_failures_total": observability.preview_failures_total,
        }
    }))
}

/// Catalog entry as served on the wire: the descriptor plus its prose
/// description, which the client shows under the map switcher.
#[derive(serde::Serialize)]
pub struct CatalogEntry {
    pub id: &'static str,
    pub title: &'static str,
    pub category: MapCategory,
    pub level: MapLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<&'static str>,
    pub description: &'static str,
    pub boundary_path: &'static str,
}

impl From<&MapDescriptor> for CatalogEntry {
    fn from(descriptor: &MapDescriptor) -> Self {
        Self {
            id: descriptor.id,
            title: descriptor.title,
            category: descriptor.category,
            level: descriptor.level,
            state: descriptor.state,
            description: descriptor.description(),
            boundary_path: descriptor.boundary_path,
        }
    }
}

pub async fn get_catalog(State(state): State<AppState>) -> Json<Vec<CatalogEntry>> {
    state.observability.record_catalog_request();
    Json(CATALOG.iter().map(CatalogEntry::from).collect())
}

pub async fn get_map(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CatalogEntry>, StatusCode> {
    state.observability.record_catalog_request();
    find(&id)
        .map(CatalogEntry::from)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

fn default_map_type() -> String {
    "current".to_string()
}

#[derive(serde::Deserialize)]
pub struct SummaryQuery {
    #[serde(default = "default_map_type")]
    pub map_type: String,
}

pub async fn get_state_summary(
    State(state): State<AppState>,
    Path(state_name): Path<String>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<StateStat>, StatusCode> {
    state.observability.record_summary_request();

    let rows = state.stat_cache.state_stats().await.map_err(|err| {
        warn!(error = %err, "state summary table unavailable");
        StatusCode::BAD_GATEWAY
    })?;

    find_state_summary(&rows, &state_name, &query.map_type)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let catalog_size = CATALOG.len();
    let preview_cache_size = state.preview_cache.len();
    let observability = state.observability.snapshot();

    let body = render_prometheus_metrics(catalog_size, preview_cache_size, observability);

    (
        [
            (header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE),
            (header::CACHE_CONTROL, "no-store"),
        ],
        body,
    )
}

fn render_prometheus_metrics(
    catalog_size: usize,
    preview_cache_size: usize,
    observability: ObservabilitySnapshot,
) -> String {
    let mut body = String::new();
    let _ = writeln!(body, "# HELP atlas_catalog_size Number of maps in the catalog.");
    let _ = writeln!(body, "# TYPE atlas_catalog_size gauge");
    let _ = writeln!(body, "atlas_catalog_size {catalog_size}");

    let _ = writeln!(
        body,
        "# HELP atlas_preview_cache_size Number of rendered previews held in memory."
    );
    let _ = writeln!(body, "# TYPE atlas_preview_cache_size gauge");
    let _ = writeln!(body, "atlas_preview_cache_size {preview_cache_size}");

    let _ = writeln!(
        body,
        "# HELP atlas_catalog_requests_total Total catalog API requests."
    );
    let _ = writeln!(body, "# TYPE atlas_catalog_requests_total counter");
    let _ = writeln!(
        body,
        "atlas_catalog_requests_total {}",
        observability.catalog_requests_total
    );

    let _ = writeln!(
        body,
        "# HELP atlas_summary_requests_total Total state summary API requests."
    );
    let _ = writeln!(body, "# TYPE atlas_summary_requests_total counter");
    let _ = writeln!(
        body,
        "atlas_summary_requests_total {}",
        observability.summary_requests_total
    );

    let _ = writeln!(
        body,
        "# HELP atlas_preview_requests_total Total preview API requests."
    );
    let _ = writeln!(body, "# TYPE atlas_preview_requests_total counter");
    let _ = writeln!(
        body,
        "atlas_preview_requests_total {}",
        observability.preview_requests_total
    );

    let _ = writeln!(
        body,
        "# HELP atlas_preview_renders_total Total previews rendered from boundary data."
    );
    let _ = writeln!(body, "# TYPE atlas_preview_renders_total counter");
    let _ = writeln!(
        body,
        "atlas_preview_renders_total {}",
        observability.preview_renders_total
    );

    let _ = writeln!(
        body,
        "# HELP atlas_preview_failures_total Total preview requests that failed to load boundaries."
    );
    let _ = writeln!(body, "# TYPE atlas_preview_failures_total counter");
    let _ = writeln!(
        body,
        "atlas_preview_failures_total {}",
        observability.preview_failures_total
    );

    body
}

pub(crate) fn bytes_response(
    body: Bytes,
    content_type: &'static str,
    cache_control: &'static str,
    etag: Option<&str>,
) -> Response {
    let mut response = Response::new(Body::from(body));
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(cache_control),
    );
    if let Some(etag) = etag
        && let Ok(etag_header) = HeaderValue::from_str(etag)
    {
        headers.insert(header::ETAG, etag_header);
    }
    response
}

pub(crate) fn not_modified_response(cache_control: &'static str, etag: Option<&str>) -> Response {
    let mut response = StatusCode::NOT_MODIFIED.into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(cache_control),
    );
    if let Some(etag) = etag
        && let Ok(etag_header) = HeaderValue::from_str(etag)
    {
        headers.insert(header::ETAG, etag_header);
    }
    response
}

fn normalize_etag(candidate: &str) -> &str {
    candidate.strip_prefix("W/").unwrap_or(candidate).trim()
}

pub(crate) fn if_none_match_matches(headers: &HeaderMap, etag: &str) -> bool {
    let Some(value) = headers.get(header::IF_NONE_MATCH) else {
        return false;
    };
    let Ok(raw) = value.to_str() else {
        return false;
    };

    raw.split(',').any(|candidate| {
        let candidate = candidate.trim();
        candidate == "*" || normalize_etag(candidate) == normalize_etag(etag)
    })
}
