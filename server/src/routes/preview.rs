use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::warn;

use atlas_engine::{MapView, NoopHost, SvgSurface, load_boundaries};
use atlas_shared::catalog::find;
use atlas_shared::{DistrictLookup, build_district_lookup};

use crate::config::{PREVIEW_HEIGHT, PREVIEW_WIDTH};
use crate::routes::api::{bytes_response, if_none_match_matches, not_modified_response};
use crate::state::AppState;

const SVG_CONTENT_TYPE: &str = "image/svg+xml";
const PREVIEW_CACHE_CONTROL: &str = "public, max-age=300";

/// Server-side render of one catalog map. Unknown ids are 404; a boundary
/// document that cannot be loaded is 502. Missing stat tables are not an
/// error, the preview just renders with neutral fills.
pub async fn get_preview(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, StatusCode> {
    state.observability.record_preview_request();
    let descriptor = find(&id).ok_or(StatusCode::NOT_FOUND)?;

    let lookup = match state.stat_cache.district_stats().await {
        Ok(rows) => build_district_lookup(&rows),
        Err(err) => {
            warn!(error = %err, map = %id, "district stats unavailable; preview renders uncolored");
            DistrictLookup::new()
        }
    };

    let etag = preview_etag(&id, state.stat_cache.district_fetched_at());
    if if_none_match_matches(&headers, &etag) {
        return Ok(not_modified_response(PREVIEW_CACHE_CONTROL, Some(&etag)));
    }

    if let Some(cached) = state.preview_cache.get(&id) {
        let body = Arc::clone(cached.value());
        return Ok(bytes_response(
            (*body).clone(),
            SVG_CONTENT_TYPE,
            PREVIEW_CACHE_CONTROL,
            Some(&etag),
        ));
    }

    let collection = load_boundaries(state.boundary_source.as_ref(), descriptor.boundary_path)
        .await
        .map_err(|err| {
            state.observability.record_preview_failure();
            warn!(error = %err, map = %id, "boundary load failed for preview");
            StatusCode::BAD_GATEWAY
        })?;

    let mut view = MapView::new(
        SvgSurface::new(PREVIEW_WIDTH, PREVIEW_HEIGHT),
        NoopHost,
        PREVIEW_WIDTH,
        PREVIEW_HEIGHT,
    );
    view.set_stat_lookup(lookup);
    let generation = view.begin_load();
    view.apply_load(generation, Ok(collection));
    let svg = view.surface().render();
    state.observability.record_preview_render();

    let body = Arc::new(Bytes::from(svg));
    state.preview_cache.insert(id, Arc::clone(&body));
    Ok(bytes_response(
        (*body).clone(),
        SVG_CONTENT_TYPE,
        PREVIEW_CACHE_CONTROL,
        Some(&etag),
    ))
}

fn preview_etag(id: &str, stats_fetched_at: Option<DateTime<Utc>>) -> String {
    let stamp = stats_fetched_at.map(|at| at.timestamp()).unwrap_or(0);
    format!("\"preview-{id}-{stamp}\"")
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::net::SocketAddr;

    use crate::state::AppState;

    const DISTRICT_CSV: &str = "state,map_type,district,dem_margin\n\
        Example West,current,1,-20.0\n\
        Example West,current,2,20.0\n";
    const STATE_CSV: &str = "state,map_type,expected_dem_seats\nExample West,current,4.2\n";

    const WEST_GEOJSON: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"state": "Example West", "map_type": "current", "district": "1", "name": "District 1"},
                "geometry": {"type": "Polygon", "coordinates": [[[-109.0, 37.0], [-102.0, 37.0], [-102.0, 41.0], [-109.0, 41.0], [-109.0, 37.0]]]}
            },
            {
                "type": "Feature",
                "properties": {"state": "Example West", "map_type": "current", "district": "2", "name": "District 2"},
                "geometry": {"type": "Polygon", "coordinates": [[[-102.0, 37.0], [-95.0, 37.0], [-95.0, 41.0], [-102.0, 41.0], [-102.0, 37.0]]]}
            }
        ]
    }"#;

    fn seeded_state(with_tables: bool) -> (tempfile::TempDir, AppState) {
        let dir = tempfile::tempdir().expect("create temp data dir");
        fs::create_dir_all(dir.path().join("maps")).expect("create maps/");
        fs::write(
            dir.path().join("maps/example-west_current.geojson"),
            WEST_GEOJSON,
        )
        .expect("write boundary file");
        if with_tables {
            fs::create_dir_all(dir.path().join("data")).expect("create data/");
            fs::write(dir.path().join("data/districts.csv"), DISTRICT_CSV)
                .expect("write district table");
            fs::write(dir.path().join("data/states.csv"), STATE_CSV).expect("write state table");
        }
        let state = AppState::new(dir.path().to_path_buf(), None);
        (dir, state)
    }

    async fn spawn_test_server(state: AppState) -> (SocketAddr, tokio::task::JoinHandle<()>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("listener address");
        let app = crate::app::build_app(state);
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve test app");
        });
        (addr, handle)
    }

    #[tokio::test]
    async fn preview_renders_joined_fill_colors() {
        let (_dir, state) = seeded_state(true);
        let (addr, server_handle) = spawn_test_server(state).await;

        let response = reqwest::get(format!(
            "http://{addr}/api/maps/example-west-current/preview.svg"
        ))
        .await
        .expect("request preview");
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok()),
            Some("image/svg+xml")
        );
        assert!(response.headers().get("etag").is_some());

        let svg = response.text().await.expect("read svg");
        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains("#c94c4c"));
        assert!(svg.contains("#4c74c9"));

        server_handle.abort();
    }

    #[tokio::test]
    async fn preview_is_rendered_once_then_served_from_cache() {
        let (_dir, state) = seeded_state(true);
        let (addr, server_handle) = spawn_test_server(state).await;
        let url = format!("http://{addr}/api/maps/example-west-current/preview.svg");

        let first = reqwest::get(&url)
            .await
            .expect("first request")
            .text()
            .await
            .expect("first body");
        let second = reqwest::get(&url)
            .await
            .expect("second request")
            .text()
            .await
            .expect("second body");
        assert_eq!(first, second);

        let metrics = reqwest::get(format!("http://{addr}/api/metrics"))
            .await
            .expect("request metrics")
            .text()
            .await
            .expect("read metrics");
        assert!(metrics.contains("atlas_preview_requests_total 2"));
        assert!(metrics.contains("atlas_preview_renders_total 1"));

        server_handle.abort();
    }

    #[tokio::test]
    async fn preview_honors_if_none_match() {
        let (_dir, state) = seeded_state(true);
        let (addr, server_handle) = spawn_test_server(state).await;
        let url = format!("http://{addr}/api/maps/example-west-current/preview.svg");

        let first = reqwest::get(&url).await.expect("first request");
        let etag = first
            .headers()
            .get("etag")
            .and_then(|v| v.to_str().ok())
            .expect("etag header")
            .to_string();

        let revalidation = reqwest::Client::new()
            .get(&url)
            .header("if-none-match", &etag)
            .send()
            .await
            .expect("conditional request");
        assert_eq!(revalidation.status(), reqwest::StatusCode::NOT_MODIFIED);

        server_handle.abort();
    }

    #[tokio::test]
    async fn unknown_map_id_is_not_found() {
        let (_dir, state) = seeded_state(true);
        let (addr, server_handle) = spawn_test_server(state).await;

        let response = reqwest::get(format!("http://{addr}/api/maps/nowhere/preview.svg"))
            .await
            .expect("request preview");
        assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);

        server_handle.abort();
    }

    #[tokio::test]
    async fn missing_boundary_document_is_bad_gateway() {
        let (_dir, state) = seeded_state(true);
        let (addr, server_handle) = spawn_test_server(state).await;

        let response = reqwest::get(format!(
            "http://{addr}/api/maps/national-current/preview.svg"
        ))
        .await
        .expect("request preview");
        assert_eq!(response.status(), reqwest::StatusCode::BAD_GATEWAY);

        let metrics = reqwest::get(format!("http://{addr}/api/metrics"))
            .await
            .expect("request metrics")
            .text()
            .await
            .expect("read metrics");
        assert!(metrics.contains("atlas_preview_failures_total 1"));

        server_handle.abort();
    }

    #[tokio::test]
    async fn missing_stat_tables_degrade_to_neutral_fills() {
        let (_dir, state) = seeded_state(false);
        let (addr, server_handle) = spawn_test_server(state).await;

        let response = reqwest::get(format!(
            "http://{addr}/api/maps/example-west-current/preview.svg"
        ))
        .await
        .expect("request preview");
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let svg = response.text().await.expect("read svg");
        assert!(svg.contains("#9e9eb0"));
        assert!(!svg.contains("#c94c4c"));

        server_handle.abort();
    }
}
