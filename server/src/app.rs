use axum::{
    Router,
    extract::Request,
    http::{HeaderValue, header},
    middleware::{self, Next},
    response::Response,
};
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;

use crate::routes;
use crate::state::AppState;

pub(crate) fn build_app(state: AppState) -> Router {
    let file_service = ServeDir::new(state.data_dir.clone())
        .precompressed_br()
        .precompressed_gzip();
    let data_files = Router::new()
        .fallback_service(file_service)
        .layer(middleware::from_fn(set_data_cache_control));

    Router::new()
        .route("/api/catalog", axum::routing::get(routes::api::get_catalog))
        .route(
            "/api/catalog/{id}",
            axum::routing::get(routes::api::get_map),
        )
        .route(
            "/api/states/{state}/summary",
            axum::routing::get(routes::api::get_state_summary),
        )
        .route(
            "/api/maps/{id}/preview.svg",
            axum::routing::get(routes::preview::get_preview),
        )
        .route("/api/health", axum::routing::get(routes::api::health))
        .route("/api/metrics", axum::routing::get(routes::api::metrics))
        .layer(CompressionLayer::new())
        .fallback_service(data_files)
        .with_state(state)
}

async fn set_data_cache_control(request: Request, next: Next) -> Response {
    let cache_control = cache_control_for_path(request.uri().path());
    let mut response = next.run(request).await;

    if let Some(value) = cache_control
        && response.status().is_success()
    {
        response.headers_mut().insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static(value),
        );
    }

    response
}

fn cache_control_for_path(path: &str) -> Option<&'static str> {
    if path.starts_with("/maps/") || path.starts_with("/data/") {
        return Some("public, max-age=86400");
    }

    None
}
