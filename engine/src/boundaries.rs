use std::future::Future;

use atlas_shared::geometry::{BoundaryCollection, parse_feature_collection};
use tracing::warn;

use crate::error::{FetchError, LoadError};
use crate::http;

/// Where boundary GeoJSON documents come from, addressed by the catalog's
/// `boundary_path`.
pub trait BoundarySource: Send + Sync {
    fn fetch(&self, path: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// Boundary datasets served over HTTP under a common base URL.
pub struct HttpBoundarySource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBoundarySource {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn resolve(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl BoundarySource for HttpBoundarySource {
    fn fetch(&self, path: &str) -> impl Future<Output = Result<String, FetchError>> + Send {
        let url = self.resolve(path);
        async move { http::fetch_text(&self.client, &url).await }
    }
}

/// Fetch and parse one boundary dataset. Unsupported geometry kinds are kept
/// in the collection but logged, the caller sees how degraded a dataset is
/// without the load failing.
pub async fn load_boundaries<B: BoundarySource>(
    source: &B,
    path: &str,
) -> Result<BoundaryCollection, LoadError> {
    let body = source.fetch(path).await?;
    let collection = parse_feature_collection(&body)?;
    if collection.unsupported_count() > 0 {
        warn!(
            path,
            unsupported = collection.unsupported_count(),
            total = collection.len(),
            "boundary dataset contains unsupported geometry kinds"
        );
    }
    Ok(collection)
}
