use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use dashmap::DashMap;

use atlas_engine::{HttpBoundarySource, HttpTableSource, StatCache, build_http_client};

use crate::config::{DISTRICT_TABLE_FILE, STATE_TABLE_FILE};
use crate::sources::{DirBoundarySource, DirTableSource, ServerBoundarySource, ServerTableSource};

#[derive(Clone)]
pub struct AppState {
    pub data_dir: PathBuf,
    pub stat_cache: Arc<StatCache<ServerTableSource>>,
    pub boundary_source: Arc<ServerBoundarySource>,
    /// Rendered preview SVGs keyed by map id. Boundaries are static files and
    /// stat tables are fetched once, so an entry never goes stale in-process.
    pub preview_cache: Arc<DashMap<String, Arc<Bytes>>>,
    pub observability: Arc<ObservabilityCounters>,
}

#[derive(Debug, Default)]
pub struct ObservabilityCounters {
    catalog_requests_total: AtomicU64,
    summary_requests_total: AtomicU64,
    preview_requests_total: AtomicU64,
    preview_renders_total: AtomicU64,
    preview_failures_total: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ObservabilitySnapshot {
    pub catalog_requests_total: u64,
    pub summary_requests_total: u64,
    pub preview_requests_total: u64,
    pub preview_renders_total: u64,
    pub preview_failures_total: u64,
}

impl ObservabilityCounters {
    pub fn snapshot(&self) -> ObservabilitySnapshot {
        ObservabilitySnapshot {
            catalog_requests_total: self.catalog_requests_total.load(Ordering::Relaxed),
            summary_requests_total: self.summary_requests_total.load(Ordering::Relaxed),
            preview_requests_total: self.preview_requests_total.load(Ordering::Relaxed),
            preview_renders_total: self.preview_renders_total.load(Ordering::Relaxed),
            preview_failures_total: self.preview_failures_total.load(Ordering::Relaxed),
        }
    }

    pub fn record_catalog_request(&self) {
        self.catalog_requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_summary_request(&self) {
        self.summary_requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_preview_request(&self) {
        self.preview_requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_preview_render(&self) {
        self.preview_renders_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_preview_failure(&self) {
        self.preview_failures_total.fetch_add(1, Ordering::Relaxed);
    }
}

impl AppState {
    pub fn new(data_dir: PathBuf, upstream_base_url: Option<String>) -> Self {
        let (table_source, boundary_source) = match upstream_base_url {
            Some(base) => {
                let client = build_http_client();
                let tables = HttpTableSource::new(
                    client.clone(),
                    format!("{base}/{DISTRICT_TABLE_FILE}"),
                    format!("{base}/{STATE_TABLE_FILE}"),
                );
                (
                    ServerTableSource::Upstream(tables),
                    ServerBoundarySource::Upstream(HttpBoundarySource::new(client, base)),
                )
            }
            None => (
                ServerTableSource::Dir(DirTableSource::new(data_dir.clone())),
                ServerBoundarySource::Dir(DirBoundarySource::new(data_dir.clone())),
            ),
        };

        Self {
            data_dir,
            stat_cache: Arc::new(StatCache::new(table_source)),
            boundary_source: Arc::new(boundary_source),
            preview_cache: Arc::new(DashMap::new()),
            observability: Arc::new(ObservabilityCounters::default()),
        }
    }
}
