use std::future::Future;
use std::sync::Arc;

use atlas_shared::stats::{DistrictStat, StateStat, parse_district_table, parse_state_table};
use chrono::{DateTime, Utc};
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::error::{FetchError, StatError};
use crate::http;

/// Where the two stat tables come from. Implementations fetch raw CSV bytes;
/// parsing and caching live in [`StatCache`].
pub trait TableSource: Send + Sync {
    fn district_table(&self) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send;
    fn state_table(&self) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send;
}

struct CachedTable<T> {
    outcome: Result<Arc<[T]>, StatError>,
    fetched_at: DateTime<Utc>,
}

/// Fetch-once cache for the district and state stat tables. Each table is
/// fetched at most once per cache lifetime, failures included: a failed
/// fetch is memoized so a broken upstream is not hammered on every map
/// switch. `reset` is the only way to retry.
pub struct StatCache<S> {
    source: S,
    districts: OnceCell<CachedTable<DistrictStat>>,
    states: OnceCell<CachedTable<StateStat>>,
}

impl<S: TableSource> StatCache<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            districts: OnceCell::new(),
            states: OnceCell::new(),
        }
    }

    /// District-level rows, fetching on first use. Concurrent first calls
    /// share a single fetch.
    pub async fn district_stats(&self) -> Result<Arc<[DistrictStat]>, StatError> {
        let cached = self
            .districts
            .get_or_init(|| async {
                let outcome = load_districts(&self.source).await;
                if let Err(err) = &outcome {
                    warn!(error = %err, "district table load failed; caching the failure");
                }
                CachedTable {
                    outcome,
                    fetched_at: Utc::now(),
                }
            })
            .await;
        cached.outcome.clone()
    }

    /// State-level summary rows, fetching on first use.
    pub async fn state_stats(&self) -> Result<Arc<[StateStat]>, StatError> {
        let cached = self
            .states
            .get_or_init(|| async {
                let outcome = load_states(&self.source).await;
                if let Err(err) = &outcome {
                    warn!(error = %err, "state table load failed; caching the failure");
                }
                CachedTable {
                    outcome,
                    fetched_at: Utc::now(),
                }
            })
            .await;
        cached.outcome.clone()
    }

    /// Drop both memoized tables so the next access refetches.
    pub fn reset(&mut self) {
        self.districts = OnceCell::new();
        self.states = OnceCell::new();
    }

    /// When the district table was last fetched, success or failure.
    pub fn district_fetched_at(&self) -> Option<DateTime<Utc>> {
        self.districts.get().map(|cached| cached.fetched_at)
    }

    pub fn state_fetched_at(&self) -> Option<DateTime<Utc>> {
        self.states.get().map(|cached| cached.fetched_at)
    }
}

async fn load_districts<S: TableSource>(source: &S) -> Result<Arc<[DistrictStat]>, StatError> {
    let bytes = source.district_table().await?;
    let rows = parse_district_table(&bytes).map_err(|e| StatError::Parse(e.to_string()))?;
    info!(rows = rows.len(), "district stat table loaded");
    Ok(Arc::from(rows))
}

async fn load_states<S: TableSource>(source: &S) -> Result<Arc<[StateStat]>, StatError> {
    let bytes = source.state_table().await?;
    let rows = parse_state_table(&bytes).map_err(|e| StatError::Parse(e.to_string()))?;
    info!(rows = rows.len(), "state stat table loaded");
    Ok(Arc::from(rows))
}

/// Stat tables served over HTTP as two CSV documents.
pub struct HttpTableSource {
    client: reqwest::Client,
    district_url: String,
    state_url: String,
}

impl HttpTableSource {
    pub fn new(
        client: reqwest::Client,
        district_url: impl Into<String>,
        state_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            district_url: district_url.into(),
            state_url: state_url.into(),
        }
    }
}

impl TableSource for HttpTableSource {
    fn district_table(&self) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send {
        http::fetch_bytes(&self.client, &self.district_url)
    }

    fn state_table(&self) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send {
        http::fetch_bytes(&self.client, &self.state_url)
    }
}
