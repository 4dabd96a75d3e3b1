use atlas_shared::geometry::GeoJsonError;
use thiserror::Error;

/// Failure fetching an upstream resource. Message-carrying and cloneable so
/// a memoized outcome can be handed to every caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("upstream returned HTTP {0}")]
    Status(u16),
}

/// Failure resolving a stat table. Cached permanently by `StatCache`; callers
/// surface a degraded state instead of retrying.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("malformed stat table: {0}")]
    Parse(String),
}

/// Failure loading a boundary dataset. Terminal for that load attempt; a
/// fresh map selection is the only retry path.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    GeoJson(#[from] GeoJsonError),
}
