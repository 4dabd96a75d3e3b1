use std::path::PathBuf;

pub const SERVER_PORT: u16 = 3000;

/// Directory holding `maps/*.geojson` plus `data/districts.csv` and
/// `data/states.csv`, laid out the way the static site shipped them.
pub const DEFAULT_DATA_DIR: &str = "public";

pub const DISTRICT_TABLE_FILE: &str = "data/districts.csv";
pub const STATE_TABLE_FILE: &str = "data/states.csv";

pub const PREVIEW_WIDTH: f64 = 800.0;
pub const PREVIEW_HEIGHT: f64 = 600.0;

pub fn server_port() -> u16 {
    std::env::var("ATLAS_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .filter(|port| *port > 0)
        .unwrap_or(SERVER_PORT)
}

pub fn data_dir() -> PathBuf {
    std::env::var("ATLAS_DATA_DIR")
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

/// Base URL to fetch boundary documents and stat tables from instead of the
/// local data directory. Unset means local files.
pub fn upstream_base_url() -> Option<String> {
    std::env::var("ATLAS_UPSTREAM_BASE_URL")
        .ok()
        .map(|value| value.trim().trim_end_matches('/').to_string())
        .filter(|value| !value.is_empty())
}
