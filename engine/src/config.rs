use std::time::Duration;

use atlas_shared::geometry::Bounds;

/// Continental-US frame used before the first dataset arrives.
pub const INITIAL_BOUNDS: Bounds = Bounds {
    west: -125.0,
    south: 24.0,
    east: -66.5,
    north: 50.0,
};

pub const DEFAULT_UPSTREAM_HTTP_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECS: u64 = 3;

pub fn upstream_http_timeout() -> Duration {
    std::env::var("UPSTREAM_HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(DEFAULT_UPSTREAM_HTTP_TIMEOUT_SECS))
}

pub fn upstream_connect_timeout() -> Duration {
    std::env::var("UPSTREAM_CONNECT_TIMEOUT_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECS))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{DEFAULT_UPSTREAM_HTTP_TIMEOUT_SECS, upstream_http_timeout};

    #[test]
    fn timeout_falls_back_to_default_when_unset_or_invalid() {
        temp_env::with_var("UPSTREAM_HTTP_TIMEOUT_SECS", None::<&str>, || {
            assert_eq!(
                upstream_http_timeout(),
                Duration::from_secs(DEFAULT_UPSTREAM_HTTP_TIMEOUT_SECS)
            );
        });
        temp_env::with_var("UPSTREAM_HTTP_TIMEOUT_SECS", Some("zero"), || {
            assert_eq!(
                upstream_http_timeout(),
                Duration::from_secs(DEFAULT_UPSTREAM_HTTP_TIMEOUT_SECS)
            );
        });
        temp_env::with_var("UPSTREAM_HTTP_TIMEOUT_SECS", Some("0"), || {
            assert_eq!(
                upstream_http_timeout(),
                Duration::from_secs(DEFAULT_UPSTREAM_HTTP_TIMEOUT_SECS)
            );
        });
    }

    #[test]
    fn timeout_honors_valid_override() {
        temp_env::with_var("UPSTREAM_HTTP_TIMEOUT_SECS", Some("25"), || {
            assert_eq!(upstream_http_timeout(), Duration::from_secs(25));
        });
    }
}
