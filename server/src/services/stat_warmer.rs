use tracing::{info, warn};

use crate::state::AppState;

/// Fetch both stat tables once at startup so the first request does not pay
/// for them. A failed fetch is cached by the stat cache and logged here; the
/// server still comes up and previews fall back to neutral fills.
pub async fn warm_cache(state: &AppState) {
    let (districts, states) = tokio::join!(
        state.stat_cache.district_stats(),
        state.stat_cache.state_stats(),
    );

    match districts {
        Ok(rows) => info!(rows = rows.len(), "district stat table warmed"),
        Err(err) => {
            warn!(error = %err, "district stat warm-up failed; previews render uncolored")
        }
    }
    match states {
        Ok(rows) => info!(rows = rows.len(), "state summary table warmed"),
        Err(err) => warn!(error = %err, "state summary warm-up failed; summaries return 502"),
    }
}
