//! Background job that moves the PXL rate on a fixed interval.

use std::sync::Arc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::main_lib::AppState;
use pxl_core::currency::ServiceStatus;

/// Starts the rate update job. The first update runs one full period after
/// startup.
pub fn start_rate_update_scheduler(state: Arc<AppState>, period: Duration) {
    tokio::spawn(async move {
        info!("PXL rate scheduler started ({}s interval)", period.as_secs());

        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            run_rate_update(&state).await;
        }
    });
}

/// Runs a single rate update. Skipped until the currency data is loaded.
pub async fn run_rate_update(state: &Arc<AppState>) {
    if state.currency_service.status() != ServiceStatus::Ready {
        debug!("Scheduled rate update skipped: currency data not initialized");
        return;
    }

    match state.currency_service.advance_rate().await {
        Ok(data) => info!(
            rate = %data.current_rate,
            trend = data.market_data.trend.as_str(),
            "Scheduled PXL rate update completed"
        ),
        Err(e) => warn!("Scheduled PXL rate update failed: {}", e),
    }
}
