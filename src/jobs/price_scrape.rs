//! Scheduled price scrape job
//!
//! Periodically runs every provider's scrape pipeline so stored prices
//! stay fresh without anyone calling /scrape by hand.

use std::env;

use tokio::time::{interval, Duration as TokioDuration};
use tracing::{error, info};

use crate::scrapers::ProviderKind;
use crate::services::scrape_runner;
use crate::AppState;

/// Default scrape interval in seconds (6 hours)
const DEFAULT_SCRAPE_INTERVAL_SECS: u64 = 21600;

/// Environment variable for the scrape interval; 0 disables the job
const ENV_SCRAPE_INTERVAL: &str = "SCRAPE_INTERVAL_SECS";

/// Start the background price scrape job
///
/// Spawns a task that scrapes every provider at the configured
/// interval. The first pass runs immediately on startup.
///
/// # Environment Variables
///
/// * `SCRAPE_INTERVAL_SECS` - Interval in seconds (default: 21600). Set to 0 to disable.
pub async fn start_price_scrape_job(state: AppState) {
    let interval_secs: u64 = env::var(ENV_SCRAPE_INTERVAL)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SCRAPE_INTERVAL_SECS);

    if interval_secs == 0 {
        info!("[price_scrape] SCRAPE_INTERVAL_SECS=0, scheduled scraping disabled");
        return;
    }

    tokio::spawn(async move {
        info!(
            interval_secs,
            providers = ProviderKind::all().len(),
            "[price_scrape] Scheduled price scrape job started"
        );

        let mut interval = interval(TokioDuration::from_secs(interval_secs));

        loop {
            interval.tick().await;
            run_all_providers(&state).await;
        }
    });
}

/// One pass over every provider. Providers fail independently; a broken
/// upstream never blocks the rest of the pass.
async fn run_all_providers(state: &AppState) {
    info!("[price_scrape] Starting scrape pass over all providers");

    for kind in ProviderKind::all() {
        match scrape_runner::run_scrape(
            &state.db,
            &state.catalog,
            &state.scraper_config,
            kind.slug(),
            false,
        )
        .await
        {
            Ok(summary) => {
                info!(
                    provider = kind.slug(),
                    inserted = summary.inserted,
                    updated = summary.updated,
                    skipped = summary.skipped,
                    errors = summary.errors.len(),
                    "[price_scrape] Provider pass complete"
                );
                state.scrape_status.record(summary);
            }
            Err(e) => {
                error!(
                    provider = kind.slug(),
                    error = %e,
                    "[price_scrape] Provider pass failed"
                );
            }
        }
    }

    info!("[price_scrape] Scrape pass complete");
}
