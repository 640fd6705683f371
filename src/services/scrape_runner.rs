//! Scrape orchestration.
//!
//! One run covers one provider: dispatch to its adapter, resolve the
//! normalized quotes against the reference catalog, then either persist
//! the batch or, in dry-run mode, diff it against what is stored.
//! Upstream failures land in the summary's error list rather than
//! aborting the run; only caller mistakes and storage-level breakage
//! surface as errors.

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use tracing::{debug, error, info, warn};

use crate::models::scrape::{DryRunPreview, ScrapeSummary};
use crate::scrapers::{
    build_adapter, GpuPriceQuote, ProviderAdapter, ProviderKind, ScraperConfig,
};
use crate::services::catalog::CatalogCache;
use crate::services::price_repository::{self, ResolvedPrice, UpsertOutcome};

#[derive(Debug)]
pub enum ScrapeError {
    /// Caller named a provider the pipeline does not know
    InvalidProvider(String),
    /// Catalog or storage failure that prevented the run entirely
    Internal(String),
}

impl std::fmt::Display for ScrapeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScrapeError::InvalidProvider(slug) => write!(f, "unknown provider '{}'", slug),
            ScrapeError::Internal(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ScrapeError {}

pub async fn run_scrape(
    db: &DatabaseConnection,
    catalog: &CatalogCache,
    config: &ScraperConfig,
    provider_slug: &str,
    dry_run: bool,
) -> Result<ScrapeSummary, ScrapeError> {
    let Some(kind) = ProviderKind::from_slug(provider_slug) else {
        return Err(ScrapeError::InvalidProvider(provider_slug.to_string()));
    };

    let adapter = build_adapter(kind, config);
    run_with_adapter(db, catalog, adapter.as_ref(), dry_run).await
}

/// Run one scrape against an already-built adapter. Split out from
/// [`run_scrape`] so tests can drive the pipeline with a canned adapter.
pub async fn run_with_adapter(
    db: &DatabaseConnection,
    catalog_cache: &CatalogCache,
    adapter: &dyn ProviderAdapter,
    dry_run: bool,
) -> Result<ScrapeSummary, ScrapeError> {
    let kind = adapter.provider();
    let mut summary = ScrapeSummary::new(kind.slug(), dry_run);
    info!(
        run_id = %summary.run_id,
        provider = kind.slug(),
        dry_run,
        "scrape started"
    );

    let catalog = catalog_cache
        .get(db)
        .await
        .map_err(|e| ScrapeError::Internal(format!("reference catalog unavailable: {}", e)))?;
    let provider_id = catalog.provider_id(kind.slug()).ok_or_else(|| {
        ScrapeError::Internal(format!(
            "provider '{}' missing from reference data",
            kind.slug()
        ))
    })?;

    let report = match adapter.fetch().await {
        Ok(report) => report,
        Err(e) => {
            error!(
                run_id = %summary.run_id,
                provider = kind.slug(),
                error = %e,
                "provider fetch failed"
            );
            summary
                .errors
                .push(format!("{}: {}", kind.display_name(), e));
            return Ok(summary);
        }
    };

    summary.skipped += report.skipped.len();
    for offer in &report.skipped {
        debug!(
            provider = kind.slug(),
            raw_name = %offer.raw_name,
            reason = %offer.reason,
            "offer dropped during normalization"
        );
    }

    // Quotes whose slug is missing from gpu_models count as skipped too;
    // the adapter tables and the seed migration normally agree, so any
    // hit here means they drifted apart
    let mut resolved: Vec<(i32, GpuPriceQuote)> = Vec::new();
    for quote in report.quotes {
        match catalog.gpu_id(&quote.gpu_slug) {
            Some(gpu_model_id) => resolved.push((gpu_model_id, quote)),
            None => {
                warn!(
                    provider = kind.slug(),
                    slug = %quote.gpu_slug,
                    "quote references a slug missing from gpu_models"
                );
                summary.skipped += 1;
            }
        }
    }

    if dry_run {
        let rows = price_repository::current_prices_for_provider(db, provider_id)
            .await
            .map_err(|e| ScrapeError::Internal(format!("failed to load current prices: {}", e)))?;
        let current: HashMap<String, Decimal> = rows
            .iter()
            .filter_map(|row| {
                catalog
                    .gpu_by_id(row.gpu_model_id)
                    .map(|gpu| (gpu.slug.clone(), row.price_per_hour))
            })
            .collect();

        let preview = diff_preview(&current, &resolved);
        summary.inserted = preview.added.len();
        summary.updated = preview.changed.len();
        summary.skipped += preview.unchanged;
        info!(
            run_id = %summary.run_id,
            provider = kind.slug(),
            added = preview.added.len(),
            changed = preview.changed.len(),
            unchanged = preview.unchanged,
            "dry run complete, nothing written"
        );
        summary.preview = Some(preview);
    } else {
        let records: Vec<ResolvedPrice> = resolved
            .iter()
            .map(|(gpu_model_id, quote)| ResolvedPrice {
                gpu_model_id: *gpu_model_id,
                price_per_hour: quote.price_per_hour,
                source_url: quote.source_url.clone(),
            })
            .collect();

        match price_repository::upsert_prices(db, provider_id, &records).await {
            Ok(stats) => {
                summary.inserted += stats.inserted;
                summary.updated += stats.updated;
                summary.skipped += stats.skipped;
            }
            Err(aborted) => {
                error!(
                    run_id = %summary.run_id,
                    provider = kind.slug(),
                    error = %aborted.source,
                    "persistence aborted mid-batch"
                );
                summary.inserted += aborted.partial.inserted;
                summary.updated += aborted.partial.updated;
                summary.skipped += aborted.partial.skipped;
                summary.errors.push(format!(
                    "storage failed with {} of {} records unwritten",
                    aborted.remaining,
                    records.len()
                ));
            }
        }
        info!(
            run_id = %summary.run_id,
            provider = kind.slug(),
            inserted = summary.inserted,
            updated = summary.updated,
            skipped = summary.skipped,
            "scrape complete"
        );
    }

    Ok(summary)
}

/// Compare incoming quotes against the stored per-GPU prices. Uses the
/// same classification as the real write path, so the preview counts are
/// exactly what a non-dry run would report.
fn diff_preview(
    current: &HashMap<String, Decimal>,
    incoming: &[(i32, GpuPriceQuote)],
) -> DryRunPreview {
    let mut added = Vec::new();
    let mut changed = Vec::new();
    let mut unchanged = 0;

    for (_, quote) in incoming {
        match price_repository::classify(current.get(&quote.gpu_slug), &quote.price_per_hour) {
            UpsertOutcome::Inserted => added.push(quote.gpu_slug.clone()),
            UpsertOutcome::Updated => changed.push(quote.gpu_slug.clone()),
            UpsertOutcome::Skipped => unchanged += 1,
        }
    }

    let seen: HashSet<&str> = incoming.iter().map(|(_, q)| q.gpu_slug.as_str()).collect();
    let mut removed_from_source: Vec<String> = current
        .keys()
        .filter(|slug| !seen.contains(slug.as_str()))
        .cloned()
        .collect();

    added.sort();
    changed.sort();
    removed_from_source.sort();

    DryRunPreview {
        added,
        changed,
        unchanged,
        removed_from_source,
    }
}
