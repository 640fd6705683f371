//! In-memory record of the most recent applied scrape per provider.
//!
//! Dry runs are not recorded; the registry answers "when did real data
//! last land and how did it go". State is process-local and resets on
//! restart, which is fine for an operational peek endpoint.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;

use crate::models::scrape::{ScrapeRunRecord, ScrapeSummary};

#[derive(Clone, Default)]
pub struct ScrapeStatusRegistry {
    inner: Arc<RwLock<BTreeMap<String, ScrapeRunRecord>>>,
}

impl ScrapeStatusRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, summary: ScrapeSummary) {
        let record = ScrapeRunRecord {
            finished_at: Utc::now(),
            summary,
        };
        self.inner.write().insert(record.summary.provider.clone(), record);
    }

    pub fn snapshot(&self) -> BTreeMap<String, ScrapeRunRecord> {
        self.inner.read().clone()
    }
}
