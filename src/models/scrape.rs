//! Scrape trigger request/response models
//!
//! Models for GET /scrape and GET /scrape/status.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Query parameters for the scrape trigger endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScrapeQuery {
    /// Provider slug: aws, coreweave, lambda, vast
    pub provider: Option<String>,
    /// "true"/"1" previews the write set without persisting
    #[serde(rename = "dryRun")]
    pub dry_run: Option<String>,
}

impl ScrapeQuery {
    /// Anything other than an explicit "true"/"1" means a real run.
    pub fn dry_run_enabled(&self) -> bool {
        self.dry_run
            .as_deref()
            .map(|v| {
                let v = v.trim().to_lowercase();
                v == "true" || v == "1"
            })
            .unwrap_or(false)
    }
}

/// Outcome of one scrape run for one provider
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeSummary {
    /// Correlates the response with the run's log lines
    pub run_id: String,
    pub provider: String,
    pub dry_run: bool,
    pub inserted: usize,
    pub updated: usize,
    pub skipped: usize,
    /// Human-readable failures; empty on a clean run
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<DryRunPreview>,
}

impl ScrapeSummary {
    pub fn new(provider: &str, dry_run: bool) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            provider: provider.to_string(),
            dry_run,
            inserted: 0,
            updated: 0,
            skipped: 0,
            errors: Vec::new(),
            preview: None,
        }
    }
}

/// What a dry run would have done, by GPU slug
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DryRunPreview {
    /// GPUs with no stored price yet
    pub added: Vec<String>,
    /// GPUs whose price moved
    pub changed: Vec<String>,
    pub unchanged: usize,
    /// GPUs with stored prices the source no longer lists; informational,
    /// a real run would not touch them
    pub removed_from_source: Vec<String>,
}

/// One finished run as remembered by the status registry
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeRunRecord {
    pub finished_at: DateTime<Utc>,
    #[serde(flatten)]
    pub summary: ScrapeSummary,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeStatusResponse {
    pub providers: BTreeMap<String, ScrapeRunRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dry_run_flag_parsing() {
        let truthy = ["true", "TRUE", " 1 ", "True"];
        for value in truthy {
            let query = ScrapeQuery {
                provider: Some("aws".to_string()),
                dry_run: Some(value.to_string()),
            };
            assert!(query.dry_run_enabled(), "{value:?} should enable dry run");
        }

        let falsy = [Some("false"), Some("0"), Some("yes"), Some(""), None];
        for value in falsy {
            let query = ScrapeQuery {
                provider: Some("aws".to_string()),
                dry_run: value.map(str::to_string),
            };
            assert!(!query.dry_run_enabled(), "{value:?} should not enable dry run");
        }
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let mut summary = ScrapeSummary::new("vast", false);
        summary.inserted = 2;

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["provider"], "vast");
        assert_eq!(json["dryRun"], false);
        assert_eq!(json["inserted"], 2);
        assert!(json["runId"].is_string());
        // no preview on a real run
        assert!(json.get("preview").is_none());
    }

    #[test]
    fn test_preview_serializes_when_present() {
        let mut summary = ScrapeSummary::new("aws", true);
        summary.preview = Some(DryRunPreview {
            added: vec!["l4".to_string()],
            changed: vec![],
            unchanged: 3,
            removed_from_source: vec!["v100".to_string()],
        });

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["preview"]["added"][0], "l4");
        assert_eq!(json["preview"]["unchanged"], 3);
        assert_eq!(json["preview"]["removedFromSource"][0], "v100");
    }
}
