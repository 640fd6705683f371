//! Vast.ai marketplace offers via their public bundles search API.
//!
//! Vast is an open marketplace, so one GPU model shows up in dozens of
//! offers at different prices. The adapter reduces that to the cheapest
//! verified on-demand rate per model.

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::gpu_resolver::resolve_slug;
use super::{
    build_client, cheapest_per_slug, get_with_retry, price_from_f64, FetchError, FetchReport,
    GpuPriceQuote, ProviderAdapter, ProviderKind, ScraperConfig, SkipReason, SkippedOffer,
};

#[derive(Debug, Deserialize)]
struct VastResponse {
    offers: Vec<VastOffer>,
}

#[derive(Debug, Deserialize)]
struct VastOffer {
    gpu_name: String,
    num_gpus: Option<u32>,
    /// Dollars per hour for the whole offer (all GPUs)
    dph_total: Option<f64>,
}

const NAME_SLUGS: &[(&str, &str)] = &[
    ("h100 sxm", "h100-sxm"),
    ("h100 pcie", "h100-pcie"),
    ("a100 sxm4", "a100-sxm"),
    ("a100 sxm", "a100-sxm"),
    ("a100 pcie", "a100-pcie"),
    ("rtx a6000", "a6000"),
    ("rtx 4090", "rtx-4090"),
    ("rtx 3090", "rtx-3090"),
    ("l40s", "l40s"),
    ("l4", "l4"),
    ("v100", "v100"),
    ("a10", "a10"),
];

pub struct VastAdapter {
    client: Client,
    config: ScraperConfig,
}

impl VastAdapter {
    pub fn new(config: ScraperConfig) -> Self {
        Self {
            client: build_client(),
            config,
        }
    }
}

#[async_trait]
impl ProviderAdapter for VastAdapter {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Vast
    }

    async fn fetch(&self) -> Result<FetchReport, FetchError> {
        let url = format!("{}/bundles/", self.config.vast_base_url);
        let query = serde_json::json!({
            "verified": { "eq": true },
            "rentable": { "eq": true },
            "external": { "eq": false },
            "type": "on-demand",
        })
        .to_string();

        let response = get_with_retry(
            || {
                let mut request = self.client.get(&url).query(&[("q", query.as_str())]);
                if !self.config.vast_api_key.is_empty() {
                    request = request.bearer_auth(&self.config.vast_api_key);
                }
                request
            },
            &self.config,
        )
        .await?;
        let payload: VastResponse = response.json().await?;

        Ok(normalize(payload, &url))
    }
}

fn normalize(payload: VastResponse, source_url: &str) -> FetchReport {
    let mut report = FetchReport::default();

    for offer in payload.offers {
        let Some(slug) = resolve_slug(NAME_SLUGS, &offer.gpu_name) else {
            report.skipped.push(SkippedOffer {
                raw_name: offer.gpu_name,
                reason: SkipReason::UnmappedGpu,
            });
            continue;
        };

        let gpu_count = offer.num_gpus.unwrap_or(1).max(1);
        let per_gpu = offer
            .dph_total
            .and_then(price_from_f64)
            .map(|total| (total / Decimal::from(gpu_count)).round_dp(4));

        match per_gpu {
            Some(price_per_hour) => report.quotes.push(GpuPriceQuote {
                gpu_slug: slug.to_string(),
                price_per_hour,
                source_url: Some(source_url.to_string()),
            }),
            None => report.skipped.push(SkippedOffer {
                raw_name: offer.gpu_name,
                reason: SkipReason::InvalidPrice,
            }),
        }
    }

    report.quotes = cheapest_per_slug(report.quotes);
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn offer(name: &str, num_gpus: u32, dph: f64) -> VastOffer {
        VastOffer {
            gpu_name: name.to_string(),
            num_gpus: Some(num_gpus),
            dph_total: Some(dph),
        }
    }

    #[test]
    fn test_normalize_picks_cheapest_offer_per_model() {
        let payload = VastResponse {
            offers: vec![
                offer("RTX 4090", 1, 0.42),
                offer("RTX 4090", 4, 1.24),
                offer("RTX 4090", 2, 0.99),
            ],
        };

        let report = normalize(payload, "https://console.vast.ai/api/v0/bundles/");
        assert_eq!(report.quotes.len(), 1);
        // 1.24 / 4 GPUs beats the single-GPU listings
        assert_eq!(report.quotes[0].price_per_hour, dec!(0.31));
    }

    #[test]
    fn test_normalize_divides_by_gpu_count() {
        let payload = VastResponse {
            offers: vec![offer("H100 SXM", 8, 17.92)],
        };

        let report = normalize(payload, "https://console.vast.ai/api/v0/bundles/");
        assert_eq!(report.quotes[0].gpu_slug, "h100-sxm");
        assert_eq!(report.quotes[0].price_per_hour, dec!(2.24));
    }

    #[test]
    fn test_normalize_skips_exotic_models() {
        let payload = VastResponse {
            offers: vec![offer("H100 NVL", 1, 2.8), offer("Tesla V100", 1, 0.19)],
        };

        let report = normalize(payload, "https://console.vast.ai/api/v0/bundles/");
        assert_eq!(report.quotes.len(), 1);
        assert_eq!(report.quotes[0].gpu_slug, "v100");
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].raw_name, "H100 NVL");
        assert_eq!(report.skipped[0].reason, SkipReason::UnmappedGpu);
    }

    #[test]
    fn test_normalize_handles_missing_price() {
        let payload = VastResponse {
            offers: vec![VastOffer {
                gpu_name: "RTX 3090".to_string(),
                num_gpus: None,
                dph_total: None,
            }],
        };

        let report = normalize(payload, "https://console.vast.ai/api/v0/bundles/");
        assert!(report.quotes.is_empty());
        assert_eq!(report.skipped[0].reason, SkipReason::InvalidPrice);
    }
}
