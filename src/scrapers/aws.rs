//! AWS EC2 on-demand GPU pricing via the ec2.shop JSON feed.

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::{
    build_client, get_with_retry, price_from_f64, FetchError, FetchReport, GpuPriceQuote,
    ProviderAdapter, ProviderKind, ScraperConfig, SkipReason, SkippedOffer,
};

#[derive(Debug, Deserialize)]
struct Ec2ShopResponse {
    #[serde(rename = "Prices")]
    prices: Vec<Ec2Offer>,
}

#[derive(Debug, Deserialize)]
struct Ec2Offer {
    #[serde(rename = "InstanceType")]
    instance_type: String,
    /// Hourly on-demand USD cost for the whole instance
    #[serde(rename = "Cost")]
    cost: f64,
}

/// GPU instance families worth tracking: (instance type, catalog slug,
/// GPUs per instance). Anything not listed here is skipped.
const INSTANCE_GPUS: &[(&str, &str, u32)] = &[
    ("p5.48xlarge", "h100-sxm", 8),
    ("p4de.24xlarge", "a100-sxm", 8),
    ("p4d.24xlarge", "a100-sxm", 8),
    ("p3.2xlarge", "v100", 1),
    ("p3.8xlarge", "v100", 4),
    ("p3.16xlarge", "v100", 8),
    ("g5.xlarge", "a10", 1),
    ("g5.12xlarge", "a10", 4),
    ("g5.48xlarge", "a10", 8),
    ("g6.xlarge", "l4", 1),
    ("g6.12xlarge", "l4", 4),
    ("g6e.xlarge", "l40s", 1),
    ("g6e.12xlarge", "l40s", 4),
];

pub struct AwsAdapter {
    client: Client,
    config: ScraperConfig,
}

impl AwsAdapter {
    pub fn new(config: ScraperConfig) -> Self {
        Self {
            client: build_client(),
            config,
        }
    }
}

#[async_trait]
impl ProviderAdapter for AwsAdapter {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Aws
    }

    async fn fetch(&self) -> Result<FetchReport, FetchError> {
        let url = format!("{}/?filter=gpu", self.config.aws_base_url);
        let response = get_with_retry(
            || self.client.get(&url).header("accept", "json"),
            &self.config,
        )
        .await?;
        let payload: Ec2ShopResponse = response.json().await?;

        Ok(normalize(payload, &url))
    }
}

fn normalize(payload: Ec2ShopResponse, source_url: &str) -> FetchReport {
    let mut report = FetchReport::default();

    for offer in payload.prices {
        let Some((_, slug, gpu_count)) = INSTANCE_GPUS
            .iter()
            .find(|(instance, _, _)| *instance == offer.instance_type)
        else {
            report.skipped.push(SkippedOffer {
                raw_name: offer.instance_type,
                reason: SkipReason::UnmappedGpu,
            });
            continue;
        };

        // Instance cost covers all its GPUs; track the per-GPU rate
        let per_gpu = price_from_f64(offer.cost)
            .map(|cost| (cost / Decimal::from(*gpu_count)).round_dp(4));
        match per_gpu {
            Some(price_per_hour) => report.quotes.push(GpuPriceQuote {
                gpu_slug: slug.to_string(),
                price_per_hour,
                source_url: Some(source_url.to_string()),
            }),
            None => report.skipped.push(SkippedOffer {
                raw_name: offer.instance_type,
                reason: SkipReason::InvalidPrice,
            }),
        }
    }

    report.quotes = super::cheapest_per_slug(report.quotes);
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn payload(offers: &[(&str, f64)]) -> Ec2ShopResponse {
        Ec2ShopResponse {
            prices: offers
                .iter()
                .map(|(instance_type, cost)| Ec2Offer {
                    instance_type: instance_type.to_string(),
                    cost: *cost,
                })
                .collect(),
        }
    }

    #[test]
    fn test_normalize_divides_by_gpu_count() {
        let report = normalize(payload(&[("p5.48xlarge", 98.32)]), "https://ec2.shop/?filter=gpu");

        assert_eq!(report.quotes.len(), 1);
        assert_eq!(report.quotes[0].gpu_slug, "h100-sxm");
        assert_eq!(report.quotes[0].price_per_hour, dec!(12.29));
        assert_eq!(
            report.quotes[0].source_url.as_deref(),
            Some("https://ec2.shop/?filter=gpu")
        );
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn test_normalize_skips_unknown_instances() {
        let report = normalize(
            payload(&[("g4dn.xlarge", 0.526), ("p3.2xlarge", 3.06)]),
            "https://ec2.shop/?filter=gpu",
        );

        assert_eq!(report.quotes.len(), 1);
        assert_eq!(report.quotes[0].gpu_slug, "v100");
        assert_eq!(report.quotes[0].price_per_hour, dec!(3.06));
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].raw_name, "g4dn.xlarge");
        assert_eq!(report.skipped[0].reason, SkipReason::UnmappedGpu);
    }

    #[test]
    fn test_normalize_rejects_negative_cost() {
        let report = normalize(payload(&[("g5.xlarge", -1.0)]), "https://ec2.shop/?filter=gpu");

        assert!(report.quotes.is_empty());
        assert_eq!(report.skipped[0].reason, SkipReason::InvalidPrice);
    }

    #[test]
    fn test_normalize_keeps_cheapest_rate_per_model() {
        // both g5 sizes resolve to a10; the smaller one has the worse rate
        let report = normalize(
            payload(&[("g5.xlarge", 1.006), ("g5.48xlarge", 6.5)]),
            "https://ec2.shop/?filter=gpu",
        );

        assert_eq!(report.quotes.len(), 1);
        assert_eq!(report.quotes[0].gpu_slug, "a10");
        assert_eq!(report.quotes[0].price_per_hour, dec!(0.8125));
    }
}
