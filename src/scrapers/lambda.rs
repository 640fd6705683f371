//! Lambda Labs public cloud pricing via their instance-types API.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::{
    build_client, get_with_retry, FetchError, FetchReport, GpuPriceQuote, ProviderAdapter,
    ProviderKind, ScraperConfig, SkipReason, SkippedOffer,
};

#[derive(Debug, Deserialize)]
struct LambdaResponse {
    data: HashMap<String, LambdaEntry>,
}

#[derive(Debug, Deserialize)]
struct LambdaEntry {
    instance_type: LambdaInstanceType,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct LambdaInstanceType {
    name: String,
    description: Option<String>,
    /// Whole-instance price in US cents per hour
    price_cents_per_hour: i64,
    specs: LambdaSpecs,
}

#[derive(Debug, Deserialize)]
struct LambdaSpecs {
    gpus: u32,
}

/// Lambda instance names are a fixed enumeration, so exact mapping works
const INSTANCE_SLUGS: &[(&str, &str)] = &[
    ("gpu_1x_h100_pcie", "h100-pcie"),
    ("gpu_1x_h100_sxm5", "h100-sxm"),
    ("gpu_8x_h100_sxm5", "h100-sxm"),
    ("gpu_1x_a100_sxm4", "a100-sxm"),
    ("gpu_8x_a100_80gb_sxm4", "a100-sxm"),
    ("gpu_1x_a100", "a100-pcie"),
    ("gpu_8x_a100", "a100-pcie"),
    ("gpu_1x_a10", "a10"),
    ("gpu_1x_a6000", "a6000"),
    ("gpu_2x_a6000", "a6000"),
    ("gpu_4x_a6000", "a6000"),
    ("gpu_8x_v100", "v100"),
];

pub struct LambdaAdapter {
    client: Client,
    config: ScraperConfig,
}

impl LambdaAdapter {
    pub fn new(config: ScraperConfig) -> Self {
        Self {
            client: build_client(),
            config,
        }
    }
}

#[async_trait]
impl ProviderAdapter for LambdaAdapter {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Lambda
    }

    async fn fetch(&self) -> Result<FetchReport, FetchError> {
        let url = format!("{}/instance-types", self.config.lambda_base_url);
        let response = get_with_retry(
            || {
                let mut request = self.client.get(&url);
                if !self.config.lambda_api_key.is_empty() {
                    request = request.bearer_auth(&self.config.lambda_api_key);
                }
                request
            },
            &self.config,
        )
        .await?;
        let payload: LambdaResponse = response.json().await?;

        Ok(normalize(payload, &url))
    }
}

fn normalize(payload: LambdaResponse, source_url: &str) -> FetchReport {
    let mut report = FetchReport::default();

    for (name, entry) in payload.data {
        let Some((_, slug)) = INSTANCE_SLUGS.iter().find(|(instance, _)| *instance == name)
        else {
            report.skipped.push(SkippedOffer {
                raw_name: name,
                reason: SkipReason::UnmappedGpu,
            });
            continue;
        };

        let info = entry.instance_type;
        if info.price_cents_per_hour < 0 || info.specs.gpus == 0 {
            report.skipped.push(SkippedOffer {
                raw_name: name,
                reason: SkipReason::InvalidPrice,
            });
            continue;
        }

        // Cents keep the division exact until the final rounding
        let per_gpu = (Decimal::from(info.price_cents_per_hour)
            / Decimal::from(100)
            / Decimal::from(info.specs.gpus))
        .round_dp(4);

        report.quotes.push(GpuPriceQuote {
            gpu_slug: slug.to_string(),
            price_per_hour: per_gpu,
            source_url: Some(source_url.to_string()),
        });
    }

    report.quotes = super::cheapest_per_slug(report.quotes);
    report
}
