pub mod aws;
pub mod coreweave;
pub mod gpu_resolver;
pub mod lambda;
pub mod vast;

use std::collections::HashMap;
use std::env;
use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

/// The providers the pipeline knows how to scrape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Aws,
    CoreWeave,
    Lambda,
    Vast,
}

impl ProviderKind {
    pub fn all() -> [ProviderKind; 4] {
        [
            ProviderKind::Aws,
            ProviderKind::CoreWeave,
            ProviderKind::Lambda,
            ProviderKind::Vast,
        ]
    }

    pub fn from_slug(slug: &str) -> Option<ProviderKind> {
        match slug {
            "aws" => Some(ProviderKind::Aws),
            "coreweave" => Some(ProviderKind::CoreWeave),
            "lambda" => Some(ProviderKind::Lambda),
            "vast" => Some(ProviderKind::Vast),
            _ => None,
        }
    }

    /// Slug matching the seeded providers table.
    pub fn slug(&self) -> &'static str {
        match self {
            ProviderKind::Aws => "aws",
            ProviderKind::CoreWeave => "coreweave",
            ProviderKind::Lambda => "lambda",
            ProviderKind::Vast => "vast",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::Aws => "Amazon Web Services",
            ProviderKind::CoreWeave => "CoreWeave",
            ProviderKind::Lambda => "Lambda Labs",
            ProviderKind::Vast => "Vast.ai",
        }
    }
}

/// One normalized per-GPU hourly price extracted from a provider source.
#[derive(Debug, Clone, PartialEq)]
pub struct GpuPriceQuote {
    pub gpu_slug: String,
    pub price_per_hour: Decimal,
    pub source_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The provider's GPU name has no canonical mapping
    UnmappedGpu,
    /// Price missing, negative or not a number
    InvalidPrice,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnmappedGpu => write!(f, "unmapped gpu"),
            SkipReason::InvalidPrice => write!(f, "invalid price"),
        }
    }
}

/// An offer the adapter saw but could not turn into a usable quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedOffer {
    pub raw_name: String,
    pub reason: SkipReason,
}

/// What a single provider fetch produced: usable quotes plus everything
/// that was dropped during normalization.
#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    pub quotes: Vec<GpuPriceQuote>,
    pub skipped: Vec<SkippedOffer>,
}

#[derive(Debug)]
pub enum FetchError {
    /// Connection, TLS or timeout failure talking to the provider
    Transport(reqwest::Error),
    /// The provider answered with a non-success status
    UpstreamStatus(reqwest::StatusCode),
    /// The body came back but could not be parsed into offers
    MalformedPayload(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Transport(e) => write!(f, "network error: {}", e),
            FetchError::UpstreamStatus(status) => write!(f, "upstream returned HTTP {}", status),
            FetchError::MalformedPayload(msg) => write!(f, "malformed payload: {}", msg),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Transport(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::MalformedPayload(err.to_string())
        } else {
            FetchError::Transport(err)
        }
    }
}

/// A provider-specific scraper. Implementations fetch the provider's
/// source, normalize GPU names onto catalog slugs and reduce prices to
/// per-GPU hourly USD rates.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    fn provider(&self) -> ProviderKind;

    async fn fetch(&self) -> Result<FetchReport, FetchError>;
}

#[derive(Clone)]
pub struct ScraperConfig {
    pub retry_max: u32,
    pub retry_delay_ms: u64,
    pub aws_base_url: String,
    pub coreweave_pricing_url: String,
    pub lambda_base_url: String,
    pub lambda_api_key: String,
    pub vast_base_url: String,
    pub vast_api_key: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            retry_max: 3,
            retry_delay_ms: 1000,
            aws_base_url: "https://ec2.shop".to_string(),
            coreweave_pricing_url: "https://www.coreweave.com/pricing".to_string(),
            lambda_base_url: "https://cloud.lambdalabs.com/api/v1".to_string(),
            lambda_api_key: String::new(),
            vast_base_url: "https://console.vast.ai/api/v0".to_string(),
            vast_api_key: String::new(),
        }
    }
}

impl ScraperConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            retry_max: env::var("SCRAPE_RETRY_MAX")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.retry_max),
            retry_delay_ms: env::var("SCRAPE_RETRY_DELAY_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.retry_delay_ms),
            aws_base_url: env::var("AWS_PRICING_BASE_URL").unwrap_or(defaults.aws_base_url),
            coreweave_pricing_url: env::var("COREWEAVE_PRICING_URL")
                .unwrap_or(defaults.coreweave_pricing_url),
            lambda_base_url: env::var("LAMBDA_API_BASE_URL").unwrap_or(defaults.lambda_base_url),
            lambda_api_key: env::var("LAMBDA_API_KEY").unwrap_or_default(),
            vast_base_url: env::var("VAST_API_BASE_URL").unwrap_or(defaults.vast_base_url),
            vast_api_key: env::var("VAST_API_KEY").unwrap_or_default(),
        }
    }
}

pub fn build_adapter(kind: ProviderKind, config: &ScraperConfig) -> Box<dyn ProviderAdapter> {
    match kind {
        ProviderKind::Aws => Box::new(aws::AwsAdapter::new(config.clone())),
        ProviderKind::CoreWeave => Box::new(coreweave::CoreWeaveAdapter::new(config.clone())),
        ProviderKind::Lambda => Box::new(lambda::LambdaAdapter::new(config.clone())),
        ProviderKind::Vast => Box::new(vast::VastAdapter::new(config.clone())),
    }
}

pub(crate) fn build_client() -> Client {
    Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .gzip(true)
        .deflate(true)
        .brotli(true)
        .build()
        .unwrap()
}

/// GET with exponential backoff. Network failures and 5xx/429 answers are
/// retried up to `retry_max` attempts; any other error status fails fast.
pub(crate) async fn get_with_retry(
    build_request: impl Fn() -> reqwest::RequestBuilder,
    config: &ScraperConfig,
) -> Result<reqwest::Response, FetchError> {
    let mut delay = tokio::time::Duration::from_millis(config.retry_delay_ms);
    let mut last_error: Option<FetchError> = None;

    for attempt in 0..config.retry_max {
        match build_request().send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    return Ok(response);
                }
                if !(status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS) {
                    return Err(FetchError::UpstreamStatus(status));
                }
                last_error = Some(FetchError::UpstreamStatus(status));
            }
            Err(e) => {
                last_error = Some(FetchError::Transport(e));
            }
        }

        if attempt < config.retry_max - 1 {
            tracing::warn!(
                "Retry {}/{} for provider fetch. Waiting {:?}",
                attempt + 1,
                config.retry_max,
                delay
            );
            tokio::time::sleep(delay).await;
            delay *= 2;
        }
    }

    Err(last_error.unwrap_or(FetchError::MalformedPayload("no attempts made".to_string())))
}

/// Convert a raw float price into the stored Decimal form. Returns None
/// for NaN, infinite or negative values.
pub(crate) fn price_from_f64(value: f64) -> Option<Decimal> {
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    Decimal::from_f64(value).map(|d| d.round_dp(4))
}

/// Keep only the cheapest quote per GPU slug. Marketplace-style sources
/// return many offers for the same card; the tracked number is the best
/// available rate.
pub(crate) fn cheapest_per_slug(quotes: Vec<GpuPriceQuote>) -> Vec<GpuPriceQuote> {
    let mut best: HashMap<String, GpuPriceQuote> = HashMap::new();
    for quote in quotes {
        match best.get(&quote.gpu_slug) {
            Some(current) if current.price_per_hour <= quote.price_per_hour => {}
            _ => {
                best.insert(quote.gpu_slug.clone(), quote);
            }
        }
    }

    let mut deduped: Vec<GpuPriceQuote> = best.into_values().collect();
    deduped.sort_by(|a, b| a.gpu_slug.cmp(&b.gpu_slug));
    deduped
}
