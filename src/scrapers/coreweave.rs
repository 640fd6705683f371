//! CoreWeave GPU pricing scraped from their public pricing page.

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};

use super::gpu_resolver::resolve_slug;
use super::{
    build_client, get_with_retry, price_from_f64, FetchError, FetchReport, GpuPriceQuote,
    ProviderAdapter, ProviderKind, ScraperConfig, SkipReason, SkippedOffer,
};

lazy_static! {
    // "$4.25", "$ 4.25/hr"
    static ref PRICE_REGEX: Regex = Regex::new(r"\$\s*([0-9]+(?:\.[0-9]+)?)").unwrap();

    // Rows that are about GPUs at all; the pricing page also lists CPU
    // and storage rates which are not offers in our sense
    static ref GPU_HINT: Regex = Regex::new(
        r"(?i)\b(h100|h200|gh200|b200|a100|a40|a6000|l4|l40s?|rtx|v100|gpu)\b"
    ).unwrap();
}

/// Specific variants first: token matching stops at the first hit.
const NAME_SLUGS: &[(&str, &str)] = &[
    ("h100 pcie", "h100-pcie"),
    ("hgx h100", "h100-sxm"),
    ("h100 hbm3", "h100-sxm"),
    ("h100 sxm", "h100-sxm"),
    ("a100 pcie", "a100-pcie"),
    ("a100 40gb", "a100-pcie"),
    ("a100 hbm2e", "a100-sxm"),
    ("a100 80gb", "a100-sxm"),
    ("a100 sxm", "a100-sxm"),
    ("rtx a6000", "a6000"),
    ("l40s", "l40s"),
    ("l4", "l4"),
    ("v100", "v100"),
];

pub struct CoreWeaveAdapter {
    client: Client,
    config: ScraperConfig,
}

impl CoreWeaveAdapter {
    pub fn new(config: ScraperConfig) -> Self {
        Self {
            client: build_client(),
            config,
        }
    }
}

#[async_trait]
impl ProviderAdapter for CoreWeaveAdapter {
    fn provider(&self) -> ProviderKind {
        ProviderKind::CoreWeave
    }

    async fn fetch(&self) -> Result<FetchReport, FetchError> {
        let url = self.config.coreweave_pricing_url.clone();
        let response = get_with_retry(|| self.client.get(&url), &self.config).await?;
        let html = response.text().await?;

        let report = parse_pricing_page(&html, &url);
        if report.quotes.is_empty() && report.skipped.is_empty() {
            // A page with no recognizable GPU rows means the layout moved
            return Err(FetchError::MalformedPayload(
                "no GPU pricing rows found in page".to_string(),
            ));
        }
        Ok(report)
    }
}

/// Walk every table row, take the first cell as the product name and the
/// first dollar amount in the row as the hourly rate.
fn parse_pricing_page(html: &str, source_url: &str) -> FetchReport {
    let mut report = FetchReport::default();
    let document = Html::parse_document(html);

    let (Ok(row_selector), Ok(cell_selector)) = (Selector::parse("tr"), Selector::parse("td, th"))
    else {
        return report;
    };

    for row in document.select(&row_selector) {
        let cells: Vec<String> = row
            .select(&cell_selector)
            .map(|cell| {
                cell.text()
                    .collect::<String>()
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect();

        if cells.len() < 2 {
            continue;
        }

        let name = cells[0].clone();
        if name.is_empty() || !GPU_HINT.is_match(&name) {
            continue;
        }

        let price = cells[1..].iter().find_map(|cell| {
            PRICE_REGEX
                .captures(cell)
                .and_then(|cap| cap[1].parse::<f64>().ok())
        });

        let Some(slug) = resolve_slug(NAME_SLUGS, &name) else {
            report.skipped.push(SkippedOffer {
                raw_name: name,
                reason: SkipReason::UnmappedGpu,
            });
            continue;
        };

        match price.and_then(price_from_f64) {
            Some(price_per_hour) => report.quotes.push(GpuPriceQuote {
                gpu_slug: slug.to_string(),
                price_per_hour,
                source_url: Some(source_url.to_string()),
            }),
            None => report.skipped.push(SkippedOffer {
                raw_name: name,
                reason: SkipReason::InvalidPrice,
            }),
        }
    }

    report.quotes = super::cheapest_per_slug(report.quotes);
    report
}
