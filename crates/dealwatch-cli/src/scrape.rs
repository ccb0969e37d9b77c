//! `scrape` command: one foreground job, summary on stdout, JSON on disk.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dealwatch_core::{AppConfig, DealRecord, JobPhase, JobStatus};
use dealwatch_pipeline::{DealStore, JobRequest, Orchestrator};
use dealwatch_scraper::{FetchPolicy, PageFetcher};

/// Runs a scrape job to completion and writes the valid deals to `output`.
/// `listing_only` skips product pages even when the config enables them.
///
/// # Errors
///
/// Returns an error if the target is invalid, the job fails, or the output
/// file cannot be written.
pub(crate) async fn run_scrape(
    config: &AppConfig,
    url: &str,
    platform: Option<&str>,
    max_deals: Option<u32>,
    output: Option<&Path>,
    listing_only: bool,
) -> anyhow::Result<()> {
    let request = JobRequest::resolve(url, platform, max_deals)?;
    let platform = request.platform;

    let fetcher = PageFetcher::new(FetchPolicy::from_config(config))?;
    let orchestrator = Orchestrator::new(fetcher, Arc::new(DealStore::new()))
        .with_detail_pages(config.scraper_detail_pages && !listing_only);

    println!("Scraping {platform} deals from {url} ...");
    let status = orchestrator.run(request).await?;
    if status.phase == JobPhase::Failed {
        anyhow::bail!(
            "scrape failed: {}",
            status.last_error.as_deref().unwrap_or("unknown error")
        );
    }

    let deals = orchestrator.store().read(platform);
    print!("{}", format_summary(&status, &deals));

    let path = output.map_or_else(
        || PathBuf::from(format!("{platform}_deals.json")),
        Path::to_path_buf,
    );
    let json = serde_json::to_string_pretty(&*deals)?;
    std::fs::write(&path, json)
        .map_err(|e| anyhow::anyhow!("failed to write {}: {e}", path.display()))?;
    tracing::info!(%platform, path = %path.display(), count = deals.len(), "deals saved");
    println!("Saved {} deals to {}", deals.len(), path.display());

    Ok(())
}

pub(crate) fn format_summary(status: &JobStatus, deals: &[DealRecord]) -> String {
    let mut out = String::new();
    let requested = status
        .requested_count
        .map_or_else(|| "all".to_owned(), |n| n.to_string());
    let _ = writeln!(
        out,
        "Scraped {} valid deals out of {} candidates ({requested} requested)",
        status.valid_count, status.scraped_count
    );

    for (i, deal) in deals.iter().enumerate() {
        let title = if deal.title.is_empty() {
            "(untitled)"
        } else {
            deal.title.as_str()
        };
        let _ = writeln!(out, "\n{}. {title}", i + 1);
        let _ = writeln!(
            out,
            "   Price: {} (was {}, save {}, {}% off)",
            deal.discounted_price,
            deal.original_price,
            deal.savings(),
            deal.discount_percent
        );
        if let Some(brand) = &deal.brand {
            let _ = writeln!(out, "   Brand: {brand}");
        }
        if let Some(category) = &deal.category {
            let _ = writeln!(out, "   Category: {category}");
        }
        if let Some(expiry) = &deal.expiry {
            let _ = writeln!(out, "   Ends: {expiry}");
        }
        if let Some(url) = &deal.product_url {
            let _ = writeln!(out, "   URL: {url}");
        }
    }

    out
}
