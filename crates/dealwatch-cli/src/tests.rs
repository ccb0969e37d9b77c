use clap::Parser;
use dealwatch_core::{JobStatus, Platform};
use dealwatch_scraper::{validate, CandidateRecord};
use rust_decimal::Decimal;

use super::*;

#[test]
fn parses_scrape_with_url_only() {
    let cli = Cli::try_parse_from(["dealwatch-cli", "scrape", "https://www.amazon.ae/deals"])
        .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Scrape {
            ref url,
            platform: None,
            max_deals: None,
            output: None,
            listing_only: false,
        }) if url == "https://www.amazon.ae/deals"
    ));
}

#[test]
fn parses_scrape_with_all_flags() {
    let cli = Cli::try_parse_from([
        "dealwatch-cli",
        "scrape",
        "https://www.noon.com/uae-en/deals/",
        "--platform",
        "noon",
        "--max-deals",
        "25",
        "--output",
        "out.json",
        "--listing-only",
    ])
    .expect("expected valid cli args");

    let Some(Commands::Scrape {
        platform,
        max_deals,
        output,
        listing_only,
        ..
    }) = cli.command
    else {
        panic!("expected scrape command");
    };
    assert_eq!(platform.as_deref(), Some("noon"));
    assert_eq!(max_deals, Some(25));
    assert_eq!(output, Some(PathBuf::from("out.json")));
    assert!(listing_only);
}

#[test]
fn scrape_requires_url() {
    assert!(Cli::try_parse_from(["dealwatch-cli", "scrape"]).is_err());
}

#[test]
fn rejects_non_numeric_max_deals() {
    assert!(Cli::try_parse_from([
        "dealwatch-cli",
        "scrape",
        "https://www.amazon.ae/deals",
        "--max-deals",
        "lots",
    ])
    .is_err());
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["dealwatch-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn summary_lists_each_deal() {
    let mut candidate = CandidateRecord::new(Platform::Amazon, "https://www.amazon.ae/deals");
    candidate.title = Some("Wireless Earbuds".to_owned());
    candidate.brand = Some("Acme".to_owned());
    candidate.product_url = Some("https://www.amazon.ae/dp/B0001".to_owned());
    candidate.original_price = Some(Decimal::from(100));
    candidate.discounted_price = Some(Decimal::from(60));
    let deal = validate(candidate).unwrap();

    let mut status = JobStatus::idle(Platform::Amazon);
    status.scraped_count = 3;
    status.valid_count = 1;
    status.requested_count = Some(10);

    let summary = scrape::format_summary(&status, &[deal]);

    assert!(summary.starts_with("Scraped 1 valid deals out of 3 candidates (10 requested)"));
    assert!(summary.contains("1. Wireless Earbuds"));
    assert!(summary.contains("Price: 60.00 (was 100.00, save 40.00, 40.00% off)"));
    assert!(summary.contains("Brand: Acme"));
    assert!(summary.contains("URL: https://www.amazon.ae/dp/B0001"));
    assert!(!summary.contains("Category:"));
}
