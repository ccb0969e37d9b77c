mod scrape;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "dealwatch-cli")]
#[command(about = "Scrape discounted deals from Amazon and noon listing pages")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape one listing page and save the valid deals as JSON
    Scrape {
        /// Listing page URL
        url: String,
        /// Platform (amazon or noon); detected from the URL when omitted
        #[arg(long)]
        platform: Option<String>,
        /// Read at most this many product blocks
        #[arg(long)]
        max_deals: Option<u32>,
        /// Output file; defaults to <platform>_deals.json
        #[arg(long)]
        output: Option<PathBuf>,
        /// Skip product pages and keep only what the listing shows
        #[arg(long)]
        listing_only: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = dealwatch_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Scrape {
            url,
            platform,
            max_deals,
            output,
            listing_only,
        }) => {
            scrape::run_scrape(
                &config,
                &url,
                platform.as_deref(),
                max_deals,
                output.as_deref(),
                listing_only,
            )
            .await?;
        }
        None => println!("no command given; run `dealwatch-cli scrape --help`"),
    }

    Ok(())
}

#[cfg(test)]
mod tests;
