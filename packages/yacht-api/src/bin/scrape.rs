//! Standalone scraper: one listing URL in, processed HTML and JSON files out.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use listing_ingest::Location;
use yacht_api::{telemetry, Config};

#[derive(Parser)]
#[command(name = "scrape")]
#[command(about = "Extract structured data from a yacht listing page", long_about = None)]
struct Cli {
    /// Listing page URL
    url: String,

    /// Where to write the normalized page text
    #[arg(long, default_value = "processed_yacht_listing.html")]
    processed_out: PathBuf,

    /// Where to write the extracted listing
    #[arg(long, default_value = "extracted_yacht_data.json")]
    json_out: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init();
    let cli = Cli::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    let pipeline = config.build_pipeline()?;

    let location = Location::parse(&cli.url)?;
    let text = pipeline.prepare(&location).await?;

    tokio::fs::write(&cli.processed_out, text.as_str())
        .await
        .with_context(|| format!("Failed to write {}", cli.processed_out.display()))?;
    println!("Processed HTML saved to {}", cli.processed_out.display());
    println!("Character count: {}", text.char_count());

    // Oversized text stops here, before any extraction call.
    let listing = pipeline.complete(&text).await?;

    let json = serde_json::to_string_pretty(&listing).context("Failed to serialize listing")?;
    tokio::fs::write(&cli.json_out, &json)
        .await
        .with_context(|| format!("Failed to write {}", cli.json_out.display()))?;

    println!("{}", json);
    println!("Extracted data saved to {}", cli.json_out.display());

    Ok(())
}
