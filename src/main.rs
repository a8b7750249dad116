//! # Keyword Scout
//!
//! Scans an article listing page and reports the articles that mention any
//! of a set of keywords, keeping an audit trail of the calls it makes.
//!
//! ## Usage
//!
//! ```sh
//! keyword_scout -k rust -k tokio --log-file ./scout.log
//! ```
//!
//! ## Architecture
//!
//! A run is a single sequential pass:
//! 1. **Listing**: fetch the listing page and extract one record per article
//! 2. **Cheap check**: look for keywords in each title and preview
//! 3. **Fallback check**: fetch the full article only when step 2 finds nothing
//! 4. **Output**: print one line per matching article to stdout
//!
//! The listing scan and every full-article check are written to the audit log
//! (see [`audit`]); operational logging goes to stderr through `tracing`.

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod audit;
mod cli;
mod config;
mod error;
mod extract;
mod fetch;
mod matcher;
mod models;
mod pipeline;
mod utils;

use cli::Cli;
use config::Settings;
use fetch::HttpFetcher;
use pipeline::Pipeline;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("keyword_scout starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let settings = Settings::from_cli(&args)?;
    info!(
        listing_url = %settings.listing_url,
        keyword_count = settings.keywords.len(),
        keywords = ?settings.keywords.iter().collect::<Vec<_>>(),
        log_file = %settings.log_file.display(),
        "Loaded settings"
    );

    let fetcher = HttpFetcher::new(settings.request_timeout)?;
    let pipeline = Pipeline::new(&settings, fetcher);

    let results = match pipeline.run().await {
        Ok(results) => results,
        Err(e) => {
            error!(kind = e.kind(), error = %e, "Scan aborted");
            return Err(e.into());
        }
    };

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        matches = results.len(),
        "Execution complete"
    );
    Ok(())
}
