//! Command-line interface definitions for Keyword Scout.
//!
//! Every option has a default, so running the binary with no arguments scans
//! the default listing for the default keywords. Options can also be supplied
//! through environment variables.

use crate::config::{DEFAULT_LISTING_URL, DEFAULT_LOG_FILE};
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the Keyword Scout application.
///
/// # Examples
///
/// ```sh
/// # Scan the default listing for the default keywords
/// keyword_scout
///
/// # Custom keywords and audit log location
/// keyword_scout -k rust -k tokio --log-file /tmp/scout.log
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Listing page to scan
    #[arg(long, env = "SCOUT_LISTING_URL", default_value = DEFAULT_LISTING_URL)]
    pub listing_url: String,

    /// Keyword to look for (repeatable or comma-separated, case-insensitive)
    #[arg(short = 'k', long = "keyword", env = "SCOUT_KEYWORDS", value_delimiter = ',')]
    pub keywords: Vec<String>,

    /// Audit log file, removed and recreated on every run
    #[arg(long, env = "SCOUT_LOG_FILE", default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,
}
