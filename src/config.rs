//! Run configuration.
//!
//! The scan is driven by a handful of fixed values. They are collected once at
//! startup into a [`Settings`] value which is passed explicitly to the
//! [`Pipeline`](crate::pipeline::Pipeline) and the matcher it builds.

use crate::cli::Cli;
use crate::error::{Error, Result};
use crate::models::KeywordSet;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Keywords searched for when none are given on the command line.
pub const DEFAULT_KEYWORDS: [&str; 4] = ["дизайн", "фото", "web", "python"];

/// Listing page scanned when none is given on the command line.
pub const DEFAULT_LISTING_URL: &str = "https://habr.com/ru/articles/";

/// Audit log written when no other path is given.
pub const DEFAULT_LOG_FILE: &str = "habr_parser.log";

/// Upper bound on a single page request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Marks the main text of a full article page.
pub const CONTENT_SELECTOR: &str = "div.article-formatted-body";

#[derive(Debug, Clone)]
pub struct Settings {
    /// Listing page; also the base that relative article links resolve against.
    pub listing_url: Url,
    pub keywords: KeywordSet,
    pub log_file: PathBuf,
    pub request_timeout: Duration,
}

impl Settings {
    /// Build settings from parsed command-line arguments.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLink`] if the listing URL is not an absolute URL.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let listing_url = Url::parse(&cli.listing_url).map_err(|source| Error::InvalidLink {
            value: cli.listing_url.clone(),
            source,
        })?;

        let mut keywords = KeywordSet::new(cli.keywords.iter());
        if keywords.is_empty() {
            keywords = KeywordSet::new(DEFAULT_KEYWORDS);
        }

        Ok(Self {
            listing_url,
            keywords,
            log_file: cli.log_file.clone(),
            request_timeout: REQUEST_TIMEOUT,
        })
    }
}
