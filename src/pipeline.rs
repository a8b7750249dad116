//! Pipeline driver.
//!
//! One run:
//! 1. **Reset**: remove the audit log left by the previous run
//! 2. **Listing**: fetch and parse the listing page (fatal on failure)
//! 3. **Matching**: run every extracted article through the
//!    [`TwoTierMatcher`], one at a time, in page order
//! 4. **Output**: print a line for each matching article as it is found and
//!    return all of them
//!
//! Per-article failures (a malformed entry, a failed full-article fetch) are
//! recorded as [`ArticleOutcome::Skipped`], noted in the audit log, and the
//! run moves on. The listing scan as a whole is audited as `scrape_listing`.

use crate::audit::{AuditLog, Audited, Instrumentable};
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::extract::Extractor;
use crate::fetch::PageFetcher;
use crate::matcher::TwoTierMatcher;
use crate::models::{ArticleRecord, MatchResult};
use scraper::Html;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// What happened to one listing entry.
#[derive(Debug)]
pub enum ArticleOutcome {
    /// The entry matched; holds its formatted result line.
    Matched(String),
    NotMatched { title: String },
    /// The entry was dropped because of this error.
    Skipped(Error),
}

/// Outcomes of one scan, in listing order.
#[derive(Debug, Default)]
pub struct RunReport {
    pub outcomes: Vec<ArticleOutcome>,
}

impl RunReport {
    /// Titles of the articles that mentioned no keyword, in listing order.
    pub fn unmatched_titles(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                ArticleOutcome::NotMatched { title } => Some(title.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Result lines of the matched articles, in listing order.
    pub fn lines(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                ArticleOutcome::Matched(line) => Some(line.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn matched(&self) -> usize {
        self.count(|o| matches!(o, ArticleOutcome::Matched(_)))
    }

    pub fn not_matched(&self) -> usize {
        self.count(|o| matches!(o, ArticleOutcome::NotMatched { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, ArticleOutcome::Skipped(_)))
    }

    fn count(&self, pred: impl Fn(&ArticleOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(o)).count()
    }
}

/// `<date> – <title> – <link> (found keywords: <k1, k2>)`
pub fn format_result_line(record: &ArticleRecord, result: &MatchResult) -> String {
    format!(
        "{} – {} – {} (found keywords: {})",
        record.publish_date,
        record.title,
        record.link,
        result.found_keywords.join(", ")
    )
}

/// Fetches one listing page and matches every article on it.
#[derive(Debug)]
pub struct ListingScan<F> {
    fetcher: F,
    matcher: TwoTierMatcher<F>,
    log: AuditLog,
}

impl<F> ListingScan<F>
where
    F: PageFetcher + Clone,
{
    pub fn new(settings: &Settings, fetcher: F, log: AuditLog) -> Self {
        let matcher = TwoTierMatcher::new(fetcher.clone(), settings.keywords.clone(), log.clone());
        Self {
            fetcher,
            matcher,
            log,
        }
    }

    async fn process(&self, record: ArticleRecord) -> Result<ArticleOutcome> {
        match self.matcher.match_article(&record).await {
            Ok(result) if result.matched => {
                let line = format_result_line(&record, &result);
                println!("{line}");
                Ok(ArticleOutcome::Matched(line))
            }
            Ok(_) => {
                debug!(title = %record.title, "No keyword found");
                Ok(ArticleOutcome::NotMatched {
                    title: record.title,
                })
            }
            Err(e) if e.is_skippable() => Ok(ArticleOutcome::Skipped(e)),
            Err(e) => Err(e),
        }
    }
}

impl<F> Instrumentable for ListingScan<F>
where
    F: PageFetcher + Clone,
{
    /// The listing URL.
    type Args = String;
    type Output = RunReport;

    fn name(&self) -> &'static str {
        "scrape_listing"
    }

    #[instrument(level = "info", skip_all, fields(%listing_url))]
    async fn invoke(&self, listing_url: String) -> Result<RunReport> {
        let base = Url::parse(&listing_url).map_err(|source| Error::InvalidLink {
            value: listing_url.clone(),
            source,
        })?;
        let extractor = Extractor::new(base)?;

        let html = self.fetcher.fetch(&listing_url).await?;
        let document = Html::parse_document(&html);

        let mut report = RunReport::default();
        for (index, item) in extractor.extract(&document).enumerate() {
            let outcome = match item {
                Ok(record) => self.process(record).await?,
                Err(e) => ArticleOutcome::Skipped(e),
            };
            if let ArticleOutcome::Skipped(err) = &outcome {
                warn!(index, error = %err, "Skipping article");
                self.log.record_processing_error(err).await?;
            }
            report.outcomes.push(outcome);
        }
        Ok(report)
    }
}

/// Runs one complete scan.
#[derive(Debug)]
pub struct Pipeline<F> {
    listing_url: Url,
    log: AuditLog,
    scan: Audited<ListingScan<F>>,
}

impl<F> Pipeline<F>
where
    F: PageFetcher + Clone,
{
    pub fn new(settings: &Settings, fetcher: F) -> Self {
        let log = AuditLog::new(settings.log_file.clone());
        let scan = Audited::new(ListingScan::new(settings, fetcher, log.clone()), log.clone());
        Self {
            listing_url: settings.listing_url.clone(),
            log,
            scan,
        }
    }

    /// Reset the audit log, scan the listing and return the result lines.
    ///
    /// # Errors
    ///
    /// Fails, with no results, if the listing cannot be fetched or the audit
    /// log cannot be written.
    #[instrument(level = "info", skip_all, fields(listing_url = %self.listing_url))]
    pub async fn run(&self) -> Result<Vec<String>> {
        self.log.reset().await?;

        let report = self.scan.invoke(self.listing_url.to_string()).await?;
        debug!(titles = ?report.unmatched_titles(), "Articles without keywords");
        info!(
            matched = report.matched(),
            not_matched = report.not_matched(),
            skipped = report.skipped(),
            log = %self.log.path().display(),
            "Scan complete"
        );
        Ok(report.lines())
    }
}
