//! Two-tier keyword matching.
//!
//! # Strategy
//!
//! 1. **Cheap check**: look for the keywords in the title and preview already
//!    scraped from the listing. A hit settles the article with no network I/O.
//! 2. **Fallback check**: otherwise fetch the full article and look inside its
//!    main content container (`div.article-formatted-body`). This costs one
//!    extra request per article, so it only runs when the cheap check is
//!    inconclusive.
//!
//! The fallback is an [`Instrumentable`] operation run through [`Audited`], so
//! each full-article fetch leaves its own audit entry.

use crate::audit::{AuditLog, Audited, Instrumentable};
use crate::config::CONTENT_SELECTOR;
use crate::error::Result;
use crate::extract::selector;
use crate::fetch::PageFetcher;
use crate::models::{ArticleRecord, KeywordSet, MatchResult};
use scraper::Html;
use tracing::{debug, instrument};

/// Keywords found in an article's title or preview.
pub fn cheap_check(record: &ArticleRecord, keywords: &KeywordSet) -> MatchResult {
    MatchResult::from_found(keywords.found_in(&[record.title.as_str(), record.preview_text.as_str()]))
}

/// Keywords found in the main content container of a full article page.
///
/// A page without the container matches nothing.
pub fn match_content(html: &str, keywords: &KeywordSet) -> Result<MatchResult> {
    let container = selector(CONTENT_SELECTOR)?;
    let document = Html::parse_document(html);

    let Some(content) = document.select(&container).next() else {
        debug!(selector = CONTENT_SELECTOR, "Article has no content container");
        return Ok(MatchResult::no_match());
    };
    let text = content.text().collect::<String>();
    Ok(MatchResult::from_found(keywords.found_in(&[text.as_str()])))
}

/// Fetches a full article and tests its body; the fallback tier.
#[derive(Debug, Clone)]
pub struct ContentCheck<F> {
    fetcher: F,
    keywords: KeywordSet,
}

impl<F> ContentCheck<F>
where
    F: PageFetcher,
{
    pub fn new(fetcher: F, keywords: KeywordSet) -> Self {
        Self { fetcher, keywords }
    }
}

impl<F> Instrumentable for ContentCheck<F>
where
    F: PageFetcher,
{
    /// The article URL.
    type Args = String;
    type Output = MatchResult;

    fn name(&self) -> &'static str {
        "check_article_content"
    }

    async fn invoke(&self, url: String) -> Result<MatchResult> {
        let body = self.fetcher.fetch(&url).await?;
        match_content(&body, &self.keywords)
    }
}

/// Decides, per article, whether it mentions any keyword.
#[derive(Debug)]
pub struct TwoTierMatcher<F> {
    keywords: KeywordSet,
    fallback: Audited<ContentCheck<F>>,
}

impl<F> TwoTierMatcher<F>
where
    F: PageFetcher,
{
    /// Full-article checks are fetched with `fetcher` and audited into `log`.
    pub fn new(fetcher: F, keywords: KeywordSet, log: AuditLog) -> Self {
        let fallback = Audited::new(ContentCheck::new(fetcher, keywords.clone()), log);
        Self { keywords, fallback }
    }

    /// Run the cheap check, then the fallback check if nothing was found.
    ///
    /// # Errors
    ///
    /// Only the fallback can fail: a transport error fetching the article, or
    /// a failure writing its audit entry.
    #[instrument(level = "info", skip_all, fields(link = %record.link))]
    pub async fn match_article(&self, record: &ArticleRecord) -> Result<MatchResult> {
        let cheap = cheap_check(record, &self.keywords);
        if cheap.matched {
            debug!(found = ?cheap.found_keywords, "Matched on title/preview");
            return Ok(cheap);
        }

        debug!("No keyword in title/preview; checking full article");
        self.fallback.invoke(record.link.clone()).await
    }
}
