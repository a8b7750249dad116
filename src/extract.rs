//! Article extraction from listing pages.
//!
//! A listing page holds one `<article>` element per story. From each one the
//! [`Extractor`] reads:
//!
//! | Field | Source |
//! |-------|--------|
//! | title | text of the first `<a>` inside the first `<h2>` |
//! | link | `href` of that same `<a>` |
//! | date | `datetime` attribute of the first `<time>` |
//! | preview | text of every `<p>`, joined by single spaces |
//!
//! Entries missing any of the first three are reported as errors one by one;
//! they never stop the remaining entries from being read.

use crate::error::{Error, Result};
use crate::models::ArticleRecord;
use crate::utils::squash_whitespace;
use chrono::DateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};
use url::Url;

/// Format dates are rendered in.
pub const DISPLAY_DATE_FORMAT: &str = "%d.%m.%Y";

const SOURCE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

static FRACTION_AND_ZULU: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.\d+Z$").expect("static regex is valid"));

/// Rewrite a listing timestamp such as `2025-05-06T14:30:00.000Z` to `06.05.2025`.
///
/// Only the fractional-seconds-plus-`Z` ending is rewritten (to `+0000`);
/// everything else must already match `%Y-%m-%dT%H:%M:%S%z`.
///
/// # Errors
///
/// [`Error::InvalidDate`] for any other shape, e.g. a bare `Z` with no
/// fractional part or a date without a time.
pub fn normalize_date(raw: &str) -> Result<String> {
    let fixed = FRACTION_AND_ZULU.replace(raw.trim(), "+0000");
    let parsed = DateTime::parse_from_str(&fixed, SOURCE_TIMESTAMP_FORMAT).map_err(|source| {
        Error::InvalidDate {
            value: raw.to_string(),
            source,
        }
    })?;
    Ok(parsed.format(DISPLAY_DATE_FORMAT).to_string())
}

/// Make `link` absolute.
///
/// Links that already parse as `http`/`https` URLs are returned exactly as
/// given; anything else is appended to the origin of `base` (scheme and host),
/// never to its path.
pub fn absolutize_link(base: &Url, link: &str) -> Result<String> {
    let link = link.trim();
    if let Ok(url) = Url::parse(link) {
        if matches!(url.scheme(), "http" | "https") {
            return Ok(link.to_string());
        }
    }
    base.join("/")
        .and_then(|origin| origin.join(link))
        .map(|u| u.to_string())
        .map_err(|source| Error::InvalidLink {
            value: link.to_string(),
            source,
        })
}

/// Reads [`ArticleRecord`]s out of a parsed listing page.
#[derive(Debug)]
pub struct Extractor {
    base: Url,
    article: Selector,
    heading: Selector,
    anchor: Selector,
    time: Selector,
    paragraph: Selector,
}

impl Extractor {
    /// `base` is the page the listing was fetched from; relative links are
    /// resolved against its origin.
    pub fn new(base: Url) -> Result<Self> {
        Ok(Self {
            base,
            article: selector("article")?,
            heading: selector("h2")?,
            anchor: selector("a")?,
            time: selector("time")?,
            paragraph: selector("p")?,
        })
    }

    /// Lazily yield one result per `<article>` in `document`, in page order.
    pub fn extract<'a>(
        &'a self,
        document: &'a Html,
    ) -> impl Iterator<Item = Result<ArticleRecord>> + 'a {
        document
            .select(&self.article)
            .map(move |entry| self.read_entry(entry))
    }

    #[instrument(level = "debug", skip_all)]
    fn read_entry(&self, entry: ElementRef<'_>) -> Result<ArticleRecord> {
        let anchor = entry
            .select(&self.heading)
            .next()
            .ok_or_else(|| Error::MalformedEntry("h2 heading".into()))?
            .select(&self.anchor)
            .next()
            .ok_or_else(|| Error::MalformedEntry("h2 a link".into()))?;
        let title = squash_whitespace(&anchor.text().collect::<String>());

        let raw_date = entry
            .select(&self.time)
            .next()
            .and_then(|t| t.value().attr("datetime"))
            .ok_or_else(|| Error::MalformedEntry("time[datetime]".into()))?;
        let publish_date = normalize_date(raw_date)?;

        let href = anchor
            .value()
            .attr("href")
            .ok_or_else(|| Error::MalformedEntry("h2 a[href]".into()))?;
        let link = absolutize_link(&self.base, href)?;

        let preview_text = entry
            .select(&self.paragraph)
            .map(|p| squash_whitespace(&p.text().collect::<String>()))
            .collect::<Vec<_>>()
            .join(" ");

        debug!(%title, %link, %publish_date, "Extracted article");
        Ok(ArticleRecord {
            title,
            publish_date,
            link,
            preview_text,
        })
    }
}

pub(crate) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::Selector(format!("{css}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn base() -> Url {
        Url::parse("https://habr.com/ru/articles/").unwrap()
    }

    const LISTING: &str = r#"
        <html><body>
          <article>
            <h2><a href="/ru/articles/100/"><span>New Web Design Trends</span></a></h2>
            <time datetime="2025-05-06T14:30:00.000Z">today</time>
            <p>First paragraph.</p>
            <p>Second
               paragraph.</p>
          </article>
          <article>
            <h2><a href="/ru/articles/101/">Missing timestamp</a></h2>
            <p>Nothing here.</p>
          </article>
          <article>
            <h2><a href="https://other.example/post/7">Elsewhere</a></h2>
            <time datetime="2024-12-31T23:59:59.5Z"></time>
          </article>
        </body></html>
    "#;

    #[test]
    fn test_normalize_date_fraction_and_zulu() {
        assert_eq!(normalize_date("2025-05-06T14:30:00.000Z").unwrap(), "06.05.2025");
        assert_eq!(normalize_date("2024-12-31T23:59:59.5Z").unwrap(), "31.12.2024");
    }

    #[test]
    fn test_normalize_date_explicit_offset() {
        assert_eq!(normalize_date("2025-01-02T03:04:05+0300").unwrap(), "02.01.2025");
    }

    #[test]
    fn test_normalize_date_rejects_other_shapes() {
        for raw in ["2025-05-06", "06.05.2025", "yesterday", ""] {
            let err = normalize_date(raw).unwrap_err();
            assert_eq!(err.kind(), "MalformedEntryError", "{raw}");
        }
    }

    #[test]
    fn test_display_format_is_stable() {
        let shown = normalize_date("2025-05-06T14:30:00.123Z").unwrap();
        let again = NaiveDate::parse_from_str(&shown, DISPLAY_DATE_FORMAT)
            .unwrap()
            .format(DISPLAY_DATE_FORMAT)
            .to_string();
        assert_eq!(again, shown);
    }

    #[test]
    fn test_absolutize_link() {
        assert_eq!(
            absolutize_link(&base(), "/ru/articles/100/").unwrap(),
            "https://habr.com/ru/articles/100/"
        );
        assert_eq!(
            absolutize_link(&base(), "https://habr.com/ru/news/5/").unwrap(),
            "https://habr.com/ru/news/5/"
        );
        assert_eq!(
            absolutize_link(&base(), "ru/articles/5/").unwrap(),
            "https://habr.com/ru/articles/5/"
        );
        // Passed through verbatim, without URL normalization.
        assert_eq!(
            absolutize_link(&base(), "http://Example.com").unwrap(),
            "http://Example.com"
        );
    }

    #[test]
    fn test_extract_listing() {
        let extractor = Extractor::new(base()).unwrap();
        let document = Html::parse_document(LISTING);
        let items: Vec<_> = extractor.extract(&document).collect();

        assert_eq!(items.len(), 3);

        let first = items[0].as_ref().unwrap();
        assert_eq!(first.title, "New Web Design Trends");
        assert_eq!(first.publish_date, "06.05.2025");
        assert_eq!(first.link, "https://habr.com/ru/articles/100/");
        assert_eq!(first.preview_text, "First paragraph. Second paragraph.");

        let second = items[1].as_ref().unwrap_err();
        assert!(matches!(second, Error::MalformedEntry(what) if what == "time[datetime]"));

        let third = items[2].as_ref().unwrap();
        assert_eq!(third.link, "https://other.example/post/7");
        assert_eq!(third.preview_text, "");
    }

    #[test]
    fn test_extract_link_without_leading_slash_uses_origin() {
        let extractor = Extractor::new(base()).unwrap();
        let document = Html::parse_document(
            r#"<article><h2><a href="ru/articles/5/">Relative</a></h2>
               <time datetime="2025-05-06T14:30:00.000Z"></time></article>"#,
        );
        let items: Vec<_> = extractor.extract(&document).collect();

        assert_eq!(items[0].as_ref().unwrap().link, "https://habr.com/ru/articles/5/");
    }

    #[test]
    fn test_extract_entry_without_heading() {
        let extractor = Extractor::new(base()).unwrap();
        let document =
            Html::parse_document(r#"<article><time datetime="2025-05-06T14:30:00.000Z"></time></article>"#);
        let items: Vec<_> = extractor.extract(&document).collect();

        assert_eq!(items.len(), 1);
        assert!(items[0].is_err());
    }

    #[test]
    fn test_extract_empty_listing() {
        let extractor = Extractor::new(base()).unwrap();
        let document = Html::parse_document("<html><body><p>No articles.</p></body></html>");
        assert_eq!(extractor.extract(&document).count(), 0);
    }
}
