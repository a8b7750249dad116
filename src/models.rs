//! Data models shared by the extractor, the matcher and the pipeline.
//!
//! - [`ArticleRecord`]: one entry scraped from a listing page
//! - [`KeywordSet`]: the ordered, case-insensitive keywords searched for
//! - [`MatchResult`]: the verdict for one article

use itertools::Itertools;

/// One article as found on a listing page.
///
/// Records are built by [`extract`](crate::extract::extract) and are not
/// modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRecord {
    /// The headline text.
    pub title: String,
    /// Publication date rendered as `DD.MM.YYYY`.
    pub publish_date: String,
    /// Absolute URL of the full article.
    pub link: String,
    /// Paragraph text shown under the headline, joined by single spaces.
    pub preview_text: String,
}

/// Ordered keywords matched case-insensitively.
///
/// Keywords that differ only in case are collapsed at construction, keeping
/// the first spelling, so a [`MatchResult`] can never report the same keyword
/// twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordSet {
    keywords: Vec<String>,
    lowered: Vec<String>,
}

impl KeywordSet {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords: Vec<String> = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_string())
            .filter(|k| !k.is_empty())
            .unique_by(|k| k.to_lowercase())
            .collect();
        let lowered = keywords.iter().map(|k| k.to_lowercase()).collect();
        Self { keywords, lowered }
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(String::as_str)
    }

    /// Keywords contained in any of `texts`, in set order.
    pub fn found_in(&self, texts: &[&str]) -> Vec<String> {
        let lowered: Vec<String> = texts.iter().map(|t| t.to_lowercase()).collect();
        self.keywords
            .iter()
            .zip(&self.lowered)
            .filter(|(_, needle)| lowered.iter().any(|t| t.contains(needle.as_str())))
            .map(|(kw, _)| kw.clone())
            .collect()
    }
}

/// The verdict for one article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub matched: bool,
    /// Keywords that were found, in [`KeywordSet`] order.
    pub found_keywords: Vec<String>,
}

impl MatchResult {
    pub fn from_found(found_keywords: Vec<String>) -> Self {
        Self {
            matched: !found_keywords.is_empty(),
            found_keywords,
        }
    }

    pub fn no_match() -> Self {
        Self::from_found(Vec::new())
    }
}
