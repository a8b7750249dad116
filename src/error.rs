//! Error taxonomy for the scan.
//!
//! Every failure in the crate is an [`Error`]. The variants fall into the
//! buckets recorded in the audit log (see [`Error::kind`]):
//!
//! | Kind | Variants | Scope |
//! |------|----------|-------|
//! | `TransportError` | [`Error::Transport`], [`Error::ClientBuild`] | fatal on the listing, skippable per article |
//! | `MalformedEntryError` | [`Error::MalformedEntry`], [`Error::InvalidDate`], [`Error::InvalidLink`] | always skippable |
//! | `SelectorError` | [`Error::Selector`] | fatal (programming error) |
//! | `LogWriteError` | [`Error::LogWrite`] | propagates |

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The request failed, timed out, or returned a non-success status.
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),

    /// An expected element or attribute is missing from a listing entry.
    #[error("malformed entry: missing {0}")]
    MalformedEntry(String),

    #[error("malformed entry: unparseable timestamp {value:?}: {source}")]
    InvalidDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("malformed entry: cannot resolve link {value:?}: {source}")]
    InvalidLink {
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid CSS selector: {0}")]
    Selector(String),

    #[error("cannot write audit log {}: {source}", .path.display())]
    LogWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// The taxonomy bucket written into audit entries.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Transport { .. } | Error::ClientBuild(_) => "TransportError",
            Error::MalformedEntry(_) | Error::InvalidDate { .. } | Error::InvalidLink { .. } => {
                "MalformedEntryError"
            }
            Error::Selector(_) => "SelectorError",
            Error::LogWrite { .. } => "LogWriteError",
        }
    }

    /// Whether a failure while handling one article may be dropped so the
    /// run can continue with the next one.
    pub fn is_skippable(&self) -> bool {
        matches!(
            self,
            Error::Transport { .. }
                | Error::MalformedEntry(_)
                | Error::InvalidDate { .. }
                | Error::InvalidLink { .. }
        )
    }

    pub(crate) fn transport(url: &str, reason: impl ToString) -> Self {
        Error::Transport {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_buckets() {
        assert_eq!(Error::transport("https://x", "timed out").kind(), "TransportError");
        assert_eq!(Error::MalformedEntry("time".into()).kind(), "MalformedEntryError");
        assert_eq!(Error::Selector("h2 >".into()).kind(), "SelectorError");

        let log = Error::LogWrite {
            path: PathBuf::from("/nope/audit.log"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert_eq!(log.kind(), "LogWriteError");
        assert!(!log.is_skippable());
    }

    #[test]
    fn test_transport_message_names_url() {
        let err = Error::transport("https://habr.com/ru/articles/", "HTTP status 503");
        assert_eq!(
            err.to_string(),
            "request to https://habr.com/ru/articles/ failed: HTTP status 503"
        );
        assert!(err.is_skippable());
    }
}
