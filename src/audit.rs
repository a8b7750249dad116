//! Call auditing.
//!
//! Any operation implementing [`Instrumentable`] can be wrapped in
//! [`Audited`], which records each call into an [`AuditLog`] file:
//!
//! - the local time the call started, the operation name and a snapshot of
//!   its arguments;
//! - on success, `status: SUCCESS` and a preview of the result cut to
//!   [`RESULT_PREVIEW_CHARS`] characters;
//! - on failure, `status: ERROR` with the error kind and message, followed by
//!   a separate [`FAILURE_MARKER`] write.
//!
//! The wrapper never changes what the wrapped call returns. Errors are handed
//! back to the caller after they are logged.
//!
//! # Entry Layout
//!
//! ```text
//! 2025-05-06 14:30:00 - function: check_article_content
//! arguments: "https://habr.com/ru/articles/900000/"
//! status: SUCCESS
//! result: MatchResult { matched: true, found_keywords: ["python"] }
//!
//! ```

use crate::error::{Error, Result};
use crate::utils::truncate_preview;
use chrono::{DateTime, Local};
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, instrument};

/// Longest result preview kept in a SUCCESS entry.
pub const RESULT_PREVIEW_CHARS: usize = 100;

/// Written as its own entry after every ERROR entry.
pub const FAILURE_MARKER: &str = "!!! function finished with an error !!!\n\n";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// An operation whose calls can be audited.
///
/// Implementors name themselves and take their arguments as a single value so
/// the wrapper can snapshot them before the call runs.
pub trait Instrumentable {
    type Args: fmt::Debug;
    type Output: fmt::Debug;

    /// Name written into the `function:` line of audit entries.
    fn name(&self) -> &'static str;

    async fn invoke(&self, args: Self::Args) -> Result<Self::Output>;
}

/// Outcome part of an [`AuditEntry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditOutcome {
    Success { result_preview: String },
    Error { kind: &'static str, message: String },
}

/// One record in the audit log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub timestamp: DateTime<Local>,
    pub function_name: &'static str,
    pub arguments: String,
    pub outcome: AuditOutcome,
}

impl AuditEntry {
    pub fn success(
        timestamp: DateTime<Local>,
        function_name: &'static str,
        arguments: String,
        result: &impl fmt::Debug,
    ) -> Self {
        Self {
            timestamp,
            function_name,
            arguments,
            outcome: AuditOutcome::Success {
                result_preview: truncate_preview(&format!("{result:?}"), RESULT_PREVIEW_CHARS),
            },
        }
    }

    pub fn failure(
        timestamp: DateTime<Local>,
        function_name: &'static str,
        arguments: String,
        err: &Error,
    ) -> Self {
        Self {
            timestamp,
            function_name,
            arguments,
            outcome: AuditOutcome::Error {
                kind: err.kind(),
                message: err.to_string(),
            },
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.outcome, AuditOutcome::Error { .. })
    }

    /// Render the entry as a text block terminated by a blank line.
    pub fn render(&self) -> String {
        let detail = match &self.outcome {
            AuditOutcome::Success { result_preview } => {
                format!("status: SUCCESS\nresult: {result_preview}")
            }
            AuditOutcome::Error { kind, message } => {
                format!("status: ERROR\nerror: {kind}: {message}")
            }
        };
        format!(
            "{} - function: {}\narguments: {}\n{}\n\n",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.function_name,
            self.arguments,
            detail
        )
    }
}

/// Append-only text file holding audit entries.
///
/// The file is opened, appended to and closed again for every write; no
/// handle is kept between writes.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the log file left by a previous run. A missing file is fine.
    #[instrument(level = "debug", skip_all, fields(path = %self.path.display()))]
    pub async fn reset(&self) -> Result<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!("Removed previous audit log");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(self.write_error(source)),
        }
    }

    /// Append one entry; ERROR entries are followed by the failure marker,
    /// written separately.
    pub async fn record(&self, entry: &AuditEntry) -> Result<()> {
        self.append(&entry.render()).await?;
        if entry.is_error() {
            self.append(FAILURE_MARKER).await?;
        }
        Ok(())
    }

    /// Note a failure that skipped one article without ending the run.
    pub async fn record_processing_error(&self, err: &Error) -> Result<()> {
        self.append(&format!("error while processing article: {err}\n"))
            .await
    }

    async fn append(&self, text: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| self.write_error(e))?;
        file.write_all(text.as_bytes())
            .await
            .map_err(|e| self.write_error(e))?;
        file.flush().await.map_err(|e| self.write_error(e))
    }

    fn write_error(&self, source: std::io::Error) -> Error {
        Error::LogWrite {
            path: self.path.clone(),
            source,
        }
    }
}

/// Decorator that audits every call to the wrapped [`Instrumentable`].
///
/// `Audited<T>` is itself `Instrumentable`, so it can be used anywhere the
/// bare operation could.
///
/// # Failure Handling
///
/// - Wrapped call fails: the ERROR entry and marker are written and the
///   original error is returned. If the log cannot be written in that case,
///   the log failure is only reported through `tracing`, so the original
///   error is never replaced.
/// - Wrapped call succeeds but the SUCCESS entry cannot be written: the
///   [`Error::LogWrite`] is returned.
pub struct Audited<T> {
    inner: T,
    log: AuditLog,
}

impl<T> Audited<T>
where
    T: Instrumentable,
{
    pub fn new(inner: T, log: AuditLog) -> Self {
        Self { inner, log }
    }
}

impl<T> fmt::Debug for Audited<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Audited")
            .field("log", &self.log.path)
            .finish_non_exhaustive()
    }
}

impl<T> Instrumentable for Audited<T>
where
    T: Instrumentable,
{
    type Args = T::Args;
    type Output = T::Output;

    fn name(&self) -> &'static str {
        self.inner.name()
    }

    #[instrument(level = "debug", skip_all, fields(function = self.inner.name()))]
    async fn invoke(&self, args: Self::Args) -> Result<Self::Output> {
        let started = Local::now();
        let arguments = format!("{args:?}");

        match self.inner.invoke(args).await {
            Ok(output) => {
                let entry = AuditEntry::success(started, self.inner.name(), arguments, &output);
                self.log.record(&entry).await?;
                Ok(output)
            }
            Err(err) => {
                let entry = AuditEntry::failure(started, self.inner.name(), arguments, &err);
                if let Err(log_err) = self.log.record(&entry).await {
                    error!(
                        function = self.inner.name(),
                        error = %log_err,
                        original_error = %err,
                        "Failed to write audit entry for failed call"
                    );
                }
                Err(err)
            }
        }
    }
}
