//! Error types for bibleurl library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for bibleurl operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for bibleurl library.
#[derive(Error, Debug)]
pub enum Error {
    /// HTML conversion exceeded its wall-clock budget.
    #[error("HTML parsing timed out")]
    Timeout,

    /// A command-line value was rejected.
    #[error("{0}")]
    Validation(String),

    /// The URL could not be parsed.
    #[error("Invalid URL: \"{0}\"")]
    InvalidUrl(String),

    /// The URL does not use https.
    #[error("URL must use HTTPS. Got \"{scheme}:\" in \"{url}\".")]
    InsecureScheme { scheme: String, url: String },

    /// The URL host is not on the allowlist.
    #[error("URL host \"{host}\" is not in the allowed list: {allowed}.")]
    HostNotAllowed { host: String, allowed: String },

    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A folder resolves outside the directory it must stay in.
    #[error(
        "Log folder \"{folder}\" resolves to \"{}\" which is outside the allowed base directory \"{}\".",
        .resolved.display(),
        .base.display()
    )]
    PathOutsideBase {
        folder: String,
        resolved: PathBuf,
        base: PathBuf,
    },

    /// Flat chapter index past the end of a corpus.
    #[error("Internal error: flat index {0} out of range")]
    ChapterOutOfRange(u32),

    /// A corpus without chapters cannot be cycled.
    #[error("Internal error: corpus has no chapters")]
    EmptyCorpus,

    /// The server answered with a non-success status.
    #[error("Failed to fetch passage: {status} {reason}")]
    Http { status: u16, reason: String },

    /// The response body is larger than the configured cap.
    #[error("Response too large: exceeded {limit} bytes (got {size})")]
    ResponseTooLarge { size: u64, limit: u64 },

    /// Transport-level failure (connect, TLS, timeout).
    #[cfg(feature = "fetch")]
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed JSON configuration.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Process exit code for this error category.
    ///
    /// Validation and configuration problems exit with 1, network failures
    /// with 2 and file-system failures with 3.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Http { .. } | Error::ResponseTooLarge { .. } => 2,
            #[cfg(feature = "fetch")]
            Error::Request(_) => 2,
            Error::Io(_) => 3,
            _ => 1,
        }
    }

    /// Returns true for the converter's deadline failure.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout)
    }
}
