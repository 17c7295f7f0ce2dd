//! Custom error types for atlascorpus.
//!
//! This module defines all error types used throughout the build and fetch pipelines.
//! All functions return `Result<T, CorpusError>` instead of using `unwrap()`.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for atlascorpus operations.
///
/// Invalid records (empty title, non-positive year) are not errors: the
/// normalizer drops them silently. Everything here aborts the current build.
#[derive(Debug, Error)]
pub enum CorpusError {
    /// A declared input corpus file does not exist
    #[error("missing input corpus file: {}", .0.display())]
    MissingInput(PathBuf),

    /// A non-empty JSONL line failed to parse
    #[error("malformed record at {}:{line}: {source}", .path.display())]
    MalformedRecord {
        /// File the line came from
        path: PathBuf,
        /// 1-based line number after newline unescaping
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// Network/HTTP request error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Rate limited by external API
    #[error("Rate limited, retry after {0}s")]
    RateLimited(u64),

    /// External API returned an error
    #[error("API error: {code} - {message}")]
    Api {
        /// HTTP status from API
        code: i32,
        /// Error message from API
        message: String,
    },

    /// Response payload could not be interpreted
    #[error("Parse error: {0}")]
    Parse(String),

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),
}

/// Result type alias using `CorpusError`
pub type Result<T> = std::result::Result<T, CorpusError>;
