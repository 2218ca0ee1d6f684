//! Typed errors for the funding scout library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.
//!
//! Only batch-level failures are errors. An unparseable answer is an empty
//! record list, an unmapped field is a report entry, and a record without a
//! name or link is a counter on the merge outcome.

use thiserror::Error;

/// Boxed source error from a collaborator client.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur during a scouting run.
#[derive(Debug, Error)]
pub enum ScoutError {
    /// The persistent store could not be read or written
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[source] BoxError),

    /// A row append failed part way through a merge
    #[error("merge aborted after {appended} appended row(s): {source}")]
    MergeAborted {
        appended: usize,
        #[source]
        source: BoxError,
    },

    /// Web search failed
    #[error("search failed for '{query}': {source}")]
    Search {
        query: String,
        #[source]
        source: BoxError,
    },

    /// Page content extraction failed
    #[error("content extraction failed for {url}: {source}")]
    Content {
        url: String,
        #[source]
        source: BoxError,
    },

    /// No page content could be collected for any keyword
    #[error("no page content collected from {keywords} keyword(s)")]
    NoContent { keywords: usize },

    /// AI service unavailable or failed
    #[error("AI service error: {0}")]
    AI(#[source] BoxError),

    /// Email delivery failed
    #[error("notification failed: {0}")]
    Notify(#[source] BoxError),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl ScoutError {
    /// Wrap any store-side failure.
    pub fn store(err: impl Into<BoxError>) -> Self {
        Self::StoreUnavailable(err.into())
    }

    /// Wrap any AI-side failure.
    pub fn ai(err: impl Into<BoxError>) -> Self {
        Self::AI(err.into())
    }
}

/// Result type alias for scouting operations.
pub type Result<T> = std::result::Result<T, ScoutError>;
