//! Error taxonomy for the transform pipeline.
//!
//! Every error is fatal to the current invocation: no stage recovers from
//! another stage's failure, and no partial artifact is ever written. Each
//! variant keeps its original cause so the invocation harness can surface a
//! complete report.

use arrow::error::ArrowError;

/// Boxed error type used at the storage-collaborator boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors produced by the transform pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reading the input blob from the storage collaborator failed.
    #[error("fetch failed for {location}: {source}")]
    Fetch {
        location: String,
        #[source]
        source: BoxError,
    },

    /// Input bytes were not valid UTF-8 JSON.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Input parsed as JSON but is not a structurally valid order document.
    #[error("schema error: {0}")]
    Schema(String),

    /// Columnar serialization failed. Type inference is total, so this is
    /// modeled for completeness rather than expected in practice.
    #[error("encode error: {0}")]
    Encode(#[from] ArrowError),

    /// Handing the finished artifact to the storage collaborator failed.
    #[error("storage write failed for {path}: {source}")]
    StorageWrite {
        path: String,
        #[source]
        source: BoxError,
    },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
