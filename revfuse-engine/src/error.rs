//! Error types for revfuse-engine
//!
//! Source failures are classified by the pipeline:
//! - LLM source errors are isolated and degrade the result
//! - Static source errors are fatal to the invocation

use std::time::Duration;
use thiserror::Error;

/// Error raised by a findings source (construction or call)
#[derive(Debug, Error)]
pub enum SourceError {
    /// Source could not be initialized (e.g. missing credentials)
    #[error("Source not available: {0}")]
    Unavailable(String),

    /// Network communication error
    #[error("Network error: {0}")]
    Network(String),

    /// External API returned an error
    #[error("API error: {0}")]
    Api(String),

    /// Failed to parse response or tool output
    #[error("Parse error: {0}")]
    Parse(String),

    /// External tool failed to run or exited unsuccessfully
    #[error("Tool error: {0}")]
    Tool(String),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Call exceeded its time budget
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// Call was cancelled by the caller
    #[error("Cancelled")]
    Cancelled,
}

/// Error escaping `Pipeline::analyze`
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Mandatory static phase failed
    #[error("Static analysis failed ({source_name}): {source}")]
    StaticSource {
        source_name: &'static str,
        #[source]
        source: SourceError,
    },
}

/// Result type for source adapters
pub type SourceResult<T> = Result<T, SourceError>;
