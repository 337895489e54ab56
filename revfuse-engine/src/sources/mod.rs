//! Findings Sources
//!
//! Adapter contracts consumed by the pipeline, plus the bundled adapters:
//! - [`ExternalToolSource`] - static findings from an external command
//! - [`ChatCompletionsSource`] - LLM findings from an OpenAI-compatible API
//!
//! # Example
//! ```rust,ignore
//! use revfuse_engine::sources::{StaticSource, ExternalToolSource};
//!
//! let source = ExternalToolSource::new("lint-json", vec!["--stdin".into()]);
//! let report = source.analyze("print('hi')").await?;
//! println!("{} static findings", report.issues.len());
//! ```

pub mod chat_completions;
pub mod external_tool;
pub mod response_parser;

use crate::error::SourceResult;
use crate::types::{Issue, StaticReport};
use async_trait::async_trait;

pub use chat_completions::ChatCompletionsSource;
pub use external_tool::ExternalToolSource;

/// Pattern-based static findings source
///
/// Must return a report even on zero findings (empty issue list).
#[async_trait]
pub trait StaticSource: Send + Sync {
    /// Source name for logging and error reports
    fn name(&self) -> &'static str;

    /// Analyze source text
    async fn analyze(&self, code: &str) -> SourceResult<StaticReport>;
}

/// Free-form reasoning (LLM) findings source
///
/// Static findings are passed as context; the source may use them as hints.
#[async_trait]
pub trait LlmSource: Send + Sync {
    /// Source name for logging
    fn name(&self) -> &'static str;

    /// Analyze source text, seeded with static findings
    ///
    /// # Errors
    /// Any error is treated by the pipeline as "no LLM findings this run".
    async fn analyze(&self, code: &str, static_issues: &[Issue]) -> SourceResult<Vec<Issue>>;
}
