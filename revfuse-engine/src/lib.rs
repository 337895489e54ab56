//! revfuse-engine library interface
//!
//! Fuses static-analysis and LLM review findings into one prioritized,
//! educational issue list.

pub mod config;
pub mod error;
pub mod fusion;
pub mod sources;
pub mod summary;
pub mod types;
pub mod workflow;

pub use crate::error::{PipelineError, SourceError, SourceResult};
pub use crate::fusion::fuse_issues;
pub use crate::summary::summarize;
pub use crate::types::{AnalysisResult, Category, Issue, LlmStatus, Severity, Tool};
pub use crate::workflow::{AnalysisRequest, LlmCapability, Pipeline};
