//! Analysis workflow
//!
//! One invocation runs strictly in sequence:
//! - **Static phase**: mandatory baseline, failure is fatal
//! - **LLM phase**: optional, failures degrade the result instead of aborting
//! - **Fusion phase**: merge, enrich, prioritize
//! - **Summary phase**: aggregate counts
//!
//! Static findings feed the LLM phase as context, so there is no parallelism
//! between phases. Independent invocations may share one `Pipeline`.

pub mod pipeline;

pub use pipeline::{AnalysisRequest, LlmCapability, Pipeline};

/// Pipeline phase, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Static,
    Llm,
    Fusion,
    Summary,
}

/// Progress events emitted by a pipeline configured with an event channel
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type")]
pub enum PipelineEvent {
    /// Phase started
    PhaseStarted {
        analysis_id: uuid::Uuid,
        phase: Phase,
    },

    /// Phase finished
    PhaseCompleted {
        analysis_id: uuid::Uuid,
        phase: Phase,
        /// Findings produced or retained by the phase
        issues: usize,
    },

    /// LLM phase did not contribute findings
    LlmSkipped {
        analysis_id: uuid::Uuid,
        status: crate::types::LlmStatus,
    },

    /// Invocation finished
    AnalysisCompleted {
        analysis_id: uuid::Uuid,
        total_unique_issues: usize,
        execution_time: f64,
    },
}
