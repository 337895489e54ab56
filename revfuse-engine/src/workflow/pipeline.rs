//! Pipeline Orchestrator
//!
//! Sequences the two findings sources, fuses their output and assembles the
//! final `AnalysisResult`.
//!
//! # Architecture
//! - **Phase 1**: Static analysis (always runs)
//! - **Phase 2**: LLM analysis (requested + available only)
//! - **Phase 3**: Fusion (merge, enrich, prioritize)
//! - **Phase 4**: Summary
//!
//! # Error Handling
//! - Static source failure is fatal and propagates as `PipelineError`
//! - LLM failures (error, timeout, cancellation) are isolated: the result is
//!   built from static findings alone with `llm_used = false`
//! - LLM availability is decided once, at construction, and never retried
//!
//! # Example
//! ```rust,ignore
//! let llm = LlmCapability::probe(ChatCompletionsSource::new(&config.llm, api_key));
//! let pipeline = Pipeline::new(Arc::new(static_source), llm);
//! let result = pipeline.analyze(&code, &AnalysisRequest::default()).await?;
//! ```

use super::{Phase, PipelineEvent};
use crate::error::{PipelineError, SourceError, SourceResult};
use crate::fusion::fuse_issues;
use crate::sources::{LlmSource, StaticSource};
use crate::summary::summarize;
use crate::types::{AnalysisMetadata, AnalysisResult, Issue, LlmStatus, Tool};
use chrono::Utc;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Default time budget for the LLM phase
pub const DEFAULT_MAX_LLM_TIME: Duration = Duration::from_secs(30);

/// LLM source availability, decided once per pipeline
#[derive(Clone)]
pub enum LlmCapability {
    /// Source initialized successfully
    Available(Arc<dyn LlmSource>),
    /// Source failed to initialize; LLM phase is skipped on every call
    Unavailable { reason: String },
}

impl LlmCapability {
    /// Capture the outcome of constructing an LLM source
    pub fn probe<S>(init: SourceResult<S>) -> Self
    where
        S: LlmSource + 'static,
    {
        match init {
            Ok(source) => {
                info!(source = source.name(), "LLM source ready");
                LlmCapability::Available(Arc::new(source))
            }
            Err(e) => {
                warn!(error = %e, "LLM source unavailable");
                LlmCapability::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, LlmCapability::Available(_))
    }
}

impl fmt::Debug for LlmCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmCapability::Available(source) => {
                f.debug_tuple("Available").field(&source.name()).finish()
            }
            LlmCapability::Unavailable { reason } => f
                .debug_struct("Unavailable")
                .field("reason", reason)
                .finish(),
        }
    }
}

/// Per-invocation options
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    /// Run the LLM phase if the source is available
    pub use_llm: bool,
    /// Time budget for the LLM call; expiry degrades the result
    pub max_llm_time: Duration,
    /// Cancels the in-flight LLM call when triggered
    pub cancel: Option<CancellationToken>,
}

impl Default for AnalysisRequest {
    fn default() -> Self {
        Self {
            use_llm: true,
            max_llm_time: DEFAULT_MAX_LLM_TIME,
            cancel: None,
        }
    }
}

impl AnalysisRequest {
    /// Request that skips the LLM phase
    pub fn static_only() -> Self {
        Self {
            use_llm: false,
            ..Default::default()
        }
    }

    pub fn with_max_llm_time(mut self, max_llm_time: Duration) -> Self {
        self.max_llm_time = max_llm_time;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// Analysis pipeline orchestrator
pub struct Pipeline {
    static_source: Arc<dyn StaticSource>,
    llm: LlmCapability,
    event_tx: Option<mpsc::Sender<PipelineEvent>>,
}

impl Pipeline {
    /// Create pipeline from a static source and a probed LLM capability
    pub fn new(static_source: Arc<dyn StaticSource>, llm: LlmCapability) -> Self {
        Self {
            static_source,
            llm,
            event_tx: None,
        }
    }

    /// Create pipeline with event channel for progress reporting
    pub fn with_events(
        static_source: Arc<dyn StaticSource>,
        llm: LlmCapability,
        event_tx: mpsc::Sender<PipelineEvent>,
    ) -> Self {
        Self {
            static_source,
            llm,
            event_tx: Some(event_tx),
        }
    }

    pub fn llm_capability(&self) -> &LlmCapability {
        &self.llm
    }

    /// Analyze source text end to end
    ///
    /// # Errors
    /// Only a static source failure escapes; every LLM-phase failure is
    /// reflected in `metadata.llm_status` instead.
    pub async fn analyze(
        &self,
        code: &str,
        request: &AnalysisRequest,
    ) -> Result<AnalysisResult, PipelineError> {
        let analysis_id = Uuid::new_v4();
        let span = info_span!("analysis", %analysis_id);
        self.run(code, request, analysis_id).instrument(span).await
    }

    async fn run(
        &self,
        code: &str,
        request: &AnalysisRequest,
        analysis_id: Uuid,
    ) -> Result<AnalysisResult, PipelineError> {
        let started = Instant::now();
        let analyzed_at = Utc::now();
        let code_lines = code.split('\n').count();

        info!(
            code_lines,
            use_llm = request.use_llm,
            llm_available = self.llm.is_available(),
            "Starting analysis"
        );

        // Phase 1: Static analysis (mandatory)
        self.emit(PipelineEvent::PhaseStarted {
            analysis_id,
            phase: Phase::Static,
        })
        .await;

        let static_report = self.static_source.analyze(code).await.map_err(|source| {
            error!(source_name = self.static_source.name(), error = %source, "Static analysis failed");
            PipelineError::StaticSource {
                source_name: self.static_source.name(),
                source,
            }
        })?;
        let static_issues = static_report.issues;

        info!(issues = static_issues.len(), "Static phase complete");
        self.emit(PipelineEvent::PhaseCompleted {
            analysis_id,
            phase: Phase::Static,
            issues: static_issues.len(),
        })
        .await;

        // Phase 2: LLM analysis (optional, isolated)
        let (llm_issues, llm_status) = self
            .run_llm_phase(code, &static_issues, request, analysis_id)
            .await;
        let llm_used = llm_status == LlmStatus::Completed;

        // Phase 3: Fusion
        let static_count = static_issues.len();
        let llm_count = llm_issues.len();
        self.emit(PipelineEvent::PhaseStarted {
            analysis_id,
            phase: Phase::Fusion,
        })
        .await;

        let issues = fuse_issues(static_issues, llm_issues, code);

        info!(unique_issues = issues.len(), "Fusion phase complete");
        self.emit(PipelineEvent::PhaseCompleted {
            analysis_id,
            phase: Phase::Fusion,
            issues: issues.len(),
        })
        .await;

        // Phase 4: Summary
        let summary = summarize(&issues);
        self.emit(PipelineEvent::PhaseCompleted {
            analysis_id,
            phase: Phase::Summary,
            issues: summary.total,
        })
        .await;

        let execution_time = round_seconds(started.elapsed());
        info!(
            execution_time,
            total = summary.total,
            critical = summary.by_severity.critical,
            llm_used,
            "Analysis complete"
        );
        self.emit(PipelineEvent::AnalysisCompleted {
            analysis_id,
            total_unique_issues: issues.len(),
            execution_time,
        })
        .await;

        Ok(AnalysisResult {
            metadata: AnalysisMetadata {
                execution_time,
                static_issues: static_count,
                llm_issues: llm_count,
                total_unique_issues: issues.len(),
                llm_used,
                code_lines,
                llm_status,
                analysis_id,
                analyzed_at,
            },
            summary,
            issues,
        })
    }

    /// Phase 2: returns the LLM findings (empty unless completed) and outcome
    async fn run_llm_phase(
        &self,
        code: &str,
        static_issues: &[Issue],
        request: &AnalysisRequest,
        analysis_id: Uuid,
    ) -> (Vec<Issue>, LlmStatus) {
        let source = match (&self.llm, request.use_llm) {
            (_, false) => {
                info!("Skipping LLM phase (not requested)");
                return self.skip_llm(analysis_id, LlmStatus::NotRequested).await;
            }
            (LlmCapability::Unavailable { reason }, true) => {
                warn!(reason = %reason, "Skipping LLM phase (not available)");
                return self.skip_llm(analysis_id, LlmStatus::Unavailable).await;
            }
            (LlmCapability::Available(source), true) => source,
        };

        self.emit(PipelineEvent::PhaseStarted {
            analysis_id,
            phase: Phase::Llm,
        })
        .await;
        debug!(
            source = source.name(),
            budget_ms = request.max_llm_time.as_millis() as u64,
            hints = static_issues.len(),
            "Running LLM phase"
        );

        let budget = request.max_llm_time;
        let call = tokio::time::timeout(budget, source.analyze(code, static_issues));
        let outcome = match &request.cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Err(SourceError::Cancelled),
                result = call => within_budget(result, budget),
            },
            None => within_budget(call.await, budget),
        };

        match outcome {
            Ok(mut issues) => {
                for issue in &mut issues {
                    issue.tool.get_or_insert(Tool::Llm);
                }
                info!(issues = issues.len(), "LLM phase complete");
                self.emit(PipelineEvent::PhaseCompleted {
                    analysis_id,
                    phase: Phase::Llm,
                    issues: issues.len(),
                })
                .await;
                (issues, LlmStatus::Completed)
            }
            Err(e) => {
                let status = match e {
                    SourceError::Timeout(_) => LlmStatus::TimedOut,
                    SourceError::Cancelled => LlmStatus::Cancelled,
                    _ => LlmStatus::Failed,
                };
                warn!(source = source.name(), error = %e, "LLM phase failed (non-fatal)");
                self.skip_llm(analysis_id, status).await
            }
        }
    }

    async fn skip_llm(&self, analysis_id: Uuid, status: LlmStatus) -> (Vec<Issue>, LlmStatus) {
        self.emit(PipelineEvent::LlmSkipped {
            analysis_id,
            status,
        })
        .await;
        (Vec::new(), status)
    }

    /// Emit pipeline event if channel configured
    async fn emit(&self, event: PipelineEvent) {
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(event).await;
        }
    }
}

fn within_budget<T>(
    result: Result<SourceResult<T>, tokio::time::error::Elapsed>,
    budget: Duration,
) -> SourceResult<T> {
    result.unwrap_or(Err(SourceError::Timeout(budget)))
}

/// Seconds rounded to two decimals
fn round_seconds(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 100.0).round() / 100.0
}

// ============================================================================
// Tests
// ============================================================================
