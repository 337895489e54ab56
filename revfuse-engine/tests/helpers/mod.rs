//! Test Helper Utilities
//!
//! Fake findings sources for exercising the pipeline without external tools
//! or network access.

#![allow(dead_code)]

use async_trait::async_trait;
use revfuse_engine::error::{SourceError, SourceResult};
use revfuse_engine::sources::{LlmSource, StaticSource};
use revfuse_engine::types::{Issue, StaticReport};
use revfuse_engine::LlmCapability;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Static source returning a fixed list of findings
pub struct FixedStaticSource {
    issues: Vec<Issue>,
}

impl FixedStaticSource {
    pub fn new(issues: Vec<Issue>) -> Self {
        Self { issues }
    }
}

#[async_trait]
impl StaticSource for FixedStaticSource {
    fn name(&self) -> &'static str {
        "FixedStatic"
    }

    async fn analyze(&self, _code: &str) -> SourceResult<StaticReport> {
        Ok(StaticReport::from_issues(self.issues.clone()))
    }
}

/// Static source that always fails
pub struct FailingStaticSource;

#[async_trait]
impl StaticSource for FailingStaticSource {
    fn name(&self) -> &'static str {
        "FailingStatic"
    }

    async fn analyze(&self, _code: &str) -> SourceResult<StaticReport> {
        Err(SourceError::Tool("analyzer crashed".to_string()))
    }
}

/// LLM source returning fixed findings and recording every call
///
/// Clones share the call log.
#[derive(Clone, Default)]
pub struct RecordingLlmSource {
    issues: Vec<Issue>,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
    hints: Arc<Mutex<Vec<usize>>>,
}

impl RecordingLlmSource {
    pub fn new(issues: Vec<Issue>) -> Self {
        Self {
            issues,
            ..Default::default()
        }
    }

    /// Sleep before answering (drives timeout and cancellation tests)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of static findings passed to each call
    pub fn hint_counts(&self) -> Vec<usize> {
        self.hints.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmSource for RecordingLlmSource {
    fn name(&self) -> &'static str {
        "RecordingLlm"
    }

    async fn analyze(&self, _code: &str, static_issues: &[Issue]) -> SourceResult<Vec<Issue>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.hints.lock().unwrap().push(static_issues.len());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.issues.clone())
    }
}

/// LLM source whose calls always fail
#[derive(Clone, Default)]
pub struct FailingLlmSource {
    calls: Arc<AtomicUsize>,
}

impl FailingLlmSource {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmSource for FailingLlmSource {
    fn name(&self) -> &'static str {
        "FailingLlm"
    }

    async fn analyze(&self, _code: &str, _static_issues: &[Issue]) -> SourceResult<Vec<Issue>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(SourceError::Api("HTTP 503 Service Unavailable".to_string()))
    }
}

/// Wrap a source as an available capability
pub fn available<S: LlmSource + 'static>(source: S) -> LlmCapability {
    LlmCapability::Available(Arc::new(source))
}

/// Capability for a source that failed to initialize
pub fn unavailable() -> LlmCapability {
    LlmCapability::Unavailable {
        reason: "API key not configured".to_string(),
    }
}

/// Ten-line program used across scenarios
pub const SAMPLE_CODE: &str = "def divide(a, b):\n    return a / b\n\nresult = divide(10, 0)\nprint(undefined_var)\n\nimport os\nos.system(input())\n\nx=1";

pub fn static_issue(line: u32, severity: &str, kind: &str, message: &str) -> Issue {
    Issue::new(kind, severity, line, message).with_tool(revfuse_engine::Tool::Static)
}

pub fn llm_issue(line: u32, severity: &str, kind: &str, message: &str) -> Issue {
    Issue::new(kind, severity, line, message).with_tool(revfuse_engine::Tool::Llm)
}
