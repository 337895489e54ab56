//! Core Types for revfuse
//!
//! Defines the finding record shared by both sources and the terminal
//! analysis result:
//! - **Issue**: one finding (static or LLM origin)
//! - **StaticReport**: static source output
//! - **AnalysisResult**: fused issues + summary + metadata
//!
//! Deserialization is lenient: findings come from external tools and model
//! output, so missing or oddly-typed fields are defaulted instead of
//! rejecting the whole batch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Severity / Category / Tool
// ============================================================================

/// Finding urgency
///
/// Unrecognized values are kept verbatim in `Other` and sort after `Low`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Severity {
    Critical,
    Medium,
    Low,
    Other(String),
}

impl Severity {
    pub fn as_str(&self) -> &str {
        match self {
            Severity::Critical => "critical",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Other(raw) => raw,
        }
    }
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Low
    }
}

impl From<String> for Severity {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "critical" => Severity::Critical,
            "medium" => Severity::Medium,
            "low" => Severity::Low,
            _ => Severity::Other(raw),
        }
    }
}

impl From<&str> for Severity {
    fn from(raw: &str) -> Self {
        Severity::from(raw.to_string())
    }
}

impl From<Severity> for String {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Defect class assigned during enrichment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Bug,
    Security,
    Performance,
    Logic,
    Style,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Bug,
        Category::Security,
        Category::Performance,
        Category::Logic,
        Category::Style,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Bug => "bug",
            Category::Security => "security",
            Category::Performance => "performance",
            Category::Logic => "logic",
            Category::Style => "style",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Category::ALL.into_iter().find(|c| c.as_str() == raw)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Origin of a finding (absent implies static)
///
/// Unrecognized tags are kept verbatim in `Other` and counted as static.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Tool {
    Static,
    Llm,
    Other(String),
}

impl Tool {
    pub fn as_str(&self) -> &str {
        match self {
            Tool::Static => "static",
            Tool::Llm => "llm",
            Tool::Other(raw) => raw,
        }
    }
}

impl From<String> for Tool {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "static" => Tool::Static,
            "llm" => Tool::Llm,
            _ => Tool::Other(raw),
        }
    }
}

impl From<&str> for Tool {
    fn from(raw: &str) -> Self {
        Tool::from(raw.to_string())
    }
}

impl From<Tool> for String {
    fn from(tool: Tool) -> Self {
        match tool {
            Tool::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

// ============================================================================
// Issue
// ============================================================================

/// One reported finding
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Source-specific type tag (e.g. "security", "syntax_error", "logic_error")
    #[serde(rename = "type", alias = "kind", default, deserialize_with = "lenient_string")]
    pub kind: String,

    #[serde(default, deserialize_with = "lenient_severity")]
    pub severity: Severity,

    /// 1-indexed source line, 0 = unknown
    #[serde(default, deserialize_with = "lenient_line")]
    pub line: u32,

    #[serde(default, deserialize_with = "lenient_string")]
    pub message: String,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_tool"
    )]
    pub tool: Option<Tool>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_opt_string"
    )]
    pub explanation: Option<String>,

    /// Fix proposed by the source itself (LLM findings)
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_opt_string"
    )]
    pub fix: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_opt_string"
    )]
    pub code_snippet: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_opt_string"
    )]
    pub context: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_category"
    )]
    pub category: Option<Category>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_opt_string"
    )]
    pub learning_tip: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_opt_string"
    )]
    pub llm_explanation: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_opt_string"
    )]
    pub suggested_fix: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_opt_string"
    )]
    pub example: Option<String>,

    /// Set when a static finding absorbed an LLM finding
    #[serde(
        default,
        skip_serializing_if = "is_false",
        deserialize_with = "lenient_bool"
    )]
    pub enhanced_by_llm: bool,

    /// Adapter-specific fields (e.g. pylint symbol, bandit test id)
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Issue {
    /// Create a finding with the required fields
    pub fn new(
        kind: impl Into<String>,
        severity: impl Into<Severity>,
        line: u32,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            severity: severity.into(),
            line,
            message: message.into(),
            ..Default::default()
        }
    }

    /// Set the origin tag
    pub fn with_tool(mut self, tool: Tool) -> Self {
        self.tool = Some(tool);
        self
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    pub fn with_fix(mut self, fix: impl Into<String>) -> Self {
        self.fix = Some(fix.into());
        self
    }

    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.example = Some(example.into());
        self
    }

    /// True when the finding came from the LLM source
    pub fn is_llm(&self) -> bool {
        self.tool == Some(Tool::Llm)
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    })
}

/// Text-ish value: strings kept, string arrays joined by newline, null dropped
fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Array(items))
            if items.iter().all(serde_json::Value::is_string) =>
        {
            let parts: Vec<&str> = items.iter().filter_map(serde_json::Value::as_str).collect();
            Some(parts.join("\n"))
        }
        Some(other) => Some(other.to_string()),
    })
}

fn lenient_tool<'de, D>(deserializer: D) -> Result<Option<Tool>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = lenient_opt_string(deserializer)?;
    Ok(raw.filter(|r| !r.is_empty()).map(Tool::from))
}

/// Booleans, "true"/"false" strings and numbers; anything else is false
fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Bool(b)) => b,
        Some(serde_json::Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
        Some(serde_json::Value::Number(n)) => n.as_f64().map_or(false, |f| f != 0.0),
        _ => false,
    })
}

fn lenient_severity<'de, D>(deserializer: D) -> Result<Severity, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = lenient_string(deserializer)?;
    if raw.is_empty() {
        Ok(Severity::default())
    } else {
        Ok(Severity::from(raw))
    }
}

fn lenient_line<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let line = match value {
        Some(serde_json::Value::Number(n)) => n.as_u64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    Ok(line.and_then(|l| u32::try_from(l).ok()).unwrap_or(0))
}

fn lenient_category<'de, D>(deserializer: D) -> Result<Option<Category>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = lenient_string(deserializer)?;
    Ok(Category::parse(&raw))
}

// ============================================================================
// Static source output
// ============================================================================

/// Output of the static findings source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticReport {
    pub issues: Vec<Issue>,
    pub summary: StaticSummary,
}

impl StaticReport {
    /// Build a report, computing the summary from the issues
    pub fn from_issues(issues: Vec<Issue>) -> Self {
        let summary = StaticSummary::from_issues(&issues);
        Self { issues, summary }
    }
}

/// Severity counts reported by the static source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticSummary {
    pub total: usize,
    pub critical: usize,
    pub medium: usize,
    pub low: usize,
}

impl StaticSummary {
    pub fn from_issues(issues: &[Issue]) -> Self {
        let count = |s: Severity| issues.iter().filter(|i| i.severity == s).count();
        Self {
            total: issues.len(),
            critical: count(Severity::Critical),
            medium: count(Severity::Medium),
            low: count(Severity::Low),
        }
    }
}

// ============================================================================
// Analysis result
// ============================================================================

/// Terminal pipeline output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Fused issues in final priority order
    pub issues: Vec<Issue>,
    pub summary: Summary,
    pub metadata: AnalysisMetadata,
}

/// Aggregate counts over the fused issues
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub by_severity: SeverityCounts,
    pub by_category: CategoryCounts,
    pub by_tool: ToolCounts,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub critical: usize,
    pub medium: usize,
    pub low: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub bug: usize,
    pub security: usize,
    pub logic: usize,
    pub performance: usize,
    pub style: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCounts {
    #[serde(rename = "static")]
    pub static_: usize,
    pub llm: usize,
    pub enhanced: usize,
}

/// Outcome of the LLM phase for one invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmStatus {
    /// LLM call returned findings (possibly none)
    Completed,
    /// Caller did not request the LLM phase
    NotRequested,
    /// LLM source failed to initialize for this pipeline
    Unavailable,
    /// LLM call returned an error
    Failed,
    /// LLM call exceeded the time budget
    TimedOut,
    /// Caller cancelled the invocation during the LLM call
    Cancelled,
}

/// Invocation metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    /// Wall-clock seconds for the whole pipeline, 2 decimals
    pub execution_time: f64,
    /// Static findings before fusion
    pub static_issues: usize,
    /// LLM findings before fusion
    pub llm_issues: usize,
    pub total_unique_issues: usize,
    pub llm_used: bool,
    pub code_lines: usize,
    pub llm_status: LlmStatus,
    pub analysis_id: Uuid,
    pub analyzed_at: DateTime<Utc>,
}

// ============================================================================
// Tests
// ============================================================================
