//! External Tool Source (static findings)
//!
//! Runs a configured command with the code on stdin and reads a JSON report
//! from stdout. Two output shapes are accepted:
//! - a report object: `{"issues": [...], "summary": {...}}` (summary optional)
//! - a bare array of issues
//!
//! Empty output means no findings. A non-zero exit status is a failure.

use crate::error::{SourceError, SourceResult};
use crate::sources::StaticSource;
use crate::types::{Issue, StaticReport, StaticSummary};
use async_trait::async_trait;
use serde_json::Value;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Static source backed by an external command
#[derive(Debug, Clone)]
pub struct ExternalToolSource {
    program: String,
    args: Vec<String>,
}

impl ExternalToolSource {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

/// Decode findings one by one; entries that are not objects are skipped
fn decode_issues(items: Vec<Value>) -> Vec<Issue> {
    items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(_) => match serde_json::from_value::<Issue>(item) {
                Ok(issue) => Some(issue),
                Err(e) => {
                    warn!("Skipping malformed static finding: {}", e);
                    None
                }
            },
            other => {
                warn!("Skipping non-object static finding: {}", other);
                None
            }
        })
        .collect()
}

/// Parse the tool's stdout into a report
///
/// Only output that is not a report at all is an error. Individual
/// malformed findings and an unreadable summary degrade instead.
pub fn parse_report(stdout: &[u8]) -> SourceResult<StaticReport> {
    if stdout.iter().all(u8::is_ascii_whitespace) {
        return Ok(StaticReport::default());
    }

    let value: Value = serde_json::from_slice(stdout)
        .map_err(|e| SourceError::Parse(format!("Tool output is not JSON: {}", e)))?;

    match value {
        Value::Array(items) => Ok(StaticReport::from_issues(decode_issues(items))),
        Value::Object(mut object) => {
            let issues = match object.remove("issues") {
                Some(Value::Array(items)) => decode_issues(items),
                None | Some(Value::Null) => Vec::new(),
                Some(other) => {
                    return Err(SourceError::Parse(format!(
                        "Expected an issue array under \"issues\", got: {}",
                        other
                    )))
                }
            };

            let summary = object
                .remove("summary")
                .filter(|v| !v.is_null())
                .and_then(|v| match serde_json::from_value::<StaticSummary>(v) {
                    Ok(summary) => Some(summary),
                    Err(e) => {
                        warn!("Ignoring unreadable tool summary, recomputing: {}", e);
                        None
                    }
                });

            Ok(match summary {
                Some(summary) => StaticReport { issues, summary },
                None => StaticReport::from_issues(issues),
            })
        }
        other => Err(SourceError::Parse(format!(
            "Expected a report object or issue array, got: {}",
            other
        ))),
    }
}

#[async_trait]
impl StaticSource for ExternalToolSource {
    fn name(&self) -> &'static str {
        "ExternalTool"
    }

    async fn analyze(&self, code: &str) -> SourceResult<StaticReport> {
        debug!(program = %self.program, args = ?self.args, "Running static tool");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| SourceError::Tool(format!("Failed to spawn '{}': {}", self.program, e)))?;

        // Feed stdin concurrently so a tool that writes before draining
        // its input cannot deadlock against us.
        let writer = child.stdin.take().map(|mut stdin| {
            let input = code.to_owned();
            tokio::spawn(async move {
                stdin.write_all(input.as_bytes()).await?;
                stdin.shutdown().await
            })
        });

        let output = child.wait_with_output().await?;

        if let Some(writer) = writer {
            match writer.await {
                Ok(Ok(())) => {}
                // Tools that ignore stdin close the pipe early
                Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
                Ok(Err(e)) => return Err(SourceError::Io(e)),
                Err(e) => return Err(SourceError::Tool(format!("stdin writer failed: {}", e))),
            }
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SourceError::Tool(format!(
                "'{}' exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let report = parse_report(&output.stdout)?;
        info!(
            program = %self.program,
            issues = report.issues.len(),
            "Static tool complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Severity;

    #[test]
    fn test_parse_empty_output() {
        let report = parse_report(b"  \n").unwrap();
        assert!(report.issues.is_empty());
        assert_eq!(report.summary.total, 0);
    }

    #[test]
    fn test_parse_bare_array() {
        let report = parse_report(
            br#"[{"type": "error", "severity": "critical", "line": 3, "message": "x undefined"}]"#,
        )
        .unwrap();
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].severity, Severity::Critical);
        assert_eq!(report.summary.critical, 1);
    }

    #[test]
    fn test_parse_report_recomputes_missing_summary() {
        let report = parse_report(
            br#"{"issues": [{"severity": "low", "line": 1, "message": "a"}, {"severity": "medium", "line": 2, "message": "b"}]}"#,
        )
        .unwrap();
        assert_eq!(report.summary.total, 2);
        assert_eq!(report.summary.low, 1);
        assert_eq!(report.summary.medium, 1);
    }

    #[test]
    fn test_parse_report_keeps_given_summary() {
        let report = parse_report(br#"{"issues": [], "summary": {"total": 0, "critical": 0}}"#).unwrap();
        assert_eq!(report.summary, StaticSummary::default());
    }

    #[test]
    fn test_mixed_batch_degrades_per_finding() {
        let report = parse_report(
            br#"[
                {"type": "warning", "severity": "low", "line": 1, "message": "a"},
                {"type": "warning", "severity": "low", "line": 2, "message": "b", "explanation": {"detail": "x"}},
                "not a finding"
            ]"#,
        )
        .unwrap();

        assert_eq!(report.issues.len(), 2);
        assert_eq!(report.issues[0].message, "a");
        assert_eq!(
            report.issues[1].explanation.as_deref(),
            Some(r#"{"detail":"x"}"#)
        );
        assert_eq!(report.summary.total, 2);
    }

    #[test]
    fn test_unreadable_summary_is_recomputed() {
        let report = parse_report(
            br#"{"issues": [{"severity": "critical", "line": 1, "message": "a"}], "summary": {"total": "many"}}"#,
        )
        .unwrap();
        assert_eq!(report.summary.total, 1);
        assert_eq!(report.summary.critical, 1);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(parse_report(b"not json"), Err(SourceError::Parse(_))));
        assert!(matches!(parse_report(b"42"), Err(SourceError::Parse(_))));
        assert!(matches!(
            parse_report(br#"{"issues": "none"}"#),
            Err(SourceError::Parse(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_runs_command_with_code_on_stdin() {
        // Echo the line count of stdin back as a single finding
        let source = ExternalToolSource::new(
            "sh",
            vec![
                "-c".to_string(),
                r#"n=$(wc -l | tr -d ' '); printf '[{"type":"convention","severity":"low","line":%s,"message":"stdin lines"}]' "$n""#
                    .to_string(),
            ],
        );

        let report = source.analyze("a = 1\nb = 2\n").await.unwrap();
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].line, 2);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_is_tool_error() {
        let source = ExternalToolSource::new(
            "sh",
            vec!["-c".to_string(), "cat >/dev/null; echo boom >&2; exit 3".to_string()],
        );

        let err = source.analyze("x").await.unwrap_err();
        match err {
            SourceError::Tool(msg) => assert!(msg.contains("boom"), "unexpected: {}", msg),
            other => panic!("expected tool error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_program_is_tool_error() {
        let source = ExternalToolSource::new("revfuse-no-such-program-xyz", vec![]);
        assert!(matches!(source.analyze("x").await, Err(SourceError::Tool(_))));
    }
}
