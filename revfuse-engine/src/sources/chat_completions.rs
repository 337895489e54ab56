//! Chat Completions Source (LLM findings)
//!
//! Asks an OpenAI-compatible chat completions endpoint (Groq by default) to
//! review the code, seeded with a few static findings as hints.
//!
//! # Availability
//! Construction fails with `SourceError::Unavailable` when no valid API key
//! is configured. The pipeline captures that result once as its LLM
//! capability.
//!
//! # API Reference
//! - Endpoint: `{base_url}/chat/completions`
//! - Auth: `Authorization: Bearer <api_key>`

use crate::error::{SourceError, SourceResult};
use crate::sources::response_parser::parse_response;
use crate::sources::LlmSource;
use crate::types::Issue;
use async_trait::async_trait;
use reqwest::Client;
use revfuse_common::config::LlmConfig;
use serde::Deserialize;
use serde_json::json;
use std::fmt::Write as _;
use std::time::Duration;
use tracing::{debug, info};

/// Reviewer instructions sent ahead of the code
const SYSTEM_PROMPT: &str = r#"You are an expert code reviewer and teacher.

Your task: Review code and find issues that automated tools might miss.

Focus on:
1. Logic errors (code that runs but gives wrong results)
2. Edge cases not handled (what if input is empty? negative?)
3. Potential bugs (undefined behavior, race conditions)
4. Best practices violations
5. Code that's hard to understand

For EACH issue you find:
- Explain WHAT is wrong
- Explain WHY it's a problem
- Explain HOW to fix it
- Rate severity: critical, medium, or low

Output format: JSON array of issues
[
{
    "type": "logic_error" | "edge_case" | "best_practice" | "bug",
    "severity": "critical" | "medium" | "low",
    "line": <line_number>,
    "message": "Brief description",
    "explanation": "Detailed explanation of WHY this is a problem",
    "fix": "How to fix it",
    "example": "Example of what could go wrong"
}
]

Be educational: Help the developer learn, not just find mistakes."#;

/// LLM source backed by a chat completions API
pub struct ChatCompletionsSource {
    http_client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    context_issue_limit: usize,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletionsSource {
    /// Create a source from configuration
    ///
    /// # Errors
    /// `SourceError::Unavailable` if the API key is missing or blank, or the
    /// HTTP client cannot be built.
    pub fn new(config: &LlmConfig, api_key: Option<String>) -> SourceResult<Self> {
        let api_key = api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                SourceError::Unavailable(
                    "LLM API key not configured. Set REVFUSE_LLM_API_KEY or GROQ_API_KEY, \
                     or add api_key under [llm] in the config file"
                        .to_string(),
                )
            })?;

        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| SourceError::Unavailable(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            context_issue_limit: config.context_issue_limit,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Build the full prompt for one review
    pub fn build_prompt(&self, code: &str, static_issues: &[Issue]) -> String {
        let mut prompt = format!("{}\n\nReview this code:\n```\n{}\n```", SYSTEM_PROMPT, code);

        if !static_issues.is_empty() && self.context_issue_limit > 0 {
            prompt.push_str("\n\nNote: Static analysis already found these issues:\n");
            for issue in static_issues.iter().take(self.context_issue_limit) {
                let line = if issue.line == 0 {
                    "N/A".to_string()
                } else {
                    issue.line.to_string()
                };
                let _ = writeln!(prompt, "- Line {}: {}", line, issue.message);
            }
            prompt.push_str("\nFocus on issues the static analyzer might have missed.\n");
        }

        prompt
    }

    async fn complete(&self, prompt: String) -> SourceResult<String> {
        let payload = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
            "top_p": 1,
            "stream": false,
        });

        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Chat completion request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            return Err(SourceError::Api(format!(
                "Chat completion failed with status {}: {}",
                status, body
            )));
        }

        extract_content(&body)
    }
}

/// Pull the first choice's message text out of a response body
fn extract_content(body: &str) -> SourceResult<String> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::Parse(format!("Invalid chat completion response: {}", e)))?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| SourceError::Parse("Chat completion response has no content".to_string()))
}

#[async_trait]
impl LlmSource for ChatCompletionsSource {
    fn name(&self) -> &'static str {
        "ChatCompletions"
    }

    async fn analyze(&self, code: &str, static_issues: &[Issue]) -> SourceResult<Vec<Issue>> {
        let prompt = self.build_prompt(code, static_issues);
        debug!(
            model = %self.model,
            prompt_chars = prompt.len(),
            hints = static_issues.len().min(self.context_issue_limit),
            "Requesting LLM review"
        );

        let content = self.complete(prompt).await?;
        let issues = parse_response(&content);

        info!(model = %self.model, issues = issues.len(), "LLM review complete");
        Ok(issues)
    }
}
