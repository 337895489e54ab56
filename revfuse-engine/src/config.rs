//! Configuration resolution for revfuse-engine
//!
//! Turns a loaded `TomlConfig` into ready-to-run sources and a pipeline.
//! API key resolution uses ENV → TOML priority.

use crate::sources::{ChatCompletionsSource, ExternalToolSource};
use crate::workflow::{AnalysisRequest, LlmCapability, Pipeline};
use revfuse_common::config::TomlConfig;
use revfuse_common::{Error, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Primary environment variable for the LLM API key
pub const LLM_API_KEY_ENV_VAR: &str = "REVFUSE_LLM_API_KEY";

/// Provider-specific fallback environment variable
pub const GROQ_API_KEY_ENV_VAR: &str = "GROQ_API_KEY";

/// Resolve the LLM API key from configuration tiers
///
/// **Priority:** `REVFUSE_LLM_API_KEY` → `GROQ_API_KEY` → TOML `[llm] api_key`
///
/// Returns `None` when no tier holds a valid key; the LLM source is then
/// reported unavailable rather than failing startup.
pub fn resolve_llm_api_key(toml_config: &TomlConfig) -> Option<String> {
    let candidates = [
        (LLM_API_KEY_ENV_VAR, std::env::var(LLM_API_KEY_ENV_VAR).ok()),
        (GROQ_API_KEY_ENV_VAR, std::env::var(GROQ_API_KEY_ENV_VAR).ok()),
        ("TOML", toml_config.llm.api_key.clone()),
    ];

    let mut valid = candidates
        .into_iter()
        .filter_map(|(source, key)| key.filter(|k| is_valid_key(k)).map(|k| (source, k)));

    let (source, key) = valid.next()?;

    // Warn if multiple sources (potential misconfiguration)
    let ignored: Vec<&str> = valid.map(|(source, _)| source).collect();
    if !ignored.is_empty() {
        warn!(
            "LLM API key found in multiple sources. Using {} (highest priority), ignoring: {}",
            source,
            ignored.join(", ")
        );
    }

    info!("LLM API key loaded from {}", source);
    Some(key)
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Build the static source from `[static_tool]`
///
/// # Errors
/// `Error::Config` when no program is configured, since the static phase is
/// mandatory.
pub fn build_static_source(toml_config: &TomlConfig) -> Result<ExternalToolSource> {
    let program = toml_config
        .static_tool
        .program
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| {
            Error::Config(
                "Static analysis tool not configured. Add to the config file:\n\
                 \n\
                 [static_tool]\n\
                 program = \"your-analyzer\"\n\
                 args = [\"--json\"]"
                    .to_string(),
            )
        })?;

    Ok(ExternalToolSource::new(
        program,
        toml_config.static_tool.args.clone(),
    ))
}

/// Probe the LLM source once from `[llm]` and the resolved key
pub fn build_llm_capability(toml_config: &TomlConfig) -> LlmCapability {
    let api_key = resolve_llm_api_key(toml_config);
    LlmCapability::probe(ChatCompletionsSource::new(&toml_config.llm, api_key))
}

/// Build a pipeline wired to the configured sources
pub fn build_pipeline(toml_config: &TomlConfig) -> Result<Pipeline> {
    let static_source = build_static_source(toml_config)?;
    let llm = build_llm_capability(toml_config);
    Ok(Pipeline::new(Arc::new(static_source), llm))
}

/// Default per-invocation options from `[pipeline]`
pub fn pipeline_request(toml_config: &TomlConfig) -> AnalysisRequest {
    AnalysisRequest {
        use_llm: toml_config.pipeline.use_llm,
        max_llm_time: Duration::from_secs(toml_config.pipeline.max_llm_time_secs),
        cancel: None,
    }
}
