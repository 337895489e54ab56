//! revfuse - Code review fusion CLI
//!
//! Runs a static analyzer and an optional LLM reviewer over one source file
//! and prints the fused, prioritized findings as JSON.
//!
//! Logs go to stderr so stdout stays machine-readable.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

use revfuse_common::config::{load_config, TomlConfig};
use revfuse_engine::config::{
    build_llm_capability, build_pipeline, build_static_source, pipeline_request,
};
use revfuse_engine::sources::LlmSource;
use revfuse_engine::LlmCapability;

/// Log level used until the config file has been read
const DEFAULT_LOG_LEVEL: &str = "info";

/// Command-line arguments for revfuse
#[derive(Parser, Debug)]
#[command(name = "revfuse")]
#[command(about = "Fuse static analysis and LLM review findings")]
#[command(version)]
struct Args {
    /// Config file (overrides REVFUSE_CONFIG and the default location)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a source file
    Analyze {
        /// Source file to analyze
        file: PathBuf,

        /// Skip the LLM phase
        #[arg(long)]
        no_llm: bool,

        /// Time budget for the LLM phase in seconds
        #[arg(long, value_name = "SECS")]
        max_llm_time: Option<u64>,

        /// Write the JSON result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the resolved configuration and LLM availability
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing before loading config so its messages are kept;
    // the configured level applies once known unless RUST_LOG is set
    let env_filter = EnvFilter::try_from_default_env();
    let filter_from_env = env_filter.is_ok();
    let (filter, filter_handle) =
        reload::Layer::new(env_filter.unwrap_or_else(|_| default_filter(DEFAULT_LOG_LEVEL)));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = load_config(args.config.as_deref()).context("Failed to load configuration")?;
    if !filter_from_env {
        filter_handle
            .reload(default_filter(&config.logging.level))
            .context("Failed to apply configured log level")?;
    }

    match args.command {
        Command::Analyze {
            file,
            no_llm,
            max_llm_time,
            output,
        } => analyze(&config, &file, no_llm, max_llm_time, output.as_deref()).await,
        Command::CheckConfig => check_config(&config),
    }
}

/// Filter for this binary and its workspace crates at one level
fn default_filter(level: &str) -> EnvFilter {
    EnvFilter::new(format!(
        "revfuse={level},revfuse_engine={level},revfuse_common={level}",
        level = level
    ))
}

async fn analyze(
    config: &TomlConfig,
    file: &Path,
    no_llm: bool,
    max_llm_time: Option<u64>,
    output: Option<&Path>,
) -> Result<()> {
    let code = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let pipeline = build_pipeline(config).context("Failed to initialize pipeline")?;

    let cancel = CancellationToken::new();
    let mut request = pipeline_request(config).with_cancellation(cancel.clone());
    if no_llm {
        request.use_llm = false;
    }
    if let Some(secs) = max_llm_time {
        request.max_llm_time = Duration::from_secs(secs);
    }

    info!(file = %file.display(), "Analyzing");

    // Ctrl+C abandons the LLM phase; static findings are still reported
    let interrupt = tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            warn!("Received Ctrl+C, cancelling LLM phase");
            cancel.cancel();
        }
    });

    let result = pipeline.analyze(&code, &request).await;
    interrupt.abort();
    let result = result.context("Analysis failed")?;

    let json = serde_json::to_string_pretty(&result).context("Failed to serialize result")?;
    match output {
        Some(path) => {
            tokio::fs::write(path, format!("{}\n", json))
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(
                output = %path.display(),
                total = result.summary.total,
                "Result written"
            );
        }
        None => println!("{}", json),
    }

    Ok(())
}

fn check_config(config: &TomlConfig) -> Result<()> {
    let rendered =
        toml::to_string_pretty(&config.redacted()).context("Failed to render configuration")?;
    println!("{}", rendered);

    match build_llm_capability(config) {
        LlmCapability::Available(source) => {
            println!("LLM source: available ({})", source.name());
        }
        LlmCapability::Unavailable { reason } => {
            println!("LLM source: unavailable ({})", reason);
        }
    }

    match build_static_source(config) {
        Ok(source) => println!("Static tool: {}", source.program()),
        Err(e) => println!("Static tool: not configured ({})", e),
    }

    Ok(())
}
