// Fusion Module - Merge → Enrich → Prioritize
//
// Pure function of its inputs: no shared state, safe to call concurrently
// from independent invocations.

pub mod enricher;
pub mod merger;
pub mod prioritizer;

use crate::types::Issue;
use tracing::debug;

pub use enricher::{categorize, enrich_issues, learning_tip};
pub use merger::{are_similar, dedupe, merge_issues, signature};
pub use prioritizer::{prioritize, priority_key};

/// Fuse static and LLM findings into one enriched, prioritized list
///
/// # Arguments
/// * `static_issues` - Findings from the static source (may be empty)
/// * `llm_issues` - Findings from the LLM source (may be empty)
/// * `code` - Analyzed source text, used only for enrichment
pub fn fuse_issues(static_issues: Vec<Issue>, llm_issues: Vec<Issue>, code: &str) -> Vec<Issue> {
    let static_count = static_issues.len();
    let llm_count = llm_issues.len();

    let mut issues = merge_issues(static_issues, llm_issues);
    debug!(
        static_count,
        llm_count,
        merged = issues.len(),
        "Merged findings"
    );

    enrich_issues(&mut issues, code);
    prioritize(&mut issues);
    issues
}
