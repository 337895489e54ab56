// Issue Merger - Signature Dedup + Cross-Source Similarity Merge
//
// Static findings are deduplicated by signature and inserted first; LLM
// findings are then folded into a similar existing entry or appended.

use crate::types::Issue;
use std::collections::HashSet;
use tracing::debug;

/// Number of message characters that take part in the signature
pub const SIGNATURE_PREFIX_CHARS: usize = 50;

/// Overlap ratio that must be exceeded for two messages to be similar
pub const SIMILARITY_THRESHOLD: f64 = 0.5;

/// Duplicate-detection key: `(line, lowercase message prefix)`
pub fn signature(issue: &Issue) -> (u32, String) {
    let prefix: String = issue
        .message
        .to_lowercase()
        .chars()
        .take(SIGNATURE_PREFIX_CHARS)
        .collect();
    (issue.line, prefix)
}

/// Drop findings whose signature was already seen (first occurrence wins)
pub fn dedupe(issues: Vec<Issue>) -> Vec<Issue> {
    let mut seen = HashSet::new();
    let before = issues.len();
    let unique: Vec<Issue> = issues
        .into_iter()
        .filter(|issue| seen.insert(signature(issue)))
        .collect();

    if unique.len() < before {
        debug!(
            dropped = before - unique.len(),
            "Dropped duplicate static findings"
        );
    }
    unique
}

fn tokens(message: &str) -> HashSet<String> {
    message
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Two findings describe the same defect
///
/// Same line, and the shared word count divided by the smaller word set
/// exceeds [`SIMILARITY_THRESHOLD`]. Exactly half is not similar.
pub fn are_similar(a: &Issue, b: &Issue) -> bool {
    if a.line != b.line {
        return false;
    }

    let words_a = tokens(&a.message);
    let words_b = tokens(&b.message);
    if words_a.is_empty() || words_b.is_empty() {
        return false;
    }

    let overlap = words_a.intersection(&words_b).count();
    let min_words = words_a.len().min(words_b.len());
    (overlap as f64 / min_words as f64) > SIMILARITY_THRESHOLD
}

/// Fold LLM insights into an existing finding
///
/// The existing entry keeps its kind, severity, line and tool.
pub fn absorb(existing: &mut Issue, llm_issue: &Issue) {
    if let Some(explanation) = &llm_issue.explanation {
        existing.llm_explanation = Some(explanation.clone());
    }
    if let Some(fix) = &llm_issue.fix {
        existing.suggested_fix = Some(fix.clone());
    }
    if let Some(example) = &llm_issue.example {
        existing.example = Some(example.clone());
    }
    existing.enhanced_by_llm = true;
}

/// Merge static and LLM findings into one list
///
/// Static findings are deduplicated and inserted first in original order;
/// LLM findings are processed in their given order against everything
/// accumulated so far (including earlier appended LLM findings).
pub fn merge_issues(static_issues: Vec<Issue>, llm_issues: Vec<Issue>) -> Vec<Issue> {
    let mut merged = dedupe(static_issues);

    for llm_issue in llm_issues {
        match merged.iter_mut().find(|existing| are_similar(&llm_issue, existing)) {
            Some(existing) => {
                debug!(
                    line = existing.line,
                    message = %existing.message,
                    "LLM finding merged into existing finding"
                );
                absorb(existing, &llm_issue);
            }
            None => merged.push(llm_issue),
        }
    }

    merged
}
