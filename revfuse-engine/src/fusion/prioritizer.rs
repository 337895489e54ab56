// Issue Prioritizer - Deterministic Stable Ordering
//
// Sort key: (severity rank, category rank, line), ascending.

use crate::types::{Category, Issue, Severity};

/// critical < medium < low < anything else
pub fn severity_rank(severity: &Severity) -> u8 {
    match severity {
        Severity::Critical => 0,
        Severity::Medium => 1,
        Severity::Low => 2,
        Severity::Other(_) => 3,
    }
}

/// bug = security < logic < performance < style < uncategorized
pub fn category_rank(category: Option<Category>) -> u8 {
    match category {
        Some(Category::Bug) | Some(Category::Security) => 0,
        Some(Category::Logic) => 1,
        Some(Category::Performance) => 2,
        Some(Category::Style) => 3,
        None => 4,
    }
}

/// Full priority key for one finding
pub fn priority_key(issue: &Issue) -> (u8, u8, u32) {
    (
        severity_rank(&issue.severity),
        category_rank(issue.category),
        issue.line,
    )
}

/// Stable sort by priority; equal keys keep their incoming order
pub fn prioritize(issues: &mut [Issue]) {
    issues.sort_by_key(priority_key);
}
