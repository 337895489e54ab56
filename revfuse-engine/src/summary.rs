//! Summary Aggregator
//!
//! Counts fused findings by severity, category and origin. Unrecognized
//! severities and missing categories count only toward `total`.

use crate::types::{Category, Issue, Severity, Summary, Tool};

/// Compute aggregate counts over the final issue list
pub fn summarize(issues: &[Issue]) -> Summary {
    let mut summary = Summary {
        total: issues.len(),
        ..Default::default()
    };

    for issue in issues {
        match issue.severity {
            Severity::Critical => summary.by_severity.critical += 1,
            Severity::Medium => summary.by_severity.medium += 1,
            Severity::Low => summary.by_severity.low += 1,
            Severity::Other(_) => {}
        }

        match issue.category {
            Some(Category::Bug) => summary.by_category.bug += 1,
            Some(Category::Security) => summary.by_category.security += 1,
            Some(Category::Logic) => summary.by_category.logic += 1,
            Some(Category::Performance) => summary.by_category.performance += 1,
            Some(Category::Style) => summary.by_category.style += 1,
            None => {}
        }

        if issue.enhanced_by_llm {
            summary.by_tool.enhanced += 1;
        } else if issue.tool == Some(Tool::Llm) {
            summary.by_tool.llm += 1;
        } else {
            summary.by_tool.static_ += 1;
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categorized(severity: &str, category: Category) -> Issue {
        let mut issue = Issue::new("warning", severity, 1, "m");
        issue.category = Some(category);
        issue
    }

    #[test]
    fn test_empty_summary() {
        let summary = summarize(&[]);
        assert_eq!(summary, Summary::default());
    }

    #[test]
    fn test_counts_by_severity_and_category() {
        let issues = vec![
            categorized("critical", Category::Security),
            categorized("critical", Category::Bug),
            categorized("medium", Category::Logic),
            categorized("low", Category::Style),
            categorized("blocker", Category::Performance),
        ];
        let summary = summarize(&issues);

        assert_eq!(summary.total, 5);
        assert_eq!(summary.by_severity.critical, 2);
        assert_eq!(summary.by_severity.medium, 1);
        assert_eq!(summary.by_severity.low, 1);
        assert_eq!(summary.by_category.security, 1);
        assert_eq!(summary.by_category.bug, 1);
        assert_eq!(summary.by_category.logic, 1);
        assert_eq!(summary.by_category.style, 1);
        assert_eq!(summary.by_category.performance, 1);
    }

    #[test]
    fn test_tool_buckets() {
        let mut enhanced_llm = Issue::new("bug", "low", 1, "a").with_tool(Tool::Llm);
        enhanced_llm.enhanced_by_llm = true;
        let mut enhanced_static = Issue::new("warning", "low", 2, "b");
        enhanced_static.enhanced_by_llm = true;

        let issues = vec![
            enhanced_llm,
            enhanced_static,
            Issue::new("bug", "low", 3, "c").with_tool(Tool::Llm),
            Issue::new("warning", "low", 4, "d"),
            Issue::new("warning", "low", 5, "e").with_tool(Tool::Static),
            Issue::new("warning", "low", 6, "f").with_tool(Tool::Other("bandit".to_string())),
        ];
        let summary = summarize(&issues);

        assert_eq!(summary.by_tool.enhanced, 2);
        assert_eq!(summary.by_tool.llm, 1);
        assert_eq!(summary.by_tool.static_, 3);
    }
}
