//! Fusion and summary behavior through the public API
//!
//! Scenario-style checks of the merge → enrich → prioritize chain and the
//! aggregate counts built from it.

mod helpers;

use helpers::*;
use revfuse_engine::fusion::{categorize, dedupe, learning_tip, merge_issues};
use revfuse_engine::{fuse_issues, summarize, Category, Issue, Severity, Tool};

#[test]
fn test_every_fused_issue_has_one_of_five_categories() {
    let static_issues = vec![
        static_issue(1, "low", "security", "hardcoded password"),
        static_issue(2, "medium", "syntax_error", "invalid syntax"),
        static_issue(3, "low", "warning", "slow loop"),
        static_issue(4, "low", "warning", "possible edge case"),
        static_issue(5, "low", "warning", ""),
    ];
    let llm_issues = vec![Issue::new("", "weird", 0, "")];

    let fused = fuse_issues(static_issues, llm_issues, SAMPLE_CODE);

    assert_eq!(fused.len(), 6);
    for issue in &fused {
        let category = issue.category.expect("category assigned");
        assert!(Category::ALL.contains(&category));
        assert_eq!(
            issue.learning_tip.as_deref(),
            Some(learning_tip(Some(category)))
        );
    }
}

#[test]
fn test_dedupe_keeps_first_occurrence_in_order() {
    let issues = vec![
        static_issue(3, "low", "warning", "Line too long (120/100)"),
        static_issue(1, "medium", "warning", "Unused import os"),
        static_issue(3, "critical", "error", "LINE TOO LONG (120/100)"),
        static_issue(1, "medium", "warning", "Unused import os"),
    ];

    let deduped = dedupe(issues);

    assert_eq!(deduped.len(), 2);
    assert_eq!(deduped[0].line, 3);
    assert_eq!(deduped[0].severity, Severity::Low);
    assert_eq!(deduped[1].line, 1);
}

#[test]
fn test_overlapping_static_messages_collapse_before_llm_merge() {
    let prefix = "Variable 'total' is assigned but never used in this function body";
    let static_issues = vec![
        static_issue(5, "medium", "warning", &format!("{} (first pass)", prefix)),
        static_issue(5, "medium", "warning", &format!("{} (second pass)", prefix)),
    ];
    let llm_issues = vec![llm_issue(5, "low", "bug", "Variable 'total' is never used")
        .with_fix("remove the assignment")];

    let merged = merge_issues(static_issues, llm_issues);

    assert_eq!(merged.len(), 1);
    assert!(merged[0].message.ends_with("(first pass)"));
    assert!(merged[0].enhanced_by_llm);
    assert_eq!(merged[0].suggested_fix.as_deref(), Some("remove the assignment"));
}

#[test]
fn test_llm_findings_on_other_lines_are_never_merged() {
    let static_issues = vec![static_issue(4, "critical", "error", "division by zero")];
    let llm_issues = vec![llm_issue(2, "critical", "logic_error", "division by zero")];

    let fused = fuse_issues(static_issues, llm_issues, SAMPLE_CODE);

    assert_eq!(fused.len(), 2);
    assert!(fused.iter().all(|i| !i.enhanced_by_llm));
}

#[test]
fn test_summary_totals_match_issue_list() {
    let fused = fuse_issues(
        vec![
            static_issue(5, "critical", "error", "name 'undefined_var' is not defined"),
            static_issue(10, "low", "convention", "missing whitespace"),
            static_issue(7, "info", "convention", "unused import os"),
        ],
        vec![
            llm_issue(8, "critical", "security", "shell injection"),
            llm_issue(5, "medium", "bug", "undefined_var is not defined anywhere"),
        ],
        SAMPLE_CODE,
    );

    let summary = summarize(&fused);

    assert_eq!(summary.total, fused.len());
    assert_eq!(summary.total, 4);

    let tools = &summary.by_tool;
    assert_eq!(tools.static_ + tools.llm + tools.enhanced, summary.total);
    assert_eq!(tools.enhanced, 1);
    assert_eq!(tools.llm, 1);

    let categories = &summary.by_category;
    assert_eq!(
        categories.bug
            + categories.security
            + categories.logic
            + categories.performance
            + categories.style,
        summary.total
    );

    // "info" is counted in total only
    let severities = &summary.by_severity;
    assert_eq!(severities.critical, 2);
    assert_eq!(severities.low, 1);
    assert_eq!(severities.medium, 0);
    assert!(severities.critical + severities.medium + severities.low < summary.total);
}

#[test]
fn test_critical_findings_come_first() {
    let fused = fuse_issues(
        vec![
            static_issue(1, "low", "warning", "a is not defined"),
            static_issue(2, "info", "warning", "b"),
            static_issue(3, "medium", "warning", "c is slow"),
        ],
        vec![llm_issue(9, "critical", "convention", "naming")],
        SAMPLE_CODE,
    );

    let severities: Vec<&str> = fused.iter().map(|i| i.severity.as_str()).collect();
    assert_eq!(severities, vec!["critical", "medium", "low", "info"]);
    assert_eq!(fused[0].tool, Some(Tool::Llm));
}

#[test]
fn test_categorize_is_case_insensitive() {
    let issue = Issue::new("Warning", "low", 1, "Inefficient Regex Compilation");
    assert_eq!(categorize(&issue), Category::Performance);
}

#[test]
fn test_merge_without_llm_findings_equals_dedupe() {
    let static_issues = vec![
        static_issue(8, "critical", "security", "shell injection via os.system"),
        static_issue(1, "low", "warning", "unused import os"),
        static_issue(4, "medium", "warning", "division by zero risk"),
        static_issue(1, "low", "warning", "Unused import os"),
        static_issue(2, "critical", "error", "variable x is undefined"),
    ];

    let merged = merge_issues(static_issues.clone(), vec![]);
    let deduped = dedupe(static_issues);

    assert_eq!(merged, deduped);
    let lines: Vec<u32> = merged.iter().map(|i| i.line).collect();
    assert_eq!(lines, vec![8, 1, 4, 2]);
}

#[test]
fn test_llm_restatements_collapse_onto_static_findings() {
    let static_issues = vec![
        static_issue(1, "low", "warning", "unused import os"),
        static_issue(2, "critical", "error", "variable x is undefined"),
        static_issue(4, "medium", "warning", "division by zero risk"),
        static_issue(8, "critical", "security", "shell injection via os.system"),
    ];
    let llm_issues = vec![
        llm_issue(8, "medium", "bug", "shell injection via os.system call").with_fix("use subprocess.run"),
        llm_issue(1, "medium", "bug", "unused import os detected").with_fix("remove the import"),
        llm_issue(4, "low", "logic_error", "possible division by zero risk").with_fix("guard b"),
        llm_issue(2, "low", "bug", "variable x is undefined here").with_fix("define x"),
    ];

    let fused = fuse_issues(static_issues.clone(), llm_issues, SAMPLE_CODE);

    assert_eq!(fused.len(), static_issues.len());
    assert!(fused.iter().all(|i| i.enhanced_by_llm));
    assert!(fused.iter().all(|i| i.tool == Some(Tool::Static)));
    assert!(fused.iter().all(|i| i.suggested_fix.is_some()));

    // Static severities survive the merge
    let line_4 = fused.iter().find(|i| i.line == 4).unwrap();
    assert_eq!(line_4.severity, Severity::Medium);

    let summary = summarize(&fused);
    assert_eq!(summary.by_tool.enhanced, 4);
    assert_eq!(summary.by_tool.llm, 0);
    assert_eq!(summary.by_tool.static_, 0);
}
