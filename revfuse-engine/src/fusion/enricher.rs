// Issue Enricher - Source Context, Categorization, Learning Tips
//
// Categorization is an ordered rule table evaluated first-match-wins;
// findings matching no rule fall back to style.

use crate::types::{Category, Issue};

/// Lines of context shown before the finding line
const CONTEXT_BEFORE: usize = 2;

/// Lines of context shown after the finding line
const CONTEXT_AFTER: usize = 2;

/// Tip used when no category-specific tip exists
pub const GENERIC_TIP: &str = "Writing good code is a skill that improves with practice!";

/// Categorization predicate over `(lowercase kind, lowercase message)`
type Predicate = fn(&str, &str) -> bool;

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

/// Ordered categorization rules
pub const CATEGORY_RULES: [(Predicate, Category); 5] = [
    (|kind, _| kind == "security", Category::Security),
    (|kind, _| kind == "syntax_error", Category::Bug),
    (
        |_, message| contains_any(message, &["undefined", "not defined", "error"]),
        Category::Bug,
    ),
    (
        |_, message| contains_any(message, &["performance", "slow", "inefficient"]),
        Category::Performance,
    ),
    (
        |_, message| contains_any(message, &["logic", "edge case", "division by zero"]),
        Category::Logic,
    ),
];

/// Assign a category using [`CATEGORY_RULES`]
pub fn categorize(issue: &Issue) -> Category {
    let kind = issue.kind.to_lowercase();
    let message = issue.message.to_lowercase();

    CATEGORY_RULES
        .iter()
        .find(|(predicate, _)| predicate(&kind, &message))
        .map(|(_, category)| *category)
        .unwrap_or(Category::Style)
}

/// Short educational message for a category
pub fn learning_tip(category: Option<Category>) -> &'static str {
    match category {
        Some(Category::Security) => {
            "Security issues can expose your app to attacks. Always validate user input!"
        }
        Some(Category::Bug) => "Bugs cause crashes or wrong results. Test edge cases!",
        Some(Category::Logic) => "Logic errors are subtle - code runs but gives wrong results.",
        Some(Category::Performance) => "Performance matters at scale. Small optimizations add up!",
        Some(Category::Style) => "Clean code is easier to maintain and debug.",
        None => GENERIC_TIP,
    }
}

/// Attach snippet and surrounding context for `issue.line`
///
/// Lines outside `1..=lines.len()` leave both fields untouched.
fn attach_source_context(issue: &mut Issue, lines: &[&str]) {
    let line = issue.line as usize;
    if line == 0 || line > lines.len() {
        return;
    }

    issue.code_snippet = Some(lines[line - 1].trim().to_string());

    let start = line.saturating_sub(CONTEXT_BEFORE + 1);
    let end = (line + CONTEXT_AFTER).min(lines.len());
    issue.context = Some(lines[start..end].join("\n"));
}

/// Enrich every finding with source context, category and learning tip
pub fn enrich_issues(issues: &mut [Issue], code: &str) {
    let lines: Vec<&str> = code.split('\n').collect();

    for issue in issues.iter_mut() {
        attach_source_context(issue, &lines);
        let category = categorize(issue);
        issue.category = Some(category);
        issue.learning_tip = Some(learning_tip(issue.category).to_string());
    }
}
