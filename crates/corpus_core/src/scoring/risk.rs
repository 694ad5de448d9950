//! Title-based risk heuristic.
//!
//! Produces the risk axis (0-10, higher is safer). The value replaces
//! whatever the rule table seeded; it is never adjusted incrementally.

use crate::scoring::adjust::PLACEHOLDER_YEAR;

/// Risk value for placeholder posts: nothing to lose by deleting them.
pub const PLACEHOLDER_RISK: u32 = 10;
/// Risk value when a sensitive keyword appears in the title.
pub const KEYWORD_RISK: u32 = 6;
/// Risk value when nothing matched.
pub const DEFAULT_RISK: u32 = 8;

const PLACEHOLDER_TITLE: &str = "Hello world";

/// Sensitive title terms, matched as exact substrings.
const RISK_KEYWORDS: &[&str] = &["政治", "速報", "通知", "募集", "告知"];

/// Scores the risk axis from the title and publication year.
///
/// First match wins: the 2023 placeholder post, then risk keywords, then
/// the default.
pub fn risk_score(title: &str, year: Option<i32>) -> u32 {
    if year == Some(PLACEHOLDER_YEAR) && title.contains(PLACEHOLDER_TITLE) {
        return PLACEHOLDER_RISK;
    }

    if has_risk_keyword(title) {
        return KEYWORD_RISK;
    }

    DEFAULT_RISK
}

fn has_risk_keyword(title: &str) -> bool {
    RISK_KEYWORDS.iter().any(|keyword| title.contains(keyword))
}
