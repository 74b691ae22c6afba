//! Statement classifier: decides whether a statement is dropped
//! before any other pipeline stage runs.

use tracing::debug;

use crate::core::schema::Statement;
use crate::ruleset::{RuleSet, SkipPattern};

/// Return the first skip pattern matching the statement, if any.
///
/// Patterns are tried in configuration order, case-insensitively,
/// anchored at the logical start of the statement (leading whitespace
/// ignored). The first match short-circuits the rest.
pub fn skip_match<'a>(rules: &'a RuleSet, statement: &Statement) -> Option<&'a SkipPattern> {
    let matched = rules
        .skip_patterns
        .iter()
        .find(|p| p.matches(&statement.text));
    if let Some(pattern) = matched {
        debug!(pattern = %pattern.pattern, "statement matched skip pattern");
    }
    matched
}
