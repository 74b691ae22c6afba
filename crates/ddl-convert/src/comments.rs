//! Comment relocation: inline object/column comments become
//! standalone target-dialect statements.

use tracing::debug;

use crate::core::diag::Diagnostic;
use crate::core::schema::{Statement, StatementKind, TableDef};
use crate::error::ConvertError;
use crate::ruleset::RuleSet;

/// Strip inline comments from a table definition and render them as
/// standalone statements via the configured templates.
///
/// Output order: table comment first, then column comments in column
/// order. The caller appends these after the owning table statement.
/// Unescapable comment text fails only that comment: the text is
/// dropped with a WARNING diagnostic and the owning statement still
/// converts.
pub fn extract(
    rules: &RuleSet,
    table: &mut TableDef,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<Statement> {
    let Some(templates) = &rules.comment_templates else {
        return Vec::new();
    };

    let mut produced = Vec::new();

    if let Some(comment) = table.comment.take() {
        match escape(&comment) {
            Ok(escaped) => {
                let text = templates
                    .table
                    .replace("{table_name}", &table.name)
                    .replace("{comment_text}", &escaped);
                produced.push(Statement::raw(StatementKind::Other, text));
            }
            Err(e) => diagnostics.push(Diagnostic::warning(
                "comment_dropped",
                ConvertError::comment(&table.name, e).to_string(),
            )),
        }
    }

    for column in &mut table.columns {
        let Some(comment) = column.comment.take() else {
            continue;
        };
        match escape(&comment) {
            Ok(escaped) => {
                let text = templates
                    .column
                    .replace("{table_name}", &table.name)
                    .replace("{column_name}", &column.name)
                    .replace("{comment_text}", &escaped);
                produced.push(Statement::raw(StatementKind::Other, text));
            }
            Err(e) => diagnostics.push(Diagnostic::warning(
                "comment_dropped",
                ConvertError::comment(format!("{}.{}", table.name, column.name), e).to_string(),
            )),
        }
    }

    if !produced.is_empty() {
        debug!(table = %table.name, count = produced.len(), "relocated inline comments");
    }
    produced
}

/// Escape comment text for single-quoted SQL literals.
fn escape(comment: &str) -> std::result::Result<String, String> {
    if comment.contains('\0') {
        return Err("text contains a NUL byte".to_string());
    }
    Ok(comment.replace('\'', "''"))
}
