//! Virtual (computed) column rewriting.
//!
//! The strategy is chosen by configuration, never inferred from the
//! target dialect: either the column is rewritten in place to the
//! target's native generated-column form, or it is demoted to a
//! stored placeholder and a companion view recomputes the expression.

use tracing::debug;

use crate::core::diag::Diagnostic;
use crate::core::schema::{ColumnExpression, Statement, StatementKind, TableDef};
use crate::ruleset::{RuleSet, VirtualColumnPolicy};

/// Rewrite computed columns per the configured policy.
///
/// Returns the companion view statement when the view-demotion
/// strategy produced one; the caller appends it after the owning
/// table's other produced statements.
pub fn rewrite(
    rules: &RuleSet,
    table: &mut TableDef,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<Statement> {
    if rules.virtual_columns == VirtualColumnPolicy::Disabled {
        return None;
    }

    let mut demoted: Vec<(String, String)> = Vec::new();

    for column in &mut table.columns {
        // Identity columns are generated too, but are not virtual.
        if column.is_identity {
            continue;
        }
        let Some(ColumnExpression::Computed(expression)) = column.expression.clone() else {
            continue;
        };

        match rules.virtual_columns {
            VirtualColumnPolicy::Native => {
                column.expression = Some(ColumnExpression::GeneratedVirtual(expression));
                debug!(table = %table.name, column = %column.name, "rewrote virtual column");
                diagnostics.push(Diagnostic::info(
                    "virtual_column_rewritten",
                    format!(
                        "rewrote computed column '{}.{}' to native virtual syntax",
                        table.name, column.name
                    ),
                ));
            }
            VirtualColumnPolicy::ViewDemotion => {
                column.expression = None;
                diagnostics.push(Diagnostic::info(
                    "virtual_column_demoted",
                    format!(
                        "demoted computed column '{}.{}' to a stored column; expression moved to companion view",
                        table.name, column.name
                    ),
                ));
                demoted.push((column.name.clone(), expression));
            }
            VirtualColumnPolicy::Disabled => unreachable!(),
        }
    }

    if demoted.is_empty() {
        return None;
    }

    Some(companion_view(&table.name, &demoted))
}

/// Build the companion view recomputing every demoted expression.
fn companion_view(table_name: &str, demoted: &[(String, String)]) -> Statement {
    let selects: Vec<String> = demoted
        .iter()
        .map(|(name, expression)| format!("{} AS {}", expression, name))
        .collect();
    let text = format!(
        "CREATE VIEW {table}_cv AS SELECT t.*, {selects} FROM {table} t",
        table = table_name,
        selects = selects.join(", ")
    );
    Statement::raw(StatementKind::View, text)
}
