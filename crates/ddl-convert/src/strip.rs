//! Clause and WITH-property stripping for retained table definitions.

use tracing::debug;

use crate::core::diag::Diagnostic;
use crate::core::schema::TableDef;
use crate::error::{ConvertError, Result};
use crate::ruleset::RuleSet;

/// Remove configured clauses and WITH-properties from a table
/// definition, in place.
///
/// Clauses are matched by their leading keyword sequence,
/// case-insensitively. Columns and constraints are never touched; the
/// property list stays well-formed because removal operates on the
/// structured nodes. Running this on an already-clean definition is a
/// no-op.
pub fn strip(
    rules: &RuleSet,
    table: &mut TableDef,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<()> {
    // CREATE OR REPLACE has no target-side equivalent for tables.
    if table.or_replace {
        table.or_replace = false;
        diagnostics.push(Diagnostic::info(
            "or_replace_removed",
            format!("changed CREATE OR REPLACE to CREATE for '{}'", table.name),
        ));
    }

    for clause in &table.clauses {
        if clause.keywords.trim().is_empty() {
            return Err(ConvertError::clause(
                &table.name,
                "clause with empty keyword sequence",
            ));
        }
    }

    table.clauses.retain(|clause| {
        let keywords = clause.keywords.trim().to_uppercase();
        let removed = rules
            .clause_removals
            .iter()
            .any(|removal| keywords.starts_with(removal.as_str()));
        if removed {
            debug!(clause = %clause.keywords, table = %table.name, "removed clause");
            diagnostics.push(Diagnostic::info(
                "clause_removed",
                format!("removed clause '{}' from '{}'", clause.keywords, table.name),
            ));
        }
        !removed
    });

    table.properties.retain(|property| {
        let removed = rules.property_removals.contains(&property.key.trim().to_uppercase());
        if removed {
            debug!(property = %property.key, table = %table.name, "removed WITH property");
            diagnostics.push(Diagnostic::info(
                "property_removed",
                format!("removed WITH property '{}' from '{}'", property.key, table.name),
            ));
        }
        !removed
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::{ColumnDef, TableClause, TypeDescriptor, WithProperty};
    use crate::ruleset::RuleSetDoc;

    fn rules() -> RuleSet {
        let doc: RuleSetDoc = serde_json::from_str(
            r#"{
                "default": {"INT": "NUMBER(38,0)"},
                "clause_removal": {"enabled": true, "clauses": ["CLUSTER BY", "WITH ROW ACCESS POLICY"]},
                "with_property_removal": {"enabled": true, "properties": ["DATA_RETENTION_TIME_IN_DAYS", "TAG"]}
            }"#,
        )
        .unwrap();
        RuleSet::from_doc(&doc).unwrap()
    }

    fn table_with_clauses() -> TableDef {
        let mut table = TableDef::new("orders");
        table.columns.push(ColumnDef::new("id", TypeDescriptor::plain("INT")));
        table.clauses.push(TableClause::new("CLUSTER BY", "(region)"));
        table.clauses.push(TableClause::new("PARTITION BY", "(load_date)"));
        table.properties.push(WithProperty::new("DATA_RETENTION_TIME_IN_DAYS", "1"));
        table.properties.push(WithProperty::new("CHANGE_TRACKING", "TRUE"));
        table
    }

    #[test]
    fn test_listed_clauses_removed_others_kept() {
        let rules = rules();
        let mut table = table_with_clauses();
        let mut diags = Vec::new();
        strip(&rules, &mut table, &mut diags).unwrap();

        assert_eq!(table.clauses.len(), 1);
        assert_eq!(table.clauses[0].keywords, "PARTITION BY");
        assert_eq!(table.properties.len(), 1);
        assert_eq!(table.properties[0].key, "CHANGE_TRACKING");
        assert!(diags.iter().any(|d| d.code == "clause_removed"));
        assert!(diags.iter().any(|d| d.code == "property_removed"));
    }

    #[test]
    fn test_clause_match_is_case_insensitive_prefix() {
        let rules = rules();
        let mut table = TableDef::new("t");
        table
            .clauses
            .push(TableClause::new("cluster by linear", "(a, b)"));
        let mut diags = Vec::new();
        strip(&rules, &mut table, &mut diags).unwrap();
        assert!(table.clauses.is_empty());
    }

    #[test]
    fn test_idempotent_on_clean_table() {
        let rules = rules();
        let mut table = TableDef::new("clean");
        table.columns.push(ColumnDef::new("id", TypeDescriptor::plain("INT")));
        table.clauses.push(TableClause::new("PARTITION BY", "(d)"));
        let before = table.clone();

        let mut diags = Vec::new();
        strip(&rules, &mut table, &mut diags).unwrap();
        assert_eq!(table, before);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_or_replace_downgraded() {
        let rules = rules();
        let mut table = TableDef::new("t");
        table.or_replace = true;
        let mut diags = Vec::new();
        strip(&rules, &mut table, &mut diags).unwrap();
        assert!(!table.or_replace);
        assert!(diags.iter().any(|d| d.code == "or_replace_removed"));
    }

    #[test]
    fn test_empty_keyword_clause_fails_statement() {
        let rules = rules();
        let mut table = TableDef::new("t");
        table.clauses.push(TableClause::new("", "(x)"));
        let mut diags = Vec::new();
        let err = strip(&rules, &mut table, &mut diags).unwrap_err();
        assert!(matches!(err, ConvertError::ClauseParse { .. }));
    }
}
