//! Type resolution between source and target dialects.
//!
//! Resolution is entirely rule-driven; nothing in here knows what a
//! "Snowflake" or an "Oracle" type is. The precedence chain is fixed:
//!
//! 1. version override (base name)
//! 2. default map (base name); absence of both is an error
//! 3. dynamic sizing/overflow (length-style descriptors only)
//! 4. paramless stripping
//! 5. output alias (cosmetic, last)

use tracing::debug;

use crate::core::diag::Diagnostic;
use crate::core::schema::{TableDef, TypeDescriptor};
use crate::error::{ConvertError, Result};
use crate::ruleset::{parse_type_spec, RuleSet};

/// Resolve a single source type descriptor to its target form.
///
/// Returns `None` when the source type has no mapping in either the
/// version override or the default map.
pub fn resolve_type(
    rules: &RuleSet,
    target_version: Option<&str>,
    source: &TypeDescriptor,
) -> Option<TypeDescriptor> {
    let base = rules.base_target(&source.name, target_version)?;
    let mut resolved = base.clone();
    let mut carry_source_params = true;

    // Dynamic sizing applies only to length-style source descriptors.
    if let (Some(rule), Some(size)) = (rules.dynamic_rule(&source.name), source.size) {
        if size > rule.max_size {
            // Overflow types are inherently unsized.
            resolved = rule.overflow.clone();
            carry_source_params = false;
        } else if let Some(template) = &rule.template {
            let rendered = template.replace("{size}", &size.to_string());
            // The template was checked to render a type at load time.
            if let Ok(spec) = parse_type_spec(&rendered) {
                resolved = spec;
            }
        }
    }

    // Source parameters, when present and permitted, replace whatever
    // fixed parameters the mapping supplied.
    if carry_source_params && source.has_params() && !rules.is_paramless(&resolved.name) {
        resolved.copy_params_from(source);
    }

    // Paramless targets never carry parameters, whatever the mapping
    // or the source supplied.
    if rules.is_paramless(&resolved.name) {
        resolved.strip_params();
    }

    // Aliasing happens last, after all sizing decisions.
    if let Some(alias) = rules.output_alias(&resolved.name) {
        resolved.name = alias.to_string();
    }

    debug!(source = %source.render(), target = %resolved.render(), "resolved type");
    Some(resolved)
}

/// Resolve every column of a table definition in place.
///
/// All unmapped columns are reported as ERROR diagnostics before the
/// first [`ConvertError::UnmappedType`] is returned, so a failed
/// record names every offending column, not just the first.
pub fn resolve_columns(
    rules: &RuleSet,
    target_version: Option<&str>,
    table: &mut TableDef,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<()> {
    let mut first_unmapped: Option<ConvertError> = None;

    for column in &mut table.columns {
        match resolve_type(rules, target_version, &column.data_type) {
            Some(resolved) => column.data_type = resolved,
            None => {
                diagnostics.push(Diagnostic::error(
                    "unmapped_type",
                    format!(
                        "column '{}' has no mapping for source type '{}'",
                        column.name, column.data_type.name
                    ),
                ));
                if first_unmapped.is_none() {
                    first_unmapped =
                        Some(ConvertError::unmapped(&column.name, &column.data_type.name));
                }
            }
        }
    }

    match first_unmapped {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ruleset::RuleSetDoc;

    fn oracle_rules() -> RuleSet {
        let doc: RuleSetDoc = serde_json::from_str(
            r#"{
                "default": {
                    "INT": "NUMBER(38,0)",
                    "DECIMAL": "NUMBER",
                    "VARCHAR": "VARCHAR2",
                    "TEXT": "CLOB",
                    "SQL_VARIANT": "JSON",
                    "TIMESTAMP_LTZ": "TIMESTAMPLTZ"
                },
                "version_overrides": {
                    "19c": {"default": {"SQL_VARIANT": "CLOB"}}
                },
                "dynamic_rules": {
                    "VARCHAR": {
                        "max_size": 4000,
                        "overflow_type": "CLOB",
                        "template": "VARCHAR2({size})"
                    }
                },
                "paramless_targets": ["CLOB", "BLOB", "JSON"],
                "output_aliases": {
                    "TIMESTAMPLTZ": "TIMESTAMP WITH LOCAL TIME ZONE"
                }
            }"#,
        )
        .unwrap();
        RuleSet::from_doc(&doc).unwrap()
    }

    #[test]
    fn test_default_mapping_keeps_fixed_params() {
        let rules = oracle_rules();
        let resolved = resolve_type(&rules, None, &TypeDescriptor::plain("INT")).unwrap();
        assert_eq!(resolved.render(), "NUMBER(38,0)");
    }

    #[test]
    fn test_source_params_replace_fixed_params() {
        let rules = oracle_rules();
        let source = TypeDescriptor::numeric("DECIMAL", 10, Some(2));
        let resolved = resolve_type(&rules, None, &source).unwrap();
        assert_eq!(resolved.render(), "NUMBER(10,2)");
    }

    #[test]
    fn test_dynamic_rule_within_limit_uses_template() {
        let rules = oracle_rules();
        let source = TypeDescriptor::sized("VARCHAR", 4000);
        let resolved = resolve_type(&rules, None, &source).unwrap();
        assert_eq!(resolved.render(), "VARCHAR2(4000)");
    }

    #[test]
    fn test_dynamic_rule_overflow_is_unsized() {
        let rules = oracle_rules();
        let source = TypeDescriptor::sized("VARCHAR", 4001);
        let resolved = resolve_type(&rules, None, &source).unwrap();
        assert_eq!(resolved.render(), "CLOB");
        assert!(!resolved.has_params());
    }

    #[test]
    fn test_dynamic_rule_ignored_without_source_size() {
        let rules = oracle_rules();
        let resolved = resolve_type(&rules, None, &TypeDescriptor::plain("VARCHAR")).unwrap();
        assert_eq!(resolved.render(), "VARCHAR2");
    }

    #[test]
    fn test_version_override_beats_default() {
        let rules = oracle_rules();
        let source = TypeDescriptor::plain("SQL_VARIANT");
        let with_version = resolve_type(&rules, Some("19c"), &source).unwrap();
        assert_eq!(with_version.render(), "CLOB");
        let without_version = resolve_type(&rules, None, &source).unwrap();
        assert_eq!(without_version.render(), "JSON");
    }

    #[test]
    fn test_version_label_lookup_is_case_insensitive() {
        let rules = oracle_rules();
        let source = TypeDescriptor::plain("SQL_VARIANT");
        let resolved = resolve_type(&rules, Some("19C"), &source).unwrap();
        assert_eq!(resolved.render(), "CLOB");
    }

    #[test]
    fn test_paramless_strips_source_params() {
        let rules = oracle_rules();
        let source = TypeDescriptor::sized("TEXT", 500);
        let resolved = resolve_type(&rules, None, &source).unwrap();
        assert_eq!(resolved.render(), "CLOB");
    }

    #[test]
    fn test_output_alias_applied_last() {
        let rules = oracle_rules();
        let source = TypeDescriptor::plain("TIMESTAMP_LTZ");
        let resolved = resolve_type(&rules, None, &source).unwrap();
        assert_eq!(resolved.name, "TIMESTAMP WITH LOCAL TIME ZONE");
    }

    #[test]
    fn test_underscoreless_source_name_resolves() {
        let rules = oracle_rules();
        let resolved = resolve_type(&rules, None, &TypeDescriptor::plain("TIMESTAMPLTZ")).unwrap();
        assert_eq!(resolved.name, "TIMESTAMP WITH LOCAL TIME ZONE");
    }

    #[test]
    fn test_unmapped_type_is_none() {
        let rules = oracle_rules();
        assert!(resolve_type(&rules, None, &TypeDescriptor::plain("GEOGRAPHY")).is_none());
    }

    #[test]
    fn test_resolve_columns_reports_every_unmapped_column() {
        use crate::core::schema::{ColumnDef, TableDef};

        let rules = oracle_rules();
        let mut table = TableDef::new("t");
        table.columns.push(ColumnDef::new("a", TypeDescriptor::plain("GEOGRAPHY")));
        table.columns.push(ColumnDef::new("b", TypeDescriptor::plain("INT")));
        table.columns.push(ColumnDef::new("c", TypeDescriptor::plain("VARIANT")));

        let mut diags = Vec::new();
        let err = resolve_columns(&rules, None, &mut table, &mut diags).unwrap_err();
        assert!(matches!(err, ConvertError::UnmappedType { .. }));
        let unmapped: Vec<_> = diags.iter().filter(|d| d.code == "unmapped_type").collect();
        assert_eq!(unmapped.len(), 2);
        // The mapped column was still resolved in place.
        assert_eq!(table.columns[1].data_type.render(), "NUMBER(38,0)");
    }
}
