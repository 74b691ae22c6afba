//! Rule set validation.
//!
//! Turns a raw [`RuleSetDoc`] into a [`RuleSet`], collecting every
//! inconsistency before failing so a configuration can be fixed in a
//! single pass.

use regex::RegexBuilder;
use std::collections::{HashMap, HashSet};

use super::types::*;
use super::{parse_type_spec, CommentTemplates, DynamicRule, RuleSet, SkipPattern, VirtualColumnPolicy};
use crate::core::schema::TypeDescriptor;
use crate::error::ConfigError;

/// Validate a raw document into an immutable rule set.
pub fn validate(doc: &RuleSetDoc) -> Result<RuleSet, ConfigError> {
    let mut issues = Vec::new();

    // Default type map. Keys are uppercased; underscore-bearing keys
    // get an underscore-less alias so TIMESTAMP_NTZ and TIMESTAMPNTZ
    // both resolve.
    if doc.default.is_empty() {
        issues.push("default: type map is empty or missing".to_string());
    }
    let default_map = build_type_map(&doc.default, "default", &mut issues);

    // The set of target names a reference may legally resolve to.
    let mut known_targets: HashSet<String> = default_map
        .values()
        .map(|spec| spec.name.to_uppercase())
        .collect();
    for target in &doc.paramless_targets {
        known_targets.insert(target.to_uppercase());
    }
    for alias_key in doc.output_aliases.keys() {
        known_targets.insert(alias_key.to_uppercase());
    }

    // Version overrides. Labels are normalized to uppercase, matching
    // the case-insensitive lookup; labels differing only in case would
    // collide after normalization and are rejected.
    let mut version_overrides = HashMap::new();
    for (label, override_doc) in &doc.version_overrides {
        let section = format!("version_overrides.{}.default", label);
        let map = build_type_map(&override_doc.default, &section, &mut issues);
        for spec in map.values() {
            if !known_targets.contains(&spec.name.to_uppercase()) {
                issues.push(format!(
                    "{}: override target '{}' is not a known type name",
                    section, spec.name
                ));
            }
        }
        if version_overrides.insert(label.to_uppercase(), map).is_some() {
            issues.push(format!(
                "version_overrides: duplicate version label '{}'",
                label
            ));
        }
    }

    // Dynamic sizing rules.
    let mut dynamic_rules = HashMap::new();
    for (source_type, rule) in &doc.dynamic_rules {
        let section = format!("dynamic_rules.{}", source_type);
        if rule.max_size <= 0 {
            issues.push(format!(
                "{}: max_size must be a positive integer, got {}",
                section, rule.max_size
            ));
        }
        if let Some(template) = &rule.template {
            if !template.contains("{size}") {
                issues.push(format!(
                    "{}: template '{}' is missing the {{size}} placeholder",
                    section, template
                ));
            } else if let Err(e) = parse_type_spec(&template.replace("{size}", "1")) {
                issues.push(format!("{}: template does not render a type: {}", section, e));
            }
        }
        let overflow = match parse_type_spec(&rule.overflow_type) {
            Ok(spec) => {
                if !known_targets.contains(&spec.name.to_uppercase()) {
                    issues.push(format!(
                        "{}: overflow_type '{}' is not a known type name",
                        section, rule.overflow_type
                    ));
                }
                spec
            }
            Err(e) => {
                issues.push(format!("{}: invalid overflow_type: {}", section, e));
                TypeDescriptor::plain(rule.overflow_type.to_uppercase())
            }
        };
        dynamic_rules.insert(
            source_type.to_uppercase(),
            DynamicRule {
                max_size: rule.max_size.max(0) as u32,
                overflow,
                template: rule.template.clone(),
            },
        );
    }

    // Skip patterns compile up front; matching stays a pure function
    // over statement text.
    let mut skip_patterns = Vec::new();
    if doc.statement_skipping.enabled {
        for (i, pattern) in doc.statement_skipping.patterns.iter().enumerate() {
            match RegexBuilder::new(pattern).case_insensitive(true).build() {
                Ok(regex) => skip_patterns.push(SkipPattern {
                    pattern: pattern.clone(),
                    regex,
                }),
                Err(e) => issues.push(format!(
                    "statement_skipping.patterns[{}]: invalid regex '{}': {}",
                    i, pattern, e
                )),
            }
        }
    }

    // Clause and property removals.
    let mut clause_removals = Vec::new();
    if doc.clause_removal.enabled {
        for clause in &doc.clause_removal.clauses {
            let keywords = clause.trim().to_uppercase();
            if keywords.is_empty() {
                issues.push("clause_removal.clauses: empty clause keyword".to_string());
            } else {
                clause_removals.push(keywords);
            }
        }
    }
    let property_removals: HashSet<String> = if doc.with_property_removal.enabled {
        doc.with_property_removal
            .properties
            .iter()
            .map(|p| p.trim().to_uppercase())
            .collect()
    } else {
        HashSet::new()
    };

    // Comment templates.
    let comment_templates = if doc.comment_conversion.enabled {
        let table = check_template(
            doc.comment_conversion.table_template.as_deref(),
            "comment_conversion.table_template",
            &["{table_name}", "{comment_text}"],
            &mut issues,
        );
        let column = check_template(
            doc.comment_conversion.column_template.as_deref(),
            "comment_conversion.column_template",
            &["{table_name}", "{column_name}", "{comment_text}"],
            &mut issues,
        );
        match (table, column) {
            (Some(table), Some(column)) => Some(CommentTemplates { table, column }),
            _ => None,
        }
    } else {
        None
    };

    let virtual_columns = if doc.virtual_column_conversion.enabled {
        match doc.virtual_column_conversion.strategy {
            VirtualColumnStrategy::Native => VirtualColumnPolicy::Native,
            VirtualColumnStrategy::View => VirtualColumnPolicy::ViewDemotion,
        }
    } else {
        VirtualColumnPolicy::Disabled
    };

    if !issues.is_empty() {
        return Err(ConfigError::new(issues));
    }

    Ok(RuleSet {
        default_map,
        version_overrides,
        dynamic_rules,
        paramless_targets: doc
            .paramless_targets
            .iter()
            .map(|t| t.to_uppercase())
            .collect(),
        output_aliases: doc
            .output_aliases
            .iter()
            .map(|(k, v)| (k.to_uppercase(), v.clone()))
            .collect(),
        skip_patterns,
        clause_removals,
        property_removals,
        comment_templates,
        virtual_columns,
    })
}

/// Parse one raw type map, uppercasing keys and deriving
/// underscore-less aliases.
fn build_type_map(
    raw: &std::collections::BTreeMap<String, String>,
    section: &str,
    issues: &mut Vec<String>,
) -> HashMap<String, TypeDescriptor> {
    let mut map = HashMap::with_capacity(raw.len() * 2);
    for (source_type, target_spec) in raw {
        match parse_type_spec(target_spec) {
            Ok(spec) => {
                let key = source_type.to_uppercase();
                if key.contains('_') {
                    let alias = key.replace('_', "");
                    if !raw.contains_key(&alias) && !raw.contains_key(&alias.to_lowercase()) {
                        map.insert(alias, spec.clone());
                    }
                }
                map.insert(key, spec);
            }
            Err(e) => issues.push(format!("{}.{}: {}", section, source_type, e)),
        }
    }
    map
}

/// Require a template to be present and to carry every placeholder.
fn check_template(
    template: Option<&str>,
    section: &str,
    placeholders: &[&str],
    issues: &mut Vec<String>,
) -> Option<String> {
    let Some(template) = template else {
        issues.push(format!("{}: required template is missing", section));
        return None;
    };
    let mut ok = true;
    for placeholder in placeholders {
        if !template.contains(placeholder) {
            issues.push(format!(
                "{}: template is missing the {} placeholder",
                section, placeholder
            ));
            ok = false;
        }
    }
    ok.then(|| template.to_string())
}
