//! Raw rule set document as read from disk.
//!
//! This mirrors the on-disk configuration layout one-to-one. Unknown
//! keys are ignored for forward compatibility; everything here is
//! loosely typed and only becomes trustworthy after
//! [`super::validation`] turns it into a [`super::RuleSet`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-level rule set document for one dialect pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSetDoc {
    /// Source type name -> target type spec (e.g. "INT" -> "NUMBER(38,0)").
    #[serde(default)]
    pub default: BTreeMap<String, String>,

    /// Source type name -> dynamic sizing/overflow rule.
    #[serde(default)]
    pub dynamic_rules: BTreeMap<String, DynamicRuleDoc>,

    /// Target version label -> partial override of the default map.
    #[serde(default)]
    pub version_overrides: BTreeMap<String, VersionOverrideDoc>,

    /// Target type names that must never carry parameters.
    #[serde(default)]
    pub paramless_targets: Vec<String>,

    /// Target type name -> display alias, applied after resolution.
    #[serde(default)]
    pub output_aliases: BTreeMap<String, String>,

    /// Statement skip configuration.
    #[serde(default)]
    pub statement_skipping: SkippingDoc,

    /// Clause removal configuration.
    #[serde(default)]
    pub clause_removal: ClauseRemovalDoc,

    /// WITH-property removal configuration.
    #[serde(default)]
    pub with_property_removal: PropertyRemovalDoc,

    /// Comment relocation configuration.
    #[serde(default)]
    pub comment_conversion: CommentConversionDoc,

    /// Virtual column rewrite configuration.
    #[serde(default)]
    pub virtual_column_conversion: VirtualColumnDoc,
}

/// Dynamic sizing rule for one length-style source type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DynamicRuleDoc {
    /// Largest size the sized template may carry.
    pub max_size: i64,

    /// Unsized fallback type used above `max_size`.
    pub overflow_type: String,

    /// Sized rendering template, substituting `{size}`.
    #[serde(default)]
    pub template: Option<String>,
}

/// Version-specific partial override of the default type map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VersionOverrideDoc {
    /// Overriding source type name -> target type spec entries.
    #[serde(default)]
    pub default: BTreeMap<String, String>,
}

/// Statement skipping section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippingDoc {
    /// Whether skip matching is active.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Ordered regex patterns; first match wins.
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl Default for SkippingDoc {
    fn default() -> Self {
        Self {
            enabled: true,
            patterns: Vec::new(),
        }
    }
}

/// Clause removal section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClauseRemovalDoc {
    /// Whether clause removal is active.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Leading keyword sequences of clauses to drop.
    #[serde(default)]
    pub clauses: Vec<String>,
}

impl Default for ClauseRemovalDoc {
    fn default() -> Self {
        Self {
            enabled: true,
            clauses: Vec::new(),
        }
    }
}

/// WITH-property removal section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyRemovalDoc {
    /// Whether property removal is active.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Property keys to drop from WITH blocks.
    #[serde(default)]
    pub properties: Vec<String>,
}

impl Default for PropertyRemovalDoc {
    fn default() -> Self {
        Self {
            enabled: true,
            properties: Vec::new(),
        }
    }
}

/// Comment relocation section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentConversionDoc {
    /// Whether comments are relocated to standalone statements.
    #[serde(default)]
    pub enabled: bool,

    /// Table comment template; takes `{table_name}` and `{comment_text}`.
    #[serde(default)]
    pub table_template: Option<String>,

    /// Column comment template; takes `{table_name}`, `{column_name}`
    /// and `{comment_text}`.
    #[serde(default)]
    pub column_template: Option<String>,
}

/// Virtual column rewrite section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VirtualColumnDoc {
    /// Whether computed columns are rewritten at all.
    #[serde(default)]
    pub enabled: bool,

    /// Rewrite strategy when enabled.
    #[serde(default)]
    pub strategy: VirtualColumnStrategy,
}

/// How computed columns are expressed in the target dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VirtualColumnStrategy {
    /// Rewrite in place using the target's native virtual column syntax.
    #[default]
    Native,
    /// Demote to a stored placeholder and emit a companion view.
    View,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_keys_are_ignored() {
        let json = r#"{
            "default": {"INT": "NUMBER(38,0)"},
            "some_future_section": {"x": 1}
        }"#;
        let doc: RuleSetDoc = serde_json::from_str(json).unwrap();
        assert_eq!(doc.default.len(), 1);
    }

    #[test]
    fn test_sections_default_when_absent() {
        let doc: RuleSetDoc = serde_json::from_str("{}").unwrap();
        assert!(doc.statement_skipping.enabled);
        assert!(doc.statement_skipping.patterns.is_empty());
        assert!(!doc.comment_conversion.enabled);
        assert!(!doc.virtual_column_conversion.enabled);
        assert_eq!(
            doc.virtual_column_conversion.strategy,
            VirtualColumnStrategy::Native
        );
    }
}
