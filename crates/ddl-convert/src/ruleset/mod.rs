//! Rule set loading and validation.
//!
//! A [`RuleSet`] is the immutable, fully validated form of one dialect
//! pair's conversion configuration. It is built once per job, then
//! shared read-only across workers; nothing in the engine mutates it
//! after load.

mod types;
mod validation;

pub use types::*;

use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::core::schema::TypeDescriptor;
use crate::error::{ConfigError, Result};

/// A precompiled statement skip matcher.
#[derive(Debug)]
pub struct SkipPattern {
    /// Original pattern text, reported in diagnostics.
    pub pattern: String,

    /// Compiled case-insensitive matcher.
    pub regex: Regex,
}

impl SkipPattern {
    /// Whether the pattern matches at the logical start of the
    /// statement (leading whitespace ignored).
    pub fn matches(&self, statement_text: &str) -> bool {
        let text = statement_text.trim_start();
        self.regex.find(text).is_some_and(|m| m.start() == 0)
    }
}

/// Dynamic sizing/overflow rule for one length-style source type.
#[derive(Debug, Clone)]
pub struct DynamicRule {
    /// Largest size the sized template may carry.
    pub max_size: u32,

    /// Unsized fallback type used above `max_size`.
    pub overflow: TypeDescriptor,

    /// Sized rendering template, substituting `{size}`.
    pub template: Option<String>,
}

/// Templates for relocated comments.
#[derive(Debug, Clone)]
pub struct CommentTemplates {
    /// Table comment template.
    pub table: String,

    /// Column comment template.
    pub column: String,
}

/// How (and whether) computed columns are rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VirtualColumnPolicy {
    /// Leave computed columns untouched.
    Disabled,
    /// Rewrite in place to the target's native virtual column form.
    Native,
    /// Demote to stored placeholders plus a companion view.
    ViewDemotion,
}

/// Validated, immutable conversion configuration for one dialect pair.
///
/// All type-name keys are normalized to uppercase at load time;
/// underscore-bearing keys additionally get an underscore-less alias
/// (`TIMESTAMP_NTZ` also matches `TIMESTAMPNTZ`).
#[derive(Debug)]
pub struct RuleSet {
    /// Source type name -> target type spec.
    pub default_map: HashMap<String, TypeDescriptor>,

    /// Version label (uppercase) -> partial override of `default_map`.
    pub version_overrides: HashMap<String, HashMap<String, TypeDescriptor>>,

    /// Source type name -> dynamic sizing rule.
    pub dynamic_rules: HashMap<String, DynamicRule>,

    /// Target names that never carry parameters.
    pub paramless_targets: HashSet<String>,

    /// Target name -> cosmetic display alias.
    pub output_aliases: HashMap<String, String>,

    /// Ordered skip matchers; first match wins.
    pub skip_patterns: Vec<SkipPattern>,

    /// Leading keyword sequences of clauses to drop (uppercase).
    pub clause_removals: Vec<String>,

    /// WITH-property keys to drop (uppercase).
    pub property_removals: HashSet<String>,

    /// Comment relocation templates; `None` disables relocation.
    pub comment_templates: Option<CommentTemplates>,

    /// Virtual column rewrite policy.
    pub virtual_columns: VirtualColumnPolicy,
}

impl RuleSet {
    /// Load a rule set from a JSON or YAML file (by extension).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&content),
            _ => Self::from_json(&content),
        }
    }

    /// Parse and validate a rule set from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: RuleSetDoc = serde_json::from_str(json)?;
        Ok(Self::from_doc(&doc)?)
    }

    /// Parse and validate a rule set from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let doc: RuleSetDoc = serde_yaml::from_str(yaml)?;
        Ok(Self::from_doc(&doc)?)
    }

    /// Validate a raw document, collecting every inconsistency found.
    pub fn from_doc(doc: &RuleSetDoc) -> std::result::Result<Self, ConfigError> {
        validation::validate(doc)
    }

    /// Look up the base target spec for a source type name, honoring
    /// the version override precedence.
    pub fn base_target(
        &self,
        source_type: &str,
        target_version: Option<&str>,
    ) -> Option<&TypeDescriptor> {
        let key = source_type.to_uppercase();
        if let Some(version) = target_version {
            if let Some(overrides) = self.version_overrides.get(&version.to_uppercase()) {
                if let Some(spec) = overrides.get(&key) {
                    return Some(spec);
                }
            }
        }
        self.default_map.get(&key)
    }

    /// Dynamic rule for a source type name, if configured.
    pub fn dynamic_rule(&self, source_type: &str) -> Option<&DynamicRule> {
        self.dynamic_rules.get(&source_type.to_uppercase())
    }

    /// Whether a target type name must be emitted without parameters.
    pub fn is_paramless(&self, target_type: &str) -> bool {
        self.paramless_targets.contains(&target_type.to_uppercase())
    }

    /// Display alias for a resolved target name, if configured.
    pub fn output_alias(&self, target_type: &str) -> Option<&str> {
        self.output_aliases
            .get(&target_type.to_uppercase())
            .map(String::as_str)
    }
}

/// Parse a target type spec string such as `NUMBER(38,0)`,
/// `VARCHAR2(4000)` or `DOUBLE PRECISION` into a descriptor.
///
/// One parameter is read as a length, two as precision/scale; the
/// rendered output is identical either way.
pub(crate) fn parse_type_spec(spec: &str) -> std::result::Result<TypeDescriptor, String> {
    let spec = spec.trim();
    if spec.is_empty() {
        return Err("empty type spec".to_string());
    }

    let Some(open) = spec.find('(') else {
        return Ok(TypeDescriptor::plain(spec.to_uppercase()));
    };

    let name = spec[..open].trim();
    let rest = spec[open..].trim();
    if name.is_empty() {
        return Err(format!("type spec '{}' has no name", spec));
    }
    if !rest.ends_with(')') {
        return Err(format!("type spec '{}' has unbalanced parentheses", spec));
    }

    let params: Vec<&str> = rest[1..rest.len() - 1].split(',').collect();
    let mut values = Vec::with_capacity(params.len());
    for param in &params {
        let value: u32 = param
            .trim()
            .parse()
            .map_err(|_| format!("type spec '{}' has non-numeric parameter '{}'", spec, param))?;
        values.push(value);
    }

    match values.as_slice() {
        [size] => Ok(TypeDescriptor::sized(name.to_uppercase(), *size)),
        [precision, scale] => Ok(TypeDescriptor::numeric(
            name.to_uppercase(),
            *precision,
            Some(*scale),
        )),
        _ => Err(format!(
            "type spec '{}' has {} parameters (at most 2 supported)",
            spec,
            values.len()
        )),
    }
}
