//! Error types for the conversion engine.

use thiserror::Error;

/// Main error type for conversion operations.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// Invalid rule set. Fatal: the job never starts.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// No resolvable target type. Fails only the owning statement.
    #[error("no mapping for source type '{type_name}' (column '{column}')")]
    UnmappedType { column: String, type_name: String },

    /// Malformed clause or property node. Fails only the owning statement.
    #[error("malformed clause in table '{table}': {message}")]
    ClauseParse { table: String, message: String },

    /// Unescapable comment text. Fails only the comment sub-step.
    #[error("comment on '{target}' cannot be escaped: {message}")]
    CommentEscape { target: String, message: String },

    /// Conversion was cancelled between statements.
    #[error("conversion cancelled")]
    Cancelled,

    /// The batch ran to completion but some statements failed.
    #[error("{failed} statement(s) failed to convert")]
    PartialFailure { failed: usize },

    /// IO error (rule set or batch file operations).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ConvertError {
    /// Create an UnmappedType error.
    pub fn unmapped(column: impl Into<String>, type_name: impl Into<String>) -> Self {
        ConvertError::UnmappedType {
            column: column.into(),
            type_name: type_name.into(),
        }
    }

    /// Create a ClauseParse error.
    pub fn clause(table: impl Into<String>, message: impl Into<String>) -> Self {
        ConvertError::ClauseParse {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Create a CommentEscape error.
    pub fn comment(target: impl Into<String>, message: impl Into<String>) -> Self {
        ConvertError::CommentEscape {
            target: target.into(),
            message: message.into(),
        }
    }

    /// Process exit code for CLI use.
    pub fn exit_code(&self) -> u8 {
        match self {
            ConvertError::Config(_) | ConvertError::Json(_) | ConvertError::Yaml(_) => 1,
            ConvertError::UnmappedType { .. }
            | ConvertError::ClauseParse { .. }
            | ConvertError::CommentEscape { .. }
            | ConvertError::PartialFailure { .. } => 2,
            ConvertError::Io(_) => 7,
            ConvertError::Cancelled => 130,
        }
    }

    /// Format error with full details including error chain.
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Rule set validation failure carrying every issue found, not just
/// the first, so a configuration can be fixed in one pass.
#[derive(Error, Debug)]
pub struct ConfigError {
    /// All validation issues, in document order.
    pub issues: Vec<String>,
}

impl ConfigError {
    /// Wrap a list of validation issues.
    pub fn new(issues: Vec<String>) -> Self {
        Self { issues }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid rule set ({} issue(s)):", self.issues.len())?;
        for issue in &self.issues {
            write!(f, "\n  - {}", issue)?;
        }
        Ok(())
    }
}

/// Result type alias for conversion operations.
pub type Result<T> = std::result::Result<T, ConvertError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_lists_every_issue() {
        let err = ConfigError::new(vec![
            "dynamic_rules.VARCHAR: max_size must be positive".to_string(),
            "statement_skipping.patterns[0]: invalid regex".to_string(),
        ]);
        let text = err.to_string();
        assert!(text.contains("2 issue(s)"));
        assert!(text.contains("max_size must be positive"));
        assert!(text.contains("invalid regex"));
    }

    #[test]
    fn test_unmapped_type_message() {
        let err = ConvertError::unmapped("payload", "SQL_VARIANT");
        assert_eq!(
            err.to_string(),
            "no mapping for source type 'SQL_VARIANT' (column 'payload')"
        );
    }
}
