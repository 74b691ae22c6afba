//! Seam traits for the external SQL parser and printer.
//!
//! The engine never tokenizes or renders source-dialect SQL itself.
//! Deployments plug their parser/printer in at these traits; the
//! bundled [`crate::render::TextRenderer`] implements the printer side
//! for the structured object model.

use crate::core::schema::Statement;
use crate::error::Result;

/// Parses dialect-specific DDL text into the statement object model.
///
/// Implementations are expected to tag each statement with its
/// [`crate::core::schema::StatementKind`] and, for table DDL, attach a
/// structured [`crate::core::schema::TableDef`].
pub trait SchemaParser: Send + Sync {
    /// Parse a script into an ordered statement sequence.
    fn parse(&self, text: &str, dialect: &str) -> Result<Vec<Statement>>;
}

/// Prints a statement back to dialect-specific text.
pub trait SchemaPrinter: Send + Sync {
    /// Render one statement as SQL text.
    fn print(&self, statement: &Statement, dialect: &str) -> Result<String>;
}
