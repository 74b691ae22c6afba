//! # ddl-convert
//!
//! Configuration-driven DDL rewrite engine for cross-dialect schema
//! migration.
//!
//! The engine takes parsed schema statements plus a per-dialect-pair
//! rule set and rewrites them for the target platform:
//!
//! - **Type mapping** with version overrides, dynamic sizing and
//!   overflow fallbacks
//! - **Statement skipping** by anchored regex patterns
//! - **Clause and WITH-property stripping** on table definitions
//! - **Comment relocation** into standalone target statements
//! - **Virtual column rewriting** (native syntax or view demotion)
//! - **Partial-failure batches**: a bad statement fails its own record
//!   and the rest of the job keeps going
//!
//! ## Example
//!
//! ```rust,no_run
//! use ddl_convert::{ConversionJob, Orchestrator, RuleSet};
//!
//! #[tokio::main]
//! async fn main() -> ddl_convert::Result<()> {
//!     let rules = RuleSet::load("snowflake-to-oracle.yaml")?;
//!     let orchestrator = Orchestrator::new(rules);
//!     let job = ConversionJob::new("snowflake", "oracle");
//!     let summary = orchestrator.run(job, None).await?;
//!     println!("Converted {} statements", summary.accepted);
//!     Ok(())
//! }
//! ```

pub mod classify;
pub mod comments;
pub mod core;
pub mod error;
pub mod orchestrator;
pub mod render;
pub mod ruleset;
pub mod strip;
pub mod typemap;
pub mod virtual_cols;

// Re-exports for convenient access
pub use crate::core::diag::{Diagnostic, Severity};
pub use crate::core::schema::{
    ColumnDef, ColumnExpression, Statement, StatementKind, TableClause, TableDef, TypeDescriptor,
    WithProperty,
};
pub use crate::core::traits::{SchemaParser, SchemaPrinter};
pub use error::{ConfigError, ConvertError, Result};
pub use orchestrator::{ConversionJob, ConversionRecord, JobSummary, Orchestrator, Outcome};
pub use render::TextRenderer;
pub use ruleset::{RuleSet, RuleSetDoc, VirtualColumnPolicy};
