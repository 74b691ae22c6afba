//! Core types shared across the conversion engine.

pub mod diag;
pub mod schema;
pub mod traits;

pub use diag::{Diagnostic, Severity};
pub use schema::{
    ColumnDef, ColumnExpression, Statement, StatementKind, TableClause, TableDef, TypeDescriptor,
    WithProperty,
};
pub use traits::{SchemaParser, SchemaPrinter};
