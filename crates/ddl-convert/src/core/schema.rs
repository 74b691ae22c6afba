//! Statement object model shared with the external parser.
//!
//! These types provide a dialect-agnostic representation of schema
//! DDL as handed over by the external SQL parser. The engine rewrites
//! this model; it never tokenizes SQL text itself.

use serde::{Deserialize, Serialize};

/// Coarse statement classification supplied by the external parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    /// CREATE TABLE and friends.
    Table,
    /// CREATE VIEW.
    View,
    /// CREATE FUNCTION.
    Function,
    /// CREATE PROCEDURE.
    Procedure,
    /// GRANT / REVOKE.
    Grant,
    /// Anything else (tasks, stages, comments, session settings, ...).
    Other,
}

/// A single source or target statement.
///
/// Source statements carry the raw text used for skip-pattern matching
/// plus, for table DDL, a structured [`TableDef`]. Target statements
/// produced by the engine either keep a rewritten `table` body (the
/// printer seam renders it) or carry pre-rendered `text` (comment and
/// companion-view statements).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    /// Statement classification.
    pub kind: StatementKind,

    /// Raw statement text. Used for skip matching on input statements
    /// and as the rendered form of template-generated output.
    #[serde(default)]
    pub text: String,

    /// Structured table definition, present for table DDL.
    #[serde(default)]
    pub table: Option<TableDef>,
}

impl Statement {
    /// Create a raw statement of the given kind.
    pub fn raw(kind: StatementKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            table: None,
        }
    }

    /// Create a table statement from a structured definition.
    pub fn table(def: TableDef) -> Self {
        Self {
            kind: StatementKind::Table,
            text: String::new(),
            table: Some(def),
        }
    }
}

/// Structured CREATE TABLE definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDef {
    /// Table name (possibly schema-qualified).
    pub name: String,

    /// Whether the source statement was CREATE OR REPLACE.
    #[serde(default)]
    pub or_replace: bool,

    /// Column definitions in declaration order.
    pub columns: Vec<ColumnDef>,

    /// Inline table comment, if any.
    #[serde(default)]
    pub comment: Option<String>,

    /// Trailing physical/metadata clauses (CLUSTER BY, ...).
    #[serde(default)]
    pub clauses: Vec<TableClause>,

    /// WITH-style key/value properties.
    #[serde(default)]
    pub properties: Vec<WithProperty>,
}

impl TableDef {
    /// Create an empty table definition.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            or_replace: false,
            columns: Vec::new(),
            comment: None,
            clauses: Vec::new(),
            properties: Vec::new(),
        }
    }
}

/// Column definition within a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Column name.
    pub name: String,

    /// Declared data type.
    pub data_type: TypeDescriptor,

    /// Whether the column allows NULL.
    #[serde(default = "default_true")]
    pub nullable: bool,

    /// Inline column comment, if any.
    #[serde(default)]
    pub comment: Option<String>,

    /// Computed/virtual column expression, if any.
    #[serde(default)]
    pub expression: Option<ColumnExpression>,

    /// Whether the column is an identity column. Identity columns are
    /// never treated as virtual columns.
    #[serde(default)]
    pub is_identity: bool,
}

impl ColumnDef {
    /// Create a plain nullable column.
    pub fn new(name: impl Into<String>, data_type: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
            comment: None,
            expression: None,
            is_identity: false,
        }
    }
}

/// Expression backing a computed column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "form", content = "expression")]
pub enum ColumnExpression {
    /// Source-dialect computed column (`col AS (expr)`).
    Computed(String),
    /// Target-native virtual column (`GENERATED ALWAYS AS (expr) VIRTUAL`).
    GeneratedVirtual(String),
}

impl ColumnExpression {
    /// The underlying expression text.
    pub fn text(&self) -> &str {
        match self {
            ColumnExpression::Computed(e) | ColumnExpression::GeneratedVirtual(e) => e,
        }
    }
}

/// A trailing table clause identified by its leading keyword sequence.
///
/// Example: `CLUSTER BY (region, load_date)` has keywords
/// `"CLUSTER BY"` and body `"(region, load_date)"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableClause {
    /// Leading keyword sequence, whitespace separated.
    pub keywords: String,

    /// Remainder of the clause text.
    #[serde(default)]
    pub body: String,
}

impl TableClause {
    /// Create a clause from keywords and body.
    pub fn new(keywords: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            keywords: keywords.into(),
            body: body.into(),
        }
    }
}

/// A single WITH-property key/value pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithProperty {
    /// Property key.
    pub key: String,

    /// Property value, if the property carries one.
    #[serde(default)]
    pub value: Option<String>,
}

impl WithProperty {
    /// Create a key/value property.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
        }
    }
}

/// A data type descriptor: name plus optional parameters.
///
/// Length-style types carry `size`; numeric types carry
/// `precision`/`scale`. At most one of the two shapes is populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// Type name (e.g. "VARCHAR", "NUMBER", "TIMESTAMP_NTZ").
    pub name: String,

    /// Length parameter for string/binary types.
    #[serde(default)]
    pub size: Option<u32>,

    /// Numeric precision.
    #[serde(default)]
    pub precision: Option<u32>,

    /// Numeric scale.
    #[serde(default)]
    pub scale: Option<u32>,
}

impl TypeDescriptor {
    /// A bare type with no parameters.
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size: None,
            precision: None,
            scale: None,
        }
    }

    /// A length-parameterized type.
    pub fn sized(name: impl Into<String>, size: u32) -> Self {
        Self {
            size: Some(size),
            ..Self::plain(name)
        }
    }

    /// A precision/scale-parameterized type.
    pub fn numeric(name: impl Into<String>, precision: u32, scale: Option<u32>) -> Self {
        Self {
            precision: Some(precision),
            scale,
            ..Self::plain(name)
        }
    }

    /// Whether the descriptor carries any parameter.
    pub fn has_params(&self) -> bool {
        self.size.is_some() || self.precision.is_some() || self.scale.is_some()
    }

    /// Drop all parameters, keeping the name.
    pub fn strip_params(&mut self) {
        self.size = None;
        self.precision = None;
        self.scale = None;
    }

    /// Copy parameters (not the name) from another descriptor.
    pub fn copy_params_from(&mut self, other: &TypeDescriptor) {
        self.size = other.size;
        self.precision = other.precision;
        self.scale = other.scale;
    }

    /// Render the descriptor as SQL type text.
    pub fn render(&self) -> String {
        if let Some(size) = self.size {
            format!("{}({})", self.name, size)
        } else if let Some(precision) = self.precision {
            match self.scale {
                Some(scale) => format!("{}({},{})", self.name, precision, scale),
                None => format!("{}({})", self.name, precision),
            }
        } else {
            self.name.clone()
        }
    }
}

fn default_true() -> bool {
    true
}
