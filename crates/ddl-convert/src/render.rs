//! Text rendering of converted statements.

use crate::core::schema::{ColumnDef, ColumnExpression, Statement, TableDef};
use crate::core::traits::SchemaPrinter;
use crate::error::Result;

/// Renders the structured object model as plain SQL text.
///
/// Pre-rendered statements (relocated comments, companion views) pass
/// through unchanged; table statements are rendered from their
/// structured definition. Deployments with a full-fidelity printer
/// implement [`SchemaPrinter`] themselves instead.
#[derive(Debug, Default)]
pub struct TextRenderer;

impl TextRenderer {
    pub fn new() -> Self {
        Self
    }

    fn render_table(&self, table: &TableDef) -> String {
        let mut out = String::new();
        if table.or_replace {
            out.push_str(&format!("CREATE OR REPLACE TABLE {} (\n", table.name));
        } else {
            out.push_str(&format!("CREATE TABLE {} (\n", table.name));
        }

        let columns: Vec<String> = table
            .columns
            .iter()
            .map(|c| format!("    {}", self.render_column(c)))
            .collect();
        out.push_str(&columns.join(",\n"));
        out.push_str("\n)");

        for clause in &table.clauses {
            out.push('\n');
            out.push_str(clause.keywords.trim());
            if !clause.body.trim().is_empty() {
                out.push(' ');
                out.push_str(clause.body.trim());
            }
        }

        if !table.properties.is_empty() {
            let props: Vec<String> = table
                .properties
                .iter()
                .map(|p| match &p.value {
                    Some(value) => format!("{} = {}", p.key, value),
                    None => p.key.clone(),
                })
                .collect();
            out.push_str(&format!("\nWITH ({})", props.join(", ")));
        }

        out
    }

    fn render_column(&self, column: &ColumnDef) -> String {
        let mut out = format!("{} {}", column.name, column.data_type.render());
        match &column.expression {
            Some(ColumnExpression::GeneratedVirtual(expr)) => {
                out.push_str(&format!(" GENERATED ALWAYS AS ({}) VIRTUAL", expr));
            }
            Some(ColumnExpression::Computed(expr)) => {
                out.push_str(&format!(" AS ({})", expr));
            }
            None => {}
        }
        if !column.nullable {
            out.push_str(" NOT NULL");
        }
        out
    }
}

impl SchemaPrinter for TextRenderer {
    fn print(&self, statement: &Statement, _dialect: &str) -> Result<String> {
        if !statement.text.is_empty() {
            return Ok(statement.text.clone());
        }
        match &statement.table {
            Some(table) => Ok(self.render_table(table)),
            None => Ok(String::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::{StatementKind, TableClause, TypeDescriptor, WithProperty};

    #[test]
    fn test_render_table_with_clauses_and_properties() {
        let mut table = TableDef::new("orders");
        table.columns.push(ColumnDef::new(
            "id",
            TypeDescriptor::numeric("NUMBER", 38, Some(0)),
        ));
        let mut name = ColumnDef::new("name", TypeDescriptor::sized("VARCHAR2", 100));
        name.nullable = false;
        table.columns.push(name);
        table.clauses.push(TableClause::new("PARTITION BY", "(load_date)"));
        table.properties.push(WithProperty::new("CHANGE_TRACKING", "TRUE"));

        let renderer = TextRenderer::new();
        let sql = renderer.print(&Statement::table(table), "oracle").unwrap();
        assert_eq!(
            sql,
            "CREATE TABLE orders (\n    id NUMBER(38,0),\n    name VARCHAR2(100) NOT NULL\n)\nPARTITION BY (load_date)\nWITH (CHANGE_TRACKING = TRUE)"
        );
    }

    #[test]
    fn test_render_virtual_column() {
        let mut table = TableDef::new("t");
        let mut col = ColumnDef::new("total", TypeDescriptor::numeric("NUMBER", 10, Some(2)));
        col.expression = Some(ColumnExpression::GeneratedVirtual("net * 1.2".to_string()));
        table.columns.push(col);

        let sql = TextRenderer::new().print(&Statement::table(table), "oracle").unwrap();
        assert!(sql.contains("total NUMBER(10,2) GENERATED ALWAYS AS (net * 1.2) VIRTUAL"));
    }

    #[test]
    fn test_prerendered_text_passes_through() {
        let stmt = Statement::raw(StatementKind::Other, "COMMENT ON TABLE t IS 'x'");
        let sql = TextRenderer::new().print(&stmt, "oracle").unwrap();
        assert_eq!(sql, "COMMENT ON TABLE t IS 'x'");
    }
}
