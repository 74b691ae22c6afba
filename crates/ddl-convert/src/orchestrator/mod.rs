//! Conversion orchestrator - main workflow coordinator.
//!
//! Runs a batch of statements through the rewrite pipeline with a
//! bounded worker pool. Statement failures are recorded, never fatal:
//! one bad statement fails its own record and the batch keeps going.

use crate::classify;
use crate::comments;
use crate::core::diag::Diagnostic;
use crate::core::schema::Statement;
use crate::error::{ConvertError, Result};
use crate::ruleset::RuleSet;
use crate::strip;
use crate::typemap;
use crate::virtual_cols;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Default worker pool size.
pub const DEFAULT_WORKERS: usize = 4;

/// A batch conversion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionJob {
    /// Source dialect label (informational, passed to the printer).
    pub source_dialect: String,

    /// Target dialect label.
    pub target_dialect: String,

    /// Target version label for override lookup, if any.
    #[serde(default)]
    pub target_version: Option<String>,

    /// Statements in script order.
    pub statements: Vec<Statement>,
}

impl ConversionJob {
    /// Create a job for a dialect pair.
    pub fn new(source_dialect: impl Into<String>, target_dialect: impl Into<String>) -> Self {
        Self {
            source_dialect: source_dialect.into(),
            target_dialect: target_dialect.into(),
            target_version: None,
            statements: Vec::new(),
        }
    }

    /// Set the target version label.
    pub fn with_target_version(mut self, version: impl Into<String>) -> Self {
        self.target_version = Some(version.into());
        self
    }

    /// Set the statements to convert.
    pub fn with_statements(mut self, statements: Vec<Statement>) -> Self {
        self.statements = statements;
        self
    }
}

/// Per-statement conversion outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Converted; `produced` holds the output statements.
    Accepted,
    /// Dropped by a skip pattern; nothing produced.
    Skipped,
    /// Conversion failed; diagnostics explain why.
    Failed,
}

/// Result of converting one input statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionRecord {
    /// Position of the input statement in the job.
    pub index: usize,

    /// The original input statement.
    pub statement: Statement,

    /// What happened to it.
    pub outcome: Outcome,

    /// Output statements, in emission order: the rewritten statement
    /// first, then relocated comments, then any companion view.
    pub produced: Vec<Statement>,

    /// Everything worth telling the operator about this statement.
    pub diagnostics: Vec<Diagnostic>,
}

/// Result of a conversion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSummary {
    /// Unique run identifier.
    pub run_id: String,

    /// Final status: "completed", "failed" or "cancelled".
    pub status: String,

    /// Total duration in seconds.
    pub duration_seconds: f64,

    /// When the run started.
    pub started_at: DateTime<Utc>,

    /// When the run completed.
    pub completed_at: DateTime<Utc>,

    /// Total statements submitted.
    pub statements_total: usize,

    /// Statements converted successfully.
    pub accepted: usize,

    /// Statements dropped by skip patterns.
    pub skipped: usize,

    /// Statements that failed.
    pub failed: usize,

    /// Per-statement records, in input order.
    pub records: Vec<ConversionRecord>,
}

/// Conversion orchestrator.
pub struct Orchestrator {
    rules: Arc<RuleSet>,
    workers: usize,
}

impl Orchestrator {
    /// Create an orchestrator over a validated rule set.
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules: Arc::new(rules),
            workers: DEFAULT_WORKERS,
        }
    }

    /// Set the worker pool size.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Run the conversion.
    ///
    /// Cancellation takes effect between statements: in-flight
    /// statements finish, nothing new is dispatched, and the summary
    /// holds only the records completed before the cut.
    pub async fn run(
        &self,
        job: ConversionJob,
        cancel: Option<CancellationToken>,
    ) -> Result<JobSummary> {
        let started_at = Utc::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        let cancel = cancel.unwrap_or_default();

        info!(
            "Starting conversion run {}: {} statements, {} -> {}, {} workers",
            run_id,
            job.statements.len(),
            job.source_dialect,
            job.target_dialect,
            self.workers
        );

        let semaphore = Arc::new(Semaphore::new(self.workers));
        let statements_total = job.statements.len();
        let target_version = job.target_version.clone();

        let mut handles = Vec::new();
        let mut cancelled = false;

        for (index, statement) in job.statements.into_iter().enumerate() {
            if cancel.is_cancelled() {
                info!("Cancellation requested, stopping new conversions");
                cancelled = true;
                break;
            }

            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|_| ConvertError::Cancelled)?;
            let rules = self.rules.clone();
            let version = target_version.clone();

            let handle = tokio::spawn(async move {
                let record = convert_statement(&rules, version.as_deref(), index, statement);
                drop(permit);
                record
            });
            handles.push((index, handle));
        }

        // Awaiting in spawn order keeps records in input order.
        let mut records = Vec::with_capacity(handles.len());
        for (index, handle) in handles {
            match handle.await {
                Ok(record) => records.push(record),
                Err(e) => {
                    error!("statement {}: task panicked - {}", index, e);
                    records.push(ConversionRecord {
                        index,
                        statement: Statement::raw(crate::core::schema::StatementKind::Other, ""),
                        outcome: Outcome::Failed,
                        produced: Vec::new(),
                        diagnostics: vec![Diagnostic::error(
                            "task_panicked",
                            format!("conversion task panicked: {}", e),
                        )],
                    });
                }
            }
        }

        let accepted = records.iter().filter(|r| r.outcome == Outcome::Accepted).count();
        let skipped = records.iter().filter(|r| r.outcome == Outcome::Skipped).count();
        let failed = records.iter().filter(|r| r.outcome == Outcome::Failed).count();

        let status = if cancelled {
            "cancelled"
        } else if failed > 0 {
            "failed"
        } else {
            "completed"
        };

        let completed_at = Utc::now();
        let duration = (completed_at - started_at).num_milliseconds() as f64 / 1000.0;

        let summary = JobSummary {
            run_id,
            status: status.to_string(),
            duration_seconds: duration,
            started_at,
            completed_at,
            statements_total,
            accepted,
            skipped,
            failed,
            records,
        };

        info!(
            "Conversion {}: {}/{} accepted, {} skipped, {} failed in {:.1}s",
            summary.status,
            summary.accepted,
            summary.statements_total,
            summary.skipped,
            summary.failed,
            summary.duration_seconds
        );

        Ok(summary)
    }
}

/// Convert one statement through the full pipeline.
///
/// Pure and synchronous: skip check, type resolution, clause/property
/// stripping, comment relocation, virtual column rewriting. Errors
/// turn into a `Failed` record rather than propagating.
pub fn convert_statement(
    rules: &RuleSet,
    target_version: Option<&str>,
    index: usize,
    statement: Statement,
) -> ConversionRecord {
    let mut diagnostics = Vec::new();

    if let Some(pattern) = classify::skip_match(rules, &statement) {
        diagnostics.push(Diagnostic::info(
            "statement_skipped",
            format!("dropped by skip pattern '{}'", pattern.pattern),
        ));
        return ConversionRecord {
            index,
            statement,
            outcome: Outcome::Skipped,
            produced: Vec::new(),
            diagnostics,
        };
    }

    // Non-table statements pass through unrewritten.
    let Some(table) = statement.table.clone() else {
        debug!(index, "passing statement through unchanged");
        diagnostics.push(Diagnostic::info(
            "passthrough",
            "statement has no structured body; emitted unchanged",
        ));
        return ConversionRecord {
            index,
            statement: statement.clone(),
            outcome: Outcome::Accepted,
            produced: vec![statement],
            diagnostics,
        };
    };

    let mut table = table;

    if let Err(e) = typemap::resolve_columns(rules, target_version, &mut table, &mut diagnostics) {
        debug!(index, error = %e, "statement failed type resolution");
        return ConversionRecord {
            index,
            statement,
            outcome: Outcome::Failed,
            produced: Vec::new(),
            diagnostics,
        };
    }

    if let Err(e) = strip::strip(rules, &mut table, &mut diagnostics) {
        diagnostics.push(Diagnostic::error("clause_parse", e.to_string()));
        return ConversionRecord {
            index,
            statement,
            outcome: Outcome::Failed,
            produced: Vec::new(),
            diagnostics,
        };
    }

    let comment_statements = comments::extract(rules, &mut table, &mut diagnostics);
    let companion_view = virtual_cols::rewrite(rules, &mut table, &mut diagnostics);

    let mut produced = vec![Statement::table(table)];
    produced.extend(comment_statements);
    produced.extend(companion_view);

    ConversionRecord {
        index,
        statement,
        outcome: Outcome::Accepted,
        produced,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::{ColumnDef, StatementKind, TableDef, TypeDescriptor};
    use crate::ruleset::RuleSetDoc;

    fn rules() -> RuleSet {
        let doc: RuleSetDoc = serde_json::from_str(
            r#"{
                "default": {
                    "INT": "NUMBER(38,0)",
                    "VARCHAR": "VARCHAR2"
                },
                "dynamic_rules": {
                    "VARCHAR": {"max_size": 4000, "overflow_type": "CLOB", "template": "VARCHAR2({size})"}
                },
                "paramless_targets": ["CLOB"],
                "statement_skipping": {"enabled": true, "patterns": ["^CREATE\\s+TASK"]},
                "comment_conversion": {
                    "enabled": true,
                    "table_template": "COMMENT ON TABLE {table_name} IS '{comment_text}'",
                    "column_template": "COMMENT ON COLUMN {table_name}.{column_name} IS '{comment_text}'"
                }
            }"#,
        )
        .unwrap();
        RuleSet::from_doc(&doc).unwrap()
    }

    fn table_statement(name: &str, type_name: &str) -> Statement {
        let mut table = TableDef::new(name);
        table.columns.push(ColumnDef::new("c", TypeDescriptor::plain(type_name)));
        Statement::table(table)
    }

    #[test]
    fn test_convert_statement_accepts_and_rewrites() {
        let rules = rules();
        let record = convert_statement(&rules, None, 0, table_statement("t", "INT"));
        assert_eq!(record.outcome, Outcome::Accepted);
        assert_eq!(record.produced.len(), 1);
        let table = record.produced[0].table.as_ref().unwrap();
        assert_eq!(table.columns[0].data_type.render(), "NUMBER(38,0)");
    }

    #[test]
    fn test_convert_statement_skips_matching_text() {
        let rules = rules();
        let stmt = Statement::raw(StatementKind::Other, "CREATE TASK nightly ...");
        let record = convert_statement(&rules, None, 3, stmt);
        assert_eq!(record.outcome, Outcome::Skipped);
        assert!(record.produced.is_empty());
        assert_eq!(record.index, 3);
    }

    #[test]
    fn test_non_table_statement_passes_through() {
        let rules = rules();
        let stmt = Statement::raw(StatementKind::Grant, "GRANT SELECT ON t TO analyst");
        let record = convert_statement(&rules, None, 0, stmt.clone());
        assert_eq!(record.outcome, Outcome::Accepted);
        assert_eq!(record.produced, vec![stmt]);
        assert!(record.diagnostics.iter().any(|d| d.code == "passthrough"));
    }

    #[test]
    fn test_convert_statement_fails_on_unmapped_type() {
        let rules = rules();
        let record = convert_statement(&rules, None, 0, table_statement("t", "GEOGRAPHY"));
        assert_eq!(record.outcome, Outcome::Failed);
        assert!(record.produced.is_empty());
        assert!(record.diagnostics.iter().any(|d| d.code == "unmapped_type"));
    }

    #[test]
    fn test_comment_statements_follow_table_in_order() {
        let rules = rules();
        let mut table = TableDef::new("orders");
        table.comment = Some("order headers".to_string());
        let mut col = ColumnDef::new("id", TypeDescriptor::plain("INT"));
        col.comment = Some("key".to_string());
        table.columns.push(col);

        let record = convert_statement(&rules, None, 0, Statement::table(table));
        assert_eq!(record.outcome, Outcome::Accepted);
        assert_eq!(record.produced.len(), 3);
        assert_eq!(record.produced[0].kind, StatementKind::Table);
        assert!(record.produced[1].text.starts_with("COMMENT ON TABLE"));
        assert!(record.produced[2].text.starts_with("COMMENT ON COLUMN"));
    }

    #[tokio::test]
    async fn test_run_preserves_input_order_and_tolerates_failures() {
        let orchestrator = Orchestrator::new(rules()).with_workers(2);
        let job = ConversionJob::new("snowflake", "oracle").with_statements(vec![
            table_statement("a", "INT"),
            table_statement("b", "GEOGRAPHY"),
            table_statement("c", "VARCHAR"),
        ]);

        let summary = orchestrator.run(job, None).await.unwrap();
        assert_eq!(summary.status, "failed");
        assert_eq!(summary.statements_total, 3);
        assert_eq!(summary.accepted, 2);
        assert_eq!(summary.failed, 1);
        let indexes: Vec<usize> = summary.records.iter().map(|r| r.index).collect();
        assert_eq!(indexes, vec![0, 1, 2]);
        assert_eq!(summary.records[1].outcome, Outcome::Failed);
    }

    #[tokio::test]
    async fn test_run_all_accepted_is_completed() {
        let orchestrator = Orchestrator::new(rules());
        let job = ConversionJob::new("snowflake", "oracle")
            .with_statements(vec![table_statement("a", "INT")]);
        let summary = orchestrator.run(job, None).await.unwrap();
        assert_eq!(summary.status, "completed");
        assert_eq!(summary.failed, 0);
    }

    #[tokio::test]
    async fn test_cancelled_before_start_returns_no_records() {
        let orchestrator = Orchestrator::new(rules());
        let job = ConversionJob::new("snowflake", "oracle").with_statements(vec![
            table_statement("a", "INT"),
            table_statement("b", "INT"),
        ]);

        let token = CancellationToken::new();
        token.cancel();
        let summary = orchestrator.run(job, Some(token)).await.unwrap();
        assert_eq!(summary.status, "cancelled");
        assert!(summary.records.is_empty());
        assert_eq!(summary.statements_total, 2);
    }

    #[tokio::test]
    async fn test_cancellation_mid_batch_keeps_completed_records() {
        let orchestrator = Orchestrator::new(rules()).with_workers(1);
        let job = ConversionJob::new("snowflake", "oracle").with_statements(vec![
            table_statement("a", "INT"),
            table_statement("b", "INT"),
            table_statement("c", "INT"),
            table_statement("d", "INT"),
        ]);

        // On the current-thread runtime the canceller runs at the
        // first await that yields: the permit wait for statement 1,
        // by which point statement 0 is already dispatched.
        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            canceller.cancel();
        });

        let summary = orchestrator.run(job, Some(token)).await.unwrap();
        assert_eq!(summary.status, "cancelled");
        assert!(!summary.records.is_empty());
        assert!(summary.records.len() < summary.statements_total);
        let indexes: Vec<usize> = summary.records.iter().map(|r| r.index).collect();
        assert_eq!(indexes, (0..summary.records.len()).collect::<Vec<_>>());
        assert!(summary
            .records
            .iter()
            .all(|r| r.outcome == Outcome::Accepted));
    }

    #[tokio::test]
    async fn test_deterministic_across_runs() {
        let orchestrator = Orchestrator::new(rules()).with_workers(4);
        let statements = vec![
            table_statement("a", "INT"),
            table_statement("b", "VARCHAR"),
            table_statement("c", "INT"),
            table_statement("d", "VARCHAR"),
        ];

        let job = ConversionJob::new("snowflake", "oracle").with_statements(statements.clone());
        let first = orchestrator.run(job, None).await.unwrap();
        let job = ConversionJob::new("snowflake", "oracle").with_statements(statements);
        let second = orchestrator.run(job, None).await.unwrap();

        let first_out: Vec<_> = first.records.iter().map(|r| &r.produced).collect();
        let second_out: Vec<_> = second.records.iter().map(|r| &r.produced).collect();
        assert_eq!(first_out, second_out);
    }
}
