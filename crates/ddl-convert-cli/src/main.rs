//! ddl-convert CLI - Configuration-driven cross-dialect DDL rewriting.

use clap::{Parser, Subcommand};
use ddl_convert::{
    ConversionJob, ConvertError, Orchestrator, Outcome, RuleSet, SchemaPrinter, Statement,
    TextRenderer,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{info, Level};
use tracing_subscriber::fmt::format::FmtSpan;

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

#[derive(Parser)]
#[command(name = "ddl-convert")]
#[command(about = "Configuration-driven cross-dialect DDL rewriting")]
#[command(version)]
struct Cli {
    /// Path to the rule set file (JSON or YAML)
    #[arg(short, long, default_value = "rules.yaml")]
    rules: PathBuf,

    /// Output JSON summary to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a batch of parsed statements
    Convert {
        /// Path to the statements file (JSON array of parsed statements)
        #[arg(short, long)]
        input: PathBuf,

        /// Write converted SQL here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Source dialect label
        #[arg(long, default_value = "snowflake")]
        source: String,

        /// Target dialect label
        #[arg(long, default_value = "oracle")]
        target: String,

        /// Target version label for override lookup
        #[arg(long)]
        target_version: Option<String>,

        /// Override number of workers
        #[arg(long)]
        workers: Option<usize>,
    },

    /// Validate a rule set without converting anything
    Check,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), ConvertError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format);

    let rules = RuleSet::load(&cli.rules)?;
    info!("Loaded rule set from {:?}", cli.rules);

    match cli.command {
        Commands::Check => {
            // Loading already validated; just report.
            println!("Rule set OK: {:?}", cli.rules);
        }

        Commands::Convert {
            input,
            output,
            source,
            target,
            target_version,
            workers,
        } => {
            let statements: Vec<Statement> =
                serde_json::from_str(&std::fs::read_to_string(&input)?)?;
            info!("Loaded {} statements from {:?}", statements.len(), input);

            let mut job = ConversionJob::new(source, target.clone()).with_statements(statements);
            if let Some(version) = target_version {
                job = job.with_target_version(version);
            }

            let mut orchestrator = Orchestrator::new(rules);
            if let Some(w) = workers {
                orchestrator = orchestrator.with_workers(w);
            }

            let cancel_token = setup_signal_handler();
            let summary = orchestrator.run(job, Some(cancel_token)).await?;

            let renderer = TextRenderer::new();
            let mut rendered = Vec::new();
            for record in &summary.records {
                if record.outcome != Outcome::Accepted {
                    continue;
                }
                for statement in &record.produced {
                    rendered.push(renderer.print(statement, &target)?);
                }
            }
            let script = if rendered.is_empty() {
                String::new()
            } else {
                format!("{};\n", rendered.join(";\n\n"))
            };

            match output {
                Some(path) => {
                    std::fs::write(&path, script)?;
                    info!("Wrote converted SQL to {:?}", path);
                }
                None => print!("{}", script),
            }

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                eprintln!("\nConversion {}", summary.status);
                eprintln!("  Run ID: {}", summary.run_id);
                eprintln!("  Duration: {:.2}s", summary.duration_seconds);
                eprintln!(
                    "  Statements: {}/{} accepted, {} skipped, {} failed",
                    summary.accepted, summary.statements_total, summary.skipped, summary.failed
                );
                for record in summary.records.iter().filter(|r| r.outcome == Outcome::Failed) {
                    for diag in &record.diagnostics {
                        eprintln!("  statement {}: [{}] {}", record.index, diag.code, diag.message);
                    }
                }
            }

            if summary.failed > 0 {
                return Err(ConvertError::PartialFailure {
                    failed: summary.failed,
                });
            }
        }
    }

    Ok(())
}

fn setup_logging(verbosity: &str, format: &str) {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(std::io::stderr);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

/// Setup signal handlers for graceful shutdown (SIGINT and SIGTERM).
/// Returns a token cancelled when a signal arrives; in-flight
/// statements finish before the run stops.
#[cfg(unix)]
fn setup_signal_handler() -> CancellationToken {
    let cancel_token = CancellationToken::new();

    let token_int = cancel_token.clone();
    tokio::spawn(async move {
        let mut sigint = signal(SignalKind::interrupt()).expect("Failed to setup SIGINT handler");
        sigint.recv().await;
        eprintln!("\nReceived SIGINT. Finishing in-flight statements...");
        token_int.cancel();
    });

    let token_term = cancel_token.clone();
    tokio::spawn(async move {
        let mut sigterm = signal(SignalKind::terminate()).expect("Failed to setup SIGTERM handler");
        sigterm.recv().await;
        eprintln!("\nReceived SIGTERM. Finishing in-flight statements...");
        token_term.cancel();
    });

    cancel_token
}

#[cfg(not(unix))]
fn setup_signal_handler() -> CancellationToken {
    let cancel_token = CancellationToken::new();
    let token = cancel_token.clone();

    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to setup Ctrl-C handler");
        eprintln!("\nReceived Ctrl-C. Finishing in-flight statements...");
        token.cancel();
    });

    cancel_token
}
