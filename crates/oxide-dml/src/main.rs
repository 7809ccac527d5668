//! oxide-dml CLI
//!
//! Runs one statement against an in-memory store loaded from a JSON fixture
//! and prints the result envelope as JSON.

use std::io::Read;
use std::path::PathBuf;

use clap::Parser;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use oxide_dml::prelude::*;

/// Preview or commit DML/DDL statements against a record store.
#[derive(Parser)]
#[command(name = "oxide-dml")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON fixture with the initial records (`{"type": [{"id": ...}]}`).
    #[arg(short, long, env = "OXIDE_DML_FIXTURE")]
    fixture: Option<PathBuf>,

    /// Rows requested per search page.
    #[arg(long, env = "OXIDE_DML_PAGE_SIZE", default_value_t = oxide_dml::config::DEFAULT_PAGE_SIZE)]
    page_size: usize,

    /// Ids or rows listed in preview results.
    #[arg(long, default_value_t = oxide_dml::config::DEFAULT_MAX_PREVIEW_ROWS)]
    max_preview_rows: usize,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    /// Print the store contents after the statement.
    #[arg(long)]
    dump: bool,

    /// Statement to run. Read from stdin when omitted.
    sql: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays valid JSON
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let sql = match cli.sql {
        Some(sql) => sql,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let backend = match &cli.fixture {
        Some(path) => {
            debug!(path = %path.display(), "loading fixture");
            InMemoryBackend::load_fixture(path)?
        }
        None => InMemoryBackend::new(),
    };
    let config = ExecutorConfig::default()
        .with_page_size(cli.page_size)
        .with_max_preview_rows(cli.max_preview_rows);
    let mut executor = DmlExecutor::new(backend, config);

    let result = executor.run(&sql);
    println!("{}", serde_json::to_string_pretty(&result)?);
    if cli.dump {
        println!("{}", serde_json::to_string_pretty(&executor.backend().snapshot())?);
    }

    if !result.success {
        std::process::exit(1);
    }
    Ok(())
}
