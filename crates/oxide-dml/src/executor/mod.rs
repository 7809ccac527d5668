//! Statement execution.
//!
//! [`DmlExecutor::run`] is the statement boundary: it classifies, parses and
//! executes one statement and always answers with a [`QueryResult`], never
//! an error or a panic. INSERT, UPDATE and DELETE honor the preview flag and
//! only touch the backend when the statement ends with `COMMIT`.

mod create;
mod delete;
mod insert;
mod update;

use std::time::Instant;

use oxide_dml_core::{classify, parse_statement, Condition, DmlStatement};
use serde_json::{Map, Value as JsonValue};
use tracing::{error, info};

use crate::backend::{RecordBackend, RecordId};
use crate::config::ExecutorConfig;
use crate::error::{ExecError, Result};
use crate::planner::Planner;
use crate::resolver::{ConventionResolver, RecordTypeDescriptor, RecordTypeResolver};
use crate::result::{QueryResult, RowFailure};

/// What a successfully executed statement reports.
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    /// Human-readable summary.
    pub message: String,
    /// Serialized outcome payload.
    pub result: JsonValue,
    /// Counts merged into the result metadata.
    pub counts: Map<String, JsonValue>,
}

/// Executes statements against a backend.
pub struct DmlExecutor<B: RecordBackend, R: RecordTypeResolver = ConventionResolver> {
    backend: B,
    resolver: R,
    config: ExecutorConfig,
}

impl<B: RecordBackend> DmlExecutor<B> {
    /// Creates an executor resolving table names by convention.
    pub fn new(backend: B, config: ExecutorConfig) -> Self {
        Self::with_resolver(backend, ConventionResolver, config)
    }
}

impl<B: RecordBackend, R: RecordTypeResolver> DmlExecutor<B, R> {
    /// Creates an executor with a custom record-type resolver.
    pub fn with_resolver(backend: B, resolver: R, config: ExecutorConfig) -> Self {
        Self {
            backend,
            resolver,
            config,
        }
    }

    /// Returns the backend.
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Returns the backend mutably.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Consumes the executor, returning the backend.
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Returns the configuration.
    pub const fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Runs one statement and reports the outcome.
    pub fn run(&mut self, sql: &str) -> QueryResult {
        let started = Instant::now();
        let mut metadata = Map::new();

        let outcome = self.run_inner(sql, &mut metadata);
        metadata.insert("elapsedMs".into(), elapsed_ms(started).into());

        match outcome {
            Ok(execution) => {
                metadata.extend(execution.counts);
                QueryResult::success(execution.message, execution.result, metadata)
            }
            Err(e) => {
                error!(error = %e, kind = e.code(), "statement failed");
                QueryResult::failure(&e, metadata)
            }
        }
    }

    fn run_inner(&mut self, sql: &str, metadata: &mut Map<String, JsonValue>) -> Result<Execution> {
        let kind = classify(sql).ok_or(ExecError::NotDml)?;
        metadata.insert("statementType".into(), kind.as_str().into());

        let statement = parse_statement(sql)?;
        metadata.insert("table".into(), statement.target().into());
        if let Some(is_preview) = statement.is_preview() {
            metadata.insert("isPreviewOnly".into(), is_preview.into());
        }

        self.execute(&statement)
    }

    /// Parses and executes one statement, propagating errors.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement does not parse or fails as a
    /// whole.
    pub fn execute_sql(&mut self, sql: &str) -> Result<Execution> {
        classify(sql).ok_or(ExecError::NotDml)?;
        let statement = parse_statement(sql)?;
        self.execute(&statement)
    }

    /// Executes a parsed statement.
    ///
    /// # Errors
    ///
    /// Returns an error if planning fails, the parent definition of a
    /// CREATE cannot be created, or every row of a mutation fails.
    pub fn execute(&mut self, statement: &DmlStatement) -> Result<Execution> {
        info!(
            kind = %statement.kind(),
            target = statement.target(),
            is_preview = ?statement.is_preview(),
            "executing statement"
        );
        let execution = match statement {
            DmlStatement::Insert(stmt) => self.execute_insert(stmt),
            DmlStatement::Update(stmt) => self.execute_update(stmt),
            DmlStatement::Delete(stmt) => self.execute_delete(stmt),
            DmlStatement::CreateRecord(stmt) => self.execute_create_record(stmt),
            DmlStatement::CreateList(stmt) => self.execute_create_list(stmt),
        }?;
        info!(message = %execution.message, "statement finished");
        Ok(execution)
    }

    fn resolve(&self, table: &str) -> Result<RecordTypeDescriptor> {
        self.resolver.resolve(table)
    }

    fn matching_ids(
        &self,
        record_type: &RecordTypeDescriptor,
        condition: &Condition,
    ) -> Result<Vec<RecordId>> {
        Planner::new(&self.backend, record_type, self.config.page_size).matching_ids(condition)
    }

    /// Caps a listing for preview output.
    fn preview_ids(&self, ids: &[RecordId]) -> Vec<RecordId> {
        ids.iter().take(self.config.max_preview_rows).cloned().collect()
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn counts<const N: usize>(entries: [(&str, usize); N]) -> Map<String, JsonValue> {
    entries
        .into_iter()
        .map(|(key, count)| (key.to_string(), count.into()))
        .collect()
}

fn id_failure(id: &RecordId, error: impl std::fmt::Display) -> RowFailure {
    RowFailure {
        id: Some(id.clone()),
        row: None,
        error: error.to_string(),
    }
}

fn first_error(failures: &[RowFailure]) -> String {
    failures
        .first()
        .map(|f| f.error.clone())
        .unwrap_or_default()
}
