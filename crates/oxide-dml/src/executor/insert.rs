use tracing::{debug, warn};

use oxide_dml_core::ast::InsertStatement;

use super::{counts, first_error, DmlExecutor, Execution};
use crate::backend::{fields_to_json, RecordBackend};
use crate::error::{ExecError, Result};
use crate::resolver::RecordTypeResolver;
use crate::result::{InsertOutcome, RowFailure};

impl<B: RecordBackend, R: RecordTypeResolver> DmlExecutor<B, R> {
    pub(super) fn execute_insert(&mut self, stmt: &InsertStatement) -> Result<Execution> {
        let record_type = self.resolve(&stmt.table_name)?;
        let type_id = &record_type.backend_type_id;
        let rows = stmt.rows.rows();

        if stmt.is_preview {
            let outcome = InsertOutcome {
                record_type: type_id.clone(),
                is_preview_only: true,
                row_count: rows.len(),
                rows: rows
                    .iter()
                    .take(self.config.max_preview_rows)
                    .map(|fields| fields_to_json(fields))
                    .collect(),
                created_ids: Vec::new(),
                failures: Vec::new(),
            };
            return Ok(Execution {
                message: format!(
                    "Preview: would insert {} record(s) into {type_id}. Add COMMIT to execute.",
                    rows.len()
                ),
                result: serde_json::to_value(&outcome)?,
                counts: counts([("rowCount", rows.len())]),
            });
        }

        let mut created_ids = Vec::new();
        let mut failures = Vec::new();
        for (index, fields) in rows.iter().enumerate() {
            match self.backend.create_record(type_id, fields) {
                Ok(id) => {
                    debug!(record_type = %type_id, id = %id, "record created");
                    created_ids.push(id);
                }
                Err(e) => {
                    warn!(record_type = %type_id, row = index + 1, error = %e, "insert failed");
                    failures.push(RowFailure {
                        id: None,
                        row: Some(index + 1),
                        error: e.to_string(),
                    });
                }
            }
        }

        if created_ids.is_empty() && !failures.is_empty() {
            return Err(ExecError::CreateFailed {
                target: type_id.clone(),
                message: first_error(&failures),
            });
        }

        let mut message = format!(
            "Inserted {} of {} record(s) into {type_id}",
            created_ids.len(),
            rows.len()
        );
        if !failures.is_empty() {
            message.push_str(&format!("; {} failed", failures.len()));
        }
        let execution_counts = counts([
            ("rowCount", rows.len()),
            ("createdCount", created_ids.len()),
            ("failedCount", failures.len()),
        ]);
        let outcome = InsertOutcome {
            record_type: type_id.clone(),
            is_preview_only: false,
            row_count: rows.len(),
            rows: Vec::new(),
            created_ids,
            failures,
        };
        Ok(Execution {
            message,
            result: serde_json::to_value(&outcome)?,
            counts: execution_counts,
        })
    }
}
