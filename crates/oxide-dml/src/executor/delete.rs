use tracing::{debug, warn};

use oxide_dml_core::ast::DeleteStatement;

use super::{counts, first_error, id_failure, DmlExecutor, Execution};
use crate::backend::RecordBackend;
use crate::error::{ExecError, Result};
use crate::resolver::RecordTypeResolver;
use crate::result::DeleteOutcome;

impl<B: RecordBackend, R: RecordTypeResolver> DmlExecutor<B, R> {
    /// Deletes matches one at a time. A partial failure is reported
    /// alongside the deleted ids; only a total failure is an error.
    pub(super) fn execute_delete(&mut self, stmt: &DeleteStatement) -> Result<Execution> {
        let record_type = self.resolve(&stmt.table_name)?;
        let type_id = record_type.backend_type_id.clone();
        let ids = self.matching_ids(&record_type, &stmt.where_clause)?;
        debug!(record_type = %type_id, matched = ids.len(), "delete matches");

        if stmt.is_preview {
            let outcome = DeleteOutcome {
                record_type: type_id.clone(),
                is_preview_only: true,
                matched_count: ids.len(),
                matched_ids: self.preview_ids(&ids),
                deleted_ids: Vec::new(),
                failures: Vec::new(),
            };
            return Ok(Execution {
                message: format!(
                    "Preview: would delete {} record(s) from {type_id}. Add COMMIT to execute.",
                    ids.len()
                ),
                result: serde_json::to_value(&outcome)?,
                counts: counts([("matchedCount", ids.len())]),
            });
        }

        let mut deleted_ids = Vec::new();
        let mut failures = Vec::new();
        for id in &ids {
            match self.backend.delete_record(&type_id, id) {
                Ok(()) => deleted_ids.push(id.clone()),
                Err(e) => {
                    warn!(record_type = %type_id, id = %id, error = %e, "delete failed");
                    failures.push(id_failure(id, e));
                }
            }
        }

        if deleted_ids.is_empty() && !failures.is_empty() {
            return Err(ExecError::DeleteFailed {
                record_type: type_id,
                attempted: ids.len(),
                first_error: first_error(&failures),
            });
        }

        let mut message = format!(
            "Deleted {} of {} matched record(s) from {type_id}",
            deleted_ids.len(),
            ids.len()
        );
        if !failures.is_empty() {
            message.push_str(&format!("; {} failed", failures.len()));
        }
        let execution_counts = counts([
            ("matchedCount", ids.len()),
            ("deletedCount", deleted_ids.len()),
            ("failedCount", failures.len()),
        ]);
        let outcome = DeleteOutcome {
            record_type: type_id,
            is_preview_only: false,
            matched_count: ids.len(),
            matched_ids: ids,
            deleted_ids,
            failures,
        };
        Ok(Execution {
            message,
            result: serde_json::to_value(&outcome)?,
            counts: execution_counts,
        })
    }
}
