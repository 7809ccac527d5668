use tracing::{debug, warn};

use oxide_dml_core::ast::UpdateStatement;

use super::{counts, first_error, id_failure, DmlExecutor, Execution};
use crate::backend::{fields_to_json, RecordBackend};
use crate::error::{ExecError, Result};
use crate::resolver::RecordTypeResolver;
use crate::result::UpdateOutcome;

impl<B: RecordBackend, R: RecordTypeResolver> DmlExecutor<B, R> {
    pub(super) fn execute_update(&mut self, stmt: &UpdateStatement) -> Result<Execution> {
        let condition = stmt
            .where_clause
            .as_ref()
            .ok_or(ExecError::MissingWhereClause("UPDATE"))?;
        let record_type = self.resolve(&stmt.table_name)?;
        let type_id = record_type.backend_type_id.clone();
        let ids = self.matching_ids(&record_type, condition)?;
        debug!(record_type = %type_id, matched = ids.len(), "update matches");

        if stmt.is_preview {
            let outcome = UpdateOutcome {
                record_type: type_id.clone(),
                is_preview_only: true,
                matched_count: ids.len(),
                matched_ids: self.preview_ids(&ids),
                set_fields: fields_to_json(&stmt.set_fields),
                updated_ids: Vec::new(),
                failures: Vec::new(),
            };
            return Ok(Execution {
                message: format!(
                    "Preview: would update {} record(s) in {type_id}. Add COMMIT to execute.",
                    ids.len()
                ),
                result: serde_json::to_value(&outcome)?,
                counts: counts([("matchedCount", ids.len())]),
            });
        }

        let mut updated_ids = Vec::new();
        let mut failures = Vec::new();
        for id in &ids {
            match self.backend.update_record(&type_id, id, &stmt.set_fields) {
                Ok(()) => updated_ids.push(id.clone()),
                Err(e) => {
                    warn!(record_type = %type_id, id = %id, error = %e, "update failed");
                    failures.push(id_failure(id, e));
                }
            }
        }

        if updated_ids.is_empty() && !failures.is_empty() {
            return Err(ExecError::UpdateFailed {
                record_type: type_id,
                attempted: ids.len(),
                first_error: first_error(&failures),
            });
        }

        let mut message = format!(
            "Updated {} of {} matched record(s) in {type_id}",
            updated_ids.len(),
            ids.len()
        );
        if !failures.is_empty() {
            message.push_str(&format!("; {} failed", failures.len()));
        }
        let execution_counts = counts([
            ("matchedCount", ids.len()),
            ("updatedCount", updated_ids.len()),
            ("failedCount", failures.len()),
        ]);
        let outcome = UpdateOutcome {
            record_type: type_id,
            is_preview_only: false,
            matched_count: ids.len(),
            matched_ids: ids,
            set_fields: fields_to_json(&stmt.set_fields),
            updated_ids,
            failures,
        };
        Ok(Execution {
            message,
            result: serde_json::to_value(&outcome)?,
            counts: execution_counts,
        })
    }
}
