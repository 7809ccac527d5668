use tracing::{info, warn};

use oxide_dml_core::ast::{CreateListStatement, CreateRecordStatement};

use super::{counts, DmlExecutor, Execution};
use crate::backend::{fields_to_json, RecordBackend};
use crate::error::{ExecError, Result};
use crate::resolver::RecordTypeResolver;
use crate::result::{CreateListOutcome, CreateRecordOutcome, ItemOutcome};

impl<B: RecordBackend, R: RecordTypeResolver> DmlExecutor<B, R> {
    /// Creates the record type, then each field in order. Field failures
    /// are collected and do not stop the remaining fields.
    pub(super) fn execute_create_record(
        &mut self,
        stmt: &CreateRecordStatement,
    ) -> Result<Execution> {
        let internal_id = self
            .backend
            .create_record_type(stmt)
            .map_err(|e| ExecError::CreateFailed {
                target: stmt.full_record_id.clone(),
                message: e.to_string(),
            })?;
        info!(script_id = %stmt.full_record_id, id = %internal_id, "record type created");

        let fields: Vec<ItemOutcome> = stmt
            .fields
            .iter()
            .map(|field| {
                let outcome = ItemOutcome::from_result(
                    &field.name,
                    self.backend.create_custom_field(&stmt.full_record_id, field),
                );
                if let Some(error) = &outcome.error {
                    warn!(field = %field.script_id, error = %error, "custom field not created");
                }
                outcome
            })
            .collect();
        let created = fields.iter().filter(|f| f.success).count();

        let mut message = format!(
            "Created custom record {} ({}) with {created} of {} field(s)",
            stmt.full_record_id,
            stmt.display_name,
            fields.len()
        );
        if created < fields.len() {
            message.push_str(&format!("; {} failed", fields.len() - created));
        }
        let execution_counts = counts([
            ("fieldCount", fields.len()),
            ("createdFieldCount", created),
            ("failedFieldCount", fields.len() - created),
        ]);
        let outcome = CreateRecordOutcome {
            record_id: stmt.record_id.clone(),
            script_id: stmt.full_record_id.clone(),
            display_name: stmt.display_name.clone(),
            internal_id,
            options: fields_to_json(&stmt.record_options),
            fields,
        };
        Ok(Execution {
            message,
            result: serde_json::to_value(&outcome)?,
            counts: execution_counts,
        })
    }

    /// Creates the list, then each value in order. Value failures are
    /// collected and do not stop the remaining values.
    pub(super) fn execute_create_list(&mut self, stmt: &CreateListStatement) -> Result<Execution> {
        let internal_id = self
            .backend
            .create_custom_list(stmt)
            .map_err(|e| ExecError::CreateFailed {
                target: stmt.full_list_id.clone(),
                message: e.to_string(),
            })?;
        info!(script_id = %stmt.full_list_id, id = %internal_id, "custom list created");

        let values: Vec<ItemOutcome> = stmt
            .values
            .iter()
            .map(|value| {
                let outcome = ItemOutcome::from_result(
                    &value.value,
                    self.backend.add_list_value(&stmt.full_list_id, value),
                );
                if let Some(error) = &outcome.error {
                    warn!(value = %value.value, error = %error, "list value not added");
                }
                outcome
            })
            .collect();
        let created = values.iter().filter(|v| v.success).count();

        let mut message = format!(
            "Created custom list {} with {created} of {} value(s)",
            stmt.full_list_id,
            values.len()
        );
        if created < values.len() {
            message.push_str(&format!("; {} failed", values.len() - created));
        }
        let execution_counts = counts([
            ("valueCount", values.len()),
            ("createdValueCount", created),
            ("failedValueCount", values.len() - created),
        ]);
        let outcome = CreateListOutcome {
            list_id: stmt.list_id.clone(),
            script_id: stmt.full_list_id.clone(),
            internal_id,
            values,
        };
        Ok(Execution {
            message,
            result: serde_json::to_value(&outcome)?,
            counts: execution_counts,
        })
    }
}
