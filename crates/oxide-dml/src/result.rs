//! Statement results.
//!
//! Every statement, successful or not, ends up as a [`QueryResult`]. The
//! per-statement payloads below are serialized into its `result` field.

use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::backend::RecordId;
use crate::error::ExecError;

/// The outcome of one statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub message: String,
    pub metadata: JsonValue,
}

impl QueryResult {
    /// Builds a successful result.
    #[must_use]
    pub fn success(message: impl Into<String>, result: JsonValue, metadata: Map<String, JsonValue>) -> Self {
        Self {
            success: true,
            result: Some(result),
            error: None,
            message: message.into(),
            metadata: JsonValue::Object(metadata),
        }
    }

    /// Builds a failed result. The error kind is added to the metadata.
    #[must_use]
    pub fn failure(error: &ExecError, mut metadata: Map<String, JsonValue>) -> Self {
        metadata.insert("errorKind".into(), JsonValue::String(error.code().into()));
        Self {
            success: false,
            result: None,
            error: Some(error.to_string()),
            message: format!("{} failed", statement_label(&metadata)),
            metadata: JsonValue::Object(metadata),
        }
    }
}

fn statement_label(metadata: &Map<String, JsonValue>) -> &str {
    metadata
        .get("statementType")
        .and_then(JsonValue::as_str)
        .unwrap_or("Statement")
}

/// A record that could not be changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowFailure {
    /// Record id, for UPDATE and DELETE.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    /// 1-based row number, for INSERT.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    pub error: String,
}

/// Result of an INSERT.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertOutcome {
    pub record_type: String,
    pub is_preview_only: bool,
    /// Rows in the statement.
    pub row_count: usize,
    /// Rows as they would be created (preview only, capped).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rows: Vec<Map<String, JsonValue>>,
    pub created_ids: Vec<RecordId>,
    pub failures: Vec<RowFailure>,
}

/// Result of an UPDATE.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutcome {
    pub record_type: String,
    pub is_preview_only: bool,
    pub matched_count: usize,
    /// Matched ids (capped in preview).
    pub matched_ids: Vec<RecordId>,
    pub set_fields: Map<String, JsonValue>,
    pub updated_ids: Vec<RecordId>,
    pub failures: Vec<RowFailure>,
}

/// Result of a DELETE.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub record_type: String,
    pub is_preview_only: bool,
    pub matched_count: usize,
    /// Matched ids (capped in preview).
    pub matched_ids: Vec<RecordId>,
    pub deleted_ids: Vec<RecordId>,
    pub failures: Vec<RowFailure>,
}

/// Result of creating one custom field or list value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemOutcome {
    pub name: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_id: Option<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ItemOutcome {
    /// Builds an item outcome from a backend result.
    #[must_use]
    pub fn from_result<E: std::fmt::Display>(name: impl Into<String>, result: Result<RecordId, E>) -> Self {
        match result {
            Ok(id) => Self {
                name: name.into(),
                success: true,
                internal_id: Some(id),
                error: None,
            },
            Err(e) => Self {
                name: name.into(),
                success: false,
                internal_id: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Result of a CREATE RECORD.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecordOutcome {
    pub record_id: String,
    pub script_id: String,
    pub display_name: String,
    pub internal_id: RecordId,
    pub options: Map<String, JsonValue>,
    /// One entry per field, keyed by the generated script id.
    pub fields: Vec<ItemOutcome>,
}

/// Result of a CREATE LIST.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateListOutcome {
    pub list_id: String,
    pub script_id: String,
    pub internal_id: RecordId,
    pub values: Vec<ItemOutcome>,
}
