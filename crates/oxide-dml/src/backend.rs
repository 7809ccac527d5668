//! The record/search backend that statements execute against.
//!
//! Execution never talks to storage directly. Searches, mutations and
//! definition changes all go through [`RecordBackend`], which a host
//! implements for its record store. [`InMemoryBackend`](crate::memory::InMemoryBackend)
//! is the reference implementation.

use std::collections::BTreeMap;
use std::fmt;

use oxide_dml_core::ast::{CreateListStatement, CreateRecordStatement, FieldDef, ListValue};
use oxide_dml_core::{FieldValues, Value};
use serde::{Deserialize, Serialize};

use crate::error::BackendError;

/// Internal id of a record.
pub type RecordId = String;

/// Operators of a native search filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SearchOperator {
    Is,
    IsNot,
    EqualTo,
    NotEqualTo,
    GreaterThan,
    GreaterThanOrEqualTo,
    LessThan,
    LessThanOrEqualTo,
    On,
    NotOn,
    After,
    Before,
    OnOrAfter,
    OnOrBefore,
    AnyOf,
    Between,
    Within,
    IsEmpty,
    IsNotEmpty,
    StartsWith,
    EndsWith,
    Contains,
}

impl SearchOperator {
    /// Returns the backend spelling of the operator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Is => "IS",
            Self::IsNot => "ISNOT",
            Self::EqualTo => "EQUALTO",
            Self::NotEqualTo => "NOTEQUALTO",
            Self::GreaterThan => "GREATERTHAN",
            Self::GreaterThanOrEqualTo => "GREATERTHANOREQUALTO",
            Self::LessThan => "LESSTHAN",
            Self::LessThanOrEqualTo => "LESSTHANOREQUALTO",
            Self::On => "ON",
            Self::NotOn => "NOTON",
            Self::After => "AFTER",
            Self::Before => "BEFORE",
            Self::OnOrAfter => "ONORAFTER",
            Self::OnOrBefore => "ONORBEFORE",
            Self::AnyOf => "ANYOF",
            Self::Between => "BETWEEN",
            Self::Within => "WITHIN",
            Self::IsEmpty => "ISEMPTY",
            Self::IsNotEmpty => "ISNOTEMPTY",
            Self::StartsWith => "STARTSWITH",
            Self::EndsWith => "ENDSWITH",
            Self::Contains => "CONTAINS",
        }
    }
}

impl fmt::Display for SearchOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One native search filter. A search ANDs all of its filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilter {
    pub field: String,
    pub operator: SearchOperator,
    pub values: Vec<String>,
}

impl SearchFilter {
    /// Creates a filter.
    #[must_use]
    pub fn new(field: impl Into<String>, operator: SearchOperator, values: Vec<String>) -> Self {
        Self {
            field: field.into(),
            operator,
            values,
        }
    }

    /// Creates a single-value filter.
    #[must_use]
    pub fn single(field: impl Into<String>, operator: SearchOperator, value: impl Into<String>) -> Self {
        Self::new(field, operator, vec![value.into()])
    }
}

impl fmt::Display for SearchFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.operator)?;
        if !self.values.is_empty() {
            write!(f, " [{}]", self.values.join(", "))?;
        }
        Ok(())
    }
}

/// A search hit: the record id plus the requested columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRow {
    pub id: RecordId,
    pub columns: BTreeMap<String, serde_json::Value>,
}

impl SearchRow {
    /// Creates a row without columns.
    #[must_use]
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            columns: BTreeMap::new(),
        }
    }
}

/// A record store that can be searched and mutated.
///
/// Every call is a discrete operation: there are no transactions, so a
/// statement touching several records may complete partially.
pub trait RecordBackend {
    /// Returns one page of records of `record_type` matching every filter.
    ///
    /// A page shorter than `page_size` is the last one.
    fn search_page(
        &self,
        record_type: &str,
        filters: &[SearchFilter],
        columns: &[&str],
        page: usize,
        page_size: usize,
    ) -> Result<Vec<SearchRow>, BackendError>;

    /// Creates a record and returns its id.
    fn create_record(
        &mut self,
        record_type: &str,
        fields: &FieldValues,
    ) -> Result<RecordId, BackendError>;

    /// Sets fields on an existing record.
    fn update_record(
        &mut self,
        record_type: &str,
        id: &str,
        fields: &FieldValues,
    ) -> Result<(), BackendError>;

    /// Deletes one record.
    fn delete_record(&mut self, record_type: &str, id: &str) -> Result<(), BackendError>;

    /// Creates a custom record type (without its fields).
    fn create_record_type(
        &mut self,
        statement: &CreateRecordStatement,
    ) -> Result<RecordId, BackendError>;

    /// Adds a custom field to a custom record type.
    fn create_custom_field(
        &mut self,
        full_record_id: &str,
        field: &FieldDef,
    ) -> Result<RecordId, BackendError>;

    /// Creates a custom list (without its values).
    fn create_custom_list(
        &mut self,
        statement: &CreateListStatement,
    ) -> Result<RecordId, BackendError>;

    /// Adds a value to a custom list.
    fn add_list_value(
        &mut self,
        full_list_id: &str,
        value: &ListValue,
    ) -> Result<RecordId, BackendError>;
}

/// Converts a statement literal to JSON.
#[must_use]
pub fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Number(n) => serde_json::Number::from_f64(*n)
            .map_or(serde_json::Value::Null, serde_json::Value::Number),
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        Value::Null => serde_json::Value::Null,
    }
}

/// Converts field values to a JSON object, keeping field order.
#[must_use]
pub fn fields_to_json(fields: &FieldValues) -> serde_json::Map<String, serde_json::Value> {
    fields
        .iter()
        .map(|(name, value)| (name.to_string(), value_to_json(value)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_spelling_matches_serde() {
        for op in [SearchOperator::IsNot, SearchOperator::OnOrAfter, SearchOperator::AnyOf] {
            let json = serde_json::to_string(&op).unwrap();
            assert_eq!(json, format!("\"{}\"", op.as_str()));
        }
    }

    #[test]
    fn test_filter_display() {
        let filter = SearchFilter::new(
            "trandate",
            SearchOperator::Within,
            vec!["01/01/2024".into(), "01/31/2024".into()],
        );
        assert_eq!(filter.to_string(), "trandate WITHIN [01/01/2024, 01/31/2024]");
        let empty = SearchFilter::new("email", SearchOperator::IsEmpty, Vec::new());
        assert_eq!(empty.to_string(), "email ISEMPTY");
    }

    #[test]
    fn test_value_to_json() {
        assert_eq!(value_to_json(&Value::Number(2.0)), serde_json::json!(2.0));
        assert_eq!(value_to_json(&Value::Null), serde_json::Value::Null);
        assert_eq!(value_to_json(&Value::String("a".into())), serde_json::json!("a"));
    }
}
