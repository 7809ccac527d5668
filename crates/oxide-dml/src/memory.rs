//! In-memory reference backend.
//!
//! Holds records as JSON objects keyed by record type, evaluates every
//! [`SearchOperator`], and can be told to fail specific operations so that
//! partial failures and search fallbacks can be exercised.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use oxide_dml_core::ast::{CreateListStatement, CreateRecordStatement, FieldDef, ListValue};
use oxide_dml_core::FieldValues;
use serde_json::{Map, Value as JsonValue};
use tracing::debug;

use crate::backend::{
    fields_to_json, value_to_json, RecordBackend, RecordId, SearchFilter, SearchOperator,
    SearchRow,
};
use crate::capability::parse_date;
use crate::error::{BackendError, ExecError, Result};

#[derive(Debug, Clone, PartialEq)]
struct StoredRecord {
    id: RecordId,
    fields: Map<String, JsonValue>,
}

impl StoredRecord {
    fn get(&self, field: &str) -> Option<JsonValue> {
        match field {
            "id" | "internalid" => Some(JsonValue::String(self.id.clone())),
            _ => self.fields.get(field).cloned(),
        }
    }

    fn to_json(&self) -> JsonValue {
        let mut object = Map::new();
        object.insert("id".to_string(), JsonValue::String(self.id.clone()));
        object.extend(self.fields.clone());
        JsonValue::Object(object)
    }
}

/// Operations to fail on purpose.
#[derive(Debug, Clone, Default)]
struct FailurePlan {
    delete_ids: BTreeSet<RecordId>,
    update_ids: BTreeSet<RecordId>,
    create_names: BTreeSet<String>,
    multi_filter_search: bool,
}

/// A [`RecordBackend`] over in-memory tables.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    tables: BTreeMap<String, Vec<StoredRecord>>,
    record_types: BTreeMap<String, Map<String, JsonValue>>,
    next_id: u64,
    failures: FailurePlan,
    search_log: RefCell<Vec<Vec<SearchFilter>>>,
}

impl InMemoryBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Self::default()
        }
    }

    /// Builds a backend from fixture JSON of the form
    /// `{"customer": [{"id": "1", "companyname": "Acme"}, ...]}`.
    ///
    /// Rows without an `id` get a generated one.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not JSON or not of that shape.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let JsonValue::Object(tables) = serde_json::from_str::<JsonValue>(text)? else {
            return Err(ExecError::Fixture("top level must be an object".into()));
        };

        let mut backend = Self::new();
        for (record_type, rows) in tables {
            let JsonValue::Array(rows) = rows else {
                return Err(ExecError::Fixture(format!(
                    "'{record_type}' must be an array of records"
                )));
            };
            backend.tables.entry(record_type.to_lowercase()).or_default();
            for row in rows {
                let JsonValue::Object(row) = row else {
                    return Err(ExecError::Fixture(format!(
                        "'{record_type}' contains a non-object row"
                    )));
                };
                backend.insert_fixture_row(&record_type, row)?;
            }
        }
        Ok(backend)
    }

    /// Loads a fixture file. See [`InMemoryBackend::from_json_str`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_fixture(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    fn insert_fixture_row(&mut self, record_type: &str, row: Map<String, JsonValue>) -> Result<()> {
        let mut fields = Map::new();
        let mut id = None;
        for (key, value) in row {
            let key = key.to_lowercase();
            if key == "id" || key == "internalid" {
                id = Some(cell_text(&value).ok_or_else(|| {
                    ExecError::Fixture(format!("'{record_type}' has a row with a null id"))
                })?);
            } else {
                fields.insert(key, value);
            }
        }

        let id = match id {
            Some(id) => {
                if let Ok(n) = id.parse::<u64>() {
                    self.next_id = self.next_id.max(n + 1);
                }
                id
            }
            None => self.allocate_id(),
        };
        let table = self.tables.entry(record_type.to_lowercase()).or_default();
        if table.iter().any(|r| r.id == id) {
            return Err(ExecError::Fixture(format!(
                "'{record_type}' has duplicate id {id}"
            )));
        }
        table.push(StoredRecord { id, fields });
        Ok(())
    }

    /// Makes deletes of `id` fail.
    #[must_use]
    pub fn with_failing_delete(mut self, id: impl Into<RecordId>) -> Self {
        self.failures.delete_ids.insert(id.into());
        self
    }

    /// Makes updates of `id` fail.
    #[must_use]
    pub fn with_failing_update(mut self, id: impl Into<RecordId>) -> Self {
        self.failures.update_ids.insert(id.into());
        self
    }

    /// Makes creates fail when they carry `name`: a record field value, a
    /// record type id, a custom field name or a list value.
    #[must_use]
    pub fn with_failing_create(mut self, name: impl Into<String>) -> Self {
        self.failures.create_names.insert(name.into().to_lowercase());
        self
    }

    /// Makes every search with more than one filter fail.
    #[must_use]
    pub const fn with_failing_multi_filter_search(mut self) -> Self {
        self.failures.multi_filter_search = true;
        self
    }

    /// Returns the number of search pages requested so far.
    #[must_use]
    pub fn search_calls(&self) -> usize {
        self.search_log.borrow().len()
    }

    /// Returns the filters of every search page requested so far.
    #[must_use]
    pub fn search_log(&self) -> Vec<Vec<SearchFilter>> {
        self.search_log.borrow().clone()
    }

    /// Returns the ids stored for `record_type`, in insertion order.
    #[must_use]
    pub fn ids(&self, record_type: &str) -> Vec<RecordId> {
        self.tables
            .get(&record_type.to_lowercase())
            .map(|rows| rows.iter().map(|r| r.id.clone()).collect())
            .unwrap_or_default()
    }

    /// Returns one record as JSON, `id` included.
    #[must_use]
    pub fn record(&self, record_type: &str, id: &str) -> Option<JsonValue> {
        self.tables
            .get(&record_type.to_lowercase())?
            .iter()
            .find(|r| r.id == id)
            .map(StoredRecord::to_json)
    }

    /// Returns a custom record type definition created through
    /// [`RecordBackend::create_record_type`].
    #[must_use]
    pub fn record_type(&self, full_record_id: &str) -> Option<&Map<String, JsonValue>> {
        self.record_types.get(&full_record_id.to_lowercase())
    }

    /// Returns every table and definition as JSON, in fixture shape.
    #[must_use]
    pub fn snapshot(&self) -> JsonValue {
        let tables: Map<String, JsonValue> = self
            .tables
            .iter()
            .map(|(name, rows)| {
                let rows = rows.iter().map(StoredRecord::to_json).collect();
                (name.clone(), JsonValue::Array(rows))
            })
            .collect();
        let definitions: Map<String, JsonValue> = self
            .record_types
            .iter()
            .map(|(name, def)| (name.clone(), JsonValue::Object(def.clone())))
            .collect();
        serde_json::json!({ "records": tables, "recordTypes": definitions })
    }

    fn allocate_id(&mut self) -> RecordId {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        id.to_string()
    }

    fn create_fails(&self, name: &str) -> bool {
        self.failures.create_names.contains(&name.to_lowercase())
    }

    fn table_mut(&mut self, record_type: &str) -> std::result::Result<&mut Vec<StoredRecord>, BackendError> {
        self.tables
            .get_mut(&record_type.to_lowercase())
            .ok_or_else(|| BackendError::UnknownRecordType(record_type.to_string()))
    }

    fn position(
        &mut self,
        record_type: &str,
        id: &str,
    ) -> std::result::Result<(&mut Vec<StoredRecord>, usize), BackendError> {
        let table = self.table_mut(record_type)?;
        let index = table.iter().position(|r| r.id == id).ok_or_else(|| {
            BackendError::NotFound {
                record_type: record_type.to_string(),
                id: id.to_string(),
            }
        })?;
        Ok((table, index))
    }
}

impl RecordBackend for InMemoryBackend {
    fn search_page(
        &self,
        record_type: &str,
        filters: &[SearchFilter],
        columns: &[&str],
        page: usize,
        page_size: usize,
    ) -> std::result::Result<Vec<SearchRow>, BackendError> {
        self.search_log.borrow_mut().push(filters.to_vec());
        debug!(record_type, page, filters = filters.len(), "in-memory search");

        if self.failures.multi_filter_search && filters.len() > 1 {
            return Err(BackendError::Search(format!(
                "{} filters exceed what this search can combine",
                filters.len()
            )));
        }
        let rows = self
            .tables
            .get(&record_type.to_lowercase())
            .ok_or_else(|| BackendError::UnknownRecordType(record_type.to_string()))?;

        let hits = rows
            .iter()
            .filter(|record| filters.iter().all(|f| matches_filter(record, f)))
            .skip(page.saturating_mul(page_size))
            .take(page_size)
            .map(|record| {
                let mut row = SearchRow::new(record.id.clone());
                for column in columns {
                    let column = column.to_lowercase();
                    let value = record.get(&column).unwrap_or(JsonValue::Null);
                    row.columns.insert(column, value);
                }
                row
            })
            .collect();
        Ok(hits)
    }

    fn create_record(
        &mut self,
        record_type: &str,
        fields: &FieldValues,
    ) -> std::result::Result<RecordId, BackendError> {
        if let Some((name, value)) = fields
            .iter()
            .find(|(_, value)| !value.is_null() && self.create_fails(&value.to_string()))
        {
            return Err(BackendError::Rejected(format!(
                "Field '{name}' value '{value}' was rejected"
            )));
        }
        let fields = fields
            .iter()
            .map(|(name, value)| (name.to_lowercase(), value_to_json(value)))
            .collect();
        let id = self.allocate_id();
        self.tables
            .entry(record_type.to_lowercase())
            .or_default()
            .push(StoredRecord {
                id: id.clone(),
                fields,
            });
        Ok(id)
    }

    fn update_record(
        &mut self,
        record_type: &str,
        id: &str,
        fields: &FieldValues,
    ) -> std::result::Result<(), BackendError> {
        if self.failures.update_ids.contains(id) {
            return Err(BackendError::Rejected(format!("Record {id} is locked")));
        }
        let (table, index) = self.position(record_type, id)?;
        for (name, value) in fields.iter() {
            table[index]
                .fields
                .insert(name.to_lowercase(), value_to_json(value));
        }
        Ok(())
    }

    fn delete_record(&mut self, record_type: &str, id: &str) -> std::result::Result<(), BackendError> {
        if self.failures.delete_ids.contains(id) {
            return Err(BackendError::Rejected(format!(
                "Record {id} is referenced by other records"
            )));
        }
        let (table, index) = self.position(record_type, id)?;
        table.remove(index);
        Ok(())
    }

    fn create_record_type(
        &mut self,
        statement: &CreateRecordStatement,
    ) -> std::result::Result<RecordId, BackendError> {
        let key = statement.full_record_id.to_lowercase();
        if self.create_fails(&statement.record_id) || self.create_fails(&key) {
            return Err(BackendError::Rejected(format!(
                "Record type '{key}' was rejected"
            )));
        }
        if self.record_types.contains_key(&key) || self.tables.contains_key(&key) {
            return Err(BackendError::Rejected(format!(
                "Record type '{key}' already exists"
            )));
        }

        let mut definition = Map::new();
        definition.insert("name".into(), JsonValue::String(statement.display_name.clone()));
        definition.insert("options".into(), JsonValue::Object(fields_to_json(&statement.record_options)));
        definition.insert("fields".into(), JsonValue::Array(Vec::new()));
        self.record_types.insert(key.clone(), definition);
        self.tables.insert(key, Vec::new());
        Ok(self.allocate_id())
    }

    fn create_custom_field(
        &mut self,
        full_record_id: &str,
        field: &FieldDef,
    ) -> std::result::Result<RecordId, BackendError> {
        if self.create_fails(&field.name) {
            return Err(BackendError::Rejected(format!(
                "Field '{}' was rejected",
                field.name
            )));
        }
        let definition = self
            .record_types
            .get_mut(&full_record_id.to_lowercase())
            .ok_or_else(|| BackendError::UnknownRecordType(full_record_id.to_string()))?;
        let Some(JsonValue::Array(fields)) = definition.get_mut("fields") else {
            return Err(BackendError::Rejected(format!(
                "Record type '{full_record_id}' has no field list"
            )));
        };
        if fields
            .iter()
            .any(|f| f.get("scriptid").and_then(JsonValue::as_str) == Some(field.script_id.as_str()))
        {
            return Err(BackendError::Rejected(format!(
                "Field '{}' already exists",
                field.script_id
            )));
        }

        fields.push(serde_json::json!({
            "scriptid": field.script_id,
            "label": field.name,
            "type": field.field_type.backend_type(),
            "source": field.list_type,
        }));
        Ok(self.allocate_id())
    }

    fn create_custom_list(
        &mut self,
        statement: &CreateListStatement,
    ) -> std::result::Result<RecordId, BackendError> {
        let key = statement.full_list_id.to_lowercase();
        if self.create_fails(&statement.list_id) || self.create_fails(&key) {
            return Err(BackendError::Rejected(format!("List '{key}' was rejected")));
        }
        if self.tables.contains_key(&key) {
            return Err(BackendError::Rejected(format!("List '{key}' already exists")));
        }

        let options = &statement.options;
        self.record_types.insert(
            key.clone(),
            serde_json::json!({
                "description": options.description,
                "optionsOrder": options.options_order,
                "matrixOption": options.matrix_option,
                "isInactive": options.is_inactive,
            })
            .as_object()
            .cloned()
            .unwrap_or_default(),
        );
        self.tables.insert(key, Vec::new());
        Ok(self.allocate_id())
    }

    fn add_list_value(
        &mut self,
        full_list_id: &str,
        value: &ListValue,
    ) -> std::result::Result<RecordId, BackendError> {
        if self.create_fails(&value.value) {
            return Err(BackendError::Rejected(format!(
                "List value '{}' was rejected",
                value.value
            )));
        }
        let id = self.allocate_id();
        let table = self.table_mut(full_list_id)?;
        if table.iter().any(|r| {
            r.fields
                .get("name")
                .and_then(JsonValue::as_str)
                .is_some_and(|name| name.eq_ignore_ascii_case(&value.value))
        }) {
            return Err(BackendError::Rejected(format!(
                "List value '{}' already exists",
                value.value
            )));
        }

        let translations: Map<String, JsonValue> = value
            .translations
            .iter()
            .map(|t| (t.language.clone(), JsonValue::String(t.label.clone())))
            .collect();
        let mut fields = Map::new();
        fields.insert("name".into(), JsonValue::String(value.value.clone()));
        fields.insert("isinactive".into(), JsonValue::Bool(value.inactive));
        if let Some(abbreviation) = &value.abbreviation {
            fields.insert("abbreviation".into(), JsonValue::String(abbreviation.clone()));
        }
        if !translations.is_empty() {
            fields.insert("translations".into(), JsonValue::Object(translations));
        }
        table.push(StoredRecord {
            id: id.clone(),
            fields,
        });
        Ok(id)
    }
}

/// Renders a stored value the way filter values are written. `None` for
/// null.
fn cell_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Bool(b) => Some(if *b { "T" } else { "F" }.to_string()),
        JsonValue::Number(n) => Some(n.as_f64().map_or_else(|| n.to_string(), |f| f.to_string())),
        other => Some(other.to_string()),
    }
}

fn text_eq(cell: &str, value: &str) -> bool {
    match (cell.trim().parse::<f64>(), value.trim().parse::<f64>()) {
        (Ok(a), Ok(b)) => a == b,
        _ => cell.eq_ignore_ascii_case(value),
    }
}

/// Orders numbers numerically, dates chronologically, anything else as
/// case-insensitive text.
fn compare(cell: &str, value: &str) -> Ordering {
    if let (Ok(a), Ok(b)) = (cell.trim().parse::<f64>(), value.trim().parse::<f64>()) {
        return a.partial_cmp(&b).unwrap_or(Ordering::Equal);
    }
    if let (Some(a), Some(b)) = (parse_date(cell), parse_date(value)) {
        return a.cmp(&b);
    }
    cell.to_lowercase().cmp(&value.to_lowercase())
}

/// Compares as dates; falls back to text equality/ordering when either
/// side is not a date.
fn compare_dates(cell: &str, value: &str) -> Ordering {
    match (parse_date(cell), parse_date(value)) {
        (Some(a), Some(b)) => a.cmp(&b),
        _ => compare(cell, value),
    }
}

fn matches_filter(record: &StoredRecord, filter: &SearchFilter) -> bool {
    let cell = record
        .get(&filter.field.to_lowercase())
        .as_ref()
        .and_then(cell_text);
    let first = filter.values.first().map(String::as_str).unwrap_or_default();
    let range = |cmp: fn(&str, &str) -> Ordering, cell: &str| match filter.values.as_slice() {
        [low, high, ..] => cmp(cell, low) != Ordering::Less && cmp(cell, high) != Ordering::Greater,
        _ => false,
    };

    match (filter.operator, cell) {
        (SearchOperator::IsEmpty, cell) => cell.map_or(true, |c| c.is_empty()),
        (SearchOperator::IsNotEmpty, cell) => cell.is_some_and(|c| !c.is_empty()),
        (SearchOperator::IsNot, None) | (SearchOperator::NotEqualTo, None) => true,
        (SearchOperator::NotOn, None) => true,
        (_, None) => false,
        (SearchOperator::Is | SearchOperator::EqualTo, Some(c)) => text_eq(&c, first),
        (SearchOperator::IsNot | SearchOperator::NotEqualTo, Some(c)) => !text_eq(&c, first),
        (SearchOperator::GreaterThan, Some(c)) => compare(&c, first) == Ordering::Greater,
        (SearchOperator::GreaterThanOrEqualTo, Some(c)) => compare(&c, first) != Ordering::Less,
        (SearchOperator::LessThan, Some(c)) => compare(&c, first) == Ordering::Less,
        (SearchOperator::LessThanOrEqualTo, Some(c)) => compare(&c, first) != Ordering::Greater,
        (SearchOperator::On, Some(c)) => compare_dates(&c, first) == Ordering::Equal,
        (SearchOperator::NotOn, Some(c)) => compare_dates(&c, first) != Ordering::Equal,
        (SearchOperator::After, Some(c)) => compare_dates(&c, first) == Ordering::Greater,
        (SearchOperator::Before, Some(c)) => compare_dates(&c, first) == Ordering::Less,
        (SearchOperator::OnOrAfter, Some(c)) => compare_dates(&c, first) != Ordering::Less,
        (SearchOperator::OnOrBefore, Some(c)) => compare_dates(&c, first) != Ordering::Greater,
        (SearchOperator::AnyOf, Some(c)) => filter.values.iter().any(|v| text_eq(&c, v)),
        (SearchOperator::Between, Some(c)) => range(compare, &c),
        (SearchOperator::Within, Some(c)) => range(compare_dates, &c),
        (SearchOperator::StartsWith, Some(c)) => c.to_lowercase().starts_with(&first.to_lowercase()),
        (SearchOperator::EndsWith, Some(c)) => c.to_lowercase().ends_with(&first.to_lowercase()),
        (SearchOperator::Contains, Some(c)) => c.to_lowercase().contains(&first.to_lowercase()),
    }
}
