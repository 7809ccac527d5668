//! DML/DDL statement types.

use std::fmt;

use super::Condition;
use crate::value::Value;

/// Field/value pairs in statement order.
///
/// Insertion of an existing name replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldValues {
    entries: Vec<(String, Value)>,
}

impl FieldValues {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Sets `name` to `value`.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Returns the value of `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Iterates over the pairs in statement order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Returns the field names in statement order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Value)> for FieldValues {
    fn from_iter<I: IntoIterator<Item = (S, Value)>>(iter: I) -> Self {
        let mut fields = Self::new();
        for (name, value) in iter {
            fields.insert(name, value);
        }
        fields
    }
}

/// The statement kinds recognised by the classifier, in detection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    CreateRecord,
    CreateList,
    Insert,
    Update,
    Delete,
}

impl StatementKind {
    /// Returns the display name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CreateRecord => "CREATE RECORD",
            Self::CreateList => "CREATE LIST",
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Custom field types accepted by CREATE RECORD.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Checkbox,
    Currency,
    Date,
    DateTime,
    Decimal,
    Document,
    EmailAddress,
    Entity,
    FreeFormText,
    Help,
    Hyperlink,
    Image,
    InlineHtml,
    Integer,
    List,
    LongText,
    MultiSelect,
    Password,
    Percent,
    PhoneNumber,
    RichText,
    TextArea,
    TimeOfDay,
}

impl FieldType {
    /// Every accepted type.
    pub const ALL: [Self; 23] = [
        Self::Checkbox,
        Self::Currency,
        Self::Date,
        Self::DateTime,
        Self::Decimal,
        Self::Document,
        Self::EmailAddress,
        Self::Entity,
        Self::FreeFormText,
        Self::Help,
        Self::Hyperlink,
        Self::Image,
        Self::InlineHtml,
        Self::Integer,
        Self::List,
        Self::LongText,
        Self::MultiSelect,
        Self::Password,
        Self::Percent,
        Self::PhoneNumber,
        Self::RichText,
        Self::TextArea,
        Self::TimeOfDay,
    ];

    /// Looks up a type by its statement name (case-insensitive).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(name))
    }

    /// Returns the name used in statements.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Checkbox => "CHECKBOX",
            Self::Currency => "CURRENCY",
            Self::Date => "DATE",
            Self::DateTime => "DATETIME",
            Self::Decimal => "DECIMAL",
            Self::Document => "DOCUMENT",
            Self::EmailAddress => "EMAILADDRESS",
            Self::Entity => "ENTITY",
            Self::FreeFormText => "FREEFORMTEXT",
            Self::Help => "HELP",
            Self::Hyperlink => "HYPERLINK",
            Self::Image => "IMAGE",
            Self::InlineHtml => "INLINEHTML",
            Self::Integer => "INTEGER",
            Self::List => "LIST",
            Self::LongText => "LONGTEXT",
            Self::MultiSelect => "MULTISELECT",
            Self::Password => "PASSWORD",
            Self::Percent => "PERCENT",
            Self::PhoneNumber => "PHONENUMBER",
            Self::RichText => "RICHTEXT",
            Self::TextArea => "TEXTAREA",
            Self::TimeOfDay => "TIMEOFDAY",
        }
    }

    /// Returns the type name the backend expects.
    #[must_use]
    pub const fn backend_type(&self) -> &'static str {
        match self {
            Self::DateTime => "DATETIMETZ",
            Self::Decimal => "FLOAT",
            Self::EmailAddress => "EMAIL",
            Self::Entity | Self::List => "SELECT",
            Self::FreeFormText => "TEXT",
            Self::Hyperlink => "URL",
            Self::LongText => "CLOBTEXT",
            Self::PhoneNumber => "PHONE",
            other => other.as_str(),
        }
    }

    /// Returns true for types that reference a source list or record type.
    #[must_use]
    pub const fn takes_source_type(&self) -> bool {
        matches!(self, Self::Entity | Self::List | Self::MultiSelect)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A custom field declared in CREATE RECORD.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    /// Name as written.
    pub name: String,
    pub field_type: FieldType,
    /// Source list/record for `LIST(x)`, `MULTISELECT(x)`, `ENTITY(x)`.
    pub list_type: Option<String>,
    /// Generated `custrecord_` id.
    pub script_id: String,
}

/// `CREATE RECORD id (...)`.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateRecordStatement {
    /// Record id as written.
    pub record_id: String,
    /// Generated `customrecord_` id.
    pub full_record_id: String,
    pub display_name: String,
    pub prefix: Option<String>,
    /// Record options keyed by their canonical name.
    pub record_options: FieldValues,
    pub fields: Vec<FieldDef>,
}

/// Options of `CREATE LIST`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    pub description: Option<String>,
    pub options_order: Option<String>,
    pub matrix_option: bool,
    pub is_inactive: bool,
}

/// A label translation of a list value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub language: String,
    pub label: String,
}

/// One entry of a `values [...]` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListValue {
    pub value: String,
    pub inactive: bool,
    pub translations: Vec<Translation>,
    pub abbreviation: Option<String>,
}

/// `CREATE LIST id (...)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateListStatement {
    /// List id as written.
    pub list_id: String,
    /// `customlist_` id. Not truncated.
    pub full_list_id: String,
    pub options: ListOptions,
    pub values: Vec<ListValue>,
}

/// Rows of an INSERT.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertRows {
    /// One VALUES tuple, or the SET form.
    Single(FieldValues),
    /// Two or more VALUES tuples.
    Multiple(Vec<FieldValues>),
}

impl InsertRows {
    /// Returns every row.
    #[must_use]
    pub fn rows(&self) -> Vec<&FieldValues> {
        match self {
            Self::Single(fields) => vec![fields],
            Self::Multiple(rows) => rows.iter().collect(),
        }
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Multiple(rows) => rows.len(),
        }
    }

    /// Returns true if there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// `INSERT INTO table ...`.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    pub table_name: String,
    pub rows: InsertRows,
    pub is_preview: bool,
}

/// `UPDATE table SET ... [WHERE ...]`.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    pub table_name: String,
    pub set_fields: FieldValues,
    pub where_clause: Option<Condition>,
    pub is_preview: bool,
}

/// `DELETE FROM table WHERE ...`. The WHERE clause cannot be absent.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    pub table_name: String,
    pub where_clause: Condition,
    pub is_preview: bool,
}

/// A parsed DML/DDL statement.
#[derive(Debug, Clone, PartialEq)]
pub enum DmlStatement {
    CreateRecord(CreateRecordStatement),
    CreateList(CreateListStatement),
    Insert(InsertStatement),
    Update(UpdateStatement),
    Delete(DeleteStatement),
}

impl DmlStatement {
    /// Returns the statement kind.
    #[must_use]
    pub const fn kind(&self) -> StatementKind {
        match self {
            Self::CreateRecord(_) => StatementKind::CreateRecord,
            Self::CreateList(_) => StatementKind::CreateList,
            Self::Insert(_) => StatementKind::Insert,
            Self::Update(_) => StatementKind::Update,
            Self::Delete(_) => StatementKind::Delete,
        }
    }

    /// Returns the table, record or list the statement targets.
    #[must_use]
    pub fn target(&self) -> &str {
        match self {
            Self::CreateRecord(s) => &s.full_record_id,
            Self::CreateList(s) => &s.full_list_id,
            Self::Insert(s) => &s.table_name,
            Self::Update(s) => &s.table_name,
            Self::Delete(s) => &s.table_name,
        }
    }

    /// Returns the preview flag of INSERT/UPDATE/DELETE.
    #[must_use]
    pub const fn is_preview(&self) -> Option<bool> {
        match self {
            Self::Insert(s) => Some(s.is_preview),
            Self::Update(s) => Some(s.is_preview),
            Self::Delete(s) => Some(s.is_preview),
            Self::CreateRecord(_) | Self::CreateList(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_values_keep_order_and_replace() {
        let mut fields = FieldValues::new();
        fields.insert("b", Value::Number(1.0));
        fields.insert("a", Value::Null);
        fields.insert("b", Value::Number(2.0));
        assert_eq!(fields.names(), vec!["b", "a"]);
        assert_eq!(fields.get("b"), Some(&Value::Number(2.0)));
        assert_eq!(fields.len(), 2);
    }

    #[test]
    fn test_field_type_lookup() {
        assert_eq!(FieldType::from_name("checkbox"), Some(FieldType::Checkbox));
        assert_eq!(FieldType::from_name("DATETIME"), Some(FieldType::DateTime));
        assert_eq!(FieldType::from_name("VARCHAR"), None);
        assert_eq!(FieldType::DateTime.backend_type(), "DATETIMETZ");
        assert_eq!(FieldType::Hyperlink.backend_type(), "URL");
        assert_eq!(FieldType::Date.backend_type(), "DATE");
    }

    #[test]
    fn test_insert_rows_len() {
        let single = InsertRows::Single(FieldValues::new());
        let multiple = InsertRows::Multiple(vec![FieldValues::new(), FieldValues::new()]);
        assert_eq!(single.len(), 1);
        assert_eq!(multiple.rows().len(), 2);
    }
}
