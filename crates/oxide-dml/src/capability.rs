//! Per-field search capabilities.
//!
//! Backend quirks live here as lookups instead of branches in the planner:
//! which fields are ids, which compare as dates, which need string
//! equality, and which null checks cannot be done natively.

use chrono::NaiveDate;

use crate::resolver::StoreKind;

/// Substrings that mark a field as date-like.
const DATE_MARKERS: [&str; 12] = [
    "date", "created", "modified", "updated", "start", "end", "expire", "due", "birth", "hire",
    "tran", "last",
];

/// Fields searched with string equality.
const TEXT_IDENTIFIER_FIELDS: [&str; 5] = ["tranid", "documentnumber", "entityid", "name", "externalid"];

/// Prefixes of custom fields searched with string equality.
const TEXT_IDENTIFIER_PREFIXES: [&str; 3] = ["custrecord_", "custbody_", "custcol_"];

/// Output format of dates in search filters.
pub const FILTER_DATE_FORMAT: &str = "%m/%d/%Y";

/// How a field is searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// `id`/`internalid`: values are record ids.
    Id,
    /// Compared with date operators.
    Date,
    /// Compared with string equality.
    TextIdentifier,
    Generic,
}

/// Classifies a field by name.
///
/// Exact text identifiers win over date markers, so `tranid` is not a date;
/// custom-field prefixes lose to them, so `custrecord_hiredate` is.
#[must_use]
pub fn field_kind(field: &str) -> FieldKind {
    let field = field.to_lowercase();
    if field == "id" || field == "internalid" {
        FieldKind::Id
    } else if TEXT_IDENTIFIER_FIELDS.contains(&field.as_str()) {
        FieldKind::TextIdentifier
    } else if DATE_MARKERS.iter().any(|marker| field.contains(marker)) {
        FieldKind::Date
    } else if TEXT_IDENTIFIER_PREFIXES.iter().any(|p| field.starts_with(p)) {
        FieldKind::TextIdentifier
    } else {
        FieldKind::Generic
    }
}

/// Returns true when `IS [NOT] NULL` on `field` must be evaluated by
/// fetching every row, since the store's native empty check is unreliable.
#[must_use]
pub fn requires_client_side_null_filter(field: &str, store: StoreKind) -> bool {
    store == StoreKind::CustomList && field.eq_ignore_ascii_case("externalid")
}

/// Maps a condition field to the field searched on a custom list, or
/// `None` when custom lists cannot search it.
#[must_use]
pub fn custom_list_field(field: &str) -> Option<&'static str> {
    match field.to_lowercase().as_str() {
        "value" | "name" => Some("name"),
        "scriptid" => Some("scriptid"),
        "externalid" => Some("externalid"),
        "id" => Some("id"),
        "internalid" => Some("internalid"),
        _ => None,
    }
}

/// Parses `YYYY-MM-DD` or `M/D/YYYY`, ignoring a trailing time part.
#[must_use]
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let date = text.trim().split([' ', 'T']).next()?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(date, "%m/%d/%Y"))
        .ok()
}

/// Reformats a date to `MM/DD/YYYY`. Text that is not a date is returned
/// unchanged.
#[must_use]
pub fn format_date(text: &str) -> String {
    parse_date(text).map_or_else(
        || text.to_string(),
        |date| date.format(FILTER_DATE_FORMAT).to_string(),
    )
}
