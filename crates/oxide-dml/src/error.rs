//! Error types for statement execution.

use oxide_dml_core::ParseError;

/// Errors reported by a [`RecordBackend`](crate::backend::RecordBackend).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// The record type does not exist.
    #[error("Unknown record type '{0}'")]
    UnknownRecordType(String),

    /// No record with this id exists.
    #[error("Record {record_type}/{id} not found")]
    NotFound {
        /// Record type searched.
        record_type: String,
        /// Missing id.
        id: String,
    },

    /// The backend refused the operation.
    #[error("{0}")]
    Rejected(String),

    /// A search could not be served.
    #[error("Search error: {0}")]
    Search(String),
}

/// Errors that can occur while running a statement.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    /// The statement text did not parse.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The text is not a DML/DDL statement handled here.
    #[error("Not a CREATE RECORD, CREATE LIST, INSERT, UPDATE or DELETE statement")]
    NotDml,

    /// The table name does not resolve to a record type.
    #[error("Unknown record type '{0}'")]
    UnknownRecordType(String),

    /// A WHERE leaf that cannot be turned into a search.
    #[error("Unsupported condition: {0}")]
    UnsupportedCondition(String),

    /// A condition kind the target store cannot search on.
    #[error("Unsupported condition type: {0}")]
    UnsupportedConditionType(String),

    /// UPDATE without WHERE.
    #[error("{0} requires a WHERE clause")]
    MissingWhereClause(&'static str),

    /// A backend search failed.
    #[error("Search on '{record_type}' failed: {message}")]
    SearchFailed {
        /// Record type searched.
        record_type: String,
        /// Backend message.
        message: String,
    },

    /// Fetching rows for a client-side null check failed.
    #[error("Null check on '{field}' failed: {message}")]
    NullSearchError {
        /// Field being checked.
        field: String,
        /// Backend message.
        message: String,
    },

    /// Every matched record failed to delete.
    #[error("Failed to delete any of {attempted} matched record(s) from '{record_type}': {first_error}")]
    DeleteFailed {
        /// Record type.
        record_type: String,
        /// Number of deletes attempted.
        attempted: usize,
        /// First failure message.
        first_error: String,
    },

    /// Every matched record failed to update.
    #[error("Failed to update any of {attempted} matched record(s) in '{record_type}': {first_error}")]
    UpdateFailed {
        /// Record type.
        record_type: String,
        /// Number of updates attempted.
        attempted: usize,
        /// First failure message.
        first_error: String,
    },

    /// A record, record type or list could not be created.
    #[error("Failed to create '{target}': {message}")]
    CreateFailed {
        /// What was being created.
        target: String,
        /// Failure message.
        message: String,
    },

    /// Backend error outside the cases above.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// A fixture file has an unexpected shape.
    #[error("Invalid fixture: {0}")]
    Fixture(String),

    /// IO error (reading SQL or fixtures).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ExecError {
    /// Returns a stable name for the error kind, reported in result
    /// metadata.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Parse(e) => e.kind.as_str(),
            Self::NotDml => "NotDml",
            Self::UnknownRecordType(_) => "UnknownRecordType",
            Self::UnsupportedCondition(_) => "UnsupportedCondition",
            Self::UnsupportedConditionType(_) => "UnsupportedConditionType",
            Self::MissingWhereClause(_) => "MissingWhereClause",
            Self::SearchFailed { .. } => "SearchFailed",
            Self::NullSearchError { .. } => "NullSearchError",
            Self::DeleteFailed { .. } => "DeleteFailed",
            Self::UpdateFailed { .. } => "UpdateFailed",
            Self::CreateFailed { .. } => "CreateFailed",
            Self::Backend(_) => "BackendError",
            Self::Fixture(_) => "Fixture",
            Self::Io(_) => "Io",
            Self::Serialization(_) => "Serialization",
        }
    }
}

/// Result type for execution.
pub type Result<T> = std::result::Result<T, ExecError>;

#[cfg(test)]
mod tests {
    use super::*;
    use oxide_dml_core::parse_statement;

    #[test]
    fn test_parse_error_keeps_kind() {
        let err: ExecError = parse_statement("DELETE FROM t").unwrap_err().into();
        assert_eq!(err.code(), "MissingWhereClause");
        assert!(err.to_string().contains("WHERE"));
    }

    #[test]
    fn test_backend_error_converts() {
        let err: ExecError = BackendError::Rejected("locked".into()).into();
        assert_eq!(err.code(), "BackendError");
        assert_eq!(err.to_string(), "Backend error: locked");
    }
}
