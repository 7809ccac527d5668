//! Record-type resolution.

use serde::Serialize;

use crate::error::{ExecError, Result};

/// The kind of store backing a record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StoreKind {
    /// A built-in record type.
    Standard,
    /// A `customrecord_*` type.
    CustomRecord,
    /// A `customlist_*` list. Only a few fields are searchable.
    CustomList,
}

/// What a table name resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordTypeDescriptor {
    /// Type id passed to the backend.
    pub backend_type_id: String,
    pub store: StoreKind,
}

impl RecordTypeDescriptor {
    /// Returns true for custom lists.
    #[must_use]
    pub fn is_custom_list(&self) -> bool {
        self.store == StoreKind::CustomList
    }
}

/// Maps a statement's table name to a backend record type.
pub trait RecordTypeResolver {
    /// Resolves `table`.
    ///
    /// # Errors
    ///
    /// Returns [`ExecError::UnknownRecordType`] when the name cannot be
    /// resolved.
    fn resolve(&self, table: &str) -> Result<RecordTypeDescriptor>;
}

/// Resolves names by their prefix.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConventionResolver;

impl RecordTypeResolver for ConventionResolver {
    fn resolve(&self, table: &str) -> Result<RecordTypeDescriptor> {
        let backend_type_id = table.trim().to_lowercase();
        if backend_type_id.is_empty() {
            return Err(ExecError::UnknownRecordType(table.to_string()));
        }

        let store = if backend_type_id.starts_with("customlist_") {
            StoreKind::CustomList
        } else if backend_type_id.starts_with("customrecord_") {
            StoreKind::CustomRecord
        } else {
            StoreKind::Standard
        };

        Ok(RecordTypeDescriptor {
            backend_type_id,
            store,
        })
    }
}
