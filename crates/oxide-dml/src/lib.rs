//! Execution of DML/DDL statements against record/search backends.
//!
//! `oxide-dml` takes statements parsed by [`oxide_dml_core`] and runs them
//! against a [`RecordBackend`](backend::RecordBackend):
//! - INSERT, UPDATE and DELETE are previews unless they end with `COMMIT`
//! - UPDATE and DELETE find their targets by compiling the WHERE tree into
//!   native search filters, with a combined-search fast path for AND
//! - CREATE RECORD and CREATE LIST create the definition, then each field or
//!   value, collecting per-item failures
//!
//! # Architecture
//!
//! - **Resolver** - Maps a table name to a record type and store kind
//! - **Capability** - Per-field search quirks (ids, dates, text identifiers)
//! - **Planner** - Turns a WHERE tree into matching record ids
//! - **Executor** - Runs statements and builds the result envelope
//! - **Memory** - In-memory reference backend, loadable from JSON fixtures
//!
//! # Example
//!
//! ```rust
//! use oxide_dml::prelude::*;
//!
//! let backend = InMemoryBackend::from_json_str(
//!     r#"{"customer": [{"id": "1", "companyname": "Acme"}, {"id": "2", "companyname": "Globex"}]}"#,
//! )
//! .unwrap();
//! let mut executor = DmlExecutor::new(backend, ExecutorConfig::default());
//!
//! let preview = executor.run("DELETE FROM customer WHERE companyname = 'Acme'");
//! assert!(preview.success);
//! assert_eq!(preview.metadata["matchedCount"], 1);
//! assert_eq!(executor.backend().ids("customer").len(), 2);
//!
//! let done = executor.run("DELETE FROM customer WHERE companyname = 'Acme' COMMIT");
//! assert_eq!(done.metadata["deletedCount"], 1);
//! assert_eq!(executor.backend().ids("customer"), vec!["2"]);
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Preview against a fixture
//! oxide-dml --fixture data.json "UPDATE customer SET status = 'closed' WHERE id IN (1, 2)"
//!
//! # Commit and dump the resulting store
//! echo "DELETE FROM customer WHERE id = 1 COMMIT" | oxide-dml --fixture data.json --dump
//! ```

pub mod backend;
pub mod capability;
pub mod config;
pub mod error;
pub mod executor;
pub mod memory;
pub mod planner;
pub mod resolver;
pub mod result;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::backend::{RecordBackend, RecordId, SearchFilter, SearchOperator, SearchRow};
    pub use crate::config::ExecutorConfig;
    pub use crate::error::{BackendError, ExecError, Result};
    pub use crate::executor::{DmlExecutor, Execution};
    pub use crate::memory::InMemoryBackend;
    pub use crate::planner::{LeafPlan, Planner};
    pub use crate::resolver::{
        ConventionResolver, RecordTypeDescriptor, RecordTypeResolver, StoreKind,
    };
    pub use crate::result::QueryResult;
}
