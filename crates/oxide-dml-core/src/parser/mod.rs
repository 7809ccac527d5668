//! Statement parsing.
//!
//! [`classify`] identifies the statement kind from its leading words and
//! [`DmlParser`] turns the text into a [`DmlStatement`](crate::ast::DmlStatement).
//! Anything that does not classify is left to the read-only query path.

mod create;
mod error;
mod scan;
mod statement;
mod where_clause;

pub use error::{ParseError, ParseErrorKind};
pub use scan::split_mode;
pub use statement::{classify, parse_statement, DmlParser};
pub use where_clause::{parse_where_clause, tokenize_where, WhereToken};
