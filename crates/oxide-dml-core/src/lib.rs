//! # oxide-dml-core
//!
//! Parsing for a small DML/DDL dialect layered on top of a record store:
//! `CREATE RECORD`, `CREATE LIST`, `INSERT`, `UPDATE` and `DELETE`, each with
//! an optional trailing `COMMIT`/`PREVIEW` mode word.
//!
//! This crate provides:
//! - A hand-written lexer producing spanned tokens
//! - Quote- and parenthesis-aware WHERE clause parsing with AND-over-OR
//!   precedence
//! - Statement parsers producing an immutable [`DmlStatement`]
//! - Script id generation for custom records, fields and lists
//!
//! ## Parsing a statement
//!
//! ```rust
//! use oxide_dml_core::{parse_statement, DmlStatement};
//!
//! let stmt = parse_statement("DELETE FROM customer WHERE id IN (1, 2) COMMIT").unwrap();
//! let DmlStatement::Delete(delete) = stmt else { unreachable!() };
//!
//! assert_eq!(delete.table_name, "customer");
//! assert!(!delete.is_preview);
//! ```
//!
//! ## Preview by default
//!
//! Statements without a trailing `COMMIT` are previews, and `DELETE` never
//! parses without a `WHERE` clause:
//!
//! ```rust
//! use oxide_dml_core::{parse_statement, ParseErrorKind};
//!
//! let stmt = parse_statement("UPDATE customer SET status = 'closed' WHERE id = 7").unwrap();
//! assert_eq!(stmt.is_preview(), Some(true));
//!
//! let err = parse_statement("DELETE FROM customer").unwrap_err();
//! assert_eq!(err.kind, ParseErrorKind::MissingWhereClause);
//! ```

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod script_id;
pub mod value;

pub use ast::{Condition, DmlStatement, FieldValues, StatementKind};
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{classify, parse_statement, parse_where_clause, DmlParser, ParseError, ParseErrorKind};
pub use script_id::truncate_script_id;
pub use value::{parse_values_list, Value};
