//! Tests for INSERT statements.

mod common;
use common::*;

use oxide_dml_core::ast::InsertRows;
use oxide_dml_core::{ParseErrorKind, Value};

#[test]
fn insert_single_tuple_defaults_to_preview() {
    let i = parse_insert(
        "INSERT INTO customer (companyname, email) VALUES ('Acme Corp', 'a@b.com')",
    );
    assert_eq!(i.table_name, "customer");
    assert!(i.is_preview);
    let InsertRows::Single(fields) = &i.rows else {
        panic!("expected a single row, got {:?}", i.rows);
    };
    assert_eq!(fields.names(), vec!["companyname", "email"]);
    assert_eq!(fields.get("companyname"), Some(&text("Acme Corp")));
    assert_eq!(fields.get("email"), Some(&text("a@b.com")));
}

#[test]
fn insert_multiple_tuples() {
    let i = parse_insert(
        "INSERT INTO item (name, qty) VALUES ('a', 1), ('b, c', 2), ('it''s', -3.5) COMMIT",
    );
    assert!(!i.is_preview);
    let InsertRows::Multiple(rows) = &i.rows else {
        panic!("expected multiple rows");
    };
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1].get("name"), Some(&text("b, c")));
    assert_eq!(rows[2].get("name"), Some(&text("it's")));
    assert_eq!(rows[2].get("qty"), Some(&num(-3.5)));
}

#[test]
fn insert_commit_after_multiline_values() {
    let i = parse_insert(
        "INSERT INTO item (name)\nVALUES\n  ('a'),\n  ('b')\nCOMMIT;\n",
    );
    assert!(!i.is_preview);
    assert_eq!(i.rows.len(), 2);
}

#[test]
fn insert_quoted_parentheses() {
    let i = parse_insert("INSERT INTO note (body) VALUES ('(not) a tuple')");
    assert_eq!(i.rows.rows()[0].get("body"), Some(&text("(not) a tuple")));
}

#[test]
fn insert_set_form() {
    let i = parse_insert("INSERT INTO customer SET companyname = 'Acme', active = true, n = NULL");
    assert_eq!(i.rows.len(), 1);
    let fields = i.rows.rows()[0];
    assert_eq!(fields.get("active"), Some(&Value::Boolean(true)));
    assert_eq!(fields.get("n"), Some(&Value::Null));
}

#[test]
fn insert_value_count_mismatch() {
    let err = parse_err("INSERT INTO t (a, b) VALUES (1)");
    assert_eq!(err.kind, ParseErrorKind::FieldValueMismatch);

    let err = parse_err("INSERT INTO t (a) VALUES (1), (2, 3)");
    assert_eq!(err.kind, ParseErrorKind::FieldValueMismatch);
}

#[test]
fn insert_syntax_errors() {
    assert_eq!(
        parse_err("INSERT INTO t VALUES (1)").kind,
        ParseErrorKind::InvalidSyntax
    );
    assert_eq!(
        parse_err("INSERT INTO t (a) VALUES (1").kind,
        ParseErrorKind::InvalidSyntax
    );
    assert_eq!(
        parse_err("INSERT INTO t (a) VALUES (1) extra").kind,
        ParseErrorKind::InvalidSyntax
    );
}
