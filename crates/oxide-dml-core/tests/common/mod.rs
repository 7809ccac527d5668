#![allow(dead_code)]

use oxide_dml_core::ast::{
    CreateListStatement, CreateRecordStatement, DeleteStatement, DmlStatement, InsertStatement,
    UpdateStatement,
};
use oxide_dml_core::{parse_statement, parse_where_clause, Condition, ParseError, Value};

pub fn parse(sql: &str) -> DmlStatement {
    parse_statement(sql).unwrap_or_else(|e| panic!("Failed to parse: {sql}\nError: {e:?}"))
}

pub fn parse_err(sql: &str) -> ParseError {
    parse_statement(sql).expect_err(&format!("Expected parse error for: {sql}"))
}

pub fn parse_where(text: &str) -> Condition {
    parse_where_clause(text)
        .unwrap_or_else(|e| panic!("Failed to parse WHERE: {text}\nError: {e:?}"))
        .unwrap_or_else(|| panic!("Empty WHERE: {text}"))
}

pub fn parse_insert(sql: &str) -> InsertStatement {
    match parse(sql) {
        DmlStatement::Insert(i) => i,
        other => panic!("Expected INSERT, got {other:?}"),
    }
}

pub fn parse_update(sql: &str) -> UpdateStatement {
    match parse(sql) {
        DmlStatement::Update(u) => u,
        other => panic!("Expected UPDATE, got {other:?}"),
    }
}

pub fn parse_delete(sql: &str) -> DeleteStatement {
    match parse(sql) {
        DmlStatement::Delete(d) => d,
        other => panic!("Expected DELETE, got {other:?}"),
    }
}

pub fn parse_create_record(sql: &str) -> CreateRecordStatement {
    match parse(sql) {
        DmlStatement::CreateRecord(r) => r,
        other => panic!("Expected CREATE RECORD, got {other:?}"),
    }
}

pub fn parse_create_list(sql: &str) -> CreateListStatement {
    match parse(sql) {
        DmlStatement::CreateList(l) => l,
        other => panic!("Expected CREATE LIST, got {other:?}"),
    }
}

pub fn text(s: &str) -> Value {
    Value::String(s.to_string())
}

pub fn num(n: f64) -> Value {
    Value::Number(n)
}

pub fn eq(field: &str, value: Value) -> Condition {
    Condition::Equals {
        field: field.to_string(),
        value,
    }
}
