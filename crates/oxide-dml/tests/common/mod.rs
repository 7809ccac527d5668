#![allow(dead_code)]

use oxide_dml::prelude::*;
use serde_json::Value as JsonValue;

pub const EMPLOYEES: &str = r#"{
    "customrecord_employee": [
        {"id": "1", "name": "Ada", "department": "Engineering", "hiredate": "2022-06-01", "salary": 120},
        {"id": "2", "name": "Grace", "department": "Engineering", "hiredate": "2023-03-15", "salary": 130},
        {"id": "3", "name": "Linus", "department": "Engineering", "hiredate": "2024-01-10", "salary": 110},
        {"id": "4", "name": "Ken", "department": "Sales", "hiredate": "2023-07-01", "salary": 90},
        {"id": "5", "name": "Barbara", "department": "Sales", "hiredate": "2021-11-30", "salary": 95}
    ],
    "customer": [
        {"id": "10", "companyname": "Acme Corp", "email": "a@acme.com"},
        {"id": "11", "companyname": "Globex"}
    ],
    "customlist_colors": [
        {"id": "20", "name": "Red", "externalid": "R"},
        {"id": "21", "name": "Green"}
    ]
}"#;

pub fn backend() -> InMemoryBackend {
    InMemoryBackend::from_json_str(EMPLOYEES).unwrap_or_else(|e| panic!("Bad fixture: {e}"))
}

pub fn executor(backend: InMemoryBackend) -> DmlExecutor<InMemoryBackend> {
    DmlExecutor::new(backend, ExecutorConfig::default())
}

pub fn run_ok(executor: &mut DmlExecutor<InMemoryBackend>, sql: &str) -> QueryResult {
    let result = executor.run(sql);
    assert!(result.success, "Expected success for: {sql}\nResult: {result:?}");
    result
}

pub fn run_err(executor: &mut DmlExecutor<InMemoryBackend>, sql: &str) -> QueryResult {
    let result = executor.run(sql);
    assert!(!result.success, "Expected failure for: {sql}\nResult: {result:?}");
    result
}

pub fn error_kind(result: &QueryResult) -> &str {
    result.metadata["errorKind"].as_str().unwrap_or_default()
}

pub fn ids(value: &JsonValue) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
