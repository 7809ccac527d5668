//! Predicate compiler and execution planner.
//!
//! A WHERE tree is turned into the ids of the records it matches. Leaves
//! compile to one native [`SearchFilter`] when they can. An AND whose
//! children all compile is served by a single combined search; anything
//! else is evaluated child by child and the id lists are intersected (AND)
//! or unioned (OR), keeping the order in which ids were first seen.

use std::collections::HashSet;
use std::sync::LazyLock;

use oxide_dml_core::ast::{CompareOp, LogicalOp};
use oxide_dml_core::{Condition, Value};
use regex::Regex;
use tracing::{debug, warn};

use crate::backend::{RecordBackend, RecordId, SearchFilter, SearchOperator, SearchRow};
use crate::capability::{
    custom_list_field, field_kind, format_date, requires_client_side_null_filter, FieldKind,
};
use crate::error::{ExecError, Result};
use crate::resolver::RecordTypeDescriptor;

static LIKE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)^\s*([A-Za-z_][A-Za-z0-9_.]*)\s+LIKE\s+(?:'(.*)'|"(.*)")\s*$"#)
        .expect("LIKE pattern is valid")
});

/// How a single leaf is evaluated.
#[derive(Debug, Clone, PartialEq)]
pub enum LeafPlan {
    /// The condition names ids directly; no search needed.
    Ids(Vec<RecordId>),
    /// One native filter.
    Filter(SearchFilter),
    /// Fetch every row and keep those where `field` is (or is not) empty.
    ClientNullCheck { field: String, is_null: bool },
}

/// Evaluates WHERE trees against one record type.
pub struct Planner<'a, B: RecordBackend + ?Sized> {
    backend: &'a B,
    record_type: &'a RecordTypeDescriptor,
    page_size: usize,
}

impl<'a, B: RecordBackend + ?Sized> Planner<'a, B> {
    /// Creates a planner. A zero page size is raised to one.
    pub fn new(backend: &'a B, record_type: &'a RecordTypeDescriptor, page_size: usize) -> Self {
        Self {
            backend,
            record_type,
            page_size: page_size.max(1),
        }
    }

    /// Returns the ids of every record matching `condition`, without
    /// duplicates.
    ///
    /// # Errors
    ///
    /// Returns an error if a leaf cannot be compiled or a search fails.
    pub fn matching_ids(&self, condition: &Condition) -> Result<Vec<RecordId>> {
        self.check_compiles(condition)?;
        self.evaluate(condition)
    }

    /// Compiles every leaf before any search runs, so an unsupported
    /// condition fails wherever it sits in the tree.
    fn check_compiles(&self, condition: &Condition) -> Result<()> {
        match condition {
            Condition::Compound { children, .. } => children
                .iter()
                .try_for_each(|child| self.check_compiles(child)),
            leaf => self.compile_leaf(leaf).map(|_| ()),
        }
    }

    fn evaluate(&self, condition: &Condition) -> Result<Vec<RecordId>> {
        match condition {
            Condition::Compound {
                op: LogicalOp::And,
                children,
            } => self.intersect(children),
            Condition::Compound {
                op: LogicalOp::Or,
                children,
            } => self.union(children),
            leaf => self.evaluate_leaf(&self.compile_leaf(leaf)?),
        }
    }

    fn intersect(&self, children: &[Condition]) -> Result<Vec<RecordId>> {
        if let Some(filters) = self.combined_filters(children) {
            debug!(
                record_type = %self.record_type.backend_type_id,
                filters = filters.len(),
                "AND fast path: one combined search"
            );
            match self.search_ids(&filters) {
                Ok(ids) => return Ok(ids),
                Err(e) => warn!(error = %e, "combined search failed, evaluating conditions separately"),
            }
        }

        debug!(children = children.len(), "AND fallback: intersecting per-condition results");
        let mut result: Option<Vec<RecordId>> = None;
        for child in children {
            let ids = self.evaluate(child)?;
            let merged = match result {
                None => ids,
                Some(previous) => {
                    let keep: HashSet<&RecordId> = ids.iter().collect();
                    previous.into_iter().filter(|id| keep.contains(id)).collect()
                }
            };
            if merged.is_empty() {
                debug!("intersection is empty, skipping remaining conditions");
                return Ok(merged);
            }
            result = Some(merged);
        }
        Ok(result.unwrap_or_default())
    }

    /// Compiles every child to exactly one native filter, or returns
    /// `None` when any child cannot be.
    fn combined_filters(&self, children: &[Condition]) -> Option<Vec<SearchFilter>> {
        let mut filters = Vec::with_capacity(children.len());
        for child in children {
            if !child.is_leaf() {
                return None;
            }
            match self.compile_leaf(child) {
                Ok(LeafPlan::Filter(filter)) => filters.push(filter),
                Ok(_) => return None,
                Err(e) => {
                    warn!(condition = %child, error = %e, "condition cannot join a combined search");
                    return None;
                }
            }
        }
        Some(filters)
    }

    fn union(&self, children: &[Condition]) -> Result<Vec<RecordId>> {
        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        for child in children {
            for id in self.evaluate(child)? {
                if seen.insert(id.clone()) {
                    ids.push(id);
                }
            }
        }
        Ok(ids)
    }

    fn evaluate_leaf(&self, plan: &LeafPlan) -> Result<Vec<RecordId>> {
        match plan {
            LeafPlan::Ids(ids) => Ok(dedup(ids.clone())),
            LeafPlan::Filter(filter) => self.search_ids(std::slice::from_ref(filter)),
            LeafPlan::ClientNullCheck { field, is_null } => {
                let rows = self.search_all(&[], &[field.as_str()]).map_err(|e| {
                    ExecError::NullSearchError {
                        field: field.clone(),
                        message: e.to_string(),
                    }
                })?;
                Ok(rows
                    .into_iter()
                    .filter(|row| is_empty_cell(row.columns.get(field)) == *is_null)
                    .map(|row| row.id)
                    .collect())
            }
        }
    }

    fn search_ids(&self, filters: &[SearchFilter]) -> Result<Vec<RecordId>> {
        let rows = self.search_all(filters, &[])?;
        Ok(dedup(rows.into_iter().map(|row| row.id).collect()))
    }

    /// Reads every page of a search.
    fn search_all(&self, filters: &[SearchFilter], columns: &[&str]) -> Result<Vec<SearchRow>> {
        let record_type = &self.record_type.backend_type_id;
        let mut rows = Vec::new();
        let mut page = 0;
        loop {
            let batch = self
                .backend
                .search_page(record_type, filters, columns, page, self.page_size)
                .map_err(|e| ExecError::SearchFailed {
                    record_type: record_type.clone(),
                    message: e.to_string(),
                })?;
            let short = batch.len() < self.page_size;
            debug!(record_type = %record_type, page, rows = batch.len(), "search page");
            rows.extend(batch);
            if short {
                break;
            }
            page += 1;
        }
        Ok(rows)
    }

    /// Compiles one leaf condition.
    ///
    /// # Errors
    ///
    /// Returns [`ExecError::UnsupportedCondition`] for raw text that is not
    /// a LIKE and for fields the store cannot search, and
    /// [`ExecError::UnsupportedConditionType`] for condition kinds the
    /// store cannot serve.
    pub fn compile_leaf(&self, condition: &Condition) -> Result<LeafPlan> {
        match condition {
            Condition::Equals { field, value } => self.compile_compare(field, CompareOp::Eq, value),
            Condition::Comparison { field, op, value } => self.compile_compare(field, *op, value),
            Condition::In { field, values } => {
                let field = self.search_field(field)?;
                if field_kind(&field) == FieldKind::Id {
                    return Ok(LeafPlan::Ids(values.iter().map(filter_text).collect()));
                }
                let date = field_kind(&field) == FieldKind::Date;
                let values = values
                    .iter()
                    .map(|v| if date { format_date(&filter_text(v)) } else { filter_text(v) })
                    .collect();
                Ok(LeafPlan::Filter(SearchFilter::new(field, SearchOperator::AnyOf, values)))
            }
            Condition::Between { field, low, high } => {
                let field = self.search_field(field)?;
                if self.record_type.is_custom_list() {
                    return Err(ExecError::UnsupportedConditionType(format!(
                        "BETWEEN on custom list field '{field}'"
                    )));
                }
                let (operator, values) = match field_kind(&field) {
                    FieldKind::Date => (
                        SearchOperator::Within,
                        vec![format_date(&filter_text(low)), format_date(&filter_text(high))],
                    ),
                    _ => (SearchOperator::Between, vec![filter_text(low), filter_text(high)]),
                };
                Ok(LeafPlan::Filter(SearchFilter::new(id_field(field), operator, values)))
            }
            Condition::IsNull { field } => self.compile_null_check(field, true),
            Condition::IsNotNull { field } => self.compile_null_check(field, false),
            Condition::Raw { text } => self.compile_like(text),
            Condition::Compound { .. } => Err(ExecError::UnsupportedConditionType(
                "compound condition where a single condition is expected".into(),
            )),
        }
    }

    fn compile_compare(&self, field: &str, op: CompareOp, value: &Value) -> Result<LeafPlan> {
        let field = self.search_field(field)?;
        let kind = field_kind(&field);

        if value.is_null() {
            return match op {
                CompareOp::Eq => self.compile_null_check(&field, true),
                CompareOp::NotEq => self.compile_null_check(&field, false),
                _ => Err(ExecError::UnsupportedCondition(format!(
                    "{field} {op} NULL"
                ))),
            };
        }
        if kind == FieldKind::Id && op == CompareOp::Eq {
            return Ok(LeafPlan::Ids(vec![filter_text(value)]));
        }
        if self.record_type.is_custom_list() && !matches!(op, CompareOp::Eq | CompareOp::NotEq) {
            return Err(ExecError::UnsupportedConditionType(format!(
                "'{op}' on custom list field '{field}'"
            )));
        }

        let text = filter_text(value);
        let is_number = matches!(value, Value::Number(_));
        let filter = match kind {
            FieldKind::Date => {
                let operator = match op {
                    CompareOp::Eq => SearchOperator::On,
                    CompareOp::NotEq => SearchOperator::NotOn,
                    CompareOp::Gt => SearchOperator::After,
                    CompareOp::Lt => SearchOperator::Before,
                    CompareOp::GtEq => SearchOperator::OnOrAfter,
                    CompareOp::LtEq => SearchOperator::OnOrBefore,
                };
                SearchFilter::single(field, operator, format_date(&text))
            }
            FieldKind::TextIdentifier if matches!(op, CompareOp::Eq | CompareOp::NotEq) => {
                let operator = if op == CompareOp::Eq {
                    SearchOperator::Is
                } else {
                    SearchOperator::IsNot
                };
                SearchFilter::single(field, operator, text)
            }
            _ => SearchFilter::single(id_field(field), generic_operator(op, is_number), text),
        };
        Ok(LeafPlan::Filter(filter))
    }

    fn compile_null_check(&self, field: &str, is_null: bool) -> Result<LeafPlan> {
        let field = self.search_field(field)?;
        if requires_client_side_null_filter(&field, self.record_type.store) {
            return Ok(LeafPlan::ClientNullCheck { field, is_null });
        }
        let operator = if is_null {
            SearchOperator::IsEmpty
        } else {
            SearchOperator::IsNotEmpty
        };
        Ok(LeafPlan::Filter(SearchFilter::new(field, operator, Vec::new())))
    }

    /// Compiles `field LIKE 'pattern'` to a prefix, suffix, substring or
    /// exact match.
    fn compile_like(&self, text: &str) -> Result<LeafPlan> {
        let captures = LIKE_PATTERN
            .captures(text)
            .ok_or_else(|| ExecError::UnsupportedCondition(text.to_string()))?;
        let field = self.search_field(&captures[1])?;
        let (pattern, quote) = match (captures.get(2), captures.get(3)) {
            (Some(single), _) => (single.as_str(), "'"),
            (None, Some(double)) => (double.as_str(), "\""),
            (None, None) => return Err(ExecError::UnsupportedCondition(text.to_string())),
        };
        let pattern = pattern.replace(&quote.repeat(2), quote);

        let starts = pattern.starts_with('%');
        let ends = pattern.len() > 1 && pattern.ends_with('%');
        let mut inner = pattern.as_str();
        if starts {
            inner = &inner[1..];
        }
        if ends {
            inner = &inner[..inner.len() - 1];
        }
        if inner.contains('%') {
            return Err(ExecError::UnsupportedCondition(text.to_string()));
        }

        let operator = match (starts, ends) {
            (true, true) => SearchOperator::Contains,
            (false, true) => SearchOperator::StartsWith,
            (true, false) => SearchOperator::EndsWith,
            (false, false) => SearchOperator::Is,
        };
        Ok(LeafPlan::Filter(SearchFilter::single(field, operator, inner)))
    }

    /// Lower-cases the field and applies custom-list restrictions.
    fn search_field(&self, field: &str) -> Result<String> {
        if !self.record_type.is_custom_list() {
            return Ok(field.to_lowercase());
        }
        custom_list_field(field).map(str::to_string).ok_or_else(|| {
            ExecError::UnsupportedCondition(format!(
                "field '{field}' is not searchable on custom list '{}' (use value, name, scriptid or externalid)",
                self.record_type.backend_type_id
            ))
        })
    }
}

/// Searches on `id` go to `internalid`.
fn id_field(field: String) -> String {
    if field == "id" {
        "internalid".to_string()
    } else {
        field
    }
}

const fn generic_operator(op: CompareOp, is_number: bool) -> SearchOperator {
    match op {
        CompareOp::Eq if is_number => SearchOperator::EqualTo,
        CompareOp::Eq => SearchOperator::Is,
        CompareOp::NotEq if is_number => SearchOperator::NotEqualTo,
        CompareOp::NotEq => SearchOperator::IsNot,
        CompareOp::Gt => SearchOperator::GreaterThan,
        CompareOp::GtEq => SearchOperator::GreaterThanOrEqualTo,
        CompareOp::Lt => SearchOperator::LessThan,
        CompareOp::LtEq => SearchOperator::LessThanOrEqualTo,
    }
}

/// Renders a literal as a filter value. Numbers use `f64` formatting, so
/// `123.0` becomes `123`; booleans become `T`/`F`.
#[must_use]
pub fn filter_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Boolean(b) => if *b { "T" } else { "F" }.to_string(),
        Value::Null => String::new(),
    }
}

fn is_empty_cell(value: Option<&serde_json::Value>) -> bool {
    match value {
        None | Some(serde_json::Value::Null) => true,
        Some(serde_json::Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

fn dedup(ids: Vec<RecordId>) -> Vec<RecordId> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryBackend;
    use crate::resolver::{ConventionResolver, RecordTypeResolver};
    use oxide_dml_core::parse_where_clause;

    fn descriptor(table: &str) -> RecordTypeDescriptor {
        ConventionResolver.resolve(table).unwrap()
    }

    fn where_(text: &str) -> Condition {
        parse_where_clause(text).unwrap().unwrap()
    }

    fn compile(table: &str, text: &str) -> Result<LeafPlan> {
        let backend = InMemoryBackend::new();
        let record_type = descriptor(table);
        Planner::new(&backend, &record_type, 1000).compile_leaf(&where_(text))
    }

    fn filter(table: &str, text: &str) -> SearchFilter {
        match compile(table, text).unwrap() {
            LeafPlan::Filter(filter) => filter,
            other => panic!("expected a filter for {text}, got {other:?}"),
        }
    }

    fn customers() -> InMemoryBackend {
        InMemoryBackend::from_json_str(
            r#"{"customer": [
                {"id": "1", "companyname": "Acme", "status": "open", "balance": 10},
                {"id": "2", "companyname": "Globex", "status": "open", "balance": 20},
                {"id": "3", "companyname": "Initech", "status": "closed", "balance": 30},
                {"id": "4", "companyname": "Hooli", "status": "open", "balance": 40},
                {"id": "5", "companyname": "Umbrella", "status": "closed", "balance": 50}
            ]}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_generic_operators() {
        assert_eq!(
            filter("customer", "balance = 100"),
            SearchFilter::single("balance", SearchOperator::EqualTo, "100")
        );
        assert_eq!(
            filter("customer", "status = 'open'"),
            SearchFilter::single("status", SearchOperator::Is, "open")
        );
        assert_eq!(
            filter("customer", "status <> 'open'"),
            SearchFilter::single("status", SearchOperator::IsNot, "open")
        );
        assert_eq!(
            filter("customer", "balance >= 1.5").operator,
            SearchOperator::GreaterThanOrEqualTo
        );
        assert_eq!(
            filter("customer", "Balance < 3").field,
            "balance"
        );
    }

    #[test]
    fn test_text_identifier_uses_string_form() {
        assert_eq!(
            filter("salesorder", "tranid = 123"),
            SearchFilter::single("tranid", SearchOperator::Is, "123")
        );
        assert_eq!(
            filter("customer", "custbody_code != 'A'").operator,
            SearchOperator::IsNot
        );
    }

    #[test]
    fn test_date_fields() {
        assert_eq!(
            filter("customer", "hiredate > '2023-01-01'"),
            SearchFilter::single("hiredate", SearchOperator::After, "01/01/2023")
        );
        assert_eq!(
            filter("customer", "trandate = '3/4/2024'"),
            SearchFilter::single("trandate", SearchOperator::On, "03/04/2024")
        );
        assert_eq!(
            filter("customer", "duedate BETWEEN '2024-01-01' AND '2024-01-31'"),
            SearchFilter::new(
                "duedate",
                SearchOperator::Within,
                vec!["01/01/2024".into(), "01/31/2024".into()]
            )
        );
        assert_eq!(
            filter("customer", "balance BETWEEN 1 AND 2").operator,
            SearchOperator::Between
        );
    }

    #[test]
    fn test_id_short_circuit() {
        assert_eq!(
            compile("customer", "id = 42").unwrap(),
            LeafPlan::Ids(vec!["42".into()])
        );
        assert_eq!(
            compile("customer", "internalid IN (1, 2, 1)").unwrap(),
            LeafPlan::Ids(vec!["1".into(), "2".into(), "1".into()])
        );
        assert_eq!(
            filter("customer", "id > 100"),
            SearchFilter::single("internalid", SearchOperator::GreaterThan, "100")
        );
    }

    #[test]
    fn test_null_checks() {
        assert_eq!(
            filter("customer", "email IS NULL"),
            SearchFilter::new("email", SearchOperator::IsEmpty, Vec::new())
        );
        assert_eq!(
            filter("customer", "email = NULL").operator,
            SearchOperator::IsEmpty
        );
        assert_eq!(
            compile("customlist_colors", "externalid IS NOT NULL").unwrap(),
            LeafPlan::ClientNullCheck {
                field: "externalid".into(),
                is_null: false
            }
        );
    }

    #[test]
    fn test_like() {
        let like = |text| filter("customer", text);
        assert_eq!(like("name LIKE 'Acme%'").operator, SearchOperator::StartsWith);
        assert_eq!(like("name LIKE '%Corp'").operator, SearchOperator::EndsWith);
        assert_eq!(
            like("name LIKE '%it''s%'"),
            SearchFilter::single("name", SearchOperator::Contains, "it's")
        );
        assert_eq!(like("name like \"Exact\"").operator, SearchOperator::Is);
        assert!(matches!(
            compile("customer", "name LIKE 'a%b%'"),
            Err(ExecError::UnsupportedCondition(_))
        ));
        assert!(matches!(
            compile("customer", "UPPER(name) = 'X'"),
            Err(ExecError::UnsupportedCondition(_))
        ));
    }

    #[test]
    fn test_custom_list_restrictions() {
        assert_eq!(
            filter("customlist_colors", "value = 'Red'"),
            SearchFilter::single("name", SearchOperator::Is, "Red")
        );
        assert!(matches!(
            compile("customlist_colors", "color = 'Red'"),
            Err(ExecError::UnsupportedCondition(_))
        ));
        assert!(matches!(
            compile("customlist_colors", "name > 'R'"),
            Err(ExecError::UnsupportedConditionType(_))
        ));
    }

    #[test]
    fn test_and_fast_path_uses_one_search() {
        let backend = customers();
        let record_type = descriptor("customer");
        let planner = Planner::new(&backend, &record_type, 1000);

        let ids = planner
            .matching_ids(&where_("status = 'open' AND balance > 15"))
            .unwrap();
        assert_eq!(ids, vec!["2", "4"]);
        assert_eq!(backend.search_calls(), 1);
        assert_eq!(backend.search_log()[0].len(), 2);
    }

    #[test]
    fn test_and_fallback_intersects() {
        let backend = customers().with_failing_multi_filter_search();
        let record_type = descriptor("customer");
        let planner = Planner::new(&backend, &record_type, 1000);

        let ids = planner
            .matching_ids(&where_("status = 'open' AND balance > 15"))
            .unwrap();
        assert_eq!(ids, vec!["2", "4"]);
        // combined attempt, then one search per condition
        assert_eq!(backend.search_calls(), 3);
    }

    #[test]
    fn test_and_with_id_leaf_skips_fast_path() {
        let backend = customers();
        let record_type = descriptor("customer");
        let planner = Planner::new(&backend, &record_type, 1000);

        let ids = planner
            .matching_ids(&where_("id IN (5, 3, 1) AND status = 'closed'"))
            .unwrap();
        assert_eq!(ids, vec!["5", "3"]);
        assert_eq!(backend.search_calls(), 1);
    }

    #[test]
    fn test_unsupported_leaf_fails_in_any_position() {
        let backend = customers();
        let record_type = descriptor("customer");
        let planner = Planner::new(&backend, &record_type, 1000);

        for text in [
            "status = 'nomatch' AND UPPER(companyname) = 'ACME'",
            "UPPER(companyname) = 'ACME' AND status = 'nomatch'",
            "status = 'nomatch' AND (balance > 0 OR UPPER(companyname) = 'ACME')",
        ] {
            assert!(
                matches!(
                    planner.matching_ids(&where_(text)),
                    Err(ExecError::UnsupportedCondition(_))
                ),
                "for {text}"
            );
        }
        assert_eq!(backend.search_calls(), 0);
    }

    #[test]
    fn test_or_is_ordered_union() {
        let backend = customers();
        let record_type = descriptor("customer");
        let planner = Planner::new(&backend, &record_type, 1000);

        let ids = planner
            .matching_ids(&where_("balance >= 40 OR status = 'open' OR id = 9"))
            .unwrap();
        assert_eq!(ids, vec!["4", "5", "1", "2", "9"]);
    }

    #[test]
    fn test_pagination_reads_until_short_page() {
        let backend = customers();
        let record_type = descriptor("customer");
        let planner = Planner::new(&backend, &record_type, 2);

        let ids = planner.matching_ids(&where_("balance > 0")).unwrap();
        assert_eq!(ids.len(), 5);
        assert_eq!(backend.search_calls(), 3);
    }

    #[test]
    fn test_search_failure_is_reported() {
        let backend = InMemoryBackend::new();
        let record_type = descriptor("customer");
        let planner = Planner::new(&backend, &record_type, 1000);
        assert!(matches!(
            planner.matching_ids(&where_("status = 'open'")),
            Err(ExecError::SearchFailed { .. })
        ));
    }

    #[test]
    fn test_client_side_null_filter() {
        let backend = InMemoryBackend::from_json_str(
            r#"{"customlist_colors": [
                {"id": "1", "name": "Red", "externalid": "R"},
                {"id": "2", "name": "Green", "externalid": ""},
                {"id": "3", "name": "Blue"}
            ]}"#,
        )
        .unwrap();
        let record_type = descriptor("customlist_colors");
        let planner = Planner::new(&backend, &record_type, 1000);

        assert_eq!(
            planner.matching_ids(&where_("externalid IS NULL")).unwrap(),
            vec!["2", "3"]
        );
        assert!(backend.search_log()[0].is_empty());
    }
}
