//! Tests for CREATE RECORD and CREATE LIST statements.

mod common;
use common::*;

use oxide_dml_core::ast::FieldType;
use oxide_dml_core::{classify, ParseErrorKind, StatementKind, Value};

#[test]
fn create_record_with_fields_and_options() {
    let r = parse_create_record(
        "CREATE RECORD project (\n  name = \"Project\",\n  showId = true\n  budget CURRENCY,\n  status LIST(customlist_status)\n)",
    );
    assert_eq!(r.record_id, "project");
    assert_eq!(r.full_record_id, "customrecord_project");
    assert_eq!(r.display_name, "Project");
    assert_eq!(r.record_options.get("showId"), Some(&Value::Boolean(true)));
    assert_eq!(r.fields.len(), 2);
    assert_eq!(r.fields[0].field_type, FieldType::Currency);
    assert_eq!(r.fields[0].script_id, "custrecord_project_budget");
    assert_eq!(r.fields[1].list_type.as_deref(), Some("customlist_status"));
}

#[test]
fn create_record_prefix_and_default_display_name() {
    let r = parse_create_record("CREATE RECORD Ticket (prefix \"acme_\", Severity INTEGER)");
    assert_eq!(r.prefix.as_deref(), Some("acme_"));
    assert_eq!(r.full_record_id, "customrecord_acme_ticket");
    assert_eq!(r.display_name, "acme_Ticket");
    assert_eq!(r.fields[0].script_id, "custrecord_acme_ticket_severity");
}

#[test]
fn create_record_ids_respect_limits() {
    let r = parse_create_record(
        "CREATE RECORD employee_department_assignment_history (effective_start_date DATE)",
    );
    let record_part = r.full_record_id.strip_prefix("customrecord_").unwrap();
    assert!(record_part.len() <= 27, "{}", r.full_record_id);
    let field_part = r.fields[0].script_id.strip_prefix("custrecord_").unwrap();
    assert!(field_part.len() <= 29, "{}", r.fields[0].script_id);
}

#[test]
fn create_record_accepts_every_field_type() {
    for field_type in FieldType::ALL {
        let sql = format!("CREATE RECORD r (x {field_type})");
        let r = parse_create_record(&sql);
        assert_eq!(r.fields[0].field_type, field_type, "for {sql}");
    }
}

#[test]
fn create_record_unknown_type() {
    let err = parse_err("CREATE RECORD r (x UNKNOWNTYPE)");
    assert_eq!(err.kind, ParseErrorKind::InvalidFieldType);
}

#[test]
fn create_record_items_separated_by_spaces() {
    let r = parse_create_record(r#"CREATE RECORD r (name = "A" d DATE)"#);
    assert_eq!(r.display_name, "A");
    assert_eq!(r.record_options.get("name"), Some(&Value::String("A".into())));
    assert_eq!(r.fields.len(), 1);
    assert_eq!(r.fields[0].name, "d");
    assert_eq!(r.fields[0].field_type, FieldType::Date);

    let r = parse_create_record("CREATE RECORD r (showId = T budget CURRENCY owner_ref ENTITY(employee))");
    assert_eq!(r.record_options.len(), 1);
    assert_eq!(r.fields.len(), 2);
    assert_eq!(r.fields[1].list_type.as_deref(), Some("employee"));
}

#[test]
fn create_record_rejects_leftover_tokens() {
    let err = parse_err(r#"CREATE RECORD r (name = "A" "B")"#);
    assert_eq!(err.kind, ParseErrorKind::InvalidSyntax);

    let err = parse_err("CREATE RECORD r (x DATE extra)");
    assert_eq!(err.kind, ParseErrorKind::InvalidFieldType);
}

#[test]
fn create_record_rejects_unknown_option_and_duplicates() {
    assert_eq!(
        parse_err("CREATE RECORD r (colour = 'red')").kind,
        ParseErrorKind::InvalidSyntax
    );
    assert_eq!(
        parse_err("CREATE RECORD r (a DATE, A TEXTAREA)").kind,
        ParseErrorKind::InvalidSyntax
    );
}

#[test]
fn create_list_full_grammar() {
    let l = parse_create_list(
        r#"CREATE LIST status (
            description "Ticket status"
            optionsorder "ALPHABETICAL"
            matrixoption FALSE
            isinactive false
            values [
                value "Open" abbreviation "OP" translations [ "fr_FR" = "Ouvert", "de_DE" = "Offen" ],
                value "Closed" inactive TRUE
            ]
        )"#,
    );
    assert_eq!(l.list_id, "status");
    assert_eq!(l.full_list_id, "customlist_status");
    assert_eq!(l.options.description.as_deref(), Some("Ticket status"));
    assert_eq!(l.options.options_order.as_deref(), Some("ALPHABETICAL"));
    assert_eq!(l.values.len(), 2);
    assert_eq!(l.values[0].abbreviation.as_deref(), Some("OP"));
    assert_eq!(l.values[0].translations.len(), 2);
    assert_eq!(l.values[0].translations[1].label, "Offen");
    assert!(!l.values[0].inactive);
    assert!(l.values[1].inactive);
}

#[test]
fn create_list_does_not_double_prefix() {
    let l = parse_create_list("CREATE LIST customlist_Colors");
    assert_eq!(l.full_list_id, "customlist_colors");
    assert!(l.values.is_empty());
}

#[test]
fn create_list_rejects_unknown_option() {
    assert_eq!(
        parse_err("CREATE LIST c (colour \"red\")").kind,
        ParseErrorKind::InvalidSyntax
    );
}

#[test]
fn classifier_order() {
    assert_eq!(classify("CREATE RECORD r (x DATE)"), Some(StatementKind::CreateRecord));
    assert_eq!(classify("create list c"), Some(StatementKind::CreateList));
    assert_eq!(classify("SELECT id FROM customer"), None);
}
