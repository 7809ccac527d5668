//! Script id generation for custom records, fields and lists.
//!
//! The backend caps script ids at a fixed length, so long names are
//! shortened by [`truncate_script_id`]. Truncation is lossy: two different
//! long names can map to the same id.

/// Prefix of generated record type ids.
pub const RECORD_PREFIX: &str = "customrecord_";
/// Prefix of generated custom field ids.
pub const FIELD_PREFIX: &str = "custrecord_";
/// Prefix of generated list ids.
pub const LIST_PREFIX: &str = "customlist_";
/// Maximum length of the part after [`RECORD_PREFIX`].
pub const MAX_RECORD_ID_LEN: usize = 27;
/// Maximum length of the part after [`FIELD_PREFIX`].
pub const MAX_FIELD_ID_LEN: usize = 29;

const ABBREVIATIONS: &[(&str, &str)] = &[
    ("employee", "emp"),
    ("department", "dept"),
    ("customer", "cust"),
    ("transaction", "tran"),
    ("subsidiary", "sub"),
    ("location", "loc"),
    ("classification", "class"),
    ("description", "desc"),
    ("quantity", "qty"),
    ("amount", "amt"),
    ("number", "num"),
    ("account", "acct"),
    ("address", "addr"),
    ("information", "info"),
    ("management", "mgmt"),
    ("configuration", "config"),
    ("application", "app"),
    ("organization", "org"),
    ("reference", "ref"),
    ("category", "cat"),
    ("document", "doc"),
    ("message", "msg"),
    ("approval", "appr"),
    ("vendor", "vend"),
    ("purchase", "purch"),
    ("invoice", "inv"),
    ("project", "proj"),
    ("record", "rec"),
];

/// Shortens `id` to at most `max_len` characters.
///
/// In order: returns `id` unchanged if it fits; abbreviates whole
/// `_`-separated words from a fixed dictionary; keeps the first and last
/// segments and cuts the middle down to fit; finally hard-truncates.
#[must_use]
pub fn truncate_script_id(id: &str, max_len: usize) -> String {
    if id.chars().count() <= max_len {
        return id.to_string();
    }

    let abbreviated: Vec<&str> = id
        .split('_')
        .map(|word| {
            ABBREVIATIONS
                .iter()
                .find(|(full, _)| word.eq_ignore_ascii_case(full))
                .map_or(word, |(_, short)| short)
        })
        .collect();
    let joined = abbreviated.join("_");
    if joined.chars().count() <= max_len {
        return joined;
    }

    let shortened = if abbreviated.len() >= 3 {
        let first = abbreviated[0];
        let last = abbreviated[abbreviated.len() - 1];
        let middle = abbreviated[1..abbreviated.len() - 1].join("_");
        let fixed = first.chars().count() + last.chars().count() + 2;
        if max_len > fixed {
            let budget = max_len - fixed;
            let cut: String = middle.chars().take(budget).collect();
            let cut = cut.trim_end_matches('_');
            if cut.is_empty() {
                format!("{first}_{last}")
            } else {
                format!("{first}_{cut}_{last}")
            }
        } else {
            format!("{first}_{last}")
        }
    } else {
        joined
    };

    shortened.chars().take(max_len).collect()
}

/// Strips a case-insensitive `prefix` from `id`, if present.
#[must_use]
pub fn strip_prefix_ci<'a>(id: &'a str, prefix: &str) -> &'a str {
    match id.get(..prefix.len()) {
        Some(head) if head.eq_ignore_ascii_case(prefix) => &id[prefix.len()..],
        _ => id,
    }
}

/// Builds `customrecord_<prefix><record_id>`.
#[must_use]
pub fn record_script_id(prefix: &str, record_id: &str) -> String {
    let base = format!("{prefix}{}", strip_prefix_ci(record_id, RECORD_PREFIX)).to_lowercase();
    format!("{RECORD_PREFIX}{}", truncate_script_id(&base, MAX_RECORD_ID_LEN))
}

/// Builds `custrecord_<prefix><record_id>_<field>`.
#[must_use]
pub fn field_script_id(prefix: &str, record_id: &str, field: &str) -> String {
    let base = format!(
        "{prefix}{}_{field}",
        strip_prefix_ci(record_id, RECORD_PREFIX)
    )
    .to_lowercase();
    format!("{FIELD_PREFIX}{}", truncate_script_id(&base, MAX_FIELD_ID_LEN))
}

/// Builds `customlist_<list_id>`.
// TODO: list ids are not truncated like record and field ids; decide on a
// limit once the backend's list id cap is confirmed.
#[must_use]
pub fn list_script_id(list_id: &str) -> String {
    format!(
        "{LIST_PREFIX}{}",
        strip_prefix_ci(list_id, LIST_PREFIX).to_lowercase()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_ids_unchanged() {
        assert_eq!(truncate_script_id("project_task", 27), "project_task");
    }

    #[test]
    fn test_abbreviation_pass() {
        assert_eq!(
            truncate_script_id("employee_department_transaction", 27),
            "emp_dept_tran"
        );
    }

    #[test]
    fn test_abbreviation_only_whole_words() {
        assert_eq!(
            truncate_script_id("employees_of_the_month_overview", 24),
            "employees_of_th_overview"
        );
    }

    #[test]
    fn test_middle_segment_cut() {
        let id = truncate_script_id("alpha_bravocharliedelta_echofoxtrot_omega", 20);
        assert_eq!(id, "alpha_bravocha_omega");
    }

    #[test]
    fn test_hard_truncate_without_segments() {
        assert_eq!(
            truncate_script_id("abcdefghijklmnopqrstuvwxyz0123456789", 27),
            "abcdefghijklmnopqrstuvwxyz0"
        );
    }

    #[test]
    fn test_output_never_exceeds_limit() {
        for max in [1, 5, 10, 27, 29] {
            for id in [
                "a_b",
                "employee_department_location_subsidiary_invoice",
                "verylongsinglewordwithoutanyunderscoresatall",
                "x_y_zzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzz",
            ] {
                let out = truncate_script_id(id, max);
                assert!(out.chars().count() <= max, "{id} -> {out} ({max})");
                assert_eq!(out, truncate_script_id(id, max));
            }
        }
    }

    #[test]
    fn test_generated_ids() {
        assert_eq!(record_script_id("", "Project"), "customrecord_project");
        assert_eq!(record_script_id("acme_", "customrecord_task"), "customrecord_acme_task");
        assert_eq!(
            field_script_id("", "project", "Status"),
            "custrecord_project_status"
        );
        assert_eq!(list_script_id("Colors"), "customlist_colors");
        assert_eq!(list_script_id("customlist_colors"), "customlist_colors");
    }

    #[test]
    fn test_strip_prefix_ci() {
        assert_eq!(strip_prefix_ci("CustomRecord_x", RECORD_PREFIX), "x");
        assert_eq!(strip_prefix_ci("x", RECORD_PREFIX), "x");
    }
}
