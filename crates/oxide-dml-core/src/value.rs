//! Scalar literals and value lists.
//!
//! Values are parsed from raw literal text rather than from lexer tokens, so
//! that unquoted words (`status = active`) and odd literals survive intact.

use std::fmt;

/// A literal value from statement text.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Quoted or bare text.
    String(String),
    /// Any numeric literal. Integers are stored as floats too.
    Number(f64),
    /// `true` / `false`, any case.
    Boolean(bool),
    /// `NULL`, any case.
    Null,
}

impl Value {
    /// Parses a single literal. Never fails: anything unrecognised is kept
    /// as an unquoted string.
    ///
    /// Quoted literals have their delimiters stripped but are not
    /// unescaped; [`parse_values_list`] is the path that unescapes doubled
    /// quotes.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let text = text.trim();

        if let Some(inner) = strip_quotes(text) {
            return Self::String(inner.to_string());
        }
        if text.eq_ignore_ascii_case("null") {
            return Self::Null;
        }
        if text.eq_ignore_ascii_case("true") {
            return Self::Boolean(true);
        }
        if text.eq_ignore_ascii_case("false") {
            return Self::Boolean(false);
        }
        if is_numeric_literal(text) {
            if let Ok(n) = text.parse::<f64>() {
                return Self::Number(n);
            }
        }
        Self::String(text.to_string())
    }

    /// Returns the text of a string value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the number of a numeric value.
    #[must_use]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns true for `NULL`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Interprets the value as a checkbox flag: booleans as-is, `T`/`Y`/`yes`/
    /// `1`-like text and non-zero numbers as true, everything else false.
    #[must_use]
    pub fn to_bool(&self) -> bool {
        match self {
            Self::Boolean(b) => *b,
            Self::Number(n) => *n != 0.0,
            Self::String(s) => matches!(
                s.trim().to_ascii_lowercase().as_str(),
                "t" | "true" | "y" | "yes" | "1"
            ),
            Self::Null => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Null => write!(f, "NULL"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

/// Parses a comma-separated list of literals, e.g. the inside of
/// `VALUES (...)` or `IN (...)`.
///
/// Commas inside quotes do not split, a doubled quote inside a quoted run is
/// an escaped quote, and empty segments are skipped.
#[must_use]
pub fn parse_values_list(text: &str) -> Vec<Value> {
    let mut values = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match quote {
            Some(q) if c == q => {
                if chars.peek() == Some(&q) {
                    current.push(q);
                    current.push(q);
                    chars.next();
                } else {
                    current.push(c);
                    quote = None;
                }
            }
            Some(_) => current.push(c),
            None if c == '\'' || c == '"' => {
                current.push(c);
                quote = Some(c);
            }
            None if c == ',' => {
                push_list_item(&mut values, &current);
                current.clear();
            }
            None => current.push(c),
        }
    }
    push_list_item(&mut values, &current);

    values
}

fn push_list_item(values: &mut Vec<Value>, raw: &str) {
    if !raw.trim().is_empty() {
        values.push(parse_literal(raw));
    }
}

/// Parses one literal of a value list or SET assignment. Unlike
/// [`Value::parse`], doubled quotes inside a quoted literal are unescaped.
#[must_use]
pub fn parse_literal(text: &str) -> Value {
    let text = text.trim();
    match (text.chars().next(), strip_quotes(text)) {
        (Some(q), Some(inner)) => {
            let doubled: String = [q, q].iter().collect();
            Value::String(inner.replace(&doubled, &q.to_string()))
        }
        _ => Value::parse(text),
    }
}

/// Returns the interior of a `'...'` or `"..."` literal.
pub(crate) fn strip_quotes(text: &str) -> Option<&str> {
    let first = text.chars().next()?;
    if text.len() >= 2 && (first == '\'' || first == '"') && text.ends_with(first) {
        Some(&text[1..text.len() - 1])
    } else {
        None
    }
}

/// Matches `-?\d+(\.\d+)?`.
fn is_numeric_literal(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((int_part, frac)) => (int_part, Some(frac)),
        None => (digits, None),
    };
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    all_digits(int_part) && frac_part.map_or(true, all_digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scalars() {
        assert_eq!(Value::parse("  'Acme' "), Value::String("Acme".into()));
        assert_eq!(Value::parse("\"Acme\""), Value::String("Acme".into()));
        assert_eq!(Value::parse("null"), Value::Null);
        assert_eq!(Value::parse("TRUE"), Value::Boolean(true));
        assert_eq!(Value::parse("False"), Value::Boolean(false));
        assert_eq!(Value::parse("123"), Value::Number(123.0));
        assert_eq!(Value::parse("-0.5"), Value::Number(-0.5));
        assert_eq!(Value::parse("active"), Value::String("active".into()));
    }

    #[test]
    fn test_numeric_literal_shape() {
        assert!(is_numeric_literal("10"));
        assert!(is_numeric_literal("-10.25"));
        assert!(!is_numeric_literal("1."));
        assert!(!is_numeric_literal(".5"));
        assert!(!is_numeric_literal("1e5"));
        assert!(!is_numeric_literal("--1"));
        assert_eq!(Value::parse("1e5"), Value::String("1e5".into()));
    }

    #[test]
    fn test_simple_path_keeps_doubled_quotes() {
        assert_eq!(Value::parse("'O''Brien'"), Value::String("O''Brien".into()));
    }

    #[test]
    fn test_values_list_unescapes() {
        assert_eq!(
            parse_values_list("'O''Brien', 42, NULL"),
            vec![
                Value::String("O'Brien".into()),
                Value::Number(42.0),
                Value::Null
            ]
        );
    }

    #[test]
    fn test_values_list_quoted_commas() {
        assert_eq!(
            parse_values_list(r#"'a, b', "c,d", e"#),
            vec![
                Value::String("a, b".into()),
                Value::String("c,d".into()),
                Value::String("e".into())
            ]
        );
    }

    #[test]
    fn test_values_list_skips_empty_segments() {
        assert_eq!(
            parse_values_list("1, , 2,"),
            vec![Value::Number(1.0), Value::Number(2.0)]
        );
        assert!(parse_values_list("  ").is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Number(123.0).to_string(), "123");
        assert_eq!(Value::Number(3.14).to_string(), "3.14");
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::Boolean(true).to_string(), "true");
    }

    #[test]
    fn test_to_bool() {
        assert!(Value::parse("'T'").to_bool());
        assert!(Value::Number(1.0).to_bool());
        assert!(!Value::parse("'F'").to_bool());
        assert!(!Value::Null.to_bool());
    }
}
