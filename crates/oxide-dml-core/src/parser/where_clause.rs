//! WHERE-clause parsing.
//!
//! The clause is first split into condition texts and top-level AND/OR
//! operators, then grouped so that AND binds tighter than OR. Each condition
//! text is matched against the leaf grammar in a fixed order: enclosing
//! parentheses, BETWEEN, IN, IS [NOT] NULL, comparison, and finally a raw
//! fallback.

use super::error::{ParseError, ParseErrorKind};
use super::scan::{has_enclosing_parens, matching_close};
use crate::ast::{CompareOp, Condition, LogicalOp};
use crate::lexer::{Keyword, Lexer, Span, Token, TokenKind};
use crate::value::{parse_values_list, Value};

/// A piece of a tokenized WHERE clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WhereToken {
    /// The text of one condition, possibly parenthesized.
    Condition(String),
    /// A top-level AND/OR.
    Operator(LogicalOp),
}

/// Splits a WHERE clause into conditions and top-level AND/OR operators.
///
/// Operators are only recognised outside quotes and at parenthesis depth
/// zero, as whole words. The `AND` that closes a pending `BETWEEN` belongs to
/// the condition.
#[must_use]
pub fn tokenize_where(text: &str) -> Vec<WhereToken> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut buffer = String::new();
    let mut quote: Option<char> = None;
    let mut depth = 0usize;
    let mut pending_between = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if let Some(q) = quote {
            buffer.push(c);
            if c == q {
                if chars.get(i + 1) == Some(&q) {
                    buffer.push(q);
                    i += 2;
                    continue;
                }
                quote = None;
            }
            i += 1;
            continue;
        }

        match c {
            '\'' | '"' => quote = Some(c),
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if is_word_char(c) && (i == 0 || !is_word_char(chars[i - 1])) => {
                let end = (i..chars.len())
                    .find(|&j| !is_word_char(chars[j]))
                    .unwrap_or(chars.len());
                let word: String = chars[i..end].iter().collect();

                if depth == 0 {
                    if word.eq_ignore_ascii_case("between") {
                        pending_between = true;
                    } else if word.eq_ignore_ascii_case("and") && pending_between {
                        pending_between = false;
                    } else if let Some(op) = logical_op(&word) {
                        flush_condition(&mut tokens, &mut buffer);
                        pending_between = false;
                        tokens.push(WhereToken::Operator(op));
                        i = end;
                        continue;
                    }
                }

                buffer.push_str(&word);
                i = end;
                continue;
            }
            _ => {}
        }

        buffer.push(c);
        i += 1;
    }
    flush_condition(&mut tokens, &mut buffer);

    tokens
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn logical_op(word: &str) -> Option<LogicalOp> {
    if word.eq_ignore_ascii_case("and") {
        Some(LogicalOp::And)
    } else if word.eq_ignore_ascii_case("or") {
        Some(LogicalOp::Or)
    } else {
        None
    }
}

fn flush_condition(tokens: &mut Vec<WhereToken>, buffer: &mut String) {
    let text = buffer.trim();
    if !text.is_empty() {
        tokens.push(WhereToken::Condition(text.to_string()));
    }
    buffer.clear();
}

/// Parses a WHERE clause into a condition tree.
///
/// Returns `Ok(None)` for empty or whitespace-only input.
///
/// # Errors
///
/// Returns `SubqueryNotSupported` for subqueries and `InvalidSyntax` for
/// dangling operators or empty parenthesized groups.
pub fn parse_where_clause(text: &str) -> Result<Option<Condition>, ParseError> {
    let text = text.trim();
    if content_end(&Lexer::new(text).tokenize()) == 0 {
        return Ok(None);
    }

    let tokens = tokenize_where(text);
    if !tokens.iter().any(|t| matches!(t, WhereToken::Operator(_))) {
        return parse_simple_condition(text).map(Some);
    }

    let whole = Span::new(0, text.len());
    let mut groups = Vec::new();
    let mut current = Vec::new();
    let mut expect_condition = true;

    for token in tokens {
        match token {
            WhereToken::Condition(condition) => {
                current.push(parse_simple_condition(&condition)?);
                expect_condition = false;
            }
            WhereToken::Operator(op) => {
                if expect_condition {
                    return Err(ParseError::syntax(
                        format!("{} without a preceding condition", op.as_str()),
                        whole,
                    ));
                }
                if op == LogicalOp::Or {
                    groups.extend(Condition::combine(
                        LogicalOp::And,
                        std::mem::take(&mut current),
                    ));
                }
                expect_condition = true;
            }
        }
    }

    if expect_condition {
        return Err(ParseError::syntax(
            "WHERE clause ends with a dangling AND/OR",
            whole,
        ));
    }
    groups.extend(Condition::combine(LogicalOp::And, current));

    Ok(Condition::combine(LogicalOp::Or, groups))
}

/// Parses one condition without top-level AND/OR.
fn parse_simple_condition(text: &str) -> Result<Condition, ParseError> {
    let text = text.trim();
    let tokens = Lexer::new(text).tokenize();
    // Trailing `--` comments are not part of the value
    let text = &text[..content_end(&tokens)];
    if text.is_empty() {
        return Err(ParseError::syntax("Empty condition", Span::new(0, 0)));
    }
    reject_subquery(&tokens)?;
    check_balanced(&tokens)?;

    if has_enclosing_parens(text) {
        return parse_where_clause(&text[1..text.len() - 1])?.ok_or_else(|| {
            ParseError::syntax("Empty parenthesized condition", Span::new(0, text.len()))
        });
    }

    let raw = || Condition::Raw {
        text: text.to_string(),
    };
    let Some((field, next)) = parse_field(&tokens) else {
        return Ok(raw());
    };
    let Some(operator) = tokens.get(next) else {
        return Ok(raw());
    };

    if let Some(condition) = match_between(text, &tokens, &field, next) {
        return Ok(condition);
    }
    if let Some(condition) = match_in(text, &tokens, &field, next) {
        return Ok(condition);
    }
    if let Some(condition) = match_null_check(&tokens, &field, next) {
        return Ok(condition);
    }

    let op = match operator.kind {
        TokenKind::Eq => CompareOp::Eq,
        TokenKind::NotEq => CompareOp::NotEq,
        TokenKind::GtEq => CompareOp::GtEq,
        TokenKind::LtEq => CompareOp::LtEq,
        TokenKind::Gt => CompareOp::Gt,
        TokenKind::Lt => CompareOp::Lt,
        _ => return Ok(raw()),
    };
    let value_text = text[operator.span.end..].trim();
    if value_text.is_empty() {
        return Ok(raw());
    }
    let value = Value::parse(value_text);

    Ok(if op == CompareOp::Eq {
        Condition::Equals { field, value }
    } else {
        Condition::Comparison { field, op, value }
    })
}

fn reject_subquery(tokens: &[Token]) -> Result<(), ParseError> {
    for (i, token) in tokens.iter().enumerate() {
        let nested_select = token.kind == TokenKind::LeftParen
            && tokens
                .get(i + 1)
                .is_some_and(|t| t.as_keyword() == Some(Keyword::Select));
        if nested_select || token.as_keyword() == Some(Keyword::Exists) {
            return Err(ParseError::new(
                ParseErrorKind::SubqueryNotSupported,
                "Subqueries are not supported in WHERE clauses",
                token.span,
            ));
        }
    }
    Ok(())
}

/// End of the last real token.
fn content_end(tokens: &[Token]) -> usize {
    tokens
        .iter()
        .rev()
        .find(|t| !t.is_eof())
        .map_or(0, |t| t.span.end)
}

fn check_balanced(tokens: &[Token]) -> Result<(), ParseError> {
    let mut open = Vec::new();
    for token in tokens {
        match token.kind {
            TokenKind::LeftParen => open.push(token.span),
            TokenKind::RightParen => {
                if open.pop().is_none() {
                    return Err(ParseError::syntax("Unmatched ')' in condition", token.span));
                }
            }
            _ => {}
        }
    }
    match open.last() {
        Some(span) => Err(ParseError::syntax("Unclosed '(' in condition", *span)),
        None => Ok(()),
    }
}

/// Reads `ident(.ident)*` at the start of the token stream.
fn parse_field(tokens: &[Token]) -> Option<(String, usize)> {
    let TokenKind::Identifier(first) = &tokens.first()?.kind else {
        return None;
    };
    let mut field = first.clone();
    let mut next = 1;
    while tokens.get(next).is_some_and(|t| t.kind == TokenKind::Dot) {
        let TokenKind::Identifier(part) = &tokens.get(next + 1)?.kind else {
            return None;
        };
        field.push('.');
        field.push_str(part);
        next += 2;
    }
    Some((field, next))
}

fn match_between(text: &str, tokens: &[Token], field: &str, next: usize) -> Option<Condition> {
    if tokens[next].as_keyword() != Some(Keyword::Between) {
        return None;
    }
    let mut depth = 0usize;
    let and_index = tokens.iter().enumerate().skip(next + 1).find_map(|(i, t)| {
        match t.kind {
            TokenKind::LeftParen => depth += 1,
            TokenKind::RightParen => depth = depth.saturating_sub(1),
            TokenKind::Keyword(Keyword::And) if depth == 0 => return Some(i),
            _ => {}
        }
        None
    })?;

    let low = text[tokens[next].span.end..tokens[and_index].span.start].trim();
    let high = text[tokens[and_index].span.end..].trim();
    if low.is_empty() || high.is_empty() {
        return None;
    }
    Some(Condition::Between {
        field: field.to_string(),
        low: Value::parse(low),
        high: Value::parse(high),
    })
}

fn match_in(text: &str, tokens: &[Token], field: &str, next: usize) -> Option<Condition> {
    if tokens[next].as_keyword() != Some(Keyword::In) {
        return None;
    }
    let open = next + 1;
    let close = matching_close(tokens, open)?;
    if !tokens.get(close + 1).is_some_and(Token::is_eof) {
        return None;
    }
    let inner = &text[tokens[open].span.end..tokens[close].span.start];
    Some(Condition::In {
        field: field.to_string(),
        values: parse_values_list(inner),
    })
}

fn match_null_check(tokens: &[Token], field: &str, next: usize) -> Option<Condition> {
    if tokens[next].as_keyword() != Some(Keyword::Is) {
        return None;
    }
    let negated = tokens.get(next + 1)?.as_keyword() == Some(Keyword::Not);
    let null_at = if negated { next + 2 } else { next + 1 };
    if tokens.get(null_at)?.as_keyword() != Some(Keyword::Null)
        || !tokens.get(null_at + 1).is_some_and(Token::is_eof)
    {
        return None;
    }
    let field = field.to_string();
    Some(if negated {
        Condition::IsNotNull { field }
    } else {
        Condition::IsNull { field }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Condition {
        parse_where_clause(text)
            .unwrap_or_else(|e| panic!("Failed to parse: {text}\nError: {e}"))
            .expect("non-empty clause")
    }

    fn num(n: f64) -> Value {
        Value::Number(n)
    }

    #[test]
    fn test_tokenize_splits_top_level_only() {
        assert_eq!(
            tokenize_where("a = 1 AND (b = 2 OR c = 3) or d = 'x and y'"),
            vec![
                WhereToken::Condition("a = 1".into()),
                WhereToken::Operator(LogicalOp::And),
                WhereToken::Condition("(b = 2 OR c = 3)".into()),
                WhereToken::Operator(LogicalOp::Or),
                WhereToken::Condition("d = 'x and y'".into()),
            ]
        );
    }

    #[test]
    fn test_tokenize_ignores_words_containing_operators() {
        assert_eq!(
            tokenize_where("brand = 'x' AND orders > 2"),
            vec![
                WhereToken::Condition("brand = 'x'".into()),
                WhereToken::Operator(LogicalOp::And),
                WhereToken::Condition("orders > 2".into()),
            ]
        );
    }

    #[test]
    fn test_tokenize_keeps_between_and() {
        assert_eq!(
            tokenize_where("amount BETWEEN 1 AND 5 AND status = 'open'"),
            vec![
                WhereToken::Condition("amount BETWEEN 1 AND 5".into()),
                WhereToken::Operator(LogicalOp::And),
                WhereToken::Condition("status = 'open'".into()),
            ]
        );
    }

    #[test]
    fn test_tokenize_doubled_quote() {
        assert_eq!(
            tokenize_where("name = 'O''Brien AND co' OR id = 1").len(),
            3
        );
    }

    #[test]
    fn test_empty_clause() {
        assert_eq!(parse_where_clause("   ").unwrap(), None);
        assert_eq!(parse_where_clause("-- nothing").unwrap(), None);
    }

    #[test]
    fn test_equals_and_comparisons() {
        assert_eq!(
            parse("status = 'open'"),
            Condition::Equals {
                field: "status".into(),
                value: Value::String("open".into())
            }
        );
        for (text, op) in [
            ("a >= 1", CompareOp::GtEq),
            ("a<=1", CompareOp::LtEq),
            ("a > 1", CompareOp::Gt),
            ("a < 1", CompareOp::Lt),
            ("a != 1", CompareOp::NotEq),
            ("a <> 1", CompareOp::NotEq),
        ] {
            assert_eq!(
                parse(text),
                Condition::Comparison {
                    field: "a".into(),
                    op,
                    value: num(1.0)
                },
                "{text}"
            );
        }
    }

    #[test]
    fn test_trailing_comment_is_dropped() {
        assert_eq!(
            parse("id = 1 -- trailing"),
            Condition::Equals {
                field: "id".into(),
                value: num(1.0)
            }
        );
        assert_eq!(
            parse("d BETWEEN 1 AND 5 -- range"),
            Condition::Between {
                field: "d".into(),
                low: num(1.0),
                high: num(5.0)
            }
        );
    }

    #[test]
    fn test_unbalanced_parentheses() {
        for text in ["a = 1)", "a = (1", "a IN (1, 2"] {
            let err = parse_where_clause(text).unwrap_err();
            assert_eq!(err.kind, ParseErrorKind::InvalidSyntax, "{text}");
        }
    }

    #[test]
    fn test_between() {
        assert_eq!(
            parse("trandate between '2024-01-01' and '2024-12-31'"),
            Condition::Between {
                field: "trandate".into(),
                low: Value::String("2024-01-01".into()),
                high: Value::String("2024-12-31".into()),
            }
        );
    }

    #[test]
    fn test_in_list() {
        assert_eq!(
            parse("id IN (123, 456)"),
            Condition::In {
                field: "id".into(),
                values: vec![num(123.0), num(456.0)]
            }
        );
    }

    #[test]
    fn test_null_checks() {
        assert_eq!(
            parse("email IS NULL"),
            Condition::IsNull {
                field: "email".into()
            }
        );
        assert_eq!(
            parse("email is not null"),
            Condition::IsNotNull {
                field: "email".into()
            }
        );
    }

    #[test]
    fn test_like_falls_back_to_raw() {
        assert_eq!(
            parse("name LIKE '%acme%'"),
            Condition::Raw {
                text: "name LIKE '%acme%'".into()
            }
        );
    }

    #[test]
    fn test_precedence_and_binds_tighter() {
        let eq = |f: &str, n: f64| Condition::Equals {
            field: f.into(),
            value: num(n),
        };
        assert_eq!(
            parse("a=1 OR b=2 AND c=3"),
            Condition::Compound {
                op: LogicalOp::Or,
                children: vec![
                    eq("a", 1.0),
                    Condition::Compound {
                        op: LogicalOp::And,
                        children: vec![eq("b", 2.0), eq("c", 3.0)]
                    }
                ]
            }
        );
    }

    #[test]
    fn test_parenthesized_group() {
        let tree = parse("(a = 1 OR b = 2) AND c = 3");
        let Condition::Compound { op, children } = tree else {
            panic!("expected compound");
        };
        assert_eq!(op, LogicalOp::And);
        assert!(matches!(
            &children[0],
            Condition::Compound {
                op: LogicalOp::Or,
                ..
            }
        ));
    }

    #[test]
    fn test_subquery_rejected() {
        let err = parse_where_clause("id IN (SELECT id FROM customer)").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::SubqueryNotSupported);
        let err = parse_where_clause("EXISTS (SELECT 1 FROM x)").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::SubqueryNotSupported);
    }

    #[test]
    fn test_dangling_operator() {
        assert!(parse_where_clause("a = 1 AND").is_err());
        assert!(parse_where_clause("OR a = 1").is_err());
    }
}
