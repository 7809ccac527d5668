//! Quote- and bracket-aware text scanning shared by the statement parsers.

use crate::lexer::{Token, TokenKind};

/// Splits off the trailing `COMMIT`/`PREVIEW` mode word.
///
/// Trailing whitespace and semicolons are ignored. Returns the statement
/// body and whether it runs in preview mode (the default unless the
/// statement ends with `COMMIT`).
#[must_use]
pub fn split_mode(sql: &str) -> (&str, bool) {
    let body = trim_statement_end(sql);
    let word_start = body
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_alphabetic())
        .last()
        .map_or(body.len(), |(i, _)| i);
    let word = &body[word_start..];
    let preceded_by_boundary = body[..word_start]
        .chars()
        .next_back()
        .map_or(true, |c| !(c.is_alphanumeric() || c == '_'));

    if preceded_by_boundary && word.eq_ignore_ascii_case("commit") {
        (trim_statement_end(&body[..word_start]), false)
    } else if preceded_by_boundary && word.eq_ignore_ascii_case("preview") {
        (trim_statement_end(&body[..word_start]), true)
    } else {
        (body, true)
    }
}

fn trim_statement_end(text: &str) -> &str {
    text.trim_end_matches(|c: char| c.is_whitespace() || c == ';')
        .trim_start()
}

/// Splits `text` on any of `separators` that occur outside quotes and
/// outside `()`/`[]` nesting. Returns each piece with its byte offset.
///
/// A doubled quote inside a quoted run is an escaped quote.
#[must_use]
pub fn split_top_level<'a>(text: &'a str, separators: &[char]) -> Vec<(usize, &'a str)> {
    let mut pieces = Vec::new();
    let mut quote: Option<char> = None;
    let mut depth = 0usize;
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match quote {
            Some(q) if c == q => {
                if chars.peek().is_some_and(|&(_, next)| next == q) {
                    chars.next();
                } else {
                    quote = None;
                }
            }
            Some(_) => {}
            None => match c {
                '\'' | '"' => quote = Some(c),
                '(' | '[' => depth += 1,
                ')' | ']' => depth = depth.saturating_sub(1),
                c if depth == 0 && separators.contains(&c) => {
                    pieces.push((start, &text[start..i]));
                    start = i + c.len_utf8();
                }
                _ => {}
            },
        }
    }
    pieces.push((start, &text[start..]));
    pieces
}

/// Returns the byte index of the first `target` outside quotes.
#[must_use]
pub fn find_unquoted(text: &str, target: char) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in text.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '\'' || c == '"' => quote = Some(c),
            None if c == target => return Some(i),
            None => {}
        }
    }
    None
}

/// Returns true if `text` is wrapped in one pair of parentheses whose
/// interior is balanced on its own, as in `(a = 1 OR b = 2)` but not
/// `(a = 1) OR (b = 2)`.
#[must_use]
pub fn has_enclosing_parens(text: &str) -> bool {
    if !(text.starts_with('(') && text.ends_with(')')) || text.len() < 2 {
        return false;
    }
    let inner = &text[1..text.len() - 1];
    let mut quote: Option<char> = None;
    let mut depth = 0i32;
    for c in inner.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '\'' | '"' => quote = Some(c),
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth < 0 {
                        return false;
                    }
                }
                _ => {}
            },
        }
    }
    depth == 0 && quote.is_none()
}

/// Returns the index of the token closing the bracket opened at `open`.
#[must_use]
pub fn matching_close(tokens: &[Token], open: usize) -> Option<usize> {
    let (opener, closer) = match tokens.get(open)?.kind {
        TokenKind::LeftParen => (TokenKind::LeftParen, TokenKind::RightParen),
        TokenKind::LeftBracket => (TokenKind::LeftBracket, TokenKind::RightBracket),
        _ => return None,
    };
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate().skip(open) {
        if token.kind == opener {
            depth += 1;
        } else if token.kind == closer {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        } else if token.is_eof() {
            return None;
        }
    }
    None
}

/// Returns true for `[A-Za-z_][A-Za-z0-9_]*`.
#[must_use]
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
