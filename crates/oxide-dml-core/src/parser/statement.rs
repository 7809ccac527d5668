//! Statement classifier and INSERT/UPDATE/DELETE parsers.

use super::error::{ParseError, ParseErrorKind};
use super::scan::{find_unquoted, is_identifier, matching_close, split_mode, split_top_level};
use super::where_clause::parse_where_clause;
use crate::ast::{
    Condition, DeleteStatement, DmlStatement, FieldValues, InsertRows, InsertStatement,
    StatementKind, UpdateStatement,
};
use crate::lexer::{Keyword, Lexer, Span, Token, TokenKind};
use crate::value::{parse_literal, parse_values_list};

/// Identifies the DML/DDL statement kind of `sql`.
///
/// Returns `None` for anything else (plain SELECTs included), which callers
/// hand to the read-only query path.
#[must_use]
pub fn classify(sql: &str) -> Option<StatementKind> {
    let (body, _) = split_mode(sql);
    let mut lexer = Lexer::new(body);
    let first = lexer.next_token();
    let second = lexer.next_token();
    detect(&first, &second)
}

/// Parses a single statement.
///
/// # Errors
///
/// Returns a `ParseError` if the text is not a supported statement or
/// violates its grammar.
pub fn parse_statement(sql: &str) -> Result<DmlStatement, ParseError> {
    DmlParser::new(sql).parse_statement()
}

fn detect(first: &Token, second: &Token) -> Option<StatementKind> {
    match first.as_keyword()? {
        Keyword::Create if second.is_word("RECORD") => Some(StatementKind::CreateRecord),
        Keyword::Create if second.is_word("LIST") => Some(StatementKind::CreateList),
        Keyword::Insert if second.as_keyword() == Some(Keyword::Into) => {
            Some(StatementKind::Insert)
        }
        Keyword::Update => Some(StatementKind::Update),
        Keyword::Delete if second.as_keyword() == Some(Keyword::From) => {
            Some(StatementKind::Delete)
        }
        _ => None,
    }
}

/// Parser for DML/DDL statements.
///
/// Spans in errors are relative to the statement body: the text with
/// surrounding whitespace and the trailing `COMMIT`/`PREVIEW` removed.
pub struct DmlParser<'a> {
    pub(super) source: &'a str,
    pub(super) tokens: Vec<Token>,
    pub(super) pos: usize,
    is_preview: bool,
}

impl<'a> DmlParser<'a> {
    /// Creates a parser for a full statement.
    #[must_use]
    pub fn new(sql: &'a str) -> Self {
        let (source, is_preview) = split_mode(sql);
        Self::fragment(source, is_preview)
    }

    /// Creates a parser over a piece of a statement, without mode detection.
    pub(super) fn fragment(source: &'a str, is_preview: bool) -> Self {
        Self {
            source,
            tokens: Lexer::new(source).tokenize(),
            pos: 0,
            is_preview,
        }
    }

    /// Parses the statement.
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` if the text is not a supported statement or
    /// violates its grammar.
    pub fn parse_statement(&mut self) -> Result<DmlStatement, ParseError> {
        let eof = Token::new(TokenKind::Eof, Span::new(self.source.len(), self.source.len()));
        let second = self.tokens.get(1).unwrap_or(&eof);
        match detect(&self.tokens[0], second) {
            Some(StatementKind::CreateRecord) => {
                Ok(DmlStatement::CreateRecord(self.parse_create_record()?))
            }
            Some(StatementKind::CreateList) => {
                Ok(DmlStatement::CreateList(self.parse_create_list()?))
            }
            Some(StatementKind::Insert) => Ok(DmlStatement::Insert(self.parse_insert()?)),
            Some(StatementKind::Update) => Ok(DmlStatement::Update(self.parse_update()?)),
            Some(StatementKind::Delete) => Ok(DmlStatement::Delete(self.parse_delete()?)),
            None => Err(ParseError::unexpected(
                "CREATE RECORD, CREATE LIST, INSERT INTO, UPDATE or DELETE FROM",
                self.current().kind.clone(),
                self.current().span,
            )),
        }
    }

    /// Parses `INSERT INTO t (cols) VALUES (...), ...` or `INSERT INTO t SET ...`.
    fn parse_insert(&mut self) -> Result<InsertStatement, ParseError> {
        self.expect_keyword(Keyword::Insert)?;
        self.expect_keyword(Keyword::Into)?;
        let table_name = self.expect_identifier()?;

        let rows = if self.check_keyword(Keyword::Set) {
            let set_end = self.advance().span.end;
            let source = self.source;
            InsertRows::Single(parse_assignments(&source[set_end..], set_end)?)
        } else if self.check(&TokenKind::LeftParen) {
            let columns = self.parse_column_list()?;
            self.expect_keyword(Keyword::Values)?;
            self.parse_value_tuples(&columns)?
        } else {
            return Err(self.unexpected("column list or SET"));
        };

        Ok(InsertStatement {
            table_name,
            rows,
            is_preview: self.is_preview,
        })
    }

    fn parse_column_list(&mut self) -> Result<Vec<String>, ParseError> {
        self.expect(&TokenKind::LeftParen)?;
        let mut columns = Vec::new();
        loop {
            columns.push(self.expect_identifier()?);
            if self.check(&TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(&TokenKind::RightParen)?;
        Ok(columns)
    }

    /// Parses one or more parenthesized tuples, matching parentheses on
    /// tokens so that quoted parentheses and commas are ignored.
    fn parse_value_tuples(&mut self, columns: &[String]) -> Result<InsertRows, ParseError> {
        let source = self.source;
        let mut rows = Vec::new();

        loop {
            if !self.check(&TokenKind::LeftParen) {
                return Err(self.unexpected("("));
            }
            let open = self.pos;
            let close = matching_close(&self.tokens, open).ok_or_else(|| {
                ParseError::syntax("Unclosed VALUES tuple", self.tokens[open].span)
            })?;
            let span = Span::new(self.tokens[open].span.start, self.tokens[close].span.end);
            let inner = &source[self.tokens[open].span.end..self.tokens[close].span.start];
            let values = parse_values_list(inner);

            if values.len() != columns.len() {
                return Err(ParseError::new(
                    ParseErrorKind::FieldValueMismatch,
                    format!(
                        "Row {}: {} columns but {} values",
                        rows.len() + 1,
                        columns.len(),
                        values.len()
                    ),
                    span,
                ));
            }
            rows.push(columns.iter().cloned().zip(values).collect::<FieldValues>());

            self.pos = close + 1;
            if self.check(&TokenKind::Comma) {
                self.advance();
            } else {
                self.expect_eof()?;
                break;
            }
        }

        Ok(match rows.len() {
            1 => InsertRows::Single(rows.remove(0)),
            _ => InsertRows::Multiple(rows),
        })
    }

    /// Parses `UPDATE t SET f = v, ... [WHERE ...]`.
    fn parse_update(&mut self) -> Result<UpdateStatement, ParseError> {
        self.expect_keyword(Keyword::Update)?;
        let table_name = self.expect_identifier()?;
        if !self.check_keyword(Keyword::Set) {
            return Err(self.unexpected("SET"));
        }
        let set_end = self.advance().span.end;

        let source = self.source;
        let where_span = self.find_top_level_where();
        let assignments_end = where_span.map_or(source.len(), |span| span.start);
        let set_fields = parse_assignments(&source[set_end..assignments_end], set_end)?;

        let where_clause = match where_span {
            Some(span) => Some(self.parse_where_after(span)?.ok_or_else(|| {
                ParseError::syntax("WHERE clause is empty", span)
            })?),
            None => None,
        };

        Ok(UpdateStatement {
            table_name,
            set_fields,
            where_clause,
            is_preview: self.is_preview,
        })
    }

    /// Parses `DELETE FROM t WHERE ...`. The WHERE clause is mandatory.
    fn parse_delete(&mut self) -> Result<DeleteStatement, ParseError> {
        self.expect_keyword(Keyword::Delete)?;
        self.expect_keyword(Keyword::From)?;
        let table_name = self.expect_identifier()?;

        let missing_where = |span| {
            ParseError::new(
                ParseErrorKind::MissingWhereClause,
                "DELETE requires a WHERE clause",
                span,
            )
        };
        if self.current().is_eof() {
            return Err(missing_where(self.current().span));
        }
        if !self.check_keyword(Keyword::Where) {
            return Err(self.unexpected("WHERE"));
        }
        let where_span = self.advance().span;
        let where_clause = self
            .parse_where_after(where_span)?
            .ok_or_else(|| missing_where(where_span))?;

        Ok(DeleteStatement {
            table_name,
            where_clause,
            is_preview: self.is_preview,
        })
    }

    /// Returns the span of the first WHERE outside parentheses from the
    /// current position on.
    fn find_top_level_where(&self) -> Option<Span> {
        let mut depth = 0usize;
        for token in &self.tokens[self.pos..] {
            match token.kind {
                TokenKind::LeftParen => depth += 1,
                TokenKind::RightParen => depth = depth.saturating_sub(1),
                TokenKind::Keyword(Keyword::Where) if depth == 0 => return Some(token.span),
                _ => {}
            }
        }
        None
    }

    fn parse_where_after(&self, where_span: Span) -> Result<Option<Condition>, ParseError> {
        let start = where_span.end;
        parse_where_clause(&self.source[start..]).map_err(|e| e.offset(start))
    }

    pub(super) fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    /// Advances past the current token and returns it.
    pub(super) fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if !token.is_eof() {
            self.pos += 1;
        }
        token
    }

    pub(super) fn check(&self, kind: &TokenKind) -> bool {
        &self.current().kind == kind
    }

    pub(super) fn check_keyword(&self, keyword: Keyword) -> bool {
        self.current().as_keyword() == Some(keyword)
    }

    pub(super) fn check_word(&self, word: &str) -> bool {
        self.current().is_word(word)
    }

    pub(super) fn unexpected(&self, expected: &str) -> ParseError {
        ParseError::unexpected(expected, self.current().kind.clone(), self.current().span)
    }

    pub(super) fn expect(&mut self, kind: &TokenKind) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&format!("{kind:?}")))
        }
    }

    pub(super) fn expect_keyword(&mut self, keyword: Keyword) -> Result<(), ParseError> {
        if self.check_keyword(keyword) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(keyword.as_str()))
        }
    }

    pub(super) fn expect_word(&mut self, word: &str) -> Result<(), ParseError> {
        if self.check_word(word) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(word))
        }
    }

    pub(super) fn expect_identifier(&mut self) -> Result<String, ParseError> {
        match &self.current().kind {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    pub(super) fn expect_string(&mut self) -> Result<String, ParseError> {
        match &self.current().kind {
            TokenKind::String(value) => {
                let value = value.clone();
                self.advance();
                Ok(value)
            }
            _ => Err(self.unexpected("quoted string")),
        }
    }

    /// Expects `TRUE`/`FALSE` (or `T`/`F`).
    pub(super) fn expect_bool(&mut self) -> Result<bool, ParseError> {
        let value = match &self.current().kind {
            TokenKind::Keyword(Keyword::True) => true,
            TokenKind::Keyword(Keyword::False) => false,
            TokenKind::Identifier(w) if w.eq_ignore_ascii_case("t") => true,
            TokenKind::Identifier(w) if w.eq_ignore_ascii_case("f") => false,
            _ => return Err(self.unexpected("TRUE or FALSE")),
        };
        self.advance();
        Ok(value)
    }

    pub(super) fn expect_eof(&self) -> Result<(), ParseError> {
        if self.current().is_eof() {
            Ok(())
        } else {
            Err(self.unexpected("end of statement"))
        }
    }
}

/// Parses `f1 = v1, f2 = v2` into field values. `offset` is the position
/// of `text` in the statement body, for error spans.
fn parse_assignments(text: &str, offset: usize) -> Result<FieldValues, ParseError> {
    let mut fields = FieldValues::new();

    for (start, piece) in split_top_level(text, &[',']) {
        if piece.trim().is_empty() {
            continue;
        }
        let span = Span::new(offset + start, offset + start + piece.len());
        let eq = find_unquoted(piece, '=').ok_or_else(|| {
            ParseError::syntax(
                format!("Expected field = value, found '{}'", piece.trim()),
                span,
            )
        })?;
        let name = piece[..eq].trim();
        if !is_identifier(name) {
            return Err(ParseError::syntax(
                format!("Invalid field name '{name}'"),
                span,
            ));
        }
        let value = piece[eq + 1..].trim();
        if value.is_empty() {
            return Err(ParseError::syntax(
                format!("Missing value for field '{name}'"),
                span,
            ));
        }
        fields.insert(name, parse_literal(value));
    }

    if fields.is_empty() {
        return Err(ParseError::syntax(
            "SET requires at least one field assignment",
            Span::new(offset, offset + text.len()),
        ));
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn test_classify() {
        assert_eq!(
            classify("create record project (name = 'P')"),
            Some(StatementKind::CreateRecord)
        );
        assert_eq!(classify("CREATE LIST colors"), Some(StatementKind::CreateList));
        assert_eq!(
            classify("  insert into customer SET a = 1"),
            Some(StatementKind::Insert)
        );
        assert_eq!(classify("UPDATE t SET a=1"), Some(StatementKind::Update));
        assert_eq!(
            classify("DELETE FROM t WHERE id = 1 COMMIT"),
            Some(StatementKind::Delete)
        );
        assert_eq!(classify("SELECT * FROM customer"), None);
        assert_eq!(classify("CREATE TABLE x (a INT)"), None);
        assert_eq!(classify(""), None);
    }

    #[test]
    fn test_assignments() {
        let fields = parse_assignments(" a = 'x, y', b=2 , c = 'it''s'", 0).unwrap();
        assert_eq!(fields.get("a"), Some(&Value::String("x, y".into())));
        assert_eq!(fields.get("b"), Some(&Value::Number(2.0)));
        assert_eq!(fields.get("c"), Some(&Value::String("it's".into())));
    }

    #[test]
    fn test_assignment_errors() {
        assert!(parse_assignments("a 1", 0).is_err());
        assert!(parse_assignments("1a = 2", 0).is_err());
        assert!(parse_assignments("a = ", 0).is_err());
        assert!(parse_assignments("  ", 0).is_err());
    }

    #[test]
    fn test_non_dml_is_syntax_error() {
        let err = parse_statement("SELECT 1").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidSyntax);
    }

    #[test]
    fn test_update_where_inside_quotes_is_not_a_clause() {
        let DmlStatement::Update(update) =
            parse_statement("UPDATE t SET note = 'x WHERE y' WHERE id = 1").unwrap()
        else {
            panic!("expected UPDATE");
        };
        assert_eq!(update.set_fields.get("note"), Some(&Value::String("x WHERE y".into())));
        assert!(update.where_clause.is_some());
    }
}
