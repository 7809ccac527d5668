//! Parser error types.

use std::fmt;

use crate::lexer::{Span, TokenKind};

/// The category of a parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The statement does not match any supported grammar.
    InvalidSyntax,
    /// A CREATE RECORD field uses an unknown type name.
    InvalidFieldType,
    /// DELETE without a WHERE clause.
    MissingWhereClause,
    /// An INSERT tuple has a different arity than its column list.
    FieldValueMismatch,
    /// A WHERE clause contains a subquery.
    SubqueryNotSupported,
}

impl ParseErrorKind {
    /// Returns the stable name of this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidSyntax => "InvalidSyntax",
            Self::InvalidFieldType => "InvalidFieldType",
            Self::MissingWhereClause => "MissingWhereClause",
            Self::FieldValueMismatch => "FieldValueMismatch",
            Self::SubqueryNotSupported => "SubqueryNotSupported",
        }
    }
}

/// A parse error.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// What went wrong.
    pub kind: ParseErrorKind,
    /// The error message.
    pub message: String,
    /// The location of the error.
    pub span: Span,
    /// Expected tokens (if applicable).
    pub expected: Option<String>,
    /// The actual token found.
    pub found: Option<TokenKind>,
}

impl ParseError {
    /// Creates a new parse error.
    #[must_use]
    pub fn new(kind: ParseErrorKind, message: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            message: message.into(),
            span,
            expected: None,
            found: None,
        }
    }

    /// Creates an `InvalidSyntax` error.
    #[must_use]
    pub fn syntax(message: impl Into<String>, span: Span) -> Self {
        Self::new(ParseErrorKind::InvalidSyntax, message, span)
    }

    /// Creates an "unexpected token" error.
    #[must_use]
    pub fn unexpected(expected: impl Into<String>, found: TokenKind, span: Span) -> Self {
        let expected_str: String = expected.into();
        let message = if found == TokenKind::Eof {
            format!("Unexpected end of input: expected {expected_str}")
        } else {
            format!("Unexpected token: expected {expected_str}, found {found:?}")
        };
        Self {
            kind: ParseErrorKind::InvalidSyntax,
            message,
            span,
            expected: Some(expected_str),
            found: Some(found),
        }
    }

    /// Returns a copy of this error with its span shifted by `offset`.
    #[must_use]
    pub fn offset(mut self, offset: usize) -> Self {
        self.span = self.span.offset(offset);
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} at position {}..{}",
            self.kind.as_str(),
            self.message,
            self.span.start,
            self.span.end
        )
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind_and_position() {
        let err = ParseError::new(
            ParseErrorKind::MissingWhereClause,
            "DELETE requires a WHERE clause",
            Span::new(0, 17),
        );
        assert_eq!(
            err.to_string(),
            "MissingWhereClause: DELETE requires a WHERE clause at position 0..17"
        );
    }

    #[test]
    fn test_unexpected_eof_message() {
        let err = ParseError::unexpected("identifier", TokenKind::Eof, Span::new(4, 4));
        assert_eq!(err.kind, ParseErrorKind::InvalidSyntax);
        assert!(err.message.starts_with("Unexpected end of input"));
    }
}
