//! Token types for the statement lexer.

use super::Span;

/// Reserved words of the statement surface.
///
/// `RECORD`, `LIST`, `COMMIT` and `PREVIEW` are deliberately not keywords:
/// they are valid field and table names, so parsers match them as words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    // Statements
    Create,
    Insert,
    Into,
    Values,
    Update,
    Set,
    Delete,
    From,
    Where,
    Select,

    // Predicates
    And,
    Or,
    Not,
    In,
    Between,
    Like,
    Is,
    Null,
    True,
    False,
    Exists,
}

impl Keyword {
    /// Attempts to parse a keyword from a string (case-insensitive).
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "CREATE" => Some(Self::Create),
            "INSERT" => Some(Self::Insert),
            "INTO" => Some(Self::Into),
            "VALUES" => Some(Self::Values),
            "UPDATE" => Some(Self::Update),
            "SET" => Some(Self::Set),
            "DELETE" => Some(Self::Delete),
            "FROM" => Some(Self::From),
            "WHERE" => Some(Self::Where),
            "SELECT" => Some(Self::Select),
            "AND" => Some(Self::And),
            "OR" => Some(Self::Or),
            "NOT" => Some(Self::Not),
            "IN" => Some(Self::In),
            "BETWEEN" => Some(Self::Between),
            "LIKE" => Some(Self::Like),
            "IS" => Some(Self::Is),
            "NULL" => Some(Self::Null),
            "TRUE" => Some(Self::True),
            "FALSE" => Some(Self::False),
            "EXISTS" => Some(Self::Exists),
            _ => None,
        }
    }

    /// Returns the keyword as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Insert => "INSERT",
            Self::Into => "INTO",
            Self::Values => "VALUES",
            Self::Update => "UPDATE",
            Self::Set => "SET",
            Self::Delete => "DELETE",
            Self::From => "FROM",
            Self::Where => "WHERE",
            Self::Select => "SELECT",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Not => "NOT",
            Self::In => "IN",
            Self::Between => "BETWEEN",
            Self::Like => "LIKE",
            Self::Is => "IS",
            Self::Null => "NULL",
            Self::True => "TRUE",
            Self::False => "FALSE",
            Self::Exists => "EXISTS",
        }
    }
}

/// The kind of token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    /// Unsigned numeric literal (e.g., 42 or 3.14)
    Number(f64),
    /// Single- or double-quoted string, doubled quotes unescaped
    String(String),

    // Identifiers and keywords
    /// Identifier (e.g., custrecord_status)
    Identifier(String),
    /// Reserved word
    Keyword(Keyword),

    // Operators
    /// =
    Eq,
    /// != or <>
    NotEq,
    /// <
    Lt,
    /// <=
    LtEq,
    /// >
    Gt,
    /// >=
    GtEq,
    /// -
    Minus,

    // Delimiters
    /// (
    LeftParen,
    /// )
    RightParen,
    /// [
    LeftBracket,
    /// ]
    RightBracket,
    /// ,
    Comma,
    /// ;
    Semicolon,
    /// .
    Dot,

    // Special
    /// End of input
    Eof,
    /// Invalid/unknown token
    Error(String),
}

/// A token with its span in the source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The location in the source text.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns true if this is an EOF token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    /// Returns the keyword if this is a keyword token.
    #[must_use]
    pub const fn as_keyword(&self) -> Option<Keyword> {
        match &self.kind {
            TokenKind::Keyword(kw) => Some(*kw),
            _ => None,
        }
    }

    /// Returns true if this token is the given bare word, matched
    /// case-insensitively against identifiers and keywords alike.
    #[must_use]
    pub fn is_word(&self, word: &str) -> bool {
        match &self.kind {
            TokenKind::Identifier(name) => name.eq_ignore_ascii_case(word),
            TokenKind::Keyword(kw) => kw.as_str().eq_ignore_ascii_case(word),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_from_str() {
        assert_eq!(Keyword::from_str("DELETE"), Some(Keyword::Delete));
        assert_eq!(Keyword::from_str("between"), Some(Keyword::Between));
        assert_eq!(Keyword::from_str("WhErE"), Some(Keyword::Where));
        assert_eq!(Keyword::from_str("commit"), None);
        assert_eq!(Keyword::from_str("record"), None);
    }

    #[test]
    fn test_token_is_word() {
        let record = Token::new(TokenKind::Identifier("Record".into()), Span::new(0, 6));
        let into = Token::new(TokenKind::Keyword(Keyword::Into), Span::new(0, 4));
        assert!(record.is_word("RECORD"));
        assert!(into.is_word("into"));
        assert!(!Token::new(TokenKind::Comma, Span::new(0, 1)).is_word(","));
    }

    #[test]
    fn test_token_as_keyword() {
        let set = Token::new(TokenKind::Keyword(Keyword::Set), Span::new(0, 3));
        let eq = Token::new(TokenKind::Eq, Span::new(0, 1));
        assert_eq!(set.as_keyword(), Some(Keyword::Set));
        assert_eq!(eq.as_keyword(), None);
    }
}
