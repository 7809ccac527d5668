//! Statement lexer.
//!
//! A hand-written lexer producing a stream of spanned tokens. Parsers slice
//! the original source through token spans whenever they need literal text
//! (values, raw conditions), so the lexer never has to be lossless.

mod span;
mod token;
mod tokenizer;

pub use span::Span;
pub use token::{Keyword, Token, TokenKind};
pub use tokenizer::Lexer;
