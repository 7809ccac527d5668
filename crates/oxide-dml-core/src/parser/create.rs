//! CREATE RECORD and CREATE LIST sub-grammars.

use super::error::{ParseError, ParseErrorKind};
use super::scan::{is_identifier, matching_close};
use super::statement::DmlParser;
use crate::ast::{
    CreateListStatement, CreateRecordStatement, FieldDef, FieldType, FieldValues, ListOptions,
    ListValue, Translation,
};
use crate::lexer::{Span, Token, TokenKind};
use crate::script_id::{field_script_id, list_script_id, record_script_id};
use crate::value::{parse_literal, Value};

/// Record options accepted in a CREATE RECORD body, in canonical spelling.
pub const RECORD_OPTIONS: [&str; 32] = [
    "name",
    "description",
    "owner",
    "accessType",
    "allowAttachments",
    "allowInlineEditing",
    "allowInlineDeleting",
    "allowInlineDetaching",
    "allowMobileAccess",
    "allowNumberingOverride",
    "allowQuickAdd",
    "allowQuickSearch",
    "enableMailMerge",
    "enableKeywords",
    "enableNumbering",
    "enableOptimisticLocking",
    "enableSystemNotes",
    "enableDle",
    "includeInSearchMenu",
    "includeName",
    "isInactive",
    "isOrdered",
    "numberingInit",
    "numberingMinDigits",
    "numberingPrefix",
    "numberingSuffix",
    "showCreationDate",
    "showId",
    "showLastModified",
    "showNotes",
    "iconType",
    "iconBuiltIn",
];

const DEFAULT_DISPLAY_NAME: &str = "Custom Record";

fn canonical_option(key: &str) -> Option<&'static str> {
    RECORD_OPTIONS
        .into_iter()
        .find(|option| option.eq_ignore_ascii_case(key))
}

/// One item of a CREATE RECORD body.
#[derive(Debug)]
enum RecordItem {
    Option(&'static str, Value),
    Prefix(String),
    Field(String, FieldType, Option<String>),
}

impl<'a> DmlParser<'a> {
    /// Parses `CREATE RECORD id [( item, ... )]`.
    pub(super) fn parse_create_record(&mut self) -> Result<CreateRecordStatement, ParseError> {
        self.expect_word("CREATE")?;
        self.expect_word("RECORD")?;
        let record_id = self.expect_identifier()?;
        let (body, body_offset) = self.parenthesized_body()?;

        let mut record_options = FieldValues::new();
        let mut prefix: Option<String> = None;
        let mut declared: Vec<(String, FieldType, Option<String>)> = Vec::new();

        let mut inner = DmlParser::fragment(body, true);
        while !inner.current().is_eof() {
            if inner.check(&TokenKind::Comma) {
                inner.advance();
                continue;
            }
            let item_start = inner.current().span;
            match inner
                .parse_record_item()
                .map_err(|e| e.offset(body_offset))?
            {
                RecordItem::Option(key, value) => record_options.insert(key, value),
                RecordItem::Prefix(value) => prefix = Some(value),
                RecordItem::Field(name, field_type, list_type) => {
                    if declared.iter().any(|(n, _, _)| n.eq_ignore_ascii_case(&name)) {
                        return Err(ParseError::syntax(
                            format!("Field '{name}' is declared twice"),
                            Span::new(body_offset + item_start.start, body_offset + item_start.end),
                        ));
                    }
                    declared.push((name, field_type, list_type));
                }
            }
        }

        let prefix_text = prefix.as_deref().unwrap_or("");
        let full_record_id = record_script_id(prefix_text, &record_id);
        let fields = declared
            .into_iter()
            .map(|(name, field_type, list_type)| FieldDef {
                script_id: field_script_id(prefix_text, &record_id, &name),
                name,
                field_type,
                list_type,
            })
            .collect();

        let display_name = match record_options.get("name") {
            Some(name) if !name.to_string().trim().is_empty() => name.to_string(),
            _ => {
                let fallback = format!("{prefix_text}{record_id}");
                if fallback.trim().is_empty() {
                    DEFAULT_DISPLAY_NAME.to_string()
                } else {
                    fallback
                }
            }
        };

        Ok(CreateRecordStatement {
            record_id,
            full_record_id,
            display_name,
            prefix,
            record_options,
            fields,
        })
    }

    /// Parses `CREATE LIST id [( options... )]`.
    pub(super) fn parse_create_list(&mut self) -> Result<CreateListStatement, ParseError> {
        self.expect_word("CREATE")?;
        self.expect_word("LIST")?;
        let list_id = self.expect_identifier()?;
        let (body, body_offset) = self.parenthesized_body()?;

        let mut inner = DmlParser::fragment(body, true);
        let (options, values) = inner
            .parse_list_body()
            .map_err(|e| e.offset(body_offset))?;

        Ok(CreateListStatement {
            full_list_id: list_script_id(&list_id),
            list_id,
            options,
            values,
        })
    }

    /// Returns the text inside a trailing `( ... )` and its offset, or the
    /// rest of the statement when there are no parentheses.
    fn parenthesized_body(&mut self) -> Result<(&'a str, usize), ParseError> {
        let source = self.source;
        if self.current().is_eof() {
            return Ok(("", source.len()));
        }
        if !self.check(&TokenKind::LeftParen) {
            let start = self.current().span.start;
            self.pos = self.tokens.len() - 1;
            return Ok((&source[start..], start));
        }

        let open = self.pos;
        let close = matching_close(&self.tokens, open)
            .ok_or_else(|| ParseError::syntax("Unclosed definition body", self.tokens[open].span))?;
        let start = self.tokens[open].span.end;
        let end = self.tokens[close].span.start;
        self.pos = close + 1;
        self.expect_eof()?;
        Ok((&source[start..end], start))
    }

    fn parse_list_body(&mut self) -> Result<(ListOptions, Vec<ListValue>), ParseError> {
        let mut options = ListOptions::default();
        let mut values = Vec::new();

        while !self.current().is_eof() {
            if self.check(&TokenKind::Comma) {
                self.advance();
            } else if self.check_word("description") {
                self.advance();
                options.description = Some(self.expect_string()?);
            } else if self.check_word("optionsorder") {
                self.advance();
                options.options_order = Some(self.expect_string()?);
            } else if self.check_word("matrixoption") {
                self.advance();
                options.matrix_option = self.expect_bool()?;
            } else if self.check_word("isinactive") {
                self.advance();
                options.is_inactive = self.expect_bool()?;
            } else if self.check_word("values") {
                self.advance();
                values.extend(self.parse_list_values()?);
            } else {
                return Err(self.unexpected(
                    "description, optionsorder, matrixoption, isinactive or values",
                ));
            }
        }

        Ok((options, values))
    }

    /// Parses `[ value "X" [inactive B] [abbreviation "Y"] [translations [...]], ... ]`.
    fn parse_list_values(&mut self) -> Result<Vec<ListValue>, ParseError> {
        self.expect(&TokenKind::LeftBracket)?;
        let mut values = Vec::new();

        loop {
            if self.check(&TokenKind::RightBracket) {
                self.advance();
                break;
            }
            if self.check(&TokenKind::Comma) {
                self.advance();
                continue;
            }
            self.expect_word("value")?;
            let mut entry = ListValue {
                value: self.expect_string()?,
                inactive: false,
                translations: Vec::new(),
                abbreviation: None,
            };

            loop {
                if self.check_word("inactive") {
                    self.advance();
                    entry.inactive = self.expect_bool()?;
                } else if self.check_word("abbreviation") {
                    self.advance();
                    entry.abbreviation = Some(self.expect_string()?);
                } else if self.check_word("translations") {
                    self.advance();
                    entry.translations = self.parse_translations()?;
                } else {
                    break;
                }
            }
            values.push(entry);

            if !self.check(&TokenKind::Comma) && !self.check(&TokenKind::RightBracket) {
                return Err(self.unexpected(", or ]"));
            }
        }

        Ok(values)
    }

    fn parse_translations(&mut self) -> Result<Vec<Translation>, ParseError> {
        self.expect(&TokenKind::LeftBracket)?;
        let mut translations = Vec::new();

        while !self.check(&TokenKind::RightBracket) {
            if self.check(&TokenKind::Comma) {
                self.advance();
                continue;
            }
            let language = self.expect_string()?;
            self.expect(&TokenKind::Eq)?;
            let label = self.expect_string()?;
            translations.push(Translation { language, label });
        }
        self.advance();

        Ok(translations)
    }
}

/// Returns the text of an identifier or keyword token.
fn record_word<'s>(token: &Token, source: &'s str) -> Option<&'s str> {
    match token.kind {
        TokenKind::Identifier(_) | TokenKind::Keyword(_) => Some(token.span.slice(source)),
        _ => None,
    }
}

impl DmlParser<'_> {
    /// Parses one CREATE RECORD item: `option = literal`, `prefix "x"` or
    /// `name TYPE[(source)]`. Items need no separator between them.
    fn parse_record_item(&mut self) -> Result<RecordItem, ParseError> {
        let source = self.source;
        let name_token = self.advance();
        let name = record_word(&name_token, source)
            .filter(|name| is_identifier(name))
            .ok_or_else(|| {
                ParseError::unexpected(
                    "option, prefix or field name",
                    name_token.kind.clone(),
                    name_token.span,
                )
            })?
            .to_string();

        if self.check(&TokenKind::Eq) {
            self.advance();
            let option = canonical_option(&name).ok_or_else(|| {
                ParseError::syntax(format!("Unknown record option '{name}'"), name_token.span)
            })?;
            let value = self.parse_option_value(option)?;
            return Ok(RecordItem::Option(option, value));
        }

        if name.eq_ignore_ascii_case("prefix") {
            if let TokenKind::String(value) = &self.current().kind {
                let value = value.clone();
                self.advance();
                return Ok(RecordItem::Prefix(value));
            }
        }

        let type_token = self.current().clone();
        if type_token.is_eof() || type_token.kind == TokenKind::Comma {
            return Err(ParseError::new(
                ParseErrorKind::InvalidFieldType,
                format!("Field '{name}' has no type"),
                name_token.span,
            ));
        }
        let type_name =
            record_word(&type_token, source).unwrap_or_else(|| type_token.span.slice(source));
        let field_type = FieldType::from_name(type_name).ok_or_else(|| {
            ParseError::new(
                ParseErrorKind::InvalidFieldType,
                format!("Unknown field type '{type_name}' for field '{name}'"),
                type_token.span,
            )
        })?;
        self.advance();

        let mut list_type = None;
        if self.check(&TokenKind::LeftParen) {
            let open = self.advance();
            if !field_type.takes_source_type() {
                return Err(ParseError::syntax(
                    format!("Field type {field_type} does not take a source type"),
                    open.span,
                ));
            }
            let source_token = self.advance();
            let list_source = record_word(&source_token, source)
                .ok_or_else(|| ParseError::syntax("Expected a source type", open.span))?;
            if !self.check(&TokenKind::RightParen) {
                return Err(ParseError::syntax("Expected ) after source type", open.span));
            }
            self.advance();
            list_type = Some(list_source.to_string());
        }

        Ok(RecordItem::Field(name, field_type, list_type))
    }

    /// Reads exactly one option literal: a quoted string, a number, or a
    /// bare word such as `TRUE`.
    fn parse_option_value(&mut self, option: &str) -> Result<Value, ParseError> {
        let source = self.source;
        let token = self.current().clone();
        let value = match &token.kind {
            TokenKind::String(text) => Value::String(text.clone()),
            TokenKind::Number(n) => Value::Number(*n),
            TokenKind::Minus => {
                self.advance();
                match self.current().kind {
                    TokenKind::Number(n) => Value::Number(-n),
                    _ => return Err(self.unexpected("number")),
                }
            }
            TokenKind::Identifier(_) | TokenKind::Keyword(_) => {
                parse_literal(token.span.slice(source))
            }
            _ => {
                return Err(ParseError::syntax(
                    format!("Missing value for option '{option}'"),
                    token.span,
                ))
            }
        };
        self.advance();
        Ok(value)
    }
}
