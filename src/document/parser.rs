//! HCL parsing with raw token text preservation.
//!
//! This module reads HCL (object-item flavour: `key = value`, `name { ... }`,
//! `type "label" { ... }`) into an [`HclTree`]. Keys and scalars keep their
//! exact source text, comments are attached to the items they annotate, and
//! each item records its byte span in the source.
//!
//! # Example
//!
//! ```
//! use hclquill::document::parser::parse_hcl;
//! use hclquill::document::node::Value;
//!
//! let tree = parse_hcl("some \"map\" {\n  item = 42\n}\n").unwrap();
//! let block = &tree.items()[0];
//! assert!(block.has_key_pair("some", "\"map\""));
//! assert!(matches!(block.value(), Value::Object(_)));
//! ```

use super::node::{
    Item, ItemComments, Key, KeyKind, ListBody, ListElement, Literal, LiteralKind, ObjectBody,
    TextSpan, Value,
};
use super::tree::HclTree;
use anyhow::{anyhow, Context, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokKind {
    Ident,
    String,
    Number,
    Float,
    Bool,
    Heredoc,
    Comment,
    Assign,
    LBrace,
    RBrace,
    LBrack,
    RBrack,
    Comma,
    Eof,
}

impl TokKind {
    fn describe(&self) -> &'static str {
        match self {
            TokKind::Ident => "identifier",
            TokKind::String => "string",
            TokKind::Number | TokKind::Float => "number",
            TokKind::Bool => "bool",
            TokKind::Heredoc => "heredoc",
            TokKind::Comment => "comment",
            TokKind::Assign => "'='",
            TokKind::LBrace => "'{'",
            TokKind::RBrace => "'}'",
            TokKind::LBrack => "'['",
            TokKind::RBrack => "']'",
            TokKind::Comma => "','",
            TokKind::Eof => "end of file",
        }
    }
}

#[derive(Debug, Clone)]
struct Tok {
    kind: TokKind,
    span: TextSpan,
    /// Line of the first character (1-based)
    line: usize,
    /// Line of the last character
    end_line: usize,
}

/// Returns the 1-based line and column of a byte offset.
fn location(source: &str, pos: usize) -> (usize, usize) {
    let before = &source[..pos.min(source.len())];
    let line = before.matches('\n').count() + 1;
    let column = match before.rfind('\n') {
        Some(nl) => before[nl + 1..].chars().count() + 1,
        None => before.chars().count() + 1,
    };
    (line, column)
}

/// Splits HCL source into tokens, comments included.
struct Scanner<'a> {
    source: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> Scanner<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            line: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.source[self.pos..].chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
        }
        Some(ch)
    }

    fn error(&self, pos: usize, message: &str) -> anyhow::Error {
        let (line, column) = location(self.source, pos);
        anyhow!("line {}, column {}: {}", line, column, message)
    }

    fn scan(mut self) -> Result<Vec<Tok>> {
        let mut tokens = Vec::new();
        loop {
            while matches!(self.peek(), Some(' ' | '\t' | '\r' | '\n')) {
                self.bump();
            }

            let start = self.pos;
            let line = self.line;
            let kind = match self.peek() {
                None => {
                    tokens.push(Tok {
                        kind: TokKind::Eof,
                        span: TextSpan { start, end: start },
                        line,
                        end_line: line,
                    });
                    return Ok(tokens);
                }
                Some('#') => self.scan_line_comment(),
                Some('/') if self.peek_nth(1) == Some('/') => self.scan_line_comment(),
                Some('/') if self.peek_nth(1) == Some('*') => self.scan_block_comment()?,
                Some('"') => {
                    self.scan_string()?;
                    TokKind::String
                }
                Some('<') if self.peek_nth(1) == Some('<') => self.scan_heredoc()?,
                Some(c @ ('=' | '{' | '}' | '[' | ']' | ',')) => {
                    self.bump();
                    match c {
                        '=' => TokKind::Assign,
                        '{' => TokKind::LBrace,
                        '}' => TokKind::RBrace,
                        '[' => TokKind::LBrack,
                        ']' => TokKind::RBrack,
                        _ => TokKind::Comma,
                    }
                }
                Some(c) if c.is_ascii_digit() => self.scan_number(),
                Some('-') if self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) => {
                    self.scan_number()
                }
                Some(c) if c.is_alphabetic() || c == '_' => self.scan_ident(),
                Some(c) => return Err(self.error(start, &format!("unexpected character '{}'", c))),
            };

            tokens.push(Tok {
                kind,
                span: TextSpan {
                    start,
                    end: self.pos,
                },
                line,
                end_line: self.line,
            });
        }
    }

    fn scan_line_comment(&mut self) -> TokKind {
        while !matches!(self.peek(), None | Some('\n')) {
            self.bump();
        }
        // Keep a trailing `\r` out of the comment text.
        if self.source[..self.pos].ends_with('\r') {
            self.pos -= 1;
        }
        TokKind::Comment
    }

    fn scan_block_comment(&mut self) -> Result<TokKind> {
        let start = self.pos;
        self.bump();
        self.bump();
        loop {
            match self.bump() {
                Some('*') if self.peek() == Some('/') => {
                    self.bump();
                    return Ok(TokKind::Comment);
                }
                Some(_) => {}
                None => return Err(self.error(start, "unterminated block comment")),
            }
        }
    }

    /// Scans a quoted string, `${ ... }` interpolations included.
    fn scan_string(&mut self) -> Result<()> {
        let start = self.pos;
        self.bump();
        loop {
            match self.bump() {
                Some('"') => return Ok(()),
                Some('\\') => {
                    self.bump();
                }
                Some('$') if self.peek() == Some('{') => {
                    self.bump();
                    self.scan_interpolation(start)?;
                }
                Some('\n') | None => return Err(self.error(start, "unterminated string")),
                Some(_) => {}
            }
        }
    }

    fn scan_interpolation(&mut self, string_start: usize) -> Result<()> {
        let mut depth = 1;
        loop {
            match self.peek() {
                Some('{') => {
                    depth += 1;
                    self.bump();
                }
                Some('}') => {
                    self.bump();
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                Some('"') => self.scan_string()?,
                Some(_) => {
                    self.bump();
                }
                None => return Err(self.error(string_start, "unterminated interpolation")),
            }
        }
    }

    fn scan_heredoc(&mut self) -> Result<TokKind> {
        let start = self.pos;
        self.bump();
        self.bump();
        if self.peek() == Some('-') {
            self.bump();
        }
        let anchor_start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '_')
        {
            self.bump();
        }
        let anchor = &self.source[anchor_start..self.pos];
        if anchor.is_empty() {
            return Err(self.error(start, "heredoc is missing its anchor"));
        }
        if self.peek() == Some('\r') {
            self.bump();
        }
        if self.peek() != Some('\n') {
            return Err(self.error(start, "heredoc anchor must be followed by a newline"));
        }

        loop {
            // At a newline: step onto the next line and check it.
            if self.bump().is_none() {
                return Err(self.error(start, &format!("heredoc '{}' is never closed", anchor)));
            }
            let line_start = self.pos;
            while !matches!(self.peek(), None | Some('\n')) {
                self.bump();
            }
            if self.source[line_start..self.pos].trim() == anchor {
                return Ok(TokKind::Heredoc);
            }
            if self.peek().is_none() {
                return Err(self.error(start, &format!("heredoc '{}' is never closed", anchor)));
            }
        }
    }

    fn scan_number(&mut self) -> TokKind {
        if self.peek() == Some('-') {
            self.bump();
        }
        if self.peek() == Some('0') && matches!(self.peek_nth(1), Some('x' | 'X')) {
            self.bump();
            self.bump();
            while self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                self.bump();
            }
            return TokKind::Number;
        }

        let mut kind = TokKind::Number;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
        if self.peek() == Some('.') && self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
            kind = TokKind::Float;
            self.bump();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.bump();
            }
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let signed = matches!(self.peek_nth(1), Some('+' | '-'));
            let digit_at = if signed { 2 } else { 1 };
            if self.peek_nth(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                kind = TokKind::Float;
                for _ in 0..digit_at {
                    self.bump();
                }
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.bump();
                }
            }
        }
        kind
    }

    fn scan_ident(&mut self) -> TokKind {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
        {
            self.bump();
        }
        match &self.source[start..self.pos] {
            "true" | "false" => TokKind::Bool,
            _ => TokKind::Ident,
        }
    }
}

/// Builds the item tree from the token stream.
struct DocParser<'a> {
    source: &'a str,
    tokens: Vec<Tok>,
    position: usize,
    /// Line on which the last consumed token ended
    last_line: usize,
}

impl<'a> DocParser<'a> {
    fn new(source: &'a str, tokens: Vec<Tok>) -> Self {
        Self {
            source,
            tokens,
            position: 0,
            last_line: 0,
        }
    }

    fn peek(&self) -> &Tok {
        &self.tokens[self.position]
    }

    fn advance(&mut self) -> Tok {
        let tok = self.tokens[self.position].clone();
        if tok.kind != TokKind::Eof {
            self.position += 1;
            self.last_line = tok.end_line;
        }
        tok
    }

    fn text(&self, tok: &Tok) -> &'a str {
        &self.source[tok.span.start..tok.span.end]
    }

    fn error(&self, tok: &Tok, message: &str) -> anyhow::Error {
        let (line, column) = location(self.source, tok.span.start);
        anyhow!("line {}, column {}: {}", line, column, message)
    }

    fn expect(&mut self, kind: TokKind) -> Result<Tok> {
        let tok = self.peek().clone();
        if tok.kind != kind {
            return Err(self.error(
                &tok,
                &format!("expected {}, found {}", kind.describe(), tok.kind.describe()),
            ));
        }
        Ok(self.advance())
    }

    /// Collects comment tokens ahead of the next item.
    ///
    /// Also reports whether an empty line separates the next token from
    /// what came before it.
    fn take_lead_comments(&mut self) -> (Vec<String>, bool) {
        let blank_before = self.last_line > 0 && self.peek().line > self.last_line + 1;
        let mut comments = Vec::new();
        while self.peek().kind == TokKind::Comment {
            let tok = self.advance();
            comments.push(self.text(&tok).to_string());
        }
        (comments, blank_before)
    }

    fn parse_body(&mut self, nested: bool) -> Result<ObjectBody> {
        let mut body = ObjectBody::default();
        loop {
            let (lead, blank_before) = self.take_lead_comments();
            let tok = self.peek().clone();
            match tok.kind {
                TokKind::Eof if !nested => {
                    body.dangling_comments = lead;
                    return Ok(body);
                }
                TokKind::RBrace if nested => {
                    body.dangling_comments = lead;
                    return Ok(body);
                }
                TokKind::Eof => return Err(self.error(&tok, "expected '}', found end of file")),
                _ => {}
            }

            let mut item = self.parse_item()?;
            // Comments between `=` and the value follow the ones above the item.
            let mut comments = lead;
            comments.append(&mut item.comments.lead);
            item.comments.lead = comments;
            item.blank_before = blank_before;

            if self.peek().kind == TokKind::Comma {
                self.advance();
            }
            let next = self.peek().clone();
            if next.kind == TokKind::Comment && next.line == self.last_line {
                self.advance();
                item.comments.line = Some(self.text(&next).to_string());
            }
            body.items.push(item);
        }
    }

    fn parse_item(&mut self) -> Result<Item> {
        let start = self.peek().span.start;
        let mut keys = Vec::new();
        loop {
            let tok = self.peek().clone();
            let kind = match tok.kind {
                TokKind::Ident => KeyKind::Ident,
                TokKind::String => KeyKind::String,
                TokKind::Assign | TokKind::LBrace if !keys.is_empty() => break,
                other => {
                    let expected = if keys.is_empty() {
                        "expected item key"
                    } else {
                        "expected '=' or '{'"
                    };
                    return Err(self.error(
                        &tok,
                        &format!("{}, found {}", expected, other.describe()),
                    ));
                }
            };
            self.advance();
            keys.push(Key::new(kind, self.text(&tok)));
        }

        let mut before_value = Vec::new();
        let (value, assign) = if self.peek().kind == TokKind::Assign {
            self.advance();
            while self.peek().kind == TokKind::Comment {
                let tok = self.advance();
                before_value.push(self.text(&tok).to_string());
            }
            (self.parse_value()?, true)
        } else {
            (self.parse_object()?, false)
        };

        let end = self.tokens[self.position - 1].span.end;
        let mut item = Item::new(keys, value);
        item.assign = assign;
        item.comments.lead = before_value;
        item.span = Some(TextSpan { start, end });
        Ok(item)
    }

    fn parse_value(&mut self) -> Result<Value> {
        let tok = self.peek().clone();
        let kind = match tok.kind {
            TokKind::String => LiteralKind::String,
            TokKind::Number => LiteralKind::Number,
            TokKind::Float => LiteralKind::Float,
            TokKind::Bool => LiteralKind::Bool,
            TokKind::Heredoc => LiteralKind::Heredoc,
            TokKind::LBrace => return self.parse_object(),
            TokKind::LBrack => return self.parse_list(),
            other => {
                return Err(self.error(
                    &tok,
                    &format!("expected value, found {}", other.describe()),
                ))
            }
        };
        self.advance();
        Ok(Value::Literal(Literal::new(kind, self.text(&tok))))
    }

    fn parse_object(&mut self) -> Result<Value> {
        self.expect(TokKind::LBrace)?;
        let body = self.parse_body(true)?;
        self.expect(TokKind::RBrace)?;
        Ok(Value::Object(body))
    }

    /// Parses `[ ... ]`. A comment on an element's last line (before or
    /// after its comma) is that element's line comment; other comments lead
    /// the next element or dangle before `]`.
    fn parse_list(&mut self) -> Result<Value> {
        self.expect(TokKind::LBrack)?;
        let mut list = ListBody::default();
        let mut pending = Vec::new();
        let mut element_line = 0;
        let mut needs_comma = false;

        loop {
            let tok = self.peek().clone();
            match tok.kind {
                TokKind::RBrack => break,
                TokKind::Comment => {
                    self.advance();
                    let text = self.text(&tok).to_string();
                    match list.elements.last_mut() {
                        Some(last) if tok.line == element_line && last.comments.line.is_none() => {
                            last.comments.line = Some(text)
                        }
                        _ => pending.push(text),
                    }
                }
                TokKind::Comma if needs_comma => {
                    self.advance();
                    needs_comma = false;
                }
                other if needs_comma => {
                    return Err(self.error(
                        &tok,
                        &format!("expected ',' or ']', found {}", other.describe()),
                    ));
                }
                _ => {
                    let value = self.parse_value()?;
                    element_line = self.last_line;
                    list.elements.push(ListElement {
                        value,
                        comments: ItemComments {
                            lead: std::mem::take(&mut pending),
                            line: None,
                        },
                    });
                    needs_comma = true;
                }
            }
        }

        list.dangling_comments = pending;
        self.expect(TokKind::RBrack)?;
        Ok(Value::List(list))
    }
}

/// Parses an HCL string into an [`HclTree`].
///
/// # Errors
///
/// Returns an error naming the line and column when the text is not valid
/// HCL.
pub fn parse_hcl(source: &str) -> Result<HclTree> {
    let tokens = Scanner::new(source)
        .scan()
        .context("Failed to tokenize HCL")?;
    log::trace!("scanned {} HCL tokens", tokens.len());

    let root = DocParser::new(source, tokens)
        .parse_body(false)
        .context("Failed to parse HCL")?;
    log::debug!("parsed HCL document with {} top-level item(s)", root.items.len());

    Ok(HclTree::with_source(root, Some(source.to_string())))
}
