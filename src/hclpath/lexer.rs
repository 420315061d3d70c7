//! Tokenizer for HCL path queries.

use std::fmt;

/// Kind of a path query token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    LBrack,
    RBrack,
    Dot,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Ident => write!(f, "identifier"),
            TokenKind::LBrack => write!(f, "'['"),
            TokenKind::RBrack => write!(f, "']'"),
            TokenKind::Dot => write!(f, "'.'"),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}

/// A token with its byte range in the source query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Identifier text; empty for punctuation and `Eof`.
    pub value: String,
    /// Start byte offset in the query
    pub start: usize,
    /// End byte offset in the query (exclusive)
    pub end: usize,
}

impl Token {
    fn new(kind: TokenKind, value: String, start: usize, end: usize) -> Self {
        Self {
            kind,
            value,
            start,
            end,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Ident => write!(f, "identifier '{}'", self.value),
            kind => write!(f, "{}", kind),
        }
    }
}

/// Splits a path query into tokens.
///
/// `[`, `]` and `.` are punctuation; every other character, whitespace
/// included, belongs to an identifier. The returned sequence always ends
/// with a single [`TokenKind::Eof`] positioned at the end of the query.
pub fn lex(query: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut ident_start = 0;

    for (index, c) in query.char_indices() {
        let kind = match c {
            '[' => TokenKind::LBrack,
            ']' => TokenKind::RBrack,
            '.' => TokenKind::Dot,
            _ => continue,
        };
        if index > ident_start {
            tokens.push(Token::new(
                TokenKind::Ident,
                query[ident_start..index].to_string(),
                ident_start,
                index,
            ));
        }
        tokens.push(Token::new(kind, String::new(), index, index + 1));
        ident_start = index + 1;
    }

    if query.len() > ident_start {
        tokens.push(Token::new(
            TokenKind::Ident,
            query[ident_start..].to_string(),
            ident_start,
            query.len(),
        ));
    }

    tokens.push(Token::new(
        TokenKind::Eof,
        String::new(),
        query.len(),
        query.len(),
    ));

    log::trace!("lexed {:?} into {} tokens", query, tokens.len());
    tokens
}
