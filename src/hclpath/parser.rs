//! Recursive-descent parser for HCL path queries.
//!
//! Grammar, one production per segment:
//!
//! ```text
//! expr := IDENT                          -> Single
//!       | IDENT "." expr                 -> Obj
//!       | IDENT "[" IDENT "]" "." expr   -> KeyValue
//! ```

use super::ast::Query;
use super::error::QueryError;
use super::lexer::{lex, Token, TokenKind};

/// Parser for path query strings.
pub struct Parser<'a> {
    query: &'a str,
    tokens: Vec<Token>,
    position: usize,
}

impl<'a> Parser<'a> {
    /// Creates a new parser for the given query string.
    pub fn new(query: &'a str) -> Self {
        Self {
            query,
            tokens: lex(query),
            position: 0,
        }
    }

    /// Parses the query string into a [`Query`].
    pub fn parse(query: &str) -> Result<Query, QueryError> {
        let mut parser = Parser::new(query);
        let parsed = parser.parse_expr()?;
        log::debug!("parsed query {:?} into {} segment(s)", query, parsed.depth());
        Ok(parsed)
    }

    /// Returns the current token without advancing.
    fn peek(&self) -> &Token {
        &self.tokens[self.position]
    }

    /// Returns the current token and advances, stopping at `Eof`.
    fn advance(&mut self) -> Token {
        let token = self.tokens[self.position].clone();
        if token.kind != TokenKind::Eof {
            self.position += 1;
        }
        token
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn is_at_end(&self) -> bool {
        self.check(TokenKind::Eof)
    }

    fn unexpected(&self, token: &Token, expected: &str) -> QueryError {
        QueryError::UnexpectedToken {
            query: self.query.to_string(),
            position: token.start,
            found: token.to_string(),
            expected: expected.to_string(),
        }
    }

    fn parse_expr(&mut self) -> Result<Query, QueryError> {
        let token = self.advance();
        if token.kind != TokenKind::Ident {
            return Err(self.unexpected(&token, "identifier"));
        }

        if self.is_at_end() {
            return Ok(Query::Single { name: token.value });
        }

        if self.check(TokenKind::Dot) {
            self.advance();
            let next = self.parse_expr()?;
            return Ok(Query::Obj {
                name: token.value,
                next: Box::new(next),
            });
        }

        if self.check(TokenKind::LBrack) {
            self.advance();
            let label = self.advance();
            if label.kind != TokenKind::Ident {
                return Err(self.unexpected(&label, "identifier"));
            }
            if !self.check(TokenKind::RBrack) {
                return Err(QueryError::ExpectedBracket {
                    query: self.query.to_string(),
                    position: self.peek().start,
                });
            }
            self.advance();
            if !self.check(TokenKind::Dot) {
                return Err(QueryError::ExpectedDot {
                    query: self.query.to_string(),
                    position: self.peek().start,
                });
            }
            self.advance();
            let next = self.parse_expr()?;
            // Re-quoted so it compares equal to a quoted key in the document.
            return Ok(Query::KeyValue {
                key: token.value,
                value: format!("\"{}\"", label.value),
                next: Box::new(next),
            });
        }

        Err(self.unexpected(self.peek(), "'.', '[' or end of input"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(name: &str) -> Query {
        Query::Single {
            name: name.to_string(),
        }
    }

    #[test]
    fn test_parse_single() {
        assert_eq!(Parser::parse("foo").unwrap(), single("foo"));
    }

    #[test]
    fn test_parse_nested_obj() {
        let query = Parser::parse("obj.val").unwrap();
        assert_eq!(
            query,
            Query::Obj {
                name: "obj".to_string(),
                next: Box::new(single("val")),
            }
        );
    }

    #[test]
    fn test_parse_labeled_block() {
        let query = Parser::parse("some[map].obj.val").unwrap();
        assert_eq!(
            query,
            Query::KeyValue {
                key: "some".to_string(),
                value: "\"map\"".to_string(),
                next: Box::new(Query::Obj {
                    name: "obj".to_string(),
                    next: Box::new(single("val")),
                }),
            }
        );
    }

    #[test]
    fn test_parse_chained_labeled_blocks() {
        let query = Parser::parse("job[hydra].group[hydra].task[hydra].config.image").unwrap();
        assert_eq!(query.depth(), 5);
        assert_eq!(
            query.to_string(),
            "job[hydra].group[hydra].task[hydra].config.image"
        );
    }

    #[test]
    fn test_parse_missing_bracket() {
        let err = Parser::parse("some[map.item").unwrap_err();
        assert!(matches!(err, QueryError::ExpectedBracket { position: 8, .. }));
        assert!(err.to_string().contains("expecting ']'"));
    }

    #[test]
    fn test_parse_missing_dot_after_bracket() {
        let err = Parser::parse("some[map]item").unwrap_err();
        assert!(matches!(err, QueryError::ExpectedDot { position: 9, .. }));
        assert!(err
            .to_string()
            .contains("expecting '.' at character 9"));
    }

    #[test]
    fn test_parse_labeled_block_cannot_be_terminal() {
        let err = Parser::parse("some[map]").unwrap_err();
        assert!(matches!(err, QueryError::ExpectedDot { position: 9, .. }));
    }

    #[test]
    fn test_parse_empty_fails() {
        let err = Parser::parse("").unwrap_err();
        assert!(matches!(err, QueryError::UnexpectedToken { position: 0, .. }));
    }

    #[test]
    fn test_parse_trailing_dot_fails() {
        let err = Parser::parse("obj.").unwrap_err();
        match err {
            QueryError::UnexpectedToken {
                position, found, ..
            } => {
                assert_eq!(position, 4);
                assert_eq!(found, "end of input");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_parse_empty_label_fails() {
        let err = Parser::parse("some[].x").unwrap_err();
        assert!(matches!(err, QueryError::UnexpectedToken { position: 5, .. }));
    }

    #[test]
    fn test_parse_leading_punctuation_fails() {
        assert!(Parser::parse(".foo").is_err());
        assert!(Parser::parse("[a].b").is_err());
    }

    #[test]
    fn test_parse_stray_closing_bracket_fails() {
        let err = Parser::parse("foo]").unwrap_err();
        assert!(matches!(err, QueryError::UnexpectedToken { position: 3, .. }));
    }

    #[test]
    fn test_parse_is_deterministic() {
        for path in ["foo", "obj.val", "some[map].item", "a[b].c[d].e"] {
            assert_eq!(Parser::parse(path).unwrap(), Parser::parse(path).unwrap());
        }
    }
}
