//! Error types for path query parsing, value coercion and tree walking.

use super::value::ValueType;
use std::fmt;
use std::io;
use std::num::{ParseFloatError, ParseIntError};

/// Errors that can occur while parsing a path query.
///
/// Every variant keeps the source query so the error can point at the
/// offending character when displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// A closing `]` was followed by something other than `.`.
    ExpectedDot { query: String, position: usize },
    /// A bracketed label was not closed.
    ExpectedBracket { query: String, position: usize },
    /// Any other malformed token sequence.
    UnexpectedToken {
        query: String,
        position: usize,
        found: String,
        expected: String,
    },
}

impl QueryError {
    /// Byte offset of the offending character in the query.
    pub fn position(&self) -> usize {
        match self {
            QueryError::ExpectedDot { position, .. }
            | QueryError::ExpectedBracket { position, .. }
            | QueryError::UnexpectedToken { position, .. } => *position,
        }
    }

    /// The query string the error was raised for.
    pub fn query(&self) -> &str {
        match self {
            QueryError::ExpectedDot { query, .. }
            | QueryError::ExpectedBracket { query, .. }
            | QueryError::UnexpectedToken { query, .. } => query,
        }
    }

    /// Renders the query with a caret under the offending character.
    pub fn pointer(&self) -> String {
        let query = self.query();
        let position = self.position().min(query.len());
        // Column in characters, so multi-byte names don't shift the caret.
        let column = query
            .get(..position)
            .map(|prefix| prefix.chars().count())
            .unwrap_or(position);
        format!("  {}\n  {}^", query, " ".repeat(column))
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::ExpectedDot { position, .. } => {
                write!(f, "parse error: expecting '.' at character {}", position)?
            }
            QueryError::ExpectedBracket { position, .. } => {
                write!(f, "parse error: expecting ']' at character {}", position)?
            }
            QueryError::UnexpectedToken {
                position,
                found,
                expected,
                ..
            } => write!(
                f,
                "parse error: unexpected {} at character {}, expected {}",
                found, position, expected
            )?,
        }
        write!(f, "\n{}", self.pointer())
    }
}

impl std::error::Error for QueryError {}

/// An unrecognized value type tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeTagError {
    pub given: String,
}

impl fmt::Display for TypeTagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tags: Vec<&str> = ValueType::ALL.iter().map(|t| t.as_str()).collect();
        write!(
            f,
            "unknown type '{}': type should be one of: {}",
            self.given,
            tags.join(", ")
        )
    }
}

impl std::error::Error for TypeTagError {}

/// Why a raw value could not be coerced to its declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatErrorKind {
    Bool,
    Int(ParseIntError),
    Float(ParseFloatError),
}

/// A raw value that does not parse as its declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatError {
    pub value: String,
    pub value_type: ValueType,
    pub kind: FormatErrorKind,
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid {} value '{}': ",
            self.value_type.as_str(),
            self.value
        )?;
        match &self.kind {
            FormatErrorKind::Bool => write!(f, "expected one of 1, t, true, 0, f, false"),
            FormatErrorKind::Int(e) => write!(f, "{}", e),
            FormatErrorKind::Float(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for FormatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            FormatErrorKind::Bool => None,
            FormatErrorKind::Int(e) => Some(e),
            FormatErrorKind::Float(e) => Some(e),
        }
    }
}

/// Errors raised while resolving a query against a document.
#[derive(Debug)]
pub enum WalkError {
    /// The matched item does not hold a scalar literal.
    UnsupportedNode { name: String, found: &'static str },
    /// Nothing in the document matched the query.
    NotFound { query: String },
    /// Writing the value to the output sink failed.
    Io(io::Error),
}

impl fmt::Display for WalkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalkError::UnsupportedNode { name, found } => write!(
                f,
                "unsupported node type: '{}' holds {}, only scalar values can be read",
                name, found
            ),
            WalkError::NotFound { query } => write!(f, "path not found: {}", query),
            WalkError::Io(e) => write!(f, "failed to write value: {}", e),
        }
    }
}

impl std::error::Error for WalkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WalkError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for WalkError {
    fn from(e: io::Error) -> Self {
        WalkError::Io(e)
    }
}
