//! Value type tags and coercion of raw strings into document literals.

use super::error::{FormatError, FormatErrorKind, TypeTagError};
use crate::document::node::{Literal, LiteralKind};
use std::fmt;
use std::str::FromStr;

/// The declared type of a value written with `set`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueType {
    #[default]
    String,
    Bool,
    Int,
    Float,
}

impl ValueType {
    /// Every recognized tag, in the order they are listed to users.
    pub const ALL: [ValueType; 4] = [
        ValueType::String,
        ValueType::Bool,
        ValueType::Int,
        ValueType::Float,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Bool => "bool",
            ValueType::Int => "int",
            ValueType::Float => "float",
        }
    }

    /// The literal kind written into the document for this type.
    pub fn literal_kind(&self) -> LiteralKind {
        match self {
            ValueType::String => LiteralKind::String,
            ValueType::Bool => LiteralKind::Bool,
            ValueType::Int => LiteralKind::Number,
            ValueType::Float => LiteralKind::Float,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ValueType {
    type Err = TypeTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ValueType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| TypeTagError {
                given: s.to_string(),
            })
    }
}

/// Parses the conventional textual forms of a boolean.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Validates `raw` against `value_type` and renders the literal to write.
///
/// Strings are wrapped in double quotes as given, without escaping. Booleans
/// are normalized to `true`/`false`. Integers and floats are validated but
/// keep the caller's text, so `0042` stays `0042`.
pub fn format_value(raw: &str, value_type: ValueType) -> Result<Literal, FormatError> {
    let error = |kind| FormatError {
        value: raw.to_string(),
        value_type,
        kind,
    };

    let text = match value_type {
        ValueType::String => format!("\"{}\"", raw),
        ValueType::Bool => match parse_bool(raw) {
            Some(true) => "true".to_string(),
            Some(false) => "false".to_string(),
            None => return Err(error(FormatErrorKind::Bool)),
        },
        ValueType::Int => {
            raw.parse::<i64>()
                .map_err(|e| error(FormatErrorKind::Int(e)))?;
            raw.to_string()
        }
        ValueType::Float => {
            raw.parse::<f64>()
                .map_err(|e| error(FormatErrorKind::Float(e)))?;
            raw.to_string()
        }
    };

    log::debug!("formatted {:?} as {} literal {}", raw, value_type, text);
    Ok(Literal::new(value_type.literal_kind(), text))
}
