//! HCL node representation.
//!
//! This module provides the data structures for HCL documents in hclquill.
//! A document body is an ordered list of [`Item`]s. Each item has one or more
//! [`Key`]s and a [`Value`]; one key is a plain attribute or an unlabeled
//! block, two keys are a labeled block (`type "label" { ... }`). Items with
//! more labels (`resource "aws_instance" "web" { ... }`) are kept but never
//! matched by a path, only walked through.
//!
//! Keys and literals keep their raw token text, so a document can be printed
//! back exactly as written and a replaced literal appears verbatim.
//!
//! # Example
//!
//! ```
//! use hclquill::document::node::{Item, Key, Literal, LiteralKind, ObjectBody, Value};
//!
//! // some "map" { item = 42 }
//! let inner = Item::new(
//!     vec![Key::ident("item")],
//!     Value::Literal(Literal::new(LiteralKind::Number, "42")),
//! );
//! let block = Item::new(
//!     vec![Key::ident("some"), Key::string("map")],
//!     Value::Object(ObjectBody::new(vec![inner])),
//! );
//! assert!(block.is_labeled_block());
//! assert_eq!(block.keys()[1].text(), "\"map\"");
//! ```

use std::fmt;

/// A byte range in the original HCL source.
#[derive(Debug, Clone, PartialEq, Eq, Copy)]
pub struct TextSpan {
    /// Start byte offset in original HCL
    pub start: usize,
    /// End byte offset in original HCL (exclusive)
    pub end: usize,
}

/// How a key was written in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// A bare identifier: `foo`
    Ident,
    /// A quoted string: `"foo"`
    String,
}

/// An item key with its raw token text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    kind: KeyKind,
    text: String,
}

impl Key {
    pub fn new(kind: KeyKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// Creates a bare identifier key.
    pub fn ident(name: &str) -> Self {
        Self::new(KeyKind::Ident, name)
    }

    /// Creates a quoted string key; `label` is wrapped in double quotes.
    pub fn string(label: &str) -> Self {
        Self::new(KeyKind::String, format!("\"{}\"", label))
    }

    pub fn kind(&self) -> KeyKind {
        self.kind
    }

    /// The raw token text, quotes included for string keys.
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// The scalar type of a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    String,
    Number,
    Float,
    Bool,
    /// A `<<EOF` or `<<-EOF` heredoc string
    Heredoc,
}

impl LiteralKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LiteralKind::String => "string",
            LiteralKind::Number => "number",
            LiteralKind::Float => "float",
            LiteralKind::Bool => "bool",
            LiteralKind::Heredoc => "heredoc",
        }
    }
}

/// A scalar value with its raw token text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    kind: LiteralKind,
    text: String,
}

impl Literal {
    pub fn new(kind: LiteralKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn kind(&self) -> LiteralKind {
        self.kind
    }

    /// The literal exactly as it appears in the document.
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// The body of a block or object value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ObjectBody {
    pub items: Vec<Item>,
    /// Comments after the last item, before the closing brace or end of file.
    pub dangling_comments: Vec<String>,
}

impl ObjectBody {
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            items,
            dangling_comments: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.dangling_comments.is_empty()
    }
}

/// One element of a list, with the comments written around it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListElement {
    pub value: Value,
    pub comments: ItemComments,
}

impl ListElement {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            comments: ItemComments::default(),
        }
    }
}

/// The contents of a `[ ... ]` list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListBody {
    pub elements: Vec<ListElement>,
    /// Comments after the last element, before the closing bracket.
    pub dangling_comments: Vec<String>,
}

impl ListBody {
    /// Creates a list of uncommented values.
    pub fn new(values: Vec<Value>) -> Self {
        Self {
            elements: values.into_iter().map(ListElement::new).collect(),
            dangling_comments: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty() && self.dangling_comments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.elements.iter().map(|element| &element.value)
    }

    /// True if any element or the list itself carries a comment.
    pub fn has_comments(&self) -> bool {
        !self.dangling_comments.is_empty()
            || self
                .elements
                .iter()
                .any(|e| !e.comments.lead.is_empty() || e.comments.line.is_some())
    }
}

/// An HCL value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// A scalar: string, number, float, bool or heredoc
    Literal(Literal),
    /// A nested block body or `{ ... }` object
    Object(ObjectBody),
    /// A `[ ... ]` list
    List(ListBody),
}

impl Value {
    pub fn is_literal(&self) -> bool {
        matches!(self, Value::Literal(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    /// A short description of the value's shape, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Literal(_) => "a literal",
            Value::Object(_) => "an object",
            Value::List(_) => "a list",
        }
    }
}

/// Comments attached to an item.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemComments {
    /// Comment lines directly above the item
    pub lead: Vec<String>,
    /// A comment on the same line, after the value
    pub line: Option<String>,
}

/// One entry of an object body: keys plus a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub(crate) keys: Vec<Key>,
    pub(crate) value: Value,
    /// Written with `=` (`obj = { ... }`) rather than as a block (`obj { ... }`).
    pub(crate) assign: bool,
    pub(crate) comments: ItemComments,
    /// Preceded by an empty line in the source.
    pub(crate) blank_before: bool,
    pub(crate) span: Option<TextSpan>,
}

impl Item {
    /// Creates an item. Literal and list values are assignments, objects are blocks.
    pub fn new(keys: Vec<Key>, value: Value) -> Self {
        let assign = !value.is_object();
        Self {
            keys,
            value,
            assign,
            comments: ItemComments::default(),
            blank_before: false,
            span: None,
        }
    }

    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut Value {
        &mut self.value
    }

    /// Replaces the value, returning the item. Comments and layout are kept.
    ///
    /// A block that receives a literal or list becomes an assignment.
    pub fn with_value(mut self, value: Value) -> Self {
        if !value.is_object() {
            self.assign = true;
        }
        self.value = value;
        self
    }

    /// Rebuilds the value with `f`, returning the item.
    pub fn map_value(mut self, f: impl FnOnce(Value) -> Value) -> Self {
        let value = std::mem::replace(&mut self.value, Value::List(ListBody::default()));
        self.value = f(value);
        self
    }

    pub fn is_assignment(&self) -> bool {
        self.assign
    }

    pub fn comments(&self) -> &ItemComments {
        &self.comments
    }

    pub fn span(&self) -> Option<TextSpan> {
        self.span
    }

    /// True if the item has exactly one key with the given text.
    ///
    /// Items with three or more keys never match a path segment.
    pub fn has_single_key(&self, name: &str) -> bool {
        self.keys.len() == 1 && self.keys[0].text() == name
    }

    /// True if the item has exactly two keys with the given texts.
    pub fn has_key_pair(&self, key: &str, label: &str) -> bool {
        self.keys.len() == 2 && self.keys[0].text() == key && self.keys[1].text() == label
    }

    pub fn is_labeled_block(&self) -> bool {
        self.keys.len() == 2
    }

    /// The keys joined the way they are written: `some "map"`.
    pub fn key_path(&self) -> String {
        self.keys
            .iter()
            .map(Key::text)
            .collect::<Vec<_>>()
            .join(" ")
    }
}
