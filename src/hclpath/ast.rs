//! Abstract syntax tree types for HCL path queries.

use std::fmt;

/// A compiled path query.
///
/// A query is a singly linked chain of segments. Every segment but the last
/// carries the rest of the chain in `next`; the chain always ends in
/// [`Query::Single`], which is where the value is read or written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Terminal segment: an item with exactly one key equal to `name`.
    Single { name: String },
    /// An item with exactly one key equal to `name`, continuing inside its body.
    Obj { name: String, next: Box<Query> },
    /// A labeled block: first key equal to `key`, second key equal to the
    /// quoted literal `value` (stored with its surrounding double quotes).
    KeyValue {
        key: String,
        value: String,
        next: Box<Query>,
    },
}

impl Query {
    /// Returns the segment that follows this one, or `None` at the terminal.
    pub fn next(&self) -> Option<&Query> {
        match self {
            Query::Single { .. } => None,
            Query::Obj { next, .. } | Query::KeyValue { next, .. } => Some(next),
        }
    }

    /// Returns true if this is the terminal segment.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Query::Single { .. })
    }

    /// Number of segments in the chain, terminal included.
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut current = self;
        while let Some(next) = current.next() {
            depth += 1;
            current = next;
        }
        depth
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::Single { name } => write!(f, "{}", name),
            Query::Obj { name, next } => write!(f, "{}.{}", name, next),
            Query::KeyValue { key, value, next } => {
                let label = value
                    .strip_prefix('"')
                    .and_then(|v| v.strip_suffix('"'))
                    .unwrap_or(value);
                write!(f, "{}[{}].{}", key, label, next)
            }
        }
    }
}
