//! Path queries for reading and rewriting single values in HCL documents.
//!
//! # Supported Syntax
//!
//! - `name` - an attribute at any depth
//! - `obj.val` - `val` inside the block `obj { ... }`
//! - `some[map].val` - `val` inside the labeled block `some "map" { ... }`
//!
//! Segments chain freely, e.g. `job[web].group[app].task[server].config.image`.
//! Only scalar values (strings, numbers, bools) can be read or written.
//!
//! # Examples
//!
//! ```
//! use hclquill::document::parser::parse_hcl;
//! use hclquill::hclpath::{get_value, set_value, ValueType};
//!
//! let mut tree = parse_hcl("some \"map\" {\n  item = 42\n}\n").unwrap();
//!
//! let mut out = Vec::new();
//! get_value(&tree, "some[map].item", &mut out).unwrap();
//! assert_eq!(out, b"42\n");
//!
//! set_value(&mut tree, "some[map].item", "43", ValueType::Int).unwrap();
//! let mut out = Vec::new();
//! get_value(&tree, "some[map].item", &mut out).unwrap();
//! assert_eq!(out, b"43\n");
//! ```

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod value;
pub mod walker;

pub use ast::Query;
pub use error::{FormatError, QueryError, TypeTagError, WalkError};
pub use parser::Parser;
pub use value::{format_value, ValueType};
pub use walker::Walker;

use crate::document::tree::HclTree;
use anyhow::Result;
use std::io::Write;

/// Parses `path` and prints every matching scalar to `out`.
///
/// Returns the number of matches; no match is not an error.
pub fn get_value<W: Write>(tree: &HclTree, path: &str, out: &mut W) -> Result<usize> {
    let query = Parser::parse(path)?;
    Ok(Walker::new(&query).get(tree, out)?)
}

/// Parses `path`, coerces `raw` to `value_type` and writes it at every match.
///
/// Both the query and the value are checked before the tree is touched.
pub fn set_value(tree: &mut HclTree, path: &str, raw: &str, value_type: ValueType) -> Result<usize> {
    let query = Parser::parse(path)?;
    let literal = format_value(raw, value_type)?;
    Ok(Walker::new(&query).set(tree, &literal)?)
}
