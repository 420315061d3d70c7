//! HCL document model, reader and printer.
//!
//! - [`node`]: items, keys and values with raw token text
//! - [`tree`]: the document root
//! - [`parser`]: text to tree, comments included
//! - [`printer`]: tree to canonical text

pub mod node;
pub mod parser;
pub mod printer;
pub mod tree;
