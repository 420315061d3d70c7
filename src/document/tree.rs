//! The parsed HCL document.
//!
//! `HclTree` owns the root object body of a document together with the
//! original source text it was read from.
//!
//! # Example
//!
//! ```
//! use hclquill::document::node::{Item, Key, Literal, LiteralKind, ObjectBody, Value};
//! use hclquill::document::tree::HclTree;
//!
//! let tree = HclTree::new(ObjectBody::new(vec![Item::new(
//!     vec![Key::ident("foo")],
//!     Value::Literal(Literal::new(LiteralKind::Bool, "true")),
//! )]));
//!
//! assert_eq!(tree.items().len(), 1);
//! assert!(tree.get_item(&[0]).unwrap().has_single_key("foo"));
//! ```

use super::node::{Item, ObjectBody, Value};

/// A complete HCL document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HclTree {
    root: ObjectBody,
    /// The original HCL string, when the tree was parsed from text
    original_source: Option<String>,
}

impl HclTree {
    /// Creates a tree with no original source.
    pub fn new(root: ObjectBody) -> Self {
        Self {
            root,
            original_source: None,
        }
    }

    /// Creates a tree that remembers the source it was parsed from.
    pub fn with_source(root: ObjectBody, original_source: Option<String>) -> Self {
        Self {
            root,
            original_source,
        }
    }

    /// Returns the original HCL source, if available.
    pub fn original_source(&self) -> Option<&str> {
        self.original_source.as_deref()
    }

    pub fn root(&self) -> &ObjectBody {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut ObjectBody {
        &mut self.root
    }

    /// Consumes the tree, returning its root body.
    pub fn into_root(self) -> ObjectBody {
        self.root
    }

    /// Top-level items in document order.
    pub fn items(&self) -> &[Item] {
        &self.root.items
    }

    /// Gets the item at the given index path.
    ///
    /// Each index selects an item of the current body; the next index
    /// continues inside that item's object value. Returns `None` when an
    /// index is out of bounds or the path runs into a non-object value.
    ///
    /// # Example
    ///
    /// ```
    /// use hclquill::document::parser::parse_hcl;
    ///
    /// let tree = parse_hcl("obj {\n  val = 56\n}\n").unwrap();
    /// let item = tree.get_item(&[0, 0]).unwrap();
    /// assert!(item.has_single_key("val"));
    /// assert!(tree.get_item(&[0, 1]).is_none());
    /// ```
    pub fn get_item(&self, path: &[usize]) -> Option<&Item> {
        let (first, rest) = path.split_first()?;
        let mut current = self.root.items.get(*first)?;

        for &index in rest {
            match current.value() {
                Value::Object(body) => current = body.items.get(index)?,
                _ => return None,
            }
        }

        Some(current)
    }
}
