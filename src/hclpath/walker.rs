//! Resolves a compiled [`Query`] against an HCL document.
//!
//! The walk is depth-first in document order. Every item is compared with
//! the head of the remaining query:
//!
//! - a match on `Obj` or `KeyValue` continues inside the item's value with
//!   the rest of the query,
//! - a match on `Single` is the terminal: the value is read or replaced and
//!   the walk does not descend into that item,
//! - anything else is descended into with the query unchanged.
//!
//! A match only stops descent into its own subtree; sibling items are still
//! scanned, so every branch that matches independently is acted on.

use super::ast::Query;
use super::error::WalkError;
use crate::document::node::{Item, ListBody, ListElement, Literal, LiteralKind, ObjectBody, Value};
use crate::document::tree::HclTree;
use std::io::Write;

/// What to do with an item given the current query head.
enum Step<'q> {
    /// Matched a non-terminal segment; continue inside with the rest.
    Descend(&'q Query),
    /// Matched the terminal segment.
    Terminal,
    /// No match; continue inside with the same query.
    Miss,
}

fn step<'q>(item: &Item, query: &'q Query) -> Step<'q> {
    match query {
        Query::KeyValue { key, value, next } if item.has_key_pair(key, value) => {
            Step::Descend(next)
        }
        Query::Obj { name, next } if item.has_single_key(name) => Step::Descend(next),
        Query::Single { name } if item.has_single_key(name) => Step::Terminal,
        _ => Step::Miss,
    }
}

/// Reads or rewrites the values addressed by a query.
pub struct Walker<'q> {
    query: &'q Query,
    strict: bool,
}

impl<'q> Walker<'q> {
    pub fn new(query: &'q Query) -> Self {
        Self {
            query,
            strict: false,
        }
    }

    /// When strict, a query that matches nothing is a [`WalkError::NotFound`].
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Writes every matched scalar to `out`, one per line.
    ///
    /// Output is buffered until the walk succeeds, so nothing is written
    /// when a matched item holds a block or list. Returns the match count.
    pub fn get<W: Write>(&self, tree: &HclTree, out: &mut W) -> Result<usize, WalkError> {
        let mut buffer = String::new();
        let mut matches = 0;
        get_in_items(&tree.root().items, self.query, &mut buffer, &mut matches)?;
        self.check_found(matches)?;

        out.write_all(buffer.as_bytes())?;
        log::debug!("get {}: {} match(es)", self.query, matches);
        Ok(matches)
    }

    /// Replaces every matched value with `literal`. Returns the match count.
    ///
    /// The root body is rebuilt bottom-up; only matched items change.
    pub fn set(&self, tree: &mut HclTree, literal: &Literal) -> Result<usize, WalkError> {
        let mut matches = 0;
        let root = std::mem::take(tree.root_mut());
        *tree.root_mut() = rewrite_body(root, self.query, literal, &mut matches);
        self.check_found(matches)?;

        log::debug!("set {}: {} match(es)", self.query, matches);
        Ok(matches)
    }

    fn check_found(&self, matches: usize) -> Result<(), WalkError> {
        if matches == 0 && self.strict {
            return Err(WalkError::NotFound {
                query: self.query.to_string(),
            });
        }
        Ok(())
    }
}

fn get_in_items(
    items: &[Item],
    query: &Query,
    out: &mut String,
    matches: &mut usize,
) -> Result<(), WalkError> {
    for item in items {
        log::trace!("visit {} against {}", item.key_path(), query);
        match step(item, query) {
            Step::Terminal => {
                *matches += 1;
                match item.value() {
                    Value::Literal(literal) => {
                        out.push_str(&render_literal(literal));
                        out.push('\n');
                    }
                    other => {
                        return Err(WalkError::UnsupportedNode {
                            name: item.key_path(),
                            found: other.type_name(),
                        })
                    }
                }
            }
            Step::Descend(next) => get_in_value(item.value(), next, out, matches)?,
            Step::Miss => get_in_value(item.value(), query, out, matches)?,
        }
    }
    Ok(())
}

fn get_in_value(
    value: &Value,
    query: &Query,
    out: &mut String,
    matches: &mut usize,
) -> Result<(), WalkError> {
    match value {
        Value::Object(body) => get_in_items(&body.items, query, out, matches),
        Value::List(list) => list
            .values()
            .try_for_each(|v| get_in_value(v, query, out, matches)),
        Value::Literal(_) => Ok(()),
    }
}

fn rewrite_body(
    body: ObjectBody,
    query: &Query,
    literal: &Literal,
    matches: &mut usize,
) -> ObjectBody {
    let ObjectBody {
        items,
        dangling_comments,
    } = body;
    let items = items
        .into_iter()
        .map(|item| rewrite_item(item, query, literal, matches))
        .collect();
    ObjectBody {
        items,
        dangling_comments,
    }
}

fn rewrite_item(item: Item, query: &Query, literal: &Literal, matches: &mut usize) -> Item {
    match step(&item, query) {
        Step::Terminal => {
            *matches += 1;
            log::trace!("replace {} with {}", item.key_path(), literal.text());
            item.with_value(Value::Literal(literal.clone()))
        }
        Step::Descend(next) => item.map_value(|v| rewrite_value(v, next, literal, matches)),
        Step::Miss => item.map_value(|v| rewrite_value(v, query, literal, matches)),
    }
}

fn rewrite_value(value: Value, query: &Query, literal: &Literal, matches: &mut usize) -> Value {
    match value {
        Value::Object(body) => Value::Object(rewrite_body(body, query, literal, matches)),
        Value::List(list) => {
            let elements = list
                .elements
                .into_iter()
                .map(|element| ListElement {
                    value: rewrite_value(element.value, query, literal, matches),
                    comments: element.comments,
                })
                .collect();
            Value::List(ListBody {
                elements,
                dangling_comments: list.dangling_comments,
            })
        }
        Value::Literal(_) => value,
    }
}

/// Renders a literal the way `get` prints it.
///
/// Strings lose their quotes and have escapes resolved, heredocs print
/// their body, numbers print in decimal and bools as `true`/`false`.
pub fn render_literal(literal: &Literal) -> String {
    let text = literal.text();
    match literal.kind() {
        LiteralKind::String => unquote(text),
        LiteralKind::Heredoc => heredoc_body(text),
        LiteralKind::Number => parse_int(text)
            .map(|n| n.to_string())
            .unwrap_or_else(|| text.to_string()),
        LiteralKind::Float => text
            .parse::<f64>()
            .map(|f| f.to_string())
            .unwrap_or_else(|_| text.to_string()),
        LiteralKind::Bool => text.to_string(),
    }
}

/// Parses a decimal or `0x` hexadecimal integer literal.
fn parse_int(text: &str) -> Option<i64> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let value = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => i64::from_str_radix(hex, 16).ok()?,
        None => digits.parse::<i64>().ok()?,
    };
    Some(if negative { -value } else { value })
}

fn unquote(text: &str) -> String {
    let inner = text
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text);

    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('"') => result.push('"'),
            Some('\\') => result.push('\\'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => result.push(decoded),
                    None => {
                        result.push_str("\\u");
                        result.push_str(&hex);
                    }
                }
            }
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }
    result
}

fn heredoc_body(text: &str) -> String {
    let mut lines: Vec<&str> = text.lines().collect();
    if lines.len() < 2 {
        return String::new();
    }
    let indented = lines[0].starts_with("<<-");
    lines.remove(0);
    let closing = lines.pop().unwrap_or_default();

    if !indented {
        return lines.join("\n");
    }
    // `<<-` strips the closing marker's indentation from every line.
    let indent = |line: &str| line.len() - line.trim_start_matches([' ', '\t']).len();
    let strip = indent(closing);
    lines
        .iter()
        .map(|&line| &line[indent(line).min(strip)..])
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::node::Key;
    use crate::hclpath::parser::Parser;

    fn literal(kind: LiteralKind, text: &str) -> Value {
        Value::Literal(Literal::new(kind, text))
    }

    fn attr(name: &str, kind: LiteralKind, text: &str) -> Item {
        Item::new(vec![Key::ident(name)], literal(kind, text))
    }

    fn block(keys: Vec<Key>, items: Vec<Item>) -> Item {
        Item::new(keys, Value::Object(ObjectBody::new(items)))
    }

    // foo = true
    // obj { val = 56 }
    // some "map" { item = 42  obj { val = "abc" } }
    fn sample_tree() -> HclTree {
        HclTree::new(ObjectBody::new(vec![
            attr("foo", LiteralKind::Bool, "true"),
            block(
                vec![Key::ident("obj")],
                vec![attr("val", LiteralKind::Number, "56")],
            ),
            block(
                vec![Key::ident("some"), Key::string("map")],
                vec![
                    attr("item", LiteralKind::Number, "42"),
                    block(
                        vec![Key::ident("obj")],
                        vec![attr("val", LiteralKind::String, "\"abc\"")],
                    ),
                ],
            ),
        ]))
    }

    fn get(tree: &HclTree, path: &str) -> (String, usize) {
        let query = Parser::parse(path).unwrap();
        let mut out = Vec::new();
        let count = Walker::new(&query).get(tree, &mut out).unwrap();
        (String::from_utf8(out).unwrap(), count)
    }

    #[test]
    fn test_get_top_level() {
        assert_eq!(get(&sample_tree(), "foo"), ("true\n".to_string(), 1));
    }

    #[test]
    fn test_get_nested() {
        let (out, _) = get(&sample_tree(), "some[map].item");
        assert_eq!(out, "42\n");
        let (out, _) = get(&sample_tree(), "some[map].obj.val");
        assert_eq!(out, "abc\n");
    }

    #[test]
    fn test_get_first_match_per_branch() {
        // `obj.val` matches both the top-level block and the one nested
        // inside `some "map"`.
        let (out, count) = get(&sample_tree(), "obj.val");
        assert_eq!(out, "56\nabc\n");
        assert_eq!(count, 2);
    }

    #[test]
    fn test_get_no_match_is_silent() {
        assert_eq!(get(&sample_tree(), "some[other].item"), (String::new(), 0));
    }

    #[test]
    fn test_get_strict_no_match() {
        let query = Parser::parse("missing").unwrap();
        let mut out = Vec::new();
        let err = Walker::new(&query)
            .strict(true)
            .get(&sample_tree(), &mut out)
            .unwrap_err();
        assert!(matches!(err, WalkError::NotFound { .. }));
        assert_eq!(err.to_string(), "path not found: missing");
    }

    #[test]
    fn test_get_block_is_unsupported() {
        let query = Parser::parse("obj").unwrap();
        let mut out = Vec::new();
        let err = Walker::new(&query).get(&sample_tree(), &mut out).unwrap_err();
        assert!(matches!(
            err,
            WalkError::UnsupportedNode {
                found: "an object",
                ..
            }
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn test_set_replaces_only_match() {
        let mut tree = sample_tree();
        let query = Parser::parse("some[map].item").unwrap();
        let count = Walker::new(&query)
            .set(&mut tree, &Literal::new(LiteralKind::Number, "0042"))
            .unwrap();
        assert_eq!(count, 1);

        let item = tree.get_item(&[2, 0]).unwrap();
        assert_eq!(item.value(), &literal(LiteralKind::Number, "0042"));

        let mut expected = sample_tree();
        *expected.root_mut().items[2].value_mut() = tree.items()[2].value().clone();
        assert_eq!(tree, expected);
    }

    #[test]
    fn test_set_no_match_leaves_tree_untouched() {
        let mut tree = sample_tree();
        let query = Parser::parse("nope.val").unwrap();
        let count = Walker::new(&query)
            .set(&mut tree, &Literal::new(LiteralKind::String, "\"x\""))
            .unwrap();
        assert_eq!(count, 0);
        assert_eq!(tree, sample_tree());
    }

    #[test]
    fn test_set_descends_into_lists() {
        let list = Item::new(
            vec![Key::ident("groups")],
            Value::List(ListBody::new(vec![Value::Object(ObjectBody::new(vec![
                attr("count", LiteralKind::Number, "1"),
            ]))])),
        );
        let mut tree = HclTree::new(ObjectBody::new(vec![list]));
        let query = Parser::parse("count").unwrap();
        let count = Walker::new(&query)
            .set(&mut tree, &Literal::new(LiteralKind::Number, "3"))
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(get(&tree, "count").0, "3\n");
    }

    #[test]
    fn test_set_keeps_list_comments() {
        let mut tree = crate::document::parser::parse_hcl(
            "rules = [\n  # web\n  { port = 80 }, # http\n]\n",
        )
        .unwrap();
        let query = Parser::parse("port").unwrap();
        Walker::new(&query)
            .set(&mut tree, &Literal::new(LiteralKind::Number, "8080"))
            .unwrap();

        match tree.items()[0].value() {
            Value::List(list) => {
                assert_eq!(list.elements[0].comments.lead, vec!["# web"]);
                assert_eq!(list.elements[0].comments.line.as_deref(), Some("# http"));
            }
            other => panic!("expected list, got {:?}", other),
        }
        assert_eq!(get(&tree, "port").0, "8080\n");
    }

    #[test]
    fn test_render_literals() {
        let render = |kind, text: &str| render_literal(&Literal::new(kind, text));
        assert_eq!(render(LiteralKind::String, "\"a \\\"b\\\"\\n\""), "a \"b\"\n");
        assert_eq!(render(LiteralKind::String, "\"\\u00e9\""), "é");
        assert_eq!(render(LiteralKind::String, "\"${var.x}\""), "${var.x}");
        assert_eq!(render(LiteralKind::Number, "0042"), "42");
        assert_eq!(render(LiteralKind::Number, "0x1F"), "31");
        assert_eq!(render(LiteralKind::Number, "-5"), "-5");
        assert_eq!(render(LiteralKind::Float, "3.14"), "3.14");
        assert_eq!(render(LiteralKind::Float, "1e3"), "1000");
        assert_eq!(render(LiteralKind::Bool, "false"), "false");
    }

    #[test]
    fn test_render_heredocs() {
        let render = |text: &str| render_literal(&Literal::new(LiteralKind::Heredoc, text));
        assert_eq!(render("<<EOF\nline one\nline two\nEOF"), "line one\nline two");
        assert_eq!(render("<<-EOT\n    a\n      b\n    EOT"), "a\n  b");
    }
}
