//! Canonical HCL rendering.
//!
//! Literals are written exactly as they are stored, so text read from a
//! document (or written by `set`) comes back out unchanged. Layout is
//! normalized: consistent indentation, `=` aligned across runs of
//! single-line attributes, and a blank line around blocks.

use super::node::{Item, ListBody, LiteralKind, ObjectBody, Value};
use super::tree::HclTree;

/// Lists longer than this are split over several lines.
const MAX_COMPACT_WIDTH: usize = 80;

/// Renders a whole document, without a trailing newline.
///
/// # Example
///
/// ```
/// use hclquill::document::parser::parse_hcl;
/// use hclquill::document::printer::serialize_tree;
///
/// let tree = parse_hcl("a=1\nlonger=\"x\"\n").unwrap();
/// assert_eq!(serialize_tree(&tree, 2), "a      = 1\nlonger = \"x\"");
/// ```
pub fn serialize_tree(tree: &HclTree, indent_size: usize) -> String {
    serialize_body(tree.root(), indent_size, 0)
}

/// Renders the items of a body at the given depth, one per line.
pub fn serialize_body(body: &ObjectBody, indent_size: usize, depth: usize) -> String {
    let indent = " ".repeat(indent_size * depth);
    let rendered: Vec<String> = body
        .items
        .iter()
        .map(|item| serialize_value(item.value(), indent_size, depth))
        .collect();
    let widths = alignment_widths(&body.items, &rendered);

    let mut result = String::new();
    for (i, item) in body.items.iter().enumerate() {
        if i > 0 {
            result.push('\n');
            if item.blank_before || is_block(&body.items[i - 1]) || is_block(item) {
                result.push('\n');
            }
        }

        for comment in &item.comments().lead {
            result.push_str(&indent);
            result.push_str(comment);
            result.push('\n');
        }

        result.push_str(&indent);
        if item.is_assignment() {
            result.push_str(&format!("{:<width$} = ", item.key_path(), width = widths[i]));
        } else {
            result.push_str(&item.key_path());
            result.push(' ');
        }
        result.push_str(&rendered[i]);

        if let Some(comment) = &item.comments().line {
            result.push(' ');
            result.push_str(comment);
        }
    }

    for comment in &body.dangling_comments {
        if !result.is_empty() {
            result.push('\n');
        }
        result.push_str(&indent);
        result.push_str(comment);
    }

    result
}

/// Renders a value whose first line continues the current one.
pub fn serialize_value(value: &Value, indent_size: usize, depth: usize) -> String {
    let indent = " ".repeat(indent_size * depth);
    let next_indent = " ".repeat(indent_size * (depth + 1));

    match value {
        Value::Literal(literal) => literal.text().to_string(),
        Value::Object(body) => {
            if body.is_empty() {
                return "{}".to_string();
            }
            format!(
                "{{\n{}\n{}}}",
                serialize_body(body, indent_size, depth + 1),
                indent
            )
        }
        Value::List(list) => {
            if list.is_empty() {
                return "[]".to_string();
            }

            if should_use_compact_format_list(list) {
                let compact = serialize_list_compact(list);
                if compact.len() <= MAX_COMPACT_WIDTH {
                    return compact;
                }
            }

            let mut result = "[\n".to_string();
            for element in &list.elements {
                for comment in &element.comments.lead {
                    result.push_str(&next_indent);
                    result.push_str(comment);
                    result.push('\n');
                }
                result.push_str(&next_indent);
                result.push_str(&serialize_value(&element.value, indent_size, depth + 1));
                result.push(',');
                if let Some(comment) = &element.comments.line {
                    result.push(' ');
                    result.push_str(comment);
                }
                result.push('\n');
            }
            for comment in &list.dangling_comments {
                result.push_str(&next_indent);
                result.push_str(comment);
                result.push('\n');
            }
            result.push_str(&indent);
            result.push(']');
            result
        }
    }
}

/// Blocks and object assignments get a blank line on either side.
fn is_block(item: &Item) -> bool {
    item.value().is_object()
}

/// Attributes whose `=` sits on a line of its own, heredocs included.
fn is_alignable(item: &Item, rendered: &str) -> bool {
    match item.value() {
        Value::Object(_) => false,
        Value::Literal(literal) if literal.kind() == LiteralKind::Heredoc => item.is_assignment(),
        _ => item.is_assignment() && !rendered.contains('\n'),
    }
}

/// Key column width for each item: the widest key in its run of
/// consecutive single-line attributes, or 0 outside any run.
fn alignment_widths(items: &[Item], rendered: &[String]) -> Vec<usize> {
    let mut widths = vec![0; items.len()];
    let mut run_start = 0;

    for i in 0..=items.len() {
        let alignable = i < items.len() && is_alignable(&items[i], &rendered[i]);
        let breaks = !alignable || items[i].blank_before;
        if !breaks {
            continue;
        }

        if run_start < i {
            let width = items[run_start..i]
                .iter()
                .map(|item| item.key_path().chars().count())
                .max()
                .unwrap_or(0);
            for w in &mut widths[run_start..i] {
                *w = width;
            }
        }
        run_start = if alignable { i } else { i + 1 };
    }

    widths
}

/// Uncommented lists of plain literals may be written on one line.
fn should_use_compact_format_list(list: &ListBody) -> bool {
    !list.has_comments()
        && list.values().all(|value| match value {
            Value::Literal(literal) => literal.kind() != LiteralKind::Heredoc,
            _ => false,
        })
}

/// Example: `["a", "b", 3]`
fn serialize_list_compact(list: &ListBody) -> String {
    let parts: Vec<String> = list
        .values()
        .map(|value| serialize_value(value, 0, 0))
        .collect();
    format!("[{}]", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parser::parse_hcl;

    fn reformat(source: &str) -> String {
        serialize_tree(&parse_hcl(source).unwrap(), 2)
    }

    #[test]
    fn test_serialize_aligns_attribute_runs() {
        let output = reformat("a = 1\nbbb = 2\n\ncc = 3\n");
        assert_eq!(output, "a   = 1\nbbb = 2\n\ncc = 3");
    }

    #[test]
    fn test_serialize_blocks_get_blank_lines() {
        let output = reformat("foo = true\nobj {\nval = 56\n}\nsome \"map\" {\n  item = 42\n}\n");
        assert_eq!(
            output,
            "foo = true\n\nobj {\n  val = 56\n}\n\nsome \"map\" {\n  item = 42\n}"
        );
    }

    #[test]
    fn test_serialize_object_assignment() {
        let output = reformat("cfg = {\n    port = 80\n}\n");
        assert_eq!(output, "cfg = {\n  port = 80\n}");
    }

    #[test]
    fn test_serialize_empty_block() {
        assert_eq!(reformat("obj {\n}\n"), "obj {}");
    }

    #[test]
    fn test_serialize_compact_list() {
        assert_eq!(reformat("ports = [ 80,443, ]\n"), "ports = [80, 443]");
        assert_eq!(reformat("empty = []\n"), "empty = []");
    }

    #[test]
    fn test_serialize_multiline_list_of_objects() {
        let output = reformat("rules = [{ port = 80 }, { port = 443 }]\n");
        assert_eq!(
            output,
            "rules = [\n  {\n    port = 80\n  },\n  {\n    port = 443\n  },\n]"
        );
    }

    #[test]
    fn test_serialize_list_keeps_comments() {
        let source = "ports = [\n  80, # http\n  443, # https\n]\n";
        assert_eq!(reformat(source), "ports = [\n  80, # http\n  443, # https\n]");
    }

    #[test]
    fn test_serialize_list_lead_and_dangling_comments() {
        let source = "args = [\n# first\n\"-v\",\n\"-q\"\n// trailing\n]\n";
        let output = reformat(source);
        assert_eq!(
            output,
            "args = [\n  # first\n  \"-v\",\n  \"-q\",\n  // trailing\n]"
        );
        assert_eq!(reformat(&output), output);
    }

    #[test]
    fn test_serialize_comment_before_value_moves_above() {
        let output = reformat("port = # the port\n  80\n");
        assert_eq!(output, "# the port\nport = 80");
        assert_eq!(reformat(&output), output);
    }

    #[test]
    fn test_serialize_three_key_block() {
        let output = reformat("resource \"aws_instance\" \"web\" {\nami = \"x\"\n}\n");
        assert_eq!(output, "resource \"aws_instance\" \"web\" {\n  ami = \"x\"\n}");
    }

    #[test]
    fn test_serialize_long_list_is_split() {
        let items: Vec<String> = (0..20).map(|i| format!("\"value-{}\"", i)).collect();
        let output = reformat(&format!("names = [{}]\n", items.join(", ")));
        assert!(output.starts_with("names = [\n  \"value-0\",\n"));
        assert!(output.ends_with("\n]"));
    }

    #[test]
    fn test_serialize_keeps_literal_text() {
        let output = reformat("n = 0042\nf = 3.14\ns = \"${var.x}\"\n");
        assert_eq!(output, "n = 0042\nf = 3.14\ns = \"${var.x}\"");
    }

    #[test]
    fn test_serialize_heredoc_aligns_with_neighbors() {
        let output = reformat("a = 1\ndata = <<EOF\nhi\nEOF\nlong_name = 2\n");
        assert_eq!(
            output,
            "a         = 1\ndata      = <<EOF\nhi\nEOF\nlong_name = 2"
        );
    }

    #[test]
    fn test_serialize_multiline_list_breaks_alignment() {
        let output = reformat("a = 1\nrules = [{ port = 80 }]\nlong_name = 2\n");
        assert_eq!(
            output,
            "a = 1\nrules = [\n  {\n    port = 80\n  },\n]\nlong_name = 2"
        );
    }

    #[test]
    fn test_serialize_comments() {
        let source = "# top\nfoo = 1 // note\nobj {\n  # inner\n  val = 2\n  # end of obj\n}\n";
        assert_eq!(
            reformat(source),
            "# top\nfoo = 1 // note\n\nobj {\n  # inner\n  val = 2\n  # end of obj\n}"
        );
    }

    #[test]
    fn test_serialize_is_idempotent() {
        let source = "x=1\nlong_key  =  \"v\"\njob \"web\" {\n  count=2\n\n  tags=[\"a\",\"b\"]\n}\n";
        let once = reformat(source);
        let twice = reformat(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_serialize_custom_indent() {
        let tree = parse_hcl("obj {\n  val = 1\n}\n").unwrap();
        assert_eq!(serialize_tree(&tree, 4), "obj {\n    val = 1\n}");
    }
}
