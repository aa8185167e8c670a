//! Inline formatting extraction.
//!
//! Walks an element's descendants and produces styled text runs in
//! left-to-right order. Style flags accumulate down the tree: a text leaf
//! inside both `<strong>` and `<em>` becomes one bold italic run.

use crate::dom::{NodeData, NodeId, RenderedTree};
use crate::model::TextRun;

use super::element::{is_math, math_annotation};

/// Style inherited from the ancestor chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct InlineStyle {
    bold: bool,
    italic: bool,
    code: bool,
}

impl InlineStyle {
    fn run(self, text: impl Into<String>, hyperlink: Option<String>) -> TextRun {
        TextRun {
            text: text.into(),
            bold: self.bold,
            italic: self.italic,
            code: self.code,
            hyperlink,
        }
    }
}

/// Extract the runs of every child of `id`.
///
/// Never fails: unknown inline tags are walked through without adding style.
pub fn extract_runs(tree: &RenderedTree, id: NodeId) -> Vec<TextRun> {
    extract_filtered(tree, id, &|_, _| false)
}

/// Extract runs, skipping children for which `skip` returns true.
///
/// The filter applies to the direct children of `id` only.
pub(crate) fn extract_filtered(
    tree: &RenderedTree,
    id: NodeId,
    skip: &dyn Fn(&RenderedTree, NodeId) -> bool,
) -> Vec<TextRun> {
    let mut stack: Vec<(NodeId, InlineStyle)> = tree
        .children(id)
        .filter(|&child| !skip(tree, child))
        .map(|child| (child, InlineStyle::default()))
        .collect();
    stack.reverse();
    walk(tree, stack)
}

/// Depth-first over an explicit stack, so nesting depth never grows the call stack.
fn walk(tree: &RenderedTree, mut stack: Vec<(NodeId, InlineStyle)>) -> Vec<TextRun> {
    let mut runs = Vec::new();

    while let Some((id, style)) = stack.pop() {
        let Some(node) = tree.get(id) else {
            continue;
        };

        let name = match &node.data {
            NodeData::Text(text) => {
                if keep_text(text) {
                    runs.push(style.run(text.as_str(), None));
                }
                continue;
            }
            NodeData::Element { name, .. } => &*name.local,
            _ => continue,
        };

        if is_math(tree, id) {
            // Only the TeX source survives; the MathML and HTML renderings would
            // otherwise both contribute their text.
            if let Some(source) = math_annotation(tree, id) {
                let math = InlineStyle {
                    italic: true,
                    code: true,
                    ..style
                };
                runs.push(math.run(source, None));
                continue;
            }
        }

        let style = match name {
            "strong" | "b" => InlineStyle { bold: true, ..style },
            "em" | "i" => InlineStyle {
                italic: true,
                ..style
            },
            "code" | "kbd" | "samp" | "tt" => InlineStyle { code: true, ..style },
            "a" => {
                let href = tree
                    .get_attr(id, "href")
                    .map(str::trim)
                    .filter(|h| !h.is_empty())
                    .map(str::to_string);
                let text = tree.text_content(id);
                if !text.is_empty() {
                    runs.push(style.run(text, href));
                }
                continue;
            }
            "br" => {
                runs.push(TextRun::line_break());
                continue;
            }
            "img" | "script" | "style" | "template" => continue,
            _ => style,
        };

        let first = stack.len();
        stack.extend(tree.children(id).map(|child| (child, style)));
        stack[first..].reverse();
    }

    runs
}

/// Keep text whose trimmed content is non-empty, or a lone separating space.
fn keep_text(text: &str) -> bool {
    !text.trim().is_empty() || text == " "
}
