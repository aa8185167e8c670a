//! HTML serialization of a rendered tree.

use std::fmt::Write;

use quick_xml::escape::{escape, partial_escape};

use super::arena::{NodeData, NodeId, RenderedTree};

/// Elements with no closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Elements whose text is emitted without escaping.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Pending work for the serializer's explicit stack.
enum Step {
    /// Write a node; the flag marks text inside a raw-text element.
    Node(NodeId, bool),
    /// Close the element opened earlier.
    Close(NodeId),
}

impl RenderedTree {
    /// Serialize the children of `id` as HTML.
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        let mut stack = Vec::new();
        self.push_children(&mut stack, id, false);
        self.write_steps(stack, &mut out);
        out
    }

    /// Serialize `id` itself, including its own tags.
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_steps(vec![Step::Node(id, false)], &mut out);
        out
    }

    fn push_children(&self, stack: &mut Vec<Step>, id: NodeId, raw_text: bool) {
        let first = stack.len();
        stack.extend(self.children(id).map(|child| Step::Node(child, raw_text)));
        stack[first..].reverse();
    }

    fn write_steps(&self, mut stack: Vec<Step>, out: &mut String) {
        while let Some(step) = stack.pop() {
            let (id, raw_text) = match step {
                Step::Node(id, raw_text) => (id, raw_text),
                Step::Close(id) => {
                    if let Some(name) = self.element_name(id) {
                        let _ = write!(out, "</{}>", &**name);
                    }
                    continue;
                }
            };
            let Some(node) = self.get(id) else {
                continue;
            };

            match &node.data {
                NodeData::Document => self.push_children(&mut stack, id, false),
                NodeData::Text(text) => {
                    if raw_text {
                        out.push_str(text);
                    } else {
                        out.push_str(&partial_escape(text.as_str()));
                    }
                }
                NodeData::Comment(text) => {
                    let _ = write!(out, "<!--{}-->", text);
                }
                NodeData::Element { name, attrs, .. } => {
                    let tag: &str = &name.local;
                    out.push('<');
                    out.push_str(tag);
                    for attr in attrs {
                        let _ = write!(
                            out,
                            " {}=\"{}\"",
                            &*attr.name.local,
                            escape(attr.value.as_str())
                        );
                    }
                    out.push('>');

                    if VOID_ELEMENTS.contains(&tag) {
                        continue;
                    }

                    stack.push(Step::Close(id));
                    self.push_children(&mut stack, id, RAW_TEXT_ELEMENTS.contains(&tag));
                }
            }
        }
    }
}
