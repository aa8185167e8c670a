//! Rendered node tree.
//!
//! The converter reads a tree of text leaves and elements. Hosts either hand
//! over a tree they built themselves or an HTML string, which is parsed into
//! the same structure with html5ever.
//!
//! ```
//! use prosedoc::dom::RenderedTree;
//!
//! let tree = RenderedTree::parse_html("<h1>Title</h1><p>Body</p>");
//! let body = tree.body();
//! assert_eq!(tree.child_elements(body).count(), 2);
//! ```

mod arena;
mod serialize;
mod tree_sink;

pub use arena::{Attribute, Children, Node, NodeData, NodeId, RenderedTree};

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;

use tree_sink::TreeBuilder;

impl RenderedTree {
    /// Parse an HTML document or fragment.
    ///
    /// Fragments are wrapped in `html`/`body` by the parser, so
    /// [`RenderedTree::body`] is the natural conversion root.
    pub fn parse_html(html: &str) -> Self {
        let sink = TreeBuilder::new();
        parse_document(sink, ParseOpts::default())
            .from_utf8()
            .one(html.as_bytes())
            .into_tree()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_parse() {
        let tree = RenderedTree::parse_html("<html><body><p>Hello</p></body></html>");

        let p = tree.find_by_tag("p").expect("should find p");
        let text_id = tree.children(p).next().expect("p should have child");
        assert_eq!(tree.text(text_id), Some("Hello"));
    }

    #[test]
    fn test_fragment_lands_in_body() {
        let tree = RenderedTree::parse_html("<h2>One</h2>\n<p>Two</p>");
        let body = tree.body();
        let tags: Vec<_> = tree
            .child_elements(body)
            .filter_map(|id| tree.element_name(id).map(|n| n.to_string()))
            .collect();
        assert_eq!(tags, vec!["h2", "p"]);
    }

    #[test]
    fn test_attributes_and_classes() {
        let tree = RenderedTree::parse_html(
            r#"<div class="katex-display math" data-mermaid="graph">x</div>"#,
        );
        let div = tree.find_by_tag("div").expect("should find div");
        assert!(tree.has_class(div, "katex-display"));
        assert!(tree.has_class(div, "math"));
        assert_eq!(tree.get_attr(div, "data-mermaid"), Some("graph"));
    }

    #[test]
    fn test_misnested_markup_recovers() {
        let tree = RenderedTree::parse_html("<p><b>bold <i>both</b> italic</i></p>");
        let p = tree.find_by_tag("p").expect("should find p");
        assert_eq!(tree.text_content(p), "bold both italic");
    }
}
