//! Maps rendered elements to block kinds.
//!
//! The set of recognized kinds is closed; anything else lands in
//! [`ElementKind::Unknown`] and is skipped by the dispatcher.

use crate::dom::{NodeId, RenderedTree};
use crate::model::HeadingLevel;

/// Block-level meaning of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Heading(HeadingLevel),
    Paragraph,
    CodeBlock,
    Blockquote,
    List { ordered: bool },
    Table,
    Image,
    Rule,
    Diagram,
    Math,
    Container,
    Unknown,
}

/// Classify an element. Marker attributes and classes win over the tag.
pub fn classify(tree: &RenderedTree, id: NodeId) -> ElementKind {
    let Some(name) = tree.element_name(id) else {
        return ElementKind::Unknown;
    };

    if is_diagram(tree, id) {
        return ElementKind::Diagram;
    }
    if is_math(tree, id) {
        return ElementKind::Math;
    }

    match &**name {
        "h1" => ElementKind::Heading(HeadingLevel::clamped(1)),
        "h2" => ElementKind::Heading(HeadingLevel::clamped(2)),
        "h3" => ElementKind::Heading(HeadingLevel::clamped(3)),
        "h4" => ElementKind::Heading(HeadingLevel::clamped(4)),
        "h5" => ElementKind::Heading(HeadingLevel::clamped(5)),
        "h6" => ElementKind::Heading(HeadingLevel::clamped(6)),

        "p" => ElementKind::Paragraph,
        "pre" => ElementKind::CodeBlock,
        "blockquote" => ElementKind::Blockquote,

        "ul" => ElementKind::List { ordered: false },
        "ol" => ElementKind::List { ordered: true },

        "table" => ElementKind::Table,
        "img" => ElementKind::Image,
        "hr" => ElementKind::Rule,

        "div" | "section" | "article" | "main" | "header" | "footer" | "nav" | "aside"
        | "figure" | "details" | "body" | "html" => ElementKind::Container,

        _ => ElementKind::Unknown,
    }
}

/// Diagram containers: `data-mermaid`, a `mermaid` class, or an unrendered
/// `language-mermaid` code fence.
pub fn is_diagram(tree: &RenderedTree, id: NodeId) -> bool {
    if tree.has_attr(id, "data-mermaid")
        || tree.has_class(id, "mermaid")
        || tree.has_class(id, "mermaid-container")
    {
        return true;
    }
    tree.is_tag(id, "pre")
        && tree
            .child_elements(id)
            .any(|child| tree.is_tag(child, "code") && tree.has_class(child, "language-mermaid"))
}

/// Typeset-math containers produced by KaTeX.
pub fn is_math(tree: &RenderedTree, id: NodeId) -> bool {
    tree.has_class(id, "katex")
        || tree.has_class(id, "katex-display")
        || tree.has_class(id, "math-display")
}

/// The TeX source KaTeX keeps in a MathML annotation, if present.
pub fn math_annotation(tree: &RenderedTree, id: NodeId) -> Option<String> {
    let annotation = tree.find_descendant(id, |tree, node| {
        tree.is_tag(node, "annotation")
            && tree
                .get_attr(node, "encoding")
                .is_some_and(|e| e == "application/x-tex")
    })?;
    let source = tree.text_content(annotation);
    let source = source.trim();
    (!source.is_empty()).then(|| source.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_element(html: &str) -> (RenderedTree, NodeId) {
        let tree = RenderedTree::parse_html(html);
        let body = tree.body();
        let first = tree.child_elements(body).next().expect("element");
        (tree, first)
    }

    #[test]
    fn test_classify_tags() {
        let cases = [
            ("<h3>x</h3>", ElementKind::Heading(HeadingLevel::clamped(3))),
            ("<p>x</p>", ElementKind::Paragraph),
            ("<pre>x</pre>", ElementKind::CodeBlock),
            ("<ol><li>x</li></ol>", ElementKind::List { ordered: true }),
            ("<hr>", ElementKind::Rule),
            ("<section>x</section>", ElementKind::Container),
            ("<marquee>x</marquee>", ElementKind::Unknown),
            ("<span>x</span>", ElementKind::Unknown),
        ];
        for (html, expected) in cases {
            let (tree, id) = first_element(html);
            assert_eq!(classify(&tree, id), expected, "{}", html);
        }
    }

    #[test]
    fn test_diagram_markers() {
        let (tree, id) = first_element(r#"<div data-mermaid="1"><svg></svg></div>"#);
        assert_eq!(classify(&tree, id), ElementKind::Diagram);

        let (tree, id) = first_element(r#"<div class="mermaid-container">x</div>"#);
        assert_eq!(classify(&tree, id), ElementKind::Diagram);

        let (tree, id) =
            first_element(r#"<pre><code class="language-mermaid">graph TD;</code></pre>"#);
        assert_eq!(classify(&tree, id), ElementKind::Diagram);

        let (tree, id) = first_element(r#"<pre><code class="language-rust">fn main</code></pre>"#);
        assert_eq!(classify(&tree, id), ElementKind::CodeBlock);
    }

    #[test]
    fn test_math_annotation() {
        let (tree, id) = first_element(
            r#"<span class="katex-display"><span class="katex"><span class="katex-mathml"><math><semantics><mrow></mrow><annotation encoding="application/x-tex"> E = mc^2 </annotation></semantics></math></span></span></span>"#,
        );
        assert_eq!(classify(&tree, id), ElementKind::Math);
        assert_eq!(math_annotation(&tree, id).as_deref(), Some("E = mc^2"));
    }
}
