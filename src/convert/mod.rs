//! Rendered tree to structured blocks.
//!
//! The dispatcher walks block-level elements in document order and turns
//! each into zero or more [`Block`]s. Inline content goes through
//! [`extract_runs`]. A problem with one element never stops the walk: it is
//! logged and becomes a placeholder, or the element is skipped.
//!
//! ```
//! use prosedoc::attachments::NoAttachments;
//! use prosedoc::convert::convert_html;
//! use prosedoc::model::Block;
//!
//! let blocks = convert_html("<h1>Notes</h1><ol><li>first</li><li>second</li></ol>", &NoAttachments);
//! assert_eq!(blocks.len(), 3);
//! assert!(matches!(blocks[2], Block::ListItem { ordered: true, index: 2, .. }));
//! ```

mod element;
mod image;
mod inline;

pub use element::{ElementKind, classify};
pub use image::ImageError;
pub use inline::extract_runs;

use log::{debug, warn};

use crate::attachments::AttachmentResolver;
use crate::dom::{NodeId, RenderedTree};
use crate::model::{Block, PlaceholderReason, TableCell, TextRun};

use self::image::{ImageSource, load_image};

/// Containers nested deeper than this are skipped.
pub const MAX_DEPTH: usize = 128;

/// Longest source snippet kept on a placeholder.
const SNIPPET_LIMIT: usize = 200;

/// Parse HTML and convert its body.
pub fn convert_html(html: &str, resolver: &dyn AttachmentResolver) -> Vec<Block> {
    let tree = RenderedTree::parse_html(html);
    convert(&tree, tree.body(), resolver)
}

/// Convert the element children of `root` into blocks.
///
/// Pure over its inputs: the same tree and resolver always give the same
/// blocks.
pub fn convert(tree: &RenderedTree, root: NodeId, resolver: &dyn AttachmentResolver) -> Vec<Block> {
    let mut converter = Converter {
        tree,
        resolver,
        blocks: Vec::new(),
    };
    converter.children(root, 0);
    converter.blocks
}

struct Converter<'a> {
    tree: &'a RenderedTree,
    resolver: &'a dyn AttachmentResolver,
    blocks: Vec<Block>,
}

impl Converter<'_> {
    fn children(&mut self, parent: NodeId, depth: usize) {
        let elements: Vec<_> = self.tree.child_elements(parent).collect();
        for child in elements {
            self.element(child, depth);
        }
    }

    fn element(&mut self, id: NodeId, depth: usize) {
        if depth > MAX_DEPTH {
            warn!("skipping element nested deeper than {} levels", MAX_DEPTH);
            return;
        }

        let tree = self.tree;
        let kind = classify(tree, id);
        debug!(
            "dispatch <{}> as {:?}",
            tree.element_name(id).map(|n| &**n).unwrap_or("?"),
            kind
        );

        match kind {
            ElementKind::Heading(level) => {
                let runs = extract_runs(tree, id);
                self.blocks.push(Block::Heading { level, runs });
            }
            ElementKind::Paragraph => self.paragraph(id),
            ElementKind::CodeBlock => {
                let code = tree
                    .child_elements(id)
                    .find(|&c| tree.is_tag(c, "code"))
                    .unwrap_or(id);
                self.blocks.push(Block::CodeBlock {
                    text: tree.text_content(code),
                });
            }
            ElementKind::Blockquote => {
                let text = tree.text_content(id).trim().to_string();
                self.blocks.push(Block::Blockquote { text });
            }
            ElementKind::List { ordered } => self.list(id, ordered, depth),
            ElementKind::Table => self.table(id),
            ElementKind::Image => self.image(id),
            ElementKind::Rule => self.blocks.push(Block::Rule),
            ElementKind::Diagram => {
                let snippet = self.diagram_source(id);
                self.blocks.push(Block::Placeholder {
                    reason: PlaceholderReason::DiagramUnsupported,
                    snippet,
                });
            }
            ElementKind::Math => self.math(id),
            ElementKind::Container => self.children(id, depth + 1),
            ElementKind::Unknown => {}
        }
    }

    fn paragraph(&mut self, id: NodeId) {
        let runs = extract_runs(self.tree, id);
        if !runs.is_empty() {
            self.blocks.push(Block::Paragraph { runs });
        }

        // Renderers wrap images in paragraphs; the target format wants them
        // as blocks of their own.
        for img in self.descendant_images(id) {
            self.image(img);
        }
    }

    fn list(&mut self, id: NodeId, ordered: bool, depth: usize) {
        let tree = self.tree;
        let items: Vec<_> = tree
            .child_elements(id)
            .filter(|&c| tree.is_tag(c, "li"))
            .collect();

        for (position, item) in items.into_iter().enumerate() {
            let runs = inline::extract_filtered(tree, item, &is_nested_list);
            self.blocks.push(Block::ListItem {
                ordered,
                index: position + 1,
                runs,
            });

            // Nested lists are flattened into following items at the same indent
            for nested in tree.child_elements(item).filter(|&c| is_nested_list(tree, c)) {
                self.element(nested, depth + 1);
            }
        }
    }

    fn table(&mut self, id: NodeId) {
        let tree = self.tree;
        let mut first = true;

        for row in self.table_rows(id) {
            let cells: Vec<TableCell> = tree
                .child_elements(row)
                .filter(|&c| tree.is_tag(c, "td") || tree.is_tag(c, "th"))
                .map(|cell| TableCell {
                    runs: extract_runs(tree, cell),
                    header: tree.is_tag(cell, "th"),
                })
                .collect();

            if cells.is_empty() {
                continue;
            }
            self.blocks.push(Block::TableRow {
                cells,
                first_in_table: first,
            });
            first = false;
        }
    }

    /// Rows in document order, from row groups or directly under the table.
    fn table_rows(&self, table: NodeId) -> Vec<NodeId> {
        let tree = self.tree;
        let mut rows = Vec::new();
        for child in tree.child_elements(table) {
            match tree.element_name(child).map(|n| &**n) {
                Some("tr") => rows.push(child),
                Some("thead") | Some("tbody") | Some("tfoot") => {
                    rows.extend(tree.child_elements(child).filter(|&r| tree.is_tag(r, "tr")));
                }
                _ => {}
            }
        }
        rows
    }

    fn image(&mut self, id: NodeId) {
        match load_image(self.tree, id, self.resolver) {
            Ok(ImageSource::Embedded(image)) => self.blocks.push(Block::Image(image)),
            Ok(ImageSource::External) => {
                debug!("skipping external image source");
            }
            Err(ImageError::Dangling(token)) => {
                warn!("image reference {} does not resolve", token);
                self.blocks.push(Block::Placeholder {
                    reason: PlaceholderReason::ImageMissing,
                    snippet: Some(token),
                });
            }
            Err(err) => {
                warn!("failed to embed image: {}", err);
                self.blocks.push(Block::placeholder(PlaceholderReason::ImageFailed));
            }
        }
    }

    fn math(&mut self, id: NodeId) {
        if let Some(source) = element::math_annotation(self.tree, id) {
            self.blocks.push(Block::Paragraph {
                runs: vec![TextRun {
                    text: source,
                    italic: true,
                    code: true,
                    ..Default::default()
                }],
            });
            return;
        }

        // No annotation: treat it as ordinary text
        let runs = extract_runs(self.tree, id);
        if !runs.is_empty() {
            self.blocks.push(Block::Paragraph { runs });
        }
    }

    /// Source text for unrendered diagram fences; rendered SVG has none worth keeping.
    fn diagram_source(&self, id: NodeId) -> Option<String> {
        let tree = self.tree;
        if !tree.is_tag(id, "pre") {
            return None;
        }
        let source = tree.text_content(id);
        let source = source.trim();
        if source.is_empty() {
            return None;
        }
        Some(truncate(source, SNIPPET_LIMIT))
    }

    fn descendant_images(&self, id: NodeId) -> Vec<NodeId> {
        let tree = self.tree;
        let mut images = Vec::new();
        let mut stack: Vec<_> = tree.children(id).collect();
        stack.reverse();
        while let Some(node) = stack.pop() {
            if tree.is_tag(node, "img") {
                images.push(node);
                continue;
            }
            let mut children: Vec<_> = tree.children(node).collect();
            children.reverse();
            stack.extend(children);
        }
        images
    }
}

fn is_nested_list(tree: &RenderedTree, id: NodeId) -> bool {
    tree.is_tag(id, "ul") || tree.is_tag(id, "ol")
}

fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}
