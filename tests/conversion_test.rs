//! Rendered-tree conversion tests.
//!
//! Exercises the dispatcher end to end on HTML shaped like the editor's
//! preview output.

use std::collections::HashMap;

use proptest::prelude::*;

use prosedoc::attachments::NoAttachments;
use prosedoc::convert::{convert, convert_html};
use prosedoc::dom::RenderedTree;
use prosedoc::model::{Block, HeadingLevel, PlaceholderReason, runs_text};

fn list_items(blocks: &[Block]) -> Vec<(String, String)> {
    blocks
        .iter()
        .filter_map(|block| match block {
            Block::ListItem {
                ordered,
                index,
                runs,
            } => Some((
                Block::list_prefix(*ordered, *index),
                runs_text(runs).trim().to_string(),
            )),
            _ => None,
        })
        .collect()
}

// ============================================================================
// Lists
// ============================================================================

#[test]
fn test_nested_bullets_flatten() {
    // - a
    // - b
    //   - c
    let html = "<ul>\n<li>a</li>\n<li>b\n<ul>\n<li>c</li>\n</ul>\n</li>\n</ul>\n";
    let blocks = convert_html(html, &NoAttachments);

    assert_eq!(blocks.len(), 3);
    assert_eq!(
        list_items(&blocks),
        vec![
            ("• ".to_string(), "a".to_string()),
            ("• ".to_string(), "b".to_string()),
            ("• ".to_string(), "c".to_string()),
        ]
    );
}

#[test]
fn test_ordered_prefixes() {
    let html = "<ol>\n<li>first</li>\n<li>second</li>\n</ol>";
    let blocks = convert_html(html, &NoAttachments);

    assert_eq!(
        list_items(&blocks),
        vec![
            ("1. ".to_string(), "first".to_string()),
            ("2. ".to_string(), "second".to_string()),
        ]
    );
}

#[test]
fn test_list_item_keeps_inline_formatting() {
    let blocks = convert_html("<ul><li><strong>bold</strong> item</li></ul>", &NoAttachments);
    match &blocks[0] {
        Block::ListItem { runs, .. } => {
            assert!(runs[0].bold);
            assert_eq!(runs_text(runs), "bold item");
        }
        other => panic!("expected list item, got {:?}", other),
    }
}

// ============================================================================
// Diagrams and degradation
// ============================================================================

#[test]
fn test_rendered_diagram_becomes_one_placeholder() {
    let html = r#"<p>before</p><div data-mermaid="graph TD; A-->B"><svg><g><text>A</text></g></svg></div><p>after</p>"#;
    let blocks = convert_html(html, &NoAttachments);

    assert_eq!(blocks.len(), 3);
    assert_eq!(
        blocks[1],
        Block::Placeholder {
            reason: PlaceholderReason::DiagramUnsupported,
            snippet: None,
        }
    );
    assert_eq!(blocks[1].kind(), "placeholder");
    assert_eq!(
        PlaceholderReason::DiagramUnsupported.to_string(),
        "diagram unsupported"
    );
}

#[test]
fn test_malformed_image_does_not_disturb_siblings() {
    let siblings = "<h2>Title</h2><p>one</p><table><tr><td>x</td></tr></table><p>two</p>";
    let with_bad = "<h2>Title</h2><p>one</p><img src=\"data:image/png;base64,@@not-base64@@\"><table><tr><td>x</td></tr></table><p>two</p>";

    let clean = convert_html(siblings, &NoAttachments);
    let degraded = convert_html(with_bad, &NoAttachments);

    let without_placeholders: Vec<_> = degraded
        .iter()
        .filter(|b| !matches!(b, Block::Placeholder { .. }))
        .cloned()
        .collect();
    assert_eq!(without_placeholders, clean);
    assert_eq!(degraded.len(), clean.len() + 1);
    assert!(degraded.contains(&Block::placeholder(PlaceholderReason::ImageFailed)));
}

#[test]
fn test_undecodable_image_payload_is_placeholder() {
    // Valid base64, but not an image
    let blocks = convert_html(r#"<img src="data:image/png;base64,aGVsbG8=">"#, &NoAttachments);
    assert_eq!(blocks, vec![Block::placeholder(PlaceholderReason::ImageFailed)]);
}

#[test]
fn test_unknown_elements_are_skipped() {
    let blocks = convert_html(
        "<p>kept</p><marquee>gone</marquee><video src=\"x\"></video><p>kept too</p>",
        &NoAttachments,
    );
    assert_eq!(blocks.len(), 2);
}

#[test]
fn test_deeply_nested_inline_content_converts() {
    fn nested(depth: usize) -> String {
        format!("{}x{}", "<span>".repeat(depth), "</span>".repeat(depth))
    }

    // Recursive walks at this depth overflow an 8 MiB stack
    let handle = std::thread::Builder::new()
        .stack_size(8 * 1024 * 1024)
        .spawn(|| {
            let depth = 100_000;
            let paragraph = convert_html(&format!("<p>{}</p>", nested(depth)), &NoAttachments);
            let quote = convert_html(
                &format!("<blockquote>{}</blockquote>", nested(depth)),
                &NoAttachments,
            );
            (paragraph, quote)
        })
        .unwrap();
    let (paragraph, quote) = handle.join().unwrap();

    assert_eq!(
        paragraph,
        vec![Block::Paragraph {
            runs: vec![prosedoc::TextRun::plain("x")]
        }]
    );
    assert_eq!(
        quote,
        vec![Block::Blockquote {
            text: "x".to_string()
        }]
    );
}

// ============================================================================
// Headings and containers
// ============================================================================

#[test]
fn test_heading_levels_in_range() {
    let html = "<h1>1</h1><h2>2</h2><h3>3</h3><h4>4</h4><h5>5</h5><h6>6</h6>";
    let levels: Vec<u8> = convert_html(html, &NoAttachments)
        .iter()
        .filter_map(|b| match b {
            Block::Heading { level, .. } => Some(level.get()),
            _ => None,
        })
        .collect();
    assert_eq!(levels, vec![1, 2, 3, 4, 5, 6]);
}

#[test]
fn test_tree_input_matches_html_input() {
    let mut tree = RenderedTree::new();
    let root = tree.document();
    let h = tree.create_element("h1", &[]);
    tree.append(root, h);
    tree.append_text(h, "Built");
    let p = tree.create_element("p", &[("class", "lead")]);
    tree.append(root, p);
    tree.append_text(p, "by hand");

    let built = convert(&tree, tree.document(), &NoAttachments);
    let parsed = convert_html("<h1>Built</h1><p class=\"lead\">by hand</p>", &NoAttachments);
    assert_eq!(built, parsed);
}

#[test]
fn test_code_block_preserves_whitespace() {
    let html = "<pre><code>  indented\n\ttabbed\n</code></pre>";
    let blocks = convert_html(html, &NoAttachments);
    assert_eq!(
        blocks,
        vec![Block::CodeBlock {
            text: "  indented\n\ttabbed\n".to_string()
        }]
    );
}

#[test]
fn test_resolver_is_consulted_by_id() {
    let store: HashMap<String, String> = HashMap::new();
    let blocks = convert_html(r#"<p><img src="attachment://img-9"></p>"#, &store);
    assert_eq!(
        blocks,
        vec![Block::Placeholder {
            reason: PlaceholderReason::ImageMissing,
            snippet: Some("attachment://img-9".to_string()),
        }]
    );
}

// ============================================================================
// Properties
// ============================================================================

fn fragment() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("<h1>Head</h1>"),
        Just("<h4>Sub <em>head</em></h4>"),
        Just("<p>plain <b>bold</b> <a href=\"https://x.dev\">link</a></p>"),
        Just("<ul><li>a</li><li>b<ul><li>c</li></ul></li></ul>"),
        Just("<ol><li>one</li></ol>"),
        Just("<blockquote><p>quote</p></blockquote>"),
        Just("<pre><code>let x = 1;</code></pre>"),
        Just("<table><tr><th>h</th></tr><tr><td>d</td></tr></table>"),
        Just("<hr>"),
        Just("<div class=\"mermaid\"><svg></svg></div>"),
        Just("<img src=\"attachment:nope\">"),
        Just("<img src=\"data:image/png;base64,!!\">"),
        Just("<section><p>nested</p></section>"),
        Just("<custom>ignored</custom>"),
    ]
}

proptest! {
    #[test]
    fn prop_convert_is_idempotent(parts in prop::collection::vec(fragment(), 0..24)) {
        let html = parts.concat();
        let tree = RenderedTree::parse_html(&html);
        let first = convert(&tree, tree.body(), &NoAttachments);
        let second = convert(&tree, tree.body(), &NoAttachments);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_fragments_convert_independently(parts in prop::collection::vec(fragment(), 0..16)) {
        let whole = convert_html(&parts.concat(), &NoAttachments);
        let pieces: Vec<Block> = parts
            .iter()
            .flat_map(|part| convert_html(part, &NoAttachments))
            .collect();
        prop_assert_eq!(whole.len(), pieces.len());
    }

    #[test]
    fn prop_heading_level_always_in_range(level in any::<u8>()) {
        let clamped = HeadingLevel::clamped(level).get();
        prop_assert!((1..=6).contains(&clamped));
        prop_assert_eq!(HeadingLevel::new(level).is_some(), (1..=6).contains(&level));
    }
}
