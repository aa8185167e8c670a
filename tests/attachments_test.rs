//! Attachment resolution across the rich and plain-markup paths.

use std::collections::HashMap;
use std::io::Cursor;

use image::{DynamicImage, ImageFormat as EncodedFormat, RgbImage};
use proptest::prelude::*;

use prosedoc::attachments::{AttachmentStore, DocumentAttachments};
use prosedoc::convert::convert_html;
use prosedoc::markdown::{derive_title, hydrate_references, insert_image};
use prosedoc::model::{Block, ImageFormat, PlaceholderReason};
use prosedoc::DataUri;

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, image::Rgb([200, 30, 30]));
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut out, EncodedFormat::Png)
        .unwrap();
    out.into_inner()
}

// ============================================================================
// Referenced image present / absent
// ============================================================================

#[test]
fn test_present_reference_embeds_exact_payload() {
    let png = png_bytes(8, 6);
    let mut store = HashMap::new();
    store.insert("img-123".to_string(), DataUri::encode("image/png", &png));

    let blocks = convert_html(r#"<p><img src="attachment:img-123" alt="shot"></p>"#, &store);

    assert_eq!(blocks.len(), 1);
    match &blocks[0] {
        Block::Image(image) => {
            assert_eq!(image.data, png);
            assert_eq!(image.format, ImageFormat::Png);
            assert_eq!((image.width, image.height), (8, 6));
        }
        other => panic!("expected image, got {:?}", other),
    }
}

#[test]
fn test_absent_reference_degrades_per_path() {
    let store: HashMap<String, String> = HashMap::new();

    let blocks = convert_html(r#"<p><img src="attachment:img-123"></p>"#, &store);
    assert_eq!(
        blocks,
        vec![Block::Placeholder {
            reason: PlaceholderReason::ImageMissing,
            snippet: Some("attachment:img-123".to_string()),
        }]
    );

    let markup = hydrate_references("![x](attachment:img-123)", &store);
    assert_eq!(markup, "![x](attachment:img-123)");
}

#[test]
fn test_declared_size_wins_over_intrinsic() {
    let mut store = HashMap::new();
    store.insert("img-1".to_string(), DataUri::encode("image/png", &png_bytes(200, 100)));

    let blocks = convert_html(r#"<img src="attachment:img-1" width="50">"#, &store);
    match &blocks[0] {
        Block::Image(image) => assert_eq!((image.width, image.height), (50, 25)),
        other => panic!("expected image, got {:?}", other),
    }
}

#[test]
fn test_non_word_formats_become_png() {
    let img = RgbImage::from_pixel(3, 3, image::Rgb([0, 0, 0]));
    let mut tiff = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut tiff, EncodedFormat::Tiff)
        .unwrap();
    let mut store = HashMap::new();
    store.insert(
        "img-t".to_string(),
        DataUri::encode("image/tiff", tiff.get_ref()),
    );

    let blocks = convert_html(r#"<img src="attachment:img-t">"#, &store);
    match &blocks[0] {
        Block::Image(image) => {
            assert_eq!(image.format, ImageFormat::Png);
            assert_eq!(&image.data[1..4], b"PNG");
        }
        other => panic!("expected image, got {:?}", other),
    }
}

// ============================================================================
// Store behavior
// ============================================================================

#[test]
fn test_store_is_scoped_per_document() {
    let mut store = AttachmentStore::new();
    let id = store.register("doc-a", "payload-a");

    assert_eq!(store.resolve("doc-a", id.as_str()), Some("payload-a"));
    assert_eq!(store.resolve("doc-b", id.as_str()), None);

    store.remove_document("doc-a");
    assert_eq!(store.resolve("doc-a", id.as_str()), None);
}

#[test]
fn test_insert_then_export_resolves() {
    let mut attachments = DocumentAttachments::new();
    let insertion = insert_image("# Trip\n", 7..7, "data:image/jpeg;base64,AAAA", &mut attachments);

    let exported = hydrate_references(&insertion.content, &attachments);
    let id = insertion.id.as_str();
    assert!(exported.contains(&format!("![Image][{}]", id)));
    assert!(exported.ends_with(&format!("[{}]: data:image/jpeg;base64,AAAA\n", id)));
    assert_eq!(derive_title(&insertion.content), "Trip");
}

// ============================================================================
// Round trip
// ============================================================================

/// Parse the `[id]: payload` appendix back into a map.
fn definitions(markup: &str) -> HashMap<String, String> {
    markup
        .lines()
        .filter_map(|line| {
            let rest = line.strip_prefix('[')?;
            let (id, payload) = rest.split_once("]: ")?;
            Some((id.to_string(), payload.to_string()))
        })
        .collect()
}

proptest! {
    #[test]
    fn prop_markup_export_preserves_payloads(
        entries in prop::collection::btree_map("img-[0-9a-z]{1,8}", "data:image/png;base64,[A-Za-z0-9+/]{4,40}", 1..6),
        dangling in "gone-[0-9]{1,4}",
    ) {
        let store: HashMap<String, String> = entries.clone().into_iter().collect();
        let mut content = String::from("# Notes\n\n");
        for id in entries.keys() {
            content.push_str(&format!("text ![alt {}](attachment:{})\n", id, id));
        }
        content.push_str(&format!("![missing](attachment:{})\n", dangling));

        let exported = hydrate_references(&content, &store);
        let defs = definitions(&exported);

        for (id, payload) in &entries {
            prop_assert_eq!(defs.get(id), Some(payload));
            let stored = DataUri::parse(payload).map(|u| u.data).ok();
            let recovered = DataUri::parse(&defs[id]).map(|u| u.data).ok();
            prop_assert_eq!(stored, recovered);
        }
        prop_assert!(!defs.contains_key(&dangling));
        let token = format!("](attachment:{})", dangling);
        prop_assert!(exported.contains(&token));
    }
}
