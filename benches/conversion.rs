//! Benchmarks for the export pipeline.
//!
//! Run with: cargo bench

use std::collections::HashMap;
use std::hint::black_box;
use std::io::Cursor;

use criterion::{Criterion, criterion_group, criterion_main};

use prosedoc::attachments::NoAttachments;
use prosedoc::codec::{CompressOptions, compress};
use prosedoc::convert::convert_html;
use prosedoc::docx::assemble;
use prosedoc::markdown::hydrate_references;
use prosedoc::{DataUri, ExportSettings};

/// A long preview document mixing every block kind the converter handles.
fn sample_preview() -> String {
    let mut html = String::new();
    for i in 0..200 {
        html.push_str(&format!("<h2>Section {}</h2>", i));
        html.push_str(
            "<p>Body with <strong>bold</strong>, <em>italic</em>, <code>code</code> \
             and <a href=\"https://example.com\">a link</a>.</p>",
        );
        html.push_str("<ul><li>alpha</li><li>beta<ul><li>gamma</li></ul></li></ul>");
        html.push_str("<pre><code>fn main() {\n    println!(\"hi\");\n}</code></pre>");
        html.push_str("<table><tr><th>k</th><th>v</th></tr><tr><td>a</td><td>1</td></tr></table>");
        html.push_str("<blockquote><p>quoted</p></blockquote><hr>");
    }
    html
}

fn sample_png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 90])
    });
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

// ============================================================================
// Rich path
// ============================================================================

fn bench_convert_html(c: &mut Criterion) {
    let html = sample_preview();
    c.bench_function("convert_html", |b| {
        b.iter(|| convert_html(black_box(&html), &NoAttachments));
    });
}

fn bench_assemble_docx(c: &mut Criterion) {
    let blocks = convert_html(&sample_preview(), &NoAttachments);
    let settings = ExportSettings::default();
    c.bench_function("assemble_docx", |b| {
        b.iter(|| assemble(black_box(&blocks), &settings).unwrap());
    });
}

// ============================================================================
// Markup path and codec
// ============================================================================

fn bench_hydrate_references(c: &mut Criterion) {
    let payload = DataUri::encode("image/png", &sample_png(64, 64));
    let mut store = HashMap::new();
    let mut content = String::from("# Gallery\n\n");
    for i in 0..100 {
        let id = format!("img-{}", i);
        content.push_str(&format!("Shot {} ![shot](attachment:{})\n", i, id));
        store.insert(id, payload.clone());
    }

    c.bench_function("hydrate_references", |b| {
        b.iter(|| hydrate_references(black_box(&content), &store));
    });
}

fn bench_compress_image(c: &mut Criterion) {
    let png = sample_png(2048, 1536);
    let options = CompressOptions::default();
    c.bench_function("compress_image", |b| {
        b.iter(|| compress(black_box(&png), &options).unwrap());
    });
}

criterion_group!(
    benches,
    // Rich path
    bench_convert_html,
    bench_assemble_docx,
    // Markup path
    bench_hydrate_references,
    bench_compress_image,
);
criterion_main!(benches);
