//! WASM bindings for in-browser export.
//!
//! This module exposes the export pipeline to JavaScript via wasm-bindgen.
//! Attachments cross the boundary as a JSON object of id → data URI, and
//! settings as the camelCase settings object.

use std::collections::HashMap;

use wasm_bindgen::prelude::*;

use crate::codec::compress_to_data_uri;
use crate::export::{Document, DocxExportConfig, DocxExporter, ExportRequest, Exporter, RenderedInput};
use crate::markdown::hydrate_references;
use crate::settings::ExportSettings;

/// Initialize panic hook for better error messages in the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "wasm")]
    console_error_panic_hook::set_once();
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn parse_attachments(json: &str) -> Result<HashMap<String, String>, JsValue> {
    if json.trim().is_empty() {
        return Ok(HashMap::new());
    }
    serde_json::from_str(json).map_err(js_error)
}

/// Export rendered preview HTML as DOCX bytes.
#[wasm_bindgen]
pub fn export_docx(
    html: &str,
    title: &str,
    attachments_json: &str,
    settings_json: &str,
) -> Result<Vec<u8>, JsValue> {
    let settings = if settings_json.trim().is_empty() {
        ExportSettings::default()
    } else {
        ExportSettings::from_json(settings_json).map_err(js_error)?
    };
    let attachments = parse_attachments(attachments_json)?;

    let document = Document::new("", title, "");
    let request =
        ExportRequest::new(&document, &attachments).with_rendered(RenderedInput::Html(html));
    let exporter = DocxExporter::new().with_config(DocxExportConfig {
        settings,
        ..Default::default()
    });
    let artifact = exporter.export(&request).map_err(js_error)?;
    Ok(artifact.bytes)
}

/// Export Markdown source with attachment references made self-contained.
#[wasm_bindgen]
pub fn export_markdown(content: &str, attachments_json: &str) -> Result<String, JsValue> {
    let attachments = parse_attachments(attachments_json)?;
    Ok(hydrate_references(content, &attachments))
}

/// Compress an uploaded image to a JPEG data URI.
#[wasm_bindgen]
pub fn compress_image(data: &[u8]) -> Result<String, JsValue> {
    compress_to_data_uri(data).map_err(js_error)
}
