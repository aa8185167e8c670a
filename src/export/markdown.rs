//! Markdown exporter.

use crate::error::Result;
use crate::markdown::hydrate_references;

use super::{ExportArtifact, ExportFormat, ExportRequest, Exporter};

/// Plain-markup exporter.
///
/// Emits the source text with attachment images rewritten as reference
/// links and their payloads appended, so the file stands on its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownExporter;

impl MarkdownExporter {
    pub fn new() -> Self {
        Self
    }
}

impl Exporter for MarkdownExporter {
    fn export(&self, request: &ExportRequest<'_>) -> Result<ExportArtifact> {
        let text = hydrate_references(&request.document.content, request.attachments);
        Ok(ExportArtifact::new(
            request.document,
            ExportFormat::Markdown,
            text.into_bytes(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::export::Document;

    #[test]
    fn test_markdown_export_hydrates() {
        let document = Document::new("d", "Shots", "![a](attachment:img-1)");
        let mut store = HashMap::new();
        store.insert("img-1".to_string(), "data:x".to_string());

        let artifact = MarkdownExporter::new()
            .export(&ExportRequest::new(&document, &store))
            .unwrap();
        assert_eq!(artifact.media_type, "text/markdown");
        assert_eq!(
            String::from_utf8(artifact.bytes).unwrap(),
            "![a][img-1]\n\n[img-1]: data:x\n"
        );
        assert_eq!(document.content, "![a](attachment:img-1)");
    }
}
