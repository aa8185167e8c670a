//! DOCX exporter.
//!
//! Converts the rendered document to blocks and assembles them into a
//! WordprocessingML package.

use crate::convert::convert;
use crate::docx::{DocxAssembler, DocxConfig};
use crate::dom::RenderedTree;
use crate::error::Result;
use crate::settings::ExportSettings;

use super::{ExportArtifact, ExportFormat, ExportRequest, Exporter, RenderedInput};

/// Configuration for DOCX export.
#[derive(Debug, Clone)]
pub struct DocxExportConfig {
    pub settings: ExportSettings,
    /// Author recorded in the document properties.
    pub creator: String,
    /// Compression level for deflate (0-9, default 6).
    pub compression_level: Option<u32>,
}

impl Default for DocxExportConfig {
    fn default() -> Self {
        Self {
            settings: ExportSettings::default(),
            creator: "prosedoc".to_string(),
            compression_level: None,
        }
    }
}

/// Rich-document exporter.
///
/// # Example
///
/// ```
/// use prosedoc::attachments::NoAttachments;
/// use prosedoc::export::{Document, DocxExporter, ExportRequest, Exporter, RenderedInput};
///
/// let document = Document::new("d1", "Notes", "# Notes");
/// let request = ExportRequest::new(&document, &NoAttachments)
///     .with_rendered(RenderedInput::Html("<h1>Notes</h1>"));
/// let artifact = DocxExporter::new().export(&request)?;
/// assert_eq!(artifact.file_name, "notes.docx");
/// # Ok::<(), prosedoc::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct DocxExporter {
    config: DocxExportConfig,
}

impl DocxExporter {
    /// Create a new exporter with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the exporter with custom settings.
    pub fn with_config(mut self, config: DocxExportConfig) -> Self {
        self.config = config;
        self
    }

    /// Parse settings from their JSON form. Invalid settings fail here,
    /// before any document is read.
    pub fn with_settings_json(mut self, json: &str) -> Result<Self> {
        self.config.settings = ExportSettings::from_json(json)?;
        Ok(self)
    }
}

impl Exporter for DocxExporter {
    fn export(&self, request: &ExportRequest<'_>) -> Result<ExportArtifact> {
        let parsed;
        let tree = match request.rendered_for(ExportFormat::Docx)? {
            RenderedInput::Tree(tree) => tree,
            RenderedInput::Html(html) => {
                parsed = RenderedTree::parse_html(html);
                &parsed
            }
        };

        let blocks = convert(tree, tree.body(), request.attachments);
        log::debug!(
            "document {} converted to {} blocks",
            request.document.id,
            blocks.len()
        );

        let config = DocxConfig {
            settings: self.config.settings.clone(),
            title: request.document.title.clone(),
            creator: self.config.creator.clone(),
            compression_level: self.config.compression_level,
        };
        let bytes = DocxAssembler::new(config).assemble(&blocks)?;

        Ok(ExportArtifact::new(request.document, ExportFormat::Docx, bytes))
    }
}
