//! Export orchestration.
//!
//! Provides the `Exporter` trait and one implementation per output format.
//!
//! # Architecture
//!
//! Exporters use a builder pattern:
//! - `new()` creates an exporter with default configuration
//! - `with_config()` allows customization
//! - `export()` reads one immutable [`ExportRequest`] and returns a complete
//!   [`ExportArtifact`], or an error and nothing else
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use prosedoc::export::{Document, ExportRequest, Exporter, MarkdownExporter, RenderedInput};
//!
//! let document = Document::new("doc-1", "Trip plan", "# Trip plan\n![map](attachment:img-1)");
//! let mut attachments = HashMap::new();
//! attachments.insert("img-1".to_string(), "data:image/png;base64,AA==".to_string());
//!
//! let request = ExportRequest::new(&document, &attachments);
//! let artifact = MarkdownExporter::new().export(&request)?;
//! assert_eq!(artifact.file_name, "trip_plan.md");
//! # Ok::<(), prosedoc::Error>(())
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::attachments::AttachmentResolver;
use crate::dom::RenderedTree;
use crate::error::{Error, Result};
use crate::settings::ExportSettings;
use crate::util::slugify_filename;

mod docx;
mod html;
mod markdown;

pub use docx::{DocxExportConfig, DocxExporter};
pub use html::{HtmlConfig, HtmlExporter};
pub use markdown::MarkdownExporter;

/// A snapshot of one document at the moment export was requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: String,
    pub title: String,
    /// Markdown source text.
    pub content: String,
}

impl Document {
    pub fn new(id: impl Into<String>, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
        }
    }
}

/// The rendered form of a document, as HTML or as an already-built tree.
#[derive(Debug, Clone, Copy)]
pub enum RenderedInput<'a> {
    Html(&'a str),
    Tree(&'a RenderedTree),
}

/// Everything one export reads. Nothing in it is modified.
#[derive(Clone, Copy)]
pub struct ExportRequest<'a> {
    pub document: &'a Document,
    /// Required by the formats that work from the rendered preview.
    pub rendered: Option<RenderedInput<'a>>,
    pub attachments: &'a dyn AttachmentResolver,
}

impl<'a> ExportRequest<'a> {
    pub fn new(document: &'a Document, attachments: &'a dyn AttachmentResolver) -> Self {
        Self {
            document,
            rendered: None,
            attachments,
        }
    }

    pub fn with_rendered(mut self, rendered: RenderedInput<'a>) -> Self {
        self.rendered = Some(rendered);
        self
    }

    fn rendered_for(&self, format: ExportFormat) -> Result<RenderedInput<'a>> {
        self.rendered.ok_or(Error::MissingRendered(format.name()))
    }
}

/// A finished export, ready to hand to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    /// Suggested file name: the slugified title plus extension.
    pub file_name: String,
    pub media_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    fn new(document: &Document, format: ExportFormat, bytes: Vec<u8>) -> Self {
        Self {
            file_name: format!("{}.{}", slugify_filename(&document.title), format.extension()),
            media_type: format.media_type(),
            bytes,
        }
    }

    /// Save under `dir`. The file only appears once fully written.
    pub fn write_to_dir(&self, dir: impl AsRef<Path>) -> io::Result<PathBuf> {
        let dir = dir.as_ref();
        let target = dir.join(&self.file_name);
        let partial = dir.join(format!(".{}.partial", self.file_name));

        if let Err(e) = fs::write(&partial, &self.bytes) {
            let _ = fs::remove_file(&partial);
            return Err(e);
        }
        fs::rename(&partial, &target)?;
        log::info!("wrote {} ({} bytes)", target.display(), self.bytes.len());
        Ok(target)
    }
}

/// Trait for exporting documents to a specific format.
pub trait Exporter {
    fn export(&self, request: &ExportRequest<'_>) -> Result<ExportArtifact>;
}

/// Output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Docx,
    Markdown,
    Html,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Docx => "docx",
            ExportFormat::Markdown => "md",
            ExportFormat::Html => "html",
        }
    }

    pub fn media_type(self) -> &'static str {
        match self {
            ExportFormat::Docx => crate::docx::DOCX_MEDIA_TYPE,
            ExportFormat::Markdown => "text/markdown",
            ExportFormat::Html => "text/html",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ExportFormat::Docx => "docx",
            ExportFormat::Markdown => "markdown",
            ExportFormat::Html => "html",
        }
    }

    /// Parse a format from its file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "docx" => Some(ExportFormat::Docx),
            "md" | "markdown" => Some(ExportFormat::Markdown),
            "html" | "htm" => Some(ExportFormat::Html),
            _ => None,
        }
    }
}

/// Export a document in the given format.
///
/// `settings` only affects the rich-document format.
pub fn export_document(
    format: ExportFormat,
    request: &ExportRequest<'_>,
    settings: &ExportSettings,
) -> Result<ExportArtifact> {
    log::info!(
        "exporting document {} as {}",
        request.document.id,
        format.name()
    );
    match format {
        ExportFormat::Docx => DocxExporter::new()
            .with_config(DocxExportConfig {
                settings: settings.clone(),
                ..Default::default()
            })
            .export(request),
        ExportFormat::Markdown => MarkdownExporter::new().export(request),
        ExportFormat::Html => HtmlExporter::new().export(request),
    }
}
