//! # prosedoc
//!
//! Export pipeline for a Markdown notes editor: turns the rendered preview of
//! a document into a Word (`.docx`) file, a self-contained Markdown file, or
//! a standalone HTML page.
//!
//! ## Features
//!
//! - Convert rendered HTML (or a prebuilt node tree) into structured blocks
//! - Assemble blocks into a WordprocessingML package with document-wide styles
//! - Resolve `attachment:<id>` image references against a per-document store
//! - Compress inserted images to bounded-width JPEG data URIs
//!
//! ## Quick Start
//!
//! ```
//! use prosedoc::attachments::NoAttachments;
//! use prosedoc::export::{Document, ExportFormat, ExportRequest, RenderedInput, export_document};
//! use prosedoc::ExportSettings;
//!
//! let document = Document::new("doc-1", "Welcome Note", "# Welcome\n\nHello.");
//! let request = ExportRequest::new(&document, &NoAttachments)
//!     .with_rendered(RenderedInput::Html("<h1>Welcome</h1><p>Hello.</p>"));
//!
//! let artifact = export_document(ExportFormat::Docx, &request, &ExportSettings::default())?;
//! assert_eq!(artifact.file_name, "welcome_note.docx");
//! # Ok::<(), prosedoc::Error>(())
//! ```
//!
//! ## Working with Blocks
//!
//! The converter and the assembler can be used separately:
//!
//! ```
//! use prosedoc::attachments::NoAttachments;
//! use prosedoc::convert::convert_html;
//! use prosedoc::docx::assemble;
//! use prosedoc::ExportSettings;
//!
//! let blocks = convert_html("<ul><li>a</li><li>b</li></ul>", &NoAttachments);
//! assert_eq!(blocks.len(), 2);
//! let bytes = assemble(&blocks, &ExportSettings::default())?;
//! assert!(!bytes.is_empty());
//! # Ok::<(), prosedoc::error::AssemblyError>(())
//! ```

pub mod attachments;
pub mod codec;
pub mod convert;
pub mod docx;
pub mod dom;
pub mod error;
pub mod export;
pub mod markdown;
pub mod model;
pub mod settings;
pub(crate) mod util;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use attachments::{AttachmentId, AttachmentResolver, AttachmentStore, DocumentAttachments};
pub use codec::{CompressOptions, CompressedImage, compress};
pub use error::{Error, Result};
pub use export::{ExportArtifact, ExportFormat, Exporter, export_document};
pub use model::{Block, TextRun};
pub use settings::ExportSettings;
pub use util::{DataUri, slugify_filename};
