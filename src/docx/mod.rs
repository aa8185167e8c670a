//! WordprocessingML package writer.
//!
//! Turns a block sequence into a `.docx` file in one pass. Style settings are
//! applied document-wide: fonts, size, and line spacing live in the style
//! defaults, heading colour in the heading styles, margins in the section
//! properties.
//!
//! ```
//! use prosedoc::docx::{DocxAssembler, DocxConfig};
//! use prosedoc::model::{Block, TextRun};
//!
//! let blocks = vec![Block::Paragraph { runs: vec![TextRun::plain("Hello")] }];
//! let bytes = DocxAssembler::new(DocxConfig::default()).assemble(&blocks)?;
//! assert_eq!(&bytes[..2], b"PK");
//! # Ok::<(), prosedoc::error::AssemblyError>(())
//! ```

mod body;
mod parts;

use std::io::{Cursor, Seek, Write};

use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::AssemblyError;
use crate::model::Block;
use crate::settings::ExportSettings;

use self::body::BodyWriter;

pub use self::body::{PAGE_HEIGHT, PAGE_WIDTH};

/// Media type of the produced package.
pub const DOCX_MEDIA_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Configuration for one assembled document.
#[derive(Debug, Clone)]
pub struct DocxConfig {
    pub settings: ExportSettings,
    /// Written to the core properties.
    pub title: String,
    pub creator: String,
    /// Deflate level (0-9, default 6).
    pub compression_level: Option<u32>,
}

impl Default for DocxConfig {
    fn default() -> Self {
        Self {
            settings: ExportSettings::default(),
            title: "Untitled".to_string(),
            creator: "prosedoc".to_string(),
            compression_level: None,
        }
    }
}

impl DocxConfig {
    pub fn with_settings(mut self, settings: ExportSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_creator(mut self, creator: impl Into<String>) -> Self {
        self.creator = creator.into();
        self
    }
}

/// Serializes blocks into a `.docx` package.
#[derive(Debug, Clone, Default)]
pub struct DocxAssembler {
    config: DocxConfig,
}

impl DocxAssembler {
    pub fn new(config: DocxConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DocxConfig {
        &self.config
    }

    /// Build the whole package in memory. Either the complete file comes
    /// back or an error does.
    pub fn assemble(&self, blocks: &[Block]) -> Result<Vec<u8>, AssemblyError> {
        let mut cursor = Cursor::new(Vec::new());
        self.write_to(blocks, &mut cursor)?;
        Ok(cursor.into_inner())
    }

    /// Write the package to any seekable writer.
    pub fn write_to<W: Write + Seek>(
        &self,
        blocks: &[Block],
        writer: &mut W,
    ) -> Result<(), AssemblyError> {
        let config = &self.config;
        let body = BodyWriter::new(&config.settings).write_blocks(blocks);
        log::debug!(
            "assembling {} blocks into {} bytes of document XML, {} media parts",
            blocks.len(),
            body.document_xml.len(),
            body.media.len()
        );

        let mut zip = ZipWriter::new(writer);
        let compression_level = config.compression_level.unwrap_or(6).min(9);
        let deflated = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(compression_level as i64));
        // Already-compressed media gains nothing from deflate
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

        let formats: Vec<_> = body.media.iter().map(|m| m.format).collect();
        zip.start_file("[Content_Types].xml", deflated)?;
        zip.write_all(parts::content_types(&formats).as_bytes())?;

        zip.start_file("_rels/.rels", deflated)?;
        zip.write_all(parts::ROOT_RELS.as_bytes())?;

        zip.start_file("word/document.xml", deflated)?;
        zip.write_all(body.document_xml.as_bytes())?;

        zip.start_file("word/styles.xml", deflated)?;
        zip.write_all(parts::styles(&config.settings).as_bytes())?;

        zip.start_file("word/settings.xml", deflated)?;
        zip.write_all(parts::SETTINGS_XML.as_bytes())?;

        zip.start_file("word/_rels/document.xml.rels", deflated)?;
        zip.write_all(parts::document_rels(&body.relationships).as_bytes())?;

        for media in &body.media {
            zip.start_file(media.path.as_str(), stored)?;
            zip.write_all(&media.data)?;
        }

        zip.start_file("docProps/core.xml", deflated)?;
        zip.write_all(parts::core_properties(&config.title, &config.creator).as_bytes())?;

        zip.start_file("docProps/app.xml", deflated)?;
        zip.write_all(parts::APP_XML.as_bytes())?;

        zip.finish()?;
        Ok(())
    }
}

/// Assemble with default metadata.
pub fn assemble(blocks: &[Block], settings: &ExportSettings) -> Result<Vec<u8>, AssemblyError> {
    DocxAssembler::new(DocxConfig::default().with_settings(settings.clone())).assemble(blocks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    use crate::model::{ImageBlock, ImageFormat, TextRun};

    fn read_entry(bytes: &[u8], name: &str) -> Vec<u8> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut out = Vec::new();
        file.read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn test_package_parts() {
        let bytes = assemble(
            &[Block::Paragraph {
                runs: vec![TextRun::plain("hi")],
            }],
            &ExportSettings::default(),
        )
        .unwrap();
        let archive = zip::ZipArchive::new(Cursor::new(&bytes)).unwrap();
        let names: Vec<_> = archive.file_names().collect();
        for part in [
            "[Content_Types].xml",
            "_rels/.rels",
            "word/document.xml",
            "word/styles.xml",
            "word/settings.xml",
            "word/_rels/document.xml.rels",
            "docProps/core.xml",
            "docProps/app.xml",
        ] {
            assert!(names.contains(&part), "missing {}", part);
        }
    }

    #[test]
    fn test_media_stored_verbatim() {
        let data = vec![0x89, b'P', b'N', b'G', 1, 2, 3];
        let image = ImageBlock {
            data: data.clone(),
            format: ImageFormat::Png,
            width: 10,
            height: 10,
        };
        let bytes = DocxAssembler::default()
            .assemble(&[Block::Image(image)])
            .unwrap();
        assert_eq!(read_entry(&bytes, "word/media/image1.png"), data);
        let rels = String::from_utf8(read_entry(&bytes, "word/_rels/document.xml.rels")).unwrap();
        assert!(rels.contains(r#"Target="media/image1.png""#));
        let types = String::from_utf8(read_entry(&bytes, "[Content_Types].xml")).unwrap();
        assert!(types.contains(r#"Extension="png""#));
    }

    #[test]
    fn test_core_properties_use_title() {
        let config = DocxConfig::default()
            .with_title("Weekly notes")
            .with_creator("alex");
        let bytes = DocxAssembler::new(config).assemble(&[]).unwrap();
        let core = String::from_utf8(read_entry(&bytes, "docProps/core.xml")).unwrap();
        assert!(core.contains("<dc:title>Weekly notes</dc:title>"));
        assert!(core.contains("<dc:creator>alex</dc:creator>"));
        assert!(core.contains("Exported from Weekly notes"));
    }

    #[test]
    fn test_assembly_is_deterministic() {
        let blocks = vec![Block::Rule, Block::Paragraph {
            runs: vec![TextRun::plain("same")],
        }];
        let a = assemble(&blocks, &ExportSettings::default()).unwrap();
        let b = assemble(&blocks, &ExportSettings::default()).unwrap();
        assert_eq!(a, b);
    }
}
