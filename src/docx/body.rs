//! Serializes blocks into the `w:body` of `word/document.xml`.

use std::collections::HashMap;

use crate::model::{Block, ImageBlock, ImageFormat, PlaceholderReason, TableCell, TextRun};
use crate::settings::ExportSettings;

use super::parts::{NS_R, NS_W, Relationship, RelationshipKind, xml_text};

/// A4 page size in twips.
pub const PAGE_WIDTH: u32 = 11906;
pub const PAGE_HEIGHT: u32 = 16838;

const EMU_PER_PIXEL: u64 = 9525;
const EMU_PER_TWIP: u64 = 635;

const CODE_FONT: &str = "Consolas";
const CODE_BLOCK_SIZE: u32 = 20;
const CODE_BLOCK_FILL: &str = "282C34";
const CODE_BLOCK_TEXT: &str = "ABB2BF";
const INLINE_CODE_FILL: &str = "F5F5F5";
const QUOTE_COLOR: &str = "666666";
const HEADER_FILL: &str = "F0F0F0";
const RULE_COLOR: &str = "CCCCCC";

/// An image file to store under `word/media/`.
#[derive(Debug)]
pub(super) struct MediaPart {
    pub path: String,
    pub format: ImageFormat,
    pub data: Vec<u8>,
}

/// Everything the package needs besides the fixed parts.
#[derive(Debug)]
pub(super) struct RenderedBody {
    pub document_xml: String,
    pub relationships: Vec<Relationship>,
    pub media: Vec<MediaPart>,
}

pub(super) struct BodyWriter<'a> {
    settings: &'a ExportSettings,
    xml: String,
    relationships: Vec<Relationship>,
    hyperlinks: HashMap<String, String>,
    media: Vec<MediaPart>,
}

impl<'a> BodyWriter<'a> {
    pub fn new(settings: &'a ExportSettings) -> Self {
        Self {
            settings,
            xml: String::new(),
            relationships: Vec::new(),
            hyperlinks: HashMap::new(),
            media: Vec::new(),
        }
    }

    /// Serialize all blocks. Consecutive table rows are grouped into tables.
    pub fn write_blocks(mut self, blocks: &[Block]) -> RenderedBody {
        let mut i = 0;
        while i < blocks.len() {
            if let Block::TableRow { .. } = &blocks[i] {
                let end = table_end(blocks, i);
                self.table(&blocks[i..end]);
                i = end;
                continue;
            }
            self.block(&blocks[i]);
            i += 1;
        }
        self.finish()
    }

    fn finish(self) -> RenderedBody {
        let margin = self.settings.margins.twips();
        let document_xml = format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                "\n",
                r#"<w:document xmlns:w="{w}" xmlns:r="{r}" "#,
                r#"xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" "#,
                r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
                r#"xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture">"#,
                "<w:body>{body}",
                r#"<w:sectPr><w:pgSz w:w="{pw}" w:h="{ph}"/>"#,
                r#"<w:pgMar w:top="{m}" w:right="{m}" w:bottom="{m}" w:left="{m}" w:header="708" w:footer="708" w:gutter="0"/>"#,
                "</w:sectPr></w:body></w:document>\n"
            ),
            w = NS_W,
            r = NS_R,
            body = self.xml,
            pw = PAGE_WIDTH,
            ph = PAGE_HEIGHT,
            m = margin,
        );
        RenderedBody {
            document_xml,
            relationships: self.relationships,
            media: self.media,
        }
    }

    fn content_width_twips(&self) -> u32 {
        PAGE_WIDTH.saturating_sub(2 * self.settings.margins.twips())
    }

    fn content_height_twips(&self) -> u32 {
        PAGE_HEIGHT.saturating_sub(2 * self.settings.margins.twips())
    }

    fn block(&mut self, block: &Block) {
        match block {
            Block::Paragraph { runs } => {
                self.xml.push_str(r#"<w:p><w:pPr><w:spacing w:after="200"/></w:pPr>"#);
                self.runs(runs, &RunStyle::default());
                self.xml.push_str("</w:p>");
            }
            Block::Heading { level, runs } => {
                self.xml.push_str(&format!(
                    r#"<w:p><w:pPr><w:pStyle w:val="Heading{}"/><w:spacing w:before="240" w:after="120"/></w:pPr>"#,
                    level.get()
                ));
                self.runs(runs, &RunStyle::default());
                self.xml.push_str("</w:p>");
            }
            Block::CodeBlock { text } => self.code_block(text),
            Block::Blockquote { text } => {
                self.xml.push_str(&format!(
                    concat!(
                        "<w:p><w:pPr><w:pBdr>",
                        r#"<w:left w:val="single" w:sz="12" w:space="8" w:color="{}"/>"#,
                        r#"</w:pBdr><w:spacing w:after="200"/><w:ind w:left="720"/></w:pPr>"#
                    ),
                    self.settings.heading_color.as_hex()
                ));
                let style = RunStyle {
                    italic: true,
                    color: Some(QUOTE_COLOR),
                    ..Default::default()
                };
                self.text_run(text, &style);
                self.xml.push_str("</w:p>");
            }
            Block::ListItem {
                ordered,
                index,
                runs,
            } => {
                self.xml.push_str(
                    r#"<w:p><w:pPr><w:spacing w:after="100"/><w:ind w:left="360"/></w:pPr>"#,
                );
                self.text_run(&Block::list_prefix(*ordered, *index), &RunStyle::default());
                self.runs(runs, &RunStyle::default());
                self.xml.push_str("</w:p>");
            }
            Block::TableRow { .. } => self.table(std::slice::from_ref(block)),
            Block::Image(image) => self.image(image),
            Block::Rule => self.xml.push_str(concat!(
                "<w:p><w:pPr><w:pBdr>",
                r#"<w:bottom w:val="single" w:sz="6" w:space="1" w:color="CCCCCC"/>"#,
                r#"</w:pBdr><w:spacing w:after="200"/></w:pPr></w:p>"#
            )),
            Block::Placeholder { reason, snippet } => self.placeholder(*reason, snippet.as_deref()),
        }
    }

    fn code_block(&mut self, text: &str) {
        self.xml.push_str(&format!(
            r#"<w:p><w:pPr><w:shd w:val="clear" w:color="auto" w:fill="{}"/><w:spacing w:after="200"/></w:pPr>"#,
            CODE_BLOCK_FILL
        ));
        let style = RunStyle {
            font: Some(CODE_FONT),
            size: Some(CODE_BLOCK_SIZE),
            color: Some(CODE_BLOCK_TEXT),
            ..Default::default()
        };
        let text = text.trim_end_matches('\n');
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                self.xml.push_str("<w:r><w:br/></w:r>");
            }
            if !line.is_empty() {
                self.text_run(line, &style);
            }
        }
        self.xml.push_str("</w:p>");
    }

    fn placeholder(&mut self, reason: PlaceholderReason, snippet: Option<&str>) {
        let color = match reason {
            PlaceholderReason::DiagramUnsupported => QUOTE_COLOR,
            PlaceholderReason::ImageFailed | PlaceholderReason::ImageMissing => "999999",
        };
        self.xml.push_str("<w:p><w:pPr><w:pBdr>");
        for side in ["top", "left", "bottom", "right"] {
            self.xml.push_str(&format!(
                r#"<w:{} w:val="dashed" w:sz="4" w:space="4" w:color="{}"/>"#,
                side, RULE_COLOR
            ));
        }
        self.xml
            .push_str(r#"</w:pBdr><w:spacing w:before="200" w:after="200"/><w:jc w:val="center"/></w:pPr>"#);
        let style = RunStyle {
            italic: true,
            color: Some(color),
            ..Default::default()
        };
        self.text_run(reason.message(), &style);
        if let Some(snippet) = snippet {
            let code = RunStyle {
                font: Some(CODE_FONT),
                color: Some(color),
                ..Default::default()
            };
            for line in snippet.split('\n') {
                self.xml.push_str("<w:r><w:br/></w:r>");
                self.text_run(line, &code);
            }
        }
        self.xml.push_str("</w:p>");
    }

    fn table(&mut self, rows: &[Block]) {
        let rows: Vec<&[TableCell]> = rows
            .iter()
            .filter_map(|block| match block {
                Block::TableRow { cells, .. } => Some(cells.as_slice()),
                _ => None,
            })
            .collect();
        let columns = rows.iter().map(|cells| cells.len()).max().unwrap_or(0);
        if columns == 0 {
            return;
        }
        let column_width = self.content_width_twips() / columns as u32;

        self.xml.push_str(r#"<w:tbl><w:tblPr><w:tblW w:w="5000" w:type="pct"/><w:tblBorders>"#);
        for side in ["top", "left", "bottom", "right", "insideH", "insideV"] {
            self.xml.push_str(&format!(
                r#"<w:{} w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#,
                side
            ));
        }
        self.xml.push_str("</w:tblBorders></w:tblPr><w:tblGrid>");
        for _ in 0..columns {
            self.xml
                .push_str(&format!(r#"<w:gridCol w:w="{}"/>"#, column_width));
        }
        self.xml.push_str("</w:tblGrid>");

        for cells in rows {
            self.xml.push_str("<w:tr>");
            // Rows keep their own cell count; the grid follows the widest row
            for cell in cells {
                self.cell(cell, column_width);
            }
            self.xml.push_str("</w:tr>");
        }
        self.xml.push_str("</w:tbl><w:p/>");
    }

    fn cell(&mut self, cell: &TableCell, width: u32) {
        self.xml.push_str(&format!(
            r#"<w:tc><w:tcPr><w:tcW w:w="{}" w:type="dxa"/>"#,
            width
        ));
        if cell.header {
            self.xml.push_str(&format!(
                r#"<w:shd w:val="clear" w:color="auto" w:fill="{}"/>"#,
                HEADER_FILL
            ));
        }
        self.xml.push_str("</w:tcPr><w:p>");
        let style = RunStyle {
            bold: cell.header,
            ..Default::default()
        };
        self.runs(&cell.runs, &style);
        self.xml.push_str("</w:p></w:tc>");
    }

    fn image(&mut self, image: &ImageBlock) {
        let number = self.media.len() + 1;
        let file_name = format!("image{}.{}", number, image.format.extension());
        let rel_id = self.add_relationship(RelationshipKind::Image, format!("media/{}", file_name));

        let (cx, cy) = self.image_extent(image.width, image.height);
        self.xml.push_str(&format!(
            concat!(
                r#"<w:p><w:pPr><w:spacing w:after="200"/><w:jc w:val="center"/></w:pPr><w:r><w:drawing>"#,
                r#"<wp:inline distT="0" distB="0" distL="0" distR="0">"#,
                r#"<wp:extent cx="{cx}" cy="{cy}"/>"#,
                r#"<wp:docPr id="{n}" name="Picture {n}"/>"#,
                r#"<wp:cNvGraphicFramePr><a:graphicFrameLocks noChangeAspect="1"/></wp:cNvGraphicFramePr>"#,
                r#"<a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture">"#,
                r#"<pic:pic><pic:nvPicPr><pic:cNvPr id="{n}" name="{file}"/><pic:cNvPicPr/></pic:nvPicPr>"#,
                r#"<pic:blipFill><a:blip r:embed="{rel}"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>"#,
                r#"<pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>"#,
                r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr></pic:pic>"#,
                "</a:graphicData></a:graphic></wp:inline></w:drawing></w:r></w:p>"
            ),
            cx = cx,
            cy = cy,
            n = number,
            file = file_name,
            rel = rel_id,
        ));

        self.media.push(MediaPart {
            path: format!("word/media/{}", file_name),
            format: image.format,
            data: image.data.clone(),
        });
    }

    /// Display extent in EMU, scaled down to fit between the margins.
    ///
    /// Both sides are bounded by the content box, which keeps every extent
    /// far below the DrawingML coordinate limit.
    fn image_extent(&self, width: u32, height: u32) -> (u64, u64) {
        let cx = width.max(1) as u64 * EMU_PER_PIXEL;
        let cy = height.max(1) as u64 * EMU_PER_PIXEL;
        let max_cx = self.content_width_twips() as u64 * EMU_PER_TWIP;
        let max_cy = self.content_height_twips() as u64 * EMU_PER_TWIP;
        if cx <= max_cx && cy <= max_cy {
            return (cx, cy);
        }
        let scale = (max_cx as f64 / cx as f64).min(max_cy as f64 / cy as f64);
        let fit = |value: u64, max: u64| ((value as f64 * scale).round() as u64).clamp(1, max);
        (fit(cx, max_cx), fit(cy, max_cy))
    }

    fn runs(&mut self, runs: &[TextRun], base: &RunStyle) {
        for run in runs {
            if run.is_line_break() {
                self.xml.push_str("<w:r><w:br/></w:r>");
                continue;
            }
            let mut style = RunStyle {
                bold: base.bold || run.bold,
                italic: base.italic || run.italic,
                ..*base
            };
            if run.code {
                style.font = Some(CODE_FONT);
                style.size = Some(self.settings.font_size.points().saturating_sub(1) * 2);
                style.fill = Some(INLINE_CODE_FILL);
            }
            match &run.hyperlink {
                Some(href) => {
                    let rel_id = self.hyperlink(href);
                    let color = self.settings.heading_color.as_hex().to_string();
                    self.xml.push_str(&format!(r#"<w:hyperlink r:id="{}">"#, rel_id));
                    let link = RunStyle {
                        underline: true,
                        ..style
                    };
                    self.styled_run(&run.text, &link, Some(&color));
                    self.xml.push_str("</w:hyperlink>");
                }
                None => self.text_run(&run.text, &style),
            }
        }
    }

    fn text_run(&mut self, text: &str, style: &RunStyle) {
        self.styled_run(text, style, None);
    }

    fn styled_run(&mut self, text: &str, style: &RunStyle, color_override: Option<&str>) {
        self.xml.push_str("<w:r>");
        let properties = style.properties(color_override);
        if !properties.is_empty() {
            self.xml.push_str("<w:rPr>");
            self.xml.push_str(&properties);
            self.xml.push_str("</w:rPr>");
        }
        self.xml.push_str(r#"<w:t xml:space="preserve">"#);
        self.xml.push_str(&xml_text(text));
        self.xml.push_str("</w:t></w:r>");
    }

    fn hyperlink(&mut self, href: &str) -> String {
        if let Some(id) = self.hyperlinks.get(href) {
            return id.clone();
        }
        let id = self.add_relationship(RelationshipKind::Hyperlink, href.to_string());
        self.hyperlinks.insert(href.to_string(), id.clone());
        id
    }

    fn add_relationship(&mut self, kind: RelationshipKind, target: String) -> String {
        // rId1 and rId2 belong to styles and settings
        let id = format!("rId{}", self.relationships.len() + 3);
        self.relationships.push(Relationship {
            id: id.clone(),
            kind,
            target,
        });
        id
    }
}

/// End index (exclusive) of the table starting at `start`.
fn table_end(blocks: &[Block], start: usize) -> usize {
    let mut end = start + 1;
    while let Some(Block::TableRow { first_in_table, .. }) = blocks.get(end) {
        if *first_in_table {
            break;
        }
        end += 1;
    }
    end
}

/// Character formatting for one `w:r`.
#[derive(Debug, Clone, Copy, Default)]
struct RunStyle {
    bold: bool,
    italic: bool,
    underline: bool,
    font: Option<&'static str>,
    size: Option<u32>,
    color: Option<&'static str>,
    fill: Option<&'static str>,
}

impl RunStyle {
    /// `w:rPr` children in schema order.
    fn properties(&self, color_override: Option<&str>) -> String {
        let mut xml = String::new();
        if let Some(font) = self.font {
            xml.push_str(&format!(
                r#"<w:rFonts w:ascii="{0}" w:hAnsi="{0}" w:cs="{0}"/>"#,
                font
            ));
        }
        if self.bold {
            xml.push_str("<w:b/>");
        }
        if self.italic {
            xml.push_str("<w:i/>");
        }
        if let Some(color) = color_override.or(self.color) {
            xml.push_str(&format!(r#"<w:color w:val="{}"/>"#, color));
        }
        if let Some(size) = self.size {
            xml.push_str(&format!(r#"<w:sz w:val="{0}"/><w:szCs w:val="{0}"/>"#, size));
        }
        if self.underline {
            xml.push_str(r#"<w:u w:val="single"/>"#);
        }
        if let Some(fill) = self.fill {
            xml.push_str(&format!(
                r#"<w:shd w:val="clear" w:color="auto" w:fill="{}"/>"#,
                fill
            ));
        }
        xml
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HeadingLevel;
    use crate::settings::MarginPreset;

    fn render(blocks: &[Block]) -> RenderedBody {
        BodyWriter::new(&ExportSettings::default()).write_blocks(blocks)
    }

    fn row(first: bool, n: usize) -> Block {
        Block::TableRow {
            cells: (0..n)
                .map(|i| TableCell {
                    runs: vec![TextRun::plain(i.to_string())],
                    header: first,
                })
                .collect(),
            first_in_table: first,
        }
    }

    #[test]
    fn test_table_grouping() {
        let blocks = vec![
            row(true, 2),
            row(false, 3),
            Block::Rule,
            row(true, 1),
            row(true, 1),
        ];
        let body = render(&blocks);
        let xml = &body.document_xml;
        assert_eq!(xml.matches("<w:tbl>").count(), 3);
        assert_eq!(xml.matches(r#"<w:gridCol "#).count(), 3 + 1 + 1);
        // the short header row is not padded out to the grid
        assert_eq!(xml.matches("<w:tc>").count(), 2 + 3 + 1 + 1);
        assert_eq!(xml.matches(HEADER_FILL).count(), 2 + 1 + 1);
    }

    #[test]
    fn test_table_end() {
        let blocks = vec![row(true, 1), row(false, 1), row(true, 1), Block::Rule];
        assert_eq!(table_end(&blocks, 0), 2);
        assert_eq!(table_end(&blocks, 2), 3);
    }

    #[test]
    fn test_hyperlinks_share_relationships() {
        let link = TextRun {
            text: "docs".to_string(),
            hyperlink: Some("https://x.dev".to_string()),
            ..Default::default()
        };
        let body = render(&[
            Block::Paragraph {
                runs: vec![link.clone()],
            },
            Block::Heading {
                level: HeadingLevel::clamped(2),
                runs: vec![link],
            },
        ]);
        assert_eq!(body.relationships.len(), 1);
        assert_eq!(body.relationships[0].id, "rId3");
        assert_eq!(body.document_xml.matches(r#"<w:hyperlink r:id="rId3">"#).count(), 2);
        assert!(body.document_xml.contains(r#"<w:u w:val="single"/>"#));
    }

    #[test]
    fn test_inline_code_size() {
        let body = render(&[Block::Paragraph {
            runs: vec![TextRun {
                text: "x".to_string(),
                code: true,
                ..Default::default()
            }],
        }]);
        assert!(body.document_xml.contains(r#"<w:sz w:val="20"/>"#));
        assert!(body.document_xml.contains(INLINE_CODE_FILL));
    }

    #[test]
    fn test_image_scaled_to_content_width() {
        let settings = ExportSettings::default();
        let writer = BodyWriter::new(&settings);
        // normal margins leave 11906 - 2880 twips
        let max = (11906 - 2880) as u64 * EMU_PER_TWIP;
        assert_eq!(writer.image_extent(400, 300), (400 * 9525, 300 * 9525));
        let (cx, cy) = writer.image_extent(4000, 2000);
        assert_eq!(cx, max);
        assert_eq!(cy, (max as f64 / 2.0).round() as u64);
    }

    #[test]
    fn test_tall_image_fits_content_height() {
        let settings = ExportSettings::default();
        let writer = BodyWriter::new(&settings);
        let max_cx = (11906 - 2880) as u64 * EMU_PER_TWIP;
        let max_cy = (16838 - 2880) as u64 * EMU_PER_TWIP;

        let (cx, cy) = writer.image_extent(100, 4000);
        assert_eq!(cy, max_cy);
        assert!(cx >= 1 && cx < max_cx);

        let (cx, cy) = writer.image_extent(u32::MAX, u32::MAX);
        assert!(cx <= max_cx && cy <= max_cy);
        let (cx, cy) = writer.image_extent(1, u32::MAX);
        assert_eq!((cx, cy), (1, max_cy));
    }

    #[test]
    fn test_margins_in_section() {
        let settings = ExportSettings {
            margins: MarginPreset::Narrow,
            ..Default::default()
        };
        let body = BodyWriter::new(&settings).write_blocks(&[]);
        assert!(body.document_xml.contains(r#"w:top="720" w:right="720" w:bottom="720" w:left="720""#));
        assert!(body.document_xml.contains(r#"<w:pgSz w:w="11906" w:h="16838"/>"#));
    }

    #[test]
    fn test_text_is_escaped() {
        let body = render(&[Block::CodeBlock {
            text: "a < b && c\nnext\n".to_string(),
        }]);
        assert!(body.document_xml.contains("a &lt; b &amp;&amp; c"));
        assert_eq!(body.document_xml.matches("<w:br/>").count(), 1);
    }
}
