//! Fixed and generated package parts around the document body.

use std::borrow::Cow;

use quick_xml::escape::escape;

use crate::model::ImageFormat;
use crate::settings::ExportSettings;

pub(super) const NS_W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub(super) const NS_R: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const REL_STYLES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
const REL_SETTINGS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/settings";
const REL_HYPERLINK: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";
const REL_IMAGE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

/// Escape text for element content or an attribute value.
///
/// Code points XML 1.0 does not allow (C0 controls other than tab, line feed
/// and carriage return, plus U+FFFE and U+FFFF) are dropped first; Word refuses
/// packages that contain them.
pub(super) fn xml_text(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_xml_char) {
        return escape(text);
    }
    let cleaned: String = text.chars().filter(|&c| is_xml_char(c)).collect();
    Cow::Owned(escape(cleaned.as_str()).into_owned())
}

fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

/// Heading sizes in points, index 0 is `Heading1`.
const HEADING_POINTS: [u32; 6] = [24, 18, 14, 12, 11, 11];

pub(super) const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>
  <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/>
</Relationships>
"#;

pub(super) const SETTINGS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:settings xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:defaultTabStop w:val="720"/>
  <w:characterSpacingControl w:val="doNotCompress"/>
  <w:compat>
    <w:compatSetting w:name="compatibilityMode" w:uri="http://schemas.microsoft.com/office/word" w:val="15"/>
  </w:compat>
</w:settings>
"#;

pub(super) const APP_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">
  <Application>prosedoc</Application>
  <DocSecurity>0</DocSecurity>
</Properties>
"#;

/// What a document relationship points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum RelationshipKind {
    Hyperlink,
    Image,
}

#[derive(Debug, Clone)]
pub(super) struct Relationship {
    pub id: String,
    pub kind: RelationshipKind,
    pub target: String,
}

/// `[Content_Types].xml`. Media defaults are listed only for formats present.
pub(super) fn content_types(formats: &[ImageFormat]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
"#,
    );
    let mut seen: Vec<ImageFormat> = Vec::new();
    for &format in formats {
        if seen.contains(&format) {
            continue;
        }
        seen.push(format);
        xml.push_str(&format!(
            "  <Default Extension=\"{}\" ContentType=\"{}\"/>\n",
            format.extension(),
            format.media_type()
        ));
    }
    xml.push_str(
        r#"  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
  <Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>
  <Override PartName="/word/settings.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.settings+xml"/>
  <Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
  <Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>
</Types>
"#,
    );
    xml
}

/// `word/_rels/document.xml.rels`. `rId1` and `rId2` are reserved for
/// styles and settings.
pub(super) fn document_rels(relationships: &[Relationship]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
"#,
    );
    xml.push_str(&format!(
        "  <Relationship Id=\"rId1\" Type=\"{}\" Target=\"styles.xml\"/>\n",
        REL_STYLES
    ));
    xml.push_str(&format!(
        "  <Relationship Id=\"rId2\" Type=\"{}\" Target=\"settings.xml\"/>\n",
        REL_SETTINGS
    ));
    for rel in relationships {
        match rel.kind {
            RelationshipKind::Hyperlink => xml.push_str(&format!(
                "  <Relationship Id=\"{}\" Type=\"{}\" Target=\"{}\" TargetMode=\"External\"/>\n",
                rel.id,
                REL_HYPERLINK,
                xml_text(&rel.target)
            )),
            RelationshipKind::Image => xml.push_str(&format!(
                "  <Relationship Id=\"{}\" Type=\"{}\" Target=\"{}\"/>\n",
                rel.id,
                REL_IMAGE,
                xml_text(&rel.target)
            )),
        }
    }
    xml.push_str("</Relationships>\n");
    xml
}

/// `word/styles.xml`: document defaults plus the heading styles.
pub(super) fn styles(settings: &ExportSettings) -> String {
    let font = xml_text(settings.font_family.name());
    let mut xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="{ns}">
  <w:docDefaults>
    <w:rPrDefault>
      <w:rPr>
        <w:rFonts w:ascii="{font}" w:hAnsi="{font}" w:eastAsia="{font}" w:cs="{font}"/>
        <w:sz w:val="{size}"/>
        <w:szCs w:val="{size}"/>
      </w:rPr>
    </w:rPrDefault>
    <w:pPrDefault>
      <w:pPr>
        <w:spacing w:after="0" w:line="{line}" w:lineRule="auto"/>
      </w:pPr>
    </w:pPrDefault>
  </w:docDefaults>
  <w:style w:type="paragraph" w:default="1" w:styleId="Normal">
    <w:name w:val="Normal"/>
    <w:qFormat/>
  </w:style>
"#,
        ns = NS_W,
        font = font,
        size = settings.font_size.half_points(),
        line = settings.line_spacing.line_value(),
    );

    for (index, points) in HEADING_POINTS.iter().enumerate() {
        let level = index + 1;
        xml.push_str(&format!(
            r#"  <w:style w:type="paragraph" w:styleId="Heading{level}">
    <w:name w:val="heading {level}"/>
    <w:basedOn w:val="Normal"/>
    <w:next w:val="Normal"/>
    <w:qFormat/>
    <w:pPr>
      <w:keepNext/>
      <w:spacing w:before="240" w:after="120"/>
      <w:outlineLvl w:val="{outline}"/>
    </w:pPr>
    <w:rPr>
      <w:b/>
      <w:color w:val="{color}"/>
      <w:sz w:val="{size}"/>
      <w:szCs w:val="{size}"/>
    </w:rPr>
  </w:style>
"#,
            level = level,
            outline = index,
            color = settings.heading_color.as_hex(),
            size = points * 2,
        ));
    }

    xml.push_str("</w:styles>\n");
    xml
}

/// `docProps/core.xml`.
pub(super) fn core_properties(title: &str, creator: &str) -> String {
    let title = xml_text(title);
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <dc:title>{title}</dc:title>
  <dc:creator>{creator}</dc:creator>
  <dc:description>Exported from {title}</dc:description>
  <cp:lastModifiedBy>{creator}</cp:lastModifiedBy>
</cp:coreProperties>
"#,
        title = title,
        creator = xml_text(creator),
    )
}
