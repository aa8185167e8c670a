//! Export style settings.
//!
//! Settings arrive as the flat camelCase object the settings surface persists:
//!
//! ```json
//! { "fontFamily": "Georgia", "fontSize": 12, "headingColor": "#2E74B5",
//!   "margins": "wide", "lineSpacing": 1.5 }
//! ```
//!
//! Missing keys take their defaults. A key that is present with a value
//! outside the recognized set is a [`ConfigError`]; nothing is substituted.
//! Unknown keys are rejected too, so a misspelled key cannot silently fall
//! back to its default.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Font families offered for rich-document export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontFamily {
    #[default]
    Calibri,
    Arial,
    TimesNewRoman,
    Georgia,
}

impl FontFamily {
    pub fn name(self) -> &'static str {
        match self {
            FontFamily::Calibri => "Calibri",
            FontFamily::Arial => "Arial",
            FontFamily::TimesNewRoman => "Times New Roman",
            FontFamily::Georgia => "Georgia",
        }
    }

    fn parse(name: &str) -> Result<Self, ConfigError> {
        match name {
            "Calibri" => Ok(FontFamily::Calibri),
            "Arial" => Ok(FontFamily::Arial),
            "Times New Roman" => Ok(FontFamily::TimesNewRoman),
            "Georgia" => Ok(FontFamily::Georgia),
            other => Err(ConfigError::FontFamily(other.to_string())),
        }
    }
}

/// Body font sizes in points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontSize {
    Pt10,
    #[default]
    Pt11,
    Pt12,
    Pt14,
}

impl FontSize {
    pub fn points(self) -> u32 {
        match self {
            FontSize::Pt10 => 10,
            FontSize::Pt11 => 11,
            FontSize::Pt12 => 12,
            FontSize::Pt14 => 14,
        }
    }

    /// Size in half-points, the unit WordprocessingML uses for `w:sz`.
    pub fn half_points(self) -> u32 {
        self.points() * 2
    }

    fn parse(value: f64) -> Result<Self, ConfigError> {
        match value {
            v if v == 10.0 => Ok(FontSize::Pt10),
            v if v == 11.0 => Ok(FontSize::Pt11),
            v if v == 12.0 => Ok(FontSize::Pt12),
            v if v == 14.0 => Ok(FontSize::Pt14),
            other => Err(ConfigError::FontSize(other)),
        }
    }
}

/// Named page-margin configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarginPreset {
    Narrow,
    #[default]
    Normal,
    Wide,
}

impl MarginPreset {
    /// Margin on every side, in twentieths of a point.
    ///
    /// Narrow is 0.5in, normal 1in, wide 1.25in.
    pub fn twips(self) -> u32 {
        match self {
            MarginPreset::Narrow => 720,
            MarginPreset::Normal => 1440,
            MarginPreset::Wide => 1800,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MarginPreset::Narrow => "narrow",
            MarginPreset::Normal => "normal",
            MarginPreset::Wide => "wide",
        }
    }

    fn parse(name: &str) -> Result<Self, ConfigError> {
        match name {
            "narrow" => Ok(MarginPreset::Narrow),
            "normal" => Ok(MarginPreset::Normal),
            "wide" => Ok(MarginPreset::Wide),
            other => Err(ConfigError::MarginPreset(other.to_string())),
        }
    }
}

/// Line spacing multipliers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineSpacing {
    Single,
    #[default]
    OnePointFifteen,
    OneAndHalf,
    Double,
}

impl LineSpacing {
    pub fn multiplier(self) -> f64 {
        match self {
            LineSpacing::Single => 1.0,
            LineSpacing::OnePointFifteen => 1.15,
            LineSpacing::OneAndHalf => 1.5,
            LineSpacing::Double => 2.0,
        }
    }

    /// Value for `w:spacing/@w:line` with `lineRule="auto"` (240 per line).
    pub fn line_value(self) -> u32 {
        match self {
            LineSpacing::Single => 240,
            LineSpacing::OnePointFifteen => 276,
            LineSpacing::OneAndHalf => 360,
            LineSpacing::Double => 480,
        }
    }

    fn parse(value: f64) -> Result<Self, ConfigError> {
        const CHOICES: [(f64, LineSpacing); 4] = [
            (1.0, LineSpacing::Single),
            (1.15, LineSpacing::OnePointFifteen),
            (1.5, LineSpacing::OneAndHalf),
            (2.0, LineSpacing::Double),
        ];
        CHOICES
            .iter()
            .find(|(v, _)| (v - value).abs() < 1e-9)
            .map(|(_, spacing)| *spacing)
            .ok_or(ConfigError::LineSpacing(value))
    }
}

/// A six-digit RGB color, stored upper-case without `#`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexColor(String);

impl HexColor {
    /// Parse `#RGB`, `#RRGGBB`, `RGB` or `RRGGBB`.
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        let digits = value.trim().strip_prefix('#').unwrap_or(value.trim());
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ConfigError::HeadingColor(value.to_string()));
        }
        let expanded = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect::<String>(),
            6 => digits.to_string(),
            _ => return Err(ConfigError::HeadingColor(value.to_string())),
        };
        Ok(HexColor(expanded.to_ascii_uppercase()))
    }

    /// The color as `RRGGBB`, suitable for `w:color/@w:val`.
    pub fn as_hex(&self) -> &str {
        &self.0
    }
}

impl Default for HexColor {
    fn default() -> Self {
        HexColor("2E74B5".to_string())
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Document-global style applied by the assembler.
///
/// Immutable for the duration of one export.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(try_from = "RawSettings", into = "RawSettings")]
pub struct ExportSettings {
    pub font_family: FontFamily,
    pub font_size: FontSize,
    pub heading_color: HexColor,
    pub margins: MarginPreset,
    pub line_spacing: LineSpacing,
}

impl ExportSettings {
    /// Parse and validate settings from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: RawSettings = serde_json::from_str(json)?;
        Self::try_from(raw)
    }

    pub fn to_json(&self) -> String {
        // RawSettings only holds strings and numbers
        serde_json::to_string(&RawSettings::from(self.clone())).unwrap_or_default()
    }
}

/// Wire shape of the settings object.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
struct RawSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    heading_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    margins: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    line_spacing: Option<f64>,
}

impl TryFrom<RawSettings> for ExportSettings {
    type Error = ConfigError;

    fn try_from(raw: RawSettings) -> Result<Self, Self::Error> {
        Ok(ExportSettings {
            font_family: raw
                .font_family
                .as_deref()
                .map(FontFamily::parse)
                .transpose()?
                .unwrap_or_default(),
            font_size: raw
                .font_size
                .map(FontSize::parse)
                .transpose()?
                .unwrap_or_default(),
            heading_color: raw
                .heading_color
                .as_deref()
                .map(HexColor::parse)
                .transpose()?
                .unwrap_or_default(),
            margins: raw
                .margins
                .as_deref()
                .map(MarginPreset::parse)
                .transpose()?
                .unwrap_or_default(),
            line_spacing: raw
                .line_spacing
                .map(LineSpacing::parse)
                .transpose()?
                .unwrap_or_default(),
        })
    }
}

impl From<ExportSettings> for RawSettings {
    fn from(settings: ExportSettings) -> Self {
        RawSettings {
            font_family: Some(settings.font_family.name().to_string()),
            font_size: Some(settings.font_size.points() as f64),
            heading_color: Some(settings.heading_color.to_string()),
            margins: Some(settings.margins.name().to_string()),
            line_spacing: Some(settings.line_spacing.multiplier()),
        }
    }
}
