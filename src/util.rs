//! Utility functions with platform-specific implementations.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::CodecError;

/// Get a time-based seed value for pseudo-random number generation.
///
/// On native platforms, uses `SystemTime::now()`.
/// On WASM, uses `js_sys::Date::now()`.
#[cfg(not(target_arch = "wasm32"))]
pub fn time_seed_nanos() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(12345)
}

#[cfg(target_arch = "wasm32")]
pub fn time_seed_nanos() -> u64 {
    // js_sys::Date::now() returns milliseconds as f64
    (js_sys::Date::now() * 1_000_000.0) as u64
}

/// Get current time as milliseconds since Unix epoch.
#[cfg(not(target_arch = "wasm32"))]
pub fn time_now_millis() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(target_arch = "wasm32")]
pub fn time_now_millis() -> u64 {
    js_sys::Date::now() as u64
}

/// One step of the linear congruential generator used for id suffixes.
pub fn lcg_next(state: u64) -> u64 {
    state
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407)
}

/// Turn a document title into a filesystem-safe file stem.
///
/// ASCII letters and digits are lowercased and kept; every other run of
/// characters collapses to a single underscore. Leading and trailing
/// underscores are stripped. An empty result becomes `untitled`.
///
/// ```
/// use prosedoc::slugify_filename;
///
/// assert_eq!(slugify_filename("Welcome Note"), "welcome_note");
/// assert_eq!(slugify_filename("  Q3 -- Report! "), "q3_report");
/// assert_eq!(slugify_filename("???"), "untitled");
/// ```
pub fn slugify_filename(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_gap = false;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_gap && !slug.is_empty() {
                slug.push('_');
            }
            pending_gap = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_gap = true;
        }
    }

    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug
    }
}

// ============================================================================
// Data URIs
// ============================================================================

/// A parsed `data:` URI carrying base64 payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    pub media_type: String,
    pub data: Vec<u8>,
}

impl DataUri {
    /// Parse a `data:<media>;base64,<payload>` URI.
    ///
    /// Whitespace inside the payload is ignored, since some renderers wrap
    /// long attribute values.
    pub fn parse(uri: &str) -> Result<Self, CodecError> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| CodecError::InvalidDataUri("missing data: scheme".to_string()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| CodecError::InvalidDataUri("missing payload separator".to_string()))?;

        let mut params = header.split(';');
        let media_type = params.next().unwrap_or_default().trim().to_ascii_lowercase();
        if !params.any(|p| p.trim().eq_ignore_ascii_case("base64")) {
            return Err(CodecError::InvalidDataUri(
                "only base64 payloads are supported".to_string(),
            ));
        }

        let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
        let data = STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| CodecError::InvalidDataUri(e.to_string()))?;

        Ok(Self { media_type, data })
    }

    /// Encode bytes as a base64 data URI.
    pub fn encode(media_type: &str, data: &[u8]) -> String {
        format!("data:{};base64,{}", media_type, STANDARD.encode(data))
    }
}

/// Check whether a string looks like an embedded data payload.
pub fn is_data_uri(src: &str) -> bool {
    src.get(..5).is_some_and(|s| s.eq_ignore_ascii_case("data:"))
}
