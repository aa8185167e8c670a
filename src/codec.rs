//! Image compression for inserted attachments.
//!
//! Every inserted image is decoded, scaled down to a maximum width and
//! re-encoded as JPEG, lossless inputs included. The result is a data URI
//! that the attachment store keeps instead of the original file.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};

use crate::error::CodecError;
use crate::util::DataUri;

/// Default maximum width in pixels.
pub const DEFAULT_MAX_WIDTH: u32 = 1024;

/// Default lossy quality in `(0, 1]`.
pub const DEFAULT_QUALITY: f32 = 0.7;

/// Options for [`compress`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressOptions {
    pub max_width: u32,
    pub quality: f32,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_WIDTH,
            quality: DEFAULT_QUALITY,
        }
    }
}

impl CompressOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_width(mut self, max_width: u32) -> Self {
        self.max_width = max_width;
        self
    }

    pub fn with_quality(mut self, quality: f32) -> Self {
        self.quality = quality;
        self
    }

    fn validate(&self) -> Result<(), CodecError> {
        if self.max_width == 0 {
            return Err(CodecError::InvalidOptions(
                "max_width must be at least 1".to_string(),
            ));
        }
        if !(self.quality > 0.0 && self.quality <= 1.0) {
            return Err(CodecError::InvalidOptions(format!(
                "quality must be in (0, 1], got {}",
                self.quality
            )));
        }
        Ok(())
    }

    /// JPEG quality on the encoder's 1-100 scale.
    fn jpeg_quality(&self) -> u8 {
        (self.quality * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

/// A compressed image ready to store as an attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedImage {
    pub data_uri: String,
    pub width: u32,
    pub height: u32,
}

/// Compute output dimensions for a source image.
///
/// Images wider than `max_width` shrink proportionally so the width is
/// exactly `max_width`; narrower images keep their size.
pub fn target_dimensions(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if width <= max_width {
        return (width, height);
    }
    let scaled = (height as f64 * max_width as f64 / width as f64).round() as u32;
    (max_width, scaled.max(1))
}

/// Decode, resize and re-encode an image file.
pub fn compress(bytes: &[u8], options: &CompressOptions) -> Result<CompressedImage, CodecError> {
    options.validate()?;

    let source = image::load_from_memory(bytes).map_err(CodecError::Decode)?;
    let (width, height) = target_dimensions(source.width(), source.height(), options.max_width);

    let resized = if (width, height) == (source.width(), source.height()) {
        source
    } else {
        source.resize_exact(width, height, FilterType::Triangle)
    };

    // JPEG has no alpha channel
    let rgb = DynamicImage::ImageRgb8(resized.to_rgb8());

    let mut encoded = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut encoded, options.jpeg_quality());
    rgb.write_with_encoder(encoder).map_err(CodecError::Encode)?;

    log::debug!(
        "compressed image to {}x{} ({} bytes)",
        width,
        height,
        encoded.len()
    );

    Ok(CompressedImage {
        data_uri: DataUri::encode("image/jpeg", &encoded),
        width,
        height,
    })
}

/// Compress with default options and return only the data URI.
pub fn compress_to_data_uri(bytes: &[u8]) -> Result<String, CodecError> {
    compress(bytes, &CompressOptions::default()).map(|image| image.data_uri)
}

/// Read intrinsic pixel dimensions from the image header.
pub fn image_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbaImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, image::Rgba([10, 120, 200, 128]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn test_target_dimensions() {
        assert_eq!(target_dimensions(3000, 2000, 1024), (1024, 683));
        assert_eq!(target_dimensions(800, 600, 1024), (800, 600));
        assert_eq!(target_dimensions(1024, 10, 1024), (1024, 10));
        assert_eq!(target_dimensions(5000, 1, 1024), (1024, 1));
    }

    #[test]
    fn test_compress_scales_wide_image() {
        let png = png_bytes(2048, 512);
        let result = compress(&png, &CompressOptions::default()).unwrap();
        assert_eq!((result.width, result.height), (1024, 256));
        assert!(result.data_uri.starts_with("data:image/jpeg;base64,"));

        let decoded = DataUri::parse(&result.data_uri).unwrap();
        assert_eq!(image_dimensions(&decoded.data), Some((1024, 256)));
    }

    #[test]
    fn test_compress_never_upscales() {
        let png = png_bytes(300, 200);
        let result = compress(&png, &CompressOptions::default()).unwrap();
        assert_eq!((result.width, result.height), (300, 200));
    }

    #[test]
    fn test_compress_rejects_garbage() {
        let err = compress(b"not an image", &CompressOptions::default()).unwrap_err();
        assert!(matches!(err, CodecError::Decode(_)));
    }

    #[test]
    fn test_compress_rejects_bad_options() {
        let png = png_bytes(4, 4);
        assert!(matches!(
            compress(&png, &CompressOptions::new().with_quality(0.0)),
            Err(CodecError::InvalidOptions(_))
        ));
        assert!(matches!(
            compress(&png, &CompressOptions::new().with_max_width(0)),
            Err(CodecError::InvalidOptions(_))
        ));
    }
}
