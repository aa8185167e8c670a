//! Image source resolution and decoding.

use std::io::Cursor;

use image::ImageFormat as DecodedFormat;
use thiserror::Error;

use crate::attachments::{AttachmentRef, AttachmentResolver};
use crate::codec::image_dimensions;
use crate::dom::{NodeId, RenderedTree};
use crate::error::CodecError;
use crate::model::{ImageBlock, ImageFormat};
use crate::util::{DataUri, is_data_uri};

/// Display size used when neither attributes nor the payload give one.
pub const FALLBACK_SIZE: (u32, u32) = (400, 300);

/// Why an image element could not become an image block.
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("dangling attachment reference {0:?}")]
    Dangling(String),

    #[error("undecodable payload: {0}")]
    Payload(#[from] CodecError),

    #[error("unrecognized image format")]
    UnknownFormat,

    #[error("could not transcode image: {0}")]
    Transcode(#[source] image::ImageError),
}

/// Outcome of looking at an `<img>` source.
#[derive(Debug)]
pub enum ImageSource {
    /// Decoded and ready to embed.
    Embedded(ImageBlock),
    /// Not an attachment or data payload; external URLs are never fetched.
    External,
}

/// Resolve and decode the image an `<img>` element points at.
pub fn load_image(
    tree: &RenderedTree,
    id: NodeId,
    resolver: &dyn AttachmentResolver,
) -> Result<ImageSource, ImageError> {
    let src = tree.get_attr(id, "src").unwrap_or_default().trim();

    let payload = if let Some(reference) = AttachmentRef::parse(src) {
        resolver
            .resolve_attachment(reference.id)
            .ok_or_else(|| ImageError::Dangling(src.to_string()))?
    } else if is_data_uri(src) {
        src
    } else {
        return Ok(ImageSource::External);
    };

    let uri = DataUri::parse(payload)?;
    let (data, format) = embeddable(uri.data)?;

    let intrinsic = image_dimensions(&data);
    let (width, height) = declared_size(
        parse_px(tree.get_attr(id, "width")),
        parse_px(tree.get_attr(id, "height")),
        intrinsic,
    );

    Ok(ImageSource::Embedded(ImageBlock {
        data,
        format,
        width,
        height,
    }))
}

/// Keep formats a word processor reads as-is; transcode the rest to PNG.
fn embeddable(data: Vec<u8>) -> Result<(Vec<u8>, ImageFormat), ImageError> {
    let detected = image::guess_format(&data).map_err(|_| ImageError::UnknownFormat)?;
    let format = match detected {
        DecodedFormat::Png => Some(ImageFormat::Png),
        DecodedFormat::Jpeg => Some(ImageFormat::Jpeg),
        DecodedFormat::Gif => Some(ImageFormat::Gif),
        DecodedFormat::Bmp => Some(ImageFormat::Bmp),
        _ => None,
    };
    if let Some(format) = format {
        return Ok((data, format));
    }

    log::debug!("transcoding {:?} image to PNG", detected);
    let decoded = image::load_from_memory_with_format(&data, detected)
        .map_err(ImageError::Transcode)?;
    let mut png = Cursor::new(Vec::new());
    decoded
        .write_to(&mut png, DecodedFormat::Png)
        .map_err(ImageError::Transcode)?;
    Ok((png.into_inner(), ImageFormat::Png))
}

/// Parse a pixel attribute like `320` or `320px`.
fn parse_px(value: Option<&str>) -> Option<u32> {
    let value = value?.trim();
    let value = value.strip_suffix("px").unwrap_or(value).trim();
    let parsed = value.parse::<f64>().ok()?;
    (parsed >= 1.0).then(|| parsed.round() as u32)
}

/// Pick the display size: both attributes, one attribute plus the intrinsic
/// aspect ratio, the intrinsic size, or the fallback.
fn declared_size(
    width: Option<u32>,
    height: Option<u32>,
    intrinsic: Option<(u32, u32)>,
) -> (u32, u32) {
    let intrinsic = intrinsic.filter(|&(w, h)| w > 0 && h > 0);
    match (width, height, intrinsic) {
        (Some(w), Some(h), _) => (w, h),
        (Some(w), None, Some((iw, ih))) => (w, scale(ih, w, iw)),
        (None, Some(h), Some((iw, ih))) => (scale(iw, h, ih), h),
        (Some(w), None, None) => (w, scale(FALLBACK_SIZE.1, w, FALLBACK_SIZE.0)),
        (None, Some(h), None) => (scale(FALLBACK_SIZE.0, h, FALLBACK_SIZE.1), h),
        (None, None, Some(size)) => size,
        (None, None, None) => FALLBACK_SIZE,
    }
}

fn scale(value: u32, numerator: u32, denominator: u32) -> u32 {
    ((value as f64 * numerator as f64 / denominator as f64).round() as u32).max(1)
}
