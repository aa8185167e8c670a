//! Error types for prosedoc operations.
//!
//! Failures are split by where they can happen. Codec and configuration
//! errors are reported before any document is touched, assembly errors abort
//! a single export. Element-level problems never show up here: the converter
//! degrades them to placeholders.

use thiserror::Error;

/// Errors raised while compressing or decoding an image.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("could not decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("could not encode image: {0}")]
    Encode(#[source] image::ImageError),

    #[error("invalid compression options: {0}")]
    InvalidOptions(String),

    #[error("invalid data URI: {0}")]
    InvalidDataUri(String),
}

/// Errors raised while validating export style settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unsupported font family: {0:?}")]
    FontFamily(String),

    #[error("unsupported font size: {0}")]
    FontSize(f64),

    #[error("invalid heading color: {0:?}")]
    HeadingColor(String),

    #[error("unsupported margin preset: {0:?}")]
    MarginPreset(String),

    #[error("unsupported line spacing: {0}")]
    LineSpacing(f64),

    #[error("malformed settings: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors raised while serializing blocks into a document package.
#[derive(Error, Debug)]
pub enum AssemblyError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Top-level error for export operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    #[error("{0} export needs the rendered document")]
    MissingRendered(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
