//! Error types for bratgen-rs.

use thiserror::Error;

/// Result type alias using BratError.
pub type BratResult<T> = Result<T, BratError>;

/// Errors surfaced by rendering, export, image loading and the gallery.
///
/// Invalid style values never show up here: they fall back to defaults.
#[derive(Debug, Error)]
pub enum BratError {
    /// The raster surface rejected an operation.
    #[error("Canvas error: {0}")]
    Canvas(#[from] bratgen_canvas2d::Canvas2dError),

    /// Encoding the rendered surface failed.
    #[error("Failed to encode {format} image: {reason}")]
    Encode { format: &'static str, reason: String },

    /// Image bytes could not be decoded.
    #[error("Failed to decode image: {0}")]
    ImageDecode(String),

    /// Requested export dimensions are unusable.
    #[error("Invalid export size: {width}x{height}")]
    InvalidExportSize { width: u32, height: u32 },

    /// Gallery persistence failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// No gallery item with this id.
    #[error("Gallery item not found: {0}")]
    ItemNotFound(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from a gallery backing store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store cannot hold the serialized gallery.
    #[error("Storage quota exceeded: {needed} bytes needed, {quota} available")]
    QuotaExceeded { needed: usize, quota: usize },

    #[error("Storage IO error: {0}")]
    Io(#[from] std::io::Error),
}
