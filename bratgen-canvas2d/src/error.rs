use thiserror::Error;

pub type Canvas2dResult<T> = Result<T, Canvas2dError>;

#[derive(Debug, Error)]
pub enum Canvas2dError {
    /// Zero sized, or larger than the rasterizer accepts.
    #[error("Invalid dimensions: width={width}, height={height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Invalid font: {0}")]
    InvalidFont(String),

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// Only `none` and `blur(<length>)` are understood.
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Gradient stop offset {0} is outside 0..=1")]
    InvalidGradientStop(f64),

    #[error("Image data is {actual} bytes, expected {expected}")]
    InvalidImageData { expected: usize, actual: usize },

    #[error("PNG encoding failed: {0}")]
    Png(#[from] png::EncodingError),
}
