//! Render a state at an arbitrary size and encode it.
//!
//! Exports always draw into a fresh surface, so the live state and the
//! preview surface are never modified.

use crate::effects::RandomSource;
use crate::error::{BratError, BratResult};
use crate::render::render;
use crate::state::{StyleState, Tool, MAX_EXPORT};
use base64::Engine as _;
use bratgen_canvas2d::{Canvas2dContext, ResolvedFontConfig};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPEncoder;
use image::{ExtendedColorType, ImageEncoder};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

pub const DEFAULT_JPEG_QUALITY: u8 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
            ExportFormat::Webp => "webp",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
            ExportFormat::Webp => "image/webp",
        }
    }

    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpeg",
            ExportFormat::Webp => "webp",
        })
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "jpg" | "jpeg" => Ok(ExportFormat::Jpeg),
            "webp" => Ok(ExportFormat::Webp),
            other => Err(format!("Unsupported export format: {other}")),
        }
    }
}

fn check_size(width: u32, height: u32) -> BratResult<()> {
    if width == 0 || height == 0 || width > MAX_EXPORT || height > MAX_EXPORT {
        return Err(BratError::InvalidExportSize { width, height });
    }
    Ok(())
}

/// Render `state` into a new `width` x `height` surface.
///
/// Positions are scaled per axis and the selection is dropped, see
/// [`StyleState::scaled_for_export`].
pub fn export_surface(
    state: &StyleState,
    width: u32,
    height: u32,
    fonts: &ResolvedFontConfig,
    rng: &mut dyn RandomSource,
) -> BratResult<Canvas2dContext> {
    check_size(width, height)?;
    log::info!(
        target: "export",
        "Exporting {} from {}x{} to {}x{}",
        state.tool,
        state.canvas_width,
        state.canvas_height,
        width,
        height
    );
    let scaled = state.scaled_for_export(width, height);
    let mut surface = Canvas2dContext::with_resolved(width, height, fonts)?;
    render(&mut surface, &scaled, rng)?;
    Ok(surface)
}

/// Encode a rendered surface with the default JPEG quality.
pub fn encode(surface: &Canvas2dContext, format: ExportFormat) -> BratResult<Vec<u8>> {
    encode_with_quality(surface, format, DEFAULT_JPEG_QUALITY)
}

/// Encode a rendered surface. `jpeg_quality` only applies to JPEG.
pub fn encode_with_quality(
    surface: &Canvas2dContext,
    format: ExportFormat,
    jpeg_quality: u8,
) -> BratResult<Vec<u8>> {
    let (width, height) = (surface.width(), surface.height());
    let encode_err = |format: &'static str| {
        move |err: image::ImageError| BratError::Encode {
            format,
            reason: err.to_string(),
        }
    };
    match format {
        ExportFormat::Png => surface.to_png(None).map_err(|err| BratError::Encode {
            format: "png",
            reason: err.to_string(),
        }),
        ExportFormat::Jpeg => {
            let rgb = flatten_on_white(&surface.to_rgba());
            let mut buf = Vec::new();
            JpegEncoder::new_with_quality(&mut buf, jpeg_quality.clamp(1, 100))
                .write_image(&rgb, width, height, ExtendedColorType::Rgb8)
                .map_err(encode_err("jpeg"))?;
            Ok(buf)
        }
        ExportFormat::Webp => {
            let mut buf = Vec::new();
            WebPEncoder::new_lossless(&mut buf)
                .write_image(&surface.to_rgba(), width, height, ExtendedColorType::Rgba8)
                .map_err(encode_err("webp"))?;
            Ok(buf)
        }
    }
}

/// Composite straight-alpha RGBA over white, dropping alpha.
fn flatten_on_white(rgba: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);
    for px in rgba.chunks_exact(4) {
        let alpha = px[3] as u32;
        for &c in &px[..3] {
            rgb.push(((c as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8);
        }
    }
    rgb
}

/// `{prefix}-{timestamp_ms}.{ext}`, e.g. `brat-meme-1700000000000.png`.
pub fn export_filename(tool: Tool, format: ExportFormat, timestamp_ms: i64) -> String {
    format!(
        "{}-{}.{}",
        tool.file_prefix(),
        timestamp_ms,
        format.extension()
    )
}

/// Square PNG render of `state`, as a `data:image/png;base64,` URI.
pub fn thumbnail_data_uri(
    state: &StyleState,
    size: u32,
    fonts: &ResolvedFontConfig,
    rng: &mut dyn RandomSource,
) -> BratResult<String> {
    let surface = export_surface(state, size, size, fonts, rng)?;
    Ok(png_data_uri(&encode(&surface, ExportFormat::Png)?))
}

pub(crate) fn png_data_uri(png: &[u8]) -> String {
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png)
    )
}

/// Write encoded bytes to `path`.
pub fn write_to_path(bytes: &[u8], path: &Path) -> BratResult<()> {
    log::debug!(target: "export", "Writing {} bytes to {}", bytes.len(), path.display());
    std::fs::write(path, bytes)?;
    Ok(())
}
