//! Canvas 2D style raster surface built on tiny-skia and cosmic-text.
//!
//! Provides the subset of the HTML canvas API that bratgen's renderer needs:
//! paths, gradients, shadows, a blur filter, clipping, text, and image
//! drawing. It runs without a browser or JavaScript runtime and uses:
//! - `tiny-skia` for 2D rasterization
//! - `cosmic-text` for text shaping, measurement, and glyph outlines
//! - `fontdb` for the font database, which can be shared between surfaces
//!
//! # Example
//!
//! ```rust,ignore
//! use bratgen_canvas2d::{Canvas2dContext, RectParams};
//!
//! let mut ctx = Canvas2dContext::new(400, 300)?;
//! ctx.set_fill_style("#8ACE00")?;
//! ctx.fill_rect(&RectParams { x: 0.0, y: 0.0, width: 400.0, height: 300.0 });
//! let png_data = ctx.to_png(None)?;
//! ```

mod arc;
mod context;
mod drawing_state;
mod error;
mod filter;
mod font_config;
mod font_parser;
mod geometry;
mod gradient;
mod style;
mod text;

// Re-export public API
pub use context::{parse_color, premultiply_rgba, Canvas2dContext};
pub use error::{Canvas2dError, Canvas2dResult};
pub use filter::{gaussian_blur, parse_filter_blur};
pub use font_config::{
    font_config_to_fontdb, CustomFont, FontConfig, GenericFamilyMap, ResolvedFontConfig,
};
pub use font_parser::{parse_font, FontSpec};
pub use geometry::{ArcParams, CanvasImageDataRef, RadialGradientParams, RectParams};
pub use gradient::{CanvasGradient, GradientStop, GradientType};
pub use style::{CanvasFillRule, FillStyle, LineCap, LineJoin, TextAlign, TextBaseline};
pub use text::TextMetrics;
