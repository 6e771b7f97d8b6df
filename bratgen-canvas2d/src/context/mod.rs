//! Canvas 2D rendering context implementation.

mod drawing;
mod image_ops;
mod path_ops;
mod text_rendering;
mod transform;

pub use image_ops::premultiply_rgba;

use crate::drawing_state::DrawingState;
use crate::error::{Canvas2dError, Canvas2dResult};
use crate::filter::parse_filter_blur;
use crate::font_config::{font_config_to_fontdb, FontConfig, ResolvedFontConfig};
use crate::geometry::RadialGradientParams;
use crate::gradient::CanvasGradient;
use crate::style::{FillStyle, LineCap, LineJoin};
use cosmic_text::{FontSystem, SwashCache};
use tiny_skia::Pixmap;

/// Maximum canvas dimension (same as Chrome).
const MAX_DIMENSION: u32 = 32767;

/// Canvas 2D rendering context.
pub struct Canvas2dContext {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) pixmap: Pixmap,
    pub(crate) font_system: FontSystem,
    pub(crate) swash_cache: SwashCache,
    pub(crate) state: DrawingState,
    state_stack: Vec<DrawingState>,
    /// Current path, already in device space.
    pub(crate) path_builder: tiny_skia::PathBuilder,
    pub(crate) subpath_start: (f32, f32),
    pub(crate) has_current_point: bool,
    pub(crate) hinting_enabled: bool,
}

impl Canvas2dContext {
    /// Create a new Canvas2dContext with the default font configuration.
    pub fn new(width: u32, height: u32) -> Canvas2dResult<Self> {
        Self::with_config(width, height, FontConfig::default())
    }

    /// Create a new Canvas2dContext with the specified font configuration.
    pub fn with_config(width: u32, height: u32, config: FontConfig) -> Canvas2dResult<Self> {
        let db = font_config_to_fontdb(&config);
        Self::new_internal(width, height, db, config.hinting_enabled)
    }

    /// Create a new Canvas2dContext from a pre-resolved font configuration.
    ///
    /// The font database is cloned, so no font scanning happens here. Use this
    /// for every surface after the first.
    pub fn with_resolved(
        width: u32,
        height: u32,
        resolved: &ResolvedFontConfig,
    ) -> Canvas2dResult<Self> {
        Self::new_internal(width, height, resolved.fontdb.clone(), resolved.hinting_enabled)
    }

    fn new_internal(
        width: u32,
        height: u32,
        font_db: fontdb::Database,
        hinting_enabled: bool,
    ) -> Canvas2dResult<Self> {
        if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(Canvas2dError::InvalidDimensions { width, height });
        }
        let pixmap =
            Pixmap::new(width, height).ok_or(Canvas2dError::InvalidDimensions { width, height })?;
        let font_system = FontSystem::new_with_locale_and_db("en".to_string(), font_db);

        Ok(Self {
            width,
            height,
            pixmap,
            font_system,
            swash_cache: SwashCache::new(),
            state: DrawingState::default(),
            state_stack: Vec::new(),
            path_builder: tiny_skia::PathBuilder::new(),
            subpath_start: (0.0, 0.0),
            has_current_point: false,
            hinting_enabled,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Save the current drawing state.
    pub fn save(&mut self) {
        log::debug!(target: "canvas", "save");
        self.state_stack.push(self.state.clone());
    }

    /// Restore the previously saved drawing state. Unbalanced calls are ignored.
    pub fn restore(&mut self) {
        log::debug!(target: "canvas", "restore");
        if let Some(state) = self.state_stack.pop() {
            self.state = state;
        }
    }

    /// Clear every pixel and return the context to its initial state.
    pub fn reset(&mut self) {
        self.pixmap.fill(tiny_skia::Color::TRANSPARENT);
        self.state = DrawingState::default();
        self.state_stack.clear();
        self.path_builder = tiny_skia::PathBuilder::new();
        self.subpath_start = (0.0, 0.0);
        self.has_current_point = false;
    }

    // --- Style setters ---

    /// Set the fill style from a CSS color string.
    pub fn set_fill_style(&mut self, style: &str) -> Canvas2dResult<()> {
        self.state.fill_style = FillStyle::Color(parse_color(style)?);
        Ok(())
    }

    pub fn set_fill_style_color(&mut self, color: tiny_skia::Color) {
        self.state.fill_style = FillStyle::Color(color);
    }

    /// Set the stroke style from a CSS color string.
    pub fn set_stroke_style(&mut self, style: &str) -> Canvas2dResult<()> {
        self.state.stroke_style = FillStyle::Color(parse_color(style)?);
        Ok(())
    }

    pub fn set_stroke_style_color(&mut self, color: tiny_skia::Color) {
        self.state.stroke_style = FillStyle::Color(color);
    }

    /// Set the fill style to a gradient.
    pub fn set_fill_style_gradient(&mut self, gradient: CanvasGradient) {
        self.state.fill_style = FillStyle::Gradient(gradient);
    }

    /// Set the stroke style to a gradient.
    pub fn set_stroke_style_gradient(&mut self, gradient: CanvasGradient) {
        self.state.stroke_style = FillStyle::Gradient(gradient);
    }

    /// Set the line width. Non-finite or non-positive values are ignored.
    pub fn set_line_width(&mut self, width: f32) {
        if width.is_finite() && width > 0.0 {
            self.state.line_width = width;
        }
    }

    pub fn set_line_cap(&mut self, cap: LineCap) {
        self.state.line_cap = cap;
    }

    pub fn set_line_join(&mut self, join: LineJoin) {
        self.state.line_join = join;
    }

    /// Set the line dash pattern.
    ///
    /// Patterns containing negative or non-finite values are ignored.
    /// Odd-length patterns are repeated to make them even.
    pub fn set_line_dash(&mut self, mut segments: Vec<f32>) {
        if segments.iter().any(|&v| !v.is_finite() || v < 0.0) {
            return;
        }
        if segments.len() % 2 == 1 {
            segments.extend_from_within(..);
        }
        self.state.line_dash = segments;
    }

    pub fn get_line_dash(&self) -> &[f32] {
        &self.state.line_dash
    }

    /// Set the global alpha. Values outside [0, 1] are ignored.
    pub fn set_global_alpha(&mut self, alpha: f32) {
        if alpha.is_finite() && (0.0..=1.0).contains(&alpha) {
            self.state.global_alpha = alpha;
        }
    }

    pub fn global_alpha(&self) -> f32 {
        self.state.global_alpha
    }

    /// Set the global composite operation by its CSS name.
    ///
    /// Unknown names are ignored and the previous mode is kept. Returns true
    /// if the value was accepted.
    pub fn set_global_composite_operation(&mut self, op: &str) -> bool {
        use tiny_skia::BlendMode;
        let mode = match op {
            "source-over" => BlendMode::SourceOver,
            "source-in" => BlendMode::SourceIn,
            "source-out" => BlendMode::SourceOut,
            "source-atop" => BlendMode::SourceAtop,
            "destination-over" => BlendMode::DestinationOver,
            "destination-in" => BlendMode::DestinationIn,
            "destination-out" => BlendMode::DestinationOut,
            "lighter" => BlendMode::Plus,
            "copy" => BlendMode::Source,
            "xor" => BlendMode::Xor,
            "multiply" => BlendMode::Multiply,
            "screen" => BlendMode::Screen,
            "overlay" => BlendMode::Overlay,
            "darken" => BlendMode::Darken,
            "lighten" => BlendMode::Lighten,
            "color-dodge" => BlendMode::ColorDodge,
            "color-burn" => BlendMode::ColorBurn,
            "hard-light" => BlendMode::HardLight,
            "soft-light" => BlendMode::SoftLight,
            "difference" => BlendMode::Difference,
            "exclusion" => BlendMode::Exclusion,
            "hue" => BlendMode::Hue,
            "saturation" => BlendMode::Saturation,
            "color" => BlendMode::Color,
            "luminosity" => BlendMode::Luminosity,
            _ => return false,
        };
        self.state.global_composite_operation = mode;
        true
    }

    // --- Shadows and filters ---

    /// Set the shadow color from a CSS color string.
    pub fn set_shadow_color(&mut self, color: &str) -> Canvas2dResult<()> {
        self.state.shadow_color = parse_color(color)?;
        Ok(())
    }

    pub fn set_shadow_color_value(&mut self, color: tiny_skia::Color) {
        self.state.shadow_color = color;
    }

    /// Set the shadow blur. Negative or non-finite values are ignored.
    pub fn set_shadow_blur(&mut self, blur: f32) {
        if blur.is_finite() && blur >= 0.0 {
            self.state.shadow_blur = blur;
        }
    }

    /// Set the shadow offset. Non-finite components are ignored.
    pub fn set_shadow_offset(&mut self, x: f32, y: f32) {
        if x.is_finite() {
            self.state.shadow_offset_x = x;
        }
        if y.is_finite() {
            self.state.shadow_offset_y = y;
        }
    }

    /// Set the CSS filter. Only `blur()` affects rendering.
    ///
    /// Unparseable values are rejected and the previous filter is kept.
    pub fn set_filter(&mut self, filter: &str) -> Canvas2dResult<()> {
        self.state.filter_blur = parse_filter_blur(filter)?;
        Ok(())
    }

    // --- Gradients ---

    pub fn create_linear_gradient(&self, x0: f32, y0: f32, x1: f32, y1: f32) -> CanvasGradient {
        CanvasGradient::new_linear(x0, y0, x1, y1)
    }

    pub fn create_radial_gradient(&self, params: &RadialGradientParams) -> CanvasGradient {
        CanvasGradient::new_radial(params)
    }
}

/// Parse a CSS color string into a tiny_skia::Color.
pub fn parse_color(s: &str) -> Canvas2dResult<tiny_skia::Color> {
    let parsed = csscolorparser::parse(s)
        .map_err(|e| Canvas2dError::InvalidColor(format!("{}: {}", s, e)))?;
    let [r, g, b, a] = parsed.to_array();
    Ok(tiny_skia::Color::from_rgba(r, g, b, a).unwrap_or(tiny_skia::Color::BLACK))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::RectParams;

    fn offline(width: u32, height: u32) -> Canvas2dContext {
        let config = FontConfig::offline();
        Canvas2dContext::with_config(width, height, config).unwrap()
    }

    #[test]
    fn test_new_context_defaults() {
        let ctx = offline(200, 150);
        assert_eq!(ctx.width(), 200);
        assert_eq!(ctx.height(), 150);
        assert_eq!(ctx.state.line_width, 1.0);
        assert_eq!(ctx.state.global_alpha, 1.0);
        assert!(ctx.state.active_shadow().is_none());
        assert!(ctx.pixmap.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_invalid_dimensions() {
        assert!(matches!(
            Canvas2dContext::new(0, 100),
            Err(Canvas2dError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            Canvas2dContext::new(100, MAX_DIMENSION + 1),
            Err(Canvas2dError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_setters_ignore_invalid_values() {
        let mut ctx = offline(10, 10);
        ctx.set_line_width(5.0);
        ctx.set_line_width(-1.0);
        ctx.set_line_width(f32::NAN);
        assert_eq!(ctx.state.line_width, 5.0);

        ctx.set_global_alpha(0.5);
        ctx.set_global_alpha(2.0);
        assert_eq!(ctx.global_alpha(), 0.5);

        ctx.set_shadow_blur(4.0);
        ctx.set_shadow_blur(-3.0);
        assert_eq!(ctx.state.shadow_blur, 4.0);

        assert!(ctx.set_fill_style("not-a-color").is_err());
        assert!(ctx.set_filter("blur(").is_err());
    }

    #[test]
    fn test_line_dash_odd_length_repeated() {
        let mut ctx = offline(10, 10);
        ctx.set_line_dash(vec![5.0, 10.0, 15.0]);
        assert_eq!(ctx.get_line_dash(), &[5.0, 10.0, 15.0, 5.0, 10.0, 15.0]);
        ctx.set_line_dash(vec![5.0, -1.0]);
        assert_eq!(ctx.get_line_dash().len(), 6);
    }

    #[test]
    fn test_global_composite_operation_ignore_invalid() {
        let mut ctx = offline(10, 10);
        assert!(ctx.set_global_composite_operation("screen"));
        assert!(!ctx.set_global_composite_operation("invalid-mode"));
        assert_eq!(
            ctx.state.global_composite_operation,
            tiny_skia::BlendMode::Screen
        );
    }

    #[test]
    fn test_save_restore_round_trip() {
        let mut ctx = offline(10, 10);
        ctx.set_global_alpha(0.7);
        ctx.set_shadow_offset(3.0, 4.0);
        ctx.save();
        ctx.set_global_alpha(0.3);
        ctx.set_shadow_offset(0.0, 0.0);
        ctx.translate(5.0, 5.0);
        ctx.restore();
        assert_eq!(ctx.global_alpha(), 0.7);
        assert_eq!(ctx.state.shadow_offset_x, 3.0);
        assert!(ctx.get_transform().is_identity());
        // Extra restore is a no-op
        ctx.restore();
        assert_eq!(ctx.global_alpha(), 0.7);
    }

    #[test]
    fn test_reset_clears_pixels_and_state() {
        let mut ctx = offline(20, 20);
        ctx.set_fill_style("#ff0000").unwrap();
        ctx.fill_rect(&RectParams {
            x: 0.0,
            y: 0.0,
            width: 20.0,
            height: 20.0,
        });
        ctx.save();
        ctx.reset();
        assert!(ctx.pixmap.data().iter().all(|&b| b == 0));
        assert!(matches!(ctx.state.fill_style, FillStyle::Color(c) if c == tiny_skia::Color::BLACK));
    }
}
