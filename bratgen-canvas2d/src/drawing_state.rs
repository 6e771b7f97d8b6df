//! Drawing state that can be saved and restored.

use crate::font_parser::FontSpec;
use crate::style::{CanvasFillRule, FillStyle, LineCap, LineJoin, TextAlign, TextBaseline};
use tiny_skia::Transform;

/// Drawing state that can be saved and restored.
#[derive(Debug, Clone)]
pub struct DrawingState {
    pub fill_style: FillStyle,
    pub stroke_style: FillStyle,
    pub line_width: f32,
    pub line_cap: LineCap,
    pub line_join: LineJoin,
    pub miter_limit: f32,
    pub line_dash: Vec<f32>,
    pub line_dash_offset: f32,
    pub font: FontSpec,
    pub text_align: TextAlign,
    pub text_baseline: TextBaseline,
    pub global_alpha: f32,
    pub global_composite_operation: tiny_skia::BlendMode,
    pub transform: Transform,
    /// Clipping path in device space, if any.
    pub clip_path: Option<tiny_skia::Path>,
    pub clip_fill_rule: CanvasFillRule,
    /// Shadow color; a fully transparent color disables the shadow.
    pub shadow_color: tiny_skia::Color,
    pub shadow_blur: f32,
    pub shadow_offset_x: f32,
    pub shadow_offset_y: f32,
    /// Blur radius in pixels from a `blur(Npx)` filter, 0 when no filter is set.
    pub filter_blur: f32,
}

impl Default for DrawingState {
    fn default() -> Self {
        Self {
            fill_style: FillStyle::default(),
            stroke_style: FillStyle::default(),
            line_width: 1.0,
            line_cap: LineCap::default(),
            line_join: LineJoin::default(),
            miter_limit: 10.0,
            line_dash: Vec::new(),
            line_dash_offset: 0.0,
            font: FontSpec::default(),
            text_align: TextAlign::default(),
            text_baseline: TextBaseline::default(),
            global_alpha: 1.0,
            global_composite_operation: tiny_skia::BlendMode::SourceOver,
            transform: Transform::identity(),
            clip_path: None,
            clip_fill_rule: CanvasFillRule::NonZero,
            shadow_color: tiny_skia::Color::TRANSPARENT,
            shadow_blur: 0.0,
            shadow_offset_x: 0.0,
            shadow_offset_y: 0.0,
            filter_blur: 0.0,
        }
    }
}

/// Shadow parameters resolved for a single draw call.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ActiveShadow {
    pub color: tiny_skia::Color,
    pub blur: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl DrawingState {
    /// The shadow to draw, following the canvas rule that a shadow is only
    /// painted when its color is visible and it is blurred or offset.
    pub(crate) fn active_shadow(&self) -> Option<ActiveShadow> {
        let visible = self.shadow_color.alpha() > 0.0;
        let displaced =
            self.shadow_blur > 0.0 || self.shadow_offset_x != 0.0 || self.shadow_offset_y != 0.0;
        (visible && displaced).then_some(ActiveShadow {
            color: self.shadow_color,
            blur: self.shadow_blur,
            offset_x: self.shadow_offset_x,
            offset_y: self.shadow_offset_y,
        })
    }
}
