//! Fill, stroke, clip, and paint helper operations for Canvas2dContext.

use super::Canvas2dContext;
use crate::filter::{gaussian_blur, silhouette};
use crate::geometry::RectParams;
use crate::gradient::{CanvasGradient, GradientType};
use crate::style::{CanvasFillRule, FillStyle};
use tiny_skia::{BlendMode, Mask, Paint, Pixmap, PixmapPaint, Transform};

impl Canvas2dContext {
    // --- Clipping ---

    /// Intersect the clipping region with the current path.
    pub fn clip(&mut self) {
        self.clip_with_rule(CanvasFillRule::NonZero);
    }

    /// Intersect the clipping region with the current path using the given fill rule.
    pub fn clip_with_rule(&mut self, fill_rule: CanvasFillRule) {
        log::debug!(target: "canvas", "clip {:?}", fill_rule);
        let Some(path) = self.path_builder.clone().finish() else {
            return;
        };
        // Nested clips intersect by bounding box
        let path = match self.state.clip_path.take() {
            Some(previous) => intersect_bounds(&previous, &path).unwrap_or(path),
            None => path,
        };
        self.state.clip_path = Some(path);
        self.state.clip_fill_rule = fill_rule;
    }

    // --- Drawing operations ---

    /// Fill the current path using the non-zero winding rule.
    pub fn fill(&mut self) {
        self.fill_with_rule(CanvasFillRule::NonZero);
    }

    /// Fill the current path with the specified fill rule.
    pub fn fill_with_rule(&mut self, fill_rule: CanvasFillRule) {
        log::debug!(target: "canvas", "fill {:?}", fill_rule);
        // Clone the builder so a following stroke() still sees the path
        let Some(path) = self.path_builder.clone().finish() else {
            return;
        };
        let Some(paint) = self.paint_for_style(&self.state.fill_style) else {
            return;
        };
        self.draw_with_effects(|pixmap, blend_mode, mask| {
            let mut paint = paint.clone();
            paint.blend_mode = blend_mode;
            pixmap.fill_path(&path, &paint, fill_rule.into(), Transform::identity(), mask);
        });
    }

    /// Stroke the current path.
    pub fn stroke(&mut self) {
        log::debug!(target: "canvas", "stroke");
        let Some(path) = self.path_builder.clone().finish() else {
            return;
        };
        let Some(paint) = self.paint_for_style(&self.state.stroke_style) else {
            return;
        };
        let stroke = self.device_stroke();
        self.draw_with_effects(|pixmap, blend_mode, mask| {
            let mut paint = paint.clone();
            paint.blend_mode = blend_mode;
            pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), mask);
        });
    }

    /// Fill a rectangle.
    pub fn fill_rect(&mut self, params: &RectParams) {
        self.begin_path();
        self.rect(params);
        self.fill();
    }

    /// Stroke a rectangle.
    pub fn stroke_rect(&mut self, params: &RectParams) {
        self.begin_path();
        self.rect(params);
        self.stroke();
    }

    /// Set the pixels of a rectangle to transparent black.
    pub fn clear_rect(&mut self, params: &RectParams) {
        log::debug!(target: "canvas", "clearRect {} {} {} {}", params.x, params.y, params.width, params.height);
        let corners = [
            self.transform_point(params.x, params.y),
            self.transform_point(params.x + params.width, params.y),
            self.transform_point(params.x + params.width, params.y + params.height),
            self.transform_point(params.x, params.y + params.height),
        ];
        let mut pb = tiny_skia::PathBuilder::new();
        pb.move_to(corners[0].0, corners[0].1);
        for (x, y) in &corners[1..] {
            pb.line_to(*x, *y);
        }
        pb.close();
        if let Some(path) = pb.finish() {
            let paint = Paint {
                blend_mode: BlendMode::Clear,
                ..Default::default()
            };
            let mask = self.create_clip_mask();
            self.pixmap.fill_path(
                &path,
                &paint,
                tiny_skia::FillRule::Winding,
                Transform::identity(),
                mask.as_ref(),
            );
        }
    }

    /// Clear the whole surface, ignoring transform and clip.
    pub fn clear(&mut self) {
        self.pixmap.fill(tiny_skia::Color::TRANSPARENT);
    }

    // --- Paint helpers ---

    pub(crate) fn create_clip_mask(&self) -> Option<Mask> {
        let clip_path = self.state.clip_path.as_ref()?;
        let mut mask = Mask::new(self.width, self.height)?;
        mask.fill_path(
            clip_path,
            self.state.clip_fill_rule.into(),
            true,
            Transform::identity(),
        );
        Some(mask)
    }

    /// Stroke settings scaled into device space by the average axis scale of the CTM.
    pub(crate) fn device_stroke(&self) -> tiny_skia::Stroke {
        let t = &self.state.transform;
        let scale = ((t.sx * t.sx + t.ky * t.ky).sqrt() + (t.kx * t.kx + t.sy * t.sy).sqrt()) / 2.0;
        tiny_skia::Stroke {
            width: self.state.line_width * scale,
            line_cap: self.state.line_cap.into(),
            line_join: self.state.line_join.into(),
            miter_limit: self.state.miter_limit,
            dash: if self.state.line_dash.is_empty() {
                None
            } else {
                let dash = self.state.line_dash.iter().map(|d| d * scale).collect();
                tiny_skia::StrokeDash::new(dash, self.state.line_dash_offset * scale)
            },
        }
    }

    /// Build a paint for a style with global alpha applied.
    pub(crate) fn paint_for_style(&self, style: &FillStyle) -> Option<Paint<'static>> {
        let mut paint = Paint {
            anti_alias: true,
            ..Default::default()
        };
        match style {
            FillStyle::Color(color) => {
                let mut color = *color;
                color.apply_opacity(self.state.global_alpha);
                paint.set_color(color);
            }
            FillStyle::Gradient(gradient) => {
                paint.shader = self.create_gradient_shader(gradient)?;
            }
        }
        Some(paint)
    }

    pub(crate) fn create_gradient_shader(
        &self,
        gradient: &CanvasGradient,
    ) -> Option<tiny_skia::Shader<'static>> {
        if gradient.stops.is_empty() {
            return None;
        }
        let stops: Vec<tiny_skia::GradientStop> = gradient
            .stops
            .iter()
            .map(|stop| {
                let mut color = stop.color;
                color.apply_opacity(self.state.global_alpha);
                tiny_skia::GradientStop::new(stop.offset as f32, color)
            })
            .collect();

        match &gradient.gradient_type {
            GradientType::Linear { x0, y0, x1, y1 } => tiny_skia::LinearGradient::new(
                tiny_skia::Point::from_xy(*x0, *y0),
                tiny_skia::Point::from_xy(*x1, *y1),
                stops,
                tiny_skia::SpreadMode::Pad,
                self.state.transform,
            ),
            GradientType::Radial(params) => tiny_skia::RadialGradient::new(
                tiny_skia::Point::from_xy(params.x0, params.y0),
                tiny_skia::Point::from_xy(params.x1, params.y1),
                params.r1,
                stops,
                tiny_skia::SpreadMode::Pad,
                self.state.transform,
            ),
        }
    }

    /// Run a device-space draw with the current shadow, filter, composite
    /// operation and clip applied.
    ///
    /// Without shadow or filter the draw goes straight to the surface.
    /// Otherwise it is rendered to a transparent layer, the layer is blurred
    /// by the filter, the shadow is derived from the layer's coverage, and
    /// shadow then layer are composited onto the surface.
    pub(crate) fn draw_with_effects(
        &mut self,
        draw: impl Fn(&mut Pixmap, BlendMode, Option<&Mask>),
    ) {
        let mask = self.create_clip_mask();
        let blend_mode = self.state.global_composite_operation;
        let shadow = self.state.active_shadow();
        let blur = self.state.filter_blur;

        if shadow.is_none() && blur <= 0.0 {
            draw(&mut self.pixmap, blend_mode, mask.as_ref());
            return;
        }

        let Some(mut layer) = Pixmap::new(self.width, self.height) else {
            return;
        };
        draw(&mut layer, BlendMode::SourceOver, None);
        if blur > 0.0 {
            gaussian_blur(&mut layer, blur);
        }

        let layer_paint = PixmapPaint {
            opacity: 1.0,
            blend_mode,
            quality: tiny_skia::FilterQuality::Nearest,
        };
        if let Some(shadow) = shadow {
            if let Some(mut shadow_layer) = silhouette(&layer, shadow.color) {
                // Canvas shadow blur is twice the Gaussian standard deviation
                gaussian_blur(&mut shadow_layer, shadow.blur / 2.0);
                self.pixmap.draw_pixmap(
                    0,
                    0,
                    shadow_layer.as_ref(),
                    &layer_paint,
                    Transform::from_translate(shadow.offset_x, shadow.offset_y),
                    mask.as_ref(),
                );
            }
        }
        self.pixmap.draw_pixmap(
            0,
            0,
            layer.as_ref(),
            &layer_paint,
            Transform::identity(),
            mask.as_ref(),
        );
    }
}

/// Intersection of two clip paths, approximated by their bounding rectangles.
fn intersect_bounds(a: &tiny_skia::Path, b: &tiny_skia::Path) -> Option<tiny_skia::Path> {
    let (a, b) = (a.bounds(), b.bounds());
    let rect = tiny_skia::Rect::from_ltrb(
        a.left().max(b.left()),
        a.top().max(b.top()),
        a.right().min(b.right()),
        a.bottom().min(b.bottom()),
    )?;
    Some(tiny_skia::PathBuilder::from_rect(rect))
}

#[cfg(test)]
mod tests {
    use crate::font_config::FontConfig;
    use crate::geometry::RectParams;
    use crate::Canvas2dContext;

    fn offline(width: u32, height: u32) -> Canvas2dContext {
        let config = FontConfig::offline();
        Canvas2dContext::with_config(width, height, config).unwrap()
    }

    fn pixel(ctx: &Canvas2dContext, x: i32, y: i32) -> [u8; 4] {
        let data = ctx.get_image_data(x, y, 1, 1);
        [data[0], data[1], data[2], data[3]]
    }

    #[test]
    fn test_fill_rect_pixels() {
        let mut ctx = offline(100, 100);
        ctx.set_fill_style("#ff0000").unwrap();
        ctx.fill_rect(&RectParams {
            x: 10.0,
            y: 10.0,
            width: 50.0,
            height: 50.0,
        });
        assert_eq!(pixel(&ctx, 30, 30), [255, 0, 0, 255]);
        assert_eq!(pixel(&ctx, 5, 5)[3], 0);
    }

    #[test]
    fn test_dashed_stroke_leaves_gaps() {
        let mut ctx = offline(100, 20);
        ctx.set_stroke_style("#0000ff").unwrap();
        ctx.set_line_width(4.0);
        ctx.set_line_dash(vec![10.0, 10.0]);
        ctx.begin_path();
        ctx.move_to(0.0, 10.0);
        ctx.line_to(100.0, 10.0);
        ctx.stroke();
        assert!(pixel(&ctx, 5, 10)[3] > 200);
        assert_eq!(pixel(&ctx, 15, 10)[3], 0);
    }

    #[test]
    fn test_shadow_offset_is_drawn() {
        let mut ctx = offline(60, 60);
        ctx.set_fill_style("#ffffff").unwrap();
        ctx.set_shadow_color("#000000").unwrap();
        ctx.set_shadow_offset(20.0, 20.0);
        ctx.fill_rect(&RectParams {
            x: 10.0,
            y: 10.0,
            width: 20.0,
            height: 20.0,
        });
        assert_eq!(pixel(&ctx, 15, 15), [255, 255, 255, 255]);
        assert_eq!(pixel(&ctx, 45, 45), [0, 0, 0, 255]);
        assert_eq!(pixel(&ctx, 55, 15)[3], 0);
    }

    #[test]
    fn test_blur_filter_softens_edges() {
        let mut ctx = offline(60, 60);
        ctx.set_fill_style("#000000").unwrap();
        ctx.set_filter("blur(4px)").unwrap();
        ctx.fill_rect(&RectParams {
            x: 20.0,
            y: 20.0,
            width: 20.0,
            height: 20.0,
        });
        let just_outside = pixel(&ctx, 18, 30)[3];
        assert!(just_outside > 0 && just_outside < 255);
        assert!(pixel(&ctx, 30, 30)[3] > 240);
    }

    #[test]
    fn test_clip_restricts_fill() {
        let mut ctx = offline(40, 40);
        ctx.begin_path();
        ctx.rect(&RectParams {
            x: 0.0,
            y: 0.0,
            width: 20.0,
            height: 40.0,
        });
        ctx.clip();
        ctx.set_fill_style("#00ff00").unwrap();
        ctx.fill_rect(&RectParams {
            x: 0.0,
            y: 0.0,
            width: 40.0,
            height: 40.0,
        });
        assert_eq!(pixel(&ctx, 10, 10)[1], 255);
        assert_eq!(pixel(&ctx, 30, 10)[3], 0);
    }

    #[test]
    fn test_global_alpha_scales_fill() {
        let mut ctx = offline(10, 10);
        ctx.set_global_alpha(0.5);
        ctx.set_fill_style("#000000").unwrap();
        ctx.fill_rect(&RectParams {
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
        });
        let alpha = pixel(&ctx, 5, 5)[3];
        assert!((126..=129).contains(&alpha), "alpha {alpha}");
    }
}
