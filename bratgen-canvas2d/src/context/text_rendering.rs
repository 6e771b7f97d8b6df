//! Text rendering operations for Canvas2dContext.

use super::Canvas2dContext;
use crate::error::Canvas2dResult;
use crate::font_parser::{parse_font, FontSpec};
use crate::style::{TextAlign, TextBaseline};
use crate::text::{buffer_metrics, calculate_text_x_offset, calculate_text_y_offset, shape_line};
use crate::text::TextMetrics;
use cosmic_text::Command;
use tiny_skia::{Path, Transform};

impl Canvas2dContext {
    /// Set the font from a CSS font string.
    pub fn set_font(&mut self, font: &str) -> Canvas2dResult<()> {
        self.state.font = parse_font(font)?;
        Ok(())
    }

    pub fn font(&self) -> &FontSpec {
        &self.state.font
    }

    pub fn set_text_align(&mut self, align: TextAlign) {
        self.state.text_align = align;
    }

    pub fn set_text_baseline(&mut self, baseline: TextBaseline) {
        self.state.text_baseline = baseline;
    }

    /// Measure text with the current font.
    pub fn measure_text(&mut self, text: &str) -> TextMetrics {
        crate::text::measure_text(
            &mut self.font_system,
            text,
            &self.state.font,
            self.hinting_enabled,
        )
    }

    /// Fill text at the specified position.
    pub fn fill_text(&mut self, text: &str, x: f32, y: f32) {
        log::debug!(target: "canvas", "fillText \"{}\" {} {}", text, x, y);
        let glyphs = self.glyph_paths(text, x, y);
        if glyphs.is_empty() {
            return;
        }
        let Some(paint) = self.paint_for_style(&self.state.fill_style) else {
            return;
        };
        self.draw_with_effects(|pixmap, blend_mode, mask| {
            let mut paint = paint.clone();
            paint.blend_mode = blend_mode;
            for path in &glyphs {
                pixmap.fill_path(
                    path,
                    &paint,
                    tiny_skia::FillRule::Winding,
                    Transform::identity(),
                    mask,
                );
            }
        });
    }

    /// Stroke text at the specified position.
    pub fn stroke_text(&mut self, text: &str, x: f32, y: f32) {
        log::debug!(target: "canvas", "strokeText \"{}\" {} {}", text, x, y);
        let glyphs = self.glyph_paths(text, x, y);
        if glyphs.is_empty() {
            return;
        }
        let Some(paint) = self.paint_for_style(&self.state.stroke_style) else {
            return;
        };
        let stroke = self.device_stroke();
        self.draw_with_effects(|pixmap, blend_mode, mask| {
            let mut paint = paint.clone();
            paint.blend_mode = blend_mode;
            for path in &glyphs {
                pixmap.stroke_path(path, &paint, &stroke, Transform::identity(), mask);
            }
        });
    }

    /// Shape `text` and return one device-space outline per glyph.
    fn glyph_paths(&mut self, text: &str, x: f32, y: f32) -> Vec<Path> {
        if text.is_empty() {
            return Vec::new();
        }
        let Some(buffer) = shape_line(
            &mut self.font_system,
            text,
            &self.state.font,
            self.hinting_enabled,
        ) else {
            return Vec::new();
        };
        let metrics = buffer_metrics(&buffer, self.state.font.size_px);
        let base_x = x + calculate_text_x_offset(metrics.width, self.state.text_align);
        let base_y = y + calculate_text_y_offset(
            metrics.ascent,
            metrics.descent,
            self.state.text_baseline,
        );
        let transform = self.state.transform;

        let mut paths = Vec::new();
        for run in buffer.layout_runs() {
            for glyph in run.glyphs.iter() {
                let physical = glyph.physical((base_x, base_y), 1.0);
                let Some(commands) = self
                    .swash_cache
                    .get_outline_commands(&mut self.font_system, physical.cache_key)
                else {
                    continue;
                };

                // Font outlines are y-up
                let mut builder = tiny_skia::PathBuilder::new();
                for cmd in commands {
                    match *cmd {
                        Command::MoveTo(p) => builder.move_to(p.x, -p.y),
                        Command::LineTo(p) => builder.line_to(p.x, -p.y),
                        Command::QuadTo(ctrl, end) => {
                            builder.quad_to(ctrl.x, -ctrl.y, end.x, -end.y)
                        }
                        Command::CurveTo(c1, c2, end) => {
                            builder.cubic_to(c1.x, -c1.y, c2.x, -c2.y, end.x, -end.y)
                        }
                        Command::Close => builder.close(),
                    }
                }

                let glyph_x = base_x + glyph.x + glyph.font_size * glyph.x_offset;
                let glyph_y = base_y + glyph.y - glyph.font_size * glyph.y_offset;
                let glyph_transform =
                    Transform::from_translate(glyph_x, glyph_y).post_concat(transform);
                if let Some(path) = builder.finish().and_then(|p| p.transform(glyph_transform)) {
                    paths.push(path);
                }
            }
        }
        paths
    }
}

#[cfg(test)]
mod tests {
    use crate::font_config::FontConfig;
    use crate::style::TextAlign;
    use crate::Canvas2dContext;

    #[test]
    fn test_empty_font_database_draws_nothing() {
        let config = FontConfig::offline();
        let mut ctx = Canvas2dContext::with_config(50, 50, config).unwrap();
        ctx.set_font("bold 20px Inter").unwrap();
        ctx.set_text_align(TextAlign::Center);
        ctx.fill_text("hi", 25.0, 25.0);
        assert!(ctx.to_rgba().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_measure_text_falls_back_to_font_size() {
        let config = FontConfig::offline();
        let mut ctx = Canvas2dContext::with_config(10, 10, config).unwrap();
        ctx.set_font("40px sans-serif").unwrap();
        let metrics = ctx.measure_text("");
        assert_eq!(metrics.ascent, 32.0);
        assert_eq!(metrics.descent, 8.0);
    }

    #[test]
    fn test_system_font_text_covers_pixels() {
        let mut ctx = Canvas2dContext::new(200, 80).unwrap();
        if ctx.measure_text("Hello").width == 0.0 {
            // No fonts installed
            return;
        }
        ctx.set_font("bold 40px sans-serif").unwrap();
        ctx.fill_text("Hello", 10.0, 55.0);
        assert!(ctx.to_rgba().chunks(4).any(|px| px[3] > 0));
    }
}
