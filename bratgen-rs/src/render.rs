//! One full paint pass of a [`StyleState`] onto a canvas surface.
//!
//! Paint order: background, aesthetic decoration, text (mirror copy first,
//! then outline and fill per line), stickers, selection chrome. The surface is
//! reset at the start, so every call fully replaces the previous frame.

use crate::effects::{
    color_or, resolve_decoration, resolve_effect_shadow, resolve_fill, star_points, with_opacity,
    BoundingBox, Decoration, FillSpec, Overlay, OverlayShape, RandomSource, ShadowSpec,
};
use crate::error::BratResult;
use crate::layout::{
    anchor_x, char_positions, font_css, spaced_start_x, spaced_width, wrap_text, SpacedMeasure,
    TextBlock, TextMeasure,
};
use crate::presets::{self, DEFAULT_BACKGROUND};
use crate::state::{
    sticker_delete_center, text_delete_center, Alignment, Background, ImageBackground, MirrorMode,
    OutlineKind, Shadow, StyleState, Tool,
};
use bratgen_canvas2d::{
    parse_color, ArcParams, Canvas2dContext, LineJoin, RadialGradientParams, RectParams,
    TextAlign, TextBaseline,
};
use tiny_skia::Color;

const STICKER_FAMILIES: &str = "\"Noto Color Emoji\", \"Apple Color Emoji\", sans-serif";

fn selection_color() -> Color {
    Color::from_rgba8(0x00, 0xff, 0xff, 0xff)
}

fn delete_color() -> Color {
    Color::from_rgba8(0xff, 0x44, 0x44, 0xff)
}

/// Placement of the single text block of the album cover and brat tools.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    pub font: String,
    pub lines: Vec<String>,
    /// Drawn width of each line, letter spacing included.
    pub line_widths: Vec<f32>,
    pub block: TextBlock,
    pub anchor_x: f32,
    pub alignment: Alignment,
}

impl TextLayout {
    /// Box around every line, before rotation.
    pub fn bounds(&self) -> BoundingBox {
        let (left, right) = self
            .line_widths
            .iter()
            .map(|&width| {
                let left = spaced_start_x(self.anchor_x, width, self.alignment);
                (left, left + width)
            })
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(l, r), (a, b)| {
                (l.min(a), r.max(b))
            });
        BoundingBox {
            x: left,
            y: self.block.top(),
            width: right - left,
            height: self.block.total_height,
        }
    }
}

/// Lay out the single text block of `state`.
pub fn single_text_layout(state: &StyleState, measure: &mut dyn TextMeasure) -> TextLayout {
    let width = state.canvas_width as f32;
    let height = state.canvas_height as f32;
    let family = presets::font_family(&state.font, state.tool.default_family());
    let font = font_css(state.tool == Tool::BratPro, state.font_size, family);
    measure.select_font(&font);

    let max_width = (width - 2.0 * state.padding).max(1.0);
    let mut measure = SpacedMeasure::new(measure, state.letter_spacing);
    let lines = wrap_text(&state.content, max_width, &mut measure);
    let line_widths = lines.iter().map(|line| measure.measure(line)).collect();
    let block = TextBlock::place(
        lines.len(),
        state.font_size,
        height / 2.0,
        state.padding,
        height,
    );
    TextLayout {
        font,
        lines,
        line_widths,
        block,
        anchor_x: anchor_x(state.alignment, width, state.padding),
        alignment: state.alignment,
    }
}

/// Paint `state` onto `surface`.
///
/// Invalid colors and keys fall back to defaults. Errors only come from the
/// surface itself.
pub fn render(
    surface: &mut Canvas2dContext,
    state: &StyleState,
    rng: &mut dyn RandomSource,
) -> BratResult<()> {
    log::debug!(
        target: "render",
        "Rendering {} at {}x{}",
        state.tool,
        state.canvas_width,
        state.canvas_height
    );
    if surface.width() != state.canvas_width || surface.height() != state.canvas_height {
        log::debug!(
            target: "render",
            "Surface is {}x{}, state expects {}x{}",
            surface.width(),
            surface.height(),
            state.canvas_width,
            state.canvas_height
        );
    }
    surface.reset();

    draw_background(surface, state)?;
    if let Some(aesthetic) = &state.aesthetic {
        let decorations = resolve_decoration(
            aesthetic,
            state.aesthetic_intensity,
            state.canvas_width as f32,
            state.canvas_height as f32,
            rng,
        );
        draw_decorations(surface, state, &decorations)?;
    }
    if state.tool.is_multi_element() {
        draw_text_elements(surface, state)?;
    } else {
        draw_single_text(surface, state)?;
    }
    draw_stickers(surface, state);
    draw_selection(surface, state);
    Ok(())
}

fn full_rect(state: &StyleState) -> RectParams {
    RectParams::sized(state.canvas_width as f32, state.canvas_height as f32)
}

fn default_background() -> Color {
    parse_color(DEFAULT_BACKGROUND).unwrap_or(Color::BLACK)
}

fn fill_solid(surface: &mut Canvas2dContext, color: Color, rect: &RectParams) {
    surface.set_fill_style_color(color);
    surface.fill_rect(rect);
}

fn set_fill(surface: &mut Canvas2dContext, fill: &FillSpec) -> BratResult<()> {
    match fill {
        FillSpec::Solid(color) => surface.set_fill_style_color(*color),
        FillSpec::Linear { start, end, stops } => {
            let mut gradient = surface.create_linear_gradient(start.0, start.1, end.0, end.1);
            for (offset, color) in stops {
                gradient.add_color_stop(f64::from(*offset).clamp(0.0, 1.0), *color)?;
            }
            surface.set_fill_style_gradient(gradient);
        }
    }
    Ok(())
}

fn draw_background(surface: &mut Canvas2dContext, state: &StyleState) -> BratResult<()> {
    let full = full_rect(state);
    match &state.background {
        Background::Solid { color } => {
            fill_solid(surface, color_or(color, default_background()), &full);
        }
        Background::Gradient { key } => match presets::gradient_stops(key) {
            Some(stops) => {
                let colors: Vec<Color> = stops.iter().filter_map(|c| parse_color(c).ok()).collect();
                let gradient = surface
                    .create_linear_gradient(0.0, 0.0, full.width, full.height)
                    .with_even_stops(&colors);
                surface.set_fill_style_gradient(gradient);
                surface.fill_rect(&full);
            }
            None => fill_solid(surface, default_background(), &full),
        },
        Background::Image(img) => draw_image_background(surface, img, &full)?,
        Background::Transparent => {}
    }
    Ok(())
}

fn draw_image_background(
    surface: &mut Canvas2dContext,
    img: &ImageBackground,
    full: &RectParams,
) -> BratResult<()> {
    let Some(handle) = img.image.as_ref().filter(|h| h.is_renderable()) else {
        // Same as having no image at all
        let fallback = img
            .underlay
            .as_deref()
            .or(img.overlay.as_ref().map(|o| o.color.as_str()))
            .unwrap_or(DEFAULT_BACKGROUND);
        log::debug!(target: "render", "No usable background image, filling {}", fallback);
        fill_solid(surface, color_or(fallback, default_background()), full);
        return Ok(());
    };

    if let Some(underlay) = &img.underlay {
        fill_solid(surface, color_or(underlay, default_background()), full);
    }

    // Cover fit, centered, then nudged by the offset
    let (image_w, image_h) = (handle.width() as f32, handle.height() as f32);
    let scale = (full.width / image_w).max(full.height / image_h);
    let (draw_w, draw_h) = (image_w * scale, image_h * scale);
    let dx = (full.width - draw_w) / 2.0 + img.offset_x;
    let dy = (full.height - draw_h) / 2.0 + img.offset_y;

    surface.save();
    surface.set_global_alpha(img.opacity_percent / 100.0);
    if img.blur > 0.0 {
        surface.set_filter(&format!("blur({}px)", img.blur))?;
    }
    let op = match img.blend_mode.as_str() {
        "normal" => "source-over",
        other => other,
    };
    if !surface.set_global_composite_operation(op) {
        log::warn!(target: "render", "Unknown blend mode {:?}", img.blend_mode);
    }
    let drawn = surface.draw_image_data_scaled(&handle.as_image_data(), dx, dy, draw_w, draw_h);
    surface.restore();
    drawn?;

    if let Some(overlay) = &img.overlay {
        surface.save();
        surface.set_global_alpha(overlay.opacity_percent / 100.0);
        fill_solid(surface, color_or(&overlay.color, default_background()), full);
        surface.restore();
    }
    Ok(())
}

fn draw_decorations(
    surface: &mut Canvas2dContext,
    state: &StyleState,
    decorations: &[Decoration],
) -> BratResult<()> {
    let gold = Color::from_rgba8(0xff, 0xd7, 0x00, 0xff);
    for decoration in decorations {
        match decoration {
            Decoration::Dot {
                x,
                y,
                radius,
                opacity,
            } => {
                surface.set_fill_style_color(with_opacity(Color::WHITE, *opacity));
                surface.begin_path();
                surface.arc(&ArcParams::circle(*x, *y, *radius));
                surface.fill();
            }
            Decoration::Star {
                x,
                y,
                size,
                rotation,
            } => {
                let points = star_points(*x, *y, *size, *rotation);
                surface.set_fill_style_color(gold);
                surface.begin_path();
                surface.move_to(points[0].0, points[0].1);
                for (px, py) in &points[1..] {
                    surface.line_to(*px, *py);
                }
                surface.close_path();
                surface.fill();
            }
            Decoration::Rhinestone { x, y, radius } => {
                let mut gradient =
                    surface.create_radial_gradient(&RadialGradientParams::centered(*x, *y, *radius));
                gradient.add_color_stop(0.0, Color::WHITE)?;
                gradient.add_color_stop(0.7, Color::from_rgba8(0xe0, 0xe0, 0xe0, 0xff))?;
                gradient.add_color_stop(1.0, Color::from_rgba8(0x80, 0x80, 0x80, 0xff))?;
                surface.set_fill_style_gradient(gradient);
                surface.begin_path();
                surface.arc(&ArcParams::circle(*x, *y, *radius));
                surface.fill();
            }
            Decoration::Overlay(overlay) => draw_overlay(surface, state, overlay)?,
        }
    }
    Ok(())
}

fn draw_overlay(
    surface: &mut Canvas2dContext,
    state: &StyleState,
    overlay: &Overlay,
) -> BratResult<()> {
    let mut gradient = match overlay.shape {
        OverlayShape::Radial { cx, cy, radius } => {
            surface.create_radial_gradient(&RadialGradientParams::centered(cx, cy, radius))
        }
        OverlayShape::Linear { x0, y0, x1, y1 } => surface.create_linear_gradient(x0, y0, x1, y1),
    };
    for (offset, color) in &overlay.stops {
        gradient.add_color_stop(f64::from(*offset).clamp(0.0, 1.0), *color)?;
    }
    surface.save();
    surface.set_global_composite_operation(overlay.composite);
    surface.set_fill_style_gradient(gradient);
    surface.fill_rect(&full_rect(state));
    surface.restore();
    Ok(())
}

fn text_align(alignment: Alignment) -> TextAlign {
    match alignment {
        Alignment::Left => TextAlign::Left,
        Alignment::Center => TextAlign::Center,
        Alignment::Right => TextAlign::Right,
    }
}

fn user_shadow(shadow: &Shadow) -> ShadowSpec {
    ShadowSpec {
        color: with_opacity(
            color_or(&shadow.color, Color::BLACK),
            shadow.opacity_percent / 100.0,
        ),
        blur: shadow.blur,
        offset_x: shadow.offset_x,
        offset_y: shadow.offset_y,
    }
}

fn apply_shadow(surface: &mut Canvas2dContext, shadow: &ShadowSpec) {
    surface.set_shadow_color_value(shadow.color);
    surface.set_shadow_blur(shadow.blur);
    surface.set_shadow_offset(shadow.offset_x, shadow.offset_y);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GlyphPass {
    Fill,
    Stroke,
}

/// Draw one line, through the per-character path when letter spacing is set.
fn draw_glyphs(
    surface: &mut Canvas2dContext,
    text: &str,
    x: f32,
    y: f32,
    spacing: f32,
    alignment: Alignment,
    pass: GlyphPass,
) {
    let draw = |surface: &mut Canvas2dContext, text: &str, x: f32| match pass {
        GlyphPass::Fill => surface.fill_text(text, x, y),
        GlyphPass::Stroke => surface.stroke_text(text, x, y),
    };
    if spacing == 0.0 {
        surface.set_text_align(text_align(alignment));
        draw(surface, text, x);
        return;
    }

    let width = spaced_width(text, spacing, surface);
    let start = spaced_start_x(x, width, alignment);
    surface.set_text_align(TextAlign::Left);
    let mut buf = [0u8; 4];
    for (ch, cx) in char_positions(text, start, spacing, surface) {
        draw(surface, ch.encode_utf8(&mut buf), cx);
    }
}

/// Outline then fill of one line of the single text block.
fn paint_line(
    surface: &mut Canvas2dContext,
    state: &StyleState,
    line: &str,
    x: f32,
    y: f32,
    base: Color,
    with_outline: bool,
) -> BratResult<()> {
    let spacing = state.letter_spacing;
    let width = SpacedMeasure::new(surface, spacing).measure(line);
    let bbox = BoundingBox {
        x: spaced_start_x(x, width, state.alignment),
        y: y - state.font_size / 2.0,
        width,
        height: state.font_size,
    };

    let kind = state.outline.kind;
    if with_outline && kind != OutlineKind::None {
        surface.set_stroke_style_color(color_or(&state.outline.color, Color::BLACK));
        surface.set_line_width(kind.width());
        surface.set_line_join(LineJoin::Round);
        surface.set_line_dash(kind.dash().map(Vec::from).unwrap_or_default());
        draw_glyphs(surface, line, x, y, spacing, state.alignment, GlyphPass::Stroke);
        if kind == OutlineKind::Double {
            surface.set_stroke_style_color(base);
            surface.set_line_width(kind.width() / 2.0);
            draw_glyphs(surface, line, x, y, spacing, state.alignment, GlyphPass::Stroke);
        }
        surface.set_line_dash(Vec::new());
    }

    set_fill(surface, &resolve_fill(&state.effect, base, &bbox))?;
    draw_glyphs(surface, line, x, y, spacing, state.alignment, GlyphPass::Fill);
    Ok(())
}

fn draw_single_text(surface: &mut Canvas2dContext, state: &StyleState) -> BratResult<()> {
    if state.content.trim().is_empty() {
        return Ok(());
    }
    let layout = single_text_layout(state, surface);
    let default_color = StyleState::defaults_for(state.tool).text_color;
    let base = color_or(
        &state.text_color,
        color_or(&default_color, Color::BLACK),
    );

    surface.save();
    if state.rotation != 0.0 {
        let (cx, cy) = (state.canvas_width as f32 / 2.0, state.canvas_height as f32 / 2.0);
        surface.translate(cx, cy);
        surface.rotate(state.rotation.to_radians());
        surface.translate(-cx, -cy);
    }
    if state.text_blur.enabled && state.text_blur.amount > 0.0 {
        surface.set_filter(&format!("blur({}px)", state.text_blur.amount))?;
    }
    surface.set_text_baseline(TextBaseline::Middle);
    let shadow = if state.shadow.enabled {
        Some(user_shadow(&state.shadow))
    } else {
        resolve_effect_shadow(&state.effect, base)
    };
    if let Some(shadow) = &shadow {
        apply_shadow(surface, shadow);
    }

    let drawn = draw_mirror(surface, state, &layout, base).and_then(|_| {
        layout.lines.iter().enumerate().try_for_each(|(i, line)| {
            paint_line(
                surface,
                state,
                line,
                layout.anchor_x,
                layout.block.baseline(i),
                base,
                true,
            )
        })
    });
    surface.restore();
    drawn
}

fn draw_mirror(
    surface: &mut Canvas2dContext,
    state: &StyleState,
    layout: &TextLayout,
    base: Color,
) -> BratResult<()> {
    let x = layout.anchor_x;
    let (width, height) = (state.canvas_width as f32, state.canvas_height as f32);
    let flipped_copy = |surface: &mut Canvas2dContext, alpha: f32, shift: f32| {
        surface.set_global_alpha(alpha);
        surface.scale(-1.0, 1.0);
        layout.lines.iter().enumerate().try_for_each(|(i, line)| {
            paint_line(surface, state, line, -x - shift, layout.block.baseline(i), base, false)
        })
    };

    // Reflection below the block, fading out downwards
    let block = &layout.block;
    let mirror_y = block.first_baseline + block.total_height;
    let mut fade =
        surface.create_linear_gradient(0.0, -mirror_y, 0.0, -mirror_y - block.total_height);
    fade.add_color_stop(0.0, base)?;
    fade.add_color_stop(1.0, with_opacity(base, 0.0))?;

    surface.save();
    let drawn = match state.mirror {
        MirrorMode::None => Ok(()),
        MirrorMode::Center => flipped_copy(surface, 0.3, 10.0),
        MirrorMode::Wide => flipped_copy(surface, 0.2, 50.0),
        MirrorMode::Left | MirrorMode::Right => {
            let left = if state.mirror == MirrorMode::Left {
                0.0
            } else {
                width / 2.0
            };
            surface.begin_path();
            surface.rect(&RectParams {
                x: left,
                y: 0.0,
                width: width / 2.0,
                height,
            });
            surface.clip();
            flipped_copy(surface, 0.4, 0.0)
        }
        MirrorMode::Full => {
            surface.set_global_alpha(0.3);
            surface.scale(1.0, -1.0);
            surface.set_fill_style_gradient(fade);
            surface.set_text_align(text_align(state.alignment));
            for (i, line) in layout.lines.iter().enumerate() {
                let y = mirror_y + i as f32 * block.line_height;
                draw_glyphs(
                    surface,
                    line,
                    x,
                    -y,
                    state.letter_spacing,
                    state.alignment,
                    GlyphPass::Fill,
                );
            }
            Ok(())
        }
    };
    surface.restore();
    drawn
}

fn draw_text_elements(surface: &mut Canvas2dContext, state: &StyleState) -> BratResult<()> {
    let max_width = state.element_max_width();
    // Reverse order so the first element ends up on top
    for element in state.text_elements.iter().rev() {
        if element.text.trim().is_empty() {
            continue;
        }
        let lines = element.lines(max_width, surface);
        let block = TextBlock::centered(lines.len(), element.font_size, element.y);
        let base = color_or(&element.text_color, Color::from_rgba8(0xff, 0x69, 0xb4, 0xff));

        surface.save();
        surface.set_text_align(TextAlign::Center);
        surface.set_text_baseline(TextBaseline::Middle);
        if state.shadow.enabled {
            apply_shadow(surface, &user_shadow(&state.shadow));
        }
        let outline = &state.meme_outline;
        let drawn: BratResult<()> = lines.iter().enumerate().try_for_each(|(i, line)| {
            let y = block.baseline(i);
            if outline.enabled && outline.width > 0.0 {
                surface.set_stroke_style_color(color_or(&outline.color, Color::BLACK));
                surface.set_line_width(outline.width);
                surface.set_line_join(LineJoin::Round);
                surface.stroke_text(line, element.x, y);
            }
            let width = surface.measure(line);
            let bbox = BoundingBox {
                x: element.x - width / 2.0,
                y: y - element.font_size / 2.0,
                width,
                height: element.font_size,
            };
            set_fill(surface, &resolve_fill(&element.style, base, &bbox))?;
            surface.fill_text(line, element.x, y);
            Ok(())
        });
        surface.restore();
        drawn?;
    }
    Ok(())
}

fn draw_stickers(surface: &mut Canvas2dContext, state: &StyleState) {
    for sticker in &state.stickers {
        surface.save();
        surface.select_font(&format!("{}px {}", sticker.size, STICKER_FAMILIES));
        surface.set_text_align(TextAlign::Center);
        surface.set_text_baseline(TextBaseline::Middle);
        surface.set_fill_style_color(Color::BLACK);
        surface.fill_text(&sticker.emoji, sticker.x, sticker.y);
        surface.restore();
    }
}

fn draw_handle(surface: &mut Canvas2dContext, x: f32, y: f32) {
    surface.set_fill_style_color(selection_color());
    surface.begin_path();
    surface.arc(&ArcParams::circle(x, y, 6.0));
    surface.fill();
}

/// 20x20 red square with a white cross.
fn draw_delete_button(surface: &mut Canvas2dContext, (x, y): (f32, f32)) {
    surface.set_fill_style_color(delete_color());
    surface.fill_rect(&RectParams {
        x: x - 10.0,
        y: y - 10.0,
        width: 20.0,
        height: 20.0,
    });
    surface.set_stroke_style_color(Color::WHITE);
    surface.set_line_width(3.0);
    surface.begin_path();
    surface.move_to(x - 6.0, y - 6.0);
    surface.line_to(x + 6.0, y + 6.0);
    surface.move_to(x + 6.0, y - 6.0);
    surface.line_to(x - 6.0, y + 6.0);
    surface.stroke();
}

fn draw_selection(surface: &mut Canvas2dContext, state: &StyleState) {
    let sticker = state
        .selected_sticker
        .and_then(|id| state.stickers.iter().find(|s| s.id == id));
    if let Some(sticker) = sticker {
        let reach = sticker.size / 2.0 + 5.0;
        surface.save();
        surface.set_stroke_style_color(selection_color());
        surface.set_line_width(2.0);
        surface.set_line_dash(vec![3.0, 3.0]);
        surface.begin_path();
        surface.arc(&ArcParams::circle(sticker.x, sticker.y, reach));
        surface.stroke();
        surface.set_line_dash(Vec::new());
        draw_handle(surface, sticker.x + reach, sticker.y + reach);
        draw_delete_button(surface, sticker_delete_center(sticker));
        surface.restore();
    }

    if let Some(element) = state.selected_text_element() {
        let (w, h) = element.extent(state.element_max_width(), surface);
        surface.save();
        surface.set_stroke_style_color(selection_color());
        surface.set_line_width(2.0);
        surface.set_line_dash(vec![5.0, 5.0]);
        surface.stroke_rect(&RectParams {
            x: element.x - w / 2.0 - 10.0,
            y: element.y - h / 2.0 - 10.0,
            width: w + 20.0,
            height: h + 20.0,
        });
        surface.set_line_dash(Vec::new());
        draw_handle(surface, element.x + w / 2.0 + 10.0, element.y + h / 2.0 + 10.0);
        draw_delete_button(surface, text_delete_center(element, w, h));
        surface.restore();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::FastRandom;
    use crate::image_loading::ImageHandle;
    use crate::layout::FixedAdvance;
    use crate::state::ColorOverlay;
    use bratgen_canvas2d::FontConfig;

    fn offline(state: &StyleState) -> Canvas2dContext {
        let config = FontConfig::offline();
        Canvas2dContext::with_config(state.canvas_width, state.canvas_height, config).unwrap()
    }

    fn pixel(surface: &Canvas2dContext, x: i32, y: i32) -> [u8; 4] {
        let data = surface.get_image_data(x, y, 1, 1);
        [data[0], data[1], data[2], data[3]]
    }

    fn rendered(state: &StyleState) -> Canvas2dContext {
        let mut surface = offline(state);
        render(&mut surface, state, &mut FastRandom::with_seed(1)).unwrap();
        surface
    }

    #[test]
    fn test_solid_background() {
        let surface = rendered(&StyleState::defaults_for(Tool::AlbumCover));
        assert_eq!(pixel(&surface, 5, 5), [0x8a, 0xce, 0x00, 0xff]);
    }

    #[test]
    fn test_text_without_fonts_leaves_background() {
        let mut state = StyleState::defaults_for(Tool::BratPro);
        state.content = "brat summer".to_string();
        let surface = rendered(&state);
        assert_eq!(pixel(&surface, 250, 250), pixel(&surface, 5, 5));
    }

    #[test]
    fn test_invalid_color_falls_back() {
        let mut state = StyleState::defaults_for(Tool::BratPro);
        state.background = Background::solid("not-a-color");
        let surface = rendered(&state);
        assert_eq!(pixel(&surface, 5, 5), [0x8a, 0xce, 0x00, 0xff]);
    }

    #[test]
    fn test_gradient_background_runs_corner_to_corner() {
        let mut state = StyleState::defaults_for(Tool::BratPro);
        state.background = Background::Gradient {
            key: "luxe".to_string(),
        };
        let surface = rendered(&state);
        let top_left = pixel(&surface, 1, 1);
        let bottom_right = pixel(&surface, 498, 498);
        assert!(top_left[0] > 0x40);
        assert!(bottom_right[0] < 0x08);
    }

    #[test]
    fn test_transparent_background() {
        let mut state = StyleState::defaults_for(Tool::Meme);
        state.background = Background::Transparent;
        let surface = rendered(&state);
        assert_eq!(pixel(&surface, 5, 5)[3], 0);
    }

    #[test]
    fn test_image_background_cover_fit() {
        let mut state = StyleState::defaults_for(Tool::AlbumCover);
        let red_blue = [255, 0, 0, 255, 0, 0, 255, 255].to_vec();
        state.set_background_image(ImageHandle::from_rgba(red_blue, 2, 1));
        state.canvas_width = 200;
        state.canvas_height = 200;
        let surface = rendered(&state);
        // 2x1 covers 200x200 as 400x200, so the middle 200 columns show
        let left = pixel(&surface, 2, 100);
        let right = pixel(&surface, 197, 100);
        assert!(left[0] > 240 && left[2] < 15, "{left:?}");
        assert!(right[2] > 240 && right[0] < 15, "{right:?}");
    }

    #[test]
    fn test_missing_image_uses_overlay_color() {
        let mut state = StyleState::defaults_for(Tool::AlbumCover);
        state.background = Background::Image(ImageBackground {
            image: Some(ImageHandle::unloaded()),
            overlay: Some(ColorOverlay {
                color: "#0000ff".to_string(),
                opacity_percent: 30.0,
            }),
            ..ImageBackground::default()
        });
        let surface = rendered(&state);
        assert_eq!(pixel(&surface, 5, 5), [0, 0, 255, 255]);
    }

    #[test]
    fn test_overlay_tints_image() {
        let mut state = StyleState::defaults_for(Tool::AlbumCover);
        state.set_background_image(ImageHandle::from_rgba(vec![0, 0, 0, 255], 1, 1));
        if let Background::Image(img) = &mut state.background {
            img.overlay = Some(ColorOverlay {
                color: "#ffffff".to_string(),
                opacity_percent: 50.0,
            });
        }
        let surface = rendered(&state);
        let [r, g, b, a] = pixel(&surface, 100, 100);
        assert_eq!(a, 255);
        for channel in [r, g, b] {
            assert!((channel as i32 - 128).abs() <= 2);
        }
    }

    #[test]
    fn test_render_is_idempotent() {
        let mut state = StyleState::defaults_for(Tool::BratPro);
        state.mirror = MirrorMode::Center;
        state.outline.kind = OutlineKind::Dashed;
        let mut surface = offline(&state);
        render(&mut surface, &state, &mut FastRandom::new()).unwrap();
        let first = surface.to_rgba();
        render(&mut surface, &state, &mut FastRandom::new()).unwrap();
        assert_eq!(first, surface.to_rgba());
    }

    #[test]
    fn test_selected_sticker_draws_chrome() {
        let mut state = StyleState::defaults_for(Tool::Meme);
        state.add_sticker("👑", 100.0, 100.0);
        let surface = rendered(&state);
        // Delete button centered at (135, 65), away from the white cross
        assert_eq!(pixel(&surface, 135, 58), [0xff, 0x44, 0x44, 0xff]);
        // Resize handle at (130, 130)
        assert_eq!(pixel(&surface, 130, 130), [0x00, 0xff, 0xff, 0xff]);

        state.clear_selection();
        let surface = rendered(&state);
        assert_eq!(pixel(&surface, 135, 58), [0x8a, 0xce, 0x00, 0xff]);
    }

    #[test]
    fn test_holographic_lightens_background() {
        let mut state = StyleState::defaults_for(Tool::Meme);
        state.text_elements[0].selected = false;
        state.aesthetic = Some("holographic".to_string());
        state.aesthetic_intensity = 100.0;
        let surface = rendered(&state);
        let [r, _, b, _] = pixel(&surface, 2, 2);
        assert!(r > 0x8a);
        assert!(b > 0x00);
    }

    #[test]
    fn test_single_text_layout_centers_block() {
        let mut state = StyleState::defaults_for(Tool::AlbumCover);
        state.content = "brat summer".to_string();
        let mut measure = FixedAdvance::new(0.5);
        let layout = single_text_layout(&state, &mut measure);
        // 11 chars at 64px each is wider than 420px, so two lines
        assert_eq!(layout.lines, vec!["brat", "summer"]);
        let bounds = layout.bounds();
        assert!((bounds.x + bounds.width / 2.0 - 250.0).abs() < 0.01);
        assert!((bounds.y + bounds.height / 2.0 - 250.0).abs() < 0.01);
        assert_eq!(layout.font, "128px \"Inter\"");
    }

    #[test]
    fn test_letter_spacing_widens_layout() {
        let mut state = StyleState::defaults_for(Tool::BratPro);
        let mut measure = FixedAdvance::new(0.5);
        let plain = single_text_layout(&state, &mut measure).bounds().width;
        state.letter_spacing = 10.0;
        let spaced = single_text_layout(&state, &mut measure).bounds().width;
        assert_eq!(spaced, plain + 30.0);
    }

    #[test]
    fn test_letter_spacing_wraps_within_padding() {
        let mut state = StyleState::defaults_for(Tool::BratPro);
        state.content = "bratty".to_string();
        state.letter_spacing = 40.0;
        let mut measure = FixedAdvance::new(0.5);
        let layout = single_text_layout(&state, &mut measure);
        let max_width = state.canvas_width as f32 - 2.0 * state.padding;
        assert!(layout.lines.len() > 1);
        assert!(layout.line_widths.iter().all(|w| *w <= max_width + 1e-3));
        let bounds = layout.bounds();
        assert!(bounds.x >= state.padding - 1e-3);
        assert!(bounds.x + bounds.width <= state.canvas_width as f32 - state.padding + 1e-3);
    }
}
