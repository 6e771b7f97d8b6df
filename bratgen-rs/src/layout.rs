//! Text layout: word wrapping, vertical placement, and the manual
//! letter-spacing path.
//!
//! Everything here is pure apart from the [`TextMeasure`] provider, so the
//! same code lays out preview and export renders.

use crate::state::Alignment;
use bratgen_canvas2d::{parse_font, Canvas2dContext};

/// Line height as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f32 = 1.2;

/// Source of text advances.
pub trait TextMeasure {
    /// Use this CSS font for the following `measure` calls.
    fn select_font(&mut self, css_font: &str);

    /// Advance width of `text` in pixels.
    fn measure(&mut self, text: &str) -> f32;
}

impl TextMeasure for Canvas2dContext {
    fn select_font(&mut self, css_font: &str) {
        if let Err(err) = self.set_font(css_font) {
            log::warn!(target: "render", "Ignoring font {:?}: {}", css_font, err);
        }
    }

    fn measure(&mut self, text: &str) -> f32 {
        self.measure_text(text).width
    }
}

/// Measures text the way the letter-spaced path draws it, so wrapping and
/// drawing agree on line widths.
pub struct SpacedMeasure<'a> {
    inner: &'a mut dyn TextMeasure,
    spacing: f32,
}

impl<'a> SpacedMeasure<'a> {
    pub fn new(inner: &'a mut dyn TextMeasure, spacing: f32) -> Self {
        Self { inner, spacing }
    }
}

impl TextMeasure for SpacedMeasure<'_> {
    fn select_font(&mut self, css_font: &str) {
        self.inner.select_font(css_font);
    }

    fn measure(&mut self, text: &str) -> f32 {
        if self.spacing == 0.0 {
            self.inner.measure(text)
        } else {
            spaced_width(text, self.spacing, &mut *self.inner)
        }
    }
}

/// Every character advances by `em` times the font size.
///
/// Stands in for real fonts where only proportions matter.
#[derive(Debug, Clone, Copy)]
pub struct FixedAdvance {
    pub em: f32,
    size_px: f32,
}

impl FixedAdvance {
    pub fn new(em: f32) -> Self {
        Self { em, size_px: 10.0 }
    }
}

impl TextMeasure for FixedAdvance {
    fn select_font(&mut self, css_font: &str) {
        if let Ok(font) = parse_font(css_font) {
            self.size_px = font.size_px;
        }
    }

    fn measure(&mut self, text: &str) -> f32 {
        text.chars().count() as f32 * self.em * self.size_px
    }
}

/// CSS font shorthand for a size and family.
pub fn font_css(bold: bool, size_px: f32, family: &str) -> String {
    let weight = if bold { "bold " } else { "" };
    format!("{weight}{size_px}px \"{family}\"")
}

/// Greedy word wrap.
///
/// Words are separated by runs of whitespace. A word wider than `max_width`
/// is split into chunks character by character; a single character that is
/// still too wide gets a line of its own. Empty or whitespace-only text comes
/// back unchanged as one line.
pub fn wrap_text(text: &str, max_width: f32, measure: &mut dyn TextMeasure) -> Vec<String> {
    if text.trim().is_empty() {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if measure.measure(&candidate) <= max_width {
            current = candidate;
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if measure.measure(word) <= max_width {
            current = word.to_string();
            continue;
        }

        let mut chunk = String::new();
        for ch in word.chars() {
            let mut extended = chunk.clone();
            extended.push(ch);
            if chunk.is_empty() || measure.measure(&extended) <= max_width {
                chunk = extended;
            } else {
                lines.push(std::mem::replace(&mut chunk, ch.to_string()));
            }
        }
        current = chunk;
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Vertical placement of a block of lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextBlock {
    pub line_height: f32,
    pub total_height: f32,
    /// Middle baseline of the first line.
    pub first_baseline: f32,
}

impl TextBlock {
    /// Center the block on `center_y`.
    pub fn centered(line_count: usize, font_size: f32, center_y: f32) -> Self {
        let line_height = font_size * LINE_HEIGHT_FACTOR;
        let total_height = line_count as f32 * line_height;
        Self {
            line_height,
            total_height,
            first_baseline: center_y - total_height / 2.0 + line_height / 2.0,
        }
    }

    /// Center the block on `center_y`, then keep it inside
    /// `[padding, canvas_height - padding]`.
    ///
    /// A block taller than that area stays centered and overflows.
    pub fn place(
        line_count: usize,
        font_size: f32,
        center_y: f32,
        padding: f32,
        canvas_height: f32,
    ) -> Self {
        let mut block = Self::centered(line_count, font_size, center_y);
        if block.total_height <= canvas_height - 2.0 * padding {
            let min = padding + block.line_height / 2.0;
            let max = canvas_height - padding - block.total_height + block.line_height / 2.0;
            block.first_baseline = block.first_baseline.clamp(min, max);
        }
        block
    }

    pub fn baseline(&self, index: usize) -> f32 {
        self.first_baseline + index as f32 * self.line_height
    }

    pub fn top(&self) -> f32 {
        self.first_baseline - self.line_height / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.top() + self.total_height / 2.0
    }
}

/// Width of `text` drawn one character at a time with `spacing` between
/// characters (none after the last).
pub fn spaced_width(text: &str, spacing: f32, measure: &mut dyn TextMeasure) -> f32 {
    let mut buf = [0u8; 4];
    let mut count = 0usize;
    let mut width = 0.0;
    for ch in text.chars() {
        width += measure.measure(ch.encode_utf8(&mut buf));
        count += 1;
    }
    if count > 1 {
        width += spacing * (count - 1) as f32;
    }
    width
}

/// Left edge of a spaced run anchored at `anchor_x`.
pub fn spaced_start_x(anchor_x: f32, width: f32, alignment: Alignment) -> f32 {
    match alignment {
        Alignment::Left => anchor_x,
        Alignment::Center => anchor_x - width / 2.0,
        Alignment::Right => anchor_x - width,
    }
}

/// Left edge of every character of a spaced run starting at `start_x`.
pub fn char_positions(
    text: &str,
    start_x: f32,
    spacing: f32,
    measure: &mut dyn TextMeasure,
) -> Vec<(char, f32)> {
    let mut buf = [0u8; 4];
    let mut x = start_x;
    text.chars()
        .map(|ch| {
            let position = (ch, x);
            x += measure.measure(ch.encode_utf8(&mut buf)) + spacing;
            position
        })
        .collect()
}

/// Horizontal text anchor for an alignment.
pub fn anchor_x(alignment: Alignment, canvas_width: f32, padding: f32) -> f32 {
    match alignment {
        Alignment::Left => padding,
        Alignment::Center => canvas_width / 2.0,
        Alignment::Right => canvas_width - padding,
    }
}

/// Widest line and total height of a wrapped block.
pub fn block_size(lines: &[String], font_size: f32, measure: &mut dyn TextMeasure) -> (f32, f32) {
    let width = lines
        .iter()
        .map(|line| measure.measure(line))
        .fold(0.0, f32::max);
    (width, lines.len() as f32 * font_size * LINE_HEIGHT_FACTOR)
}
