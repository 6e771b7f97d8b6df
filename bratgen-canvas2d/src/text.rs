//! Text shaping and measurement using cosmic-text.

use crate::font_config::has_family;
use crate::font_parser::FontSpec;
use crate::style::{TextAlign, TextBaseline};
use cosmic_text::{Attrs, Buffer, CacheKeyFlags, Family, FontSystem, Metrics, Shaping};

/// Text metrics returned by measure_text().
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextMetrics {
    /// Advance width of the text in pixels.
    pub width: f32,
    /// Distance from the alphabetic baseline to the top of the line box.
    pub ascent: f32,
    /// Distance from the alphabetic baseline to the bottom of the line box.
    pub descent: f32,
}

/// Pick the first family from a CSS family list that the database can serve.
///
/// Generic keywords map to cosmic-text generic families. Unknown names are
/// skipped, and the list falls back to sans-serif.
pub(crate) fn resolve_family<'a>(db: &fontdb::Database, families: &'a [String]) -> Family<'a> {
    for name in families {
        match name.to_ascii_lowercase().as_str() {
            "serif" => return Family::Serif,
            "sans-serif" => return Family::SansSerif,
            "monospace" => return Family::Monospace,
            "cursive" => return Family::Cursive,
            "fantasy" => return Family::Fantasy,
            _ => {}
        }
        if has_family(db, name) {
            return Family::Name(name);
        }
    }
    Family::SansSerif
}

/// Shape `text` into a single-line buffer.
///
/// Returns `None` when the font database has no faces at all, since
/// cosmic-text cannot shape without a default font.
pub(crate) fn shape_line(
    font_system: &mut FontSystem,
    text: &str,
    font: &FontSpec,
    hinting_enabled: bool,
) -> Option<Buffer> {
    if font_system.db().faces().next().is_none() {
        log::warn!(target: "canvas", "no fonts loaded, skipping text {:?}", text);
        return None;
    }
    let metrics = Metrics::new(font.size_px, font.size_px * 1.2);
    let mut buffer = Buffer::new(font_system, metrics);
    let family = resolve_family(font_system.db(), &font.families);
    let mut attrs = Attrs::new().family(family).weight(font.weight).style(font.style);
    if !hinting_enabled {
        attrs = attrs.cache_key_flags(CacheKeyFlags::DISABLE_HINTING);
    }
    buffer.set_text(font_system, text, &attrs, Shaping::Advanced, None);
    buffer.shape_until_scroll(font_system, false);
    Some(buffer)
}

/// Width and vertical extents of a shaped buffer.
///
/// When no glyph runs are produced the font size is split 0.8 / 0.2 between
/// ascent and descent.
pub(crate) fn buffer_metrics(buffer: &Buffer, size_px: f32) -> TextMetrics {
    let mut metrics = TextMetrics::default();
    for run in buffer.layout_runs() {
        metrics.width = metrics.width.max(run.line_w);
        metrics.ascent = metrics.ascent.max(run.line_y - run.line_top);
        metrics.descent = metrics
            .descent
            .max((run.line_top + run.line_height) - run.line_y);
    }
    if metrics.ascent == 0.0 && metrics.descent == 0.0 {
        return size_metrics(metrics.width, size_px);
    }
    metrics
}

fn size_metrics(width: f32, size_px: f32) -> TextMetrics {
    TextMetrics {
        width,
        ascent: size_px * 0.8,
        descent: size_px * 0.2,
    }
}

/// Measure text using cosmic-text.
pub fn measure_text(
    font_system: &mut FontSystem,
    text: &str,
    font: &FontSpec,
    hinting_enabled: bool,
) -> TextMetrics {
    match shape_line(font_system, text, font, hinting_enabled) {
        Some(buffer) => buffer_metrics(&buffer, font.size_px),
        None => size_metrics(0.0, font.size_px),
    }
}

/// X offset from the anchor to the left edge of the text.
pub fn calculate_text_x_offset(width: f32, align: TextAlign) -> f32 {
    match align {
        TextAlign::Left => 0.0,
        TextAlign::Right => -width,
        TextAlign::Center => -width / 2.0,
    }
}

/// Y offset from the anchor to the alphabetic baseline.
pub fn calculate_text_y_offset(ascent: f32, descent: f32, baseline: TextBaseline) -> f32 {
    match baseline {
        TextBaseline::Top => ascent,
        TextBaseline::Middle => (ascent - descent) / 2.0,
        TextBaseline::Alphabetic => 0.0,
        TextBaseline::Bottom => -descent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_x_offsets() {
        assert_eq!(calculate_text_x_offset(100.0, TextAlign::Left), 0.0);
        assert_eq!(calculate_text_x_offset(100.0, TextAlign::Center), -50.0);
        assert_eq!(calculate_text_x_offset(100.0, TextAlign::Right), -100.0);
    }

    #[test]
    fn test_middle_baseline_centers_line_box() {
        // ascent 80, descent 20: the middle of the box sits 30px above the baseline
        assert_eq!(calculate_text_y_offset(80.0, 20.0, TextBaseline::Middle), 30.0);
        assert_eq!(calculate_text_y_offset(80.0, 20.0, TextBaseline::Top), 80.0);
        assert_eq!(calculate_text_y_offset(80.0, 20.0, TextBaseline::Bottom), -20.0);
    }

    #[test]
    fn test_resolve_family_generic_and_fallback() {
        let db = fontdb::Database::new();
        let families = vec!["Nope Sans".to_string(), "monospace".to_string()];
        assert!(matches!(resolve_family(&db, &families), Family::Monospace));
        let unknown = vec!["Nope Sans".to_string()];
        assert!(matches!(resolve_family(&db, &unknown), Family::SansSerif));
    }

    #[test]
    fn test_empty_database_measures_from_font_size() {
        let mut font_system =
            FontSystem::new_with_locale_and_db("en".to_string(), fontdb::Database::new());
        let font = crate::font_parser::parse_font("50px Inter").unwrap();
        assert!(shape_line(&mut font_system, "brat", &font, false).is_none());
        let metrics = measure_text(&mut font_system, "brat", &font, false);
        assert_eq!(metrics.width, 0.0);
        assert_eq!(metrics.ascent, 40.0);
        assert_eq!(metrics.descent, 10.0);
    }
}
