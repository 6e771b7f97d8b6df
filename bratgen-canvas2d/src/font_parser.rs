//! CSS font shorthand parsing.
//!
//! Accepts strings like `"bold 128px Inter"` or
//! `"italic 600 16px/20px 'Fredoka One', cursive"` and splits them into the
//! parts cosmic-text needs.

use crate::error::{Canvas2dError, Canvas2dResult};
use cosmic_text::{Style, Weight};

/// Font described by a CSS font shorthand.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub style: Style,
    pub weight: Weight,
    /// Font size in pixels.
    pub size_px: f32,
    /// Family names in order of preference, quotes removed.
    pub families: Vec<String>,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            style: Style::Normal,
            weight: Weight::NORMAL,
            size_px: 10.0,
            families: vec!["sans-serif".to_string()],
        }
    }
}

/// Parse a CSS font shorthand: `[style] [variant] [weight] size[/line-height] family[, family]*`.
///
/// An empty string yields the default font. A string without a size is an error.
pub fn parse_font(font_str: &str) -> Canvas2dResult<FontSpec> {
    let mut rest = font_str.trim();
    let mut font = FontSpec::default();
    if rest.is_empty() {
        return Ok(font);
    }

    loop {
        let (token, after) = next_token(rest);
        if token.is_empty() {
            return Err(Canvas2dError::InvalidFont(format!(
                "missing font size in {font_str:?}"
            )));
        }
        match token {
            "normal" | "small-caps" => {}
            "italic" => font.style = Style::Italic,
            "oblique" => font.style = Style::Oblique,
            "bold" => font.weight = Weight::BOLD,
            "bolder" => font.weight = Weight::EXTRA_BOLD,
            "lighter" => font.weight = Weight::LIGHT,
            _ => {
                if let Some(weight) = numeric_weight(token) {
                    font.weight = weight;
                } else {
                    // The size may carry a line height: "16px/20px"
                    let size_part = token.split('/').next().unwrap_or(token);
                    font.size_px = parse_size(size_part)?;
                    let families = parse_families(after);
                    if !families.is_empty() {
                        font.families = families;
                    }
                    return Ok(font);
                }
            }
        }
        rest = after;
    }
}

fn next_token(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    (&s[..end], &s[end..])
}

fn numeric_weight(token: &str) -> Option<Weight> {
    if !token.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let value: u16 = token.parse().ok()?;
    ((100..=900).contains(&value) && value % 100 == 0).then_some(Weight(value))
}

fn parse_size(token: &str) -> Canvas2dResult<f32> {
    let split = token
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(token.len());
    let (number, unit) = token.split_at(split);
    let value: f32 = number
        .parse()
        .map_err(|_| Canvas2dError::InvalidFont(format!("invalid font size {token:?}")))?;
    let scale = match unit {
        "" | "px" => 1.0,
        "pt" => 4.0 / 3.0,
        "em" | "rem" => 16.0,
        "%" => 0.16,
        other => {
            return Err(Canvas2dError::InvalidFont(format!(
                "unsupported font size unit {other:?}"
            )))
        }
    };
    Ok(value * scale)
}

fn parse_families(s: &str) -> Vec<String> {
    s.split(',')
        .map(|family| {
            family
                .trim()
                .trim_matches(|c| c == '"' || c == '\'')
                .trim()
                .to_string()
        })
        .filter(|family| !family.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_bold_family() {
        let font = parse_font("bold 128px Inter").unwrap();
        assert_eq!(font.size_px, 128.0);
        assert_eq!(font.weight, Weight::BOLD);
        assert_eq!(font.families, vec!["Inter"]);
    }

    #[test]
    fn test_quoted_family_list() {
        let font = parse_font("italic 16px/20px 'Fredoka One', \"Comic Sans MS\", cursive").unwrap();
        assert_eq!(font.style, Style::Italic);
        assert_eq!(font.size_px, 16.0);
        assert_eq!(font.families, vec!["Fredoka One", "Comic Sans MS", "cursive"]);
    }

    #[rstest]
    #[case("12pt serif", 16.0)]
    #[case("2em serif", 32.0)]
    #[case("50px serif", 50.0)]
    #[case("600 24px serif", 24.0)]
    fn test_size_units(#[case] input: &str, #[case] expected: f32) {
        let font = parse_font(input).unwrap();
        assert!((font.size_px - expected).abs() < 0.01);
    }

    #[test]
    fn test_numeric_weight() {
        assert_eq!(parse_font("600 12px Helvetica").unwrap().weight, Weight(600));
    }

    #[test]
    fn test_emoji_font_without_family_uses_default() {
        let font = parse_font("50px").unwrap();
        assert_eq!(font.families, vec!["sans-serif"]);
    }

    #[test]
    fn test_missing_size_is_error() {
        assert!(parse_font("bold Arial").is_err());
        assert!(parse_font("bold").is_err());
        assert_eq!(parse_font("").unwrap(), FontSpec::default());
    }
}
