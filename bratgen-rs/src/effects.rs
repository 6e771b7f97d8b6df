//! Text fills, effect shadows and whole-canvas decorations.
//!
//! These functions only describe paint. The renderer turns the returned
//! values into canvas calls.

use crate::presets::{self, Aesthetic, FillStrategy, GradientDirection};
use bratgen_canvas2d::parse_color;
use std::f32::consts::TAU;
use tiny_skia::Color;

/// Source of uniform random numbers in `[0, 1)`.
pub trait RandomSource {
    fn next_f32(&mut self) -> f32;
}

/// [`RandomSource`] backed by `fastrand`.
#[derive(Debug, Clone)]
pub struct FastRandom(fastrand::Rng);

impl FastRandom {
    pub fn new() -> Self {
        Self(fastrand::Rng::new())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self(fastrand::Rng::with_seed(seed))
    }
}

impl Default for FastRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for FastRandom {
    fn next_f32(&mut self) -> f32 {
        self.0.f32()
    }
}

/// Axis-aligned box around a line of text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Resolved text paint.
#[derive(Debug, Clone, PartialEq)]
pub enum FillSpec {
    Solid(Color),
    /// Linear gradient in canvas coordinates, spanning the bounding box.
    Linear {
        start: (f32, f32),
        end: (f32, f32),
        stops: Vec<(f32, Color)>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowSpec {
    pub color: Color,
    pub blur: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

/// Parse a CSS color, falling back when it is invalid.
pub fn color_or(value: &str, fallback: Color) -> Color {
    parse_color(value).unwrap_or(fallback)
}

/// Shift each RGB channel by `delta` (in 0-255 units), clamping.
pub fn shift_color(color: Color, delta: f32) -> Color {
    let shift = |c: f32| (c + delta / 255.0).clamp(0.0, 1.0);
    Color::from_rgba(
        shift(color.red()),
        shift(color.green()),
        shift(color.blue()),
        color.alpha(),
    )
    .unwrap_or(color)
}

/// Multiply a color's alpha.
pub fn with_opacity(color: Color, opacity: f32) -> Color {
    let mut color = color;
    color.apply_opacity(opacity.clamp(0.0, 1.0));
    color
}

fn even_stops(colors: &[&str]) -> Vec<(f32, Color)> {
    let parsed: Vec<Color> = colors.iter().filter_map(|c| parse_color(c).ok()).collect();
    let last = parsed.len().saturating_sub(1).max(1) as f32;
    parsed
        .into_iter()
        .enumerate()
        .map(|(i, color)| (i as f32 / last, color))
        .collect()
}

fn linear(direction: GradientDirection, bbox: &BoundingBox, stops: Vec<(f32, Color)>) -> FillSpec {
    let BoundingBox {
        x,
        y,
        width,
        height,
    } = *bbox;
    let (start, end) = match direction {
        GradientDirection::Vertical => ((x, y), (x, y + height)),
        GradientDirection::Horizontal => ((x, y), (x + width, y)),
        GradientDirection::Diagonal => ((x, y), (x + width, y + height)),
    };
    FillSpec::Linear { start, end, stops }
}

/// Paint for text drawn with `effect` in `base` color inside `bbox`.
///
/// Unknown effects paint the base color.
pub fn resolve_fill(effect: &str, base: Color, bbox: &BoundingBox) -> FillSpec {
    match presets::effect(effect).fill {
        FillStrategy::Solid => FillSpec::Solid(base),
        FillStrategy::Fixed(color) => FillSpec::Solid(color_or(color, base)),
        FillStrategy::Bubble => linear(
            GradientDirection::Vertical,
            bbox,
            vec![
                (0.0, shift_color(base, 50.0)),
                (0.5, base),
                (1.0, shift_color(base, -50.0)),
            ],
        ),
        FillStrategy::Glossy => linear(
            GradientDirection::Vertical,
            bbox,
            vec![
                (0.0, Color::WHITE),
                (0.3, base),
                (0.7, base),
                (1.0, shift_color(base, -80.0)),
            ],
        ),
        FillStrategy::Gradient { direction, stops } => linear(direction, bbox, even_stops(stops)),
    }
}

/// Shadow an effect adds to the text, if any.
pub fn resolve_effect_shadow(effect: &str, base: Color) -> Option<ShadowSpec> {
    presets::effect(effect).shadow.map(|preset| ShadowSpec {
        color: preset.color.map_or(base, |c| color_or(c, base)),
        blur: preset.blur,
        offset_x: preset.offset_x,
        offset_y: preset.offset_y,
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverlayShape {
    Radial { cx: f32, cy: f32, radius: f32 },
    Linear { x0: f32, y0: f32, x1: f32, y1: f32 },
}

/// Full-canvas gradient wash.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub shape: OverlayShape,
    pub stops: Vec<(f32, Color)>,
    /// Composite operation name.
    pub composite: &'static str,
}

/// One primitive of a canvas decoration.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoration {
    /// White dot.
    Dot {
        x: f32,
        y: f32,
        radius: f32,
        opacity: f32,
    },
    /// Gold four-pointed star.
    Star {
        x: f32,
        y: f32,
        size: f32,
        rotation: f32,
    },
    /// Circle with a white to gray radial gradient.
    Rhinestone { x: f32, y: f32, radius: f32 },
    Overlay(Overlay),
}

pub const GLITTER_MAX: usize = 200;
pub const SPARKLES_MAX: usize = 50;
pub const RHINESTONES_MAX: usize = 30;

fn population(intensity: f32, max: usize) -> usize {
    (intensity.clamp(0.0, 100.0) / 100.0 * max as f32).floor() as usize
}

fn rgba(r: u8, g: u8, b: u8, alpha: f32) -> Color {
    Color::from_rgba8(r, g, b, (alpha.clamp(0.0, 1.0) * 255.0).round() as u8)
}

/// Decoration primitives for an aesthetic at `intensity` in [0, 100].
///
/// Particle positions come from `rng`. Intensity 0 gives nothing.
pub fn resolve_decoration(
    aesthetic: &str,
    intensity: f32,
    width: f32,
    height: f32,
    rng: &mut dyn RandomSource,
) -> Vec<Decoration> {
    let Some(aesthetic) = presets::aesthetic(aesthetic) else {
        return Vec::new();
    };
    let intensity = if intensity.is_finite() {
        intensity.clamp(0.0, 100.0)
    } else {
        0.0
    };
    if intensity == 0.0 {
        return Vec::new();
    }

    match aesthetic {
        Aesthetic::Glitter => (0..population(intensity, GLITTER_MAX))
            .map(|_| Decoration::Dot {
                x: rng.next_f32() * width,
                y: rng.next_f32() * height,
                radius: rng.next_f32() * 3.0 + 1.0,
                opacity: rng.next_f32() * 0.8 + 0.2,
            })
            .collect(),
        Aesthetic::Sparkles => (0..population(intensity, SPARKLES_MAX))
            .map(|_| Decoration::Star {
                x: rng.next_f32() * width,
                y: rng.next_f32() * height,
                size: rng.next_f32() * 8.0 + 4.0,
                rotation: rng.next_f32() * TAU,
            })
            .collect(),
        Aesthetic::Rhinestones => (0..population(intensity, RHINESTONES_MAX))
            .map(|_| Decoration::Rhinestone {
                x: rng.next_f32() * width,
                y: rng.next_f32() * height,
                radius: rng.next_f32() * 6.0 + 3.0,
            })
            .collect(),
        Aesthetic::NeonPink => vec![Decoration::Overlay(Overlay {
            shape: OverlayShape::Radial {
                cx: width / 2.0,
                cy: height / 2.0,
                radius: width.max(height),
            },
            stops: vec![
                (0.0, rgba(255, 20, 147, intensity / 200.0)),
                (1.0, rgba(255, 105, 180, intensity / 400.0)),
            ],
            composite: "source-over",
        })],
        Aesthetic::Holographic => {
            let alpha = intensity / 300.0;
            let colors = [
                (255, 0, 255),
                (0, 255, 255),
                (255, 255, 0),
                (255, 0, 0),
                (0, 255, 0),
                (0, 0, 255),
            ];
            vec![Decoration::Overlay(Overlay {
                shape: OverlayShape::Linear {
                    x0: 0.0,
                    y0: 0.0,
                    x1: width,
                    y1: height,
                },
                stops: colors
                    .iter()
                    .enumerate()
                    .map(|(i, &(r, g, b))| (i as f32 * 0.2, rgba(r, g, b, alpha)))
                    .collect(),
                composite: "screen",
            })]
        }
        Aesthetic::TextOnly => Vec::new(),
    }
}

/// Outline of a four-pointed star: tips alternate with inner corners.
pub fn star_points(x: f32, y: f32, size: f32, rotation: f32) -> [(f32, f32); 8] {
    let inner = size * 0.3;
    let local = [
        (0.0, -size),
        (inner, -inner),
        (size, 0.0),
        (inner, inner),
        (0.0, size),
        (-inner, inner),
        (-size, 0.0),
        (-inner, -inner),
    ];
    let (sin, cos) = rotation.sin_cos();
    local.map(|(px, py)| (x + px * cos - py * sin, y + px * sin + py * cos))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    /// Always returns the same value.
    struct Constant(f32);

    impl RandomSource for Constant {
        fn next_f32(&mut self) -> f32 {
            self.0
        }
    }

    fn bbox() -> BoundingBox {
        BoundingBox {
            x: 10.0,
            y: 20.0,
            width: 100.0,
            height: 50.0,
        }
    }

    fn red() -> Color {
        Color::from_rgba8(200, 0, 0, 255)
    }

    #[test]
    fn test_unknown_effect_is_solid() {
        assert_eq!(resolve_fill("sparkly-mystery", red(), &bbox()), FillSpec::Solid(red()));
        assert_eq!(resolve_effect_shadow("sparkly-mystery", red()), None);
    }

    #[test]
    fn test_bubble_is_vertical_light_to_dark() {
        let FillSpec::Linear { start, end, stops } = resolve_fill("bubble", red(), &bbox()) else {
            panic!("bubble should be a gradient");
        };
        assert_eq!((start, end), ((10.0, 20.0), (10.0, 70.0)));
        assert_eq!(stops.len(), 3);
        assert_eq!(stops[0].1.to_color_u8().red(), 250);
        assert_eq!(stops[1].1, red());
        assert_eq!(stops[2].1.to_color_u8().red(), 150);
        assert_eq!(stops[2].1.to_color_u8().green(), 0);
    }

    #[test]
    fn test_glossy_stops() {
        let FillSpec::Linear { stops, .. } = resolve_fill("glossy", red(), &bbox()) else {
            panic!("glossy should be a gradient");
        };
        let offsets: Vec<f32> = stops.iter().map(|(o, _)| *o).collect();
        assert_eq!(offsets, vec![0.0, 0.3, 0.7, 1.0]);
        assert_eq!(stops[0].1, Color::WHITE);
    }

    #[rstest]
    #[case("chrome", 6)]
    #[case("rainbow", 7)]
    #[case("gradient", 7)]
    #[case("fire", 3)]
    fn test_gradient_stop_counts(#[case] effect: &str, #[case] count: usize) {
        let FillSpec::Linear { stops, .. } = resolve_fill(effect, red(), &bbox()) else {
            panic!("{effect} should be a gradient");
        };
        assert_eq!(stops.len(), count);
        assert_eq!(stops.last().map(|(o, _)| *o), Some(1.0));
    }

    #[test]
    fn test_rainbow_runs_horizontally() {
        let FillSpec::Linear { start, end, .. } = resolve_fill("rainbow", red(), &bbox()) else {
            panic!("rainbow should be a gradient");
        };
        assert_eq!((start, end), ((10.0, 20.0), (110.0, 20.0)));
    }

    #[test]
    fn test_glow_shadow_uses_text_color() {
        let shadow = resolve_effect_shadow("glow", red()).unwrap();
        assert_eq!(shadow.color, red());
        assert_eq!(shadow.blur, 20.0);
    }

    #[rstest]
    #[case("glitter", 100.0, 200)]
    #[case("glitter", 50.0, 100)]
    #[case("sparkles", 100.0, 50)]
    #[case("sparkles", 33.0, 16)]
    #[case("rhinestones", 100.0, 30)]
    #[case("rhinestones", 0.0, 0)]
    #[case("neon-pink", 70.0, 1)]
    #[case("holographic", 100.0, 1)]
    #[case("holographic", 0.0, 0)]
    #[case("galaxy", 100.0, 0)]
    #[case("unknown", 100.0, 0)]
    fn test_decoration_population(
        #[case] aesthetic: &str,
        #[case] intensity: f32,
        #[case] expected: usize,
    ) {
        let decorations = resolve_decoration(aesthetic, intensity, 500.0, 400.0, &mut Constant(0.5));
        assert_eq!(decorations.len(), expected);
    }

    #[test]
    fn test_glitter_particle_ranges() {
        let dots = resolve_decoration("glitter", 100.0, 500.0, 400.0, &mut Constant(0.5));
        assert_eq!(
            dots[0],
            Decoration::Dot {
                x: 250.0,
                y: 200.0,
                radius: 2.5,
                opacity: 0.6
            }
        );
    }

    #[test]
    fn test_holographic_uses_screen() {
        let decorations = resolve_decoration("holographic", 60.0, 100.0, 100.0, &mut Constant(0.0));
        let Decoration::Overlay(overlay) = &decorations[0] else {
            panic!("holographic should be an overlay");
        };
        assert_eq!(overlay.composite, "screen");
        assert_eq!(overlay.stops.len(), 6);
        assert_eq!(overlay.stops[0].1.to_color_u8().alpha(), 51);
    }

    #[test]
    fn test_star_points_rotate() {
        let points = star_points(0.0, 0.0, 10.0, std::f32::consts::FRAC_PI_2);
        assert!((points[0].0 - 10.0).abs() < 1e-4);
        assert!(points[0].1.abs() < 1e-4);
    }

    #[test]
    fn test_fast_random_seeded_is_repeatable() {
        let mut a = FastRandom::with_seed(7);
        let mut b = FastRandom::with_seed(7);
        for _ in 0..10 {
            let value = a.next_f32();
            assert!((0.0..1.0).contains(&value));
            assert_eq!(value, b.next_f32());
        }
    }
}
