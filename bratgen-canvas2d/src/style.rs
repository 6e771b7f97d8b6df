//! Paint and text style enums.
//!
//! Each keyword enum parses from its canvas keyword (`"round"`, `"middle"`,
//! `"evenodd"`, ...) so callers holding strings can ignore unknown values the
//! way a browser canvas does.

use crate::gradient::CanvasGradient;
use std::str::FromStr;

/// What a fill or stroke paints with.
#[derive(Debug, Clone)]
pub enum FillStyle {
    Color(tiny_skia::Color),
    /// Linear or radial; the gradient carries its own geometry.
    Gradient(CanvasGradient),
}

impl Default for FillStyle {
    fn default() -> Self {
        FillStyle::Color(tiny_skia::Color::BLACK)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

/// Horizontal placement of text relative to its anchor x.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Right,
    Center,
}

/// Vertical placement of text relative to its anchor y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextBaseline {
    Top,
    Middle,
    #[default]
    Alphabetic,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CanvasFillRule {
    #[default]
    NonZero,
    EvenOdd,
}

impl FromStr for LineCap {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "butt" => Ok(LineCap::Butt),
            "round" => Ok(LineCap::Round),
            "square" => Ok(LineCap::Square),
            _ => Err(format!("unknown line cap: {s}")),
        }
    }
}

impl FromStr for LineJoin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "miter" => Ok(LineJoin::Miter),
            "round" => Ok(LineJoin::Round),
            "bevel" => Ok(LineJoin::Bevel),
            _ => Err(format!("unknown line join: {s}")),
        }
    }
}

impl FromStr for TextAlign {
    type Err = String;

    /// `start` and `end` resolve for left-to-right text.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" | "start" => Ok(TextAlign::Left),
            "right" | "end" => Ok(TextAlign::Right),
            "center" => Ok(TextAlign::Center),
            _ => Err(format!("unknown text align: {s}")),
        }
    }
}

impl FromStr for TextBaseline {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top" | "hanging" => Ok(TextBaseline::Top),
            "middle" => Ok(TextBaseline::Middle),
            "alphabetic" => Ok(TextBaseline::Alphabetic),
            "bottom" | "ideographic" => Ok(TextBaseline::Bottom),
            _ => Err(format!("unknown text baseline: {s}")),
        }
    }
}

impl FromStr for CanvasFillRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nonzero" => Ok(CanvasFillRule::NonZero),
            "evenodd" => Ok(CanvasFillRule::EvenOdd),
            _ => Err(format!("unknown fill rule: {s}")),
        }
    }
}

impl From<LineCap> for tiny_skia::LineCap {
    fn from(cap: LineCap) -> Self {
        match cap {
            LineCap::Butt => tiny_skia::LineCap::Butt,
            LineCap::Round => tiny_skia::LineCap::Round,
            LineCap::Square => tiny_skia::LineCap::Square,
        }
    }
}

impl From<LineJoin> for tiny_skia::LineJoin {
    fn from(join: LineJoin) -> Self {
        match join {
            LineJoin::Miter => tiny_skia::LineJoin::Miter,
            LineJoin::Round => tiny_skia::LineJoin::Round,
            LineJoin::Bevel => tiny_skia::LineJoin::Bevel,
        }
    }
}

impl From<CanvasFillRule> for tiny_skia::FillRule {
    fn from(rule: CanvasFillRule) -> Self {
        match rule {
            CanvasFillRule::NonZero => tiny_skia::FillRule::Winding,
            CanvasFillRule::EvenOdd => tiny_skia::FillRule::EvenOdd,
        }
    }
}
