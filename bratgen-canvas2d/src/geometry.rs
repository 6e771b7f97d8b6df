//! Named parameter groups for drawing calls.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectParams {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl RectParams {
    /// A rectangle anchored at the origin, e.g. a whole surface.
    pub fn sized(width: f32, height: f32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
        }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}

/// A circular arc. Angles are radians, measured clockwise from +x in
/// screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcParams {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub start_angle: f32,
    pub end_angle: f32,
    pub anticlockwise: bool,
}

impl ArcParams {
    pub fn circle(x: f32, y: f32, radius: f32) -> Self {
        Self {
            x,
            y,
            radius,
            start_angle: 0.0,
            end_angle: std::f32::consts::TAU,
            anticlockwise: false,
        }
    }
}

/// Two circles; color runs from the start circle to the end circle.
/// The rasterizer only honors `r1`, so the start circle acts as a focal point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialGradientParams {
    pub x0: f32,
    pub y0: f32,
    pub r0: f32,
    pub x1: f32,
    pub y1: f32,
    pub r1: f32,
}

impl RadialGradientParams {
    /// Gradient from the center point out to `radius`.
    pub fn centered(x: f32, y: f32, radius: f32) -> Self {
        Self {
            x0: x,
            y0: y,
            r0: 0.0,
            x1: x,
            y1: y,
            r1: radius,
        }
    }
}

/// Borrowed premultiplied RGBA rows, `width * height * 4` bytes.
#[derive(Debug, Clone, Copy)]
pub struct CanvasImageDataRef<'a> {
    pub data: &'a [u8],
    pub width: u32,
    pub height: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains_edges() {
        let rect = RectParams {
            x: 10.0,
            y: 10.0,
            width: 20.0,
            height: 5.0,
        };
        assert!(rect.contains(10.0, 15.0));
        assert!(rect.contains(30.0, 10.0));
        assert!(!rect.contains(30.5, 12.0));
        assert!(!RectParams::sized(4.0, 4.0).contains(-0.1, 2.0));
    }
}
