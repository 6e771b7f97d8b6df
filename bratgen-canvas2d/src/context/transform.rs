//! Transform operations for Canvas2dContext.

use super::Canvas2dContext;
use tiny_skia::Transform;

impl Canvas2dContext {
    pub fn translate(&mut self, x: f32, y: f32) {
        log::debug!(target: "canvas", "translate {} {}", x, y);
        self.state.transform = self.state.transform.pre_translate(x, y);
    }

    /// Rotate by `angle` radians, clockwise in screen space.
    pub fn rotate(&mut self, angle: f32) {
        log::debug!(target: "canvas", "rotate {}", angle);
        let (sin, cos) = angle.sin_cos();
        let rotation = Transform::from_row(cos, sin, -sin, cos, 0.0, 0.0);
        self.state.transform = self.state.transform.pre_concat(rotation);
    }

    pub fn scale(&mut self, x: f32, y: f32) {
        log::debug!(target: "canvas", "scale {} {}", x, y);
        self.state.transform = self.state.transform.pre_scale(x, y);
    }

    /// Replace the current transform.
    pub fn set_transform(&mut self, transform: Transform) {
        self.state.transform = transform;
    }

    pub fn reset_transform(&mut self) {
        self.state.transform = Transform::identity();
    }

    pub fn get_transform(&self) -> Transform {
        self.state.transform
    }
}

#[cfg(test)]
mod tests {
    use crate::font_config::FontConfig;
    use crate::Canvas2dContext;

    #[test]
    fn test_rotate_about_center() {
        let config = FontConfig::offline();
        let mut ctx = Canvas2dContext::with_config(100, 100, config).unwrap();
        ctx.translate(50.0, 50.0);
        ctx.rotate(std::f32::consts::FRAC_PI_2);
        ctx.translate(-50.0, -50.0);
        // (100, 50) rotates a quarter turn clockwise around the center to (50, 100)
        let (x, y) = ctx.transform_point(100.0, 50.0);
        assert!((x - 50.0).abs() < 1e-4);
        assert!((y - 100.0).abs() < 1e-4);
    }
}
