//! Gradient types for Canvas 2D operations.

use crate::error::{Canvas2dError, Canvas2dResult};
use crate::geometry::RadialGradientParams;

/// A color stop in a gradient.
#[derive(Debug, Clone)]
pub struct GradientStop {
    /// Offset position (0.0 to 1.0).
    pub offset: f64,
    /// Color at this stop.
    pub color: tiny_skia::Color,
}

/// Canvas gradient (linear or radial).
#[derive(Debug, Clone)]
pub struct CanvasGradient {
    /// Gradient type and geometry.
    pub gradient_type: GradientType,
    /// Color stops, kept sorted by offset.
    pub stops: Vec<GradientStop>,
}

/// Type of gradient.
#[derive(Debug, Clone)]
pub enum GradientType {
    /// Linear gradient from (x0, y0) to (x1, y1).
    Linear { x0: f32, y0: f32, x1: f32, y1: f32 },
    /// Radial gradient from inner circle to outer circle.
    Radial(RadialGradientParams),
}

impl CanvasGradient {
    /// Create a new linear gradient.
    pub fn new_linear(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            gradient_type: GradientType::Linear { x0, y0, x1, y1 },
            stops: Vec::new(),
        }
    }

    /// Create a new radial gradient.
    pub fn new_radial(params: &RadialGradientParams) -> Self {
        Self {
            gradient_type: GradientType::Radial(*params),
            stops: Vec::new(),
        }
    }

    /// Add a color stop to the gradient.
    ///
    /// Offsets outside `[0, 1]` (or NaN) are rejected and leave the gradient unchanged.
    /// Stops with equal offsets keep their insertion order.
    pub fn add_color_stop(&mut self, offset: f64, color: tiny_skia::Color) -> Canvas2dResult<()> {
        if !(0.0..=1.0).contains(&offset) {
            return Err(Canvas2dError::InvalidGradientStop(offset));
        }
        let index = self.stops.partition_point(|stop| stop.offset <= offset);
        self.stops.insert(index, GradientStop { offset, color });
        Ok(())
    }

    /// Add evenly spaced stops, the first at 0 and the last at 1.
    pub fn with_even_stops(mut self, colors: &[tiny_skia::Color]) -> Self {
        let last = colors.len().saturating_sub(1).max(1) as f64;
        for (i, color) in colors.iter().enumerate() {
            let _ = self.add_color_stop(i as f64 / last, *color);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stops_sorted_on_insert() {
        let mut gradient = CanvasGradient::new_linear(0.0, 0.0, 10.0, 0.0);
        gradient.add_color_stop(1.0, tiny_skia::Color::WHITE).unwrap();
        gradient.add_color_stop(0.0, tiny_skia::Color::BLACK).unwrap();
        gradient.add_color_stop(0.5, tiny_skia::Color::BLACK).unwrap();
        let offsets: Vec<f64> = gradient.stops.iter().map(|s| s.offset).collect();
        assert_eq!(offsets, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_invalid_stop_rejected() {
        let mut gradient = CanvasGradient::new_linear(0.0, 0.0, 10.0, 0.0);
        assert!(matches!(
            gradient.add_color_stop(1.5, tiny_skia::Color::WHITE),
            Err(Canvas2dError::InvalidGradientStop(_))
        ));
        assert!(gradient.add_color_stop(f64::NAN, tiny_skia::Color::WHITE).is_err());
        assert!(gradient.stops.is_empty());
    }

    #[test]
    fn test_even_stops() {
        let colors = [tiny_skia::Color::BLACK; 4];
        let gradient = CanvasGradient::new_linear(0.0, 0.0, 1.0, 1.0).with_even_stops(&colors);
        let offsets: Vec<f64> = gradient.stops.iter().map(|s| s.offset).collect();
        assert_eq!(offsets.len(), 4);
        assert!((offsets[1] - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(offsets[3], 1.0);
    }
}
