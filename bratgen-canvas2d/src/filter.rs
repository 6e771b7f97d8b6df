//! Layer effects: the CSS `blur()` filter and drop shadows.
//!
//! Both operate on whole premultiplied RGBA layers. The Gaussian blur is
//! approximated with three successive box blurs, each a horizontal then a
//! vertical sliding-window pass with clamped edges.

use crate::error::{Canvas2dError, Canvas2dResult};
use tiny_skia::Pixmap;

/// Parse a CSS filter value and return the blur radius it requests.
///
/// `none` and the empty string clear the filter (radius 0). Filter functions
/// other than `blur()` are accepted and ignored.
pub fn parse_filter_blur(value: &str) -> Canvas2dResult<f32> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("none") {
        return Ok(0.0);
    }

    let mut blur = 0.0;
    let mut rest = value;
    while !rest.is_empty() {
        let open = rest
            .find('(')
            .ok_or_else(|| Canvas2dError::InvalidFilter(value.to_string()))?;
        let close = rest[open..]
            .find(')')
            .map(|i| i + open)
            .ok_or_else(|| Canvas2dError::InvalidFilter(value.to_string()))?;
        let name = rest[..open].trim();
        let arg = rest[open + 1..close].trim();
        if name.eq_ignore_ascii_case("blur") {
            blur = parse_length(arg).ok_or_else(|| Canvas2dError::InvalidFilter(value.to_string()))?;
        }
        rest = rest[close + 1..].trim_start();
    }
    Ok(blur)
}

fn parse_length(arg: &str) -> Option<f32> {
    if arg.is_empty() {
        return Some(0.0);
    }
    let number = arg.strip_suffix("px").unwrap_or(arg).trim();
    number.parse::<f32>().ok().filter(|v| v.is_finite() && *v >= 0.0)
}

/// Blur a layer in place with standard deviation `sigma`.
pub fn gaussian_blur(pixmap: &mut Pixmap, sigma: f32) {
    if !(sigma.is_finite() && sigma > 0.0) {
        return;
    }
    let width = pixmap.width() as usize;
    let height = pixmap.height() as usize;
    let mut scratch = vec![0u8; width * height * 4];
    for radius in box_radii(sigma) {
        if radius == 0 {
            continue;
        }
        let data = pixmap.data_mut();
        box_blur_horizontal(data, &mut scratch, width, height, radius);
        box_blur_vertical(&scratch, data, width, height, radius);
    }
}

/// Radii of three box blurs whose composition approximates a Gaussian.
fn box_radii(sigma: f32) -> [usize; 3] {
    const PASSES: f32 = 3.0;
    let ideal = (12.0 * sigma * sigma / PASSES + 1.0).sqrt();
    let mut lower = ideal.floor() as i32;
    if lower % 2 == 0 {
        lower -= 1;
    }
    let upper = lower + 2;
    let lower_f = lower as f32;
    let split = ((12.0 * sigma * sigma
        - PASSES * lower_f * lower_f
        - 4.0 * PASSES * lower_f
        - 3.0 * PASSES)
        / (-4.0 * lower_f - 4.0))
        .round() as i32;

    let mut radii = [0usize; 3];
    for (i, radius) in radii.iter_mut().enumerate() {
        let size = if (i as i32) < split { lower } else { upper };
        *radius = ((size - 1) / 2).max(0) as usize;
    }
    radii
}

fn box_blur_horizontal(src: &[u8], dst: &mut [u8], width: usize, height: usize, radius: usize) {
    let window = (2 * radius + 1) as u32;
    let last = width - 1;
    for y in 0..height {
        let row = y * width * 4;
        let px = |x: usize, c: usize| src[row + x.min(last) * 4 + c] as u32;
        let mut acc = [0u32; 4];
        for (c, sum) in acc.iter_mut().enumerate() {
            *sum = px(0, c) * (radius as u32 + 1);
            for x in 1..=radius {
                *sum += px(x, c);
            }
        }
        for x in 0..width {
            for (c, sum) in acc.iter_mut().enumerate() {
                dst[row + x * 4 + c] = ((*sum + window / 2) / window) as u8;
                *sum += px(x + radius + 1, c);
                *sum -= px(x.saturating_sub(radius), c);
            }
        }
    }
}

fn box_blur_vertical(src: &[u8], dst: &mut [u8], width: usize, height: usize, radius: usize) {
    let window = (2 * radius + 1) as u32;
    let last = height - 1;
    for x in 0..width {
        let px = |y: usize, c: usize| src[(y.min(last) * width + x) * 4 + c] as u32;
        let mut acc = [0u32; 4];
        for (c, sum) in acc.iter_mut().enumerate() {
            *sum = px(0, c) * (radius as u32 + 1);
            for y in 1..=radius {
                *sum += px(y, c);
            }
        }
        for y in 0..height {
            for (c, sum) in acc.iter_mut().enumerate() {
                dst[(y * width + x) * 4 + c] = ((*sum + window / 2) / window) as u8;
                *sum += px(y + radius + 1, c);
                *sum -= px(y.saturating_sub(radius), c);
            }
        }
    }
}

/// A copy of `layer` where every pixel takes `color`, scaled by the layer's coverage.
pub(crate) fn silhouette(layer: &Pixmap, color: tiny_skia::Color) -> Option<Pixmap> {
    let mut out = Pixmap::new(layer.width(), layer.height())?;
    let tint = color.premultiply().to_color_u8();
    let tint = [tint.red(), tint.green(), tint.blue(), tint.alpha()];
    for (dst, src) in out
        .data_mut()
        .chunks_exact_mut(4)
        .zip(layer.data().chunks_exact(4))
    {
        let coverage = src[3] as u32;
        if coverage == 0 {
            continue;
        }
        for (d, t) in dst.iter_mut().zip(tint) {
            *d = ((t as u32 * coverage + 127) / 255) as u8;
        }
    }
    Some(out)
}
