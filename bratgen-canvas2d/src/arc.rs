//! Arc approximation with cubic bezier curves.
//!
//! tiny-skia has no arc primitive, so arcs are split into segments of at most
//! a quarter turn, each drawn as one cubic.

use crate::geometry::ArcParams;
use std::f32::consts::{FRAC_PI_2, TAU};
use tiny_skia::PathBuilder;

/// Append an arc to `path`, starting a new subpath at the arc start.
pub fn arc(path: &mut PathBuilder, params: &ArcParams) {
    let ArcParams {
        x,
        y,
        radius,
        start_angle,
        end_angle,
        anticlockwise,
    } = *params;
    if radius.is_nan() || radius <= 0.0 || !start_angle.is_finite() || !end_angle.is_finite() {
        return;
    }

    let span = sweep(start_angle, end_angle, anticlockwise);
    let segments = ((span.abs() / FRAC_PI_2).ceil() as usize).max(1);
    let step = span / segments as f32;

    path.move_to(x + radius * start_angle.cos(), y + radius * start_angle.sin());
    for i in 0..segments {
        let a0 = start_angle + step * i as f32;
        let a1 = a0 + step;
        let k = 4.0 / 3.0 * ((a1 - a0) / 4.0).tan();
        let (s0, c0) = a0.sin_cos();
        let (s1, c1) = a1.sin_cos();
        path.cubic_to(
            x + radius * (c0 - k * s0),
            y + radius * (s0 + k * c0),
            x + radius * (c1 + k * s1),
            y + radius * (s1 - k * c1),
            x + radius * c1,
            y + radius * s1,
        );
    }
}

/// Signed sweep from start to end, limited to one full turn.
fn sweep(start: f32, end: f32, anticlockwise: bool) -> f32 {
    let delta = end - start;
    if anticlockwise {
        if delta <= -TAU {
            -TAU
        } else {
            -((start - end).rem_euclid(TAU))
        }
    } else if delta >= TAU {
        TAU
    } else {
        delta.rem_euclid(TAU)
    }
}
