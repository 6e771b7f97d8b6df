//! Path building operations for Canvas2dContext.
//!
//! Points are mapped through the current transform as they are added, so the
//! path builder always holds device-space coordinates.

use super::Canvas2dContext;
use crate::geometry::{ArcParams, RectParams};
use tiny_skia::{PathSegment, Transform};

impl Canvas2dContext {
    /// Begin a new path.
    pub fn begin_path(&mut self) {
        self.path_builder = tiny_skia::PathBuilder::new();
        self.has_current_point = false;
    }

    pub(crate) fn transform_point(&self, x: f32, y: f32) -> (f32, f32) {
        map_point(&self.state.transform, x, y)
    }

    /// Move to a point without drawing.
    pub fn move_to(&mut self, x: f32, y: f32) {
        let (tx, ty) = self.transform_point(x, y);
        self.path_builder.move_to(tx, ty);
        self.subpath_start = (tx, ty);
        self.has_current_point = true;
    }

    /// Draw a line to a point. Without a current point this acts as move_to.
    pub fn line_to(&mut self, x: f32, y: f32) {
        if !self.has_current_point {
            self.move_to(x, y);
            return;
        }
        let (tx, ty) = self.transform_point(x, y);
        self.path_builder.line_to(tx, ty);
    }

    /// Close the current subpath.
    pub fn close_path(&mut self) {
        if self.has_current_point {
            self.path_builder.close();
        }
    }

    /// Add a closed rectangle subpath.
    pub fn rect(&mut self, params: &RectParams) {
        let RectParams {
            x,
            y,
            width,
            height,
        } = *params;
        self.move_to(x, y);
        self.line_to(x + width, y);
        self.line_to(x + width, y + height);
        self.line_to(x, y + height);
        self.close_path();
    }

    /// Add a circular arc, connected to the current point with a line.
    pub fn arc(&mut self, params: &ArcParams) {
        let mut arc_builder = tiny_skia::PathBuilder::new();
        crate::arc::arc(&mut arc_builder, params);
        let Some(path) = arc_builder.finish() else {
            return;
        };

        let transform = self.state.transform;
        for segment in path.segments() {
            match segment {
                PathSegment::MoveTo(p) => {
                    let (x, y) = map_point(&transform, p.x, p.y);
                    if self.has_current_point {
                        self.path_builder.line_to(x, y);
                    } else {
                        self.path_builder.move_to(x, y);
                        self.subpath_start = (x, y);
                        self.has_current_point = true;
                    }
                }
                PathSegment::LineTo(p) => {
                    let (x, y) = map_point(&transform, p.x, p.y);
                    self.path_builder.line_to(x, y);
                }
                PathSegment::QuadTo(c, p) => {
                    let (cx, cy) = map_point(&transform, c.x, c.y);
                    let (x, y) = map_point(&transform, p.x, p.y);
                    self.path_builder.quad_to(cx, cy, x, y);
                }
                PathSegment::CubicTo(c1, c2, p) => {
                    let (c1x, c1y) = map_point(&transform, c1.x, c1.y);
                    let (c2x, c2y) = map_point(&transform, c2.x, c2.y);
                    let (x, y) = map_point(&transform, p.x, p.y);
                    self.path_builder.cubic_to(c1x, c1y, c2x, c2y, x, y);
                }
                PathSegment::Close => self.path_builder.close(),
            }
        }
    }
}

pub(crate) fn map_point(transform: &Transform, x: f32, y: f32) -> (f32, f32) {
    (
        transform.sx * x + transform.kx * y + transform.tx,
        transform.ky * x + transform.sy * y + transform.ty,
    )
}
