//! Image drawing, pixel data, and PNG output operations for Canvas2dContext.

use super::Canvas2dContext;
use crate::error::{Canvas2dError, Canvas2dResult};
use crate::geometry::CanvasImageDataRef;
use tiny_skia::{PixmapPaint, PixmapRef};

impl Canvas2dContext {
    /// Draw premultiplied image data scaled into the destination rectangle.
    ///
    /// Shadow, filter, global alpha, composite operation, and clip all apply.
    pub fn draw_image_data_scaled(
        &mut self,
        image: &CanvasImageDataRef<'_>,
        dx: f32,
        dy: f32,
        dw: f32,
        dh: f32,
    ) -> Canvas2dResult<()> {
        log::debug!(target: "canvas", "drawImage {}x{} at {} {} {} {}", image.width, image.height, dx, dy, dw, dh);
        let expected = image.width as usize * image.height as usize * 4;
        if image.data.len() != expected {
            return Err(Canvas2dError::InvalidImageData {
                expected,
                actual: image.data.len(),
            });
        }
        let Some(source) = PixmapRef::from_bytes(image.data, image.width, image.height) else {
            return Err(Canvas2dError::InvalidDimensions {
                width: image.width,
                height: image.height,
            });
        };
        if dw <= 0.0 || dh <= 0.0 {
            return Ok(());
        }
        self.draw_pixmap_ref(source, dx, dy, dw, dh);
        Ok(())
    }

    /// Draw another canvas scaled into the destination rectangle.
    pub fn draw_canvas(&mut self, source: &Canvas2dContext, dx: f32, dy: f32, dw: f32, dh: f32) {
        if dw <= 0.0 || dh <= 0.0 {
            return;
        }
        self.draw_pixmap_ref(source.pixmap.as_ref(), dx, dy, dw, dh);
    }

    fn draw_pixmap_ref(&mut self, source: PixmapRef<'_>, dx: f32, dy: f32, dw: f32, dh: f32) {
        let transform = self
            .state
            .transform
            .pre_translate(dx, dy)
            .pre_scale(dw / source.width() as f32, dh / source.height() as f32);
        let opacity = self.state.global_alpha;
        self.draw_with_effects(|pixmap, blend_mode, mask| {
            let paint = PixmapPaint {
                opacity,
                blend_mode,
                quality: tiny_skia::FilterQuality::Bilinear,
            };
            pixmap.draw_pixmap(0, 0, source, &paint, transform, mask);
        });
    }

    /// Get straight-alpha RGBA data for a region of the canvas.
    ///
    /// Pixels outside the canvas read as transparent black.
    pub fn get_image_data(&self, x: i32, y: i32, width: u32, height: u32) -> Vec<u8> {
        let mut data = vec![0u8; (width * height * 4) as usize];
        let source = self.pixmap.data();

        for dy in 0..height {
            for dx in 0..width {
                let src_x = x + dx as i32;
                let src_y = y + dy as i32;
                if src_x < 0
                    || src_x >= self.width as i32
                    || src_y < 0
                    || src_y >= self.height as i32
                {
                    continue;
                }
                let src_idx = (src_y as u32 * self.width + src_x as u32) as usize * 4;
                let dst_idx = ((dy * width + dx) * 4) as usize;
                let pixel = &source[src_idx..src_idx + 4];
                data[dst_idx..dst_idx + 4].copy_from_slice(&unpremultiply(pixel));
            }
        }
        data
    }

    /// Straight-alpha RGBA data for the whole canvas.
    pub fn to_rgba(&self) -> Vec<u8> {
        self.get_image_data(0, 0, self.width, self.height)
    }

    /// Export the canvas as PNG data.
    ///
    /// `ppi` sets the pixel density metadata and defaults to 72.
    pub fn to_png(&self, ppi: Option<f32>) -> Canvas2dResult<Vec<u8>> {
        let ppi = ppi.unwrap_or(72.0);

        let mut buf = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut buf, self.width, self.height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);

            // Pixels per meter
            let ppm = (ppi.max(0.0) / 0.0254).round() as u32;
            encoder.set_pixel_dims(Some(png::PixelDimensions {
                xppu: ppm,
                yppu: ppm,
                unit: png::Unit::Meter,
            }));

            let mut writer = encoder.write_header()?;
            writer.write_image_data(&self.to_rgba())?;
        }
        Ok(buf)
    }
}

fn unpremultiply(pixel: &[u8]) -> [u8; 4] {
    match pixel[3] {
        0 => [0, 0, 0, 0],
        255 => [pixel[0], pixel[1], pixel[2], 255],
        a => {
            let alpha = a as f32 / 255.0;
            [
                (pixel[0] as f32 / alpha).round().min(255.0) as u8,
                (pixel[1] as f32 / alpha).round().min(255.0) as u8,
                (pixel[2] as f32 / alpha).round().min(255.0) as u8,
                a,
            ]
        }
    }
}

/// Convert straight-alpha RGBA bytes to premultiplied alpha in place.
pub fn premultiply_rgba(data: &mut [u8]) {
    for px in data.chunks_exact_mut(4) {
        let a = px[3] as u16;
        match a {
            255 => {}
            0 => px[..3].fill(0),
            _ => {
                for c in &mut px[..3] {
                    *c = ((*c as u16 * a + 127) / 255) as u8;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font_config::FontConfig;
    use crate::geometry::RectParams;

    fn offline(width: u32, height: u32) -> Canvas2dContext {
        let config = FontConfig::offline();
        Canvas2dContext::with_config(width, height, config).unwrap()
    }

    #[test]
    fn test_draw_image_scales_to_destination() {
        let mut ctx = offline(20, 20);
        let red = [255u8, 0, 0, 255].repeat(4);
        let image = CanvasImageDataRef {
            data: &red,
            width: 2,
            height: 2,
        };
        ctx.draw_image_data_scaled(&image, 0.0, 0.0, 10.0, 10.0)
            .unwrap();
        assert_eq!(ctx.get_image_data(5, 5, 1, 1), vec![255, 0, 0, 255]);
        assert_eq!(ctx.get_image_data(15, 15, 1, 1)[3], 0);
    }

    #[test]
    fn test_draw_image_rejects_short_buffer() {
        let mut ctx = offline(10, 10);
        let image = CanvasImageDataRef {
            data: &[0u8; 7],
            width: 2,
            height: 2,
        };
        assert!(matches!(
            ctx.draw_image_data_scaled(&image, 0.0, 0.0, 2.0, 2.0),
            Err(Canvas2dError::InvalidImageData {
                expected: 16,
                actual: 7
            })
        ));
    }

    #[test]
    fn test_premultiply_and_unpremultiply() {
        let mut data = vec![200u8, 100, 50, 128];
        premultiply_rgba(&mut data);
        assert_eq!(data, vec![100, 50, 25, 128]);
        let back = unpremultiply(&data);
        assert!((back[0] as i32 - 200).abs() <= 1);
    }

    #[test]
    fn test_to_png_signature() {
        let mut ctx = offline(8, 8);
        ctx.set_fill_style("#336699").unwrap();
        ctx.fill_rect(&RectParams {
            x: 0.0,
            y: 0.0,
            width: 8.0,
            height: 8.0,
        });
        let png = ctx.to_png(None).unwrap();
        assert_eq!(&png[..8], &[137, 80, 78, 71, 13, 10, 26, 10]);
    }

    #[test]
    fn test_get_image_data_out_of_bounds_is_transparent() {
        let ctx = offline(4, 4);
        assert_eq!(ctx.get_image_data(-2, -2, 1, 1), vec![0, 0, 0, 0]);
    }
}
