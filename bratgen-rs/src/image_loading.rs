//! Background image handles.
//!
//! Decoding goes through the `image` crate. The result is kept premultiplied,
//! ready to be drawn onto a canvas surface.

use crate::error::{BratError, BratResult};
use bratgen_canvas2d::{premultiply_rgba, CanvasImageDataRef};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// A decoded raster image.
///
/// Cloning is cheap: the pixel buffer is shared.
#[derive(Clone)]
pub struct ImageHandle {
    data: Arc<Vec<u8>>,
    width: u32,
    height: u32,
    loaded: bool,
}

impl ImageHandle {
    /// Wrap straight-alpha RGBA pixels.
    pub fn from_rgba(mut rgba: Vec<u8>, width: u32, height: u32) -> Self {
        let loaded = rgba.len() == width as usize * height as usize * 4;
        premultiply_rgba(&mut rgba);
        Self {
            data: Arc::new(rgba),
            width,
            height,
            loaded,
        }
    }

    /// A handle whose load never completed.
    pub fn unloaded() -> Self {
        Self {
            data: Arc::new(Vec::new()),
            width: 0,
            height: 0,
            loaded: false,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// True when the image finished loading and has a positive size.
    pub fn is_renderable(&self) -> bool {
        self.loaded && self.width > 0 && self.height > 0
    }

    pub fn as_image_data(&self) -> CanvasImageDataRef<'_> {
        CanvasImageDataRef {
            data: &self.data,
            width: self.width,
            height: self.height,
        }
    }
}

impl fmt::Debug for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageHandle")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("loaded", &self.loaded)
            .finish()
    }
}

impl PartialEq for ImageHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
            && self.width == other.width
            && self.height == other.height
            && self.loaded == other.loaded
    }
}

/// Decode PNG, JPEG, GIF or WEBP bytes.
pub fn load_image_bytes(bytes: &[u8]) -> BratResult<ImageHandle> {
    let img = image::load_from_memory(bytes).map_err(|e| BratError::ImageDecode(e.to_string()))?;
    let width = img.width();
    let height = img.height();
    log::info!(target: "render", "Decoded background image {}x{}", width, height);
    Ok(ImageHandle::from_rgba(img.to_rgba8().into_raw(), width, height))
}

pub fn load_image_file(path: &Path) -> BratResult<ImageHandle> {
    let bytes = std::fs::read(path)?;
    load_image_bytes(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn encoded_png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_load_png_bytes() {
        let handle = load_image_bytes(&encoded_png(6, 4)).unwrap();
        assert!(handle.is_renderable());
        assert_eq!((handle.width(), handle.height()), (6, 4));
        assert_eq!(&handle.as_image_data().data[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn test_garbage_bytes_fail_to_decode() {
        assert!(matches!(
            load_image_bytes(b"not an image"),
            Err(BratError::ImageDecode(_))
        ));
    }

    #[test]
    fn test_renderable_checks() {
        assert!(!ImageHandle::unloaded().is_renderable());
        assert!(!ImageHandle::from_rgba(vec![0; 3], 1, 1).is_renderable());
        assert!(!ImageHandle::from_rgba(Vec::new(), 0, 0).is_renderable());
        assert!(ImageHandle::from_rgba(vec![255; 4], 1, 1).is_renderable());
    }

    #[test]
    fn test_premultiplied_storage() {
        let handle = ImageHandle::from_rgba(vec![200, 100, 50, 128], 1, 1);
        assert_eq!(handle.as_image_data().data, &[100, 50, 25, 128]);
    }
}
