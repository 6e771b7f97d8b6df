//! Live editing session of one tool.

use crate::config::EngineConfig;
use crate::effects::FastRandom;
use crate::error::BratResult;
use crate::export::{
    encode_with_quality, export_filename, export_surface, thumbnail_data_uri, write_to_path,
    ExportFormat,
};
use crate::gallery::{Gallery, GalleryStore};
use crate::image_loading::ImageHandle;
use crate::render::render;
use crate::state::{HitTarget, StyleState, Tool};
use bratgen_canvas2d::{Canvas2dContext, ResolvedFontConfig};
use std::path::{Path, PathBuf};

/// Owns the live state, the preview surface and the gallery of one tool.
///
/// Every mutation goes through [`Studio::update`] (or one of the helpers
/// built on it), which sanitizes the state and repaints the preview.
pub struct Studio {
    config: EngineConfig,
    fonts: ResolvedFontConfig,
    state: StyleState,
    preview: Canvas2dContext,
    rng: FastRandom,
    gallery: Gallery,
}

impl Studio {
    pub fn new(tool: Tool, store: Box<dyn GalleryStore>, config: EngineConfig) -> BratResult<Self> {
        let fonts = ResolvedFontConfig::new(&config.font);
        let state = StyleState::defaults_for(tool);
        let preview =
            Canvas2dContext::with_resolved(state.canvas_width, state.canvas_height, &fonts)?;
        let rng = match config.rng_seed {
            Some(seed) => FastRandom::with_seed(seed),
            None => FastRandom::new(),
        };
        let gallery = Gallery::open(tool, store, &config);
        let mut studio = Self {
            config,
            fonts,
            state,
            preview,
            rng,
            gallery,
        };
        studio.render_preview()?;
        Ok(studio)
    }

    pub fn state(&self) -> &StyleState {
        &self.state
    }

    pub fn preview(&self) -> &Canvas2dContext {
        &self.preview
    }

    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    pub fn gallery_mut(&mut self) -> &mut Gallery {
        &mut self.gallery
    }

    pub fn fonts(&self) -> &ResolvedFontConfig {
        &self.fonts
    }

    /// Apply an edit, sanitize, and repaint.
    pub fn update(&mut self, edit: impl FnOnce(&mut StyleState)) -> BratResult<()> {
        edit(&mut self.state);
        self.state.sanitize();
        self.render_preview()
    }

    /// Repaint the preview, resizing it first when the canvas size changed.
    pub fn render_preview(&mut self) -> BratResult<()> {
        let (width, height) = (self.state.canvas_width, self.state.canvas_height);
        if self.preview.width() != width || self.preview.height() != height {
            log::debug!(target: "render", "Resizing preview to {}x{}", width, height);
            self.preview = Canvas2dContext::with_resolved(width, height, &self.fonts)?;
        }
        render(&mut self.preview, &self.state, &mut self.rng)
    }

    /// Render at `width` x `height` and encode. The preview is not touched.
    pub fn export(&mut self, format: ExportFormat, width: u32, height: u32) -> BratResult<Vec<u8>> {
        let surface = export_surface(&self.state, width, height, &self.fonts, &mut self.rng)?;
        encode_with_quality(&surface, format, self.config.jpeg_quality)
    }

    /// Export at the state's export size into `dir`, named after the tool.
    pub fn export_to_dir(&mut self, dir: &Path, format: ExportFormat) -> BratResult<PathBuf> {
        let bytes = self.export(format, self.state.export_width, self.state.export_height)?;
        let name = export_filename(
            self.state.tool,
            format,
            chrono::Utc::now().timestamp_millis(),
        );
        let path = dir.join(name);
        write_to_path(&bytes, &path)?;
        Ok(path)
    }

    /// Store the current design with a thumbnail. Returns the new item id.
    pub fn save_to_gallery(&mut self) -> BratResult<String> {
        let thumbnail = thumbnail_data_uri(
            &self.state,
            self.config.thumbnail_size,
            &self.fonts,
            &mut self.rng,
        )?;
        self.gallery.save_item(thumbnail, &self.state)
    }

    /// Replace the live state with a gallery item.
    pub fn load_from_gallery(&mut self, id: &str) -> BratResult<()> {
        self.state = self.gallery.load_state(id)?;
        self.render_preview()
    }

    pub fn reset(&mut self) -> BratResult<()> {
        self.state.reset();
        self.render_preview()
    }

    /// Handle a click on the preview at canvas coordinates.
    pub fn click(&mut self, x: f32, y: f32) -> BratResult<HitTarget> {
        let target = self.state.hit_test(x, y, &mut self.preview);
        self.state.apply_hit(target);
        self.render_preview()?;
        Ok(target)
    }

    pub fn add_text_element(&mut self) -> BratResult<u64> {
        let id = self.state.add_text_element(&mut self.rng);
        self.render_preview()?;
        Ok(id)
    }

    pub fn add_sticker(&mut self, emoji: &str, x: f32, y: f32) -> BratResult<u64> {
        let id = self.state.add_sticker(emoji, x, y);
        self.render_preview()?;
        Ok(id)
    }

    pub fn set_background_image(&mut self, image: ImageHandle) -> BratResult<()> {
        self.update(|state| state.set_background_image(image))
    }

    pub fn clear_background_image(&mut self) -> BratResult<()> {
        self.update(StyleState::clear_background_image)
    }
}
