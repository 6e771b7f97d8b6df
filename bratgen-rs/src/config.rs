//! Engine configuration.

use bratgen_canvas2d::FontConfig;

/// Settings shared by the preview, export and gallery paths.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub font: FontConfig,
    /// JPEG quality, 1 to 100.
    pub jpeg_quality: u8,
    /// Edge length of the square gallery thumbnails.
    pub thumbnail_size: u32,
    /// Maximum number of gallery items kept.
    pub gallery_capacity: usize,
    /// Fill an empty gallery with sample presets on load.
    pub seed_gallery: bool,
    /// Seed for decoration scatter and new element placement.
    pub rng_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            font: FontConfig::default(),
            jpeg_quality: 90,
            thumbnail_size: 100,
            gallery_capacity: 16,
            seed_gallery: true,
            rng_seed: None,
        }
    }
}

impl EngineConfig {
    /// Configuration that ignores system fonts and never seeds the gallery.
    pub fn offline() -> Self {
        Self {
            font: FontConfig::offline(),
            seed_gallery: false,
            ..Self::default()
        }
    }

    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }
}
