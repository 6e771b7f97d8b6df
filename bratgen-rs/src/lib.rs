#![allow(clippy::uninlined_format_args)]
#![doc = include_str!("../README.md")]

pub mod config;
pub mod effects;
pub mod error;
pub mod export;
pub mod gallery;
pub mod image_loading;
pub mod layout;
pub mod presets;
pub mod render;
pub mod state;
pub mod studio;

#[macro_use]
extern crate lazy_static;

pub use bratgen_canvas2d;
pub use config::EngineConfig;
pub use effects::{FastRandom, RandomSource};
pub use error::{BratError, BratResult, StoreError};
pub use export::{encode, export_filename, export_surface, ExportFormat};
pub use gallery::{FileStore, Gallery, GalleryItem, GalleryStore, MemoryStore};
pub use image_loading::{load_image_bytes, load_image_file, ImageHandle};
pub use layout::{FixedAdvance, TextMeasure};
pub use render::render;
pub use serde_json;
pub use state::{Background, HitTarget, StyleState, Tool};
pub use studio::Studio;
