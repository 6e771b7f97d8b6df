//! Saved designs, most recent first, persisted as one JSON array.

use crate::config::EngineConfig;
use crate::error::{BratError, BratResult, StoreError};
use crate::export::png_data_uri;
use crate::presets::{SeedPreset, ALBUM_SEEDS, BRAT_SEEDS, MEME_SEEDS};
use crate::state::{Background, StyleState, Tool};
use bratgen_canvas2d::parse_color;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

pub const DEFAULT_CAPACITY: usize = 16;
const TITLE_CHARS: usize = 15;

/// One saved design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryItem {
    pub id: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// `data:image/...` URI.
    pub thumbnail: String,
    /// Serialized [`StyleState`]; image handles are always `null`.
    pub state: Value,
    pub title: String,
}

impl GalleryItem {
    /// Parse a stored entry, or `None` when it is not a usable item for `tool`.
    pub fn from_value(tool: Tool, value: &Value) -> Option<Self> {
        let id = value.get("id")?.as_str()?;
        let timestamp = value.get("timestamp")?;
        let timestamp = timestamp
            .as_i64()
            .or_else(|| timestamp.as_f64().map(|t| t as i64))?;
        let thumbnail = value.get("thumbnail")?.as_str()?;
        if !thumbnail.starts_with("data:image/") {
            return None;
        }
        let state = value.get("state").filter(|s| s.is_object())?;
        let required: &[&str] = if tool.is_multi_element() {
            &["textElements", "text_elements"]
        } else {
            &["content", "text"]
        };
        if !required.iter().any(|key| state.get(*key).is_some()) {
            return None;
        }
        let title = value
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or_default();
        Some(Self {
            id: id.to_string(),
            timestamp,
            thumbnail: thumbnail.to_string(),
            state: state.clone(),
            title: title.to_string(),
        })
    }
}

/// Entry validation used when loading and importing.
pub fn validate_item(tool: Tool, value: &Value) -> bool {
    GalleryItem::from_value(tool, value).is_some()
}

/// Backing storage for the serialized gallery.
pub trait GalleryStore {
    /// The stored JSON, or `None` when nothing was saved yet.
    fn load(&self) -> Result<Option<String>, StoreError>;
    fn save(&mut self, data: &str) -> Result<(), StoreError>;
}

/// Gallery JSON in a file on disk.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `{dir}/{storage key}.json`, one file per tool.
    pub fn in_dir(dir: &Path, tool: Tool) -> Self {
        Self::new(dir.join(format!("{}.json", tool.storage_key())))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl GalleryStore for FileStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&mut self, data: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, data)?;
        Ok(())
    }
}

/// In-memory store with an optional byte quota.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Option<String>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            data: None,
            quota: Some(quota),
        }
    }

    pub fn with_data(data: impl Into<String>) -> Self {
        Self {
            data: Some(data.into()),
            quota: None,
        }
    }

    /// Limit a store that may already hold data.
    pub fn quota(mut self, quota: usize) -> Self {
        self.quota = Some(quota);
        self
    }

    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }
}

impl GalleryStore for MemoryStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        Ok(self.data.clone())
    }

    fn save(&mut self, data: &str) -> Result<(), StoreError> {
        if let Some(quota) = self.quota {
            if data.len() > quota {
                return Err(StoreError::QuotaExceeded {
                    needed: data.len(),
                    quota,
                });
            }
        }
        self.data = Some(data.to_string());
        Ok(())
    }
}

/// Saved designs of one tool.
pub struct Gallery {
    tool: Tool,
    store: Box<dyn GalleryStore>,
    items: Vec<GalleryItem>,
    capacity: usize,
    rng: fastrand::Rng,
}

impl std::fmt::Debug for Gallery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gallery")
            .field("tool", &self.tool)
            .field("items", &self.items.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl Gallery {
    /// Open and load the gallery of `tool` from `store`.
    pub fn open(tool: Tool, store: Box<dyn GalleryStore>, config: &EngineConfig) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        let mut gallery = Self {
            tool,
            store,
            items: Vec::new(),
            capacity: config.gallery_capacity.max(1),
            rng,
        };
        gallery.load(config.seed_gallery);
        gallery
    }

    /// Replace the in-memory list with the stored one.
    ///
    /// Corrupt JSON and invalid entries are dropped. An empty result is
    /// seeded with sample designs when `seed` is set.
    pub fn load(&mut self, seed: bool) {
        let stored = match self.store.load() {
            Ok(stored) => stored,
            Err(err) => {
                log::error!(target: "gallery", "Failed to read gallery: {}", err);
                None
            }
        };
        let entries = match stored.as_deref().map(serde_json::from_str::<Vec<Value>>) {
            Some(Ok(entries)) => entries,
            Some(Err(err)) => {
                log::warn!(target: "gallery", "Discarding corrupt gallery: {}", err);
                Vec::new()
            }
            None => Vec::new(),
        };

        let total = entries.len();
        self.items = entries
            .iter()
            .filter_map(|entry| GalleryItem::from_value(self.tool, entry))
            .collect();
        if self.items.len() < total {
            log::info!(
                target: "gallery",
                "Dropped {} invalid gallery entries",
                total - self.items.len()
            );
        }
        if self.items.len() > self.capacity {
            self.items.truncate(self.capacity);
            self.persist_or_warn();
        }

        if self.items.is_empty() && seed {
            self.items = seed_items(self.tool);
            self.items.truncate(self.capacity);
            self.persist_or_warn();
        }
        log::debug!(target: "gallery", "Loaded {} {} items", self.items.len(), self.tool);
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn items(&self) -> &[GalleryItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get(&self, id: &str) -> Option<&GalleryItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Save a snapshot of `state` at the front of the gallery.
    ///
    /// When the store is full the gallery is cut to half its capacity and
    /// saved once more. If that fails too, the list is rolled back.
    pub fn save_item(&mut self, thumbnail: String, state: &StyleState) -> BratResult<String> {
        let now = chrono::Utc::now().timestamp_millis();
        let item = GalleryItem {
            id: self.generate_id(now),
            timestamp: now,
            thumbnail,
            state: serde_json::to_value(state)?,
            title: title_for(state),
        };
        let id = item.id.clone();

        let previous = self.items.clone();
        self.items.insert(0, item);
        self.items.truncate(self.capacity);
        self.commit(previous)?;
        log::info!(target: "gallery", "Saved {} ({} items)", id, self.items.len());
        Ok(id)
    }

    /// The state stored under `id`, merged over the tool defaults.
    pub fn load_state(&self, id: &str) -> BratResult<StyleState> {
        self.get(id)
            .map(|item| restore_state(self.tool, item))
            .ok_or_else(|| BratError::ItemNotFound(id.to_string()))
    }

    /// Remove one item. Returns false when `id` is unknown.
    pub fn delete(&mut self, id: &str) -> BratResult<bool> {
        let Some(index) = self.items.iter().position(|item| item.id == id) else {
            return Ok(false);
        };
        let previous = self.items.clone();
        self.items.remove(index);
        self.commit(previous)?;
        Ok(true)
    }

    pub fn clear(&mut self) -> BratResult<()> {
        let previous = std::mem::take(&mut self.items);
        self.commit(previous)
    }

    /// `{"version": "1.0", "timestamp": ms, "items": [...]}`, pretty printed.
    pub fn export_json(&self) -> BratResult<String> {
        let doc = json!({
            "version": "1.0",
            "timestamp": chrono::Utc::now().timestamp_millis(),
            "items": self.items,
        });
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    /// Merge valid items from an export in front of the current ones.
    ///
    /// Items with the same essential state are kept once, preferring the
    /// imported copy. Returns the number of imported items that survived.
    pub fn import_json(&mut self, data: &str) -> BratResult<usize> {
        let doc: Value = serde_json::from_str(data)?;
        let imported: Vec<GalleryItem> = doc
            .get("items")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| GalleryItem::from_value(self.tool, entry))
                    .collect()
            })
            .unwrap_or_default();
        let imported_ids: Vec<String> = imported.iter().map(|item| item.id.clone()).collect();

        let previous = std::mem::take(&mut self.items);
        self.items = imported
            .into_iter()
            .chain(previous.iter().cloned())
            .unique_by(|item| state_hash(&item.state))
            .take(self.capacity)
            .collect();
        self.commit(previous)?;
        let kept = self
            .items
            .iter()
            .filter(|item| imported_ids.contains(&item.id))
            .count();
        log::info!(target: "gallery", "Imported {} items", kept);
        Ok(kept)
    }

    fn generate_id(&mut self, now: i64) -> String {
        let prefix = match self.tool {
            Tool::AlbumCover => "album",
            Tool::Meme => "meme",
            Tool::BratPro => "brat",
        };
        const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
        let suffix: String = (0..9)
            .map(|_| ALPHABET[self.rng.usize(..ALPHABET.len())] as char)
            .collect();
        format!("{prefix}_{now}_{suffix}")
    }

    fn serialize(&self) -> BratResult<String> {
        Ok(serde_json::to_string(&self.items)?)
    }

    /// Persist the current list, or put `previous` back if that fails.
    fn commit(&mut self, previous: Vec<GalleryItem>) -> BratResult<()> {
        self.persist().inspect_err(|_| self.items = previous)
    }

    /// Save the list. A failed retry after the quota trim restores the
    /// untrimmed list.
    fn persist(&mut self) -> BratResult<()> {
        let data = self.serialize()?;
        match self.store.save(&data) {
            Ok(()) => Ok(()),
            Err(StoreError::QuotaExceeded { needed, quota }) => {
                log::warn!(
                    target: "gallery",
                    "Gallery needs {} bytes but only {} fit, keeping the newest {}",
                    needed,
                    quota,
                    self.capacity / 2
                );
                let untrimmed = self.items.clone();
                self.items.truncate(self.capacity / 2);
                let retry = self
                    .serialize()
                    .and_then(|data| self.store.save(&data).map_err(BratError::from));
                if retry.is_err() {
                    self.items = untrimmed;
                }
                retry
            }
            Err(err) => Err(err.into()),
        }
    }

    fn persist_or_warn(&mut self) {
        if let Err(err) = self.persist() {
            log::warn!(target: "gallery", "Failed to save gallery: {}", err);
        }
    }
}

/// Rebuild the state of `item` over the defaults of `tool`.
pub fn restore_state(tool: Tool, item: &GalleryItem) -> StyleState {
    StyleState::merge_over_defaults(tool, &item.state)
}

/// Short label: the first text, cut to 15 characters, and the background.
pub fn title_for(state: &StyleState) -> String {
    let text = if state.tool.is_multi_element() {
        state
            .text_elements
            .first()
            .map(|e| e.text.as_str())
            .unwrap_or_default()
    } else {
        state.content.as_str()
    };
    let text = text.trim();
    let mut title = if text.is_empty() {
        "Untitled".to_string()
    } else if text.chars().count() > TITLE_CHARS {
        format!("{}...", text.chars().take(TITLE_CHARS).collect::<String>())
    } else {
        text.to_string()
    };
    let background = match &state.background {
        Background::Solid { color } => color.as_str(),
        Background::Gradient { key } => key.as_str(),
        Background::Image(_) => "Photo",
        Background::Transparent => "Transparent",
    };
    title.push_str(" - ");
    title.push_str(background);
    title
}

/// Key for duplicate detection, built from the fields that define a design.
fn state_hash(state: &Value) -> String {
    const KEYS: [&str; 7] = [
        "content",
        "font",
        "fontSize",
        "textColor",
        "background",
        "effect",
        "textElements",
    ];
    let essential: serde_json::Map<String, Value> = KEYS
        .iter()
        .map(|key| {
            let value = state.get(*key).cloned().unwrap_or(Value::Null);
            (key.to_string(), value)
        })
        .collect();
    Value::Object(essential).to_string()
}

fn seeds(tool: Tool) -> &'static [SeedPreset] {
    match tool {
        Tool::AlbumCover => ALBUM_SEEDS,
        Tool::Meme => MEME_SEEDS,
        Tool::BratPro => BRAT_SEEDS,
    }
}

/// State of a sample design.
pub fn seed_state(tool: Tool, preset: &SeedPreset) -> StyleState {
    let mut state = StyleState::defaults_for(tool);
    state.background = Background::solid(preset.background);
    state.aesthetic = preset.aesthetic.map(str::to_string);
    if let Some(element) = state.text_elements.first_mut() {
        element.text = preset.text.to_string();
        element.font = preset.font.to_string();
        element.font_size = preset.font_size;
        element.text_color = preset.text_color.to_string();
        element.style = preset.effect.to_string();
    } else {
        state.content = preset.text.to_string();
        state.font = preset.font.to_string();
        state.font_size = preset.font_size;
        state.text_color = preset.text_color.to_string();
        state.effect = preset.effect.to_string();
    }
    state.sanitize();
    state
}

fn seed_items(tool: Tool) -> Vec<GalleryItem> {
    // Spread the samples an hour apart into the past
    let now = chrono::Utc::now().timestamp_millis();
    seeds(tool)
        .iter()
        .enumerate()
        .filter_map(|(i, preset)| {
            let state = seed_state(tool, preset);
            let item = GalleryItem {
                id: format!("preset_{}", i + 1),
                timestamp: now - (i as i64 + 1) * 3_600_000,
                thumbnail: swatch_data_uri(preset.background, 100).ok()?,
                state: serde_json::to_value(&state).ok()?,
                title: preset.title.to_string(),
            };
            Some(item)
        })
        .collect()
}

/// PNG data URI of a square filled with `color`.
fn swatch_data_uri(color: &str, size: u32) -> BratResult<String> {
    let rgba = parse_color(color)
        .map(|c| c.to_color_u8())
        .map(|c| [c.red(), c.green(), c.blue(), c.alpha()])
        .unwrap_or([0x8a, 0xce, 0x00, 0xff]);
    let pixels = rgba.repeat((size * size) as usize);
    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(&pixels, size, size, ExtendedColorType::Rgba8)
        .map_err(|err| BratError::Encode {
            format: "png",
            reason: err.to_string(),
        })?;
    Ok(png_data_uri(&png))
}

#[cfg(test)]
mod tests {
    use super::*;

    const THUMB: &str = "data:image/png;base64,AAAA";

    fn open(tool: Tool, store: MemoryStore) -> Gallery {
        Gallery::open(tool, Box::new(store), &EngineConfig::offline())
    }

    #[test]
    fn test_capacity_keeps_newest() {
        let mut gallery = open(Tool::BratPro, MemoryStore::new());
        let mut state = StyleState::defaults_for(Tool::BratPro);
        let mut ids = Vec::new();
        for i in 0..20 {
            state.content = format!("take {i}");
            ids.push(gallery.save_item(THUMB.to_string(), &state).unwrap());
        }
        assert_eq!(gallery.len(), 16);
        assert_eq!(gallery.items()[0].id, ids[19]);
        assert_eq!(gallery.items()[15].id, ids[4]);
    }

    #[test]
    fn test_quota_trims_to_half() {
        let state = StyleState::defaults_for(Tool::AlbumCover);
        let one = serde_json::to_string(&vec![GalleryItem {
            id: "album_0_000000000".to_string(),
            timestamp: 0,
            thumbnail: THUMB.to_string(),
            state: serde_json::to_value(&state).unwrap(),
            title: title_for(&state),
        }])
        .unwrap()
        .len();
        let mut gallery = open(Tool::AlbumCover, MemoryStore::with_quota(one * 10));
        for _ in 0..12 {
            gallery.save_item(THUMB.to_string(), &state).unwrap();
        }
        assert!(gallery.len() <= 10);
        assert!(gallery.len() >= 8);
    }

    #[test]
    fn test_quota_failure_rolls_back() {
        let mut gallery = open(Tool::AlbumCover, MemoryStore::with_quota(10));
        let state = StyleState::defaults_for(Tool::AlbumCover);
        let result = gallery.save_item(THUMB.to_string(), &state);
        assert!(matches!(
            result,
            Err(BratError::Store(StoreError::QuotaExceeded { .. }))
        ));
        assert!(gallery.is_empty());
    }

    fn stored_items(count: usize) -> String {
        let mut state = StyleState::defaults_for(Tool::AlbumCover);
        let items: Vec<GalleryItem> = (0..count)
            .map(|i| {
                state.content = format!("take {i}");
                GalleryItem {
                    id: format!("album_{i}_000000000"),
                    timestamp: i as i64,
                    thumbnail: THUMB.to_string(),
                    state: serde_json::to_value(&state).unwrap(),
                    title: title_for(&state),
                }
            })
            .collect();
        serde_json::to_string(&items).unwrap()
    }

    #[test]
    fn test_failed_delete_and_clear_keep_items() {
        let store = MemoryStore::with_data(stored_items(3)).quota(10);
        let mut gallery = open(Tool::AlbumCover, store);
        assert_eq!(gallery.len(), 3);

        assert!(matches!(
            gallery.delete("album_1_000000000"),
            Err(BratError::Store(StoreError::QuotaExceeded { .. }))
        ));
        assert_eq!(gallery.len(), 3);
        assert!(gallery.get("album_1_000000000").is_some());

        assert!(gallery.clear().is_err());
        assert_eq!(gallery.len(), 3);
    }

    #[test]
    fn test_failed_import_keeps_items() {
        let store = MemoryStore::with_data(stored_items(2)).quota(10);
        let mut gallery = open(Tool::AlbumCover, store);
        let mut state = StyleState::defaults_for(Tool::AlbumCover);
        state.content = "imported".to_string();
        let export = json!({
            "version": "1.0",
            "timestamp": 0,
            "items": [{
                "id": "album_9_000000000",
                "timestamp": 9,
                "thumbnail": THUMB,
                "state": serde_json::to_value(&state).unwrap(),
                "title": "imported - #8ACE00",
            }],
        });
        assert!(gallery.import_json(&export.to_string()).is_err());
        let ids: Vec<&str> = gallery.items().iter().map(|item| item.id.as_str()).collect();
        assert_eq!(ids, vec!["album_0_000000000", "album_1_000000000"]);
    }

    #[test]
    fn test_corrupt_json_loads_empty() {
        let gallery = open(Tool::Meme, MemoryStore::with_data("{not json"));
        assert!(gallery.is_empty());
    }

    #[test]
    fn test_empty_gallery_is_seeded() {
        let config = EngineConfig {
            seed_gallery: true,
            ..EngineConfig::offline()
        };
        let gallery = Gallery::open(Tool::Meme, Box::new(MemoryStore::new()), &config);
        assert_eq!(gallery.len(), MEME_SEEDS.len());
        let state = gallery.load_state("preset_1").unwrap();
        assert_eq!(state.text_elements[0].text, "brat");
        assert_eq!(state.aesthetic.as_deref(), Some("glitter"));
        assert!(gallery.items()[0].thumbnail.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_validate_item() {
        let good = json!({
            "id": "a", "timestamp": 1.0, "thumbnail": THUMB,
            "state": {"textElements": []}, "title": "t"
        });
        assert!(validate_item(Tool::Meme, &good));
        assert!(!validate_item(Tool::AlbumCover, &good));

        let bad_thumb = json!({
            "id": "a", "timestamp": 1, "thumbnail": "http://x",
            "state": {"content": "x"}
        });
        assert!(!validate_item(Tool::AlbumCover, &bad_thumb));
        let bad_id = json!({"id": 5, "timestamp": 1, "thumbnail": THUMB, "state": {"content": "x"}});
        assert!(!validate_item(Tool::AlbumCover, &bad_id));
    }

    #[test]
    fn test_title_for() {
        let mut state = StyleState::defaults_for(Tool::AlbumCover);
        state.content = "a very long album title".to_string();
        assert_eq!(title_for(&state), "a very long alb... - #8ACE00");
        state.content = "  ".to_string();
        state.background = Background::Gradient {
            key: "sunset".to_string(),
        };
        assert_eq!(title_for(&state), "Untitled - sunset");
    }

    #[test]
    fn test_delete_and_missing_item() {
        let mut gallery = open(Tool::BratPro, MemoryStore::new());
        let id = gallery
            .save_item(THUMB.to_string(), &StyleState::defaults_for(Tool::BratPro))
            .unwrap();
        assert!(gallery.delete(&id).unwrap());
        assert!(!gallery.delete(&id).unwrap());
        assert!(matches!(
            gallery.load_state(&id),
            Err(BratError::ItemNotFound(_))
        ));
    }

    #[test]
    fn test_export_import_dedupes() {
        let mut source = open(Tool::BratPro, MemoryStore::new());
        let mut state = StyleState::defaults_for(Tool::BratPro);
        source.save_item(THUMB.to_string(), &state).unwrap();
        state.content = "365".to_string();
        source.save_item(THUMB.to_string(), &state).unwrap();
        let exported = source.export_json().unwrap();

        let mut target = open(Tool::BratPro, MemoryStore::new());
        target.save_item(THUMB.to_string(), &state).unwrap();
        assert_eq!(target.import_json(&exported).unwrap(), 2);
        assert_eq!(target.len(), 2);
        assert!(target.import_json("[]").is_ok());
        assert!(target.import_json("nope").is_err());
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::in_dir(&dir.path().join("nested"), Tool::Meme);
        assert!(store.path().ends_with("bratMemeGeneratorGallery.json"));
        let mut gallery = Gallery::open(Tool::Meme, Box::new(store.clone()), &EngineConfig::offline());
        let id = gallery
            .save_item(THUMB.to_string(), &StyleState::defaults_for(Tool::Meme))
            .unwrap();

        let reopened = Gallery::open(Tool::Meme, Box::new(store), &EngineConfig::offline());
        assert_eq!(reopened.items()[0].id, id);
        assert!(id.starts_with("meme_"));
    }
}
