//! Font configuration for canvas surfaces.
//!
//! A [`FontConfig`] is plain data. Resolving it scans system fonts and font
//! directories once; the resulting [`ResolvedFontConfig`] is cloned into each
//! surface so repeated renders (preview, export, thumbnails) never rescan.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct FontConfig {
    pub custom_fonts: Vec<CustomFont>,
    /// Concrete families for the generic CSS families, in priority order.
    pub generic_families: GenericFamilyMap,
    pub load_system_fonts: bool,
    pub font_dirs: Vec<PathBuf>,
    pub hinting_enabled: bool,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            custom_fonts: Vec::new(),
            generic_families: GenericFamilyMap::defaults(),
            load_system_fonts: true,
            font_dirs: Vec::new(),
            hinting_enabled: false,
        }
    }
}

impl FontConfig {
    /// Only explicitly registered fonts: no system scan.
    pub fn offline() -> Self {
        Self {
            load_system_fonts: false,
            ..Self::default()
        }
    }

    pub fn with_font_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.font_dirs.push(dir.into());
        self
    }

    pub fn with_font_data(mut self, data: Vec<u8>) -> Self {
        self.custom_fonts.push(CustomFont {
            data: Arc::new(data),
        });
        self
    }

    /// Resolve this configuration into a concrete font database.
    pub fn resolve(&self) -> ResolvedFontConfig {
        ResolvedFontConfig::new(self)
    }
}

/// Font file bytes registered directly with the font database.
#[derive(Clone, Debug)]
pub struct CustomFont {
    /// Raw TTF/OTF data. Arc-wrapped for cheap cloning.
    pub data: Arc<Vec<u8>>,
}

/// Generic CSS family preference lists.
#[derive(Clone, Debug, Default)]
pub struct GenericFamilyMap {
    pub serif: Vec<String>,
    pub sans_serif: Vec<String>,
    pub monospace: Vec<String>,
    pub cursive: Vec<String>,
    pub fantasy: Vec<String>,
}

impl GenericFamilyMap {
    /// Poster-friendly faces first, then common Linux fallbacks.
    pub fn defaults() -> Self {
        let list = |names: &[&str]| names.iter().map(|n| n.to_string()).collect();
        Self {
            sans_serif: list(&[
                "Inter",
                "Arial Narrow",
                "Arial",
                "Helvetica",
                "Liberation Sans",
                "DejaVu Sans",
            ]),
            serif: list(&["Times New Roman", "Times", "Liberation Serif", "DejaVu Serif"]),
            monospace: list(&["Courier New", "Courier", "Liberation Mono", "DejaVu Sans Mono"]),
            cursive: list(&["Comic Sans MS", "Apple Chancery"]),
            fantasy: list(&["Fredoka One", "Impact", "Anton"]),
        }
    }
}

/// A [`FontConfig`] resolved into a font database, shared across surfaces by cloning.
#[derive(Clone)]
pub struct ResolvedFontConfig {
    pub(crate) fontdb: fontdb::Database,
    pub(crate) hinting_enabled: bool,
}

impl ResolvedFontConfig {
    pub fn new(config: &FontConfig) -> Self {
        Self {
            fontdb: font_config_to_fontdb(config),
            hinting_enabled: config.hinting_enabled,
        }
    }

    /// Number of font faces available.
    pub fn face_count(&self) -> usize {
        self.fontdb.faces().count()
    }

    /// Whether a face with the given family name was loaded (case-insensitive).
    pub fn has_family(&self, name: &str) -> bool {
        has_family(&self.fontdb, name)
    }
}

impl std::fmt::Debug for ResolvedFontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedFontConfig")
            .field("faces", &self.face_count())
            .field("hinting_enabled", &self.hinting_enabled)
            .finish()
    }
}

/// Build a [`fontdb::Database`] from a [`FontConfig`].
pub fn font_config_to_fontdb(config: &FontConfig) -> fontdb::Database {
    let mut db = fontdb::Database::new();
    if config.load_system_fonts {
        db.load_system_fonts();
    }
    for dir in &config.font_dirs {
        log::debug!(target: "canvas", "loading fonts from {}", dir.display());
        db.load_fonts_dir(dir);
    }
    for font in &config.custom_fonts {
        db.load_font_data(Vec::from(font.data.as_slice()));
    }
    apply_generic_families(&mut db, &config.generic_families);
    db
}

pub(crate) fn has_family(db: &fontdb::Database, name: &str) -> bool {
    db.faces()
        .any(|face| face.families.iter().any(|(family, _)| family.eq_ignore_ascii_case(name)))
}

/// Point each generic family at the first preference that is actually installed.
fn apply_generic_families(db: &mut fontdb::Database, families: &GenericFamilyMap) {
    let available: HashSet<String> = db
        .faces()
        .flat_map(|face| face.families.iter().map(|(family, _)| family.clone()))
        .collect();
    let pick = |candidates: &[String]| candidates.iter().find(|c| available.contains(*c)).cloned();

    if let Some(family) = pick(&families.sans_serif) {
        db.set_sans_serif_family(family);
    }
    if let Some(family) = pick(&families.serif) {
        db.set_serif_family(family);
    }
    if let Some(family) = pick(&families.monospace) {
        db.set_monospace_family(family);
    }
    if let Some(family) = pick(&families.cursive) {
        db.set_cursive_family(family);
    }
    if let Some(family) = pick(&families.fantasy) {
        db.set_fantasy_family(family);
    }
}
