//! The style state shared by the three tools.
//!
//! A [`StyleState`] is plain data. UI callers mutate it, [`sanitize`] pulls
//! every field back into range, and the renderer only ever reads it.
//!
//! [`sanitize`]: StyleState::sanitize

use crate::effects::RandomSource;
use crate::image_loading::ImageHandle;
use crate::layout::{block_size, font_css, wrap_text, TextMeasure};
use crate::presets::{self, DEFAULT_BACKGROUND};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const MIN_FONT_SIZE: f32 = 12.0;
pub const MAX_FONT_SIZE: f32 = 400.0;
pub const MIN_CANVAS: u32 = 200;
pub const MAX_CANVAS: u32 = 2048;
pub const MAX_EXPORT: u32 = 4096;
pub const MIN_STICKER: f32 = 10.0;
pub const MAX_STICKER: f32 = 300.0;

/// Padding of the selection box around a text element.
const SELECTION_MARGIN: f32 = 10.0;
/// Half size of the delete button plus click slack.
const DELETE_HIT_RADIUS: f32 = 15.0;

lazy_static! {
    static ref HEX_COLOR: Regex = Regex::new(r"^#[0-9a-fA-F]{6}$").unwrap();
}

/// True for `#rrggbb` colors.
pub fn is_hex_color(value: &str) -> bool {
    HEX_COLOR.is_match(value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tool {
    #[default]
    AlbumCover,
    Meme,
    BratPro,
}

impl Tool {
    pub const ALL: [Tool; 3] = [Tool::AlbumCover, Tool::Meme, Tool::BratPro];

    pub fn name(self) -> &'static str {
        match self {
            Tool::AlbumCover => "album-cover",
            Tool::Meme => "meme",
            Tool::BratPro => "brat-pro",
        }
    }

    /// Prefix of exported file names.
    pub fn file_prefix(self) -> &'static str {
        match self {
            Tool::AlbumCover => "brat-album-cover",
            Tool::Meme => "brat-meme",
            Tool::BratPro => "brat-generator",
        }
    }

    /// Key the gallery is stored under.
    pub fn storage_key(self) -> &'static str {
        match self {
            Tool::AlbumCover => "bratAlbumGeneratorGallery",
            Tool::Meme => "bratMemeGeneratorGallery",
            Tool::BratPro => "bratGeneratorGallery",
        }
    }

    pub fn default_font_key(self) -> &'static str {
        match self {
            Tool::Meme => "fredoka-one",
            _ => "inter",
        }
    }

    pub fn default_family(self) -> &'static str {
        match self {
            Tool::Meme => presets::DEFAULT_MEME_FAMILY,
            _ => presets::DEFAULT_FAMILY,
        }
    }

    /// Whether the tool paints many positioned text elements.
    pub fn is_multi_element(self) -> bool {
        self == Tool::Meme
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tool {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tool::ALL
            .into_iter()
            .find(|tool| tool.name() == s)
            .ok_or_else(|| format!("unknown tool '{s}', expected album-cover, meme or brat-pro"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutlineKind {
    #[default]
    None,
    Thin,
    Medium,
    Thick,
    Double,
    Dashed,
}

impl OutlineKind {
    /// Stroke width in pixels.
    pub fn width(self) -> f32 {
        match self {
            OutlineKind::None => 0.0,
            OutlineKind::Thin => 2.0,
            OutlineKind::Medium => 4.0,
            OutlineKind::Thick => 8.0,
            OutlineKind::Double => 6.0,
            OutlineKind::Dashed => 3.0,
        }
    }

    pub fn dash(self) -> Option<[f32; 2]> {
        (self == OutlineKind::Dashed).then_some([5.0, 5.0])
    }

    /// Parse an outline key. Unknown keys mean no outline.
    pub fn from_key(key: &str) -> Self {
        match key {
            "thin" => OutlineKind::Thin,
            "medium" => OutlineKind::Medium,
            "thick" => OutlineKind::Thick,
            "double" => OutlineKind::Double,
            "dashed" => OutlineKind::Dashed,
            _ => OutlineKind::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MirrorMode {
    #[default]
    None,
    Left,
    Right,
    Center,
    Wide,
    Full,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    pub kind: OutlineKind,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shadow {
    pub enabled: bool,
    pub offset_x: f32,
    pub offset_y: f32,
    pub blur: f32,
    pub color: String,
    pub opacity_percent: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlur {
    pub enabled: bool,
    pub amount: f32,
}

/// Outline of meme text elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemeOutline {
    pub enabled: bool,
    pub width: f32,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorOverlay {
    pub color: String,
    pub opacity_percent: f32,
}

/// Uploaded image painted behind the text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageBackground {
    /// Never persisted: serializes as `null` and restores as `None`.
    #[serde(default, with = "nulled_handle")]
    pub image: Option<ImageHandle>,
    pub blur: f32,
    pub opacity_percent: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    pub blend_mode: String,
    pub overlay: Option<ColorOverlay>,
    /// Solid color painted under the image.
    pub underlay: Option<String>,
}

impl Default for ImageBackground {
    fn default() -> Self {
        Self {
            image: None,
            blur: 0.0,
            opacity_percent: 100.0,
            offset_x: 0.0,
            offset_y: 0.0,
            blend_mode: "normal".to_string(),
            overlay: None,
            underlay: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Background {
    Solid { color: String },
    Gradient { key: String },
    Image(ImageBackground),
    Transparent,
}

impl Background {
    pub fn solid(color: &str) -> Self {
        Background::Solid {
            color: color.to_string(),
        }
    }
}

mod nulled_handle {
    use crate::image_loading::ImageHandle;
    use serde::de::IgnoredAny;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(_: &Option<ImageHandle>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_none()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<ImageHandle>, D::Error> {
        IgnoredAny::deserialize(d)?;
        Ok(None)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextElement {
    pub id: u64,
    pub text: String,
    pub font_size: f32,
    pub font: String,
    pub text_color: String,
    /// Fill style key (`solid`, `bubble`, `glossy`, `gradient`, `chrome`, ...).
    pub style: String,
    pub x: f32,
    pub y: f32,
    pub selected: bool,
}

impl TextElement {
    pub fn font_css(&self) -> String {
        font_css(
            false,
            self.font_size,
            presets::font_family(&self.font, presets::DEFAULT_MEME_FAMILY),
        )
    }

    /// Wrapped lines for a maximum line width.
    pub fn lines(&self, max_width: f32, measure: &mut dyn TextMeasure) -> Vec<String> {
        measure.select_font(&self.font_css());
        wrap_text(&self.text, max_width, measure)
    }

    /// Width and height of the wrapped text block.
    pub fn extent(&self, max_width: f32, measure: &mut dyn TextMeasure) -> (f32, f32) {
        let lines = self.lines(max_width, measure);
        block_size(&lines, self.font_size, measure)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sticker {
    pub id: u64,
    pub emoji: String,
    pub x: f32,
    pub y: f32,
    pub size: f32,
}

/// What a click on the canvas landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    DeleteSticker(u64),
    DeleteText(u64),
    Sticker(u64),
    Text(u64),
    Nothing,
}

/// Every renderable parameter of one tool instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleState {
    pub tool: Tool,
    pub content: String,
    pub font: String,
    pub font_size: f32,
    pub text_color: String,
    pub alignment: Alignment,
    pub letter_spacing: f32,
    pub padding: f32,
    pub outline: Outline,
    pub shadow: Shadow,
    pub effect: String,
    pub text_blur: TextBlur,
    pub rotation: f32,
    pub mirror: MirrorMode,
    pub background: Background,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub export_width: u32,
    pub export_height: u32,
    pub text_elements: Vec<TextElement>,
    pub stickers: Vec<Sticker>,
    pub selected_sticker: Option<u64>,
    pub meme_outline: MemeOutline,
    pub aesthetic: Option<String>,
    pub aesthetic_intensity: f32,
    pub sticker_size: f32,
    pub next_id: u64,
}

impl Default for StyleState {
    fn default() -> Self {
        Self::defaults_for(Tool::default())
    }
}

impl StyleState {
    /// Startup state of a tool.
    pub fn defaults_for(tool: Tool) -> Self {
        let mut state = Self {
            tool,
            content: "brat".to_string(),
            font: tool.default_font_key().to_string(),
            font_size: 128.0,
            text_color: "#ffffff".to_string(),
            alignment: Alignment::Center,
            letter_spacing: 0.0,
            padding: 40.0,
            outline: Outline {
                kind: OutlineKind::None,
                color: "#000000".to_string(),
            },
            shadow: Shadow {
                enabled: false,
                offset_x: 0.0,
                offset_y: 0.0,
                blur: 10.0,
                color: "#000000".to_string(),
                opacity_percent: 40.0,
            },
            effect: "none".to_string(),
            text_blur: TextBlur {
                enabled: false,
                amount: 0.0,
            },
            rotation: 0.0,
            mirror: MirrorMode::None,
            background: Background::solid(DEFAULT_BACKGROUND),
            canvas_width: 500,
            canvas_height: 500,
            export_width: 500,
            export_height: 500,
            text_elements: Vec::new(),
            stickers: Vec::new(),
            selected_sticker: None,
            meme_outline: MemeOutline {
                enabled: false,
                width: 4.0,
                color: "#000000".to_string(),
            },
            aesthetic: None,
            aesthetic_intensity: 50.0,
            sticker_size: 50.0,
            next_id: 1,
        };

        match tool {
            Tool::AlbumCover => {}
            Tool::BratPro => {
                state.text_color = "#000000".to_string();
                state.padding = 10.0;
                state.outline.color = "#ffffff".to_string();
                state.text_blur = TextBlur {
                    enabled: true,
                    amount: 2.0,
                };
            }
            Tool::Meme => {
                state.content = String::new();
                state.text_color = "#ff69b4".to_string();
                state.padding = 20.0;
                state.effect = "bubble".to_string();
                state.shadow = Shadow {
                    enabled: true,
                    offset_x: 2.0,
                    offset_y: 2.0,
                    blur: 6.0,
                    color: "#ff1493".to_string(),
                    opacity_percent: 100.0,
                };
                state.meme_outline.enabled = true;
                state.text_elements.push(TextElement {
                    id: 1,
                    text: "brat".to_string(),
                    font_size: 128.0,
                    font: "fredoka-one".to_string(),
                    text_color: "#ff69b4".to_string(),
                    style: "bubble".to_string(),
                    x: 250.0,
                    y: 250.0,
                    selected: true,
                });
                state.next_id = 2;
            }
        }
        state
    }

    /// Return to the tool defaults.
    pub fn reset(&mut self) {
        *self = Self::defaults_for(self.tool);
    }

    /// Pull every field back into its valid range.
    ///
    /// Non-finite numbers and invalid colors take the tool default; unknown
    /// preset keys fall back to their defaults.
    pub fn sanitize(&mut self) {
        let defaults = Self::defaults_for(self.tool);

        self.font_size = clamp_or(self.font_size, MIN_FONT_SIZE, MAX_FONT_SIZE, defaults.font_size);
        self.letter_spacing = clamp_or(self.letter_spacing, -10.0, 40.0, 0.0);
        self.padding = clamp_or(self.padding, 0.0, 100.0, defaults.padding);
        self.rotation = clamp_or(self.rotation, -180.0, 180.0, 0.0);
        fix_color(&mut self.text_color, &defaults.text_color);
        fix_color(&mut self.outline.color, &defaults.outline.color);
        if presets::font_family(&self.font, "").is_empty() {
            self.font = defaults.font.clone();
        }
        if !presets::effect_keys().any(|key| key == self.effect) {
            self.effect = defaults.effect.clone();
        }

        let shadow = &mut self.shadow;
        shadow.offset_x = clamp_or(shadow.offset_x, -20.0, 20.0, 0.0);
        shadow.offset_y = clamp_or(shadow.offset_y, -20.0, 20.0, 0.0);
        shadow.blur = clamp_or(shadow.blur, 0.0, 40.0, defaults.shadow.blur);
        shadow.opacity_percent = clamp_or(
            shadow.opacity_percent,
            0.0,
            100.0,
            defaults.shadow.opacity_percent,
        );
        fix_color(&mut shadow.color, &defaults.shadow.color);
        self.text_blur.amount = clamp_or(self.text_blur.amount, 0.0, 12.0, 0.0);

        self.sanitize_background();

        self.canvas_width = self.canvas_width.clamp(MIN_CANVAS, MAX_CANVAS);
        self.canvas_height = self.canvas_height.clamp(MIN_CANVAS, MAX_CANVAS);
        self.export_width = self.export_width.clamp(MIN_CANVAS, MAX_EXPORT);
        self.export_height = self.export_height.clamp(MIN_CANVAS, MAX_EXPORT);

        self.meme_outline.width = clamp_or(self.meme_outline.width, 0.0, 20.0, 4.0);
        fix_color(&mut self.meme_outline.color, "#000000");
        if self
            .aesthetic
            .as_deref()
            .is_some_and(|key| presets::aesthetic(key).is_none())
        {
            self.aesthetic = None;
        }
        self.aesthetic_intensity = clamp_or(self.aesthetic_intensity, 0.0, 100.0, 50.0);
        self.sticker_size = clamp_or(self.sticker_size, MIN_STICKER, MAX_STICKER, 50.0);

        self.sanitize_elements();
    }

    fn sanitize_background(&mut self) {
        let unknown_gradient = matches!(
            &self.background,
            Background::Gradient { key } if presets::gradient_stops(key).is_none()
        );
        if unknown_gradient {
            self.background = Background::solid(DEFAULT_BACKGROUND);
        }
        match &mut self.background {
            Background::Solid { color } => fix_color(color, DEFAULT_BACKGROUND),
            Background::Gradient { .. } | Background::Transparent => {}
            Background::Image(img) => {
                img.blur = clamp_or(img.blur, 0.0, 20.0, 0.0);
                img.opacity_percent = clamp_or(img.opacity_percent, 0.0, 100.0, 100.0);
                img.offset_x = finite_or(img.offset_x, 0.0);
                img.offset_y = finite_or(img.offset_y, 0.0);
                if !is_blend_mode(&img.blend_mode) {
                    img.blend_mode = "normal".to_string();
                }
                if let Some(overlay) = &mut img.overlay {
                    fix_color(&mut overlay.color, DEFAULT_BACKGROUND);
                    overlay.opacity_percent = clamp_or(overlay.opacity_percent, 0.0, 100.0, 30.0);
                }
                if img.underlay.as_deref().is_some_and(|c| !is_hex_color(c)) {
                    img.underlay = None;
                }
            }
        }
    }

    fn sanitize_elements(&mut self) {
        let (center_x, center_y) = (self.canvas_width as f32 / 2.0, self.canvas_height as f32 / 2.0);
        for element in &mut self.text_elements {
            element.font_size =
                clamp_or(element.font_size, MIN_FONT_SIZE, MAX_FONT_SIZE, 128.0);
            element.x = finite_or(element.x, center_x);
            element.y = finite_or(element.y, center_y);
            fix_color(&mut element.text_color, "#ff69b4");
            if presets::font_family(&element.font, "").is_empty() {
                element.font = Tool::Meme.default_font_key().to_string();
            }
            if !presets::effect_keys().any(|key| key == element.style) {
                element.style = "solid".to_string();
            }
        }
        for sticker in &mut self.stickers {
            sticker.size = clamp_or(sticker.size, MIN_STICKER, MAX_STICKER, 50.0);
            sticker.x = finite_or(sticker.x, center_x);
            sticker.y = finite_or(sticker.y, center_y);
        }
        if self.tool.is_multi_element() && self.text_elements.is_empty() {
            let mut element = Self::defaults_for(Tool::Meme).text_elements.remove(0);
            element.x = center_x;
            element.y = center_y;
            self.text_elements.push(element);
        }

        // Selection is exclusive across both element kinds
        if let Some(id) = self.selected_sticker {
            if self.stickers.iter().any(|s| s.id == id) {
                self.text_elements.iter_mut().for_each(|e| e.selected = false);
            } else {
                self.selected_sticker = None;
            }
        }
        let mut seen = false;
        for element in &mut self.text_elements {
            element.selected &= !seen;
            seen |= element.selected;
        }

        let max_id = self
            .text_elements
            .iter()
            .map(|e| e.id)
            .chain(self.stickers.iter().map(|s| s.id))
            .max()
            .unwrap_or(0);
        self.next_id = self.next_id.max(max_id + 1);
    }

    fn take_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Replace the background with an uploaded image.
    ///
    /// The canvas and export size follow the image size, clamped into range.
    pub fn set_background_image(&mut self, handle: ImageHandle) {
        let underlay = match (&self.background, self.tool) {
            (Background::Solid { color }, Tool::Meme) => Some(color.clone()),
            (Background::Image(img), _) => img.underlay.clone(),
            _ => None,
        };
        let overlay = match &self.background {
            Background::Image(img) => img.overlay.clone(),
            _ => None,
        };
        if handle.is_renderable() {
            self.canvas_width = handle.width().clamp(MIN_CANVAS, MAX_CANVAS);
            self.canvas_height = handle.height().clamp(MIN_CANVAS, MAX_CANVAS);
            self.export_width = self.canvas_width;
            self.export_height = self.canvas_height;
        }
        self.background = Background::Image(ImageBackground {
            image: Some(handle),
            overlay,
            underlay,
            ..ImageBackground::default()
        });
    }

    /// Drop the image background, going back to a solid color.
    pub fn clear_background_image(&mut self) {
        if let Background::Image(img) = &self.background {
            let color = img
                .underlay
                .clone()
                .unwrap_or_else(|| DEFAULT_BACKGROUND.to_string());
            self.background = Background::Solid { color };
        }
    }

    pub fn image_handle(&self) -> Option<&ImageHandle> {
        match &self.background {
            Background::Image(img) => img.image.as_ref(),
            _ => None,
        }
    }

    /// Null out the image handle, keeping the other image settings.
    pub fn strip_image_handle(&mut self) {
        if let Background::Image(img) = &mut self.background {
            img.image = None;
        }
    }

    /// Add a text element near the canvas center and select it.
    ///
    /// It copies the style of the selected element, if there is one.
    pub fn add_text_element(&mut self, rng: &mut dyn RandomSource) -> u64 {
        let template = self
            .selected_text_element()
            .cloned()
            .or_else(|| Self::defaults_for(Tool::Meme).text_elements.pop());
        let id = self.take_id();
        let x = self.canvas_width as f32 / 2.0 + (rng.next_f32() - 0.5) * 100.0;
        let y = self.canvas_height as f32 / 2.0 + (rng.next_f32() - 0.5) * 100.0;
        let element = match template {
            Some(t) => TextElement {
                id,
                text: "new text".to_string(),
                x,
                y,
                selected: false,
                ..t
            },
            None => TextElement {
                id,
                text: "new text".to_string(),
                font_size: 128.0,
                font: Tool::Meme.default_font_key().to_string(),
                text_color: "#ff69b4".to_string(),
                style: "solid".to_string(),
                x,
                y,
                selected: false,
            },
        };
        self.text_elements.push(element);
        self.select_text_element(id);
        id
    }

    /// Remove a text element. The last remaining element is never removed.
    ///
    /// Removing the selected element selects the first one.
    pub fn delete_text_element(&mut self, id: u64) -> bool {
        if self.text_elements.len() <= 1 {
            return false;
        }
        let Some(index) = self.text_elements.iter().position(|e| e.id == id) else {
            return false;
        };
        let removed = self.text_elements.remove(index);
        if removed.selected {
            if let Some(first) = self.text_elements.first_mut() {
                first.selected = true;
            }
        }
        true
    }

    pub fn select_text_element(&mut self, id: u64) -> bool {
        if !self.text_elements.iter().any(|e| e.id == id) {
            return false;
        }
        self.selected_sticker = None;
        for element in &mut self.text_elements {
            element.selected = element.id == id;
        }
        true
    }

    pub fn selected_text_element(&self) -> Option<&TextElement> {
        self.text_elements.iter().find(|e| e.selected)
    }

    pub fn selected_text_element_mut(&mut self) -> Option<&mut TextElement> {
        self.text_elements.iter_mut().find(|e| e.selected)
    }

    /// Add a sticker at the current sticker size and select it.
    pub fn add_sticker(&mut self, emoji: &str, x: f32, y: f32) -> u64 {
        let id = self.take_id();
        self.stickers.push(Sticker {
            id,
            emoji: emoji.to_string(),
            x,
            y,
            size: self.sticker_size,
        });
        self.select_sticker(id);
        id
    }

    pub fn delete_sticker(&mut self, id: u64) -> bool {
        let before = self.stickers.len();
        self.stickers.retain(|s| s.id != id);
        if self.selected_sticker == Some(id) {
            self.selected_sticker = None;
        }
        self.stickers.len() != before
    }

    pub fn select_sticker(&mut self, id: u64) -> bool {
        if !self.stickers.iter().any(|s| s.id == id) {
            return false;
        }
        self.text_elements.iter_mut().for_each(|e| e.selected = false);
        self.selected_sticker = Some(id);
        true
    }

    pub fn clear_selection(&mut self) {
        self.selected_sticker = None;
        self.text_elements.iter_mut().for_each(|e| e.selected = false);
    }

    /// Maximum line width of meme text elements.
    pub fn element_max_width(&self) -> f32 {
        (self.canvas_width as f32 - 2.0 * self.padding).max(1.0)
    }

    /// Find what a click at `(x, y)` lands on.
    ///
    /// Delete buttons of the current selection win, then stickers, then text
    /// elements. Text elements are tested first-declared first, matching the
    /// paint order where the first element ends up on top.
    pub fn hit_test(&self, x: f32, y: f32, measure: &mut dyn TextMeasure) -> HitTarget {
        let near = |cx: f32, cy: f32| {
            (x - cx).abs() <= DELETE_HIT_RADIUS && (y - cy).abs() <= DELETE_HIT_RADIUS
        };

        if let Some(sticker) = self
            .selected_sticker
            .and_then(|id| self.stickers.iter().find(|s| s.id == id))
        {
            let (dx, dy) = sticker_delete_center(sticker);
            if near(dx, dy) {
                return HitTarget::DeleteSticker(sticker.id);
            }
        }
        let max_width = self.element_max_width();
        if let Some(element) = self.selected_text_element() {
            let (w, h) = element.extent(max_width, measure);
            let (dx, dy) = text_delete_center(element, w, h);
            if near(dx, dy) {
                return HitTarget::DeleteText(element.id);
            }
        }

        for sticker in self.stickers.iter().rev() {
            if (x - sticker.x).hypot(y - sticker.y) < sticker.size / 2.0 {
                return HitTarget::Sticker(sticker.id);
            }
        }
        for element in &self.text_elements {
            let (w, h) = element.extent(max_width, measure);
            if (x - element.x).abs() <= w / 2.0 + SELECTION_MARGIN
                && (y - element.y).abs() <= h / 2.0 + SELECTION_MARGIN
            {
                return HitTarget::Text(element.id);
            }
        }
        HitTarget::Nothing
    }

    /// Apply a hit: delete, select, or clear the selection.
    pub fn apply_hit(&mut self, target: HitTarget) -> bool {
        match target {
            HitTarget::DeleteSticker(id) => self.delete_sticker(id),
            HitTarget::DeleteText(id) => self.delete_text_element(id),
            HitTarget::Sticker(id) => self.select_sticker(id),
            HitTarget::Text(id) => self.select_text_element(id),
            HitTarget::Nothing => {
                self.clear_selection();
                true
            }
        }
    }

    /// A copy laid out for a `width` x `height` surface.
    ///
    /// Stickers scale per axis for position and by the smaller factor for
    /// size. Text element positions scale per axis. Selection is cleared so
    /// exports never carry selection chrome.
    pub fn scaled_for_export(&self, width: u32, height: u32) -> StyleState {
        let mut scaled = self.clone();
        let sx = width as f32 / self.canvas_width.max(1) as f32;
        let sy = height as f32 / self.canvas_height.max(1) as f32;
        for sticker in &mut scaled.stickers {
            sticker.x *= sx;
            sticker.y *= sy;
            sticker.size *= sx.min(sy);
        }
        for element in &mut scaled.text_elements {
            element.x *= sx;
            element.y *= sy;
        }
        scaled.canvas_width = width;
        scaled.canvas_height = height;
        scaled.export_width = width;
        scaled.export_height = height;
        scaled.clear_selection();
        scaled
    }

    /// Build a state from possibly partial JSON over the tool defaults.
    ///
    /// Keys are merged one at a time; a key whose value does not fit its
    /// field is ignored. Image handles come back empty and the result is
    /// sanitized.
    pub fn merge_over_defaults(tool: Tool, snapshot: &serde_json::Value) -> StyleState {
        let defaults = Self::defaults_for(tool);
        let Ok(serde_json::Value::Object(mut merged)) = serde_json::to_value(&defaults) else {
            return defaults;
        };
        if let serde_json::Value::Object(fields) = snapshot {
            for (key, value) in fields {
                if key == "tool" || !merged.contains_key(key) {
                    continue;
                }
                let previous = merged.insert(key.clone(), value.clone());
                let fits =
                    serde_json::from_value::<StyleState>(serde_json::Value::Object(merged.clone()))
                        .is_ok();
                if !fits {
                    log::debug!(target: "gallery", "Ignoring stored field {:?}", key);
                    if let Some(previous) = previous {
                        merged.insert(key.clone(), previous);
                    }
                }
            }
        }
        let mut state =
            serde_json::from_value::<StyleState>(serde_json::Value::Object(merged)).unwrap_or(defaults);
        state.tool = tool;
        state.strip_image_handle();
        state.sanitize();
        state
    }
}

pub(crate) fn text_delete_center(element: &TextElement, width: f32, height: f32) -> (f32, f32) {
    (
        element.x + width / 2.0 + SELECTION_MARGIN,
        element.y - height / 2.0 - SELECTION_MARGIN,
    )
}

pub(crate) fn sticker_delete_center(sticker: &Sticker) -> (f32, f32) {
    (
        sticker.x + sticker.size / 2.0 + 10.0,
        sticker.y - sticker.size / 2.0 - 10.0,
    )
}

fn clamp_or(value: f32, min: f32, max: f32, default: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        default
    }
}

fn finite_or(value: f32, default: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        default
    }
}

fn fix_color(color: &mut String, fallback: &str) {
    if !is_hex_color(color) {
        *color = fallback.to_string();
    }
}

fn is_blend_mode(mode: &str) -> bool {
    matches!(
        mode,
        "normal"
            | "multiply"
            | "screen"
            | "overlay"
            | "darken"
            | "lighten"
            | "color-dodge"
            | "color-burn"
            | "hard-light"
            | "soft-light"
            | "difference"
            | "exclusion"
            | "hue"
            | "saturation"
            | "color"
            | "luminosity"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::FixedAdvance;
    use rstest::rstest;

    struct Half;

    impl RandomSource for Half {
        fn next_f32(&mut self) -> f32 {
            0.5
        }
    }

    #[rstest]
    #[case("none", 0.0)]
    #[case("thin", 2.0)]
    #[case("medium", 4.0)]
    #[case("thick", 8.0)]
    #[case("double", 6.0)]
    #[case("dashed", 3.0)]
    #[case("wavy", 0.0)]
    fn test_outline_widths(#[case] key: &str, #[case] width: f32) {
        assert_eq!(OutlineKind::from_key(key).width(), width);
    }

    #[test]
    fn test_tool_defaults() {
        let album = StyleState::defaults_for(Tool::AlbumCover);
        assert_eq!(album.text_color, "#ffffff");
        assert_eq!(album.padding, 40.0);
        assert!(!album.text_blur.enabled);

        let brat = StyleState::defaults_for(Tool::BratPro);
        assert_eq!(brat.text_color, "#000000");
        assert_eq!(brat.text_blur.amount, 2.0);

        let meme = StyleState::defaults_for(Tool::Meme);
        assert_eq!(meme.text_elements.len(), 1);
        assert!(meme.text_elements[0].selected);
        assert_eq!(meme.next_id, 2);
    }

    #[test]
    fn test_sanitize_clamps_everything() {
        let mut state = StyleState::defaults_for(Tool::Meme);
        state.font_size = 1000.0;
        state.letter_spacing = f32::NAN;
        state.rotation = -720.0;
        state.text_color = "red".to_string();
        state.canvas_width = 10;
        state.export_height = 100_000;
        state.sticker_size = 900.0;
        state.font = "comic-sans".to_string();
        state.effect = "sparkle-magic".to_string();
        state.aesthetic = Some("vaporwave".to_string());
        state.stickers.push(Sticker {
            id: 9,
            emoji: "👑".to_string(),
            x: f32::INFINITY,
            y: 10.0,
            size: 1.0,
        });
        state.sanitize();

        assert_eq!(state.font_size, MAX_FONT_SIZE);
        assert_eq!(state.letter_spacing, 0.0);
        assert_eq!(state.rotation, -180.0);
        assert_eq!(state.text_color, "#ff69b4");
        assert_eq!(state.canvas_width, MIN_CANVAS);
        assert_eq!(state.export_height, MAX_EXPORT);
        assert_eq!(state.sticker_size, MAX_STICKER);
        assert_eq!(state.font, "fredoka-one");
        assert_eq!(state.effect, "bubble");
        assert_eq!(state.aesthetic, None);
        assert_eq!(state.stickers[0].size, MIN_STICKER);
        assert_eq!(state.stickers[0].x, 100.0);
        assert_eq!(state.next_id, 10);
    }

    #[test]
    fn test_sanitize_unknown_gradient_falls_back_to_solid() {
        let mut state = StyleState::default();
        state.background = Background::Gradient {
            key: "no-such-gradient".to_string(),
        };
        state.sanitize();
        assert_eq!(state.background, Background::solid(DEFAULT_BACKGROUND));
    }

    #[test]
    fn test_selection_is_exclusive() {
        let mut state = StyleState::defaults_for(Tool::Meme);
        let sticker = state.add_sticker("🦋", 100.0, 100.0);
        assert_eq!(state.selected_sticker, Some(sticker));
        assert!(state.selected_text_element().is_none());

        let text = state.add_text_element(&mut Half);
        assert_eq!(state.selected_sticker, None);
        assert_eq!(state.selected_text_element().map(|e| e.id), Some(text));
        assert_eq!(state.text_elements.iter().filter(|e| e.selected).count(), 1);
    }

    #[test]
    fn test_ids_are_never_reused() {
        let mut state = StyleState::defaults_for(Tool::Meme);
        let a = state.add_text_element(&mut Half);
        assert!(state.delete_text_element(a));
        let b = state.add_text_element(&mut Half);
        let c = state.add_sticker("👑", 0.0, 0.0);
        assert!(b > a && c > b);
    }

    #[test]
    fn test_last_text_element_is_kept() {
        let mut state = StyleState::defaults_for(Tool::Meme);
        assert!(!state.delete_text_element(1));
        let id = state.add_text_element(&mut Half);
        assert!(state.delete_text_element(id));
        assert_eq!(state.text_elements.len(), 1);
        assert!(state.text_elements[0].selected);
    }

    #[test]
    fn test_new_text_element_near_center() {
        let mut state = StyleState::defaults_for(Tool::Meme);
        let id = state.add_text_element(&mut Half);
        let element = state.text_elements.iter().find(|e| e.id == id).unwrap();
        assert_eq!((element.x, element.y), (250.0, 250.0));
        assert_eq!(element.text, "new text");
        assert_eq!(element.style, "bubble");
    }

    #[test]
    fn test_background_image_sets_canvas_size() {
        let mut state = StyleState::defaults_for(Tool::Meme);
        state.set_background_image(ImageHandle::from_rgba(vec![0; 4 * 3000 * 2], 3000, 2));
        assert_eq!((state.canvas_width, state.canvas_height), (MAX_CANVAS, MIN_CANVAS));
        assert_eq!((state.export_width, state.export_height), (MAX_CANVAS, MIN_CANVAS));
        let Background::Image(img) = &state.background else {
            panic!("background should be an image");
        };
        assert_eq!(img.underlay.as_deref(), Some(DEFAULT_BACKGROUND));

        state.clear_background_image();
        assert_eq!(state.background, Background::solid(DEFAULT_BACKGROUND));
    }

    #[test]
    fn test_image_handle_serializes_as_null() {
        let mut state = StyleState::default();
        state.set_background_image(ImageHandle::from_rgba(vec![255; 4 * 400 * 300], 400, 300));
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["background"]["type"], "image");
        assert!(json["background"]["image"].is_null());

        let restored: StyleState = serde_json::from_value(json).unwrap();
        assert_eq!(restored.image_handle(), None);
        assert_eq!(restored.canvas_width, 400);
    }

    #[test]
    fn test_hit_test_order() {
        let mut state = StyleState::defaults_for(Tool::Meme);
        let mut measure = FixedAdvance::new(0.5);
        // "brat" at 128px: 256 x 153.6 around (250, 250)
        assert_eq!(state.hit_test(250.0, 250.0, &mut measure), HitTarget::Text(1));
        assert_eq!(state.hit_test(5.0, 5.0, &mut measure), HitTarget::Nothing);
        // Delete button of the selected text element
        assert_eq!(
            state.hit_test(388.0, 163.2, &mut measure),
            HitTarget::DeleteText(1)
        );

        let sticker = state.add_sticker("💀", 250.0, 250.0);
        assert_eq!(state.hit_test(250.0, 250.0, &mut measure), HitTarget::Sticker(sticker));
        assert_eq!(
            state.hit_test(285.0, 215.0, &mut measure),
            HitTarget::DeleteSticker(sticker)
        );
        assert!(state.apply_hit(HitTarget::DeleteSticker(sticker)));
        assert!(state.stickers.is_empty());
        assert!(state.apply_hit(HitTarget::Nothing));
        assert!(state.selected_text_element().is_none());
    }

    #[test]
    fn test_scaled_for_export() {
        let mut state = StyleState::defaults_for(Tool::Meme);
        state.add_sticker("👑", 100.0, 400.0);
        let scaled = state.scaled_for_export(1000, 500);
        let sticker = &scaled.stickers[0];
        assert_eq!((sticker.x, sticker.y, sticker.size), (200.0, 400.0, 50.0));
        assert_eq!((scaled.text_elements[0].x, scaled.text_elements[0].y), (500.0, 250.0));
        assert_eq!(scaled.selected_sticker, None);
        assert!(scaled.text_elements.iter().all(|e| !e.selected));
        // The live state is untouched
        assert_eq!(state.stickers[0].x, 100.0);
        assert!(state.selected_sticker.is_some());
    }

    #[test]
    fn test_merge_over_defaults_ignores_bad_fields() {
        let snapshot = serde_json::json!({
            "content": "365",
            "fontSize": "huge",
            "textColor": "#123456",
            "canvasWidth": 800,
            "legacyField": true,
            "tool": "meme",
        });
        let state = StyleState::merge_over_defaults(Tool::BratPro, &snapshot);
        assert_eq!(state.tool, Tool::BratPro);
        assert_eq!(state.content, "365");
        assert_eq!(state.font_size, 128.0);
        assert_eq!(state.text_color, "#123456");
        assert_eq!(state.canvas_width, 800);
    }

    #[test]
    fn test_tool_from_str() {
        assert_eq!("brat-pro".parse::<Tool>(), Ok(Tool::BratPro));
        assert!("poster".parse::<Tool>().is_err());
    }
}
