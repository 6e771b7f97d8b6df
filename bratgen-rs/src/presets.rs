//! Static lookup tables: fonts, background gradients, outlines, text effects,
//! export sizes, aesthetics and gallery seed presets.
//!
//! Every lookup has a fallback, so an unknown key never fails.

use std::collections::HashMap;

/// Family used when a single-text tool asks for an unknown font key.
pub const DEFAULT_FAMILY: &str = "Inter";
/// Family used when the meme tool asks for an unknown font key.
pub const DEFAULT_MEME_FAMILY: &str = "Fredoka One";
/// Brat green.
pub const DEFAULT_BACKGROUND: &str = "#8ACE00";

const FONTS: &[(&str, &str)] = &[
    ("inter", "Inter"),
    ("poppins", "Poppins"),
    ("jetbrains-mono", "JetBrains Mono"),
    ("space-mono", "Space Mono"),
    ("bebas-neue", "Bebas Neue"),
    ("oswald", "Oswald"),
    ("anton", "Anton"),
    ("barlow", "Barlow"),
    ("playfair-display", "Playfair Display"),
    ("lobster", "Lobster"),
    ("dancing-script", "Dancing Script"),
    ("amatic-sc", "Amatic SC"),
    ("orbitron", "Orbitron"),
    ("exo", "Exo"),
    ("rajdhani", "Rajdhani"),
    ("montserrat", "Montserrat"),
    ("roboto", "Roboto"),
    ("open-sans", "Open Sans"),
    ("lato", "Lato"),
    ("nunito", "Nunito"),
    ("source-sans-pro", "Source Sans Pro"),
    ("raleway", "Raleway"),
    ("ubuntu", "Ubuntu"),
    ("pt-sans", "PT Sans"),
    ("merriweather", "Merriweather"),
    ("lora", "Lora"),
    ("pt-serif", "PT Serif"),
    ("crimson-text", "Crimson Text"),
    ("libre-baskerville", "Libre Baskerville"),
    ("source-serif-pro", "Source Serif Pro"),
    ("vollkorn", "Vollkorn"),
    ("cormorant-garamond", "Cormorant Garamond"),
    ("fira-code", "Fira Code"),
    ("source-code-pro", "Source Code Pro"),
    ("roboto-mono", "Roboto Mono"),
    ("inconsolata", "Inconsolata"),
    ("ubuntu-mono", "Ubuntu Mono"),
    ("cousine", "Cousine"),
    ("pt-mono", "PT Mono"),
    ("overpass-mono", "Overpass Mono"),
    ("permanent-marker", "Permanent Marker"),
    ("indie-flower", "Indie Flower"),
    ("kalam", "Kalam"),
    ("caveat", "Caveat"),
    ("shadows-into-light", "Shadows Into Light"),
    ("satisfy", "Satisfy"),
    ("great-vibes", "Great Vibes"),
    ("pacifico", "Pacifico"),
    ("comfortaa", "Comfortaa"),
    ("righteous", "Righteous"),
    ("fredoka-one", "Fredoka One"),
    ("bangers", "Bangers"),
    ("creepster", "Creepster"),
    ("monoton", "Monoton"),
    ("bungee", "Bungee"),
    ("alfa-slab-one", "Alfa Slab One"),
    ("fugaz-one", "Fugaz One"),
    ("bowlby-one", "Bowlby One"),
    ("russo-one", "Russo One"),
    ("impact", "Impact"),
    ("concert-one", "Concert One"),
];

const GRADIENTS: &[(&str, &[&str])] = &[
    ("brat-classic", &["#8ACE00", "#6366F1"]),
    ("sunset-vibes", &["#F59E0B", "#EC4899"]),
    ("ocean-dreams", &["#06B6D4", "#6366F1"]),
    ("dark-mode", &["#1E1E1E", "#4B5563"]),
    ("rainbow", &["#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4"]),
    ("fire", &["#FF416C", "#FF4B2B"]),
    ("ice", &["#667EEA", "#764BA2"]),
    ("gold", &["#FFD700", "#FFA500"]),
    ("chrome", &["#C0C0C0", "#808080", "#404040"]),
    ("neon", &["#00FF87", "#60EFFF"]),
    ("lime-punch", &["#A8E063", "#56AB2F"]),
    ("tropical", &["#FAD961", "#F76B1C"]),
    ("aurora", &["#00C6FF", "#0072FF"]),
    ("cotton-candy", &["#F6D365", "#FDA085"]),
    ("sakura", &["#FA709A", "#FEE140"]),
    ("grape-soda", &["#892CDC", "#BC6FF1"]),
    ("minty", &["#3EB489", "#A8FF78"]),
    ("twilight", &["#0F2027", "#203A43", "#2C5364"]),
    ("night-sky", &["#141E30", "#243B55"]),
    ("fuchsia-pop", &["#F953C6", "#B91D73"]),
    ("lagoon", &["#43C6AC", "#191654"]),
    ("melon-sunset", &["#FF9A9E", "#FAD0C4"]),
    ("horizon", &["#E0EAFC", "#CFDEF3"]),
    ("royal", &["#8360C3", "#2EBF91"]),
    ("cyberpunk", &["#A1FFCE", "#FAFFD1"]),
    ("mango", &["#FDC830", "#F37335"]),
    ("arctic", &["#4CA1AF", "#C4E0E5"]),
    ("berry", &["#642B73", "#C6426E"]),
    ("flamingo", &["#FECFEF", "#F68084"]),
    ("deep-sea", &["#2C3E50", "#4CA1AF"]),
    ("sky-glow", &["#36D1DC", "#5B86E5"]),
    ("citrus", &["#DCE35B", "#45B649"]),
    ("orchid", &["#DA22FF", "#9733EE"]),
    ("ember", &["#EB5757", "#000000"]),
    ("azure", &["#00B4DB", "#0083B0"]),
    ("blush", &["#B24592", "#F15F79"]),
    ("forest", &["#5A3F37", "#2C7744"]),
    ("steel", &["#757F9A", "#D7DDE8"]),
    ("sunlit", &["#FBD786", "#C6FFDD"]),
    ("peacock", &["#00C9FF", "#92FE9D"]),
    ("volt", &["#FFE53B", "#FF2525"]),
    ("orchid-sky", &["#1FA2FF", "#12D8FA", "#A6FFCB"]),
    ("sour-apple", &["#C6EA8D", "#FE90AF"]),
    ("mint-fizz", &["#00DBDE", "#FC00FF"]),
    ("sapphire", &["#355C7D", "#6C5B7B", "#C06C84"]),
    ("dusk", &["#A8C0FF", "#3F2B96"]),
    ("spice", &["#E65C00", "#F9D423"]),
    ("reef", &["#11998E", "#38EF7D"]),
    ("cocoa", &["#D1913C", "#FFD194"]),
    ("luxe", &["#434343", "#000000"]),
];

/// Seven-stop hue sweep shared by the `rainbow` and `gradient` fills.
pub const RAINBOW_STOPS: &[&str] = &[
    "#ff0000", "#ff8000", "#ffff00", "#00ff00", "#0080ff", "#8000ff", "#ff0080",
];

/// Fixed gray ramp of the `chrome` fill, top to bottom.
pub const CHROME_STOPS: &[&str] = &["#ffffff", "#e0e0e0", "#c0c0c0", "#a0a0a0", "#808080", "#606060"];

/// Direction of a text gradient across the text bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientDirection {
    /// Top edge to bottom edge.
    Vertical,
    /// Left edge to right edge.
    Horizontal,
    /// Top-left corner to bottom-right corner.
    Diagonal,
}

/// How an effect paints the text glyphs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FillStrategy {
    /// The text color as is.
    Solid,
    /// A fixed color replacing the text color.
    Fixed(&'static str),
    /// Lighter, base, darker from top to bottom.
    Bubble,
    /// White highlight, base band, darker bottom.
    Glossy,
    /// Evenly spaced fixed stops.
    Gradient {
        direction: GradientDirection,
        stops: &'static [&'static str],
    },
}

/// Shadow attached to an effect. A `None` color means the text color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowPreset {
    pub color: Option<&'static str>,
    pub blur: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectPreset {
    pub fill: FillStrategy,
    pub shadow: Option<ShadowPreset>,
}

const fn shadow(color: &'static str, blur: f32, offset_x: f32, offset_y: f32) -> Option<ShadowPreset> {
    Some(ShadowPreset {
        color: Some(color),
        blur,
        offset_x,
        offset_y,
    })
}

const fn gradient(direction: GradientDirection, stops: &'static [&'static str]) -> FillStrategy {
    FillStrategy::Gradient { direction, stops }
}

use self::GradientDirection::{Diagonal, Horizontal, Vertical};

const EFFECTS: &[(&str, EffectPreset)] = &[
    (
        "none",
        EffectPreset {
            fill: FillStrategy::Solid,
            shadow: None,
        },
    ),
    (
        "solid",
        EffectPreset {
            fill: FillStrategy::Solid,
            shadow: None,
        },
    ),
    (
        "bubble",
        EffectPreset {
            fill: FillStrategy::Bubble,
            shadow: None,
        },
    ),
    (
        "glossy",
        EffectPreset {
            fill: FillStrategy::Glossy,
            shadow: None,
        },
    ),
    (
        "gradient",
        EffectPreset {
            fill: gradient(Horizontal, RAINBOW_STOPS),
            shadow: None,
        },
    ),
    (
        "glow",
        EffectPreset {
            fill: FillStrategy::Solid,
            shadow: Some(ShadowPreset {
                color: None,
                blur: 20.0,
                offset_x: 0.0,
                offset_y: 0.0,
            }),
        },
    ),
    (
        "neon",
        EffectPreset {
            fill: FillStrategy::Fixed("#00FF87"),
            shadow: shadow("#60EFFF", 30.0, 0.0, 0.0),
        },
    ),
    (
        "vintage",
        EffectPreset {
            fill: FillStrategy::Solid,
            shadow: shadow("rgba(139, 69, 19, 0.5)", 5.0, 2.0, 2.0),
        },
    ),
    (
        "metallic",
        EffectPreset {
            fill: gradient(Vertical, &["#C0C0C0", "#E8E8E8", "#C0C0C0"]),
            shadow: shadow("rgba(0, 0, 0, 0.5)", 10.0, 2.0, 2.0),
        },
    ),
    (
        "glass",
        EffectPreset {
            fill: gradient(Vertical, &["rgba(255,255,255,0.7)", "rgba(255,255,255,0.3)"]),
            shadow: shadow("rgba(255, 255, 255, 0.5)", 15.0, 0.0, 0.0),
        },
    ),
    (
        "fire",
        EffectPreset {
            fill: gradient(Vertical, &["#FF416C", "#FF4B2B", "#FFD700"]),
            shadow: shadow("#FF4B2B", 25.0, 0.0, 0.0),
        },
    ),
    (
        "ice",
        EffectPreset {
            fill: gradient(Vertical, &["#667EEA", "#764BA2", "#E6F3FF"]),
            shadow: shadow("#667EEA", 20.0, 0.0, 0.0),
        },
    ),
    (
        "grunge",
        EffectPreset {
            fill: FillStrategy::Solid,
            shadow: shadow("rgba(0, 0, 0, 0.8)", 8.0, 3.0, 3.0),
        },
    ),
    (
        "pixel",
        EffectPreset {
            fill: FillStrategy::Solid,
            shadow: shadow("rgba(0, 0, 0, 0.9)", 0.0, 2.0, 2.0),
        },
    ),
    (
        "rainbow",
        EffectPreset {
            fill: gradient(Horizontal, RAINBOW_STOPS),
            shadow: shadow("rgba(255, 0, 255, 0.6)", 15.0, 0.0, 0.0),
        },
    ),
    (
        "chrome",
        EffectPreset {
            fill: gradient(Vertical, CHROME_STOPS),
            shadow: shadow("rgba(0, 0, 0, 0.7)", 8.0, 2.0, 2.0),
        },
    ),
    (
        "plasma",
        EffectPreset {
            fill: gradient(Diagonal, &["#ff00ff", "#8000ff", "#0080ff", "#00ffff"]),
            shadow: shadow("rgba(255, 0, 255, 0.8)", 20.0, 0.0, 0.0),
        },
    ),
    (
        "hologram",
        EffectPreset {
            fill: gradient(Horizontal, &["#00ffff", "#ff00ff", "#00ff00", "#ffff00"]),
            shadow: shadow("rgba(0, 255, 255, 0.7)", 25.0, 0.0, 0.0),
        },
    ),
    (
        "electric",
        EffectPreset {
            fill: FillStrategy::Fixed("#00FFFF"),
            shadow: shadow("rgba(0, 255, 255, 1)", 30.0, 0.0, 0.0),
        },
    ),
    (
        "cosmic",
        EffectPreset {
            fill: gradient(Diagonal, &["#8A2BE2", "#4B0082", "#9932CC", "#BA55D3"]),
            shadow: shadow("rgba(138, 43, 226, 0.8)", 20.0, 0.0, 0.0),
        },
    ),
    (
        "lava",
        EffectPreset {
            fill: gradient(Vertical, &["#FF4500", "#FF6347", "#FF8C00", "#FFD700"]),
            shadow: shadow("rgba(255, 69, 0, 0.9)", 25.0, 0.0, 0.0),
        },
    ),
    (
        "toxic",
        EffectPreset {
            fill: gradient(Diagonal, &["#32CD32", "#ADFF2F", "#00FF7F", "#00FF00"]),
            shadow: shadow("rgba(50, 205, 50, 0.8)", 18.0, 0.0, 0.0),
        },
    ),
    (
        "diamond",
        EffectPreset {
            fill: gradient(Diagonal, &["#FFFFFF", "#F0F8FF", "#E6E6FA", "#F5F5F5"]),
            shadow: shadow("rgba(255, 255, 255, 0.9)", 20.0, 0.0, 0.0),
        },
    ),
];

const NO_EFFECT: EffectPreset = EffectPreset {
    fill: FillStrategy::Solid,
    shadow: None,
};

/// Named export sizes offered next to a custom size.
pub const EXPORT_SIZES: &[(&str, u32, u32)] = &[
    ("400x400", 400, 400),
    ("800x800", 800, 800),
    ("1080x1080", 1080, 1080),
    ("1920x1080", 1920, 1080),
    ("1080x1920", 1080, 1920),
];

/// Whole-canvas decorations for the meme tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aesthetic {
    Glitter,
    Sparkles,
    Rhinestones,
    NeonPink,
    Holographic,
    /// Styles that only affect text and draw nothing on the canvas.
    TextOnly,
}

const AESTHETICS: &[(&str, Aesthetic)] = &[
    ("glitter", Aesthetic::Glitter),
    ("sparkles", Aesthetic::Sparkles),
    ("rhinestones", Aesthetic::Rhinestones),
    ("neon-pink", Aesthetic::NeonPink),
    ("neonPink", Aesthetic::NeonPink),
    ("holographic", Aesthetic::Holographic),
    ("chrome", Aesthetic::TextOnly),
    ("metallic", Aesthetic::TextOnly),
    ("iridescent", Aesthetic::TextOnly),
    ("galaxy", Aesthetic::TextOnly),
    ("rainbow", Aesthetic::TextOnly),
];

/// Emoji sticker collections offered by the meme tool.
pub const STICKER_COLLECTIONS: &[(&str, &[&str])] = &[
    (
        "crowns",
        &["👑", "💎", "🏆", "🎯", "⭐", "🌟", "✨", "💫", "🔱", "🎭", "🎪", "🎨", "🎬", "🎤"],
    ),
    (
        "bows",
        &["🎀", "🎗️", "🏹", "💝", "🎁", "🎊", "🎉", "🪅", "🎈", "🌺", "🌸", "🌷", "🌹", "💐"],
    ),
    (
        "butterflies",
        &["🦋", "🌸", "🌺", "🌻", "🌷", "🏵️", "💮", "🌼", "🌿", "🍀", "🌱", "🌾", "🌵", "🌳"],
    ),
    (
        "lipgloss",
        &["💄", "💋", "👄", "💅", "💆", "💇", "🪞", "💊", "🧴", "🧼", "🧽", "🪥", "🧲", "💡"],
    ),
    (
        "memes",
        &[
            "😭", "💀", "🤡", "👻", "🤠", "🤓", "😎", "🥺", "😈", "👿", "💩", "🤪", "😜", "🙃",
            "😵", "🤯",
        ],
    ),
];

lazy_static! {
    static ref FONT_MAP: HashMap<&'static str, &'static str> = FONTS.iter().copied().collect();
    static ref GRADIENT_MAP: HashMap<&'static str, &'static [&'static str]> =
        GRADIENTS.iter().copied().collect();
    static ref EFFECT_MAP: HashMap<&'static str, EffectPreset> = EFFECTS.iter().copied().collect();
    static ref AESTHETIC_MAP: HashMap<&'static str, Aesthetic> = AESTHETICS.iter().copied().collect();
}

/// Resolve a font key to a family name, or `fallback` when the key is unknown.
pub fn font_family<'a>(key: &str, fallback: &'a str) -> &'a str {
    FONT_MAP.get(key).copied().unwrap_or(fallback)
}

pub fn font_keys() -> impl Iterator<Item = &'static str> {
    FONTS.iter().map(|(key, _)| *key)
}

/// Stop colors of a named background gradient.
pub fn gradient_stops(key: &str) -> Option<&'static [&'static str]> {
    GRADIENT_MAP.get(key).copied()
}

pub fn gradient_keys() -> impl Iterator<Item = &'static str> {
    GRADIENTS.iter().map(|(key, _)| *key)
}

/// Effect preset by key; unknown keys paint solid text without a shadow.
pub fn effect(key: &str) -> EffectPreset {
    EFFECT_MAP.get(key).copied().unwrap_or(NO_EFFECT)
}

pub fn effect_keys() -> impl Iterator<Item = &'static str> {
    EFFECTS.iter().map(|(key, _)| *key)
}

pub fn aesthetic(key: &str) -> Option<Aesthetic> {
    AESTHETIC_MAP.get(key).copied()
}

/// Export size by preset key, falling back to 800x800.
pub fn export_size(key: &str) -> (u32, u32) {
    EXPORT_SIZES
        .iter()
        .find(|(name, _, _)| *name == key)
        .map(|(_, w, h)| (*w, *h))
        .unwrap_or((800, 800))
}

/// Parse a `WIDTHxHEIGHT` size such as `1080x1350`.
pub fn parse_size(value: &str) -> Option<(u32, u32)> {
    let (width, height) = value.trim().split_once(['x', 'X'])?;
    let width = width.trim().parse().ok()?;
    let height = height.trim().parse().ok()?;
    Some((width, height))
}

pub fn sticker_collection(key: &str) -> Option<&'static [&'static str]> {
    STICKER_COLLECTIONS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, emojis)| *emojis)
}

/// A demo gallery entry, applied on top of the tool defaults.
#[derive(Debug, Clone, Copy)]
pub struct SeedPreset {
    pub title: &'static str,
    pub text: &'static str,
    pub font: &'static str,
    pub font_size: f32,
    pub text_color: &'static str,
    pub background: &'static str,
    pub effect: &'static str,
    pub aesthetic: Option<&'static str>,
}

const fn seed(
    title: &'static str,
    text: &'static str,
    font: &'static str,
    font_size: f32,
    text_color: &'static str,
    background: &'static str,
    effect: &'static str,
) -> SeedPreset {
    SeedPreset {
        title,
        text,
        font,
        font_size,
        text_color,
        background,
        effect,
        aesthetic: None,
    }
}

pub const ALBUM_SEEDS: &[SeedPreset] = &[
    seed("brat - Classic Album", "brat", "inter", 128.0, "#ffffff", "#8ACE00", "none"),
    seed("minimalist - Black", "minimalist", "poppins", 64.0, "#ffffff", "#000000", "none"),
    seed("neon - Glow Effect", "neon", "orbitron", 96.0, "#00ffff", "#0a0a2e", "glow"),
    seed("vintage - Sepia Tone", "vintage", "playfair-display", 80.0, "#f5deb3", "#8b4513", "vintage"),
    seed("dream - Soft Pastel", "dream", "dancing-script", 96.0, "#d8bfd8", "#ffe4e1", "none"),
    seed("impact - Bold Statement", "IMPACT", "anton", 110.0, "#ffffff", "#ff0000", "none"),
    seed("golden - Luxury", "golden", "cormorant-garamond", 90.0, "#ffd700", "#1a1a1a", "metallic"),
    seed("ocean - Deep Blue", "ocean", "montserrat", 96.0, "#87ceeb", "#000080", "ice"),
];

pub const MEME_SEEDS: &[SeedPreset] = &[
    SeedPreset {
        aesthetic: Some("glitter"),
        ..seed("brat - Classic Green", "brat", "fredoka-one", 128.0, "#ff69b4", "#8ACE00", "bubble")
    },
    SeedPreset {
        aesthetic: Some("neon-pink"),
        ..seed("summer - Neon Pink", "summer", "bebas-neue", 120.0, "#00ffff", "#ff1493", "solid")
    },
    SeedPreset {
        aesthetic: Some("sparkles"),
        ..seed("princess - Crown Vibes", "princess", "pacifico", 80.0, "#ffd700", "#ffb6c1", "glossy")
    },
    SeedPreset {
        aesthetic: Some("holographic"),
        ..seed("y2k - Holo Dreams", "y2k", "bungee", 120.0, "#ffffff", "#c0c0ff", "chrome")
    },
    SeedPreset {
        aesthetic: Some("rhinestones"),
        ..seed("iconic - Rhinestone", "iconic", "righteous", 100.0, "#ff1493", "#000000", "gradient")
    },
];

pub const BRAT_SEEDS: &[SeedPreset] = &[
    seed("brat - Classic", "brat", "inter", 128.0, "#000000", "#8ACE00", "none"),
    seed("club classics - Night", "club classics", "inter", 96.0, "#ffffff", "#111827", "glow"),
    seed("365 - Party", "365 party girl", "inter", 80.0, "#000000", "#EC4899", "none"),
    seed("sympathy - Chrome", "sympathy is a knife", "inter", 72.0, "#000000", "#9CA3AF", "chrome"),
    seed("von dutch - Fire", "von dutch", "anton", 110.0, "#000000", "#F97316", "fire"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_sizes() {
        assert_eq!(FONTS.len(), 61);
        assert_eq!(GRADIENTS.len(), 50);
        assert_eq!(FONT_MAP.len(), 61);
        assert_eq!(GRADIENT_MAP.len(), 50);
    }

    #[test]
    fn test_font_fallback() {
        assert_eq!(font_family("bebas-neue", DEFAULT_FAMILY), "Bebas Neue");
        assert_eq!(font_family("nope", DEFAULT_FAMILY), "Inter");
        assert_eq!(font_family("nope", DEFAULT_MEME_FAMILY), "Fredoka One");
    }

    #[test]
    fn test_effect_fallback_is_solid() {
        assert_eq!(effect("does-not-exist"), NO_EFFECT);
        assert_eq!(effect("bubble").fill, FillStrategy::Bubble);
        assert!(effect("neon").shadow.is_some());
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("1080x1350"), Some((1080, 1350)));
        assert_eq!(parse_size(" 800 X 600 "), Some((800, 600)));
        assert_eq!(parse_size("square"), None);
        assert_eq!(parse_size("10x"), None);
    }

    #[test]
    fn test_export_size_fallback() {
        assert_eq!(export_size("1920x1080"), (1920, 1080));
        assert_eq!(export_size("huge"), (800, 800));
    }

    #[test]
    fn test_aesthetic_lookup() {
        assert_eq!(aesthetic("neon-pink"), Some(Aesthetic::NeonPink));
        assert_eq!(aesthetic("galaxy"), Some(Aesthetic::TextOnly));
        assert_eq!(aesthetic("glow"), None);
    }

    #[test]
    fn test_every_gradient_has_two_stops() {
        assert!(gradient_keys().all(|key| gradient_stops(key).is_some_and(|s| s.len() >= 2)));
        assert_eq!(sticker_collection("bows").map(|s| s.len()), Some(14));
    }
}
