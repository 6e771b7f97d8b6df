use bratgen_rs::bratgen_canvas2d::{Canvas2dContext, FontConfig, ResolvedFontConfig};
use bratgen_rs::gallery::{FileStore, Gallery, MemoryStore};
use bratgen_rs::layout::{wrap_text, FixedAdvance, TextMeasure};
use bratgen_rs::render::single_text_layout;
use bratgen_rs::state::{Background, OutlineKind, StyleState, Tool};
use bratgen_rs::{export_surface, render, EngineConfig, FastRandom};
use rstest::rstest;
use std::fs;
use std::path::{Path, PathBuf};

fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn load_fixture(name: &str) -> String {
    let path = fixture_path(name);
    fs::read_to_string(&path).unwrap_or_else(|_| panic!("Failed to read {:?}", path))
}

fn offline_fonts() -> ResolvedFontConfig {
    ResolvedFontConfig::new(&FontConfig::offline())
}

fn pixel(surface: &Canvas2dContext, x: i32, y: i32) -> [u8; 4] {
    let data = surface.get_image_data(x, y, 1, 1);
    [data[0], data[1], data[2], data[3]]
}

#[rstest]
#[case("brat", 300.0)]
#[case("club classics 365 party girl von dutch", 200.0)]
#[case("supercalifragilisticexpialidocious", 120.0)]
#[case("a  b\tc\nd", 30.0)]
#[case("wide", 5.0)]
fn test_wrap_lines_fit_and_keep_words(#[case] text: &str, #[case] max_width: f32) {
    let mut measure = FixedAdvance::new(0.5);
    measure.select_font("20px \"Inter\"");
    let lines = wrap_text(text, max_width, &mut measure);

    for line in &lines {
        assert!(
            measure.measure(line) <= max_width || line.chars().count() == 1,
            "{line:?} is wider than {max_width}"
        );
        // Wrapping a wrapped line changes nothing
        assert_eq!(wrap_text(line, max_width, &mut measure), vec![line.clone()]);
    }
    let original: String = text.split_whitespace().collect();
    let rejoined: String = lines.iter().flat_map(|l| l.split_whitespace()).collect();
    assert_eq!(rejoined, original);
}

#[test]
fn test_export_keeps_text_centered() {
    let state = StyleState::defaults_for(Tool::AlbumCover);
    let exported = state.scaled_for_export(1080, 1080);
    let mut measure = FixedAdvance::new(0.55);
    let bounds = single_text_layout(&exported, &mut measure).bounds();
    let center_x = bounds.x + bounds.width / 2.0;
    let center_y = bounds.y + bounds.height / 2.0;
    assert!((center_x - 540.0).abs() <= 10.8);
    assert!((center_y - 540.0).abs() <= 10.8);
}

#[test]
fn test_export_keeps_sticker_proportions() {
    let mut state = StyleState::defaults_for(Tool::Meme);
    state.sticker_size = 40.0;
    state.add_sticker("💖", 100.0, 400.0);
    let exported = state.scaled_for_export(1000, 750);
    let sticker = &exported.stickers[0];
    assert_eq!(sticker.x / 1000.0, 100.0 / 500.0);
    assert_eq!(sticker.y / 750.0, 400.0 / 500.0);
    assert_eq!(sticker.size, 60.0);
    assert_eq!(exported.selected_sticker, None);
    // The live state still has the sticker selected at its old place
    assert_eq!(state.stickers[0].x, 100.0);
    assert!(state.selected_sticker.is_some());
}

#[test]
fn test_preview_and_export_match() {
    let mut state = StyleState::defaults_for(Tool::BratPro);
    state.background = Background::Gradient {
        key: "twilight".to_string(),
    };
    let fonts = offline_fonts();
    let mut preview = Canvas2dContext::with_resolved(500, 500, &fonts).unwrap();
    render(&mut preview, &state, &mut FastRandom::with_seed(1)).unwrap();
    let export = export_surface(&state, 1000, 1000, &fonts, &mut FastRandom::with_seed(1)).unwrap();

    for (x, y) in [(50, 50), (250, 125), (400, 450)] {
        let small = pixel(&preview, x, y);
        let large = pixel(&export, x * 2, y * 2);
        for (a, b) in small.iter().zip(large) {
            assert!((*a as i32 - b as i32).abs() <= 3, "{small:?} vs {large:?}");
        }
    }
}

#[rstest]
#[case("none", 0.0)]
#[case("thin", 2.0)]
#[case("medium", 4.0)]
#[case("thick", 8.0)]
#[case("double", 6.0)]
#[case("dashed", 3.0)]
fn test_outline_widths(#[case] key: &str, #[case] width: f32) {
    assert_eq!(OutlineKind::from_key(key).width(), width);
}

#[test]
fn test_letter_spacing_widens_text() {
    let mut state = StyleState::defaults_for(Tool::AlbumCover);
    let mut measure = FixedAdvance::new(0.5);
    let tight = single_text_layout(&state, &mut measure).bounds();
    state.letter_spacing = 10.0;
    let loose = single_text_layout(&state, &mut measure).bounds();
    assert!(loose.width > tight.width);
    assert_eq!(loose.x + loose.width / 2.0, tight.x + tight.width / 2.0);
}

#[test]
fn test_gallery_file_keeps_sixteen() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::in_dir(dir.path(), Tool::Meme);
    let config = EngineConfig::offline();
    let mut gallery = Gallery::open(Tool::Meme, Box::new(store.clone()), &config);
    let mut state = StyleState::defaults_for(Tool::Meme);
    for i in 0..20 {
        state.text_elements[0].text = format!("meme {i}");
        gallery
            .save_item("data:image/png;base64,AA==".to_string(), &state)
            .unwrap();
    }

    let reopened = Gallery::open(Tool::Meme, Box::new(store), &config);
    assert_eq!(reopened.len(), 16);
    let newest = reopened.load_state(&reopened.items()[0].id).unwrap();
    assert_eq!(newest.text_elements[0].text, "meme 19");
}

#[test]
fn test_gallery_drops_invalid_entries() {
    let store = MemoryStore::with_data(load_fixture("album_gallery.json"));
    let gallery = Gallery::open(Tool::AlbumCover, Box::new(store), &EngineConfig::offline());
    assert_eq!(gallery.len(), 4);
    assert!(gallery.get("album_1717980000000_broken000").is_none());
    assert!(gallery.get("album_1717985000000_nothumb00").is_none());
    let ids: Vec<&str> = gallery.items().iter().map(|item| item.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "album_1718000000000_k3j9x0abc",
            "album_1717990000000_p0q8w2zzz",
            "album_1717970000000_m1n2b3v4c",
            "album_1717960000000_z9y8x7w6v",
        ]
    );

    let restored = gallery.load_state("album_1717960000000_z9y8x7w6v").unwrap();
    assert_eq!(restored.font_size, 400.0);
    assert_eq!(restored.text_color, "#ffffff");
    assert_eq!(restored.content, "von dutch");
}

#[test]
fn test_restored_meme_renders() {
    let snapshot: serde_json::Value = serde_json::from_str(&load_fixture("meme_state.json")).unwrap();
    let state = StyleState::merge_over_defaults(Tool::Meme, &snapshot);
    assert_eq!(state.text_elements.len(), 2);
    assert_eq!(state.stickers.len(), 2);
    assert_eq!(state.aesthetic.as_deref(), Some("rhinestones"));

    let fonts = offline_fonts();
    let mut surface = Canvas2dContext::with_resolved(500, 500, &fonts).unwrap();
    render(&mut surface, &state, &mut FastRandom::with_seed(9)).unwrap();
    // Background shows through in a corner the rhinestones rarely cover
    let corners = [(0, 0), (499, 0), (0, 499), (499, 499)];
    assert!(corners
        .iter()
        .any(|&(x, y)| pixel(&surface, x, y) == [0xff, 0x14, 0x93, 0xff]));
}
