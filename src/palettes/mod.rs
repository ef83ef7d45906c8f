//! Built-in palettes and the starter category forest.
//!
//! The first palette returned by [`default_palettes`] is the system default:
//! it can never be deleted, and it is what selection falls back to when the
//! selected palette goes away.

use crate::models::{Category, Palette, PALETTE_SIZE};

/// Id of the protected system palette.
pub const DEFAULT_PALETTE_ID: &str = "palette_default";

/// Id of the Game Boy style starter palette.
pub const GAMEBOY_PALETTE_ID: &str = "palette_gameboy";

/// List of preset names usable as templates for new palettes.
const PRESET_NAMES: &[&str] = &["pico8", "grayscale"];

/// The palettes every new document starts with, system default first.
pub fn default_palettes() -> Vec<Palette> {
    vec![system_default(), gameboy()]
}

/// Whether a palette id is the protected system default.
pub fn is_protected(palette_id: &str) -> bool {
    palette_id == DEFAULT_PALETTE_ID
}

/// 16 primaries and secondaries; index 0 black (drawn transparent), index 1 white.
fn system_default() -> Palette {
    Palette {
        id: DEFAULT_PALETTE_ID.to_string(),
        name: "Default".to_string(),
        colors: [
            "rgba(0, 0, 0, 1)",
            "rgba(255, 255, 255, 1)",
            "rgba(255, 0, 0, 1)",
            "rgba(0, 255, 0, 1)",
            "rgba(0, 0, 255, 1)",
            "rgba(255, 255, 0, 1)",
            "rgba(255, 0, 255, 1)",
            "rgba(0, 255, 255, 1)",
            "rgba(128, 128, 128, 1)",
            "rgba(255, 128, 0, 1)",
            "rgba(128, 0, 255, 1)",
            "rgba(0, 128, 0, 1)",
            "rgba(128, 64, 0, 1)",
            "rgba(255, 128, 128, 1)",
            "rgba(128, 255, 128, 1)",
            "rgba(128, 128, 255, 1)",
        ]
        .map(String::from)
        .to_vec(),
    }
}

/// Game Boy 4-shade green palette, darkest first.
/// Reference: https://lospec.com/palette-list/nintendo-gameboy-bgb
fn gameboy() -> Palette {
    Palette {
        id: GAMEBOY_PALETTE_ID.to_string(),
        name: "Game Boy".to_string(),
        colors: [
            "rgba(15, 56, 15, 1)",
            "rgba(48, 98, 48, 1)",
            "rgba(139, 172, 15, 1)",
            "rgba(155, 188, 15, 1)",
        ]
        .map(String::from)
        .to_vec(),
    }
}

/// The starter category forest: five roots, each with a few children.
pub fn default_categories() -> Vec<Category> {
    const FOREST: &[(&str, &str, &[(&str, &str)])] = &[
        (
            "cat_character",
            "Characters",
            &[
                ("cat_player", "Player Characters"),
                ("cat_enemy", "Enemies"),
                ("cat_npc", "NPCs"),
            ],
        ),
        (
            "cat_item",
            "Items",
            &[
                ("cat_weapon", "Weapons"),
                ("cat_armor", "Armor"),
                ("cat_consumable", "Consumables"),
                ("cat_collectible", "Collectibles"),
            ],
        ),
        (
            "cat_environment",
            "Environment",
            &[
                ("cat_terrain", "Terrain Tiles"),
                ("cat_background", "Background Objects"),
                ("cat_interactive", "Interactive Objects"),
                ("cat_decoration", "Decorations"),
            ],
        ),
        (
            "cat_effect",
            "Effects",
            &[
                ("cat_attack", "Attack Effects"),
                ("cat_magic", "Magic Effects"),
                ("cat_env_effect", "Environment Effects"),
                ("cat_particle", "Particles"),
            ],
        ),
        (
            "cat_ui",
            "UI Elements",
            &[
                ("cat_icon", "Icons"),
                ("cat_button", "Buttons"),
                ("cat_window", "Window Parts"),
                ("cat_cursor", "Cursors"),
            ],
        ),
    ];

    // Roots first, then children in declaration order
    let mut categories: Vec<Category> =
        FOREST.iter().map(|(id, name, _)| Category::builtin(id, name, None)).collect();
    for (parent, _, children) in FOREST {
        for (id, name) in children.iter() {
            categories.push(Category::builtin(id, name, Some(*parent)));
        }
    }
    categories
}

/// Returns a list of all available preset names.
pub fn list_presets() -> Vec<&'static str> {
    PRESET_NAMES.to_vec()
}

/// Colors of a named preset, or None if not found. Every preset has 16 colors.
pub fn preset_colors(name: &str) -> Option<Vec<String>> {
    match name {
        "pico8" => Some(pico8()),
        "grayscale" => Some(grayscale()),
        _ => None,
    }
}

/// PICO-8 16-color palette.
/// Reference: https://lospec.com/palette-list/pico-8
fn pico8() -> Vec<String> {
    [
        "#000000", "#1D2B53", "#7E2553", "#008751", "#AB5236", "#5F574F", "#C2C3C7", "#FFF1E8",
        "#FF004D", "#FFA300", "#FFEC27", "#00E436", "#29ADFF", "#83769C", "#FF77A8", "#FFCCAA",
    ]
    .map(String::from)
    .to_vec()
}

/// 16 evenly spaced shades from black to white.
fn grayscale() -> Vec<String> {
    (0..PALETTE_SIZE)
        .map(|i| {
            let v = i * 17;
            format!("rgba({}, {}, {}, 1)", v, v, v)
        })
        .collect()
}
