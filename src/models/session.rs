//! Selection and editor session state.

use serde::{Deserialize, Serialize};

use super::grid::ColorIndex;
use crate::palettes::DEFAULT_PALETTE_ID;

/// Editing tool applied by pointer gestures on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[derive(clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    Pencil,
    Eraser,
    Fill,
    Eyedropper,
}

impl std::fmt::Display for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tool::Pencil => write!(f, "pencil"),
            Tool::Eraser => write!(f, "eraser"),
            Tool::Fill => write!(f, "fill"),
            Tool::Eyedropper => write!(f, "eyedropper"),
        }
    }
}

/// Ephemeral editor state, persisted next to the document.
///
/// Every field falls back to its default when missing from a stored snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Session {
    pub selected_category_id: Option<String>,
    pub selected_sprite_id: Option<String>,
    pub selected_frame_index: usize,
    pub selected_color: ColorIndex,
    pub selected_palette_id: String,
    pub current_tool: Tool,
    pub is_playing: bool,
    pub playback_speed: f64,
}

impl Default for Session {
    fn default() -> Self {
        Session {
            selected_category_id: None,
            selected_sprite_id: None,
            selected_frame_index: 0,
            // White in the default palette
            selected_color: 1,
            selected_palette_id: DEFAULT_PALETTE_ID.to_string(),
            current_tool: Tool::Pencil,
            is_playing: false,
            playback_speed: 1.0,
        }
    }
}
