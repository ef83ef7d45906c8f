//! Palette type.

use serde::{Deserialize, Serialize};

use super::grid::ColorIndex;
use super::new_id;

/// Number of colors a user-created palette holds.
pub const PALETTE_SIZE: usize = 16;

/// A named, ordered list of CSS color strings.
///
/// Position in `colors` is the color index stored in grid cells. Index 0 is
/// drawn as transparent regardless of its color.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub id: String,
    pub name: String,
    pub colors: Vec<String>,
}

impl Palette {
    /// A new palette under a fresh id.
    pub fn new(name: impl Into<String>, colors: Vec<String>) -> Self {
        Palette { id: new_id(), name: name.into(), colors }
    }

    /// Color string for `index`, if the palette has one.
    pub fn color(&self, index: ColorIndex) -> Option<&str> {
        self.colors.get(usize::from(index)).map(|c| c.as_str())
    }

    /// Whether `index` addresses a color in this palette.
    pub fn has_index(&self, index: ColorIndex) -> bool {
        usize::from(index) < self.colors.len()
    }
}
