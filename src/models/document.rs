//! The document aggregate: everything that is exported, imported and persisted.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::category::Category;
use super::palette::Palette;
use super::sprite::Sprite;
use crate::palettes::{default_categories, default_palettes};

/// All sprites, categories and palettes.
///
/// Sprites are held behind `Arc` so that an updated document shares every
/// sprite it did not touch with its predecessor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub sprites: Vec<Arc<Sprite>>,
    pub categories: Vec<Category>,
    pub palettes: Vec<Palette>,
}

impl Document {
    /// A document with no sprites, categories or palettes.
    pub fn empty() -> Self {
        Document { sprites: Vec::new(), categories: Vec::new(), palettes: Vec::new() }
    }

    /// Sprite with the given id.
    pub fn sprite(&self, id: &str) -> Option<&Sprite> {
        self.sprites.iter().find(|s| s.id == id).map(|s| s.as_ref())
    }

    /// Shared handle to the sprite with the given id.
    pub fn sprite_arc(&self, id: &str) -> Option<&Arc<Sprite>> {
        self.sprites.iter().find(|s| s.id == id)
    }

    /// Category with the given id.
    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Palette with the given id.
    pub fn palette(&self, id: &str) -> Option<&Palette> {
        self.palettes.iter().find(|p| p.id == id)
    }
}

/// The starter document: built-in categories and palettes, no sprites.
impl Default for Document {
    fn default() -> Self {
        Document {
            sprites: Vec::new(),
            categories: default_categories(),
            palettes: default_palettes(),
        }
    }
}
