//! Data models for Dotsmith documents (grids, frames, sprites, palettes, categories)

mod category;
mod document;
mod frame;
mod grid;
mod palette;
mod session;
mod sprite;

// Re-export all public types
pub use category::Category;
pub use document::Document;
pub use frame::{Frame, DEFAULT_FRAME_DURATION_MS};
pub use grid::{ColorIndex, Grid, GridError, Row, GRID_SIZE, TRANSPARENT};
pub use palette::{Palette, PALETTE_SIZE};
pub use session::{Session, Tool};
pub use sprite::Sprite;

/// Generate a fresh opaque identifier for a new entity.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
