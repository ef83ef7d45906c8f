//! dotsmith - Library for editing 16x16 pixel-art sprites
//!
//! This library provides functionality to:
//! - Model sprites, frames, categories and palettes as an immutable document
//! - Apply pixel edits (pencil, eraser, line, flood fill, eyedropper)
//! - Manage frame sequences and time their playback
//! - Persist the document and session, and export/import it as JSON
//! - Render frames to PNG, GIF and spritesheets

pub mod cli;
pub mod color;
pub mod config;
pub mod draw;
pub mod frames;
pub mod gif;
pub mod lookup;
pub mod models;
pub mod output;
pub mod palettes;
pub mod persist;
pub mod playback;
pub mod query;
pub mod renderer;
pub mod shapes;
pub mod spritesheet;
pub mod store;
pub mod telemetry;
pub mod terminal;
pub mod validate;

#[cfg(feature = "wasm")]
pub mod wasm;
