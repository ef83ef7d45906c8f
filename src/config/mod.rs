//! Configuration for the dotsmith editor
//!
//! Provides types and loading for `dotsmith.toml`.

pub mod loader;
pub mod schema;

pub use loader::*;
pub use schema::*;
