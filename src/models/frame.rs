//! Animation frame type.

use serde::{Deserialize, Serialize};

use super::grid::Grid;
use super::new_id;

/// Display time used when a frame carries no explicit duration.
pub const DEFAULT_FRAME_DURATION_MS: u32 = 100;

fn default_duration() -> u32 {
    DEFAULT_FRAME_DURATION_MS
}

/// One frame of a sprite: a grid plus how long it is shown during playback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub id: String,
    pub grid: Grid,
    /// Display time in milliseconds (missing in older exports, defaults to 100)
    #[serde(default = "default_duration")]
    pub duration: u32,
}

impl Frame {
    /// A fresh all-transparent frame with the default duration.
    pub fn new() -> Self {
        Self::with_duration(DEFAULT_FRAME_DURATION_MS)
    }

    /// A fresh all-transparent frame shown for `duration` milliseconds.
    pub fn with_duration(duration: u32) -> Self {
        Frame { id: new_id(), grid: Grid::new(), duration }
    }

    /// A copy of this frame under a new identity.
    pub fn duplicate(&self) -> Self {
        Frame { id: new_id(), grid: self.grid.clone(), duration: self.duration }
    }

    /// Whether two frames hold the same pixels and timing, ignoring identity.
    pub fn same_content(&self, other: &Frame) -> bool {
        self.grid == other.grid && self.duration == other.duration
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}
