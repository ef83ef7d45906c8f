//! Sprite type.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::frame::Frame;
use super::new_id;

/// A named, categorized sequence of animation frames.
///
/// `frames` is never empty: sprites are created with one frame and the frame
/// store refuses to delete the last one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sprite {
    pub id: String,
    pub name: String,
    pub category_id: String,
    pub frames: Vec<Arc<Frame>>,
    /// Creation time, milliseconds since the Unix epoch
    pub created_at: u64,
    /// Last mutation of the sprite or any of its frames
    pub updated_at: u64,
}

impl Sprite {
    /// A new sprite with a single blank frame.
    pub fn new(name: impl Into<String>, category_id: impl Into<String>, now: u64) -> Self {
        Self::with_frame(name, category_id, Frame::new(), now)
    }

    /// A new sprite whose single frame is `frame`.
    pub fn with_frame(
        name: impl Into<String>,
        category_id: impl Into<String>,
        frame: Frame,
        now: u64,
    ) -> Self {
        Sprite {
            id: new_id(),
            name: name.into(),
            category_id: category_id.into(),
            frames: vec![Arc::new(frame)],
            created_at: now,
            updated_at: now,
        }
    }

    /// Frame at `index`.
    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index).map(|f| f.as_ref())
    }

    /// Number of frames.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Durations of all frames in order, in milliseconds.
    pub fn durations(&self) -> Vec<u32> {
        self.frames.iter().map(|f| f.duration).collect()
    }

    /// Total duration of one pass through the animation at speed 1.
    pub fn total_duration(&self) -> u64 {
        self.frames.iter().map(|f| u64::from(f.duration)).sum()
    }
}
