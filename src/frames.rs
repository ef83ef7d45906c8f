//! Frame store: operations over a sprite's ordered frame list.
//!
//! Each operation takes the current sprite and returns an updated copy with
//! `updated_at` set to `now`. Untouched frames stay shared with the input.
//! Rejected operations return a [`FrameError`]; the store turns those into
//! silent no-ops, while callers that want to explain a refusal can check
//! first with [`can_delete_frame`] or [`can_move_frame`].

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::models::{Frame, Grid, Sprite, DEFAULT_FRAME_DURATION_MS};

/// Why a frame operation was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("frame index {index} out of range (sprite has {count} frames)")]
    IndexOutOfRange { index: usize, count: usize },
    #[error("cannot delete the only frame of a sprite")]
    LastFrame,
    #[error("frame {index} cannot move {direction} any further")]
    AtBoundary { index: usize, direction: Direction },
    #[error("frame duration must be positive")]
    ZeroDuration,
}

/// Direction to move a frame within the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[derive(clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Left => write!(f, "left"),
            Direction::Right => write!(f, "right"),
        }
    }
}

fn check_index(sprite: &Sprite, index: usize) -> Result<(), FrameError> {
    if index < sprite.frames.len() {
        Ok(())
    } else {
        Err(FrameError::IndexOutOfRange { index, count: sprite.frames.len() })
    }
}

fn touched(sprite: &Sprite, frames: Vec<Arc<Frame>>, now: u64) -> Sprite {
    Sprite { frames, updated_at: now, ..sprite.clone() }
}

/// Append a blank frame with the default duration. The new frame is last.
pub fn add_frame(sprite: &Sprite, now: u64) -> Sprite {
    add_frame_with_duration(sprite, DEFAULT_FRAME_DURATION_MS, now)
}

/// Append a blank frame shown for `duration` milliseconds.
pub fn add_frame_with_duration(sprite: &Sprite, duration: u32, now: u64) -> Sprite {
    let mut frames = sprite.frames.clone();
    frames.push(Arc::new(Frame::with_duration(duration)));
    touched(sprite, frames, now)
}

/// Append a copy of frame `index` under a new id. The copy is last.
pub fn duplicate_frame(sprite: &Sprite, index: usize, now: u64) -> Result<Sprite, FrameError> {
    check_index(sprite, index)?;
    let mut frames = sprite.frames.clone();
    frames.push(Arc::new(sprite.frames[index].duplicate()));
    Ok(touched(sprite, frames, now))
}

/// Whether frame `index` may be deleted.
pub fn can_delete_frame(sprite: &Sprite, index: usize) -> Result<(), FrameError> {
    check_index(sprite, index)?;
    if sprite.frames.len() <= 1 {
        return Err(FrameError::LastFrame);
    }
    Ok(())
}

/// Remove frame `index`. A sprite always keeps at least one frame.
pub fn delete_frame(sprite: &Sprite, index: usize, now: u64) -> Result<Sprite, FrameError> {
    can_delete_frame(sprite, index)?;
    let mut frames = sprite.frames.clone();
    frames.remove(index);
    Ok(touched(sprite, frames, now))
}

/// Index of the neighbour frame `index` would swap with.
pub fn can_move_frame(sprite: &Sprite, index: usize, direction: Direction) -> Result<usize, FrameError> {
    check_index(sprite, index)?;
    let target = match direction {
        Direction::Left => index.checked_sub(1),
        Direction::Right => Some(index + 1).filter(|&i| i < sprite.frames.len()),
    };
    target.ok_or(FrameError::AtBoundary { index, direction })
}

/// Swap frame `index` with its neighbour. Returns the sprite and the frame's new index.
pub fn move_frame(
    sprite: &Sprite,
    index: usize,
    direction: Direction,
    now: u64,
) -> Result<(Sprite, usize), FrameError> {
    let target = can_move_frame(sprite, index, direction)?;
    let mut frames = sprite.frames.clone();
    frames.swap(index, target);
    Ok((touched(sprite, frames, now), target))
}

/// Replace the display time of frame `index`.
///
/// Any positive duration is accepted here; range limits belong to the caller.
pub fn set_frame_duration(
    sprite: &Sprite,
    index: usize,
    duration: u32,
    now: u64,
) -> Result<Sprite, FrameError> {
    check_index(sprite, index)?;
    if duration == 0 {
        return Err(FrameError::ZeroDuration);
    }
    let mut frames = sprite.frames.clone();
    let frame = Frame { duration, ..sprite.frames[index].as_ref().clone() };
    frames[index] = Arc::new(frame);
    Ok(touched(sprite, frames, now))
}

/// Replace the grid of frame `index`.
pub fn update_frame(sprite: &Sprite, index: usize, grid: Grid, now: u64) -> Result<Sprite, FrameError> {
    check_index(sprite, index)?;
    let mut frames = sprite.frames.clone();
    let frame = Frame { grid, ..sprite.frames[index].as_ref().clone() };
    frames[index] = Arc::new(frame);
    Ok(touched(sprite, frames, now))
}

/// Selected frame index after frame `removed` was deleted.
///
/// A selection at or after the removed frame moves back by one, stopping at 0.
pub fn selection_after_delete(selected: usize, removed: usize) -> usize {
    if selected >= removed {
        selected.saturating_sub(1)
    } else {
        selected
    }
}

/// Selected frame index after frames `from` and `to` were swapped.
pub fn selection_after_move(selected: usize, from: usize, to: usize) -> usize {
    if selected == from {
        to
    } else if selected == to {
        from
    } else {
        selected
    }
}
