//! Frame command implementation

use clap::Subcommand;
use std::process::ExitCode;

use crate::frames::{can_delete_frame, can_move_frame, Direction, FrameError};
use crate::lookup::find_sprite;
use crate::models::Sprite;
use crate::store::Action;

use super::{lookup_failed, Workspace, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

#[derive(Subcommand)]
pub enum FrameAction {
    /// List the frames of a sprite with their durations
    List {
        /// Sprite id or name
        sprite: String,
    },
    /// Append a blank frame
    Add {
        /// Sprite id or name
        sprite: String,

        /// Display time in milliseconds (default: [editor] default_frame_duration)
        #[arg(short, long)]
        duration: Option<u32>,
    },
    /// Append a copy of a frame
    Duplicate {
        /// Sprite id or name
        sprite: String,
        /// Frame index
        index: usize,
    },
    /// Delete a frame. The last remaining frame cannot be deleted.
    Delete {
        /// Sprite id or name
        sprite: String,
        /// Frame index
        index: usize,
    },
    /// Swap a frame with its neighbour
    Move {
        /// Sprite id or name
        sprite: String,
        /// Frame index
        index: usize,
        /// Which neighbour to swap with
        #[arg(value_enum)]
        direction: Direction,
    },
    /// Set how long a frame is shown
    Duration {
        /// Sprite id or name
        sprite: String,
        /// Frame index
        index: usize,
        /// Milliseconds, within [editor] min/max_frame_duration
        ms: u32,

        /// Snap out-of-range values to the nearest allowed duration instead of failing
        #[arg(long)]
        clamp: bool,
    },
    /// Make a frame the selected frame (selects the sprite too)
    Select {
        /// Sprite id or name
        sprite: String,
        /// Frame index
        index: usize,
    },
}

/// Execute a frame subcommand
pub fn run_frame(ws: &mut Workspace, action: FrameAction) -> ExitCode {
    match action {
        FrameAction::List { sprite } => {
            let sprite = match find_sprite(ws.store.document(), &sprite) {
                Ok(s) => s,
                Err(e) => return lookup_failed(e),
            };
            let session = ws.store.session();
            let selected = (session.selected_sprite_id.as_deref() == Some(sprite.id.as_str()))
                .then_some(session.selected_frame_index);
            for (index, frame) in sprite.frames.iter().enumerate() {
                let marker = if Some(index) == selected { "*" } else { " " };
                println!(
                    "{} {:>3}  {:>5}ms  {:>3} painted",
                    marker,
                    index,
                    frame.duration,
                    frame.grid.painted_cells()
                );
            }
            println!("total {}ms", sprite.total_duration());
            ExitCode::from(EXIT_SUCCESS)
        }
        FrameAction::Add { sprite, duration } => {
            let sprite = match resolve(ws, &sprite) {
                Ok(s) => s,
                Err(code) => return code,
            };
            let duration = match duration {
                Some(ms) => match ws.config.editor.duration_range().check(ms) {
                    Ok(ms) => ms,
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        return ExitCode::from(EXIT_INVALID_ARGS);
                    }
                },
                None => ws.config.editor.default_frame_duration,
            };
            ws.store.dispatch(Action::AddFrame { sprite_id: sprite.id, duration: Some(duration) });
            println!("{}", sprite.frames.len());
            ExitCode::from(EXIT_SUCCESS)
        }
        FrameAction::Duplicate { sprite, index } => {
            let sprite = match resolve_frame(ws, &sprite, index) {
                Ok(s) => s,
                Err(code) => return code,
            };
            ws.store.dispatch(Action::DuplicateFrame { sprite_id: sprite.id, frame_index: index });
            println!("{}", sprite.frames.len());
            ExitCode::from(EXIT_SUCCESS)
        }
        FrameAction::Delete { sprite, index } => {
            let sprite = match resolve(ws, &sprite) {
                Ok(s) => s,
                Err(code) => return code,
            };
            if let Err(e) = can_delete_frame(&sprite, index) {
                return refused(e);
            }
            ws.store.dispatch(Action::DeleteFrame { sprite_id: sprite.id, frame_index: index });
            ExitCode::from(EXIT_SUCCESS)
        }
        FrameAction::Move { sprite, index, direction } => {
            let sprite = match resolve(ws, &sprite) {
                Ok(s) => s,
                Err(code) => return code,
            };
            let target = match can_move_frame(&sprite, index, direction) {
                Ok(target) => target,
                Err(e) => return refused(e),
            };
            ws.store.dispatch(Action::MoveFrame { sprite_id: sprite.id, frame_index: index, direction });
            println!("{}", target);
            ExitCode::from(EXIT_SUCCESS)
        }
        FrameAction::Duration { sprite, index, ms, clamp } => {
            let sprite = match resolve_frame(ws, &sprite, index) {
                Ok(s) => s,
                Err(code) => return code,
            };
            let range = ws.config.editor.duration_range();
            let duration = if clamp {
                range.clamp(ms)
            } else {
                match range.check(ms) {
                    Ok(ms) => ms,
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        return ExitCode::from(EXIT_INVALID_ARGS);
                    }
                }
            };
            ws.store.dispatch(Action::SetFrameDuration {
                sprite_id: sprite.id,
                frame_index: index,
                duration,
            });
            println!("{}ms", duration);
            ExitCode::from(EXIT_SUCCESS)
        }
        FrameAction::Select { sprite, index } => {
            let sprite = match resolve_frame(ws, &sprite, index) {
                Ok(s) => s,
                Err(code) => return code,
            };
            if ws.store.session().selected_sprite_id.as_deref() != Some(sprite.id.as_str()) {
                ws.store.dispatch(Action::SetSelectedSprite(Some(sprite.id)));
            }
            ws.store.dispatch(Action::SetSelectedFrameIndex(index));
            ExitCode::from(EXIT_SUCCESS)
        }
    }
}

fn resolve(ws: &Workspace, reference: &str) -> Result<Sprite, ExitCode> {
    find_sprite(ws.store.document(), reference).cloned().map_err(lookup_failed)
}

/// The sprite, provided it has a frame at `index`.
fn resolve_frame(ws: &Workspace, reference: &str, index: usize) -> Result<Sprite, ExitCode> {
    let sprite = resolve(ws, reference)?;
    if index >= sprite.frame_count() {
        return Err(refused(FrameError::IndexOutOfRange { index, count: sprite.frame_count() }));
    }
    Ok(sprite)
}

fn refused(error: FrameError) -> ExitCode {
    eprintln!("Error: {}", error);
    match error {
        FrameError::IndexOutOfRange { .. } => ExitCode::from(EXIT_ERROR),
        _ => ExitCode::from(EXIT_INVALID_ARGS),
    }
}
