//! Draw command implementation
//!
//! Explicit operations (`--pixel`, `--erase`, `--line`, `--fill`) are applied
//! in that order, then a `--path` pointer stroke, then `--pick`. Every
//! operation becomes one store action, so a failing one leaves the frame as
//! the previous operations left it.

use std::process::ExitCode;

use crate::draw::{cell_at, resolve, Edit, Stroke};
use crate::lookup::find_sprite;
use crate::models::{ColorIndex, Document, Grid, Tool, PALETTE_SIZE, TRANSPARENT};
use crate::store::{reduce, Action};
use crate::terminal::render_coordinate_grid;

use super::{
    lookup_failed, parse_point, parse_screen_point, parse_segment, Workspace, EXIT_ERROR,
    EXIT_INVALID_ARGS, EXIT_SUCCESS,
};

/// Pixel operations requested on the command line.
#[derive(Debug, Default)]
pub(crate) struct DrawOps {
    pub pixel: Vec<String>,
    pub erase: Vec<String>,
    pub line: Vec<String>,
    pub fill: Vec<String>,
    pub pick: Option<String>,
    pub tool: Option<Tool>,
    pub path: Vec<String>,
}

impl DrawOps {
    fn is_empty(&self) -> bool {
        self.pixel.is_empty()
            && self.erase.is_empty()
            && self.line.is_empty()
            && self.fill.is_empty()
            && self.pick.is_none()
            && self.path.is_empty()
    }
}

/// Execute the draw command.
pub(crate) fn run_draw(
    ws: &mut Workspace,
    sprite: &str,
    frame: Option<usize>,
    color: Option<u8>,
    ops: DrawOps,
    dry_run: bool,
) -> ExitCode {
    let (sprite_id, frame_count) = match find_sprite(ws.store.document(), sprite) {
        Ok(s) => (s.id.clone(), s.frame_count()),
        Err(e) => return lookup_failed(e),
    };

    let session = ws.store.session();
    let frame_index = frame.unwrap_or_else(|| {
        if session.selected_sprite_id.as_deref() == Some(sprite_id.as_str()) {
            session.selected_frame_index
        } else {
            0
        }
    });
    if frame_index >= frame_count {
        eprintln!("Error: frame {} out of range (sprite has {} frames)", frame_index, frame_count);
        return ExitCode::from(EXIT_ERROR);
    }

    let color = color.unwrap_or(session.selected_color);
    if usize::from(color) >= PALETTE_SIZE {
        eprintln!("Error: color index {} is outside 0..{}", color, PALETTE_SIZE);
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    if ops.is_empty() {
        eprintln!("Error: nothing to draw. Use --pixel, --erase, --line, --fill, --pick or --path");
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let tool = ops.tool.unwrap_or(session.current_tool);
    let cell_scale = f64::from(ws.config.editor.cell_scale);
    let edits = match collect_edits(&ops, color, tool, cell_scale) {
        Ok(edits) => edits,
        Err(message) => {
            eprintln!("Error: {}", message);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let actions = edits.into_iter().map(|edit| Action::ApplyEdit {
        sprite_id: sprite_id.clone(),
        frame_index,
        edit,
    });

    let before_color = ws.store.session().selected_color;
    let (grid, picked) = if dry_run {
        let mut state = ws.store.state().clone();
        for action in actions {
            state = reduce(&state, action, 0);
        }
        (frame_grid(&state.document, &sprite_id, frame_index), state.session.selected_color)
    } else {
        let mut changed = 0;
        for action in actions {
            if ws.store.dispatch(action) {
                changed += 1;
            }
        }
        tracing::debug!(sprite = %sprite_id, frame = frame_index, changed, "draw applied");
        (frame_grid(ws.store.document(), &sprite_id, frame_index), ws.store.session().selected_color)
    };

    if dry_run {
        println!("Dry run, nothing written.");
    }
    if picked != before_color {
        println!("Selected color: {}", picked);
    } else if ops.pick.is_some() {
        println!("Picked color is not in the selected palette; selection unchanged.");
    }
    if let Some(grid) = grid {
        print!("{}", render_coordinate_grid(&grid));
    }
    ExitCode::from(EXIT_SUCCESS)
}

fn frame_grid(document: &Document, sprite_id: &str, index: usize) -> Option<Grid> {
    document.sprite(sprite_id).and_then(|s| s.frame(index)).map(|f| f.grid.clone())
}

fn cell_point(arg: &str, flag: &str) -> Result<(i32, i32), String> {
    let (x, y) = parse_point(arg).ok_or_else(|| format!("{} expects X,Y, got '{}'", flag, arg))?;
    if !Grid::contains(x, y) {
        return Err(format!("{} ({}, {}) is outside the 16x16 grid", flag, x, y));
    }
    Ok((x, y))
}

/// Translate the command-line operations into edits, in application order.
fn collect_edits(ops: &DrawOps, color: ColorIndex, tool: Tool, cell_scale: f64) -> Result<Vec<Edit>, String> {
    let mut edits = Vec::new();

    for arg in &ops.pixel {
        let (x, y) = cell_point(arg, "--pixel")?;
        edits.push(Edit::Pixel { x, y, color });
    }
    for arg in &ops.erase {
        let (x, y) = cell_point(arg, "--erase")?;
        edits.push(Edit::Pixel { x, y, color: TRANSPARENT });
    }
    for arg in &ops.line {
        // Lines may run off the grid; only the visible part is drawn
        let (from, to) =
            parse_segment(arg).ok_or_else(|| format!("--line expects X0,Y0,X1,Y1, got '{}'", arg))?;
        edits.push(Edit::Line { from, to, color });
    }
    for arg in &ops.fill {
        let (x, y) = cell_point(arg, "--fill")?;
        edits.push(Edit::Fill { x, y, color });
    }

    let mut stroke = Stroke::new();
    for (i, arg) in ops.path.iter().enumerate() {
        let (px, py) =
            parse_screen_point(arg).ok_or_else(|| format!("--path expects PX,PY, got '{}'", arg))?;
        let cell = cell_at(px, py, cell_scale);
        let gesture = if i == 0 { stroke.press(cell) } else { stroke.moved(cell) };
        if cell.is_none() {
            // Leaving the grid ends the stroke
            stroke.release();
        }
        edits.extend(gesture.and_then(|g| resolve(tool, g, color)));
    }
    stroke.release();

    if let Some(arg) = &ops.pick {
        let (x, y) = cell_point(arg, "--pick")?;
        edits.push(Edit::Pick { x, y });
    }

    Ok(edits)
}
