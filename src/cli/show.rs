//! Show command implementation (terminal display)

use std::process::ExitCode;

use crate::lookup::{find_palette, find_sprite};
use crate::terminal::{render_ansi_grid, render_coordinate_grid};

use super::{lookup_failed, Workspace, EXIT_ERROR, EXIT_SUCCESS};

/// Execute the show command - display one frame with colored terminal output
pub fn run_show(
    ws: &Workspace,
    sprite: &str,
    frame: Option<usize>,
    palette: Option<&str>,
    plain: bool,
) -> ExitCode {
    let document = ws.store.document();
    let sprite = match find_sprite(document, sprite) {
        Ok(s) => s,
        Err(e) => return lookup_failed(e),
    };

    let session = ws.store.session();
    let index = frame.unwrap_or(if session.selected_sprite_id.as_deref() == Some(sprite.id.as_str()) {
        session.selected_frame_index
    } else {
        0
    });
    let Some(current) = sprite.frame(index) else {
        eprintln!("Error: frame {} out of range (sprite has {} frames)", index, sprite.frame_count());
        return ExitCode::from(EXIT_ERROR);
    };

    println!(
        "{}  frame {}/{}  {}ms",
        sprite.name,
        index + 1,
        sprite.frame_count(),
        current.duration
    );

    if plain {
        print!("{}", render_coordinate_grid(&current.grid));
        return ExitCode::from(EXIT_SUCCESS);
    }

    let palette = match palette {
        Some(reference) => match find_palette(document, reference) {
            Ok(p) => p,
            Err(e) => return lookup_failed(e),
        },
        None => match ws.store.state().selected_palette() {
            Some(p) => p,
            None => {
                eprintln!("Error: the selected palette no longer exists");
                return ExitCode::from(EXIT_ERROR);
            }
        },
    };

    let (grid, legend) = render_ansi_grid(&current.grid, palette);
    print!("{}", grid);
    print!("{}", legend);
    ExitCode::from(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::test_support::workspace;

    #[test]
    fn test_show_selected_sprite() {
        let (_temp, mut ws) = workspace();
        ws.store.create_sprite("hero", "cat_player");
        assert_eq!(run_show(&ws, "hero", None, None, false), ExitCode::from(EXIT_SUCCESS));
        assert_eq!(run_show(&ws, "hero", None, Some("Game Boy"), false), ExitCode::from(EXIT_SUCCESS));
        assert_eq!(run_show(&ws, "hero", Some(0), None, true), ExitCode::from(EXIT_SUCCESS));
    }

    #[test]
    fn test_show_errors() {
        let (_temp, mut ws) = workspace();
        ws.store.create_sprite("hero", "cat_player");
        assert_eq!(run_show(&ws, "hero", Some(2), None, false), ExitCode::from(EXIT_ERROR));
        assert_eq!(run_show(&ws, "villain", None, None, false), ExitCode::from(EXIT_ERROR));
        assert_eq!(run_show(&ws, "hero", None, Some("Neon"), false), ExitCode::from(EXIT_ERROR));
    }
}
