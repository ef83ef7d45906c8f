//! Palette command implementation

use clap::Subcommand;
use std::process::ExitCode;

use crate::lookup::find_palette;
use crate::models::Palette;
use crate::palettes::{is_protected, list_presets, preset_colors};
use crate::store::Action;
use crate::validate::{validate_name, validate_palette_colors};

use super::{lookup_failed, Workspace, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

#[derive(Subcommand)]
pub enum PaletteAction {
    /// List palettes
    List,
    /// Print the colors of a palette
    Show {
        /// Palette id or name (default: the selected palette)
        palette: Option<String>,
    },
    /// Create a palette from a preset or 16 explicit colors and select it
    New {
        /// Palette name
        name: String,

        /// Start from a built-in preset (see `dots palette presets`)
        #[arg(long, conflicts_with = "colors")]
        preset: Option<String>,

        /// Colors, comma separated or repeated (hex, rgb(), hsl() or named)
        #[arg(long, value_delimiter = ',')]
        colors: Vec<String>,
    },
    /// Delete a palette. The default palette cannot be deleted.
    Delete {
        /// Palette id or name
        palette: String,
    },
    /// Make a palette the selected palette
    Select {
        /// Palette id or name
        palette: String,
    },
    /// List built-in presets for `palette new --preset`
    Presets,
}

/// Execute a palette subcommand
pub fn run_palette(ws: &mut Workspace, action: PaletteAction) -> ExitCode {
    match action {
        PaletteAction::List => {
            let selected = ws.store.session().selected_palette_id.as_str();
            for palette in &ws.store.document().palettes {
                let marker = if palette.id == selected { "*" } else { " " };
                let lock = if is_protected(&palette.id) { " (default)" } else { "" };
                println!(
                    "{} {}  {:<20} {} color(s){}",
                    marker,
                    palette.id,
                    palette.name,
                    palette.colors.len(),
                    lock
                );
            }
            ExitCode::from(EXIT_SUCCESS)
        }
        PaletteAction::Show { palette } => {
            let palette = match resolve(ws, palette.as_deref()) {
                Ok(p) => p,
                Err(code) => return code,
            };
            println!("{} ({})", palette.name, palette.id);
            for (index, color) in palette.colors.iter().enumerate() {
                println!("  {:>2}  {}", index, color);
            }
            ExitCode::from(EXIT_SUCCESS)
        }
        PaletteAction::New { name, preset, colors } => run_new(ws, &name, preset.as_deref(), colors),
        PaletteAction::Delete { palette } => {
            let target = match find_palette(ws.store.document(), &palette) {
                Ok(p) => p.clone(),
                Err(e) => return lookup_failed(e),
            };
            if is_protected(&target.id) {
                eprintln!("Error: '{}' is the default palette and cannot be deleted", target.name);
                return ExitCode::from(EXIT_INVALID_ARGS);
            }
            ws.store.dispatch(Action::DeletePalette(target.id));
            println!("Deleted palette '{}'", target.name);
            ExitCode::from(EXIT_SUCCESS)
        }
        PaletteAction::Select { palette } => {
            let id = match find_palette(ws.store.document(), &palette) {
                Ok(p) => p.id.clone(),
                Err(e) => return lookup_failed(e),
            };
            ws.store.dispatch(Action::SetSelectedPalette(id));
            ExitCode::from(EXIT_SUCCESS)
        }
        PaletteAction::Presets => {
            for name in list_presets() {
                println!("{}", name);
            }
            ExitCode::from(EXIT_SUCCESS)
        }
    }
}

fn run_new(ws: &mut Workspace, name: &str, preset: Option<&str>, colors: Vec<String>) -> ExitCode {
    let name = match validate_name("palette", name) {
        Ok(name) => name,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let colors = match preset {
        Some(preset) => match preset_colors(preset) {
            Some(colors) => colors,
            None => {
                eprintln!(
                    "Error: unknown preset '{}'. Available: {}",
                    preset,
                    list_presets().join(", ")
                );
                return ExitCode::from(EXIT_INVALID_ARGS);
            }
        },
        None => colors.into_iter().map(|c| c.trim().to_string()).collect(),
    };

    if let Err(e) = validate_palette_colors(&colors) {
        eprintln!("Error: {}", e);
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let id = ws.store.create_palette(&name, colors);
    ws.store.dispatch(Action::SetSelectedPalette(id.clone()));
    println!("{}", id);
    ExitCode::from(EXIT_SUCCESS)
}

/// The named palette, or the selected one.
fn resolve(ws: &Workspace, reference: Option<&str>) -> Result<Palette, ExitCode> {
    match reference {
        Some(reference) => {
            find_palette(ws.store.document(), reference).cloned().map_err(lookup_failed)
        }
        None => ws.store.state().selected_palette().cloned().ok_or_else(|| {
            eprintln!("Error: the selected palette no longer exists");
            ExitCode::from(EXIT_ERROR)
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::test_support::workspace;
    use crate::palettes::{DEFAULT_PALETTE_ID, GAMEBOY_PALETTE_ID};

    #[test]
    fn test_new_from_preset_selects_it() {
        let (_temp, mut ws) = workspace();
        let code = run_new(&mut ws, "Fantasy", Some("pico8"), Vec::new());
        assert_eq!(code, ExitCode::from(EXIT_SUCCESS));

        let selected = ws.store.state().selected_palette().unwrap();
        assert_eq!(selected.name, "Fantasy");
        assert_eq!(selected.colors.len(), 16);
    }

    #[test]
    fn test_new_rejects_short_palette() {
        let (_temp, mut ws) = workspace();
        let colors = vec!["#000".to_string(), "#fff".to_string()];
        assert_eq!(run_new(&mut ws, "Tiny", None, colors), ExitCode::from(EXIT_INVALID_ARGS));
        assert_eq!(run_new(&mut ws, "Odd", Some("nope"), Vec::new()), ExitCode::from(EXIT_INVALID_ARGS));
        assert_eq!(ws.store.document().palettes.len(), 2);
    }

    #[test]
    fn test_default_palette_is_protected() {
        let (_temp, mut ws) = workspace();
        let code = run_palette(&mut ws, PaletteAction::Delete { palette: "Default".into() });
        assert_eq!(code, ExitCode::from(EXIT_INVALID_ARGS));
        assert!(ws.store.document().palette(DEFAULT_PALETTE_ID).is_some());
    }

    #[test]
    fn test_delete_selected_falls_back_to_default() {
        let (_temp, mut ws) = workspace();
        run_palette(&mut ws, PaletteAction::Select { palette: "Game Boy".into() });
        assert_eq!(ws.store.session().selected_palette_id, GAMEBOY_PALETTE_ID);

        let code = run_palette(&mut ws, PaletteAction::Delete { palette: GAMEBOY_PALETTE_ID.into() });
        assert_eq!(code, ExitCode::from(EXIT_SUCCESS));
        assert_eq!(ws.store.session().selected_palette_id, DEFAULT_PALETTE_ID);
    }
}
