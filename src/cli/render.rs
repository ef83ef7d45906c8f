//! Render command implementation

use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::gif::{frame_delays, render_gif};
use crate::lookup::{find_palette, find_sprite};
use crate::output::{output_path, save_png, scale_image};
use crate::renderer::{render_sprite, Warning};
use crate::spritesheet::render_spritesheet;
use crate::validate::validate_speed;

use super::{lookup_failed, Workspace, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Execute the render command
#[allow(clippy::too_many_arguments)]
pub fn run_render(
    ws: &Workspace,
    sprite: &str,
    output: Option<&Path>,
    palette: Option<&str>,
    frame: Option<usize>,
    scale: u32,
    gif: bool,
    speed: Option<f64>,
    spritesheet: bool,
    cols: Option<u32>,
    spacing: u32,
    strict: bool,
) -> ExitCode {
    if gif && spritesheet {
        eprintln!("Error: --gif and --spritesheet cannot be combined");
        return ExitCode::from(EXIT_INVALID_ARGS);
    }
    if frame.is_some() && (gif || spritesheet) {
        eprintln!("Error: --frame renders a single PNG and cannot be combined with --gif or --spritesheet");
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let document = ws.store.document();
    let sprite = match find_sprite(document, sprite) {
        Ok(s) => s,
        Err(e) => return lookup_failed(e),
    };
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

    let (images, warnings) = render_sprite(sprite, palette);
    if !report_warnings(&warnings, strict) {
        return ExitCode::from(EXIT_ERROR);
    }
    let images: Vec<RgbaImage> = images.into_iter().map(|img| scale_image(img, scale)).collect();

    if gif {
        let speed = match validate_speed(speed.unwrap_or(ws.store.session().playback_speed)) {
            Ok(speed) => speed,
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_INVALID_ARGS);
            }
        };
        let path = output_path(&sprite.name, output, "gif");
        let delays = frame_delays(&sprite.durations(), speed);
        return finish(render_gif(&images, &delays, true, &path), &path);
    }

    if spritesheet {
        let sheet = render_spritesheet(&images, cols, spacing);
        let path = output_path(&sprite.name, output, "png");
        return finish(save_png(&sheet, &path), &path);
    }

    if let Some(index) = frame {
        let Some(image) = images.get(index) else {
            eprintln!("Error: frame {} out of range (sprite has {} frames)", index, images.len());
            return ExitCode::from(EXIT_ERROR);
        };
        let path = output_path(&sprite.name, output, "png");
        return finish(save_png(image, &path), &path);
    }

    let base = output_path(&sprite.name, output, "png");
    if images.len() == 1 {
        return finish(save_png(&images[0], &base), &base);
    }
    for (index, image) in images.iter().enumerate() {
        let path = numbered_path(&base, index);
        if !written(save_png(image, &path), &path) {
            return ExitCode::from(EXIT_ERROR);
        }
    }
    ExitCode::from(EXIT_SUCCESS)
}

/// Print warnings; in strict mode any warning is fatal. Returns whether to continue.
fn report_warnings(warnings: &[Warning], strict: bool) -> bool {
    for warning in warnings {
        eprintln!("Warning: {}", warning.message);
    }
    if strict && !warnings.is_empty() {
        eprintln!("Error: {} warning(s) in strict mode", warnings.len());
        return false;
    }
    true
}

fn written<E: std::fmt::Display>(result: Result<(), E>, path: &Path) -> bool {
    match result {
        Ok(()) => {
            eprintln!("Wrote: {}", path.display());
            true
        }
        Err(e) => {
            eprintln!("Error: Failed to write '{}': {}", path.display(), e);
            false
        }
    }
}

fn finish<E: std::fmt::Display>(result: Result<(), E>, path: &Path) -> ExitCode {
    if written(result, path) {
        ExitCode::from(EXIT_SUCCESS)
    } else {
        ExitCode::from(EXIT_ERROR)
    }
}

/// `dir/hero.png` becomes `dir/hero_2.png` for frame 2.
fn numbered_path(base: &Path, index: usize) -> PathBuf {
    let stem = base.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    let ext = base.extension().map(|e| e.to_string_lossy().into_owned()).unwrap_or_else(|| "png".into());
    base.with_file_name(format!("{}_{}.{}", stem, index, ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::test_support::workspace;
    use crate::draw::Edit;
    use crate::store::Action;

    #[test]
    fn test_numbered_path() {
        assert_eq!(numbered_path(Path::new("out/hero.png"), 2), PathBuf::from("out/hero_2.png"));
        assert_eq!(numbered_path(Path::new("hero"), 0), PathBuf::from("hero_0.png"));
    }

    #[test]
    fn test_render_png_per_frame() {
        let (temp, mut ws) = workspace();
        let id = ws.store.create_sprite("hero", "cat_player");
        ws.store.dispatch(Action::AddFrame { sprite_id: id, duration: None });
        let out = temp.path().join("png/");
        std::fs::create_dir_all(&out).unwrap();

        let code = run_render(&ws, "hero", Some(&out), None, None, 2, false, None, false, None, 0, false);
        assert_eq!(code, ExitCode::from(EXIT_SUCCESS));
        let image = image::open(out.join("hero_1.png")).unwrap();
        assert_eq!((image.width(), image.height()), (32, 32));
        assert!(out.join("hero_0.png").exists());
    }

    #[test]
    fn test_render_spritesheet_and_gif() {
        let (temp, mut ws) = workspace();
        let id = ws.store.create_sprite("hero", "cat_player");
        ws.store.dispatch(Action::AddFrame { sprite_id: id, duration: Some(200) });

        let sheet = temp.path().join("sheet.png");
        let code = run_render(&ws, "hero", Some(&sheet), None, None, 1, false, None, true, None, 1, false);
        assert_eq!(code, ExitCode::from(EXIT_SUCCESS));
        assert_eq!(image::open(&sheet).unwrap().width(), 33);

        let gif = temp.path().join("hero.gif");
        let code = run_render(&ws, "hero", Some(&gif), None, None, 1, true, Some(2.0), false, None, 0, false);
        assert_eq!(code, ExitCode::from(EXIT_SUCCESS));
        assert!(gif.exists());
    }

    #[test]
    fn test_strict_fails_on_missing_palette_colors() {
        let (temp, mut ws) = workspace();
        let id = ws.store.create_sprite("hero", "cat_player");
        ws.store.dispatch(Action::ApplyEdit {
            sprite_id: id,
            frame_index: 0,
            edit: Edit::Pixel { x: 0, y: 0, color: 12 },
        });
        let out = temp.path().join("hero.png");

        let code = run_render(&ws, "hero", Some(&out), Some("Game Boy"), None, 1, false, None, false, None, 0, true);
        assert_eq!(code, ExitCode::from(EXIT_ERROR));
        assert!(!out.exists());

        let code = run_render(&ws, "hero", Some(&out), Some("Game Boy"), None, 1, false, None, false, None, 0, false);
        assert_eq!(code, ExitCode::from(EXIT_SUCCESS));
        assert!(out.exists());
    }

    #[test]
    fn test_conflicting_modes() {
        let (_temp, mut ws) = workspace();
        ws.store.create_sprite("hero", "cat_player");
        let code = run_render(&ws, "hero", None, None, None, 1, true, None, true, None, 0, false);
        assert_eq!(code, ExitCode::from(EXIT_INVALID_ARGS));
    }
}
