//! Terminal display of frame grids
//!
//! Colored output uses 24-bit ANSI backgrounds; the plain variant prints
//! color indices with row and column headers for scripting and diffs.

use image::Rgba;
use std::collections::BTreeSet;

use crate::color::parse_color;
use crate::models::{Grid, Palette, GRID_SIZE, TRANSPARENT};

/// ANSI escape sequence to reset all formatting
pub const ANSI_RESET: &str = "\x1b[0m";

/// Background used for transparent cells
const TRANSPARENT_BG: &str = "\x1b[48;5;236m";

/// Convert RGBA color to ANSI 24-bit background escape sequence.
///
/// Transparent colors (alpha = 0) are rendered as a dark gray background
/// to visually distinguish them from opaque colors.
///
/// # Examples
///
/// ```
/// use dotsmith::terminal::color_to_ansi_bg;
/// use image::Rgba;
///
/// assert_eq!(color_to_ansi_bg(Rgba([255, 0, 0, 255])), "\x1b[48;2;255;0;0m");
/// assert_eq!(color_to_ansi_bg(Rgba([0, 0, 0, 0])), "\x1b[48;5;236m");
/// ```
pub fn color_to_ansi_bg(rgba: Rgba<u8>) -> String {
    if rgba[3] == 0 {
        TRANSPARENT_BG.to_string()
    } else {
        format!("\x1b[48;2;{};{};{}m", rgba[0], rgba[1], rgba[2])
    }
}

/// Single character shown for a color index: `.` for transparent, then hex.
fn index_char(index: u8) -> char {
    if index == TRANSPARENT {
        '.'
    } else {
        char::from_digit(u32::from(index), 36).unwrap_or('?')
    }
}

/// Render a grid with ANSI color backgrounds.
///
/// Returns `(colored_grid, legend)`. Each cell is the index character
/// centered in a 3-character cell. The legend lists every index in use with
/// its palette color, or `???` when the palette has no entry for it.
pub fn render_ansi_grid(grid: &Grid, palette: &Palette) -> (String, String) {
    let mut output = String::new();
    let mut used: BTreeSet<u8> = BTreeSet::new();

    for row in grid.rows() {
        for &index in row.iter() {
            let bg = if index == TRANSPARENT {
                TRANSPARENT_BG.to_string()
            } else {
                used.insert(index);
                let rgba = palette
                    .color(index)
                    .and_then(|c| parse_color(c).ok())
                    .unwrap_or(Rgba([128, 128, 128, 255]));
                color_to_ansi_bg(rgba)
            };

            output.push_str(&bg);
            output.push(' ');
            output.push(index_char(index));
            output.push(' ');
            output.push_str(ANSI_RESET);
        }
        output.push('\n');
    }

    let mut legend = format!("\nPalette: {}\n", palette.name);
    for index in used {
        let color = palette.color(index).unwrap_or("???");
        legend.push_str(&format!("  {} = {:>2} ({})\n", index_char(index), index, color));
    }

    (output, legend)
}

/// Render a grid as index characters with row/column coordinate headers.
///
/// ```text
///      0  1  2 ...
///    ┌──────────
///  0 │ .  1  . ...
/// ```
pub fn render_coordinate_grid(grid: &Grid) -> String {
    let mut output = String::new();

    output.push_str("   ");
    for col in 0..GRID_SIZE {
        output.push_str(&format!("{:>2} ", col));
    }
    output.push('\n');

    output.push_str("   \u{250C}");
    output.push_str(&"\u{2500}".repeat(GRID_SIZE * 3));
    output.push('\n');

    for (row_idx, row) in grid.rows().enumerate() {
        output.push_str(&format!("{:>2} \u{2502}", row_idx));
        for &index in row.iter() {
            output.push_str(&format!(" {:>2}", index_char(index)));
        }
        output.push('\n');
    }

    output
}
