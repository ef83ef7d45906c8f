//! Spritesheet rendering - lays a sprite's frames out on one image

use image::{imageops, Rgba, RgbaImage};

const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Combine frame images into a grid, left to right, top to bottom.
///
/// * `cols` - frames per row; `None` puts every frame on one row
/// * `spacing` - transparent pixels between neighbouring cells
///
/// Every cell is as large as the largest frame.
///
/// # Examples
///
/// ```
/// use image::RgbaImage;
/// use dotsmith::spritesheet::render_spritesheet;
///
/// let frame = RgbaImage::from_pixel(16, 16, image::Rgba([255, 0, 0, 255]));
/// let frames = vec![frame.clone(), frame.clone(), frame];
///
/// let strip = render_spritesheet(&frames, None, 0);
/// assert_eq!(strip.dimensions(), (48, 16));
///
/// let grid = render_spritesheet(&frames, Some(2), 1);
/// assert_eq!(grid.dimensions(), (33, 33));
/// ```
pub fn render_spritesheet(frames: &[RgbaImage], cols: Option<u32>, spacing: u32) -> RgbaImage {
    if frames.is_empty() {
        return RgbaImage::from_pixel(1, 1, CLEAR);
    }

    let cell_w = frames.iter().map(|f| f.width()).max().unwrap_or(1);
    let cell_h = frames.iter().map(|f| f.height()).max().unwrap_or(1);

    let count = frames.len() as u32;
    let columns = cols.filter(|&c| c > 0).unwrap_or(count).min(count);
    let rows = count.div_ceil(columns);

    let width = columns * cell_w + (columns - 1) * spacing;
    let height = rows * cell_h + (rows - 1) * spacing;
    let mut sheet = RgbaImage::from_pixel(width, height, CLEAR);

    for (i, frame) in (0u32..).zip(frames) {
        let x = (i % columns) * (cell_w + spacing);
        let y = (i / columns) * (cell_h + spacing);
        imageops::replace(&mut sheet, frame, i64::from(x), i64::from(y));
    }

    sheet
}
