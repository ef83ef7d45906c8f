//! Frame rendering to image buffers

use image::{Rgba, RgbaImage};

use crate::color::parse_color;
use crate::models::{Grid, Palette, Sprite, GRID_SIZE, TRANSPARENT};

/// A warning generated during rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub message: String,
}

impl Warning {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Magenta used for palette entries that do not parse
const MAGENTA: Rgba<u8> = Rgba([255, 0, 255, 255]);

const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Resolve each palette entry to a pixel color, substituting magenta for
/// strings that are not valid colors.
fn resolve_palette(palette: &Palette, warnings: &mut Vec<Warning>) -> Vec<Rgba<u8>> {
    palette
        .colors
        .iter()
        .enumerate()
        .map(|(index, value)| {
            parse_color(value).unwrap_or_else(|e| {
                warnings.push(Warning::new(format!(
                    "Invalid color '{}' at index {} of palette '{}': {}, using magenta",
                    value, index, palette.name, e
                )));
                MAGENTA
            })
        })
        .collect()
}

fn paint(image: &mut RgbaImage, grid: &Grid, colors: &[Rgba<u8>], warnings: &mut Vec<Warning>) {
    let mut missing: Vec<u8> = Vec::new();
    for (y, row) in grid.rows().enumerate() {
        for (x, &index) in row.iter().enumerate() {
            // Index 0 is the background and always transparent
            if index == TRANSPARENT {
                continue;
            }
            match colors.get(usize::from(index)) {
                Some(&color) => image.put_pixel(x as u32, y as u32, color),
                None => {
                    if !missing.contains(&index) {
                        missing.push(index);
                    }
                }
            }
        }
    }
    for index in missing {
        warnings.push(Warning::new(format!(
            "Color index {} is outside the palette ({} colors), left transparent",
            index,
            colors.len()
        )));
    }
}

/// Render a grid to a 16x16 RGBA image.
///
/// Index 0 is transparent. Indices the palette has no color for are skipped
/// (left transparent) with one warning per index.
///
/// # Examples
///
/// ```
/// use dotsmith::models::{Grid, Palette};
/// use dotsmith::renderer::render_grid;
///
/// let palette = Palette::new("mono", vec!["#000".into(), "#FFF".into()]);
/// let (image, warnings) = render_grid(&Grid::new(), &palette);
/// assert_eq!(image.dimensions(), (16, 16));
/// assert!(warnings.is_empty());
/// ```
pub fn render_grid(grid: &Grid, palette: &Palette) -> (RgbaImage, Vec<Warning>) {
    let mut warnings = Vec::new();
    let colors = resolve_palette(palette, &mut warnings);
    let mut image = RgbaImage::from_pixel(GRID_SIZE as u32, GRID_SIZE as u32, CLEAR);
    paint(&mut image, grid, &colors, &mut warnings);
    (image, warnings)
}

/// Render every frame of a sprite, in order.
///
/// The palette is resolved once, so an invalid palette color is reported once.
pub fn render_sprite(sprite: &Sprite, palette: &Palette) -> (Vec<RgbaImage>, Vec<Warning>) {
    let mut warnings = Vec::new();
    let colors = resolve_palette(palette, &mut warnings);
    let images = sprite
        .frames
        .iter()
        .map(|frame| {
            let mut image = RgbaImage::from_pixel(GRID_SIZE as u32, GRID_SIZE as u32, CLEAR);
            paint(&mut image, &frame.grid, &colors, &mut warnings);
            image
        })
        .collect();
    (images, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::set_pixel;
    use crate::frames::add_frame;
    use crate::palettes::default_palettes;

    fn default_palette() -> Palette {
        default_palettes().remove(0)
    }

    #[test]
    fn test_blank_grid_is_transparent() {
        let (image, warnings) = render_grid(&Grid::new(), &default_palette());
        assert!(warnings.is_empty());
        assert!(image.pixels().all(|p| *p == CLEAR));
    }

    #[test]
    fn test_index_zero_ignores_palette_color() {
        // Index 0 of the default palette is opaque black, yet renders clear
        let palette = default_palette();
        assert_eq!(parse_color(&palette.colors[0]).unwrap(), Rgba([0, 0, 0, 255]));
        let (image, _) = render_grid(&Grid::new(), &palette);
        assert_eq!(*image.get_pixel(0, 0), CLEAR);
    }

    #[test]
    fn test_painted_cells() {
        let grid = set_pixel(&Grid::new(), 2, 3, 2).unwrap();
        let grid = set_pixel(&grid, 15, 15, 1).unwrap();
        let (image, warnings) = render_grid(&grid, &default_palette());
        assert!(warnings.is_empty());
        assert_eq!(*image.get_pixel(2, 3), Rgba([255, 0, 0, 255]));
        assert_eq!(*image.get_pixel(15, 15), Rgba([255, 255, 255, 255]));
        assert_eq!(*image.get_pixel(3, 2), CLEAR);
    }

    #[test]
    fn test_index_outside_palette_is_skipped() {
        let gameboy = default_palettes().remove(1);
        let grid = set_pixel(&Grid::new(), 0, 0, 9).unwrap();
        let grid = set_pixel(&grid, 1, 0, 9).unwrap();
        let grid = set_pixel(&grid, 2, 0, 3).unwrap();

        let (image, warnings) = render_grid(&grid, &gameboy);
        assert_eq!(*image.get_pixel(0, 0), CLEAR);
        assert_eq!(*image.get_pixel(2, 0), Rgba([155, 188, 15, 255]));
        // One warning per distinct index
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("index 9"));
    }

    #[test]
    fn test_invalid_palette_color_is_magenta() {
        let palette = Palette::new("broken", vec!["#000".into(), "not-a-color".into()]);
        let grid = set_pixel(&Grid::new(), 5, 5, 1).unwrap();
        let (image, warnings) = render_grid(&grid, &palette);
        assert_eq!(*image.get_pixel(5, 5), MAGENTA);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("not-a-color"));
    }

    #[test]
    fn test_render_sprite_frames_in_order() {
        let sprite = Sprite::new("blink", "cat_effect", 0);
        let mut sprite = add_frame(&sprite, 1);
        let lit = set_pixel(&sprite.frames[1].grid, 0, 0, 5).unwrap();
        sprite = crate::frames::update_frame(&sprite, 1, lit, 2).unwrap();

        let (images, warnings) = render_sprite(&sprite, &default_palette());
        assert!(warnings.is_empty());
        assert_eq!(images.len(), 2);
        assert_eq!(*images[0].get_pixel(0, 0), CLEAR);
        assert_eq!(*images[1].get_pixel(0, 0), Rgba([255, 255, 0, 255]));
    }
}
