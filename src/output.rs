//! Image and text output, and output file naming

use image::imageops::FilterType;
use image::RgbaImage;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

fn ensure_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

/// Save an RGBA image as PNG, creating parent directories as needed.
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<(), OutputError> {
    ensure_parent(path)?;
    image.save_with_format(path, image::ImageFormat::Png)?;
    Ok(())
}

/// Write a text file (e.g. an exported document), creating parent directories.
pub fn write_text(path: &Path, text: &str) -> Result<(), OutputError> {
    ensure_parent(path)?;
    std::fs::write(path, text)?;
    Ok(())
}

/// Scale an image by an integer factor with nearest-neighbor sampling,
/// keeping pixel edges crisp. Factors of 0 and 1 return the image as is.
pub fn scale_image(image: RgbaImage, factor: u32) -> RgbaImage {
    if factor <= 1 {
        return image;
    }
    let (w, h) = image.dimensions();
    image::imageops::resize(&image, w * factor, h * factor, FilterType::Nearest)
}

/// A file-system friendly version of a sprite name.
///
/// Keeps ASCII letters, digits, `-` and `_`; everything else becomes `_`.
pub fn file_stem(name: &str) -> String {
    let stem: String = name
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if stem.is_empty() {
        "sprite".to_string()
    } else {
        stem
    }
}

/// Where to write a rendered sprite.
///
/// | `output`            | Result                      |
/// |---------------------|-----------------------------|
/// | none                | `{name}.{ext}` in the cwd   |
/// | existing dir or `/` | `dir/{name}.{ext}`          |
/// | file path           | the path unchanged          |
pub fn output_path(sprite_name: &str, output: Option<&Path>, ext: &str) -> PathBuf {
    let file_name = format!("{}.{}", file_stem(sprite_name), ext);
    match output {
        None => PathBuf::from(file_name),
        Some(out) if out.as_os_str().to_string_lossy().ends_with('/') || out.is_dir() => {
            out.join(file_name)
        }
        Some(out) => out.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::tempdir;

    #[test]
    fn test_save_png_creates_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a/b/out.png");
        let image = RgbaImage::from_pixel(16, 16, Rgba([1, 2, 3, 255]));
        save_png(&image, &path).unwrap();

        let loaded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(loaded.dimensions(), (16, 16));
        assert_eq!(*loaded.get_pixel(0, 0), Rgba([1, 2, 3, 255]));
    }

    #[test]
    fn test_write_text() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("exports/doc.json");
        write_text(&path, "{}").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn test_scale_image_nearest() {
        let mut image = RgbaImage::from_pixel(2, 1, Rgba([0, 0, 0, 0]));
        image.put_pixel(1, 0, Rgba([255, 0, 0, 255]));
        let scaled = scale_image(image, 4);
        assert_eq!(scaled.dimensions(), (8, 4));
        assert_eq!(*scaled.get_pixel(3, 3), Rgba([0, 0, 0, 0]));
        assert_eq!(*scaled.get_pixel(4, 0), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_scale_image_identity() {
        let image = RgbaImage::from_pixel(16, 16, Rgba([9, 9, 9, 255]));
        assert_eq!(scale_image(image.clone(), 1), image);
        assert_eq!(scale_image(image.clone(), 0), image);
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("Hero Walk"), "Hero_Walk");
        assert_eq!(file_stem("slime-2"), "slime-2");
        assert_eq!(file_stem("../etc"), "___etc");
        assert_eq!(file_stem("   "), "sprite");
    }

    #[test]
    fn test_output_path_rules() {
        assert_eq!(output_path("hero", None, "png"), PathBuf::from("hero.png"));
        assert_eq!(
            output_path("hero", Some(Path::new("out/")), "png"),
            PathBuf::from("out/hero.png")
        );
        assert_eq!(
            output_path("hero", Some(Path::new("custom.gif")), "gif"),
            PathBuf::from("custom.gif")
        );

        let dir = tempdir().unwrap();
        assert_eq!(output_path("a b", Some(dir.path()), "png"), dir.path().join("a_b.png"));
    }
}
