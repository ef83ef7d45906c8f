//! Animated GIF export of sprite previews

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, RgbaImage};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::output::OutputError;
use crate::playback::effective_duration;

/// Shortest delay GIF viewers honour, in milliseconds.
const MIN_DELAY_MS: u32 = 10;

/// Per-frame GIF delays for a sprite played at `speed`.
///
/// GIF stores delays in centiseconds, so each effective duration is rounded
/// to the nearest 10ms, never below 10ms.
pub fn frame_delays(durations: &[u32], speed: f64) -> Vec<u32> {
    durations
        .iter()
        .map(|&d| {
            let ms = effective_duration(d, speed);
            let centis = (ms / 10.0).round() as u32;
            (centis * 10).max(MIN_DELAY_MS)
        })
        .collect()
}

/// Write frames as an animated GIF.
///
/// * `delays_ms` - display time of each frame; missing entries reuse the last delay
/// * `loop_anim` - loop forever, or play once
///
/// Writing zero frames is a no-op and creates no file.
pub fn render_gif(
    frames: &[RgbaImage],
    delays_ms: &[u32],
    loop_anim: bool,
    path: &Path,
) -> Result<(), OutputError> {
    if frames.is_empty() {
        return Ok(());
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let writer = BufWriter::new(File::create(path)?);
    let mut encoder = GifEncoder::new(writer);
    encoder.set_repeat(if loop_anim { Repeat::Infinite } else { Repeat::Finite(0) })?;

    let fallback = delays_ms.last().copied().unwrap_or(MIN_DELAY_MS);
    for (i, image) in frames.iter().enumerate() {
        let ms = delays_ms.get(i).copied().unwrap_or(fallback).max(MIN_DELAY_MS);
        let frame = Frame::from_parts(image.clone(), 0, 0, Delay::from_numer_denom_ms(ms, 1));
        encoder.encode_frame(frame)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::gif::GifDecoder;
    use image::{AnimationDecoder, Rgba};
    use tempfile::tempdir;

    fn solid(color: Rgba<u8>) -> RgbaImage {
        RgbaImage::from_pixel(16, 16, color)
    }

    fn decoded_delays(path: &Path) -> Vec<u32> {
        let file = std::io::BufReader::new(File::open(path).unwrap());
        let decoder = GifDecoder::new(file).unwrap();
        decoder
            .into_frames()
            .map(|f| {
                let (num, den) = f.unwrap().delay().numer_denom_ms();
                num / den
            })
            .collect()
    }

    #[test]
    fn test_frame_delays() {
        assert_eq!(frame_delays(&[100, 200, 50], 1.0), vec![100, 200, 50]);
        assert_eq!(frame_delays(&[100, 200, 50], 2.0), vec![50, 100, 30]);
        assert_eq!(frame_delays(&[10], 3.0), vec![10]);
        assert_eq!(frame_delays(&[100], 0.1), vec![1000]);
    }

    #[test]
    fn test_render_gif_per_frame_delays() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("walk.gif");
        let frames = vec![solid(Rgba([255, 0, 0, 255])), solid(Rgba([0, 255, 0, 255]))];

        render_gif(&frames, &[100, 250], true, &path).unwrap();
        assert_eq!(decoded_delays(&path), vec![100, 250]);
    }

    #[test]
    fn test_render_gif_reuses_last_delay() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/dirs/anim.gif");
        let frames = vec![solid(Rgba([1, 1, 1, 255])), solid(Rgba([2, 2, 2, 255])), solid(Rgba([3, 3, 3, 255]))];

        render_gif(&frames, &[40], false, &path).unwrap();
        assert_eq!(decoded_delays(&path), vec![40, 40, 40]);
    }

    #[test]
    fn test_render_gif_empty_frames() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.gif");
        render_gif(&[], &[100], true, &path).unwrap();
        assert!(!path.exists());
    }
}
