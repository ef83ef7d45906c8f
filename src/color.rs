//! Palette color strings.
//!
//! Palettes store colors as CSS strings, usually `rgba(r, g, b, a)` as
//! written by the editor, but any CSS color is accepted on import: hex
//! (`#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`), functional notations and named
//! colors.

use image::Rgba;
use lightningcss::traits::Parse;
use lightningcss::values::color::{CssColor, FloatColor};
use thiserror::Error;

use crate::models::Palette;

/// Error type for color parsing failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("empty color string")]
    Empty,
    #[error("invalid hex color '{0}', expected 3, 4, 6, or 8 hex digits")]
    InvalidHex(String),
    #[error("CSS parse error: {0}")]
    CssParse(String),
    #[error("palette color {index} ('{value}'): {source}")]
    InPalette {
        index: usize,
        value: String,
        #[source]
        source: Box<ColorError>,
    },
}

/// Parse a CSS color string into an RGBA color.
///
/// # Examples
///
/// ```
/// use dotsmith::color::parse_color;
///
/// assert_eq!(parse_color("rgba(255, 0, 0, 1)").unwrap(), image::Rgba([255, 0, 0, 255]));
/// assert_eq!(parse_color("#0F0").unwrap(), image::Rgba([0, 255, 0, 255]));
/// assert_eq!(parse_color("blue").unwrap(), image::Rgba([0, 0, 255, 255]));
/// ```
pub fn parse_color(s: &str) -> Result<Rgba<u8>, ColorError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(ColorError::Empty);
    }
    match s.strip_prefix('#') {
        Some(hex) => parse_hex(hex).ok_or_else(|| ColorError::InvalidHex(s.to_string())),
        None => parse_css(s),
    }
}

/// Hex digits after the '#'. Short forms double each digit.
fn parse_hex(hex: &str) -> Option<Rgba<u8>> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channels: Vec<u8> = match hex.len() {
        3 | 4 => hex
            .chars()
            .map(|c| c.to_digit(16).map(|d| d as u8 * 17))
            .collect::<Option<_>>()?,
        6 | 8 => (0..hex.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).ok())
            .collect::<Option<_>>()?,
        _ => return None,
    };
    let alpha = channels.get(3).copied().unwrap_or(255);
    Some(Rgba([channels[0], channels[1], channels[2], alpha]))
}

/// Anything but hex goes through lightningcss.
fn parse_css(s: &str) -> Result<Rgba<u8>, ColorError> {
    let color = CssColor::parse_string(s).map_err(|e| ColorError::CssParse(e.to_string()))?;
    let rgb = color
        .to_rgb()
        .map_err(|_| ColorError::CssParse(format!("cannot convert '{}' to RGB", s)))?;

    match rgb {
        CssColor::RGBA(c) => Ok(Rgba([c.red, c.green, c.blue, c.alpha])),
        CssColor::Float(float) => match float.as_ref() {
            FloatColor::RGB(c) => {
                let to_u8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
                Ok(Rgba([to_u8(c.r), to_u8(c.g), to_u8(c.b), to_u8(c.alpha)]))
            }
            _ => Err(ColorError::CssParse(format!("'{}' did not convert to RGB", s))),
        },
        _ => Err(ColorError::CssParse(format!("'{}' did not convert to RGB", s))),
    }
}

/// Parse every color of a palette, in index order.
pub fn parse_palette(palette: &Palette) -> Result<Vec<Rgba<u8>>, ColorError> {
    palette
        .colors
        .iter()
        .enumerate()
        .map(|(index, value)| {
            parse_color(value).map_err(|e| ColorError::InPalette {
                index,
                value: value.clone(),
                source: Box::new(e),
            })
        })
        .collect()
}

/// Format a color the way the editor writes palette entries.
pub fn to_css_rgba(color: Rgba<u8>) -> String {
    let [r, g, b, a] = color.0;
    let alpha = f64::from(a) / 255.0;
    // Two decimals are enough to round-trip 8-bit alpha
    let alpha = format!("{:.2}", alpha);
    let alpha = alpha.trim_end_matches('0').trim_end_matches('.');
    format!("rgba({}, {}, {}, {})", r, g, b, alpha)
}
