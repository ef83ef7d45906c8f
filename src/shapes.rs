//! Shape rasterization primitives for pixel-perfect strokes.

/// Rasterize a line using Bresenham's line algorithm.
///
/// Returns every pixel from `p0` to `p1`, both inclusive, in drawing order.
/// Uses the integer error accumulator `err = dx - dy`, stepping x when
/// `2 * err > -dy` and y when `2 * err < dx`. Arithmetic is done in `i64`,
/// so any pair of `i32` points is accepted; the result holds one point per
/// step along the longer axis, so callers clip long segments first.
///
/// # Examples
///
/// ```
/// use dotsmith::shapes::rasterize_line;
///
/// let pixels = rasterize_line((0, 0), (3, 3));
/// assert_eq!(pixels, vec![(0, 0), (1, 1), (2, 2), (3, 3)]);
/// ```
pub fn rasterize_line(p0: (i32, i32), p1: (i32, i32)) -> Vec<(i32, i32)> {
    let (mut x0, mut y0) = (i64::from(p0.0), i64::from(p0.1));
    let (x1, y1) = (i64::from(p1.0), i64::from(p1.1));

    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx - dy;

    let mut pixels = Vec::with_capacity(dx.max(dy) as usize + 1);
    loop {
        // Every visited coordinate lies between the two i32 endpoints
        pixels.push((x0 as i32, y0 as i32));

        if x0 == x1 && y0 == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x0 += sx;
        }
        if e2 < dx {
            err += dx;
            y0 += sy;
        }
    }

    pixels
}
