use crate::braille::BrailleCanvas;
use ratatui::style::Color;

/// Draw a line using Bresenham's algorithm
pub fn draw_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;

    loop {
        canvas.set_pixel_signed(x, y, color);

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;

        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }

        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}

/// Draw a point marker (cross) for the highlighted country
pub fn draw_marker(canvas: &mut BrailleCanvas, x: i32, y: i32, size: i32, color: Color) {
    for i in -size..=size {
        canvas.set_pixel_signed(x + i, y, color);
        canvas.set_pixel_signed(x, y + i, color);
    }
}

/// Fill a closed polygon ring (projected pixel coordinates) with an even-odd
/// scanline pass. The ring does not need an explicit closing point.
pub fn fill_polygon(canvas: &mut BrailleCanvas, ring: &[(i32, i32)], color: Color) {
    if ring.len() < 3 {
        return;
    }

    let min_y = ring.iter().map(|p| p.1).min().unwrap_or(0).max(0);
    let max_y = ring
        .iter()
        .map(|p| p.1)
        .max()
        .unwrap_or(0)
        .min(canvas.pixel_height() as i32 - 1);

    let mut crossings: Vec<f64> = Vec::new();
    for y in min_y..=max_y {
        // Sample at the scanline's vertical midpoint so vertices on integer
        // rows do not get double-counted
        let sy = y as f64 + 0.5;
        crossings.clear();

        for i in 0..ring.len() {
            let (x0, y0) = ring[i];
            let (x1, y1) = ring[(i + 1) % ring.len()];
            let (fy0, fy1) = (y0 as f64, y1 as f64);
            if (fy0 <= sy && fy1 > sy) || (fy1 <= sy && fy0 > sy) {
                let t = (sy - fy0) / (fy1 - fy0);
                crossings.push(x0 as f64 + t * (x1 - x0) as f64);
            }
        }

        crossings.sort_by(f64::total_cmp);

        for pair in crossings.chunks_exact(2) {
            let start = (pair[0].ceil() as i32).max(0);
            let end = (pair[1].floor() as i32).min(canvas.pixel_width() as i32 - 1);
            for x in start..=end {
                canvas.set_pixel_signed(x, y, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_line() {
        let mut canvas = BrailleCanvas::new(5, 1);
        draw_line(&mut canvas, 0, 0, 9, 0, Color::White);
        for x in 0..10 {
            // Each plotted dot lights up its cell
            assert!(canvas.cell(x / 2, 0).is_some());
        }
    }

    #[test]
    fn test_vertical_line() {
        let mut canvas = BrailleCanvas::new(1, 2);
        draw_line(&mut canvas, 0, 0, 0, 7, Color::White);
        assert!(canvas.cell(0, 0).is_some());
        assert!(canvas.cell(0, 1).is_some());
    }

    #[test]
    fn test_fill_square_interior_and_skip_exterior() {
        let mut canvas = BrailleCanvas::new(8, 4);
        // Square from (2,2) to (9,9) in pixel space
        let ring = [(2, 2), (9, 2), (9, 9), (2, 9)];
        fill_polygon(&mut canvas, &ring, Color::Green);

        // Interior cell (pixel 4,4 -> cell 2,1)
        assert!(canvas.cell(2, 1).is_some());
        // Far outside (pixel 14,14 -> cell 7,3)
        assert!(canvas.cell(7, 3).is_none());
    }

    #[test]
    fn test_fill_degenerate_ring_is_noop() {
        let mut canvas = BrailleCanvas::new(4, 4);
        fill_polygon(&mut canvas, &[(0, 0), (3, 3)], Color::Red);
        assert!(canvas.cell(0, 0).is_none());
    }
}
