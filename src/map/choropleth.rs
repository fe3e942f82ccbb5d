use crate::braille::BrailleCanvas;
use crate::data::WorldShapes;
use crate::map::geometry::{draw_line, draw_marker, fill_polygon};
use crate::map::projection::Viewport;
use crate::metric::Rgb;
use ratatui::style::Color;

/// Where a value sits in [min, max], clamped to [0, 1]. A collapsed range
/// (all values identical) maps everything to the scale midpoint.
pub fn scale_position(value: f64, min: f64, max: f64) -> f64 {
    let span = max - min;
    if span <= f64::EPSILON {
        return 0.5;
    }
    ((value - min) / span).clamp(0.0, 1.0)
}

/// Continuous color scale: linear interpolation between the two endpoints.
pub fn scale_color(low: Rgb, high: Rgb, t: f64) -> Color {
    let t = t.clamp(0.0, 1.0);
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    Color::Rgb(lerp(low.0, high.0), lerp(low.1, high.1), lerp(low.2, high.2))
}

/// Draws the world choropleth onto a braille canvas from country shapes and
/// per-country values.
pub struct ChoroplethMap<'a> {
    shapes: &'a WorldShapes,
}

const OUTLINE_COLOR: Color = Color::DarkGray;
const HIGHLIGHT_COLOR: Color = Color::Red;

impl<'a> ChoroplethMap<'a> {
    pub fn new(shapes: &'a WorldShapes) -> Self {
        Self { shapes }
    }

    /// Outline every country so filtered-out regions still read as land.
    pub fn draw_outlines(&self, canvas: &mut BrailleCanvas, viewport: &Viewport) {
        for shape in self.shapes.iter() {
            for ring in &shape.rings {
                draw_ring_outline(canvas, viewport, ring, OUTLINE_COLOR);
            }
        }
    }

    /// Fill each row's country with a color interpolated across the rows'
    /// own [min, max]. Rows with no matching geometry are returned as a
    /// warnings list instead of being dropped silently.
    pub fn fill(
        &self,
        canvas: &mut BrailleCanvas,
        viewport: &Viewport,
        rows: &[(&str, f64)],
        scale: (Rgb, Rgb),
    ) -> Vec<String> {
        let mut unmatched = Vec::new();
        if rows.is_empty() {
            return unmatched;
        }

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &(_, v) in rows {
            min = min.min(v);
            max = max.max(v);
        }

        for &(name, value) in rows {
            let Some(shape) = self.shapes.get(name) else {
                unmatched.push(name.to_string());
                continue;
            };

            let color = scale_color(scale.0, scale.1, scale_position(value, min, max));
            for ring in &shape.rings {
                fill_projected_ring(canvas, viewport, ring, color);
            }
        }

        unmatched
    }

    /// Red cross marker at the country's centroid. Returns false when the
    /// country has no geometry to point at.
    pub fn highlight(&self, canvas: &mut BrailleCanvas, viewport: &Viewport, name: &str) -> bool {
        let Some(shape) = self.shapes.get(name) else {
            return false;
        };
        let (lon, lat) = shape.centroid();
        let (px, py) = viewport.project(lon, lat);
        if viewport.is_visible(px, py) {
            let size = if viewport.zoom > 4.0 { 4 } else { 2 };
            draw_marker(canvas, px, py, size, HIGHLIGHT_COLOR);
        }
        true
    }
}

/// Project and outline one ring. Segments wider than the viewport are
/// antimeridian wraps, not borders, and are skipped.
fn draw_ring_outline(
    canvas: &mut BrailleCanvas,
    viewport: &Viewport,
    ring: &[(f64, f64)],
    color: Color,
) {
    if ring.len() < 2 {
        return;
    }

    let mut prev: Option<(i32, i32)> = None;
    for &(lon, lat) in ring {
        let (px, py) = viewport.project(lon, lat);
        if let Some((prev_x, prev_y)) = prev {
            let dist = ((px - prev_x).abs() + (py - prev_y).abs()) as usize;
            if dist < viewport.width && viewport.line_might_be_visible((prev_x, prev_y), (px, py)) {
                draw_line(canvas, prev_x, prev_y, px, py, color);
            }
        }
        prev = Some((px, py));
    }
}

fn fill_projected_ring(
    canvas: &mut BrailleCanvas,
    viewport: &Viewport,
    ring: &[(f64, f64)],
    color: Color,
) {
    if ring.len() < 3 {
        return;
    }

    // A ring that jumps more than a hemisphere between adjacent vertices
    // crosses the antimeridian and would project as a full-width smear.
    // Detect the wrap on the sphere, not on screen, so a merely wide
    // country still gets filled when zoomed in.
    if ring.windows(2).any(|w| (w[1].0 - w[0].0).abs() > 180.0) {
        return;
    }

    let projected: Vec<(i32, i32)> = ring
        .iter()
        .map(|&(lon, lat)| viewport.project(lon, lat))
        .collect();

    let min_x = projected.iter().map(|p| p.0).min().unwrap_or(0);
    let max_x = projected.iter().map(|p| p.0).max().unwrap_or(0);
    let min_y = projected.iter().map(|p| p.1).min().unwrap_or(0);
    let max_y = projected.iter().map(|p| p.1).max().unwrap_or(0);

    // Off-screen culling; fill_polygon clamps spans to the canvas, so a
    // partly visible polygon fills only its visible part
    if max_x < 0 || min_x >= viewport.width as i32 || max_y < 0 || min_y >= viewport.height as i32 {
        return;
    }

    fill_polygon(canvas, &projected, color);
    // Outline on top of the fill so adjacent countries stay separable
    draw_ring_outline(canvas, viewport, ring, color);
}
