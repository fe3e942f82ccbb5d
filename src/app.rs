use crate::data::{CountryRecord, Dataset, WorldShapes};
use crate::metric::Metric;
use crate::map::Viewport;
use crate::query;
use crate::ui;
use ratatui::layout::Rect;

/// Application state: the immutable loaded data plus the current UI
/// selection. Every frame re-derives all views from these, so there is no
/// cached filtered data to invalidate.
pub struct App {
    pub dataset: Dataset,
    pub shapes: WorldShapes,
    pub viewport: Viewport,
    pub metric: Metric,
    /// Current filter cutoff, always within the metric's full-dataset bounds
    pub threshold: f64,
    /// Index into the unfiltered record list for the highlighter
    pub country_idx: usize,
    pub show_warnings: bool,
    pub should_quit: bool,
    /// Last mouse position for drag tracking
    pub last_mouse: Option<(u16, u16)>,
    terminal_size: (u16, u16),
}

impl App {
    pub fn new(
        dataset: Dataset,
        shapes: WorldShapes,
        metric: Metric,
        threshold: Option<f64>,
        width: u16,
        height: u16,
    ) -> Self {
        let mut app = Self {
            dataset,
            shapes,
            viewport: Viewport::world(1, 1),
            metric,
            threshold: 0.0,
            country_idx: 0,
            show_warnings: false,
            should_quit: false,
            last_mouse: None,
            terminal_size: (width, height),
        };
        let (min, max) = app.bounds();
        app.threshold = threshold.unwrap_or(min).clamp(min, max);
        app.sync_viewport();
        app
    }

    /// Update viewport pixel size when the terminal resizes
    pub fn resize(&mut self, width: u16, height: u16) {
        self.terminal_size = (width, height);
        self.sync_viewport();
    }

    /// The map pane's inner drawing area for the current terminal size.
    /// Both rendering and mouse handling go through this so they agree.
    pub fn map_inner(&self) -> Rect {
        let (w, h) = self.terminal_size;
        let layout = ui::dashboard_layout(Rect::new(0, 0, w, h), self.metric);
        inner(layout.map)
    }

    fn sync_viewport(&mut self) {
        let map = self.map_inner();
        // Braille gives 2x4 pixels per character cell
        self.viewport.width = map.width as usize * 2;
        self.viewport.height = map.height as usize * 4;
    }

    /// Full-dataset bounds for the current metric (never the filtered view)
    pub fn bounds(&self) -> (f64, f64) {
        query::bounds(&self.dataset, self.metric)
    }

    pub fn select_metric(&mut self, metric: Metric) {
        if self.metric != metric {
            self.metric = metric;
            // The slider resets to the new metric's minimum, like the
            // original dashboard's fresh slider per metric
            self.threshold = self.bounds().0;
            // The leaderboard pane appears only for Population, which
            // changes the map's height
            self.sync_viewport();
        }
    }

    /// Move the threshold by a fraction of the metric's full range
    pub fn nudge_threshold(&mut self, fraction: f64) {
        let (min, max) = self.bounds();
        let span = max - min;
        if span <= f64::EPSILON {
            // All values identical: the range is a single point
            self.threshold = min;
            return;
        }
        self.threshold = (self.threshold + fraction * span).clamp(min, max);
    }

    pub fn next_country(&mut self) {
        if self.country_idx + 1 < self.dataset.len() {
            self.country_idx += 1;
        }
    }

    pub fn prev_country(&mut self) {
        self.country_idx = self.country_idx.saturating_sub(1);
    }

    pub fn selected_country(&self) -> &str {
        &self.dataset.records()[self.country_idx].country
    }

    /// The highlighted record, looked up by exact name in the unfiltered
    /// table (independent of metric and threshold).
    pub fn selected_record(&self) -> Option<&CountryRecord> {
        self.dataset.find(self.selected_country())
    }

    /// (country, value) pairs passing the threshold, for the choropleth
    pub fn filtered_rows(&self) -> Vec<(&str, f64)> {
        query::threshold_filter(&self.dataset, self.metric, self.threshold)
            .into_iter()
            .map(|i| {
                let r = &self.dataset.records()[i];
                (r.country.as_str(), self.metric.value(r))
            })
            .collect()
    }

    /// Indices of the leaderboard rows (unfiltered, top urban populations)
    pub fn leaderboard(&self) -> Vec<usize> {
        query::top_urban(&self.dataset, query::LEADERBOARD_SIZE)
    }

    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.viewport.pan(dx, dy);
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    pub fn reset_view(&mut self) {
        let (w, h) = (self.viewport.width, self.viewport.height);
        self.viewport = Viewport::world(w, h);
    }

    /// Convert a terminal cell to braille pixel coordinates within the map
    /// pane, or None when the cell is outside it
    pub fn map_pixel(&self, col: u16, row: u16) -> Option<(i32, i32)> {
        let map = self.map_inner();
        if col < map.x || row < map.y || col >= map.x + map.width || row >= map.y + map.height {
            return None;
        }
        Some((((col - map.x) as i32) * 2, ((row - map.y) as i32) * 4))
    }

    pub fn zoom_in_at(&mut self, col: u16, row: u16) {
        if let Some((px, py)) = self.map_pixel(col, row) {
            self.viewport.zoom_in_at(px, py);
        }
    }

    pub fn zoom_out_at(&mut self, col: u16, row: u16) {
        if let Some((px, py)) = self.map_pixel(col, row) {
            self.viewport.zoom_out_at(px, py);
        }
    }

    /// Drag-to-pan, less sensitive when zoomed out
    pub fn handle_drag(&mut self, col: u16, row: u16) {
        if let Some((last_col, last_row)) = self.last_mouse {
            let dx = last_col as i32 - col as i32;
            let dy = last_row as i32 - row as i32;
            let scale = if self.viewport.zoom < 2.0 {
                2
            } else if self.viewport.zoom < 4.0 {
                3
            } else {
                4
            };
            self.pan(dx * scale, dy * scale);
        }
        self.last_mouse = Some((col, row));
    }

    pub fn end_drag(&mut self) {
        self.last_mouse = None;
    }

    pub fn toggle_warnings(&mut self) {
        self.show_warnings = !self.show_warnings;
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn zoom_level(&self) -> String {
        format!("{:.1}x", self.viewport.zoom)
    }

    pub fn center_coords(&self) -> String {
        format!(
            "{:.1}°{}, {:.1}°{}",
            self.viewport.center_lat.abs(),
            if self.viewport.center_lat >= 0.0 { "N" } else { "S" },
            self.viewport.center_lon.abs(),
            if self.viewport.center_lon >= 0.0 { "E" } else { "W" }
        )
    }
}

fn inner(rect: Rect) -> Rect {
    // Shrink by the surrounding Block border
    Rect {
        x: rect.x + 1,
        y: rect.y + 1,
        width: rect.width.saturating_sub(2),
        height: rect.height.saturating_sub(2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Dataset;

    fn app() -> App {
        let csv = "\
Country,Population,Forested Area (%),Co2-Emissions,Urban_population
A,\"2,000,000\",30%,100,\"500,000\"
B,\"1,000,000\",60%,200,\"900,000\"
C,\"4,000,000\",10%,50,\"100,000\"
";
        let dataset = Dataset::from_reader(csv.as_bytes()).unwrap();
        App::new(dataset, WorldShapes::empty(), Metric::Population, None, 120, 40)
    }

    #[test]
    fn test_threshold_starts_at_metric_minimum() {
        let app = app();
        assert_eq!(app.threshold, 1_000_000.0);
    }

    #[test]
    fn test_metric_switch_resets_threshold() {
        let mut app = app();
        app.nudge_threshold(1.0);
        assert_eq!(app.threshold, 4_000_000.0);
        app.select_metric(Metric::ForestedArea);
        assert_eq!(app.threshold, 10.0);
    }

    #[test]
    fn test_nudge_clamps_to_full_dataset_bounds() {
        let mut app = app();
        app.nudge_threshold(10.0);
        assert_eq!(app.threshold, 4_000_000.0);
        app.nudge_threshold(-10.0);
        assert_eq!(app.threshold, 1_000_000.0);
    }

    #[test]
    fn test_spec_example_population_threshold() {
        let mut app = app();
        app.threshold = 1_500_000.0;
        let rows = app.filtered_rows();
        let names: Vec<&str> = rows.iter().map(|&(n, _)| n).collect();
        assert_eq!(names, vec!["A", "C"]);
        app.threshold = 3_000_000.0;
        assert_eq!(app.filtered_rows().len(), 1);
    }

    #[test]
    fn test_country_selection_saturates() {
        let mut app = app();
        app.prev_country();
        assert_eq!(app.selected_country(), "A");
        for _ in 0..10 {
            app.next_country();
        }
        assert_eq!(app.selected_country(), "C");
    }

    #[test]
    fn test_selected_record_from_unfiltered_table() {
        let mut app = app();
        // Filter everything out; the highlighter must still find its row
        app.threshold = 4_000_000.0;
        app.country_idx = 1;
        let record = app.selected_record().unwrap();
        assert_eq!(record.country, "B");
    }

    #[test]
    fn test_leaderboard_ignores_filter() {
        let mut app = app();
        app.threshold = 4_000_000.0;
        let top = app.leaderboard();
        assert_eq!(top.len(), 3);
        assert_eq!(app.dataset.records()[top[0]].country, "B");
    }
}
