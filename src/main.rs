mod app;
mod braille;
mod data;
mod map;
mod metric;
mod query;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use data::{Dataset, WorldShapes};
use metric::{InvalidMetric, Metric};
use ratatui::DefaultTerminal;
use std::path::PathBuf;

/// Terminal world-data explorer: choropleth, threshold filter, country
/// highlighter, and urban-population leaderboard.
#[derive(Parser)]
#[command(name = "tui-atlas", version, about)]
struct Args {
    /// Country statistics CSV file
    #[arg(long, default_value = "data/world-data-2023.csv")]
    data: PathBuf,

    /// Country polygons GeoJSON file
    #[arg(long, default_value = "data/countries.geojson")]
    geometry: PathBuf,

    /// Metric shown at startup: population, forested-area, or co2-emissions
    #[arg(long, default_value = "population", value_parser = parse_metric)]
    metric: Metric,

    /// Initial filter threshold (defaults to the metric's minimum)
    #[arg(long)]
    threshold: Option<f64>,
}

fn parse_metric(s: &str) -> Result<Metric, InvalidMetric> {
    s.parse()
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load everything before touching the terminal so failures print plainly
    let dataset = Dataset::from_csv_path(&args.data)
        .with_context(|| format!("loading {}", args.data.display()))?;
    let shapes = match WorldShapes::from_geojson_path(&args.geometry) {
        Ok(shapes) => shapes,
        Err(e) => {
            // Missing geometry degrades to a map-less dashboard, not a crash
            eprintln!("Warning: no country geometry: {e:#}");
            WorldShapes::empty()
        }
    };

    let mut terminal = ratatui::init();
    terminal.clear()?;
    execute!(std::io::stdout(), EnableMouseCapture)?;

    let result = run(&mut terminal, args, dataset, shapes);

    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

fn run(
    terminal: &mut DefaultTerminal,
    args: Args,
    dataset: Dataset,
    shapes: WorldShapes,
) -> Result<()> {
    let size = terminal.size()?;
    let mut app = App::new(
        dataset,
        shapes,
        args.metric,
        args.threshold,
        size.width,
        size.height,
    );

    // Nothing animates, so block on input and redraw per event
    loop {
        terminal.draw(|frame| ui::render(frame, &app))?;

        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => app.quit(),

                // Metric selection
                KeyCode::Char('1') => app.select_metric(Metric::Population),
                KeyCode::Char('2') => app.select_metric(Metric::ForestedArea),
                KeyCode::Char('3') => app.select_metric(Metric::Co2Emissions),

                // Threshold slider: 1% of the full range, 10% with shift
                KeyCode::Char('[') => app.nudge_threshold(-0.01),
                KeyCode::Char(']') => app.nudge_threshold(0.01),
                KeyCode::Char('{') => app.nudge_threshold(-0.10),
                KeyCode::Char('}') => app.nudge_threshold(0.10),

                // Country highlighter
                KeyCode::Up => app.prev_country(),
                KeyCode::Down => app.next_country(),

                // Map navigation
                KeyCode::Char('h') => app.pan(-10, 0),
                KeyCode::Char('l') => app.pan(10, 0),
                KeyCode::Char('k') => app.pan(0, -6),
                KeyCode::Char('j') => app.pan(0, 6),
                KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
                KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),
                KeyCode::Char('0') | KeyCode::Char('r') => app.reset_view(),

                KeyCode::Char('w') => app.toggle_warnings(),

                _ => {}
            },
            Event::Mouse(mouse) => handle_mouse(&mut app, mouse),
            Event::Resize(width, height) => app.resize(width, height),
            _ => {}
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Mouse: scroll to zoom at the cursor, drag to pan
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.zoom_in_at(mouse.column, mouse.row),
        MouseEventKind::ScrollDown => app.zoom_out_at(mouse.column, mouse.row),
        MouseEventKind::ScrollLeft => app.pan(-15, 0),
        MouseEventKind::ScrollRight => app.pan(15, 0),
        MouseEventKind::Down(MouseButton::Left) => {
            app.last_mouse = Some((mouse.column, mouse.row));
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            app.handle_drag(mouse.column, mouse.row);
        }
        MouseEventKind::Up(MouseButton::Left) => {
            app.end_drag();
        }
        _ => {}
    }
}
