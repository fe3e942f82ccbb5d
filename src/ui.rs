use crate::app::App;
use crate::braille::BrailleCanvas;
use crate::map::ChoroplethMap;
use crate::metric::Metric;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Bar, BarChart, BarGroup, Block, Borders, Gauge, List, ListItem, ListState, Paragraph, Row,
        Table, Widget, Wrap,
    },
    Frame,
};

pub const SIDEBAR_WIDTH: u16 = 36;
const COUNTRY_LIST_WIDTH: u16 = 26;
const DETAIL_HEIGHT: u16 = 13;
const CHART_HEIGHT: u16 = 12;

/// Pane rectangles for one frame. Mouse handling and rendering both derive
/// from this, so a click lands where the map was actually drawn.
pub struct DashboardLayout {
    pub sidebar: Rect,
    pub map: Rect,
    pub list: Rect,
    pub detail: Rect,
    /// Present only when the Population metric is active
    pub chart: Option<Rect>,
    pub status: Rect,
}

pub fn dashboard_layout(area: Rect, metric: Metric) -> DashboardLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)])
        .split(rows[0]);

    let with_chart = metric == Metric::Population;
    let main_constraints: Vec<Constraint> = if with_chart {
        vec![
            Constraint::Min(8),
            Constraint::Length(DETAIL_HEIGHT),
            Constraint::Length(CHART_HEIGHT),
        ]
    } else {
        vec![Constraint::Min(8), Constraint::Length(DETAIL_HEIGHT)]
    };
    let main = Layout::default()
        .direction(Direction::Vertical)
        .constraints(main_constraints)
        .split(cols[1]);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(COUNTRY_LIST_WIDTH), Constraint::Min(20)])
        .split(main[1]);

    DashboardLayout {
        sidebar: cols[0],
        map: main[0],
        list: bottom[0],
        detail: bottom[1],
        chart: with_chart.then(|| main[2]),
        status: rows[1],
    }
}

/// Render the whole dashboard. Everything shown is a pure function of the
/// loaded data plus the current selection.
pub fn render(frame: &mut Frame, app: &App) {
    let layout = dashboard_layout(frame.area(), app.metric);

    let unmatched = render_map(frame, app, layout.map);
    render_sidebar(frame, app, layout.sidebar, &unmatched);
    render_country_list(frame, app, layout.list);
    render_detail(frame, app, layout.detail);
    if let Some(chart) = layout.chart {
        render_leaderboard(frame, app, chart);
    }
    render_status_bar(frame, app, layout.status, unmatched.len());
}

/// Draw the choropleth and return the filtered countries that had no
/// geometry to paint.
fn render_map(frame: &mut Frame, app: &App, area: Rect) -> Vec<String> {
    let spec = app.metric.spec();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" {} ", spec.title),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if app.shapes.is_empty() {
        let hint = Paragraph::new("No country geometry loaded.\nPass --geometry <file.geojson>.")
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: true });
        frame.render_widget(hint, inner);
        return Vec::new();
    }

    let mut viewport = app.viewport.clone();
    viewport.width = inner.width as usize * 2;
    viewport.height = inner.height as usize * 4;

    let mut canvas = BrailleCanvas::new(inner.width as usize, inner.height as usize);
    let choropleth = ChoroplethMap::new(&app.shapes);

    choropleth.draw_outlines(&mut canvas, &viewport);
    let rows = app.filtered_rows();
    let unmatched = choropleth.fill(
        &mut canvas,
        &viewport,
        &rows,
        (spec.scale_low, spec.scale_high),
    );
    if app.selected_record().is_some() {
        choropleth.highlight(&mut canvas, &viewport, app.selected_country());
    }

    frame.render_widget(CanvasWidget { canvas }, inner);
    unmatched
}

/// Blits a braille canvas into the frame buffer, one colored cell at a time
struct CanvasWidget {
    canvas: BrailleCanvas,
}

impl Widget for CanvasWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for cy in 0..self.canvas.height().min(area.height as usize) {
            for cx in 0..self.canvas.width().min(area.width as usize) {
                if let Some((ch, color)) = self.canvas.cell(cx, cy) {
                    let x = area.x + cx as u16;
                    let y = area.y + cy as u16;
                    buf[(x, y)].set_char(ch).set_fg(color);
                }
            }
        }
    }
}

fn render_sidebar(frame: &mut Frame, app: &App, area: Rect, unmatched: &[String]) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Length(4),
            Constraint::Min(6),
            Constraint::Length(if app.show_warnings { 8 } else { 3 }),
        ])
        .split(area);

    render_metric_selector(frame, app, sections[0]);
    render_threshold(frame, app, sections[1]);
    render_description(frame, app, sections[2]);
    render_warnings(frame, app, sections[3], unmatched);
}

fn render_metric_selector(frame: &mut Frame, app: &App, area: Rect) {
    let lines: Vec<Line> = Metric::ALL
        .iter()
        .enumerate()
        .map(|(i, &m)| {
            let style = if m == app.metric {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            Line::from(Span::styled(format!("{} {}", i + 1, m.label()), style))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Metric ");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_threshold(frame: &mut Frame, app: &App, area: Rect) {
    let (min, max) = app.bounds();
    let span = max - min;
    let ratio = if span <= f64::EPSILON {
        1.0
    } else {
        ((app.threshold - min) / span).clamp(0.0, 1.0)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(format!(" Filter by {} ", app.metric.label()));
    let gauge = Gauge::default()
        .block(block)
        .gauge_style(Style::default().fg(Color::Cyan).bg(Color::Black))
        .ratio(ratio)
        .label(format!(
            ">= {}  [{} .. {}]",
            format_value(app.metric, app.threshold),
            format_value(app.metric, min),
            format_value(app.metric, max),
        ));
    frame.render_widget(gauge, area);
}

fn render_description(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" App Features ");
    let text = Paragraph::new(app.metric.description())
        .style(Style::default().fg(Color::Gray))
        .wrap(Wrap { trim: true })
        .block(block);
    frame.render_widget(text, area);
}

fn render_warnings(frame: &mut Frame, app: &App, area: Rect, unmatched: &[String]) {
    let title = format!(" Unmatched countries: {} [w] ", unmatched.len());
    let style = if unmatched.is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::Yellow)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(title, style));

    let body = if app.show_warnings {
        unmatched.join(", ")
    } else {
        String::new()
    };
    let text = Paragraph::new(body)
        .style(Style::default().fg(Color::Yellow))
        .wrap(Wrap { trim: true })
        .block(block);
    frame.render_widget(text, area);
}

fn render_country_list(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .dataset
        .records()
        .iter()
        .map(|r| ListItem::new(r.country.clone()))
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Highlight [↑/↓] ");
    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("» ");

    let mut state = ListState::default().with_selected(Some(app.country_idx));
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_detail(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(format!(" Data for Selected Country: {} ", app.selected_country()));

    let Some(record) = app.selected_record() else {
        let msg = Paragraph::new("No data available for the selected country.")
            .style(Style::default().fg(Color::Yellow))
            .block(block);
        frame.render_widget(msg, area);
        return;
    };

    let mut rows = vec![
        detail_row("Country", record.country.clone()),
        detail_row("Population", group_thousands(record.population)),
        detail_row("Forested Area (%)", format!("{:.1}%", record.forested_area_pct)),
        detail_row("CO2 Emissions", group_thousands(record.co2_emissions)),
        detail_row("Urban population", group_thousands(record.urban_population)),
    ];
    for (field, value) in &record.extra {
        rows.push(detail_row(field, value.clone()));
    }

    let table = Table::new(rows, [Constraint::Length(22), Constraint::Min(10)]).block(block);
    frame.render_widget(table, area);
}

fn detail_row<'a>(field: &'a str, value: String) -> Row<'a> {
    Row::new(vec![
        Span::styled(field, Style::default().fg(Color::Cyan)),
        Span::raw(value),
    ])
}

fn render_leaderboard(frame: &mut Frame, app: &App, area: Rect) {
    let records = app.dataset.records();
    let bars: Vec<Bar> = app
        .leaderboard()
        .into_iter()
        .map(|i| {
            let r = &records[i];
            Bar::default()
                .label(Line::from(truncate(&r.country, 7)))
                .value(r.urban_population as u64)
                // Total population in millions stands in for the hover box
                .text_value(millions_label(r.population))
                .style(Style::default().fg(Color::Blue))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Top 15 Countries by Urban Population ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));
    let chart = BarChart::default()
        .block(block)
        .bar_width(8)
        .bar_gap(1)
        .data(BarGroup::default().bars(&bars));
    frame.render_widget(chart, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect, unmatched: usize) {
    let status = Line::from(vec![
        Span::styled(" Zoom: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.center_coords(), Style::default().fg(Color::Cyan)),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.metric.label(), Style::default().fg(Color::Magenta)),
        Span::styled(
            format!(" >= {}", format_value(app.metric, app.threshold)),
            Style::default().fg(Color::Gray),
        ),
        Span::styled(
            if unmatched > 0 {
                format!(" | {unmatched} unmatched")
            } else {
                String::new()
            },
            Style::default().fg(Color::Yellow),
        ),
        Span::styled(
            " | 1-3:metric [/]:filter ↑/↓:country hjkl:pan +/-:zoom 0:reset q:quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(status), area);
}

/// "2.00M"-style label for populations shown on leaderboard bars
pub fn millions_label(value: f64) -> String {
    format!("{:.2}M", value / 1_000_000.0)
}

/// Insert `,` thousands separators; fractions are dropped since the cleaned
/// columns this formats are whole counts
pub fn group_thousands(value: f64) -> String {
    // Round first so values like -0.4 print as "0", not "-0"
    let rounded = value.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if negative {
        format!("-{out}")
    } else {
        out
    }
}

fn format_value(metric: Metric, value: f64) -> String {
    match metric {
        Metric::ForestedArea => format!("{value:.1}%"),
        _ => group_thousands(value),
    }
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_millions_label() {
        assert_eq!(millions_label(2_000_000.0), "2.00M");
        assert_eq!(millions_label(37_400_000.0), "37.40M");
        assert_eq!(millions_label(500_000.0), "0.50M");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0.0), "0");
        assert_eq!(group_thousands(999.0), "999");
        assert_eq!(group_thousands(1_234_567.0), "1,234,567");
        assert_eq!(group_thousands(-45_000.0), "-45,000");
    }

    #[test]
    fn test_group_thousands_near_zero_negative() {
        assert_eq!(group_thousands(-0.4), "0");
        assert_eq!(group_thousands(-0.0), "0");
        assert_eq!(group_thousands(-1.4), "-1");
    }

    #[test]
    fn test_chart_pane_only_for_population() {
        let area = Rect::new(0, 0, 160, 50);
        assert!(dashboard_layout(area, Metric::Population).chart.is_some());
        assert!(dashboard_layout(area, Metric::ForestedArea).chart.is_none());
        assert!(dashboard_layout(area, Metric::Co2Emissions).chart.is_none());
    }

    #[test]
    fn test_layout_panes_do_not_overlap_sidebar() {
        let area = Rect::new(0, 0, 160, 50);
        let layout = dashboard_layout(area, Metric::Population);
        assert_eq!(layout.sidebar.width, SIDEBAR_WIDTH);
        assert!(layout.map.x >= SIDEBAR_WIDTH);
        assert!(layout.list.x >= SIDEBAR_WIDTH);
        assert_eq!(layout.status.height, 1);
    }
}
