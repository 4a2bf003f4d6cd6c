//! TUI rendering: channel congestion heatmap.
//!
//! One row per day (newest on top), one column per channel of the band. Each
//! cell shades the day's representative occupancy count.

use ratatui::{prelude::*, widgets::*};

use linkwatch_core::palette::{format_duration, occupancy_glyph};
use linkwatch_core::{HeatmapGrid, Severity, Tone, unix_now};

use super::app::{App, View};
use super::ui::{draw_keys, severity_color, tone_color};

const DATE_WIDTH: u16 = 6;

pub fn draw(f: &mut Frame, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),    // grid
            Constraint::Length(1), // legend
            Constraint::Length(1), // last scan
            Constraint::Length(1), // keys
        ])
        .split(f.area());

    draw_grid(f, rows[0], app);
    draw_legend(f, rows[1]);
    draw_info(f, rows[2], app);
    draw_keys(f, rows[3], View::Heatmap);
}

fn draw_grid(f: &mut Frame, area: Rect, app: &App) {
    let state = app.heatmap();
    let title = match state.band {
        Some(band) => format!(" Channel Heatmap ({band}) - Last {} days ", state.days),
        None => format!(" Channel Heatmap - Last {} days ", state.days),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue))
        .title(title);

    let Some(grid) = state.grid.as_ref().filter(|g| !g.is_empty()) else {
        let text = Line::from(Span::styled(
            "No scan data available. Press 's' to scan.",
            Style::default().fg(Color::DarkGray),
        ));
        f.render_widget(Paragraph::new(text).block(block), area);
        return;
    };

    let inner_height = area.height.saturating_sub(2);
    let row_height = row_height(inner_height, grid.dates.len());
    f.render_widget(grid_table(grid, row_height).block(block), area);
}

/// Stretch rows to fill the panel, up to three lines per day.
fn row_height(inner_height: u16, days: usize) -> u16 {
    let days = days.max(1) as u16;
    (inner_height.saturating_sub(1) / days).clamp(1, 3)
}

fn grid_table(grid: &HeatmapGrid, row_height: u16) -> Table<'static> {
    let header = Row::new(
        std::iter::once(Cell::from(""))
            .chain(grid.channels.iter().map(|ch| {
                Cell::from(Line::from(ch.to_string()).alignment(Alignment::Center))
            })),
    )
    .style(Style::default().bold().fg(Color::Cyan));

    let rows: Vec<Row> = grid
        .rows_newest_first()
        .map(|(date, counts)| {
            let mut cells = vec![Cell::from(Text::from(
                std::iter::once(Line::from(date.format("%m/%d").to_string()))
                    .chain((1..row_height).map(|_| Line::default()))
                    .collect::<Vec<_>>(),
            ))
            .style(Style::default().fg(Color::DarkGray))];
            cells.extend(counts.iter().map(|count| {
                let (glyph, tone) = occupancy_glyph(*count);
                let line = Line::from(glyph.to_string()).alignment(Alignment::Center);
                Cell::from(Text::from(vec![line; row_height as usize]))
                    .style(Style::default().fg(tone_color(tone)))
            }));
            Row::new(cells).height(row_height)
        })
        .collect();

    let widths = std::iter::once(Constraint::Length(DATE_WIDTH))
        .chain(grid.channels.iter().map(|_| Constraint::Fill(1)));

    Table::new(rows, widths).header(header).column_spacing(1)
}

fn draw_legend(f: &mut Frame, area: Rect) {
    let dim = Style::default().fg(Color::DarkGray);
    let swatch = |severity: Severity| Style::default().fg(severity_color(severity));
    let line = Line::from(vec![
        Span::styled("Legend: ", dim),
        Span::styled("░", Style::default().fg(tone_color(Tone::Dim))),
        Span::styled(" none  ", dim),
        Span::styled("░", swatch(Severity::Good)),
        Span::styled(" clear  ", dim),
        Span::styled("▒", swatch(Severity::Fair)),
        Span::styled(" light  ", dim),
        Span::styled("▓", swatch(Severity::Degraded)),
        Span::styled(" moderate  ", dim),
        Span::styled("█", swatch(Severity::Bad)),
        Span::styled(" congested", dim),
    ]);
    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn draw_info(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = Vec::new();
    match app.heatmap().last_scan {
        Some(ts) => spans.push(Span::styled(
            format!(
                "Last scan: {} ago",
                format_duration(unix_now() - ts as f64)
            ),
            Style::default().fg(Color::DarkGray),
        )),
        None => spans.push(Span::styled(
            "No scan data",
            Style::default().fg(Color::Red),
        )),
    }
    if app.monitor().scanner().is_scanning() {
        spans.push(Span::styled("   scanning…", Style::default().fg(Color::Yellow)));
    } else if let Some(status) = app.status() {
        spans.push(Span::styled(
            format!("   {status}"),
            Style::default().fg(Color::DarkGray),
        ));
    }
    f.render_widget(
        Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
        area,
    );
}
