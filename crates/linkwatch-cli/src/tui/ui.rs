//! TUI rendering: live view.
//!
//! ┌ linkwatch ───────────────────────────────────────────────┐
//! │ Interface: wlan0  Band: 5GHz  Ch: 36  SSID: Home         │
//! └──────────────────────────────────────────────────────────┘
//! ┌ Signal ──────────────────────────────────────────────────┐
//! │  Signal ▕▆▆▆▆▆▆▆▆▆▆▆▆▆▆▆▆▆▆▆▆▆▆▆▆▆▆▆▆▆▆▏  -30 dBm        │
//! └──────────────────────────────────────────────────────────┘
//! ┌ Ping ────────────────────────────────────────────────────┐
//! │ gateway ▕▁▁▁▁▁▁▁▁▁▁▁▁▁▁▁▁▁▁▁▁▁▁▁▁▁▁▁▁▁▁▏  200 ms         │
//! │internet ▕▁▁▁▁▁▁▁▁▁▁▁▁▁▁▁▁▁▁▁▁▁▁▁▁▁▁▁▁▁▁▏  200 ms         │
//! └──────────────────────────────────────────────────────────┘
//! ┌ Data Rates ──────────────────────────────────────────────┐
//! │   RX/TX ▕▇▇▇▇▇▇▇▇▇▇▇▇▇▇▇▇▇▇▇▇▇▇▇▇▇▇▇▇▇▇▏  500 Mbps       │
//! │          ▋ RX ▋ TX                                       │
//! └──────────────────────────────────────────────────────────┘
//!         10m  [30m]  60m   4h   1D   7D
//!   [q] quit  [h] heatmap  [p] pause  [+/-] window

use ratatui::{prelude::*, widgets::*};

use linkwatch_core::config::WINDOW_PRESETS;
use linkwatch_core::palette::{
    LATENCY_SCALE, SIGNAL_SCALE, latency_tone, signal_quality, signal_tone, throughput_scale,
};
use linkwatch_core::sparkline::{self, Cell, Scale};
use linkwatch_core::{HostStatus, LiveSnapshot, Severity, Tone, bucket_by_time};

use super::app::{App, ChartStyle, PromptKind, View};

/// Columns reserved left of every chart for its label.
pub const LABEL_WIDTH: usize = 8;
/// Columns reserved right of every chart for its scale.
pub const SCALE_WIDTH: usize = 12;

pub fn draw(f: &mut Frame, app: &App) {
    match app.view() {
        View::Live => draw_live(f, app),
        View::Heatmap => super::heatmap_view::draw(f, app),
    }
}

/// Chart geometry shared by every live panel so their time axes line up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartLayout {
    pub bucket_count: usize,
    pub chart_height: usize,
}

pub fn chart_layout(width: u16, height: u16, hosts: usize) -> ChartLayout {
    let inner = (width as usize).saturating_sub(2);
    let bucket_count = inner.saturating_sub(LABEL_WIDTH + SCALE_WIDTH + 2).max(1);

    let ping_rows = hosts.max(1);
    // header, status, help, three panel borders, gaps between hosts, rates legend
    let reserved = 3 + 1 + 1 + 6 + (ping_rows - 1) + 1;
    let available = (height as usize).saturating_sub(reserved);
    let chart_height = (available / (2 + ping_rows)).max(1);

    ChartLayout {
        bucket_count,
        chart_height,
    }
}

fn draw_live(f: &mut Frame, app: &App) {
    let snap = app.snapshot();
    let area = f.area();
    let layout = chart_layout(area.width, area.height, snap.hosts.len());
    let h = layout.chart_height as u16;
    let hosts = snap.hosts.len() as u16;
    let ping_height = if hosts == 0 { 1 } else { hosts * h + hosts - 1 };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),               // header
            Constraint::Length(h + 2),           // signal
            Constraint::Length(ping_height + 2), // ping
            Constraint::Length(h + 3),           // rates + legend
            Constraint::Length(1),               // status
            Constraint::Length(1),               // keys
            Constraint::Min(0),
        ])
        .split(area);

    draw_header(f, rows[0], app, &snap);
    draw_signal(f, rows[1], app, &snap, layout);
    draw_ping(f, rows[2], app, &snap, layout);
    draw_rates(f, rows[3], app, &snap, layout);
    draw_status(f, rows[4], app, &snap);
    draw_keys(f, rows[5], View::Live);
}

fn draw_header(f: &mut Frame, area: Rect, app: &App, snap: &LiveSnapshot) {
    let link = snap.link.as_ref();
    let band = link
        .and_then(|l| l.band())
        .map_or_else(|| "?".to_string(), |b| b.to_string());
    let channel = link
        .and_then(|l| l.channel())
        .map_or_else(|| "?".to_string(), |c| c.to_string());
    let ssid = link.and_then(|l| l.ssid.clone()).unwrap_or_else(|| "N/A".into());

    let dim = Style::default().fg(Color::DarkGray);
    let mut spans = vec![
        Span::styled(" Interface: ", dim),
        Span::styled(
            app.monitor().config().interface.clone(),
            Style::default().bold().fg(Color::Cyan),
        ),
        Span::styled("  Band: ", dim),
        Span::styled(band, Style::default().bold().fg(Color::Yellow)),
        Span::styled("  Ch: ", dim),
        Span::styled(channel, Style::default().bold().fg(Color::Green)),
        Span::styled("  SSID: ", dim),
        Span::styled(ssid, Style::default().bold().fg(Color::White)),
    ];

    let signal = link.and_then(|l| l.signal_dbm);
    let (word, severity) = signal_quality(signal);
    spans.push(Span::raw("  "));
    if let Some(dbm) = signal {
        spans.push(Span::styled(
            format!("{dbm:.0} dBm "),
            Style::default().fg(severity_color(severity)),
        ));
    }
    spans.push(Span::styled(word, Style::default().bold().fg(severity_color(severity))));
    if link.is_none()
        && let Some(reason) = &snap.signal_error
    {
        spans.push(Span::styled(format!("  ({reason})"), dim));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue))
        .title(Span::styled(
            " linkwatch ",
            Style::default().bold().fg(Color::Cyan),
        ));
    f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn draw_signal(f: &mut Frame, area: Rect, app: &App, snap: &LiveSnapshot, layout: ChartLayout) {
    let block = panel(" Signal ", Color::Cyan);
    let chart = series_chart(
        app,
        snap,
        snap.view.signal.values(),
        layout,
        SIGNAL_SCALE,
        signal_tone,
        "dBm",
    );
    let lines = match chart {
        Some(chart) => chart_lines("Signal", Style::default().bold().fg(Color::Cyan), chart),
        None => vec![placeholder("No history data")],
    };
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_ping(f: &mut Frame, area: Rect, app: &App, snap: &LiveSnapshot, layout: ChartLayout) {
    let block = panel(" Ping ", Color::Yellow);
    if snap.hosts.is_empty() {
        f.render_widget(
            Paragraph::new(placeholder("No ping hosts, press [a] to add one")).block(block),
            area,
        );
        return;
    }

    let numbered = app
        .prompt()
        .is_some_and(|p| p.kind == PromptKind::DeleteHost);
    let mut lines = Vec::new();
    for (i, host) in snap.hosts.iter().enumerate() {
        if i > 0 {
            lines.push(Line::default());
        }
        let label = host_label(host, numbered.then_some(i + 1));
        let values = snap.view.host(host.id).map(|s| s.values()).unwrap_or(&[]);
        let chart = series_chart(app, snap, values, layout, LATENCY_SCALE, latency_tone, "ms");
        match chart {
            Some(chart) => lines.extend(chart_lines(
                &label,
                Style::default().bold().fg(Color::Yellow),
                chart,
            )),
            None => {
                let reason = host
                    .last_error
                    .clone()
                    .unwrap_or_else(|| "waiting for replies".into());
                lines.push(Line::from(vec![
                    Span::styled(
                        format!("{label:>LABEL_WIDTH$} "),
                        Style::default().bold().fg(Color::Yellow),
                    ),
                    Span::styled(reason, Style::default().fg(Color::DarkGray)),
                ]));
                lines.extend((1..layout.chart_height).map(|_| Line::default()));
            }
        }
    }
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_rates(f: &mut Frame, area: Rect, app: &App, snap: &LiveSnapshot, layout: ChartLayout) {
    let block = panel(" Data Rates ", Color::Green);
    let window = app.window_secs() as f64;
    let now = app.now();
    let rx = bucket_by_time(
        snap.view.rx.values(),
        &snap.view.time,
        window,
        layout.bucket_count,
        now,
    );
    let tx = bucket_by_time(
        snap.view.tx.values(),
        &snap.view.time,
        window,
        layout.bucket_count,
        now,
    );

    if rx.iter().chain(&tx).all(Option::is_none) {
        let reason = snap.rates_error.as_deref().unwrap_or("No rate data");
        f.render_widget(Paragraph::new(placeholder(reason)).block(block), area);
        return;
    }

    let both: Vec<Option<f64>> = rx.iter().chain(&tx).copied().collect();
    let scale = throughput_scale(&both);
    let rows = sparkline::overlay_chart(&rx, &tx, layout.chart_height, scale);
    let chart = Chart {
        rows,
        top: format!("{:>5.0} Mbps", scale.max),
        bottom: format!("{:>5.0}", scale.min),
    };
    let mut lines = chart_lines("RX/TX", Style::default().bold().fg(Color::White), chart);

    let mut legend = vec![
        Span::raw(" ".repeat(LABEL_WIDTH + 2)),
        Span::styled("▋ RX ", Style::default().fg(tone_color(Tone::Top))),
        Span::styled("▋ TX", Style::default().fg(tone_color(Tone::Base))),
    ];
    if let Some(link) = &snap.link {
        let fmt = |v: Option<f64>| v.map_or_else(|| "--".to_string(), |v| format!("{v:.0}"));
        legend.push(Span::styled(
            format!(
                "    {} / {} Mbps  {} MHz",
                fmt(link.rx_mbps),
                fmt(link.tx_mbps),
                fmt(link.width_mhz)
            ),
            Style::default().fg(Color::DarkGray),
        ));
    }
    lines.push(Line::from(legend));
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_status(f: &mut Frame, area: Rect, app: &App, snap: &LiveSnapshot) {
    if let Some(prompt) = app.prompt() {
        let line = Line::from(vec![
            Span::styled(prompt.question(), Style::default().fg(Color::Cyan)),
            Span::styled(prompt.input.clone(), Style::default().bold()),
            Span::styled("█", Style::default().fg(Color::Cyan)),
            Span::styled(
                "   (Enter to confirm, Esc to cancel)",
                Style::default().fg(Color::DarkGray),
            ),
        ]);
        f.render_widget(Paragraph::new(line), area);
        return;
    }

    let mut spans = Vec::new();
    for (label, secs) in WINDOW_PRESETS {
        if secs == app.window_secs() {
            spans.push(Span::styled(
                format!("[{label}]"),
                Style::default().bold().fg(Color::Cyan),
            ));
        } else {
            spans.push(Span::styled(
                format!(" {label} "),
                Style::default().fg(Color::DarkGray),
            ));
        }
    }
    spans.push(Span::raw("    "));
    if snap.paused {
        spans.push(Span::styled(
            " PAUSED ",
            Style::default().bold().fg(Color::Red).bg(Color::White),
        ));
        spans.push(Span::raw("  "));
    }
    if snap.scanning {
        spans.push(Span::styled("scanning… ", Style::default().fg(Color::Yellow)));
    }
    if let Some(status) = app.status() {
        spans.push(Span::styled(
            status.to_string(),
            Style::default().fg(Color::DarkGray),
        ));
    }
    f.render_widget(
        Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
        area,
    );
}

pub(super) fn draw_keys(f: &mut Frame, area: Rect, view: View) {
    let keys: &[(&str, &str)] = match view {
        View::Live => &[
            ("q", "quit"),
            ("h", "heatmap"),
            ("p", "pause"),
            ("+/-", "window"),
            ("a", "add host"),
            ("d", "del host"),
            ("g", "chart style"),
        ],
        View::Heatmap => &[
            ("q", "quit"),
            ("l", "live"),
            ("7/1/3", "7/14/30 days"),
            ("2/5", "band"),
            ("s", "scan now"),
        ],
    };
    let mut spans = Vec::new();
    for (i, (key, desc)) in keys.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(
            format!("[{key}]"),
            Style::default().bold().fg(Color::Cyan),
        ));
        spans.push(Span::styled(
            format!(" {desc}"),
            Style::default().fg(Color::DarkGray),
        ));
    }
    f.render_widget(
        Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
        area,
    );
}

// ---------------------------------------------------------------------------
// Chart helpers
// ---------------------------------------------------------------------------

/// Glyph rows plus the scale labels printed beside the top and bottom rows.
struct Chart {
    rows: Vec<Vec<Cell>>,
    top: String,
    bottom: String,
}

/// Bucket one series over the current window and render it in the active
/// chart style. `None` when the window holds no present value.
fn series_chart(
    app: &App,
    snap: &LiveSnapshot,
    values: &[Option<f64>],
    layout: ChartLayout,
    fixed: Scale,
    tone: fn(f64) -> Tone,
    unit: &str,
) -> Option<Chart> {
    let window = app.window_secs() as f64;
    let now = app.now();

    match app.chart_style() {
        ChartStyle::Blocks => {
            let buckets = bucket_by_time(values, &snap.view.time, window, layout.bucket_count, now);
            if buckets.iter().all(Option::is_none) {
                return None;
            }
            let rows = if layout.chart_height == 1 {
                vec![sparkline::single_row(&buckets, fixed, tone)]
            } else {
                sparkline::block_chart(&buckets, layout.chart_height, fixed, tone)
            };
            Some(Chart {
                rows,
                top: format!("{:>5.0} {unit}", fixed.max),
                bottom: format!("{:>5.0}", fixed.min),
            })
        }
        ChartStyle::Dots => {
            // Two time columns per braille glyph.
            let buckets = bucket_by_time(
                values,
                &snap.view.time,
                window,
                layout.bucket_count * 2,
                now,
            );
            let observed = Scale::from_data(&buckets)?;
            Some(Chart {
                rows: sparkline::dot_line_chart(&buckets, layout.chart_height, tone),
                top: format!("{:>5.0} {unit}", observed.max),
                bottom: format!("{:>5.0}", observed.min),
            })
        }
    }
}

/// Label column, framed glyph rows and scale column.
fn chart_lines(label: &str, label_style: Style, chart: Chart) -> Vec<Line<'static>> {
    let height = chart.rows.len();
    let dim = Style::default().fg(Color::DarkGray);
    chart
        .rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            let mut spans = Vec::with_capacity(row.len() + 4);
            if i == 0 {
                spans.push(Span::styled(format!("{label:>LABEL_WIDTH$} "), label_style));
            } else {
                spans.push(Span::raw(" ".repeat(LABEL_WIDTH + 1)));
            }
            spans.push(Span::styled("▕", dim));
            spans.extend(cell_spans(&row));
            let scale = if i == 0 {
                chart.top.clone()
            } else if i + 1 == height {
                chart.bottom.clone()
            } else {
                String::new()
            };
            spans.push(Span::styled(format!("▏{scale}"), dim));
            Line::from(spans)
        })
        .collect()
}

/// Merge runs of same-toned cells into one span each.
pub(super) fn cell_spans(row: &[Cell]) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    let mut run = String::new();
    let mut run_tone: Option<Tone> = None;
    for cell in row {
        if run_tone.is_some_and(|t| t != cell.tone) {
            spans.push(toned_span(std::mem::take(&mut run), run_tone));
        }
        run_tone = Some(cell.tone);
        run.push(cell.symbol);
    }
    if !run.is_empty() {
        spans.push(toned_span(run, run_tone));
    }
    spans
}

fn toned_span(text: String, tone: Option<Tone>) -> Span<'static> {
    let tone = tone.unwrap_or(Tone::Dim);
    Span::styled(text, Style::default().fg(tone_color(tone)))
}

fn host_label(host: &HostStatus, number: Option<usize>) -> String {
    let label = match number {
        Some(n) => format!("{n}:{}", host.label),
        None => host.label.clone(),
    };
    label.chars().take(LABEL_WIDTH).collect()
}

fn panel(title: &str, color: Color) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(title)
}

fn placeholder(text: &str) -> Line<'static> {
    Line::from(Span::styled(
        format!("  {text}"),
        Style::default().fg(Color::DarkGray),
    ))
}

pub(super) fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Good => Color::Green,
        Severity::Fair => Color::Yellow,
        Severity::Degraded => Color::Rgb(255, 135, 0),
        Severity::Bad => Color::Red,
    }
}

pub(super) fn tone_color(tone: Tone) -> Color {
    match tone {
        Tone::Dim => Color::DarkGray,
        Tone::Severity(s) => severity_color(s),
        Tone::Top => Color::Green,
        Tone::Base => Color::Blue,
        Tone::Plain => Color::Cyan,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::testing::test_app;
    use ratatui::backend::TestBackend;

    fn render(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..height {
            for x in 0..width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    // -----------------------------------------------------------------------
    // Layout
    // -----------------------------------------------------------------------

    #[test]
    fn layout_fills_panel_width() {
        let layout = chart_layout(100, 40, 2);
        // 98 inner columns minus label, scale and the two frame glyphs.
        assert_eq!(layout.bucket_count, 76);
        // 40 - (3 + 1 + 1 + 6 + 1 + 1) = 27 rows over 4 charts.
        assert_eq!(layout.chart_height, 6);
    }

    #[test]
    fn layout_never_collapses_to_zero() {
        let layout = chart_layout(10, 5, 6);
        assert_eq!(layout.bucket_count, 1);
        assert_eq!(layout.chart_height, 1);
    }

    #[test]
    fn layout_without_hosts_reserves_one_ping_row() {
        assert_eq!(chart_layout(80, 30, 0), chart_layout(80, 30, 1));
    }

    // -----------------------------------------------------------------------
    // Spans and colors
    // -----------------------------------------------------------------------

    #[test]
    fn cell_spans_merge_runs_of_one_tone() {
        let good = Tone::Severity(Severity::Good);
        let row = [
            Cell::new('▁', good),
            Cell::new('▂', good),
            Cell::new('█', Tone::Top),
            Cell::BLANK,
        ];
        let spans = cell_spans(&row);
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[0].content, "▁▂");
        assert_eq!(spans[0].style.fg, Some(Color::Green));
        assert_eq!(spans[1].style.fg, Some(Color::Green));
        assert_eq!(spans[2].style.fg, Some(Color::DarkGray));
    }

    #[test]
    fn overlay_tones_use_distinct_colors() {
        assert_ne!(tone_color(Tone::Top), tone_color(Tone::Base));
        assert_eq!(tone_color(Tone::Dim), Color::DarkGray);
    }

    #[test]
    fn numbered_labels_are_truncated() {
        let host = HostStatus {
            id: 1,
            host: "192.168.100.254".into(),
            label: "192.168.100.254".into(),
            latest: None,
            last_error: None,
        };
        assert_eq!(host_label(&host, Some(3)), "3:192.16");
        assert_eq!(host_label(&host, None), "192.168.");
    }

    // -----------------------------------------------------------------------
    // Full frame
    // -----------------------------------------------------------------------

    #[test]
    fn live_view_renders_header_and_panels() {
        let tmp = tempfile::tempdir().unwrap();
        let app = test_app(tmp.path());
        for _ in 0..3 {
            app.monitor().collector().sample_tick(linkwatch_core::unix_now());
        }

        let screen = render(&app, 100, 30);
        assert!(screen.contains("Interface: wlan-test"));
        assert!(screen.contains("Band: 5GHz"));
        assert!(screen.contains("Ch: 36"));
        assert!(screen.contains("SSID: Studio"));
        assert!(screen.contains("-58 dBm Good"));
        assert!(screen.contains("-30 dBm"));
        assert!(screen.contains("500 Mbps"));
        assert!(screen.contains("No ping hosts"));
        assert!(screen.contains("[10m]"));
        assert!(screen.contains("[q] quit"));
    }

    #[test]
    fn empty_store_shows_placeholders() {
        let tmp = tempfile::tempdir().unwrap();
        let app = test_app(tmp.path());
        let screen = render(&app, 100, 30);
        assert!(screen.contains("No history data"));
        assert!(screen.contains("No rate data"));
        assert!(screen.contains("SSID: N/A"));
    }
}
