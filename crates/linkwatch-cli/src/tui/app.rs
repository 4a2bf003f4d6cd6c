//! TUI application state and event loop.
//!
//! Sampling, pinging and scanning all run on the monitor's own threads. This
//! loop only copies a snapshot per frame, draws it and turns key presses into
//! monitor commands, so a slow probe never blocks input.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;

use linkwatch_core::config::{narrower_window, wider_window};
use linkwatch_core::{
    Band, HeatmapGrid, LiveSnapshot, Monitor, ScanError, ScanOutcome, scan_store, unix_now,
};

// ---------------------------------------------------------------------------
// View state
// ---------------------------------------------------------------------------

/// Which screen is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Live,
    Heatmap,
}

/// How the signal and latency charts are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartStyle {
    /// Filled vertical bars.
    #[default]
    Blocks,
    /// Braille line.
    Dots,
}

impl ChartStyle {
    pub fn toggle(self) -> Self {
        match self {
            Self::Blocks => Self::Dots,
            Self::Dots => Self::Blocks,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Blocks => "bars",
            Self::Dots => "line",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    AddHost,
    DeleteHost,
}

/// Inline text input shown in the status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub kind: PromptKind,
    pub input: String,
}

impl Prompt {
    pub fn question(&self) -> &'static str {
        match self.kind {
            PromptKind::AddHost => "Host to ping (IP or hostname): ",
            PromptKind::DeleteHost => "Number of host to remove: ",
        }
    }
}

/// Heatmap parameters and the last grid built from them.
#[derive(Debug, Clone)]
pub struct HeatmapState {
    pub days: u32,
    /// `None` until resolved from the current association.
    pub band: Option<Band>,
    pub grid: Option<HeatmapGrid>,
    pub last_scan: Option<i64>,
    generation: u64,
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    monitor: Arc<Monitor>,
    running: bool,
    view: View,
    window_secs: u64,
    /// Frozen "now" while paused.
    paused_at: Option<f64>,
    chart_style: ChartStyle,
    prompt: Option<Prompt>,
    status: Option<String>,
    heatmap: HeatmapState,
}

impl App {
    pub fn new(monitor: Arc<Monitor>) -> Self {
        let window_secs = monitor.config().default_window_secs;
        let days = monitor.config().heatmap_days;
        Self {
            monitor,
            running: true,
            view: View::Live,
            window_secs,
            paused_at: None,
            chart_style: ChartStyle::default(),
            prompt: None,
            status: None,
            heatmap: HeatmapState {
                days,
                band: None,
                grid: None,
                last_scan: None,
                generation: 0,
            },
        }
    }

    pub fn run(&mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Restore the terminal before the default hook prints the panic.
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show);
            original_hook(info);
        }));

        let result = self.run_loop(&mut terminal);

        let _ = std::panic::take_hook();
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            crossterm::cursor::Show
        )?;

        result
    }

    fn run_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> io::Result<()> {
        while self.running {
            self.refresh_heatmap_if_stale();
            terminal.draw(|f| super::ui::draw(f, self))?;

            if event::poll(Duration::from_millis(50))?
                && let Event::Key(key) = event::read()?
                && key.kind == KeyEventKind::Press
            {
                self.handle_key(key.code);
            }
        }

        Ok(())
    }

    pub(super) fn handle_key(&mut self, key: KeyCode) {
        if self.prompt.is_some() {
            self.handle_prompt_key(key);
            return;
        }
        match self.view {
            View::Live => self.handle_live_key(key),
            View::Heatmap => self.handle_heatmap_key(key),
        }
    }

    fn handle_live_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Char('h') => {
                self.view = View::Heatmap;
                self.reload_heatmap();
            }
            KeyCode::Char('p') => self.toggle_pause(),
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.window_secs = narrower_window(self.window_secs);
            }
            KeyCode::Char('-') => {
                self.window_secs = wider_window(self.window_secs);
            }
            KeyCode::Char('a') => self.open_prompt(PromptKind::AddHost),
            KeyCode::Char('d') => {
                if self.monitor.pings().is_empty() {
                    self.status = Some("No ping hosts to remove".into());
                } else {
                    self.open_prompt(PromptKind::DeleteHost);
                }
            }
            KeyCode::Char('g') => self.chart_style = self.chart_style.toggle(),
            _ => {}
        }
    }

    fn handle_heatmap_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Char('l') => self.view = View::Live,
            KeyCode::Char('7') => self.set_heatmap_days(7),
            KeyCode::Char('1') => self.set_heatmap_days(14),
            KeyCode::Char('3') => self.set_heatmap_days(30),
            KeyCode::Char('2') => self.set_heatmap_band(Band::TwoFour),
            KeyCode::Char('5') => self.set_heatmap_band(Band::Five),
            KeyCode::Char('s') => self.trigger_scan(),
            _ => {}
        }
    }

    fn handle_prompt_key(&mut self, key: KeyCode) {
        let Some(prompt) = self.prompt.as_mut() else {
            return;
        };
        match key {
            KeyCode::Esc => self.prompt = None,
            KeyCode::Backspace => {
                prompt.input.pop();
            }
            KeyCode::Enter => {
                if let Some(prompt) = self.prompt.take() {
                    self.submit_prompt(prompt);
                }
            }
            KeyCode::Char(c) if !c.is_control() => prompt.input.push(c),
            _ => {}
        }
    }

    fn open_prompt(&mut self, kind: PromptKind) {
        self.status = None;
        self.prompt = Some(Prompt {
            kind,
            input: String::new(),
        });
    }

    fn submit_prompt(&mut self, prompt: Prompt) {
        let input = prompt.input.trim();
        match prompt.kind {
            PromptKind::AddHost => {
                if input.is_empty() {
                    return;
                }
                let host = self.monitor.add_host(input);
                self.status = Some(format!("Added {}", host.label()));
            }
            PromptKind::DeleteHost => {
                let removed = input
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|index| self.monitor.remove_host(index));
                self.status = Some(match removed {
                    Some(host) => format!("Removed {}", host.label()),
                    None => format!("No ping host #{input}"),
                });
            }
        }
    }

    fn toggle_pause(&mut self) {
        let paused = !self.monitor.is_paused();
        self.monitor.set_paused(paused);
        self.paused_at = paused.then(unix_now);
    }

    fn set_heatmap_days(&mut self, days: u32) {
        self.heatmap.days = days;
        self.reload_heatmap();
    }

    fn set_heatmap_band(&mut self, band: Band) {
        self.heatmap.band = Some(band);
        self.reload_heatmap();
    }

    fn trigger_scan(&mut self) {
        let band = self.heatmap.band;
        self.status = Some(match self.monitor.scanner().start_background(band) {
            Ok(()) => "Scanning...".into(),
            Err(ScanError::InFlight) => "A scan is already running".into(),
            Err(e) => format!("Scan failed: {e}"),
        });
    }

    fn reload_heatmap(&mut self) {
        let today = scan_store::today();
        let grid = self
            .monitor
            .heatmap(self.heatmap.days, self.heatmap.band, today);
        self.heatmap.band.get_or_insert(grid.band);
        self.heatmap.grid = Some(grid);
        self.heatmap.last_scan = self.monitor.scan_store().last_scan_time(today);
        self.heatmap.generation = self.monitor.scanner().generation();
    }

    /// Rebuild the heatmap after a background scan saved a new snapshot.
    fn refresh_heatmap_if_stale(&mut self) {
        if self.view != View::Heatmap {
            return;
        }
        let generation = self.monitor.scanner().generation();
        if self.heatmap.grid.is_none() || generation != self.heatmap.generation {
            self.reload_heatmap();
            if let Some(ScanOutcome::Saved { networks, band, .. }) =
                self.monitor.scanner().last_outcome()
                && generation > 0
            {
                self.status = Some(format!("Scan saved: {networks} networks on {band}"));
            }
        }
    }

    // -----------------------------------------------------------------------
    // Accessors for ui
    // -----------------------------------------------------------------------

    /// Render time: frozen while paused.
    pub fn now(&self) -> f64 {
        self.paused_at.unwrap_or_else(unix_now)
    }

    /// Copy everything the live view draws under one store lock.
    pub fn snapshot(&self) -> LiveSnapshot {
        self.monitor
            .snapshot(self.now(), Some(self.window_secs as f64))
    }

    pub fn monitor(&self) -> &Monitor {
        &self.monitor
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn window_secs(&self) -> u64 {
        self.window_secs
    }

    pub fn chart_style(&self) -> ChartStyle {
        self.chart_style
    }

    pub fn prompt(&self) -> Option<&Prompt> {
        self.prompt.as_ref()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn heatmap(&self) -> &HeatmapState {
        &self.heatmap
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
