//! Color and scale policies for the dashboard.

use crate::sparkline::Scale;

/// Signal chart range in dBm.
pub const SIGNAL_SCALE: Scale = Scale::fixed(-90.0, -30.0);

/// Latency chart range in milliseconds.
pub const LATENCY_SCALE: Scale = Scale::fixed(0.0, 200.0);

/// Smallest upper bound of the throughput chart, in Mbit/s.
pub const MIN_THROUGHPUT_CEILING: f64 = 100.0;

/// How healthy a reading is, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Good,
    Fair,
    Degraded,
    Bad,
}

/// Semantic color of a glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tone {
    /// Missing data, empty cells.
    Dim,
    Severity(Severity),
    /// Upper series of an overlay chart (rx).
    Top,
    /// Lower series of an overlay chart (tx).
    Base,
    /// Uncolored series.
    Plain,
}

pub fn signal_severity(dbm: f64) -> Severity {
    if dbm >= -50.0 {
        Severity::Good
    } else if dbm >= -60.0 {
        Severity::Fair
    } else if dbm >= -70.0 {
        Severity::Degraded
    } else {
        Severity::Bad
    }
}

pub fn latency_severity(ms: f64) -> Severity {
    if ms < 20.0 {
        Severity::Good
    } else if ms < 50.0 {
        Severity::Fair
    } else if ms < 100.0 {
        Severity::Degraded
    } else {
        Severity::Bad
    }
}

pub fn occupancy_severity(count: u32) -> Severity {
    match count {
        0 => Severity::Good,
        1..=2 => Severity::Fair,
        3..=4 => Severity::Degraded,
        _ => Severity::Bad,
    }
}

pub fn signal_tone(dbm: f64) -> Tone {
    if dbm.is_nan() {
        return Tone::Dim;
    }
    Tone::Severity(signal_severity(dbm))
}

pub fn latency_tone(ms: f64) -> Tone {
    if ms.is_nan() {
        return Tone::Dim;
    }
    Tone::Severity(latency_severity(ms))
}

/// Header wording for a signal level.
pub fn signal_quality(dbm: Option<f64>) -> (&'static str, Severity) {
    match dbm {
        None => ("No signal", Severity::Bad),
        Some(dbm) => {
            let severity = signal_severity(dbm);
            let word = match severity {
                Severity::Good => "Excellent",
                Severity::Fair => "Good",
                Severity::Degraded => "Fair",
                Severity::Bad => "Poor",
            };
            (word, severity)
        }
    }
}

/// `0..=max(100, peak rounded up to the next 100)` for throughput charts.
pub fn throughput_scale(values: &[Option<f64>]) -> Scale {
    let peak = values
        .iter()
        .flatten()
        .copied()
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);
    let ceiling = ((peak / 100.0).ceil() * 100.0).max(MIN_THROUGHPUT_CEILING);
    Scale::fixed(0.0, ceiling)
}

/// Heatmap cell glyph and tone for a day's count on one channel.
pub fn occupancy_glyph(count: Option<u32>) -> (char, Tone) {
    match count {
        None => ('░', Tone::Dim),
        Some(n) => {
            let glyph = match n {
                0 => '░',
                1..=2 => '▒',
                3..=4 => '▓',
                _ => '█',
            };
            (glyph, Tone::Severity(occupancy_severity(n)))
        }
    }
}

/// Compact duration: `42s`, `5m`, `3h`, `2d` (truncating).
pub fn format_duration(secs: f64) -> String {
    let secs = secs.max(0.0);
    if secs < 60.0 {
        format!("{}s", secs as u64)
    } else if secs < 3600.0 {
        format!("{}m", (secs / 60.0) as u64)
    } else if secs < 86_400.0 {
        format!("{}h", (secs / 3600.0) as u64)
    } else {
        format!("{}d", (secs / 86_400.0) as u64)
    }
}
