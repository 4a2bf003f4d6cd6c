use std::fmt::Write as _;
use std::path::PathBuf;

use linkwatch_core::palette::{format_duration, occupancy_glyph};
use linkwatch_core::{Band, HeatmapGrid, heatmap, scan_store};

pub fn run(days: u32, band: Option<Band>, scan_dir: Option<PathBuf>) {
    let store = super::scan_store(scan_dir);
    let band = band.unwrap_or_else(super::detect_band);
    let today = scan_store::today();

    let grid = heatmap::build(&store, days.max(1), band, today);
    let last_scan = store.last_scan_time(today);
    let now = chrono::Utc::now().timestamp();
    print!("{}", format_grid(&grid, last_scan, now));
}

/// Text rendering of the grid: newest day on top, one glyph per channel.
pub fn format_grid(grid: &HeatmapGrid, last_scan: Option<i64>, now: i64) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Channel Heatmap ({}) - Last {} days",
        grid.band,
        grid.dates.len()
    );
    let _ = writeln!(out);

    let _ = write!(out, "       ");
    for ch in &grid.channels {
        let _ = write!(out, "{ch:>4}");
    }
    let _ = writeln!(out);

    for (date, row) in grid.rows_newest_first() {
        let _ = write!(out, "{:<7}", date.format("%m/%d").to_string());
        for count in row {
            let (glyph, _) = occupancy_glyph(*count);
            let _ = write!(out, "{:>4}", glyph);
        }
        let _ = writeln!(out);
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Legend: ░ none/clear  ▒ light (1-2)  ▓ moderate (3-4)  █ congested (5+)"
    );
    match last_scan {
        Some(ts) => {
            let _ = writeln!(out, "Last scan: {} ago", format_duration((now - ts) as f64));
        }
        None => {
            let _ = writeln!(out, "No scan data");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn grid() -> HeatmapGrid {
        HeatmapGrid {
            band: Band::TwoFour,
            dates: vec![
                NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
            ],
            channels: vec![1, 6, 11],
            cells: vec![vec![None, None, None], vec![Some(0), Some(3), Some(7)]],
        }
    }

    #[test]
    fn newest_day_is_printed_first() {
        let text = format_grid(&grid(), Some(1_000), 1_000 + 7_200);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Channel Heatmap (2.4GHz) - Last 2 days");
        assert_eq!(lines[2], "          1   6  11");
        assert_eq!(lines[3], "03/02     ░   ▓   █");
        assert_eq!(lines[4], "03/01     ░   ░   ░");
        assert_eq!(lines.last().copied(), Some("Last scan: 2h ago"));
    }

    #[test]
    fn missing_history_is_reported() {
        let text = format_grid(&grid(), None, 0);
        assert!(text.ends_with("No scan data\n"));
    }
}
