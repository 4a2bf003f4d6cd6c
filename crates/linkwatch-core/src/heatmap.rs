//! Multi-day channel occupancy grid.

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::band::Band;
use crate::scan_store::ScanStore;
use crate::snapshot::ScanSnapshot;

/// Days × channels occupancy matrix.
///
/// `cells[row][col]` is the count for `dates[row]` and `channels[col]`;
/// `None` means no representative snapshot exists for that day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapGrid {
    pub band: Band,
    pub dates: Vec<NaiveDate>,
    pub channels: Vec<u32>,
    pub cells: Vec<Vec<Option<u32>>>,
}

impl HeatmapGrid {
    /// True when no day has a representative snapshot.
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|row| row.iter().all(Option::is_none))
    }

    /// Rows newest first, as displayed.
    pub fn rows_newest_first(&self) -> impl Iterator<Item = (NaiveDate, &[Option<u32>])> {
        self.dates
            .iter()
            .copied()
            .zip(self.cells.iter().map(Vec::as_slice))
            .rev()
    }
}

/// Build the grid for the `days` calendar days ending at `today`, oldest first.
pub fn build(store: &ScanStore, days: u32, band: Band, today: NaiveDate) -> HeatmapGrid {
    let channels = band.channels().to_vec();
    let dates: Vec<NaiveDate> = (0..days as u64)
        .rev()
        .filter_map(|i| today.checked_sub_days(Days::new(i)))
        .collect();

    let cells = dates
        .iter()
        .map(|&date| {
            let scans = store.load_day(date);
            match representative(&scans, band) {
                Some(snap) => channels.iter().map(|&ch| Some(snap.count(ch))).collect(),
                None => vec![None; channels.len()],
            }
        })
        .collect();

    HeatmapGrid {
        band,
        dates,
        channels,
        cells,
    }
}

/// The snapshot that stands for one day on `band`.
///
/// Band-tagged snapshots are preferred; untagged ones are only used for
/// 2.4 GHz and only when no tagged snapshot exists. Among candidates the
/// highest total wins, and on a tie the earliest one is kept.
pub fn representative(scans: &[ScanSnapshot], band: Band) -> Option<&ScanSnapshot> {
    let tagged: Vec<&ScanSnapshot> = scans.iter().filter(|s| s.band == Some(band)).collect();
    let candidates = if tagged.is_empty() && band == Band::TwoFour {
        scans.iter().filter(|s| s.band.is_none()).collect()
    } else {
        tagged
    };

    candidates
        .into_iter()
        .fold(None, |best: Option<&ScanSnapshot>, s| match best {
            Some(b) if b.total() >= s.total() => Some(b),
            _ => Some(s),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::ChannelOccupancy;
    use std::collections::BTreeMap;

    fn snap(timestamp: i64, band: Option<Band>, counts: &[(u32, u32)]) -> ScanSnapshot {
        ScanSnapshot {
            timestamp,
            band,
            channels: counts
                .iter()
                .map(|&(ch, count)| {
                    (
                        ch,
                        ChannelOccupancy {
                            count,
                            networks: Vec::new(),
                        },
                    )
                })
                .collect::<BTreeMap<_, _>>(),
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    // -----------------------------------------------------------------------
    // Representative selection
    // -----------------------------------------------------------------------

    #[test]
    fn highest_total_is_representative() {
        let scans = vec![
            snap(1, Some(Band::TwoFour), &[(1, 4)]),
            snap(2, Some(Band::TwoFour), &[(1, 6), (6, 4)]),
        ];
        assert_eq!(representative(&scans, Band::TwoFour).unwrap().timestamp, 2);
    }

    #[test]
    fn tie_keeps_first_found() {
        let scans = vec![
            snap(1, Some(Band::TwoFour), &[(1, 3)]),
            snap(2, Some(Band::TwoFour), &[(6, 3)]),
        ];
        assert_eq!(representative(&scans, Band::TwoFour).unwrap().timestamp, 1);
    }

    #[test]
    fn untagged_used_only_for_2_4ghz_fallback() {
        let legacy = vec![snap(1, None, &[(6, 2)])];
        assert_eq!(representative(&legacy, Band::TwoFour).unwrap().timestamp, 1);
        assert!(representative(&legacy, Band::Five).is_none());

        let mixed = vec![
            snap(1, None, &[(6, 9)]),
            snap(2, Some(Band::TwoFour), &[(6, 1)]),
        ];
        assert_eq!(representative(&mixed, Band::TwoFour).unwrap().timestamp, 2);
    }

    #[test]
    fn other_band_is_ignored() {
        let scans = vec![snap(1, Some(Band::Five), &[(36, 5)])];
        assert!(representative(&scans, Band::TwoFour).is_none());
    }

    // -----------------------------------------------------------------------
    // Grid
    // -----------------------------------------------------------------------

    #[test]
    fn grid_rows_oldest_first_with_missing_days() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ScanStore::new(tmp.path());
        let today = date("2024-03-10");
        store
            .append_on(date("2024-03-10"), &snap(10, Some(Band::TwoFour), &[(1, 10)]))
            .unwrap();
        store
            .append_on(date("2024-03-10"), &snap(11, Some(Band::TwoFour), &[(6, 4)]))
            .unwrap();
        store
            .append_on(date("2024-03-08"), &snap(5, None, &[(11, 2)]))
            .unwrap();

        let grid = build(&store, 3, Band::TwoFour, today);
        assert_eq!(
            grid.dates,
            vec![date("2024-03-08"), date("2024-03-09"), date("2024-03-10")]
        );
        assert_eq!(grid.channels.len(), 14);
        assert_eq!(grid.cells.len(), 3);

        // Legacy snapshot on the first day.
        assert_eq!(grid.cells[0][10], Some(2));
        assert_eq!(grid.cells[0][0], Some(0));
        // No data on the middle day.
        assert!(grid.cells[1].iter().all(Option::is_none));
        // Total-10 snapshot chosen over total-4.
        assert_eq!(grid.cells[2][0], Some(10));
        assert_eq!(grid.cells[2][5], Some(0));
        assert!(!grid.is_empty());

        let newest = grid.rows_newest_first().next().unwrap();
        assert_eq!(newest.0, today);
    }

    #[test]
    fn grid_for_5ghz_uses_full_channel_plan() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ScanStore::new(tmp.path());
        let grid = build(&store, 7, Band::Five, date("2024-03-10"));
        assert_eq!(grid.channels.len(), 25);
        assert_eq!(grid.dates.len(), 7);
        assert!(grid.is_empty());
    }
}
