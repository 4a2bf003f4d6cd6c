//! Persistent scan history: one JSON array of snapshots per local day.
//!
//! Read paths never fail. A missing, unreadable or corrupt day file reads as
//! an empty list and the problem is logged. Appends return their error so the
//! caller can report it.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Days, Local, NaiveDate};

use crate::error::StorageError;
use crate::snapshot::ScanSnapshot;

/// How far back [`ScanStore::last_scan_time`] looks.
pub const LAST_SCAN_LOOKBACK_DAYS: u64 = 30;

/// Default retention for [`ScanStore::cleanup_older_than`].
pub const DEFAULT_KEEP_DAYS: u64 = 90;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Directory of `YYYY-MM-DD.json` day files.
#[derive(Debug, Clone)]
pub struct ScanStore {
    dir: PathBuf,
}

impl ScanStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `~/.config/wifi-monitor/scans`, shared with earlier versions of the tool.
    pub fn default_dir() -> PathBuf {
        config_home().join("wifi-monitor").join("scans")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn day_file(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("{}.json", date.format(DATE_FORMAT)))
    }

    /// Append `snapshot` to the file of the local day it was taken on.
    pub fn append(&self, snapshot: &ScanSnapshot) -> Result<PathBuf, StorageError> {
        let date = local_date(snapshot.timestamp).unwrap_or_else(today);
        self.append_on(date, snapshot)
    }

    /// Append `snapshot` to the file for `date`. A corrupt existing file is
    /// replaced by a fresh array.
    pub fn append_on(
        &self,
        date: NaiveDate,
        snapshot: &ScanSnapshot,
    ) -> Result<PathBuf, StorageError> {
        fs::create_dir_all(&self.dir).map_err(|source| StorageError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.day_file(date);
        let mut scans = self.load_day(date);
        scans.push(snapshot.clone());

        let json = serde_json::to_string_pretty(&scans).map_err(|source| StorageError::Json {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, json).map_err(|source| StorageError::Io {
            path: path.clone(),
            source,
        })?;
        log::debug!("saved scan to {}", path.display());
        Ok(path)
    }

    /// Snapshots recorded on `date`, or an error describing why they could
    /// not be read. A missing file is an empty day, not an error.
    pub fn try_load_day(&self, date: NaiveDate) -> Result<Vec<ScanSnapshot>, StorageError> {
        let path = self.day_file(date);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(StorageError::Io { path, source }),
        };
        serde_json::from_str(&text).map_err(|source| StorageError::Json { path, source })
    }

    /// Snapshots recorded on `date`; empty on any error.
    pub fn load_day(&self, date: NaiveDate) -> Vec<ScanSnapshot> {
        self.try_load_day(date).unwrap_or_else(|e| {
            log::warn!("{e}");
            Vec::new()
        })
    }

    /// Timestamp of the newest snapshot within the last 30 days of `today`.
    pub fn last_scan_time(&self, today: NaiveDate) -> Option<i64> {
        (0..LAST_SCAN_LOOKBACK_DAYS)
            .filter_map(|i| today.checked_sub_days(Days::new(i)))
            .find_map(|date| self.load_day(date).iter().map(|s| s.timestamp).max())
    }

    /// Dates that have a day file, newest first.
    pub fn scan_dates(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self.day_files().into_iter().map(|(d, _)| d).collect();
        dates.sort_unstable_by(|a, b| b.cmp(a));
        dates
    }

    /// Delete day files dated before `today - keep_days`. Returns how many
    /// files were removed.
    pub fn cleanup_older_than(&self, keep_days: u64, today: NaiveDate) -> usize {
        let Some(cutoff) = today.checked_sub_days(Days::new(keep_days)) else {
            return 0;
        };
        let mut removed = 0;
        for (date, path) in self.day_files() {
            if date >= cutoff {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => {
                    log::info!("removed old scan file {}", path.display());
                    removed += 1;
                }
                Err(e) => log::warn!("could not remove {}: {e}", path.display()),
            }
        }
        removed
    }

    fn day_files(&self) -> Vec<(NaiveDate, PathBuf)> {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return Vec::new();
        };
        entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .filter_map(|path| {
                let stem = path.file_stem()?.to_str()?;
                let date = NaiveDate::parse_from_str(stem, DATE_FORMAT).ok()?;
                Some((date, path))
            })
            .collect()
    }
}

/// Current local calendar date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Local calendar date of a unix timestamp.
pub fn local_date(timestamp: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(timestamp, 0).map(|utc| utc.with_timezone(&Local).date_naive())
}

/// `$XDG_CONFIG_HOME`, falling back to `$HOME/.config`.
pub fn config_home() -> PathBuf {
    if let Some(dir) = std::env::var_os("XDG_CONFIG_HOME").filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::band::Band;
    use crate::snapshot::ChannelOccupancy;
    use std::collections::BTreeMap;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    fn snap(timestamp: i64, ch: u32, count: u32) -> ScanSnapshot {
        ScanSnapshot {
            timestamp,
            band: Some(Band::TwoFour),
            channels: BTreeMap::from([(
                ch,
                ChannelOccupancy {
                    count,
                    networks: Vec::new(),
                },
            )]),
        }
    }

    // -----------------------------------------------------------------------
    // Append and load
    // -----------------------------------------------------------------------

    #[test]
    fn append_then_load_preserves_order() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ScanStore::new(tmp.path().join("scans"));
        let day = date("2024-03-01");
        store.append_on(day, &snap(10, 1, 2)).unwrap();
        store.append_on(day, &snap(20, 6, 3)).unwrap();

        let scans = store.load_day(day);
        assert_eq!(scans.len(), 2);
        assert_eq!(scans[0].timestamp, 10);
        assert_eq!(scans[1].count(6), 3);
        assert!(store.day_file(day).ends_with("2024-03-01.json"));
    }

    #[test]
    fn missing_day_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ScanStore::new(tmp.path());
        assert!(store.load_day(date("2024-01-01")).is_empty());
        assert!(store.try_load_day(date("2024-01-01")).unwrap().is_empty());
    }

    #[test]
    fn corrupt_day_reads_empty_and_is_replaced_on_append() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ScanStore::new(tmp.path());
        let day = date("2024-03-02");
        fs::write(store.day_file(day), "{not json").unwrap();

        assert!(store.load_day(day).is_empty());
        assert!(matches!(
            store.try_load_day(day),
            Err(StorageError::Json { .. })
        ));

        store.append_on(day, &snap(5, 1, 1)).unwrap();
        assert_eq!(store.load_day(day).len(), 1);
    }

    #[test]
    fn append_into_unwritable_location_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("file");
        fs::write(&blocker, "x").unwrap();
        let store = ScanStore::new(blocker.join("scans"));
        let err = store.append_on(date("2024-03-03"), &snap(1, 1, 1));
        assert!(matches!(err, Err(StorageError::Io { .. })));
    }

    // -----------------------------------------------------------------------
    // Queries and retention
    // -----------------------------------------------------------------------

    #[test]
    fn last_scan_time_finds_newest_recent_day() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ScanStore::new(tmp.path());
        store.append_on(date("2024-03-08"), &snap(300, 1, 1)).unwrap();
        store.append_on(date("2024-03-08"), &snap(100, 1, 1)).unwrap();
        store.append_on(date("2024-03-05"), &snap(900, 1, 1)).unwrap();
        assert_eq!(store.last_scan_time(date("2024-03-10")), Some(300));
        assert_eq!(store.last_scan_time(date("2024-06-10")), None);
    }

    #[test]
    fn scan_dates_newest_first_and_ignores_other_files() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ScanStore::new(tmp.path());
        store.append_on(date("2024-03-01"), &snap(1, 1, 1)).unwrap();
        store.append_on(date("2024-03-04"), &snap(2, 1, 1)).unwrap();
        fs::write(tmp.path().join("notes.json"), "[]").unwrap();
        fs::write(tmp.path().join("2024-03-09.txt"), "").unwrap();
        assert_eq!(
            store.scan_dates(),
            vec![date("2024-03-04"), date("2024-03-01")]
        );
    }

    #[test]
    fn cleanup_removes_only_old_files() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ScanStore::new(tmp.path());
        store.append_on(date("2023-01-01"), &snap(1, 1, 1)).unwrap();
        store.append_on(date("2024-02-20"), &snap(2, 1, 1)).unwrap();
        let removed = store.cleanup_older_than(DEFAULT_KEEP_DAYS, date("2024-03-10"));
        assert_eq!(removed, 1);
        assert_eq!(store.scan_dates(), vec![date("2024-02-20")]);
    }

    #[test]
    fn cleanup_of_missing_dir_is_noop() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ScanStore::new(tmp.path().join("absent"));
        assert_eq!(store.cleanup_older_than(1, date("2024-03-10")), 0);
        assert!(store.scan_dates().is_empty());
    }
}
