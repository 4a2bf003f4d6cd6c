use std::path::PathBuf;

use linkwatch_core::scan_store;

pub fn run(keep_days: u64, scan_dir: Option<PathBuf>) {
    let store = super::scan_store(scan_dir);
    let removed = store.cleanup_older_than(keep_days, scan_store::today());
    println!(
        "Removed {removed} scan file(s) older than {keep_days} days from {}",
        store.dir().display()
    );
    let remaining = store.scan_dates();
    if let (Some(newest), Some(oldest)) = (remaining.first(), remaining.last()) {
        println!("{} day(s) kept: {oldest} .. {newest}", remaining.len());
    }
}
