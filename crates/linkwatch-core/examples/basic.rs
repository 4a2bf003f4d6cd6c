//! Offline rendering example.
//!
//! Feeds a minute of synthetic signal readings through the store, buckets
//! them and prints a three-row bar chart, then summarizes a canned scan dump.
//!
//! Run: `cargo run --example basic`

use linkwatch_core::palette::{SIGNAL_SCALE, signal_tone};
use linkwatch_core::sparkline::{block_chart, to_text};
use linkwatch_core::{Band, LinkSample, TimeSeriesStore, bucket_by_time, parse_scan_dump};

const DUMP: &str = "\
BSS 00:11:22:33:44:55(on wlan0)
\tfreq: 2412
\tSSID: Kitchen
BSS 66:77:88:99:aa:bb(on wlan0)
\tfreq: 2437
\tSSID: Upstairs
BSS cc:dd:ee:ff:00:11(on wlan0)
\tDS Parameter set: channel 6
\tSSID: Neighbour
";

fn main() {
    let mut store = TimeSeriesStore::new(3600);
    for i in 0..60 {
        // A slow fade with one dropped reading
        let signal = (i != 30).then(|| -45.0 - i as f64 * 0.5);
        let link = LinkSample {
            signal_dbm: signal,
            ..Default::default()
        };
        store.push_tick(1_000.0 + i as f64, link, &[]);
    }

    let buckets = bucket_by_time(store.signal().values(), store.time(), 60.0, 30, 1_060.0);
    println!("Signal, last 60s ({} ticks):", store.len());
    for row in block_chart(&buckets, 3, SIGNAL_SCALE, signal_tone) {
        println!("  |{}|", to_text(&row));
    }

    let snapshot = parse_scan_dump(DUMP, Band::TwoFour, 1_060);
    println!("\nBusy channels on {}:", Band::TwoFour);
    for (channel, occupancy) in snapshot.channels.iter().filter(|(_, o)| o.count > 0) {
        println!(
            "  {channel:>3}: {} ({})",
            occupancy.count,
            occupancy.networks.join(", ")
        );
    }
}
