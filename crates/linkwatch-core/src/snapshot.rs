//! Channel-occupancy snapshots produced by a scan.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::band::Band;

/// Access points seen on one channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelOccupancy {
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub networks: Vec<String>,
}

/// Result of one scan, as persisted in the day files.
///
/// `band` is absent in records written before band tagging; such records are
/// treated as 2.4 GHz by the heatmap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSnapshot {
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub band: Option<Band>,
    #[serde(default)]
    pub channels: BTreeMap<u32, ChannelOccupancy>,
}

impl ScanSnapshot {
    /// Sum of per-channel counts.
    pub fn total(&self) -> u32 {
        self.channels.values().map(|c| c.count).sum()
    }

    /// Occupancy count for `channel`, 0 when the channel is absent.
    pub fn count(&self, channel: u32) -> u32 {
        self.channels.get(&channel).map_or(0, |c| c.count)
    }

    /// Distinct network names across all channels.
    pub fn network_count(&self) -> usize {
        let mut names: Vec<&str> = self
            .channels
            .values()
            .flat_map(|c| c.networks.iter().map(String::as_str))
            .collect();
        names.sort_unstable();
        names.dedup();
        names.len()
    }

    /// Channels ordered by descending occupancy, ties by channel number.
    pub fn busiest(&self) -> Vec<(u32, &ChannelOccupancy)> {
        let mut channels: Vec<_> = self.channels.iter().map(|(ch, c)| (*ch, c)).collect();
        channels.sort_by(|a, b| b.1.count.cmp(&a.1.count).then(a.0.cmp(&b.0)));
        channels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn occupancy(count: u32, names: &[&str]) -> ChannelOccupancy {
        ChannelOccupancy {
            count,
            networks: names.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn totals_and_counts() {
        let snap = ScanSnapshot {
            timestamp: 1,
            band: Some(Band::TwoFour),
            channels: BTreeMap::from([
                (1, occupancy(2, &["a", "b"])),
                (6, occupancy(3, &["a", "c", "d"])),
            ]),
        };
        assert_eq!(snap.total(), 5);
        assert_eq!(snap.count(6), 3);
        assert_eq!(snap.count(11), 0);
        assert_eq!(snap.network_count(), 4);
        assert_eq!(snap.busiest()[0].0, 6);
    }

    #[test]
    fn json_uses_string_channel_keys() {
        let snap = ScanSnapshot {
            timestamp: 1_700_000_000,
            band: Some(Band::Five),
            channels: BTreeMap::from([(36, occupancy(1, &["x"]))]),
        };
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["band"], "5");
        assert_eq!(json["channels"]["36"]["count"], 1);
    }

    #[test]
    fn legacy_record_without_band_or_networks() {
        let text = r#"{"timestamp": 1690000000, "channels": {"6": {"count": 4}}}"#;
        let snap: ScanSnapshot = serde_json::from_str(text).unwrap();
        assert_eq!(snap.band, None);
        assert_eq!(snap.count(6), 4);
        assert!(snap.channels[&6].networks.is_empty());
    }
}
