//! Wi-Fi bands, their channel plans and frequency→channel lookup.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Frequency below which an association is considered 2.4 GHz.
pub const BAND_SPLIT_MHZ: f64 = 3000.0;

/// Channels charted for 2.4 GHz.
pub const CHANNELS_2_4GHZ: [u32; 14] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14];

/// Channels charted for 5 GHz (20 MHz primaries, UNII-1 through UNII-3).
pub const CHANNELS_5GHZ: [u32; 25] = [
    36, 40, 44, 48, 52, 56, 60, 64, 100, 104, 108, 112, 116, 120, 124, 128, 132, 136, 140, 144,
    149, 153, 157, 161, 165,
];

const FREQ_TO_CHANNEL_2_4GHZ: [(u32, u32); 14] = [
    (2412, 1),
    (2417, 2),
    (2422, 3),
    (2427, 4),
    (2432, 5),
    (2437, 6),
    (2442, 7),
    (2447, 8),
    (2452, 9),
    (2457, 10),
    (2462, 11),
    (2467, 12),
    (2472, 13),
    (2484, 14),
];

const FREQ_TO_CHANNEL_5GHZ: [(u32, u32); 25] = [
    (5180, 36),
    (5200, 40),
    (5220, 44),
    (5240, 48),
    (5260, 52),
    (5280, 56),
    (5300, 60),
    (5320, 64),
    (5500, 100),
    (5520, 104),
    (5540, 108),
    (5560, 112),
    (5580, 116),
    (5600, 120),
    (5620, 124),
    (5640, 128),
    (5660, 132),
    (5680, 136),
    (5700, 140),
    (5720, 144),
    (5745, 149),
    (5765, 153),
    (5785, 157),
    (5805, 161),
    (5825, 165),
];

/// Frequency band of a scan or association.
///
/// Serialized as `"2.4"` / `"5"` to stay compatible with existing scan files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Band {
    #[default]
    #[serde(rename = "2.4")]
    TwoFour,
    #[serde(rename = "5")]
    Five,
}

impl Band {
    /// Band of an association at `freq_mhz`.
    pub fn from_frequency(freq_mhz: f64) -> Self {
        if freq_mhz < BAND_SPLIT_MHZ {
            Self::TwoFour
        } else {
            Self::Five
        }
    }

    /// Band of the current association, 2.4 GHz when unassociated.
    pub fn infer(freq_mhz: Option<f64>) -> Self {
        freq_mhz.map(Self::from_frequency).unwrap_or_default()
    }

    /// Fixed, ordered channel list charted for this band.
    pub fn channels(self) -> &'static [u32] {
        match self {
            Self::TwoFour => &CHANNELS_2_4GHZ,
            Self::Five => &CHANNELS_5GHZ,
        }
    }

    /// Short label without the unit (`2.4`, `5`).
    pub fn label(self) -> &'static str {
        match self {
            Self::TwoFour => "2.4",
            Self::Five => "5",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}GHz", self.label())
    }
}

impl FromStr for Band {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_end_matches("GHz").trim_end_matches("ghz") {
            "2.4" | "2" => Ok(Self::TwoFour),
            "5" => Ok(Self::Five),
            other => Err(format!("unknown band '{other}' (expected 2.4 or 5)")),
        }
    }
}

/// Map a centre frequency in MHz to its channel number.
///
/// Fractional frequencies are truncated first (`iw` prints `2437.0`).
/// Frequencies outside both tables return `None`.
pub fn freq_to_channel(freq_mhz: f64) -> Option<u32> {
    if !freq_mhz.is_finite() || freq_mhz < 0.0 {
        return None;
    }
    let freq = freq_mhz as u32;
    FREQ_TO_CHANNEL_5GHZ
        .iter()
        .chain(FREQ_TO_CHANNEL_2_4GHZ.iter())
        .find(|(f, _)| *f == freq)
        .map(|&(_, ch)| ch)
}
