//! Aligned time-series store.
//!
//! Every array in [`TimeSeriesStore`] is indexed by the same tick. A tick is
//! appended in one call ([`TimeSeriesStore::push_tick`]), so between ticks all
//! arrays, including every per-host latency series, have equal length.
//! Retention drops the same leading count from all of them at once.

use serde::Serialize;

/// Stable identifier of a ping host, independent of its list position.
pub type HostId = u64;

/// Default retention ceiling: one day of one-second ticks.
pub const DEFAULT_RETENTION: usize = 86_400;

/// Value-or-missing samples with a parallel failure flag.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricSeries {
    values: Vec<Option<f64>>,
    failed: Vec<bool>,
}

impl MetricSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// `n` missing entries, each flagged as failed.
    pub fn missing(n: usize) -> Self {
        Self {
            values: vec![None; n],
            failed: vec![true; n],
        }
    }

    /// Append a sample; a missing value is flagged as failed.
    pub fn push(&mut self, value: Option<f64>) {
        self.push_flagged(value, value.is_none());
    }

    /// Append a sample with an explicit failure flag.
    pub fn push_flagged(&mut self, value: Option<f64>, failed: bool) {
        self.values.push(value);
        self.failed.push(failed);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn failed(&self) -> &[bool] {
        &self.failed
    }

    /// Most recent present value.
    pub fn last_present(&self) -> Option<f64> {
        self.values.iter().rev().find_map(|v| *v)
    }

    fn drop_front(&mut self, n: usize) {
        let n = n.min(self.values.len());
        self.values.drain(..n);
        let n = n.min(self.failed.len());
        self.failed.drain(..n);
    }

    /// Entries selected by `mask`, or an empty series if lengths disagree.
    fn filtered(&self, mask: &[bool]) -> Self {
        if self.values.len() != mask.len() || self.failed.len() != mask.len() {
            return Self::default();
        }
        Self {
            values: filter_aligned(mask, &self.values),
            failed: filter_aligned(mask, &self.failed),
        }
    }
}

/// Elements of `values` whose mask entry is true.
///
/// Returns an empty vector when the lengths differ instead of indexing past
/// either slice.
pub fn filter_aligned<T: Clone>(mask: &[bool], values: &[T]) -> Vec<T> {
    if mask.len() != values.len() {
        return Vec::new();
    }
    mask.iter()
        .zip(values)
        .filter(|(keep, _)| **keep)
        .map(|(_, v)| v.clone())
        .collect()
}

/// Link metrics of one tick. Rx and tx share the `rates_failed` flag.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LinkSample {
    pub signal_dbm: Option<f64>,
    pub rx_mbps: Option<f64>,
    pub tx_mbps: Option<f64>,
    pub width_mhz: Option<f64>,
}

impl LinkSample {
    pub fn rates_failed(&self) -> bool {
        self.rx_mbps.is_none()
    }
}

/// Which link metric a failure reason belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Signal,
    Rates,
    Bandwidth,
}

/// Per-host latency history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostSeries {
    pub id: HostId,
    pub series: MetricSeries,
}

/// Owner of all aligned per-tick arrays.
#[derive(Debug, Clone)]
pub struct TimeSeriesStore {
    time: Vec<f64>,
    signal: MetricSeries,
    rx: MetricSeries,
    tx: MetricSeries,
    bandwidth: MetricSeries,
    latency: Vec<HostSeries>,
    last_errors: [Option<String>; 3],
    retention: usize,
}

impl Default for TimeSeriesStore {
    fn default() -> Self {
        Self::new(DEFAULT_RETENTION)
    }
}

impl TimeSeriesStore {
    pub fn new(retention: usize) -> Self {
        Self {
            time: Vec::new(),
            signal: MetricSeries::new(),
            rx: MetricSeries::new(),
            tx: MetricSeries::new(),
            bandwidth: MetricSeries::new(),
            latency: Vec::new(),
            last_errors: [None, None, None],
            retention: retention.max(1),
        }
    }

    /// Number of ticks currently held.
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn retention(&self) -> usize {
        self.retention
    }

    /// Append one tick to every array, then apply retention.
    ///
    /// `latency` holds each host's latest reading; a registered host absent
    /// from it gets a missing entry so alignment is preserved.
    pub fn push_tick(&mut self, time: f64, link: LinkSample, latency: &[(HostId, Option<f64>)]) {
        self.time.push(time);
        self.signal.push(link.signal_dbm);
        let rates_failed = link.rates_failed();
        self.rx.push_flagged(link.rx_mbps, rates_failed);
        self.tx.push_flagged(link.tx_mbps, rates_failed);
        self.bandwidth.push(link.width_mhz);

        for host in &mut self.latency {
            let latest = latency
                .iter()
                .find(|(id, _)| *id == host.id)
                .and_then(|(_, v)| *v);
            host.series.push(latest);
        }

        self.trim();
    }

    /// Start tracking `id`, backfilled with one missing entry per existing tick.
    pub fn register_host(&mut self, id: HostId) {
        if self.latency.iter().any(|h| h.id == id) {
            return;
        }
        self.latency.push(HostSeries {
            id,
            series: MetricSeries::missing(self.len()),
        });
    }

    /// Drop the history of `id`. Returns false if it was not tracked.
    pub fn remove_host(&mut self, id: HostId) -> bool {
        let before = self.latency.len();
        self.latency.retain(|h| h.id != id);
        self.latency.len() != before
    }

    pub fn host_series(&self, id: HostId) -> Option<&MetricSeries> {
        self.latency.iter().find(|h| h.id == id).map(|h| &h.series)
    }

    pub fn time(&self) -> &[f64] {
        &self.time
    }

    pub fn signal(&self) -> &MetricSeries {
        &self.signal
    }

    pub fn rx(&self) -> &MetricSeries {
        &self.rx
    }

    pub fn tx(&self) -> &MetricSeries {
        &self.tx
    }

    pub fn bandwidth(&self) -> &MetricSeries {
        &self.bandwidth
    }

    /// Shared rx/tx failure flags.
    pub fn rates_failed(&self) -> &[bool] {
        self.rx.failed()
    }

    /// Remember why `metric` was last missing.
    pub fn set_last_error(&mut self, metric: Metric, reason: Option<String>) {
        self.last_errors[metric as usize] = reason;
    }

    pub fn last_error(&self, metric: Metric) -> Option<&str> {
        self.last_errors[metric as usize].as_deref()
    }

    /// True when every array has the same length as the time array.
    pub fn is_aligned(&self) -> bool {
        let n = self.time.len();
        [&self.signal, &self.rx, &self.tx, &self.bandwidth]
            .iter()
            .all(|s| s.len() == n && s.failed().len() == n)
            && self
                .latency
                .iter()
                .all(|h| h.series.len() == n && h.series.failed().len() == n)
    }

    /// Copy of every array restricted to ticks with `time >= now - window`.
    ///
    /// `None` selects all ticks. Any array whose length does not match the
    /// time mask comes back empty instead of being indexed.
    pub fn windowed_view(&self, now: f64, window_secs: Option<f64>) -> WindowedView {
        let mask: Vec<bool> = match window_secs {
            Some(w) => {
                let cutoff = now - w;
                self.time.iter().map(|&t| t >= cutoff).collect()
            }
            None => vec![true; self.time.len()],
        };

        WindowedView {
            time: filter_aligned(&mask, &self.time),
            signal: self.signal.filtered(&mask),
            rx: self.rx.filtered(&mask),
            tx: self.tx.filtered(&mask),
            bandwidth: self.bandwidth.filtered(&mask),
            latency: self
                .latency
                .iter()
                .map(|h| HostSeries {
                    id: h.id,
                    series: h.series.filtered(&mask),
                })
                .collect(),
        }
    }

    fn trim(&mut self) {
        let excess = self.time.len().saturating_sub(self.retention);
        if excess == 0 {
            return;
        }
        self.time.drain(..excess);
        self.signal.drop_front(excess);
        self.rx.drop_front(excess);
        self.tx.drop_front(excess);
        self.bandwidth.drop_front(excess);
        for host in &mut self.latency {
            host.series.drop_front(excess);
        }
    }
}

/// Time-filtered copy of the store, owned by the renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WindowedView {
    pub time: Vec<f64>,
    pub signal: MetricSeries,
    pub rx: MetricSeries,
    pub tx: MetricSeries,
    pub bandwidth: MetricSeries,
    pub latency: Vec<HostSeries>,
}

impl WindowedView {
    pub fn host(&self, id: HostId) -> Option<&MetricSeries> {
        self.latency.iter().find(|h| h.id == id).map(|h| &h.series)
    }
}
