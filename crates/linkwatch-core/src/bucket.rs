//! Resampling of irregular samples into fixed-duration time buckets.
//!
//! Bucket edges are snapped to multiples of the bucket duration so that the
//! same sample lands in the same bucket on consecutive renders and charts do
//! not shimmer as "now" advances.

/// Mean of the present samples in each of `bucket_count` equal time slots
/// covering the `window_secs` ending at `now` (snapped up to a bucket edge).
///
/// Always returns exactly `bucket_count` values; empty buckets are `None`.
/// Input may be empty, unsorted or of mismatched lengths; only the common
/// prefix of `values` and `timestamps` is used.
pub fn bucket_by_time(
    values: &[Option<f64>],
    timestamps: &[f64],
    window_secs: f64,
    bucket_count: usize,
    now: f64,
) -> Vec<Option<f64>> {
    if bucket_count == 0 {
        return Vec::new();
    }
    let mut sums = vec![0.0_f64; bucket_count];
    let mut counts = vec![0_u32; bucket_count];

    let duration = window_secs / bucket_count as f64;
    if !(duration.is_finite() && duration > 0.0) || !now.is_finite() {
        return vec![None; bucket_count];
    }
    let end = (now / duration).ceil() * duration;
    let start = end - window_secs;

    for (value, &t) in values.iter().zip(timestamps) {
        let Some(v) = value.filter(|v| v.is_finite()) else {
            continue;
        };
        if !(t >= start && t < end) {
            continue;
        }
        let idx = (((t - start) / duration) as usize).min(bucket_count - 1);
        sums[idx] += v;
        counts[idx] += 1;
    }

    sums.into_iter()
        .zip(counts)
        .map(|(sum, n)| (n > 0).then(|| sum / n as f64))
        .collect()
}
