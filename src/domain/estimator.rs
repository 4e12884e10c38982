// Current value estimate at an arbitrary instant
use super::time_series::{Sample, linear_fraction};

/// Linear estimate at `now_ms` from the pair that brackets it.
///
/// Returns `None` when `now_ms` lies outside the samples; callers show the
/// last known reading instead of extrapolating.
pub fn estimate_at(samples: &[Sample], now_ms: i64) -> Option<f64> {
    let (first, last) = (samples.first()?, samples.last()?);
    if now_ms < first.time_ms || now_ms > last.time_ms {
        return None;
    }

    // first index with time > now, clamped so `after` exists
    let after_idx = samples
        .partition_point(|s| s.time_ms <= now_ms)
        .clamp(1, samples.len().max(2) - 1);
    let Some(after) = samples.get(after_idx) else {
        // single sample and now sits exactly on it
        return Some(first.value);
    };
    let before = &samples[after_idx - 1];

    let fraction = linear_fraction(before.time_ms as f64, after.time_ms as f64, now_ms as f64)
        .unwrap_or(0.0);
    Some(before.value + fraction * (after.value - before.value))
}
