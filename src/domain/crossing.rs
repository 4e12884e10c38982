// Threshold crossing detection over raw samples
use super::time_series::{Sample, linear_fraction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Rising,
    Falling,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossingEvent {
    pub time_ms: i64,
    pub direction: Direction,
    pub threshold: f64,
}

/// First crossing of `threshold` in `direction`, scanning consecutive
/// sample pairs in order. The crossing time is linearly interpolated
/// between the pair, not read off the smoothed curve.
pub fn find_crossing(samples: &[Sample], threshold: f64, direction: Direction) -> Option<i64> {
    samples
        .windows(2)
        .find_map(|pair| crossing_between(&pair[0], &pair[1], threshold, direction))
}

/// Every crossing in chronological order, both directions.
pub fn find_crossings(samples: &[Sample], threshold: f64) -> Vec<CrossingEvent> {
    samples
        .windows(2)
        .filter_map(|pair| {
            [Direction::Rising, Direction::Falling]
                .into_iter()
                .find_map(|direction| {
                    crossing_between(&pair[0], &pair[1], threshold, direction).map(|time_ms| {
                        CrossingEvent {
                            time_ms,
                            direction,
                            threshold,
                        }
                    })
                })
        })
        .collect()
}

fn crossing_between(
    before: &Sample,
    after: &Sample,
    threshold: f64,
    direction: Direction,
) -> Option<i64> {
    let crosses = match direction {
        Direction::Rising => before.value < threshold && threshold <= after.value,
        Direction::Falling => before.value > threshold && threshold >= after.value,
    };
    if !crosses {
        return None;
    }

    // zero value delta: skip the pair
    let fraction = linear_fraction(before.value, after.value, threshold).ok()?;
    let span = (after.time_ms - before.time_ms) as f64;
    Some(before.time_ms + (fraction * span).round() as i64)
}
