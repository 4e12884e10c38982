// Time series domain models
use super::error::{DegenerateInterval, InvalidInputError};

/// A single reading. `time_ms` is epoch milliseconds, the only instant
/// representation used inside the domain layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub time_ms: i64,
    pub value: f64,
}

impl Sample {
    pub fn new(time_ms: i64, value: f64) -> Self {
        Self { time_ms, value }
    }
}

/// Ordered, immutable sequence of samples with strictly increasing
/// timestamps. A series may hold fewer than 2 samples; interpolation
/// callers decide what to do with those.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    samples: Vec<Sample>,
}

impl TimeSeries {
    pub fn new(samples: Vec<Sample>) -> Result<Self, InvalidInputError> {
        for (index, sample) in samples.iter().enumerate() {
            if !sample.value.is_finite() {
                return Err(InvalidInputError::NonFiniteValue { index });
            }
            if sample.value < 0.0 {
                return Err(InvalidInputError::NegativeValue {
                    index,
                    value: sample.value,
                });
            }
        }

        if let Some(index) = samples
            .windows(2)
            .position(|pair| pair[1].time_ms <= pair[0].time_ms)
        {
            return Err(InvalidInputError::NonIncreasing { index: index + 1 });
        }

        Ok(Self { samples })
    }

    /// Sort raw fetcher output by time and drop duplicate timestamps.
    /// For a repeated timestamp the reading delivered last wins.
    pub fn from_unsorted(mut samples: Vec<Sample>) -> Result<Self, InvalidInputError> {
        samples.sort_by_key(|s| s.time_ms);

        let mut deduped: Vec<Sample> = Vec::with_capacity(samples.len());
        for sample in samples {
            match deduped.last_mut() {
                Some(last) if last.time_ms == sample.time_ms => *last = sample,
                _ => deduped.push(sample),
            }
        }

        Self::new(deduped)
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    /// Sample with the highest value; the earliest one on ties.
    pub fn peak(&self) -> Option<&Sample> {
        self.samples
            .iter()
            .fold(None, |best: Option<&Sample>, s| match best {
                Some(b) if b.value >= s.value => Some(b),
                _ => Some(s),
            })
    }
}

/// Position of `target` between `from` and `to` as a fraction of the span.
pub(crate) fn linear_fraction(from: f64, to: f64, target: f64) -> Result<f64, DegenerateInterval> {
    let span = to - from;
    if span == 0.0 {
        return Err(DegenerateInterval);
    }
    Ok((target - from) / span)
}
