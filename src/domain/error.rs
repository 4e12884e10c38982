// Domain errors for curve construction and sampling
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidInputError {
    #[error("at least 2 samples are required, got {count}")]
    TooFewSamples { count: usize },
    #[error("x and y lengths differ ({xs} vs {ys})")]
    LengthMismatch { xs: usize, ys: usize },
    #[error("timestamps must be strictly increasing (index {index})")]
    NonIncreasing { index: usize },
    #[error("non-finite value at index {index}")]
    NonFiniteValue { index: usize },
    #[error("negative value {value} at index {index}")]
    NegativeValue { index: usize, value: f64 },
    #[error("sampling step must be positive, got {step_ms} ms")]
    NonPositiveStep { step_ms: i64 },
}

/// Zero-width time interval or zero value delta. Never surfaced to callers:
/// the crossing finder skips the pair and the estimator uses fraction 0.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("degenerate interval")]
pub(crate) struct DegenerateInterval;
