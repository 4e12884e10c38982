// Smoothed curve or raw-point fallback, chosen from the input up front
use super::error::InvalidInputError;
use super::spline::SplineModel;
use super::time_series::TimeSeries;

#[derive(Debug, Clone, PartialEq)]
pub enum CurveModel {
    Spline(SplineModel),
    /// Not enough samples to interpolate; consumers draw the raw points.
    Fallback(TimeSeries),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Smoothing {
    Spline,
    Fallback,
}

impl CurveModel {
    pub fn build(series: &TimeSeries) -> Self {
        match SplineModel::from_series(series) {
            Ok(spline) => CurveModel::Spline(spline),
            Err(err) => {
                // A validated TimeSeries only fails here when it is too short.
                debug_assert!(matches!(err, InvalidInputError::TooFewSamples { .. }));
                tracing::debug!("Falling back to raw points: {}", err);
                CurveModel::Fallback(series.clone())
            }
        }
    }

    pub fn smoothing(&self) -> Smoothing {
        match self {
            CurveModel::Spline(_) => Smoothing::Spline,
            CurveModel::Fallback(_) => Smoothing::Fallback,
        }
    }
}
