// Domain layer - Pure models and curve algorithms
pub mod air_quality;
pub mod crossing;
pub mod curve_model;
pub mod curve_sampler;
pub mod error;
pub mod estimator;
pub mod spline;
pub mod time_series;
pub mod uv;
