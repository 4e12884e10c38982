// UV index report domain model
use super::crossing::CrossingEvent;
use super::curve_model::Smoothing;
use super::curve_sampler::AxisLabelPoint;
use super::time_series::Sample;

/// WHO UV index exposure categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UvRisk {
    Low,
    Moderate,
    High,
    VeryHigh,
    Extreme,
}

impl UvRisk {
    pub fn from_index(uv: f64) -> Self {
        match uv {
            v if v < 3.0 => UvRisk::Low,
            v if v < 6.0 => UvRisk::Moderate,
            v if v < 8.0 => UvRisk::High,
            v if v < 11.0 => UvRisk::VeryHigh,
            _ => UvRisk::Extreme,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UvRisk::Low => "Low",
            UvRisk::Moderate => "Moderate",
            UvRisk::High => "High",
            UvRisk::VeryHigh => "Very High",
            UvRisk::Extreme => "Extreme",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurrentUv {
    pub value: f64,
    /// False when `now` fell outside the forecast and the last reading was used.
    pub estimated: bool,
    pub risk: UvRisk,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UvReport {
    pub fetched_at_ms: i64,
    pub threshold: f64,
    pub smoothing: Smoothing,
    pub samples: Vec<Sample>,
    pub dense: Vec<Sample>,
    pub labels: Vec<AxisLabelPoint>,
    pub crossings: Vec<CrossingEvent>,
    pub protection_start_ms: Option<i64>,
    pub protection_end_ms: Option<i64>,
    pub current: Option<CurrentUv>,
    pub peak: Option<Sample>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_boundaries() {
        assert_eq!(UvRisk::from_index(0.0), UvRisk::Low);
        assert_eq!(UvRisk::from_index(2.99), UvRisk::Low);
        assert_eq!(UvRisk::from_index(3.0), UvRisk::Moderate);
        assert_eq!(UvRisk::from_index(7.9), UvRisk::High);
        assert_eq!(UvRisk::from_index(10.5), UvRisk::VeryHigh);
        assert_eq!(UvRisk::from_index(11.0), UvRisk::Extreme);
        assert_eq!(UvRisk::from_index(11.0).label(), "Extreme");
    }
}
