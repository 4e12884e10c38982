// Air quality domain model: AQI categories and EPA PM2.5 conversion

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AqiCategory {
    Good,
    Moderate,
    UnhealthyForSensitiveGroups,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

const CATEGORY_LIMITS: [(u32, AqiCategory); 5] = [
    (50, AqiCategory::Good),
    (100, AqiCategory::Moderate),
    (150, AqiCategory::UnhealthyForSensitiveGroups),
    (200, AqiCategory::Unhealthy),
    (300, AqiCategory::VeryUnhealthy),
];

impl AqiCategory {
    pub fn from_aqi(aqi: u32) -> Self {
        CATEGORY_LIMITS
            .iter()
            .find(|(limit, _)| aqi <= *limit)
            .map(|(_, category)| *category)
            .unwrap_or(AqiCategory::Hazardous)
    }

    pub fn label(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            AqiCategory::Unhealthy => "Unhealthy",
            AqiCategory::VeryUnhealthy => "Very Unhealthy",
            AqiCategory::Hazardous => "Hazardous",
        }
    }
}

struct Breakpoint {
    c_low: f64,
    c_high: f64,
    i_low: f64,
    i_high: f64,
}

// EPA PM2.5 (24-hour, µg/m³) breakpoints
const PM25_BREAKPOINTS: [Breakpoint; 7] = [
    Breakpoint {
        c_low: 0.0,
        c_high: 12.0,
        i_low: 0.0,
        i_high: 50.0,
    },
    Breakpoint {
        c_low: 12.1,
        c_high: 35.4,
        i_low: 51.0,
        i_high: 100.0,
    },
    Breakpoint {
        c_low: 35.5,
        c_high: 55.4,
        i_low: 101.0,
        i_high: 150.0,
    },
    Breakpoint {
        c_low: 55.5,
        c_high: 150.4,
        i_low: 151.0,
        i_high: 200.0,
    },
    Breakpoint {
        c_low: 150.5,
        c_high: 250.4,
        i_low: 201.0,
        i_high: 300.0,
    },
    Breakpoint {
        c_low: 250.5,
        c_high: 350.4,
        i_low: 301.0,
        i_high: 400.0,
    },
    Breakpoint {
        c_low: 350.5,
        c_high: 500.4,
        i_low: 401.0,
        i_high: 500.0,
    },
];

/// EPA AQI for a PM2.5 concentration. The concentration is truncated to
/// 0.1 µg/m³ first; anything above the top breakpoint reports 500.
pub fn aqi_from_pm25(concentration: f64) -> Option<u32> {
    if !concentration.is_finite() || concentration < 0.0 {
        return None;
    }

    // round away float noise before truncating (e.g. 12.1 stored as 12.0999…)
    let c = ((concentration * 10.0 * 1e6).round() / 1e6).floor() / 10.0;
    let Some(bp) = PM25_BREAKPOINTS.iter().find(|bp| c <= bp.c_high) else {
        return Some(500);
    };

    let aqi = (bp.i_high - bp.i_low) / (bp.c_high - bp.c_low) * (c - bp.c_low) + bp.i_low;
    Some(aqi.round() as u32)
}

#[derive(Debug, Clone, PartialEq)]
pub struct AirQualityReport {
    pub pm25: f64,
    pub aqi: Option<u32>,
    pub category: Option<AqiCategory>,
    pub observed_at_ms: i64,
    pub fetched_at_ms: i64,
}

impl AirQualityReport {
    pub fn new(pm25: f64, observed_at_ms: i64, fetched_at_ms: i64) -> Self {
        let aqi = aqi_from_pm25(pm25);
        Self {
            pm25,
            aqi,
            category: aqi.map(AqiCategory::from_aqi),
            observed_at_ms,
            fetched_at_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_lookup() {
        assert_eq!(AqiCategory::from_aqi(0), AqiCategory::Good);
        assert_eq!(AqiCategory::from_aqi(50), AqiCategory::Good);
        assert_eq!(AqiCategory::from_aqi(51), AqiCategory::Moderate);
        assert_eq!(AqiCategory::from_aqi(150), AqiCategory::UnhealthyForSensitiveGroups);
        assert_eq!(AqiCategory::from_aqi(301), AqiCategory::Hazardous);
        assert_eq!(AqiCategory::from_aqi(999), AqiCategory::Hazardous);
    }

    #[test]
    fn test_pm25_breakpoints() {
        assert_eq!(aqi_from_pm25(0.0), Some(0));
        assert_eq!(aqi_from_pm25(12.0), Some(50));
        assert_eq!(aqi_from_pm25(12.1), Some(51));
        assert_eq!(aqi_from_pm25(35.4), Some(100));
        assert_eq!(aqi_from_pm25(35.5), Some(101));
        assert_eq!(aqi_from_pm25(500.4), Some(500));
        assert_eq!(aqi_from_pm25(812.0), Some(500));
    }

    #[test]
    fn test_pm25_truncates_to_tenths() {
        // 12.09 truncates to 12.0, still "Good"
        assert_eq!(aqi_from_pm25(12.09), Some(50));
        // 23.75 -> 23.7: (100-51)/(35.4-12.1) * (23.7-12.1) + 51 = 75.39
        assert_eq!(aqi_from_pm25(23.75), Some(75));
    }

    #[test]
    fn test_pm25_rejects_bad_input() {
        assert_eq!(aqi_from_pm25(-1.0), None);
        assert_eq!(aqi_from_pm25(f64::NAN), None);
    }

    #[test]
    fn test_report_derives_category() {
        let report = AirQualityReport::new(40.0, 1_000, 2_000);
        assert_eq!(report.aqi, Some(112));
        assert_eq!(report.category, Some(AqiCategory::UnhealthyForSensitiveGroups));
    }
}
