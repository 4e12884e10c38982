// Mapper to convert domain models to JSON response types
use crate::application::forecast_cache::{UpdateEvent, UpdateSource};
use crate::domain::air_quality::AirQualityReport;
use crate::domain::crossing::{CrossingEvent, Direction};
use crate::domain::curve_model::Smoothing;
use crate::domain::curve_sampler::{AxisLabelPoint, LabelKind};
use crate::domain::time_series::Sample;
use crate::domain::uv::{CurrentUv, UvReport};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointDto {
    pub timestamp: i64,
    pub value: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelPointDto {
    pub timestamp: i64,
    pub value: f64,
    pub label: String,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossingDto {
    pub timestamp: i64,
    pub direction: &'static str,
    pub threshold: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUvDto {
    pub value: f64,
    pub estimated: bool,
    pub risk: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UvReportDto {
    pub fetched_at: i64,
    pub threshold: f64,
    pub smoothing: &'static str,
    pub samples: Vec<PointDto>,
    pub dense_curve: Vec<PointDto>,
    pub label_points: Vec<LabelPointDto>,
    pub crossings: Vec<CrossingDto>,
    pub protection_start: Option<i64>,
    pub protection_end: Option<i64>,
    pub current: Option<CurrentUvDto>,
    pub peak: Option<PointDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AirQualityDto {
    pub pm25: f64,
    pub aqi: Option<u32>,
    pub category: Option<&'static str>,
    pub observed_at: i64,
    pub fetched_at: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventDto {
    pub source: &'static str,
    pub fetched_at: i64,
}

pub fn uv_report_to_json(report: UvReport) -> UvReportDto {
    UvReportDto {
        fetched_at: report.fetched_at_ms,
        threshold: report.threshold,
        smoothing: match report.smoothing {
            Smoothing::Spline => "spline",
            Smoothing::Fallback => "fallback",
        },
        samples: report.samples.into_iter().map(point_to_json).collect(),
        dense_curve: report.dense.into_iter().map(point_to_json).collect(),
        label_points: report.labels.into_iter().map(label_to_json).collect(),
        crossings: report.crossings.into_iter().map(crossing_to_json).collect(),
        protection_start: report.protection_start_ms,
        protection_end: report.protection_end_ms,
        current: report.current.map(current_to_json),
        peak: report.peak.map(point_to_json),
    }
}

pub fn air_quality_to_json(report: AirQualityReport) -> AirQualityDto {
    AirQualityDto {
        pm25: report.pm25,
        aqi: report.aqi,
        category: report.category.map(|c| c.label()),
        observed_at: report.observed_at_ms,
        fetched_at: report.fetched_at_ms,
    }
}

pub fn update_event_to_json(event: &UpdateEvent) -> UpdateEventDto {
    UpdateEventDto {
        source: match event.source {
            UpdateSource::Uv => "uv",
            UpdateSource::AirQuality => "airquality",
        },
        fetched_at: event.fetched_at_ms,
    }
}

fn point_to_json(sample: Sample) -> PointDto {
    PointDto {
        timestamp: sample.time_ms,
        value: sample.value,
    }
}

fn label_to_json(point: AxisLabelPoint) -> LabelPointDto {
    let (kind, name) = match point.kind {
        LabelKind::Boundary => ("boundary", None),
        LabelKind::Hour => ("hour", None),
        LabelKind::Named(name) => ("named", Some(name)),
        LabelKind::Raw => ("raw", None),
    };
    LabelPointDto {
        timestamp: point.time_ms,
        value: point.value,
        label: point.label,
        kind,
        name,
    }
}

fn crossing_to_json(event: CrossingEvent) -> CrossingDto {
    CrossingDto {
        timestamp: event.time_ms,
        direction: match event.direction {
            Direction::Rising => "rising",
            Direction::Falling => "falling",
        },
        threshold: event.threshold,
    }
}

fn current_to_json(current: CurrentUv) -> CurrentUvDto {
    CurrentUvDto {
        value: current.value,
        estimated: current.estimated,
        risk: current.risk.label(),
    }
}
