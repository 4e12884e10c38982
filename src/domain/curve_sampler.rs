// Dense curve and axis-label sampling over a curve model
use super::curve_model::CurveModel;
use super::error::InvalidInputError;
use super::spline::SplineModel;
use super::time_series::Sample;
use chrono::{DateTime, FixedOffset, Offset, Utc};
use std::collections::HashMap;

pub const MINUTE_MS: i64 = 60_000;
pub const HOUR_MS: i64 = 60 * MINUTE_MS;

#[derive(Debug, Clone, PartialEq)]
pub struct SamplerSettings {
    pub step_ms: i64,
    /// Offset used for hour marks and label text. Fixed, so daylight
    /// saving is not applied.
    pub utc_offset: FixedOffset,
    /// Hour ticks closer than this to a named instant are dropped. 0 disables.
    pub hour_suppression_ms: i64,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self {
            step_ms: 10 * MINUTE_MS,
            utc_offset: Utc.fix(),
            hour_suppression_ms: 30 * MINUTE_MS,
        }
    }
}

/// Caller-supplied instant that must get its own label (e.g. a threshold crossing).
#[derive(Debug, Clone, PartialEq)]
pub struct NamedInstant {
    pub name: String,
    pub time_ms: i64,
}

impl NamedInstant {
    pub fn new(name: impl Into<String>, time_ms: i64) -> Self {
        Self {
            name: name.into(),
            time_ms,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LabelKind {
    Boundary,
    Hour,
    Named(String),
    /// Unsmoothed input point, only produced in fallback mode.
    Raw,
}

impl LabelKind {
    // Higher wins when two candidates share a displayed minute.
    fn priority(&self) -> u8 {
        match self {
            LabelKind::Named(_) => 3,
            LabelKind::Boundary => 2,
            LabelKind::Raw => 1,
            LabelKind::Hour => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AxisLabelPoint {
    pub time_ms: i64,
    pub value: f64,
    pub label: String,
    pub kind: LabelKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SampledCurve {
    pub dense: Vec<Sample>,
    pub labels: Vec<AxisLabelPoint>,
}

pub struct CurveSampler<'a> {
    model: &'a CurveModel,
    settings: &'a SamplerSettings,
}

impl<'a> CurveSampler<'a> {
    pub fn new(
        model: &'a CurveModel,
        settings: &'a SamplerSettings,
    ) -> Result<Self, InvalidInputError> {
        if settings.step_ms <= 0 {
            return Err(InvalidInputError::NonPositiveStep {
                step_ms: settings.step_ms,
            });
        }
        Ok(Self { model, settings })
    }

    /// Evenly stepped points from the first knot to the last, both included.
    /// The last knot is appended when the domain is not a multiple of the step.
    pub fn dense(&self) -> DenseSamples<'a> {
        match self.model {
            CurveModel::Spline(spline) => {
                let first_ms = spline.first_knot() as i64;
                let last_ms = spline.last_knot() as i64;
                let width = last_ms - first_ms;
                let full_steps = (width / self.settings.step_ms) as usize;
                let len = full_steps + 1 + usize::from(width % self.settings.step_ms != 0);
                DenseSamples {
                    source: DenseSource::Stepped {
                        spline,
                        first_ms,
                        last_ms,
                        step_ms: self.settings.step_ms,
                        full_steps,
                    },
                    next: 0,
                    len,
                }
            }
            CurveModel::Fallback(series) => DenseSamples {
                source: DenseSource::Raw(series.samples()),
                next: 0,
                len: series.len(),
            },
        }
    }

    pub fn labels(&self, named: &[NamedInstant]) -> Vec<AxisLabelPoint> {
        let spline = match self.model {
            CurveModel::Spline(spline) => spline,
            CurveModel::Fallback(series) => {
                return series
                    .samples()
                    .iter()
                    .map(|s| self.label_point(s.time_ms, s.value, LabelKind::Raw))
                    .collect();
            }
        };

        let first_ms = spline.first_knot() as i64;
        let last_ms = spline.last_knot() as i64;
        let mut candidates = vec![
            (first_ms, LabelKind::Boundary),
            (last_ms, LabelKind::Boundary),
        ];

        let in_domain: Vec<&NamedInstant> = named
            .iter()
            .filter(|instant| {
                let inside = (first_ms..=last_ms).contains(&instant.time_ms);
                if !inside {
                    tracing::debug!(
                        "Ignoring named instant {} outside the curve domain",
                        instant.name
                    );
                }
                inside
            })
            .collect();

        for mark in self.hour_marks(first_ms, last_ms) {
            let suppressed = in_domain
                .iter()
                .any(|n| (n.time_ms - mark).abs() < self.settings.hour_suppression_ms);
            if !suppressed {
                candidates.push((mark, LabelKind::Hour));
            }
        }

        for instant in in_domain {
            candidates.push((instant.time_ms, LabelKind::Named(instant.name.clone())));
        }

        let mut by_minute: HashMap<String, AxisLabelPoint> = HashMap::new();
        for (time_ms, kind) in candidates {
            let point = self.label_point(time_ms, spline.evaluate(time_ms as f64), kind);
            let key = minute_key(time_ms, self.settings.utc_offset);
            let keep_existing = by_minute
                .get(&key)
                .is_some_and(|existing| existing.kind.priority() >= point.kind.priority());
            if !keep_existing {
                by_minute.insert(key, point);
            }
        }

        let mut labels: Vec<AxisLabelPoint> = by_minute.into_values().collect();
        labels.sort_by_key(|p| p.time_ms);
        labels
    }

    pub fn sample(&self, named: &[NamedInstant]) -> SampledCurve {
        SampledCurve {
            dense: self.dense().collect(),
            labels: self.labels(named),
        }
    }

    // Exact local hours strictly between the two bounds.
    fn hour_marks(&self, first_ms: i64, last_ms: i64) -> impl Iterator<Item = i64> {
        let offset_ms = i64::from(self.settings.utc_offset.local_minus_utc()) * 1000;
        let start = ((first_ms + offset_ms).div_euclid(HOUR_MS) + 1) * HOUR_MS - offset_ms;
        (0..)
            .map(move |k| start + k * HOUR_MS)
            .take_while(move |&mark| mark < last_ms)
    }

    fn label_point(&self, time_ms: i64, value: f64, kind: LabelKind) -> AxisLabelPoint {
        AxisLabelPoint {
            time_ms,
            value,
            label: format_time_of_day(time_ms, self.settings.utc_offset),
            kind,
        }
    }
}

#[derive(Debug, Clone)]
enum DenseSource<'a> {
    Stepped {
        spline: &'a SplineModel,
        first_ms: i64,
        last_ms: i64,
        step_ms: i64,
        full_steps: usize,
    },
    Raw(&'a [Sample]),
}

/// Lazy dense curve over an immutable model. Every call to
/// `CurveSampler::dense` starts a new pass that yields the same points.
#[derive(Debug, Clone)]
pub struct DenseSamples<'a> {
    source: DenseSource<'a>,
    next: usize,
    len: usize,
}

impl Iterator for DenseSamples<'_> {
    type Item = Sample;

    fn next(&mut self) -> Option<Sample> {
        if self.next >= self.len {
            return None;
        }
        let k = self.next;
        self.next += 1;

        match &self.source {
            DenseSource::Stepped {
                spline,
                first_ms,
                last_ms,
                step_ms,
                full_steps,
            } => {
                let time_ms = if k <= *full_steps {
                    first_ms + k as i64 * step_ms
                } else {
                    *last_ms
                };
                Some(Sample::new(time_ms, spline.evaluate(time_ms as f64)))
            }
            DenseSource::Raw(samples) => samples.get(k).copied(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for DenseSamples<'_> {}

fn local_time(time_ms: i64, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    DateTime::<Utc>::from_timestamp_millis(time_ms).map(|t| t.with_timezone(&offset))
}

/// `HH:MM` in the given zone; the only place instants become display text.
pub fn format_time_of_day(time_ms: i64, offset: FixedOffset) -> String {
    match local_time(time_ms, offset) {
        Some(t) => t.format("%H:%M").to_string(),
        None => time_ms.to_string(),
    }
}

// Includes the date so the same clock time on two days stays distinct.
fn minute_key(time_ms: i64, offset: FixedOffset) -> String {
    match local_time(time_ms, offset) {
        Some(t) => t.format("%Y-%m-%d %H:%M").to_string(),
        None => time_ms.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::time_series::TimeSeries;

    // 2024-06-01T06:00:00Z
    const T0: i64 = 1_717_221_600_000;

    fn model(points: &[(i64, f64)]) -> CurveModel {
        let samples = points.iter().map(|&(t, v)| Sample::new(t, v)).collect();
        CurveModel::build(&TimeSeries::new(samples).unwrap())
    }

    fn labels_text(labels: &[AxisLabelPoint]) -> Vec<&str> {
        labels.iter().map(|l| l.label.as_str()).collect()
    }

    #[test]
    fn test_dense_count_when_divisible() {
        let model = model(&[(T0, 0.0), (T0 + HOUR_MS, 3.0), (T0 + 2 * HOUR_MS, 1.0)]);
        let settings = SamplerSettings::default();
        let sampler = CurveSampler::new(&model, &settings).unwrap();

        let dense: Vec<Sample> = sampler.dense().collect();
        assert_eq!(dense.len(), 13);
        assert_eq!(dense[0].time_ms, T0);
        assert_eq!(dense[12].time_ms, T0 + 2 * HOUR_MS);
        assert!(dense.windows(2).all(|w| w[1].time_ms - w[0].time_ms == 10 * MINUTE_MS));
    }

    #[test]
    fn test_dense_appends_last_knot_when_not_divisible() {
        let model = model(&[(T0, 0.0), (T0 + 25 * MINUTE_MS, 2.0)]);
        let settings = SamplerSettings::default();
        let sampler = CurveSampler::new(&model, &settings).unwrap();

        let dense = sampler.dense();
        assert_eq!(dense.len(), 4);
        let times: Vec<i64> = dense.map(|s| s.time_ms - T0).collect();
        assert_eq!(times, vec![0, 10 * MINUTE_MS, 20 * MINUTE_MS, 25 * MINUTE_MS]);
    }

    #[test]
    fn test_dense_is_restartable() {
        let model = model(&[(T0, 0.0), (T0 + HOUR_MS, 5.0), (T0 + 3 * HOUR_MS, 2.0)]);
        let settings = SamplerSettings::default();
        let sampler = CurveSampler::new(&model, &settings).unwrap();

        let first: Vec<Sample> = sampler.dense().collect();
        let second: Vec<Sample> = sampler.dense().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_rejects_non_positive_step() {
        let model = model(&[(T0, 0.0), (T0 + HOUR_MS, 5.0)]);
        let settings = SamplerSettings {
            step_ms: 0,
            ..SamplerSettings::default()
        };
        assert!(matches!(
            CurveSampler::new(&model, &settings),
            Err(InvalidInputError::NonPositiveStep { step_ms: 0 })
        ));
    }

    #[test]
    fn test_labels_include_bounds_and_hours() {
        let model = model(&[
            (T0 + 15 * MINUTE_MS, 0.5),
            (T0 + 2 * HOUR_MS, 4.0),
            (T0 + 3 * HOUR_MS + 40 * MINUTE_MS, 1.0),
        ]);
        let settings = SamplerSettings::default();
        let sampler = CurveSampler::new(&model, &settings).unwrap();

        let labels = sampler.labels(&[]);
        assert_eq!(labels_text(&labels), vec!["06:15", "07:00", "08:00", "09:00", "09:40"]);
        assert_eq!(labels[0].kind, LabelKind::Boundary);
        assert_eq!(labels[1].kind, LabelKind::Hour);
        // 08:00 is a knot, so its label value is the sample itself
        assert!((labels[2].value - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_hour_marks_are_strictly_inside() {
        let model = model(&[(T0, 0.5), (T0 + 2 * HOUR_MS, 4.0)]);
        let settings = SamplerSettings::default();
        let sampler = CurveSampler::new(&model, &settings).unwrap();

        let labels = sampler.labels(&[]);
        assert_eq!(labels_text(&labels), vec!["06:00", "07:00", "08:00"]);
        assert_eq!(labels[0].kind, LabelKind::Boundary);
        assert_eq!(labels[2].kind, LabelKind::Boundary);
    }

    #[test]
    fn test_named_instant_on_hour_mark_yields_single_label() {
        let model = model(&[(T0, 0.5), (T0 + 3 * HOUR_MS, 4.0)]);
        let settings = SamplerSettings {
            hour_suppression_ms: 0,
            ..SamplerSettings::default()
        };
        let sampler = CurveSampler::new(&model, &settings).unwrap();

        let labels = sampler.labels(&[NamedInstant::new("rise", T0 + HOUR_MS)]);
        assert_eq!(labels_text(&labels), vec!["06:00", "07:00", "08:00", "09:00"]);
        assert_eq!(labels[1].kind, LabelKind::Named("rise".to_string()));
    }

    #[test]
    fn test_hour_ticks_near_named_instant_are_suppressed() {
        let model = model(&[(T0, 0.5), (T0 + 4 * HOUR_MS, 4.0)]);
        let settings = SamplerSettings::default();
        let sampler = CurveSampler::new(&model, &settings).unwrap();

        // 07:20 is within 30 minutes of 07:00 but not of 08:00
        let rise = [NamedInstant::new("rise", T0 + HOUR_MS + 20 * MINUTE_MS)];
        let labels = sampler.labels(&rise);
        assert_eq!(labels_text(&labels), vec!["06:00", "07:20", "08:00", "09:00", "10:00"]);

        let wide = SamplerSettings {
            hour_suppression_ms: HOUR_MS,
            ..SamplerSettings::default()
        };
        let sampler = CurveSampler::new(&model, &wide).unwrap();
        let labels = sampler.labels(&rise);
        assert_eq!(labels_text(&labels), vec!["06:00", "07:20", "09:00", "10:00"]);
    }

    #[test]
    fn test_named_instant_outside_domain_is_ignored() {
        let model = model(&[(T0, 0.5), (T0 + HOUR_MS, 4.0)]);
        let settings = SamplerSettings::default();
        let sampler = CurveSampler::new(&model, &settings).unwrap();

        let labels = sampler.labels(&[NamedInstant::new("late", T0 + 5 * HOUR_MS)]);
        assert_eq!(labels_text(&labels), vec!["06:00", "07:00"]);
    }

    #[test]
    fn test_ignored_named_instant_does_not_suppress_hour_tick() {
        let model = model(&[(T0, 0.5), (T0 + 2 * HOUR_MS + 10 * MINUTE_MS, 4.0)]);
        let settings = SamplerSettings::default();
        let sampler = CurveSampler::new(&model, &settings).unwrap();

        // 08:20 is past the 08:10 bound but within 30 minutes of the 08:00 tick
        let fall = [NamedInstant::new("fall", T0 + 2 * HOUR_MS + 20 * MINUTE_MS)];
        let labels = sampler.labels(&fall);
        assert_eq!(labels_text(&labels), vec!["06:00", "07:00", "08:00", "08:10"]);
        assert_eq!(labels[2].kind, LabelKind::Hour);
    }

    #[test]
    fn test_labels_follow_utc_offset() {
        let model = model(&[(T0 + 30 * MINUTE_MS, 0.5), (T0 + 2 * HOUR_MS, 4.0)]);
        let settings = SamplerSettings {
            // UTC+05:30, so hour marks fall on :30 UTC
            utc_offset: FixedOffset::east_opt(5 * 3600 + 1800).unwrap(),
            ..SamplerSettings::default()
        };
        let sampler = CurveSampler::new(&model, &settings).unwrap();

        let labels = sampler.labels(&[]);
        assert_eq!(labels_text(&labels), vec!["12:00", "13:00", "13:30"]);
        assert_eq!(labels[1].time_ms, T0 + 90 * MINUTE_MS);
    }

    #[test]
    fn test_fixed_offset_ignores_daylight_saving() {
        // 2024-01-15T18:00Z and 2024-07-15T18:00Z
        let winter = 1_705_341_600_000;
        let summer = 1_721_066_400_000;
        let settings = SamplerSettings {
            utc_offset: FixedOffset::west_opt(8 * 3600).unwrap(),
            ..SamplerSettings::default()
        };

        for start in [winter, summer] {
            let model = model(&[(start, 1.0), (start + HOUR_MS, 2.0)]);
            let sampler = CurveSampler::new(&model, &settings).unwrap();
            assert_eq!(labels_text(&sampler.labels(&[])), vec!["10:00", "11:00"]);
        }
    }

    #[test]
    fn test_multi_day_labels_keep_both_days() {
        // 22:00 on day one to 02:00 two days later
        let start = T0 + 16 * HOUR_MS;
        let model = model(&[(start, 0.0), (start + 28 * HOUR_MS, 0.0)]);
        let settings = SamplerSettings::default();
        let sampler = CurveSampler::new(&model, &settings).unwrap();

        let labels = sampler.labels(&[]);
        assert_eq!(labels.len(), 29);
        assert_eq!(labels.iter().filter(|l| l.label == "23:00").count(), 2);
        assert!(labels.windows(2).all(|w| w[0].time_ms < w[1].time_ms));
    }

    #[test]
    fn test_fallback_returns_raw_points() {
        let model = model(&[(T0, 2.5)]);
        let settings = SamplerSettings::default();
        let sampler = CurveSampler::new(&model, &settings).unwrap();

        let sampled = sampler.sample(&[NamedInstant::new("rise", T0)]);
        assert_eq!(sampled.dense, vec![Sample::new(T0, 2.5)]);
        assert_eq!(sampled.labels.len(), 1);
        assert_eq!(sampled.labels[0].kind, LabelKind::Raw);
        assert_eq!(sampled.labels[0].label, "06:00");
    }
}
