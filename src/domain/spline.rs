// Natural cubic spline through a time series
use super::error::InvalidInputError;
use super::time_series::TimeSeries;

/// Cubic on `[knot_i, knot_i+1)`: `a + b*dx + c*dx^2 + d*dx^3`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl Segment {
    fn evaluate(&self, dx: f64) -> f64 {
        self.a + dx * (self.b + dx * (self.c + dx * self.d))
    }
}

/// Natural cubic spline (second derivative zero at both end knots).
///
/// Built once from validated input and read-only afterwards. Evaluation
/// outside the knot range returns the boundary sample value instead of
/// extending the end polynomials; NaN evaluates to NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct SplineModel {
    knots: Vec<f64>,
    segments: Vec<Segment>,
    last_value: f64,
}

impl SplineModel {
    pub fn new(xs: &[f64], ys: &[f64]) -> Result<Self, InvalidInputError> {
        if xs.len() != ys.len() {
            return Err(InvalidInputError::LengthMismatch {
                xs: xs.len(),
                ys: ys.len(),
            });
        }
        if xs.len() < 2 {
            return Err(InvalidInputError::TooFewSamples { count: xs.len() });
        }
        if let Some(index) = xs
            .iter()
            .zip(ys)
            .position(|(x, y)| !x.is_finite() || !y.is_finite())
        {
            return Err(InvalidInputError::NonFiniteValue { index });
        }

        let n = xs.len() - 1;
        let mut h = Vec::with_capacity(n);
        for i in 0..n {
            let width = xs[i + 1] - xs[i];
            if width <= 0.0 {
                return Err(InvalidInputError::NonIncreasing { index: i + 1 });
            }
            h.push(width);
        }

        let mut alpha = vec![0.0; n];
        for i in 1..n {
            alpha[i] = 3.0 / h[i] * (ys[i + 1] - ys[i]) - 3.0 / h[i - 1] * (ys[i] - ys[i - 1]);
        }

        // Forward sweep of the tridiagonal system; l[0] = 1, mu[0] = z[0] = 0.
        let mut l = vec![1.0; n + 1];
        let mut mu = vec![0.0; n + 1];
        let mut z = vec![0.0; n + 1];
        for i in 1..n {
            l[i] = 2.0 * (xs[i + 1] - xs[i - 1]) - h[i - 1] * mu[i - 1];
            mu[i] = h[i] / l[i];
            z[i] = (alpha[i] - h[i - 1] * z[i - 1]) / l[i];
        }

        // Back-substitution, c[n] = 0 for the natural boundary.
        let mut c = vec![0.0; n + 1];
        let mut segments = Vec::with_capacity(n);
        for j in (0..n).rev() {
            c[j] = z[j] - mu[j] * c[j + 1];
            segments.push(Segment {
                a: ys[j],
                b: (ys[j + 1] - ys[j]) / h[j] - h[j] * (c[j + 1] + 2.0 * c[j]) / 3.0,
                c: c[j],
                d: (c[j + 1] - c[j]) / (3.0 * h[j]),
            });
        }
        segments.reverse();

        Ok(Self {
            knots: xs.to_vec(),
            segments,
            last_value: ys[n],
        })
    }

    pub fn from_series(series: &TimeSeries) -> Result<Self, InvalidInputError> {
        let (xs, ys): (Vec<f64>, Vec<f64>) = series
            .samples()
            .iter()
            .map(|s| (s.time_ms as f64, s.value))
            .unzip();
        Self::new(&xs, &ys)
    }

    pub fn first_knot(&self) -> f64 {
        self.knots[0]
    }

    pub fn last_knot(&self) -> f64 {
        self.knots[self.knots.len() - 1]
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        if x.is_nan() {
            return f64::NAN;
        }
        if x <= self.first_knot() {
            return self.segments[0].a;
        }
        if x >= self.last_knot() {
            return self.last_value;
        }

        // knots[i] <= x < knots[i + 1]
        let i = self.knots.partition_point(|&k| k <= x) - 1;
        self.segments[i].evaluate(x - self.knots[i])
    }
}
