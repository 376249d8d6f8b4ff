//! Shape-preserving piecewise cubic Hermite interpolation (Fritsch-Carlson / PCHIP).
//!
//! Knot slopes are chosen so that monotone data yields a monotone interpolant
//! and local extrema stay at the samples. Evaluation outside the sampled range
//! continues the first or last cubic segment; there is no clamping.

/// Interpolant for one data channel over a shared, strictly increasing knot vector.
///
/// The knots are not stored here; callers own them once and pass them to `eval`.
#[derive(Clone, Debug, PartialEq)]
pub struct Pchip {
    values: Vec<f64>,
    slopes: Vec<f64>,
}

impl Pchip {
    /// Build the interpolant. `knots` must be strictly increasing, at least two
    /// long, and the same length as `values`; construction sites validate this.
    pub(crate) fn new(knots: &[f64], values: Vec<f64>) -> Self {
        debug_assert_eq!(knots.len(), values.len());
        debug_assert!(knots.len() >= 2);
        let slopes = knot_slopes(knots, &values);
        Self { values, slopes }
    }

    /// Sample values this interpolant passes through.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Evaluate at `x`, extrapolating with the boundary segment.
    pub fn eval(&self, knots: &[f64], x: f64) -> f64 {
        let k = segment_index(knots, x);
        let h = knots[k + 1] - knots[k];
        let t = x - knots[k];
        let y0 = self.values[k];
        let d0 = self.slopes[k];
        let d1 = self.slopes[k + 1];
        let secant = (self.values[k + 1] - y0) / h;

        let c2 = (3.0 * secant - 2.0 * d0 - d1) / h;
        let c3 = (d0 + d1 - 2.0 * secant) / (h * h);
        y0 + t * (d0 + t * (c2 + t * c3))
    }
}

/// Index `k` of the segment `[knots[k], knots[k + 1]]` used for `x`.
fn segment_index(knots: &[f64], x: f64) -> usize {
    let last = knots.len() - 2;
    if x <= knots[0] {
        return 0;
    }
    // first knot strictly greater than x, minus one
    let upper = knots.partition_point(|&k| k <= x);
    upper.saturating_sub(1).min(last)
}

fn sign(v: f64) -> i8 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}

fn knot_slopes(x: &[f64], y: &[f64]) -> Vec<f64> {
    let n = x.len();
    let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
    let m: Vec<f64> = y
        .windows(2)
        .zip(&h)
        .map(|(w, hk)| (w[1] - w[0]) / hk)
        .collect();

    if n == 2 {
        return vec![m[0], m[0]];
    }

    let mut d = vec![0.0; n];
    for k in 1..n - 1 {
        let (m_prev, m_next) = (m[k - 1], m[k]);
        if sign(m_prev) == 0 || sign(m_next) == 0 || sign(m_prev) != sign(m_next) {
            continue;
        }
        // weighted harmonic mean
        let w1 = 2.0 * h[k] + h[k - 1];
        let w2 = h[k] + 2.0 * h[k - 1];
        d[k] = (w1 + w2) / (w1 / m_prev + w2 / m_next);
    }

    d[0] = end_slope(h[0], h[1], m[0], m[1]);
    d[n - 1] = end_slope(h[n - 2], h[n - 3], m[n - 2], m[n - 3]);
    d
}

/// One-sided three-point estimate, limited so the end segment cannot overshoot.
fn end_slope(h0: f64, h1: f64, m0: f64, m1: f64) -> f64 {
    let d = ((2.0 * h0 + h1) * m0 - h0 * m1) / (h0 + h1);
    if sign(d) != sign(m0) {
        0.0
    } else if sign(m0) != sign(m1) && d.abs() > (3.0 * m0).abs() {
        3.0 * m0
    } else {
        d
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn decreasing_curve() -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
        prop::collection::vec((0.001_f64..1.0, 0.0_f64..5.0), 2..12).prop_map(|steps| {
            let mut x = Vec::with_capacity(steps.len());
            let mut y = Vec::with_capacity(steps.len());
            let (mut xi, mut yi) = (0.0, 100.0);
            for (dx, dy) in steps {
                x.push(xi);
                y.push(yi);
                xi += dx;
                yi -= dy;
            }
            (x, y)
        })
    }

    proptest! {
        #[test]
        fn monotone_data_stays_monotone((x, y) in decreasing_curve()) {
            let p = Pchip::new(&x, y.clone());
            let lo = x[0];
            let hi = x[x.len() - 1];
            let mut prev = f64::INFINITY;
            for i in 0..=200 {
                let q = lo + (hi - lo) * i as f64 / 200.0;
                let v = p.eval(&x, q);
                prop_assert!(v <= prev + 1e-9);
                prop_assert!(v <= y[0] + 1e-9 && v >= y[y.len() - 1] - 1e-9);
                prev = v;
            }
        }

        #[test]
        fn lookups_are_bit_identical((x, y) in decreasing_curve(), frac in 0.0_f64..1.5) {
            let p = Pchip::new(&x, y);
            let q = x[x.len() - 1] * frac;
            prop_assert_eq!(p.eval(&x, q).to_bits(), p.eval(&x, q).to_bits());
        }
    }
}
