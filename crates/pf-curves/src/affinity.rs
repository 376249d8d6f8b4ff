//! Pump affinity laws: speed-scaled views of a curve.
//!
//! For a speed ratio `r = n / n_rated`:
//!
//! ```text
//! Q' = Q * r
//! H' = H * r^2
//! P' = P * r^3
//! eta' = eta
//! ```
//!
//! The view borrows the base curve and never copies or mutates its samples.
//! Because the PCHIP construction commutes with positive scaling of both
//! axes, lookups on the view evaluate the base interpolant at `Q / r` and
//! scale the result.

use crate::curve::{CurveModel, CurveSampling};
use crate::error::{CurveError, CurveResult};
use crate::traits::{FlowDomain, HeadCurve};

/// A curve seen at a different rotational speed.
#[derive(Clone, Copy, Debug)]
pub struct AffinityView<'a> {
    base: &'a CurveModel,
    ratio: f64,
}

/// Scale `curve` to speed ratio `ratio`.
///
/// # Errors
/// `InvalidSpeedRatio` if `ratio` is not a positive finite number.
pub fn scale(curve: &CurveModel, ratio: f64) -> CurveResult<AffinityView<'_>> {
    if !ratio.is_finite() || ratio <= 0.0 {
        return Err(CurveError::InvalidSpeedRatio { ratio });
    }
    Ok(AffinityView { base: curve, ratio })
}

impl<'a> AffinityView<'a> {
    pub fn base(&self) -> &'a CurveModel {
        self.base
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    pub fn scaled_flow(&self) -> Vec<f64> {
        self.base.flow().iter().map(|q| q * self.ratio).collect()
    }

    pub fn scaled_head(&self) -> Vec<f64> {
        let k = self.head_factor();
        self.base.head().iter().map(|h| h * k).collect()
    }

    pub fn scaled_power(&self) -> Option<Vec<f64>> {
        let k = self.power_factor();
        self.base.power().map(|p| p.iter().map(|v| v * k).collect())
    }

    pub fn min_flow(&self) -> f64 {
        self.base.min_flow() * self.ratio
    }

    pub fn max_flow(&self) -> f64 {
        self.base.max_flow() * self.ratio
    }

    pub fn min_head(&self) -> f64 {
        self.base.min_head() * self.head_factor()
    }

    pub fn max_head(&self) -> f64 {
        self.base.max_head() * self.head_factor()
    }

    pub fn head_at(&self, flow: f64) -> f64 {
        self.base.head_at(flow / self.ratio) * self.head_factor()
    }

    pub fn efficiency_at(&self, flow: f64) -> Option<f64> {
        self.base.efficiency_at(flow / self.ratio)
    }

    pub fn power_at(&self, flow: f64) -> Option<f64> {
        self.base
            .power_at(flow / self.ratio)
            .map(|p| p * self.power_factor())
    }

    /// NPSHR follows the head law.
    pub fn npshr_at(&self, flow: f64) -> Option<f64> {
        self.base
            .npshr_at(flow / self.ratio)
            .map(|h| h * self.head_factor())
    }

    /// [`CurveModel::sample`] of the base curve, scaled to this speed.
    pub fn sample(&self, num: usize) -> CurveResult<CurveSampling> {
        let base = self.base.sample(num)?;
        let (kh, kp) = (self.head_factor(), self.power_factor());
        Ok(CurveSampling {
            flow: base.flow.iter().map(|q| q * self.ratio).collect(),
            head: base.head.iter().map(|h| h * kh).collect(),
            efficiency: base.efficiency,
            power: base.power.map(|p| p.iter().map(|v| v * kp).collect()),
        })
    }

    fn head_factor(&self) -> f64 {
        self.ratio * self.ratio
    }

    fn power_factor(&self) -> f64 {
        self.ratio.powi(3)
    }
}

impl HeadCurve for AffinityView<'_> {
    fn domain(&self) -> FlowDomain {
        FlowDomain {
            min: self.min_flow(),
            max: self.max_flow(),
        }
    }

    fn head_at(&self, flow: f64) -> f64 {
        AffinityView::head_at(self, flow)
    }
}
