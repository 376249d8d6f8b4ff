//! Pump performance curve built from SI samples.

use crate::error::{CurveError, CurveResult};
use crate::interp::Pchip;
use crate::traits::{FlowDomain, HeadCurve};
use pf_core::numeric::linspace;
use pf_core::units::{Length, Power, VolumeRate};

/// Point count for chart sampling when the caller has no preference.
pub const DEFAULT_SAMPLE_POINTS: usize = 200;

/// Raw, parallel sample arrays in SI base units.
///
/// - flow: m^3/s
/// - head: m
/// - efficiency: fraction (0..1)
/// - power: W
/// - npshr: m
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CurveSamples {
    pub flow: Vec<f64>,
    pub head: Vec<f64>,
    pub efficiency: Option<Vec<f64>>,
    pub power: Option<Vec<f64>>,
    pub npshr: Option<Vec<f64>>,
}

impl CurveSamples {
    /// Flow/head samples with no optional channels.
    pub fn new(flow: Vec<f64>, head: Vec<f64>) -> Self {
        Self {
            flow,
            head,
            ..Default::default()
        }
    }

    /// Samples from typed quantities; this is where non-SI inputs become SI.
    pub fn from_quantities(flow: &[VolumeRate], head: &[Length]) -> Self {
        Self::new(
            flow.iter().map(|q| q.value).collect(),
            head.iter().map(|h| h.value).collect(),
        )
    }

    pub fn with_efficiency(mut self, efficiency: Vec<f64>) -> Self {
        self.efficiency = Some(efficiency);
        self
    }

    pub fn with_power(mut self, power: Vec<f64>) -> Self {
        self.power = Some(power);
        self
    }

    pub fn with_power_quantities(self, power: &[Power]) -> Self {
        self.with_power(power.iter().map(|p| p.value).collect())
    }

    pub fn with_npshr(mut self, npshr: Vec<f64>) -> Self {
        self.npshr = Some(npshr);
        self
    }

    pub fn with_npshr_quantities(self, npshr: &[Length]) -> Self {
        self.with_npshr(npshr.iter().map(|h| h.value).collect())
    }
}

/// Immutable pump curve with shape-preserving lookups on every channel.
///
/// Interpolants are built once at construction and reused by every lookup, so
/// lookups are pure and the curve can be shared by reference across threads.
#[derive(Clone, Debug, PartialEq)]
pub struct CurveModel {
    flow: Vec<f64>,
    head: Pchip,
    efficiency: Option<Pchip>,
    power: Option<Pchip>,
    npshr: Option<Pchip>,
}

impl CurveModel {
    /// Validate samples and build the curve.
    ///
    /// # Errors
    /// `InvalidCurve` if there are fewer than two samples, channel lengths
    /// differ, any value is non-finite, flow or head is negative, or flow is
    /// not strictly increasing.
    pub fn new(samples: CurveSamples) -> CurveResult<Self> {
        let CurveSamples {
            flow,
            head,
            efficiency,
            power,
            npshr,
        } = samples;

        if flow.len() < 2 {
            return Err(CurveError::invalid_curve(format!(
                "need at least 2 samples, got {}",
                flow.len()
            )));
        }
        check_channel("head", &head, flow.len())?;
        check_channel("flow", &flow, flow.len())?;
        for (name, channel) in [
            ("efficiency", &efficiency),
            ("power", &power),
            ("npshr", &npshr),
        ] {
            if let Some(values) = channel {
                check_channel(name, values, flow.len())?;
            }
        }

        if let Some(i) = flow.iter().position(|&q| q < 0.0) {
            return Err(CurveError::invalid_curve(format!(
                "flow must be non-negative (index {i}: {})",
                flow[i]
            )));
        }
        if let Some(i) = head.iter().position(|&h| h < 0.0) {
            return Err(CurveError::invalid_curve(format!(
                "head must be non-negative (index {i}: {})",
                head[i]
            )));
        }
        if let Some(i) = flow.windows(2).position(|w| w[1] <= w[0]) {
            return Err(CurveError::invalid_curve(format!(
                "flow must be strictly increasing (index {})",
                i + 1
            )));
        }

        let head = Pchip::new(&flow, head);
        let efficiency = efficiency.map(|v| Pchip::new(&flow, v));
        let power = power.map(|v| Pchip::new(&flow, v));
        let npshr = npshr.map(|v| Pchip::new(&flow, v));

        Ok(Self {
            flow,
            head,
            efficiency,
            power,
            npshr,
        })
    }

    /// Shorthand for a flow/head-only curve.
    pub fn from_flow_head(flow: Vec<f64>, head: Vec<f64>) -> CurveResult<Self> {
        Self::new(CurveSamples::new(flow, head))
    }

    pub fn flow(&self) -> &[f64] {
        &self.flow
    }

    pub fn head(&self) -> &[f64] {
        self.head.values()
    }

    pub fn efficiency(&self) -> Option<&[f64]> {
        self.efficiency.as_ref().map(Pchip::values)
    }

    pub fn power(&self) -> Option<&[f64]> {
        self.power.as_ref().map(Pchip::values)
    }

    pub fn npshr(&self) -> Option<&[f64]> {
        self.npshr.as_ref().map(Pchip::values)
    }

    pub fn len(&self) -> usize {
        self.flow.len()
    }

    /// Always false: construction requires two samples.
    pub fn is_empty(&self) -> bool {
        self.flow.is_empty()
    }

    pub fn min_flow(&self) -> f64 {
        self.flow[0]
    }

    pub fn max_flow(&self) -> f64 {
        self.flow[self.flow.len() - 1]
    }

    /// Smallest sampled head.
    pub fn min_head(&self) -> f64 {
        self.head().iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Largest sampled head.
    pub fn max_head(&self) -> f64 {
        self.head().iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn head_at(&self, flow: f64) -> f64 {
        self.head.eval(&self.flow, flow)
    }

    pub fn efficiency_at(&self, flow: f64) -> Option<f64> {
        self.efficiency.as_ref().map(|p| p.eval(&self.flow, flow))
    }

    pub fn power_at(&self, flow: f64) -> Option<f64> {
        self.power.as_ref().map(|p| p.eval(&self.flow, flow))
    }

    pub fn npshr_at(&self, flow: f64) -> Option<f64> {
        self.npshr.as_ref().map(|p| p.eval(&self.flow, flow))
    }

    /// Evaluate every channel on `num` equally spaced flows across the sampled range.
    pub fn sample(&self, num: usize) -> CurveResult<CurveSampling> {
        if num < 2 {
            return Err(CurveError::InvalidArg {
                what: "sampling needs at least 2 points",
            });
        }
        let flow = linspace(self.min_flow(), self.max_flow(), num);
        let head = flow.iter().map(|&q| self.head_at(q)).collect();
        let efficiency = self
            .efficiency
            .as_ref()
            .map(|p| flow.iter().map(|&q| p.eval(&self.flow, q)).collect());
        let power = self
            .power
            .as_ref()
            .map(|p| flow.iter().map(|&q| p.eval(&self.flow, q)).collect());

        Ok(CurveSampling {
            flow,
            head,
            efficiency,
            power,
        })
    }
}

impl HeadCurve for CurveModel {
    fn domain(&self) -> FlowDomain {
        FlowDomain {
            min: self.min_flow(),
            max: self.max_flow(),
        }
    }

    fn head_at(&self, flow: f64) -> f64 {
        CurveModel::head_at(self, flow)
    }
}

/// Dense evaluation of a curve, suitable for plotting.
#[derive(Clone, Debug, PartialEq)]
pub struct CurveSampling {
    pub flow: Vec<f64>,
    pub head: Vec<f64>,
    pub efficiency: Option<Vec<f64>>,
    pub power: Option<Vec<f64>>,
}

fn check_channel(name: &str, values: &[f64], expected: usize) -> CurveResult<()> {
    if values.len() != expected {
        return Err(CurveError::invalid_curve(format!(
            "{name} has {} samples, flow has {expected}",
            values.len()
        )));
    }
    if let Some(i) = values.iter().position(|v| !v.is_finite()) {
        return Err(CurveError::invalid_curve(format!(
            "{name} is not finite at index {i}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_core::numeric::{Tolerances, nearly_equal};
    use uom::si::length::foot;
    use uom::si::volume_rate::gallon_per_minute;

    fn sample_curve() -> CurveModel {
        CurveModel::new(
            CurveSamples::new(vec![0.0, 0.01, 0.02], vec![40.0, 30.0, 10.0])
                .with_efficiency(vec![0.6, 0.75, 0.7])
                .with_power(vec![1000.0, 1200.0, 1500.0]),
        )
        .unwrap()
    }

    #[test]
    fn lookups_hit_samples() {
        let c = sample_curve();
        assert!(nearly_equal(c.head_at(0.01), 30.0, Tolerances::absolute(1e-9)));
        assert!(nearly_equal(c.efficiency_at(0.01).unwrap(), 0.75, Tolerances::absolute(1e-9)));
        assert!(nearly_equal(c.power_at(0.0).unwrap(), 1000.0, Tolerances::absolute(1e-9)));
    }

    #[test]
    fn missing_channels_are_absent() {
        let c = CurveModel::from_flow_head(vec![0.0, 1.0], vec![5.0, 1.0]).unwrap();
        assert!(c.efficiency_at(0.5).is_none());
        assert!(c.power_at(0.5).is_none());
        assert!(c.npshr_at(0.5).is_none());
        assert!(c.efficiency().is_none());
    }

    #[test]
    fn npshr_channel() {
        let c = CurveModel::new(
            CurveSamples::new(vec![0.0, 0.01, 0.02], vec![40.0, 30.0, 10.0])
                .with_npshr(vec![1.0, 2.0, 4.0]),
        )
        .unwrap();
        assert!(nearly_equal(c.npshr_at(0.01).unwrap(), 2.0, Tolerances::absolute(1e-9)));
    }

    #[test]
    fn rejects_non_increasing_flow() {
        let err = CurveModel::from_flow_head(vec![0.0, 0.02, 0.01], vec![40.0, 30.0, 10.0])
            .unwrap_err();
        assert!(matches!(err, CurveError::InvalidCurve { .. }));

        let err =
            CurveModel::from_flow_head(vec![0.0, 0.01, 0.01], vec![40.0, 30.0, 10.0]).unwrap_err();
        assert!(err.to_string().contains("strictly increasing"));
    }

    #[test]
    fn rejects_negative_values() {
        assert!(CurveModel::from_flow_head(vec![-0.01, 0.01], vec![40.0, 30.0]).is_err());
        assert!(CurveModel::from_flow_head(vec![0.0, 0.01], vec![40.0, -1.0]).is_err());
    }

    #[test]
    fn rejects_bad_shapes() {
        assert!(CurveModel::from_flow_head(vec![0.0], vec![40.0]).is_err());
        assert!(CurveModel::from_flow_head(vec![0.0, 0.01], vec![40.0]).is_err());
        let err = CurveModel::new(
            CurveSamples::new(vec![0.0, 0.01], vec![40.0, 30.0]).with_efficiency(vec![0.5]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("efficiency"));
        assert!(CurveModel::from_flow_head(vec![0.0, f64::NAN], vec![40.0, 30.0]).is_err());
    }

    #[test]
    fn quantities_convert_to_si() {
        let flow = [
            VolumeRate::new::<gallon_per_minute>(0.0),
            VolumeRate::new::<gallon_per_minute>(500.0),
        ];
        let head = [Length::new::<foot>(150.0), Length::new::<foot>(120.0)];
        let c = CurveModel::new(CurveSamples::from_quantities(&flow, &head)).unwrap();
        assert!(nearly_equal(c.max_flow(), 0.031_545_098, Tolerances::absolute(1e-8)));
        assert!(nearly_equal(c.head()[0], 45.72, Tolerances::absolute(1e-9)));
    }

    #[test]
    fn sampling_spans_range() {
        let c = sample_curve();
        let s = c.sample(DEFAULT_SAMPLE_POINTS).unwrap();
        assert_eq!(s.flow.len(), DEFAULT_SAMPLE_POINTS);
        assert_eq!(s.flow[0], 0.0);
        assert_eq!(s.flow[DEFAULT_SAMPLE_POINTS - 1], 0.02);
        assert_eq!(s.efficiency.as_ref().map(Vec::len), Some(DEFAULT_SAMPLE_POINTS));
        assert!(c.sample(1).is_err());
    }

    #[test]
    fn head_bounds() {
        let c = sample_curve();
        assert_eq!(c.min_head(), 10.0);
        assert_eq!(c.max_head(), 40.0);
        assert_eq!(c.domain(), FlowDomain { min: 0.0, max: 0.02 });
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn repeated_lookups_are_identical(q in -0.01_f64..0.05) {
            let c = CurveModel::new(
                CurveSamples::new(vec![0.0, 0.01, 0.02, 0.03], vec![40.0, 36.0, 28.0, 15.0])
                    .with_efficiency(vec![0.0, 0.6, 0.78, 0.7]),
            )
            .unwrap();
            prop_assert_eq!(c.head_at(q).to_bits(), c.head_at(q).to_bits());
            prop_assert_eq!(
                c.efficiency_at(q).map(f64::to_bits),
                c.efficiency_at(q).map(f64::to_bits)
            );
        }
    }
}
