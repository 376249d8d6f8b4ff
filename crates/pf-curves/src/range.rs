//! Best efficiency point and the preferred/allowable operating ranges.

use crate::curve::CurveModel;
use crate::error::{CurveError, CurveResult};

/// Smallest flow used in the head/flow fallback, avoids dividing by shutoff flow.
pub const MIN_FLOW_FOR_SPECIFIC_ENERGY: f64 = 1e-6;

/// How the BEP was located.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BepMethod {
    /// Sample with maximum efficiency
    MaxEfficiency,
    /// Sample with minimum head/flow, used without usable efficiency data
    MinSpecificEnergy,
}

/// Best efficiency point of a curve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BestEfficiencyPoint {
    pub index: usize,
    pub flow: f64,
    pub head: f64,
    pub efficiency: Option<f64>,
    pub method: BepMethod,
}

/// Closed interval `(low, high)`; used both for BEP fractions and for flows.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Band {
    pub low: f64,
    pub high: f64,
}

impl Band {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }

    fn scaled(&self, factor: f64) -> Band {
        Band::new(self.low * factor, self.high * factor)
    }
}

/// Default POR as fractions of BEP flow.
pub const DEFAULT_POR: Band = Band::new(0.7, 1.2);
/// Default AOR as fractions of BEP flow.
pub const DEFAULT_AOR: Band = Band::new(0.5, 1.2);

/// Preferred and allowable operating ranges in flow units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OperatingRange {
    pub por: Band,
    pub aor: Band,
}

/// Where a flow sits relative to an [`OperatingRange`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RangeZone {
    Preferred,
    Allowable,
    Outside,
}

impl OperatingRange {
    pub fn classify(&self, flow: f64) -> RangeZone {
        if self.por.contains(flow) {
            RangeZone::Preferred
        } else if self.aor.contains(flow) {
            RangeZone::Allowable
        } else {
            RangeZone::Outside
        }
    }
}

/// Locate the BEP among the curve samples.
///
/// Uses the first sample of maximum efficiency when any efficiency is
/// positive, otherwise the first sample minimising `head / max(flow, 1e-6)`.
pub fn best_efficiency_point(curve: &CurveModel) -> BestEfficiencyPoint {
    let flow = curve.flow();
    let head = curve.head();

    let by_efficiency = curve
        .efficiency()
        .filter(|eff| eff.iter().any(|&e| e > 0.0))
        .map(|eff| first_extreme(eff, |a, b| a > b));

    let (index, method) = match by_efficiency {
        Some(i) => (i, BepMethod::MaxEfficiency),
        None => {
            let energy: Vec<f64> = flow
                .iter()
                .zip(head)
                .map(|(q, h)| h / q.max(MIN_FLOW_FOR_SPECIFIC_ENERGY))
                .collect();
            (first_extreme(&energy, |a, b| a < b), BepMethod::MinSpecificEnergy)
        }
    };

    BestEfficiencyPoint {
        index,
        flow: flow[index],
        head: head[index],
        efficiency: curve.efficiency().map(|eff| eff[index]),
        method,
    }
}

/// Index of the first value that no later value beats under `better`.
fn first_extreme(values: &[f64], better: impl Fn(f64, f64) -> bool) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if better(v, values[best]) {
            best = i;
        }
    }
    best
}

/// POR/AOR flow bands from a BEP flow and fraction pairs.
///
/// # Errors
/// `NonPositiveBep` if `bep_flow <= 0` (or is NaN).
pub fn operating_range(bep_flow: f64, por: Band, aor: Band) -> CurveResult<OperatingRange> {
    if bep_flow.is_nan() || bep_flow <= 0.0 {
        return Err(CurveError::NonPositiveBep { bep_flow });
    }
    Ok(OperatingRange {
        por: por.scaled(bep_flow),
        aor: aor.scaled(bep_flow),
    })
}
