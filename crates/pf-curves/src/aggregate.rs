//! Combining several pump units into one virtual head-versus-flow curve.
//!
//! ## Parallel
//!
//! Units share the same head and their flows add:
//!
//! ```text
//! Q_total(H) = sum_i count_i * Q_i(H)
//! ```
//!
//! `head_at(Q)` inverts that sum by bracketed root finding on H.
//!
//! ## Series
//!
//! Units pass the same flow and their heads add:
//!
//! ```text
//! H_total(Q) = sum_i count_i * H_i(Q)
//! ```
//!
//! The domain is the overlap of the per-unit scaled flow ranges.

use crate::affinity::{AffinityView, scale};
use crate::curve::CurveModel;
use crate::error::{CurveError, CurveResult};
use crate::traits::{FlowDomain, HeadCurve};
use core::fmt;
use pf_core::roots::{RootConfig, brent};

/// Hydraulic connection of pump units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Arrangement {
    /// Flows add at equal head
    Parallel,
    /// Heads add at equal flow
    Series,
}

impl fmt::Display for Arrangement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parallel => write!(f, "parallel"),
            Self::Series => write!(f, "series"),
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Unit<'a> {
    view: AffinityView<'a>,
    count: f64,
}

/// Virtual curve of several (speed-scaled, multiplied) pump units.
///
/// Holds only borrowed views of the input curves.
#[derive(Clone, Debug)]
pub struct AggregateCurve<'a> {
    arrangement: Arrangement,
    units: Vec<Unit<'a>>,
    domain: FlowDomain,
    root: RootConfig,
}

/// Build the parallel aggregate of `curves` at `ratios` with `counts` units each.
///
/// # Errors
/// `EmptyCurveSet` for no curves, `CountMismatch`/`ZeroCount` for inconsistent
/// inputs, `InvalidSpeedRatio` from the scaling step.
pub fn build_parallel<'a>(
    curves: &[&'a CurveModel],
    ratios: &[f64],
    counts: &[u32],
) -> CurveResult<AggregateCurve<'a>> {
    let units = scaled_units(curves, ratios, counts)?;
    let min = units.iter().map(|u| u.count * u.view.min_flow()).sum();
    let max = units.iter().map(|u| u.count * u.view.max_flow()).sum();

    Ok(AggregateCurve {
        arrangement: Arrangement::Parallel,
        units,
        domain: FlowDomain::new(min, max)?,
        root: RootConfig::default(),
    })
}

/// Build the series aggregate of `curves` at `ratios` with `counts` units each.
///
/// # Errors
/// As [`build_parallel`], plus `InvalidDomain` when the scaled flow ranges do
/// not overlap.
pub fn build_series<'a>(
    curves: &[&'a CurveModel],
    ratios: &[f64],
    counts: &[u32],
) -> CurveResult<AggregateCurve<'a>> {
    let units = scaled_units(curves, ratios, counts)?;
    let min = units
        .iter()
        .map(|u| u.view.min_flow())
        .fold(f64::NEG_INFINITY, f64::max);
    let max = units
        .iter()
        .map(|u| u.view.max_flow())
        .fold(f64::INFINITY, f64::min);

    Ok(AggregateCurve {
        arrangement: Arrangement::Series,
        units,
        domain: FlowDomain::new(min, max)?,
        root: RootConfig::default(),
    })
}

/// Build either arrangement.
pub fn build<'a>(
    arrangement: Arrangement,
    curves: &[&'a CurveModel],
    ratios: &[f64],
    counts: &[u32],
) -> CurveResult<AggregateCurve<'a>> {
    match arrangement {
        Arrangement::Parallel => build_parallel(curves, ratios, counts),
        Arrangement::Series => build_series(curves, ratios, counts),
    }
}

fn scaled_units<'a>(
    curves: &[&'a CurveModel],
    ratios: &[f64],
    counts: &[u32],
) -> CurveResult<Vec<Unit<'a>>> {
    if curves.is_empty() {
        return Err(CurveError::EmptyCurveSet);
    }
    if curves.len() != ratios.len() || curves.len() != counts.len() {
        return Err(CurveError::CountMismatch {
            curves: curves.len(),
            ratios: ratios.len(),
            counts: counts.len(),
        });
    }
    if let Some(index) = counts.iter().position(|&c| c == 0) {
        return Err(CurveError::ZeroCount { index });
    }

    curves
        .iter()
        .zip(ratios)
        .zip(counts)
        .map(|((curve, &ratio), &count)| {
            Ok(Unit {
                view: scale(curve, ratio)?,
                count: f64::from(count),
            })
        })
        .collect()
}

impl<'a> AggregateCurve<'a> {
    pub fn arrangement(&self) -> Arrangement {
        self.arrangement
    }

    pub fn domain(&self) -> FlowDomain {
        self.domain
    }

    /// Override the root finder settings used by parallel inversion.
    pub fn with_root_config(mut self, root: RootConfig) -> Self {
        self.root = root;
        self
    }

    /// Head of the combined units at `flow`.
    pub fn head_at(&self, flow: f64) -> f64 {
        match self.arrangement {
            Arrangement::Parallel => self.parallel_head(flow),
            Arrangement::Series => self
                .units
                .iter()
                .map(|u| u.count * u.view.head_at(flow))
                .sum(),
        }
    }

    /// Total parallel flow delivered when every unit runs at `head`.
    pub fn flow_at_head(&self, head: f64) -> f64 {
        self.units
            .iter()
            .map(|u| u.count * self.unit_flow_at_head(&u.view, head))
            .sum()
    }

    fn parallel_head(&self, flow: f64) -> f64 {
        let low_head = self
            .units
            .iter()
            .map(|u| u.view.min_head())
            .fold(f64::INFINITY, f64::min);
        let high_head = self
            .units
            .iter()
            .map(|u| u.view.max_head())
            .fold(f64::NEG_INFINITY, f64::max);

        if flow <= self.domain.min {
            return high_head;
        }
        if flow >= self.domain.max {
            return low_head;
        }
        self.solve_or_nearest(|h| self.flow_at_head(h) - flow, low_head, high_head)
    }

    fn unit_flow_at_head(&self, view: &AffinityView<'_>, head: f64) -> f64 {
        let low_flow = view.min_flow();
        let high_flow = view.max_flow();

        if head >= view.head_at(low_flow) {
            return low_flow;
        }
        if head <= view.head_at(high_flow) {
            return high_flow;
        }
        self.solve_or_nearest(|q| view.head_at(q) - head, low_flow, high_flow)
    }

    /// The brackets used here always straddle a root for continuous curves; if
    /// the root finder still refuses, fall back to the better endpoint.
    fn solve_or_nearest<F>(&self, f: F, lo: f64, hi: f64) -> f64
    where
        F: Fn(f64) -> f64,
    {
        match brent(&f, lo, hi, &self.root) {
            Ok(result) => result.root,
            Err(e) => {
                tracing::warn!(error = %e, lo, hi, "aggregate inversion fell back to bracket end");
                if f(lo).abs() <= f(hi).abs() { lo } else { hi }
            }
        }
    }
}

impl HeadCurve for AggregateCurve<'_> {
    fn domain(&self) -> FlowDomain {
        self.domain
    }

    fn head_at(&self, flow: f64) -> f64 {
        AggregateCurve::head_at(self, flow)
    }
}
