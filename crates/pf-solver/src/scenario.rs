//! Scenario orchestration.
//!
//! A scenario is one system curve plus an ordered list of pump entries, each
//! with a unit count, an arrangement and a list of drive speed ratios. Every
//! `(entry, speed ratio)` combination is solved independently:
//!
//! 1. build the aggregate curve of `count` units at that speed
//! 2. search its flow domain for the crossing with the system curve
//! 3. read efficiency and power off the unit curve at the per-unit flow
//!
//! A combination without a crossing is reported as skipped; it never aborts
//! its siblings. Invalid inputs (zero count, non-positive speed) abort the
//! whole scenario before any solving starts.

use crate::error::{SolverError, SolverResult};
use crate::intersection::{IntersectionConfig, find_operating_point_with_config};
use pf_core::units::{Length, Power, VolumeRate, m, m3ps, w};
use pf_curves::{
    Arrangement, Band, CurveError, CurveModel, DEFAULT_AOR, DEFAULT_POR, SystemCurve, build,
    scale,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// One line of a scenario: identical units on a shared curve.
#[derive(Clone, Debug)]
pub struct PumpEntry<'a> {
    /// Display name of the pump model
    pub name: String,
    /// Rated-speed unit curve
    pub curve: &'a CurveModel,
    /// Number of identical units
    pub count: u32,
    /// How the units are connected
    pub arrangement: Arrangement,
    /// Drive speeds to evaluate, as fractions of rated speed
    pub speed_ratios: Vec<f64>,
}

impl<'a> PumpEntry<'a> {
    /// Entry running at rated speed only.
    pub fn new(
        name: impl Into<String>,
        curve: &'a CurveModel,
        count: u32,
        arrangement: Arrangement,
    ) -> Self {
        Self {
            name: name.into(),
            curve,
            count,
            arrangement,
            speed_ratios: vec![1.0],
        }
    }

    pub fn with_speeds(mut self, speed_ratios: Vec<f64>) -> Self {
        self.speed_ratios = speed_ratios;
        self
    }

    /// Label used on every result of this entry, e.g. `"Pump A x2 parallel"`.
    pub fn configuration(&self) -> String {
        format!("{} x{} {}", self.name, self.count, self.arrangement)
    }
}

/// Everything needed to solve one scenario.
#[derive(Clone, Debug)]
pub struct Scenario<'a> {
    pub name: String,
    pub system: &'a SystemCurve,
    pub entries: Vec<PumpEntry<'a>>,
    /// POR as fractions of BEP flow
    pub por: Band,
    /// AOR as fractions of BEP flow
    pub aor: Band,
}

impl<'a> Scenario<'a> {
    pub fn new(name: impl Into<String>, system: &'a SystemCurve) -> Self {
        Self {
            name: name.into(),
            system,
            entries: Vec::new(),
            por: DEFAULT_POR,
            aor: DEFAULT_AOR,
        }
    }

    pub fn with_entry(mut self, entry: PumpEntry<'a>) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn with_ranges(mut self, por: Band, aor: Band) -> Self {
        self.por = por;
        self.aor = aor;
        self
    }

    /// Number of `(entry, speed ratio)` combinations.
    pub fn combination_count(&self) -> usize {
        self.entries.iter().map(|e| e.speed_ratios.len()).sum()
    }

    /// Reject inputs that would make any combination meaningless.
    pub fn validate(&self) -> SolverResult<()> {
        for (index, entry) in self.entries.iter().enumerate() {
            if entry.count == 0 {
                return Err(CurveError::ZeroCount { index }.into());
            }
            for &ratio in &entry.speed_ratios {
                scale(entry.curve, ratio)?;
            }
        }
        Ok(())
    }
}

/// Scenario solver settings.
#[derive(Clone, Copy, Debug)]
pub struct ScenarioOptions {
    /// Solve combinations on the rayon thread pool
    pub parallel: bool,
    pub intersection: IntersectionConfig,
}

impl Default for ScenarioOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            intersection: IntersectionConfig::default(),
        }
    }
}

/// Solved operating point of one combination (SI units).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OperatingPoint {
    pub configuration: String,
    pub speed_ratio: f64,
    /// Total flow through the arrangement, m^3/s
    pub flow: f64,
    /// Total head across the arrangement, m
    pub head: f64,
    /// Unit efficiency at the per-unit flow
    pub efficiency: Option<f64>,
    /// Total shaft power of all units, W
    pub power: Option<f64>,
}

impl OperatingPoint {
    pub fn flow_rate(&self) -> VolumeRate {
        m3ps(self.flow)
    }

    pub fn head_length(&self) -> Length {
        m(self.head)
    }

    pub fn shaft_power(&self) -> Option<Power> {
        self.power.map(w)
    }
}

/// Why a combination produced no operating point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// The curves do not cross anywhere the scan could see
    NoIntersection { lo: f64, hi: f64 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct SolvedCombination {
    pub entry_index: usize,
    /// Flow through a single unit
    pub unit_flow: f64,
    pub point: OperatingPoint,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkippedCombination {
    #[serde(skip)]
    pub entry_index: usize,
    pub configuration: String,
    pub speed_ratio: f64,
    pub reason: SkipReason,
}

/// Result of one `(entry, speed ratio)` combination.
#[derive(Clone, Debug, PartialEq)]
pub enum CombinationOutcome {
    Solved(SolvedCombination),
    Skipped(SkippedCombination),
}

impl CombinationOutcome {
    pub fn operating_point(&self) -> Option<&OperatingPoint> {
        match self {
            Self::Solved(solved) => Some(&solved.point),
            Self::Skipped(_) => None,
        }
    }

    pub fn into_operating_point(self) -> Option<OperatingPoint> {
        match self {
            Self::Solved(solved) => Some(solved.point),
            Self::Skipped(_) => None,
        }
    }
}

/// Per-unit flow of `total` through `count` units.
pub fn unit_flow(arrangement: Arrangement, total: f64, count: u32) -> f64 {
    match arrangement {
        Arrangement::Parallel => total / f64::from(count.max(1)),
        Arrangement::Series => total,
    }
}

/// Solve one combination against `system`.
///
/// # Errors
/// Only for invalid inputs; a missing crossing is `Ok(Skipped)`.
pub fn solve_combination(
    system: &SystemCurve,
    entry_index: usize,
    entry: &PumpEntry<'_>,
    speed_ratio: f64,
    config: &IntersectionConfig,
) -> SolverResult<CombinationOutcome> {
    let configuration = entry.configuration();
    let aggregate = build(
        entry.arrangement,
        &[entry.curve],
        &[speed_ratio],
        &[entry.count],
    )?;
    let domain = aggregate.domain();

    let found = find_operating_point_with_config(
        domain,
        |q| aggregate.head_at(q),
        |q| system.head_at(q),
        config,
    );
    let intersection = match found {
        Ok(intersection) => intersection,
        Err(SolverError::NoIntersection { lo, hi }) => {
            tracing::warn!(
                configuration = %configuration,
                speed_ratio,
                lo,
                hi,
                "no operating point, skipping combination"
            );
            return Ok(CombinationOutcome::Skipped(SkippedCombination {
                entry_index,
                configuration,
                speed_ratio,
                reason: SkipReason::NoIntersection { lo, hi },
            }));
        }
        Err(e) => return Err(e),
    };

    let unit_flow = unit_flow(entry.arrangement, intersection.flow, entry.count);
    let unit = scale(entry.curve, speed_ratio)?;
    let efficiency = unit.efficiency_at(unit_flow);
    let power = unit
        .power_at(unit_flow)
        .map(|p| p * f64::from(entry.count));

    tracing::debug!(
        configuration = %configuration,
        speed_ratio,
        flow = intersection.flow,
        head = intersection.head,
        "operating point found"
    );

    Ok(CombinationOutcome::Solved(SolvedCombination {
        entry_index,
        unit_flow,
        point: OperatingPoint {
            configuration,
            speed_ratio,
            flow: intersection.flow,
            head: intersection.head,
            efficiency,
            power,
        },
    }))
}

/// Solve every combination, in entry order then speed order.
///
/// Output order does not depend on `options.parallel`.
pub fn solve_scenario_outcomes(
    scenario: &Scenario<'_>,
    options: &ScenarioOptions,
) -> SolverResult<Vec<CombinationOutcome>> {
    scenario.validate()?;

    let combinations: Vec<(usize, &PumpEntry<'_>, f64)> = scenario
        .entries
        .iter()
        .enumerate()
        .flat_map(|(i, entry)| entry.speed_ratios.iter().map(move |&r| (i, entry, r)))
        .collect();

    tracing::info!(
        scenario = %scenario.name,
        combinations = combinations.len(),
        parallel = options.parallel,
        "solving scenario"
    );

    let solve_one = |&(i, entry, ratio): &(usize, &PumpEntry<'_>, f64)| {
        solve_combination(scenario.system, i, entry, ratio, &options.intersection)
    };
    let outcomes: Vec<CombinationOutcome> = if options.parallel {
        combinations.par_iter().map(solve_one).collect::<SolverResult<_>>()?
    } else {
        combinations.iter().map(solve_one).collect::<SolverResult<_>>()?
    };

    let solved = outcomes
        .iter()
        .filter(|o| o.operating_point().is_some())
        .count();
    tracing::info!(
        scenario = %scenario.name,
        solved,
        skipped = outcomes.len() - solved,
        "scenario solved"
    );
    Ok(outcomes)
}

/// Ordered operating points of every combination that has one.
pub fn solve_scenario_with_options(
    scenario: &Scenario<'_>,
    options: &ScenarioOptions,
) -> SolverResult<Vec<OperatingPoint>> {
    Ok(solve_scenario_outcomes(scenario, options)?
        .into_iter()
        .filter_map(CombinationOutcome::into_operating_point)
        .collect())
}

/// [`solve_scenario_with_options`] with default options.
pub fn solve_scenario(scenario: &Scenario<'_>) -> SolverResult<Vec<OperatingPoint>> {
    solve_scenario_with_options(scenario, &ScenarioOptions::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_core::numeric::{Tolerances, nearly_equal};
    use pf_curves::{CurveSamples, FlowDomain};

    fn pump() -> CurveModel {
        CurveModel::new(
            CurveSamples::new(vec![0.0, 0.01, 0.02, 0.03], vec![40.0, 37.0, 30.0, 18.0])
                .with_efficiency(vec![0.0, 0.55, 0.75, 0.68])
                .with_power(vec![3000.0, 5000.0, 7000.0, 8000.0]),
        )
        .unwrap()
    }

    fn system(k: f64) -> SystemCurve {
        SystemCurve::parametric(10.0, k, vec![], FlowDomain::new(0.0, 0.1).unwrap()).unwrap()
    }

    #[test]
    fn configuration_label() {
        let c = pump();
        let entry = PumpEntry::new("Pump A", &c, 2, Arrangement::Parallel);
        assert_eq!(entry.configuration(), "Pump A x2 parallel");
        let entry = PumpEntry::new("B", &c, 1, Arrangement::Series);
        assert_eq!(entry.configuration(), "B x1 series");
    }

    #[test]
    fn parallel_pair_reads_unit_curve_at_half_flow() {
        let c = pump();
        let sys = system(20_000.0);
        let entry = PumpEntry::new("P", &c, 2, Arrangement::Parallel);
        let outcome =
            solve_combination(&sys, 0, &entry, 1.0, &IntersectionConfig::default()).unwrap();
        let CombinationOutcome::Solved(solved) = outcome else {
            panic!("expected a solved combination");
        };
        let p = &solved.point;
        assert!(nearly_equal(solved.unit_flow, p.flow / 2.0, Tolerances::absolute(1e-15)));
        assert!(nearly_equal(p.head, sys.head_at(p.flow), Tolerances::absolute(1e-6)));
        assert!(nearly_equal(p.head, c.head_at(solved.unit_flow), Tolerances::absolute(1e-6)));
        let eff = p.efficiency.unwrap();
        assert!(nearly_equal(
            eff,
            c.efficiency_at(solved.unit_flow).unwrap(),
            Tolerances::absolute(1e-12)
        ));
        let power = p.power.unwrap();
        assert!(nearly_equal(
            power,
            2.0 * c.power_at(solved.unit_flow).unwrap(),
            Tolerances::absolute(1e-9)
        ));
    }

    #[test]
    fn series_pair_uses_total_flow() {
        let c = pump();
        let sys = system(50_000.0);
        let entry = PumpEntry::new("S", &c, 2, Arrangement::Series);
        let outcome =
            solve_combination(&sys, 0, &entry, 1.0, &IntersectionConfig::default()).unwrap();
        let CombinationOutcome::Solved(solved) = outcome else {
            panic!("expected a solved combination");
        };
        assert_eq!(solved.unit_flow, solved.point.flow);
        let p = &solved.point;
        assert!(nearly_equal(p.head, 2.0 * c.head_at(p.flow), Tolerances::absolute(1e-6)));
        assert!(nearly_equal(
            p.efficiency.unwrap(),
            c.efficiency_at(p.flow).unwrap(),
            Tolerances::absolute(1e-12)
        ));
        assert!(nearly_equal(
            p.power.unwrap(),
            2.0 * c.power_at(p.flow).unwrap(),
            Tolerances::absolute(1e-9)
        ));
    }

    #[test]
    fn steep_system_is_skipped_not_fatal() {
        let c = pump();
        let sys = SystemCurve::parametric(
            100.0,
            1.0e6,
            vec![],
            FlowDomain::new(0.0, 0.1).unwrap(),
        )
        .unwrap();
        let entry = PumpEntry::new("P", &c, 1, Arrangement::Parallel);
        let outcome =
            solve_combination(&sys, 3, &entry, 1.0, &IntersectionConfig::default()).unwrap();
        match outcome {
            CombinationOutcome::Skipped(s) => {
                assert_eq!(s.entry_index, 3);
                assert!(matches!(s.reason, SkipReason::NoIntersection { .. }));
            }
            CombinationOutcome::Solved(_) => panic!("expected skip"),
        }
    }

    #[test]
    fn zero_count_aborts_scenario() {
        let c = pump();
        let sys = system(20_000.0);
        let scenario = Scenario::new("bad", &sys)
            .with_entry(PumpEntry::new("ok", &c, 1, Arrangement::Parallel))
            .with_entry(PumpEntry::new("zero", &c, 0, Arrangement::Parallel));
        let err = solve_scenario(&scenario).unwrap_err();
        assert_eq!(err, SolverError::Curve(CurveError::ZeroCount { index: 1 }));
    }

    #[test]
    fn bad_speed_aborts_scenario() {
        let c = pump();
        let sys = system(20_000.0);
        let scenario = Scenario::new("bad", &sys).with_entry(
            PumpEntry::new("P", &c, 1, Arrangement::Parallel).with_speeds(vec![1.0, 0.0]),
        );
        assert!(matches!(
            solve_scenario(&scenario),
            Err(SolverError::Curve(CurveError::InvalidSpeedRatio { .. }))
        ));
    }

    #[test]
    fn empty_speed_list_contributes_nothing() {
        let c = pump();
        let sys = system(20_000.0);
        let scenario = Scenario::new("empty", &sys)
            .with_entry(PumpEntry::new("P", &c, 1, Arrangement::Parallel).with_speeds(vec![]));
        assert_eq!(scenario.combination_count(), 0);
        assert!(solve_scenario(&scenario).unwrap().is_empty());
    }

    #[test]
    fn unit_flow_splits_parallel_only() {
        assert_eq!(unit_flow(Arrangement::Parallel, 0.5, 2), 0.25);
        assert_eq!(unit_flow(Arrangement::Series, 0.5, 2), 0.5);
    }

    #[test]
    fn typed_accessors() {
        let p = OperatingPoint {
            configuration: "x".into(),
            speed_ratio: 1.0,
            flow: 0.02,
            head: 30.0,
            efficiency: None,
            power: Some(7000.0),
        };
        assert_eq!(p.flow_rate().value, 0.02);
        assert_eq!(p.head_length().value, 30.0);
        assert_eq!(p.shaft_power().map(|q| q.value), Some(7000.0));
    }
}
