//! Scenario report: operating points placed against each pump's BEP ranges.

use crate::error::SolverResult;
use crate::scenario::{
    CombinationOutcome, OperatingPoint, Scenario, ScenarioOptions, SkippedCombination,
    solve_scenario_outcomes,
};
use pf_curves::{Band, BepMethod, OperatingRange, RangeZone, best_efficiency_point, operating_range};
use serde::{Deserialize, Serialize};

/// Serializable mirror of [`RangeZone`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatingZone {
    Preferred,
    Allowable,
    Outside,
}

impl From<RangeZone> for OperatingZone {
    fn from(zone: RangeZone) -> Self {
        match zone {
            RangeZone::Preferred => Self::Preferred,
            RangeZone::Allowable => Self::Allowable,
            RangeZone::Outside => Self::Outside,
        }
    }
}

/// Flow interval in m^3/s.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlowBand {
    pub low: f64,
    pub high: f64,
}

impl From<Band> for FlowBand {
    fn from(band: Band) -> Self {
        Self {
            low: band.low,
            high: band.high,
        }
    }
}

/// Rated-speed BEP and ranges of one scenario entry, per unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PumpSummary {
    pub configuration: String,
    pub bep_flow: f64,
    pub bep_head: f64,
    pub bep_efficiency: Option<f64>,
    /// `true` when the BEP came from efficiency data
    pub bep_from_efficiency: bool,
    pub por: Option<FlowBand>,
    pub aor: Option<FlowBand>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReportedPoint {
    #[serde(flatten)]
    pub point: OperatingPoint,
    /// Flow through a single unit, m^3/s
    pub unit_flow: f64,
    /// Position of the unit flow in the speed-scaled ranges; absent if the
    /// BEP flow is not positive
    pub zone: Option<OperatingZone>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub scenario: String,
    pub pumps: Vec<PumpSummary>,
    pub operating_points: Vec<ReportedPoint>,
    pub skipped: Vec<SkippedCombination>,
}

impl ScenarioReport {
    pub fn points(&self) -> impl Iterator<Item = &OperatingPoint> {
        self.operating_points.iter().map(|p| &p.point)
    }
}

struct EntryRanges {
    summary: PumpSummary,
    bep_flow: f64,
}

/// Solve `scenario` and attach BEP information to every result.
pub fn solve_scenario_report(
    scenario: &Scenario<'_>,
    options: &ScenarioOptions,
) -> SolverResult<ScenarioReport> {
    let outcomes = solve_scenario_outcomes(scenario, options)?;

    let ranges: Vec<EntryRanges> = scenario
        .entries
        .iter()
        .map(|entry| {
            let bep = best_efficiency_point(entry.curve);
            let rated = operating_range(bep.flow, scenario.por, scenario.aor).ok();
            EntryRanges {
                summary: PumpSummary {
                    configuration: entry.configuration(),
                    bep_flow: bep.flow,
                    bep_head: bep.head,
                    bep_efficiency: bep.efficiency,
                    bep_from_efficiency: bep.method == BepMethod::MaxEfficiency,
                    por: rated.map(|r| r.por.into()),
                    aor: rated.map(|r| r.aor.into()),
                },
                bep_flow: bep.flow,
            }
        })
        .collect();

    let mut operating_points = Vec::new();
    let mut skipped = Vec::new();
    for outcome in outcomes {
        match outcome {
            CombinationOutcome::Solved(solved) => {
                let zone = ranges.get(solved.entry_index).and_then(|r| {
                    scaled_range(r.bep_flow, solved.point.speed_ratio, scenario)
                        .map(|range| range.classify(solved.unit_flow).into())
                });
                operating_points.push(ReportedPoint {
                    point: solved.point,
                    unit_flow: solved.unit_flow,
                    zone,
                });
            }
            CombinationOutcome::Skipped(s) => skipped.push(s),
        }
    }

    Ok(ScenarioReport {
        scenario: scenario.name.clone(),
        pumps: ranges.into_iter().map(|r| r.summary).collect(),
        operating_points,
        skipped,
    })
}

/// BEP flow moves linearly with speed, so the ranges do too.
fn scaled_range(
    bep_flow: f64,
    speed_ratio: f64,
    scenario: &Scenario<'_>,
) -> Option<OperatingRange> {
    operating_range(bep_flow * speed_ratio, scenario.por, scenario.aor).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::PumpEntry;
    use pf_core::numeric::{Tolerances, nearly_equal};
    use pf_curves::{Arrangement, CurveModel, CurveSamples, FlowDomain, SystemCurve};

    fn pump() -> CurveModel {
        CurveModel::new(
            CurveSamples::new(
                vec![0.0, 0.01, 0.02, 0.03, 0.04],
                vec![40.0, 38.0, 34.0, 27.0, 17.0],
            )
            .with_efficiency(vec![0.0, 0.5, 0.72, 0.78, 0.65]),
        )
        .unwrap()
    }

    #[test]
    fn report_classifies_points_against_scaled_ranges() {
        let curve = pump();
        let system = SystemCurve::parametric(
            5.0,
            25_000.0,
            vec![],
            FlowDomain::new(0.0, 0.1).unwrap(),
        )
        .unwrap();
        let scenario = Scenario::new("r", &system).with_entry(
            PumpEntry::new("P", &curve, 1, Arrangement::Parallel).with_speeds(vec![1.0, 0.9]),
        );
        let report = solve_scenario_report(&scenario, &ScenarioOptions::default()).unwrap();

        assert_eq!(report.scenario, "r");
        assert_eq!(report.pumps.len(), 1);
        let summary = &report.pumps[0];
        assert_eq!(summary.bep_flow, 0.03);
        assert!(summary.bep_from_efficiency);
        let por = summary.por.unwrap();
        assert!(nearly_equal(por.low, 0.021, Tolerances::absolute(1e-12)));
        assert!(nearly_equal(por.high, 0.036, Tolerances::absolute(1e-12)));

        assert_eq!(report.operating_points.len(), 2);
        for p in &report.operating_points {
            let range =
                operating_range(0.03 * p.point.speed_ratio, scenario.por, scenario.aor).unwrap();
            assert_eq!(p.zone, Some(range.classify(p.unit_flow).into()));
        }
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn skipped_combinations_are_listed() {
        let curve = pump();
        let system = SystemCurve::parametric(
            100.0,
            0.0,
            vec![],
            FlowDomain::new(0.0, 0.1).unwrap(),
        )
        .unwrap();
        let scenario = Scenario::new("s", &system)
            .with_entry(PumpEntry::new("P", &curve, 2, Arrangement::Series));
        let report = solve_scenario_report(&scenario, &ScenarioOptions::default()).unwrap();
        assert!(report.operating_points.is_empty());
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].configuration, "P x2 series");
    }

    #[test]
    fn report_serializes_to_json() {
        let curve = pump();
        let system = SystemCurve::parametric(
            5.0,
            25_000.0,
            vec![],
            FlowDomain::new(0.0, 0.1).unwrap(),
        )
        .unwrap();
        let scenario = Scenario::new("json", &system)
            .with_entry(PumpEntry::new("P", &curve, 1, Arrangement::Parallel));
        let report = solve_scenario_report(&scenario, &ScenarioOptions::default()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        let first = &json["operating_points"][0];
        assert_eq!(first["configuration"], "P x1 parallel");
        assert!(first["flow"].as_f64().unwrap() > 0.0);
        assert!(first["zone"].is_string());
    }
}
