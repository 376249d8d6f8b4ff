//! End-to-end scenario solving over realistic pump data.

use pf_core::numeric::{Tolerances, nearly_equal};
use pf_curves::{Arrangement, CurveModel, CurveSamples, ExtraTerm, FlowDomain, SystemCurve};
use pf_solver::{
    CombinationOutcome, PumpEntry, Scenario, ScenarioOptions, SolverError, solve_scenario,
    solve_scenario_outcomes, solve_scenario_with_options,
};

fn end_suction_pump() -> CurveModel {
    CurveModel::new(
        CurveSamples::new(
            vec![0.0, 0.005, 0.010, 0.015, 0.020, 0.025, 0.030],
            vec![32.0, 31.6, 30.4, 28.3, 25.2, 21.0, 15.5],
        )
        .with_efficiency(vec![0.0, 0.38, 0.60, 0.72, 0.76, 0.71, 0.58])
        .with_power(vec![2100.0, 3300.0, 4600.0, 5600.0, 6400.0, 7000.0, 7500.0]),
    )
    .unwrap()
}

fn booster_pump() -> CurveModel {
    CurveModel::new(
        CurveSamples::new(
            vec![0.0, 0.01, 0.02, 0.03, 0.04],
            vec![55.0, 54.0, 50.5, 44.0, 34.0],
        )
        .with_efficiency(vec![0.0, 0.45, 0.66, 0.70, 0.61]),
    )
    .unwrap()
}

fn domain() -> FlowDomain {
    FlowDomain::new(0.0, 0.2).unwrap()
}

#[test]
fn flat_system_below_shutoff_has_one_point_at_rated_speed() {
    let pump = end_suction_pump();
    let system = SystemCurve::parametric(20.0, 0.0, vec![], domain()).unwrap();
    let scenario = Scenario::new("flat", &system)
        .with_entry(PumpEntry::new("ES-100", &pump, 1, Arrangement::Parallel));

    let points = solve_scenario(&scenario).unwrap();
    assert_eq!(points.len(), 1);
    let p = &points[0];
    assert_eq!(p.speed_ratio, 1.0);
    assert_eq!(p.configuration, "ES-100 x1 parallel");
    assert!(nearly_equal(p.head, 20.0, Tolerances::absolute(1e-6)));
    assert!(nearly_equal(pump.head_at(p.flow), 20.0, Tolerances::absolute(1e-6)));
}

#[test]
fn system_above_shutoff_yields_empty_result() {
    let pump = end_suction_pump();
    let system = SystemCurve::parametric(50.0, 1.0e5, vec![], domain()).unwrap();
    let scenario = Scenario::new("blocked", &system).with_entry(
        PumpEntry::new("ES-100", &pump, 1, Arrangement::Parallel).with_speeds(vec![1.0, 0.8]),
    );

    let points = solve_scenario(&scenario).unwrap();
    assert!(points.is_empty());
    let outcomes = solve_scenario_outcomes(&scenario, &ScenarioOptions::default()).unwrap();
    assert_eq!(outcomes.len(), 2);
    assert!(
        outcomes
            .iter()
            .all(|o| matches!(o, CombinationOutcome::Skipped(_)))
    );
}

#[test]
fn results_keep_entry_then_speed_order() {
    let pump = end_suction_pump();
    let booster = booster_pump();
    let system = SystemCurve::parametric(
        8.0,
        30_000.0,
        vec![ExtraTerm {
            coefficient: 200.0,
            exponent: 1.0,
        }],
        domain(),
    )
    .unwrap();
    let speeds = vec![1.0, 0.95, 0.9, 0.85, 0.8];
    let scenario = Scenario::new("plant", &system)
        .with_entry(
            PumpEntry::new("ES-100", &pump, 2, Arrangement::Parallel).with_speeds(speeds.clone()),
        )
        .with_entry(
            PumpEntry::new("BST-40", &booster, 1, Arrangement::Parallel)
                .with_speeds(speeds.clone()),
        )
        .with_entry(PumpEntry::new("ES-100", &pump, 2, Arrangement::Series).with_speeds(speeds));

    let parallel = solve_scenario(&scenario).unwrap();
    let serial = solve_scenario_with_options(
        &scenario,
        &ScenarioOptions {
            parallel: false,
            ..ScenarioOptions::default()
        },
    )
    .unwrap();
    assert_eq!(parallel, serial);
    assert_eq!(parallel.len(), 15);

    let labels: Vec<&str> = parallel.iter().map(|p| p.configuration.as_str()).collect();
    assert!(labels[..5].iter().all(|l| *l == "ES-100 x2 parallel"));
    assert!(labels[5..10].iter().all(|l| *l == "BST-40 x1 parallel"));
    assert!(labels[10..].iter().all(|l| *l == "ES-100 x2 series"));
    for chunk in parallel.chunks(5) {
        let ratios: Vec<f64> = chunk.iter().map(|p| p.speed_ratio).collect();
        assert_eq!(ratios, vec![1.0, 0.95, 0.9, 0.85, 0.8]);
        // slower drives settle lower on the same system curve
        assert!(chunk.windows(2).all(|w| w[1].flow < w[0].flow));
    }
}

#[test]
fn every_point_sits_on_the_system_curve() {
    let pump = end_suction_pump();
    let system = SystemCurve::parametric(12.0, 20_000.0, vec![], domain()).unwrap();
    let scenario = Scenario::new("check", &system).with_entry(
        PumpEntry::new("ES-100", &pump, 3, Arrangement::Parallel)
            .with_speeds(vec![1.0, 0.9, 0.8]),
    );
    for p in solve_scenario(&scenario).unwrap() {
        assert!(nearly_equal(p.head, system.head_at(p.flow), Tolerances::absolute(1e-6)));
        assert!(p.efficiency.is_some());
        assert!(p.power.unwrap() > 0.0);
    }
}

#[test]
fn invalid_speed_aborts_whole_scenario() {
    let pump = end_suction_pump();
    let system = SystemCurve::parametric(10.0, 0.0, vec![], domain()).unwrap();
    let scenario = Scenario::new("bad", &system)
        .with_entry(PumpEntry::new("ok", &pump, 1, Arrangement::Parallel))
        .with_entry(
            PumpEntry::new("bad", &pump, 1, Arrangement::Parallel).with_speeds(vec![-0.5]),
        );
    assert!(matches!(
        solve_scenario(&scenario),
        Err(SolverError::Curve(_))
    ));
}
