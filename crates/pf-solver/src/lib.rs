//! pf-solver: operating points of pump configurations on a piping system.
//!
//! Provides:
//! - `find_operating_point`: grid scan plus Brent refinement of pump/system crossings
//! - `Scenario` solving over every `(pump entry, speed ratio)` combination
//! - `ScenarioReport`: solved points placed against each pump's POR/AOR
//!
//! Combinations are independent and run on the rayon pool unless
//! `ScenarioOptions::parallel` is off; results keep input order either way.

pub mod error;
pub mod intersection;
pub mod report;
pub mod scenario;

// Re-exports
pub use error::{SolverError, SolverResult};
pub use intersection::{
    DEFAULT_INTERSECTION_SAMPLES, Intersection, IntersectionConfig, find_operating_point,
    find_operating_point_with_config,
};
pub use report::{
    FlowBand, OperatingZone, PumpSummary, ReportedPoint, ScenarioReport, solve_scenario_report,
};
pub use scenario::{
    CombinationOutcome, OperatingPoint, PumpEntry, Scenario, ScenarioOptions, SkipReason,
    SkippedCombination, SolvedCombination, solve_combination, solve_scenario,
    solve_scenario_outcomes, solve_scenario_with_options, unit_flow,
};
