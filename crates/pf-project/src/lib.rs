//! pf-project: scenario project file format, validation and conversion to
//! solver inputs.

pub mod csv_import;
pub mod migrate;
pub mod model;
pub mod schema;
pub mod units;
pub mod validate;

pub use csv_import::{PumpCsv, parse_pump_csv, read_pump_csv};
pub use migrate::{LATEST_VERSION, migrate_to_latest};
pub use model::{ProjectModel, build_pump_curve, build_system_curve};
pub use schema::*;
pub use units::{EfficiencyUnit, FlowUnit, HeadUnit, PowerUnit, UnknownUnit};
pub use validate::{ValidationError, validate_project};

use pf_curves::CurveError;
use pf_solver::SolverError;
use std::path::Path;

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Migration error: {what}")]
    Migration { what: String },

    #[error("CSV error at line {line}: {what}")]
    Csv { line: usize, what: String },

    #[error("Curve error: {0}")]
    Curve(#[from] CurveError),

    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn finish_load(project: Project) -> ProjectResult<Project> {
    let project = migrate_to_latest(project)?;
    validate_project(&project)?;
    tracing::debug!(
        name = %project.name,
        pumps = project.pumps.len(),
        system_curves = project.system_curves.len(),
        scenarios = project.scenarios.len(),
        "project loaded"
    );
    Ok(project)
}

pub fn load_yaml(path: &Path) -> ProjectResult<Project> {
    let content = std::fs::read_to_string(path)?;
    finish_load(serde_yaml::from_str(&content)?)
}

pub fn save_yaml(path: &Path, project: &Project) -> ProjectResult<()> {
    validate_project(project)?;
    let content = serde_yaml::to_string(project)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &Path) -> ProjectResult<Project> {
    let content = std::fs::read_to_string(path)?;
    finish_load(serde_json::from_str(&content)?)
}

pub fn save_json(path: &Path, project: &Project) -> ProjectResult<()> {
    validate_project(project)?;
    let content = serde_json::to_string_pretty(project)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Load by extension: `.json` as JSON, anything else as YAML.
pub fn load(path: &Path) -> ProjectResult<Project> {
    if is_json(path) {
        load_json(path)
    } else {
        load_yaml(path)
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Save by extension, mirroring [`load`].
pub fn save(path: &Path, project: &Project) -> ProjectResult<()> {
    if is_json(path) {
        save_json(path, project)
    } else {
        save_yaml(path, project)
    }
}
