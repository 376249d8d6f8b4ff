use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Project error: {0}")]
    Project(#[from] pf_project::ProjectError),

    #[error("Solver error: {0}")]
    Solver(#[from] pf_solver::SolverError),

    #[error("Curve error: {0}")]
    Curve(#[from] pf_curves::CurveError),

    #[error("{what} not found: {id}")]
    NotFound { what: &'static str, id: String },

    #[error("Failed to write output file: {path}")]
    OutputWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type CliResult<T> = Result<T, CliError>;
