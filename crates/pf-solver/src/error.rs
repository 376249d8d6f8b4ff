//! Error types for solver operations.

use pf_core::error::PfError;
use pf_curves::CurveError;
use thiserror::Error;

/// Errors that can occur while locating operating points.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("No intersection found within flow domain [{lo}, {hi}]")]
    NoIntersection { lo: f64, hi: f64 },

    #[error("Problem setup error: {what}")]
    ProblemSetup { what: String },

    #[error("Curve error: {0}")]
    Curve(#[from] CurveError),

    #[error("Numeric error: {0}")]
    Core(#[from] PfError),
}

pub type SolverResult<T> = Result<T, SolverError>;

impl From<SolverError> for PfError {
    fn from(e: SolverError) -> Self {
        match e {
            SolverError::NoIntersection { lo: _, hi: _ } => PfError::InvalidArg {
                what: "no intersection",
            },
            SolverError::ProblemSetup { what: _ } => PfError::InvalidArg {
                what: "problem setup",
            },
            SolverError::Curve(inner) => inner.into(),
            SolverError::Core(inner) => inner,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curve_errors_convert() {
        let err: SolverError = CurveError::EmptyCurveSet.into();
        assert!(matches!(err, SolverError::Curve(CurveError::EmptyCurveSet)));
        assert!(err.to_string().contains("empty curve set"));
    }

    #[test]
    fn no_intersection_display() {
        let err = SolverError::NoIntersection { lo: 0.0, hi: 1.0 };
        assert!(err.to_string().contains("[0, 1]"));
        let pf: PfError = err.into();
        assert!(matches!(pf, PfError::InvalidArg { .. }));
    }
}
