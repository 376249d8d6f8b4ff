//! Error types for curve construction and curve operations.

use pf_core::error::PfError;
use thiserror::Error;

/// Errors that can occur while building or transforming curves.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CurveError {
    #[error("Invalid curve: {what}")]
    InvalidCurve { what: String },

    #[error("Invalid speed ratio: {ratio} (must be positive)")]
    InvalidSpeedRatio { ratio: f64 },

    #[error("Cannot aggregate an empty curve set")]
    EmptyCurveSet,

    #[error("BEP flow must be positive, got {bep_flow}")]
    NonPositiveBep { bep_flow: f64 },

    #[error("Invalid flow domain [{lo}, {hi}]")]
    InvalidDomain { lo: f64, hi: f64 },

    #[error("Mismatched aggregation inputs: {curves} curves, {ratios} ratios, {counts} counts")]
    CountMismatch {
        curves: usize,
        ratios: usize,
        counts: usize,
    },

    #[error("Unit count must be positive (unit {index})")]
    ZeroCount { index: usize },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

pub type CurveResult<T> = Result<T, CurveError>;

impl CurveError {
    pub(crate) fn invalid_curve(what: impl Into<String>) -> Self {
        CurveError::InvalidCurve { what: what.into() }
    }
}

impl From<CurveError> for PfError {
    fn from(e: CurveError) -> Self {
        match e {
            CurveError::InvalidCurve { what: _ } => PfError::InvalidArg { what: "curve" },
            CurveError::InvalidSpeedRatio { ratio: _ } => PfError::InvalidArg {
                what: "speed ratio",
            },
            CurveError::EmptyCurveSet => PfError::InvalidArg {
                what: "empty curve set",
            },
            CurveError::NonPositiveBep { bep_flow: _ } => PfError::InvalidArg { what: "bep flow" },
            CurveError::InvalidDomain { lo: _, hi: _ } => PfError::InvalidArg {
                what: "flow domain",
            },
            CurveError::CountMismatch { .. } | CurveError::ZeroCount { .. } => {
                PfError::InvalidArg { what: "unit counts" }
            }
            CurveError::InvalidArg { what } => PfError::InvalidArg { what },
        }
    }
}
