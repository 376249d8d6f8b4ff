//! Flow domains and the head-versus-flow seam shared by pump and system curves.

use crate::error::{CurveError, CurveResult};

/// Closed flow interval `[min, max]` in m^3/s.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlowDomain {
    pub min: f64,
    pub max: f64,
}

impl FlowDomain {
    /// Create a domain, rejecting non-finite or reversed bounds.
    pub fn new(min: f64, max: f64) -> CurveResult<Self> {
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(CurveError::InvalidDomain { lo: min, hi: max });
        }
        Ok(Self { min, max })
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    pub fn contains(&self, flow: f64) -> bool {
        flow >= self.min && flow <= self.max
    }
}

/// Anything that yields a head (m) for a flow (m^3/s) over a working domain.
///
/// Implementations are pure: the same flow always yields the same head.
pub trait HeadCurve: Send + Sync {
    /// Flow range over which the curve is meaningful.
    fn domain(&self) -> FlowDomain;

    /// Head at `flow`. Flows outside `domain()` are allowed and extrapolate.
    fn head_at(&self, flow: f64) -> f64;
}
