//! Piping system head-loss curves.
//!
//! Two representations:
//! - sampled points, interpolated like a pump curve (domain = sampled range)
//! - parametric: `H(Q) = H_static + K * Q^2 + sum_j c_j * Q^e_j`
//!
//! The parametric form has no natural flow bound, so it carries a domain
//! supplied by the caller.

use crate::curve::CurveModel;
use crate::error::{CurveError, CurveResult};
use crate::traits::{FlowDomain, HeadCurve};

/// Additional `coefficient * Q^exponent` term of a parametric system curve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExtraTerm {
    pub coefficient: f64,
    pub exponent: f64,
}

#[derive(Clone, Debug, PartialEq)]
enum Shape {
    Sampled(CurveModel),
    Parametric {
        static_head: f64,
        resistance_coefficient: f64,
        extra_terms: Vec<ExtraTerm>,
    },
}

/// Head required by the piping system as a function of flow.
#[derive(Clone, Debug, PartialEq)]
pub struct SystemCurve {
    shape: Shape,
    domain: FlowDomain,
}

impl SystemCurve {
    /// System curve through sampled `(flow, head)` points.
    ///
    /// # Errors
    /// Same validation as [`CurveModel::new`].
    pub fn sampled(flow: Vec<f64>, head: Vec<f64>) -> CurveResult<Self> {
        let curve = CurveModel::from_flow_head(flow, head)?;
        let domain = curve.domain();
        Ok(Self {
            shape: Shape::Sampled(curve),
            domain,
        })
    }

    /// Parametric system curve over an explicit working `domain`.
    ///
    /// # Errors
    /// `InvalidArg` if any coefficient or exponent is non-finite.
    pub fn parametric(
        static_head: f64,
        resistance_coefficient: f64,
        extra_terms: Vec<ExtraTerm>,
        domain: FlowDomain,
    ) -> CurveResult<Self> {
        if !static_head.is_finite() {
            return Err(CurveError::InvalidArg {
                what: "static head must be finite",
            });
        }
        if !resistance_coefficient.is_finite() {
            return Err(CurveError::InvalidArg {
                what: "resistance coefficient must be finite",
            });
        }
        if extra_terms
            .iter()
            .any(|t| !t.coefficient.is_finite() || !t.exponent.is_finite())
        {
            return Err(CurveError::InvalidArg {
                what: "extra terms must be finite",
            });
        }
        Ok(Self {
            shape: Shape::Parametric {
                static_head,
                resistance_coefficient,
                extra_terms,
            },
            domain,
        })
    }

    pub fn is_parametric(&self) -> bool {
        matches!(self.shape, Shape::Parametric { .. })
    }

    pub fn domain(&self) -> FlowDomain {
        self.domain
    }

    pub fn head_at(&self, flow: f64) -> f64 {
        match &self.shape {
            Shape::Sampled(curve) => curve.head_at(flow),
            Shape::Parametric {
                static_head,
                resistance_coefficient,
                extra_terms,
            } => {
                let mut total = static_head + resistance_coefficient * flow * flow;
                for term in extra_terms {
                    total += term.coefficient * flow.powf(term.exponent);
                }
                total
            }
        }
    }
}

impl HeadCurve for SystemCurve {
    fn domain(&self) -> FlowDomain {
        self.domain
    }

    fn head_at(&self, flow: f64) -> f64 {
        SystemCurve::head_at(self, flow)
    }
}
