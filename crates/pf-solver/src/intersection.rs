//! Operating point search: where a pump curve meets a system curve.

use crate::error::{SolverError, SolverResult};
use pf_core::numeric::linspace;
use pf_core::roots::{RootConfig, brent};
use pf_curves::FlowDomain;

/// Grid size used by the bracketing scan.
pub const DEFAULT_INTERSECTION_SAMPLES: usize = 50;

/// Intersection search configuration.
#[derive(Clone, Copy, Debug)]
pub struct IntersectionConfig {
    /// Number of equally spaced flows scanned across the domain
    pub samples: usize,
    /// Root finder settings for refining a bracketed crossing
    pub root: RootConfig,
}

impl Default for IntersectionConfig {
    fn default() -> Self {
        Self {
            samples: DEFAULT_INTERSECTION_SAMPLES,
            root: RootConfig::default(),
        }
    }
}

/// Flow/head pair where the two curves meet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Intersection {
    pub flow: f64,
    pub head: f64,
}

/// Find where `pump_head` and `system_head` cross over `domain`, using the default grid.
pub fn find_operating_point<P, S>(
    domain: FlowDomain,
    pump_head: P,
    system_head: S,
) -> SolverResult<Intersection>
where
    P: Fn(f64) -> f64,
    S: Fn(f64) -> f64,
{
    find_operating_point_with_config(domain, pump_head, system_head, &IntersectionConfig::default())
}

/// Find where `pump_head` and `system_head` cross over `domain`.
///
/// Scans `config.samples` equally spaced flows in order. The first sample
/// where the head difference is exactly zero is returned as is; the first
/// pair of consecutive samples whose differences change sign is refined with
/// Brent's method. The reported head is the pump head at the found flow.
///
/// This is a uniform-grid scan: a tangency, or an even number of crossings
/// between two neighbouring grid flows, produces no sign change and is not
/// found. Raise `samples` when curves may touch or cross twice within one
/// grid step.
///
/// # Errors
/// `NoIntersection` when no zero and no sign change is seen;
/// `ProblemSetup` when fewer than two samples are requested.
pub fn find_operating_point_with_config<P, S>(
    domain: FlowDomain,
    pump_head: P,
    system_head: S,
    config: &IntersectionConfig,
) -> SolverResult<Intersection>
where
    P: Fn(f64) -> f64,
    S: Fn(f64) -> f64,
{
    if config.samples < 2 {
        return Err(SolverError::ProblemSetup {
            what: format!(
                "intersection scan needs at least 2 samples, got {}",
                config.samples
            ),
        });
    }

    let residual = |q: f64| pump_head(q) - system_head(q);
    let flows = linspace(domain.min, domain.max, config.samples);
    let diffs: Vec<f64> = flows.iter().map(|&q| residual(q)).collect();

    for i in 0..flows.len() {
        if diffs[i] == 0.0 {
            let q = flows[i];
            return Ok(Intersection {
                flow: q,
                head: pump_head(q),
            });
        }
        let Some(&next) = diffs.get(i + 1) else {
            break;
        };
        if crosses(diffs[i], next) {
            let result = brent(&residual, flows[i], flows[i + 1], &config.root)?;
            if !result.converged {
                tracing::warn!(
                    lo = flows[i],
                    hi = flows[i + 1],
                    "intersection refinement did not converge, using best estimate"
                );
            }
            let q = result.root;
            return Ok(Intersection {
                flow: q,
                head: pump_head(q),
            });
        }
    }

    Err(SolverError::NoIntersection {
        lo: domain.min,
        hi: domain.max,
    })
}

/// Strict sign change between two finite, non-zero differences.
fn crosses(a: f64, b: f64) -> bool {
    a.is_finite() && b.is_finite() && a * b < 0.0
}
