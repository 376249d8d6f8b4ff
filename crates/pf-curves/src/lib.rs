//! pf-curves: pump and system curve models for pumpflow.
//!
//! Provides:
//! - `CurveModel`: validated SI samples with PCHIP lookups per channel
//! - affinity-law speed scaling (`scale`, `AffinityView`)
//! - parallel/series aggregation (`build_parallel`, `build_series`)
//! - piping system curves, sampled or parametric (`SystemCurve`)
//! - best efficiency point and POR/AOR bands
//!
//! All types are immutable after construction and safe to share across threads.
//!
//! # Example
//!
//! ```
//! use pf_curves::{CurveModel, build_parallel};
//!
//! let curve = CurveModel::from_flow_head(vec![0.0, 0.01, 0.02], vec![40.0, 30.0, 20.0]).unwrap();
//! let pair = build_parallel(&[&curve, &curve], &[1.0, 1.0], &[1, 1]).unwrap();
//!
//! assert!((pair.domain().max - 0.04).abs() < 1e-12);
//! assert_eq!(pair.head_at(0.04), 20.0);
//! ```

pub mod affinity;
pub mod aggregate;
pub mod curve;
pub mod error;
pub mod interp;
pub mod range;
pub mod system;
pub mod traits;

// Re-exports
pub use affinity::{AffinityView, scale};
pub use aggregate::{AggregateCurve, Arrangement, build, build_parallel, build_series};
pub use curve::{CurveModel, CurveSampling, CurveSamples, DEFAULT_SAMPLE_POINTS};
pub use error::{CurveError, CurveResult};
pub use range::{
    Band, BepMethod, BestEfficiencyPoint, DEFAULT_AOR, DEFAULT_POR, OperatingRange, RangeZone,
    best_efficiency_point, operating_range,
};
pub use system::{ExtraTerm, SystemCurve};
pub use traits::{FlowDomain, HeadCurve};
