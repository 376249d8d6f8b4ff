//! pf-core: shared foundation for pumpflow.
//!
//! Contains:
//! - units (uom SI types + constructors)
//! - numeric (Real + tolerances + float helpers)
//! - roots (bracketed scalar root finding)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod roots;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{PfError, PfResult};
pub use numeric::*;
pub use roots::{RootConfig, RootResult, brent};
pub use units::*;
