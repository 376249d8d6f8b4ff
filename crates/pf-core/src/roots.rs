//! Bracketed scalar root finding (Brent's method).

use crate::error::{PfError, PfResult};
use crate::numeric::ensure_finite;

/// Root finder configuration.
#[derive(Clone, Copy, Debug)]
pub struct RootConfig {
    /// Maximum iterations
    pub max_iterations: usize,
    /// Absolute tolerance on x
    pub x_tol: f64,
    /// Relative tolerance on x
    pub r_tol: f64,
}

impl Default for RootConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            x_tol: 2e-12,
            r_tol: 4.0 * f64::EPSILON,
        }
    }
}

/// Root finder result.
#[derive(Clone, Copy, Debug)]
pub struct RootResult {
    /// Best estimate of the root
    pub root: f64,
    /// Number of iterations
    pub iterations: usize,
    /// Converged flag
    pub converged: bool,
}

/// Find a zero of `f` inside `[lo, hi]`.
///
/// `f(lo)` and `f(hi)` must differ in sign (or one of them must be zero),
/// otherwise `PfError::NoSignChange` is returned. Combines bisection, secant
/// and inverse quadratic steps; convergence is guaranteed for continuous `f`.
/// Running out of iterations is not an error: the best estimate is returned
/// with `converged == false`.
pub fn brent<F>(f: F, lo: f64, hi: f64, config: &RootConfig) -> PfResult<RootResult>
where
    F: Fn(f64) -> f64,
{
    let mut x_pre = lo;
    let mut x_cur = hi;
    let mut f_pre = ensure_finite(f(x_pre), "residual at lower bracket")?;
    let mut f_cur = ensure_finite(f(x_cur), "residual at upper bracket")?;

    if f_pre == 0.0 {
        return Ok(done(x_pre, 0));
    }
    if f_cur == 0.0 {
        return Ok(done(x_cur, 0));
    }
    if f_pre.signum() == f_cur.signum() {
        return Err(PfError::NoSignChange { lo, hi });
    }

    let mut x_blk = 0.0;
    let mut f_blk = 0.0;
    let mut s_pre = 0.0;
    let mut s_cur = 0.0;

    for iter in 0..config.max_iterations {
        if f_pre != 0.0 && f_cur != 0.0 && f_pre.signum() != f_cur.signum() {
            x_blk = x_pre;
            f_blk = f_pre;
            s_pre = x_cur - x_pre;
            s_cur = s_pre;
        }
        if f_blk.abs() < f_cur.abs() {
            x_pre = x_cur;
            x_cur = x_blk;
            x_blk = x_pre;

            f_pre = f_cur;
            f_cur = f_blk;
            f_blk = f_pre;
        }

        let delta = 0.5 * (config.x_tol + config.r_tol * x_cur.abs());
        let s_bis = 0.5 * (x_blk - x_cur);
        if f_cur == 0.0 || s_bis.abs() < delta {
            tracing::trace!(iterations = iter, root = x_cur, "brent converged");
            return Ok(done(x_cur, iter));
        }

        if s_pre.abs() > delta && f_cur.abs() < f_pre.abs() {
            let s_try = if x_pre == x_blk {
                // secant
                -f_cur * (x_cur - x_pre) / (f_cur - f_pre)
            } else {
                // inverse quadratic
                let d_pre = (f_pre - f_cur) / (x_pre - x_cur);
                let d_blk = (f_blk - f_cur) / (x_blk - x_cur);
                -f_cur * (f_blk * d_blk - f_pre * d_pre) / (d_blk * d_pre * (f_blk - f_pre))
            };
            if 2.0 * s_try.abs() < s_pre.abs().min(3.0 * s_bis.abs() - delta) {
                s_pre = s_cur;
                s_cur = s_try;
            } else {
                s_pre = s_bis;
                s_cur = s_bis;
            }
        } else {
            s_pre = s_bis;
            s_cur = s_bis;
        }

        x_pre = x_cur;
        f_pre = f_cur;
        if s_cur.abs() > delta {
            x_cur += s_cur;
        } else {
            x_cur += if s_bis > 0.0 { delta } else { -delta };
        }
        f_cur = ensure_finite(f(x_cur), "residual inside bracket")?;
    }

    tracing::warn!(
        max_iterations = config.max_iterations,
        root = x_cur,
        "brent hit the iteration limit"
    );
    Ok(RootResult {
        root: x_cur,
        iterations: config.max_iterations,
        converged: false,
    })
}

fn done(root: f64, iterations: usize) -> RootResult {
    RootResult {
        root,
        iterations,
        converged: true,
    }
}
