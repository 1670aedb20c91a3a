//! Derivative-free scalar minimisation on a bounded interval.
//!
//! [`minimize_bounded`] is Brent's method in the `fminbound` arrangement:
//! golden-section steps, replaced by parabolic interpolation through the
//! three best points whenever the parabola's minimum is acceptable. It never
//! evaluates the interval endpoints themselves.

use serde::{Deserialize, Serialize};
use tracing::trace;

/// `(3 − √5) / 2`, the golden-section fraction.
const GOLDEN: f64 = 0.381_966_011_250_105_1;

/// Stopping rules for [`minimize_bounded`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundedSearch {
    /// Absolute tolerance on the minimiser.
    pub tolerance: f64,
    /// Maximum number of objective evaluations.
    pub max_evaluations: usize,
}

impl Default for BoundedSearch {
    fn default() -> Self {
        Self {
            tolerance: 1e-5,
            max_evaluations: 500,
        }
    }
}

/// Outcome of a bounded minimisation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Minimum {
    pub x: f64,
    pub value: f64,
    pub evaluations: usize,
    /// False when the evaluation budget ran out before the tolerance was met.
    pub converged: bool,
}

fn sign_or_one(value: f64) -> f64 {
    if value < 0.0 { -1.0 } else { 1.0 }
}

/// Minimises `f` over `[lower, upper]`.
///
/// Requires `lower <= upper`. A degenerate interval returns `lower` after a
/// single evaluation.
///
/// # Example
///
/// ```
/// use labor_core::calculations::optimize::{minimize_bounded, BoundedSearch};
///
/// let min = minimize_bounded(|x| (x - 2.0).powi(2), 0.0, 10.0, &BoundedSearch::default());
///
/// assert!(min.converged);
/// assert!((min.x - 2.0).abs() < 1e-4);
/// ```
pub fn minimize_bounded<F>(
    mut f: F,
    lower: f64,
    upper: f64,
    search: &BoundedSearch,
) -> Minimum
where
    F: FnMut(f64) -> f64,
{
    debug_assert!(lower <= upper, "empty search interval [{lower}, {upper}]");

    if upper <= lower {
        return Minimum {
            x: lower,
            value: f(lower),
            evaluations: 1,
            converged: true,
        };
    }

    let sqrt_eps = f64::EPSILON.sqrt();
    let (mut a, mut b) = (lower, upper);

    // xf: best point so far; nfc: second best; fulc: previous value of nfc.
    let mut xf = a + GOLDEN * (b - a);
    let (mut nfc, mut fulc) = (xf, xf);
    let mut fx = f(xf);
    let (mut fnfc, mut ffulc) = (fx, fx);
    let mut evaluations = 1;

    let (mut rat, mut e) = (0.0_f64, 0.0_f64);
    let mut xm = 0.5 * (a + b);
    let mut tol1 = sqrt_eps * xf.abs() + search.tolerance / 3.0;
    let mut tol2 = 2.0 * tol1;
    let mut converged = true;

    while (xf - xm).abs() > tol2 - 0.5 * (b - a) {
        if evaluations >= search.max_evaluations {
            converged = false;
            break;
        }

        let mut golden = true;
        if e.abs() > tol1 {
            let mut r = (xf - nfc) * (fx - ffulc);
            let mut q = (xf - fulc) * (fx - fnfc);
            let mut p = (xf - fulc) * q - (xf - nfc) * r;
            q = 2.0 * (q - r);
            if q > 0.0 {
                p = -p;
            }
            q = q.abs();
            r = e;
            e = rat;

            if p.abs() < (0.5 * q * r).abs() && p > q * (a - xf) && p < q * (b - xf) {
                rat = p / q;
                let x = xf + rat;
                if (x - a) < tol2 || (b - x) < tol2 {
                    rat = tol1 * sign_or_one(xm - xf);
                }
                golden = false;
            }
        }

        if golden {
            e = if xf >= xm { a - xf } else { b - xf };
            rat = GOLDEN * e;
        }

        let x = xf + sign_or_one(rat) * rat.abs().max(tol1);
        let fu = f(x);
        evaluations += 1;

        if fu <= fx {
            if x >= xf {
                a = xf;
            } else {
                b = xf;
            }
            (fulc, ffulc) = (nfc, fnfc);
            (nfc, fnfc) = (xf, fx);
            (xf, fx) = (x, fu);
        } else {
            if x < xf {
                a = x;
            } else {
                b = x;
            }
            if fu <= fnfc || nfc == xf {
                (fulc, ffulc) = (nfc, fnfc);
                (nfc, fnfc) = (x, fu);
            } else if fu <= ffulc || fulc == xf || fulc == nfc {
                (fulc, ffulc) = (x, fu);
            }
        }

        xm = 0.5 * (a + b);
        tol1 = sqrt_eps * xf.abs() + search.tolerance / 3.0;
        tol2 = 2.0 * tol1;
    }

    trace!(x = xf, value = fx, evaluations, converged, "bounded search finished");

    Minimum {
        x: xf,
        value: fx,
        evaluations,
        converged,
    }
}

/// Evaluates `f` at `points` evenly spaced abscissae covering `[lower, upper]`
/// (endpoints included) and returns the smallest. Ties keep the lower `x`.
///
/// Requires `points >= 2`.
pub fn grid_minimum<F>(
    mut f: F,
    lower: f64,
    upper: f64,
    points: usize,
) -> Minimum
where
    F: FnMut(f64) -> f64,
{
    debug_assert!(points >= 2, "grid needs at least two points");

    let step = (upper - lower) / (points - 1) as f64;
    let mut best = Minimum {
        x: lower,
        value: f(lower),
        evaluations: 1,
        converged: true,
    };

    for i in 1..points {
        let x = if i == points - 1 {
            upper
        } else {
            lower + step * i as f64
        };
        let value = f(x);
        best.evaluations += 1;
        if value < best.value {
            best.x = x;
            best.value = value;
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    // =========================================================================
    // minimize_bounded tests
    // =========================================================================

    #[test]
    fn finds_interior_minimum_of_parabola() {
        let min = minimize_bounded(|x| (x - 3.5).powi(2) + 1.0, -10.0, 10.0, &BoundedSearch::default());

        assert!(min.converged);
        assert!((min.x - 3.5).abs() < 1e-5);
        assert!((min.value - 1.0).abs() < 1e-9);
    }

    #[test]
    fn approaches_lower_bound_when_minimum_outside() {
        let min = minimize_bounded(|x| x, 1.0, 5.0, &BoundedSearch::default());

        assert!(min.converged);
        assert!(min.x >= 1.0);
        assert!(min.x - 1.0 < 1e-4);
    }

    #[test]
    fn approaches_upper_bound_when_minimum_outside() {
        let min = minimize_bounded(|x| -x, 0.0, 2000.0, &BoundedSearch::default());

        assert!(min.converged);
        assert!(min.x <= 2000.0);
        assert!(2000.0 - min.x < 1e-2);
    }

    #[test]
    fn handles_kinked_objective() {
        let min = minimize_bounded(|x| (x - 1.25).abs(), 0.0, 4.0, &BoundedSearch::default());

        assert!(min.converged);
        assert!((min.x - 1.25).abs() < 1e-4);
    }

    #[test]
    fn reports_non_convergence_when_budget_exhausted() {
        let search = BoundedSearch {
            tolerance: 1e-12,
            max_evaluations: 3,
        };

        let min = minimize_bounded(|x| (x - 0.3).powi(2), 0.0, 1000.0, &search);

        assert!(!min.converged);
        assert_eq!(min.evaluations, 3);
        assert!((0.0..=1000.0).contains(&min.x));
    }

    #[test]
    fn degenerate_interval_returns_lower_bound() {
        let min = minimize_bounded(|x| x * x, 2.0, 2.0, &BoundedSearch::default());

        assert_eq!(min.x, 2.0);
        assert_eq!(min.value, 4.0);
        assert_eq!(min.evaluations, 1);
    }

    #[test]
    fn counts_every_evaluation() {
        let mut calls = 0;
        let min = minimize_bounded(
            |x| {
                calls += 1;
                (x - 7.0).powi(2)
            },
            0.0,
            20.0,
            &BoundedSearch::default(),
        );

        assert_eq!(min.evaluations, calls);
    }

    // =========================================================================
    // grid_minimum tests
    // =========================================================================

    #[test]
    fn grid_includes_both_endpoints() {
        let mut seen = Vec::new();
        grid_minimum(
            |x| {
                seen.push(x);
                0.0
            },
            0.0,
            1.0,
            5,
        );

        assert_eq!(seen, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn grid_ties_keep_lowest_abscissa() {
        let min = grid_minimum(|_| 1.0, 0.0, 10.0, 11);

        assert_eq!(min.x, 0.0);
        assert_eq!(min.evaluations, 11);
    }

    #[test]
    fn grid_finds_closest_point() {
        let min = grid_minimum(|x| (x - 0.52).powi(2), 0.0, 1.0, 101);

        assert!((min.x - 0.52).abs() < 1e-12);
    }
}
