//! Shared numeric helpers: incremental means, argmax, and the Newton root
//! searches behind the KL-UCB and Bayes-Gaussian confidence bounds.

use tracing::warn;

/// Score given to arms that have never been pulled, forcing them to the front.
pub const UNPULLED_SCORE: f64 = 100_000.0;

/// Iteration cap for the bracketed Newton searches.
pub const MAX_NEWTON_ITERATIONS: usize = 100;

/// Folds a new observation into a running mean over `count` observations.
///
/// `count` must already include the new observation.
#[inline]
pub fn incremental_mean(mean: f64, value: f64, count: u64) -> f64 {
    mean + (value - mean) / count as f64
}

/// Index of the largest value, lowest index on ties. NaN never wins.
///
/// Returns `None` for an empty slice or a slice of NaNs.
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Natural log of a growth index, clamped so indices below 1 contribute nothing.
#[inline]
pub fn log_index(index: f64) -> f64 {
    if index > 1.0 { index.ln() } else { 0.0 }
}

/// Bernoulli KL divergence `KL(p, q)`, with the `p = 0` limit handled explicitly.
pub fn kl_bernoulli(p: f64, q: f64) -> f64 {
    if p == 0.0 {
        (1.0 / (1.0 - q)).ln()
    } else if p == 1.0 {
        (1.0 / q).ln()
    } else {
        p * (p / q).ln() + (1.0 - p) * ((1.0 - p) / (1.0 - q)).ln()
    }
}

/// Derivative of `KL(p, q)` with respect to `q`.
#[inline]
pub fn kl_bernoulli_dq(p: f64, q: f64) -> f64 {
    (q - p) / (q * (1.0 - q))
}

/// Result of a bounded root search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootEstimate {
    /// Last iterate.
    pub value: f64,
    /// Number of Newton/bisection steps taken.
    pub iterations: usize,
    /// Whether the step size fell below the requested precision.
    pub converged: bool,
}

/// Newton iteration for an increasing `f` on `[lo, hi]` with `f(lo) <= 0 <= f(hi)`.
///
/// Any step that leaves the bracket (or hits a zero derivative) is replaced by
/// bisection, so the iterate always stays inside `[lo, hi]`.
pub fn bracketed_newton<F, D>(
    f: F,
    df: D,
    mut lo: f64,
    mut hi: f64,
    start: f64,
    precision: f64,
    max_iterations: usize,
) -> RootEstimate
where
    F: Fn(f64) -> f64,
    D: Fn(f64) -> f64,
{
    let mut x = start.clamp(lo, hi);
    for iteration in 1..=max_iterations {
        let fx = f(x);
        if fx == 0.0 {
            return RootEstimate {
                value: x,
                iterations: iteration,
                converged: true,
            };
        }
        if fx < 0.0 {
            lo = x;
        } else {
            hi = x;
        }

        let slope = df(x);
        let newton = x - fx / slope;
        let next = if slope.is_finite() && slope > 0.0 && newton > lo && newton < hi {
            newton
        } else {
            0.5 * (lo + hi)
        };

        let step = (next - x).abs();
        x = next;
        if step <= precision || hi - lo <= precision {
            return RootEstimate {
                value: x,
                iterations: iteration,
                converged: true,
            };
        }
    }

    RootEstimate {
        value: x,
        iterations: max_iterations,
        converged: false,
    }
}

/// Largest `q` in `[mean, 1]` with `KL(mean, q) <= target`.
///
/// The upper end of the bracket is found by repeatedly halving the distance
/// to 1 until the divergence exceeds the target; Newton then walks back down.
pub fn kl_upper_bound(mean: f64, target: f64, precision: f64) -> RootEstimate {
    let mean = mean.clamp(0.0, 1.0);
    if mean >= 1.0 || target <= 0.0 {
        return RootEstimate {
            value: mean,
            iterations: 0,
            converged: true,
        };
    }

    let mut upper = 0.5 * (mean + 1.0);
    let mut expansions = 0;
    while kl_bernoulli(mean, upper) < target {
        upper = 0.5 * (upper + 1.0);
        expansions += 1;
        if upper >= 1.0 || expansions > 64 {
            // Target beyond what f64 can resolve below 1.
            return RootEstimate {
                value: 1.0,
                iterations: expansions,
                converged: true,
            };
        }
    }

    let estimate = bracketed_newton(
        |q| kl_bernoulli(mean, q) - target,
        |q| kl_bernoulli_dq(mean, q),
        mean,
        upper,
        upper,
        precision,
        MAX_NEWTON_ITERATIONS,
    );
    if !estimate.converged {
        warn!(
            mean,
            target,
            value = estimate.value,
            "KL upper bound search stopped before reaching precision"
        );
    }
    RootEstimate {
        iterations: estimate.iterations + expansions,
        ..estimate
    }
}

/// Logistic approximation of the standard normal CDF.
#[inline]
pub fn approx_normal_cdf(z: f64) -> f64 {
    1.0 / (1.0 + (-0.07056 * z.powi(3) - 1.5976 * z).exp())
}

/// Standard normal density, written as `0.3989 * e^(-1/2)^(z^2)`.
#[inline]
pub fn approx_normal_pdf(z: f64) -> f64 {
    0.398_942_28 * 0.606_530_66_f64.powf(z * z)
}

/// Solves `cdf(x) = probability` for a normal with the given mean and sd,
/// using the approximate CDF/PDF pair.
pub fn approx_normal_quantile(
    probability: f64,
    mean: f64,
    sd: f64,
    precision: f64,
) -> RootEstimate {
    let p = probability.clamp(1e-12, 1.0 - 1e-12);
    let (mut lo, mut hi) = (-1.0, 1.0);
    while approx_normal_cdf(lo) > p {
        lo *= 2.0;
    }
    while approx_normal_cdf(hi) < p {
        hi *= 2.0;
    }

    // Convergence is measured on x, i.e. after scaling by sd.
    let z_precision = if sd > 0.0 { precision / sd } else { precision };
    let estimate = bracketed_newton(
        |z| approx_normal_cdf(z) - p,
        approx_normal_pdf,
        lo,
        hi,
        0.0,
        z_precision,
        MAX_NEWTON_ITERATIONS,
    );
    if !estimate.converged {
        warn!(
            probability,
            mean,
            sd,
            "Gaussian quantile search stopped before reaching precision"
        );
    }
    RootEstimate {
        value: mean + sd * estimate.value,
        ..estimate
    }
}

/// Euclidean norm.
#[inline]
pub fn norm(v: &[f64]) -> f64 {
    dot(v, v).sqrt()
}

/// Dot product of two equal-length slices.
#[inline]
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_incremental_mean_matches_batch_mean() {
        let values = [0.5, 1.5, -2.0, 4.25, 0.0];
        let mut mean = 0.0;
        for (i, &v) in values.iter().enumerate() {
            mean = incremental_mean(mean, v, i as u64 + 1);
        }
        let batch: f64 = values.iter().sum::<f64>() / values.len() as f64;
        assert_relative_eq!(mean, batch, epsilon = 1e-12);
    }

    #[test]
    fn test_argmax_first_occurrence() {
        assert_eq!(argmax(&[1.0, 3.0, 3.0, 2.0]), Some(1));
        assert_eq!(argmax(&[f64::NAN, 0.5, f64::NAN]), Some(1));
        assert_eq!(argmax(&[f64::NEG_INFINITY, f64::NEG_INFINITY]), Some(0));
        assert_eq!(argmax(&[]), None);
        assert_eq!(argmax(&[f64::NAN]), None);
    }

    #[test]
    fn test_log_index_clamps_below_one() {
        assert_eq!(log_index(0.5), 0.0);
        assert_eq!(log_index(1.0), 0.0);
        assert_relative_eq!(log_index(std::f64::consts::E), 1.0);
    }

    #[test]
    fn test_kl_special_cases() {
        assert_relative_eq!(kl_bernoulli(0.0, 0.5), 2.0_f64.ln());
        assert_abs_diff_eq!(kl_bernoulli(0.3, 0.3), 0.0, epsilon = 1e-15);
        assert!(kl_bernoulli(0.3, 0.6) > 0.0);
    }

    #[test]
    fn test_kl_upper_bound_hits_target() {
        let precision = 1e-6;
        for &(mean, target) in &[(0.2, 0.1), (0.5, 0.01), (0.0, 0.3), (0.9, 0.05)] {
            let root = kl_upper_bound(mean, target, precision);
            assert!(root.converged);
            assert!(root.value > mean && root.value < 1.0);
            assert_abs_diff_eq!(kl_bernoulli(mean, root.value), target, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_kl_upper_bound_degenerate_inputs() {
        assert_eq!(kl_upper_bound(1.0, 0.5, 1e-3).value, 1.0);
        assert_eq!(kl_upper_bound(0.4, 0.0, 1e-3).value, 0.4);
        // Huge target saturates at 1.
        assert_eq!(kl_upper_bound(0.5, 1e6, 1e-3).value, 1.0);
    }

    #[test]
    fn test_approx_cdf_pdf_shape() {
        assert_relative_eq!(approx_normal_cdf(0.0), 0.5);
        assert!(approx_normal_cdf(3.0) > 0.99);
        assert!(approx_normal_cdf(-3.0) < 0.01);
        assert_relative_eq!(approx_normal_pdf(0.0), 0.398_942_28);
        assert_relative_eq!(approx_normal_pdf(1.0), 0.241_970_7, epsilon = 1e-6);
    }

    #[test]
    fn test_approx_quantile_inverts_cdf() {
        for &p in &[0.1, 0.5, 0.9, 0.999] {
            let root = approx_normal_quantile(p, 2.0, 0.5, 1e-9);
            assert!(root.converged);
            let z = (root.value - 2.0) / 0.5;
            assert_abs_diff_eq!(approx_normal_cdf(z), p, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_bracketed_newton_reports_non_convergence() {
        // Cap of one step cannot reach a tight precision.
        let root = bracketed_newton(|x| x * x * x - 2.0, |x| 3.0 * x * x, 0.0, 4.0, 4.0, 1e-12, 1);
        assert!(!root.converged);
        assert!((0.0..=4.0).contains(&root.value));
    }
}
