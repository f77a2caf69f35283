//! Adaptive Romberg quadrature, used to build the radial
//! force kernel matrix. Re-implemented idiomatically rather than
//! transliterated from the Numerical-Recipes-derived
//! `original_source/romberg/` and `original_source/utility/integration.hpp`
//! the original ports from; those extrapolate the same way (Richardson
//! extrapolation over a doubling trapezoidal mesh) but via a polynomial
//! interpolator class hierarchy this core has no need of.

const MAX_LEVELS: usize = 24;

/// Adaptive Romberg integration of `f` over the finite interval `[a, b]`,
/// refining until successive diagonal estimates agree to within `rtol`
/// (relative) or `MAX_LEVELS` trapezoidal refinements are exhausted.
pub fn romberg(mut f: impl FnMut(f64) -> f64, a: f64, b: f64, rtol: f64) -> f64 {
    if (b - a).abs() < f64::EPSILON {
        return 0.0;
    }
    let mut table: Vec<Vec<f64>> = Vec::with_capacity(MAX_LEVELS);
    let mut h = b - a;
    table.push(vec![0.5 * h * (f(a) + f(b))]);

    for level in 1..MAX_LEVELS {
        h /= 2.0;
        let n_new = 1usize << (level - 1);
        let mut sum = 0.0;
        for k in 0..n_new {
            let x = a + h * (2 * k + 1) as f64;
            sum += f(x);
        }
        let mut row = vec![0.5 * table[level - 1][0] + h * sum];
        for k in 1..=level {
            let prev = row[k - 1];
            let coarser = table[level - 1][k - 1];
            let factor = 4f64.powi(k as i32);
            row.push(prev + (prev - coarser) / (factor - 1.0));
        }
        let estimate = row[level];
        let previous_estimate = table[level - 1][level - 1];
        table.push(row);
        if level > 1 && (estimate - previous_estimate).abs() <= rtol * estimate.abs().max(1e-300) {
            return estimate;
        }
    }
    table.last().unwrap().last().copied().unwrap()
}

/// `integral_{a}^{+inf} f(z) dz` for `a > 0`, via the substitution
/// `u = 1/z`: `f(1/u)/u^2` quadrature on `(0, 1/a)`. `romberg` is a
/// closed rule and does evaluate `u = 0`; the substituted integrand is
/// taken to vanish there, which is the correct limit whenever `f(z) -> 0`
/// as `z -> +inf` (true for every integrand this engine feeds it).
pub fn integrate_to_infinity(mut f: impl FnMut(f64) -> f64, a: f64, rtol: f64) -> f64 {
    assert!(a > 0.0, "substitution requires a strictly positive lower bound");
    let substituted = |u: f64| if u == 0.0 { 0.0 } else { f(1.0 / u) / (u * u) };
    romberg(substituted, 0.0, 1.0 / a, rtol)
}

/// `integral_{-inf}^{-a} f(z) dz` for `a > 0`, obtained by mirroring into
/// `integrate_to_infinity` with `g(w) = f(-w)`.
pub fn integrate_from_neg_infinity(mut f: impl FnMut(f64) -> f64, a: f64, rtol: f64) -> f64 {
    integrate_to_infinity(|w| f(-w), a, rtol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn romberg_integrates_polynomial_exactly() {
        let value = romberg(|x| x * x, 0.0, 3.0, 1e-10);
        assert!((value - 9.0).abs() < 1e-8);
    }

    #[test]
    fn infinite_tail_of_gaussian_matches_known_value() {
        // integral_1^inf exp(-z^2) dz ~= 0.13925...
        let value = integrate_to_infinity(|z| (-z * z).exp(), 1.0, 1e-6);
        assert!((value - 0.1392_5).abs() < 1e-3);
    }
}
