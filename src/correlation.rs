//! Hard-sphere pair correlation function `chi(eta)`.
//! Grounded on `original_source/correlations.hpp`.

use std::f64::consts::PI;

const SQRT_2: f64 = std::f64::consts::SQRT_2;

/// `chi(eta)` for `eta` in `[0, eta_max)`. Selectable at build time.
///
/// # Panics
/// If `eta >= 1`, the local configuration is physically invalid (packing
/// fraction cannot exceed close packing); this is an invariant violation,
/// so it panics with the offending value rather than returning a
/// nonsensical result.
pub trait Correlation: Send + Sync {
    fn chi(&self, eta: f64) -> f64;
}

fn check_eta(eta: f64) {
    assert!(
        eta < 1.0,
        "reduced density eta = {eta} >= 1: physically invalid packing fraction"
    );
    assert!(eta >= 0.0, "reduced density eta = {eta} is negative");
}

/// Carnahan-Starling (1969): `chi(eta) = 0.5 (2 - eta) / (1 - eta)^3`.
pub struct CarnahanStarling;

impl Correlation for CarnahanStarling {
    fn chi(&self, eta: f64) -> f64 {
        check_eta(eta);
        0.5 * (2.0 - eta) / (1.0 - eta).powi(3)
    }
}

/// Vera (1997): an explicit rational polynomial in `xi = 6 eta / (pi sqrt(2))`.
pub struct Vera;

impl Correlation for Vera {
    fn chi(&self, eta: f64) -> f64 {
        check_eta(eta);
        let xi = 6.0 * eta / (PI * SQRT_2);
        let numerator = 296.0 + xi * (-340.0 + xi * (-25.0 + xi * xi * (18.0 + 142.0 * xi.powi(7))));
        3.0 * numerator / (200.0 * PI * SQRT_2 * (1.0 - xi).powi(3))
    }
}

/// Returns the correlation variant chosen at build time via Cargo feature
/// flags.
#[cfg(feature = "vera-correlation")]
pub fn selected() -> Box<dyn Correlation> {
    Box::new(Vera)
}

#[cfg(not(feature = "vera-correlation"))]
pub fn selected() -> Box<dyn Correlation> {
    Box::new(CarnahanStarling)
}
