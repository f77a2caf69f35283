//! Non-directional pair potentials. Grounded on
//! `original_source/potential.hpp`/`potential.cpp`.

/// A radial pair potential exposing the value, the first derivative, and
/// the derived kernel `pot_kernel(r) = (1/r) dU/dr` the force-field radial
/// integral needs.
pub trait PairPotential: Send + Sync {
    fn potential(&self, r: f64) -> f64;
    fn d_potential_dr(&self, r: f64) -> f64;

    fn pot_kernel(&self, r: f64) -> f64 {
        self.d_potential_dr(r) / r
    }
}

/// `U(r) = -phi * (sigma / r)^gamma` — selectable at build time via
/// `mean_f_gg`'s potential-form configuration.
pub struct SutherlandMie {
    pub phi: f64,
    pub sigma: f64,
    pub gamma: f64,
}

impl PairPotential for SutherlandMie {
    fn potential(&self, r: f64) -> f64 {
        -self.phi * (self.sigma / r).powf(self.gamma)
    }

    fn d_potential_dr(&self, r: f64) -> f64 {
        self.phi * self.gamma * self.sigma.powf(self.gamma) * r.powf(-self.gamma - 1.0)
    }
}

/// `U(r) = -phi * exp(-alpha (r - sigma))`.
pub struct SutherlandMorse {
    pub phi: f64,
    pub sigma: f64,
    pub alpha: f64,
}

impl PairPotential for SutherlandMorse {
    fn potential(&self, r: f64) -> f64 {
        -self.phi * (-self.alpha * (r - self.sigma)).exp()
    }

    fn d_potential_dr(&self, r: f64) -> f64 {
        self.phi * self.alpha * (-self.alpha * (r - self.sigma)).exp()
    }
}

/// Returns the potential variant chosen at build time via Cargo feature
/// flags, parameterised by the
/// configuration file's `phi11`/`gamma11` pair — reinterpreted as
/// `(phi, alpha)` for the Morse form.
#[cfg(feature = "sutherland-morse-potential")]
pub fn selected(phi: f64, sigma: f64, gamma_or_alpha: f64) -> Box<dyn PairPotential> {
    Box::new(SutherlandMorse {
        phi,
        sigma,
        alpha: gamma_or_alpha,
    })
}

#[cfg(not(feature = "sutherland-morse-potential"))]
pub fn selected(phi: f64, sigma: f64, gamma_or_alpha: f64) -> Box<dyn PairPotential> {
    Box::new(SutherlandMie {
        phi,
        sigma,
        gamma: gamma_or_alpha,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numerical_derivative(p: &dyn PairPotential, r: f64) -> f64 {
        let h = 1e-6;
        (p.potential(r + h) - p.potential(r - h)) / (2.0 * h)
    }

    #[test]
    fn sutherland_mie_derivative_matches_numerical() {
        let p = SutherlandMie {
            phi: 1.0,
            sigma: 1.0,
            gamma: 6.0,
        };
        let r = 1.5;
        assert!((p.d_potential_dr(r) - numerical_derivative(&p, r)).abs() < 1e-5);
    }

    #[test]
    fn sutherland_morse_derivative_matches_numerical() {
        let p = SutherlandMorse {
            phi: 1.0,
            sigma: 1.0,
            alpha: 2.0,
        };
        let r = 1.5;
        assert!((p.d_potential_dr(r) - numerical_derivative(&p, r)).abs() < 1e-5);
    }
}
