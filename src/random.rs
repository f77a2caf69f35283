//! Random engine: uniform `U(0,1)`, a uniform point on the
//! unit sphere, and a Maxwell-Boltzmann velocity sampler built from two
//! Box-Muller transforms. The concrete engine is configuration-driven
//! behind the `RandomEngine` trait; `rand::rngs::StdRng` seeded
//! from the configuration file is the one shipped here.

use std::f64::consts::PI;

use rand::Rng;
use rand::SeedableRng;

/// The three samplers every collision/population/advection call site needs.
/// Any engine with a statistically sound uniform can implement this; the
/// only hard requirement is deterministic reseeding.
pub trait RandomEngine {
    /// Uniform deviate in `(0, 1)`.
    fn uniform(&mut self) -> f64;

    /// A uniformly distributed unit vector `(kx, ky, kz)`. Draws `kx` and an
    /// azimuthal angle, then renormalises to remove accumulated round-off
    ///. Uses exactly two uniforms.
    fn unit_sphere(&mut self) -> (f64, f64, f64) {
        let kx = 2.0 * self.uniform() - 1.0;
        let phi = 2.0 * PI * self.uniform();
        let s = (1.0 - kx * kx).max(0.0).sqrt();
        let ky = s * phi.cos();
        let kz = s * phi.sin();
        let norm = (kx * kx + ky * ky + kz * kz).sqrt();
        (kx / norm, ky / norm, kz / norm)
    }

    /// `(vx, vy, vz) ~ MB(m, ux, uy, T)`: three independent normal variates
    /// with variance `T/m`, centred at `(ux, uy, 0)`. Two Box-Muller
    /// transforms produce the four normal variates needed (one is
    /// discarded), so no sample consumes more than four uniforms.
    fn maxwell_boltzmann(&mut self, mass: f64, ux: f64, uy: f64, temperature: f64) -> (f64, f64, f64) {
        let sigma = (temperature / mass).sqrt();
        let (z0, z1) = self.box_muller();
        let (z2, _z3) = self.box_muller();
        (ux + sigma * z0, uy + sigma * z1, sigma * z2)
    }

    /// A single Box-Muller transform: two uniforms in, two independent
    /// standard-normal variates out.
    fn box_muller(&mut self) -> (f64, f64) {
        let u1 = self.uniform().max(f64::MIN_POSITIVE);
        let u2 = self.uniform();
        let r = (-2.0 * u1.ln()).sqrt();
        let theta = 2.0 * PI * u2;
        (r * theta.cos(), r * theta.sin())
    }
}

/// `rand`-backed deterministic engine, seeded from the configuration file.
pub struct StdRandomEngine {
    rng: rand::rngs::StdRng,
}

impl StdRandomEngine {
    pub fn from_seed(seed: u64) -> Self {
        StdRandomEngine {
            rng: rand::rngs::StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomEngine for StdRandomEngine {
    fn uniform(&mut self) -> f64 {
        // Exclude the endpoints, matching the open interval `(0, 1)` the
        // Box-Muller transform and the density-kernel sampling both need.
        loop {
            let u: f64 = self.rng.gen();
            if u > 0.0 && u < 1.0 {
                return u;
            }
        }
    }
}
