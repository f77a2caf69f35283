//! Periodic velocity rescaling.
//! Grounded on `original_source/thermostat.hpp`/`thermostat.cpp`.

use log::warn;

use crate::particle::Ensemble;

pub struct Thermostat {
    pub target_temperature: f64,
    pub period: u64,
}

impl Thermostat {
    pub fn new(target_temperature: f64, period: u64) -> Self {
        assert!(target_temperature >= 0.0, "thermostat target temperature cannot be negative");
        assert!(period > 0, "thermostat period must be positive");
        Thermostat {
            target_temperature,
            period,
        }
    }

    pub fn is_due(&self, step: u64) -> bool {
        step % self.period == 0
    }

    /// Rescales every velocity component by `sqrt(T_ref / T)`, where `T` is
    /// the fluctuation temperature measured after subtracting the bulk
    /// drift velocity (`rescale_velocity` in the original). A degenerate or
    /// perfectly coherent ensemble (`T <= 0`) is left untouched.
    pub fn apply(&self, ensemble: &mut Ensemble) {
        let n = ensemble.len();
        if n == 0 {
            return;
        }
        let n = n as f64;
        let (sum_vx, sum_vy, sum_vz, sum_v2) = ensemble.iter().fold((0.0, 0.0, 0.0, 0.0), |(sx, sy, sz, sv2), p| {
            (sx + p.vx, sy + p.vy, sz + p.vz, sv2 + p.vx * p.vx + p.vy * p.vy + p.vz * p.vz)
        });
        let (mean_vx, mean_vy, mean_vz) = (sum_vx / n, sum_vy / n, sum_vz / n);
        let temperature = (sum_v2 / n - (mean_vx * mean_vx + mean_vy * mean_vy + mean_vz * mean_vz)) / 3.0;
        if temperature <= 0.0 {
            warn!("thermostat skipped: fluctuation temperature is non-positive");
            return;
        }
        let scale = (self.target_temperature / temperature).sqrt();
        for p in ensemble.as_mut_slice() {
            p.vx = mean_vx + (p.vx - mean_vx) * scale;
            p.vy = mean_vy + (p.vy - mean_vy) * scale;
            p.vz = mean_vz + (p.vz - mean_vz) * scale;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use crate::particle::InitialLayout;
    use crate::random::StdRandomEngine;
    use crate::species::Species;

    #[test]
    fn rescaling_drives_temperature_to_target() {
        let grid = Grid::new(5, 5, -2.5, 2.5, -2.5, 2.5, 1.0);
        let species = Species::new(1.0, 1.0);
        let mut rng = StdRandomEngine::from_seed(3);
        let mut ensemble = Ensemble::populate(5_000, InitialLayout::Uniform, &grid, &species, 1.0, &mut rng);
        let thermostat = Thermostat::new(3.0, 10);
        thermostat.apply(&mut ensemble);

        let n = ensemble.len() as f64;
        let (sum_vx, sum_vy, sum_vz, sum_v2) = ensemble.iter().fold((0.0, 0.0, 0.0, 0.0), |(sx, sy, sz, sv2), p| {
            (sx + p.vx, sy + p.vy, sz + p.vz, sv2 + p.vx * p.vx + p.vy * p.vy + p.vz * p.vz)
        });
        let (mean_vx, mean_vy, mean_vz) = (sum_vx / n, sum_vy / n, sum_vz / n);
        let temperature = (sum_v2 / n - (mean_vx * mean_vx + mean_vy * mean_vy + mean_vz * mean_vz)) / 3.0;
        assert!((temperature - 3.0).abs() < 1e-6);
    }

    #[test]
    fn is_due_matches_the_configured_period() {
        let thermostat = Thermostat::new(1.0, 4);
        assert!(thermostat.is_due(0));
        assert!(!thermostat.is_due(1));
        assert!(thermostat.is_due(4));
    }
}
