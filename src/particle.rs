//! Particle records and the ensemble.
//! Grounded on `original_source/particles.hpp`/`particles.cpp`.

use crate::grid::Grid;
use crate::random::RandomEngine;
use crate::species::Species;

/// A single representative particle: position in the periodic rectangle,
/// velocity in R^3, and a cached cell index kept in sync by advection/
/// binning.
#[derive(Debug, Clone, Copy)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub vz: f64,
    pub cx: i32,
    pub cy: i32,
    pub tag: u32,
}

/// How the initial population is laid out in space.
#[derive(Debug, Clone, Copy)]
pub enum InitialLayout {
    /// `liq_interf = 0`: particles spread uniformly over the whole domain.
    Uniform,
    /// `liq_interf = 5`: a liquid slab of the given half-thickness centred
    /// on `y = 0`, gas everywhere outside it.
    HorizontalSlab { liquid_fraction: f64, half_thickness: f64 },
    /// `liq_interf = 6`: the same split along `x` instead of `y`.
    VerticalSlab { liquid_fraction: f64, half_thickness: f64 },
}

/// The full particle population.
#[derive(Clone)]
pub struct Ensemble {
    particles: Vec<Particle>,
}

impl Ensemble {
    /// Populate `n_particles` particles according to `layout`, with initial
    /// velocities Maxwell-Boltzmann distributed at `t_ini`.
    pub fn populate(
        n_particles: usize,
        layout: InitialLayout,
        grid: &Grid,
        species: &Species,
        t_ini: f64,
        rng: &mut impl RandomEngine,
    ) -> Self {
        let mut particles = Vec::with_capacity(n_particles);
        let width = grid.x_max - grid.x_min;
        let height = grid.y_max - grid.y_min;
        match layout {
            InitialLayout::Uniform => {
                for _ in 0..n_particles {
                    let x = grid.x_min + rng.uniform() * width;
                    let y = grid.y_min + rng.uniform() * height;
                    particles.push((x, y));
                }
            }
            InitialLayout::HorizontalSlab {
                liquid_fraction,
                half_thickness,
            } => {
                let n_liquid = (liquid_fraction * n_particles as f64).round() as usize;
                for _ in 0..n_liquid {
                    let x = grid.x_min + rng.uniform() * width;
                    let y = rng.uniform() * 2.0 * half_thickness - half_thickness;
                    particles.push((x, y));
                }
                for _ in n_liquid..n_particles {
                    let x = grid.x_min + rng.uniform() * width;
                    let mut y;
                    loop {
                        y = grid.y_min + rng.uniform() * height;
                        if y.abs() > half_thickness {
                            break;
                        }
                    }
                    particles.push((x, y));
                }
            }
            InitialLayout::VerticalSlab {
                liquid_fraction,
                half_thickness,
            } => {
                let n_liquid = (liquid_fraction * n_particles as f64).round() as usize;
                for _ in 0..n_liquid {
                    let x = rng.uniform() * 2.0 * half_thickness - half_thickness;
                    let y = grid.y_min + rng.uniform() * height;
                    particles.push((x, y));
                }
                for _ in n_liquid..n_particles {
                    let y = grid.y_min + rng.uniform() * height;
                    let mut x;
                    loop {
                        x = grid.x_min + rng.uniform() * width;
                        if x.abs() > half_thickness {
                            break;
                        }
                    }
                    particles.push((x, y));
                }
            }
        }

        let mut ensemble = Vec::with_capacity(n_particles);
        for (tag, (x, y)) in particles.into_iter().enumerate() {
            let (cx, cy) = grid.cell_of(x, y);
            let (vx, vy, vz) = rng.maxwell_boltzmann(species.mass, 0.0, 0.0, t_ini);
            ensemble.push(Particle {
                x,
                y,
                vx,
                vy,
                vz,
                cx,
                cy,
                tag: tag as u32,
            });
        }
        Ensemble { particles: ensemble }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn as_slice(&self) -> &[Particle] {
        &self.particles
    }

    pub fn as_mut_slice(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn get(&self, idx: usize) -> &Particle {
        &self.particles[idx]
    }

    pub fn get_mut(&mut self, idx: usize) -> &mut Particle {
        &mut self.particles[idx]
    }

    /// Total linear momentum `sum(m * v)`, used by the conservation tests.
    pub fn total_momentum(&self, mass: f64) -> (f64, f64, f64) {
        self.particles.iter().fold((0.0, 0.0, 0.0), |(sx, sy, sz), p| {
            (sx + mass * p.vx, sy + mass * p.vy, sz + mass * p.vz)
        })
    }

    /// Total kinetic energy `sum(1/2 m |v|^2)`.
    pub fn total_kinetic_energy(&self, mass: f64) -> f64 {
        self.particles
            .iter()
            .map(|p| 0.5 * mass * (p.vx * p.vx + p.vy * p.vy + p.vz * p.vz))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::StdRandomEngine;

    #[test]
    fn uniform_population_stays_in_domain() {
        let grid = Grid::new(10, 10, -5.0, 5.0, -5.0, 5.0, 1.0);
        let species = Species::new(1.0, 1.0);
        let mut rng = StdRandomEngine::from_seed(1);
        let ensemble = Ensemble::populate(1000, InitialLayout::Uniform, &grid, &species, 1.0, &mut rng);
        for p in ensemble.iter() {
            assert!(p.x >= grid.x_min && p.x < grid.x_max);
            assert!(p.y >= grid.y_min && p.y < grid.y_max);
            assert!(p.cx >= 0 && p.cx < grid.n_cells_x);
            assert!(p.cy >= 0 && p.cy < grid.n_cells_y);
        }
    }
}
