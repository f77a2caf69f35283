//! Mean-field force kernel: a precomputed radial potential
//! integral over the sphere of exclusion, convolved with the halo-backed
//! number density. Grounded on `original_source/force_field.hpp`/
//! `force_field.cpp`.

use rayon::prelude::*;

use crate::field::HaloField;
use crate::grid::Grid;
use crate::integration::integrate_from_neg_infinity;
use crate::integration::integrate_to_infinity;
use crate::integration::romberg;
use crate::potential::PairPotential;

/// Relative accuracy target for the Romberg quadratures.
const INTEGRAL_RTOL: f64 = 1e-4;
/// Small positive threshold used when the offset distance sits exactly on
/// the sphere of exclusion.
const ZERO_THRESHOLD: f64 = 1e-4;

/// A `(2*cutoff_x+1) x (2*cutoff_y+1)` matrix indexed by signed offset
/// `(i, j)` in `[-cutoff_x, cutoff_x] x [-cutoff_y, cutoff_y]` — the
/// "`SlideMaskMatrix`"-equivalent the radial kernel and its two directional
/// components live in.
struct SlideMatrix {
    cutoff_x: i32,
    cutoff_y: i32,
    data: Vec<f64>,
}

impl SlideMatrix {
    fn new(cutoff_x: i32, cutoff_y: i32) -> Self {
        let width = (2 * cutoff_x + 1) as usize;
        let height = (2 * cutoff_y + 1) as usize;
        SlideMatrix {
            cutoff_x,
            cutoff_y,
            data: vec![0.0; width * height],
        }
    }

    fn height(&self) -> usize {
        (2 * self.cutoff_y + 1) as usize
    }

    #[inline]
    fn index(&self, i: i32, j: i32) -> usize {
        let si = (i + self.cutoff_x) as usize;
        let sj = (j + self.cutoff_y) as usize;
        si * self.height() + sj
    }

    fn get(&self, i: i32, j: i32) -> f64 {
        self.data[self.index(i, j)]
    }

    fn set(&mut self, i: i32, j: i32, value: f64) {
        let idx = self.index(i, j);
        self.data[idx] = value;
    }

    fn offsets(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let cx = self.cutoff_x;
        let cy = self.cutoff_y;
        (-cx..=cx).flat_map(move |i| (-cy..=cy).map(move |j| (i, j)))
    }
}

pub struct ForceField {
    cutoff_x: i32,
    cutoff_y: i32,
    kernel_x: SlideMatrix,
    kernel_y: SlideMatrix,
    force_x: HaloField<f64>,
    force_y: HaloField<f64>,
}

impl ForceField {
    /// Precomputes the radial kernel matrix once at startup;
    /// the kernel is immutable thereafter.
    pub fn new(grid: &Grid, potential: &dyn PairPotential, sigma: f64, cutoff_x: i32, cutoff_y: i32) -> Self {
        assert!(cutoff_x >= 0 && cutoff_y >= 0);
        let mut kernel_x = SlideMatrix::new(cutoff_x, cutoff_y);
        let mut kernel_y = SlideMatrix::new(cutoff_x, cutoff_y);
        let sigma2 = sigma * sigma;
        let dx = grid.dx;
        let dy = grid.dy;

        let offsets: Vec<(i32, i32)> = kernel_x.offsets().collect();
        let values: Vec<(f64, f64)> = offsets
            .par_iter()
            .map(|&(i, j)| {
                let distx = i as f64 * dx;
                let disty = j as f64 * dy;
                let dist2 = distx * distx + disty * disty;
                let radial = radial_kernel_integral(potential, dist2, sigma2);
                let dist = dist2.sqrt();
                if dist > 0.0 {
                    (radial * distx / dist, radial * disty / dist)
                } else {
                    (0.0, 0.0)
                }
            })
            .collect();
        for (&(i, j), &(kx, ky)) in offsets.iter().zip(values.iter()) {
            kernel_x.set(i, j, kx);
            kernel_y.set(i, j, ky);
        }

        ForceField {
            cutoff_x,
            cutoff_y,
            kernel_x,
            kernel_y,
            force_x: HaloField::new_interior(grid.n_cells_x, grid.n_cells_y, 0.0),
            force_y: HaloField::new_interior(grid.n_cells_x, grid.n_cells_y, 0.0),
        }
    }

    /// Convolves the two directional kernels with the halo-backed density
    /// `n`, producing the interior-only force fields.
    pub fn compute(&mut self, density: &HaloField<f64>, grid: &Grid) {
        let cell_area = grid.dx * grid.dy;
        let interior: Vec<(i32, i32)> = self.force_x.iter_interior().collect();
        let results: Vec<(f64, f64)> = interior
            .par_iter()
            .map(|&(i, j)| {
                let mut fx = 0.0;
                let mut fy = 0.0;
                for a in -self.cutoff_x..=self.cutoff_x {
                    for b in -self.cutoff_y..=self.cutoff_y {
                        let n = density.get(i + a, j + b);
                        fx += self.kernel_x.get(a, b) * n;
                        fy += self.kernel_y.get(a, b) * n;
                    }
                }
                (fx / cell_area, fy / cell_area)
            })
            .collect();
        for (&(i, j), &(fx, fy)) in interior.iter().zip(results.iter()) {
            self.force_x.set(i, j, fx);
            self.force_y.set(i, j, fy);
        }
    }

    pub fn force_x(&self, i: i32, j: i32) -> f64 {
        self.force_x.get(i, j)
    }

    pub fn force_y(&self, i: i32, j: i32) -> f64 {
        self.force_y.get(i, j)
    }
}

/// `K(i,j) = integral_{-inf}^{+inf} pot_kernel(sqrt(d^2 + z^2)) dz`, split
/// around the sphere of exclusion `r < sigma`.
fn radial_kernel_integral(potential: &dyn PairPotential, dist2: f64, sigma2: f64) -> f64 {
    let psi = |z: f64, d2: f64| potential.pot_kernel((d2 + z * z).sqrt());
    let diff = dist2 - sigma2;
    if diff > 0.0 {
        let s = diff.sqrt();
        integrate_from_neg_infinity(|z| psi(z, dist2), s, INTEGRAL_RTOL)
            + romberg(|z| psi(z, dist2), -s, s, INTEGRAL_RTOL)
            + integrate_to_infinity(|z| psi(z, dist2), s, INTEGRAL_RTOL)
    } else if diff < 0.0 {
        let s = (-diff).sqrt();
        integrate_from_neg_infinity(|z| psi(z, dist2), s, INTEGRAL_RTOL)
            + integrate_to_infinity(|z| psi(z, dist2), s, INTEGRAL_RTOL)
    } else {
        integrate_from_neg_infinity(|z| psi(z, dist2), ZERO_THRESHOLD, INTEGRAL_RTOL)
            + integrate_to_infinity(|z| psi(z, dist2), ZERO_THRESHOLD, INTEGRAL_RTOL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::potential::SutherlandMie;

    #[test]
    fn kernel_matrix_is_antisymmetric_in_direction() {
        let grid = Grid::new(10, 10, -5.0, 5.0, -5.0, 5.0, 1.0);
        let potential = SutherlandMie {
            phi: 1.0,
            sigma: 1.0,
            gamma: 6.0,
        };
        let field = ForceField::new(&grid, &potential, 1.0, 3, 3);
        for (i, j) in field.kernel_x.offsets() {
            assert!((field.kernel_x.get(i, j) + field.kernel_x.get(-i, -j)).abs() < 1e-8);
            assert!((field.kernel_y.get(i, j) + field.kernel_y.get(-i, -j)).abs() < 1e-8);
        }
    }
}
