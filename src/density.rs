//! Reduced and smoothed density fields. Grounded on
//! `original_source/density.hpp`/`density.cpp`.

use std::f64::consts::PI;

use rayon::prelude::*;

use crate::binning::BinnedIndex;
use crate::field::HaloField;
use crate::grid::Grid;
use crate::particle::Ensemble;
use crate::species::Species;

/// Averaging-weight stencil over a disk of radius `σ/2`, precomputed once.
struct Stencil {
    cutoff_x: i32,
    cutoff_y: i32,
    /// Flattened `(offset, weight)` pairs; points outside the disk of
    /// radius `σ/2` are omitted rather than stored with weight `0`.
    weights: Vec<(i32, i32, f64)>,
}

impl Stencil {
    /// `ns_x, ns_y = floor(half_diameter / (d· sqrt(2)))`, matching
    /// `original_source/density.cpp`'s constructor member-init list.
    fn new(grid: &Grid, half_diameter: f64) -> Self {
        let ns_x = (half_diameter / (grid.dx * std::f64::consts::SQRT_2)) as i32;
        let ns_y = (half_diameter / (grid.dy * std::f64::consts::SQRT_2)) as i32;
        let hsigma2 = half_diameter * half_diameter;
        let sigma = 2.0 * half_diameter;
        let mut weights = Vec::new();
        let mut sum_w = 0.0;
        for i in -ns_x..=ns_x {
            for j in -ns_y..=ns_y {
                let sx = i as f64 * grid.dx;
                let sy = j as f64 * grid.dy;
                let inside = hsigma2 - sx * sx - sy * sy;
                if inside > 0.0 {
                    let w = 12.0 / (PI * sigma.powi(3)) * inside.sqrt() * grid.dx * grid.dy;
                    sum_w += w;
                    weights.push((i, j, w));
                }
            }
        }
        assert!(sum_w > 0.0, "empty averaging stencil: grid too coarse for sigma");
        for entry in &mut weights {
            entry.2 /= sum_w;
        }
        Stencil {
            cutoff_x: ns_x,
            cutoff_y: ns_y,
            weights,
        }
    }
}

/// Binning, halo-filled number density, reduced density, and the
/// stencil-smoothed reduced density `η̄`.
pub struct DensityKernel {
    reduce_factor: f64,
    stencil: Stencil,
    num_density: HaloField<f64>,
    reduced_density: HaloField<f64>,
    smoothed_density: HaloField<f64>,
}

impl DensityKernel {
    pub fn new(grid: &Grid, species: &Species, mean_field_cutoff_x: i32, mean_field_cutoff_y: i32) -> Self {
        let stencil = Stencil::new(grid, species.half_diameter());
        let halo_x = mean_field_cutoff_x.max(stencil.cutoff_x);
        let halo_y = mean_field_cutoff_y.max(stencil.cutoff_y);
        DensityKernel {
            reduce_factor: (PI / 6.0) * species.diameter.powi(3),
            stencil,
            num_density: HaloField::new(grid.n_cells_x, grid.n_cells_y, halo_x, halo_y, 0.0),
            reduced_density: HaloField::new(grid.n_cells_x, grid.n_cells_y, halo_x, halo_y, 0.0),
            smoothed_density: HaloField::new_interior(grid.n_cells_x, grid.n_cells_y, 0.0),
        }
    }

    /// Binning (§4.3), halo-fill, reduced density, and the stencil
    /// convolution, in that order.
    pub fn update(&mut self, ensemble: &Ensemble, grid: &Grid) -> BinnedIndex {
        let index = BinnedIndex::build(ensemble, grid);

        for i in 0..grid.n_cells_x {
            for j in 0..grid.n_cells_y {
                self.num_density.set(i, j, index.npc(i, j, grid) as f64);
            }
        }
        self.num_density.fill_periodic_halo();
        self.num_density.scale(1.0 / grid.cell_volume());

        self.reduced_density.assign(&self.num_density);
        self.reduced_density.scale(self.reduce_factor);

        let interior: Vec<(i32, i32)> = self.smoothed_density.iter_interior().collect();
        let values: Vec<f64> = interior
            .par_iter()
            .map(|&(i, j)| {
                self.stencil
                    .weights
                    .iter()
                    .map(|&(a, b, w)| w * self.reduced_density.get(i + a, j + b))
                    .sum()
            })
            .collect();
        for (&(i, j), &v) in interior.iter().zip(values.iter()) {
            self.smoothed_density.set(i, j, v);
        }

        index
    }

    /// Halo-backed number density `n` (cell centers are in real particles
    /// per unit cell volume; used directly by the force-field convolution).
    pub fn num_density(&self) -> &HaloField<f64> {
        &self.num_density
    }

    pub fn reduced_density(&self, i: i32, j: i32) -> f64 {
        self.reduced_density.get(i, j)
    }

    /// `η̄(i,j)`, interior only.
    pub fn smoothed_density(&self, i: i32, j: i32) -> f64 {
        self.smoothed_density.get(i, j)
    }
}
