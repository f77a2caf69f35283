//! Bin-wise moment accumulation and flush. Grounded on
//! `original_source/sampling.hpp`/`sampling.cpp`.

use crate::force_field::ForceField;
use crate::grid::Grid;
use crate::particle::Ensemble;

/// Per-cell streaming pressure-tensor components and heat flux, plus the
/// scalar moments the driver needs for diagnostics.
#[derive(Debug, Clone, Copy, Default)]
pub struct CellAverages {
    pub number_density: f64,
    pub mean_vx: f64,
    pub mean_vy: f64,
    pub mean_vz: f64,
    pub temperature: f64,
    pub pxx: f64,
    pub pyy: f64,
    pub pzz: f64,
    pub pxy: f64,
    pub pxz: f64,
    pub pyz: f64,
    pub qx: f64,
    pub qy: f64,
    pub qz: f64,
    pub fx: f64,
    pub fy: f64,
}

#[derive(Clone)]
struct CellAccumulator {
    hits: u64,
    sum_vx: f64,
    sum_vy: f64,
    sum_vz: f64,
    sum_vx2: f64,
    sum_vy2: f64,
    sum_vz2: f64,
    sum_vxvy: f64,
    sum_vxvz: f64,
    sum_vyvz: f64,
    sum_qx: f64,
    sum_qy: f64,
    sum_qz: f64,
    sum_v2: f64,
}

impl Default for CellAccumulator {
    fn default() -> Self {
        CellAccumulator {
            hits: 0,
            sum_vx: 0.0,
            sum_vy: 0.0,
            sum_vz: 0.0,
            sum_vx2: 0.0,
            sum_vy2: 0.0,
            sum_vz2: 0.0,
            sum_vxvy: 0.0,
            sum_vxvz: 0.0,
            sum_vyvz: 0.0,
            sum_qx: 0.0,
            sum_qy: 0.0,
            sum_qz: 0.0,
            sum_v2: 0.0,
        }
    }
}

pub struct Sampler {
    n_cells_x: i32,
    n_cells_y: i32,
    cells: Vec<CellAccumulator>,
    sum_fx: Vec<f64>,
    sum_fy: Vec<f64>,
    outer_counter: u64,
}

impl Sampler {
    pub fn new(grid: &Grid) -> Self {
        let n = grid.n_cells() as usize;
        Sampler {
            n_cells_x: grid.n_cells_x,
            n_cells_y: grid.n_cells_y,
            cells: vec![CellAccumulator::default(); n],
            sum_fx: vec![0.0; n],
            sum_fy: vec![0.0; n],
            outer_counter: 0,
        }
    }

    fn index(&self, i: i32, j: i32) -> usize {
        (i + j * self.n_cells_x) as usize
    }

    /// Accumulate one step's contribution to the running moments.
    pub fn sample(&mut self, ensemble: &Ensemble, force_field: Option<&ForceField>) {
        self.outer_counter += 1;
        for p in ensemble.iter() {
            let idx = self.index(p.cx, p.cy);
            let acc = &mut self.cells[idx];
            acc.hits += 1;
            acc.sum_vx += p.vx;
            acc.sum_vy += p.vy;
            acc.sum_vz += p.vz;
            acc.sum_vx2 += p.vx * p.vx;
            acc.sum_vy2 += p.vy * p.vy;
            acc.sum_vz2 += p.vz * p.vz;
            acc.sum_vxvy += p.vx * p.vy;
            acc.sum_vxvz += p.vx * p.vz;
            acc.sum_vyvz += p.vy * p.vz;
            let e_kin = p.vx * p.vx + p.vy * p.vy + p.vz * p.vz;
            acc.sum_v2 += e_kin;
            acc.sum_qx += p.vx * e_kin;
            acc.sum_qy += p.vy * e_kin;
            acc.sum_qz += p.vz * e_kin;
        }
        if let Some(field) = force_field {
            for i in 0..self.n_cells_x {
                for j in 0..self.n_cells_y {
                    let idx = self.index(i, j);
                    self.sum_fx[idx] += field.force_x(i, j);
                    self.sum_fy[idx] += field.force_y(i, j);
                }
            }
        }
    }

    /// Flush the accumulated moments into per-cell averages and reset
    /// the accumulators for the next sampling window.
    pub fn flush(&mut self, grid: &Grid) -> Vec<CellAverages> {
        let cell_volume = grid.cell_volume();
        let outer = self.outer_counter.max(1) as f64;
        let mut out = Vec::with_capacity(self.cells.len());
        for (idx, acc) in self.cells.iter().enumerate() {
            if acc.hits == 0 {
                out.push(CellAverages::default());
                continue;
            }
            let hits = acc.hits as f64;
            let dt_factor = hits / (outer * cell_volume);
            let mean_vx = acc.sum_vx / hits;
            let mean_vy = acc.sum_vy / hits;
            let mean_vz = acc.sum_vz / hits;

            let pxx = (acc.sum_vx2 / hits - mean_vx * mean_vx) * dt_factor;
            let pyy = (acc.sum_vy2 / hits - mean_vy * mean_vy) * dt_factor;
            let pzz = (acc.sum_vz2 / hits - mean_vz * mean_vz) * dt_factor;
            let pxy = (acc.sum_vxvy / hits - mean_vx * mean_vy) * dt_factor;
            let pxz = (acc.sum_vxvz / hits - mean_vx * mean_vz) * dt_factor;
            let pyz = (acc.sum_vyvz / hits - mean_vy * mean_vz) * dt_factor;

            let qx = (acc.sum_qx / (2.0 * hits)) * dt_factor;
            let qy = (acc.sum_qy / (2.0 * hits)) * dt_factor;
            let qz = (acc.sum_qz / (2.0 * hits)) * dt_factor;

            let mean_v2 = acc.sum_v2 / hits;
            let temperature = (mean_v2 - mean_vx * mean_vx - mean_vy * mean_vy - mean_vz * mean_vz) / 3.0;

            out.push(CellAverages {
                number_density: dt_factor,
                mean_vx,
                mean_vy,
                mean_vz,
                temperature,
                pxx,
                pyy,
                pzz,
                pxy,
                pxz,
                pyz,
                qx,
                qy,
                qz,
                fx: self.sum_fx[idx] / outer,
                fy: self.sum_fy[idx] / outer,
            });
        }

        self.cells.iter_mut().for_each(|c| *c = CellAccumulator::default());
        self.sum_fx.iter_mut().for_each(|v| *v = 0.0);
        self.sum_fy.iter_mut().for_each(|v| *v = 0.0);
        self.outer_counter = 0;

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::InitialLayout;
    use crate::random::StdRandomEngine;
    use crate::species::Species;

    #[test]
    fn flush_with_no_samples_reports_zero_everywhere() {
        let grid = Grid::new(4, 4, -2.0, 2.0, -2.0, 2.0, 1.0);
        let mut sampler = Sampler::new(&grid);
        let averages = sampler.flush(&grid);
        assert!(averages.iter().all(|a| a.number_density == 0.0 && a.temperature == 0.0));
    }

    #[test]
    fn sampling_uniform_ensemble_gives_finite_nonnegative_density() {
        let grid = Grid::new(8, 8, -4.0, 4.0, -4.0, 4.0, 1.0);
        let species = Species::new(1.0, 1.0);
        let mut rng = StdRandomEngine::from_seed(9);
        let ensemble = Ensemble::populate(2_000, InitialLayout::Uniform, &grid, &species, 1.0, &mut rng);
        let mut sampler = Sampler::new(&grid);
        sampler.sample(&ensemble, None);
        let averages = sampler.flush(&grid);
        for a in &averages {
            assert!(a.number_density >= 0.0 && a.number_density.is_finite());
            assert!(a.temperature.is_finite());
        }
    }
}
