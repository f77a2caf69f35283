//! Binned particle index — the hot-path cell-sorted map:
//! `npc` (counts), `iof` (cumulative offsets), `ind` (particle ids grouped
//! by cell). Grounded on `original_source/density.cpp`
//! (`binning`/`compute_ind_map_part`).

use rayon::prelude::*;

use crate::grid::Grid;
use crate::particle::Ensemble;

pub struct BinnedIndex {
    /// Particle count per cell, lexicographic order.
    npc: Vec<i32>,
    /// Cumulative offsets, length `n_cells + 1`.
    iof: Vec<i32>,
    /// Particle ids grouped contiguously by cell.
    ind: Vec<u32>,
}

impl BinnedIndex {
    /// Rebuild the index from the ensemble's cached `(cx, cy)` per particle.
    /// An out-of-range cached cell index is a programmer error and panics —
    /// no silent clamping.
    pub fn build(ensemble: &Ensemble, grid: &Grid) -> Self {
        let n_cells = grid.n_cells() as usize;
        let particles = ensemble.as_slice();

        // Per-thread local counts merged by summation.
        let npc_i32: Vec<i32> = particles
            .par_iter()
            .fold(
                || vec![0i32; n_cells],
                |mut local, p| {
                    let cell = cell_of_checked(p.cx, p.cy, grid);
                    local[cell] += 1;
                    local
                },
            )
            .reduce(
                || vec![0i32; n_cells],
                |mut a, b| {
                    for (x, y) in a.iter_mut().zip(b.iter()) {
                        *x += y;
                    }
                    a
                },
            );

        let mut iof = vec![0i32; n_cells + 1];
        for k in 0..n_cells {
            iof[k + 1] = iof[k] + npc_i32[k];
        }
        debug_assert_eq!(iof[n_cells] as usize, particles.len());

        let mut ind = vec![0u32; particles.len()];
        let mut cursor = iof.clone();
        for (p_idx, p) in particles.iter().enumerate() {
            let cell = cell_of_checked(p.cx, p.cy, grid);
            let slot = cursor[cell] as usize;
            ind[slot] = p_idx as u32;
            cursor[cell] += 1;
        }

        BinnedIndex {
            npc: npc_i32,
            iof,
            ind,
        }
    }

    pub fn npc(&self, i: i32, j: i32, grid: &Grid) -> i32 {
        self.npc[grid.lexico(i, j) as usize]
    }

    pub fn iof(&self, cell: i32) -> i32 {
        self.iof[cell as usize]
    }

    /// Particle indices belonging to cell `(i, j)`.
    pub fn particles_in_cell(&self, i: i32, j: i32, grid: &Grid) -> &[u32] {
        let cell = grid.lexico(i, j) as usize;
        let start = self.iof[cell] as usize;
        let end = self.iof[cell + 1] as usize;
        &self.ind[start..end]
    }

    pub fn total_binned(&self) -> i32 {
        *self.iof.last().unwrap()
    }
}

#[inline]
fn cell_of_checked(cx: i32, cy: i32, grid: &Grid) -> usize {
    assert!(
        cx >= 0 && cx < grid.n_cells_x && cy >= 0 && cy < grid.n_cells_y,
        "cached cell index ({cx}, {cy}) out of range [0, {}) x [0, {})",
        grid.n_cells_x,
        grid.n_cells_y
    );
    grid.lexico(cx, cy) as usize
}
