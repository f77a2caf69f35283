//! Halo-backed 2-D field `H<T>`.
//!
//! A fixed-bounds array addressed by a logical index `(i, j)` with an
//! inclusive-lower/exclusive-upper range `[lx, ux) x [ly, uy)`. The
//! sub-range `[0, nx) x [0, ny)` is the "interior"; anything outside it but
//! inside the stored bounds is "halo". Storage is a single `ndarray::Array2`
//! so that whole-field arithmetic and convolution can be expressed with
//! ordinary slice/zip operations instead of manual index bookkeeping.

use ndarray::Array2;

/// One of the eight halo regions surrounding the interior of a field, named
/// by which side of each axis they sit on: `T`/`B` (high/low y), `L`/`R`
/// (low/high x), `C` (the full range of that axis).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HaloBlock {
    TL,
    TC,
    TR,
    CL,
    CR,
    BL,
    BC,
    BR,
}

impl HaloBlock {
    pub const ALL: [HaloBlock; 8] = [
        HaloBlock::TL,
        HaloBlock::TC,
        HaloBlock::TR,
        HaloBlock::CL,
        HaloBlock::CR,
        HaloBlock::BL,
        HaloBlock::BC,
        HaloBlock::BR,
    ];

    /// The block on the opposite side of the domain, used to source the
    /// periodic-replication fill for this block.
    pub fn reflect(self) -> HaloBlock {
        match self {
            HaloBlock::TL => HaloBlock::BR,
            HaloBlock::TC => HaloBlock::BC,
            HaloBlock::TR => HaloBlock::BL,
            HaloBlock::CL => HaloBlock::CR,
            HaloBlock::CR => HaloBlock::CL,
            HaloBlock::BL => HaloBlock::TR,
            HaloBlock::BC => HaloBlock::TC,
            HaloBlock::BR => HaloBlock::TL,
        }
    }

    /// `(x range, y range)` of the *outer* (halo) slab for this block, given
    /// interior extents `nx, ny` and halo widths `hx, hy`.
    fn outer_range(self, nx: i32, ny: i32, hx: i32, hy: i32) -> (std::ops::Range<i32>, std::ops::Range<i32>) {
        let (xl, xr) = self.x_component();
        let (yl, yr) = self.y_component();
        let x = match (xl, xr) {
            (true, false) => -hx..0,
            (false, true) => nx..nx + hx,
            _ => 0..nx,
        };
        let y = match (yl, yr) {
            (true, false) => -hy..0,
            (false, true) => ny..ny + hy,
            _ => 0..ny,
        };
        (x, y)
    }

    /// `(x range, y range)` of the *inner* (interior) slab that feeds this
    /// block when used as the source of a reflect-fill.
    fn inner_range(self, nx: i32, ny: i32, hx: i32, hy: i32) -> (std::ops::Range<i32>, std::ops::Range<i32>) {
        let (xl, xr) = self.x_component();
        let (yl, yr) = self.y_component();
        let x = match (xl, xr) {
            (true, false) => 0..hx,
            (false, true) => nx - hx..nx,
            _ => 0..nx,
        };
        let y = match (yl, yr) {
            (true, false) => 0..hy,
            (false, true) => ny - hy..ny,
            _ => 0..ny,
        };
        (x, y)
    }

    /// `(is_low_x, is_high_x)` — both false means "spans the full axis" (`C`).
    fn x_component(self) -> (bool, bool) {
        use HaloBlock::*;
        match self {
            TL | CL | BL => (true, false),
            TR | CR | BR => (false, true),
            TC | BC => (false, false),
        }
    }

    /// `(is_low_y, is_high_y)` — both false means "spans the full axis" (`C`).
    /// Note: "low y" here is the `B` label (T = high y).
    fn y_component(self) -> (bool, bool) {
        use HaloBlock::*;
        match self {
            BL | BC | BR => (true, false),
            TL | TC | TR => (false, true),
            CL | CR => (false, false),
        }
    }
}

/// A 2-D field over logical index range `[lx, ux) x [ly, uy)`, `T: Copy`.
#[derive(Clone)]
pub struct HaloField<T> {
    lx: i32,
    ly: i32,
    nx: i32,
    ny: i32,
    hx: i32,
    hy: i32,
    data: Array2<T>,
}

impl<T: Copy + Default> HaloField<T> {
    /// `nx, ny` is the interior shape; `hx, hy` the halo width on each side.
    pub fn new(nx: i32, ny: i32, hx: i32, hy: i32, fill: T) -> Self {
        assert!(nx > 0 && ny > 0, "interior shape must be positive");
        assert!(hx >= 0 && hy >= 0, "halo width cannot be negative");
        let shape = ((nx + 2 * hx) as usize, (ny + 2 * hy) as usize);
        Self {
            lx: -hx,
            ly: -hy,
            nx,
            ny,
            hx,
            hy,
            data: Array2::from_elem(shape, fill),
        }
    }

    /// A field with no halo at all — the `MaskMatrix`-equivalent case used
    /// for purely interior fields such as `η̄`, `Fx`, `Fy`.
    pub fn new_interior(nx: i32, ny: i32, fill: T) -> Self {
        Self::new(nx, ny, 0, 0, fill)
    }

    pub fn nx(&self) -> i32 {
        self.nx
    }

    pub fn ny(&self) -> i32 {
        self.ny
    }

    pub fn halo_x(&self) -> i32 {
        self.hx
    }

    pub fn halo_y(&self) -> i32 {
        self.hy
    }

    #[inline]
    fn storage_index(&self, i: i32, j: i32) -> (usize, usize) {
        debug_assert!(
            i >= self.lx && i < self.lx + self.nx + 2 * self.hx,
            "index {i} out of halo-backed field bounds"
        );
        debug_assert!(
            j >= self.ly && j < self.ly + self.ny + 2 * self.hy,
            "index {j} out of halo-backed field bounds"
        );
        ((i - self.lx) as usize, (j - self.ly) as usize)
    }

    #[inline]
    pub fn get(&self, i: i32, j: i32) -> T {
        let (si, sj) = self.storage_index(i, j);
        self.data[[si, sj]]
    }

    #[inline]
    pub fn set(&mut self, i: i32, j: i32, value: T) {
        let (si, sj) = self.storage_index(i, j);
        self.data[[si, sj]] = value;
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Iterate over all interior `(i, j)` in row-major (`i` outer, `j` inner)
    /// order, matching the original's lexicographic cell order.
    pub fn iter_interior(&self) -> impl Iterator<Item = (i32, i32)> {
        let nx = self.nx;
        let ny = self.ny;
        (0..nx).flat_map(move |i| (0..ny).map(move |j| (i, j)))
    }

    /// Copy `src` (some integer-valued interior-only field) elementwise into
    /// this field's interior, casting with `cast`. Mirrors `copy_patch` /
    /// `copy_cast` in the original.
    pub fn copy_cast<S: Copy>(&mut self, src: &HaloField<S>, cast: impl Fn(S) -> T) {
        assert_eq!(src.nx, self.nx);
        assert_eq!(src.ny, self.ny);
        for (i, j) in self.iter_interior() {
            self.set(i, j, cast(src.get(i, j)));
        }
    }

    pub fn get_inner_block(&self, block: HaloBlock) -> Array2<T> {
        let (xr, yr) = block.inner_range(self.nx, self.ny, self.hx, self.hy);
        let mut out = Array2::from_elem((xr.len(), yr.len()), T::default());
        for (oi, i) in xr.enumerate() {
            for (oj, j) in yr.clone().enumerate() {
                out[[oi, oj]] = self.get(i, j);
            }
        }
        out
    }

    pub fn set_outer_block(&mut self, block: HaloBlock, values: &Array2<T>) {
        let (xr, yr) = block.outer_range(self.nx, self.ny, self.hx, self.hy);
        assert_eq!(xr.len(), values.shape()[0]);
        assert_eq!(yr.len(), values.shape()[1]);
        for (oi, i) in xr.enumerate() {
            for (oj, j) in yr.clone().enumerate() {
                self.set(i, j, values[[oi, oj]]);
            }
        }
    }

    /// Periodic replication: every outer block is filled with the interior
    /// slab from the opposite side of the domain.
    pub fn fill_periodic_halo(&mut self) {
        if self.hx == 0 && self.hy == 0 {
            return;
        }
        for block in HaloBlock::ALL {
            let source = self.get_inner_block(block.reflect());
            self.set_outer_block(block, &source);
        }
    }
}

impl HaloField<f64> {
    pub fn scale(&mut self, s: f64) {
        self.data.mapv_inplace(|v| v * s);
    }

    pub fn add_scaled(&mut self, s: f64, other: &HaloField<f64>) {
        assert_eq!(self.data.shape(), other.data.shape());
        self.data = &self.data + &(&other.data * s);
    }

    pub fn assign(&mut self, other: &HaloField<f64>) {
        assert_eq!(self.data.shape(), other.data.shape());
        self.data.assign(&other.data);
    }

    pub fn max_value(&self) -> f64 {
        self.data.iter().cloned().fold(f64::MIN, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn periodic_halo_matches_wrapped_interior() {
        let nx = 4;
        let ny = 3;
        let mut field = HaloField::new(nx, ny, 2, 1, 0.0);
        for (i, j) in field.iter_interior() {
            field.set(i, j, (i * 10 + j) as f64);
        }
        field.fill_periodic_halo();
        for i in -2..nx + 2 {
            for j in -1..ny + 1 {
                let wrapped_i = i.rem_euclid(nx);
                let wrapped_j = j.rem_euclid(ny);
                assert_eq!(field.get(i, j), (wrapped_i * 10 + wrapped_j) as f64);
            }
        }
    }

    #[test]
    fn reflect_is_an_involution() {
        for block in HaloBlock::ALL {
            assert_eq!(block.reflect().reflect(), block);
        }
    }
}
