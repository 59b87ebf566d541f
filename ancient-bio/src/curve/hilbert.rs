//! Hilbert curve mapping between a linear rank and a grid coordinate
//!
//! An order-`k` curve covers a `2^k x 2^k` grid, so ranks run over `0..4^k`.
//! Coordinates are `(x, y)` with `x` the column and `y` the row.

use rayon::prelude::*;

use ancient_core::config::MAX_ORDER;
use ancient_core::error::{AncientError, AncientResult};

/// Grid side length for an order
pub fn side(order: u32) -> u32 {
    1u32 << order
}

/// Number of cells (and ranks) for an order
pub fn cell_count(order: u32) -> usize {
    1usize << (2 * order)
}

/// Smallest order whose grid holds `len` values, i.e. `ceil(log2(sqrt(len)))`
pub fn order_for_len(len: usize) -> u32 {
    let mut order = 0;
    while cell_count(order) < len {
        order += 1;
    }
    order
}

fn check_order(order: u32) -> AncientResult<()> {
    if order > MAX_ORDER {
        return Err(AncientError::InvalidInput(format!(
            "curve order {} exceeds the maximum of {}",
            order, MAX_ORDER
        )));
    }
    Ok(())
}

fn check_capacity(len: usize, order: u32) -> AncientResult<()> {
    check_order(order)?;
    if len > cell_count(order) {
        return Err(AncientError::InvalidInput(format!(
            "{} values do not fit an order {} curve ({} cells)",
            len,
            order,
            cell_count(order)
        )));
    }
    Ok(())
}

/// Rotate/reflect a quadrant so the sub-curve has canonical orientation
fn rotate(n: u32, x: &mut u32, y: &mut u32, rx: u32, ry: u32) {
    if ry == 0 {
        if rx == 1 {
            *x = n - 1 - *x;
            *y = n - 1 - *y;
        }
        std::mem::swap(x, y);
    }
}

/// Rank of grid cell `(x, y)` along the order-`k` curve
pub fn point_to_index(x: u32, y: u32, order: u32) -> u64 {
    let n = side(order);
    let (mut x, mut y) = (x, y);
    let mut index = 0u64;
    let mut s = n / 2;
    while s > 0 {
        let rx = u32::from(x & s > 0);
        let ry = u32::from(y & s > 0);
        index += u64::from(s) * u64::from(s) * u64::from((3 * rx) ^ ry);
        rotate(n, &mut x, &mut y, rx, ry);
        s /= 2;
    }
    index
}

/// Grid cell `(x, y)` at rank `index` along the order-`k` curve
pub fn index_to_point(index: u64, order: u32) -> (u32, u32) {
    let n = side(order);
    let (mut x, mut y) = (0u32, 0u32);
    let mut t = index;
    let mut s = 1u32;
    while s < n {
        let rx = (1 & (t / 2)) as u32;
        let ry = (1 & (t ^ u64::from(rx))) as u32;
        rotate(s, &mut x, &mut y, rx, ry);
        x += s * rx;
        y += s * ry;
        t /= 4;
        s *= 2;
    }
    (x, y)
}

/// Reorder raster-scan values into curve order:
/// `out[point_to_index(l % n, l / n)] = values[l]`.
/// Trailing ranks keep `T::default()`.
pub fn construct<T: Copy + Default>(values: &[T], order: u32) -> AncientResult<Vec<T>> {
    check_capacity(values.len(), order)?;
    let n = side(order) as usize;
    let mut out = vec![T::default(); cell_count(order)];
    for (l, &value) in values.iter().enumerate() {
        let rank = point_to_index((l % n) as u32, (l / n) as u32, order);
        out[rank as usize] = value;
    }
    Ok(out)
}

/// Lay curve-ordered values onto a row-major grid: `values[i]` lands at
/// `index_to_point(i)`. Cells past the input stay `None`.
pub fn place<T: Copy>(values: &[T], order: u32) -> AncientResult<Vec<Option<T>>> {
    check_capacity(values.len(), order)?;
    let n = side(order) as usize;
    let mut grid = vec![None; cell_count(order)];
    for (i, &value) in values.iter().enumerate() {
        let (x, y) = index_to_point(i as u64, order);
        grid[y as usize * n + x as usize] = Some(value);
    }
    Ok(grid)
}

/// Both curve permutations for one order, computed once and shared read-only
#[derive(Debug, Clone)]
pub struct HilbertTable {
    order: u32,
    /// Curve rank of each row-major cell
    rank_of_cell: Vec<u32>,
    /// Row-major cell of each curve rank
    cell_of_rank: Vec<u32>,
}

impl HilbertTable {
    pub fn new(order: u32) -> AncientResult<Self> {
        check_order(order)?;
        let n = side(order) as usize;
        let cells = cell_count(order);

        let rank_of_cell: Vec<u32> = (0..cells)
            .into_par_iter()
            .map(|cell| point_to_index((cell % n) as u32, (cell / n) as u32, order) as u32)
            .collect();

        let mut cell_of_rank = vec![0u32; cells];
        for (cell, &rank) in rank_of_cell.iter().enumerate() {
            cell_of_rank[rank as usize] = cell as u32;
        }

        tracing::debug!("Built Hilbert table for order {} ({} cells)", order, cells);
        Ok(Self {
            order,
            rank_of_cell,
            cell_of_rank,
        })
    }

    pub fn order(&self) -> u32 {
        self.order
    }

    pub fn side(&self) -> u32 {
        side(self.order)
    }

    /// Number of cells in the grid
    pub fn len(&self) -> usize {
        self.rank_of_cell.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rank_of_cell.is_empty()
    }

    /// Rank of row-major cell `(x, y)`
    pub fn rank(&self, x: u32, y: u32) -> u64 {
        let cell = y as usize * self.side() as usize + x as usize;
        u64::from(self.rank_of_cell[cell])
    }

    /// Cell `(x, y)` at a rank
    pub fn point(&self, rank: u64) -> (u32, u32) {
        let cell = self.cell_of_rank[rank as usize];
        let n = self.side();
        (cell % n, cell / n)
    }

    /// Table-driven [`construct`]
    pub fn construct<T: Copy + Default>(&self, values: &[T]) -> AncientResult<Vec<T>> {
        check_capacity(values.len(), self.order)?;
        let mut out = vec![T::default(); self.len()];
        for (&value, &rank) in values.iter().zip(&self.rank_of_cell) {
            out[rank as usize] = value;
        }
        Ok(out)
    }

    /// Table-driven [`place`]
    pub fn place<T: Copy>(&self, values: &[T]) -> AncientResult<Vec<Option<T>>> {
        check_capacity(values.len(), self.order)?;
        let mut grid = vec![None; self.len()];
        for (&value, &cell) in values.iter().zip(&self.cell_of_rank) {
            grid[cell as usize] = Some(value);
        }
        Ok(grid)
    }
}
