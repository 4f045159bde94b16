//! The per-partition iteration worker.
//!
//! The current grid is handed to a team of workers as a [`SharedGrid`]: the
//! fixed top and bottom rows as plain shared slices, and one `RwLock` band per
//! partition. During the compute phase a worker holds read guards on its own
//! band and the bands directly above and below it. It releases them before the
//! rendezvous and only then write-locks its own band to commit, so the locks
//! are never contended when the phases are kept apart by a barrier.

use std::sync::{Barrier, PoisonError, RwLock, RwLockReadGuard};

use crate::grid::Grid;
use crate::partition::Partition;
use crate::solver::{ErrorSlot, ErrorVector};

/// Current-state grid split into the fixed frame rows and one lockable band
/// per partition.
pub struct SharedGrid<'g> {
    size: usize,
    top: &'g [f64],
    bottom: &'g [f64],
    bands: Vec<RwLock<&'g mut [f64]>>,
}

impl<'g> SharedGrid<'g> {
    /// Splits `grid` along `parts`, which must tile `1..size - 1` in order
    /// (as produced by [`crate::partition::partitions`]).
    pub fn split(grid: &'g mut Grid, parts: &[Partition]) -> Self {
        let size = grid.size();
        let (top, bands, bottom) = split_rows(grid, parts);
        SharedGrid {
            size,
            top,
            bottom,
            bands: bands.into_iter().map(RwLock::new).collect(),
        }
    }

    fn read_band(&self, index: usize) -> RwLockReadGuard<'_, &'g mut [f64]> {
        self.bands[index]
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

// 先頭行・各パーティションの行・最終行に分割
fn split_rows<'g>(
    grid: &'g mut Grid,
    parts: &[Partition],
) -> (&'g [f64], Vec<&'g mut [f64]>, &'g [f64]) {
    let size = grid.size();
    debug_assert_eq!(parts.first().map(|p| p.begin), Some(1));
    debug_assert_eq!(parts.last().map(|p| p.end), Some(size - 1));

    let data = grid.as_mut_slice();
    let (top, rest) = data.split_at_mut(size);
    let (mut interior, bottom) = rest.split_at_mut((size - 2) * size);

    let mut bands = Vec::with_capacity(parts.len());
    for part in parts {
        let (band, tail) = std::mem::take(&mut interior).split_at_mut(part.len() * size);
        bands.push(band);
        interior = tail;
    }
    (&*top, bands, &*bottom)
}

pub fn next_bands<'n>(next: &'n mut Grid, parts: &[Partition]) -> Vec<&'n mut [f64]> {
    split_rows(next, parts).1
}

/// One worker's view of an iteration: read access to the whole current grid,
/// write access to its own rows of next, its own band of current (after the
/// rendezvous) and its own error slot.
pub struct Worker<'a, 'g> {
    id: usize,
    part: Partition,
    shared: &'a SharedGrid<'g>,
    next: &'a mut [f64],
    slot: ErrorSlot<'a>,
}

impl<'a, 'g> Worker<'a, 'g> {
    /// Builds one worker per partition. `next` must come from [`next_bands`]
    /// with the same `parts`.
    pub fn team(
        shared: &'a SharedGrid<'g>,
        parts: &[Partition],
        next: Vec<&'a mut [f64]>,
        errors: &'a ErrorVector,
    ) -> Vec<Worker<'a, 'g>> {
        debug_assert_eq!(parts.len(), shared.bands.len());
        debug_assert_eq!(parts.len(), errors.len());

        parts
            .iter()
            .zip(next)
            .zip(errors.slots())
            .enumerate()
            .map(|(id, ((&part, next), slot))| Worker {
                id,
                part,
                shared,
                next,
                slot,
            })
            .collect()
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn partition(&self) -> Partition {
        self.part
    }

    /// Compute phase: writes this worker's rows of next from the current
    /// grid and records the largest change in its error slot.
    pub fn compute(&mut self) -> f64 {
        let shared = self.shared;
        let size = shared.size;
        let last = shared.bands.len() - 1;

        let own = shared.read_band(self.id);
        let above_guard = (self.id > 0).then(|| shared.read_band(self.id - 1));
        let below_guard = (self.id < last).then(|| shared.read_band(self.id + 1));

        // 隣接バンドの境界行（なければ固定境界行）
        let above: &[f64] = match &above_guard {
            Some(band) => &band[band.len() - size..],
            None => shared.top,
        };
        let below: &[f64] = match &below_guard {
            Some(band) => &band[..size],
            None => shared.bottom,
        };

        let err = relax_band(above, &own, below, size, self.next);
        self.slot.store(err);
        err
    }

    /// Commit phase: copies this worker's interior cells from next into the
    /// current grid. Must only run once every worker has finished computing.
    pub fn commit(&self) {
        let size = self.shared.size;
        let mut band = self.shared.bands[self.id]
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        for (dst, src) in band.chunks_exact_mut(size).zip(self.next.chunks_exact(size)) {
            dst[1..size - 1].copy_from_slice(&src[1..size - 1]);
        }
    }

    pub fn run(mut self, barrier: &Barrier) {
        self.compute();
        barrier.wait();
        self.commit();
    }
}

/// Relaxes every row of `band` into `out`, using `above` and `below` as the
/// neighbours of its first and last row. Returns the largest absolute change.
pub fn relax_band(above: &[f64], band: &[f64], below: &[f64], size: usize, out: &mut [f64]) -> f64 {
    let rows = band.len() / size;
    let mut err: f64 = 0.0;

    for (r, dst) in out.chunks_exact_mut(size).enumerate().take(rows) {
        let up = if r == 0 { above } else { &band[(r - 1) * size..r * size] };
        let mid = &band[r * size..(r + 1) * size];
        let down = if r + 1 == rows { below } else { &band[(r + 1) * size..(r + 2) * size] };

        err = err.max(relax_row(up, mid, down, dst));
    }
    err
}

#[inline]
pub fn relax_row(up: &[f64], mid: &[f64], down: &[f64], dst: &mut [f64]) -> f64 {
    let mut err: f64 = 0.0;
    for j in 1..mid.len() - 1 {
        let value = 0.25 * (mid[j + 1] + mid[j - 1] + up[j] + down[j]);
        dst[j] = value;
        err = err.max((value - mid[j]).abs());
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::partitions;
    use std::thread;

    #[test]
    fn relax_row_averages_neighbours() {
        let up = [0.0, 4.0, 0.0];
        let mid = [8.0, 1.0, 12.0];
        let down = [0.0, 16.0, 0.0];
        let mut dst = [0.0; 3];

        let err = relax_row(&up, &mid, &down, &mut dst);

        assert_eq!(dst, [0.0, 10.0, 0.0]);
        assert_eq!(err, 9.0);
    }

    #[test]
    fn split_hands_out_disjoint_bands() {
        let mut grid = Grid::new(10).unwrap();
        let parts = partitions(3, 10).unwrap();
        let shared = SharedGrid::split(&mut grid, &parts);

        assert_eq!(shared.bands.len(), 3);
        let rows: Vec<usize> = (0..3).map(|k| shared.read_band(k).len() / 10).collect();
        assert_eq!(rows, vec![3, 3, 2]);
        assert_eq!(shared.top.len(), 10);
        assert_eq!(shared.bottom.len(), 10);
    }

    #[test]
    fn team_of_two_moves_hot_cell_to_neighbours() {
        // Hot cell (5,5) sits on the border between the two bands.
        let mut grid = Grid::new(10).unwrap();
        let mut next = Grid::zeroed(10).unwrap();
        let parts = partitions(2, 10).unwrap();
        let errors = ErrorVector::new(2);

        {
            let shared = SharedGrid::split(&mut grid, &parts);
            let workers = Worker::team(&shared, &parts, next_bands(&mut next, &parts), &errors);
            let barrier = Barrier::new(workers.len());
            thread::scope(|scope| {
                for worker in workers {
                    let barrier = &barrier;
                    scope.spawn(move || worker.run(barrier));
                }
            });
        }

        assert_eq!(grid.get(5, 5), 0.0);
        assert_eq!(grid.get(4, 5), 25.0);
        assert_eq!(grid.get(6, 5), 25.0);
        assert_eq!(grid.get(5, 4), 25.0);
        assert_eq!(grid.get(5, 6), 25.0);
        assert_eq!(errors.values(), vec![25.0, 100.0]);
    }
}
