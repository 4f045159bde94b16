//! Row decomposition of the grid interior across workers.
//!
//! The `size - 2` interior rows are split into contiguous bands. When the
//! worker count does not divide the interior evenly, the first
//! `interior % workers` workers take one extra row each, so band lengths
//! differ by at most one and the bands always tile `1..size - 1` exactly.

use std::ops::Range;

use crate::error::{JacobiError, Result};

/// Half-open range of grid rows `[begin, end)` owned by one worker.
/// Both bounds are actual row indices, so `begin >= 1` and `end <= size - 1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Partition {
    pub begin: usize,
    pub end: usize,
}

impl Partition {
    pub fn rows(&self) -> Range<usize> {
        self.begin..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.begin
    }

    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }
}

/// Checks that `size` has an interior and that `workers` can each get at
/// least one interior row.
pub fn check_decomposition(workers: usize, size: usize) -> Result<()> {
    if size < 3 {
        return Err(JacobiError::InvalidSize { size });
    }
    if workers == 0 {
        return Err(JacobiError::InvalidThreadCount);
    }
    let interior = size - 2;
    if workers > interior {
        return Err(JacobiError::TooManyThreads {
            threads: workers,
            size,
            interior,
        });
    }
    Ok(())
}

/// Rows owned by `worker` out of `workers` on a `size × size` grid.
pub fn partition(worker: usize, workers: usize, size: usize) -> Result<Partition> {
    check_decomposition(workers, size)?;
    if worker >= workers {
        return Err(JacobiError::WorkerOutOfRange { worker, workers });
    }

    let interior = size - 2;
    let base = interior / workers;
    let extra = interior % workers;

    // 余りの行は先頭のワーカーに1行ずつ配る
    let begin = 1 + worker * base + worker.min(extra);
    let len = base + usize::from(worker < extra);

    Ok(Partition {
        begin,
        end: begin + len,
    })
}

/// All partitions for `workers`, in worker order.
pub fn partitions(workers: usize, size: usize) -> Result<Vec<Partition>> {
    check_decomposition(workers, size)?;
    (0..workers)
        .map(|worker| partition(worker, workers, size))
        .collect()
}
