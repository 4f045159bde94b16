use crate::config::SolverConfig;
use crate::error::Result;
use crate::grid::Grid;
use crate::solver::{Controller, Convergence, ErrorVector};

/// One full Jacobi sweep of `current` into `next`. Returns the largest change.
pub fn jacobi_sweep(current: &Grid, next: &mut Grid) -> f64 {
    let n = current.size();
    let a = current.as_slice();
    let b = next.as_mut_slice();
    let mut err: f64 = 0.0;

    for i in 1..n - 1 {
        for j in 1..n - 1 {
            let idx = i * n + j;
            b[idx] = 0.25 * (a[idx + 1] + a[idx - 1] + a[idx - n] + a[idx + n]);
            err = err.max((b[idx] - a[idx]).abs());
        }
    }
    err
}

/// Copies the interior of `next` back into `current`.
pub fn commit_interior(next: &Grid, current: &mut Grid) {
    let n = current.size();
    let src = next.as_slice();
    let dst = current.as_mut_slice();
    for i in 1..n - 1 {
        dst[i * n + 1..(i + 1) * n - 1].copy_from_slice(&src[i * n + 1..(i + 1) * n - 1]);
    }
}

// シングルスレッド版（正解データとして使用）
pub fn solve(grid: &mut Grid, config: &SolverConfig) -> Result<Convergence> {
    config.validate()?;
    let mut next = Grid::zeroed(grid.size())?;
    let errors = ErrorVector::new(1);

    Controller::new(config).run(&errors, |_| {
        let err = jacobi_sweep(grid, &mut next);
        errors.slot(0).store(err);
        commit_interior(&next, grid);
        Ok(())
    })
}
