use rayon::prelude::*;

use crate::config::SolverConfig;
use crate::error::{JacobiError, Result};
use crate::grid::Grid;
use crate::partition::partitions;
use crate::solver::{Controller, Convergence, ErrorVector};
use crate::worker::{next_bands, SharedGrid, Worker};

/*
  Rayon-based implementation

  1. A dedicated pool with exactly `threads` workers
  2. Compute pass over all partitions in parallel
  3. The end of the first parallel pass is the barrier: no commit starts
     before every partition has been computed
  4. Commit pass over all partitions in parallel
*/

pub fn solve(grid: &mut Grid, config: &SolverConfig) -> Result<Convergence> {
    config.validate()?;
    let size = grid.size();
    let parts = partitions(config.threads, size)?;
    let mut next = Grid::zeroed(size)?;
    let errors = ErrorVector::new(parts.len());

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .thread_name(|i| format!("jacobi-rayon-{i}"))
        .build()
        .map_err(|e| JacobiError::ThreadPool {
            message: e.to_string(),
        })?;

    Controller::new(config).run(&errors, |_| {
        let shared = SharedGrid::split(grid, &parts);
        let mut workers = Worker::team(&shared, &parts, next_bands(&mut next, &parts), &errors);

        pool.install(|| {
            workers.par_iter_mut().for_each(|worker| {
                worker.compute();
            });
            workers.par_iter().for_each(|worker| worker.commit());
        });
        Ok(())
    })
}
