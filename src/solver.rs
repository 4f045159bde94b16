//! Convergence controller and error reduction.

use std::sync::atomic::{AtomicU64, Ordering};

use log::{debug, info};

use crate::config::{SolverConfig, Strategy};
use crate::error::{JacobiError, Result};
use crate::grid::Grid;
use crate::implementations;

/// Per-worker maximum change for the current iteration, one slot per worker.
///
/// Each slot holds the bits of an `f64`. Writers only ever get an
/// [`ErrorSlot`] for their own index; the barrier or join that ends an
/// iteration orders those stores before the controller reads them.
#[derive(Debug)]
pub struct ErrorVector {
    slots: Vec<AtomicU64>,
}

impl ErrorVector {
    pub fn new(workers: usize) -> Self {
        ErrorVector {
            slots: (0..workers).map(|_| AtomicU64::new(0.0f64.to_bits())).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> impl Iterator<Item = ErrorSlot<'_>> {
        self.slots.iter().map(ErrorSlot)
    }

    pub fn slot(&self, worker: usize) -> ErrorSlot<'_> {
        ErrorSlot(&self.slots[worker])
    }

    pub fn values(&self) -> Vec<f64> {
        self.slots
            .iter()
            .map(|slot| f64::from_bits(slot.load(Ordering::Relaxed)))
            .collect()
    }

    pub fn max(&self) -> f64 {
        reduce_error(&self.values())
    }
}

#[derive(Debug)]
pub struct ErrorSlot<'a>(&'a AtomicU64);

impl ErrorSlot<'_> {
    pub fn store(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// Global error: the largest per-worker error, `0.0` when there are none.
pub fn reduce_error(errors: &[f64]) -> f64 {
    errors.iter().copied().fold(0.0, f64::max)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Progress {
    pub iteration: usize,
    pub error: f64,
}

/// Final state of a run. Whether the loop stopped on the threshold or on the
/// iteration cap is not recorded beyond these values.
#[derive(Clone, Debug, PartialEq)]
pub struct Convergence {
    pub iterations: usize,
    pub error: f64,
    pub progress: Vec<Progress>,
}

pub struct Controller<'c> {
    config: &'c SolverConfig,
}

impl<'c> Controller<'c> {
    pub fn new(config: &'c SolverConfig) -> Self {
        Controller { config }
    }

    /// Runs `iterate` until the global error drops to the threshold or the
    /// iteration count passes `max_iterations`. `iterate` receives the
    /// iteration number and must leave every worker's error in `errors`.
    pub fn run<F>(&self, errors: &ErrorVector, mut iterate: F) -> Result<Convergence>
    where
        F: FnMut(usize) -> Result<()>,
    {
        let mut error = f64::INFINITY;
        let mut iterations = 0;
        let mut progress = Vec::new();

        while error > self.config.threshold && iterations <= self.config.max_iterations {
            iterate(iterations)?;
            error = errors.max();

            if iterations % self.config.progress_interval == 0 {
                info!("Error of {error:.10} at iteration {iterations}");
                progress.push(Progress {
                    iteration: iterations,
                    error,
                });
            }

            iterations += 1;
        }

        Ok(Convergence {
            iterations,
            error,
            progress,
        })
    }
}

/// Relaxes `grid` in place with the configured strategy.
pub fn solve(grid: &mut Grid, config: &SolverConfig) -> Result<Convergence> {
    if grid.size() != config.size {
        return Err(JacobiError::SizeMismatch {
            expected: config.size,
            found: grid.size(),
        });
    }

    debug!(
        "solving {0}x{0} grid with {1} thread(s), strategy {2}",
        config.size, config.threads, config.strategy
    );

    match config.strategy {
        Strategy::Spawn => implementations::barrier::solve(grid, config),
        Strategy::Pool => implementations::pool::solve(grid, config),
        Strategy::Rayon => implementations::rayon::solve(grid, config),
        Strategy::Single => implementations::single::solve(grid, config),
    }
}
