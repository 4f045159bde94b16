use std::fmt;

use clap::ValueEnum;

use crate::error::{JacobiError, Result};
use crate::grid::{CONV_THRESHOLD, ITER_MAX};
use crate::partition::check_decomposition;

pub const PROGRESS_INTERVAL: usize = 100;

/// How the interior rows are spread over threads each iteration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Strategy {
    /// A fresh generation of scoped threads per iteration, one barrier per generation.
    #[default]
    Spawn,
    /// Threads spawned once per run; the barrier and rendezvous are reused every iteration.
    Pool,
    /// Rayon pool sized to the thread count; compute and commit are two parallel passes.
    Rayon,
    /// Single-threaded reference sweep.
    Single,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::Spawn,
        Strategy::Pool,
        Strategy::Rayon,
        Strategy::Single,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Strategy::Spawn => "spawn",
            Strategy::Pool => "pool",
            Strategy::Rayon => "rayon",
            Strategy::Single => "single",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SolverConfig {
    pub size: usize,
    pub threads: usize,
    pub max_iterations: usize,
    pub threshold: f64,
    /// Progress is logged when the iteration number is a multiple of this.
    pub progress_interval: usize,
    pub strategy: Strategy,
}

impl SolverConfig {
    pub fn new(size: usize, threads: usize) -> Self {
        SolverConfig {
            size,
            threads,
            max_iterations: ITER_MAX,
            threshold: CONV_THRESHOLD,
            progress_interval: PROGRESS_INTERVAL,
            strategy: Strategy::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_progress_interval(mut self, progress_interval: usize) -> Self {
        self.progress_interval = progress_interval;
        self
    }

    /// Rejects configurations that cannot be decomposed into non-empty bands.
    pub fn validate(&self) -> Result<()> {
        check_decomposition(self.threads, self.size)?;
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(JacobiError::InvalidThreshold {
                threshold: self.threshold,
            });
        }
        if self.progress_interval == 0 {
            return Err(JacobiError::InvalidProgressInterval);
        }
        Ok(())
    }
}
