//! Jacobi relaxation for the 2D Laplace equation.
//!
//! A square grid with a fixed zero boundary and a hot block in the interior
//! is relaxed by repeatedly replacing every interior cell with the average of
//! its four neighbours. The interior rows are split across worker threads;
//! each iteration has a compute phase (current grid into next grid) and a
//! commit phase (next grid back into current), kept apart by a barrier.
//!
//! ```no_run
//! use laplace_jacobi::{solve, Grid, SolverConfig, Strategy};
//!
//! # fn main() -> laplace_jacobi::Result<()> {
//! let config = SolverConfig::new(200, 4).with_strategy(Strategy::Spawn);
//! let mut grid = Grid::new(config.size)?;
//! let result = solve(&mut grid, &config)?;
//! println!("{} iterations, error {:.10}", result.iterations, result.error);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod grid;
pub mod implementations;
pub mod partition;
pub mod solver;
pub mod worker;

pub use config::{SolverConfig, Strategy};
pub use error::{JacobiError, Result};
pub use grid::Grid;
pub use partition::{partition, partitions, Partition};
pub use solver::{reduce_error, solve, Convergence, Progress};
