use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JacobiError {
    #[error("grid size {size} is too small: at least 3 rows are needed for one interior row")]
    InvalidSize { size: usize },

    #[error("thread count must be at least 1")]
    InvalidThreadCount,

    #[error("{threads} threads requested but the {size}x{size} grid has only {interior} interior rows")]
    TooManyThreads {
        threads: usize,
        size: usize,
        interior: usize,
    },

    #[error("convergence threshold must be a finite, non-negative number (got {threshold})")]
    InvalidThreshold { threshold: f64 },

    #[error("progress interval must be at least 1")]
    InvalidProgressInterval,

    #[error("worker {worker} out of range (total workers: {workers})")]
    WorkerOutOfRange { worker: usize, workers: usize },

    #[error("grid is {found}x{found} but the configuration expects {expected}x{expected}")]
    SizeMismatch { expected: usize, found: usize },

    #[error("failed to allocate a {size}x{size} grid")]
    Allocation { size: usize },

    #[error("worker {worker} panicked during iteration {iteration}")]
    WorkerPanicked { worker: usize, iteration: usize },

    #[error("failed to build thread pool: {message}")]
    ThreadPool { message: String },

    #[error("I/O error at '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed grid file at line {line}: {message}")]
    Parse { line: usize, message: String },
}

pub type Result<T> = std::result::Result<T, JacobiError>;

impl JacobiError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}
