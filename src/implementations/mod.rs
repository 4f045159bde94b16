pub mod barrier;
pub mod pool;
pub mod rayon;
pub mod single;
