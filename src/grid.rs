use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::{JacobiError, Result};

pub const ITER_MAX: usize = 3000; // 最大反復回数
pub const CONV_THRESHOLD: f64 = 1.0e-5; // 収束判定の閾値
pub const HOT_VALUE: f64 = 100.0; // 熱源ブロックの温度
pub const OUTPUT_FILE: &str = "laplace_barrier.txt";

/// Square temperature field stored row-major.
///
/// Row `0`, row `size - 1`, column `0` and column `size - 1` form the fixed
/// zero boundary. Nothing in this crate writes them after construction.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    size: usize,
    data: Vec<f64>,
}

impl Grid {
    pub fn zeroed(size: usize) -> Result<Self> {
        let cells = size
            .checked_mul(size)
            .ok_or(JacobiError::Allocation { size })?;

        let mut data = Vec::new();
        data.try_reserve_exact(cells)
            .map_err(|_| JacobiError::Allocation { size })?;
        data.resize(cells, 0.0);

        Ok(Grid { size, data })
    }

    /// Allocates the initial field: a hot block spanning rows and columns
    /// `[size/2, size/2 + size/10)`, zero everywhere else.
    ///
    /// For `size < 10` the block is empty and the grid starts all zero.
    pub fn new(size: usize) -> Result<Self> {
        let mut grid = Grid::zeroed(size)?;

        // 格子の中心付近に熱源ブロックを設定
        let lower = size / 2;
        let upper = lower + size / 10;
        for i in lower..upper {
            grid.data[i * size + lower..i * size + upper].fill(HOT_VALUE);
        }
        Ok(grid)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.size + j]
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.size..(i + 1) * self.size]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn boundary_is_zero(&self) -> bool {
        let n = self.size;
        if n == 0 {
            return true;
        }
        let rows_zero = self.row(0).iter().chain(self.row(n - 1)).all(|&v| v == 0.0);
        let cols_zero = (0..n).all(|i| self.get(i, 0) == 0.0 && self.get(i, n - 1) == 0.0);
        rows_zero && cols_zero
    }

    // 1行に size 個の値（各値の後に空白）
    pub fn write_to<W: Write>(&self, writer: W) -> std::io::Result<()> {
        let mut out = BufWriter::new(writer);
        for row in self.data.chunks_exact(self.size.max(1)) {
            for value in row {
                write!(out, "{value:.6} ")?;
            }
            writeln!(out)?;
        }
        out.flush()
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| JacobiError::io(path, e))?;
        self.write_to(file).map_err(|e| JacobiError::io(path, e))
    }

    /// Parses the format produced by [`Grid::write_to`]. Every line must
    /// carry as many values as there are lines.
    pub fn read_from<R: Read>(reader: R) -> Result<Self> {
        let mut data = Vec::new();
        let mut rows = 0;
        let mut width = None;

        for (index, line) in BufReader::new(reader).lines().enumerate() {
            let line_no = index + 1;
            let line = line.map_err(|e| JacobiError::parse(line_no, e.to_string()))?;
            if line.trim().is_empty() {
                continue;
            }

            let before = data.len();
            for token in line.split_whitespace() {
                let value = token
                    .parse::<f64>()
                    .map_err(|e| JacobiError::parse(line_no, format!("'{token}': {e}")))?;
                data.push(value);
            }

            let count = data.len() - before;
            match width {
                None => width = Some(count),
                Some(w) if w != count => {
                    return Err(JacobiError::parse(
                        line_no,
                        format!("expected {w} values, found {count}"),
                    ));
                }
                Some(_) => {}
            }
            rows += 1;
        }

        let width = width.unwrap_or(0);
        if width != rows {
            return Err(JacobiError::parse(
                rows,
                format!("grid is not square: {rows} lines of {width} values"),
            ));
        }

        Ok(Grid { size: rows, data })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| JacobiError::io(path, e))?;
        Grid::read_from(file)
    }
}
