use std::sync::Barrier;
use std::thread;

use log::debug;

use crate::config::SolverConfig;
use crate::error::{JacobiError, Result};
use crate::grid::Grid;
use crate::partition::{partitions, Partition};
use crate::solver::{Controller, Convergence, ErrorVector};
use crate::worker::{next_bands, SharedGrid, Worker};

/*
  バリア同期版（反復ごとにスレッドを生成）

  1. 内部の行をワーカー数で分割し、各ワーカーは自分の行だけを書き込む
  2. 計算フェーズ: 現在のグリッドを読み、next の自分の行へ書き込む
  3. バリア: 全ワーカーの計算完了を待つ
  4. 書き戻しフェーズ: next の自分の行を現在のグリッドへコピー
  5. join で世代を終了し、コントローラが誤差を集約する
*/

pub fn solve(grid: &mut Grid, config: &SolverConfig) -> Result<Convergence> {
    config.validate()?;
    let size = grid.size();
    let parts = partitions(config.threads, size)?;
    let mut next = Grid::zeroed(size)?;
    let errors = ErrorVector::new(parts.len());

    debug!("spawn strategy partitions: {parts:?}");

    Controller::new(config).run(&errors, |iteration| {
        jacobi_iteration(grid, &mut next, &parts, &errors, iteration)
    })
}

/// Runs one iteration with a fresh generation of scoped threads, one per
/// partition, sharing a barrier sized to the generation.
pub fn jacobi_iteration(
    grid: &mut Grid,
    next: &mut Grid,
    parts: &[Partition],
    errors: &ErrorVector,
    iteration: usize,
) -> Result<()> {
    let shared = SharedGrid::split(grid, parts);
    let workers = Worker::team(&shared, parts, next_bands(next, parts), errors);
    let barrier = Barrier::new(workers.len());

    thread::scope(|scope| {
        let handles: Vec<_> = workers
            .into_iter()
            .map(|worker| {
                let barrier = &barrier;
                scope.spawn(move || worker.run(barrier))
            })
            .collect();

        // 全スレッドを join してからエラーを返す
        let mut outcome = Ok(());
        for (worker, handle) in handles.into_iter().enumerate() {
            if handle.join().is_err() && outcome.is_ok() {
                outcome = Err(JacobiError::WorkerPanicked { worker, iteration });
            }
        }
        outcome
    })
}
