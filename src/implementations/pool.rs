use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Barrier;
use std::thread;

use log::debug;

use crate::config::SolverConfig;
use crate::error::Result;
use crate::grid::Grid;
use crate::partition::partitions;
use crate::solver::{Controller, Convergence, ErrorVector};
use crate::worker::{next_bands, SharedGrid, Worker};

/*
  常駐スレッド版

  スレッドは1回だけ生成し、全反復でバリアを再利用する。
  - start:  コントローラが次の反復（または終了）を通知する (workers + 1)
  - phase:  計算フェーズと書き戻しフェーズの境界 (workers)
  - finish: 全ワーカーの書き戻し完了をコントローラへ通知する (workers + 1)
*/

pub fn solve(grid: &mut Grid, config: &SolverConfig) -> Result<Convergence> {
    config.validate()?;
    let size = grid.size();
    let parts = partitions(config.threads, size)?;
    let mut next = Grid::zeroed(size)?;
    let errors = ErrorVector::new(parts.len());

    let phase = Barrier::new(parts.len());
    let start = Barrier::new(parts.len() + 1);
    let finish = Barrier::new(parts.len() + 1);
    let stop = AtomicBool::new(false);

    debug!("pool strategy partitions: {parts:?}");

    let shared = SharedGrid::split(grid, &parts);
    let workers = Worker::team(&shared, &parts, next_bands(&mut next, &parts), &errors);

    thread::scope(|scope| {
        for worker in workers {
            let (phase, start, finish, stop) = (&phase, &start, &finish, &stop);
            scope.spawn(move || pool_worker(worker, phase, start, finish, stop));
        }

        let result = Controller::new(config).run(&errors, |_| {
            start.wait();
            finish.wait();
            Ok(())
        });

        stop.store(true, Ordering::Release);
        start.wait();
        result
    })
}

fn pool_worker(
    mut worker: Worker<'_, '_>,
    phase: &Barrier,
    start: &Barrier,
    finish: &Barrier,
    stop: &AtomicBool,
) {
    loop {
        start.wait();
        if stop.load(Ordering::Acquire) {
            break;
        }
        worker.compute();
        phase.wait();
        worker.commit();
        finish.wait();
    }
    debug!("pool worker {} (rows {:?}) exiting", worker.id(), worker.partition().rows());
}
