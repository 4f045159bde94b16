use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use laplace_jacobi::{solve, Grid, SolverConfig, Strategy};

#[derive(Parser)]
#[command(name = "compare_strategies")]
#[command(about = "Time every parallelization strategy on the same problem")]
struct Args {
    /// The size of each side of the domain (grid).
    size: usize,
    /// Number of threads.
    threads: usize,
    /// Timed trials per strategy.
    #[arg(long, default_value_t = 15)]
    trials: usize,
    /// Untimed warmup runs per strategy.
    #[arg(long, default_value_t = 3)]
    warmup: usize,
    /// Iteration cap for every run.
    #[arg(long, default_value_t = 500)]
    max_iterations: usize,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();
    anyhow::ensure!(args.trials > 0, "at least one trial is needed");

    println!("=== Jacobi Laplace strategy comparison ===");
    println!(
        "grid: {0} x {0}, threads: {1}, max iterations: {2}, trials: {3}\n",
        args.size, args.threads, args.max_iterations, args.trials
    );

    let mut reference: Option<Grid> = None;
    for strategy in Strategy::ALL {
        let config = SolverConfig::new(args.size, args.threads)
            .with_strategy(strategy)
            .with_max_iterations(args.max_iterations)
            .with_progress_interval(usize::MAX);
        config
            .validate()
            .with_context(|| format!("invalid configuration for {strategy}"))?;

        let final_grid = run_benchmark(&config, args.warmup, args.trials)?;

        // 全戦略の結果が一致することを確認
        if let Some(expected) = &reference {
            anyhow::ensure!(
                *expected == final_grid,
                "{strategy} produced a different grid than {}",
                Strategy::ALL[0]
            );
        } else {
            reference = Some(final_grid);
        }
    }

    println!("=== done ===");
    Ok(())
}

fn run_benchmark(config: &SolverConfig, warmup: usize, trials: usize) -> anyhow::Result<Grid> {
    println!("{}:", config.strategy);

    for _ in 0..warmup {
        run_once(config)?;
        std::thread::sleep(Duration::from_millis(100));
    }

    let mut times = Vec::with_capacity(trials);
    let mut last = None;
    for i in 0..trials {
        let (duration, grid, iterations) = run_once(config)?;
        times.push(duration);
        println!("  trial {:2}: {:?} ({} iterations)", i + 1, duration, iterations);
        last = Some(grid);

        std::thread::sleep(Duration::from_millis(50));
    }

    times.sort();
    let median = times[trials / 2];
    let avg = times.iter().sum::<Duration>() / trials as u32;

    println!("  ---");
    println!("  min:    {:?}", times[0]);
    println!("  median: {:?}", median);
    println!("  mean:   {:?}", avg);
    println!("  max:    {:?}", times[trials - 1]);
    println!();

    last.context("no trial ran")
}

fn run_once(config: &SolverConfig) -> anyhow::Result<(Duration, Grid, usize)> {
    let mut grid = Grid::new(config.size)?;
    let start = Instant::now();
    let result = solve(&mut grid, config)?;
    Ok((start.elapsed(), grid, result.iterations))
}
