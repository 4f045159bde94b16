use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use laplace_jacobi::grid::{CONV_THRESHOLD, ITER_MAX, OUTPUT_FILE};
use laplace_jacobi::config::PROGRESS_INTERVAL;
use laplace_jacobi::{solve, Grid, SolverConfig, Strategy};

#[derive(Parser)]
#[command(name = "laplace-jacobi")]
#[command(about = "Jacobi relaxation of the 2D Laplace equation")]
#[command(version)]
struct Cli {
    /// The size of each side of the domain (grid).
    size: usize,
    /// Number of threads.
    threads: usize,
    /// Parallelization strategy.
    #[arg(short, long, value_enum, default_value_t = Strategy::Spawn)]
    strategy: Strategy,
    /// Where the final grid is written.
    #[arg(short, long, default_value = OUTPUT_FILE)]
    output: PathBuf,
    /// Iteration cap; iterations 0..=max run at most.
    #[arg(long, default_value_t = ITER_MAX)]
    max_iterations: usize,
    /// Stop once the largest per-cell change is at or below this.
    #[arg(long, default_value_t = CONV_THRESHOLD)]
    threshold: f64,
    /// Log the error every this many iterations.
    #[arg(long, default_value_t = PROGRESS_INTERVAL)]
    progress_interval: usize,
}

const USAGE_EXIT_CODE: i32 = -1;

// 引数の数が違う場合は -1 で終了、--help / --version は None（clap に任せる）
fn usage_exit_code(err: &clap::Error) -> Option<i32> {
    err.use_stderr().then_some(USAGE_EXIT_CODE)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match usage_exit_code(&e) {
            Some(code) => {
                let _ = e.print();
                eprintln!("Usage: laplace-jacobi N T");
                eprintln!("N: The size of each side of the domain (grid)");
                eprintln!("T: Number of threads");
                std::process::exit(code);
            }
            None => e.exit(),
        },
    };

    let config = SolverConfig::new(cli.size, cli.threads)
        .with_strategy(cli.strategy)
        .with_max_iterations(cli.max_iterations)
        .with_threshold(cli.threshold)
        .with_progress_interval(cli.progress_interval);
    config.validate().context("invalid configuration")?;

    let mut grid = Grid::new(config.size).context("failed to set up the grid")?;

    println!("Jacobi relaxation calculation: {0} x {0} grid", config.size);

    let start = Instant::now();
    let result = solve(&mut grid, &config)?;
    let elapsed = start.elapsed();

    grid.save(&cli.output)
        .with_context(|| format!("failed to save grid to {}", cli.output.display()))?;

    println!(
        "\nKernel executed in {:.6} seconds with {} iterations and error of {:.10}",
        elapsed.as_secs_f64(),
        result.iterations,
        result.error
    );
    Ok(())
}
