use std::fs;

use approx::assert_abs_diff_eq;
use laplace_jacobi::implementations::{barrier, pool, rayon as rayon_strategy, single};
use laplace_jacobi::{solve, Convergence, Grid, JacobiError, Result, SolverConfig, Strategy};

const PARALLEL: [Strategy; 3] = [Strategy::Spawn, Strategy::Pool, Strategy::Rayon];

#[test]
fn test_initial_hot_block() {
    let grid = Grid::new(40).unwrap();

    // rows and columns [20, 24)
    for i in 0..40 {
        for j in 0..40 {
            let hot = (20..24).contains(&i) && (20..24).contains(&j);
            assert_eq!(grid.get(i, j), if hot { 100.0 } else { 0.0 }, "cell ({i}, {j})");
        }
    }
    assert!(grid.boundary_is_zero());
}

#[test]
fn test_boundary_conditions() {
    for strategy in Strategy::ALL {
        let config = SolverConfig::new(30, 4)
            .with_strategy(strategy)
            .with_max_iterations(50);
        let mut grid = Grid::new(30).unwrap();
        solve(&mut grid, &config).unwrap();

        assert!(
            grid.boundary_is_zero(),
            "{strategy}: boundary must stay 0.0"
        );
    }
}

#[test]
fn test_boundary_stays_zero_after_every_iteration() {
    // max_iterations = k で k + 1 回だけ反復し、毎回境界を確認する
    for strategy in Strategy::ALL {
        for k in 0..25 {
            let config = SolverConfig::new(20, 3)
                .with_strategy(strategy)
                .with_max_iterations(k);
            let mut grid = Grid::new(20).unwrap();

            let result = solve(&mut grid, &config).unwrap();

            assert_eq!(result.iterations, k + 1);
            assert!(
                grid.boundary_is_zero(),
                "{strategy}: boundary changed after iteration {k}"
            );
        }
    }
}

#[test]
fn test_single_hot_cell_after_one_iteration() {
    for strategy in Strategy::ALL {
        for threads in [1, 2, 4] {
            // max_iterations = 0 runs exactly iteration 0
            let config = SolverConfig::new(10, threads)
                .with_strategy(strategy)
                .with_max_iterations(0);
            let mut grid = Grid::new(10).unwrap();
            assert_eq!(grid.get(5, 5), 100.0);

            let result = solve(&mut grid, &config).unwrap();

            assert_eq!(result.iterations, 1);
            assert_eq!(result.error, 100.0);
            assert_eq!(grid.get(5, 5), 0.0, "{strategy}/{threads}");
            assert_eq!(grid.get(4, 5), 25.0, "{strategy}/{threads}");
            assert_eq!(grid.get(6, 5), 25.0, "{strategy}/{threads}");
            assert_eq!(grid.get(5, 4), 25.0, "{strategy}/{threads}");
            assert_eq!(grid.get(5, 6), 25.0, "{strategy}/{threads}");

            let total: f64 = grid.as_slice().iter().sum();
            assert_eq!(total, 100.0);
        }
    }
}

#[test]
fn test_degenerate_small_grid() {
    for strategy in Strategy::ALL {
        let config = SolverConfig::new(4, 2).with_strategy(strategy);
        let mut grid = Grid::new(4).unwrap();
        assert!(grid.as_slice().iter().all(|&v| v == 0.0));

        let result = solve(&mut grid, &config).unwrap();

        // the loop is entered once, sees zero error and stops
        assert_eq!(result.iterations, 1, "{strategy}");
        assert_eq!(result.error, 0.0, "{strategy}");
        assert!(grid.as_slice().iter().all(|&v| v == 0.0));
    }
}

#[test]
fn test_error_does_not_grow_between_progress_samples() {
    for strategy in PARALLEL {
        let config = SolverConfig::new(40, 4)
            .with_strategy(strategy)
            .with_max_iterations(1000);
        let mut grid = Grid::new(40).unwrap();

        let result = solve(&mut grid, &config).unwrap();

        assert!(result.progress.len() >= 2);
        assert_eq!(result.progress[0].iteration, 0);
        for pair in result.progress.windows(2) {
            assert_eq!(pair[1].iteration, pair[0].iteration + 100);
            assert!(
                pair[1].error <= pair[0].error,
                "{strategy}: error rose from {} to {} at iteration {}",
                pair[0].error,
                pair[1].error,
                pair[1].iteration
            );
        }
    }
}

#[test]
fn test_small_grid_converges_below_threshold() {
    for strategy in Strategy::ALL {
        let config = SolverConfig::new(12, 2).with_strategy(strategy);
        let mut grid = Grid::new(12).unwrap();

        let result = solve(&mut grid, &config).unwrap();

        assert!(result.error <= config.threshold, "{strategy}: {}", result.error);
        assert!(result.iterations < config.max_iterations);
    }
}

#[test]
fn test_iteration_cap() {
    let config = SolverConfig::new(200, 4).with_max_iterations(20);
    let mut grid = Grid::new(200).unwrap();

    let result = solve(&mut grid, &config).unwrap();

    assert_eq!(result.iterations, 21);
    assert!(result.error > config.threshold);
}

#[test]
fn test_invalid_configurations_are_rejected() {
    let mut grid = Grid::new(10).unwrap();

    let too_many = SolverConfig::new(10, 9);
    assert!(matches!(
        solve(&mut grid, &too_many),
        Err(JacobiError::TooManyThreads { threads: 9, .. })
    ));

    let no_threads = SolverConfig::new(10, 0);
    assert!(matches!(
        solve(&mut grid, &no_threads),
        Err(JacobiError::InvalidThreadCount)
    ));

    let mut tiny = Grid::new(2).unwrap();
    assert!(matches!(
        solve(&mut tiny, &SolverConfig::new(2, 1)),
        Err(JacobiError::InvalidSize { size: 2 })
    ));
}

#[test]
fn test_output_round_trip() {
    let config = SolverConfig::new(24, 3).with_max_iterations(40);
    let mut grid = Grid::new(24).unwrap();
    solve(&mut grid, &config).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("laplace_barrier.txt");
    grid.save(&path).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 24);
    for line in &lines {
        assert_eq!(line.split_whitespace().count(), 24);
    }

    let loaded = Grid::load(&path).unwrap();
    assert_eq!(loaded.size(), 24);
    for (a, b) in grid.as_slice().iter().zip(loaded.as_slice()) {
        assert_abs_diff_eq!(*a, *b, epsilon = 1e-6);
    }
}

#[test]
fn test_load_rejects_malformed_files() {
    let not_square = "0.0 0.0 \n0.0 0.0 \n0.0 0.0 \n";
    assert!(matches!(
        Grid::read_from(not_square.as_bytes()),
        Err(JacobiError::Parse { .. })
    ));

    let ragged = "0.0 0.0 \n0.0 \n";
    assert!(matches!(
        Grid::read_from(ragged.as_bytes()),
        Err(JacobiError::Parse { line: 2, .. })
    ));

    let garbage = "0.0 x \n0.0 0.0 \n";
    assert!(matches!(
        Grid::read_from(garbage.as_bytes()),
        Err(JacobiError::Parse { line: 1, .. })
    ));

    let missing = tempfile::tempdir().unwrap().path().join("absent.txt");
    assert!(matches!(Grid::load(&missing), Err(JacobiError::Io { .. })));
}

type EntryPoint = fn(&mut Grid, &SolverConfig) -> Result<Convergence>;

const ENTRY_POINTS: [(&str, EntryPoint); 4] = [
    ("barrier", barrier::solve),
    ("pool", pool::solve),
    ("rayon", rayon_strategy::solve),
    ("single", single::solve),
];

#[test]
fn test_strategy_entry_points_validate_config() {
    for (name, entry) in ENTRY_POINTS {
        let mut grid = Grid::new(40).unwrap();
        let untouched = grid.clone();

        let no_threads = SolverConfig::new(40, 0);
        assert!(
            matches!(entry(&mut grid, &no_threads), Err(JacobiError::InvalidThreadCount)),
            "{name}: zero threads must be rejected"
        );

        let no_progress = SolverConfig::new(40, 2).with_progress_interval(0);
        assert!(
            matches!(entry(&mut grid, &no_progress), Err(JacobiError::InvalidProgressInterval)),
            "{name}: zero progress interval must be rejected"
        );

        let nan_threshold = SolverConfig::new(40, 2).with_threshold(f64::NAN);
        assert!(
            matches!(entry(&mut grid, &nan_threshold), Err(JacobiError::InvalidThreshold { .. })),
            "{name}: NaN threshold must be rejected"
        );

        assert_eq!(grid, untouched, "{name}: rejected runs must not touch the grid");
    }
}
