use std::path::PathBuf;
use std::time::Duration;

use criterion::BenchmarkId;
use criterion::Criterion;
use criterion::criterion_group;
use criterion::criterion_main;
use hrsw::Stopwatch;
use human_duration::human_duration;
use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::SeedableRng;

use maze_search::expander::Strategy;
use maze_search::expander::TreeExpander;
use maze_search::grid::Grid;
use maze_search::heuristic::Heuristic;
use maze_search::loader::MazeLoader;

const DIMENSION: usize = 6;
const OBSTACLE_RATIO: f64 = 0.2;
const MAX_COST: u32 = 3;
/// Maximum time willing to wait for a single benchmark instance.
/// Experiments are carried out at least 5s and at least 100 times, so running a
/// 1s instance takes 1m40s.
const MAX_INSTANCE_TIME: Duration = Duration::from_secs(1);

fn instances() -> Vec<(String, Grid)> {
    let mut instances = vec![];

    let loader = match MazeLoader::from_paths([PathBuf::from("data/mazes")]) {
        Ok(loader) => loader,
        Err(e) => {
            log::warn!("Skipping sample mazes: {e}");
            MazeLoader::default()
        }
    };
    for (i, grid) in loader.enumerate() {
        match grid {
            Ok(grid) => instances.push((format!("sample:{i}"), grid)),
            Err(e) => log::warn!("Skipping sample maze: {e}"),
        }
    }

    for seed in 0..5 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        match Grid::random(&mut rng, DIMENSION, OBSTACLE_RATIO, MAX_COST) {
            Ok(grid) => instances.push((format!("random[{DIMENSION}x{DIMENSION}]:{seed}"), grid)),
            Err(e) => log::warn!("Skipping random maze {seed}: {e}"),
        }
    }
    instances
}

fn compare_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("Maze strategies");

    for (instance_name, grid) in instances() {
        for strategy in Strategy::ALL {
            let mut expander = TreeExpander::new(strategy, Heuristic::Diagonal);

            let mut stopwatch = Stopwatch::new_started();
            let outcome = expander.resolve(&grid);
            stopwatch.stop();
            let elapsed = stopwatch.elapsed();
            if elapsed > MAX_INSTANCE_TIME {
                log::warn!(
                    "Skipping {instance_name} as it takes too long with {strategy} ({})",
                    human_duration(&elapsed)
                );
                continue;
            }
            match outcome {
                Ok(outcome) => println!("{strategy} on {instance_name}: {outcome}"),
                Err(e) => {
                    log::warn!("Skipping {instance_name}, {strategy} failed: {e}");
                    continue;
                }
            }

            group.bench_with_input(
                BenchmarkId::new(strategy.to_string(), &instance_name),
                &grid,
                |b, g| b.iter(|| expander.resolve(g)),
            );
        }
    }
    group.finish();
}

criterion_group!(benches, compare_strategies);
criterion_main!(benches);
