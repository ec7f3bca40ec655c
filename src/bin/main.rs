use std::path::PathBuf;

use anstream::println;
use clap::Parser;
use owo_colors::OwoColorize;
use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::SeedableRng;

use maze_search::expander::Outcome;
use maze_search::expander::Strategy;
use maze_search::expander::TreeExpander;
use maze_search::cost::Cost;
use maze_search::grid::Grid;
use maze_search::grid::RandomGridError;
use maze_search::heuristic::Heuristic;
use maze_search::heuristic::Heuristics;
use maze_search::loader::LoadError;
use maze_search::loader::MazeLoader;
use maze_search::movement::MovementError;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

/// Runs every expansion strategy over a batch of mazes
#[derive(Parser, Debug)]
#[clap(long_version = maze_search::build::CLAP_LONG_VERSION)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Maze files, or directories holding `.maze` files
    #[arg(env = "MAZES", value_delimiter = ':')]
    pub mazes: Vec<PathBuf>,

    /// Strategies to run. All of them when omitted
    #[arg(short, long, env = "MAZE_STRATEGY", value_delimiter = ',')]
    pub strategy: Vec<Strategy>,
    /// Heuristics to run each strategy with. All of them when omitted
    #[arg(long, env = "MAZE_HEURISTIC", value_delimiter = ',')]
    pub heuristic: Vec<Heuristic>,

    /// Cost budget for every maze, replacing the one it was loaded or
    /// generated with
    #[arg(long, env = "MAZE_THRESHOLD")]
    pub threshold: Option<Cost>,

    /// Additional random mazes to solve
    #[arg(long, default_value_t = 0usize)]
    pub random: usize,
    #[arg(long, default_value_t = 8usize)]
    pub dimension: usize,
    #[arg(long, default_value_t = 0.2f64, value_parser = parse_ratio)]
    pub obstacle_ratio: f64,
    #[arg(long, default_value_t = 9u32)]
    pub max_cost: u32,
    #[arg(long, env = "MAZE_SEED", default_value_t = 0u64)]
    pub seed: u64,

    /// Print the whole search tree after every run
    #[arg(long)]
    pub trace: bool,

    #[command(flatten)]
    color: colorchoice_clap::Color,
}

fn parse_ratio(s: &str) -> Result<f64, String> {
    let ratio: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if (0.0..=1.0).contains(&ratio) {
        Ok(ratio)
    } else {
        Err(format!("{ratio} is not within [0, 1]"))
    }
}

/// Seed of the `instance`-th random maze.
fn instance_seed(seed: u64, instance: usize) -> u64 {
    seed.wrapping_add(instance as u64)
}

#[derive(Debug, thiserror::Error)]
enum DriverError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Random(#[from] RandomGridError),
    #[error("{strategy} with {heuristic} made an illegal move: {e}")]
    Movement {
        strategy: Strategy,
        heuristic: Heuristic,
        e: MovementError,
    },
}

fn solve(
    args: &Args,
    name: &str,
    mut grid: Grid,
    strategies: &[Strategy],
    heuristics: &[Heuristic],
) -> Result<(), DriverError> {
    if let Some(threshold) = args.threshold {
        grid.set_threshold(threshold);
    }
    let grid = &grid;
    println!("{} {}", "*".blue(), name.bold());
    println!("{grid}");

    for &strategy in strategies {
        let mut expander = TreeExpander::unbound(strategy);
        for &heuristic in heuristics {
            expander.set_heuristic(heuristic);
            let outcome = expander.resolve(grid).map_err(|e| DriverError::Movement {
                strategy,
                heuristic,
                e,
            })?;

            println!(
                "{} {} with {}",
                "**".blue(),
                strategy.green(),
                heuristic.cyan()
            );
            match &outcome {
                Outcome::Solved(solution) => {
                    println!("{outcome}");
                    println!("{}", grid.solved(&solution.path));
                    if grid.path_cost(&solution.path) != Some(solution.cost) {
                        log::error!("{strategy} reported a path that does not replay to its cost");
                    }
                }
                Outcome::NoSolution => println!(
                    "{} after {} nodes",
                    outcome.red(),
                    expander.nodes_generated()
                ),
            }
            if args.trace {
                println!("{}", expander.tree().trace());
            }
        }
    }
    Ok(())
}

fn main() -> Result<(), DriverError> {
    env_logger::init();
    let args = Args::parse();
    args.color.write_global();

    let strategies = if args.strategy.is_empty() {
        Strategy::ALL.to_vec()
    } else {
        args.strategy.clone()
    };
    let heuristics: Vec<Heuristic> = if args.heuristic.is_empty() {
        Heuristics::new().collect()
    } else {
        args.heuristic.clone()
    };

    let mut loader = MazeLoader::from_paths(args.mazes.iter().cloned())?;
    let mut count = 0usize;
    while let Some(grid) = loader.load_next()? {
        solve(&args, &format!("Maze {count}"), grid, &strategies, &heuristics)?;
        count += 1;
    }

    for instance in 0..args.random {
        let seed = instance_seed(args.seed, instance);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let grid = Grid::random(&mut rng, args.dimension, args.obstacle_ratio, args.max_cost)?;
        solve(
            &args,
            &format!("Random maze {instance} (seed {seed})"),
            grid,
            &strategies,
            &heuristics,
        )?;
        count += 1;
    }

    if count == 0 {
        log::warn!("No mazes given, try `--random 1`");
    }
    Ok(())
}
