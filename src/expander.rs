use std::time::Duration;

use derive_more::Display;
use hrsw::Stopwatch;
use human_duration::human_duration;
use thiserror::Error;
use thousands::Separable;

use crate::algorithms;
use crate::cost::Cost;
use crate::grid::Grid;
use crate::heuristic::Heuristic;
use crate::movement::MovementController;
use crate::movement::MovementError;
use crate::movement::Position;
use crate::movement::apply_move;
use crate::search::SearchTree;
use crate::search::SearchTreeIndex;
use crate::state::MazeState;

/// The fixed set of expansion strategies.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash)]
pub enum Strategy {
    #[display("generate-and-test")]
    GenerateAndTest,
    #[display("simple-hill-climbing")]
    SimpleHillClimbing,
    #[display("steepest-ascent-hill-climbing")]
    SteepestAscentHillClimbing,
    #[display("best-first")]
    BestFirst,
    #[display("a-star")]
    AStar,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Strategy::GenerateAndTest,
        Strategy::SimpleHillClimbing,
        Strategy::SteepestAscentHillClimbing,
        Strategy::BestFirst,
        Strategy::AStar,
    ];

    /// Whether states carry a `g + h` weight.
    pub fn weighted(self) -> bool {
        self == Strategy::AStar
    }

    /// Whether a branch that accumulated `g` may still be explored.
    pub fn admits(self, grid: &Grid, g: Cost) -> bool {
        match self {
            Strategy::GenerateAndTest | Strategy::AStar => g <= grid.threshold(),
            Strategy::SimpleHillClimbing
            | Strategy::SteepestAscentHillClimbing
            | Strategy::BestFirst => true,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown strategy '{0}'")]
pub struct StrategyParseError(pub String);

impl std::str::FromStr for Strategy {
    type Err = StrategyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::ALL
            .into_iter()
            .find(|st| st.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| StrategyParseError(s.to_string()))
    }
}

/// A path that reached a goal cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Solution {
    /// From the start position to the goal, both included.
    pub path: Vec<Position>,
    pub cost: Cost,
    pub nodes_generated: usize,
    pub elapsed: Duration,
}

impl std::fmt::Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "Elapsed time: {}", human_duration(&self.elapsed))?;
        writeln!(
            f,
            "Nodes generated: {}",
            self.nodes_generated.separate_with_commas()
        )?;
        writeln!(f, "Cost: {}", self.cost)?;
        write!(f, "Path:")?;
        for p in &self.path {
            write!(f, " {p}")?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Solved(Solution),
    NoSolution,
}

impl Outcome {
    pub fn solution(&self) -> Option<&Solution> {
        match self {
            Outcome::Solved(s) => Some(s),
            Outcome::NoSolution => None,
        }
    }
    pub fn is_solved(&self) -> bool {
        matches!(self, Outcome::Solved(_))
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Outcome::Solved(s) => write!(f, "Solution found\n{s}"),
            Outcome::NoSolution => write!(f, "No solution"),
        }
    }
}

/// Shared scaffold of every strategy.
///
/// Owns the search tree and the run counters. The grid is only borrowed for
/// the duration of a `resolve()` call, and the heuristic may be swapped
/// between calls.
pub struct TreeExpander {
    strategy: Strategy,
    heuristic: Option<Heuristic>,
    tree: SearchTree,
    nodes_generated: usize,
    /// `None` until the first run starts.
    stopwatch: Option<Stopwatch>,
}

impl TreeExpander {
    pub fn new(strategy: Strategy, heuristic: Heuristic) -> Self {
        let mut expander = Self::unbound(strategy);
        expander.heuristic = Some(heuristic);
        expander
    }

    /// A scaffold with no heuristic yet. Bind one before resolving.
    pub fn unbound(strategy: Strategy) -> Self {
        Self {
            strategy,
            heuristic: None,
            tree: SearchTree::new(MazeState::initial(Position::ORIGIN)),
            nodes_generated: 0,
            stopwatch: None,
        }
    }

    #[inline(always)]
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }
    #[inline(always)]
    pub fn heuristic(&self) -> Option<Heuristic> {
        self.heuristic
    }
    pub fn set_heuristic(&mut self, heuristic: Heuristic) {
        self.heuristic = Some(heuristic);
    }

    #[inline(always)]
    pub fn tree(&self) -> &SearchTree {
        &self.tree
    }
    #[inline(always)]
    pub fn nodes_generated(&self) -> usize {
        self.nodes_generated
    }
    pub fn elapsed(&self) -> Duration {
        self.stopwatch
            .as_ref()
            .map(|stopwatch| stopwatch.elapsed())
            .unwrap_or_default()
    }

    /// Forgets everything about the previous run and seeds a fresh tree at
    /// the start of `grid`.
    pub fn reset(&mut self, grid: &Grid) {
        let mut root = MazeState::initial(grid.start());
        if self.strategy.weighted() {
            root = root.weighted(grid, self.bound_heuristic());
        }
        self.tree = SearchTree::new(root);
        self.nodes_generated = 0;
        self.stopwatch = None;
    }

    /// Runs the strategy from the start of `grid` until it reaches a goal or
    /// runs out of nodes.
    ///
    /// An `Err` means a strategy tried to move somewhere illegal, which is a
    /// bug rather than an unsolvable maze.
    pub fn resolve(&mut self, grid: &Grid) -> Result<Outcome, MovementError> {
        self.reset(grid);
        self.stopwatch = Some(Stopwatch::new_started());

        let goal = match self.strategy {
            Strategy::GenerateAndTest => algorithms::generate_and_test::expand(self, grid)?,
            Strategy::SimpleHillClimbing => algorithms::simple_hill_climbing::expand(self, grid)?,
            Strategy::SteepestAscentHillClimbing => {
                algorithms::steepest_ascent::expand(self, grid)?
            }
            Strategy::BestFirst => algorithms::best_first::expand(self, grid)?,
            Strategy::AStar => algorithms::astar::expand(self, grid)?,
        };

        if let Some(stopwatch) = &mut self.stopwatch {
            stopwatch.stop();
        }

        let outcome = match goal {
            Some(node_index) => Outcome::Solved(self.report(node_index)),
            None => Outcome::NoSolution,
        };
        log::debug!(
            "{} with {:?} on {:?}: {} nodes, solved={}",
            self.strategy,
            self.heuristic,
            grid,
            self.nodes_generated,
            outcome.is_solved()
        );
        Ok(outcome)
    }

    fn report(&self, node_index: SearchTreeIndex) -> Solution {
        Solution {
            path: self.tree.positions(node_index),
            cost: self.tree[node_index].state().g(),
            nodes_generated: self.nodes_generated,
            elapsed: self.elapsed(),
        }
    }

    fn bound_heuristic(&self) -> Heuristic {
        match self.heuristic {
            Some(h) => h,
            None => panic!("{} evaluated a heuristic before one was bound", self.strategy),
        }
    }

    // Hooks for the strategies
    // ------------------------

    /// Offers the next neighbour of `node` that it hasn't offered before, and
    /// remembers it. The position that produced `node` is never offered.
    pub(crate) fn select_operand(
        &mut self,
        grid: &Grid,
        node: SearchTreeIndex,
    ) -> Option<Position> {
        let state = &mut self.tree[node].state;
        let here = state.position();
        let operand = MovementController::new(here)
            .possible_moves(grid)
            .into_iter()
            .map(|m| apply_move(&here, &m))
            .find(|p| !state.visited().contains(p))?;
        state.mark_visited(operand);
        Some(operand)
    }

    /// Evaluates the bound heuristic on `node`.
    pub(crate) fn apply_heuristic(&self, grid: &Grid, node: SearchTreeIndex) -> Cost {
        self.evaluate(grid, self.tree[node].state())
    }

    /// Evaluates the bound heuristic on a state that may not be in the tree.
    pub(crate) fn evaluate(&self, grid: &Grid, state: &MazeState) -> Cost {
        self.bound_heuristic().estimate(grid, state)
    }

    /// Cost of entering `target`.
    #[inline(always)]
    pub(crate) fn update_threshold(&self, grid: &Grid, target: &Position) -> Cost {
        grid.cell(target).cost
    }

    /// Builds the state reached by moving from `node` to `target`.
    pub(crate) fn successor(
        &self,
        grid: &Grid,
        node: SearchTreeIndex,
        target: Position,
    ) -> Result<MazeState, MovementError> {
        let parent = self.tree[node].state();
        let mut controller = MovementController::new(parent.position());
        controller.set_absolute(grid, target)?;

        let mut state = MazeState::new(controller.position(), vec![parent.position()], parent.g());
        if self.strategy.weighted() {
            state = state.weighted(grid, self.bound_heuristic());
        }
        state.set_g(parent.g().saturating_add(self.update_threshold(grid, &target)));
        Ok(state)
    }

    /// Adds `state` to the tree under `parent`.
    pub(crate) fn grow(&mut self, parent: SearchTreeIndex, state: MazeState) -> SearchTreeIndex {
        log::trace!("{}: generated {state}", self.strategy);
        self.nodes_generated += 1;
        self.tree.push(parent, state)
    }
}

impl std::fmt::Debug for TreeExpander {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "TreeExpander{{{}, {:?}, {:?}, {} generated}}",
            self.strategy, self.heuristic, self.tree, self.nodes_generated
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use indoc::indoc;

    fn open_grid() -> Grid {
        Grid::try_from(indoc! {"
            1 1 1
            1 1 1
            1 1 0
        "})
        .unwrap()
    }

    #[test]
    fn construct_is_empty() {
        let expander = TreeExpander::new(Strategy::BestFirst, Heuristic::Manhattan);
        assert_eq!(expander.nodes_generated(), 0);
        assert_eq!(expander.elapsed(), Duration::ZERO);
        assert_eq!(expander.tree().len(), 1);
        let root = expander.tree().root();
        assert_eq!(expander.tree()[root].state().position(), Position::ORIGIN);
        assert!(expander.tree()[root].state().visited().is_empty());
        assert_eq!(expander.tree()[root].state().g(), 0);
    }

    #[test]
    fn reset_forgets_previous_run() {
        let grid = open_grid();
        for strategy in Strategy::ALL {
            let mut expander = TreeExpander::new(strategy, Heuristic::Manhattan);
            assert!(expander.resolve(&grid).unwrap().is_solved());
            assert!(expander.nodes_generated() > 0);

            expander.reset(&grid);
            assert_eq!(expander.nodes_generated(), 0);
            assert_eq!(expander.elapsed(), Duration::ZERO);
            assert_eq!(expander.tree().len(), 1);
        }
    }

    #[test]
    fn select_operand_offers_each_neighbour_once() {
        let grid = open_grid();
        let mut expander = TreeExpander::new(Strategy::BestFirst, Heuristic::Manhattan);
        expander.reset(&grid);
        let root = expander.tree().root();

        let successor = expander.successor(&grid, root, Position::new(1, 1)).unwrap();
        let center = expander.grow(root, successor);

        let mut offered = vec![];
        while let Some(p) = expander.select_operand(&grid, center) {
            offered.push(p);
        }
        // Every neighbour but the one it came from, clockwise from north.
        assert_eq!(
            offered,
            vec![
                Position::new(1, 0),
                Position::new(2, 0),
                Position::new(2, 1),
                Position::new(2, 2),
                Position::new(1, 2),
                Position::new(0, 2),
                Position::new(0, 1),
            ]
        );
        assert_eq!(expander.select_operand(&grid, center), None);
    }

    #[test]
    fn successor_accumulates_cell_costs() {
        let grid = Grid::try_from("1 4\n2 0").unwrap();
        let mut expander = TreeExpander::new(Strategy::AStar, Heuristic::Manhattan);
        expander.reset(&grid);
        let root = expander.tree().root();

        let s = expander.successor(&grid, root, Position::new(1, 0)).unwrap();
        assert_eq!(s.g(), 4);
        assert_eq!(s.visited(), &[Position::ORIGIN]);
        // h = 1 from (1,0) to (1,1)
        assert_eq!(s.weight(), Some(5));
        assert_eq!(expander.update_threshold(&grid, &Position::new(0, 1)), 2);
        assert_eq!(expander.apply_heuristic(&grid, root), 2);
    }

    #[test]
    fn successor_rejects_illegal_targets() {
        let grid = Grid::try_from("1 #\n1 0").unwrap();
        let mut expander = TreeExpander::new(Strategy::BestFirst, Heuristic::Manhattan);
        expander.reset(&grid);
        let root = expander.tree().root();

        assert!(matches!(
            expander.successor(&grid, root, Position::new(1, 0)),
            Err(MovementError::IllegalPosition { .. })
        ));
    }

    #[test]
    fn heuristic_can_be_swapped_between_runs() {
        let grid = open_grid();
        let mut expander = TreeExpander::new(Strategy::AStar, Heuristic::Manhattan);
        for h in Heuristic::ALL {
            expander.set_heuristic(h);
            let outcome = expander.resolve(&grid).unwrap();
            assert!(outcome.is_solved());
            assert_eq!(expander.heuristic(), Some(h));
        }
    }

    #[test]
    #[should_panic(expected = "before one was bound")]
    fn unbound_heuristic_fails_loudly() {
        let grid = open_grid();
        let mut expander = TreeExpander::unbound(Strategy::SimpleHillClimbing);
        let _ = expander.resolve(&grid);
    }

    #[test]
    fn parse_names() {
        assert_eq!("a-star".parse(), Ok(Strategy::AStar));
        assert_eq!("Best-First".parse(), Ok(Strategy::BestFirst));
        assert!("dfs".parse::<Strategy>().is_err());
    }
}
