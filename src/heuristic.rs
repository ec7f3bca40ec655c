use derive_more::Display;
use thiserror::Error;

use crate::cost::Cost;
use crate::cost::UNREACHABLE;
use crate::grid::Grid;
use crate::movement::Position;
use crate::state::MazeState;

/// Estimates of the remaining cost from a state to its nearest goal.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash)]
pub enum Heuristic {
    /// Orthogonal steps to the goal.
    #[display("manhattan")]
    Manhattan,
    /// Floored straight-line distance to the goal.
    #[display("euclidean")]
    Euclidean,
    /// King moves to the goal, minus the last one.
    ///
    /// Stepping onto a goal is free and every other cell costs at least 1, so
    /// this never overestimates.
    #[display("diagonal")]
    Diagonal,
    /// Knows nothing.
    #[display("uninformed")]
    Uninformed,
}

impl Heuristic {
    pub const ALL: [Heuristic; 4] = [
        Heuristic::Manhattan,
        Heuristic::Euclidean,
        Heuristic::Diagonal,
        Heuristic::Uninformed,
    ];

    /// Whether the estimate is a lower bound on the true remaining cost.
    pub fn admissible(self) -> bool {
        matches!(self, Heuristic::Diagonal | Heuristic::Uninformed)
    }

    fn distance(self, from: &Position, goal: &Position) -> Cost {
        match self {
            Heuristic::Manhattan => from.manhattan_distance(goal),
            Heuristic::Euclidean => from.euclidean_distance(goal).floor() as Cost,
            Heuristic::Diagonal => from.chebyshev_distance(goal).saturating_sub(1),
            Heuristic::Uninformed => 0,
        }
    }

    /// Estimate for `position` against the closest goal of `grid`.
    ///
    /// A grid without goals yields `UNREACHABLE`.
    pub fn estimate_position(self, grid: &Grid, position: &Position) -> Cost {
        grid.goals()
            .iter()
            .map(|g| self.distance(position, g))
            .min()
            .unwrap_or(UNREACHABLE)
    }

    #[inline(always)]
    pub fn estimate(self, grid: &Grid, state: &MazeState) -> Cost {
        self.estimate_position(grid, &state.position())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown heuristic '{0}'")]
pub struct HeuristicParseError(pub String);

impl std::str::FromStr for Heuristic {
    type Err = HeuristicParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Heuristic::ALL
            .into_iter()
            .find(|h| h.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| HeuristicParseError(s.to_string()))
    }
}

/// The fixed, ordered catalogue of heuristics, handed out one at a time.
#[derive(Clone, Debug, Default)]
pub struct Heuristics {
    next: usize,
}

impl Heuristics {
    pub fn new() -> Self {
        Self::default()
    }

    /// The heuristic strategies start with.
    pub fn default_heuristic() -> Heuristic {
        Heuristic::ALL[0]
    }

    /// Starts handing out heuristics from the first one again.
    pub fn reset(&mut self) {
        self.next = 0;
    }
}

impl Iterator for Heuristics {
    type Item = Heuristic;

    fn next(&mut self) -> Option<Self::Item> {
        let h = Heuristic::ALL.get(self.next).copied()?;
        self.next += 1;
        Some(h)
    }
}
