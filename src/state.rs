use crate::cost::Cost;
use crate::grid::Grid;
use crate::heuristic::Heuristic;
use crate::movement::Position;

/// A heuristic estimate bound to a state, with the `f = g + h` weight it
/// derives.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Weighting {
    h: Cost,
    weight: Cost,
}

impl Weighting {
    #[inline(always)]
    pub fn h(&self) -> Cost {
        self.h
    }
}

/// A snapshot of the player in the maze.
///
/// Two states are the same state when the player stands on the same cell,
/// however it got there.
#[derive(Clone, Debug)]
pub struct MazeState {
    position: Position,
    /// Positions this state won't move to. Starts with the position that
    /// produced it and grows with every successor offered.
    visited: Vec<Position>,
    /// Accumulated cost of the cells entered so far.
    g: Cost,
    weighting: Option<Weighting>,
}

impl MazeState {
    pub fn new(position: Position, visited: Vec<Position>, g: Cost) -> Self {
        Self {
            position,
            visited,
            g,
            weighting: None,
        }
    }

    /// The state a search starts from.
    pub fn initial(start: Position) -> Self {
        Self::new(start, vec![], 0)
    }

    /// Binds `heuristic` to this state, evaluating it once.
    ///
    /// The position never changes, so neither does `h`.
    pub fn weighted(mut self, grid: &Grid, heuristic: Heuristic) -> Self {
        let h = heuristic.estimate(grid, &self);
        self.weighting = Some(Weighting {
            h,
            weight: h.saturating_add(self.g),
        });
        self
    }

    #[inline(always)]
    pub fn position(&self) -> Position {
        self.position
    }
    #[inline(always)]
    pub fn visited(&self) -> &[Position] {
        &self.visited
    }
    #[inline(always)]
    pub fn g(&self) -> Cost {
        self.g
    }
    #[inline(always)]
    pub fn weighting(&self) -> Option<&Weighting> {
        self.weighting.as_ref()
    }

    /// `h + g` for weighted states, `None` otherwise.
    #[inline(always)]
    pub fn weight(&self) -> Option<Cost> {
        self.weighting.map(|w| w.weight)
    }

    /// Updates the accumulated cost, keeping the weight in sync.
    pub fn set_g(&mut self, g: Cost) {
        self.g = g;
        if let Some(w) = &mut self.weighting {
            w.weight = w.h.saturating_add(g);
        }
        debug_assert!(self.weight_is_fresh());
    }

    pub(crate) fn mark_visited(&mut self, p: Position) {
        debug_assert!(!self.visited.contains(&p));
        self.visited.push(p);
    }

    /// Whether the weight still matches `h + g`.
    pub fn weight_is_fresh(&self) -> bool {
        self.weighting
            .is_none_or(|w| w.weight == w.h.saturating_add(self.g))
    }
}

impl PartialEq for MazeState {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position
    }
}
impl Eq for MazeState {}

impl std::hash::Hash for MazeState {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.position.hash(state);
    }
}

impl std::fmt::Display for MazeState {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} g={}", self.position, self.g)?;
        if let Some(w) = &self.weighting {
            write!(f, " h={} f={}", w.h, w.weight)?;
        }
        Ok(())
    }
}
