use derive_more::Display;
use thiserror::Error;

use crate::cost::Cost;
use crate::movement::Coord;
use crate::movement::Direction;
use crate::movement::Move;
use crate::movement::Position;
use crate::movement::apply_move;
use crate::movement::legal_move;

const MAX_ELEMENTS_DISPLAYED: usize = 40;
const GOAL_COST: Cost = 0;
const OBSTACLE_TOKEN: &str = "#";
pub(crate) const COMMENT_PREFIX: char = '%';

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq)]
pub enum CellKind {
    #[display("standard")]
    Standard,
    #[display("obstacle")]
    Obstacle,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    pub cost: Cost,
    pub kind: CellKind,
}

impl Cell {
    pub const fn standard(cost: Cost) -> Self {
        Self {
            cost,
            kind: CellKind::Standard,
        }
    }
    pub const fn obstacle() -> Self {
        Self {
            cost: Cost::MAX,
            kind: CellKind::Obstacle,
        }
    }

    #[inline(always)]
    pub fn is_obstacle(&self) -> bool {
        self.kind == CellKind::Obstacle
    }
    #[inline(always)]
    pub fn is_goal(&self) -> bool {
        self.kind == CellKind::Standard && self.cost == GOAL_COST
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match (self.kind, self.is_goal()) {
            (CellKind::Obstacle, _) => write!(f, "###"),
            (CellKind::Standard, true) => write!(f, " {} ", self.cost),
            (CellKind::Standard, false) => write!(f, "[{}]", self.cost),
        }
    }
}

/// A square maze of cells with a cost budget.
///
/// A search only reads the grid, so several strategies can share one by
/// reference while a driver owns it.
#[derive(Clone, PartialEq, Eq)]
pub struct Grid {
    dimension: usize,
    /// Row-major cells, `dimension * dimension` of them.
    cells: Vec<Cell>,
    threshold: Cost,
    start: Position,
    goals: Vec<Position>,
}

impl Grid {
    /// Builds a grid from its rows, using the default start and threshold.
    pub fn new_from_rows(rows: Vec<Vec<Cell>>) -> Result<Self, GridParseError> {
        let dimension = rows.len();
        if dimension == 0 {
            return Err(GridParseError::EmptyInput);
        }
        let mut cells = Vec::with_capacity(dimension * dimension);
        for (y, row) in rows.into_iter().enumerate() {
            if row.len() != dimension {
                return Err(GridParseError::NotSquare {
                    y,
                    len: row.len(),
                    dimension,
                });
            }
            cells.extend(row);
        }

        let mut grid = Self {
            dimension,
            cells,
            threshold: 0,
            start: Position::ORIGIN,
            goals: vec![],
        };
        grid.threshold = grid.default_threshold();
        grid.goals = grid.find_goals();
        Ok(grid)
    }

    #[inline(always)]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[inline(always)]
    pub fn threshold(&self) -> Cost {
        self.threshold
    }
    pub fn set_threshold(&mut self, threshold: Cost) {
        self.threshold = threshold;
    }

    #[inline(always)]
    pub fn start(&self) -> Position {
        self.start
    }
    pub fn set_start(&mut self, start: Position) -> Result<(), GridParseError> {
        if !legal_move(self, &start) {
            return Err(GridParseError::IllegalStart { start });
        }
        self.start = start;
        Ok(())
    }

    /// Every goal cell, in row-major order.
    pub fn goals(&self) -> &[Position] {
        &self.goals
    }

    #[inline(always)]
    pub fn in_bounds(&self, p: &Position) -> bool {
        let d = self.dimension as Coord;
        (0..d).contains(&p.x) && (0..d).contains(&p.y)
    }

    /// The cell at `p`, which must be in bounds.
    #[inline(always)]
    pub fn cell(&self, p: &Position) -> Cell {
        debug_assert!(self.in_bounds(p), "{p} is outside of {self:?}");
        self.cells[p.y as usize * self.dimension + p.x as usize]
    }

    #[inline(always)]
    pub fn is_goal(&self, p: &Position) -> bool {
        self.cell(p).is_goal()
    }

    /// Sum of every standard cell cost, enough for any path that never
    /// enters a cell twice.
    pub fn default_threshold(&self) -> Cost {
        self.cells
            .iter()
            .filter(|c| !c.is_obstacle())
            .fold(0, |acc: Cost, c| acc.saturating_add(c.cost))
    }

    fn find_goals(&self) -> Vec<Position> {
        let d = self.dimension;
        (0..d * d)
            .filter(|i| self.cells[*i].is_goal())
            .map(|i| Position::new((i % d) as Coord, (i / d) as Coord))
            .collect()
    }

    /// Number of free cells reachable from the start.
    pub fn reachable_cells(&self) -> usize {
        let mut seen = rustc_hash::FxHashSet::<Position>::default();
        let mut pending = vec![self.start];
        seen.insert(self.start);
        while let Some(p) = pending.pop() {
            for m in crate::movement::possible_moves(self, &p) {
                let q = apply_move(&p, &m);
                if seen.insert(q) {
                    pending.push(q);
                }
            }
        }
        seen.len()
    }

    /// Replays `path` through unit moves, returning the cost of every cell
    /// entered after the first one.
    ///
    /// Returns `None` if the path is empty, doesn't start at the start or
    /// takes an illegal step.
    pub fn path_cost(&self, path: &[Position]) -> Option<Cost> {
        let (first, rest) = path.split_first()?;
        if *first != self.start {
            return None;
        }
        let mut cost: Cost = 0;
        let mut here = *first;
        for next in rest {
            let step = Direction::ALL
                .iter()
                .map(|d| Move::unit(*d))
                .find(|m| apply_move(&here, m) == *next)?;
            let there = apply_move(&here, &step);
            if !legal_move(self, &there) {
                return None;
            }
            cost = cost.saturating_add(self.cell(&there).cost);
            here = there;
        }
        Some(cost)
    }

    /// A random maze with the start at the origin and a goal at the opposite
    /// corner. Obstacles may cut them apart.
    ///
    /// The threshold is `random_threshold(max_cost)` rather than the sum of
    /// every cell, so exhaustive strategies only enumerate short paths.
    pub fn random<R: rand::Rng>(
        r: &mut R,
        dimension: usize,
        obstacle_ratio: f64,
        max_cost: Cost,
    ) -> Result<Self, RandomGridError> {
        if !(0.0..=1.0).contains(&obstacle_ratio) {
            return Err(RandomGridError::ObstacleRatio(obstacle_ratio));
        }
        let dimension = dimension.max(2);
        let last = dimension - 1;
        let rows = (0..dimension)
            .map(|y| {
                (0..dimension)
                    .map(|x| match (x, y) {
                        (0, 0) => Cell::standard(r.random_range(1..=max_cost.max(1))),
                        (x, y) if x == last && y == last => Cell::standard(GOAL_COST),
                        _ if r.random_bool(obstacle_ratio) => Cell::obstacle(),
                        _ => Cell::standard(r.random_range(1..=max_cost.max(1))),
                    })
                    .collect()
            })
            .collect();

        // Non-empty square rows can't fail.
        let mut grid = match Self::new_from_rows(rows) {
            Ok(grid) => grid,
            Err(e) => unreachable!("Random grid is malformed: {e}"),
        };
        grid.set_threshold(random_threshold(max_cost));
        Ok(grid)
    }

    /// Renders the grid with `path` drawn over it.
    pub fn solved<'a>(&'a self, path: &'a [Position]) -> SolvedGrid<'a> {
        SolvedGrid { grid: self, path }
    }

    fn fmt_cells<F>(&self, f: &mut std::fmt::Formatter, mut fmt_cell: F) -> std::fmt::Result
    where
        F: FnMut(&mut std::fmt::Formatter, Position, Cell) -> std::fmt::Result,
    {
        writeln!(f, "Threshold: {}", self.threshold)?;
        writeln!(f)?;
        for (y, row) in self
            .cells
            .chunks(self.dimension)
            .enumerate()
            .take(MAX_ELEMENTS_DISPLAYED)
        {
            for (x, cell) in row.iter().enumerate().take(MAX_ELEMENTS_DISPLAYED) {
                fmt_cell(f, Position::new(x as Coord, y as Coord), *cell)?;
                write!(f, " ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Threshold of random mazes.
///
/// Two steps through the most expensive cells, so the paths under it stay
/// short whatever the dimension.
pub fn random_threshold(max_cost: Cost) -> Cost {
    max_cost.max(1).saturating_add(1).saturating_mul(2)
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RandomGridError {
    #[error("Obstacle ratio {0} is not within [0, 1]")]
    ObstacleRatio(f64),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GridParseError {
    #[error("Empty input")]
    EmptyInput,
    #[error("Row {y} has {len} cells, expected {dimension}")]
    NotSquare {
        y: usize,
        len: usize,
        dimension: usize,
    },
    #[error("Invalid cell '{token}' found at ({x},{y})")]
    InvalidCell { token: String, x: usize, y: usize },
    #[error("Invalid header '{line}'")]
    InvalidHeader { line: String },
    #[error("Start {start} is outside the maze or on an obstacle")]
    IllegalStart { start: Position },
}

fn parse_cell(token: &str) -> Option<Cell> {
    match token {
        OBSTACLE_TOKEN => Some(Cell::obstacle()),
        token => token.parse::<Cost>().ok().map(Cell::standard),
    }
}

fn parse_header(line: &str) -> Option<Header> {
    let mut words = line.split_whitespace();
    let header = match words.next()? {
        "threshold" => Header::Threshold(words.next()?.parse().ok()?),
        "start" => Header::Start(Position::new(
            words.next()?.parse().ok()?,
            words.next()?.parse().ok()?,
        )),
        _ => return None,
    };
    words.next().is_none().then_some(header)
}

enum Header {
    Threshold(Cost),
    Start(Position),
}

impl std::convert::TryFrom<&str> for Grid {
    type Error = GridParseError;

    /// Parses a maze description.
    ///
    /// ```text
    /// % comment
    /// threshold 12
    /// start 0 0
    /// 1 1 #
    /// 2 # 1
    /// 1 1 0
    /// ```
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let mut threshold = None;
        let mut start = None;
        let mut rows: Vec<Vec<Cell>> = vec![];

        for line in s.lines().map(str::trim) {
            if line.is_empty() || line.starts_with(COMMENT_PREFIX) {
                continue;
            }
            if line.starts_with(|c: char| c.is_ascii_alphabetic()) {
                if !rows.is_empty() {
                    return Err(GridParseError::InvalidHeader {
                        line: line.to_string(),
                    });
                }
                match parse_header(line) {
                    Some(Header::Threshold(t)) => threshold = Some(t),
                    Some(Header::Start(p)) => start = Some(p),
                    None => {
                        return Err(GridParseError::InvalidHeader {
                            line: line.to_string(),
                        });
                    }
                }
                continue;
            }

            let y = rows.len();
            let row = line
                .split_whitespace()
                .enumerate()
                .map(|(x, token)| {
                    parse_cell(token).ok_or_else(|| GridParseError::InvalidCell {
                        token: token.to_string(),
                        x,
                        y,
                    })
                })
                .collect::<Result<Vec<Cell>, GridParseError>>()?;
            rows.push(row);
        }

        let mut grid = Grid::new_from_rows(rows)?;
        if let Some(t) = threshold {
            grid.set_threshold(t);
        }
        grid.set_start(start.unwrap_or(Position::ORIGIN))?;
        if grid.goals().is_empty() {
            log::warn!("Maze {grid:?} has no goal cells");
        }
        Ok(grid)
    }
}

impl std::fmt::Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        self.fmt_cells(f, |f, _, cell| write!(f, "{cell}"))
    }
}

/// A grid with a path drawn over it.
///
/// Cells along the path show as `(c)` and a reached goal as ` * `.
#[derive(Clone, Copy, Debug)]
pub struct SolvedGrid<'a> {
    grid: &'a Grid,
    path: &'a [Position],
}

impl std::fmt::Display for SolvedGrid<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        self.grid.fmt_cells(f, |f, p, cell| {
            match (self.path.contains(&p), cell.is_goal()) {
                (true, true) => write!(f, " * "),
                (true, false) => write!(f, "({})", cell.cost),
                (false, _) => write!(f, "{cell}"),
            }
        })
    }
}

impl std::fmt::Debug for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "Grid({0}x{0}, threshold={1}, start={2})",
            self.dimension, self.threshold, self.start
        )
    }
}
