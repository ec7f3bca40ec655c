use derive_more::Display;
use smallvec::SmallVec;
use thiserror::Error;

use crate::grid::Grid;

pub type Coord = i32;

/// A cell coordinate. `y` grows southwards, as rows do in a maze file.
#[derive(Copy, Clone, Debug, Default, Display, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[display("({x},{y})")]
pub struct Position {
    pub x: Coord,
    pub y: Coord,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0, y: 0 };

    #[inline(always)]
    pub const fn new(x: Coord, y: Coord) -> Self {
        Self { x, y }
    }

    /// Straight-line distance.
    pub fn euclidean_distance(&self, other: &Position) -> f64 {
        let dx = f64::from(other.x - self.x);
        let dy = f64::from(other.y - self.y);
        dx.hypot(dy)
    }

    /// Distance counted in orthogonal cell steps.
    #[inline(always)]
    pub fn manhattan_distance(&self, other: &Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Distance counted in king moves.
    #[inline(always)]
    pub fn chebyshev_distance(&self, other: &Position) -> u32 {
        std::cmp::max(self.x.abs_diff(other.x), self.y.abs_diff(other.y))
    }
}

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    #[display("↑")]
    North, // y--
    #[display("↗")]
    NorthEast, // x++, y--
    #[display("→")]
    East, // x++
    #[display("↘")]
    SouthEast, // x++, y++
    #[display("↓")]
    South, // y++
    #[display("↙")]
    SouthWest, // x--, y++
    #[display("←")]
    West, // x--
    #[display("↖")]
    NorthWest, // x--, y--
}

impl Direction {
    /// Every direction, clockwise from north. Expansion order follows it.
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    #[inline(always)]
    pub const fn unit(self) -> (Coord, Coord) {
        #[rustfmt::skip]
        let unit = match self {
            Direction::North     => ( 0, -1),
            Direction::NorthEast => ( 1, -1),
            Direction::East      => ( 1,  0),
            Direction::SouthEast => ( 1,  1),
            Direction::South     => ( 0,  1),
            Direction::SouthWest => (-1,  1),
            Direction::West      => (-1,  0),
            Direction::NorthWest => (-1, -1),
        };
        unit
    }
}

/// A direction travelled `magnitude` cells.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash)]
#[display("{direction}{magnitude}")]
pub struct Move {
    pub direction: Direction,
    pub magnitude: Coord,
}

impl Move {
    #[inline(always)]
    pub const fn new(direction: Direction, magnitude: Coord) -> Self {
        Self {
            direction,
            magnitude,
        }
    }
    #[inline(always)]
    pub const fn unit(direction: Direction) -> Self {
        Self::new(direction, 1)
    }
}

/// Computes the target of a move without checking it.
#[inline(always)]
pub fn apply_move(p: &Position, m: &Move) -> Position {
    let (dx, dy) = m.direction.unit();
    Position::new(p.x + dx * m.magnitude, p.y + dy * m.magnitude)
}

/// Whether `p` lies inside the grid and isn't an obstacle.
#[inline(always)]
pub fn legal_move(grid: &Grid, p: &Position) -> bool {
    grid.in_bounds(p) && !grid.cell(p).is_obstacle()
}

/// Unit moves from `p` that land on a legal cell, in `Direction::ALL` order.
pub fn possible_moves(grid: &Grid, p: &Position) -> SmallVec<[Move; 8]> {
    Direction::ALL
        .iter()
        .map(|d| Move::unit(*d))
        .filter(|m| legal_move(grid, &apply_move(p, m)))
        .collect()
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MovementError {
    #[error("Illegal move {movement} from {position}")]
    IllegalMove { position: Position, movement: Move },
    #[error("Illegal absolute move from {position} to {target}")]
    IllegalPosition { position: Position, target: Position },
}

/// Tracks a player position and refuses to leave the legal cells of a grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MovementController {
    position: Position,
}

impl MovementController {
    pub fn new(position: Position) -> Self {
        Self { position }
    }

    #[inline(always)]
    pub fn position(&self) -> Position {
        self.position
    }

    pub fn apply(&self, m: &Move) -> Position {
        apply_move(&self.position, m)
    }

    pub fn possible_moves(&self, grid: &Grid) -> SmallVec<[Move; 8]> {
        possible_moves(grid, &self.position)
    }

    pub fn set_relative(&mut self, grid: &Grid, m: Move) -> Result<(), MovementError> {
        let target = self.apply(&m);
        if !legal_move(grid, &target) {
            return Err(MovementError::IllegalMove {
                position: self.position,
                movement: m,
            });
        }
        self.position = target;
        Ok(())
    }

    pub fn set_absolute(&mut self, grid: &Grid, target: Position) -> Result<(), MovementError> {
        if !legal_move(grid, &target) {
            return Err(MovementError::IllegalPosition {
                position: self.position,
                target,
            });
        }
        self.position = target;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use indoc::indoc;

    fn grid() -> Grid {
        Grid::try_from(indoc! {"
            1 1 1
            1 # 1
            1 1 0
        "})
        .unwrap()
    }

    #[test]
    fn moves_scale_unit_vectors() {
        let p = Position::new(3, 4);
        for d in Direction::ALL {
            for magnitude in 1..4 {
                let (dx, dy) = d.unit();
                let q = apply_move(&p, &Move::new(d, magnitude));
                assert_eq!(q.x - p.x, dx * magnitude);
                assert_eq!(q.y - p.y, dy * magnitude);
            }
        }
    }

    #[test]
    fn distances() {
        let a = Position::new(0, 0);
        let b = Position::new(3, 4);
        assert_eq!(a.manhattan_distance(&b), 7);
        assert_eq!(a.chebyshev_distance(&b), 4);
        assert!((a.euclidean_distance(&b) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn possible_moves_stay_legal() {
        let grid = grid();
        for y in -1..4 {
            for x in -1..4 {
                let p = Position::new(x, y);
                for m in possible_moves(&grid, &p) {
                    let q = apply_move(&p, &m);
                    assert!(grid.in_bounds(&q));
                    assert!(!grid.cell(&q).is_obstacle());
                }
            }
        }
        // The corner sees two sides, the obstacle hides the diagonal.
        let corner = possible_moves(&grid, &Position::ORIGIN);
        assert_eq!(
            corner.iter().map(|m| m.direction).collect::<Vec<_>>(),
            vec![Direction::East, Direction::South]
        );
    }

    #[test]
    fn controller_refuses_illegal_targets() {
        let grid = grid();
        let mut c = MovementController::new(Position::ORIGIN);

        let err = c.set_relative(&grid, Move::unit(Direction::North));
        assert_eq!(
            err,
            Err(MovementError::IllegalMove {
                position: Position::ORIGIN,
                movement: Move::unit(Direction::North),
            })
        );
        assert!(c.set_absolute(&grid, Position::new(1, 1)).is_err());
        assert_eq!(c.position(), Position::ORIGIN);

        c.set_relative(&grid, Move::new(Direction::East, 2)).unwrap();
        assert_eq!(c.position(), Position::new(2, 0));
        c.set_absolute(&grid, Position::new(2, 2)).unwrap();
        assert_eq!(c.position(), Position::new(2, 2));
    }
}
