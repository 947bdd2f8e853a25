//! # grid_pathviz
//!
//! A grid-based pathfinding engine made for visualizing searches step by step. Implements
//! [breadth-first search](https://en.wikipedia.org/wiki/Breadth-first_search),
//! [depth-first search](https://en.wikipedia.org/wiki/Depth-first_search),
//! [Dijkstra's algorithm](https://en.wikipedia.org/wiki/Dijkstra%27s_algorithm) and
//! [A*](https://en.wikipedia.org/wiki/A*_search_algorithm) on a uniform-cost 4-connected grid.
//!
//! Every search reports each cell it expands to a [SearchObserver](solver::SearchObserver) in a
//! deterministic order, polls a [CancelToken] so it can be stopped between steps, and marks the
//! path it found on the [Grid]. The [session] module runs searches on a worker thread with an
//! optional delay between steps for live rendering.
//!
//! ```
//! use grid_pathviz::{solver::Algorithm, CancelToken, CellKind, Grid, Position};
//!
//! let mut grid = Grid::new(3, 3).unwrap();
//! grid.set_kind(1, 1, CellKind::Wall).unwrap();
//! let outcome = Algorithm::AStar
//!     .run(&mut grid, &mut |_: Position| {}, &CancelToken::new())
//!     .unwrap();
//! assert_eq!(outcome.path().map(|p| p.len()), Some(5));
//! ```
mod cancel;
mod cell;
mod error;
mod grid;
pub mod session;
pub mod solver;

use core::fmt;

pub use cancel::CancelToken;
pub use cell::{Cell, CellKind};
pub use error::{GridError, SessionError};
pub use grid::Grid;

/// A 0-indexed `(row, col)` location on a [Grid]. Orders row-major.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Position {
        Position { row, col }
    }

    /// Number of orthogonal steps between two positions, ignoring walls.
    pub fn manhattan_distance(&self, other: &Position) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manhattan_distance_is_symmetric() {
        let a = Position::new(0, 4);
        let b = Position::new(3, 1);
        assert_eq!(a.manhattan_distance(&b), 6);
        assert_eq!(b.manhattan_distance(&a), 6);
        assert_eq!(a.to_string(), "(0, 4)");
    }
}
