use core::fmt;
use std::str::FromStr;

use itertools::Itertools;
use log::info;
use petgraph::unionfind::UnionFind;

use crate::cell::{Cell, CellKind};
use crate::error::GridError;
use crate::Position;

/// Row and column offsets of the 4-neighbourhood in the order north, south, west, east. Searches
/// rely on this order being fixed.
const NEIGHBOUR_OFFSETS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// [Grid] owns a row-major arena of [Cell]s and remembers where the start and end markers are.
/// Predecessor links between cells are plain [Position]s into this arena.
///
/// Like a pathing grid it also maintains connected components of the non-wall cells in a
/// [UnionFind] structure, so the presentation layer can tell whether the end is reachable without
/// running a search.
#[derive(Clone, Debug)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
    start: Position,
    end: Position,
    components: UnionFind<usize>,
    components_dirty: bool,
}

impl Grid {
    /// Creates a grid of empty cells with the start in the top-left and the end in the
    /// bottom-right corner.
    pub fn new(rows: usize, cols: usize) -> Result<Grid, GridError> {
        if rows == 0 || cols == 0 {
            return Err(GridError::InvalidDimensions { rows, cols });
        }
        let start = Position::new(0, 0);
        let end = Position::new(rows - 1, cols - 1);
        if start == end {
            return Err(GridError::StartEqualsEnd(start));
        }
        let cells = (0..rows)
            .flat_map(|row| (0..cols).map(move |col| Cell::new(Position::new(row, col))))
            .collect();
        let mut grid = Grid {
            rows,
            cols,
            cells,
            start,
            end,
            components: UnionFind::new(rows * cols),
            components_dirty: false,
        };
        grid.cell_mut(start).kind = CellKind::Start;
        grid.cell_mut(end).kind = CellKind::End;
        grid.generate_components();
        Ok(grid)
    }

    /// Returns `(rows, cols)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn start_position(&self) -> Position {
        self.start
    }

    pub fn end_position(&self) -> Position {
        self.end
    }

    pub fn in_bounds(&self, position: Position) -> bool {
        position.row < self.rows && position.col < self.cols
    }

    fn checked(&self, row: usize, col: usize) -> Result<Position, GridError> {
        let position = Position::new(row, col);
        if self.in_bounds(position) {
            Ok(position)
        } else {
            Err(GridError::OutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    fn ix(&self, position: Position) -> usize {
        position.row * self.cols + position.col
    }

    pub fn cell_at(&self, row: usize, col: usize) -> Result<&Cell, GridError> {
        let position = self.checked(row, col)?;
        Ok(self.cell(position))
    }

    pub fn kind_at(&self, row: usize, col: usize) -> Result<CellKind, GridError> {
        self.cell_at(row, col).map(|cell| cell.kind)
    }

    /// Callers must only pass in-bounds positions.
    pub(crate) fn cell(&self, position: Position) -> &Cell {
        &self.cells[self.ix(position)]
    }

    pub(crate) fn cell_mut(&mut self, position: Position) -> &mut Cell {
        let ix = self.ix(position);
        &mut self.cells[ix]
    }

    /// Changes the kind of a cell. Placing [CellKind::Start] or [CellKind::End] moves that marker,
    /// turning its previous cell back into [CellKind::Empty].
    ///
    /// The grid does not stop a caller from walling over the start or end; keeping those cells
    /// walkable is up to the editor.
    pub fn set_kind(&mut self, row: usize, col: usize, kind: CellKind) -> Result<(), GridError> {
        let position = self.checked(row, col)?;
        let previous = self.cell(position).kind;
        match kind {
            CellKind::Start => {
                let old = self.start;
                if self.cell(old).kind == CellKind::Start {
                    self.cell_mut(old).kind = CellKind::Empty;
                }
                self.start = position;
            }
            CellKind::End => {
                let old = self.end;
                if self.cell(old).kind == CellKind::End {
                    self.cell_mut(old).kind = CellKind::Empty;
                }
                self.end = position;
            }
            _ => {}
        }
        self.cell_mut(position).kind = kind;
        self.update_components(position, previous, kind);
        Ok(())
    }

    /// Joins newly connected components when a wall disappears and flags the components as dirty
    /// when a wall (potentially) splits one.
    fn update_components(&mut self, position: Position, previous: CellKind, kind: CellKind) {
        let was_wall = previous == CellKind::Wall;
        let is_wall = kind == CellKind::Wall;
        if is_wall && !was_wall {
            self.components_dirty = true;
        } else if was_wall && !is_wall {
            let ix = self.ix(position);
            for neighbour in self.neighbors(position) {
                let neighbour_ix = self.ix(neighbour);
                self.components.union(ix, neighbour_ix);
            }
        }
    }

    /// The in-bounds, non-wall cells orthogonally adjacent to `position`, in north, south, west,
    /// east order.
    pub fn neighbors(&self, position: Position) -> Vec<Position> {
        NEIGHBOUR_OFFSETS
            .iter()
            .filter_map(|&(d_row, d_col)| self.offset(position, d_row, d_col))
            .filter(|&p| !self.cell(p).is_wall())
            .collect()
    }

    fn offset(&self, position: Position, d_row: isize, d_col: isize) -> Option<Position> {
        let row = position.row.checked_add_signed(d_row)?;
        let col = position.col.checked_add_signed(d_col)?;
        let next = Position::new(row, col);
        self.in_bounds(next).then_some(next)
    }

    /// Removes everything a search left behind: predecessors and costs are zeroed, visited and
    /// path cells become empty and the start and end markers are put back in place.
    pub fn clear_path(&mut self) {
        for cell in &mut self.cells {
            cell.clear_search_state();
        }
        for (position, kind) in [(self.start, CellKind::Start), (self.end, CellKind::End)] {
            if self.cell(position).is_wall() {
                self.components_dirty = true;
            }
            self.cell_mut(position).kind = kind;
        }
    }

    /// Removes all walls and search state and moves start and end back to opposite corners.
    pub fn reset(&mut self) {
        for cell in &mut self.cells {
            cell.clear_search_state();
            cell.kind = CellKind::Empty;
        }
        self.start = Position::new(0, 0);
        self.end = Position::new(self.rows - 1, self.cols - 1);
        let (start, end) = (self.start, self.end);
        self.cell_mut(start).kind = CellKind::Start;
        self.cell_mut(end).kind = CellKind::End;
        self.generate_components();
    }

    /// A search needs distinct start and end cells.
    pub(crate) fn validate(&self) -> Result<(), GridError> {
        if self.start == self.end {
            Err(GridError::StartEqualsEnd(self.start))
        } else {
            Ok(())
        }
    }

    /// Regenerates the components if they are marked as dirty.
    pub fn update(&mut self) {
        if self.components_dirty {
            info!("Components are dirty: regenerating components");
            self.generate_components();
        }
    }

    /// Generates a new [UnionFind] structure and links up walkable grid neighbours to the same
    /// components.
    pub fn generate_components(&mut self) {
        self.components = UnionFind::new(self.rows * self.cols);
        self.components_dirty = false;
        for row in 0..self.rows {
            for col in 0..self.cols {
                let position = Position::new(row, col);
                if self.cell(position).is_wall() {
                    continue;
                }
                let parent_ix = self.ix(position);
                for neighbour in [Position::new(row + 1, col), Position::new(row, col + 1)] {
                    if self.in_bounds(neighbour) && !self.cell(neighbour).is_wall() {
                        let neighbour_ix = self.ix(neighbour);
                        self.components.union(parent_ix, neighbour_ix);
                    }
                }
            }
        }
    }

    /// Checks if `a` and `b` are walkable cells on the same component.
    pub fn reachable(&mut self, a: Position, b: Position) -> bool {
        self.update();
        if !self.in_bounds(a) || !self.in_bounds(b) {
            return false;
        }
        if self.cell(a).is_wall() || self.cell(b).is_wall() {
            return false;
        }
        self.components.equiv(self.ix(a), self.ix(b))
    }

    /// Checks that `path` runs from the start to the end through walkable cells in orthogonal
    /// unit steps.
    pub fn is_valid_path(&self, path: &[Position]) -> bool {
        match (path.first(), path.last()) {
            (Some(&first), Some(&last)) if first == self.start && last == self.end => {}
            _ => return false,
        }
        path.iter()
            .all(|&p| self.in_bounds(p) && !self.cell(p).is_wall())
            && path
                .iter()
                .tuple_windows()
                .all(|(a, b)| a.manhattan_distance(b) == 1)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in self.cells.chunks(self.cols) {
            let line = row.iter().map(|cell| cell.kind.symbol()).collect::<String>();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// Parses the format produced by [Display]: one line per row, `S` start, `E` end, `#` wall and
/// `.` for empty cells. Search marks (`o`, `*`) are read back as empty cells. Parse errors refer
/// to 1-based lines, line 0 meaning the input as a whole.
impl FromStr for Grid {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Grid, GridError> {
        let lines = s
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>();
        let rows = lines.len();
        let cols = lines.first().map_or(0, |line| line.chars().count());
        if rows == 0 || cols == 0 {
            return Err(GridError::InvalidDimensions { rows, cols });
        }

        let mut kinds = Vec::with_capacity(rows * cols);
        let mut start = None;
        let mut end = None;
        for (row, line) in lines.iter().enumerate() {
            let width = line.chars().count();
            if width != cols {
                return Err(GridError::Parse {
                    line: row + 1,
                    reason: format!("expected {} cells, found {}", cols, width),
                });
            }
            for (col, symbol) in line.chars().enumerate() {
                let kind = CellKind::from_symbol(symbol).ok_or_else(|| GridError::Parse {
                    line: row + 1,
                    reason: format!("unknown cell symbol {:?}", symbol),
                })?;
                let marker = match kind {
                    CellKind::Start => Some(&mut start),
                    CellKind::End => Some(&mut end),
                    _ => None,
                };
                if let Some(marker) = marker {
                    if marker.replace(Position::new(row, col)).is_some() {
                        return Err(GridError::Parse {
                            line: row + 1,
                            reason: format!("more than one {:?} marker", symbol),
                        });
                    }
                }
                kinds.push(kind);
            }
        }

        let missing = |symbol: char| GridError::Parse {
            line: 0,
            reason: format!("missing {:?} marker", symbol),
        };
        let start = start.ok_or_else(|| missing('S'))?;
        let end = end.ok_or_else(|| missing('E'))?;

        let mut grid = Grid::new(rows, cols)?;
        for (cell, kind) in grid.cells.iter_mut().zip(kinds) {
            cell.kind = kind;
        }
        grid.start = start;
        grid.end = end;
        grid.generate_components();
        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_grid_has_corner_markers() {
        let grid = Grid::new(4, 6).unwrap();
        assert_eq!(grid.dimensions(), (4, 6));
        assert_eq!(grid.start_position(), Position::new(0, 0));
        assert_eq!(grid.end_position(), Position::new(3, 5));
        assert_eq!(grid.kind_at(0, 0), Ok(CellKind::Start));
        assert_eq!(grid.kind_at(3, 5), Ok(CellKind::End));
        assert_eq!(grid.kind_at(2, 2), Ok(CellKind::Empty));
    }

    #[test]
    fn rejects_degenerate_dimensions() {
        assert_eq!(
            Grid::new(0, 3).unwrap_err(),
            GridError::InvalidDimensions { rows: 0, cols: 3 }
        );
        assert_eq!(
            Grid::new(1, 1).unwrap_err(),
            GridError::StartEqualsEnd(Position::new(0, 0))
        );
        assert!(Grid::new(1, 2).is_ok());
    }

    #[test]
    fn accessors_report_out_of_bounds() {
        let mut grid = Grid::new(3, 3).unwrap();
        let err = GridError::OutOfBounds {
            row: 3,
            col: 0,
            rows: 3,
            cols: 3,
        };
        assert_eq!(grid.cell_at(3, 0).unwrap_err(), err);
        assert_eq!(grid.set_kind(3, 0, CellKind::Wall).unwrap_err(), err);
    }

    #[test]
    fn moving_start_and_end() {
        let mut grid = Grid::new(3, 3).unwrap();
        grid.set_kind(1, 1, CellKind::Start).unwrap();
        grid.set_kind(0, 2, CellKind::End).unwrap();
        assert_eq!(grid.kind_at(0, 0), Ok(CellKind::Empty));
        assert_eq!(grid.kind_at(2, 2), Ok(CellKind::Empty));
        assert_eq!(grid.start_position(), Position::new(1, 1));
        assert_eq!(grid.end_position(), Position::new(0, 2));
        let starts = grid
            .cells
            .iter()
            .filter(|c| c.kind == CellKind::Start)
            .count();
        assert_eq!(starts, 1);
    }

    #[test]
    fn neighbours_are_ordered_and_skip_walls() {
        let mut grid = Grid::new(3, 3).unwrap();
        let center = Position::new(1, 1);
        assert_eq!(
            grid.neighbors(center),
            vec![
                Position::new(0, 1),
                Position::new(2, 1),
                Position::new(1, 0),
                Position::new(1, 2)
            ]
        );
        grid.set_kind(2, 1, CellKind::Wall).unwrap();
        assert_eq!(
            grid.neighbors(center),
            vec![Position::new(0, 1), Position::new(1, 0), Position::new(1, 2)]
        );
        assert_eq!(
            grid.neighbors(Position::new(0, 0)),
            vec![Position::new(1, 0), Position::new(0, 1)]
        );
    }

    #[test]
    fn clear_path_is_idempotent() {
        let mut grid = Grid::new(3, 3).unwrap();
        grid.set_kind(1, 1, CellKind::Wall).unwrap();
        {
            let cell = grid.cell_mut(Position::new(0, 1));
            cell.kind = CellKind::Visited;
            cell.cost_from_start = 3;
            cell.predecessor = Some(Position::new(0, 0));
        }
        grid.cell_mut(Position::new(1, 0)).kind = CellKind::Path;
        grid.clear_path();
        let once = grid.cells.clone();
        grid.clear_path();
        assert_eq!(grid.cells, once);
        assert_eq!(grid.kind_at(0, 1), Ok(CellKind::Empty));
        assert_eq!(grid.kind_at(1, 0), Ok(CellKind::Empty));
        assert_eq!(grid.kind_at(1, 1), Ok(CellKind::Wall));
        assert_eq!(grid.cell_at(0, 1).unwrap().predecessor, None);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut grid = Grid::new(3, 4).unwrap();
        grid.set_kind(1, 1, CellKind::Wall).unwrap();
        grid.set_kind(1, 2, CellKind::Start).unwrap();
        grid.reset();
        assert_eq!(grid.to_string(), Grid::new(3, 4).unwrap().to_string());
        assert_eq!(grid.start_position(), Position::new(0, 0));
    }

    /// Asserts that the two corners are connected on a 4-grid and split by a wall line.
    #[test]
    fn reachable_without_diagonals() {
        // |S  |
        // | # |
        // |  E|
        let mut grid = Grid::new(3, 3).unwrap();
        grid.set_kind(1, 1, CellKind::Wall).unwrap();
        let start = grid.start_position();
        let end = grid.end_position();
        assert!(grid.reachable(start, end));

        // |S# |
        // |#  |
        // |  E|
        grid.set_kind(0, 1, CellKind::Wall).unwrap();
        grid.set_kind(1, 0, CellKind::Wall).unwrap();
        assert!(!grid.reachable(start, end));

        // Removing a wall joins components without a full regeneration.
        grid.set_kind(1, 0, CellKind::Empty).unwrap();
        grid.set_kind(1, 1, CellKind::Empty).unwrap();
        assert!(grid.reachable(start, end));
    }

    #[test]
    fn display_and_parse() {
        let text = "S.#\n.##\n..E\n";
        let grid: Grid = text.parse().unwrap();
        assert_eq!(grid.to_string(), text);
        assert_eq!(grid.end_position(), Position::new(2, 2));
        assert_eq!(grid.kind_at(1, 1), Ok(CellKind::Wall));

        assert!(matches!(
            "S.\n.".parse::<Grid>(),
            Err(GridError::Parse { line: 2, .. })
        ));
        assert!(matches!(
            "S.\n.x".parse::<Grid>(),
            Err(GridError::Parse { line: 2, .. })
        ));
        assert!(matches!(
            "S.\n..".parse::<Grid>(),
            Err(GridError::Parse { line: 0, .. })
        ));
        assert!(matches!(
            "SS\n.E".parse::<Grid>(),
            Err(GridError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn path_validation() {
        let grid: Grid = "S#\n.E".parse().unwrap();
        let good = [Position::new(0, 0), Position::new(1, 0), Position::new(1, 1)];
        let through_wall = [Position::new(0, 0), Position::new(0, 1), Position::new(1, 1)];
        let jump = [Position::new(0, 0), Position::new(1, 1)];
        assert!(grid.is_valid_path(&good));
        assert!(!grid.is_valid_path(&through_wall));
        assert!(!grid.is_valid_path(&jump));
        assert!(!grid.is_valid_path(&[]));
    }
}
