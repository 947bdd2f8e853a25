use crate::Position;

/// What a cell currently shows. `Visited` and `Path` are search annotations that only ever
/// overlay cells that were `Empty`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CellKind {
    #[default]
    Empty,
    Wall,
    Start,
    End,
    Visited,
    Path,
}

impl CellKind {
    /// Whether this kind is transient search state that [Grid::clear_path](crate::Grid::clear_path)
    /// removes.
    pub fn is_annotation(self) -> bool {
        matches!(self, CellKind::Visited | CellKind::Path)
    }

    pub(crate) fn symbol(self) -> char {
        match self {
            CellKind::Empty => '.',
            CellKind::Wall => '#',
            CellKind::Start => 'S',
            CellKind::End => 'E',
            CellKind::Visited => 'o',
            CellKind::Path => '*',
        }
    }

    pub(crate) fn from_symbol(symbol: char) -> Option<CellKind> {
        match symbol {
            '.' | 'o' | '*' => Some(CellKind::Empty),
            '#' => Some(CellKind::Wall),
            'S' => Some(CellKind::Start),
            'E' => Some(CellKind::End),
            _ => None,
        }
    }
}

/// A single grid cell together with the bookkeeping a search leaves behind on it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    pub position: Position,
    pub kind: CellKind,
    /// The cell this one was reached from during the last search.
    pub predecessor: Option<Position>,
    /// Number of steps from the start (g).
    pub cost_from_start: u32,
    /// Manhattan distance to the end (h), only filled in by A*.
    pub heuristic_estimate: u32,
    /// `cost_from_start + heuristic_estimate` (f), only filled in by A*.
    pub total_estimate: u32,
}

impl Cell {
    pub fn new(position: Position) -> Cell {
        Cell {
            position,
            kind: CellKind::Empty,
            predecessor: None,
            cost_from_start: 0,
            heuristic_estimate: 0,
            total_estimate: 0,
        }
    }

    pub fn is_wall(&self) -> bool {
        self.kind == CellKind::Wall
    }

    pub(crate) fn clear_search_state(&mut self) {
        self.predecessor = None;
        self.cost_from_start = 0;
        self.heuristic_estimate = 0;
        self.total_estimate = 0;
        if self.kind.is_annotation() {
            self.kind = CellKind::Empty;
        }
    }
}
