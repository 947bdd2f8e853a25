use core::fmt;
use std::collections::VecDeque;
use std::iter;

use fxhash::FxHashSet;
use log::{info, warn};

use crate::{CancelToken, CellKind, Grid, GridError, Position};

pub mod astar;
pub mod bfs;
pub mod dfs;
pub mod dijkstra;

pub use astar::AstarSolver;
pub use bfs::BfsSolver;
pub use dfs::DfsSolver;
pub use dijkstra::DijkstraSolver;

/// Receives the cells a search expands, in expansion order, and the final path. Any
/// `FnMut(Position)` closure is an observer that ignores the path.
pub trait SearchObserver {
    /// Called once for every expanded cell other than the start and the end, right after it
    /// was marked [CellKind::Visited]. The running search checks for cancellation when this
    /// returns, so it is the place to pace rendering.
    fn on_step(&mut self, position: Position);

    /// Called once after a found path has been marked on the grid.
    fn on_path(&mut self, _path: &[Position]) {}
}

impl<F: FnMut(Position)> SearchObserver for F {
    fn on_step(&mut self, position: Position) {
        self(position)
    }
}

/// How a single search run ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The path from start to end, both inclusive.
    Found(Vec<Position>),
    /// The frontier ran dry without reaching the end.
    NotFound,
    /// The run observed its [CancelToken] and stopped early. The grid keeps the annotations made
    /// so far.
    Canceled,
}

impl SearchOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, SearchOutcome::Found(_))
    }

    pub fn path(&self) -> Option<&[Position]> {
        match self {
            SearchOutcome::Found(path) => Some(path),
            _ => None,
        }
    }
}

/// A search over a [Grid] from its start to its end.
pub trait GridSolver {
    fn name(&self) -> &'static str;

    /// The algorithm body. The grid is already validated and cleared.
    fn search<O: SearchObserver>(
        &self,
        grid: &mut Grid,
        observer: &mut O,
        cancel: &CancelToken,
    ) -> SearchOutcome;

    /// Clears the previous search from `grid` and searches it again. Rejects grids whose start
    /// and end coincide before touching them.
    fn run<O: SearchObserver>(
        &self,
        grid: &mut Grid,
        observer: &mut O,
        cancel: &CancelToken,
    ) -> Result<SearchOutcome, GridError> {
        if let Err(err) = grid.validate() {
            warn!("{} not started: {}", self.name(), err);
            return Err(err);
        }
        grid.clear_path();
        info!(
            "Running {} from {} to {}",
            self.name(),
            grid.start_position(),
            grid.end_position()
        );
        let outcome = self.search(grid, observer, cancel);
        match &outcome {
            SearchOutcome::Found(path) => {
                info!("{} found a path of {} cells", self.name(), path.len())
            }
            SearchOutcome::NotFound => info!("{} exhausted the frontier", self.name()),
            SearchOutcome::Canceled => info!("{} was canceled", self.name()),
        }
        Ok(outcome)
    }
}

/// Selects one of the four solvers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Bfs,
    Dfs,
    Dijkstra,
    #[default]
    AStar,
}

impl Algorithm {
    pub const ALL: [Algorithm; 4] = [
        Algorithm::AStar,
        Algorithm::Dijkstra,
        Algorithm::Bfs,
        Algorithm::Dfs,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Bfs => BfsSolver.name(),
            Algorithm::Dfs => DfsSolver.name(),
            Algorithm::Dijkstra => DijkstraSolver.name(),
            Algorithm::AStar => AstarSolver::new().name(),
        }
    }

    /// Whether every path this algorithm finds is a shortest one. For A* this assumes the
    /// default heuristic factor of 1.0 that [run](Self::run) uses; an [AstarSolver] with a larger
    /// factor may return longer paths.
    pub fn is_optimal(self) -> bool {
        self != Algorithm::Dfs
    }

    pub fn run<O: SearchObserver>(
        self,
        grid: &mut Grid,
        observer: &mut O,
        cancel: &CancelToken,
    ) -> Result<SearchOutcome, GridError> {
        match self {
            Algorithm::Bfs => BfsSolver.run(grid, observer, cancel),
            Algorithm::Dfs => DfsSolver.run(grid, observer, cancel),
            Algorithm::Dijkstra => DijkstraSolver.run(grid, observer, cancel),
            Algorithm::AStar => AstarSolver::new().run(grid, observer, cancel),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Marks an expanded cell as visited and reports it. The start is expanded silently.
pub(crate) fn visit<O: SearchObserver>(grid: &mut Grid, position: Position, observer: &mut O) {
    if position == grid.start_position() || position == grid.end_position() {
        return;
    }
    grid.cell_mut(position).kind = CellKind::Visited;
    observer.on_step(position);
}

/// Follows predecessor links from the end back to the start, marks the cells in between as
/// [CellKind::Path] and reports the path.
pub(crate) fn reconstruct_path<O: SearchObserver>(
    grid: &mut Grid,
    observer: &mut O,
) -> SearchOutcome {
    let start = grid.start_position();
    let end = grid.end_position();
    let mut path = iter::successors(Some(end), |&p| {
        if p == start {
            None
        } else {
            grid.cell(p).predecessor
        }
    })
    .collect::<Vec<_>>();
    path.reverse();
    for &p in &path {
        if p != start && p != end {
            grid.cell_mut(p).kind = CellKind::Path;
        }
    }
    observer.on_path(&path);
    SearchOutcome::Found(path)
}

/// The end a frontier is taken from in an unweighted search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FrontierOrder {
    /// Queue, giving breadth-first search.
    Fifo,
    /// Stack, giving depth-first search.
    Lifo,
}

/// Shared loop of the unweighted searches. A cell is marked as discovered the moment it is first
/// seen, so it enters the frontier at most once.
pub(crate) fn unweighted_search<O: SearchObserver>(
    grid: &mut Grid,
    observer: &mut O,
    cancel: &CancelToken,
    order: FrontierOrder,
) -> SearchOutcome {
    let start = grid.start_position();
    let end = grid.end_position();
    let mut frontier = VecDeque::from([start]);
    let mut discovered = FxHashSet::default();
    discovered.insert(start);

    loop {
        if cancel.is_canceled() {
            return SearchOutcome::Canceled;
        }
        let next = match order {
            FrontierOrder::Fifo => frontier.pop_front(),
            FrontierOrder::Lifo => frontier.pop_back(),
        };
        let Some(current) = next else {
            return SearchOutcome::NotFound;
        };
        if current == end {
            return reconstruct_path(grid, observer);
        }
        if current != start {
            visit(grid, current, observer);
            if cancel.is_canceled() {
                return SearchOutcome::Canceled;
            }
        }

        let cost = grid.cell(current).cost_from_start + 1;
        for neighbour in grid.neighbors(current) {
            if discovered.insert(neighbour) {
                let cell = grid.cell_mut(neighbour);
                cell.predecessor = Some(current);
                cell.cost_from_start = cost;
                frontier.push_back(neighbour);
            }
        }
    }
}
