use crate::{
    solver::{unweighted_search, FrontierOrder, GridSolver, SearchObserver, SearchOutcome},
    CancelToken, Grid,
};

/// Depth-first search with a stack frontier. Finds some path when one exists, but gives no
/// guarantee that it is a shortest one: that is a property of the algorithm, not a defect.
///
/// Neighbours are pushed in north, south, west, east order, so the east neighbour of a cell is
/// explored first.
#[derive(Clone, Copy, Debug, Default)]
pub struct DfsSolver;

impl GridSolver for DfsSolver {
    fn name(&self) -> &'static str {
        "DFS"
    }

    fn search<O: SearchObserver>(
        &self,
        grid: &mut Grid,
        observer: &mut O,
        cancel: &CancelToken,
    ) -> SearchOutcome {
        unweighted_search(grid, observer, cancel, FrontierOrder::Lifo)
    }
}
