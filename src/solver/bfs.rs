use crate::{
    solver::{unweighted_search, FrontierOrder, GridSolver, SearchObserver, SearchOutcome},
    CancelToken, Grid,
};

/// Breadth-first search. Expands cells in order of their step count from the start, so the path
/// it finds has the fewest possible steps.
#[derive(Clone, Copy, Debug, Default)]
pub struct BfsSolver;

impl GridSolver for BfsSolver {
    fn name(&self) -> &'static str {
        "BFS"
    }

    fn search<O: SearchObserver>(
        &self,
        grid: &mut Grid,
        observer: &mut O,
        cancel: &CancelToken,
    ) -> SearchOutcome {
        unweighted_search(grid, observer, cancel, FrontierOrder::Fifo)
    }
}

#[cfg(test)]
mod tests {
    use crate::{CellKind, Position};

    use super::*;

    /// Asserts that cells are expanded in rings of equal distance from the start.
    #[test]
    fn expands_in_distance_order() {
        let mut grid = Grid::new(4, 4).unwrap();
        let mut steps = Vec::new();
        BfsSolver
            .run(&mut grid, &mut |p: Position| steps.push(p), &CancelToken::new())
            .unwrap();
        let start = grid.start_position();
        let distances = steps
            .iter()
            .map(|p| p.manhattan_distance(&start))
            .collect::<Vec<_>>();
        let mut sorted = distances.clone();
        sorted.sort();
        assert_eq!(distances, sorted);
        assert_eq!(&steps[..2], &[Position::new(1, 0), Position::new(0, 1)]);
    }

    #[test]
    fn costs_count_steps() {
        let mut grid = Grid::new(3, 4).unwrap();
        grid.set_kind(1, 1, CellKind::Wall).unwrap();
        let outcome = BfsSolver
            .run(&mut grid, &mut |_: Position| {}, &CancelToken::new())
            .unwrap();
        let path = outcome.path().unwrap();
        assert_eq!(path.len(), 6);
        for (steps, p) in path.iter().enumerate() {
            assert_eq!(grid.cell_at(p.row, p.col).unwrap().cost_from_start, steps as u32);
        }
    }
}
