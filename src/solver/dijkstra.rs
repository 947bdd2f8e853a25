use std::cmp::Ordering;
use std::collections::BinaryHeap;

use fxhash::FxHashSet;

use crate::{
    solver::{reconstruct_path, visit, GridSolver, SearchObserver, SearchOutcome},
    CancelToken, Grid, Position,
};

/// Heap entry. Entries with equal cost pop in the order they were pushed.
struct SmallestCostHolder {
    cost: u32,
    sequence: usize,
    position: Position,
}

impl Eq for SmallestCostHolder {}

impl PartialEq for SmallestCostHolder {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost && self.sequence == other.sequence
    }
}

impl PartialOrd for SmallestCostHolder {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SmallestCostHolder {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so that the max-heap pops the cheapest, oldest entry first
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Dijkstra's algorithm with unit edge costs.
///
/// Improving a cell's cost pushes another heap entry instead of updating the old one. Entries of
/// cells that are already closed are skipped when popped.
///
/// A cell counts as discovered once it has a predecessor, not once its cost is non-zero, so the
/// zero cost of the start is never mistaken for "not yet reached".
#[derive(Clone, Copy, Debug, Default)]
pub struct DijkstraSolver;

impl GridSolver for DijkstraSolver {
    fn name(&self) -> &'static str {
        "Dijkstra"
    }

    fn search<O: SearchObserver>(
        &self,
        grid: &mut Grid,
        observer: &mut O,
        cancel: &CancelToken,
    ) -> SearchOutcome {
        let start = grid.start_position();
        let end = grid.end_position();
        let mut to_see = BinaryHeap::new();
        let mut sequence = 0;
        let mut closed = FxHashSet::default();
        grid.cell_mut(start).cost_from_start = 0;
        to_see.push(SmallestCostHolder {
            cost: 0,
            sequence,
            position: start,
        });

        loop {
            if cancel.is_canceled() {
                return SearchOutcome::Canceled;
            }
            let Some(SmallestCostHolder {
                position: current, ..
            }) = to_see.pop()
            else {
                return SearchOutcome::NotFound;
            };
            if !closed.insert(current) {
                continue;
            }
            if current == end {
                return reconstruct_path(grid, observer);
            }
            if current != start {
                visit(grid, current, observer);
                if cancel.is_canceled() {
                    return SearchOutcome::Canceled;
                }
            }

            let new_cost = grid.cell(current).cost_from_start + 1;
            for neighbour in grid.neighbors(current) {
                if closed.contains(&neighbour) {
                    continue;
                }
                let cell = grid.cell_mut(neighbour);
                if cell.predecessor.is_none() || new_cost < cell.cost_from_start {
                    cell.cost_from_start = new_cost;
                    cell.predecessor = Some(current);
                    sequence += 1;
                    to_see.push(SmallestCostHolder {
                        cost: new_cost,
                        sequence,
                        position: neighbour,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heap_pops_cheapest_then_oldest() {
        let mut heap = BinaryHeap::new();
        for (cost, sequence) in [(2, 0), (1, 1), (1, 2), (0, 3)] {
            heap.push(SmallestCostHolder {
                cost,
                sequence,
                position: Position::new(0, sequence),
            });
        }
        let order = std::iter::from_fn(|| heap.pop().map(|h| h.sequence)).collect::<Vec<_>>();
        assert_eq!(order, vec![3, 1, 2, 0]);
    }

    /// Asserts that the optimal 5 cell solution is found around a central obstacle.
    #[test]
    fn solve_simple_problem() {
        // |S  |
        // | # |
        // |  E|
        let mut grid: Grid = "S..\n.#.\n..E".parse().unwrap();
        let outcome = DijkstraSolver
            .run(&mut grid, &mut |_: Position| {}, &CancelToken::new())
            .unwrap();
        assert_eq!(outcome.path().unwrap().len(), 5);
        assert_eq!(grid.cell_at(2, 2).unwrap().cost_from_start, 4);
    }

    /// The start keeps its zero cost and its missing predecessor while its neighbours are
    /// expanded.
    #[test]
    fn start_is_never_rediscovered() {
        let mut grid = Grid::new(2, 3).unwrap();
        let outcome = DijkstraSolver
            .run(&mut grid, &mut |_: Position| {}, &CancelToken::new())
            .unwrap();
        assert!(outcome.is_found());
        let start = grid.cell_at(0, 0).unwrap();
        assert_eq!(start.cost_from_start, 0);
        assert_eq!(start.predecessor, None);
    }
}
