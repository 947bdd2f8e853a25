use std::cmp::Ordering;
use std::collections::BinaryHeap;

use fxhash::{FxBuildHasher, FxHashSet};
use indexmap::IndexMap;

use crate::{
    solver::{reconstruct_path, visit, GridSolver, SearchObserver, SearchOutcome},
    CancelToken, Grid, Position,
};

type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;

/// Ordering keys of a cell in the open set. The sequence number is assigned when the cell first
/// enters the open set and survives updates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct OpenEntry {
    total_estimate: u32,
    heuristic_estimate: u32,
    sequence: usize,
}

/// Heap entry. Smaller total estimates pop first, then smaller heuristic estimates, then the cell
/// that was opened earliest.
struct SmallestCostHolder {
    entry: OpenEntry,
    position: Position,
}

impl Eq for SmallestCostHolder {}

impl PartialEq for SmallestCostHolder {
    fn eq(&self, other: &Self) -> bool {
        self.entry == other.entry
    }
}

impl PartialOrd for SmallestCostHolder {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SmallestCostHolder {
    fn cmp(&self, other: &Self) -> Ordering {
        let key = |e: &OpenEntry| (e.total_estimate, e.heuristic_estimate, e.sequence);
        key(&other.entry).cmp(&key(&self.entry))
    }
}

/// The open set: one [OpenEntry] per open cell plus a heap over those entries. Updating a cell
/// replaces its entry and pushes a new heap item; items that no longer match the entry of their
/// cell are skipped when popped.
#[derive(Default)]
struct OpenSet {
    entries: FxIndexMap<Position, OpenEntry>,
    heap: BinaryHeap<SmallestCostHolder>,
    sequence: usize,
}

impl OpenSet {
    fn insert(&mut self, position: Position, total_estimate: u32, heuristic_estimate: u32) {
        let entry = OpenEntry {
            total_estimate,
            heuristic_estimate,
            sequence: self.sequence,
        };
        self.sequence += 1;
        self.entries.insert(position, entry);
        self.heap.push(SmallestCostHolder { entry, position });
    }

    fn contains(&self, position: &Position) -> bool {
        self.entries.contains_key(position)
    }

    /// Lowers the total estimate of an open cell, keeping its place among equal keys.
    fn decrease(&mut self, position: Position, total_estimate: u32) {
        if let Some(entry) = self.entries.get_mut(&position) {
            entry.total_estimate = total_estimate;
            let entry = *entry;
            self.heap.push(SmallestCostHolder { entry, position });
        }
    }

    fn pop_best(&mut self) -> Option<Position> {
        while let Some(SmallestCostHolder { entry, position }) = self.heap.pop() {
            if self.entries.get(&position) != Some(&entry) {
                continue;
            }
            self.entries.swap_remove(&position);
            return Some(position);
        }
        None
    }
}

/// A* with the [Manhattan distance](https://en.wikipedia.org/wiki/Taxicab_geometry) to the end as
/// heuristic, which is consistent on a uniform-cost 4-connected grid.
///
/// The open set is ordered by total estimate, then by heuristic estimate, then by insertion.
/// When a cheaper route to an open cell is found the cell is updated in place instead of being
/// added again. Closed cells are never reopened.
#[derive(Clone, Debug)]
pub struct AstarSolver {
    /// Scales the heuristic. Found paths are only guaranteed to be shortest for factors of at
    /// most 1.0; larger values trade optimality for fewer expansions.
    pub heuristic_factor: f32,
}

impl Default for AstarSolver {
    fn default() -> AstarSolver {
        AstarSolver::new()
    }
}

impl AstarSolver {
    pub fn new() -> AstarSolver {
        AstarSolver {
            heuristic_factor: 1.0,
        }
    }

    /// Just the Manhattan distance times the heuristic factor.
    pub fn heuristic(&self, p1: &Position, p2: &Position) -> u32 {
        (p1.manhattan_distance(p2) as f32 * self.heuristic_factor) as u32
    }
}

impl GridSolver for AstarSolver {
    fn name(&self) -> &'static str {
        "A*"
    }

    fn search<O: SearchObserver>(
        &self,
        grid: &mut Grid,
        observer: &mut O,
        cancel: &CancelToken,
    ) -> SearchOutcome {
        let start = grid.start_position();
        let end = grid.end_position();
        let mut open = OpenSet::default();
        let mut closed = FxHashSet::default();

        let h = self.heuristic(&start, &end);
        let start_cell = grid.cell_mut(start);
        start_cell.cost_from_start = 0;
        start_cell.heuristic_estimate = h;
        start_cell.total_estimate = h;
        open.insert(start, h, h);

        loop {
            if cancel.is_canceled() {
                return SearchOutcome::Canceled;
            }
            let Some(current) = open.pop_best() else {
                return SearchOutcome::NotFound;
            };
            if current == end {
                return reconstruct_path(grid, observer);
            }
            closed.insert(current);
            if current != start {
                visit(grid, current, observer);
                if cancel.is_canceled() {
                    return SearchOutcome::Canceled;
                }
            }

            let tentative_cost = grid.cell(current).cost_from_start + 1;
            for neighbour in grid.neighbors(current) {
                if closed.contains(&neighbour) {
                    continue;
                }
                if open.contains(&neighbour) {
                    let cell = grid.cell_mut(neighbour);
                    if tentative_cost < cell.cost_from_start {
                        cell.cost_from_start = tentative_cost;
                        cell.total_estimate = tentative_cost + cell.heuristic_estimate;
                        cell.predecessor = Some(current);
                        open.decrease(neighbour, cell.total_estimate);
                    }
                } else {
                    let h = self.heuristic(&neighbour, &end);
                    let cell = grid.cell_mut(neighbour);
                    cell.cost_from_start = tentative_cost;
                    cell.heuristic_estimate = h;
                    cell.total_estimate = tentative_cost + h;
                    cell.predecessor = Some(current);
                    open.insert(neighbour, cell.total_estimate, h);
                }
            }
        }
    }
}
