use grid_pathviz::solver::{AstarSolver, GridSolver};
use grid_pathviz::{CancelToken, CellKind, Grid, Position};

// In this example a path is found on a 3x3 grid with shape
//  ___
// |S  |
// | # |
// |  E|
//  ___
// where
// - # marks an obstacle
// - S marks the start
// - E marks the end
//
// Nodes have a 4-neighborhood

fn main() {
    let mut grid = Grid::new(3, 3).unwrap();
    grid.set_kind(1, 1, CellKind::Wall).unwrap();
    println!("{}", grid);
    let outcome = AstarSolver::new()
        .run(
            &mut grid,
            &mut |p: Position| println!("Visited {}", p),
            &CancelToken::new(),
        )
        .unwrap();
    println!("Path:");
    for p in outcome.path().unwrap_or_default() {
        println!("{:?}", p);
    }
    println!("{}", grid);
}
