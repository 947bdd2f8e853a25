use std::time::Duration;

use grid_pathviz::session::{SearchEvent, Session, SessionConfig};
use grid_pathviz::solver::{Algorithm, SearchOutcome};
use grid_pathviz::CellKind;

// Runs every algorithm on the same board through a paced session and redraws the board in the
// terminal while the worker explores it. Set RUST_LOG=info to see the solver log.
//
// The board is 12x20 with a vertical wall down column 10 and a horizontal wall along row 6, so
// the start in the lower left has to go around the east end of row 6 to reach the end in the
// upper right.

fn main() {
    env_logger::init();

    let config = SessionConfig {
        rows: 12,
        cols: 20,
        step_delay: Duration::from_millis(15),
        ..SessionConfig::default()
    };
    let mut session = Session::new(config).unwrap();
    for row in 0..9 {
        session.set_kind(row, 10, CellKind::Wall).unwrap();
    }
    for col in 3..17 {
        session.set_kind(6, col, CellKind::Wall).unwrap();
    }
    session.set_kind(10, 4, CellKind::Start).unwrap();
    session.set_kind(2, 16, CellKind::End).unwrap();
    let board = session.grid().unwrap().to_string();
    let board_rows = board.lines().map(|l| l.chars().collect::<Vec<_>>()).collect::<Vec<_>>();

    for algorithm in Algorithm::ALL {
        session.set_algorithm(algorithm);
        session.find_path().unwrap();
        let mut canvas = board_rows.clone();
        let mut visited = 0;
        loop {
            let mut finished = false;
            for event in session.poll_events() {
                match event {
                    SearchEvent::Visited(p) => {
                        canvas[p.row][p.col] = 'o';
                        visited += 1;
                    }
                    SearchEvent::PathMarked(path) => {
                        for p in &path[1..path.len() - 1] {
                            canvas[p.row][p.col] = '*';
                        }
                    }
                    SearchEvent::Finished(_) => finished = true,
                }
            }
            // Clear the terminal and redraw from the top-left corner
            println!("\x1B[2J\x1B[H{algorithm}, {visited} cells visited");
            for line in &canvas {
                println!("{}", line.iter().collect::<String>());
            }
            if finished {
                break;
            }
            std::thread::sleep(Duration::from_millis(30));
        }
        match session.wait().unwrap() {
            Some(SearchOutcome::Found(path)) => println!("Path of {} cells", path.len()),
            Some(SearchOutcome::NotFound) => println!("No path found!"),
            Some(SearchOutcome::Canceled) | None => {}
        }
        std::thread::sleep(Duration::from_millis(800));
    }
}
