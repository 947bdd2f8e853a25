//! Runs searches on a worker thread so a presentation layer stays responsive.
//!
//! A [SearchWorker] takes ownership of the [Grid] for the duration of one run and hands it back
//! when joined. Progress is streamed as [SearchEvent]s. A [Session] owns the grid between runs
//! and makes sure at most one worker is active: a new run, a clear or a reset first cancels the
//! running worker and waits for it to hand the grid back.
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, info, warn};

use crate::solver::{Algorithm, SearchObserver, SearchOutcome};
use crate::{CancelToken, CellKind, Grid, GridError, Position, SessionError};

/// Progress of a worker, in the order it happened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchEvent {
    Visited(Position),
    PathMarked(Vec<Position>),
    Finished(SearchOutcome),
}

/// Settings for a [Session]. The defaults match an interactive 30x30 board.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    pub rows: usize,
    pub cols: usize,
    /// Pause after every visited cell so a viewer can follow along. Zero disables pacing.
    pub step_delay: Duration,
    pub algorithm: Algorithm,
}

impl Default for SessionConfig {
    fn default() -> SessionConfig {
        SessionConfig {
            rows: 30,
            cols: 30,
            step_delay: Duration::from_millis(10),
            algorithm: Algorithm::default(),
        }
    }
}

/// Forwards progress to the event channel and applies the step delay.
struct ThrottledObserver {
    events: Sender<SearchEvent>,
    step_delay: Duration,
    cancel: CancelToken,
}

impl SearchObserver for ThrottledObserver {
    fn on_step(&mut self, position: Position) {
        // A dropped receiver just means nobody is rendering any more.
        let _ = self.events.send(SearchEvent::Visited(position));
        if !self.step_delay.is_zero() && !self.cancel.is_canceled() {
            thread::sleep(self.step_delay);
        }
    }

    fn on_path(&mut self, path: &[Position]) {
        let _ = self.events.send(SearchEvent::PathMarked(path.to_vec()));
    }
}

/// What a joined worker hands back: the grid and the result of the run.
pub type WorkerResult = (Grid, Result<SearchOutcome, GridError>);

/// A search running on its own thread.
pub struct SearchWorker {
    algorithm: Algorithm,
    cancel: CancelToken,
    events: Receiver<SearchEvent>,
    handle: JoinHandle<WorkerResult>,
}

impl SearchWorker {
    pub fn spawn(mut grid: Grid, algorithm: Algorithm, step_delay: Duration) -> SearchWorker {
        let cancel = CancelToken::new();
        let (sender, events) = mpsc::channel();
        let mut observer = ThrottledObserver {
            events: sender.clone(),
            step_delay,
            cancel: cancel.clone(),
        };
        let token = cancel.clone();
        let handle = thread::spawn(move || {
            let result = algorithm.run(&mut grid, &mut observer, &token);
            if let Ok(outcome) = &result {
                let _ = sender.send(SearchEvent::Finished(outcome.clone()));
            }
            (grid, result)
        });
        debug!("Spawned {} worker with a step delay of {:?}", algorithm, step_delay);
        SearchWorker {
            algorithm,
            cancel,
            events,
            handle,
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Whether the run is over and [join](Self::join) will not block.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// The event stream. Iterating it blocks until the worker is done.
    pub fn events(&self) -> &Receiver<SearchEvent> {
        &self.events
    }

    /// Drains the events that are already available without blocking.
    pub fn try_events(&self) -> Vec<SearchEvent> {
        self.events.try_iter().collect()
    }

    /// Asks the run to stop and waits until it has released the grid.
    pub fn cancel(self) -> Result<WorkerResult, SessionError> {
        info!("Canceling {} worker", self.algorithm);
        self.cancel.cancel();
        self.join()
    }

    pub fn join(self) -> Result<WorkerResult, SessionError> {
        let algorithm = self.algorithm;
        self.handle.join().map_err(|_| {
            warn!("{} worker panicked", algorithm);
            SessionError::WorkerPanicked
        })
    }
}

/// A single visualization: one grid and at most one search running over it.
pub struct Session {
    config: SessionConfig,
    dimensions: (usize, usize),
    grid: Option<Grid>,
    worker: Option<SearchWorker>,
}

impl Session {
    pub fn new(config: SessionConfig) -> Result<Session, GridError> {
        let grid = Grid::new(config.rows, config.cols)?;
        Ok(Session {
            dimensions: grid.dimensions(),
            config,
            grid: Some(grid),
            worker: None,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn set_algorithm(&mut self, algorithm: Algorithm) {
        self.config.algorithm = algorithm;
    }

    pub fn set_step_delay(&mut self, step_delay: Duration) {
        self.config.step_delay = step_delay;
    }

    /// Whether a worker holds the grid. This stays true after the run ends until the worker is
    /// joined through [wait](Self::wait) or [stop](Self::stop).
    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// The grid, unless it is lent to a worker.
    pub fn grid(&self) -> Result<&Grid, SessionError> {
        self.grid.as_ref().ok_or(SessionError::Busy)
    }

    fn grid_mut(&mut self) -> Result<&mut Grid, SessionError> {
        self.grid.as_mut().ok_or(SessionError::Busy)
    }

    /// Edits a cell. Refused while a search is running.
    pub fn set_kind(&mut self, row: usize, col: usize, kind: CellKind) -> Result<(), SessionError> {
        self.grid_mut()?.set_kind(row, col, kind)?;
        Ok(())
    }

    /// Starts the configured algorithm on a worker, stopping the previous run first. A grid
    /// whose start and end coincide is rejected here and stays with the session.
    pub fn find_path(&mut self) -> Result<(), SessionError> {
        self.stop()?;
        self.grid()?.validate()?;
        let grid = self.grid.take().ok_or(SessionError::Busy)?;
        self.worker = Some(SearchWorker::spawn(
            grid,
            self.config.algorithm,
            self.config.step_delay,
        ));
        Ok(())
    }

    /// Events the running worker produced since the last call.
    pub fn poll_events(&self) -> Vec<SearchEvent> {
        self.worker
            .as_ref()
            .map(SearchWorker::try_events)
            .unwrap_or_default()
    }

    /// Waits for the running search to end on its own. Returns `None` when nothing was running.
    pub fn wait(&mut self) -> Result<Option<SearchOutcome>, SessionError> {
        match self.worker.take() {
            Some(worker) => Ok(Some(self.reclaim(worker.join())??)),
            None => Ok(None),
        }
    }

    /// Cancels the running search and waits until it gives the grid back. Returns `None` when
    /// nothing was running or the run was rejected; only a lost grid is an error here, so the
    /// controls that call this can always go on to edit the grid.
    pub fn stop(&mut self) -> Result<Option<SearchOutcome>, SessionError> {
        match self.worker.take() {
            Some(worker) => match self.reclaim(worker.cancel())? {
                Ok(outcome) => Ok(Some(outcome)),
                Err(err) => {
                    debug!("Dropping the result of the stopped run: {}", err);
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// Takes the grid back from a joined worker, or starts over with an empty one when the
    /// worker panicked while holding it.
    fn reclaim(
        &mut self,
        joined: Result<WorkerResult, SessionError>,
    ) -> Result<Result<SearchOutcome, GridError>, SessionError> {
        match joined {
            Ok((grid, result)) => {
                self.grid = Some(grid);
                Ok(result)
            }
            Err(err) => {
                let (rows, cols) = self.dimensions;
                self.grid = Some(Grid::new(rows, cols)?);
                Err(err)
            }
        }
    }

    /// Stops any running search and removes its marks from the grid.
    pub fn clear_path(&mut self) -> Result<(), SessionError> {
        self.stop()?;
        self.grid_mut()?.clear_path();
        Ok(())
    }

    /// Stops any running search and restores an empty board.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        self.stop()?;
        self.grid_mut()?.reset();
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.cancel_token().cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_interactive_board() {
        let config = SessionConfig::default();
        assert_eq!((config.rows, config.cols), (30, 30));
        assert_eq!(config.step_delay, Duration::from_millis(10));
        assert_eq!(config.algorithm, Algorithm::AStar);
    }

    #[test]
    fn invalid_dimensions_are_rejected() {
        let config = SessionConfig {
            rows: 0,
            ..SessionConfig::default()
        };
        assert_eq!(
            Session::new(config).err(),
            Some(GridError::InvalidDimensions { rows: 0, cols: 30 })
        );
    }

    #[test]
    fn stop_without_worker_is_a_no_op() {
        let mut session = Session::new(SessionConfig::default()).unwrap();
        assert_eq!(session.stop(), Ok(None));
        assert_eq!(session.wait(), Ok(None));
        assert!(session.poll_events().is_empty());
        assert!(!session.is_running());
    }
}
