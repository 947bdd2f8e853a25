use thiserror::Error;

use crate::Position;

/// Errors raised by position-based grid accessors and by searches that are handed an unusable
/// grid.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// A grid needs at least one row and one column.
    #[error("invalid grid dimensions {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize },

    #[error("position ({row}, {col}) is outside the {rows}x{cols} grid")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    /// Start and end share a cell, which leaves nothing to search for.
    #[error("start and end are both at {0}")]
    StartEqualsEnd(Position),

    #[error("cannot parse grid at line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

/// Errors raised by [Session](crate::session::Session) when driving a worker.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error(transparent)]
    Grid(#[from] GridError),

    /// The grid is lent to a running search and cannot be read or edited.
    #[error("a search is running on the grid")]
    Busy,

    /// The worker thread panicked; the grid it held is lost.
    #[error("search worker panicked")]
    WorkerPanicked,
}
