use std::path::PathBuf;

use thiserror::Error;

use tgsim::DataError;

/// Something the user picked doesn't make sense.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("invalid time window {0:?}")]
    InvalidTimeWindow(String),
    #[error("invalid lane {0:?}")]
    InvalidLane(String),
    #[error("no vehicles selected")]
    NoVehiclesSelected,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error("couldn't write {}: {source}", .path.display())]
    Export {
        path: PathBuf,
        source: std::io::Error,
    },
}
