use std::{path::PathBuf, result::Result as StdResult};

use thiserror::Error;

pub type Result<T> = StdResult<T, Error>;

/// An enum for describing and handling various errors encountered while
/// building a `GitDch`, or writing of changelogs.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to parse config file: {0}")]
    ConfigParse(PathBuf),

    #[error("cannot get current directory")]
    CurrentDir,

    #[error("fatal I/O error with output file")]
    Io(#[from] std::io::Error),

    #[error("failed to format changelog timestamp")]
    TimeFormat(#[from] time::error::Format),
}
