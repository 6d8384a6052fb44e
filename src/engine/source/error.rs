//! Metric Source Error Types

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("{0} is unreachable")]
    Unreachable(String),

    #[error("Unknown id in {source_name}: {id}")]
    UnknownId { source_name: String, id: String },

    #[error("No measurement available: {0}")]
    NoMeasurement(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid snapshot format: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SourceResult<T> = std::result::Result<T, SourceError>;
