use std::path::PathBuf;

use thiserror::Error;

use crate::roster::model::{PositionId, TaskId, WorkerId};

/// Raised while building a schedule table when the input collections do not
/// reference each other consistently.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataIntegrityError {
    #[error("assignment #{assignment} references missing worker {worker_id}")]
    MissingWorker { assignment: usize, worker_id: WorkerId },

    #[error("assignment #{assignment} references missing task {task_id}")]
    MissingTask { assignment: usize, task_id: TaskId },

    #[error("worker {worker_id} references missing position {position_id}")]
    UnknownPosition {
        worker_id: WorkerId,
        position_id: PositionId,
    },

    #[error("duplicate position id {0}")]
    DuplicatePosition(PositionId),

    #[error("duplicate worker id {0}")]
    DuplicateWorker(WorkerId),

    #[error("duplicate task id {0}")]
    DuplicateTask(TaskId),
}

/// Failures reading the input collections from a data source.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Data file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Cannot read file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid data in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Error, Debug)]
pub enum RosterError {
    #[error("Data loading failed: {0}")]
    Load(#[from] LoadError),

    #[error("Schedule processing failed: {0}")]
    DataIntegrity(#[from] DataIntegrityError),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, RosterError>;
