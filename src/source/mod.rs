//! Data sources for the schedule inputs.
//!
//! A [`DataSource`] hands out immutable [`Snapshot`]s of the four input
//! collections. Each snapshot carries a [`SnapshotVersion`] derived from its
//! content, which the result cache uses as its key.

pub mod fixtures;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::LoadError;
use crate::roster::model::{Assignment, Position, Task, Worker};

pub use fixtures::FixtureSource;

/// Content digest of a snapshot (hex-encoded SHA-256).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotVersion(String);

impl SnapshotVersion {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex digits, for log lines.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl fmt::Display for SnapshotVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read-only set of the four input collections.
///
/// Fields are private so the version always matches the content it was
/// computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    version: SnapshotVersion,
    positions: Vec<Position>,
    workers: Vec<Worker>,
    tasks: Vec<Task>,
    assignments: Vec<Assignment>,
}

impl Snapshot {
    pub fn new(
        positions: Vec<Position>,
        workers: Vec<Worker>,
        tasks: Vec<Task>,
        assignments: Vec<Assignment>,
    ) -> Self {
        let version = content_version(&positions, &workers, &tasks, &assignments);
        Self {
            version,
            positions,
            workers,
            tasks,
            assignments,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new(), Vec::new(), Vec::new())
    }

    pub fn version(&self) -> &SnapshotVersion {
        &self.version
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn workers(&self) -> &[Worker] {
        &self.workers
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    /// Take the collections back out, dropping the version.
    pub fn into_parts(self) -> (Vec<Position>, Vec<Worker>, Vec<Task>, Vec<Assignment>) {
        (self.positions, self.workers, self.tasks, self.assignments)
    }
}

fn content_version(
    positions: &[Position],
    workers: &[Worker],
    tasks: &[Task],
    assignments: &[Assignment],
) -> SnapshotVersion {
    // Optional fields are tagged so that `None` and `Some(0)` hash apart.
    fn opt(hasher: &mut Sha256, value: Option<u64>) {
        match value {
            Some(v) => {
                hasher.update([1u8]);
                hasher.update(v.to_le_bytes());
            }
            None => hasher.update([0u8]),
        }
    }

    let mut hasher = Sha256::new();

    hasher.update(b"positions");
    hasher.update((positions.len() as u64).to_le_bytes());
    for p in positions {
        hasher.update(p.id.0.to_le_bytes());
        hasher.update((p.name.len() as u64).to_le_bytes());
        hasher.update(p.name.as_bytes());
    }

    hasher.update(b"workers");
    hasher.update((workers.len() as u64).to_le_bytes());
    for w in workers {
        hasher.update(w.id.0.to_le_bytes());
        hasher.update((w.name.len() as u64).to_le_bytes());
        hasher.update(w.name.as_bytes());
        opt(&mut hasher, w.position.position_id().map(|id| id.0));
    }

    hasher.update(b"tasks");
    hasher.update((tasks.len() as u64).to_le_bytes());
    for t in tasks {
        hasher.update(t.id.0.to_le_bytes());
        opt(&mut hasher, t.position.position_id().map(|id| id.0));
        hasher.update(t.date.to_string().as_bytes());
        hasher.update(t.required_hours.to_le_bytes());
    }

    hasher.update(b"assignments");
    hasher.update((assignments.len() as u64).to_le_bytes());
    for a in assignments {
        opt(&mut hasher, a.id.map(|id| id.0));
        hasher.update(a.worker_id.0.to_le_bytes());
        hasher.update(a.task_id.0.to_le_bytes());
        opt(&mut hasher, a.hours.map(u64::from));
    }

    SnapshotVersion(hex::encode(hasher.finalize()))
}

/// Supplies snapshots of the schedule inputs.
///
/// Implementations may do blocking I/O; callers on an async runtime should
/// invoke them from a blocking context.
pub trait DataSource: Send + Sync {
    fn snapshot(&self) -> Result<Arc<Snapshot>, LoadError>;
}

/// A data source over a fixed snapshot.
#[derive(Debug, Clone)]
pub struct InMemorySource {
    snapshot: Arc<Snapshot>,
}

impl InMemorySource {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot: Arc::new(snapshot),
        }
    }
}

impl DataSource for InMemorySource {
    fn snapshot(&self) -> Result<Arc<Snapshot>, LoadError> {
        Ok(self.snapshot.clone())
    }
}
