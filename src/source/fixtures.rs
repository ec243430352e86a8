//! JSON fixture loading.
//!
//! Reads `positions.json`, `workers.json`, `tasks.json` and
//! `assignments.json` from a data directory. Each file must hold a JSON list.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};

use crate::error::LoadError;
use crate::source::{DataSource, Snapshot};

pub const POSITIONS_FILE: &str = "positions.json";
pub const WORKERS_FILE: &str = "workers.json";
pub const TASKS_FILE: &str = "tasks.json";
pub const ASSIGNMENTS_FILE: &str = "assignments.json";

/// Raw digest of the four files plus the snapshot parsed from them.
#[derive(Debug)]
struct Loaded {
    raw_digest: Vec<u8>,
    snapshot: Arc<Snapshot>,
}

/// Loads snapshots from a directory of JSON fixtures.
///
/// The files are re-read on every call, but they are only parsed again when
/// their bytes change.
#[derive(Debug)]
pub struct FixtureSource {
    data_dir: PathBuf,
    loaded: Mutex<Option<Loaded>>,
}

impl FixtureSource {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            loaded: Mutex::new(None),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Drop the retained snapshot so the next call parses from scratch.
    pub fn refresh(&self) {
        *self.lock() = None;
        tracing::info!(data_dir = %self.data_dir.display(), "Fixture cache cleared");
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Loaded>> {
        self.loaded.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn read_file(&self, name: &str) -> Result<(PathBuf, Vec<u8>), LoadError> {
        let path = self.data_dir.join(name);
        if !path.exists() {
            return Err(LoadError::NotFound(path));
        }
        let bytes = std::fs::read(&path).map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        })?;
        Ok((path, bytes))
    }
}

fn parse_list<T: DeserializeOwned>(path: &Path, bytes: &[u8]) -> Result<Vec<T>, LoadError> {
    let items: Vec<T> = serde_json::from_slice(bytes).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(file = %path.display(), count = items.len(), "Loaded fixture");
    Ok(items)
}

impl DataSource for FixtureSource {
    fn snapshot(&self) -> Result<Arc<Snapshot>, LoadError> {
        let positions = self.read_file(POSITIONS_FILE)?;
        let workers = self.read_file(WORKERS_FILE)?;
        let tasks = self.read_file(TASKS_FILE)?;
        let assignments = self.read_file(ASSIGNMENTS_FILE)?;

        let mut hasher = Sha256::new();
        for (_, bytes) in [&positions, &workers, &tasks, &assignments] {
            hasher.update((bytes.len() as u64).to_le_bytes());
            hasher.update(bytes);
        }
        let raw_digest = hasher.finalize().to_vec();

        let mut loaded = self.lock();
        if let Some(current) = loaded.as_ref() {
            if current.raw_digest == raw_digest {
                tracing::debug!(
                    version = current.snapshot.version().short(),
                    "Fixtures unchanged"
                );
                return Ok(current.snapshot.clone());
            }
        }

        let snapshot = Arc::new(Snapshot::new(
            parse_list(&positions.0, &positions.1)?,
            parse_list(&workers.0, &workers.1)?,
            parse_list(&tasks.0, &tasks.1)?,
            parse_list(&assignments.0, &assignments.1)?,
        ));
        tracing::info!(
            version = snapshot.version().short(),
            positions = snapshot.positions().len(),
            workers = snapshot.workers().len(),
            tasks = snapshot.tasks().len(),
            assignments = snapshot.assignments().len(),
            "Loaded schedule snapshot"
        );

        *loaded = Some(Loaded {
            raw_digest,
            snapshot: snapshot.clone(),
        });
        Ok(snapshot)
    }
}
