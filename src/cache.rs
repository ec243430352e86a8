use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::OnceCell;

use crate::config::CacheConfig;
use crate::roster::ScheduleTable;
use crate::source::SnapshotVersion;

type Cell = Arc<OnceCell<Arc<ScheduleTable>>>;

#[derive(Debug, Default)]
struct Entries {
    cells: HashMap<SnapshotVersion, Cell>,
    /// Insertion order, oldest first.
    order: VecDeque<SnapshotVersion>,
}

/// Memoizes schedule tables by snapshot version.
///
/// At most one build runs per version; concurrent callers for the same
/// version wait on it and share the result. Failed builds are not stored.
#[derive(Debug)]
pub struct ScheduleCache {
    config: CacheConfig,
    entries: Mutex<Entries>,
}

impl Default for ScheduleCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl ScheduleCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            entries: Mutex::new(Entries::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn cell(&self, version: &SnapshotVersion) -> Cell {
        let mut entries = self.lock();
        if let Some(cell) = entries.cells.get(version) {
            return cell.clone();
        }

        let cell: Cell = Arc::new(OnceCell::new());
        entries.cells.insert(version.clone(), cell.clone());
        entries.order.push_back(version.clone());
        cell
    }

    /// Drop the oldest entries other than `keep` until the cache fits.
    fn evict_over_capacity(&self, keep: &SnapshotVersion) {
        let mut entries = self.lock();
        let max_entries = self.config.max_entries.max(1);
        while entries.order.len() > max_entries {
            let Some(idx) = entries.order.iter().position(|v| v != keep) else {
                break;
            };
            if let Some(oldest) = entries.order.remove(idx) {
                entries.cells.remove(&oldest);
                tracing::debug!(version = oldest.short(), "Evicted cached schedule");
            }
        }
    }

    /// Forget `cell` if it is still the unbuilt entry for `version`.
    fn discard_failed(&self, version: &SnapshotVersion, cell: &Cell) {
        let mut entries = self.lock();
        let unbuilt = entries
            .cells
            .get(version)
            .is_some_and(|current| Arc::ptr_eq(current, cell) && !current.initialized());
        if unbuilt {
            entries.cells.remove(version);
            entries.order.retain(|v| v != version);
            tracing::debug!(version = version.short(), "Discarded failed schedule build");
        }
    }

    /// Return the table cached for `version`, running `build` if there is
    /// none yet. Older entries are evicted only once a build succeeds.
    pub async fn get_or_build<F, Fut, E>(
        &self,
        version: &SnapshotVersion,
        build: F,
    ) -> Result<Arc<ScheduleTable>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ScheduleTable, E>>,
    {
        let cell = self.cell(version);
        if let Some(table) = cell.get() {
            tracing::debug!(version = version.short(), "Schedule cache hit");
            return Ok(table.clone());
        }

        let built = cell
            .get_or_try_init(|| async move {
                tracing::debug!(version = version.short(), "Schedule cache miss");
                build().await.map(Arc::new)
            })
            .await;

        match built {
            Ok(table) => {
                let table = table.clone();
                self.evict_over_capacity(version);
                Ok(table)
            }
            Err(e) => {
                self.discard_failed(version, &cell);
                Err(e)
            }
        }
    }

    pub fn get(&self, version: &SnapshotVersion) -> Option<Arc<ScheduleTable>> {
        self.lock()
            .cells
            .get(version)
            .and_then(|cell| cell.get().cloned())
    }

    /// Number of versions with a cell, built or in flight.
    pub fn len(&self) -> usize {
        self.lock().cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut entries = self.lock();
        entries.cells.clear();
        entries.order.clear();
    }
}
