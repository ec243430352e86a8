use std::sync::Arc;

use crate::cache::ScheduleCache;
use crate::error::{Result, RosterError};
use crate::roster::{build_schedule_table, ScheduleTable};
use crate::source::{DataSource, Snapshot};

/// Serves schedule tables: pulls a snapshot from the data source and
/// returns the cached table for its version, building it on a miss.
pub struct ScheduleService {
    source: Arc<dyn DataSource>,
    cache: ScheduleCache,
}

impl ScheduleService {
    pub fn new(source: Arc<dyn DataSource>, cache: ScheduleCache) -> Self {
        Self { source, cache }
    }

    pub fn cache(&self) -> &ScheduleCache {
        &self.cache
    }

    /// Current snapshot from the data source. File I/O runs on the
    /// blocking pool.
    pub async fn snapshot(&self) -> Result<Arc<Snapshot>> {
        let source = self.source.clone();
        let snapshot = tokio::task::spawn_blocking(move || source.snapshot())
            .await
            .map_err(|e| RosterError::Internal(format!("snapshot task failed: {}", e)))??;
        Ok(snapshot)
    }

    pub async fn schedule_table(&self) -> Result<Arc<ScheduleTable>> {
        let snapshot = self.snapshot().await?;
        let version = snapshot.version().clone();
        let short_version = version.short().to_string();

        self.cache
            .get_or_build(&version, || async move {
                let table = tokio::task::spawn_blocking(move || {
                    build_schedule_table(
                        snapshot.positions(),
                        snapshot.workers(),
                        snapshot.tasks(),
                        snapshot.assignments(),
                    )
                })
                .await
                .map_err(|e| RosterError::Internal(format!("aggregation task failed: {}", e)))??;

                tracing::info!(
                    version = %short_version,
                    rows = table.rows.len(),
                    columns = table.dates.len(),
                    total_hours = table.total_hours(),
                    "Built schedule table"
                );
                Ok::<_, RosterError>(table)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::{Assignment, Position, Task, Worker};
    use crate::source::InMemorySource;
    use chrono::NaiveDate;

    fn service(snapshot: Snapshot) -> ScheduleService {
        ScheduleService::new(
            Arc::new(InMemorySource::new(snapshot)),
            ScheduleCache::default(),
        )
    }

    #[tokio::test]
    async fn builds_and_caches_table() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 11).unwrap();
        let svc = service(Snapshot::new(
            vec![Position::new(1, "Position 1")],
            vec![Worker::new(1, "Worker 1", Some(1))],
            vec![Task::new(1, Some(1), d, 7)],
            vec![Assignment::new(1, 1).with_hours(3)],
        ));

        let a = svc.schedule_table().await.unwrap();
        let b = svc.schedule_table().await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(svc.cache().len(), 1);
        assert_eq!(a.total_hours(), 3);
    }

    #[tokio::test]
    async fn integrity_error_is_not_cached() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 11).unwrap();
        let svc = service(Snapshot::new(
            vec![],
            vec![Worker::new(1, "Worker 1", None)],
            vec![Task::new(1, None, d, 7)],
            vec![Assignment::new(1, 99)],
        ));

        let err = svc.schedule_table().await.unwrap_err();
        assert!(matches!(err, RosterError::DataIntegrity(_)));
        let snapshot = svc.snapshot().await.unwrap();
        assert!(svc.cache().get(snapshot.version()).is_none());
    }
}
