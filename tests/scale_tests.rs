
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use roster_lite::cache::ScheduleCache;
use roster_lite::roster::{build_schedule_table, Task, TaskId};
use roster_lite::service::ScheduleService;
use roster_lite::source::{InMemorySource, Snapshot};
use test_harness::{shaped_snapshot, RosterShape};

/// Loose enough for unoptimised builds on a busy CI host.
const BUILD_LIMIT: Duration = Duration::from_secs(10);

fn assigned_hours(snapshot: &Snapshot) -> u64 {
    let tasks: HashMap<TaskId, &Task> = snapshot.tasks().iter().map(|t| (t.id, t)).collect();
    snapshot
        .assignments()
        .iter()
        .map(|a| u64::from(a.worked_hours(tasks[&a.task_id])))
        .sum()
}

#[test]
fn test_large_roster_builds_within_limit() {
    let shape = RosterShape::LARGE;
    let snapshot = shaped_snapshot(7, shape);

    let started = Instant::now();
    let table = build_schedule_table(
        snapshot.positions(),
        snapshot.workers(),
        snapshot.tasks(),
        snapshot.assignments(),
    )
    .unwrap();
    let elapsed = started.elapsed();

    assert!(elapsed < BUILD_LIMIT, "build took {:?}", elapsed);

    assert_eq!(table.total_hours(), assigned_hours(&snapshot));
    let worker_total: u64 = table.worker_rows().map(|r| r.total()).sum();
    assert_eq!(worker_total, table.total_hours());

    let has_unassigned = snapshot
        .workers()
        .iter()
        .any(|w| w.position.position_id().is_none());
    let positions = shape.positions as usize + usize::from(has_unassigned);
    assert_eq!(table.position_rows().count(), positions);
    assert_eq!(table.worker_rows().count(), shape.workers as usize);
    assert_eq!(table.rows.len(), positions + shape.workers as usize);

    assert!(table.dates.len() <= shape.days as usize);
    assert!(table.dates.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_large_roster_view_is_rectangular() {
    let snapshot = shaped_snapshot(11, RosterShape::LARGE);
    let table = build_schedule_table(
        snapshot.positions(),
        snapshot.workers(),
        snapshot.tasks(),
        snapshot.assignments(),
    )
    .unwrap();

    let view = table.to_view();
    assert_eq!(view.columns.len(), table.dates.len() + 1);
    assert_eq!(view.rows.len(), table.rows.len());
    assert!(view.rows.iter().all(|row| row.len() == view.columns.len()));
}

#[tokio::test]
async fn test_large_roster_served_from_cache() {
    let snapshot = shaped_snapshot(3, RosterShape::LARGE);
    let expected = assigned_hours(&snapshot);
    let service = ScheduleService::new(
        Arc::new(InMemorySource::new(snapshot)),
        ScheduleCache::default(),
    );

    let started = Instant::now();
    let first = service.schedule_table().await.unwrap();
    assert!(started.elapsed() < BUILD_LIMIT);
    assert_eq!(first.total_hours(), expected);

    let second = service.schedule_table().await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}
