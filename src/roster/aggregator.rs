use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDate;

use crate::error::DataIntegrityError;
use crate::roster::model::{
    Assignment, Position, PositionId, PositionKey, Task, TaskId, Worker, WorkerId,
    EMPTY_POSITION_NAME,
};
use crate::roster::table::{RowKind, ScheduleRow, ScheduleTable};

/// Running hour totals per date for a single row.
type DateTotals = HashMap<NaiveDate, u64>;

/// Accumulator for one position (or the Empty Position bucket) and the
/// indices of its workers, in input order.
#[derive(Debug)]
struct PositionGroup<'a> {
    label: &'a str,
    workers: Vec<usize>,
    totals: DateTotals,
}

impl<'a> PositionGroup<'a> {
    fn new(label: &'a str) -> Self {
        Self {
            label,
            workers: Vec::new(),
            totals: DateTotals::new(),
        }
    }
}

/// Build the schedule table from the four input collections.
///
/// Makes one pass over `assignments`. Each assignment's hours are added to
/// its worker and to the position that worker belongs to; the task only
/// contributes the date (and the default hours). Positions are emitted in
/// input order with the Empty Position bucket last, each followed by its
/// workers in input order. Every row carries an entry for every date seen.
///
/// # Errors
///
/// Returns [`DataIntegrityError`] when an assignment references a worker or
/// task that is not in the input, when a worker references an unknown
/// position, or when ids are duplicated.
pub fn build_schedule_table(
    positions: &[Position],
    workers: &[Worker],
    tasks: &[Task],
    assignments: &[Assignment],
) -> Result<ScheduleTable, DataIntegrityError> {
    let mut groups: Vec<PositionGroup<'_>> = Vec::with_capacity(positions.len() + 1);
    let mut group_index: HashMap<PositionId, usize> = HashMap::with_capacity(positions.len());
    for position in positions {
        if group_index.insert(position.id, groups.len()).is_some() {
            return Err(DataIntegrityError::DuplicatePosition(position.id));
        }
        groups.push(PositionGroup::new(&position.name));
    }
    let empty_group = groups.len();
    groups.push(PositionGroup::new(EMPTY_POSITION_NAME));

    // worker id -> (index into `workers`, owning group)
    let mut worker_index: HashMap<WorkerId, (usize, usize)> = HashMap::with_capacity(workers.len());
    for (idx, worker) in workers.iter().enumerate() {
        let group = match worker.position {
            PositionKey::Assigned(position_id) => *group_index.get(&position_id).ok_or(
                DataIntegrityError::UnknownPosition {
                    worker_id: worker.id,
                    position_id,
                },
            )?,
            PositionKey::Unassigned => empty_group,
        };
        if worker_index.insert(worker.id, (idx, group)).is_some() {
            return Err(DataIntegrityError::DuplicateWorker(worker.id));
        }
        groups[group].workers.push(idx);
    }

    let mut task_index: HashMap<TaskId, &Task> = HashMap::with_capacity(tasks.len());
    for task in tasks {
        if task_index.insert(task.id, task).is_some() {
            return Err(DataIntegrityError::DuplicateTask(task.id));
        }
    }

    let mut worker_totals: Vec<DateTotals> = vec![DateTotals::new(); workers.len()];
    let mut dates: BTreeSet<NaiveDate> = BTreeSet::new();

    for (n, assignment) in assignments.iter().enumerate() {
        let task = task_index
            .get(&assignment.task_id)
            .ok_or(DataIntegrityError::MissingTask {
                assignment: n,
                task_id: assignment.task_id,
            })?;
        let &(worker, group) =
            worker_index
                .get(&assignment.worker_id)
                .ok_or(DataIntegrityError::MissingWorker {
                    assignment: n,
                    worker_id: assignment.worker_id,
                })?;

        let hours = u64::from(assignment.worked_hours(task));
        if hours > u64::from(task.required_hours) {
            tracing::debug!(
                task_id = %task.id,
                worker_id = %assignment.worker_id,
                hours,
                required = task.required_hours,
                "Assignment exceeds task's required hours"
            );
        }

        *worker_totals[worker].entry(task.date).or_insert(0) += hours;
        *groups[group].totals.entry(task.date).or_insert(0) += hours;
        dates.insert(task.date);
    }

    let dates: Vec<NaiveDate> = dates.into_iter().collect();
    let fill = |totals: &DateTotals| -> BTreeMap<NaiveDate, u64> {
        dates
            .iter()
            .map(|d| (*d, totals.get(d).copied().unwrap_or(0)))
            .collect()
    };

    let mut rows = Vec::with_capacity(groups.len() + workers.len());
    for (idx, group) in groups.iter().enumerate() {
        // The synthetic bucket only shows up when someone is in it.
        if idx == empty_group && group.workers.is_empty() {
            continue;
        }
        rows.push(ScheduleRow {
            label: group.label.to_string(),
            kind: RowKind::Position,
            hours: fill(&group.totals),
        });
        for &w in &group.workers {
            rows.push(ScheduleRow {
                label: workers[w].name.clone(),
                kind: RowKind::Worker,
                hours: fill(&worker_totals[w]),
            });
        }
    }

    tracing::debug!(
        rows = rows.len(),
        columns = dates.len(),
        assignments = assignments.len(),
        "Built schedule table"
    );

    Ok(ScheduleTable { dates, rows })
}
