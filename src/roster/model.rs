use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Label used for the synthetic bucket holding workers without a position.
pub const EMPTY_POSITION_NAME: &str = "Empty Position";

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(PositionId);
id_type!(WorkerId);
id_type!(TaskId);
id_type!(AssignmentId);

/// Which position a worker or task belongs to.
///
/// Serialized as a nullable position id; `null` maps to `Unassigned`, the
/// "Empty Position" bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<PositionId>", into = "Option<PositionId>")]
pub enum PositionKey {
    Assigned(PositionId),
    #[default]
    Unassigned,
}

impl PositionKey {
    pub fn position_id(&self) -> Option<PositionId> {
        match self {
            PositionKey::Assigned(id) => Some(*id),
            PositionKey::Unassigned => None,
        }
    }
}

impl From<Option<PositionId>> for PositionKey {
    fn from(value: Option<PositionId>) -> Self {
        match value {
            Some(id) => PositionKey::Assigned(id),
            None => PositionKey::Unassigned,
        }
    }
}

impl From<PositionKey> for Option<PositionId> {
    fn from(key: PositionKey) -> Self {
        key.position_id()
    }
}

impl fmt::Display for PositionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionKey::Assigned(id) => write!(f, "position {}", id),
            PositionKey::Unassigned => write!(f, "{}", EMPTY_POSITION_NAME),
        }
    }
}

/// A job position such as Supervisor, Welder or Fitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub id: PositionId,
    pub name: String,
}

impl Position {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id: PositionId(id),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    pub id: WorkerId,
    pub name: String,
    #[serde(rename = "position_id", default)]
    pub position: PositionKey,
}

impl Worker {
    pub fn new(id: u64, name: impl Into<String>, position: Option<u64>) -> Self {
        Self {
            id: WorkerId(id),
            name: name.into(),
            position: position.map(PositionId).into(),
        }
    }
}

/// A unit of work for a position on a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    #[serde(rename = "position_id", default)]
    pub position: PositionKey,
    pub date: NaiveDate,
    /// Hours the task calls for. Assignments without their own hours are
    /// credited with this value.
    #[serde(rename = "duration", alias = "hours")]
    pub required_hours: u32,
}

impl Task {
    pub fn new(id: u64, position: Option<u64>, date: NaiveDate, required_hours: u32) -> Self {
        Self {
            id: TaskId(id),
            position: position.map(PositionId).into(),
            date,
            required_hours,
        }
    }
}

/// A worker working a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AssignmentId>,
    pub worker_id: WorkerId,
    pub task_id: TaskId,
    /// Hours actually worked, when they differ from the task's requirement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<u32>,
}

impl Assignment {
    pub fn new(worker_id: u64, task_id: u64) -> Self {
        Self {
            id: None,
            worker_id: WorkerId(worker_id),
            task_id: TaskId(task_id),
            hours: None,
        }
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(AssignmentId(id));
        self
    }

    pub fn with_hours(mut self, hours: u32) -> Self {
        self.hours = Some(hours);
        self
    }

    /// Hours credited for this assignment against `task`.
    pub fn worked_hours(&self, task: &Task) -> u32 {
        self.hours.unwrap_or(task.required_hours)
    }
}
