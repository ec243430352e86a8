pub mod aggregator;
pub mod model;
pub mod table;

pub use aggregator::build_schedule_table;
pub use model::{
    Assignment, AssignmentId, Position, PositionId, PositionKey, Task, TaskId, Worker, WorkerId,
    EMPTY_POSITION_NAME,
};
pub use table::{RowKind, ScheduleRow, ScheduleTable, TableView};
