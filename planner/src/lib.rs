//! # Almanac Planner
//!
//! A task tree, a calendar of scheduled and repeating items, and planned
//! items grouping them. All data lives in a [`Planner`]; every change goes
//! through one of the builders in [`edits`] and can be undone.
//!
//! ```ignore
//! let mut planner = Planner::new()?;
//! let mut log = EditLog::default();
//! let (task, edit) = edits::add_task(&mut planner, planner.root(), "Write report")?;
//! log.run(edit, &mut planner)?;
//! log.run(edits::set_status(&planner, task, TaskStatus::Done, today)?, &mut planner)?;
//! log.undo(&mut planner)?;
//! ```

pub mod edits;
mod error;
mod item;
mod planner;

pub use edits::Drag;
pub use error::{PlannerError, PlannerResult};
pub use item::{
    Item, PLANNED, PlannedItem, REPEAT, RepeatScheduledItem, SCHEDULED, ScheduledItem, Slot, TASK,
    Task, TaskHistory, TaskStatus,
};
pub use planner::{CHILDREN, Calendar, PLANNED_SCHEDULED, Pairings, Planner, SCHEDULED_TASK, registry};
