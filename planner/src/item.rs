//! Planner entities.

use std::fmt;
use std::str::FromStr;

use almanac_core::MutableAttribute;
use almanac_core::OrderedMap;
use almanac_core::edit::Tree;
use almanac_hosted::{Hosted, Kind};
use chrono::{NaiveDate, NaiveTime, TimeDelta};

use crate::error::PlannerError;

pub const TASK: Kind = "task";
pub const SCHEDULED: Kind = "scheduled";
pub const REPEAT: Kind = "repeat";
pub const PLANNED: Kind = "planned";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "doing",
            TaskStatus::Done => "done",
        }
    }

    fn mark(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "[ ]",
            TaskStatus::InProgress => "[~]",
            TaskStatus::Done => "[x]",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TaskStatus {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(TaskStatus::Todo),
            "doing" | "in-progress" => Ok(TaskStatus::InProgress),
            "done" => Ok(TaskStatus::Done),
            other => Err(PlannerError::UnknownStatus(other.to_string())),
        }
    }
}

/// Per-date record of a task: `{"2024-03-01": {"status": "done"}}`.
pub type TaskHistory = OrderedMap<String, Tree<String, String>>;

#[derive(Debug, Clone)]
pub struct Task {
    pub name: MutableAttribute<String>,
    pub status: MutableAttribute<TaskStatus>,
    pub history: TaskHistory,
    /// Recomputed from the subtree whenever a status or the tree changes.
    pub(crate) progress: u8,
}

impl Task {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: MutableAttribute::named("name", name.into()),
            status: MutableAttribute::named("status", TaskStatus::Todo),
            history: OrderedMap::new(),
            progress: 0,
        }
    }

    /// Percentage of the subtree that is done.
    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn mark(&self) -> &'static str {
        self.status.value().mark()
    }
}

/// Date and time range of a calendar item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl Slot {
    pub fn new(date: NaiveDate, start: NaiveTime, end: NaiveTime) -> Self {
        Self { date, start, end }
    }

    /// The same slot moved by `minutes`, keeping its length. Crossing
    /// midnight changes the date.
    pub fn shifted(&self, minutes: i64) -> Self {
        let length = self.end.signed_duration_since(self.start);
        let start = self.date.and_time(self.start) + TimeDelta::minutes(minutes);
        let end = start + length;
        Self {
            date: start.date(),
            start: start.time(),
            end: end.time(),
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}-{}",
            self.date,
            self.start.format("%H:%M"),
            self.end.format("%H:%M")
        )
    }
}

#[derive(Debug, Clone)]
pub struct ScheduledItem {
    pub name: MutableAttribute<String>,
    pub date: MutableAttribute<NaiveDate>,
    pub start: MutableAttribute<NaiveTime>,
    pub end: MutableAttribute<NaiveTime>,
}

impl ScheduledItem {
    pub fn new(name: impl Into<String>, slot: Slot) -> Self {
        Self {
            name: MutableAttribute::named("name", name.into()),
            date: MutableAttribute::named("date", slot.date),
            start: MutableAttribute::named("start", slot.start),
            end: MutableAttribute::named("end", slot.end),
        }
    }

    pub fn slot(&self) -> Slot {
        Slot::new(*self.date.value(), *self.start.value(), *self.end.value())
    }
}

/// A scheduled item that recurs every `every_days` days.
#[derive(Debug, Clone)]
pub struct RepeatScheduledItem {
    pub item: ScheduledItem,
    pub every_days: MutableAttribute<u32>,
}

#[derive(Debug, Clone)]
pub struct PlannedItem {
    pub name: MutableAttribute<String>,
}

impl PlannedItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: MutableAttribute::named("name", name.into()),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Item {
    Task(Task),
    Scheduled(ScheduledItem),
    Repeat(RepeatScheduledItem),
    Planned(PlannedItem),
}

impl Item {
    pub fn name(&self) -> &str {
        match self {
            Item::Task(task) => task.name.value(),
            Item::Scheduled(item) => item.name.value(),
            Item::Repeat(repeat) => repeat.item.name.value(),
            Item::Planned(planned) => planned.name.value(),
        }
    }

    pub fn as_task(&self) -> Option<&Task> {
        match self {
            Item::Task(task) => Some(task),
            _ => None,
        }
    }

    pub fn as_task_mut(&mut self) -> Option<&mut Task> {
        match self {
            Item::Task(task) => Some(task),
            _ => None,
        }
    }

    /// The calendar fields of a plain or repeating scheduled item.
    pub fn as_scheduled(&self) -> Option<&ScheduledItem> {
        match self {
            Item::Scheduled(item) => Some(item),
            Item::Repeat(repeat) => Some(&repeat.item),
            _ => None,
        }
    }

    pub fn as_scheduled_mut(&mut self) -> Option<&mut ScheduledItem> {
        match self {
            Item::Scheduled(item) => Some(item),
            Item::Repeat(repeat) => Some(&mut repeat.item),
            _ => None,
        }
    }

    pub fn as_planned(&self) -> Option<&PlannedItem> {
        match self {
            Item::Planned(planned) => Some(planned),
            _ => None,
        }
    }
}

impl Hosted for Item {
    fn kind(&self) -> Kind {
        match self {
            Item::Task(_) => TASK,
            Item::Scheduled(_) => SCHEDULED,
            Item::Repeat(_) => REPEAT,
            Item::Planned(_) => PLANNED,
        }
    }
}
