//! The planner document: hosted entities plus the calendar.

use std::sync::Arc;

use almanac_core::OrderedMap;
use almanac_core::edit::{BaseEdit, Editable};
use almanac_hosted::{
    ActivateEdit, Endpoint, HostId, HostedDataAttribute, HostedDataList, HostedError,
    HostedGraph, HostedTarget, PairingDecl, PairingId, PairingRegistry, Role,
};
use chrono::NaiveDate;

use crate::error::{PlannerError, PlannerResult};
use crate::item::{
    Item, PLANNED, PlannedItem, REPEAT, SCHEDULED, ScheduledItem, TASK, Task, TaskStatus,
};

pub const CHILDREN: PairingId = PairingId("task.children");
pub const SCHEDULED_TASK: PairingId = PairingId("scheduled.task");
pub const PLANNED_SCHEDULED: PairingId = PairingId("planned.scheduled");

/// Day lists of scheduled item ids.
pub type Calendar = OrderedMap<NaiveDate, Vec<HostId>>;

/// The pairings every planner declares.
pub fn registry() -> Result<PairingRegistry, HostedError> {
    PairingRegistry::new()
        .with(PairingDecl::new(
            CHILDREN,
            Endpoint::many([TASK]),
            Endpoint::one([TASK]),
        ))?
        .with(PairingDecl::new(
            SCHEDULED_TASK,
            Endpoint::one([SCHEDULED, REPEAT]),
            Endpoint::many([TASK]),
        ))?
        .with(PairingDecl::new(
            PLANNED_SCHEDULED,
            Endpoint::many([PLANNED]),
            Endpoint::many([SCHEDULED, REPEAT]),
        ))
}

/// Handles onto both sides of every planner pairing.
#[derive(Debug, Clone, Copy)]
pub struct Pairings {
    pub children: HostedDataList,
    pub parent: HostedDataAttribute,
    /// Task a scheduled item works on. Also used for repeating items.
    pub task_of: HostedDataAttribute,
    pub scheduled_for: HostedDataList,
    pub plan_items: HostedDataList,
    /// Planned items a scheduled item belongs to.
    pub plans_of: HostedDataList,
}

impl Pairings {
    fn new(registry: &PairingRegistry) -> Result<Self, HostedError> {
        Ok(Self {
            children: HostedDataList::new(registry, CHILDREN, Role::Driver, TASK)?,
            parent: HostedDataAttribute::new(registry, CHILDREN, Role::Driven, TASK)?,
            task_of: HostedDataAttribute::new(registry, SCHEDULED_TASK, Role::Driver, SCHEDULED)?,
            scheduled_for: HostedDataList::new(registry, SCHEDULED_TASK, Role::Driven, TASK)?,
            plan_items: HostedDataList::new(registry, PLANNED_SCHEDULED, Role::Driver, PLANNED)?,
            plans_of: HostedDataList::new(registry, PLANNED_SCHEDULED, Role::Driven, SCHEDULED)?,
        })
    }
}

/// Everything the planner edits operate on.
#[derive(Debug)]
pub struct Planner {
    pub(crate) graph: HostedGraph<Item>,
    pub(crate) calendar: Calendar,
    pairings: Pairings,
    root: HostId,
}

impl Planner {
    /// Creates a planner holding only the root task.
    pub fn new() -> PlannerResult<Self> {
        let registry = registry()?;
        let pairings = Pairings::new(&registry)?;
        let mut graph = HostedGraph::new(Arc::new(registry));
        let root = graph.insert(Item::Task(Task::new("Tasks")));
        BaseEdit::unregistered(ActivateEdit::new(root)).run(&mut graph)?;
        log::debug!("Planner created with root task {root}");
        Ok(Self {
            graph,
            calendar: OrderedMap::new(),
            pairings,
            root,
        })
    }

    pub fn root(&self) -> HostId {
        self.root
    }

    pub fn pairings(&self) -> &Pairings {
        &self.pairings
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    pub fn task(&self, id: HostId) -> PlannerResult<&Task> {
        self.graph
            .get(id)
            .and_then(Item::as_task)
            .ok_or(PlannerError::NotATask(id))
    }

    pub fn scheduled(&self, id: HostId) -> PlannerResult<&ScheduledItem> {
        self.graph
            .get(id)
            .and_then(Item::as_scheduled)
            .ok_or(PlannerError::NotScheduled(id))
    }

    pub fn planned(&self, id: HostId) -> PlannerResult<&PlannedItem> {
        self.graph
            .get(id)
            .and_then(Item::as_planned)
            .ok_or(PlannerError::NotPlanned(id))
    }

    pub fn children(&self, task: HostId) -> Vec<HostId> {
        self.graph.list(task, &self.pairings.children)
    }

    pub fn parent(&self, task: HostId) -> Option<HostId> {
        self.graph.attribute(task, &self.pairings.parent)
    }

    /// Active tasks below `task`, depth first.
    pub fn descendants(&self, task: HostId) -> Vec<HostId> {
        let mut out = Vec::new();
        let mut stack = self.children(task);
        stack.reverse();
        while let Some(id) = stack.pop() {
            out.push(id);
            let mut children = self.children(id);
            children.reverse();
            stack.extend(children);
        }
        out
    }

    pub fn is_descendant(&self, ancestor: HostId, task: HostId) -> bool {
        let mut current = self.parent(task);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    fn compute_progress(&self, task: HostId) -> u8 {
        let children = self.children(task);
        if children.is_empty() {
            return match self.task(task).map(|t| *t.status.value()) {
                Ok(TaskStatus::Done) => 100,
                _ => 0,
            };
        }
        let total: u32 = children
            .iter()
            .filter_map(|&c| self.task(c).ok())
            .map(|t| u32::from(t.progress))
            .sum();
        (total / children.len() as u32) as u8
    }

    /// Recomputes the progress of `task` and each of its ancestors.
    /// Defunct tasks keep the progress they had.
    pub(crate) fn refresh_progress(&mut self, task: HostId) {
        let mut current = Some(task);
        while let Some(id) = current {
            let progress = self.compute_progress(id);
            if let Some(task) = self.graph.get_mut(id).and_then(Item::as_task_mut) {
                task.progress = progress;
            }
            current = self.parent(id);
        }
    }

    /// The task tree, one line per task.
    pub fn tree_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        self.push_tree(self.root, 0, &mut lines);
        lines
    }

    fn push_tree(&self, task: HostId, depth: usize, lines: &mut Vec<String>) {
        let Ok(t) = self.task(task) else {
            return;
        };
        let mut line = format!(
            "{:indent$}{task} {} {} ({}%)",
            "",
            t.mark(),
            t.name.value(),
            t.progress,
            indent = depth * 2
        );
        let scheduled = self.graph.list(task, &self.pairings.scheduled_for);
        if !scheduled.is_empty() {
            let ids: Vec<String> = scheduled.iter().map(HostId::to_string).collect();
            line.push_str(&format!(" scheduled: {}", ids.join(", ")));
        }
        lines.push(line);
        for child in self.children(task) {
            self.push_tree(child, depth + 1, lines);
        }
    }

    /// Calendar days with their items in order.
    pub fn calendar_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for (date, ids) in self.calendar.iter() {
            if ids.is_empty() {
                continue;
            }
            lines.push(date.to_string());
            for &id in ids {
                let Some(item) = self.graph.get(id) else {
                    continue;
                };
                let Some(scheduled) = item.as_scheduled() else {
                    continue;
                };
                let slot = scheduled.slot();
                let mut line = format!(
                    "  {id} {}-{} {}",
                    slot.start.format("%H:%M"),
                    slot.end.format("%H:%M"),
                    scheduled.name.value()
                );
                if let Item::Repeat(repeat) = item {
                    line.push_str(&format!(" (every {} days)", repeat.every_days.value()));
                }
                if let Some(task) = self.graph.attribute(id, &self.pairings.task_of) {
                    line.push_str(&format!(" -> task {task}"));
                }
                let plans = self.graph.list(id, &self.pairings.plans_of);
                if !plans.is_empty() {
                    let ids: Vec<String> = plans.iter().map(HostId::to_string).collect();
                    line.push_str(&format!(" [plan {}]", ids.join(", ")));
                }
                lines.push(line);
            }
        }
        lines
    }

    /// Frees every defunct entity and drops empty calendar days.
    ///
    /// Only valid when no recorded edit refers to those entities any more,
    /// i.e. right after the edit log was cleared. Returns how many entities
    /// were freed.
    pub fn prune(&mut self) -> usize {
        let mut freed = 0;
        loop {
            let defunct: Vec<HostId> = self
                .graph
                .arena()
                .iter_all()
                .map(|(id, _)| id)
                .filter(|&id| !self.graph.is_active(id))
                .collect();
            let before = freed;
            for id in defunct {
                match self.graph.release(id) {
                    Ok(item) => {
                        log::trace!("Pruned {} '{}'", id, item.name());
                        freed += 1;
                    }
                    Err(err) => log::trace!("Not pruning {id} yet: {err}"),
                }
            }
            if freed == before {
                break;
            }
        }
        let empty: Vec<NaiveDate> = self
            .calendar
            .iter()
            .filter(|(_, ids)| ids.is_empty())
            .map(|(date, _)| *date)
            .collect();
        for date in empty {
            self.calendar.remove(&date);
        }
        log::debug!("Pruned {freed} defunct entities");
        freed
    }
}

impl Editable for Planner {}

impl HostedTarget for Planner {
    type Entity = Item;

    fn graph(&self) -> &HostedGraph<Item> {
        &self.graph
    }

    fn graph_mut(&mut self) -> &mut HostedGraph<Item> {
        &mut self.graph
    }
}
