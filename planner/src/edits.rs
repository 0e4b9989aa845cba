//! Builders for every planner action.
//!
//! Each builder checks its arguments against the current planner, creates
//! any new entity (stored inactive), and returns a registered edit for the
//! caller to run through its [`EditLog`](almanac_core::edit::EditLog).

use almanac_core::edit::{
    AttributeEdit, BaseEdit, CompositeEdit, CompositeUpdate, ContainerEdit, DiffEntry, Edit,
    EditResult, Locator, MapOp, SeqKey, SeqOp, SimpleEdit, Tree, Upsert, leaves, nested,
};
use almanac_core::{MutableAttribute, OrderedMap};
use almanac_hosted::{
    ActivateEdit, DeactivateEdit, HostId, HostedAttributeEdit, HostedListEdit,
    ReplaceHostedDataEdit,
};
use chrono::{NaiveDate, NaiveTime};

use crate::error::{PlannerError, PlannerResult};
use crate::item::{
    Item, PlannedItem, RepeatScheduledItem, ScheduledItem, Slot, Task, TaskHistory, TaskStatus,
};
use crate::planner::{Calendar, Planner};

fn sub(edit: impl Edit<Planner>) -> BaseEdit<Planner> {
    BaseEdit::unregistered(edit)
}

fn task_name(id: HostId) -> Locator<Planner, MutableAttribute<String>> {
    Locator::new(format!("name of {id}"), move |p: &mut Planner| {
        p.graph.get_any_mut(id)?.as_task_mut().map(|t| &mut t.name)
    })
}

fn task_status(id: HostId) -> Locator<Planner, MutableAttribute<TaskStatus>> {
    Locator::new(format!("status of {id}"), move |p: &mut Planner| {
        p.graph.get_any_mut(id)?.as_task_mut().map(|t| &mut t.status)
    })
}

fn task_history(id: HostId) -> Locator<Planner, TaskHistory> {
    Locator::new(format!("history of {id}"), move |p: &mut Planner| {
        p.graph.get_any_mut(id)?.as_task_mut().map(|t| &mut t.history)
    })
}

fn scheduled_date(id: HostId) -> Locator<Planner, MutableAttribute<NaiveDate>> {
    Locator::new(format!("date of {id}"), move |p: &mut Planner| {
        p.graph.get_any_mut(id)?.as_scheduled_mut().map(|s| &mut s.date)
    })
}

fn scheduled_start(id: HostId) -> Locator<Planner, MutableAttribute<NaiveTime>> {
    Locator::new(format!("start of {id}"), move |p: &mut Planner| {
        p.graph.get_any_mut(id)?.as_scheduled_mut().map(|s| &mut s.start)
    })
}

fn scheduled_end(id: HostId) -> Locator<Planner, MutableAttribute<NaiveTime>> {
    Locator::new(format!("end of {id}"), move |p: &mut Planner| {
        p.graph.get_any_mut(id)?.as_scheduled_mut().map(|s| &mut s.end)
    })
}

fn calendar() -> Locator<Planner, Calendar> {
    Locator::new("calendar", |p: &mut Planner| Some(&mut p.calendar))
}

fn day(date: NaiveDate) -> Locator<Planner, Vec<HostId>> {
    Locator::new(format!("calendar {date}"), move |p: &mut Planner| {
        p.calendar.get_mut(&date)
    })
}

/// Creates the day list if it is missing; a no-op otherwise.
fn ensure_day(date: NaiveDate) -> BaseEdit<Planner> {
    sub(ContainerEdit::new(
        calendar(),
        MapOp::Add(leaves([(date, Vec::new())])),
    ))
}

/// Recomputes progress upwards from each task, after the primary sub-edits
/// in both directions.
fn refresh_progress(tasks: Vec<HostId>) -> BaseEdit<Planner> {
    sub(SimpleEdit::self_inverse("Refresh progress", move |p: &mut Planner, _| {
        for &task in &tasks {
            p.refresh_progress(task);
        }
        Ok(())
    }))
}

fn slot_attributes(id: HostId, slot: Slot) -> AttributeEdit<Planner> {
    AttributeEdit::new()
        .set(scheduled_date(id), slot.date)
        .set(scheduled_start(id), slot.start)
        .set(scheduled_end(id), slot.end)
}

/// Moves `id` from the `from` day list to the `to` day list.
fn calendar_move(id: HostId, from: NaiveDate, to: NaiveDate) -> EditResult<BaseEdit<Planner>> {
    let edits = if from == to {
        Vec::new()
    } else {
        vec![
            ensure_day(to),
            sub(ContainerEdit::new(day(from), SeqOp::remove_values([id]))),
            sub(ContainerEdit::new(day(to), SeqOp::Add(vec![id]))),
        ]
    };
    Ok(sub(CompositeEdit::new("Move in calendar", edits)?))
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// Adds a new task as the last child of `parent`.
pub fn add_task(
    planner: &mut Planner,
    parent: HostId,
    name: &str,
) -> PlannerResult<(HostId, BaseEdit<Planner>)> {
    planner.task(parent)?;
    let children = planner.pairings().children;
    let id = planner.graph.insert(Item::Task(Task::new(name)));
    let edit = CompositeEdit::new(
        format!("Add task '{name}'"),
        vec![
            sub(ActivateEdit::new(id)),
            sub(HostedListEdit::add(parent, &children, [id])?),
        ],
    )?
    .derived(refresh_progress(vec![id, parent]))?;
    Ok((id, BaseEdit::new(edit)))
}

/// Removes a task and its whole subtree from the tree.
///
/// The tasks are deactivated, not destroyed: undo restores the same
/// entities at the same position.
pub fn remove_task(planner: &Planner, id: HostId) -> PlannerResult<BaseEdit<Planner>> {
    if id == planner.root() {
        return Err(PlannerError::RootTask);
    }
    let name = planner.task(id)?.name.value().clone();
    let children = planner.pairings().children;
    let parent = planner.parent(id);

    let mut edits = Vec::new();
    if let Some(parent) = parent {
        edits.push(sub(HostedListEdit::remove(parent, &children, [id])?));
    }
    edits.push(sub(DeactivateEdit::new(id)));
    for descendant in planner.descendants(id) {
        edits.push(sub(DeactivateEdit::new(descendant)));
    }
    let edit = CompositeEdit::new(format!("Remove task '{name}'"), edits)?
        .derived(refresh_progress(parent.into_iter().collect()))?;
    Ok(BaseEdit::new(edit))
}

/// Moves a task under `new_parent`, at `index` or to the end.
pub fn move_task(
    planner: &Planner,
    id: HostId,
    new_parent: HostId,
    index: Option<usize>,
) -> PlannerResult<BaseEdit<Planner>> {
    if id == planner.root() {
        return Err(PlannerError::RootTask);
    }
    let name = planner.task(id)?.name.value().clone();
    planner.task(new_parent)?;
    if id == new_parent || planner.is_descendant(id, new_parent) {
        return Err(PlannerError::Cycle {
            task: id,
            parent: new_parent,
        });
    }
    let children = planner.pairings().children;
    let old_parent = planner.parent(id);

    let mut edits = Vec::new();
    if old_parent == Some(new_parent) {
        let last = planner.children(new_parent).len().saturating_sub(1);
        let index = index.unwrap_or(last).min(last);
        edits.push(sub(HostedListEdit::move_to(new_parent, &children, id, index)?));
    } else {
        if let Some(old_parent) = old_parent {
            edits.push(sub(HostedListEdit::remove(old_parent, &children, [id])?));
        }
        let insert = match index {
            Some(index) => {
                let index = index.min(planner.children(new_parent).len());
                HostedListEdit::insert(new_parent, &children, index, id)?
            }
            None => HostedListEdit::add(new_parent, &children, [id])?,
        };
        edits.push(sub(insert));
    }
    let mut refresh = vec![new_parent];
    refresh.extend(old_parent);
    let edit = CompositeEdit::new(format!("Move task '{name}'"), edits)?
        .derived(refresh_progress(refresh))?;
    Ok(BaseEdit::new(edit))
}

pub fn rename_task(planner: &Planner, id: HostId, name: &str) -> PlannerResult<BaseEdit<Planner>> {
    planner.task(id)?;
    let edit = AttributeEdit::new()
        .set(task_name(id), name.to_string())
        .named(format!("Rename task to '{name}'"));
    Ok(BaseEdit::new(edit))
}

/// Sets a task's status, records it in the task's history under `date`
/// and refreshes progress up the tree.
pub fn set_status(
    planner: &Planner,
    id: HostId,
    status: TaskStatus,
    date: NaiveDate,
) -> PlannerResult<BaseEdit<Planner>> {
    let name = planner.task(id)?.name.value().clone();
    let record = OrderedMap::from([(
        date.to_string(),
        nested([(
            "status".to_string(),
            DiffEntry::Leaf(Upsert::Set(Tree::Leaf(status.label().to_string()))),
        )]),
    )]);
    let edit = CompositeEdit::new(
        format!("Mark '{name}' {status}"),
        vec![
            sub(AttributeEdit::new().set(task_status(id), status)),
            sub(ContainerEdit::new(task_history(id), MapOp::AddOrModify(record)).recursive()),
        ],
    )?
    .derived(refresh_progress(vec![id]))?;
    Ok(BaseEdit::new(edit))
}

// ---------------------------------------------------------------------------
// Calendar
// ---------------------------------------------------------------------------

/// Puts a new item on the calendar, optionally working on `task`.
pub fn schedule(
    planner: &mut Planner,
    name: &str,
    slot: Slot,
    task: Option<HostId>,
) -> PlannerResult<(HostId, BaseEdit<Planner>)> {
    if let Some(task) = task {
        planner.task(task)?;
    }
    let task_of = planner.pairings().task_of;
    let id = planner
        .graph
        .insert(Item::Scheduled(ScheduledItem::new(name, slot)));

    let mut edits = vec![
        sub(ActivateEdit::new(id)),
        ensure_day(slot.date),
        sub(ContainerEdit::new(day(slot.date), SeqOp::Add(vec![id]))),
    ];
    if let Some(task) = task {
        edits.push(sub(HostedAttributeEdit::new(id, &task_of, Some(task))?));
    }
    let edit = CompositeEdit::new(format!("Schedule '{name}' on {slot}"), edits)?;
    Ok((id, BaseEdit::new(edit)))
}

/// Takes an item off the calendar.
pub fn unschedule(planner: &Planner, id: HostId) -> PlannerResult<BaseEdit<Planner>> {
    let item = planner.scheduled(id)?;
    let date = *item.date.value();
    let edit = CompositeEdit::new(
        format!("Unschedule '{}'", item.name.value()),
        vec![
            sub(ContainerEdit::new(day(date), SeqOp::remove_values([id]))),
            sub(DeactivateEdit::new(id)),
        ],
    )?;
    Ok(BaseEdit::new(edit))
}

/// An interactive move of a calendar item.
///
/// ```ignore
/// let (drag, edit) = Drag::begin(&planner, item)?;
/// let mut run = log.begin_continuous_run(edit, &mut planner)?;
/// for minutes in [15, 30, 45] {
///     run.update(drag.to(drag.origin().shifted(minutes))?)?;
/// }
/// run.end()?;
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Drag {
    id: HostId,
    origin: Slot,
}

impl Drag {
    /// Sub-edit 0 sets the slot attributes, sub-edit 1 moves the item
    /// between day lists.
    pub fn begin(
        planner: &Planner,
        id: HostId,
    ) -> PlannerResult<(Self, BaseEdit<Planner, CompositeEdit<Planner>>)> {
        let item = planner.scheduled(id)?;
        let origin = item.slot();
        let edit = CompositeEdit::new(
            format!("Drag '{}'", item.name.value()),
            vec![sub(AttributeEdit::new()), calendar_move(id, origin.date, origin.date)?],
        )?;
        Ok((Self { id, origin }, BaseEdit::continuous(edit)))
    }

    pub fn origin(&self) -> Slot {
        self.origin
    }

    /// The updates that put the item at `slot`.
    pub fn to(&self, slot: Slot) -> EditResult<Vec<CompositeUpdate<Planner>>> {
        Ok(vec![
            CompositeUpdate::modify::<AttributeEdit<Planner>>(0, slot_attributes(self.id, slot)),
            CompositeUpdate::Replace {
                index: 1,
                edit: calendar_move(self.id, self.origin.date, slot.date)?,
            },
        ])
    }
}

/// Turns a scheduled item into a repeating one.
///
/// A new entity takes the old one's place in the calendar and in every
/// relationship; the old entity is kept, inactive, for undo.
pub fn repeat(
    planner: &mut Planner,
    id: HostId,
    every_days: u32,
) -> PlannerResult<(HostId, BaseEdit<Planner>)> {
    let item = match planner.graph.get(id) {
        Some(Item::Scheduled(item)) => item.clone(),
        Some(Item::Repeat(_)) => return Err(PlannerError::AlreadyRepeating(id)),
        _ => return Err(PlannerError::NotScheduled(id)),
    };
    let date = *item.date.value();
    let name = item.name.value().clone();
    let new = planner.graph.insert(Item::Repeat(RepeatScheduledItem {
        item,
        every_days: MutableAttribute::named("every", every_days),
    }));
    let edit = CompositeEdit::new(
        format!("Repeat '{name}' every {every_days} days"),
        vec![
            sub(ReplaceHostedDataEdit::new(id, new)),
            sub(ContainerEdit::new(
                day(date),
                SeqOp::Modify(vec![(SeqKey::Value(id), new)]),
            )),
        ],
    )?;
    Ok((new, BaseEdit::new(edit)))
}

pub fn add_planned(planner: &mut Planner, name: &str) -> PlannerResult<(HostId, BaseEdit<Planner>)> {
    let id = planner.graph.insert(Item::Planned(PlannedItem::new(name)));
    let edit = CompositeEdit::new(
        format!("Add plan '{name}'"),
        vec![sub(ActivateEdit::new(id))],
    )?;
    Ok((id, BaseEdit::new(edit)))
}

/// Files a scheduled item under a planned item.
pub fn link_plan(
    planner: &Planner,
    planned: HostId,
    scheduled: HostId,
) -> PlannerResult<BaseEdit<Planner>> {
    let plan_name = planner.planned(planned)?.name.value().clone();
    let item_name = planner.scheduled(scheduled)?.name.value().clone();
    let plan_items = planner.pairings().plan_items;
    let edit = CompositeEdit::new(
        format!("Plan '{item_name}' under '{plan_name}'"),
        vec![sub(HostedListEdit::add(planned, &plan_items, [scheduled])?)],
    )?;
    Ok(BaseEdit::new(edit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use almanac_core::edit::EditLog;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn slot(d: u32, h: u32) -> Slot {
        Slot::new(
            date(d),
            NaiveTime::from_hms_opt(h, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(h + 1, 0, 0).unwrap(),
        )
    }

    #[test]
    fn add_task_activates_and_links() {
        let mut planner = Planner::new().unwrap();
        let mut log = EditLog::default();
        let root = planner.root();
        let (id, edit) = add_task(&mut planner, root, "Write").unwrap();
        assert!(log.run(edit, &mut planner).unwrap());
        assert_eq!(planner.children(root), [id]);
        assert_eq!(planner.parent(id), Some(root));

        log.undo(&mut planner).unwrap();
        assert!(planner.children(root).is_empty());
        assert!(planner.task(id).is_err());
    }

    #[test]
    fn status_updates_history_and_progress() {
        let mut planner = Planner::new().unwrap();
        let mut log = EditLog::default();
        let root = planner.root();
        let (a, edit) = add_task(&mut planner, root, "a").unwrap();
        log.run(edit, &mut planner).unwrap();
        let (_b, edit) = add_task(&mut planner, root, "b").unwrap();
        log.run(edit, &mut planner).unwrap();

        let edit = set_status(&planner, a, TaskStatus::Done, date(1)).unwrap();
        assert!(log.run(edit, &mut planner).unwrap());
        let task = planner.task(a).unwrap();
        assert_eq!(
            task.history
                .get("2024-03-01")
                .and_then(|t| t.get_path(&["status".to_string()]))
                .and_then(Tree::as_leaf)
                .map(String::as_str),
            Some("done")
        );
        assert_eq!(planner.task(root).unwrap().progress(), 50);

        log.undo(&mut planner).unwrap();
        assert!(planner.task(a).unwrap().history.is_empty());
        assert_eq!(planner.task(root).unwrap().progress(), 0);
    }

    #[test]
    fn move_under_own_subtree_is_rejected() {
        let mut planner = Planner::new().unwrap();
        let mut log = EditLog::default();
        let root = planner.root();
        let (a, edit) = add_task(&mut planner, root, "a").unwrap();
        log.run(edit, &mut planner).unwrap();
        let (b, edit) = add_task(&mut planner, a, "b").unwrap();
        log.run(edit, &mut planner).unwrap();

        assert_eq!(
            move_task(&planner, a, b, None).err(),
            Some(PlannerError::Cycle { task: a, parent: b })
        );
        assert_eq!(remove_task(&planner, root).err(), Some(PlannerError::RootTask));
    }

    #[test]
    fn drag_commits_last_position_as_one_step() {
        let mut planner = Planner::new().unwrap();
        let mut log = EditLog::default();
        let (id, edit) = schedule(&mut planner, "Standup", slot(1, 9), None).unwrap();
        log.run(edit, &mut planner).unwrap();

        let (drag, edit) = Drag::begin(&planner, id).unwrap();
        let mut run = log.begin_continuous_run(edit, &mut planner).unwrap();
        for minutes in [60, 24 * 60, 24 * 60 + 30] {
            run.update(drag.to(drag.origin().shifted(minutes)).unwrap())
                .unwrap();
        }
        assert!(run.end().unwrap());
        assert_eq!(log.undo_count(), 2);
        assert_eq!(planner.scheduled(id).unwrap().slot(), slot(1, 9).shifted(24 * 60 + 30));
        assert_eq!(planner.calendar().get(&date(2)), Some(&vec![id]));
        assert_eq!(planner.calendar().get(&date(1)), Some(&vec![]));

        log.undo(&mut planner).unwrap();
        assert_eq!(planner.scheduled(id).unwrap().slot(), slot(1, 9));
        assert_eq!(planner.calendar().get(&date(1)), Some(&vec![id]));
        assert_eq!(planner.calendar().get(&date(2)), None);
    }
}
