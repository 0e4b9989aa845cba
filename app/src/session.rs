//! The planner session: one planner, one edit log, commands in, text out.

use std::io::{BufRead, Write};

use chrono::NaiveDate;

use almanac_core::edit::{BaseEdit, CallbackPhase, CompositeEdit, Edit, EditLog};
use almanac_hosted::{HostId, HostedTarget};
use almanac_planner::{Drag, Planner, Slot, edits};

use crate::command::{Command, HELP, Ref, parse_line};
use crate::config::AppConfig;
use crate::error::{AppError, AppResult};

pub struct Session {
    planner: Planner,
    log: EditLog<Planner>,
    today: NaiveDate,
}

impl Session {
    pub fn new(config: &AppConfig, today: NaiveDate) -> AppResult<Self> {
        let planner = Planner::new()?;
        let mut log = EditLog::new(&config.edit_log);
        log.callbacks_mut().register::<CompositeEdit<Planner>, _>(
            CallbackPhase::PostUndo,
            "session",
            |planner: &Planner, edit| {
                log::debug!(
                    "Undid '{}', {} entities active",
                    edit.name(),
                    planner.graph().active_count()
                );
            },
        )?;
        if log.is_locked() {
            // Nothing to load yet; the session records from the first command.
            log.open();
        }
        log::info!("Session started for {today}");
        Ok(Self {
            planner,
            log,
            today,
        })
    }

    pub fn planner(&self) -> &Planner {
        &self.planner
    }

    pub fn log(&self) -> &EditLog<Planner> {
        &self.log
    }

    /// Resolves a typed reference to the active entity in that slot.
    fn resolve(&self, r: Ref) -> AppResult<HostId> {
        self.planner
            .graph()
            .iter()
            .map(|(id, _)| id)
            .find(|id| id.index() == r.0)
            .ok_or_else(|| AppError::UnknownRef(format!("#{}", r.0)))
    }

    fn record(&mut self, edit: BaseEdit<Planner>) -> AppResult<Vec<String>> {
        let name = edit.name();
        if self.log.run(edit, &mut self.planner)? {
            Ok(vec![format!("ok: {name}")])
        } else {
            Ok(vec![format!("no change: {name}")])
        }
    }

    fn record_new(&mut self, (id, edit): (HostId, BaseEdit<Planner>)) -> AppResult<Vec<String>> {
        let mut out = self.record(edit)?;
        out.push(format!("created {id}"));
        Ok(out)
    }

    pub fn execute(&mut self, command: Command) -> AppResult<Vec<String>> {
        log::trace!("Executing {command:?}");
        match command {
            Command::AddTask { parent, name } => {
                let parent = match parent {
                    Some(r) => self.resolve(r)?,
                    None => self.planner.root(),
                };
                let created = edits::add_task(&mut self.planner, parent, &name)?;
                self.record_new(created)
            }
            Command::RemoveTask(task) => {
                let edit = edits::remove_task(&self.planner, self.resolve(task)?)?;
                self.record(edit)
            }
            Command::MoveTask {
                task,
                parent,
                index,
            } => {
                let (task, parent) = (self.resolve(task)?, self.resolve(parent)?);
                let edit = edits::move_task(&self.planner, task, parent, index)?;
                self.record(edit)
            }
            Command::RenameTask { task, name } => {
                let edit = edits::rename_task(&self.planner, self.resolve(task)?, &name)?;
                self.record(edit)
            }
            Command::SetStatus { task, status, date } => {
                let date = date.unwrap_or(self.today);
                let edit = edits::set_status(&self.planner, self.resolve(task)?, status, date)?;
                self.record(edit)
            }
            Command::Schedule {
                date,
                start,
                end,
                task,
                name,
            } => {
                let task = task.map(|r| self.resolve(r)).transpose()?;
                let slot = Slot::new(date, start, end);
                let created = edits::schedule(&mut self.planner, &name, slot, task)?;
                self.record_new(created)
            }
            Command::Unschedule(item) => {
                let edit = edits::unschedule(&self.planner, self.resolve(item)?)?;
                self.record(edit)
            }
            Command::Drag { item, offsets } => self.drag(self.resolve(item)?, &offsets),
            Command::Repeat { item, every_days } => {
                let item = self.resolve(item)?;
                let created = edits::repeat(&mut self.planner, item, every_days)?;
                self.record_new(created)
            }
            Command::AddPlan(name) => {
                let created = edits::add_planned(&mut self.planner, &name)?;
                self.record_new(created)
            }
            Command::LinkPlan { plan, item } => {
                let (plan, item) = (self.resolve(plan)?, self.resolve(item)?);
                let edit = edits::link_plan(&self.planner, plan, item)?;
                self.record(edit)
            }
            Command::Undo(count) => self.step(count, false),
            Command::Redo(count) => self.step(count, true),
            Command::History { long } => Ok(self
                .log
                .log_text(long)
                .lines()
                .map(str::to_string)
                .collect()),
            Command::Tree => Ok(self.planner.tree_lines()),
            Command::Calendar => {
                let lines = self.planner.calendar_lines();
                if lines.is_empty() {
                    return Ok(vec!["(calendar is empty)".to_string()]);
                }
                Ok(lines)
            }
            Command::Clear => {
                self.log.clear();
                let freed = self.planner.prune();
                Ok(vec![format!("history cleared, {freed} entities freed")])
            }
            Command::Help => Ok(HELP.lines().map(str::to_string).collect()),
        }
    }

    /// Runs a drag through a continuous run; intermediate positions are
    /// applied but only the last one is recorded.
    fn drag(&mut self, item: HostId, offsets: &[i64]) -> AppResult<Vec<String>> {
        let (drag, edit) = Drag::begin(&self.planner, item)?;
        let name = edit.name();
        let mut run = self.log.begin_continuous_run(edit, &mut self.planner)?;
        let mut minutes = 0;
        for offset in offsets {
            minutes += offset;
            let slot = drag.origin().shifted(minutes);
            log::debug!("Dragging {item} to {slot}");
            if let Err(err) = drag.to(slot).and_then(|updates| run.update(updates)) {
                run.abort()?;
                return Err(err.into());
            }
        }
        if run.end()? {
            let slot = drag.origin().shifted(minutes);
            Ok(vec![format!("ok: {name}"), format!("{item} now at {slot}")])
        } else {
            Ok(vec![format!("no change: {name}")])
        }
    }

    fn step(&mut self, count: usize, redo: bool) -> AppResult<Vec<String>> {
        let mut out = Vec::new();
        for _ in 0..count {
            let name = if redo {
                self.log.redo_names().next()
            } else {
                self.log.undo_names().next()
            };
            let Some(name) = name else {
                if out.is_empty() {
                    return Err(AppError::NothingTo(if redo { "redo" } else { "undo" }));
                }
                break;
            };
            let done = if redo {
                self.log.redo(&mut self.planner)?
            } else {
                self.log.undo(&mut self.planner)?
            };
            if done {
                out.push(format!("{}: {name}", if redo { "redone" } else { "undone" }));
            }
        }
        Ok(out)
    }

    /// Parses and executes one line.
    pub fn run_line(&mut self, line: &str) -> AppResult<Vec<String>> {
        match parse_line(line)? {
            Some(command) => self.execute(command),
            None => Ok(Vec::new()),
        }
    }

    /// Runs every line of `input`, writing results to `output`. Failing
    /// commands are reported and skipped. Returns the number of failures.
    pub fn run<R: BufRead, W: Write>(
        &mut self,
        input: R,
        mut output: W,
        prompt: bool,
    ) -> AppResult<usize> {
        let mut failures = 0;
        if prompt {
            write!(output, "> ")?;
            output.flush()?;
        }
        for (number, line) in input.lines().enumerate() {
            let line = line?;
            match self.run_line(&line) {
                Ok(lines) => {
                    for text in lines {
                        writeln!(output, "{text}")?;
                    }
                }
                Err(err) => {
                    failures += 1;
                    log::warn!("Line {}: {err}", number + 1);
                    writeln!(output, "error (line {}): {err}", number + 1)?;
                }
            }
            if prompt {
                write!(output, "> ")?;
                output.flush()?;
            }
        }
        Ok(failures)
    }
}
