//! Parsing of script and prompt lines.
//!
//! Entities are referred to by the number shown in listings (`#3`).

use chrono::{NaiveDate, NaiveTime};

use almanac_planner::TaskStatus;

use crate::error::{AppError, AppResult};

/// An entity reference as typed by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ref(pub u32);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Adds under `parent`, or under the root task.
    AddTask { parent: Option<Ref>, name: String },
    RemoveTask(Ref),
    MoveTask {
        task: Ref,
        parent: Ref,
        index: Option<usize>,
    },
    RenameTask { task: Ref, name: String },
    SetStatus {
        task: Ref,
        status: TaskStatus,
        date: Option<NaiveDate>,
    },
    Schedule {
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
        task: Option<Ref>,
        name: String,
    },
    Unschedule(Ref),
    /// Successive offsets in minutes from the item's current slot, committed
    /// as one step.
    Drag { item: Ref, offsets: Vec<i64> },
    Repeat { item: Ref, every_days: u32 },
    AddPlan(String),
    LinkPlan { plan: Ref, item: Ref },
    Undo(usize),
    Redo(usize),
    History { long: bool },
    Tree,
    Calendar,
    /// Clears the history and frees everything only it could bring back.
    Clear,
    Help,
}

pub const HELP: &str = "\
task add [#parent] NAME          add a task (under the root by default)
task rm #task                    remove a task and its subtree
task mv #task #parent [INDEX]    move a task
task rename #task NAME           rename a task
task status #task STATUS [DATE]  set todo, doing or done
schedule DATE HH:MM-HH:MM [#task] NAME
unschedule #item
drag #item MINUTES...            move an item step by step, one undo entry
repeat #item DAYS                make an item repeat
plan add NAME | plan link #plan #item
undo [N] | redo [N] | history [long] | tree | calendar | clear | help";

fn parse_ref(token: &str) -> AppResult<Ref> {
    token
        .strip_prefix('#')
        .and_then(|n| n.parse().ok())
        .map(Ref)
        .ok_or_else(|| AppError::Parse(format!("expected an entity like #3, got '{token}'")))
}

fn parse_number<N: std::str::FromStr>(token: &str, what: &str) -> AppResult<N> {
    token
        .parse()
        .map_err(|_| AppError::Parse(format!("expected {what}, got '{token}'")))
}

fn parse_date(token: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(token, "%Y-%m-%d")
        .map_err(|_| AppError::Parse(format!("expected a date like 2024-03-01, got '{token}'")))
}

fn parse_time(token: &str) -> AppResult<NaiveTime> {
    NaiveTime::parse_from_str(token, "%H:%M")
        .map_err(|_| AppError::Parse(format!("expected a time like 09:30, got '{token}'")))
}

fn parse_range(token: &str) -> AppResult<(NaiveTime, NaiveTime)> {
    let (start, end) = token
        .split_once('-')
        .ok_or_else(|| AppError::Parse(format!("expected a range like 09:00-10:30, got '{token}'")))?;
    let (start, end) = (parse_time(start)?, parse_time(end)?);
    if end <= start {
        return Err(AppError::Parse(format!("'{token}' ends before it starts")));
    }
    Ok((start, end))
}

/// The remaining tokens, joined back into a name.
fn name(tokens: &[&str], usage: &str) -> AppResult<String> {
    if tokens.is_empty() {
        return Err(AppError::Parse(format!("missing name; usage: {usage}")));
    }
    Ok(tokens.join(" "))
}

fn arg<'a>(tokens: &[&'a str], index: usize, usage: &str) -> AppResult<&'a str> {
    tokens
        .get(index)
        .copied()
        .ok_or_else(|| AppError::Parse(format!("usage: {usage}")))
}

fn parse_task(tokens: &[&str]) -> AppResult<Command> {
    let sub = arg(tokens, 0, "task add|rm|mv|rename|status ...")?;
    let rest = &tokens[1..];
    match sub {
        "add" => {
            let usage = "task add [#parent] NAME";
            match rest.first() {
                Some(first) if first.starts_with('#') => Ok(Command::AddTask {
                    parent: Some(parse_ref(first)?),
                    name: name(&rest[1..], usage)?,
                }),
                _ => Ok(Command::AddTask {
                    parent: None,
                    name: name(rest, usage)?,
                }),
            }
        }
        "rm" => Ok(Command::RemoveTask(parse_ref(arg(rest, 0, "task rm #task")?)?)),
        "mv" => {
            let usage = "task mv #task #parent [INDEX]";
            Ok(Command::MoveTask {
                task: parse_ref(arg(rest, 0, usage)?)?,
                parent: parse_ref(arg(rest, 1, usage)?)?,
                index: rest.get(2).map(|t| parse_number(t, "an index")).transpose()?,
            })
        }
        "rename" => {
            let usage = "task rename #task NAME";
            Ok(Command::RenameTask {
                task: parse_ref(arg(rest, 0, usage)?)?,
                name: name(&rest[1..], usage)?,
            })
        }
        "status" => {
            let usage = "task status #task todo|doing|done [DATE]";
            Ok(Command::SetStatus {
                task: parse_ref(arg(rest, 0, usage)?)?,
                status: arg(rest, 1, usage)?.parse()?,
                date: rest.get(2).map(|t| parse_date(t)).transpose()?,
            })
        }
        other => Err(AppError::Parse(format!("unknown task command '{other}'"))),
    }
}

fn parse_schedule(tokens: &[&str]) -> AppResult<Command> {
    let usage = "schedule DATE HH:MM-HH:MM [#task] NAME";
    let date = parse_date(arg(tokens, 0, usage)?)?;
    let (start, end) = parse_range(arg(tokens, 1, usage)?)?;
    let rest = &tokens[2..];
    let (task, rest) = match rest.first() {
        Some(first) if first.starts_with('#') => (Some(parse_ref(first)?), &rest[1..]),
        _ => (None, rest),
    };
    Ok(Command::Schedule {
        date,
        start,
        end,
        task,
        name: name(rest, usage)?,
    })
}

fn parse_plan(tokens: &[&str]) -> AppResult<Command> {
    match arg(tokens, 0, "plan add NAME | plan link #plan #item")? {
        "add" => Ok(Command::AddPlan(name(&tokens[1..], "plan add NAME")?)),
        "link" => {
            let usage = "plan link #plan #item";
            Ok(Command::LinkPlan {
                plan: parse_ref(arg(tokens, 1, usage)?)?,
                item: parse_ref(arg(tokens, 2, usage)?)?,
            })
        }
        other => Err(AppError::Parse(format!("unknown plan command '{other}'"))),
    }
}

fn parse_count(tokens: &[&str]) -> AppResult<usize> {
    match tokens.first() {
        Some(token) => parse_number(token, "a count"),
        None => Ok(1),
    }
}

/// Parses one line. Blank lines and comments give `None`.
pub fn parse_line(line: &str) -> AppResult<Option<Command>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let rest = &tokens[1..];
    let command = match tokens[0] {
        "task" => parse_task(rest)?,
        "schedule" => parse_schedule(rest)?,
        "unschedule" => Command::Unschedule(parse_ref(arg(rest, 0, "unschedule #item")?)?),
        "drag" => {
            let usage = "drag #item MINUTES...";
            let item = parse_ref(arg(rest, 0, usage)?)?;
            let offsets = rest[1..]
                .iter()
                .map(|t| parse_number(t, "minutes"))
                .collect::<AppResult<Vec<i64>>>()?;
            if offsets.is_empty() {
                return Err(AppError::Parse(format!("usage: {usage}")));
            }
            Command::Drag { item, offsets }
        }
        "repeat" => {
            let usage = "repeat #item DAYS";
            let every_days: u32 = parse_number(arg(rest, 1, usage)?, "a number of days")?;
            if every_days == 0 {
                return Err(AppError::Parse("an item cannot repeat every 0 days".into()));
            }
            Command::Repeat {
                item: parse_ref(arg(rest, 0, usage)?)?,
                every_days,
            }
        }
        "plan" => parse_plan(rest)?,
        "undo" => Command::Undo(parse_count(rest)?),
        "redo" => Command::Redo(parse_count(rest)?),
        "history" => Command::History {
            long: rest.first() == Some(&"long"),
        },
        "tree" => Command::Tree,
        "calendar" => Command::Calendar,
        "clear" => Command::Clear,
        "help" => Command::Help,
        other => return Err(AppError::Parse(format!("unknown command '{other}' (try 'help')"))),
    };
    Ok(Some(command))
}
