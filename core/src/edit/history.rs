//! The undo/redo log.
//!
//! [`EditLog`] records registered edits as a linear undo stack. Undoing moves
//! entries to the redo stack; recording a new edit discards the redo stack.
//!
//! While the log is locked, registered edits are not run at all. Undo and
//! redo lock the log for their duration so that nothing they trigger can
//! re-register itself.

use std::collections::VecDeque;
use std::fmt;

use super::action::{EditError, EditResult, Editable};
use super::base::{BaseEdit, ContinuousEdit, EditState};
use super::callbacks::{CallbackPhase, EditCallbacks};
use super::continuous::ContinuousRun;
use crate::config::EditLogConfig;

/// Default maximum number of undo steps.
pub const DEFAULT_MAX_UNDO: usize = 100;

const LOG_TITLE: &str = "\n--------\nEDIT LOG\n--------\n\n";
const LOG_FOOTER: &str = "\n\n--------\n\n";

/// One undo step: an edit, plus any later edits that stacked onto it.
struct Entry<T: Editable> {
    edits: Vec<BaseEdit<T>>,
}

impl<T: Editable> Entry<T> {
    fn name(&self) -> String {
        self.edits.first().map(BaseEdit::name).unwrap_or_default()
    }

    fn text(&self, long: bool) -> String {
        let mut text = self.name();
        if long {
            for edit in &self.edits {
                text.push_str("\n\t");
                text.push_str(&edit.description());
            }
        }
        text
    }
}

/// Linear undo/redo history of edits over one target.
///
/// # Example
///
/// ```ignore
/// let mut log = EditLog::new(&EditLogConfig::default());
/// let mut planner = Planner::new()?;
///
/// log.run(rename_task(&planner, id, "Groceries")?, &mut planner)?;
/// log.undo(&mut planner)?;
/// log.redo(&mut planner)?;
/// ```
pub struct EditLog<T: Editable> {
    undo_stack: VecDeque<Entry<T>>,
    redo_stack: Vec<Entry<T>>,
    max_undo: usize,
    lock_depth: usize,
    callbacks: EditCallbacks<T>,
    /// Distance from the saved state.
    ///
    /// - `Some(0)`: the current state matches the last save.
    /// - `Some(n)` where `n > 0`: `n` undos needed to reach the saved state.
    /// - `Some(n)` where `n < 0`: `|n|` redos needed to reach the saved state.
    /// - `None`: the save point is unreachable (dropped by the depth bound, or
    ///   its redo branch was discarded).
    save_distance: Option<i64>,
}

impl<T: Editable> EditLog<T> {
    pub fn new(config: &EditLogConfig) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_undo: config.max_undo.max(1),
            lock_depth: usize::from(config.start_locked),
            callbacks: EditCallbacks::new(),
            save_distance: Some(0),
        }
    }

    /// Runs `edit` and records it if it registers and changed anything.
    ///
    /// A registering edit is not run at all while the log is locked; the
    /// call returns `Ok(false)` and the edit stays pending. Unregistered
    /// edits always run and are never recorded.
    ///
    /// Returns whether the edit is valid.
    pub fn run(&mut self, mut edit: BaseEdit<T>, target: &mut T) -> EditResult<bool> {
        if edit.registers() && self.is_locked() {
            log::debug!("Edit log locked, suppressed '{}'", edit.name());
            return Ok(false);
        }
        self.callbacks.fire(CallbackPhase::PreRun, target, edit.edit());
        let valid = edit.run(target)?;
        if valid {
            self.callbacks.fire(CallbackPhase::PostRun, target, edit.edit());
        }
        if edit.registers() {
            self.add_edit(edit);
        }
        Ok(valid)
    }

    /// Starts a continuous run of `edit` against `target`.
    ///
    /// The returned session holds the log and the target until it is ended,
    /// aborted or dropped, so no other edit can be recorded meanwhile.
    pub fn begin_continuous_run<'a, E>(
        &'a mut self,
        mut edit: BaseEdit<T, E>,
        target: &'a mut T,
    ) -> EditResult<ContinuousRun<'a, T, E>>
    where
        E: ContinuousEdit<T>,
    {
        if edit.registers() && self.is_locked() {
            return Err(EditError::LogLocked);
        }
        self.callbacks.fire(CallbackPhase::PreRun, target, edit.edit());
        edit.begin_continuous_run(target)?;
        Ok(ContinuousRun::new(self, edit, target))
    }

    /// Appends an already-run edit.
    ///
    /// Returns `false`, leaving the log untouched, if the log is locked, the
    /// edit is not done, or it changed nothing. Otherwise the redo stack is
    /// discarded.
    pub fn add_edit(&mut self, edit: BaseEdit<T>) -> bool {
        if self.is_locked() {
            log::debug!("Edit log locked, '{}' not recorded", edit.name());
            return false;
        }
        if edit.state() != EditState::Done {
            log::warn!("Edit '{}' is {:?}, not recorded", edit.name(), edit.state());
            return false;
        }
        if !edit.is_valid() {
            log::debug!("Edit '{}' changed nothing, not recorded", edit.name());
            return false;
        }

        // Discarding the redo stack drops a save point that was in it.
        self.redo_stack.clear();
        if let Some(d) = self.save_distance
            && d < 0
        {
            self.save_distance = None;
        }

        if let Some(top) = self.undo_stack.back_mut()
            && let Some(previous) = top.edits.last()
            && edit.edit().stacks_with(previous.edit())
        {
            log::debug!("Stacked '{}' onto '{}'", edit.name(), top.name());
            top.edits.push(edit);
            if self.save_distance == Some(0) {
                self.save_distance = None;
            }
            return true;
        }

        log::debug!("Recorded '{}'", edit.name());
        if let Some(d) = &mut self.save_distance {
            *d += 1;
        }
        self.undo_stack.push_back(Entry { edits: vec![edit] });
        self.enforce_depth();
        true
    }

    /// Undoes the most recent entry. Returns `Ok(false)` if there is none.
    pub fn undo(&mut self, target: &mut T) -> EditResult<bool> {
        let Some(mut entry) = self.undo_stack.pop_back() else {
            return Ok(false);
        };
        log::debug!("Undo '{}'", entry.name());
        self.lock();
        let result = self.undo_entry(&mut entry, target);
        self.unlock();
        if let Err(err) = result {
            log::warn!("Undo of '{}' failed, entry kept: {err}", entry.name());
            self.undo_stack.push_back(entry);
            return Err(err);
        }
        self.redo_stack.push(entry);
        if let Some(d) = &mut self.save_distance {
            *d -= 1;
        }
        Ok(true)
    }

    /// Redoes the most recently undone entry. Returns `Ok(false)` if there
    /// is none.
    pub fn redo(&mut self, target: &mut T) -> EditResult<bool> {
        let Some(mut entry) = self.redo_stack.pop() else {
            return Ok(false);
        };
        log::debug!("Redo '{}'", entry.name());
        self.lock();
        let result = self.redo_entry(&mut entry, target);
        self.unlock();
        if let Err(err) = result {
            log::warn!("Redo of '{}' failed, entry kept: {err}", entry.name());
            self.redo_stack.push(entry);
            return Err(err);
        }
        self.undo_stack.push_back(entry);
        if let Some(d) = &mut self.save_distance {
            *d += 1;
        }
        self.enforce_depth();
        Ok(true)
    }

    /// Undoes an entry's edits newest first. On failure the edits already
    /// undone are redone, so the entry is whole again.
    fn undo_entry(&self, entry: &mut Entry<T>, target: &mut T) -> EditResult {
        for i in (0..entry.edits.len()).rev() {
            let edit = &mut entry.edits[i];
            self.callbacks.fire(CallbackPhase::PreUndo, target, edit.edit());
            if let Err(err) = edit.undo(target) {
                for done in &mut entry.edits[i + 1..] {
                    if let Err(redo_err) = done.redo(target) {
                        log::error!("Could not restore '{}': {redo_err}", done.name());
                    }
                }
                return Err(err);
            }
            self.callbacks.fire(CallbackPhase::PostUndo, target, edit.edit());
        }
        Ok(())
    }

    /// Redoes an entry's edits oldest first, undoing the redone ones again
    /// on failure.
    fn redo_entry(&self, entry: &mut Entry<T>, target: &mut T) -> EditResult {
        for i in 0..entry.edits.len() {
            let edit = &mut entry.edits[i];
            self.callbacks.fire(CallbackPhase::PreRun, target, edit.edit());
            if let Err(err) = edit.redo(target) {
                for done in entry.edits[..i].iter_mut().rev() {
                    if let Err(undo_err) = done.undo(target) {
                        log::error!("Could not restore '{}': {undo_err}", done.name());
                    }
                }
                return Err(err);
            }
            self.callbacks.fire(CallbackPhase::PostRun, target, edit.edit());
        }
        Ok(())
    }

    fn enforce_depth(&mut self) {
        if self.undo_stack.len() <= self.max_undo {
            return;
        }
        if let Some(dropped) = self.undo_stack.pop_front() {
            log::trace!("Undo depth {} exceeded, dropped '{}'", self.max_undo, dropped.name());
        }
        // A save point beyond the oldest surviving entry is gone.
        if let Some(d) = self.save_distance
            && d > self.undo_stack.len() as i64
        {
            self.save_distance = None;
        }
    }

    /// Locks the log. Locks nest; each `lock` needs a matching
    /// [`unlock`](Self::unlock).
    pub fn lock(&mut self) {
        self.lock_depth += 1;
    }

    pub fn unlock(&mut self) {
        if self.lock_depth == 0 {
            log::warn!("Edit log unlocked more often than locked");
            return;
        }
        self.lock_depth -= 1;
    }

    /// Fully unlocks the log, e.g. once initial data has been loaded.
    pub fn open(&mut self) {
        if self.lock_depth > 0 {
            log::debug!("Edit log opened");
        }
        self.lock_depth = 0;
    }

    pub fn is_locked(&self) -> bool {
        self.lock_depth > 0
    }

    /// Whether the target is in a committed state that may be serialized.
    pub fn can_persist(&self) -> bool {
        !self.is_locked()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Returns the number of entries in the undo stack.
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Returns the number of entries in the redo stack.
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn max_undo(&self) -> usize {
        self.max_undo
    }

    /// The most recently recorded edit.
    pub fn latest_edit(&self) -> Option<&BaseEdit<T>> {
        self.undo_stack.back().and_then(|entry| entry.edits.last())
    }

    /// Entry names on the undo stack, most recent first.
    pub fn undo_names(&self) -> impl Iterator<Item = String> + '_ {
        self.undo_stack.iter().rev().map(Entry::name)
    }

    /// Entry names on the redo stack, next to redo first.
    pub fn redo_names(&self) -> impl Iterator<Item = String> + '_ {
        self.redo_stack.iter().rev().map(Entry::name)
    }

    /// Renders the undo stack, oldest first. `long` adds each edit's
    /// description on its own indented line.
    pub fn log_text(&self, long: bool) -> String {
        if self.undo_stack.is_empty() {
            return format!("{LOG_TITLE}[EMPTY]\n\n");
        }
        let entries: Vec<String> = self.undo_stack.iter().map(|e| e.text(long)).collect();
        format!("{LOG_TITLE}{}{LOG_FOOTER}", entries.join("\n\n"))
    }

    pub fn callbacks(&self) -> &EditCallbacks<T> {
        &self.callbacks
    }

    pub fn callbacks_mut(&mut self) -> &mut EditCallbacks<T> {
        &mut self.callbacks
    }

    pub(crate) fn fire(&self, phase: CallbackPhase, target: &T, edit: &BaseEdit<T>) {
        self.callbacks.fire(phase, target, edit.edit());
    }

    /// Records the current state as the saved state.
    pub fn mark_saved(&mut self) {
        self.save_distance = Some(0);
    }

    /// Returns `true` if the current state differs from the last saved state,
    /// or if the save point is unreachable.
    pub fn has_unsaved_changes(&self) -> bool {
        self.save_distance != Some(0)
    }

    /// Clears both stacks. Callbacks and the lock are kept.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        if self.save_distance != Some(0) {
            self.save_distance = None;
        }
    }
}

impl<T: Editable> Default for EditLog<T> {
    fn default() -> Self {
        Self::new(&EditLogConfig::default())
    }
}

impl<T: Editable> fmt::Debug for EditLog<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditLog")
            .field("undo_count", &self.undo_stack.len())
            .field("redo_count", &self.redo_stack.len())
            .field("max_undo", &self.max_undo)
            .field("lock_depth", &self.lock_depth)
            .field("save_distance", &self.save_distance)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;
    use crate::edit::Edit;

    struct Counter {
        value: i32,
    }

    impl Editable for Counter {}

    #[derive(Debug)]
    struct Add {
        amount: i32,
    }

    impl Edit<Counter> for Add {
        fn apply(&mut self, target: &mut Counter) -> EditResult {
            target.value += self.amount;
            Ok(())
        }

        fn undo(&mut self, target: &mut Counter) -> EditResult {
            target.value -= self.amount;
            Ok(())
        }

        fn is_valid(&self) -> bool {
            self.amount != 0
        }

        fn name(&self) -> String {
            format!("Add {}", self.amount)
        }

        fn description(&self) -> String {
            format!("value += {}", self.amount)
        }
    }

    /// Consecutive nudges share one undo entry.
    #[derive(Debug)]
    struct Nudge;

    impl Edit<Counter> for Nudge {
        fn apply(&mut self, target: &mut Counter) -> EditResult {
            target.value += 1;
            Ok(())
        }

        fn undo(&mut self, target: &mut Counter) -> EditResult {
            target.value -= 1;
            Ok(())
        }

        fn is_valid(&self) -> bool {
            true
        }

        fn name(&self) -> String {
            "Nudge".into()
        }

        fn stacks_with(&self, previous: &dyn Edit<Counter>) -> bool {
            previous.as_any().is::<Nudge>()
        }
    }

    #[derive(Debug)]
    struct Failing;

    impl Edit<Counter> for Failing {
        fn apply(&mut self, _target: &mut Counter) -> EditResult {
            Err(EditError::Custom("always fails".into()))
        }

        fn undo(&mut self, _target: &mut Counter) -> EditResult {
            Err(EditError::Custom("always fails".into()))
        }

        fn is_valid(&self) -> bool {
            false
        }

        fn name(&self) -> String {
            "Failing".into()
        }
    }

    /// Applies fine, cannot be undone.
    #[derive(Debug)]
    struct StuckOnUndo;

    impl Edit<Counter> for StuckOnUndo {
        fn apply(&mut self, target: &mut Counter) -> EditResult {
            target.value += 100;
            Ok(())
        }

        fn undo(&mut self, _target: &mut Counter) -> EditResult {
            Err(EditError::Custom("stuck".into()))
        }

        fn is_valid(&self) -> bool {
            true
        }

        fn name(&self) -> String {
            "Stuck".into()
        }
    }

    /// Applies once; the second apply fails.
    #[derive(Debug)]
    struct OnceOnly {
        applied: bool,
    }

    impl Edit<Counter> for OnceOnly {
        fn apply(&mut self, target: &mut Counter) -> EditResult {
            if self.applied {
                return Err(EditError::Custom("already applied once".into()));
            }
            self.applied = true;
            target.value += 7;
            Ok(())
        }

        fn undo(&mut self, target: &mut Counter) -> EditResult {
            target.value -= 7;
            Ok(())
        }

        fn is_valid(&self) -> bool {
            true
        }

        fn name(&self) -> String {
            "Once".into()
        }
    }

    fn log_entry_edit(edit: impl Edit<Counter>, counter: &mut Counter) -> BaseEdit<Counter> {
        let mut edit = BaseEdit::new(edit);
        edit.run(counter).unwrap();
        edit
    }

    fn add(amount: i32) -> BaseEdit<Counter> {
        BaseEdit::new(Add { amount })
    }

    fn new_log() -> EditLog<Counter> {
        EditLog::default()
    }

    #[test]
    fn run_applies_and_records() {
        let mut log = new_log();
        let mut counter = Counter { value: 0 };

        assert!(log.run(add(5), &mut counter).unwrap());

        assert_eq!(counter.value, 5);
        assert_eq!(log.undo_count(), 1);
        assert_eq!(log.redo_count(), 0);
    }

    #[test]
    fn undo_and_redo_move_between_stacks() {
        let mut log = new_log();
        let mut counter = Counter { value: 0 };
        log.run(add(5), &mut counter).unwrap();

        assert!(log.undo(&mut counter).unwrap());
        assert_eq!(counter.value, 0);
        assert_eq!((log.undo_count(), log.redo_count()), (0, 1));

        assert!(log.redo(&mut counter).unwrap());
        assert_eq!(counter.value, 5);
        assert_eq!((log.undo_count(), log.redo_count()), (1, 0));
    }

    #[test]
    fn empty_stacks_return_false() {
        let mut log = new_log();
        let mut counter = Counter { value: 0 };
        assert!(!log.undo(&mut counter).unwrap());
        assert!(!log.redo(&mut counter).unwrap());
    }

    #[test]
    fn invalid_edit_is_not_recorded() {
        let mut log = new_log();
        let mut counter = Counter { value: 0 };
        assert!(!log.run(add(0), &mut counter).unwrap());
        assert!(!log.can_undo());
    }

    #[test]
    fn unregistered_edit_runs_without_recording() {
        let mut log = new_log();
        let mut counter = Counter { value: 0 };
        log.lock();
        assert!(log.run(BaseEdit::unregistered(Add { amount: 2 }), &mut counter).unwrap());
        assert_eq!(counter.value, 2);
        assert!(!log.can_undo());
    }

    #[test]
    fn locked_log_suppresses_registered_edits() {
        let mut log = EditLog::new(&EditLogConfig {
            start_locked: true,
            ..EditLogConfig::default()
        });
        let mut counter = Counter { value: 0 };
        assert!(log.is_locked());
        assert!(!log.can_persist());
        assert!(!log.run(add(3), &mut counter).unwrap());
        assert_eq!(counter.value, 0);

        log.open();
        assert!(log.run(add(3), &mut counter).unwrap());
        assert_eq!(counter.value, 3);
    }

    #[test]
    fn lock_nests() {
        let mut log = new_log();
        log.lock();
        log.lock();
        log.unlock();
        assert!(log.is_locked());
        log.unlock();
        assert!(!log.is_locked());
        log.unlock();
        assert!(!log.is_locked());
    }

    #[test]
    fn new_edit_discards_redo_tail() {
        let mut log = new_log();
        let mut counter = Counter { value: 0 };
        for amount in [1, 2, 3] {
            log.run(add(amount), &mut counter).unwrap();
        }
        log.undo(&mut counter).unwrap();
        log.undo(&mut counter).unwrap();
        assert_eq!(log.redo_count(), 2);

        log.run(add(10), &mut counter).unwrap();
        assert_eq!(counter.value, 11);
        assert!(!log.can_redo());
        assert_eq!(log.undo_names().collect::<Vec<_>>(), ["Add 10", "Add 1"]);
    }

    #[test]
    fn failed_run_records_nothing() {
        let mut log = new_log();
        let mut counter = Counter { value: 0 };
        assert!(log.run(BaseEdit::new(Failing), &mut counter).is_err());
        assert!(!log.can_undo());
    }

    #[test]
    fn failed_undo_releases_lock() {
        let mut log = new_log();
        let mut counter = Counter { value: 0 };
        log.run(BaseEdit::new(StuckOnUndo), &mut counter).unwrap();

        assert!(log.undo(&mut counter).is_err());
        assert!(!log.is_locked());
        assert_eq!(counter.value, 100);
        assert_eq!((log.undo_count(), log.redo_count()), (1, 0));
        assert_eq!(log.undo_names().next().as_deref(), Some("Stuck"));
        assert!(log.run(add(1), &mut counter).unwrap());
    }

    #[test]
    fn failed_undo_restores_stacked_edits() {
        let mut log = new_log();
        let mut counter = Counter { value: 0 };
        let stuck = log_entry_edit(StuckOnUndo, &mut counter);
        let nudge = log_entry_edit(Nudge, &mut counter);
        log.undo_stack.push_back(Entry {
            edits: vec![stuck, nudge],
        });

        assert!(log.undo(&mut counter).is_err());
        assert_eq!(counter.value, 101);
        assert_eq!((log.undo_count(), log.redo_count()), (1, 0));
        assert_eq!(log.latest_edit().unwrap().state(), EditState::Done);
    }

    #[test]
    fn failed_redo_keeps_the_entry() {
        let mut log = new_log();
        let mut counter = Counter { value: 0 };
        log.run(BaseEdit::new(OnceOnly { applied: false }), &mut counter).unwrap();
        log.undo(&mut counter).unwrap();
        assert_eq!(counter.value, 0);

        assert!(log.redo(&mut counter).is_err());
        assert_eq!(counter.value, 0);
        assert_eq!((log.undo_count(), log.redo_count()), (0, 1));
    }

    #[test]
    fn add_edit_requires_done() {
        let mut log = new_log();
        assert!(!log.add_edit(add(1)));
        assert!(!log.can_undo());
    }

    #[test]
    fn stacked_edits_share_an_entry() {
        let mut log = new_log();
        let mut counter = Counter { value: 0 };
        log.run(add(10), &mut counter).unwrap();
        for _ in 0..3 {
            log.run(BaseEdit::new(Nudge), &mut counter).unwrap();
        }
        assert_eq!(counter.value, 13);
        assert_eq!(log.undo_count(), 2);

        log.undo(&mut counter).unwrap();
        assert_eq!(counter.value, 10);
        log.redo(&mut counter).unwrap();
        assert_eq!(counter.value, 13);
    }

    #[test]
    fn max_undo_drops_oldest() {
        let mut log = EditLog::new(&EditLogConfig {
            max_undo: 2,
            ..EditLogConfig::default()
        });
        let mut counter = Counter { value: 0 };
        for amount in [1, 2, 3] {
            log.run(add(amount), &mut counter).unwrap();
        }
        assert_eq!(log.undo_count(), 2);
        assert_eq!(log.undo_names().collect::<Vec<_>>(), ["Add 3", "Add 2"]);
    }

    #[test]
    fn save_tracking() {
        let mut log = new_log();
        let mut counter = Counter { value: 0 };
        assert!(!log.has_unsaved_changes());

        log.run(add(1), &mut counter).unwrap();
        assert!(log.has_unsaved_changes());
        log.mark_saved();
        assert!(!log.has_unsaved_changes());

        log.undo(&mut counter).unwrap();
        assert!(log.has_unsaved_changes());
        log.redo(&mut counter).unwrap();
        assert!(!log.has_unsaved_changes());

        // Branching from before the save point makes it unreachable.
        log.undo(&mut counter).unwrap();
        log.run(add(2), &mut counter).unwrap();
        log.undo(&mut counter).unwrap();
        assert!(log.has_unsaved_changes());
    }

    #[test]
    fn callbacks_fire_around_run_undo_redo() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut log = new_log();
        for phase in CallbackPhase::ALL {
            let sink = Arc::clone(&seen);
            log.callbacks_mut()
                .register::<Add, _>(phase, "trace", move |counter, edit| {
                    sink.lock().push(format!("{} {} {}", phase.label(), edit.amount, counter.value));
                })
                .unwrap();
        }
        let mut counter = Counter { value: 0 };
        log.run(add(4), &mut counter).unwrap();
        log.undo(&mut counter).unwrap();
        log.redo(&mut counter).unwrap();

        assert_eq!(
            *seen.lock(),
            [
                "pre-run 4 0",
                "post-run 4 4",
                "pre-undo 4 4",
                "post-undo 4 0",
                "pre-run 4 0",
                "post-run 4 4",
            ]
        );
    }

    #[test]
    fn log_text_formats() {
        let mut log = new_log();
        let mut counter = Counter { value: 0 };
        assert_eq!(log.log_text(true), "\n--------\nEDIT LOG\n--------\n\n[EMPTY]\n\n");

        log.run(add(2), &mut counter).unwrap();
        log.run(BaseEdit::new(Nudge), &mut counter).unwrap();
        log.run(BaseEdit::new(Nudge), &mut counter).unwrap();
        assert_eq!(
            log.log_text(false),
            "\n--------\nEDIT LOG\n--------\n\nAdd 2\n\nNudge\n\n--------\n\n"
        );
        assert_eq!(
            log.log_text(true),
            "\n--------\nEDIT LOG\n--------\n\nAdd 2\n\tvalue += 2\n\nNudge\n\tNudge\n\tNudge\n\n--------\n\n"
        );
    }
}
