//! Continuous-run sessions.

use std::fmt;

use super::action::{EditError, EditResult, Editable};
use super::base::{BaseEdit, ContinuousEdit};
use super::callbacks::CallbackPhase;
use super::history::EditLog;

/// An open continuous run, created by
/// [`EditLog::begin_continuous_run`].
///
/// The session borrows the log and the target exclusively, so nothing else
/// can be recorded until it finishes. It finishes in one of three ways:
///
/// - [`end`](Self::end) commits the last reached state as one undo entry;
/// - [`abort`](Self::abort) reverts the target and commits nothing;
/// - dropping the session commits, like `end`.
///
/// # Example
///
/// ```ignore
/// let mut drag = log.begin_continuous_run(BaseEdit::continuous(edit), &mut planner)?;
/// for offset in pointer_offsets {
///     drag.update(offset)?;
/// }
/// drag.end()?;
/// ```
pub struct ContinuousRun<'a, T: Editable, E: ContinuousEdit<T>> {
    log: &'a mut EditLog<T>,
    target: &'a mut T,
    edit: Option<BaseEdit<T, E>>,
}

impl<'a, T: Editable, E: ContinuousEdit<T>> ContinuousRun<'a, T, E> {
    pub(crate) fn new(log: &'a mut EditLog<T>, edit: BaseEdit<T, E>, target: &'a mut T) -> Self {
        Self {
            log,
            target,
            edit: Some(edit),
        }
    }

    /// The target in its current, optimistically edited state.
    pub fn target(&self) -> &T {
        &*self.target
    }

    /// The edit being run.
    pub fn edit(&self) -> Option<&E> {
        self.edit.as_ref().map(BaseEdit::edit)
    }

    /// Re-parameterises the edit in place.
    pub fn update(&mut self, update: E::Update) -> EditResult {
        let edit = self.edit.as_mut().ok_or(EditError::NotStreaming(String::new()))?;
        edit.update_continuous_run(&mut *self.target, update)
    }

    /// Commits the run as a single entry. Returns whether the edit is valid.
    pub fn end(mut self) -> EditResult<bool> {
        self.commit()
    }

    /// Reverts the target to its state before the run. Nothing is recorded.
    pub fn abort(mut self) -> EditResult {
        let Some(mut edit) = self.edit.take() else {
            return Ok(());
        };
        edit.cancel_continuous_run(&mut *self.target)
    }

    fn commit(&mut self) -> EditResult<bool> {
        let Some(edit) = self.edit.take() else {
            return Ok(false);
        };
        let mut edit = edit.into_dyn();
        let valid = edit.end_continuous_run()?;
        if valid {
            self.log.fire(CallbackPhase::PostRun, &*self.target, &edit);
        }
        if edit.registers() {
            self.log.add_edit(edit);
        }
        Ok(valid)
    }
}

impl<T: Editable, E: ContinuousEdit<T>> Drop for ContinuousRun<'_, T, E> {
    fn drop(&mut self) {
        if self.edit.is_none() {
            return;
        }
        log::debug!("Continuous run dropped while open, committing");
        if let Err(err) = self.commit() {
            log::warn!("Failed to commit continuous run: {err}");
        }
    }
}

impl<T: Editable, E: ContinuousEdit<T>> fmt::Debug for ContinuousRun<'_, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContinuousRun")
            .field("edit", &self.edit)
            .finish_non_exhaustive()
    }
}
