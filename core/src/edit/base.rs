//! Lifecycle state machine wrapped around edit logic.
//!
//! [`BaseEdit`] owns an [`Edit`] implementation and enforces the order in
//! which it may be run, undone and redone:
//!
//! ```text
//! Pending ──run──────────────────────────▶ Done ──undo──▶ Undone
//!    │                                      ▲   ◀──redo──
//!    └─begin──▶ Streaming ──update*──end────┘
//! ```
//!
//! Whether the edit is recorded in an [`EditLog`](super::EditLog) is decided
//! at construction: [`BaseEdit::new`] registers, [`BaseEdit::unregistered`]
//! does not (sub-edits of a composite, setup edits).

use std::fmt;
use std::marker::PhantomData;

use super::action::{Edit, EditError, EditResult, Editable};

/// Where an edit is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditState {
    /// Constructed, never run.
    Pending,
    /// Applied optimistically during a continuous run, not yet committed.
    Streaming,
    /// Applied.
    Done,
    /// Applied, then reversed.
    Undone,
}

/// Edit logic that can be re-parameterised while it is applied.
///
/// During a continuous run (dragging a calendar block, resizing a bar) the
/// edit is applied once, then adjusted in place any number of times, then
/// committed as a single undo step. `update` must leave the target as if the
/// edit had been constructed with the updated parameters and run once.
pub trait ContinuousEdit<T: Editable>: Edit<T> {
    /// The parameters an update carries.
    type Update;

    fn update(&mut self, target: &mut T, update: Self::Update) -> EditResult;
}

/// An edit plus its lifecycle state and registration flag.
///
/// `E` defaults to `dyn Edit<T>`, the form stored in logs and composites.
/// Keep the concrete type (via [`BaseEdit::continuous`]) when the edit must
/// be updated during a continuous run, then convert with
/// [`into_dyn`](BaseEdit::into_dyn).
pub struct BaseEdit<T: Editable, E: Edit<T> + ?Sized = dyn Edit<T>> {
    state: EditState,
    registers: bool,
    edit: Box<E>,
    _target: PhantomData<fn(&mut T)>,
}

impl<T: Editable> BaseEdit<T> {
    /// Wraps edit logic that is recorded in the log when run through it.
    pub fn new(edit: impl Edit<T>) -> Self {
        Self::from_box(Box::new(edit), true)
    }

    /// Wraps edit logic that is never recorded (composite sub-edits).
    pub fn unregistered(edit: impl Edit<T>) -> Self {
        Self::from_box(Box::new(edit), false)
    }

    fn from_box(edit: Box<dyn Edit<T>>, registers: bool) -> Self {
        Self {
            state: EditState::Pending,
            registers,
            edit,
            _target: PhantomData,
        }
    }
}

impl<T: Editable, E: Edit<T>> BaseEdit<T, E> {
    /// Wraps edit logic keeping its concrete type, for continuous runs.
    pub fn continuous(edit: E) -> Self {
        Self {
            state: EditState::Pending,
            registers: true,
            edit: Box::new(edit),
            _target: PhantomData,
        }
    }

    /// Same as [`continuous`](Self::continuous), but never recorded.
    pub fn continuous_unregistered(edit: E) -> Self {
        Self {
            registers: false,
            ..Self::continuous(edit)
        }
    }

    /// Erases the concrete edit type, keeping state and registration.
    pub fn into_dyn(self) -> BaseEdit<T> {
        BaseEdit {
            state: self.state,
            registers: self.registers,
            edit: self.edit,
            _target: PhantomData,
        }
    }
}

impl<T: Editable, E: Edit<T> + ?Sized> BaseEdit<T, E> {
    pub fn state(&self) -> EditState {
        self.state
    }

    /// Whether the edit is recorded in the log when run through it.
    pub fn registers(&self) -> bool {
        self.registers
    }

    /// Whether the last forward application changed anything.
    ///
    /// Meaningless while [`Pending`](EditState::Pending).
    pub fn is_valid(&self) -> bool {
        self.edit.is_valid()
    }

    pub fn name(&self) -> String {
        self.edit.name()
    }

    pub fn description(&self) -> String {
        self.edit.description()
    }

    /// The wrapped logic.
    pub fn edit(&self) -> &E {
        &self.edit
    }

    /// The wrapped logic, mutably. Changing its parameters after it has run
    /// is only sound through [`ContinuousEdit::update`].
    pub fn edit_mut(&mut self) -> &mut E {
        &mut self.edit
    }

    /// Runs the forward logic once. Returns whether the edit is valid.
    pub fn run(&mut self, target: &mut T) -> EditResult<bool> {
        match self.state {
            EditState::Pending => {
                self.edit.apply(target)?;
                self.state = EditState::Done;
                log::debug!("Ran edit '{}' (valid: {})", self.name(), self.is_valid());
                Ok(self.is_valid())
            }
            EditState::Streaming => Err(EditError::Streaming(self.name())),
            EditState::Done | EditState::Undone => Err(EditError::AlreadyRun(self.name())),
        }
    }

    /// Reverses a done edit.
    pub fn undo(&mut self, target: &mut T) -> EditResult {
        match self.state {
            EditState::Done => {
                self.edit.undo(target)?;
                self.state = EditState::Undone;
                Ok(())
            }
            EditState::Streaming => Err(EditError::Streaming(self.name())),
            EditState::Pending | EditState::Undone => Err(EditError::NotDone(self.name())),
        }
    }

    /// Re-applies an undone edit.
    pub fn redo(&mut self, target: &mut T) -> EditResult {
        match self.state {
            EditState::Undone => {
                self.edit.apply(target)?;
                self.state = EditState::Done;
                Ok(())
            }
            _ => Err(EditError::NotUndone(self.name())),
        }
    }

    /// Applies the edit optimistically and enters the streaming state.
    pub fn begin_continuous_run(&mut self, target: &mut T) -> EditResult {
        match self.state {
            EditState::Pending => {
                self.edit.apply(target)?;
                self.state = EditState::Streaming;
                log::debug!("Began continuous run of '{}'", self.name());
                Ok(())
            }
            EditState::Streaming => Err(EditError::Streaming(self.name())),
            EditState::Done | EditState::Undone => Err(EditError::AlreadyRun(self.name())),
        }
    }

    /// Finalises a continuous run. Returns whether the edit is valid.
    pub fn end_continuous_run(&mut self) -> EditResult<bool> {
        if self.state != EditState::Streaming {
            return Err(EditError::NotStreaming(self.name()));
        }
        self.state = EditState::Done;
        log::debug!(
            "Ended continuous run of '{}' (valid: {})",
            self.name(),
            self.is_valid()
        );
        Ok(self.is_valid())
    }

    /// Reverses a streaming edit without committing it.
    pub fn cancel_continuous_run(&mut self, target: &mut T) -> EditResult {
        if self.state != EditState::Streaming {
            return Err(EditError::NotStreaming(self.name()));
        }
        self.edit.undo(target)?;
        self.state = EditState::Undone;
        log::debug!("Cancelled continuous run of '{}'", self.name());
        Ok(())
    }
}

impl<T: Editable, E: ContinuousEdit<T>> BaseEdit<T, E> {
    /// Re-parameterises a streaming edit in place.
    pub fn update_continuous_run(&mut self, target: &mut T, update: E::Update) -> EditResult {
        if self.state != EditState::Streaming {
            return Err(EditError::NotStreaming(self.name()));
        }
        self.edit.update(target, update)
    }
}

impl<T: Editable, E: Edit<T> + ?Sized> fmt::Debug for BaseEdit<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseEdit")
            .field("state", &self.state)
            .field("registers", &self.registers)
            .field("edit", &self.edit)
            .finish()
    }
}
