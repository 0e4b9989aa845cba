//! Typed hooks fired around edits run through an [`EditLog`](super::EditLog).

use std::any::{TypeId, type_name};
use std::fmt;

use super::action::{Edit, EditError, EditResult, Editable};

/// When a callback fires relative to the edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallbackPhase {
    /// Before an edit is run or redone.
    PreRun,
    /// After an edit is run or redone.
    PostRun,
    /// Before an edit is undone.
    PreUndo,
    /// After an edit is undone.
    PostUndo,
}

impl CallbackPhase {
    pub const ALL: [CallbackPhase; 4] = [
        CallbackPhase::PreRun,
        CallbackPhase::PostRun,
        CallbackPhase::PreUndo,
        CallbackPhase::PostUndo,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::PreRun => "pre-run",
            Self::PostRun => "post-run",
            Self::PreUndo => "pre-undo",
            Self::PostUndo => "post-undo",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

type ErasedCallback<T> = Box<dyn Fn(&T, &dyn Edit<T>) + Send>;

struct Registration<T> {
    edit_type: TypeId,
    edit_name: &'static str,
    id: String,
    callback: ErasedCallback<T>,
}

/// Callbacks keyed by phase, then edit type, then an owner-chosen id.
///
/// The id lets a view register several callbacks and drop them all at once
/// with [`remove`](Self::remove) when it closes.
pub struct EditCallbacks<T: Editable> {
    phases: [Vec<Registration<T>>; 4],
}

impl<T: Editable> EditCallbacks<T> {
    pub fn new() -> Self {
        Self {
            phases: Default::default(),
        }
    }

    /// Registers `callback` for edits of type `E` in `phase`.
    ///
    /// Fails with [`EditError::DuplicateCallback`] if `id` is already taken
    /// for that edit type and phase.
    pub fn register<E, F>(&mut self, phase: CallbackPhase, id: impl Into<String>, callback: F) -> EditResult
    where
        E: Edit<T>,
        F: Fn(&T, &E) + Send + 'static,
    {
        let id = id.into();
        let edit_type = TypeId::of::<E>();
        let slot = &mut self.phases[phase.slot()];
        if slot.iter().any(|r| r.edit_type == edit_type && r.id == id) {
            return Err(EditError::DuplicateCallback {
                id,
                edit: type_name::<E>(),
                phase: phase.label(),
            });
        }
        log::trace!("Registered {} callback '{id}' for {}", phase.label(), type_name::<E>());
        slot.push(Registration {
            edit_type,
            edit_name: type_name::<E>(),
            id,
            callback: Box::new(move |target: &T, edit: &dyn Edit<T>| {
                if let Some(edit) = edit.as_any().downcast_ref::<E>() {
                    callback(target, edit);
                }
            }),
        });
        Ok(())
    }

    /// Removes every callback registered under `id`, in all phases and for
    /// all edit types. Returns how many were removed.
    pub fn remove(&mut self, id: &str) -> usize {
        let mut removed = 0;
        for slot in &mut self.phases {
            let before = slot.len();
            slot.retain(|r| r.id != id);
            removed += before - slot.len();
        }
        removed
    }

    /// Number of callbacks registered for `phase`.
    pub fn count(&self, phase: CallbackPhase) -> usize {
        self.phases[phase.slot()].len()
    }

    /// Calls every callback registered for the concrete type of `edit`.
    pub fn fire(&self, phase: CallbackPhase, target: &T, edit: &dyn Edit<T>) {
        let edit_type = edit.as_any().type_id();
        for registration in &self.phases[phase.slot()] {
            if registration.edit_type == edit_type {
                (registration.callback)(target, edit);
            }
        }
    }
}

impl<T: Editable> Default for EditCallbacks<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Editable> fmt::Debug for EditCallbacks<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for phase in CallbackPhase::ALL {
            let entries: Vec<_> = self.phases[phase.slot()]
                .iter()
                .map(|r| format!("{}:{}", r.edit_name, r.id))
                .collect();
            map.entry(&phase.label(), &entries);
        }
        map.finish()
    }
}
