//! Edits built from other edits.
//!
//! A [`CompositeEdit`] runs an ordered list of unregistered sub-edits as one
//! atomic undo step. Sub-edits that change nothing are kept (they are cheap
//! and their inverse is empty); the composite is valid if any primary
//! sub-edit is valid.
//!
//! # Inverse order
//!
//! Undo runs the primary sub-edits in reverse order by default, which is
//! correct whenever each sub-edit's inverse only depends on state it wrote
//! itself. [`InverseOrder::Forward`] is available for sequences whose
//! inverses must replay front to back.
//!
//! Sub-edits added with [`CompositeEdit::derived`] recompute state from the
//! data the primary sub-edits touch. They always run after every primary
//! sub-edit, in both directions: on undo the primaries are reversed first
//! and the derived sub-edits then see the restored data.

use std::any::type_name;
use std::fmt;

use super::action::{Edit, EditError, EditResult, Editable};
use super::base::{BaseEdit, ContinuousEdit, EditState};

/// Order in which primary sub-edits are reversed on undo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InverseOrder {
    #[default]
    Reverse,
    Forward,
}

type ModifyFn<T> = Box<dyn FnOnce(&mut dyn Edit<T>, &mut T) -> EditResult + Send>;

/// One adjustment to a composite during a continuous run.
pub enum CompositeUpdate<T: Editable> {
    /// Re-parameterises the primary sub-edit at `index` in place.
    Modify { index: usize, update: ModifyFn<T> },
    /// Reverses the sub-edit at `index` and runs `edit` in its place.
    Replace { index: usize, edit: BaseEdit<T> },
    /// Runs further sub-edits and appends them.
    Append(Vec<BaseEdit<T>>),
}

impl<T: Editable> CompositeUpdate<T> {
    /// Sends `update` to the sub-edit at `index`, which must be an `E`.
    pub fn modify<E>(index: usize, update: E::Update) -> Self
    where
        E: ContinuousEdit<T>,
        E::Update: Send + 'static,
    {
        Self::Modify {
            index,
            update: Box::new(move |edit: &mut dyn Edit<T>, target: &mut T| {
                let edit = edit.as_any_mut().downcast_mut::<E>().ok_or_else(|| {
                    EditError::Custom(format!("sub-edit {index} is not a {}", type_name::<E>()))
                })?;
                edit.update(target, update)
            }),
        }
    }
}

impl<T: Editable> fmt::Debug for CompositeUpdate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Modify { index, .. } => f.debug_struct("Modify").field("index", index).finish(),
            Self::Replace { index, edit } => f
                .debug_struct("Replace")
                .field("index", index)
                .field("edit", edit)
                .finish(),
            Self::Append(edits) => f.debug_tuple("Append").field(edits).finish(),
        }
    }
}

/// An atomic sequence of sub-edits.
///
/// # Example
///
/// ```ignore
/// let edit = CompositeEdit::new(
///     "Add task",
///     vec![
///         BaseEdit::unregistered(ActivateEdit::new(task)),
///         BaseEdit::unregistered(HostedListEdit::add(parent, &children, [task])?),
///     ],
/// )?;
/// log.run(BaseEdit::new(edit), &mut planner)?;
/// ```
pub struct CompositeEdit<T: Editable> {
    name: String,
    edits: Vec<BaseEdit<T>>,
    derived: Vec<BaseEdit<T>>,
    order: InverseOrder,
    valid: bool,
}

fn check_sub_edit<T: Editable>(edit: &BaseEdit<T>) -> EditResult {
    if edit.registers() || edit.state() != EditState::Pending {
        return Err(EditError::InvalidSubEdit(edit.name()));
    }
    Ok(())
}

/// Runs a pending sub-edit or redoes an undone one.
fn forward<T: Editable>(edit: &mut BaseEdit<T>, target: &mut T) -> EditResult {
    match edit.state() {
        EditState::Pending => edit.run(target).map(|_| ()),
        _ => edit.redo(target),
    }
}

impl<T: Editable> CompositeEdit<T> {
    /// Creates a composite. Every sub-edit must be unregistered and unrun.
    pub fn new(name: impl Into<String>, edits: Vec<BaseEdit<T>>) -> EditResult<Self> {
        for edit in &edits {
            check_sub_edit(edit)?;
        }
        Ok(Self {
            name: name.into(),
            edits,
            derived: Vec::new(),
            order: InverseOrder::Reverse,
            valid: false,
        })
    }

    pub fn with_inverse_order(mut self, order: InverseOrder) -> Self {
        self.order = order;
        self
    }

    /// Adds a sub-edit that recomputes state from the primary sub-edits'
    /// data and therefore runs after all of them in both directions.
    pub fn derived(mut self, edit: BaseEdit<T>) -> EditResult<Self> {
        check_sub_edit(&edit)?;
        self.derived.push(edit);
        Ok(self)
    }

    pub fn sub_edits(&self) -> &[BaseEdit<T>] {
        &self.edits
    }

    pub fn inverse_order(&self) -> InverseOrder {
        self.order
    }

    fn refresh_validity(&mut self) {
        self.valid = self.edits.iter().any(|e| e.is_valid());
    }

    fn apply_update(&mut self, target: &mut T, update: CompositeUpdate<T>) -> EditResult {
        match update {
            CompositeUpdate::Modify { index, update } => {
                let edit = self.edits.get_mut(index).ok_or_else(|| {
                    EditError::Custom(format!("'{}' has no sub-edit {index}", self.name))
                })?;
                update(edit.edit_mut(), target)
            }
            CompositeUpdate::Replace { index, mut edit } => {
                check_sub_edit(&edit)?;
                let old = self.edits.get_mut(index).ok_or_else(|| {
                    EditError::Custom(format!("'{}' has no sub-edit {index}", self.name))
                })?;
                old.undo(target)?;
                edit.run(target)?;
                *old = edit;
                Ok(())
            }
            CompositeUpdate::Append(edits) => {
                for edit in &edits {
                    check_sub_edit(edit)?;
                }
                for mut edit in edits {
                    edit.run(target)?;
                    self.edits.push(edit);
                }
                Ok(())
            }
        }
    }
}

impl<T: Editable> Edit<T> for CompositeEdit<T> {
    /// Runs every sub-edit, then the derived ones. If one fails, those
    /// already run are undone in reverse before the error is returned.
    fn apply(&mut self, target: &mut T) -> EditResult {
        let mut edits: Vec<&mut BaseEdit<T>> =
            self.edits.iter_mut().chain(self.derived.iter_mut()).collect();
        for i in 0..edits.len() {
            let Err(err) = forward(&mut *edits[i], target) else {
                continue;
            };
            log::warn!("'{}' failed at sub-edit {i}, rolling back: {err}", self.name);
            for done in edits[..i].iter_mut().rev() {
                if let Err(undo_err) = done.undo(target) {
                    log::error!("Rollback of '{}' failed: {undo_err}", done.name());
                }
            }
            return Err(err);
        }
        self.refresh_validity();
        Ok(())
    }

    fn undo(&mut self, target: &mut T) -> EditResult {
        match self.order {
            InverseOrder::Reverse => {
                for edit in self.edits.iter_mut().rev() {
                    edit.undo(target)?;
                }
            }
            InverseOrder::Forward => {
                for edit in &mut self.edits {
                    edit.undo(target)?;
                }
            }
        }
        for edit in &mut self.derived {
            edit.undo(target)?;
        }
        Ok(())
    }

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn description(&self) -> String {
        let mut text = self.name.clone();
        for edit in self.edits.iter().filter(|e| e.is_valid()) {
            for line in edit.description().lines() {
                text.push_str("\n    ");
                text.push_str(line);
            }
        }
        text
    }
}

impl<T: Editable> ContinuousEdit<T> for CompositeEdit<T> {
    type Update = Vec<CompositeUpdate<T>>;

    /// Applies the updates in order, then refreshes derived sub-edits so
    /// they see the new data.
    fn update(&mut self, target: &mut T, updates: Self::Update) -> EditResult {
        for update in updates {
            self.apply_update(target, update)?;
        }
        for edit in &mut self.derived {
            edit.undo(target)?;
            edit.redo(target)?;
        }
        self.refresh_validity();
        Ok(())
    }
}

impl<T: Editable> fmt::Debug for CompositeEdit<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeEdit")
            .field("name", &self.name)
            .field("edits", &self.edits)
            .field("derived", &self.derived)
            .field("order", &self.order)
            .field("valid", &self.valid)
            .finish()
    }
}
