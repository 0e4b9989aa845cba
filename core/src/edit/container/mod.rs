//! Generic, invertible diffs over ordered maps and sequences.
//!
//! A [`ContainerEdit`] locates a container inside the target and applies a
//! typed operation ([`MapOp`] or [`SeqOp`]) to it. The first application
//! records the exact inverse operation; undo replays that inverse and redo
//! replays the original operation, so any number of undo/redo cycles lands
//! on the same states.
//!
//! Per-key failures (missing key, index out of range, value already present)
//! are skipped. An edit whose every entry was skipped changed nothing and is
//! therefore invalid.

mod diff;
mod map;
mod sequence;

use std::fmt;

use bitflags::bitflags;

pub use diff::{
    Change, Comparator, DiffEntry, MapDiff, MapOp, Nested, SeqKey, SeqOp, Sort, Tree, Upsert,
    leaves, nested,
};

use super::action::{Edit, EditError, EditResult, Editable, Locator};
use super::base::ContinuousEdit;

bitflags! {
    /// Behaviour switches for sequence diffs.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct EditFlags: u8 {
        /// Record inverse entries by element value instead of position.
        ///
        /// Needed whenever something else may reorder the list between
        /// apply and undo.
        const FIND_BY_VALUE = 1 << 0;
        /// Adding or inserting a value already in the list is a no-op.
        const IGNORE_DUPLICATES = 1 << 1;
    }
}

/// Settings shared by every step of one diff application.
#[derive(Debug, Clone, Copy)]
pub struct ApplyContext {
    pub recursive: bool,
    pub flags: EditFlags,
}

/// Outcome of applying one operation.
#[derive(Debug)]
pub struct Applied<Op> {
    /// Whether any element changed.
    pub changed: bool,
    /// The operation that reverses this application.
    pub inverse: Op,
}

impl<Op> Applied<Op> {
    pub fn new(changed: bool, inverse: Op) -> Self {
        Self { changed, inverse }
    }
}

/// A container that typed diff operations can be applied to.
pub trait DiffContainer: Clone + Send + 'static {
    type Op: Clone + fmt::Debug + Send + Sync;

    fn op_kind(op: &Self::Op) -> &'static str;

    /// Applies `op` and returns what changed plus the exact inverse.
    ///
    /// Structural errors must be detected before anything is mutated.
    fn apply_op(&mut self, op: &Self::Op, ctx: &ApplyContext) -> EditResult<Applied<Self::Op>>;
}

/// An edit that applies one diff operation to a container in the target.
///
/// # Example
///
/// ```ignore
/// let edit = ContainerEdit::new(
///     Locator::new("calendar", |p: &mut Planner| Some(&mut p.calendar)),
///     MapOp::Add(leaves([(date, Vec::new())])),
/// );
/// log.run(BaseEdit::new(edit), &mut planner)?;
/// ```
pub struct ContainerEdit<T: Editable, C: DiffContainer> {
    locator: Locator<T, C>,
    op: C::Op,
    inverse: Option<C::Op>,
    ctx: ApplyContext,
    valid: bool,
    name: Option<String>,
}

impl<T: Editable, C: DiffContainer> ContainerEdit<T, C> {
    pub fn new(locator: Locator<T, C>, op: C::Op) -> Self {
        Self {
            locator,
            op,
            inverse: None,
            ctx: ApplyContext {
                recursive: false,
                flags: EditFlags::empty(),
            },
            valid: false,
            name: None,
        }
    }

    /// Lets nested diff entries reach into nested maps.
    pub fn recursive(mut self) -> Self {
        self.ctx.recursive = true;
        self
    }

    pub fn with_flags(mut self, flags: EditFlags) -> Self {
        self.ctx.flags = flags;
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn op(&self) -> &C::Op {
        &self.op
    }

    /// The inverse captured by the first application, if any.
    pub fn inverse(&self) -> Option<&C::Op> {
        self.inverse.as_ref()
    }

    /// Reports whether applying the edit now would change anything, without
    /// touching the target.
    pub fn preview(&self, target: &mut T) -> EditResult<bool> {
        let mut scratch = self.locator.locate(target)?.clone();
        Ok(scratch.apply_op(&self.op, &self.ctx)?.changed)
    }
}

impl<T: Editable, C: DiffContainer> Edit<T> for ContainerEdit<T, C> {
    fn apply(&mut self, target: &mut T) -> EditResult {
        let container = self.locator.locate(target)?;
        let applied = container.apply_op(&self.op, &self.ctx)?;
        if self.inverse.is_none() {
            self.valid = applied.changed;
            self.inverse = Some(applied.inverse);
        }
        Ok(())
    }

    fn undo(&mut self, target: &mut T) -> EditResult {
        let inverse = self
            .inverse
            .as_ref()
            .ok_or_else(|| EditError::NotDone(self.name()))?;
        let container = self.locator.locate(target)?;
        container.apply_op(inverse, &self.ctx)?;
        Ok(())
    }

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("{} in {}", C::op_kind(&self.op), self.locator.label()),
        }
    }
}

impl<T: Editable, C: DiffContainer> ContinuousEdit<T> for ContainerEdit<T, C> {
    type Update = C::Op;

    /// Swaps the operation: reverts the current one, then applies `op` as if
    /// it had been the original.
    fn update(&mut self, target: &mut T, op: C::Op) -> EditResult {
        if self.inverse.is_some() {
            self.undo(target)?;
        }
        self.op = op;
        self.inverse = None;
        self.apply(target)
    }
}

impl<T: Editable, C: DiffContainer> fmt::Debug for ContainerEdit<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerEdit")
            .field("locator", &self.locator)
            .field("op", &self.op)
            .field("recursive", &self.ctx.recursive)
            .field("flags", &self.ctx.flags)
            .field("valid", &self.valid)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::BaseEdit;
    use crate::ordered_map::OrderedMap;

    struct Doc {
        sections: OrderedMap<String, i32>,
        tags: Vec<&'static str>,
    }

    impl Editable for Doc {}

    fn doc() -> Doc {
        Doc {
            sections: OrderedMap::from([("intro".to_string(), 1), ("body".to_string(), 2)]),
            tags: vec!["draft"],
        }
    }

    fn sections() -> Locator<Doc, OrderedMap<String, i32>> {
        Locator::new("sections", |d: &mut Doc| Some(&mut d.sections))
    }

    fn tags() -> Locator<Doc, Vec<&'static str>> {
        Locator::new("tags", |d: &mut Doc| Some(&mut d.tags))
    }

    #[test]
    fn inverse_captured_once_across_cycles() {
        let mut doc = doc();
        let mut edit = BaseEdit::new(ContainerEdit::new(
            sections(),
            MapOp::Remove(leaves([("intro".to_string(), ())])),
        ));
        assert!(edit.run(&mut doc).unwrap());
        for _ in 0..3 {
            edit.undo(&mut doc).unwrap();
            assert_eq!(doc.sections.keys().collect::<Vec<_>>(), ["intro", "body"]);
            edit.redo(&mut doc).unwrap();
            assert_eq!(doc.sections.keys().collect::<Vec<_>>(), ["body"]);
        }
    }

    #[test]
    fn no_op_diff_is_invalid() {
        let mut doc = doc();
        let mut edit = BaseEdit::new(ContainerEdit::new(
            tags(),
            SeqOp::Add(vec!["draft"]),
        ).with_flags(EditFlags::IGNORE_DUPLICATES));
        assert!(!edit.run(&mut doc).unwrap());
        assert_eq!(doc.tags, ["draft"]);
    }

    #[test]
    fn preview_does_not_mutate() {
        let mut doc = doc();
        let edit = ContainerEdit::new(tags(), SeqOp::Add(vec!["final"]));
        assert!(edit.preview(&mut doc).unwrap());
        assert_eq!(doc.tags, ["draft"]);
        let noop = ContainerEdit::new(tags(), SeqOp::remove_values(["missing"]));
        assert!(!noop.preview(&mut doc).unwrap());
    }

    #[test]
    fn missing_container_is_an_error() {
        let mut doc = doc();
        let mut edit = ContainerEdit::new(
            Locator::new("nowhere", |_: &mut Doc| None::<&mut Vec<&'static str>>),
            SeqOp::Add(vec!["x"]),
        );
        assert_eq!(
            edit.apply(&mut doc),
            Err(EditError::TargetNotFound("nowhere".into()))
        );
    }

    #[test]
    fn update_replaces_operation() {
        let mut doc = doc();
        let mut edit = BaseEdit::continuous(ContainerEdit::new(tags(), SeqOp::Add(vec!["a"])));
        edit.begin_continuous_run(&mut doc).unwrap();
        edit.update_continuous_run(&mut doc, SeqOp::Add(vec!["b", "c"]))
            .unwrap();
        assert_eq!(doc.tags, ["draft", "b", "c"]);
        assert!(edit.end_continuous_run().unwrap());
        edit.undo(&mut doc).unwrap();
        assert_eq!(doc.tags, ["draft"]);
    }

    #[test]
    fn default_name_mentions_kind_and_container() {
        let edit = ContainerEdit::new(tags(), SeqOp::Add(vec!["a"]));
        assert_eq!(Edit::<Doc>::name(&edit), "Add in tags");
        assert_eq!(Edit::<Doc>::name(&edit.named("Tag")), "Tag");
    }
}
