//! Edits over a [`HostedGraph`].
//!
//! Every write to a driver endpoint updates the driven index inside the same
//! edit; there is no separate back-reference edit to undo.

use std::fmt;
use std::marker::PhantomData;

use almanac_core::edit::{
    ApplyContext, DiffContainer, Edit, EditError, EditFlags, EditResult, SeqKey, SeqOp,
};

use crate::arena::{HostId, Hosted};
use crate::error::HostedError;
use crate::graph::{HostedDataAttribute, HostedDataList, HostedGraph, HostedTarget};
use crate::pairing::{Cardinality, PairingDecl, PairingId, Role};

/// Driver lists hold each partner at most once, and their inverses find
/// partners by id so that reordering in between does not matter.
const LIST_CONTEXT: ApplyContext = ApplyContext {
    recursive: false,
    flags: EditFlags::IGNORE_DUPLICATES.union(EditFlags::FIND_BY_VALUE),
};

/// Whether `partner` may gain `owner` on a single-valued driven side.
fn admits<E: Hosted>(
    graph: &HostedGraph<E>,
    decl: &PairingDecl,
    owner: HostId,
    partner: HostId,
) -> bool {
    if decl.driven.cardinality == Cardinality::Many {
        return true;
    }
    let taken = graph
        .active_owners(partner, decl.id)
        .into_iter()
        .find(|&o| o != owner);
    if let Some(other) = taken {
        log::info!(
            "'{}': {partner} already belongs to {other}, not adding it to {owner}",
            decl.id
        );
        return false;
    }
    true
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct Toggle {
    id: HostId,
    active: bool,
    previous: Option<bool>,
}

impl Toggle {
    fn apply<E: Hosted>(&mut self, graph: &mut HostedGraph<E>) -> EditResult {
        let previous = graph.set_active(self.id, self.active)?;
        self.previous.get_or_insert(previous);
        Ok(())
    }

    fn undo<E: Hosted>(&mut self, graph: &mut HostedGraph<E>) -> EditResult {
        let previous = self
            .previous
            .ok_or_else(|| EditError::NotDone(format!("toggle {}", self.id)))?;
        graph.set_active(self.id, previous)?;
        Ok(())
    }

    fn is_valid(&self) -> bool {
        self.previous.is_some_and(|p| p != self.active)
    }
}

/// Brings a stored entity into lookups and iteration.
pub struct ActivateEdit<T> {
    toggle: Toggle,
    _target: PhantomData<fn() -> T>,
}

impl<T> ActivateEdit<T> {
    pub fn new(id: HostId) -> Self {
        Self {
            toggle: Toggle {
                id,
                active: true,
                previous: None,
            },
            _target: PhantomData,
        }
    }
}

impl<T: HostedTarget> Edit<T> for ActivateEdit<T> {
    fn apply(&mut self, target: &mut T) -> EditResult {
        self.toggle.apply(target.graph_mut())
    }

    fn undo(&mut self, target: &mut T) -> EditResult {
        self.toggle.undo(target.graph_mut())
    }

    fn is_valid(&self) -> bool {
        self.toggle.is_valid()
    }

    fn name(&self) -> String {
        format!("Activate {}", self.toggle.id)
    }
}

impl<T> fmt::Debug for ActivateEdit<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ActivateEdit").field(&self.toggle).finish()
    }
}

/// Hides an entity from lookups and iteration without freeing it. Its field
/// values and id survive, so undo brings back the very same entity.
pub struct DeactivateEdit<T> {
    toggle: Toggle,
    _target: PhantomData<fn() -> T>,
}

impl<T> DeactivateEdit<T> {
    pub fn new(id: HostId) -> Self {
        Self {
            toggle: Toggle {
                id,
                active: false,
                previous: None,
            },
            _target: PhantomData,
        }
    }
}

impl<T: HostedTarget> Edit<T> for DeactivateEdit<T> {
    fn apply(&mut self, target: &mut T) -> EditResult {
        self.toggle.apply(target.graph_mut())
    }

    fn undo(&mut self, target: &mut T) -> EditResult {
        self.toggle.undo(target.graph_mut())
    }

    fn is_valid(&self) -> bool {
        self.toggle.is_valid()
    }

    fn name(&self) -> String {
        format!("Deactivate {}", self.toggle.id)
    }
}

impl<T> fmt::Debug for DeactivateEdit<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DeactivateEdit").field(&self.toggle).finish()
    }
}

// ---------------------------------------------------------------------------
// Driver writes
// ---------------------------------------------------------------------------

/// Applies a sequence operation to the driver list of one owner.
///
/// Partners that cannot take the owner (wrong kind) fail the edit before
/// anything changes. Partners of a single-valued driven side that already
/// belong to another active owner are skipped.
pub struct HostedListEdit<T> {
    owner: HostId,
    pairing: PairingId,
    op: SeqOp<HostId>,
    inverse: Option<SeqOp<HostId>>,
    valid: bool,
    _target: PhantomData<fn() -> T>,
}

impl<T> HostedListEdit<T> {
    pub fn new(owner: HostId, list: &HostedDataList, op: SeqOp<HostId>) -> Result<Self, HostedError> {
        if list.role() == Role::Driven {
            return Err(HostedError::DrivenReadOnly(list.pairing()));
        }
        Ok(Self {
            owner,
            pairing: list.pairing(),
            op,
            inverse: None,
            valid: false,
            _target: PhantomData,
        })
    }

    pub fn add(
        owner: HostId,
        list: &HostedDataList,
        partners: impl IntoIterator<Item = HostId>,
    ) -> Result<Self, HostedError> {
        Self::new(owner, list, SeqOp::Add(partners.into_iter().collect()))
    }

    pub fn insert(
        owner: HostId,
        list: &HostedDataList,
        index: usize,
        partner: HostId,
    ) -> Result<Self, HostedError> {
        Self::new(owner, list, SeqOp::Insert(vec![(index, partner)]))
    }

    pub fn remove(
        owner: HostId,
        list: &HostedDataList,
        partners: impl IntoIterator<Item = HostId>,
    ) -> Result<Self, HostedError> {
        Self::new(owner, list, SeqOp::remove_values(partners))
    }

    pub fn move_to(
        owner: HostId,
        list: &HostedDataList,
        partner: HostId,
        index: usize,
    ) -> Result<Self, HostedError> {
        Self::new(owner, list, SeqOp::Move(vec![(SeqKey::Value(partner), index)]))
    }

    pub fn owner(&self) -> HostId {
        self.owner
    }

    /// The operation as it will be replayed; partners skipped on the first
    /// run are no longer part of it.
    pub fn op(&self) -> &SeqOp<HostId> {
        &self.op
    }

    fn prepare<E: Hosted>(&mut self, graph: &HostedGraph<E>) -> Result<(), HostedError> {
        let decl = graph.registry().get(self.pairing)?;
        graph.check_kind(self.owner, decl, Role::Driver)?;
        let incoming: Vec<HostId> = match &self.op {
            SeqOp::Add(values) => values.clone(),
            SeqOp::Insert(entries) => entries.iter().map(|(_, p)| *p).collect(),
            SeqOp::Modify(entries) => entries.iter().map(|(_, p)| *p).collect(),
            SeqOp::Remove(_) | SeqOp::Move(_) | SeqOp::Sort(_) => Vec::new(),
        };
        for partner in incoming {
            graph.check_kind(partner, decl, Role::Driven)?;
        }

        let owner = self.owner;
        match &mut self.op {
            SeqOp::Add(values) => values.retain(|&p| admits(graph, decl, owner, p)),
            SeqOp::Insert(entries) => entries.retain(|&(_, p)| admits(graph, decl, owner, p)),
            SeqOp::Modify(entries) => entries.retain(|(_, p)| admits(graph, decl, owner, *p)),
            SeqOp::Remove(_) | SeqOp::Move(_) | SeqOp::Sort(_) => {}
        }
        Ok(())
    }

    fn write<E: Hosted>(&self, graph: &mut HostedGraph<E>, op: &SeqOp<HostId>) -> EditResult<bool> {
        let before = graph.driver_slot(self.owner, self.pairing).to_vec();
        let applied = graph
            .driver_slot_mut(self.owner, self.pairing)
            .apply_op(op, &LIST_CONTEXT)?;
        graph.sync_driven(self.owner, self.pairing, &before);
        Ok(applied.changed)
    }
}

impl<T: HostedTarget> Edit<T> for HostedListEdit<T> {
    fn apply(&mut self, target: &mut T) -> EditResult {
        let graph = target.graph_mut();
        if self.inverse.is_none() {
            self.prepare(graph)?;
            let before = graph.driver_slot(self.owner, self.pairing).to_vec();
            let applied = graph
                .driver_slot_mut(self.owner, self.pairing)
                .apply_op(&self.op, &LIST_CONTEXT)?;
            graph.sync_driven(self.owner, self.pairing, &before);
            self.valid = applied.changed;
            self.inverse = Some(applied.inverse);
            return Ok(());
        }
        self.write(graph, &self.op)?;
        Ok(())
    }

    fn undo(&mut self, target: &mut T) -> EditResult {
        let inverse = self
            .inverse
            .as_ref()
            .ok_or_else(|| EditError::NotDone(Edit::<T>::name(self)))?;
        self.write(target.graph_mut(), inverse)?;
        Ok(())
    }

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn name(&self) -> String {
        format!("{} {} of {}", self.op.kind(), self.pairing, self.owner)
    }
}

impl<T> fmt::Debug for HostedListEdit<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostedListEdit")
            .field("owner", &self.owner)
            .field("pairing", &self.pairing)
            .field("op", &self.op)
            .field("valid", &self.valid)
            .finish()
    }
}

/// Sets or clears the driver attribute of one owner.
pub struct HostedAttributeEdit<T> {
    owner: HostId,
    pairing: PairingId,
    value: Option<HostId>,
    original: Option<Vec<HostId>>,
    valid: bool,
    _target: PhantomData<fn() -> T>,
}

impl<T> HostedAttributeEdit<T> {
    pub fn new(
        owner: HostId,
        attribute: &HostedDataAttribute,
        value: Option<HostId>,
    ) -> Result<Self, HostedError> {
        if attribute.role() == Role::Driven {
            return Err(HostedError::DrivenReadOnly(attribute.pairing()));
        }
        Ok(Self {
            owner,
            pairing: attribute.pairing(),
            value,
            original: None,
            valid: false,
            _target: PhantomData,
        })
    }

    /// Checks kinds and reports whether the new value may be written.
    fn admit<E: Hosted>(&self, graph: &HostedGraph<E>) -> Result<bool, HostedError> {
        let decl = graph.registry().get(self.pairing)?;
        graph.check_kind(self.owner, decl, Role::Driver)?;
        let Some(partner) = self.value else {
            return Ok(true);
        };
        graph.check_kind(partner, decl, Role::Driven)?;
        Ok(admits(graph, decl, self.owner, partner))
    }

    fn write<E: Hosted>(&self, graph: &mut HostedGraph<E>, list: Vec<HostId>) {
        let before = std::mem::replace(graph.driver_slot_mut(self.owner, self.pairing), list);
        graph.sync_driven(self.owner, self.pairing, &before);
    }
}

impl<T: HostedTarget> Edit<T> for HostedAttributeEdit<T> {
    fn apply(&mut self, target: &mut T) -> EditResult {
        let graph = target.graph_mut();
        if self.original.is_none() {
            let original = graph.driver_slot(self.owner, self.pairing).to_vec();
            if !self.admit(graph)? {
                self.value = original.first().copied();
            }
            self.valid = original.first().copied() != self.value;
            self.original = Some(original);
        }
        self.write(graph, self.value.into_iter().collect());
        Ok(())
    }

    fn undo(&mut self, target: &mut T) -> EditResult {
        let original = self
            .original
            .clone()
            .ok_or_else(|| EditError::NotDone(Edit::<T>::name(self)))?;
        self.write(target.graph_mut(), original);
        Ok(())
    }

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn name(&self) -> String {
        match self.value {
            Some(partner) => format!("Set {} of {} to {partner}", self.pairing, self.owner),
            None => format!("Clear {} of {}", self.pairing, self.owner),
        }
    }
}

impl<T> fmt::Debug for HostedAttributeEdit<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostedAttributeEdit")
            .field("owner", &self.owner)
            .field("pairing", &self.pairing)
            .field("value", &self.value)
            .field("valid", &self.valid)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Replacement
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct Reference {
    owner: HostId,
    pairing: PairingId,
    position: usize,
}

#[derive(Debug)]
struct ReplacePlan {
    /// Pairings in which the replaced entity is itself a driver.
    owned: Vec<PairingId>,
    /// Positions of the replaced entity in other driver collections.
    references: Vec<Reference>,
    old_active: bool,
}

/// Hands every relationship of `old` to `new`, then swaps which of the two
/// is active.
///
/// Used when an entity must change type without losing its place: owners
/// that listed `old` list `new` at the same position, and whatever `old`
/// drove is now driven by `new`. `new` must be stored, inactive and
/// unpaired.
pub struct ReplaceHostedDataEdit<T> {
    old: HostId,
    new: HostId,
    plan: Option<ReplacePlan>,
    _target: PhantomData<fn() -> T>,
}

impl<T> ReplaceHostedDataEdit<T> {
    pub fn new(old: HostId, new: HostId) -> Self {
        Self {
            old,
            new,
            plan: None,
            _target: PhantomData,
        }
    }

    fn survey<E: Hosted>(&self, graph: &HostedGraph<E>) -> Result<ReplacePlan, HostedError> {
        if !graph.contains(self.old) {
            return Err(HostedError::UnknownEntity(self.old));
        }
        if !graph.contains(self.new) {
            return Err(HostedError::UnknownEntity(self.new));
        }
        if graph.is_active(self.new)
            || !graph.driver_pairings(self.new).is_empty()
            || !graph.driven_pairings(self.new).is_empty()
        {
            return Err(HostedError::ReplacementInUse(self.new));
        }

        let owned = graph.driver_pairings(self.old);
        for &pairing in &owned {
            graph.check_kind(self.new, graph.registry().get(pairing)?, Role::Driver)?;
        }
        let mut references = Vec::new();
        for pairing in graph.driven_pairings(self.old) {
            graph.check_kind(self.new, graph.registry().get(pairing)?, Role::Driven)?;
            for owner in graph.raw_owners(self.old, pairing) {
                let slot = graph.driver_slot(owner, pairing);
                if let Some(position) = slot.iter().position(|&p| p == self.old) {
                    references.push(Reference {
                        owner,
                        pairing,
                        position,
                    });
                }
            }
        }
        Ok(ReplacePlan {
            owned,
            references,
            old_active: graph.is_active(self.old),
        })
    }
}

fn repoint<E: Hosted>(graph: &mut HostedGraph<E>, plan: &ReplacePlan, from: HostId, to: HostId) {
    for &pairing in &plan.owned {
        let list = std::mem::take(graph.driver_slot_mut(from, pairing));
        graph.sync_driven(from, pairing, &list);
        graph.driver_slot_mut(to, pairing).clone_from(&list);
        graph.sync_driven(to, pairing, &[]);
    }
    for reference in &plan.references {
        // Owned collections moved first, so a self-reference now lives on `to`.
        let owner = if reference.owner == from {
            to
        } else {
            reference.owner
        };
        let slot = graph.driver_slot_mut(owner, reference.pairing);
        if slot.get(reference.position) != Some(&from) {
            log::warn!(
                "'{}': {from} is no longer at position {} of {owner}",
                reference.pairing,
                reference.position
            );
            continue;
        }
        let before = slot.clone();
        slot[reference.position] = to;
        graph.sync_driven(owner, reference.pairing, &before);
    }
}

impl<T: HostedTarget> Edit<T> for ReplaceHostedDataEdit<T> {
    fn apply(&mut self, target: &mut T) -> EditResult {
        let graph = target.graph_mut();
        if self.plan.is_none() {
            self.plan = Some(self.survey(graph)?);
        }
        let Some(plan) = &self.plan else {
            return Ok(());
        };
        repoint(graph, plan, self.old, self.new);
        graph.set_active(self.old, false)?;
        graph.set_active(self.new, true)?;
        log::debug!(
            "Replaced {} with {}: {} owned pairings, {} references",
            self.old,
            self.new,
            plan.owned.len(),
            plan.references.len()
        );
        Ok(())
    }

    fn undo(&mut self, target: &mut T) -> EditResult {
        let plan = self
            .plan
            .as_ref()
            .ok_or_else(|| EditError::NotDone(format!("replace {}", self.old)))?;
        let graph = target.graph_mut();
        graph.set_active(self.new, false)?;
        repoint(graph, plan, self.new, self.old);
        graph.set_active(self.old, plan.old_active)?;
        Ok(())
    }

    fn is_valid(&self) -> bool {
        // `new` always goes from inactive to active.
        self.plan.is_some()
    }

    fn name(&self) -> String {
        format!("Replace {} with {}", self.old, self.new)
    }
}

impl<T> fmt::Debug for ReplaceHostedDataEdit<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplaceHostedDataEdit")
            .field("old", &self.old)
            .field("new", &self.new)
            .field("plan", &self.plan)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use almanac_core::edit::BaseEdit;

    use super::*;
    use crate::pairing::{Endpoint, PairingRegistry};

    #[derive(Debug, PartialEq)]
    enum Shape {
        Box(&'static str),
        Label(&'static str),
    }

    impl Hosted for Shape {
        fn kind(&self) -> &'static str {
            match self {
                Shape::Box(_) => "box",
                Shape::Label(_) => "label",
            }
        }
    }

    const CONTENTS: PairingId = PairingId("box.contents");
    const CAPTION: PairingId = PairingId("box.caption");

    struct Fixture {
        graph: HostedGraph<Shape>,
        contents: HostedDataList,
        container: HostedDataAttribute,
        caption: HostedDataAttribute,
    }

    fn fixture() -> Fixture {
        let registry = PairingRegistry::new()
            .with(PairingDecl::new(
                CONTENTS,
                Endpoint::many(["box"]),
                Endpoint::one(["box", "label"]),
            ))
            .unwrap()
            .with(PairingDecl::new(
                CAPTION,
                Endpoint::one(["box"]),
                Endpoint::many(["label"]),
            ))
            .unwrap();
        let contents = HostedDataList::new(&registry, CONTENTS, Role::Driver, "box").unwrap();
        let container = HostedDataAttribute::new(&registry, CONTENTS, Role::Driven, "label").unwrap();
        let caption = HostedDataAttribute::new(&registry, CAPTION, Role::Driver, "box").unwrap();
        Fixture {
            graph: HostedGraph::new(Arc::new(registry)),
            contents,
            container,
            caption,
        }
    }

    fn spawn(graph: &mut HostedGraph<Shape>, shape: Shape) -> HostId {
        let id = graph.insert(shape);
        BaseEdit::new(ActivateEdit::new(id)).run(graph).unwrap();
        id
    }

    #[test]
    fn deactivate_round_trip_keeps_identity() {
        let mut f = fixture();
        let a = spawn(&mut f.graph, Shape::Box("a"));
        let mut edit = BaseEdit::new(DeactivateEdit::new(a));
        assert!(edit.run(&mut f.graph).unwrap());
        assert!(f.graph.get(a).is_none());
        assert_eq!(f.graph.get_any(a), Some(&Shape::Box("a")));
        edit.undo(&mut f.graph).unwrap();
        assert_eq!(f.graph.get(a), Some(&Shape::Box("a")));

        let mut again = BaseEdit::new(ActivateEdit::new(a));
        assert!(!again.run(&mut f.graph).unwrap());
    }

    #[test]
    fn list_edit_maintains_back_references() {
        let mut f = fixture();
        let a = spawn(&mut f.graph, Shape::Box("a"));
        let x = spawn(&mut f.graph, Shape::Label("x"));
        let y = spawn(&mut f.graph, Shape::Label("y"));

        let mut add = BaseEdit::new(HostedListEdit::add(a, &f.contents, [x, y]).unwrap());
        assert!(add.run(&mut f.graph).unwrap());
        assert_eq!(f.graph.list(a, &f.contents), [x, y]);
        assert_eq!(f.graph.attribute(x, &f.container), Some(a));

        add.undo(&mut f.graph).unwrap();
        assert!(f.graph.list(a, &f.contents).is_empty());
        assert_eq!(f.graph.attribute(x, &f.container), None);
        assert!(f.graph.audit().is_empty());

        add.redo(&mut f.graph).unwrap();
        assert_eq!(f.graph.attribute(y, &f.container), Some(a));
        assert!(f.graph.audit().is_empty());
    }

    #[test]
    fn driven_side_is_read_only() {
        let mut f = fixture();
        let x = spawn(&mut f.graph, Shape::Label("x"));
        assert_eq!(
            HostedAttributeEdit::<HostedGraph<Shape>>::new(x, &f.container, None).err(),
            Some(HostedError::DrivenReadOnly(CONTENTS))
        );
    }

    #[test]
    fn second_owner_of_single_valued_partner_is_skipped() {
        let mut f = fixture();
        let a = spawn(&mut f.graph, Shape::Box("a"));
        let b = spawn(&mut f.graph, Shape::Box("b"));
        let x = spawn(&mut f.graph, Shape::Label("x"));
        let y = spawn(&mut f.graph, Shape::Label("y"));

        BaseEdit::new(HostedListEdit::add(a, &f.contents, [x]).unwrap())
            .run(&mut f.graph)
            .unwrap();
        let mut steal = BaseEdit::new(HostedListEdit::add(b, &f.contents, [x, y]).unwrap());
        assert!(steal.run(&mut f.graph).unwrap());
        assert_eq!(f.graph.list(b, &f.contents), [y]);
        assert_eq!(f.graph.attribute(x, &f.container), Some(a));
        let replayed = steal
            .edit()
            .as_any()
            .downcast_ref::<HostedListEdit<HostedGraph<Shape>>>()
            .map(|e| e.op().clone());
        assert!(matches!(replayed, Some(SeqOp::Add(partners)) if partners == [y]));

        let mut only_x = BaseEdit::new(HostedListEdit::add(b, &f.contents, [x]).unwrap());
        assert!(!only_x.run(&mut f.graph).unwrap());
    }

    #[test]
    fn wrong_kind_fails_before_mutation() {
        let mut f = fixture();
        let a = spawn(&mut f.graph, Shape::Box("a"));
        let x = spawn(&mut f.graph, Shape::Label("x"));
        let mut edit = BaseEdit::new(HostedAttributeEdit::new(a, &f.caption, Some(a)).unwrap());
        let err = edit.run(&mut f.graph).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<HostedError>(),
            Some(HostedError::KindNotAllowed { .. })
        ));
        assert_eq!(f.graph.attribute(a, &f.caption), None);

        let mut edit = BaseEdit::new(HostedAttributeEdit::new(a, &f.caption, Some(x)).unwrap());
        assert!(edit.run(&mut f.graph).unwrap());
        assert_eq!(f.graph.attribute(a, &f.caption), Some(x));
        edit.undo(&mut f.graph).unwrap();
        assert_eq!(f.graph.attribute(a, &f.caption), None);
    }

    #[test]
    fn replace_keeps_positions_and_undoes_exactly() {
        let mut f = fixture();
        let outer = spawn(&mut f.graph, Shape::Box("outer"));
        let old = spawn(&mut f.graph, Shape::Box("old"));
        let sibling = spawn(&mut f.graph, Shape::Box("sibling"));
        let inner = spawn(&mut f.graph, Shape::Label("inner"));
        BaseEdit::new(HostedListEdit::add(outer, &f.contents, [old, sibling]).unwrap())
            .run(&mut f.graph)
            .unwrap();
        BaseEdit::new(HostedListEdit::add(old, &f.contents, [inner]).unwrap())
            .run(&mut f.graph)
            .unwrap();
        BaseEdit::new(HostedListEdit::move_to(outer, &f.contents, old, 1).unwrap())
            .run(&mut f.graph)
            .unwrap();
        assert_eq!(f.graph.list(outer, &f.contents), [sibling, old]);

        let new = f.graph.insert(Shape::Box("new"));
        let mut replace = BaseEdit::new(ReplaceHostedDataEdit::new(old, new));
        assert!(replace.run(&mut f.graph).unwrap());
        assert_eq!(f.graph.list(outer, &f.contents), [sibling, new]);
        assert_eq!(f.graph.list(new, &f.contents), [inner]);
        assert!(f.graph.get(old).is_none());
        assert!(f.graph.audit().is_empty());

        replace.undo(&mut f.graph).unwrap();
        assert_eq!(f.graph.list(outer, &f.contents), [sibling, old]);
        assert_eq!(f.graph.list(old, &f.contents), [inner]);
        assert!(!f.graph.is_active(new));
        assert!(f.graph.audit().is_empty());
    }

    #[test]
    fn replacement_must_be_unused() {
        let mut f = fixture();
        let a = spawn(&mut f.graph, Shape::Box("a"));
        let b = spawn(&mut f.graph, Shape::Box("b"));
        let mut replace = BaseEdit::new(ReplaceHostedDataEdit::new(a, b));
        assert_eq!(
            replace.run(&mut f.graph),
            Err(EditError::from(HostedError::ReplacementInUse(b)))
        );
        let err = replace.run(&mut f.graph).unwrap_err();
        assert_eq!(
            err.downcast_ref::<HostedError>(),
            Some(&HostedError::ReplacementInUse(b))
        );
    }
}
