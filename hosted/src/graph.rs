//! The relationship table.
//!
//! Driver collections are the only stored relationship data; the driven
//! index is a pure function of them and is kept in step by the hosted edits.
//! Both store raw ids. Visibility (active vs. defunct) is applied when
//! reading, so activating or deactivating an entity never touches the
//! tables.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use almanac_core::edit::Editable;

use crate::arena::{HostArena, HostId, Hosted, Kind};
use crate::error::HostedError;
use crate::pairing::{Cardinality, PairingDecl, PairingId, PairingRegistry, Role};

type Slot = (HostId, PairingId);

/// Editable targets that contain a [`HostedGraph`].
pub trait HostedTarget: Editable {
    type Entity: Hosted;

    fn graph(&self) -> &HostedGraph<Self::Entity>;
    fn graph_mut(&mut self) -> &mut HostedGraph<Self::Entity>;
}

/// Handle to a many-valued pairing endpoint on entities of one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostedDataList {
    pairing: PairingId,
    role: Role,
    owner_kind: Kind,
}

impl HostedDataList {
    pub fn new(
        registry: &PairingRegistry,
        pairing: PairingId,
        role: Role,
        owner_kind: Kind,
    ) -> Result<Self, HostedError> {
        registry.check(pairing, role, owner_kind, Cardinality::Many)?;
        Ok(Self {
            pairing,
            role,
            owner_kind,
        })
    }

    pub fn pairing(&self) -> PairingId {
        self.pairing
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn owner_kind(&self) -> Kind {
        self.owner_kind
    }
}

/// Handle to a single-valued pairing endpoint on entities of one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostedDataAttribute {
    pairing: PairingId,
    role: Role,
    owner_kind: Kind,
}

impl HostedDataAttribute {
    pub fn new(
        registry: &PairingRegistry,
        pairing: PairingId,
        role: Role,
        owner_kind: Kind,
    ) -> Result<Self, HostedError> {
        registry.check(pairing, role, owner_kind, Cardinality::One)?;
        Ok(Self {
            pairing,
            role,
            owner_kind,
        })
    }

    pub fn pairing(&self) -> PairingId {
        self.pairing
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn owner_kind(&self) -> Kind {
        self.owner_kind
    }
}

/// A discrepancy found by [`HostedGraph::audit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditIssue {
    /// `owner` lists `partner` but the partner's driven side does not know.
    MissingBackReference {
        partner: HostId,
        pairing: PairingId,
        owner: HostId,
    },
    /// The driven side of `partner` names an owner that no longer lists it.
    StaleBackReference {
        partner: HostId,
        pairing: PairingId,
        owner: HostId,
    },
    DuplicatePartner {
        owner: HostId,
        pairing: PairingId,
        partner: HostId,
    },
    /// A single-valued driven side with more than one active owner.
    MultipleOwners {
        partner: HostId,
        pairing: PairingId,
        owners: Vec<HostId>,
    },
}

impl fmt::Display for AuditIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditIssue::MissingBackReference {
                partner,
                pairing,
                owner,
            } => write!(f, "{partner} is missing back-reference to {owner} in '{pairing}'"),
            AuditIssue::StaleBackReference {
                partner,
                pairing,
                owner,
            } => write!(f, "{partner} has stale back-reference to {owner} in '{pairing}'"),
            AuditIssue::DuplicatePartner {
                owner,
                pairing,
                partner,
            } => write!(f, "{owner} lists {partner} twice in '{pairing}'"),
            AuditIssue::MultipleOwners {
                partner,
                pairing,
                owners,
            } => write!(f, "{partner} has {} active owners in '{pairing}'", owners.len()),
        }
    }
}

/// Hosted entities plus the pairings between them.
pub struct HostedGraph<E> {
    arena: HostArena<E>,
    registry: Arc<PairingRegistry>,
    drivers: BTreeMap<Slot, Vec<HostId>>,
    driven: BTreeMap<Slot, BTreeSet<HostId>>,
}

impl<E: Hosted> HostedGraph<E> {
    pub fn new(registry: Arc<PairingRegistry>) -> Self {
        Self {
            arena: HostArena::new(),
            registry,
            drivers: BTreeMap::new(),
            driven: BTreeMap::new(),
        }
    }

    pub fn registry(&self) -> &PairingRegistry {
        &self.registry
    }

    pub fn arena(&self) -> &HostArena<E> {
        &self.arena
    }

    /// Stores a new, inactive entity. It joins lookups once an
    /// [`ActivateEdit`](crate::ActivateEdit) runs.
    pub fn insert(&mut self, entity: E) -> HostId {
        let id = self.arena.insert(entity);
        log::trace!("Hosted {} stored as {id:?}", self.arena.kind(id).unwrap_or("?"));
        id
    }

    pub fn contains(&self, id: HostId) -> bool {
        self.arena.contains(id)
    }

    pub fn is_active(&self, id: HostId) -> bool {
        self.arena.is_active(id)
    }

    pub fn get(&self, id: HostId) -> Option<&E> {
        self.arena.get(id)
    }

    /// The entity, if it is active.
    pub fn get_mut(&mut self, id: HostId) -> Option<&mut E> {
        self.arena.get_mut(id)
    }

    /// The entity whether active or defunct. Edits use this to reach fields
    /// of entities they deactivated.
    pub fn get_any(&self, id: HostId) -> Option<&E> {
        self.arena.get_any(id)
    }

    pub fn get_any_mut(&mut self, id: HostId) -> Option<&mut E> {
        self.arena.get_any_mut(id)
    }

    pub fn kind(&self, id: HostId) -> Option<Kind> {
        self.arena.kind(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (HostId, &E)> {
        self.arena.iter()
    }

    /// Active entities of one kind.
    pub fn iter_kind(&self, kind: Kind) -> impl Iterator<Item = (HostId, &E)> {
        self.arena.iter().filter(move |(_, e)| e.kind() == kind)
    }

    pub fn active_count(&self) -> usize {
        self.arena.active_count()
    }

    /// Active partners of `owner` through a list endpoint. Empty for a
    /// defunct owner.
    pub fn list(&self, owner: HostId, handle: &HostedDataList) -> Vec<HostId> {
        self.partners(owner, handle.pairing, handle.role)
    }

    /// Active partner of `owner` through an attribute endpoint.
    pub fn attribute(&self, owner: HostId, handle: &HostedDataAttribute) -> Option<HostId> {
        self.partners(owner, handle.pairing, handle.role)
            .into_iter()
            .next()
    }

    fn partners(&self, owner: HostId, pairing: PairingId, role: Role) -> Vec<HostId> {
        if !self.is_active(owner) {
            return Vec::new();
        }
        let slot = (owner, pairing);
        match role {
            Role::Driver => self
                .drivers
                .get(&slot)
                .map(|list| list.iter().copied().filter(|&p| self.is_active(p)).collect())
                .unwrap_or_default(),
            Role::Driven => self.active_owners(owner, pairing),
        }
    }

    /// Active owners whose driver side of `pairing` references `partner`.
    pub(crate) fn active_owners(&self, partner: HostId, pairing: PairingId) -> Vec<HostId> {
        self.driven
            .get(&(partner, pairing))
            .map(|owners| owners.iter().copied().filter(|&o| self.is_active(o)).collect())
            .unwrap_or_default()
    }

    /// The raw driver collection of `owner`, defunct partners included.
    pub(crate) fn driver_slot(&self, owner: HostId, pairing: PairingId) -> &[HostId] {
        self.drivers
            .get(&(owner, pairing))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub(crate) fn driver_slot_mut(&mut self, owner: HostId, pairing: PairingId) -> &mut Vec<HostId> {
        self.drivers.entry((owner, pairing)).or_default()
    }

    /// Raw owners referencing `partner`, defunct ones included.
    pub(crate) fn raw_owners(&self, partner: HostId, pairing: PairingId) -> Vec<HostId> {
        self.driven
            .get(&(partner, pairing))
            .map(|owners| owners.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Pairings in which `owner` has a non-empty driver collection.
    pub(crate) fn driver_pairings(&self, owner: HostId) -> Vec<PairingId> {
        self.drivers
            .range((owner, PairingId(""))..)
            .take_while(|((o, _), _)| *o == owner)
            .filter(|(_, list)| !list.is_empty())
            .map(|((_, p), _)| *p)
            .collect()
    }

    /// Pairings in which `partner` is referenced by some owner.
    pub(crate) fn driven_pairings(&self, partner: HostId) -> Vec<PairingId> {
        self.driven
            .range((partner, PairingId(""))..)
            .take_while(|((o, _), _)| *o == partner)
            .filter(|(_, owners)| !owners.is_empty())
            .map(|((_, p), _)| *p)
            .collect()
    }

    pub(crate) fn set_active(&mut self, id: HostId, active: bool) -> Result<bool, HostedError> {
        self.arena
            .set_active(id, active)
            .ok_or(HostedError::UnknownEntity(id))
    }

    /// Brings the driven index in line with the driver collection of
    /// `owner` after it changed from `before`.
    pub(crate) fn sync_driven(&mut self, owner: HostId, pairing: PairingId, before: &[HostId]) {
        let after: BTreeSet<HostId> = self.driver_slot(owner, pairing).iter().copied().collect();
        let before: BTreeSet<HostId> = before.iter().copied().collect();
        for removed in before.difference(&after) {
            let slot = (*removed, pairing);
            if let Some(owners) = self.driven.get_mut(&slot) {
                owners.remove(&owner);
                if owners.is_empty() {
                    self.driven.remove(&slot);
                }
            }
        }
        for added in after.difference(&before) {
            self.driven.entry((*added, pairing)).or_default().insert(owner);
        }
        if after.is_empty() {
            self.drivers.remove(&(owner, pairing));
        }
    }

    /// Checks that `id` exists and that its kind may sit on `role` of
    /// `decl`.
    pub(crate) fn check_kind(
        &self,
        id: HostId,
        decl: &PairingDecl,
        role: Role,
    ) -> Result<(), HostedError> {
        let kind = self.kind(id).ok_or(HostedError::UnknownEntity(id))?;
        if decl.endpoint(role).allows(kind) {
            Ok(())
        } else {
            Err(HostedError::KindNotAllowed {
                pairing: decl.id,
                kind,
                role,
            })
        }
    }

    /// Frees a defunct entity nothing references any more.
    ///
    /// Call only once no recorded edit can bring the entity back, e.g.
    /// right after the edit log was cleared.
    pub fn release(&mut self, id: HostId) -> Result<E, HostedError> {
        if self.is_active(id) || !self.driven_pairings(id).is_empty() {
            return Err(HostedError::StillReferenced(id));
        }
        for pairing in self.driver_pairings(id) {
            let before = std::mem::take(self.driver_slot_mut(id, pairing));
            self.sync_driven(id, pairing, &before);
        }
        self.arena.release(id).ok_or(HostedError::UnknownEntity(id))
    }

    /// Recomputes the driven index from the driver collections and reports
    /// every difference, plus violations of single-valued driven sides.
    pub fn audit(&self) -> Vec<AuditIssue> {
        let mut issues = Vec::new();
        let mut expected: BTreeMap<Slot, BTreeSet<HostId>> = BTreeMap::new();
        for (&(owner, pairing), list) in &self.drivers {
            let mut seen = BTreeSet::new();
            for &partner in list {
                if !seen.insert(partner) {
                    issues.push(AuditIssue::DuplicatePartner {
                        owner,
                        pairing,
                        partner,
                    });
                }
                expected.entry((partner, pairing)).or_default().insert(owner);
            }
        }

        for (&(partner, pairing), owners) in &expected {
            let actual = self.driven.get(&(partner, pairing));
            for &owner in owners {
                if !actual.is_some_and(|a| a.contains(&owner)) {
                    issues.push(AuditIssue::MissingBackReference {
                        partner,
                        pairing,
                        owner,
                    });
                }
            }
        }
        for (&(partner, pairing), owners) in &self.driven {
            let wanted = expected.get(&(partner, pairing));
            for &owner in owners {
                if !wanted.is_some_and(|w| w.contains(&owner)) {
                    issues.push(AuditIssue::StaleBackReference {
                        partner,
                        pairing,
                        owner,
                    });
                }
            }
        }

        for &(partner, pairing) in expected.keys() {
            let single = self
                .registry
                .get(pairing)
                .is_ok_and(|d| d.driven.cardinality == Cardinality::One);
            if !single || !self.is_active(partner) {
                continue;
            }
            let owners = self.active_owners(partner, pairing);
            if owners.len() > 1 {
                issues.push(AuditIssue::MultipleOwners {
                    partner,
                    pairing,
                    owners,
                });
            }
        }
        issues
    }
}

impl<E: Hosted> Editable for HostedGraph<E> {}

impl<E: Hosted> HostedTarget for HostedGraph<E> {
    type Entity = E;

    fn graph(&self) -> &HostedGraph<E> {
        self
    }

    fn graph_mut(&mut self) -> &mut HostedGraph<E> {
        self
    }
}

impl<E> fmt::Debug for HostedGraph<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostedGraph")
            .field("arena", &self.arena)
            .field("driver_slots", &self.drivers.len())
            .field("driven_slots", &self.driven.len())
            .finish()
    }
}
