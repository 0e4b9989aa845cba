//! Hosted entity storage.

use std::fmt;

/// Identifies a hosted entity.
///
/// Layout: `u32 index` + `u32 generation`. The index is the slot in the
/// [`HostArena`]; the generation changes when a released slot is reused, so
/// a stale id never resolves to the new occupant.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HostId {
    index: u32,
    generation: u32,
}

impl HostId {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostId({}v{})", self.index, self.generation)
    }
}

impl fmt::Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index)
    }
}

/// The kind of a hosted entity, checked against pairing declarations.
pub type Kind = &'static str;

/// An entity that can live in a [`HostArena`] and take part in pairings.
pub trait Hosted: Send + 'static {
    fn kind(&self) -> Kind;
}

struct Slot<E> {
    generation: u32,
    active: bool,
    entity: Option<E>,
}

/// Slot storage for hosted entities.
///
/// Entities are inserted inactive and toggled with
/// [`set_active`](Self::set_active). An inactive (defunct) entity keeps its
/// slot, id and field values; default lookups and iteration skip it. Only
/// [`release`](Self::release) frees a slot, and only for defunct entities.
pub struct HostArena<E> {
    slots: Vec<Slot<E>>,
    free_list: Vec<u32>,
}

impl<E: Hosted> HostArena<E> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
        }
    }

    /// Stores `entity`, inactive, and returns its id.
    pub fn insert(&mut self, entity: E) -> HostId {
        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.generation += 1;
            slot.active = false;
            slot.entity = Some(entity);
            return HostId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            active: false,
            entity: Some(entity),
        });
        HostId {
            index,
            generation: 0,
        }
    }

    fn slot(&self, id: HostId) -> Option<&Slot<E>> {
        self.slots
            .get(id.index as usize)
            .filter(|s| s.generation == id.generation && s.entity.is_some())
    }

    fn slot_mut(&mut self, id: HostId) -> Option<&mut Slot<E>> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|s| s.generation == id.generation && s.entity.is_some())
    }

    /// Whether `id` refers to a stored entity, active or not.
    pub fn contains(&self, id: HostId) -> bool {
        self.slot(id).is_some()
    }

    pub fn is_active(&self, id: HostId) -> bool {
        self.slot(id).is_some_and(|s| s.active)
    }

    /// Sets the active flag. Returns the previous value, or `None` if `id` is
    /// unknown.
    pub(crate) fn set_active(&mut self, id: HostId, active: bool) -> Option<bool> {
        let slot = self.slot_mut(id)?;
        Some(std::mem::replace(&mut slot.active, active))
    }

    /// The entity, if it is active.
    pub fn get(&self, id: HostId) -> Option<&E> {
        self.slot(id).filter(|s| s.active)?.entity.as_ref()
    }

    pub fn get_mut(&mut self, id: HostId) -> Option<&mut E> {
        self.slot_mut(id).filter(|s| s.active)?.entity.as_mut()
    }

    /// The entity, active or defunct.
    pub fn get_any(&self, id: HostId) -> Option<&E> {
        self.slot(id)?.entity.as_ref()
    }

    pub fn get_any_mut(&mut self, id: HostId) -> Option<&mut E> {
        self.slot_mut(id)?.entity.as_mut()
    }

    /// Kind of the entity, active or defunct.
    pub fn kind(&self, id: HostId) -> Option<Kind> {
        self.get_any(id).map(Hosted::kind)
    }

    /// Active entities in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (HostId, &E)> {
        self.iter_all().filter(|(id, _)| self.is_active(*id))
    }

    /// All stored entities, including defunct ones.
    pub fn iter_all(&self) -> impl Iterator<Item = (HostId, &E)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            let entity = slot.entity.as_ref()?;
            let id = HostId {
                index: index as u32,
                generation: slot.generation,
            };
            Some((id, entity))
        })
    }

    /// Number of active entities.
    pub fn active_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| s.active && s.entity.is_some())
            .count()
    }

    /// Frees the slot of a defunct entity and returns it.
    ///
    /// Only sound once nothing (in particular no recorded edit) refers to
    /// `id` any more. Active entities are never released.
    pub fn release(&mut self, id: HostId) -> Option<E> {
        let slot = self.slot_mut(id).filter(|s| !s.active)?;
        let entity = slot.entity.take();
        self.free_list.push(id.index);
        entity
    }
}

impl<E: Hosted> Default for HostArena<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for HostArena<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stored = self.slots.iter().filter(|s| s.entity.is_some()).count();
        let active = self
            .slots
            .iter()
            .filter(|s| s.active && s.entity.is_some())
            .count();
        f.debug_struct("HostArena")
            .field("stored", &stored)
            .field("active", &active)
            .field("free", &self.free_list.len())
            .finish()
    }
}
