//! Typed diff payloads for container edits.
//!
//! Every operation kind carries its own payload type, so a diff of the wrong
//! shape for its operation cannot be built. Map diffs are themselves ordered
//! maps whose entries are either a leaf payload or a nested diff for the
//! container one level down.

use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use crate::ordered_map::OrderedMap;

/// One entry of a map diff.
#[derive(Debug, Clone, PartialEq)]
pub enum DiffEntry<K, X> {
    /// Apply the operation at this key with this payload.
    Leaf(X),
    /// Apply the operation inside the nested map stored at this key.
    Nested(MapDiff<K, X>),
}

/// A map diff: keys of the target map to operation payloads.
pub type MapDiff<K, X> = OrderedMap<K, DiffEntry<K, X>>;

/// Builds a flat map diff from `(key, payload)` pairs.
pub fn leaves<K, X>(entries: impl IntoIterator<Item = (K, X)>) -> MapDiff<K, X>
where
    K: Hash + Eq + Clone,
{
    entries
        .into_iter()
        .map(|(k, x)| (k, DiffEntry::Leaf(x)))
        .collect()
}

/// Builds a diff entry that recurses into the map stored at its key.
pub fn nested<K, X>(entries: impl IntoIterator<Item = (K, DiffEntry<K, X>)>) -> DiffEntry<K, X>
where
    K: Hash + Eq + Clone,
{
    DiffEntry::Nested(entries.into_iter().collect())
}

/// Values that may themselves be maps, making recursive diffs possible.
///
/// The defaults describe a flat value: never a nested map, never built from
/// one. Flat impls are provided for the standard scalar and collection
/// types; [`Tree`] is the ready-made nested value.
pub trait Nested<K>: Sized {
    fn as_nested_mut(&mut self) -> Option<&mut OrderedMap<K, Self>> {
        None
    }

    /// Wraps a freshly built map as a value, when a diff creates a new
    /// nesting level.
    fn from_nested(_map: OrderedMap<K, Self>) -> Option<Self> {
        None
    }
}

macro_rules! impl_flat_nested {
    ($($ty:ty),* $(,)?) => {
        $(impl<K> Nested<K> for $ty {})*
    };
}

impl_flat_nested!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, String,
    &'static str,
);

impl<K, T> Nested<K> for Vec<T> {}
impl<K, T> Nested<K> for Option<T> {}

/// A value that is either a leaf or an ordered map of further trees.
///
/// Used for nested records such as per-date history:
/// `{"2024-03-01": {"status": "done", "note": "..."}}`.
#[derive(Clone, PartialEq)]
pub enum Tree<K, V> {
    Leaf(V),
    Branch(OrderedMap<K, Tree<K, V>>),
}

impl<K: Hash + Eq + Clone, V> Tree<K, V> {
    /// An empty branch.
    pub fn branch() -> Self {
        Tree::Branch(OrderedMap::new())
    }

    /// Follows `path` through branches.
    pub fn get_path(&self, path: &[K]) -> Option<&Tree<K, V>> {
        let Some((first, rest)) = path.split_first() else {
            return Some(self);
        };
        match self {
            Tree::Branch(map) => map.get(first)?.get_path(rest),
            Tree::Leaf(_) => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&V> {
        match self {
            Tree::Leaf(v) => Some(v),
            Tree::Branch(_) => None,
        }
    }
}

impl<K, V> Nested<K> for Tree<K, V> {
    fn as_nested_mut(&mut self) -> Option<&mut OrderedMap<K, Self>> {
        match self {
            Tree::Branch(map) => Some(map),
            Tree::Leaf(_) => None,
        }
    }

    fn from_nested(map: OrderedMap<K, Self>) -> Option<Self> {
        Some(Tree::Branch(map))
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Tree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tree::Leaf(v) => v.fmt(f),
            Tree::Branch(map) => map.fmt(f),
        }
    }
}

/// Payload of an add-or-modify entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Upsert<V> {
    /// Modify if present, otherwise append.
    Set(V),
    /// Modify if present, otherwise insert at the index.
    InsertAt(usize, V),
}

/// Payload of an add-remove-or-modify entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Change<V> {
    Set(V),
    InsertAt(usize, V),
    Delete,
}

/// Shared comparator used by sort operations.
pub type Comparator<E> = Arc<dyn Fn(&E, &E) -> Ordering + Send + Sync>;

/// A sort operation: by comparator, or restoring a captured order.
pub enum Sort<E> {
    By { compare: Comparator<E>, reverse: bool },
    /// Element `order[i]` moves to position `i`. This is how inverses
    /// restore the order a sort destroyed.
    Restore(Vec<usize>),
}

impl<E> Sort<E> {
    pub fn by(compare: impl Fn(&E, &E) -> Ordering + Send + Sync + 'static) -> Self {
        Sort::By {
            compare: Arc::new(compare),
            reverse: false,
        }
    }

    pub fn by_key<O: Ord>(key: impl Fn(&E) -> O + Send + Sync + 'static) -> Self {
        Self::by(move |a, b| key(a).cmp(&key(b)))
    }

    /// Flips the direction of a comparator sort.
    pub fn reversed(self) -> Self {
        match self {
            Sort::By { compare, reverse } => Sort::By {
                compare,
                reverse: !reverse,
            },
            restore => restore,
        }
    }

    pub(crate) fn ordering(compare: &Comparator<E>, reverse: bool, a: &E, b: &E) -> Ordering {
        let ordering = compare(a, b);
        if reverse { ordering.reverse() } else { ordering }
    }
}

impl<E> Clone for Sort<E> {
    fn clone(&self) -> Self {
        match self {
            Sort::By { compare, reverse } => Sort::By {
                compare: Arc::clone(compare),
                reverse: *reverse,
            },
            Sort::Restore(order) => Sort::Restore(order.clone()),
        }
    }
}

impl<E> fmt::Debug for Sort<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sort::By { reverse, .. } => f
                .debug_struct("By")
                .field("reverse", reverse)
                .finish_non_exhaustive(),
            Sort::Restore(order) => f.debug_tuple("Restore").field(order).finish(),
        }
    }
}

/// Inverts a permutation: if `p[new] = old`, the result `q[old] = new`.
pub(crate) fn invert_permutation(permutation: &[usize]) -> Vec<usize> {
    let mut inverse = vec![0; permutation.len()];
    for (new, &old) in permutation.iter().enumerate() {
        inverse[old] = new;
    }
    inverse
}

pub(crate) fn is_identity(permutation: &[usize]) -> bool {
    permutation.iter().enumerate().all(|(i, &p)| i == p)
}

/// Checks that `order` is a permutation of `0..len`.
pub(crate) fn is_permutation(order: &[usize], len: usize) -> bool {
    if order.len() != len {
        return false;
    }
    let mut seen = vec![false; len];
    for &i in order {
        if i >= len || std::mem::replace(&mut seen[i], true) {
            return false;
        }
    }
    true
}

/// Operations on an [`OrderedMap`].
///
/// | op | payload | inverse |
/// |---|---|---|
/// | `Add` | value, appended | `Remove` |
/// | `Insert` | `(index, value)` | `Remove` |
/// | `Remove` | `()` | `Insert` at the old index |
/// | `Rename` | new key | `Rename` back |
/// | `Modify` | new value | `Modify` to the old value |
/// | `Move` | new index | `Move` to the old index |
/// | `Sort` | comparator | `Sort::Restore` |
/// | `AddOrModify` | [`Upsert`] | `RemoveOrModify` |
/// | `RemoveOrModify` | `Some(value)` or `None` (remove) | `AddOrModify` |
/// | `AddRemoveOrModify` | [`Change`] | `AddRemoveOrModify` |
#[derive(Debug, Clone)]
pub enum MapOp<K, V> {
    Add(MapDiff<K, V>),
    Insert(MapDiff<K, (usize, V)>),
    Remove(MapDiff<K, ()>),
    Rename(MapDiff<K, K>),
    Modify(MapDiff<K, V>),
    Move(MapDiff<K, usize>),
    Sort(Sort<(K, V)>),
    AddOrModify(MapDiff<K, Upsert<V>>),
    RemoveOrModify(MapDiff<K, Option<V>>),
    AddRemoveOrModify(MapDiff<K, Change<V>>),
}

impl<K, V> MapOp<K, V> {
    pub fn kind(&self) -> &'static str {
        match self {
            MapOp::Add(_) => "Add",
            MapOp::Insert(_) => "Insert",
            MapOp::Remove(_) => "Remove",
            MapOp::Rename(_) => "Rename",
            MapOp::Modify(_) => "Modify",
            MapOp::Move(_) => "Move",
            MapOp::Sort(_) => "Sort",
            MapOp::AddOrModify(_) => "Add or modify",
            MapOp::RemoveOrModify(_) => "Remove or modify",
            MapOp::AddRemoveOrModify(_) => "Add, remove or modify",
        }
    }
}

/// Addresses one element of a sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum SeqKey<V> {
    Index(usize),
    /// The first element equal to the value.
    Value(V),
}

/// Operations on a `Vec`.
///
/// | op | payload | inverse |
/// |---|---|---|
/// | `Add` | values, appended | `Remove` |
/// | `Insert` | `(index, value)` | `Remove` |
/// | `Remove` | element | `Insert` at the old index |
/// | `Modify` | `(element, new value)` | `Modify` to the old value |
/// | `Move` | `(element, new index)` | `Move` to the old index |
/// | `Sort` | comparator | `Sort::Restore` |
///
/// Inverses address elements by index, or by value when the edit carries
/// [`EditFlags::FIND_BY_VALUE`](super::EditFlags::FIND_BY_VALUE). As with
/// [`MapOp::Move`], a new index at or past the length is a no-op.
#[derive(Debug, Clone)]
pub enum SeqOp<V> {
    Add(Vec<V>),
    Insert(Vec<(usize, V)>),
    Remove(Vec<SeqKey<V>>),
    Modify(Vec<(SeqKey<V>, V)>),
    Move(Vec<(SeqKey<V>, usize)>),
    Sort(Sort<V>),
}

impl<V> SeqOp<V> {
    pub fn kind(&self) -> &'static str {
        match self {
            SeqOp::Add(_) => "Add",
            SeqOp::Insert(_) => "Insert",
            SeqOp::Remove(_) => "Remove",
            SeqOp::Modify(_) => "Modify",
            SeqOp::Move(_) => "Move",
            SeqOp::Sort(_) => "Sort",
        }
    }

    /// Removes elements by value.
    pub fn remove_values(values: impl IntoIterator<Item = V>) -> Self {
        SeqOp::Remove(values.into_iter().map(SeqKey::Value).collect())
    }
}
