//! Diff application for [`OrderedMap`].

use std::fmt;
use std::hash::Hash;

use super::diff::{
    Change, DiffEntry, MapDiff, MapOp, Nested, Sort, Upsert, invert_permutation, is_identity,
    is_permutation,
};
use super::{Applied, ApplyContext, DiffContainer};
use crate::edit::action::{EditError, EditResult};
use crate::ordered_map::OrderedMap;

/// What a leaf operation sees at one key.
enum Input<'a, K, X> {
    Leaf(&'a X),
    /// A nested diff that could not be applied one level down (recursion
    /// disabled, or the value at the key is not a map).
    Nested(&'a MapDiff<K, X>),
}

/// Walks `diff` over `map`, recursing into nested maps when allowed.
///
/// `leaf` performs the operation at one key and returns the inverse entry
/// `(key, payload)` if anything changed. Inverse entries are collected in
/// reverse so that the inverse diff undoes the last change first.
fn walk<K, V, X, Y, F>(
    map: &mut OrderedMap<K, V>,
    diff: &MapDiff<K, X>,
    ctx: &ApplyContext,
    leaf: &mut F,
) -> (bool, MapDiff<K, Y>)
where
    K: Hash + Eq + Clone,
    V: Nested<K>,
    F: FnMut(&mut OrderedMap<K, V>, &K, Input<'_, K, X>) -> Option<(K, Y)>,
{
    let mut changed = false;
    let mut inverse = Vec::new();
    for (key, entry) in diff.iter() {
        let input = match entry {
            DiffEntry::Leaf(x) => Input::Leaf(x),
            DiffEntry::Nested(sub) => {
                if ctx.recursive
                    && let Some(inner) = map.get_mut(key).and_then(|v| v.as_nested_mut())
                {
                    let (sub_changed, sub_inverse) = walk(inner, sub, ctx, leaf);
                    if sub_changed {
                        changed = true;
                        inverse.push((key.clone(), DiffEntry::Nested(sub_inverse)));
                    }
                    continue;
                }
                Input::Nested(sub)
            }
        };
        match leaf(map, key, input) {
            Some((inverse_key, payload)) => {
                changed = true;
                inverse.push((inverse_key, DiffEntry::Leaf(payload)));
            }
            None => log::trace!("Container diff: no change at a key, skipped"),
        }
    }
    (changed, inverse.into_iter().rev().collect())
}

/// Builds a value from a nested diff, creating new nesting levels.
fn build_value<K, V, X>(diff: &MapDiff<K, X>, leaf: &dyn Fn(&X) -> Option<V>) -> Option<V>
where
    K: Hash + Eq + Clone,
    V: Nested<K>,
{
    let mut map = OrderedMap::with_capacity(diff.len());
    for (key, entry) in diff.iter() {
        let value = match entry {
            DiffEntry::Leaf(x) => leaf(x),
            DiffEntry::Nested(sub) => build_value(sub, leaf),
        };
        if let Some(value) = value {
            map.insert(key.clone(), value);
        }
    }
    V::from_nested(map)
}

fn value_of<K, V, X>(input: Input<'_, K, X>, leaf: &dyn Fn(&X) -> Option<V>) -> Option<V>
where
    K: Hash + Eq + Clone,
    V: Nested<K>,
{
    match input {
        Input::Leaf(x) => leaf(x),
        Input::Nested(sub) => build_value(sub, leaf),
    }
}

/// Replaces the value at `key` if it differs, returning the old value.
fn modify<K, V>(map: &mut OrderedMap<K, V>, key: &K, value: V) -> Option<V>
where
    K: Hash + Eq + Clone,
    V: PartialEq,
{
    let current = map.get_mut(key)?;
    if *current == value {
        return None;
    }
    Some(std::mem::replace(current, value))
}

impl<K, V> DiffContainer for OrderedMap<K, V>
where
    K: Hash + Eq + Clone + fmt::Debug + Send + Sync + 'static,
    V: Nested<K> + Clone + PartialEq + fmt::Debug + Send + Sync + 'static,
{
    type Op = MapOp<K, V>;

    fn op_kind(op: &Self::Op) -> &'static str {
        op.kind()
    }

    fn apply_op(&mut self, op: &Self::Op, ctx: &ApplyContext) -> EditResult<Applied<Self::Op>> {
        let applied = match op {
            MapOp::Add(diff) => {
                let (changed, inverse) = walk(self, diff, ctx, &mut |map, key, input| {
                    if map.contains_key(key) {
                        return None;
                    }
                    let value = value_of(input, &|v: &V| Some(v.clone()))?;
                    map.insert(key.clone(), value);
                    Some((key.clone(), ()))
                });
                Applied::new(changed, MapOp::Remove(inverse))
            }
            MapOp::Insert(diff) => {
                let (changed, inverse) = walk(self, diff, ctx, &mut |map, key, input| {
                    let Input::Leaf((index, value)) = input else {
                        return None;
                    };
                    map.insert_at(*index, key.clone(), value.clone()).ok()?;
                    Some((key.clone(), ()))
                });
                Applied::new(changed, MapOp::Remove(inverse))
            }
            MapOp::Remove(diff) => {
                let (changed, inverse) = walk(self, diff, ctx, &mut |map, key, input| {
                    let Input::Leaf(()) = input else {
                        return None;
                    };
                    let (index, value) = map.remove(key)?;
                    Some((key.clone(), (index, value)))
                });
                Applied::new(changed, MapOp::Insert(inverse))
            }
            MapOp::Rename(diff) => {
                let (changed, inverse) = walk(self, diff, ctx, &mut |map, key, input| {
                    let Input::Leaf(new_key) = input else {
                        return None;
                    };
                    if !map.rename(key, new_key.clone()) {
                        return None;
                    }
                    Some((new_key.clone(), key.clone()))
                });
                Applied::new(changed, MapOp::Rename(inverse))
            }
            MapOp::Modify(diff) => {
                let (changed, inverse) = walk(self, diff, ctx, &mut |map, key, input| {
                    let value = value_of(input, &|v: &V| Some(v.clone()))?;
                    let old = modify(map, key, value)?;
                    Some((key.clone(), old))
                });
                Applied::new(changed, MapOp::Modify(inverse))
            }
            MapOp::Move(diff) => {
                let (changed, inverse) = walk(self, diff, ctx, &mut |map, key, input| {
                    let Input::Leaf(&index) = input else {
                        return None;
                    };
                    if map.position(key) == Some(index) {
                        return None;
                    }
                    let old = map.move_to(key, index)?;
                    Some((key.clone(), old))
                });
                Applied::new(changed, MapOp::Move(inverse))
            }
            MapOp::Sort(sort) => {
                let order = match sort {
                    Sort::By { compare, reverse } => {
                        self.sort_by(|a, b| Sort::ordering(compare, *reverse, a, b))
                    }
                    Sort::Restore(order) => {
                        if !is_permutation(order, self.len()) {
                            return Err(EditError::MalformedDiff(format!(
                                "sort order {order:?} does not match a map of {} entries",
                                self.len()
                            )));
                        }
                        self.permute(order);
                        order.clone()
                    }
                };
                Applied::new(
                    !is_identity(&order),
                    MapOp::Sort(Sort::Restore(invert_permutation(&order))),
                )
            }
            MapOp::AddOrModify(diff) => {
                let (changed, inverse) = walk(self, diff, ctx, &mut |map, key, input| {
                    let (index, value) = match input {
                        Input::Leaf(Upsert::Set(v)) => (None, v.clone()),
                        Input::Leaf(Upsert::InsertAt(i, v)) => (Some(*i), v.clone()),
                        nested @ Input::Nested(_) => (None, value_of(nested, &upsert_value::<V>)?),
                    };
                    if map.contains_key(key) {
                        let old = modify(map, key, value)?;
                        return Some((key.clone(), Some(old)));
                    }
                    match index {
                        Some(i) => map.insert_at(i, key.clone(), value).ok()?,
                        None => {
                            map.insert(key.clone(), value);
                        }
                    }
                    Some((key.clone(), None))
                });
                Applied::new(changed, MapOp::RemoveOrModify(inverse))
            }
            MapOp::RemoveOrModify(diff) => {
                let (changed, inverse) = walk(self, diff, ctx, &mut |map, key, input| {
                    let value = match input {
                        Input::Leaf(None) => {
                            let (index, old) = map.remove(key)?;
                            return Some((key.clone(), Upsert::InsertAt(index, old)));
                        }
                        Input::Leaf(Some(v)) => v.clone(),
                        nested @ Input::Nested(_) => value_of(nested, &|v: &Option<V>| v.clone())?,
                    };
                    let old = modify(map, key, value)?;
                    Some((key.clone(), Upsert::Set(old)))
                });
                Applied::new(changed, MapOp::AddOrModify(inverse))
            }
            MapOp::AddRemoveOrModify(diff) => {
                let (changed, inverse) = walk(self, diff, ctx, &mut |map, key, input| {
                    let (index, value) = match input {
                        Input::Leaf(Change::Delete) => {
                            let (index, old) = map.remove(key)?;
                            return Some((key.clone(), Change::InsertAt(index, old)));
                        }
                        Input::Leaf(Change::Set(v)) => (None, v.clone()),
                        Input::Leaf(Change::InsertAt(i, v)) => (Some(*i), v.clone()),
                        nested @ Input::Nested(_) => (None, value_of(nested, &change_value::<V>)?),
                    };
                    if map.contains_key(key) {
                        let old = modify(map, key, value)?;
                        return Some((key.clone(), Change::Set(old)));
                    }
                    match index {
                        Some(i) => map.insert_at(i, key.clone(), value).ok()?,
                        None => {
                            map.insert(key.clone(), value);
                        }
                    }
                    Some((key.clone(), Change::Delete))
                });
                Applied::new(changed, MapOp::AddRemoveOrModify(inverse))
            }
        };
        Ok(applied)
    }
}

fn upsert_value<V: Clone>(upsert: &Upsert<V>) -> Option<V> {
    match upsert {
        Upsert::Set(v) | Upsert::InsertAt(_, v) => Some(v.clone()),
    }
}

fn change_value<V: Clone>(change: &Change<V>) -> Option<V> {
    match change {
        Change::Set(v) | Change::InsertAt(_, v) => Some(v.clone()),
        Change::Delete => None,
    }
}
