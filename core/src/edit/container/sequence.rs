//! Diff application for `Vec`.

use std::fmt;

use super::diff::{SeqKey, SeqOp, Sort, invert_permutation, is_identity, is_permutation};
use super::{Applied, ApplyContext, DiffContainer, EditFlags};
use crate::edit::action::{EditError, EditResult};

fn find<V: PartialEq>(list: &[V], key: &SeqKey<V>) -> Option<usize> {
    match key {
        SeqKey::Index(i) => (*i < list.len()).then_some(*i),
        SeqKey::Value(v) => list.iter().position(|item| item == v),
    }
}

/// Builds the key an inverse uses to find an element again.
fn key_for<V: Clone>(flags: EditFlags, index: usize, value: &V) -> SeqKey<V> {
    if flags.contains(EditFlags::FIND_BY_VALUE) {
        SeqKey::Value(value.clone())
    } else {
        SeqKey::Index(index)
    }
}

fn skip_duplicate<V: PartialEq>(list: &[V], value: &V, flags: EditFlags) -> bool {
    flags.contains(EditFlags::IGNORE_DUPLICATES) && list.contains(value)
}

impl<V> DiffContainer for Vec<V>
where
    V: Clone + PartialEq + fmt::Debug + Send + Sync + 'static,
{
    type Op = SeqOp<V>;

    fn op_kind(op: &Self::Op) -> &'static str {
        op.kind()
    }

    fn apply_op(&mut self, op: &Self::Op, ctx: &ApplyContext) -> EditResult<Applied<Self::Op>> {
        let flags = ctx.flags;
        let applied = match op {
            SeqOp::Add(values) => {
                let mut inverse = Vec::new();
                for value in values {
                    if skip_duplicate(self, value, flags) {
                        log::trace!("Sequence add: duplicate {value:?} ignored");
                        continue;
                    }
                    inverse.push(key_for(flags, self.len(), value));
                    self.push(value.clone());
                }
                inverse.reverse();
                Applied::new(!inverse.is_empty(), SeqOp::Remove(inverse))
            }
            SeqOp::Insert(entries) => {
                let mut inverse = Vec::new();
                for (index, value) in entries {
                    if *index > self.len() || skip_duplicate(self, value, flags) {
                        continue;
                    }
                    self.insert(*index, value.clone());
                    inverse.push(key_for(flags, *index, value));
                }
                inverse.reverse();
                Applied::new(!inverse.is_empty(), SeqOp::Remove(inverse))
            }
            SeqOp::Remove(keys) => {
                let mut inverse = Vec::new();
                for key in keys {
                    let Some(index) = find(self, key) else {
                        continue;
                    };
                    let value = self.remove(index);
                    inverse.push((index, value));
                }
                inverse.reverse();
                Applied::new(!inverse.is_empty(), SeqOp::Insert(inverse))
            }
            SeqOp::Modify(entries) => {
                let mut inverse = Vec::new();
                for (key, value) in entries {
                    let Some(index) = find(self, key) else {
                        continue;
                    };
                    if self[index] == *value {
                        continue;
                    }
                    let old = std::mem::replace(&mut self[index], value.clone());
                    inverse.push((key_for(flags, index, value), old));
                }
                inverse.reverse();
                Applied::new(!inverse.is_empty(), SeqOp::Modify(inverse))
            }
            SeqOp::Move(entries) => {
                let mut inverse = Vec::new();
                for (key, new_index) in entries {
                    let Some(index) = find(self, key) else {
                        continue;
                    };
                    let new_index = *new_index;
                    if new_index >= self.len() || new_index == index {
                        continue;
                    }
                    let value = self.remove(index);
                    let key = key_for(flags, new_index, &value);
                    self.insert(new_index, value);
                    inverse.push((key, index));
                }
                inverse.reverse();
                Applied::new(!inverse.is_empty(), SeqOp::Move(inverse))
            }
            SeqOp::Sort(sort) => {
                let order = match sort {
                    Sort::By { compare, reverse } => {
                        let mut order: Vec<usize> = (0..self.len()).collect();
                        order.sort_by(|&a, &b| Sort::ordering(compare, *reverse, &self[a], &self[b]));
                        order
                    }
                    Sort::Restore(order) => {
                        if !is_permutation(order, self.len()) {
                            return Err(EditError::MalformedDiff(format!(
                                "sort order {order:?} does not match a list of {} elements",
                                self.len()
                            )));
                        }
                        order.clone()
                    }
                };
                let sorted: Vec<V> = order.iter().map(|&i| self[i].clone()).collect();
                *self = sorted;
                Applied::new(
                    !is_identity(&order),
                    SeqOp::Sort(Sort::Restore(invert_permutation(&order))),
                )
            }
        };
        Ok(applied)
    }
}
