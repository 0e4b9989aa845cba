//! Single-value cells that are changed only through edits.

use std::fmt;

/// A named value cell owned by some editable data structure.
///
/// Reading is free; writing is reserved to this crate so that every change
/// flows through an [`AttributeEdit`](crate::edit::AttributeEdit) and is
/// therefore undoable.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct MutableAttribute<V> {
    value: V,
    name: Option<&'static str>,
}

impl<V> MutableAttribute<V> {
    /// Creates an unnamed attribute.
    pub fn new(value: V) -> Self {
        Self { value, name: None }
    }

    /// Creates an attribute whose name appears in edit descriptions.
    pub fn named(name: &'static str, value: V) -> Self {
        Self {
            value,
            name: Some(name),
        }
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn name(&self) -> Option<&'static str> {
        self.name
    }

    /// Replaces the value, returning `true` if it actually changed.
    pub(crate) fn set_value(&mut self, value: V) -> bool
    where
        V: PartialEq,
    {
        if self.value == value {
            return false;
        }
        self.value = value;
        true
    }
}

impl<V: fmt::Debug> fmt::Debug for MutableAttribute<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name {
            Some(name) => write!(f, "{name}={:?}", self.value),
            None => write!(f, "{:?}", self.value),
        }
    }
}
