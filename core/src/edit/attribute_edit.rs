//! Edits that set [`MutableAttribute`] values.

use std::fmt;

use super::action::{AsAny, Edit, EditResult, Editable, Locator};
use super::base::ContinuousEdit;
use crate::attribute::MutableAttribute;

/// One attribute/value pair, type-erased so one edit can set attributes of
/// different value types.
trait ErasedChange<T>: fmt::Debug + AsAny + Send {
    /// Sets the new value, capturing the original on first use.
    fn apply(&mut self, target: &mut T) -> EditResult;
    fn restore(&mut self, target: &mut T) -> EditResult;
    /// Whether the new value differs from the captured original.
    fn is_modified(&self) -> bool;
    fn describe(&self) -> Option<String>;
    /// Address of the attribute in the target, for identity comparison.
    fn address(&self, target: &mut T) -> Option<*const ()>;
    /// Takes the new value of `other` if it sets the same attribute type.
    fn absorb(&mut self, other: &mut dyn ErasedChange<T>) -> bool;
}

struct ValueChange<T, V> {
    attribute: Locator<T, MutableAttribute<V>>,
    value: V,
    original: Option<V>,
    name: Option<&'static str>,
}

impl<T, V> ErasedChange<T> for ValueChange<T, V>
where
    T: Editable,
    V: Clone + PartialEq + fmt::Debug + Send + Sync + 'static,
{
    fn apply(&mut self, target: &mut T) -> EditResult {
        let attribute = self.attribute.locate(target)?;
        if self.original.is_none() {
            self.original = Some(attribute.value().clone());
            self.name = attribute.name();
        }
        attribute.set_value(self.value.clone());
        Ok(())
    }

    fn restore(&mut self, target: &mut T) -> EditResult {
        let Some(original) = &self.original else {
            return Ok(());
        };
        self.attribute.locate(target)?.set_value(original.clone());
        Ok(())
    }

    fn is_modified(&self) -> bool {
        self.original.as_ref().is_some_and(|o| *o != self.value)
    }

    fn describe(&self) -> Option<String> {
        let name = self.name?;
        let original = self.original.as_ref()?;
        (*original != self.value).then(|| format!("{name}: {original:?} --> {:?}", self.value))
    }

    fn address(&self, target: &mut T) -> Option<*const ()> {
        let attribute = self.attribute.try_locate(target)?;
        Some(attribute as *const MutableAttribute<V> as *const ())
    }

    fn absorb(&mut self, other: &mut dyn ErasedChange<T>) -> bool {
        match other.as_any_mut().downcast_mut::<Self>() {
            Some(other) => {
                self.value = other.value.clone();
                true
            }
            None => false,
        }
    }
}

impl<T, V: fmt::Debug> fmt::Debug for ValueChange<T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueChange")
            .field("attribute", &self.attribute)
            .field("value", &self.value)
            .field("original", &self.original)
            .finish()
    }
}

/// Sets any number of attributes to new values in one step.
///
/// Originals are captured the first time the edit runs; undo restores them.
/// The edit is valid if at least one value actually changed.
///
/// # Example
///
/// ```ignore
/// let edit = AttributeEdit::new()
///     .set(task_name(id), "Write report".to_string())
///     .set(task_status(id), TaskStatus::InProgress);
/// log.run(BaseEdit::new(edit), &mut planner)?;
/// ```
pub struct AttributeEdit<T: Editable> {
    changes: Vec<Box<dyn ErasedChange<T>>>,
    valid: bool,
    name: Option<String>,
}

impl<T: Editable> AttributeEdit<T> {
    pub fn new() -> Self {
        Self {
            changes: Vec::new(),
            valid: false,
            name: None,
        }
    }

    /// Adds an attribute/value pair.
    pub fn set<V>(mut self, attribute: Locator<T, MutableAttribute<V>>, value: V) -> Self
    where
        V: Clone + PartialEq + fmt::Debug + Send + Sync + 'static,
    {
        self.changes.push(Box::new(ValueChange {
            attribute,
            value,
            original: None,
            name: None,
        }));
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Number of attribute/value pairs.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    fn refresh_validity(&mut self) {
        self.valid = self.changes.iter().any(|c| c.is_modified());
    }
}

impl<T: Editable> Default for AttributeEdit<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Editable> Edit<T> for AttributeEdit<T> {
    fn apply(&mut self, target: &mut T) -> EditResult {
        for change in &mut self.changes {
            change.apply(target)?;
        }
        self.refresh_validity();
        Ok(())
    }

    fn undo(&mut self, target: &mut T) -> EditResult {
        for change in self.changes.iter_mut().rev() {
            change.restore(target)?;
        }
        Ok(())
    }

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn name(&self) -> String {
        self.name.clone().unwrap_or_else(|| "Edit attributes".into())
    }

    fn description(&self) -> String {
        let mut text = self.name();
        for line in self.changes.iter().filter_map(|c| c.describe()) {
            text.push_str("\n    ");
            text.push_str(&line);
        }
        text
    }
}

impl<T: Editable> ContinuousEdit<T> for AttributeEdit<T> {
    type Update = AttributeEdit<T>;

    /// Merges further attribute/value pairs into the running edit.
    ///
    /// An attribute that is already part of the edit takes the new value and
    /// keeps its captured original; any other attribute is captured and set.
    fn update(&mut self, target: &mut T, more: AttributeEdit<T>) -> EditResult {
        for mut change in more.changes {
            let address = change.address(target);
            let mut merged = false;
            for existing in &mut self.changes {
                if address.is_some()
                    && existing.address(target) == address
                    && existing.absorb(change.as_mut())
                {
                    existing.apply(target)?;
                    merged = true;
                    break;
                }
            }
            if !merged {
                change.apply(target)?;
                self.changes.push(change);
            }
        }
        self.refresh_validity();
        Ok(())
    }
}

impl<T: Editable> fmt::Debug for AttributeEdit<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeEdit")
            .field("name", &self.name)
            .field("changes", &self.changes)
            .field("valid", &self.valid)
            .finish()
    }
}
