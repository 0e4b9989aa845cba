//! Editable targets and reversible edit logic.
//!
//! This module defines the core abstractions the rest of the engine builds on:
//!
//! - [`Editable`]: marker trait for types that edits operate on
//! - [`Edit`]: the forward/inverse logic of one reversible change
//! - [`EditError`] / [`EditResult`]: error handling for edits
//! - [`Locator`]: finds a piece of the target at run time
//!
//! Edits are self-contained: each implementation stores whatever it needs to
//! redo itself and captures whatever it needs to undo itself the first time
//! it runs.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Helper trait for downcasting trait objects to concrete types.
///
/// Automatically implemented for all `'static` types. Used to reach the
/// concrete type behind a `&dyn Edit<T>` (typed callbacks, re-parameterising
/// a composite's sub-edit during a continuous run).
pub trait AsAny: 'static {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: 'static> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Marker trait for types that serve as editing targets.
///
/// Implement this on the root data structure edits operate on: a task tree,
/// a calendar, a whole planner document.
pub trait Editable: 'static {}

/// Error type for edit execution failures.
///
/// Soft failures inside a diff (missing keys, out-of-range indices) are not
/// errors; they are skipped and simply make the edit less valid. These
/// variants are programmer errors and protocol violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// `run` was called on an edit that already ran.
    #[error("edit '{0}' has already been run")]
    AlreadyRun(String),
    /// The edit is mid continuous run and only accepts updates or `end`.
    #[error("edit '{0}' is in a continuous run")]
    Streaming(String),
    /// A continuous-run operation on an edit that is not streaming.
    #[error("edit '{0}' is not in a continuous run")]
    NotStreaming(String),
    /// `undo` on an edit that is not done.
    #[error("cannot undo edit '{0}': it is not done")]
    NotDone(String),
    /// `redo` on an edit that has not been undone.
    #[error("cannot redo edit '{0}': it has not been undone")]
    NotUndone(String),
    /// Composite sub-edits must be unregistered and not yet run.
    #[error("invalid sub-edit '{0}': sub-edits must be unregistered and unrun")]
    InvalidSubEdit(String),
    /// A continuous run cannot start while the log is locked.
    #[error("edit log is locked")]
    LogLocked,
    /// A callback with this id already exists for the edit type and phase.
    #[error("callback '{id}' already registered for {edit} ({phase})")]
    DuplicateCallback {
        id: String,
        edit: &'static str,
        phase: &'static str,
    },
    /// The target object was not found.
    #[error("target not found: {0}")]
    TargetNotFound(String),
    /// A diff whose structure cannot be applied at all.
    #[error("malformed diff: {0}")]
    MalformedDiff(String),
    /// An error raised by a layer built on the engine, kept whole.
    #[error(transparent)]
    Source(SourceError),
    /// A custom error with a description.
    #[error("{0}")]
    Custom(String),
}

impl EditError {
    /// Wraps an error from a layer built on the engine.
    pub fn wrap(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Source(SourceError(Arc::new(err)))
    }

    /// The wrapped error, if this is a [`EditError::Source`] of type `E`.
    pub fn downcast_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            Self::Source(SourceError(err)) => err.downcast_ref(),
            _ => None,
        }
    }
}

/// A shared, type-erased error carried by [`EditError::Source`].
///
/// Two source errors compare equal when their messages do.
#[derive(Debug, Clone)]
pub struct SourceError(Arc<dyn std::error::Error + Send + Sync>);

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl PartialEq for SourceError {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0.to_string() == other.0.to_string()
    }
}

impl Eq for SourceError {}

/// Result type for edit operations.
pub type EditResult<T = ()> = Result<T, EditError>;

/// The forward and inverse logic of one reversible change.
///
/// `apply` runs the change and, on its first call, captures whatever the
/// inverse needs; subsequent calls (redo) replay the same change. `undo`
/// reverses the most recent `apply`. The lifecycle rules (run once, undo only
/// when done, redo only when undone) are enforced by
/// [`BaseEdit`](super::BaseEdit), not by implementations.
///
/// # Validity
///
/// An edit that changes nothing is invalid and is never recorded. `apply`
/// computes validity; [`is_valid`](Self::is_valid) reports the result of the
/// most recent forward application.
///
/// # Object Safety
///
/// This trait is dyn-compatible so that different edit types can live in a
/// single undo stack as `Box<dyn Edit<T>>`.
///
/// # Example
///
/// ```ignore
/// #[derive(Debug)]
/// struct Add {
///     amount: i32,
/// }
///
/// impl Edit<Counter> for Add {
///     fn apply(&mut self, target: &mut Counter) -> EditResult {
///         target.value += self.amount;
///         Ok(())
///     }
///
///     fn undo(&mut self, target: &mut Counter) -> EditResult {
///         target.value -= self.amount;
///         Ok(())
///     }
///
///     fn is_valid(&self) -> bool {
///         self.amount != 0
///     }
///
///     fn name(&self) -> String {
///         "Add".into()
///     }
/// }
/// ```
pub trait Edit<T: Editable>: fmt::Debug + AsAny + Send {
    /// Applies the change (forward / redo direction).
    fn apply(&mut self, target: &mut T) -> EditResult;

    /// Reverses the most recent [`apply`](Self::apply).
    fn undo(&mut self, target: &mut T) -> EditResult;

    /// Whether the most recent forward application changed anything.
    fn is_valid(&self) -> bool;

    /// A short, human-readable name for the edit menu.
    fn name(&self) -> String;

    /// A longer description; defaults to the name.
    fn description(&self) -> String {
        self.name()
    }

    /// Whether this edit should share an undo entry with `previous`, the
    /// most recent edit in the log. Stacked edits undo and redo together.
    fn stacks_with(&self, _previous: &dyn Edit<T>) -> bool {
        false
    }
}

type LocateFn<T, C> = dyn for<'a> Fn(&'a mut T) -> Option<&'a mut C> + Send + Sync;

/// Finds a piece of the target (a container, an attribute) at run time.
///
/// Edits never hold references into the target; they hold locators and
/// resolve them each time they apply or undo.
pub struct Locator<T, C: ?Sized> {
    label: Arc<str>,
    locate: Arc<LocateFn<T, C>>,
}

impl<T, C: ?Sized> Locator<T, C> {
    /// Creates a locator from a label (used in logs and errors) and a lookup
    /// function.
    pub fn new<F>(label: impl Into<String>, locate: F) -> Self
    where
        F: for<'a> Fn(&'a mut T) -> Option<&'a mut C> + Send + Sync + 'static,
    {
        Self {
            label: Arc::from(label.into()),
            locate: Arc::new(locate),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Resolves the locator, failing with [`EditError::TargetNotFound`].
    pub fn locate<'a>(&self, target: &'a mut T) -> EditResult<&'a mut C> {
        (self.locate)(target).ok_or_else(|| EditError::TargetNotFound(self.label.to_string()))
    }

    /// Resolves the locator, returning `None` if the target is missing.
    pub fn try_locate<'a>(&self, target: &'a mut T) -> Option<&'a mut C> {
        (self.locate)(target)
    }
}

impl<T, C: ?Sized> Clone for Locator<T, C> {
    fn clone(&self) -> Self {
        Self {
            label: Arc::clone(&self.label),
            locate: Arc::clone(&self.locate),
        }
    }
}

impl<T, C: ?Sized> fmt::Debug for Locator<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Locator({})", self.label)
    }
}
