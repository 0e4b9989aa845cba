//! Reversible edits and the log that records them.
//!
//! Every change to an editable target goes through an [`Edit`] wrapped in a
//! [`BaseEdit`]. Running it through an [`EditLog`] records it for undo and
//! redo.
//!
//! - [`Edit`]: forward and inverse logic of one change
//! - [`BaseEdit`]: the run / undo / redo state machine around an edit
//! - [`ContainerEdit`]: invertible diffs over ordered maps and sequences
//! - [`AttributeEdit`]: sets [`MutableAttribute`](crate::MutableAttribute) values
//! - [`CompositeEdit`]: several sub-edits undone as one
//! - [`SimpleEdit`]: closure-defined edits
//! - [`EditLog`]: the undo/redo stacks, lock and callbacks
//! - [`ContinuousRun`]: an open begin / update / end session
//! - [`EditQueue`]: follow-up edits submitted from read-only contexts
//!
//! # Registration
//!
//! Edits built with [`BaseEdit::new`] are recorded when run through the log;
//! [`BaseEdit::unregistered`] edits never are. Sub-edits of a composite must
//! be unregistered: only the composite itself is recorded.
//!
//! # Validity
//!
//! An edit that changed nothing is invalid. Invalid edits are never
//! recorded, so undo never steps through a no-op.

mod action;
mod attribute_edit;
mod base;
mod callbacks;
mod composite;
pub mod container;
mod continuous;
mod history;
mod queue;
mod simple;

pub use action::{AsAny, Edit, EditError, EditResult, Editable, Locator, SourceError};
pub use attribute_edit::AttributeEdit;
pub use base::{BaseEdit, ContinuousEdit, EditState};
pub use callbacks::{CallbackPhase, EditCallbacks};
pub use composite::{CompositeEdit, CompositeUpdate, InverseOrder};
pub use container::{
    Applied, ApplyContext, Change, Comparator, ContainerEdit, DiffContainer, DiffEntry, EditFlags, MapDiff,
    MapOp, Nested, SeqKey, SeqOp, Sort, Tree, Upsert, leaves, nested,
};
pub use continuous::ContinuousRun;
pub use history::{DEFAULT_MAX_UNDO, EditLog};
pub use queue::EditQueue;
pub use simple::{Direction, SimpleEdit};
