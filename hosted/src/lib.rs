//! # Almanac Hosted
//!
//! Hosted entities and the pairings between them.
//!
//! A [`HostedGraph`] stores entities in generational slots. An entity is
//! either active or defunct: defunct entities keep their id and field values
//! but drop out of every lookup, which is how removing something from the
//! data graph stays undoable without recreating it.
//!
//! Relationships are declared up front in a [`PairingRegistry`]. Each
//! pairing has a driver side that edits write and a driven side that the
//! graph derives:
//!
//! ```ignore
//! let registry = PairingRegistry::new().with(PairingDecl::new(
//!     PairingId("task.children"),
//!     Endpoint::many(["task"]),
//!     Endpoint::one(["task"]),
//! ))?;
//! let children = HostedDataList::new(&registry, PairingId("task.children"), Role::Driver, "task")?;
//! let parent = HostedDataAttribute::new(&registry, PairingId("task.children"), Role::Driven, "task")?;
//!
//! log.run(BaseEdit::new(HostedListEdit::add(root, &children, [child])?), &mut graph)?;
//! assert_eq!(graph.attribute(child, &parent), Some(root));
//! ```

mod arena;
mod edits;
mod error;
mod graph;
mod pairing;

pub use arena::{HostArena, HostId, Hosted, Kind};
pub use edits::{
    ActivateEdit, DeactivateEdit, HostedAttributeEdit, HostedListEdit, ReplaceHostedDataEdit,
};
pub use error::HostedError;
pub use graph::{AuditIssue, HostedDataAttribute, HostedDataList, HostedGraph, HostedTarget};
pub use pairing::{Cardinality, Endpoint, PairingDecl, PairingId, PairingRegistry, Role};
