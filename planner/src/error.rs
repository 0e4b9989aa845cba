use almanac_core::edit::EditError;
use almanac_hosted::{HostId, HostedError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlannerError {
    #[error("{0} is not an active task")]
    NotATask(HostId),
    #[error("{0} is not an active scheduled item")]
    NotScheduled(HostId),
    #[error("{0} is not an active planned item")]
    NotPlanned(HostId),
    #[error("{0} already repeats")]
    AlreadyRepeating(HostId),
    #[error("the root task cannot be removed or moved")]
    RootTask,
    #[error("cannot move {task} under its own subtree ({parent})")]
    Cycle { task: HostId, parent: HostId },
    #[error("unknown status '{0}' (expected todo, doing or done)")]
    UnknownStatus(String),
    #[error(transparent)]
    Hosted(#[from] HostedError),
    #[error(transparent)]
    Edit(#[from] EditError),
}

pub type PlannerResult<T> = Result<T, PlannerError>;
