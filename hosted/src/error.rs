use almanac_core::edit::EditError;
use thiserror::Error;

use crate::arena::{HostId, Kind};
use crate::pairing::{Cardinality, PairingId, Role};

/// Misuse of the hosted-data framework.
///
/// Configuration errors (undeclared pairings, wrong endpoint) surface when a
/// handle or edit is constructed; the rest when an edit is applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostedError {
    #[error("pairing '{0}' is not declared")]
    UnknownPairing(PairingId),
    #[error("pairing '{0}' is already declared")]
    DuplicatePairing(PairingId),
    #[error("pairing '{pairing}' does not allow '{kind}' on its {role} side")]
    KindNotAllowed {
        pairing: PairingId,
        kind: Kind,
        role: Role,
    },
    #[error("pairing '{pairing}' {role} side is {actual}, expected {expected}")]
    WrongCardinality {
        pairing: PairingId,
        role: Role,
        expected: Cardinality,
        actual: Cardinality,
    },
    #[error("pairing '{0}' is read-only on its driven side")]
    DrivenReadOnly(PairingId),
    #[error("no hosted entity {0:?}")]
    UnknownEntity(HostId),
    #[error("{0:?} is active or already paired and cannot replace another entity")]
    ReplacementInUse(HostId),
    #[error("{0:?} is still active or referenced")]
    StillReferenced(HostId),
}

impl From<HostedError> for EditError {
    fn from(err: HostedError) -> Self {
        EditError::wrap(err)
    }
}
