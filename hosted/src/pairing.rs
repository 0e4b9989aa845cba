//! Pairing declarations.
//!
//! A pairing ties a collection or attribute on one entity kind (the driver
//! side) to a collection or attribute on another (the driven side). Client
//! code only ever writes the driver side; the driven side is derived.

use std::collections::HashMap;
use std::fmt;

use crate::arena::Kind;
use crate::error::HostedError;

/// Names a pairing, e.g. `"task.children"`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairingId(pub &'static str);

impl fmt::Debug for PairingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PairingId({})", self.0)
    }
}

impl fmt::Display for PairingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Driver,
    Driven,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::Driver => "driver",
            Role::Driven => "driven",
        })
    }
}

/// How many partners one owner may have on an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    /// An attribute: at most one partner.
    One,
    /// A list.
    Many,
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Cardinality::One => "single-valued",
            Cardinality::Many => "many-valued",
        })
    }
}

/// One side of a pairing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub kinds: Vec<Kind>,
    pub cardinality: Cardinality,
}

impl Endpoint {
    pub fn one(kinds: impl IntoIterator<Item = Kind>) -> Self {
        Self {
            kinds: kinds.into_iter().collect(),
            cardinality: Cardinality::One,
        }
    }

    pub fn many(kinds: impl IntoIterator<Item = Kind>) -> Self {
        Self {
            kinds: kinds.into_iter().collect(),
            cardinality: Cardinality::Many,
        }
    }

    pub fn allows(&self, kind: Kind) -> bool {
        self.kinds.contains(&kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingDecl {
    pub id: PairingId,
    pub driver: Endpoint,
    pub driven: Endpoint,
}

impl PairingDecl {
    pub fn new(id: PairingId, driver: Endpoint, driven: Endpoint) -> Self {
        Self { id, driver, driven }
    }

    pub fn endpoint(&self, role: Role) -> &Endpoint {
        match role {
            Role::Driver => &self.driver,
            Role::Driven => &self.driven,
        }
    }

    /// The endpoint opposite `role`: where partners of an owner on `role`
    /// live.
    pub fn partner(&self, role: Role) -> &Endpoint {
        match role {
            Role::Driver => &self.driven,
            Role::Driven => &self.driver,
        }
    }
}

/// Every pairing a graph knows about.
#[derive(Debug, Clone, Default)]
pub struct PairingRegistry {
    decls: HashMap<PairingId, PairingDecl>,
}

impl PairingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, decl: PairingDecl) -> Result<(), HostedError> {
        if self.decls.contains_key(&decl.id) {
            return Err(HostedError::DuplicatePairing(decl.id));
        }
        log::debug!(
            "Declared pairing '{}': {:?} ({}) -> {:?} ({})",
            decl.id,
            decl.driver.kinds,
            decl.driver.cardinality,
            decl.driven.kinds,
            decl.driven.cardinality
        );
        self.decls.insert(decl.id, decl);
        Ok(())
    }

    /// Builder form of [`declare`](Self::declare).
    pub fn with(mut self, decl: PairingDecl) -> Result<Self, HostedError> {
        self.declare(decl)?;
        Ok(self)
    }

    pub fn get(&self, id: PairingId) -> Result<&PairingDecl, HostedError> {
        self.decls.get(&id).ok_or(HostedError::UnknownPairing(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &PairingDecl> {
        self.decls.values()
    }

    /// Checks that an owner of `kind` may hold the `role` side of `id` with
    /// the given cardinality.
    pub fn check(
        &self,
        id: PairingId,
        role: Role,
        kind: Kind,
        cardinality: Cardinality,
    ) -> Result<&PairingDecl, HostedError> {
        let decl = self.get(id)?;
        let endpoint = decl.endpoint(role);
        if !endpoint.allows(kind) {
            return Err(HostedError::KindNotAllowed {
                pairing: id,
                kind,
                role,
            });
        }
        if endpoint.cardinality != cardinality {
            return Err(HostedError::WrongCardinality {
                pairing: id,
                role,
                expected: cardinality,
                actual: endpoint.cardinality,
            });
        }
        Ok(decl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHILDREN: PairingId = PairingId("task.children");

    fn registry() -> PairingRegistry {
        PairingRegistry::new()
            .with(PairingDecl::new(
                CHILDREN,
                Endpoint::many(["task"]),
                Endpoint::one(["task"]),
            ))
            .unwrap()
    }

    #[test]
    fn duplicate_declaration_fails() {
        let mut registry = registry();
        let again = PairingDecl::new(CHILDREN, Endpoint::many(["task"]), Endpoint::one(["task"]));
        assert_eq!(registry.declare(again), Err(HostedError::DuplicatePairing(CHILDREN)));
    }

    #[test]
    fn check_validates_kind_and_cardinality() {
        let registry = registry();
        assert!(registry.check(CHILDREN, Role::Driver, "task", Cardinality::Many).is_ok());
        assert!(registry.check(CHILDREN, Role::Driven, "task", Cardinality::One).is_ok());
        assert_eq!(
            registry.check(CHILDREN, Role::Driver, "event", Cardinality::Many),
            Err(HostedError::KindNotAllowed {
                pairing: CHILDREN,
                kind: "event",
                role: Role::Driver,
            })
        );
        assert!(matches!(
            registry.check(CHILDREN, Role::Driven, "task", Cardinality::Many),
            Err(HostedError::WrongCardinality { .. })
        ));
        assert!(matches!(
            registry.check(PairingId("nope"), Role::Driver, "task", Cardinality::Many),
            Err(HostedError::UnknownPairing(_))
        ));
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            HostedError::DrivenReadOnly(CHILDREN).to_string(),
            "pairing 'task.children' is read-only on its driven side"
        );
    }
}
