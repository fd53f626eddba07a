//! The shrinking set of not-yet-referenced resources.

use dashmap::DashSet;
use refsweep_core::{ResourceIdentity, TypeTag};

/// Resources of one kind not yet proven to be referenced.
///
/// Seeded once with every resource of the kind, then only shrinks. Removal
/// goes through a sharded concurrent set, so concurrent removes of the same
/// identity succeed exactly once and never block on iteration.
#[derive(Debug)]
pub struct CandidateSet {
    kind: TypeTag,
    members: DashSet<ResourceIdentity>,
}

impl CandidateSet {
    /// Seed the set with every resource of `kind`. Identities of other kinds
    /// are ignored.
    pub fn seed(kind: TypeTag, all_of_kind: impl IntoIterator<Item = ResourceIdentity>) -> Self {
        let members = DashSet::new();
        for identity in all_of_kind {
            if identity.kind() == &kind {
                members.insert(identity);
            }
        }
        Self { kind, members }
    }

    /// The kind shared by all candidates.
    pub fn kind(&self) -> &TypeTag {
        &self.kind
    }

    /// Remove a candidate. Returns `true` if this call removed it.
    pub fn remove(&self, identity: &ResourceIdentity) -> bool {
        identity.kind() == &self.kind && self.members.remove(identity).is_some()
    }

    /// Check if a resource is still a candidate.
    pub fn contains(&self, identity: &ResourceIdentity) -> bool {
        self.members.contains(identity)
    }

    /// Number of remaining candidates.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Remaining candidates, ordered by name ignoring case.
    pub fn snapshot(&self) -> Vec<ResourceIdentity> {
        let mut members: Vec<_> = self.members.iter().map(|r| r.key().clone()).collect();
        members.sort();
        members
    }
}
