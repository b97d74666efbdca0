//! Per-role member sets.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::{MembershipError, MembershipResult, Role, ROLE_REGISTRY};

/// Member identifiers grouped by role.
///
/// Used both for desired state (from configuration) and for observed state
/// (from a read). Field names match [`ROLE_REGISTRY`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembersByRole {
    #[serde(default)]
    pub owners: BTreeSet<String>,
    #[serde(default)]
    pub managers: BTreeSet<String>,
    #[serde(default)]
    pub members: BTreeSet<String>,
}

impl MembersByRole {
    /// Returns the members declared under `role`.
    #[must_use]
    pub fn get(&self, role: Role) -> &BTreeSet<String> {
        match role {
            Role::Owner => &self.owners,
            Role::Manager => &self.managers,
            Role::Member => &self.members,
        }
    }

    /// Returns the members declared under `role`, mutably.
    pub fn get_mut(&mut self, role: Role) -> &mut BTreeSet<String> {
        match role {
            Role::Owner => &mut self.owners,
            Role::Manager => &mut self.managers,
            Role::Member => &mut self.members,
        }
    }

    /// Replaces the members of `role`.
    pub fn set(&mut self, role: Role, members: BTreeSet<String>) {
        *self.get_mut(role) = members;
    }

    /// Adds one member under `role`.
    pub fn insert(&mut self, role: Role, member_id: impl Into<String>) {
        self.get_mut(role).insert(member_id.into());
    }

    /// Iterates over `(role, members)` in registry order.
    pub fn iter(&self) -> impl Iterator<Item = (Role, &BTreeSet<String>)> + '_ {
        ROLE_REGISTRY.roles().map(move |role| (role, self.get(role)))
    }

    /// Total number of members across roles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.iter().map(|(_, members)| members.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a copy with surrounding whitespace trimmed from identifiers.
    ///
    /// Case is kept: identifiers are compared exactly as the directory
    /// reports them.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let mut normalized = Self::default();
        for (role, members) in self.iter() {
            normalized.set(
                role,
                members.iter().map(|m| m.trim().to_string()).collect(),
            );
        }
        normalized
    }

    /// Checks that every identifier is non-empty and declared under one role only.
    pub fn validate(&self) -> MembershipResult<()> {
        let mut seen: HashMap<&str, Role> = HashMap::new();

        for (role, members) in self.iter() {
            for member_id in members {
                if member_id.trim().is_empty() {
                    return Err(MembershipError::InvalidDesiredState(format!(
                        "empty member id in {}",
                        ROLE_REGISTRY.field_name(role)
                    )));
                }
                if let Some(first) = seen.insert(member_id.as_str(), role) {
                    return Err(MembershipError::ConflictingRoles {
                        member_id: member_id.clone(),
                        first,
                        second: role,
                    });
                }
            }
        }

        Ok(())
    }
}
