//! Membership differences and plans.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::{Role, ROLE_REGISTRY};

/// Changes needed to converge one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MembershipDiff {
    pub role: Role,
    /// Present remotely but not desired.
    pub to_remove: BTreeSet<String>,
    /// Desired but not present remotely.
    pub to_add: BTreeSet<String>,
}

impl MembershipDiff {
    /// Computes the diff between desired and actual members of `role`.
    ///
    /// Members in both sets appear in neither output.
    #[must_use]
    pub fn compute(role: Role, desired: &BTreeSet<String>, actual: &BTreeSet<String>) -> Self {
        Self {
            role,
            to_remove: actual.difference(desired).cloned().collect(),
            to_add: desired.difference(actual).cloned().collect(),
        }
    }

    /// Returns true if the role is already converged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_remove.is_empty() && self.to_add.is_empty()
    }

    /// Number of directory calls applying this diff takes.
    #[must_use]
    pub fn change_count(&self) -> usize {
        self.to_remove.len() + self.to_add.len()
    }
}

/// Pending changes for every role of a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MembershipPlan {
    pub group_id: String,
    pub diffs: Vec<MembershipDiff>,
}

impl MembershipPlan {
    /// Returns true if at least one role needs a change.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.diffs.iter().any(|diff| !diff.is_empty())
    }

    /// Total number of removals and additions.
    #[must_use]
    pub fn change_count(&self) -> usize {
        self.diffs.iter().map(MembershipDiff::change_count).sum()
    }

    /// Returns the diff of `role`, if it was planned.
    #[must_use]
    pub fn diff(&self, role: Role) -> Option<&MembershipDiff> {
        self.diffs.iter().find(|diff| diff.role == role)
    }

    /// Members removed from one role and added to another.
    ///
    /// Applying such a move adds to the new role only after that role's own
    /// removals, so it fails with a duplicate error if the new role is
    /// processed before the old one.
    #[must_use]
    pub fn role_changes(&self) -> Vec<(String, Role, Role)> {
        let mut changes = Vec::new();
        for from in &self.diffs {
            for member_id in &from.to_remove {
                if let Some(to) = self
                    .diffs
                    .iter()
                    .find(|diff| diff.role != from.role && diff.to_add.contains(member_id))
                {
                    changes.push((member_id.clone(), from.role, to.role));
                }
            }
        }
        changes
    }

    /// Role changes that move a member to an earlier role.
    ///
    /// The new role is reconciled while the member still holds the old one,
    /// so these moves cannot be applied in a single pass.
    #[must_use]
    pub fn blocked_role_changes(&self) -> Vec<(String, Role, Role)> {
        self.role_changes()
            .into_iter()
            .filter(|(_, from, to)| ROLE_REGISTRY.position(*to) < ROLE_REGISTRY.position(*from))
            .collect()
    }

    /// Renders the plan in a `+`/`-` listing, one role per block.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for diff in self.diffs.iter().filter(|diff| !diff.is_empty()) {
            out.push_str(&format!(
                "{} ({}):\n",
                ROLE_REGISTRY.field_name(diff.role),
                diff.role
            ));
            for member_id in &diff.to_remove {
                out.push_str(&format!("  - {member_id}\n"));
            }
            for member_id in &diff.to_add {
                out.push_str(&format!("  + {member_id}\n"));
            }
        }
        out
    }
}
