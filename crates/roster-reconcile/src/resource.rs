//! Group membership lifecycle.
//!
//! `GroupMembersResource` is the entry point consumed by whatever drives the
//! lifecycle (the `roster` CLI, or any other orchestrating framework). Every
//! operation walks the roles in registry order and awaits one directory call
//! at a time.

use std::collections::BTreeSet;

use roster_directory::DirectoryClient;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::{
    reconcile_role, MembersByRole, MembershipDiff, MembershipError, MembershipPlan,
    MembershipResult, Operation, Role, ROLE_REGISTRY,
};

/// Persisted state of a managed group membership.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceState {
    /// Set once the membership is under management; cleared by delete.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Group the membership belongs to.
    pub group: String,
    /// Last observed members, per role.
    #[serde(flatten)]
    pub members: MembersByRole,
}

impl ResourceState {
    /// Returns true while the membership is under management.
    #[must_use]
    pub fn is_managed(&self) -> bool {
        self.id.is_some()
    }
}

/// Create/read/update/delete over the role-partitioned members of a group.
#[derive(Debug)]
pub struct GroupMembersResource<C> {
    client: C,
}

impl<C: DirectoryClient> GroupMembersResource<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Returns the underlying directory client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Brings every role of `group_id` to `desired`, then reads back.
    ///
    /// Roles are reconciled one after another; the first failing role stops
    /// the pass and later roles are neither listed nor touched. On success the
    /// returned state carries `group_id` as its identifier.
    #[instrument(skip(self, desired), fields(desired = desired.len()))]
    pub async fn create(
        &self,
        group_id: &str,
        desired: &MembersByRole,
    ) -> MembershipResult<ResourceState> {
        self.converge(group_id, desired).await?;
        info!("Group {} membership created", group_id);
        self.read_state(group_id).await
    }

    /// Same pass as [`create`](Self::create). Does not require a prior create.
    #[instrument(skip(self, desired), fields(desired = desired.len()))]
    pub async fn update(
        &self,
        group_id: &str,
        desired: &MembersByRole,
    ) -> MembershipResult<ResourceState> {
        self.converge(group_id, desired).await?;
        info!("Group {} membership updated", group_id);
        self.read_state(group_id).await
    }

    /// Lists the current members of every role. No remote side effects.
    #[instrument(skip(self))]
    pub async fn read(&self, group_id: &str) -> MembershipResult<MembersByRole> {
        let mut observed = MembersByRole::default();
        for role in ROLE_REGISTRY.roles() {
            observed.set(role, self.list(group_id, role).await?);
        }
        debug!("Observed {} members in {}", observed.len(), group_id);
        Ok(observed)
    }

    /// Reads `group_id` into a managed state.
    pub async fn read_state(&self, group_id: &str) -> MembershipResult<ResourceState> {
        Ok(ResourceState {
            id: Some(group_id.to_string()),
            group: group_id.to_string(),
            members: self.read(group_id).await?,
        })
    }

    /// Removes every member recorded in `state`.
    ///
    /// Every removal is attempted. A member already gone from the group counts
    /// as removed. Removed members are dropped from `state` and the identifier
    /// is cleared whatever the outcome; remaining failures are returned
    /// together as [`MembershipError::DeleteIncomplete`].
    #[instrument(skip(self, state), fields(group_id = %state.group, recorded = state.members.len()))]
    pub async fn delete(&self, state: &mut ResourceState) -> MembershipResult<()> {
        let group_id = state.group.clone();
        let mut failures = Vec::new();

        for role in ROLE_REGISTRY.roles() {
            let recorded = std::mem::take(state.members.get_mut(role));
            let mut kept = BTreeSet::new();

            for member_id in recorded {
                match self.client.remove_member(&member_id, &group_id).await {
                    Ok(()) => {}
                    Err(e) if e.is_not_found() => {
                        warn!("Member {} already absent from {}", member_id, group_id);
                    }
                    Err(e) => {
                        warn!(error = %e, "Could not remove {} from {}", member_id, group_id);
                        failures.push(e);
                        kept.insert(member_id);
                    }
                }
            }

            state.members.set(role, kept);
        }

        state.id = None;

        if failures.is_empty() {
            info!("Group {} membership deleted", group_id);
            Ok(())
        } else {
            Err(MembershipError::DeleteIncomplete { group_id, failures })
        }
    }

    /// Computes pending changes for every role without applying them.
    #[instrument(skip(self, desired), fields(desired = desired.len()))]
    pub async fn plan(
        &self,
        group_id: &str,
        desired: &MembersByRole,
    ) -> MembershipResult<MembershipPlan> {
        desired.validate()?;

        let mut diffs = Vec::with_capacity(Role::ALL.len());
        for role in ROLE_REGISTRY.roles() {
            let actual = self.list(group_id, role).await?;
            diffs.push(MembershipDiff::compute(role, desired.get(role), &actual));
        }

        let plan = MembershipPlan {
            group_id: group_id.to_string(),
            diffs,
        };
        debug!("Plan for {} has {} change(s)", group_id, plan.change_count());
        Ok(plan)
    }

    async fn converge(&self, group_id: &str, desired: &MembersByRole) -> MembershipResult<()> {
        desired.validate()?;

        for role in ROLE_REGISTRY.roles() {
            let actual = self.list(group_id, role).await?;
            reconcile_role(&self.client, group_id, role, desired.get(role), &actual).await?;
        }

        Ok(())
    }

    async fn list(&self, group_id: &str, role: Role) -> MembershipResult<BTreeSet<String>> {
        self.client
            .list_members(group_id, role)
            .await
            .map_err(|e| MembershipError::step(Operation::List, group_id, role, e))
    }
}
