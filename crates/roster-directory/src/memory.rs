//! In-memory directory (testing only)
//!
//! `InMemoryDirectory` keeps group membership in a map, answers the
//! `DirectoryClient` calls the way the remote API does (duplicate inserts and
//! missing deletes are errors), records every call, and fails chosen calls on
//! demand.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::{DirectoryClient, DirectoryError, DirectoryResult, Role};

/// A call made against the directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DirectoryCall {
    List { group_id: String, role: Role },
    Add { group_id: String, member_id: String, role: Role },
    Remove { group_id: String, member_id: String },
}

impl DirectoryCall {
    /// Returns true for insert and delete calls.
    #[must_use]
    pub fn is_mutation(&self) -> bool {
        !matches!(self, DirectoryCall::List { .. })
    }
}

#[derive(Debug, Default)]
struct State {
    /// group id -> member id -> role
    groups: HashMap<String, HashMap<String, Role>>,
    calls: Vec<DirectoryCall>,
    failures: HashSet<DirectoryCall>,
}

/// In-memory directory backed by a `HashMap<group, HashMap<member, role>>`.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    state: Mutex<State>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seeds a member without recording a call.
    #[must_use]
    pub fn with_member(self, group_id: &str, member_id: &str, role: Role) -> Self {
        self.state()
            .groups
            .entry(group_id.to_string())
            .or_default()
            .insert(member_id.to_string(), role);
        self
    }

    /// Seeds several members of one role.
    #[must_use]
    pub fn with_members(self, group_id: &str, role: Role, member_ids: &[&str]) -> Self {
        member_ids
            .iter()
            .fold(self, |dir, member_id| dir.with_member(group_id, member_id, role))
    }

    /// Makes the given call fail with an API error whenever it is issued.
    pub fn fail_on(&self, call: DirectoryCall) {
        self.state().failures.insert(call);
    }

    /// Returns every call made so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<DirectoryCall> {
        self.state().calls.clone()
    }

    /// Returns the insert and delete calls made so far, in order.
    #[must_use]
    pub fn mutations(&self) -> Vec<DirectoryCall> {
        self.state()
            .calls
            .iter()
            .filter(|call| call.is_mutation())
            .cloned()
            .collect()
    }

    /// Forgets recorded calls, keeping membership and failures.
    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    /// Returns the current role of a member, if present.
    #[must_use]
    pub fn role_of(&self, group_id: &str, member_id: &str) -> Option<Role> {
        self.state()
            .groups
            .get(group_id)
            .and_then(|members| members.get(member_id).copied())
    }

    /// Records a call and reports whether it should fail.
    fn record(state: &mut State, call: DirectoryCall) -> DirectoryResult<()> {
        let injected = state.failures.contains(&call);
        let message = format!("injected failure for {call:?}");
        state.calls.push(call);
        if injected {
            return Err(DirectoryError::Api {
                code: 500,
                message,
                reason: Some("backendError".to_string()),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DirectoryClient for InMemoryDirectory {
    async fn list_members(&self, group_id: &str, role: Role) -> DirectoryResult<BTreeSet<String>> {
        let mut state = self.state();
        Self::record(
            &mut state,
            DirectoryCall::List {
                group_id: group_id.to_string(),
                role,
            },
        )
        .map_err(|e| e.while_listing(group_id, role))?;

        Ok(state
            .groups
            .get(group_id)
            .map(|members| {
                members
                    .iter()
                    .filter(|(_, member_role)| **member_role == role)
                    .map(|(member_id, _)| member_id.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn add_member(&self, member_id: &str, group_id: &str, role: Role) -> DirectoryResult<()> {
        let mut state = self.state();
        Self::record(
            &mut state,
            DirectoryCall::Add {
                group_id: group_id.to_string(),
                member_id: member_id.to_string(),
                role,
            },
        )
        .map_err(|e| e.while_adding(member_id, group_id, role))?;

        let members = state.groups.entry(group_id.to_string()).or_default();
        if members.contains_key(member_id) {
            return Err(DirectoryError::Duplicate("Member already exists.".to_string())
                .while_adding(member_id, group_id, role));
        }
        members.insert(member_id.to_string(), role);
        Ok(())
    }

    async fn remove_member(&self, member_id: &str, group_id: &str) -> DirectoryResult<()> {
        let mut state = self.state();
        Self::record(
            &mut state,
            DirectoryCall::Remove {
                group_id: group_id.to_string(),
                member_id: member_id.to_string(),
            },
        )
        .map_err(|e| e.while_removing(member_id, group_id))?;

        let removed = state
            .groups
            .get_mut(group_id)
            .and_then(|members| members.remove(member_id));
        if removed.is_none() {
            return Err(
                DirectoryError::NotFound(format!("Resource Not Found: {member_id}"))
                    .while_removing(member_id, group_id),
            );
        }
        Ok(())
    }
}
