//! Reconciliation error types.

use std::fmt;

use roster_directory::DirectoryError;
use thiserror::Error;

use crate::Role;

/// Result type alias using `MembershipError`.
pub type MembershipResult<T> = Result<T, MembershipError>;

/// Directory operation a reconciliation step was performing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Fetching the actual members of a role.
    List,
    /// Removing an undesired member.
    Remove,
    /// Adding a missing member.
    Add,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::List => "list",
            Operation::Remove => "remove",
            Operation::Add => "add",
        })
    }
}

/// Errors raised while reconciling group membership.
#[derive(Debug, Error)]
pub enum MembershipError {
    /// Desired state failed validation; nothing was sent to the directory.
    #[error("Invalid desired state: {0}")]
    InvalidDesiredState(String),

    /// The same member is declared under two roles.
    #[error("Member {member_id} is declared as both {first} and {second}")]
    ConflictingRoles {
        member_id: String,
        first: Role,
        second: Role,
    },

    /// A directory call aborted the reconciliation of a role.
    #[error("{operation} step failed for {role} members of group {group_id}: {source}")]
    Step {
        operation: Operation,
        group_id: String,
        role: Role,
        #[source]
        source: DirectoryError,
    },

    /// Some removals failed during teardown. Every member was attempted.
    #[error(
        "Failed to remove {} member(s) from group {group_id}: {}",
        .failures.len(),
        join_errors(.failures)
    )]
    DeleteIncomplete {
        group_id: String,
        failures: Vec<DirectoryError>,
    },
}

fn join_errors(errors: &[DirectoryError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl MembershipError {
    pub(crate) fn step(
        operation: Operation,
        group_id: &str,
        role: Role,
        source: DirectoryError,
    ) -> Self {
        Self::Step {
            operation,
            group_id: group_id.to_string(),
            role,
            source,
        }
    }

    /// Returns the failing operation, for directory step errors.
    #[must_use]
    pub fn operation(&self) -> Option<Operation> {
        match self {
            Self::Step { operation, .. } => Some(*operation),
            _ => None,
        }
    }

    /// Returns the role being reconciled when the error occurred.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        match self {
            Self::Step { role, .. } => Some(*role),
            _ => None,
        }
    }

    /// Returns the member the failing call was about.
    #[must_use]
    pub fn member_id(&self) -> Option<&str> {
        match self {
            Self::Step { source, .. } => source.member_id(),
            Self::ConflictingRoles { member_id, .. } => Some(member_id),
            _ => None,
        }
    }

    /// Returns true if the directory was never contacted.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidDesiredState(_) | Self::ConflictingRoles { .. }
        )
    }
}
