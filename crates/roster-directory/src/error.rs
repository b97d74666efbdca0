//! Error types for the directory client.

use thiserror::Error;

use crate::Role;

/// Result type alias using `DirectoryError`.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Errors that can occur when interacting with the directory.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// `OAuth2` authentication error.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Directory API error not covered by a more specific variant.
    #[error("Directory API error: {code} - {message}")]
    Api {
        code: u16,
        message: String,
        reason: Option<String>,
    },

    /// Group or member not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Permission denied.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The member is already part of the group.
    #[error("Member already exists: {0}")]
    Duplicate(String),

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Unknown role value.
    #[error("Invalid role: {0}")]
    InvalidRole(String),

    /// Listing kept being throttled.
    #[error("Maximum retries ({attempts}) exceeded")]
    MaxRetriesExceeded { attempts: u32 },

    /// Listing the members of a role failed.
    #[error("Error listing {role} members of group {group_id}: {source}")]
    ListMembers {
        group_id: String,
        role: Role,
        #[source]
        source: Box<DirectoryError>,
    },

    /// Inserting a member failed.
    #[error("Error adding member {member_id} as {role} to group {group_id}: {source}")]
    AddMember {
        member_id: String,
        group_id: String,
        role: Role,
        #[source]
        source: Box<DirectoryError>,
    },

    /// Deleting a member failed.
    #[error("Error removing member {member_id} from group {group_id}: {source}")]
    RemoveMember {
        member_id: String,
        group_id: String,
        #[source]
        source: Box<DirectoryError>,
    },
}

impl DirectoryError {
    /// Wraps this error with the listing it interrupted.
    #[must_use]
    pub fn while_listing(self, group_id: &str, role: Role) -> Self {
        Self::ListMembers {
            group_id: group_id.to_string(),
            role,
            source: Box::new(self),
        }
    }

    /// Wraps this error with the insert it interrupted.
    #[must_use]
    pub fn while_adding(self, member_id: &str, group_id: &str, role: Role) -> Self {
        Self::AddMember {
            member_id: member_id.to_string(),
            group_id: group_id.to_string(),
            role,
            source: Box::new(self),
        }
    }

    /// Wraps this error with the delete it interrupted.
    #[must_use]
    pub fn while_removing(self, member_id: &str, group_id: &str) -> Self {
        Self::RemoveMember {
            member_id: member_id.to_string(),
            group_id: group_id.to_string(),
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, skipping operation context.
    #[must_use]
    pub fn root(&self) -> &DirectoryError {
        match self {
            Self::ListMembers { source, .. }
            | Self::AddMember { source, .. }
            | Self::RemoveMember { source, .. } => source.root(),
            other => other,
        }
    }

    /// Returns the member this error is about, if any.
    #[must_use]
    pub fn member_id(&self) -> Option<&str> {
        match self {
            Self::AddMember { member_id, .. } | Self::RemoveMember { member_id, .. } => {
                Some(member_id)
            }
            _ => None,
        }
    }

    /// Returns true if the remote side reported a missing group or member.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self.root(), Self::NotFound(_))
    }

    /// Returns true if the remote side reported an already-present member.
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        matches!(self.root(), Self::Duplicate(_))
    }
}
