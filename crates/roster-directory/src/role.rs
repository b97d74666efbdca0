//! Group membership roles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::DirectoryError;

/// Role qualifying a member's relationship to a group.
///
/// The serialized form is the wire value used by the directory API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Group owner.
    Owner,
    /// Group manager.
    Manager,
    /// Plain member.
    Member,
}

impl Role {
    /// Every supported role.
    pub const ALL: [Role; 3] = [Role::Owner, Role::Manager, Role::Member];

    /// Returns the wire value of this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "OWNER",
            Role::Manager => "MANAGER",
            Role::Member => "MEMBER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DirectoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "OWNER" => Ok(Role::Owner),
            "MANAGER" => Ok(Role::Manager),
            "MEMBER" => Ok(Role::Member),
            other => Err(DirectoryError::InvalidRole(other.to_string())),
        }
    }
}
