//! Role to desired-state field mapping.

use crate::Role;

/// Fixed mapping from role to the field holding that role's members.
///
/// Roles are reconciled in registry order: `OWNER`, then `MANAGER`, then
/// `MEMBER`. The order is part of the contract. A member moving to an
/// earlier role is added there while still holding the later role, which
/// the directory rejects as a duplicate.
#[derive(Debug)]
pub struct RoleRegistry {
    entries: [(Role, &'static str); 3],
}

/// The process-wide registry.
pub static ROLE_REGISTRY: RoleRegistry = RoleRegistry {
    entries: [
        (Role::Owner, "owners"),
        (Role::Manager, "managers"),
        (Role::Member, "members"),
    ],
};

impl RoleRegistry {
    /// Returns the desired-state field name of `role`.
    #[must_use]
    pub fn field_name(&self, role: Role) -> &'static str {
        // Entries are laid out in declaration order of `Role`.
        self.entries[role as usize].1
    }

    /// Returns the role stored under `field`, if any.
    #[must_use]
    pub fn role_for_field(&self, field: &str) -> Option<Role> {
        self.entries
            .iter()
            .find(|(_, f)| *f == field)
            .map(|(role, _)| *role)
    }

    /// Iterates over the registered roles in reconciliation order:
    /// `OWNER`, `MANAGER`, `MEMBER`.
    pub fn roles(&self) -> impl Iterator<Item = Role> + '_ {
        self.entries.iter().map(|(role, _)| *role)
    }

    /// Returns the position of `role` in reconciliation order.
    #[must_use]
    pub fn position(&self, role: Role) -> usize {
        role as usize
    }

    /// Iterates over `(role, field name)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Role, &'static str)> + '_ {
        self.entries.iter().copied()
    }
}
