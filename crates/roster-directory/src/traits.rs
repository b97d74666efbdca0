//! Directory client capability trait.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::{DirectoryResult, Role};

/// Group-membership operations against a remote directory.
///
/// These three calls are the whole interface roster uses to observe and
/// mutate a group. Implementations hold their own authentication context.
/// Callers treat every call as a potentially failing round trip and never
/// issue two at once.
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// Lists the members of `group_id` that hold exactly `role`.
    ///
    /// Records whose role differs from `role` are dropped even if the remote
    /// listing returned them.
    async fn list_members(&self, group_id: &str, role: Role) -> DirectoryResult<BTreeSet<String>>;

    /// Adds `member_id` to `group_id` with `role`.
    ///
    /// Adding a member that is already present is an error, not a no-op.
    /// The error names the member and role.
    async fn add_member(&self, member_id: &str, group_id: &str, role: Role) -> DirectoryResult<()>;

    /// Removes `member_id` from `group_id`, whatever its role.
    ///
    /// The error names the member and group.
    async fn remove_member(&self, member_id: &str, group_id: &str) -> DirectoryResult<()>;
}
