//! Single-role reconciliation.

use std::collections::BTreeSet;

use roster_directory::DirectoryClient;
use tracing::{debug, info, instrument};

use crate::{MembershipDiff, MembershipError, MembershipResult, Operation, Role};

/// Drives the `role` members of `group_id` from `actual` to `desired`.
///
/// Every member in `actual - desired` is removed, then every member in
/// `desired - actual` is added. Calls are issued one at a time. The first
/// failing call aborts the pass: later removals and all additions (or later
/// additions) are skipped, and nothing already applied is rolled back.
///
/// Returns the diff that was applied.
#[instrument(skip(client, role, desired, actual), fields(role = %role, desired = desired.len(), actual = actual.len()))]
pub async fn reconcile_role<C>(
    client: &C,
    group_id: &str,
    role: Role,
    desired: &BTreeSet<String>,
    actual: &BTreeSet<String>,
) -> MembershipResult<MembershipDiff>
where
    C: DirectoryClient + ?Sized,
{
    let diff = MembershipDiff::compute(role, desired, actual);

    if diff.is_empty() {
        debug!("{} members of {} already converged", role, group_id);
        return Ok(diff);
    }

    info!(
        to_remove = diff.to_remove.len(),
        to_add = diff.to_add.len(),
        "Reconciling {} members of {}",
        role,
        group_id
    );

    for member_id in &diff.to_remove {
        client
            .remove_member(member_id, group_id)
            .await
            .map_err(|e| MembershipError::step(Operation::Remove, group_id, role, e))?;
    }

    for member_id in &diff.to_add {
        client
            .add_member(member_id, group_id, role)
            .await
            .map_err(|e| MembershipError::step(Operation::Add, group_id, role, e))?;
    }

    Ok(diff)
}
