//! Role-partitioned group membership reconciliation
//!
//! Drives a directory group's membership to a declared desired state, one
//! role at a time. The remote directory is always the source of truth for
//! what is currently there; nothing is cached between passes.
//!
//! - [`RoleRegistry`] maps each [`Role`] to its desired-state field
//! - [`MembershipDiff`] is the pure set difference for one role
//! - [`reconcile_role`] applies a diff: removals first, then additions,
//!   stopping at the first failure
//! - [`GroupMembersResource`] exposes create/read/update/delete (and plan)
//!   over every role
//!
//! # Example
//!
//! ```no_run
//! use roster_directory::{DirectoryConfig, HttpDirectoryClient};
//! use roster_reconcile::{GroupMembersResource, MembersByRole, Role};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpDirectoryClient::new(DirectoryConfig::from_env()?)?;
//! let resource = GroupMembersResource::new(client);
//!
//! let mut desired = MembersByRole::default();
//! desired.insert(Role::Owner, "alice@example.com");
//! desired.insert(Role::Member, "bob@example.com");
//!
//! let state = resource.update("eng@example.com", &desired).await?;
//! println!("{} members", state.members.len());
//! # Ok(())
//! # }
//! ```

mod diff;
mod error;
mod members;
mod reconciler;
mod registry;
mod resource;

pub use diff::{MembershipDiff, MembershipPlan};
pub use error::{MembershipError, MembershipResult, Operation};
pub use members::MembersByRole;
pub use reconciler::reconcile_role;
pub use registry::{RoleRegistry, ROLE_REGISTRY};
pub use resource::{GroupMembersResource, ResourceState};
pub use roster_directory::Role;
