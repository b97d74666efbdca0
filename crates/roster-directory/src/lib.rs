//! Admin Directory group-membership client for roster
//!
//! This crate is the only place roster talks to the remote directory. It
//! exposes the [`DirectoryClient`] capability trait and two implementations:
//!
//! - [`HttpDirectoryClient`], which speaks the Admin Directory REST API
//!   (member listing, insert and delete) with bearer-token authentication
//! - [`InMemoryDirectory`], a recording fake used by the reconciliation tests
//!
//! # Features
//!
//! - Paginated member listing with a defensive role re-check
//! - Static access tokens or service-account JWT-bearer credentials
//! - Token caching with early refresh
//! - Typed errors carrying the member, role and group involved
//!
//! # Example
//!
//! ```no_run
//! use roster_directory::{DirectoryClient, DirectoryConfig, HttpDirectoryClient, Role};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = DirectoryConfig::from_env()?;
//! let client = HttpDirectoryClient::new(config)?;
//!
//! let owners = client.list_members("eng@example.com", Role::Owner).await?;
//! println!("{} owners", owners.len());
//! # Ok(())
//! # }
//! ```

mod auth;
mod client;
mod config;
mod error;
mod members;
mod memory;
mod role;
mod traits;

// Re-exports
pub use auth::{ServiceAccountKey, TokenCache, DIRECTORY_MEMBER_SCOPE};
pub use client::HttpDirectoryClient;
pub use config::{ConfigError, Credentials, DirectoryConfig, MAX_RETRIES, MAX_RETRY_DELAY};
pub use error::{DirectoryError, DirectoryResult};
pub use members::{DirectoryMember, InsertMemberRequest, MembersPage};
pub use memory::{DirectoryCall, InMemoryDirectory};
pub use role::Role;
pub use traits::DirectoryClient;
