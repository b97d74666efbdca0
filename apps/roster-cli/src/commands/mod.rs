//! CLI command implementations
//!
//! Each command has an `execute` entry point that connects to the directory
//! from the environment, and a `run` function generic over the directory
//! client that does the actual work.

pub mod apply;
pub mod destroy;
pub mod plan;
pub mod read;

use roster_reconcile::{ResourceState, ROLE_REGISTRY};

use crate::error::CliResult;

/// Print observed membership, one role per block.
pub(crate) fn print_state(state: &ResourceState, json: bool) -> CliResult<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(state)?);
        return Ok(());
    }

    println!("{}", state.group);
    for (role, members) in state.members.iter() {
        println!(
            "  {} ({}): {}",
            ROLE_REGISTRY.field_name(role),
            role,
            members.len()
        );
        for member_id in members {
            println!("    {member_id}");
        }
    }
    Ok(())
}
