//! Remove every recorded member

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use roster_directory::DirectoryClient;
use roster_reconcile::GroupMembersResource;

use crate::config::{connect, load_state, save_state, DEFAULT_STATE_FILE};
use crate::error::{CliError, CliResult};

/// Remove every member recorded in the state file
#[derive(Args, Debug)]
pub struct DestroyArgs {
    /// Path to the state file
    #[arg(long, default_value = DEFAULT_STATE_FILE)]
    pub state: PathBuf,
}

/// Execute the destroy command
pub async fn execute(args: DestroyArgs) -> CliResult<()> {
    let resource = connect()?;
    let removed = run(&resource, &args.state).await?;
    println!("Removed {removed} member(s). State file deleted.");
    Ok(())
}

/// Delete the recorded membership and drop the state file.
///
/// On partial failure the members that could not be removed are written
/// back to the state file so a second run can retry them.
pub async fn run<C: DirectoryClient>(
    resource: &GroupMembersResource<C>,
    state_path: &Path,
) -> CliResult<usize> {
    let mut state = load_state(state_path)?.ok_or_else(|| {
        CliError::Validation(format!("No state file at {}", state_path.display()))
    })?;
    let recorded = state.members.len();

    match resource.delete(&mut state).await {
        Ok(()) => {
            fs::remove_file(state_path)?;
            Ok(recorded)
        }
        Err(e) => {
            save_state(state_path, &state)?;
            Err(e.into())
        }
    }
}
