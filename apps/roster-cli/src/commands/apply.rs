//! Apply a desired-state file

use std::path::{Path, PathBuf};

use clap::Args;
use roster_directory::DirectoryClient;
use roster_reconcile::{GroupMembersResource, MembershipPlan, ResourceState};
use serde::Serialize;
use tracing::{info, warn};

use crate::commands::plan::print_plan;
use crate::commands::print_state;
use crate::config::{
    connect, load_desired, load_state, save_state, DesiredGroupFile, DEFAULT_STATE_FILE,
};
use crate::error::{CliError, CliResult};

/// Reconcile a group's membership with a desired-state file
#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Path to desired-state file
    #[arg(short = 'f', long = "file")]
    pub file: PathBuf,

    /// Path to the state file
    #[arg(long, default_value = DEFAULT_STATE_FILE)]
    pub state: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Result of an apply run.
#[derive(Debug, Serialize)]
pub struct ApplyOutcome {
    /// Whether the membership was taken under management by this run.
    pub created: bool,
    pub plan: MembershipPlan,
    pub state: ResourceState,
}

/// Execute the apply command
pub async fn execute(args: ApplyArgs) -> CliResult<()> {
    let desired = load_desired(&args.file)?;
    let resource = connect()?;

    let outcome = run(&resource, &desired, &args.state).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_plan(&outcome.plan);
        if outcome.plan.has_changes() {
            println!("Applied {} change(s).\n", outcome.plan.change_count());
        }
        print_state(&outcome.state, false)?;
    }
    Ok(())
}

/// Create or update the membership and record the observed state.
///
/// A managed state file selects update; otherwise the membership is created.
/// Plans that move a member to an earlier role are refused before any write.
/// The state file is only written after a successful pass.
pub async fn run<C: DirectoryClient>(
    resource: &GroupMembersResource<C>,
    desired: &DesiredGroupFile,
    state_path: &Path,
) -> CliResult<ApplyOutcome> {
    let prior = load_state(state_path)?.filter(ResourceState::is_managed);

    if let Some(ref prior) = prior {
        if prior.group != desired.group {
            return Err(CliError::Validation(format!(
                "State file {} tracks group {}, not {}",
                state_path.display(),
                prior.group,
                desired.group
            )));
        }
    }

    let plan = resource.plan(&desired.group, &desired.members).await?;
    let blocked = plan.blocked_role_changes();
    if !blocked.is_empty() {
        for (member_id, from, to) in &blocked {
            warn!(member = %member_id, %from, %to, "move to an earlier role");
        }
        let moves: Vec<String> = blocked
            .iter()
            .map(|(member_id, from, to)| format!("{member_id} ({from} -> {to})"))
            .collect();
        return Err(CliError::Validation(format!(
            "Cannot move members to an earlier role in one pass: {}. \
             Remove them from {} first, apply, then add them to the new role",
            moves.join(", "),
            desired.group
        )));
    }

    let created = prior.is_none();
    let state = if created {
        resource.create(&desired.group, &desired.members).await?
    } else {
        resource.update(&desired.group, &desired.members).await?
    };

    save_state(state_path, &state)?;
    info!(
        group = %state.group,
        changes = plan.change_count(),
        "state written to {}",
        state_path.display()
    );

    Ok(ApplyOutcome {
        created,
        plan,
        state,
    })
}
