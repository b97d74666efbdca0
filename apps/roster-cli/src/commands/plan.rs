//! Show pending membership changes

use std::path::PathBuf;

use clap::Args;
use roster_directory::DirectoryClient;
use roster_reconcile::{GroupMembersResource, MembershipPlan};

use crate::config::{connect, load_desired, DesiredGroupFile};
use crate::error::CliResult;

/// Show the changes apply would make
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Path to desired-state file
    #[arg(short = 'f', long = "file")]
    pub file: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute the plan command
pub async fn execute(args: PlanArgs) -> CliResult<()> {
    let desired = load_desired(&args.file)?;
    let resource = connect()?;

    let plan = run(&resource, &desired).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        print_plan(&plan);
    }
    Ok(())
}

/// Compute the plan for `desired` without changing anything.
pub async fn run<C: DirectoryClient>(
    resource: &GroupMembersResource<C>,
    desired: &DesiredGroupFile,
) -> CliResult<MembershipPlan> {
    Ok(resource.plan(&desired.group, &desired.members).await?)
}

pub(crate) fn print_plan(plan: &MembershipPlan) {
    if !plan.has_changes() {
        println!("No changes required. {} is up to date.", plan.group_id);
        return;
    }

    println!("Planned changes for {}:", plan.group_id);
    print!("{}", plan.render());

    for (member_id, from, to) in plan.role_changes() {
        println!("note: {member_id} moves from {from} to {to}");
    }

    println!("{} change(s).", plan.change_count());
}
