//! Show observed membership

use std::path::PathBuf;

use clap::Args;
use roster_directory::DirectoryClient;
use roster_reconcile::{GroupMembersResource, ResourceState};

use crate::commands::print_state;
use crate::config::{connect, load_state, save_state};
use crate::error::{CliError, CliResult};

/// Show the current members of a group
#[derive(Args, Debug)]
pub struct ReadArgs {
    /// Group to read
    #[arg(long, required_unless_present = "state", conflicts_with = "state")]
    pub group: Option<String>,

    /// Refresh the group recorded in this state file
    #[arg(long)]
    pub state: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// What to read.
#[derive(Debug, Clone)]
pub enum ReadTarget {
    Group(String),
    StateFile(PathBuf),
}

impl ReadArgs {
    fn target(&self) -> CliResult<ReadTarget> {
        match (&self.group, &self.state) {
            (Some(group), None) => Ok(ReadTarget::Group(group.trim().to_string())),
            (None, Some(path)) => Ok(ReadTarget::StateFile(path.clone())),
            _ => Err(CliError::Validation(
                "pass exactly one of --group or --state".to_string(),
            )),
        }
    }
}

/// Execute the read command
pub async fn execute(args: ReadArgs) -> CliResult<()> {
    let target = args.target()?;
    let resource = connect()?;

    let state = run(&resource, &target).await?;
    print_state(&state, args.json)
}

/// Read observed membership. A state file target is refreshed in place.
pub async fn run<C: DirectoryClient>(
    resource: &GroupMembersResource<C>,
    target: &ReadTarget,
) -> CliResult<ResourceState> {
    match target {
        ReadTarget::Group(group) => Ok(resource.read_state(group).await?),
        ReadTarget::StateFile(path) => {
            let prior = load_state(path)?.ok_or_else(|| {
                CliError::Validation(format!("No state file at {}", path.display()))
            })?;

            let mut refreshed = resource.read_state(&prior.group).await?;
            refreshed.id = prior.id;
            save_state(path, &refreshed)?;
            Ok(refreshed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_directory::{InMemoryDirectory, Role};

    #[tokio::test]
    async fn test_read_group_has_no_side_effects() {
        let dir =
            InMemoryDirectory::new().with_member("eng@example.com", "a@example.com", Role::Owner);
        let resource = GroupMembersResource::new(dir);

        let state = run(&resource, &ReadTarget::Group("eng@example.com".into()))
            .await
            .unwrap();

        assert_eq!(state.members.get(Role::Owner).len(), 1);
        assert!(resource.client().mutations().is_empty());
    }

    #[tokio::test]
    async fn test_read_refreshes_state_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("state.json");
        save_state(
            &path,
            &ResourceState {
                id: Some("eng@example.com".into()),
                group: "eng@example.com".into(),
                ..Default::default()
            },
        )
        .unwrap();
        let dir =
            InMemoryDirectory::new().with_member("eng@example.com", "b@example.com", Role::Member);
        let resource = GroupMembersResource::new(dir);

        run(&resource, &ReadTarget::StateFile(path.clone()))
            .await
            .unwrap();

        let saved = load_state(&path).unwrap().unwrap();
        assert!(saved.is_managed());
        assert!(saved.members.get(Role::Member).contains("b@example.com"));
    }

    #[tokio::test]
    async fn test_read_missing_state_file() {
        let tmp = tempfile::tempdir().unwrap();
        let resource = GroupMembersResource::new(InMemoryDirectory::new());

        let err = run(&resource, &ReadTarget::StateFile(tmp.path().join("none.json")))
            .await
            .unwrap_err();

        assert_eq!(err.exit_code(), 4);
    }
}
