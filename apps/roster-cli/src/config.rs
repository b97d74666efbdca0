//! Desired-state and state files

use std::fs;
use std::path::Path;

use roster_directory::{DirectoryConfig, HttpDirectoryClient};
use roster_reconcile::{GroupMembersResource, MembersByRole, ResourceState};
use serde::{Deserialize, Serialize};

use crate::error::{CliError, CliResult};

/// Default location of the state file.
pub const DEFAULT_STATE_FILE: &str = "roster.state.json";

/// Desired membership of one group, as written in YAML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredGroupFile {
    pub group: String,
    #[serde(flatten)]
    pub members: MembersByRole,
}

impl DesiredGroupFile {
    /// Parses YAML and normalizes identifiers.
    pub fn parse(content: &str) -> CliResult<Self> {
        let raw: DesiredGroupFile = serde_yaml::from_str(content).map_err(|e| {
            let location = if let Some(loc) = e.location() {
                format!(" at line {}, column {}", loc.line(), loc.column())
            } else {
                String::new()
            };
            CliError::Validation(format!("Invalid YAML{location}: {e}"))
        })?;

        let desired = Self {
            group: raw.group.trim().to_string(),
            members: raw.members.normalized(),
        };
        desired.validate()?;
        Ok(desired)
    }

    pub fn validate(&self) -> CliResult<()> {
        if self.group.is_empty() {
            return Err(CliError::Validation("group must not be empty".to_string()));
        }
        self.members.validate()?;
        Ok(())
    }
}

/// Load the desired state of a group from a YAML file
pub fn load_desired(path: &Path) -> CliResult<DesiredGroupFile> {
    if !path.exists() {
        return Err(CliError::Validation(format!(
            "File not found: {}",
            path.display()
        )));
    }

    let content = fs::read_to_string(path)
        .map_err(|e| CliError::Io(format!("Failed to read file {}: {}", path.display(), e)))?;

    DesiredGroupFile::parse(&content)
}

/// Load a state file, returning `None` if it does not exist.
pub fn load_state(path: &Path) -> CliResult<Option<ResourceState>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| CliError::Io(format!("Failed to read state {}: {}", path.display(), e)))?;
    let state = serde_json::from_str(&content).map_err(|e| {
        CliError::Validation(format!("Corrupt state file {}: {}", path.display(), e))
    })?;
    Ok(Some(state))
}

/// Write a state file as pretty JSON.
pub fn save_state(path: &Path, state: &ResourceState) -> CliResult<()> {
    let json = serde_json::to_string_pretty(state)?;
    fs::write(path, json + "\n")
        .map_err(|e| CliError::Io(format!("Failed to write state {}: {}", path.display(), e)))
}

/// Build a resource over the HTTP directory client from the environment.
pub fn connect() -> CliResult<GroupMembersResource<HttpDirectoryClient>> {
    let config = DirectoryConfig::from_env()?;
    tracing::debug!(
        api_base_url = %config.api_base_url,
        page_size = config.page_size,
        "connecting to directory"
    );
    let client = HttpDirectoryClient::new(config)?;
    Ok(GroupMembersResource::new(client))
}
