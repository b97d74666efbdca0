//! CLI error types and exit codes

use roster_directory::{ConfigError, DirectoryError};
use roster_reconcile::MembershipError;
use thiserror::Error;

/// Exit codes for the CLI
/// - 0: Success
/// - 1: General error
/// - 3: Remote directory error
/// - 4: Validation error
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Directory error: {0}")]
    Remote(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Validation(_) => 4,
            CliError::Remote(_) => 3,
            CliError::Config(_) | CliError::Io(_) => 1,
        }
    }

    /// Print the error to stderr
    pub fn print(&self) {
        if std::env::var("NO_COLOR").is_err() {
            eprintln!("\x1b[31mError:\x1b[0m {}", self);
        } else {
            eprintln!("Error: {}", self);
        }

        if let Some(suggestion) = self.suggestion() {
            eprintln!("\nSuggestion: {}", suggestion);
        }
    }

    fn suggestion(&self) -> Option<&'static str> {
        match self {
            CliError::Config(_) => Some(
                "Set ROSTER_ACCESS_TOKEN or ROSTER_CREDENTIALS_FILE (a .env file is read too).",
            ),
            _ => None,
        }
    }
}

impl From<MembershipError> for CliError {
    fn from(e: MembershipError) -> Self {
        if e.is_validation() {
            CliError::Validation(e.to_string())
        } else {
            CliError::Remote(e.to_string())
        }
    }
}

impl From<DirectoryError> for CliError {
    fn from(e: DirectoryError) -> Self {
        match e {
            DirectoryError::Config(message) => CliError::Config(message),
            other => CliError::Remote(other.to_string()),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Io(format!("JSON error: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_reconcile::Role;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::Validation("x".into()).exit_code(), 4);
        assert_eq!(CliError::Remote("x".into()).exit_code(), 3);
        assert_eq!(CliError::Config("x".into()).exit_code(), 1);
        assert_eq!(CliError::Io("x".into()).exit_code(), 1);
    }

    #[test]
    fn test_membership_errors_split_by_kind() {
        let conflict = MembershipError::ConflictingRoles {
            member_id: "a@x".into(),
            first: Role::Owner,
            second: Role::Member,
        };
        assert_eq!(CliError::from(conflict).exit_code(), 4);

        let remote = MembershipError::DeleteIncomplete {
            group_id: "eng@x".into(),
            failures: vec![DirectoryError::PermissionDenied("denied".into())],
        };
        assert_eq!(CliError::from(remote).exit_code(), 3);
    }

    #[test]
    fn test_config_error_maps_to_general() {
        let err = CliError::from(ConfigError::MissingVar("ROSTER_ACCESS_TOKEN".into()));
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("ROSTER_ACCESS_TOKEN"));
    }
}
