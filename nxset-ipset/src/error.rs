//! Error types for nxset-ipset

use thiserror::Error;

use crate::action::Action;

/// Result type alias for ipset operations
pub type Result<T> = std::result::Result<T, IpsetError>;

/// Errors that can occur while driving the ipset utility
#[derive(Debug, Error)]
pub enum IpsetError {
    /// The ipset binary could not be located
    #[error("ipset utility not found")]
    UtilityNotFound,

    /// The ipset binary is present but too old
    #[error("ipset utility version {found} is not supported, requiring version >= {required}.0")]
    UnsupportedVersion { found: u32, required: u32 },

    /// The utility exited unsuccessfully or could not be run
    #[error("ipset: can't {action}{}: {diagnostic}", describe_target(.action, .name, .payload))]
    CommandFailed {
        action: Action,
        /// `None` when the command addressed every set or no set at all
        name: Option<String>,
        payload: Option<String>,
        diagnostic: String,
    },

    /// A pooled command was executed before being assigned
    #[error("invalid command: {0}")]
    InvalidCommand(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Failed to parse configuration file
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn describe_target(action: &Action, name: &Option<String>, payload: &Option<String>) -> String {
    match (name, payload) {
        (Some(name), Some(payload)) => format!(" {} {}", name, payload),
        (Some(name), None) => format!(" {}", name),
        (None, _) if action.is_two_args() => " all sets".to_string(),
        (None, _) => String::new(),
    }
}

impl IpsetError {
    /// Check if the error came from a failed utility invocation
    pub fn is_command_failed(&self) -> bool {
        matches!(self, IpsetError::CommandFailed { .. })
    }

    /// Captured diagnostic text of a failed invocation
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            IpsetError::CommandFailed { diagnostic, .. } => Some(diagnostic),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_arg_failure_message() {
        let err = IpsetError::CommandFailed {
            action: Action::List,
            name: Some("blocked".into()),
            payload: None,
            diagnostic: "The set with the given name does not exist".into(),
        };
        assert_eq!(
            err.to_string(),
            "ipset: can't list blocked: The set with the given name does not exist"
        );
    }

    #[test]
    fn test_three_arg_failure_message() {
        let err = IpsetError::CommandFailed {
            action: Action::Add,
            name: Some("blocked".into()),
            payload: Some("10.0.0.1".into()),
            diagnostic: "Element cannot be added to the set: it's already added".into(),
        };
        assert_eq!(
            err.to_string(),
            "ipset: can't add blocked 10.0.0.1: \
             Element cannot be added to the set: it's already added"
        );
        assert!(err.is_command_failed());
        assert!(err.diagnostic().unwrap().contains("already added"));
    }

    #[test]
    fn test_unnamed_failure_messages() {
        let all = IpsetError::CommandFailed {
            action: Action::Destroy,
            name: None,
            payload: None,
            diagnostic: "Set cannot be destroyed: it is in use".into(),
        };
        assert_eq!(
            all.to_string(),
            "ipset: can't destroy all sets: Set cannot be destroyed: it is in use"
        );

        let bare = IpsetError::CommandFailed {
            action: Action::Restore,
            name: None,
            payload: None,
            diagnostic: "Error in line 2".into(),
        };
        assert_eq!(bare.to_string(), "ipset: can't restore: Error in line 2");
    }

    #[test]
    fn test_unsupported_version_message() {
        let err = IpsetError::UnsupportedVersion {
            found: 4,
            required: 6,
        };
        assert!(err.to_string().contains("version 4"));
        assert!(err.to_string().contains(">= 6.0"));
    }
}
