//! ipset actions and their positional syntax

use std::fmt;

/// An ipset command verb
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Create a new set
    Create,
    /// Add an entry to a set
    Add,
    /// Delete an entry from a set
    Delete,
    /// Test whether an entry is in a set
    Test,
    /// Destroy one set or all sets
    Destroy,
    /// List header data and entries
    List,
    /// Dump a set in restorable form
    Save,
    /// Restore a saved session from stdin
    Restore,
    /// Flush entries from one set or all sets
    Flush,
    /// Rename a set
    Rename,
    /// Swap the content of two sets
    Swap,
    /// Print the utility version
    Version,
}

impl Action {
    /// Every action, in declaration order
    pub const ALL: [Action; 12] = [
        Action::Create,
        Action::Add,
        Action::Delete,
        Action::Test,
        Action::Destroy,
        Action::List,
        Action::Save,
        Action::Restore,
        Action::Flush,
        Action::Rename,
        Action::Swap,
        Action::Version,
    ];

    /// The token passed to the utility
    pub const fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Add => "add",
            Action::Delete => "del",
            Action::Test => "test",
            Action::Destroy => "destroy",
            Action::List => "list",
            Action::Save => "save",
            Action::Restore => "restore",
            Action::Flush => "flush",
            Action::Rename => "rename",
            Action::Swap => "swap",
            Action::Version => "version",
        }
    }

    /// Actions whose command line ends after the set name
    pub const fn is_two_args(&self) -> bool {
        matches!(
            self,
            Action::List | Action::Save | Action::Destroy | Action::Flush
        )
    }

    /// Actions that take neither a set name nor a payload
    pub const fn is_bare(&self) -> bool {
        matches!(self, Action::Restore | Action::Version)
    }

    /// Actions whose successful output is handed back to the caller
    pub const fn returns_output(&self) -> bool {
        matches!(self, Action::List | Action::Save | Action::Version)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_arg_actions() {
        let two: Vec<_> = Action::ALL.iter().filter(|a| a.is_two_args()).collect();
        assert_eq!(
            two,
            vec![&Action::Destroy, &Action::List, &Action::Save, &Action::Flush]
        );
    }

    #[test]
    fn test_delete_token() {
        assert_eq!(Action::Delete.to_string(), "del");
        assert_eq!(Action::Create.as_str(), "create");
    }
}
