//! Typed front end to the `ipset` command-line utility.
//!
//! Callers describe an operation with an [`Action`], a set name, an entry
//! or [`SetType`] and an [`Options`] bag. The crate decides which modifiers
//! are legal for that combination (see [`matrix`]), lays out the argument
//! vector in a stable order (see [`args`]) and runs it once through a
//! [`ProcessRunner`], never through a shell.
//!
//! Commands and option bags are recycled through a [`Pool`] owned by the
//! [`Ipset`] client, so per-connection firewall updates do not allocate on
//! the hot path.

pub mod action;
pub mod args;
pub mod command;
pub mod config;
pub mod error;
pub mod ipset;
pub mod matrix;
pub mod options;
pub mod pool;
pub mod runner;
pub mod set_type;
pub mod version;

pub use action::Action;
pub use args::{build_args, ArgBuffer};
pub use command::Command;
pub use config::IpsetConfig;
pub use error::{IpsetError, Result};
pub use ipset::{IpSet, Ipset};
pub use matrix::{is_applicable, Modifier};
pub use options::{Family, Options};
pub use pool::{Pool, Pooled, Reset};
pub use runner::{ProcessRunner, RunOutput, SystemRunner};
pub use set_type::{SetType, Storage};
pub use version::{find_utility, parse_major_version, MIN_MAJOR_VERSION};
