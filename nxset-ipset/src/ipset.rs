//! High-level set operations
//!
//! [`Ipset`] owns the process runner and the pools of commands and option
//! bags; share it (for example behind an `Arc`) between threads issuing
//! operations. [`IpSet`] is a lightweight handle naming one set.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use nxset_ipset::{Ipset, Options, SetType};
//!
//! let ipset = Ipset::new()?;
//! let set = ipset.create("blocked", SetType::HashIp, &Options::new().with_exist(true))?;
//!
//! set.add("1.1.1.1", &Options::new().with_timeout(Duration::from_secs(3600)))?;
//! assert!(set.test("1.1.1.1")?);
//!
//! set.del("1.1.1.1", &Options::EMPTY)?;
//! set.destroy()?;
//! # Ok::<(), nxset_ipset::IpsetError>(())
//! ```

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::action::Action;
use crate::command::Command;
use crate::config::IpsetConfig;
use crate::error::{IpsetError, Result};
use crate::options::Options;
use crate::pool::{Pool, Pooled};
use crate::runner::{ProcessRunner, SystemRunner};
use crate::set_type::SetType;
use crate::version::{ensure_supported, find_utility, UTILITY_NAME};

/// Diagnostic printed by `ipset test` for an absent entry
const NOT_IN_SET: &str = "is NOT in set";

/// Client for the ipset utility
pub struct Ipset<R: ProcessRunner = SystemRunner> {
    path: PathBuf,
    runner: R,
    commands: Pool<Command>,
    options: Pool<Options>,
}

impl Ipset<SystemRunner> {
    /// Locate `ipset` on `PATH` and check that it is recent enough
    pub fn new() -> Result<Self> {
        Self::from_config(&IpsetConfig::default())
    }

    /// Locate and check the utility as described by `config`
    pub fn from_config(config: &IpsetConfig) -> Result<Self> {
        Self::checked(config, SystemRunner)
    }
}

impl<R: ProcessRunner> Ipset<R> {
    /// Build a client around an already located utility, without checks
    pub fn with_runner(path: impl Into<PathBuf>, runner: R) -> Self {
        Self::with_pool_capacity(path, runner, IpsetConfig::default().pool_capacity)
    }

    pub fn with_pool_capacity(path: impl Into<PathBuf>, runner: R, capacity: usize) -> Self {
        Self {
            path: path.into(),
            runner,
            commands: Pool::with_capacity(capacity),
            options: Pool::with_capacity(capacity),
        }
    }

    /// Locate the utility per `config`, then verify its version through `runner`
    pub fn checked(config: &IpsetConfig, runner: R) -> Result<Self> {
        config.validate()?;
        let path = match &config.path {
            Some(path) => find_utility(path)?,
            None => find_utility(UTILITY_NAME)?,
        };

        let ipset = Self::with_pool_capacity(path, runner, config.pool_capacity);
        let major = ipset.check_version(config.min_major_version)?;
        log::info!(
            "using {} (major version {})",
            ipset.path.display(),
            major
        );
        Ok(ipset)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// A zeroed option bag from the pool, returned when dropped
    pub fn options(&self) -> Pooled<'_, Options> {
        self.options.acquire()
    }

    pub fn command_pool(&self) -> &Pool<Command> {
        &self.commands
    }

    pub fn options_pool(&self) -> &Pool<Options> {
        &self.options
    }

    /// Raw output of `ipset version`
    pub fn version(&self) -> Result<String> {
        let mut out = Vec::new();
        self.exec(Action::Version, None, None, "", &Options::EMPTY, None, Some(&mut out))?;
        Ok(String::from_utf8_lossy(&out).trim().to_string())
    }

    /// Fail with [`IpsetError::UnsupportedVersion`] below major `required`
    pub fn check_version(&self, required: u32) -> Result<u32> {
        let version = self.version()?;
        ensure_supported(version.as_bytes(), required)
    }

    /// Create a set; with `exist` an identical existing set is not an error
    pub fn create(&self, name: &str, set_type: SetType, opts: &Options) -> Result<IpSet<'_, R>> {
        self.exec(
            Action::Create,
            Some(name),
            Some(set_type),
            set_type.as_str(),
            opts,
            None,
            None,
        )?;
        log::debug!("created set {} ({})", name, set_type);
        Ok(self.set(name, set_type))
    }

    /// Handle to an existing set, without touching the system
    pub fn set(&self, name: &str, set_type: SetType) -> IpSet<'_, R> {
        IpSet {
            ipset: self,
            name: name.to_string(),
            set_type,
        }
    }

    /// Flush the named sets, or every set when `names` is empty
    ///
    /// An empty string among `names` is rejected, never read as "all sets".
    pub fn flush(&self, names: &[&str]) -> Result<()> {
        self.for_each_or_all(Action::Flush, names)
    }

    /// Destroy the named sets, or every set when `names` is empty
    ///
    /// A set that is still referenced is not destroyed.
    pub fn destroy(&self, names: &[&str]) -> Result<()> {
        self.for_each_or_all(Action::Destroy, names)
    }

    /// Exchange the contents of two compatible sets
    pub fn swap(&self, from: &str, to: &str) -> Result<()> {
        self.exec(Action::Swap, Some(from), None, to, &Options::EMPTY, None, None)
    }

    /// Restore a session produced by save
    pub fn restore(&self, data: &[u8]) -> Result<()> {
        self.exec(Action::Restore, None, None, "", &Options::EMPTY, Some(data), None)
    }

    pub fn restore_from_reader(&self, mut reader: impl Read) -> Result<()> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        self.restore(&data)
    }

    pub fn restore_from_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let data = fs::read(path)?;
        self.restore(&data)
    }

    fn for_each_or_all(&self, action: Action, names: &[&str]) -> Result<()> {
        if names.is_empty() {
            return self.exec(action, None, None, "", &Options::EMPTY, None, None);
        }
        for &name in names {
            self.exec(action, Some(name), None, "", &Options::EMPTY, None, None)?;
        }
        Ok(())
    }

    /// Run one command through a pooled descriptor
    #[allow(clippy::too_many_arguments)]
    fn exec(
        &self,
        action: Action,
        name: Option<&str>,
        set_type: Option<SetType>,
        payload: &str,
        opts: &Options,
        stdin: Option<&[u8]>,
        out: Option<&mut Vec<u8>>,
    ) -> Result<()> {
        let mut cmd = self.commands.acquire();
        cmd.assign(action, name, set_type, payload);
        cmd.exec(&self.runner, &self.path, opts, stdin)?;
        if let Some(out) = out {
            cmd.take_output_into(out);
        }
        Ok(())
    }
}

impl<R: ProcessRunner + std::fmt::Debug> std::fmt::Debug for Ipset<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ipset")
            .field("path", &self.path)
            .field("runner", &self.runner)
            .finish_non_exhaustive()
    }
}

/// Handle to one named set
#[derive(Debug)]
pub struct IpSet<'a, R: ProcessRunner = SystemRunner> {
    ipset: &'a Ipset<R>,
    name: String,
    set_type: SetType,
}

impl<R: ProcessRunner> IpSet<'_, R> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_type(&self) -> SetType {
        self.set_type
    }

    fn exec(
        &self,
        action: Action,
        payload: &str,
        opts: &Options,
        out: Option<&mut Vec<u8>>,
    ) -> Result<()> {
        self.ipset
            .exec(action, Some(self.name.as_str()), Some(self.set_type), payload, opts, None, out)
    }

    /// Add an entry; with `exist` an already present entry is not an error
    pub fn add(&self, entry: &str, opts: &Options) -> Result<()> {
        self.exec(Action::Add, entry, opts, None)
    }

    /// Delete an entry; with `exist` an absent entry is not an error
    pub fn del(&self, entry: &str, opts: &Options) -> Result<()> {
        self.exec(Action::Delete, entry, opts, None)
    }

    /// Whether `entry` is in the set
    pub fn test(&self, entry: &str) -> Result<bool> {
        match self.exec(Action::Test, entry, &Options::EMPTY, None) {
            Ok(()) => Ok(true),
            Err(IpsetError::CommandFailed { ref diagnostic, .. })
                if diagnostic.contains(NOT_IN_SET) =>
            {
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    pub fn flush(&self) -> Result<()> {
        self.exec(Action::Flush, "", &Options::EMPTY, None)
    }

    pub fn destroy(&self) -> Result<()> {
        self.exec(Action::Destroy, "", &Options::EMPTY, None)
    }

    /// Header data and entries of the set; `resolve` forces name lookups
    pub fn list(&self, opts: &Options) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.list_into(opts, &mut out)?;
        Ok(out)
    }

    /// Like [`list`](Self::list), reusing the caller's buffer
    pub fn list_into(&self, opts: &Options, buf: &mut Vec<u8>) -> Result<()> {
        self.exec(Action::List, "", opts, Some(buf))
    }

    pub fn list_to_file(&self, path: impl AsRef<Path>, opts: &Options) -> Result<()> {
        let out = self.list(opts)?;
        fs::write(path, out)?;
        Ok(())
    }

    /// Dump the set in a form restore can read
    pub fn save(&self, opts: &Options) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.save_into(opts, &mut out)?;
        Ok(out)
    }

    pub fn save_into(&self, opts: &Options, buf: &mut Vec<u8>) -> Result<()> {
        self.exec(Action::Save, "", opts, Some(buf))
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>, opts: &Options) -> Result<()> {
        let out = self.save(opts)?;
        fs::write(path, out)?;
        Ok(())
    }

    /// Rename the set; `new_name` must not exist yet
    pub fn rename(&mut self, new_name: &str) -> Result<()> {
        self.exec(Action::Rename, new_name, &Options::EMPTY, None)?;
        self.name.clear();
        self.name.push_str(new_name);
        Ok(())
    }

    pub fn restore(&self, data: &[u8]) -> Result<()> {
        self.ipset.restore(data)
    }

    pub fn restore_from_file(&self, path: impl AsRef<Path>) -> Result<()> {
        self.ipset.restore_from_file(path)
    }
}
