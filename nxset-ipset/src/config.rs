//! Client configuration
//!
//! # Example Configuration
//!
//! ```toml
//! # Explicit utility path; looked up on PATH when omitted
//! path = "/usr/sbin/ipset"
//! min_major_version = 6
//! pool_capacity = 64
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{IpsetError, Result};
use crate::pool::DEFAULT_POOL_CAPACITY;
use crate::version::MIN_MAJOR_VERSION;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpsetConfig {
    /// Path of the ipset binary; `None` searches `PATH`
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Oldest accepted major version of the utility
    #[serde(default = "default_min_major_version")]
    pub min_major_version: u32,

    /// Idle commands and option bags kept for reuse
    #[serde(default = "default_pool_capacity")]
    pub pool_capacity: usize,
}

const SAMPLE: &str = r#"# nxset configuration

# Path of the ipset binary. When omitted, ipset is looked up on PATH.
# path = "/usr/sbin/ipset"

# Refuse to run against an older ipset major version
min_major_version = 6

# Idle commands and option bags kept for reuse
pool_capacity = 64
"#;

fn default_min_major_version() -> u32 {
    MIN_MAJOR_VERSION
}

fn default_pool_capacity() -> usize {
    DEFAULT_POOL_CAPACITY
}

impl Default for IpsetConfig {
    fn default() -> Self {
        Self {
            path: None,
            min_major_version: default_min_major_version(),
            pool_capacity: default_pool_capacity(),
        }
    }
}

impl IpsetConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: IpsetConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Commented sample configuration
    pub fn sample() -> &'static str {
        SAMPLE
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(path) = &self.path {
            if path.as_os_str().is_empty() {
                return Err(IpsetError::Config("path must not be empty".into()));
            }
        }

        if self.min_major_version < MIN_MAJOR_VERSION {
            return Err(IpsetError::Config(format!(
                "min_major_version {} is below the oldest supported version {}",
                self.min_major_version, MIN_MAJOR_VERSION
            )));
        }

        if self.pool_capacity == 0 {
            return Err(IpsetError::Config("pool_capacity must be at least 1".into()));
        }

        Ok(())
    }
}
