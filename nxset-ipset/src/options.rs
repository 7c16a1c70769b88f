//! Optional modifiers for ipset commands
//!
//! Every field of [`Options`] has a zero value meaning "not requested". A
//! requested modifier only reaches the command line when the applicability
//! matrix allows it for the action and set type at hand; otherwise it is
//! dropped without error.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use nxset_ipset::Options;
//!
//! let opts = Options::new()
//!     .with_exist(true)
//!     .with_timeout(Duration::from_secs(3600))
//!     .with_comment_content("blocked by fail2ban");
//! assert!(opts.exist);
//! ```

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::IpsetError;
use crate::pool::Reset;

/// Address family of a hash set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// IPv4
    Inet,
    /// IPv6
    Inet6,
}

impl Family {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Family::Inet => "inet",
            Family::Inet6 => "inet6",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Family {
    type Err = IpsetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "inet" | "ipv4" => Ok(Family::Inet),
            "inet6" | "ipv6" => Ok(Family::Inet6),
            _ => Err(IpsetError::Config(format!(
                "unknown family '{}', expected 'inet' or 'inet6'",
                s
            ))),
        }
    }
}

/// The option bag applied to a single command
///
/// `exist` defaults to off: callers that want "ignore if already exists"
/// semantics must ask for it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    /// `-exist`: ignore errors for existing sets/entries
    pub exist: bool,
    /// `-resolve`: resolve addresses when listing
    pub resolve: bool,
    /// `timeout`: entry lifetime, encoded in whole seconds
    pub timeout: Duration,
    /// `counters`: enable per-entry counters on create
    pub counters: bool,
    /// `packets`: initial packet counter on add
    pub counters_packets: u64,
    /// `bytes`: initial byte counter on add
    pub counters_bytes: u64,
    /// `comment`: enable comments on create
    pub comment: bool,
    /// `comment`: comment text on add
    pub comment_content: String,
    /// `skbinfo`: enable skb metadata on create
    pub skb_info: bool,
    /// `skbmark`: skb mark on add, e.g. `0x1/0xff`
    pub skb_mark: String,
    /// `skbprio`: skb priority on add, e.g. `1:10`
    pub skb_prio: String,
    /// `skbqueue`: skb queue on add
    pub skb_queue: u64,
    /// `nomatch`: add the entry as an exception
    pub no_match: bool,
    /// `family`: address family of a hash set
    pub family: Option<Family>,
    /// `hashsize`: initial hash size of a hash set
    pub hash_size: u64,
}

impl Options {
    /// A bag with nothing requested, usable by reference without allocating
    pub const EMPTY: Options = Options {
        exist: false,
        resolve: false,
        timeout: Duration::ZERO,
        counters: false,
        counters_packets: 0,
        counters_bytes: 0,
        comment: false,
        comment_content: String::new(),
        skb_info: false,
        skb_mark: String::new(),
        skb_prio: String::new(),
        skb_queue: 0,
        no_match: false,
        family: None,
        hash_size: 0,
    };

    /// An empty bag with nothing requested
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_exist(mut self, exist: bool) -> Self {
        self.exist = exist;
        self
    }

    pub fn with_resolve(mut self, resolve: bool) -> Self {
        self.resolve = resolve;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_counters(mut self, counters: bool) -> Self {
        self.counters = counters;
        self
    }

    pub fn with_packets(mut self, packets: u64) -> Self {
        self.counters_packets = packets;
        self
    }

    pub fn with_bytes(mut self, bytes: u64) -> Self {
        self.counters_bytes = bytes;
        self
    }

    pub fn with_comment(mut self, comment: bool) -> Self {
        self.comment = comment;
        self
    }

    pub fn with_comment_content(mut self, content: impl Into<String>) -> Self {
        self.comment_content = content.into();
        self
    }

    pub fn with_skb_info(mut self, skb_info: bool) -> Self {
        self.skb_info = skb_info;
        self
    }

    pub fn with_skb_mark(mut self, mark: impl Into<String>) -> Self {
        self.skb_mark = mark.into();
        self
    }

    pub fn with_skb_prio(mut self, prio: impl Into<String>) -> Self {
        self.skb_prio = prio.into();
        self
    }

    pub fn with_skb_queue(mut self, queue: u64) -> Self {
        self.skb_queue = queue;
        self
    }

    pub fn with_no_match(mut self, no_match: bool) -> Self {
        self.no_match = no_match;
        self
    }

    pub fn with_family(mut self, family: Family) -> Self {
        self.family = Some(family);
        self
    }

    pub fn with_hash_size(mut self, hash_size: u64) -> Self {
        self.hash_size = hash_size;
        self
    }

    /// Copy every field of `other` into this bag, keeping string capacity
    pub fn assign(&mut self, other: &Options) {
        self.clone_from(other);
    }

    /// Timeout in whole seconds, truncated toward zero
    pub fn timeout_secs(&self) -> u64 {
        self.timeout.as_secs()
    }

    /// True when no field is requested
    pub fn is_empty(&self) -> bool {
        *self == Options::default()
    }
}

impl Reset for Options {
    fn reset(&mut self) {
        self.exist = false;
        self.resolve = false;
        self.timeout = Duration::ZERO;
        self.counters = false;
        self.counters_packets = 0;
        self.counters_bytes = 0;
        self.comment = false;
        self.comment_content.clear();
        self.skb_info = false;
        self.skb_mark.clear();
        self.skb_prio.clear();
        self.skb_queue = 0;
        self.no_match = false;
        self.family = None;
        self.hash_size = 0;
    }
}
