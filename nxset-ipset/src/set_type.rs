//! Set types and their storage families

use std::fmt;
use std::str::FromStr;

use crate::error::IpsetError;

/// Storage method of a set type, the part before the colon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Storage {
    /// Fixed-size bitmap ranges
    Bitmap,
    /// Hash tables, sizable and family-specific
    Hash,
    /// List of other sets
    List,
}

/// ipset type of a set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetType {
    /// bitmap:ip
    BitmapIp,
    /// bitmap:ip,mac
    BitmapIpMac,
    /// bitmap:port
    BitmapPort,
    /// hash:ip
    HashIp,
    /// hash:mac
    HashMac,
    /// hash:ip,mac
    HashIpMac,
    /// hash:net
    HashNet,
    /// hash:net,net
    HashNetNet,
    /// hash:ip,port
    HashIpPort,
    /// hash:net,port
    HashNetPort,
    /// hash:ip,port,ip
    HashIpPortIp,
    /// hash:ip,port,net
    HashIpPortNet,
    /// hash:ip,mark
    HashIpMark,
    /// hash:net,port,net
    HashNetPortNet,
    /// hash:net,iface
    HashNetIface,
    /// list:set
    ListSet,
}

impl SetType {
    /// Every set type
    pub const ALL: [SetType; 16] = [
        SetType::BitmapIp,
        SetType::BitmapIpMac,
        SetType::BitmapPort,
        SetType::HashIp,
        SetType::HashMac,
        SetType::HashIpMac,
        SetType::HashNet,
        SetType::HashNetNet,
        SetType::HashIpPort,
        SetType::HashNetPort,
        SetType::HashIpPortIp,
        SetType::HashIpPortNet,
        SetType::HashIpMark,
        SetType::HashNetPortNet,
        SetType::HashNetIface,
        SetType::ListSet,
    ];

    /// The type name understood by the utility
    pub const fn as_str(&self) -> &'static str {
        match self {
            SetType::BitmapIp => "bitmap:ip",
            SetType::BitmapIpMac => "bitmap:ip,mac",
            SetType::BitmapPort => "bitmap:port",
            SetType::HashIp => "hash:ip",
            SetType::HashMac => "hash:mac",
            SetType::HashIpMac => "hash:ip,mac",
            SetType::HashNet => "hash:net",
            SetType::HashNetNet => "hash:net,net",
            SetType::HashIpPort => "hash:ip,port",
            SetType::HashNetPort => "hash:net,port",
            SetType::HashIpPortIp => "hash:ip,port,ip",
            SetType::HashIpPortNet => "hash:ip,port,net",
            SetType::HashIpMark => "hash:ip,mark",
            SetType::HashNetPortNet => "hash:net,port,net",
            SetType::HashNetIface => "hash:net,iface",
            SetType::ListSet => "list:set",
        }
    }

    pub const fn storage(&self) -> Storage {
        match self {
            SetType::BitmapIp | SetType::BitmapIpMac | SetType::BitmapPort => Storage::Bitmap,
            SetType::ListSet => Storage::List,
            _ => Storage::Hash,
        }
    }

    pub const fn is_hash(&self) -> bool {
        matches!(self.storage(), Storage::Hash)
    }

    /// Types whose entries are networks and can carry a `nomatch` exception
    pub const fn accepts_nomatch(&self) -> bool {
        matches!(
            self,
            SetType::HashNet
                | SetType::HashNetNet
                | SetType::HashNetPort
                | SetType::HashIpPortNet
                | SetType::HashNetPortNet
                | SetType::HashNetIface
        )
    }
}

impl fmt::Display for SetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SetType {
    type Err = IpsetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        SetType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| IpsetError::Config(format!("unknown set type '{}'", s)))
    }
}
