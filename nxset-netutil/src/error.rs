//! Error types for nxset-netutil

use thiserror::Error;

/// Result type alias for netutil operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Not a dotted-quad IPv4 address
    #[error("invalid ipv4 {0}")]
    InvalidIpv4(String),

    /// Host name could not be resolved to any address
    #[error("failed to resolve {0}")]
    Resolve(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
