//! Small network helpers used alongside address sets
//!
//! - [`ipconv`]: dotted-quad IPv4 strings to and from `u32`
//! - [`tcp`]: TCP reachability probing with a connect timeout

pub mod error;
pub mod ipconv;
pub mod tcp;

pub use error::{Error, Result};
pub use ipconv::{long_to_v4, v4_to_long, write_v4};
pub use tcp::detect;
