//! IPv4 address to integer conversion
//!
//! Addresses are converted in network order: `1.2.3.4` is `0x01020304`.

use std::fmt::Write;
use std::net::Ipv4Addr;

use crate::error::{Error, Result};

/// Convert a dotted-quad IPv4 string to its integer form
///
/// # Example
/// ```
/// use nxset_netutil::v4_to_long;
/// assert_eq!(v4_to_long("192.168.1.1").unwrap(), 3232235777);
/// ```
pub fn v4_to_long(ip: &str) -> Result<u32> {
    ip.parse::<Ipv4Addr>()
        .map(u32::from)
        .map_err(|_| Error::InvalidIpv4(ip.to_string()))
}

/// Convert an integer to a dotted-quad IPv4 string
pub fn long_to_v4(ip: u32) -> String {
    let mut buf = String::with_capacity(15);
    write_v4(&mut buf, ip);
    buf
}

/// Append the dotted-quad form of `ip` to `buf`
pub fn write_v4(buf: &mut String, ip: u32) {
    // writing into a String cannot fail
    let _ = write!(buf, "{}", Ipv4Addr::from(ip));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_to_v4() {
        assert_eq!(long_to_v4(0), "0.0.0.0");
        assert_eq!(long_to_v4(16909060), "1.2.3.4");
        assert_eq!(long_to_v4(3232235777), "192.168.1.1");
        assert_eq!(long_to_v4(u32::MAX), "255.255.255.255");
    }

    #[test]
    fn test_v4_to_long() {
        assert_eq!(v4_to_long("0.0.0.0").unwrap(), 0);
        assert_eq!(v4_to_long("1.2.3.4").unwrap(), 0x0102_0304);
        assert_eq!(v4_to_long("255.255.255.255").unwrap(), u32::MAX);
    }

    #[test]
    fn test_v4_to_long_rejects_invalid() {
        for bad in ["", "1.2.3", "1.2.3.4.5", "256.1.1.1", "1.2.3.a", "1.2.3.4 ", "::1"] {
            assert!(
                matches!(v4_to_long(bad), Err(Error::InvalidIpv4(ref s)) if s == bad),
                "{:?}",
                bad
            );
        }
    }

    #[test]
    fn test_write_v4_appends() {
        let mut buf = String::from("src=");
        write_v4(&mut buf, 0x0a00_0001);
        assert_eq!(buf, "src=10.0.0.1");
    }
}
