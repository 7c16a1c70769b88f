//! Locating the ipset utility and checking its version

use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::error::{IpsetError, Result};

/// Oldest supported major version of the utility
pub const MIN_MAJOR_VERSION: u32 = 6;

/// Default program name looked up on `PATH`
pub const UTILITY_NAME: &str = "ipset";

/// Find `program` in the directories listed by `PATH`
///
/// A `program` containing a path separator is checked as given.
pub fn find_utility(program: impl AsRef<OsStr>) -> Result<PathBuf> {
    let program = Path::new(program.as_ref());
    if program.components().count() > 1 {
        return if is_executable(program) {
            Ok(program.to_path_buf())
        } else {
            Err(IpsetError::UtilityNotFound)
        };
    }

    let paths = env::var_os("PATH").ok_or(IpsetError::UtilityNotFound)?;
    env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|candidate| is_executable(candidate))
        .ok_or(IpsetError::UtilityNotFound)
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Parse the major version out of `ipset version` output
///
/// The output looks like `ipset v7.15, protocol version: 7`; the digits
/// between the first `v` and the following `.` are the major version.
pub fn parse_major_version(output: &[u8]) -> Option<u32> {
    let v = output.iter().position(|&b| b == b'v')?;
    let rest = &output[v + 1..];
    let dot = rest.iter().position(|&b| b == b'.')?;
    let digits = &rest[..dot];
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(digits).ok()?.parse().ok()
}

/// Fail unless `output` reports at least major version `required`
pub fn ensure_supported(output: &[u8], required: u32) -> Result<u32> {
    let found = parse_major_version(output).unwrap_or(0);
    if found < required {
        log::warn!(
            "ipset version {} found, {} or newer required",
            found,
            required
        );
        return Err(IpsetError::UnsupportedVersion { found, required });
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_major_version() {
        assert_eq!(parse_major_version(b"ipset v7.15, protocol version: 7\n"), Some(7));
        assert_eq!(parse_major_version(b"ipset v6.38, protocol version: 6"), Some(6));
        assert_eq!(parse_major_version(b"ipset v12.0"), Some(12));
    }

    #[test]
    fn test_parse_major_version_rejects_garbage() {
        assert_eq!(parse_major_version(b""), None);
        assert_eq!(parse_major_version(b"ipset 7.1"), None);
        assert_eq!(parse_major_version(b"ipset vX.1"), None);
        assert_eq!(parse_major_version(b"ipset v7"), None);
    }

    #[test]
    fn test_ensure_supported() {
        assert_eq!(ensure_supported(b"ipset v7.1", MIN_MAJOR_VERSION).unwrap(), 7);
        let err = ensure_supported(b"ipset v4.5", MIN_MAJOR_VERSION).unwrap_err();
        assert!(matches!(
            err,
            IpsetError::UnsupportedVersion {
                found: 4,
                required: 6
            }
        ));
        assert!(ensure_supported(b"garbage", MIN_MAJOR_VERSION).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_find_utility() {
        // sh is on PATH on any unix test host
        assert!(find_utility("sh").is_ok());
        assert!(matches!(
            find_utility("nxset-definitely-missing-binary"),
            Err(IpsetError::UtilityNotFound)
        ));
        assert!(find_utility("/bin/sh").is_ok());
        assert!(find_utility("/nonexistent/ipset").is_err());
    }
}
