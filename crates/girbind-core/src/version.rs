//! IDL version strings.
//!
//! Versions appear in `version`/`deprecated-version` attributes and in
//! namespace identities (`"Gtk-4.0"`). Missing components default to zero,
//! so `"4"`, `"4.0"` and `"4.0.0"` compare equal.

use std::fmt;
use std::str::FromStr;

use crate::BuildError;

/// A dotted `major.minor.patch` version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl FromStr for Version {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || BuildError::InvalidVersion(s.to_string());
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(invalid());
        }

        let mut parts = [0u32; 3];
        for (i, part) in trimmed.split('.').enumerate() {
            let slot = parts.get_mut(i).ok_or_else(invalid)?;
            *slot = part.parse().map_err(|_| invalid())?;
        }

        Ok(Version::new(parts[0], parts[1], parts[2]))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Namespace identity key, `"{name}-{major}"`.
///
/// Configuration is keyed this way so that e.g. `Gtk-3` and `Gtk-4` can be
/// configured independently.
pub fn versioned_namespace(name: &str, version: &str) -> String {
    let major = version.split('.').next().unwrap_or(version);
    format!("{name}-{major}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_partial_versions() {
        assert_eq!("2".parse::<Version>().unwrap(), Version::new(2, 0, 0));
        assert_eq!("2.64".parse::<Version>().unwrap(), Version::new(2, 64, 0));
        assert_eq!("1.2.3".parse::<Version>().unwrap(), Version::new(1, 2, 3));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("".parse::<Version>().is_err());
        assert!("1.x".parse::<Version>().is_err());
        assert!("1.2.3.4".parse::<Version>().is_err());
    }

    #[test]
    fn ordering_is_numeric() {
        let a: Version = "2.9".parse().unwrap();
        let b: Version = "2.10".parse().unwrap();
        assert!(a < b);
    }

    #[test]
    fn versioned_namespace_uses_major() {
        assert_eq!(versioned_namespace("Gtk", "4.0"), "Gtk-4");
        assert_eq!(versioned_namespace("GLib", "2"), "GLib-2");
    }
}
