//! Semantic version strings as used by VM and runtime releases (`v0.5.11`).

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypesError;

/// A `major.minor.patch` release version.
///
/// Parsing accepts an optional leading `v`; display always includes it, which
/// matches how releases are tagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SemVer {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl SemVer {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl std::str::FromStr for SemVer {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let body = trimmed.strip_prefix('v').unwrap_or(trimmed);
        let parts: Vec<&str> = body.split('.').collect();
        if parts.len() != 3 {
            return Err(TypesError::InvalidVersion(s.to_string()));
        }
        let mut nums = [0u32; 3];
        for (slot, part) in nums.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| TypesError::InvalidVersion(s.to_string()))?;
        }
        Ok(Self::new(nums[0], nums[1], nums[2]))
    }
}

impl std::fmt::Display for SemVer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl Serialize for SemVer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SemVer {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A requested VM version: a pinned release or whatever is newest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionRequest {
    Latest,
    Pinned(SemVer),
}

impl std::str::FromStr for VersionRequest {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("latest") {
            Ok(VersionRequest::Latest)
        } else {
            s.parse().map(VersionRequest::Pinned)
        }
    }
}

impl std::fmt::Display for VersionRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VersionRequest::Latest => f.write_str("latest"),
            VersionRequest::Pinned(v) => write!(f, "{}", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_and_without_prefix() {
        let a: SemVer = "v0.5.11".parse().unwrap();
        let b: SemVer = "0.5.11".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "v0.5.11");
    }

    #[test]
    fn test_ordering_is_numeric() {
        let older: SemVer = "v0.4.9".parse().unwrap();
        let newer: SemVer = "v0.4.10".parse().unwrap();
        assert!(newer > older);
    }

    #[test]
    fn test_rejects_partial_versions() {
        assert!("v1.2".parse::<SemVer>().is_err());
        assert!("latest".parse::<SemVer>().is_err());
        assert!("v1.2.x".parse::<SemVer>().is_err());
    }

    #[test]
    fn test_version_request_latest_is_case_insensitive() {
        assert_eq!("Latest".parse::<VersionRequest>().unwrap(), VersionRequest::Latest);
        assert_eq!(
            "v0.6.0".parse::<VersionRequest>().unwrap(),
            VersionRequest::Pinned(SemVer::new(0, 6, 0))
        );
    }
}
