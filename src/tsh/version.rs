//! tsh version banner parsing
//!
//! `tsh version` prints a banner such as
//! `Teleport v2.4.5.1 git:v2.4.5-19-g4901c48-dirty`. Only the first
//! `v<major>.<minor>.<patch>` token matters; a fourth component is ignored.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use crate::tsh::error::TshError;

/// Minimum tsh version that prints `tsh status` in the shape we parse
pub const MIN_STATUS_VERSION: Version = Version::new(2, 6, 1);

/// A `major.minor.patch` triple
///
/// Field order gives the lexicographic comparison (major, then minor, then patch).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Extract the first version token from a free-form banner
    pub fn parse_banner(banner: &str) -> Result<Self, TshError> {
        let captures = version_regex()
            .captures(banner)
            .ok_or_else(|| TshError::Parse(format!("no version found in {:?}", banner.trim())))?;

        let component = |idx: usize| -> Result<u64, TshError> {
            captures[idx]
                .parse()
                .map_err(|e| TshError::Parse(format!("invalid version component {:?}: {e}", &captures[idx])))
        };

        Ok(Self {
            major: component(1)?,
            minor: component(2)?,
            patch: component(3)?,
        })
    }

    /// True iff `candidate` is at least `self`
    pub fn is_supported(&self, candidate: &Version) -> bool {
        candidate >= self
    }
}

fn version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:^|[^0-9A-Za-z])v(\d+)\.(\d+)\.(\d+)").expect("version pattern is valid")
    })
}

impl FromStr for Version {
    type Err = TshError;

    /// Accepts both `v2.6.1` and the bare `2.6.1` used in config files
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with('v') {
            Self::parse_banner(s)
        } else {
            Self::parse_banner(&format!("v{s}"))
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}.{}", self.major, self.minor, self.patch)
    }
}
