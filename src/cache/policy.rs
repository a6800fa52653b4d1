//! Read policy for stale-but-unreaped entries.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// How `get` treats an entry that is older than the interval but has not
/// been swept by the reaper yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadPolicy {
    /// Return any entry still present. Staleness is enforced only by the reaper.
    #[default]
    Lenient,
    /// Report entries older than the interval as misses.
    Strict,
}

impl FromStr for ReadPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            other => Err(format!("unknown read policy: {}", other)),
        }
    }
}

impl fmt::Display for ReadPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lenient => f.write_str("lenient"),
            Self::Strict => f.write_str("strict"),
        }
    }
}
