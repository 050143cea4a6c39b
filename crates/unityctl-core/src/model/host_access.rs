// ── Host access ──
//
// Which hosts may see a LUN, and how. Host ids are passed to the array
// as given; the array is the authority on whether they exist.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Reference to another array object by id (`{"id": "Host_2"}`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdRef {
    pub id: String,
}

impl IdRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Access a host is granted to a LUN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum AccessMask {
    NoAccess,
    #[default]
    Production,
    Snapshot,
    Both,
}

impl From<AccessMask> for u8 {
    fn from(mask: AccessMask) -> Self {
        match mask {
            AccessMask::NoAccess => 0,
            AccessMask::Production => 1,
            AccessMask::Snapshot => 2,
            AccessMask::Both => 3,
        }
    }
}

impl TryFrom<u8> for AccessMask {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::NoAccess),
            1 => Ok(Self::Production),
            2 => Ok(Self::Snapshot),
            3 => Ok(Self::Both),
            other => Err(format!("access mask must be 0-3, got {other}")),
        }
    }
}

impl fmt::Display for AccessMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NoAccess => "none",
            Self::Production => "production",
            Self::Snapshot => "snapshot",
            Self::Both => "both",
        })
    }
}

/// Accepts the numeric mask or its name.
impl FromStr for AccessMask {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "0" | "none" => Ok(Self::NoAccess),
            "1" | "production" => Ok(Self::Production),
            "2" | "snapshot" => Ok(Self::Snapshot),
            "3" | "both" => Ok(Self::Both),
            other => Err(format!(
                "unknown access mask '{other}' (expected none, production, snapshot, both or 0-3)"
            )),
        }
    }
}

/// One host's access to a LUN, in the array's wire shape:
/// `{"host": {"id": "Host_2"}, "accessMask": 1}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostAccessEntry {
    pub host: IdRef,
    pub access_mask: AccessMask,
}

impl HostAccessEntry {
    pub fn new(host_id: impl Into<String>, access_mask: AccessMask) -> Self {
        Self {
            host: IdRef::new(host_id),
            access_mask,
        }
    }

    pub fn production(host_id: impl Into<String>) -> Self {
        Self::new(host_id, AccessMask::Production)
    }

    pub fn host_id(&self) -> &str {
        &self.host.id
    }
}

/// Parses `HOST_ID` (production access) or `HOST_ID:MASK`.
impl FromStr for HostAccessEntry {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (host, mask) = match s.split_once(':') {
            Some((host, mask)) => (host.trim(), mask.parse()?),
            None => (s, AccessMask::Production),
        };
        if host.is_empty() {
            return Err(format!("empty host id in '{s}'"));
        }
        Ok(Self::new(host, mask))
    }
}
