use serde::{Deserialize, Serialize};
use strum::Display;

/// Health object attached to most array resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    pub value: u32,
    #[serde(default)]
    pub descriptions: Vec<String>,
}

impl Health {
    pub fn level(&self) -> HealthLevel {
        HealthLevel::from(self.value)
    }

    /// First human-readable description, if the array sent one.
    pub fn summary(&self) -> Option<&str> {
        self.descriptions.first().map(String::as_str)
    }
}

/// Severity buckets of the array's numeric health value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display)]
pub enum HealthLevel {
    #[strum(to_string = "unknown")]
    Unknown,
    #[strum(to_string = "ok")]
    Ok,
    #[strum(to_string = "ok_but")]
    OkBut,
    #[strum(to_string = "degraded")]
    Degraded,
    #[strum(to_string = "minor")]
    Minor,
    #[strum(to_string = "major")]
    Major,
    #[strum(to_string = "critical")]
    Critical,
    #[strum(to_string = "non_recoverable")]
    NonRecoverable,
}

impl From<u32> for HealthLevel {
    fn from(value: u32) -> Self {
        match value {
            5 => Self::Ok,
            7 => Self::OkBut,
            10 => Self::Degraded,
            15 => Self::Minor,
            20 => Self::Major,
            25 => Self::Critical,
            30 => Self::NonRecoverable,
            _ => Self::Unknown,
        }
    }
}
