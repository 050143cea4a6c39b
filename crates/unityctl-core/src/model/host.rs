use serde::Serialize;

use super::{ResourceRecord, ResourceView};
use crate::error::CoreError;

/// A host registered with the array (`host` resource type).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Host {
    record: ResourceRecord,
}

impl Host {
    /// Numeric host type code (manual, auto-managed, subnet, ...).
    pub fn host_type(&self) -> Result<u64, CoreError> {
        self.record.u64_field("type")
    }

    pub fn os_type(&self) -> Result<&str, CoreError> {
        self.record.str_field("osType")
    }

    pub fn into_record(self) -> ResourceRecord {
        self.record
    }
}

impl From<ResourceRecord> for Host {
    fn from(record: ResourceRecord) -> Self {
        Self { record }
    }
}

impl ResourceView for Host {
    fn record(&self) -> &ResourceRecord {
        &self.record
    }
}
