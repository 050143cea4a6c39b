use serde::Serialize;

use super::{ResourceRecord, ResourceView};
use crate::error::CoreError;

/// A storage pool (`pool` resource type).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Pool {
    record: ResourceRecord,
}

impl Pool {
    pub fn size_total(&self) -> Result<u64, CoreError> {
        self.record.u64_field("sizeTotal")
    }

    pub fn size_used(&self) -> Result<u64, CoreError> {
        self.record.u64_field("sizeUsed")
    }

    pub fn size_free(&self) -> Result<u64, CoreError> {
        self.record.u64_field("sizeFree")
    }

    /// Used share of total capacity, 0–100.
    #[allow(clippy::cast_precision_loss)]
    pub fn percent_used(&self) -> Result<f64, CoreError> {
        let total = self.size_total()?;
        if total == 0 {
            return Ok(0.0);
        }
        Ok(self.size_used()? as f64 / total as f64 * 100.0)
    }

    pub fn into_record(self) -> ResourceRecord {
        self.record
    }
}

impl From<ResourceRecord> for Pool {
    fn from(record: ResourceRecord) -> Self {
        Self { record }
    }
}

impl ResourceView for Pool {
    fn record(&self) -> &ResourceRecord {
        &self.record
    }
}
