use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{IdRef, ResourceRecord, ResourceView};
use crate::error::CoreError;

/// A snapshot (`snap` resource type).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Snapshot {
    record: ResourceRecord,
}

impl Snapshot {
    pub fn created(&self) -> Result<DateTime<Utc>, CoreError> {
        self.timestamp("creationTime")
    }

    pub fn expires(&self) -> Result<DateTime<Utc>, CoreError> {
        self.timestamp("expirationTime")
    }

    /// Numeric snapshot state code.
    pub fn state(&self) -> Result<u64, CoreError> {
        self.record.u64_field("state")
    }

    /// Storage resource the snapshot was taken of.
    pub fn storage_resource(&self) -> Result<IdRef, CoreError> {
        self.record.decode("storageResource")
    }

    pub fn into_record(self) -> ResourceRecord {
        self.record
    }

    fn timestamp(&self, field: &str) -> Result<DateTime<Utc>, CoreError> {
        let raw = self.record.str_field(field)?;
        DateTime::parse_from_rfc3339(raw)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| CoreError::InvalidField {
                resource_type: self.record.resource_type().to_owned(),
                id: self.record.id().to_owned(),
                field: field.to_owned(),
                reason: e.to_string(),
            })
    }
}

impl From<ResourceRecord> for Snapshot {
    fn from(record: ResourceRecord) -> Self {
        Self { record }
    }
}

impl ResourceView for Snapshot {
    fn record(&self) -> &ResourceRecord {
        &self.record
    }
}
