use serde::Serialize;

use super::{HostAccessEntry, IdRef, ResourceRecord, ResourceView};
use crate::error::CoreError;

/// A block LUN (`lun` resource type).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Lun {
    record: ResourceRecord,
}

impl Lun {
    /// Provisioned size in bytes.
    pub fn size_total(&self) -> Result<u64, CoreError> {
        self.record.u64_field("sizeTotal")
    }

    /// Bytes actually consumed in the pool.
    pub fn size_allocated(&self) -> Result<u64, CoreError> {
        self.record.u64_field("sizeAllocated")
    }

    pub fn pool_id(&self) -> Result<&str, CoreError> {
        self.record.str_field("pool.id")
    }

    pub fn is_thin(&self) -> Result<bool, CoreError> {
        self.record.bool_field("isThinEnabled")
    }

    pub fn wwn(&self) -> Result<&str, CoreError> {
        self.record.str_field("wwn")
    }

    pub fn host_access(&self) -> Result<Vec<HostAccessEntry>, CoreError> {
        self.record.decode("hostAccess")
    }

    /// The storage resource wrapping this LUN; deletion goes through it.
    pub fn storage_resource(&self) -> Result<IdRef, CoreError> {
        self.record.decode("storageResource")
    }

    pub fn into_record(self) -> ResourceRecord {
        self.record
    }
}

impl From<ResourceRecord> for Lun {
    fn from(record: ResourceRecord) -> Self {
        Self { record }
    }
}

impl ResourceView for Lun {
    fn record(&self) -> &ResourceRecord {
        &self.record
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::model::{AccessMask, HealthLevel};

    fn lun(content: serde_json::Value) -> Lun {
        Lun::from(ResourceRecord::from_content("lun", content).unwrap())
    }

    #[test]
    fn reads_full_lun_record() {
        let lun = lun(json!({
            "id": "sv_16",
            "name": "ldom-vol1",
            "health": {"value": 5, "descriptions": ["OK"]},
            "sizeTotal": 1_099_511_627_776_u64,
            "sizeAllocated": 0,
            "pool": {"id": "pool_1"},
            "isThinEnabled": true,
            "wwn": "60:06:01:60:0B:20:3B:00",
            "storageResource": {"id": "sv_16"},
            "hostAccess": [
                {"host": {"id": "Host_2"}, "accessMask": 1},
                {"host": {"id": "Host_3"}, "accessMask": 3}
            ]
        }));

        assert_eq!(lun.id(), "sv_16");
        assert_eq!(lun.name().unwrap(), "ldom-vol1");
        assert_eq!(lun.health().unwrap().level(), HealthLevel::Ok);
        assert_eq!(lun.size_total().unwrap(), 1_099_511_627_776);
        assert_eq!(lun.size_allocated().unwrap(), 0);
        assert_eq!(lun.pool_id().unwrap(), "pool_1");
        assert!(lun.is_thin().unwrap());
        assert_eq!(lun.storage_resource().unwrap().id, "sv_16");

        let access = lun.host_access().unwrap();
        assert_eq!(access.len(), 2);
        assert_eq!(access[1].host_id(), "Host_3");
        assert_eq!(access[1].access_mask, AccessMask::Both);
    }

    #[test]
    fn sparse_record_reports_each_missing_field() {
        let lun = lun(json!({"id": "sv_2"}));
        assert_eq!(lun.id(), "sv_2");
        for err in [
            lun.size_total().unwrap_err(),
            lun.host_access().unwrap_err(),
            lun.pool_id().unwrap_err(),
        ] {
            assert!(matches!(err, CoreError::FieldMissing { ref id, .. } if id == "sv_2"));
        }
    }
}
