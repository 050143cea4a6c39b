// ── Domain model ──
//
// Typed views over raw array records. A view never fails to construct;
// each accessor reports a missing field when it is asked for.

mod health;
mod host;
mod host_access;
mod lun;
mod pool;
mod record;
mod snapshot;

pub use health::{Health, HealthLevel};
pub use host::Host;
pub use host_access::{AccessMask, HostAccessEntry, IdRef};
pub use lun::Lun;
pub use pool::Pool;
pub use record::ResourceRecord;
pub use snapshot::Snapshot;

use serde::Serialize;
use strum::{Display, EnumString};

use crate::error::CoreError;

// ── ResourceKind ────────────────────────────────────────────────────

/// Array resource types this client knows by name.
///
/// Anything else can still be queried by its raw type string; it just
/// comes back as [`Resource::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum ResourceKind {
    #[strum(to_string = "lun")]
    Lun,
    #[strum(to_string = "pool")]
    Pool,
    #[strum(to_string = "host")]
    Host,
    #[strum(to_string = "snap", serialize = "snapshot")]
    Snapshot,
    #[strum(to_string = "storageResource")]
    StorageResource,
    #[strum(to_string = "system")]
    System,
    #[strum(to_string = "basicSystemInfo")]
    BasicSystemInfo,
}

impl ResourceKind {
    /// Fields requested when the caller does not name any.
    pub fn default_fields(self) -> &'static [&'static str] {
        match self {
            Self::Lun => &[
                "id",
                "name",
                "description",
                "health",
                "sizeTotal",
                "sizeAllocated",
                "pool",
                "isThinEnabled",
                "wwn",
                "hostAccess",
            ],
            Self::Pool => &[
                "id",
                "name",
                "description",
                "health",
                "sizeTotal",
                "sizeUsed",
                "sizeFree",
                "raidType",
            ],
            Self::Host => &["id", "name", "description", "health", "type", "osType"],
            Self::Snapshot => &[
                "id",
                "name",
                "description",
                "state",
                "creationTime",
                "expirationTime",
                "storageResource",
                "lun",
            ],
            Self::StorageResource => &["id", "name", "type", "health", "sizeTotal"],
            Self::System => &["id", "name", "model", "serialNumber", "health"],
            Self::BasicSystemInfo => &["id", "name", "model", "softwareVersion", "apiVersion"],
        }
    }
}

// ── ResourceView ────────────────────────────────────────────────────

/// What every typed view offers: the record underneath, its id, its name.
pub trait ResourceView {
    fn record(&self) -> &ResourceRecord;

    fn id(&self) -> &str {
        self.record().id()
    }

    fn name(&self) -> Result<&str, CoreError> {
        self.record().str_field("name")
    }

    fn description(&self) -> Result<&str, CoreError> {
        self.record().str_field("description")
    }

    fn health(&self) -> Result<Health, CoreError> {
        self.record().decode("health")
    }
}

// ── Resource ────────────────────────────────────────────────────────

/// A fetched record, classified by its resource type.
///
/// Serializes as the plain record so output formats see the array's own
/// field names regardless of variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Resource {
    Lun(Lun),
    Pool(Pool),
    Host(Host),
    Snapshot(Snapshot),
    Other(ResourceRecord),
}

impl Resource {
    pub fn from_record(record: ResourceRecord) -> Self {
        match record.resource_type().parse::<ResourceKind>() {
            Ok(ResourceKind::Lun) => Self::Lun(Lun::from(record)),
            Ok(ResourceKind::Pool) => Self::Pool(Pool::from(record)),
            Ok(ResourceKind::Host) => Self::Host(Host::from(record)),
            Ok(ResourceKind::Snapshot) => Self::Snapshot(Snapshot::from(record)),
            _ => Self::Other(record),
        }
    }

    pub fn kind(&self) -> Option<ResourceKind> {
        self.record().resource_type().parse().ok()
    }

    pub fn into_record(self) -> ResourceRecord {
        match self {
            Self::Lun(v) => v.into_record(),
            Self::Pool(v) => v.into_record(),
            Self::Host(v) => v.into_record(),
            Self::Snapshot(v) => v.into_record(),
            Self::Other(r) => r,
        }
    }
}

impl ResourceView for Resource {
    fn record(&self) -> &ResourceRecord {
        match self {
            Self::Lun(v) => v.record(),
            Self::Pool(v) => v.record(),
            Self::Host(v) => v.record(),
            Self::Snapshot(v) => v.record(),
            Self::Other(r) => r,
        }
    }
}

impl ResourceView for ResourceRecord {
    fn record(&self) -> &ResourceRecord {
        self
    }
}
