//! Resource access layer between `unityctl-api` and the CLI.
//!
//! This crate owns the domain model and the operations that give an
//! authenticated [`Session`] its meaning:
//!
//! - **[`fetch()`]**: resource-type-generic querying. Builds
//!   `/types/{type}/instances[/{id}]` requests from a [`ResourceQuery`],
//!   passes filters through verbatim, applies exact name matching, and
//!   yields a single-pass [`ResourceSet`]. Absence is an empty result,
//!   never an error.
//!
//! - **Typed views** ([`model`]): [`Lun`], [`Pool`], [`Host`], and
//!   [`Snapshot`] projections over an opaque [`ResourceRecord`], unified by
//!   the [`Resource`] tagged union with a generic fallback for unmodeled
//!   types. Missing fields surface as [`CoreError::FieldMissing`] only when
//!   asked for.
//!
//! - **Workflows** ([`workflow`]): [`create_lun()`] (payload → submit →
//!   confirm) and the idempotent [`delete_lun()`].
//!
//! - **[`array_status()`]**: identity and health of the array itself.

pub mod error;
pub mod model;
pub mod query;
pub mod status;
pub mod workflow;

// ── Primary re-exports ──────────────────────────────────────────────
pub use error::{CoreError, VerificationError, WorkflowError, WorkflowStep};
pub use query::{ResourceQuery, ResourceSet, fetch};
pub use status::{ArrayStatus, array_status};
pub use workflow::{
    CreateLunPayload, CreateLunRequest, Deleted, LunCreated, LunParameters, create_lun, delete_lun,
};

pub use unityctl_api::{Session, TlsMode, TransportConfig};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    AccessMask, Health, HealthLevel, Host, HostAccessEntry, IdRef, Lun, Pool, Resource,
    ResourceKind, ResourceRecord, ResourceView, Snapshot,
};
