// ── Mutation workflows ──
//
// Multi-step changes to the array. Each step's failure is reported with
// the step that failed; completed steps are never rolled back.

mod create_lun;
mod delete_lun;

pub use create_lun::{CreateLunPayload, CreateLunRequest, LunCreated, LunParameters, create_lun};
pub use delete_lun::{Deleted, delete_lun};

/// Action endpoint for LUN creation.
const CREATE_LUN_PATH: &str = "/types/storageResource/action/createLun";

/// LUNs are deleted through their storage resource.
fn storage_resource_path(id: &str) -> String {
    format!("/types/storageResource/instances/{id}")
}
