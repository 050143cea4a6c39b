use serde::Serialize;
use strum::Display;
use tracing::{debug, info};
use unityctl_api::{ApiRequest, Session};

use super::storage_resource_path;
use crate::error::{WorkflowError, WorkflowStep};

/// Outcome of a delete the array did not refuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Deleted {
    #[strum(to_string = "deleted")]
    Removed,
    /// Nothing to delete: the array reported the id as not found.
    #[strum(to_string = "already absent")]
    AlreadyAbsent,
}

/// Delete a LUN by id. Safe to repeat.
pub async fn delete_lun(session: &mut Session, lun_id: &str) -> Result<Deleted, WorkflowError> {
    let operation = format!("delete LUN '{lun_id}'");
    if lun_id.trim().is_empty() {
        return Err(WorkflowError::InvalidRequest {
            operation,
            reason: "LUN id must not be empty".into(),
        });
    }

    info!(id = lun_id, "deleting LUN");
    match session
        .request(&ApiRequest::delete(storage_resource_path(lun_id)))
        .await
    {
        Ok(_) => Ok(Deleted::Removed),
        Err(e) if e.is_not_found() => {
            debug!(id = lun_id, "LUN already absent");
            Ok(Deleted::AlreadyAbsent)
        }
        Err(source) => Err(WorkflowError::Step {
            operation,
            step: WorkflowStep::Delete,
            source,
        }),
    }
}
