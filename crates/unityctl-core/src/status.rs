// Identity and health of the array itself.

use serde::Serialize;
use tracing::debug;
use unityctl_api::Session;

use crate::error::CoreError;
use crate::model::{Health, Resource, ResourceKind, ResourceView};
use crate::query::{ResourceQuery, fetch};

/// Summary shown by `unityctl status`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrayStatus {
    pub id: String,
    pub name: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub software_version: Option<String>,
    pub api_version: Option<String>,
    pub health: Option<Health>,
}

/// Read the array's `system` singleton and its `basicSystemInfo`.
///
/// `basicSystemInfo` is best effort: older arrays omit some of its fields,
/// and a failed or empty lookup only blanks the version columns. A
/// cancelled lookup still fails the call.
pub async fn array_status(session: &mut Session) -> Result<ArrayStatus, CoreError> {
    let system = fetch(session, &ResourceQuery::for_kind(ResourceKind::System))
        .await?
        .next()
        .ok_or_else(|| CoreError::UnexpectedResponse {
            resource_type: ResourceKind::System.to_string(),
            detail: "the array returned no system instance".into(),
        })?;

    let info_query = ResourceQuery::for_kind(ResourceKind::BasicSystemInfo);
    let info = match fetch(session, &info_query).await {
        Ok(mut set) => set.next(),
        Err(e) if e.is_cancelled() => return Err(e),
        Err(e) => {
            debug!(error = %e, "basicSystemInfo lookup failed");
            None
        }
    };
    if info.is_none() {
        debug!("no basicSystemInfo instance, versions left blank");
    }

    let sys = Some(&system);
    let info = info.as_ref();

    Ok(ArrayStatus {
        id: system.id().to_owned(),
        name: text(sys, "name").or_else(|| text(info, "name")),
        model: text(sys, "model").or_else(|| text(info, "model")),
        serial_number: text(sys, "serialNumber"),
        software_version: text(info, "softwareVersion"),
        api_version: text(info, "apiVersion"),
        health: system.health().ok(),
    })
}

fn text(resource: Option<&Resource>, field: &str) -> Option<String> {
    resource
        .and_then(|r| r.record().str_field(field).ok())
        .map(str::to_owned)
}
