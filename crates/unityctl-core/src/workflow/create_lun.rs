use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};
use unityctl_api::{ApiRequest, Session};

use super::CREATE_LUN_PATH;
use crate::error::{VerificationError, WorkflowError, WorkflowStep};
use crate::model::{HostAccessEntry, IdRef, Lun, ResourceKind, ResourceView};
use crate::query::{ResourceQuery, fetch};

/// Everything needed to provision one LUN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateLunRequest {
    pub name: String,
    pub pool_id: String,
    /// Size in bytes.
    pub size: u64,
    pub description: Option<String>,
    pub host_access: Vec<HostAccessEntry>,
    pub thin: bool,
    pub compression: bool,
}

impl CreateLunRequest {
    /// A thin, compressed LUN with no host access.
    pub fn new(name: impl Into<String>, pool_id: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            pool_id: pool_id.into(),
            size,
            description: None,
            host_access: Vec::new(),
            thin: true,
            compression: true,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_host_access(mut self, host_access: Vec<HostAccessEntry>) -> Self {
        self.host_access = host_access;
        self
    }

    #[must_use]
    pub fn thin(mut self, thin: bool) -> Self {
        self.thin = thin;
        self
    }

    #[must_use]
    pub fn compression(mut self, compression: bool) -> Self {
        self.compression = compression;
        self
    }

    /// Local sanity checks. Host and pool ids are left for the array to judge.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("LUN name must not be empty".into());
        }
        if self.pool_id.trim().is_empty() {
            return Err("pool id must not be empty".into());
        }
        if self.size == 0 {
            return Err("size must be greater than zero".into());
        }
        Ok(())
    }

    /// The `createLun` action body.
    pub fn payload(&self) -> CreateLunPayload {
        CreateLunPayload {
            name: self.name.clone(),
            description: self.description.clone(),
            lun_parameters: LunParameters {
                pool: IdRef::new(self.pool_id.clone()),
                is_thin_enabled: self.thin,
                is_compression_enabled: self.compression,
                size: self.size,
                host_access: self.host_access.clone(),
            },
        }
    }
}

/// Wire body of `POST /types/storageResource/action/createLun`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLunPayload {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub lun_parameters: LunParameters,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LunParameters {
    pub pool: IdRef,
    pub is_thin_enabled: bool,
    pub is_compression_enabled: bool,
    pub size: u64,
    pub host_access: Vec<HostAccessEntry>,
}

/// Outcome of a creation the array accepted.
#[derive(Debug)]
pub enum LunCreated {
    /// The new LUN was read back.
    Verified(Lun),
    /// The LUN exists but could not be read back.
    Unverified {
        id: String,
        error: VerificationError,
    },
}

impl LunCreated {
    pub fn id(&self) -> &str {
        match self {
            Self::Verified(lun) => lun.id(),
            Self::Unverified { id, .. } => id,
        }
    }

    pub fn lun(&self) -> Option<&Lun> {
        match self {
            Self::Verified(lun) => Some(lun),
            Self::Unverified { .. } => None,
        }
    }

    pub fn verification_error(&self) -> Option<&VerificationError> {
        match self {
            Self::Verified(_) => None,
            Self::Unverified { error, .. } => Some(error),
        }
    }
}

/// Create a LUN and read it back.
///
/// Submission failures are [`WorkflowError`]s. Once the array has accepted
/// the request the LUN exists, so a failed or empty follow-up lookup is
/// reported as [`LunCreated::Unverified`] rather than as an error.
pub async fn create_lun(
    session: &mut Session,
    request: &CreateLunRequest,
) -> Result<LunCreated, WorkflowError> {
    let operation = format!("create LUN '{}'", request.name);
    request
        .validate()
        .map_err(|reason| WorkflowError::InvalidRequest {
            operation: operation.clone(),
            reason,
        })?;

    let submit = ApiRequest::post(CREATE_LUN_PATH, &request.payload()).map_err(|source| {
        WorkflowError::Step {
            operation: operation.clone(),
            step: WorkflowStep::Submit,
            source,
        }
    })?;

    info!(
        name = %request.name,
        pool = %request.pool_id,
        size = request.size,
        hosts = request.host_access.len(),
        "submitting LUN creation"
    );
    let response = session
        .request(&submit)
        .await
        .map_err(|source| WorkflowError::Step {
            operation: operation.clone(),
            step: WorkflowStep::Submit,
            source,
        })?;

    let Some(id) = response
        .pointer("content.storageResource.id")
        .and_then(Value::as_str)
        .map(str::to_owned)
    else {
        return Err(WorkflowError::UnexpectedResponse {
            operation,
            detail: "no content.storageResource.id in response".into(),
            body: response.body.to_string(),
        });
    };
    debug!(%id, "array accepted LUN creation");

    let lookup = ResourceQuery::for_kind(ResourceKind::Lun).with_id(id.clone());
    let outcome = match fetch(session, &lookup).await {
        Ok(mut found) => match found.next() {
            Some(resource) => LunCreated::Verified(Lun::from(resource.into_record())),
            None => LunCreated::Unverified {
                error: VerificationError::Missing { id: id.clone() },
                id,
            },
        },
        Err(source) => LunCreated::Unverified {
            error: VerificationError::Lookup {
                id: id.clone(),
                source: Box::new(source),
            },
            id,
        },
    };

    if let Some(error) = outcome.verification_error() {
        warn!("{error}");
    }
    Ok(outcome)
}
