// ── Generic resource access ──
//
// One code path for every resource type: build the instances request from
// a `ResourceQuery`, unwrap the array's `entries`/`content` envelope into
// records, and hand them back as a single-pass set.

use serde_json::Value;
use tracing::debug;
use unityctl_api::{ApiRequest, Session};

use crate::error::CoreError;
use crate::model::{Resource, ResourceKind, ResourceRecord};

/// What to fetch.
///
/// `item_id` wins over everything else and turns the call into an exact
/// instance lookup. Otherwise `item_filter` goes to the array verbatim and
/// `item_name` is matched exactly, client-side, against each record's
/// `name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceQuery {
    resource_type: String,
    item_id: Option<String>,
    item_name: Option<String>,
    item_filter: Option<String>,
    fields: Vec<String>,
}

impl ResourceQuery {
    /// Query any resource type by its array name, requesting no extra fields.
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            item_id: None,
            item_name: None,
            item_filter: None,
            fields: Vec::new(),
        }
    }

    /// Query a known type with its default field list.
    pub fn for_kind(kind: ResourceKind) -> Self {
        Self::new(kind.to_string()).with_fields(kind.default_fields().iter().copied())
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.item_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.item_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.item_filter = Some(filter.into());
        self
    }

    /// Replace the requested field list.
    #[must_use]
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn item_id(&self) -> Option<&str> {
        self.item_id.as_deref()
    }

    pub fn item_name(&self) -> Option<&str> {
        self.item_name.as_deref()
    }

    pub fn item_filter(&self) -> Option<&str> {
        self.item_filter.as_deref()
    }

    /// Field list actually sent: the caller's list, plus `name` whenever
    /// a name match has to be made locally.
    pub fn effective_fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = self.fields.iter().map(String::as_str).collect();
        if self.item_id.is_none() && self.item_name.is_some() {
            for required in ["id", "name"] {
                if !fields.contains(&required) {
                    fields.push(required);
                }
            }
        }
        fields
    }

    /// The request this query turns into.
    pub fn to_request(&self) -> ApiRequest {
        let mut request = match &self.item_id {
            Some(id) => ApiRequest::get(format!(
                "/types/{}/instances/{id}",
                self.resource_type
            )),
            None => ApiRequest::get(format!("/types/{}/instances", self.resource_type)),
        }
        .query("compact", "true");

        let fields = self.effective_fields();
        if !fields.is_empty() {
            request = request.query("fields", fields.join(","));
        }
        if self.item_id.is_none() {
            if let Some(filter) = &self.item_filter {
                request = request.query("filter", filter.clone());
            }
        }
        request
    }
}

/// Records returned by one [`fetch`].
///
/// Finite and single-pass: iterating consumes it. Fetch again to start
/// over.
#[derive(Debug)]
pub struct ResourceSet {
    records: std::vec::IntoIter<ResourceRecord>,
    name: Option<String>,
}

impl ResourceSet {
    fn new(records: Vec<ResourceRecord>, name: Option<String>) -> Self {
        Self {
            records: records.into_iter(),
            name,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), None)
    }

    fn matches(&self, record: &ResourceRecord) -> bool {
        self.name.as_deref().is_none_or(|wanted| {
            record
                .get("name")
                .and_then(Value::as_str)
                .is_some_and(|name| name == wanted)
        })
    }
}

impl Iterator for ResourceSet {
    type Item = Resource;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let record = self.records.next()?;
            if self.matches(&record) {
                return Some(Resource::from_record(record));
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.records.len();
        match self.name {
            Some(_) => (0, Some(remaining)),
            None => (remaining, Some(remaining)),
        }
    }
}

/// Run a query against the array.
///
/// An id lookup that comes back 404 is an empty set, not an error. Every
/// other failure from the session is returned unchanged.
pub async fn fetch(session: &mut Session, query: &ResourceQuery) -> Result<ResourceSet, CoreError> {
    let request = query.to_request();
    let response = match session.request(&request).await {
        Ok(response) => response,
        Err(e) if query.item_id.is_some() && e.is_not_found() => {
            debug!(
                resource_type = %query.resource_type,
                id = query.item_id.as_deref().unwrap_or_default(),
                "instance not found"
            );
            return Ok(ResourceSet::empty());
        }
        Err(e) => return Err(e.into()),
    };

    let records = if query.item_id.is_some() {
        vec![instance_record(&query.resource_type, response.body)?]
    } else {
        collection_records(&query.resource_type, response.body)?
    };
    debug!(
        resource_type = %query.resource_type,
        count = records.len(),
        "fetched records"
    );

    let name = if query.item_id.is_none() {
        query.item_name.clone()
    } else {
        None
    };
    Ok(ResourceSet::new(records, name))
}

/// `{"content": {...}}`
fn instance_record(resource_type: &str, mut body: Value) -> Result<ResourceRecord, CoreError> {
    match body.get_mut("content").map(Value::take) {
        Some(content) => ResourceRecord::from_content(resource_type, content),
        None => Err(CoreError::UnexpectedResponse {
            resource_type: resource_type.to_owned(),
            detail: "instance response has no 'content' object".into(),
        }),
    }
}

/// `{"entries": [{"content": {...}}, ...]}`
fn collection_records(resource_type: &str, mut body: Value) -> Result<Vec<ResourceRecord>, CoreError> {
    let Some(Value::Array(entries)) = body.get_mut("entries").map(Value::take) else {
        return Err(CoreError::UnexpectedResponse {
            resource_type: resource_type.to_owned(),
            detail: "collection response has no 'entries' list".into(),
        });
    };

    entries
        .into_iter()
        .map(|mut entry| match entry.get_mut("content").map(Value::take) {
            Some(content) => ResourceRecord::from_content(resource_type, content),
            None => Err(CoreError::UnexpectedResponse {
                resource_type: resource_type.to_owned(),
                detail: "collection entry has no 'content' object".into(),
            }),
        })
        .collect()
}
