// ── Raw resource records ──
//
// A record is whatever `content` object the array returned, plus the two
// facts every record is guaranteed to have: its resource type and its id.
// Everything else is looked up on demand and may be absent, because the
// array only returns the fields a query asked for.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::CoreError;

/// One resource as returned by the array.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceRecord {
    #[serde(skip)]
    resource_type: String,
    #[serde(skip)]
    id: String,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl ResourceRecord {
    /// Build a record from a response `content` object.
    ///
    /// Fails only when `content` is not an object or carries no usable `id`.
    /// Numeric ids are accepted and kept in their decimal form.
    pub fn from_content(resource_type: &str, content: Value) -> Result<Self, CoreError> {
        let Value::Object(fields) = content else {
            return Err(CoreError::UnexpectedResponse {
                resource_type: resource_type.to_owned(),
                detail: format!("expected an object, got {}", json_kind(&content)),
            });
        };

        let id = match fields.get("id") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => {
                return Err(CoreError::MissingId {
                    resource_type: resource_type.to_owned(),
                    record: Value::Object(fields).to_string(),
                });
            }
        };

        Ok(Self {
            resource_type: resource_type.to_owned(),
            id,
            fields,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The array type name this record was fetched as (`lun`, `pool`, ...).
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Look up a field, walking dotted paths into nested objects
    /// (`pool.id`). Absent and `null` are both `None`.
    pub fn get(&self, field: &str) -> Option<&Value> {
        let mut parts = field.split('.');
        let first = parts.next()?;
        let value = parts.try_fold(self.fields.get(first)?, |value, key| value.get(key))?;
        (!value.is_null()).then_some(value)
    }

    /// A field that must be present.
    pub fn require(&self, field: &str) -> Result<&Value, CoreError> {
        self.get(field).ok_or_else(|| CoreError::FieldMissing {
            resource_type: self.resource_type.clone(),
            id: self.id.clone(),
            field: field.to_owned(),
        })
    }

    pub fn str_field(&self, field: &str) -> Result<&str, CoreError> {
        let value = self.require(field)?;
        value
            .as_str()
            .ok_or_else(|| self.invalid(field, format!("expected a string, got {}", json_kind(value))))
    }

    pub fn u64_field(&self, field: &str) -> Result<u64, CoreError> {
        let value = self.require(field)?;
        value.as_u64().ok_or_else(|| {
            self.invalid(
                field,
                format!("expected an unsigned integer, got {}", json_kind(value)),
            )
        })
    }

    pub fn bool_field(&self, field: &str) -> Result<bool, CoreError> {
        let value = self.require(field)?;
        value
            .as_bool()
            .ok_or_else(|| self.invalid(field, format!("expected a boolean, got {}", json_kind(value))))
    }

    /// Deserialize a structured field (health, host access lists, ...).
    pub fn decode<T: DeserializeOwned>(&self, field: &str) -> Result<T, CoreError> {
        let value = self.require(field)?;
        T::deserialize(value).map_err(|e| self.invalid(field, e.to_string()))
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }

    fn invalid(&self, field: &str, reason: String) -> CoreError {
        CoreError::InvalidField {
            resource_type: self.resource_type.clone(),
            id: self.id.clone(),
            field: field.to_owned(),
            reason,
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
