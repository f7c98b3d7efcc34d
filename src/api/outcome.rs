use super::RemoteError;
use serde::Serialize;
use serde_json::{Map, Value};

/// What a single successful call produced.
///
/// A fresh outcome is built for every call, so it only ever describes that call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CallOutcome {
    /// The response's `data` field, or the whole response if it was a bare array.
    pub data: Option<Value>,
    /// Every other top-level field of the response.
    pub result: Map<String, Value>,
    /// Set when the API reported a non-fatal error and the call was downgraded to an empty result.
    pub error: Option<RemoteError>,
}

impl CallOutcome {
    /// Splits a response which passed classification.
    pub(crate) fn from_response(response: Value) -> Self {
        match response {
            Value::Object(mut fields) => Self {
                data: fields.remove("data"),
                result: fields,
                error: None,
            },
            other => Self {
                data: Some(other),
                ..Default::default()
            },
        }
    }

    pub(crate) fn suppressed(error: RemoteError) -> Self {
        Self {
            error: Some(error),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_none()
    }

    /// Deserializes `data` into a concrete type.
    pub fn data_as<T: serde::de::DeserializeOwned>(&self) -> Option<serde_json::Result<T>> {
        self.data.clone().map(serde_json::from_value)
    }
}
