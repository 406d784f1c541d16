//! Inbound payload model and the outbound dispatch body.
//!
//! The payload has no schema beyond the five [`REQUIRED_FIELDS`]. Every other
//! key is carried through to the dispatch `inputs` untouched, in the order it
//! was received.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::RelayError;
use crate::identifiers::BranchName;

/// Fields every payload must carry, in the order they are checked.
///
/// The first one found missing is the one reported.
pub const REQUIRED_FIELDS: [&str; 5] = [
    "file_no",
    "patient_name_ar",
    "service_name",
    "service_price",
    "policy_expiry",
];

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// A string-keyed JSON object received from the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Payload(Map<String, Value>);

impl Payload {
    /// Parses a request body.
    ///
    /// A body that is valid JSON but not an object is accepted as an empty
    /// payload; it is then rejected by [`Payload::validate`] on the first
    /// required field rather than as invalid JSON.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::InvalidPayload`] if `body` is not valid JSON.
    pub fn parse(body: &[u8]) -> Result<Self, RelayError> {
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(fields)) => Ok(Self(fields)),
            Ok(_) => Ok(Self::default()),
            Err(_) => Err(RelayError::InvalidPayload),
        }
    }

    /// Checks [`REQUIRED_FIELDS`] in order.
    ///
    /// A field is missing when it is absent, `null`, or a string that is empty
    /// after trimming. Numbers, booleans, arrays and objects always count as
    /// present.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::MissingField`] naming the first missing field.
    pub fn validate(&self) -> Result<(), RelayError> {
        match REQUIRED_FIELDS
            .iter()
            .copied()
            .find(|field| is_blank(self.0.get(*field)))
        {
            Some(field) => Err(RelayError::MissingField { field }),
            None => Ok(()),
        }
    }

    /// Field names in received order. Logged instead of values.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for Payload {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

// ---------------------------------------------------------------------------
// DispatchRequest
// ---------------------------------------------------------------------------

/// Body of the `workflow_dispatch` call: `{"ref": ..., "inputs": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchRequest {
    /// Branch the workflow runs on.
    #[serde(rename = "ref")]
    pub git_ref: BranchName,
    /// The validated payload, unchanged.
    pub inputs: Payload,
}

impl DispatchRequest {
    pub fn new(git_ref: BranchName, inputs: Payload) -> Self {
        Self { git_ref, inputs }
    }
}
