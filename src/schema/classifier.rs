//! Response classification.
//!
//! Decides whether a decoded registry response carries a protobuf schema that
//! should be replaced by its compiled descriptor.

use serde_json::{Map, Value};

pub const SCHEMA_TYPE_FIELD: &str = "schemaType";
pub const SCHEMA_FIELD: &str = "schema";
pub const PROTOBUF: &str = "PROTOBUF";

/// Outcome of inspecting a schema envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification<'a> {
    /// Protobuf envelope with a string `schema`; carries the source text.
    Eligible(&'a str),
    NotEligible,
}

/// Classify a decoded response body.
///
/// Positive only for an exact `"schemaType": "PROTOBUF"` with a string
/// `schema`. A `schema` of any other JSON type is not eligible.
pub fn classify(envelope: &Map<String, Value>) -> Classification<'_> {
    let is_protobuf = envelope
        .get(SCHEMA_TYPE_FIELD)
        .and_then(Value::as_str)
        .is_some_and(|t| t == PROTOBUF);
    if !is_protobuf {
        return Classification::NotEligible;
    }

    match envelope.get(SCHEMA_FIELD).and_then(Value::as_str) {
        Some(source) => Classification::Eligible(source),
        None => Classification::NotEligible,
    }
}
