//! Resource representation and conversion between the wire format (JSON) and the
//! storage format (BSON).
//!
//! A resource is an open-ended [`Document`]. Only the identifier field is distinguished;
//! every other field is carried through as-is.

use bson::{Bson, Document};
use serde_json::{Map, Number, Value};

use crate::error::{ResourceError, ResourceResult};

/// A stored resource: field name to value, including the `_id` field once persisted.
pub type Resource = Document;

/// Converts a JSON request body into a document.
///
/// # Errors
///
/// Returns [`ResourceError::InvalidPayload`] if `value` is not a JSON object.
pub fn document_from_json(value: Value) -> ResourceResult<Document> {
    match value {
        Value::Object(map) => Ok(object_to_document(map)),
        other => Err(ResourceError::InvalidPayload(format!(
            "expected a JSON object, got {}",
            json_kind(&other),
        ))),
    }
}

/// Converts a stored document into its JSON response form.
///
/// The identifier is rendered as its hex string rather than extended JSON.
pub fn document_to_json(document: Document) -> Value {
    Value::Object(
        document
            .into_iter()
            .map(|(key, value)| (key, bson_to_json(value)))
            .collect::<Map<_, _>>(),
    )
}

/// Converts a single JSON value to BSON.
///
/// Integers that fit in 32 bits become `Int32`, other integers `Int64`, and everything
/// else numeric becomes `Double`.
pub fn json_to_bson(value: Value) -> Bson {
    match value {
        Value::Null => Bson::Null,
        Value::Bool(value) => Bson::Boolean(value),
        Value::Number(number) => number_to_bson(&number),
        Value::String(value) => Bson::String(value),
        Value::Array(items) => Bson::Array(items.into_iter().map(json_to_bson).collect()),
        Value::Object(map) => Bson::Document(object_to_document(map)),
    }
}

/// Converts a single BSON value to JSON.
pub fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::Null | Bson::Undefined => Value::Null,
        Bson::Boolean(value) => Value::Bool(value),
        Bson::Int32(value) => Value::from(value),
        Bson::Int64(value) => Value::from(value),
        // NaN and infinities have no JSON representation
        Bson::Double(value) => Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Bson::String(value) => Value::String(value),
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(value) => Value::from(value.timestamp_millis()),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        Bson::Document(document) => document_to_json(document),
        other => Value::String(other.to_string()),
    }
}

fn object_to_document(map: Map<String, Value>) -> Document {
    map.into_iter()
        .map(|(key, value)| (key, json_to_bson(value)))
        .collect()
}

fn number_to_bson(number: &Number) -> Bson {
    if let Some(value) = number.as_i64() {
        return i32::try_from(value)
            .map(Bson::Int32)
            .unwrap_or(Bson::Int64(value));
    }

    // u64 values above i64::MAX fall through to f64 as well
    Bson::Double(number.as_f64().unwrap_or(f64::NAN))
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

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{doc, oid::ObjectId};
    use serde_json::json;

    #[test]
    fn numbers_keep_their_shape() {
        let document = document_from_json(json!({
            "small": 2,
            "large": 10_000_000_000i64,
            "fraction": 1.5,
            "zero": 0,
        }))
        .unwrap();

        assert_eq!(document.get("small"), Some(&Bson::Int32(2)));
        assert_eq!(document.get("large"), Some(&Bson::Int64(10_000_000_000)));
        assert_eq!(document.get("fraction"), Some(&Bson::Double(1.5)));
        assert_eq!(document.get("zero"), Some(&Bson::Int32(0)));
    }

    #[test]
    fn nested_values_survive_conversion() {
        let body = json!({
            "name": "Pen",
            "tags": ["office", "blue"],
            "dimensions": { "length": 14.2, "unit": "cm" },
            "discontinued": false,
            "supplier": null,
        });

        let document = document_from_json(body.clone()).unwrap();
        assert_eq!(document_to_json(document), body);
    }

    #[test]
    fn rejects_non_object_bodies() {
        for body in [json!([1, 2]), json!("text"), json!(3), json!(null)] {
            assert!(matches!(
                document_from_json(body),
                Err(ResourceError::InvalidPayload(_)),
            ));
        }
    }

    #[test]
    fn object_ids_render_as_hex() {
        let oid = ObjectId::new();
        let value = document_to_json(doc! { "_id": oid, "name": "Pen" });

        assert_eq!(value, json!({ "_id": oid.to_hex(), "name": "Pen" }));
    }

    #[test]
    fn non_finite_doubles_become_null() {
        assert_eq!(bson_to_json(Bson::Double(f64::NAN)), Value::Null);
        assert_eq!(bson_to_json(Bson::Double(f64::INFINITY)), Value::Null);
    }
}
