//! Normalization of raw storage records into their public shape.
//!
//! The remote source leaks storage fields: `_id` is the primary key and `__v`
//! a revision counter. Public records carry `id` instead and drop the rest.

use serde_json::{Map, Value};

const STORAGE_ID: &str = "_id";
const STORAGE_FIELDS: &[&str] = &["__v", STORAGE_ID];
const PUBLIC_ID: &str = "id";

/// Field names under which comparison records nest their product list.
const COMPARISON_LIST_FIELDS: &[&str] = &["comparisonList", "comparionsList"];

/// Strips storage fields and exposes the primary key as `id`.
///
/// An `id` already present on the record wins over `_id`.
pub fn normalize_record(raw: Value) -> Result<Value, String> {
    let mut map = into_object(raw)?;
    let storage_id = map.remove(STORAGE_ID);
    strip(&mut map, STORAGE_FIELDS);

    if !map.contains_key(PUBLIC_ID) {
        if let Some(id) = storage_id {
            map.insert(PUBLIC_ID.to_string(), id_to_string(id));
        }
    }

    Ok(Value::Object(map))
}

/// Normalizes a comparison record: storage fields and `createdAt` go away at
/// the top level and every nested product is normalized like a product record.
pub fn normalize_comparison(raw: Value) -> Result<Value, String> {
    let mut map = into_object(raw)?;
    strip(&mut map, STORAGE_FIELDS);
    map.remove("createdAt");

    for field in COMPARISON_LIST_FIELDS {
        match map.remove(*field) {
            Some(Value::Array(items)) => {
                let items = items
                    .into_iter()
                    .map(normalize_record)
                    .collect::<Result<Vec<_>, _>>()?;
                map.insert(field.to_string(), Value::Array(items));
            }
            Some(Value::Null) => {
                map.insert(field.to_string(), Value::Null);
            }
            Some(other) => {
                return Err(format!("expected `{field}` to be an array, got {}", kind(&other)));
            }
            None => {}
        }
    }

    Ok(Value::Object(map))
}

fn into_object(raw: Value) -> Result<Map<String, Value>, String> {
    match raw {
        Value::Object(map) => Ok(map),
        other => Err(format!("expected an object, got {}", kind(&other))),
    }
}

fn strip(map: &mut Map<String, Value>, fields: &[&str]) {
    for field in fields {
        map.remove(*field);
    }
}

fn id_to_string(id: Value) -> Value {
    match id {
        Value::Number(n) => Value::String(n.to_string()),
        // Extended JSON object ids: {"$oid": "..."}
        Value::Object(mut inner) => match inner.remove("$oid") {
            Some(oid @ Value::String(_)) => oid,
            Some(other) => {
                inner.insert("$oid".to_string(), other);
                Value::Object(inner)
            }
            None => Value::Object(inner),
        },
        other => other,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
