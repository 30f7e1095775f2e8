//! Canonical JSON for artifacts
//!
//! Artifacts are written with recursively sorted object keys and no
//! whitespace, so identical content always hashes to the same BLAKE3 digest.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::errors::{CoreError, Result};

/// Serialize a value to canonical JSON (sorted keys, no whitespace)
pub fn to_canonical_json<T: Serialize>(value: &T) -> Result<String> {
    let json_value = serde_json::to_value(value)?;
    if contains_null_float(&json_value) {
        return Err(CoreError::Model(
            "refusing to serialize a non-finite number".to_string(),
        ));
    }
    Ok(serde_json::to_string(&canonicalize_value(&json_value))?)
}

fn canonicalize_value(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let sorted: BTreeMap<_, _> = map
                .iter()
                .map(|(k, v)| (k.clone(), canonicalize_value(v)))
                .collect();
            serde_json::Value::Object(sorted.into_iter().collect())
        }
        serde_json::Value::Array(arr) => {
            serde_json::Value::Array(arr.iter().map(canonicalize_value).collect())
        }
        other => other.clone(),
    }
}

// serde_json turns NaN and infinities into `null` inside numeric arrays
fn contains_null_float(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Array(arr) => {
            let has_numbers = arr.iter().any(serde_json::Value::is_number);
            (has_numbers && arr.iter().any(serde_json::Value::is_null))
                || arr.iter().any(contains_null_float)
        }
        serde_json::Value::Object(map) => map.values().any(contains_null_float),
        _ => false,
    }
}

/// BLAKE3 digest of a string, hex encoded
pub fn hash_hex(json: &str) -> String {
    hex::encode(blake3::hash(json.as_bytes()).as_bytes())
}

/// BLAKE3 digest of the canonical JSON form, hex encoded
pub fn hash_canonical_hex<T: Serialize>(value: &T) -> Result<String> {
    Ok(hash_hex(&to_canonical_json(value)?))
}
