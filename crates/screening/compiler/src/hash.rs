//! Canonical content hashing for disease specs.
//!
//! The digest is taken over a canonical JSON encoding — object keys sorted
//! recursively, no insignificant whitespace — so two specs that differ only
//! in serialization key order hash identically, and any field change
//! changes the digest.

use crate::{SpecError, SpecResult};
use screening_types::DiseaseSpec;
use serde_json::Value;
use std::collections::BTreeMap;

/// Hex blake3 digest over the canonical serialization of a spec.
///
/// Used when a tree is compiled or approved, and again on every answer
/// submission to detect out-of-band mutation of the stored spec.
pub fn hash_spec(spec: &DiseaseSpec) -> SpecResult<String> {
    let value =
        serde_json::to_value(spec).map_err(|e| SpecError::Serialization(e.to_string()))?;
    let mut bytes = Vec::new();
    canonical_bytes(&value, &mut bytes);
    Ok(blake3::hash(&bytes).to_hex().to_string())
}

fn canonical_bytes(value: &Value, out: &mut Vec<u8>) {
    match value {
        Value::Null => out.extend_from_slice(b"null"),
        Value::Bool(b) => out.extend_from_slice(if *b { b"true" } else { b"false" }),
        Value::Number(n) => out.extend_from_slice(n.to_string().as_bytes()),
        Value::String(s) => {
            // serde_json's string encoder handles escaping
            out.extend_from_slice(Value::String(s.clone()).to_string().as_bytes());
        }
        Value::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                canonical_bytes(item, out);
            }
            out.push(b']');
        }
        Value::Object(map) => {
            let sorted: BTreeMap<&String, &Value> = map.iter().collect();
            out.push(b'{');
            for (i, (key, item)) in sorted.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                out.extend_from_slice(Value::String((*key).clone()).to_string().as_bytes());
                out.push(b':');
                canonical_bytes(item, out);
            }
            out.push(b'}');
        }
    }
}
