//! Deterministic cache-key construction.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Canonical cache key for a parameter set. Equal parameter sets —
/// including ones differing only in key order — produce equal fingerprints.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryFingerprint(pub String);

impl QueryFingerprint {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for QueryFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonicalize `params` by sorting keys ascending, dropping empty/absent
/// values, and rendering each value as stable JSON; concatenate with
/// `prefix` to form the key.
#[must_use]
pub fn create_key(prefix: &str, params: &BTreeMap<String, Value>) -> QueryFingerprint {
    let mut rendered = String::new();
    rendered.push_str(prefix);

    for (key, value) in params {
        if is_empty(value) {
            continue;
        }
        rendered.push('|');
        rendered.push_str(key);
        rendered.push('=');
        rendered.push_str(&canonical_value(value));
    }

    QueryFingerprint(rendered)
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Render a JSON value deterministically — arrays are stringified in their
/// existing order (callers that need order-independence for list-valued
/// parameters, e.g. genre ids, must sort the list before insertion).
fn canonical_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}
