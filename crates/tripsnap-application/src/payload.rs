//! Response-shape helpers shared by the stores.
//!
//! Several endpoints answer either a bare value or the same value wrapped in
//! a one-key envelope (`{"bakery": {...}}`, `{"comments": [...]}`).

use serde::de::DeserializeOwned;
use serde_json::Value;
use tripsnap_core::Result;

/// Takes `body[key]` when the body is an object carrying it, else the body itself.
pub(crate) fn unwrap_envelope(body: Value, key: &str) -> Value {
    match body {
        Value::Object(mut map) if map.contains_key(key) => map.remove(key).unwrap_or(Value::Null),
        other => other,
    }
}

/// Deserializes an enveloped or bare value.
pub(crate) fn from_envelope<T: DeserializeOwned>(body: Value, key: &str) -> Result<T> {
    Ok(serde_json::from_value(unwrap_envelope(body, key))?)
}

/// Deserializes an enveloped or bare list; `null` reads as empty.
pub(crate) fn list_from_envelope<T: DeserializeOwned>(body: Value, key: &str) -> Result<Vec<T>> {
    match unwrap_envelope(body, key) {
        Value::Null => Ok(Vec::new()),
        list => Ok(serde_json::from_value(list)?),
    }
}

/// `success: false` with an `error` message, as the form-style endpoints report.
pub(crate) fn reported_failure(body: &Value) -> Option<String> {
    if body.get("success").and_then(Value::as_bool) != Some(false) {
        return None;
    }
    Some(
        body.get("error")
            .or_else(|| body.get("detail"))
            .and_then(Value::as_str)
            .unwrap_or("The request was rejected.")
            .to_string(),
    )
}
