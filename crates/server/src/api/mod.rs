pub mod messages;
pub mod ping;
pub mod queues;

use axum::Json;
use serde_json::{json, Value};
use sqslite_queue::BrokerError;

/// Every success payload in SPEC_FULL §6 is `{"success": true, "error": "", ...}`.
/// `extra` supplies the endpoint-specific echoed fields.
pub fn ok(extra: Value) -> Json<Value> {
    let mut body = json!({ "success": true, "error": "" });
    if let (Some(obj), Value::Object(extra_obj)) = (body.as_object_mut(), extra) {
        obj.extend(extra_obj);
    }
    Json(body)
}

/// Validation and store errors are reported as `{"success": false, "error": "..."}`
/// at HTTP 200, per SPEC_FULL §6/§7 — the broker never uses HTTP status codes
/// to carry domain errors.
pub fn err(e: BrokerError) -> Json<Value> {
    Json(json!({ "success": false, "error": e.to_string() }))
}

/// Parses a decimal-string form field into `i64`, defaulting to `0` on a
/// non-numeric value (SPEC_FULL §7 `InvalidArgument`: a bad integer is
/// silently coerced to 0 rather than rejected outright, so a zero
/// `VisibilityTimeout` surfaces as the registry's own validation error).
pub fn parse_i64(raw: &str) -> i64 {
    raw.parse().unwrap_or(0)
}

/// Pulls a required field out of a form whose fields are declared
/// `Option<String>` with `#[serde(default)]`, so a genuinely missing field
/// never makes axum's `Form` extractor reject the request before the
/// handler runs (SPEC_FULL §6: missing-required-field is a `success:false`
/// JSON body at HTTP 200, not a raw 4xx).
pub fn require_field(value: Option<String>, name: &str) -> Result<String, BrokerError> {
    value.ok_or_else(|| BrokerError::InvalidArgument(format!("{name} is required")))
}
