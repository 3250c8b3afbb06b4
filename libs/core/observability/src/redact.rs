//! Request-body redaction for log metadata.
//!
//! Only top-level keys are inspected. A sensitive key nested inside another
//! object passes through unchanged.

use serde_json::Value;

/// Top-level keys whose values never reach a log line. Matching is exact and case-sensitive.
pub const SENSITIVE_FIELDS: [&str; 5] = ["password", "token", "secret", "apiKey", "accessToken"];

pub const REDACTED: &str = "[REDACTED]";

pub fn is_sensitive(key: &str) -> bool {
    SENSITIVE_FIELDS.contains(&key)
}

/// Shallow copy of `body` with sensitive top-level values replaced by [`REDACTED`].
///
/// Anything other than a JSON object is returned as is.
pub fn redact(body: &Value) -> Value {
    let Value::Object(fields) = body else {
        return body.clone();
    };

    Value::Object(
        fields
            .iter()
            .map(|(key, value)| {
                let value = if is_sensitive(key) {
                    Value::String(REDACTED.to_string())
                } else {
                    value.clone()
                };
                (key.clone(), value)
            })
            .collect(),
    )
}
