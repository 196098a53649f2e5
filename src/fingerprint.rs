//! Deterministic cache keys for normalized request payloads.
//!
//! A fingerprint is the SHA-256 digest of `scope || 0x00 || canonical_json(payload)`.
//! Canonical JSON sorts object keys recursively and carries no insignificant
//! whitespace, so the digest depends only on the logical content of the payload.
//!
//! Payloads must already be normalized (numeric strings coerced, defaults
//! applied); this module performs no coercion of its own.

use std::fmt;

use serde_json::Value;
use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 digest identifying a request's semantic content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute the fingerprint of `payload` within `scope`.
///
/// The scope keeps identically shaped payloads from different endpoints apart.
#[must_use]
pub fn fingerprint(scope: &str, payload: &Value) -> Fingerprint {
    let mut hasher = Sha256::new();
    hasher.update(scope.as_bytes());
    hasher.update([0u8]);
    hasher.update(canonical_json(payload).as_bytes());
    Fingerprint(format!("{:x}", hasher.finalize()))
}

/// Serialize a JSON value with recursively sorted object keys.
#[must_use]
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();

            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(key, out);
                out.push(':');
                write_canonical(&map[key], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::String(s) => write_string(s, out),
        // Scalars already have a single compact representation.
        other => out.push_str(&other.to_string()),
    }
}

fn write_string(s: &str, out: &mut String) {
    out.push_str(&Value::String(s.to_string()).to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn canonical_json_sorts_nested_keys() {
        let value = json!({"b": 1, "a": {"z": true, "y": [3, {"d": null, "c": "x"}]}});
        assert_eq!(
            canonical_json(&value),
            r#"{"a":{"y":[3,{"c":"x","d":null}],"z":true},"b":1}"#
        );
    }

    #[test]
    fn canonical_json_escapes_strings() {
        let value = json!({"quote\"key": "line\nbreak"});
        assert_eq!(canonical_json(&value), r#"{"quote\"key":"line\nbreak"}"#);
    }

    #[test]
    fn reordered_payloads_share_a_fingerprint() {
        let a: Value = serde_json::from_str(r#"{"age": 42, "gender": "female", "bmi": 22.5}"#)
            .unwrap();
        let b: Value = serde_json::from_str(r#"{"bmi": 22.5, "age": 42, "gender": "female"}"#)
            .unwrap();
        assert_eq!(fingerprint("health-insights", &a), fingerprint("health-insights", &b));
    }

    #[test]
    fn single_field_change_alters_fingerprint() {
        let a = json!({"age": 42, "gender": "female"});
        let b = json!({"age": 43, "gender": "female"});
        let c = json!({"age": 42, "gender": "male"});
        let fa = fingerprint("health-insights", &a);
        assert_ne!(fa, fingerprint("health-insights", &b));
        assert_ne!(fa, fingerprint("health-insights", &c));
    }

    #[test]
    fn value_type_is_part_of_the_fingerprint() {
        let number = json!({"age": 42});
        let string = json!({"age": "42"});
        assert_ne!(fingerprint("s", &number), fingerprint("s", &string));
    }

    #[test]
    fn scope_separates_identical_payloads() {
        let payload = json!({"entry": "same text"});
        assert_ne!(fingerprint("wellness", &payload), fingerprint("insights", &payload));
    }

    #[test]
    fn fingerprint_is_256_bit_hex() {
        let fp = fingerprint("s", &json!({}));
        assert_eq!(fp.as_str().len(), 64);
        assert!(fp.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(fp.to_string(), fp.as_str());
    }
}
