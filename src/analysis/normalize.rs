//! Lenient deserializers for client-supplied analysis payloads.
//!
//! Clients send numbers and booleans either as JSON scalars or as strings.
//! Normalizing at deserialization time means two payloads that differ only in
//! that representation produce the same typed value, and therefore the same
//! fingerprint.

use std::fmt;

use serde::Deserializer;
use serde::de::{self, Visitor};

/// Default for free-text medical history fields.
pub const NONE_REPORTED: &str = "None reported";

pub fn none_reported() -> String {
    NONE_REPORTED.to_string()
}

/// Accept a JSON number or a numeric string. Non-finite values are rejected.
pub fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    struct NumberVisitor;

    impl Visitor<'_> for NumberVisitor {
        type Value = f64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a number or numeric string")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> {
            Ok(v)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<f64, E> {
            match v.trim().parse::<f64>() {
                Ok(n) if n.is_finite() => Ok(n),
                _ => Err(E::invalid_value(de::Unexpected::Str(v), &self)),
            }
        }
    }

    deserializer.deserialize_any(NumberVisitor)
}

/// Accept a JSON boolean or a string; only the string `"true"` is true.
pub fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    struct BoolVisitor;

    impl Visitor<'_> for BoolVisitor {
        type Value = bool;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a boolean or string")
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
            Ok(v)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<bool, E> {
            Ok(v == "true")
        }
    }

    deserializer.deserialize_any(BoolVisitor)
}

/// Text length in UTF-16 code units, the unit JavaScript clients count in.
pub fn text_length(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Check a provider model identifier: non-empty, ASCII alphanumerics plus `-._`.
pub fn validate_model_id(model: &str) -> Result<(), String> {
    let valid = !model.is_empty()
        && model
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_'));
    if valid {
        Ok(())
    } else {
        Err(format!("invalid modelType {model:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize, Debug)]
    struct Probe {
        #[serde(deserialize_with = "lenient_number")]
        n: f64,
        #[serde(default, deserialize_with = "lenient_bool")]
        b: bool,
    }

    fn probe(value: serde_json::Value) -> Result<Probe, serde_json::Error> {
        serde_json::from_value(value)
    }

    #[test]
    fn numbers_accept_numeric_strings() {
        assert_eq!(probe(json!({"n": 42})).unwrap().n, 42.0);
        assert_eq!(probe(json!({"n": "42"})).unwrap().n, 42.0);
        assert_eq!(probe(json!({"n": " 22.5 "})).unwrap().n, 22.5);
        assert_eq!(probe(json!({"n": -3})).unwrap().n, -3.0);
    }

    #[test]
    fn numbers_reject_garbage() {
        assert!(probe(json!({"n": "tall"})).is_err());
        assert!(probe(json!({"n": ""})).is_err());
        assert!(probe(json!({"n": "NaN"})).is_err());
        assert!(probe(json!({"n": true})).is_err());
        assert!(probe(json!({})).is_err());
    }

    #[test]
    fn bools_accept_strings() {
        assert!(probe(json!({"n": 1, "b": true})).unwrap().b);
        assert!(probe(json!({"n": 1, "b": "true"})).unwrap().b);
        assert!(!probe(json!({"n": 1, "b": "yes"})).unwrap().b);
        assert!(!probe(json!({"n": 1, "b": false})).unwrap().b);
        assert!(!probe(json!({"n": 1})).unwrap().b);
    }

    #[test]
    fn text_length_counts_utf16_units() {
        assert_eq!(text_length("hello"), 5);
        assert_eq!(text_length("café"), 4);
        assert_eq!(text_length("😀"), 2);
    }

    #[test]
    fn model_ids() {
        assert!(validate_model_id("gemini-1.5-flash").is_ok());
        assert!(validate_model_id("models_v2").is_ok());
        assert!(validate_model_id("").is_err());
        assert!(validate_model_id("gemini/../../x").is_err());
        assert!(validate_model_id("gemini flash").is_err());
    }
}
