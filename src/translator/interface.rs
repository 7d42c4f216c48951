//! Wire types for the translate endpoint

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One lookup as received from the client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LookupRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub code: String,
    #[serde(default, deserialize_with = "lenient_optional_string")]
    pub branch: Option<String>,
}

impl LookupRequest {
    pub fn new(code: impl Into<String>, branch: Option<String>) -> Self {
        Self {
            code: code.into(),
            branch,
        }
    }
}

/// Outcome of a lookup. Serializes to `{"reply": ...}` or
/// `{"notFound": true, "error"?: ...}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupResult {
    Found { text: String },
    NotFound { reason: Option<String> },
}

impl LookupResult {
    pub fn found(text: impl Into<String>) -> Self {
        Self::Found { text: text.into() }
    }

    pub fn not_found() -> Self {
        Self::NotFound { reason: None }
    }

    pub fn remote_failure(description: impl Into<String>) -> Self {
        Self::NotFound {
            reason: Some(description.into()),
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }
}

impl Serialize for LookupResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Found { text } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("reply", text)?;
                map.end()
            }
            Self::NotFound { reason } => {
                let mut map = serializer.serialize_map(Some(1 + reason.is_some() as usize))?;
                map.serialize_entry("notFound", &true)?;
                if let Some(error) = reason {
                    map.serialize_entry("error", error)?;
                }
                map.end()
            }
        }
    }
}

// Clients sometimes send numeric codes (e.g. NEC 1234) unquoted.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}

fn lenient_optional_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let value = lenient_string(deserializer)?;
    Ok(Some(value).filter(|v| !v.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn found_serializes_reply_only() {
        let value = serde_json::to_value(LookupResult::found("25B – IT Specialist")).unwrap();
        assert_eq!(value, json!({"reply": "25B – IT Specialist"}));
    }

    #[test]
    fn not_found_omits_error_without_reason() {
        let value = serde_json::to_value(LookupResult::not_found()).unwrap();
        assert_eq!(value, json!({"notFound": true}));
    }

    #[test]
    fn remote_failure_carries_error() {
        let value = serde_json::to_value(LookupResult::remote_failure("connection refused")).unwrap();
        assert_eq!(value, json!({"notFound": true, "error": "connection refused"}));
    }

    #[test]
    fn request_accepts_missing_and_numeric_codes() {
        let empty: LookupRequest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty.code, "");
        assert!(empty.branch.is_none());

        let numeric: LookupRequest =
            serde_json::from_value(json!({"code": 2512, "branch": "Navy"})).unwrap();
        assert_eq!(numeric.code, "2512");
        assert_eq!(numeric.branch.as_deref(), Some("Navy"));
    }

    #[test]
    fn request_keeps_code_when_branch_is_not_a_string() {
        let request: LookupRequest =
            serde_json::from_value(json!({"code": "25B", "branch": 1})).unwrap();
        assert_eq!(request.code, "25B");
        assert_eq!(request.branch.as_deref(), Some("1"));

        let request: LookupRequest =
            serde_json::from_value(json!({"code": "25B", "branch": null})).unwrap();
        assert!(request.branch.is_none());
    }
}
