//! Verified token claim set.
//!
//! The decoded JWT payload is turned into `ClaimValue` once, right after
//! signature verification. Everything downstream pattern-matches on these
//! variants instead of poking at untyped JSON.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Registered claim names used by this crate.
pub mod names {
    pub const SUB: &str = "sub";
    pub const SCOPE: &str = "scope";
    pub const SCP: &str = "scp";
    pub const RESOURCE_ACCESS: &str = "resource_access";
    pub const ROLES: &str = "roles";
}

/// One JSON value inside a token payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Seq(Vec<ClaimValue>),
    Map(BTreeMap<String, ClaimValue>),
}

impl ClaimValue {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Seq(_) => "sequence",
            Self::Map(_) => "mapping",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<serde_json::Value> for ClaimValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::Seq(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => {
                Self::Map(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

/// A claim is present but does not have the shape we need.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("claim '{claim}' has unexpected type: expected {expected}, found {found}")]
pub struct ClaimError {
    pub claim: String,
    pub expected: &'static str,
    pub found: &'static str,
}

impl ClaimError {
    pub fn unexpected(claim: impl Into<String>, expected: &'static str, found: &ClaimValue) -> Self {
        Self {
            claim: claim.into(),
            expected,
            found: found.kind(),
        }
    }
}

/// Claim set of a token whose signature, issuer, audience and expiry were
/// already checked by `AccessTokenVerifier`.
///
/// - `null` claims are treated as absent (`claim()` returns `None`).
/// - The claim set is read-only; conversions never mutate it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "serde_json::Map<String, serde_json::Value>")]
pub struct VerifiedToken {
    claims: BTreeMap<String, ClaimValue>,
}

impl From<serde_json::Map<String, serde_json::Value>> for VerifiedToken {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            claims: map
                .into_iter()
                .map(|(k, v)| (k, ClaimValue::from(v)))
                .collect(),
        }
    }
}

/// A payload that is not a JSON object is rejected, never read as "no claims".
impl TryFrom<serde_json::Value> for VerifiedToken {
    type Error = ClaimError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::Object(map) => Ok(Self::from(map)),
            other => Err(ClaimError::unexpected(
                "<payload>",
                "mapping",
                &ClaimValue::from(other),
            )),
        }
    }
}

impl VerifiedToken {
    #[cfg(test)]
    pub(crate) fn from_json(value: serde_json::Value) -> Self {
        Self::try_from(value).expect("test payload must be a JSON object")
    }

    pub fn claim(&self, name: &str) -> Option<&ClaimValue> {
        self.claims.get(name).filter(|v| !v.is_null())
    }

    pub fn has_claim(&self, name: &str) -> bool {
        self.claim(name).is_some()
    }

    /// String claim lookup. Absent => `Ok(None)`, non-string => error.
    pub fn claim_as_str(&self, name: &str) -> Result<Option<&str>, ClaimError> {
        match self.claim(name) {
            None => Ok(None),
            Some(ClaimValue::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(ClaimError::unexpected(name, "string", other)),
        }
    }

    /// Mapping claim lookup. Absent => `Ok(None)`, non-mapping => error.
    pub fn claim_as_map(
        &self,
        name: &str,
    ) -> Result<Option<&BTreeMap<String, ClaimValue>>, ClaimError> {
        match self.claim(name) {
            None => Ok(None),
            Some(ClaimValue::Map(m)) => Ok(Some(m)),
            Some(other) => Err(ClaimError::unexpected(name, "mapping", other)),
        }
    }

    pub fn subject(&self) -> Result<Option<&str>, ClaimError> {
        self.claim_as_str(names::SUB)
    }
}

/// Read `items` as a sequence of strings. `path` is only used for error messages.
pub(crate) fn string_seq<'a>(path: &str, value: &'a ClaimValue) -> Result<Vec<&'a str>, ClaimError> {
    let ClaimValue::Seq(items) = value else {
        return Err(ClaimError::unexpected(path, "sequence of strings", value));
    };

    items
        .iter()
        .map(|item| match item {
            ClaimValue::String(s) => Ok(s.as_str()),
            other => Err(ClaimError::unexpected(path, "string", other)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_claim_is_treated_as_absent() {
        let token = VerifiedToken::from_json(json!({"sub": "u1", "resource_access": null}));

        assert!(token.has_claim("sub"));
        assert!(!token.has_claim("resource_access"));
        assert_eq!(token.claim_as_map("resource_access"), Ok(None));
    }

    #[test]
    fn nested_payload_is_typed_up_front() {
        let token = VerifiedToken::from_json(json!({
            "resource_access": {"api": {"roles": ["a", "b"]}},
            "exp": 1700000000,
            "email_verified": true
        }));

        let ra = token.claim_as_map("resource_access").unwrap().unwrap();
        let api = ra.get("api").unwrap();
        let ClaimValue::Map(api) = api else {
            panic!("expected mapping, got {}", api.kind());
        };
        assert_eq!(
            string_seq("roles", api.get("roles").unwrap()).unwrap(),
            vec!["a", "b"]
        );
        assert_eq!(token.claim("exp").map(ClaimValue::kind), Some("number"));
        assert_eq!(token.claim("email_verified"), Some(&ClaimValue::Bool(true)));
    }

    #[test]
    fn wrong_shape_is_reported_with_claim_name() {
        let token = VerifiedToken::from_json(json!({"sub": 42}));

        let err = token.subject().unwrap_err();
        assert_eq!(err.claim, "sub");
        assert_eq!(err.expected, "string");
        assert_eq!(err.found, "number");
    }

    #[test]
    fn string_seq_rejects_mixed_items() {
        let value = ClaimValue::from(json!(["ok", 1]));
        let err = string_seq("roles", &value).unwrap_err();
        assert_eq!(err.found, "number");

        let value = ClaimValue::from(json!("admin"));
        let err = string_seq("roles", &value).unwrap_err();
        assert_eq!(err.expected, "sequence of strings");
    }

    #[test]
    fn deserializes_from_jwt_payload() {
        let token: VerifiedToken =
            serde_json::from_value(json!({"sub": "u1", "scope": "read"})).unwrap();
        assert_eq!(token.subject(), Ok(Some("u1")));

        assert!(serde_json::from_value::<VerifiedToken>(json!(["not", "an", "object"])).is_err());
    }

    #[test]
    fn non_object_payload_is_an_error() {
        let err = VerifiedToken::try_from(json!(["sub", "u1"])).unwrap_err();
        assert_eq!(err.expected, "mapping");
        assert_eq!(err.found, "sequence");

        assert!(VerifiedToken::try_from(json!("u1")).is_err());
        assert_eq!(
            VerifiedToken::try_from(json!({"sub": "u1"})).unwrap().subject(),
            Ok(Some("u1"))
        );
    }
}
