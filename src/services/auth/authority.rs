use std::fmt;

use serde::Serialize;

/// Prefix the access-control layer expects on role authorities.
pub const ROLE_PREFIX: &str = "ROLE_";
/// Default prefix for authorities derived from `scope` / `scp`.
pub const SCOPE_PREFIX: &str = "SCOPE_";

/// A single granted permission string (e.g. `ROLE_admin`, `SCOPE_read`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Authority(String);

impl Authority {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// `admin` -> `ROLE_admin`
    pub fn role(name: &str) -> Self {
        Self::prefixed(ROLE_PREFIX, name)
    }

    pub fn prefixed(prefix: &str, name: &str) -> Self {
        let mut value = String::with_capacity(prefix.len() + name.len());
        value.push_str(prefix);
        value.push_str(name);
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Authority {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
