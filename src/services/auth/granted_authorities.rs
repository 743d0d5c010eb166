//! Standard claim -> authority mapping.
//!
//! `JwtAuthenticationConverter` takes this as an injected dependency so the
//! scope mapping can be swapped without touching the role extraction.

use std::collections::BTreeSet;

use crate::services::auth::authority::{Authority, SCOPE_PREFIX};
use crate::services::auth::claims::{ClaimError, ClaimValue, VerifiedToken, names, string_seq};

/// Produces authorities from the standard claims of a verified token.
pub trait GrantedAuthoritiesConverter: Send + Sync {
    fn convert(&self, token: &VerifiedToken) -> Result<BTreeSet<Authority>, ClaimError>;
}

const WELL_KNOWN_AUTHORITIES_CLAIM_NAMES: [&str; 2] = [names::SCOPE, names::SCP];

/// Maps `scope` / `scp` to `SCOPE_*` authorities.
///
/// - claim: the configured name, or else the first of `scope`, `scp` present in the token
/// - value: space separated string, or a sequence of strings
#[derive(Debug, Clone)]
pub struct ScopeAuthoritiesConverter {
    authority_prefix: String,
    authorities_claim_name: Option<String>,
    delimiter: String,
}

impl Default for ScopeAuthoritiesConverter {
    fn default() -> Self {
        Self {
            authority_prefix: SCOPE_PREFIX.to_string(),
            authorities_claim_name: None,
            delimiter: " ".to_string(),
        }
    }
}

impl ScopeAuthoritiesConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_authority_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.authority_prefix = prefix.into();
        self
    }

    pub fn with_authorities_claim_name(mut self, claim: impl Into<String>) -> Self {
        self.authorities_claim_name = Some(claim.into());
        self
    }

    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    fn authorities_claim_name<'a>(&'a self, token: &VerifiedToken) -> Option<&'a str> {
        if let Some(name) = self.authorities_claim_name.as_deref() {
            return Some(name);
        }
        WELL_KNOWN_AUTHORITIES_CLAIM_NAMES
            .into_iter()
            .find(|name| token.has_claim(name))
    }

    fn authority_values<'t>(
        &self,
        claim: &str,
        value: &'t ClaimValue,
    ) -> Result<Vec<&'t str>, ClaimError> {
        match value {
            ClaimValue::String(s) => Ok(s
                .split(self.delimiter.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect()),
            other => string_seq(claim, other),
        }
    }
}

impl GrantedAuthoritiesConverter for ScopeAuthoritiesConverter {
    fn convert(&self, token: &VerifiedToken) -> Result<BTreeSet<Authority>, ClaimError> {
        let Some(claim) = self.authorities_claim_name(token) else {
            return Ok(BTreeSet::new());
        };
        let Some(value) = token.claim(claim) else {
            return Ok(BTreeSet::new());
        };

        Ok(self
            .authority_values(claim, value)?
            .into_iter()
            .map(|v| Authority::prefixed(&self.authority_prefix, v))
            .collect())
    }
}
