//! Verified token -> (principal, authorities).
//!
//! Keycloak puts client roles under `resource_access.<client-id>.roles`. The
//! access-control layer looks roles up as `ROLE_<name>`, so every client role
//! is re-emitted with that prefix and merged with the standard scope
//! authorities.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::services::auth::authority::Authority;
use crate::services::auth::claims::{ClaimError, ClaimValue, VerifiedToken, names, string_seq};
use crate::services::auth::granted_authorities::{
    GrantedAuthoritiesConverter, ScopeAuthoritiesConverter,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConvertError {
    #[error("malformed token: {0}")]
    MalformedClaim(#[from] ClaimError),
    #[error("no principal claim present (tried {})", .claims.join(", "))]
    MissingPrincipal { claims: Vec<String> },
}

/// Outcome of a successful conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationResult {
    pub principal: String,
    pub authorities: BTreeSet<Authority>,
}

impl AuthenticationResult {
    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.iter().any(|a| a.as_str() == authority)
    }
}

pub struct JwtAuthenticationConverter {
    resource_id: String,
    principal_attribute: Option<String>,
    granted_authorities: Arc<dyn GrantedAuthoritiesConverter>,
}

impl fmt::Debug for JwtAuthenticationConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtAuthenticationConverter")
            .field("resource_id", &self.resource_id)
            .field("principal_attribute", &self.principal_attribute)
            .finish_non_exhaustive()
    }
}

impl JwtAuthenticationConverter {
    /// `principal_attribute`: `None` or an empty string means "use `sub`".
    pub fn new(resource_id: impl Into<String>, principal_attribute: Option<String>) -> Self {
        Self::with_granted_authorities(
            resource_id,
            principal_attribute,
            Arc::new(ScopeAuthoritiesConverter::default()),
        )
    }

    pub fn with_granted_authorities(
        resource_id: impl Into<String>,
        principal_attribute: Option<String>,
        granted_authorities: Arc<dyn GrantedAuthoritiesConverter>,
    ) -> Self {
        Self {
            resource_id: resource_id.into(),
            principal_attribute: principal_attribute.filter(|s| !s.trim().is_empty()),
            granted_authorities,
        }
    }

    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }

    pub fn convert(&self, token: &VerifiedToken) -> Result<AuthenticationResult, ConvertError> {
        let mut authorities = self.granted_authorities.convert(token)?;
        authorities.extend(self.extract_resource_roles(token)?);

        let principal = self.principal_name(token)?;

        Ok(AuthenticationResult {
            principal,
            authorities,
        })
    }

    /// `resource_access.<resource_id>.roles` as `ROLE_*` authorities.
    /// Missing at any level => empty set.
    pub fn extract_resource_roles(
        &self,
        token: &VerifiedToken,
    ) -> Result<BTreeSet<Authority>, ClaimError> {
        let Some(resource_access) = token.claim_as_map(names::RESOURCE_ACCESS)? else {
            return Ok(BTreeSet::new());
        };

        let resource = match resource_access.get(&self.resource_id) {
            None | Some(ClaimValue::Null) => return Ok(BTreeSet::new()),
            Some(ClaimValue::Map(resource)) => resource,
            Some(other) => {
                return Err(ClaimError::unexpected(self.claim_path(None), "mapping", other));
            }
        };

        let roles = match resource.get(names::ROLES) {
            None | Some(ClaimValue::Null) => return Ok(BTreeSet::new()),
            Some(roles) => string_seq(&self.claim_path(Some(names::ROLES)), roles)?,
        };

        Ok(roles.into_iter().map(Authority::role).collect())
    }

    /// Configured principal attribute when present and non-blank, else `sub`.
    /// Neither present => `MissingPrincipal`.
    pub fn principal_name(&self, token: &VerifiedToken) -> Result<String, ConvertError> {
        let candidates: Vec<&str> = self
            .principal_attribute
            .as_deref()
            .into_iter()
            .chain([names::SUB])
            .collect();

        for claim in &candidates {
            match token.claim_as_str(claim)? {
                Some(value) if !value.trim().is_empty() => return Ok(value.to_string()),
                _ => {}
            }
        }

        Err(ConvertError::MissingPrincipal {
            claims: candidates.into_iter().map(String::from).collect(),
        })
    }

    fn claim_path(&self, leaf: Option<&str>) -> String {
        match leaf {
            Some(leaf) => format!("{}.{}.{}", names::RESOURCE_ACCESS, self.resource_id, leaf),
            None => format!("{}.{}", names::RESOURCE_ACCESS, self.resource_id),
        }
    }
}
