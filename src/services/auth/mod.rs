pub mod access_jwt;
pub mod authority;
pub mod claims;
pub mod converter;
pub mod factory;
pub mod granted_authorities;

pub use access_jwt::{AccessJwtError, AccessTokenVerifier, VerifierKey};
pub use authority::Authority;
pub use claims::{ClaimError, ClaimValue, VerifiedToken};
pub use converter::{AuthenticationResult, ConvertError, JwtAuthenticationConverter};
pub use factory::{build_converter, build_verifier};
pub use granted_authorities::{GrantedAuthoritiesConverter, ScopeAuthoritiesConverter};
