use std::fmt;

use jsonwebtoken::{Algorithm, DecodingKey, Validation};

use crate::services::auth::claims::VerifiedToken;

// Errors returned by access-token verification.
#[derive(Debug, thiserror::Error)]
pub enum AccessJwtError {
    #[error("jwt verification failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("invalid verification key: {0}")]
    InvalidKey(String),
}

/// Key material used to check access-token signatures.
#[derive(Clone)]
pub enum VerifierKey {
    /// PEM public key (RSA / PSS / EC / EdDSA, picked by algorithm).
    PublicPem(String),
    /// Shared secret for HS256/384/512.
    Secret(String),
}

impl fmt::Debug for VerifierKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        match self {
            Self::PublicPem(_) => f.write_str("VerifierKey::PublicPem(..)"),
            Self::Secret(_) => f.write_str("VerifierKey::Secret(..)"),
        }
    }
}

pub(crate) fn is_hmac(alg: Algorithm) -> bool {
    matches!(alg, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)
}

fn decoding_key(key: &VerifierKey, alg: Algorithm) -> Result<DecodingKey, AccessJwtError> {
    let key = match (key, alg) {
        (VerifierKey::Secret(secret), alg) if is_hmac(alg) => {
            DecodingKey::from_secret(secret.as_bytes())
        }
        (VerifierKey::Secret(_), alg) => {
            return Err(AccessJwtError::InvalidKey(format!(
                "{alg:?} needs a public key, not a shared secret"
            )));
        }
        (VerifierKey::PublicPem(_), alg) if is_hmac(alg) => {
            return Err(AccessJwtError::InvalidKey(format!(
                "{alg:?} needs a shared secret, not a public key"
            )));
        }
        (VerifierKey::PublicPem(pem), Algorithm::ES256 | Algorithm::ES384) => {
            DecodingKey::from_ec_pem(pem.as_bytes())
                .map_err(|e| AccessJwtError::InvalidKey(format!("invalid ec public key pem: {e}")))?
        }
        (VerifierKey::PublicPem(pem), Algorithm::EdDSA) => DecodingKey::from_ed_pem(pem.as_bytes())
            .map_err(|e| AccessJwtError::InvalidKey(format!("invalid ed25519 public key pem: {e}")))?,
        (VerifierKey::PublicPem(pem), _) => DecodingKey::from_rsa_pem(pem.as_bytes())
            .map_err(|e| AccessJwtError::InvalidKey(format!("invalid rsa public key pem: {e}")))?,
    };

    Ok(key)
}

/// Access-token verifier.
///
/// `jsonwebtoken::Validation` checks:
/// - signature (single configured algorithm)
/// - `exp` / `nbf` with leeway
/// - `iss` and `aud`
/// - presence of `exp`, `iss`
///
/// `sub` is not required here: the principal may come from another claim,
/// so `JwtAuthenticationConverter` decides whether an identity is present.
#[derive(Clone)]
pub struct AccessTokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for AccessTokenVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("AccessTokenVerifier")
            .field("validation", &self.validation)
            .finish()
    }
}

impl AccessTokenVerifier {
    pub fn new(
        key: &VerifierKey,
        algorithm: Algorithm,
        issuer: &str,
        audience: &str,
        leeway_seconds: u64,
    ) -> Result<Self, AccessJwtError> {
        let decoding_key = decoding_key(key, algorithm)?;

        let mut validation = Validation::new(algorithm);
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[audience]);
        validation.set_required_spec_claims(&["exp", "iss"]);
        validation.validate_nbf = true;
        validation.leeway = leeway_seconds;

        Ok(Self {
            decoding_key,
            validation,
        })
    }

    // Verify and decode a JWT access token.
    pub fn verify(&self, token: &str) -> Result<VerifiedToken, AccessJwtError> {
        let data = jsonwebtoken::decode::<VerifiedToken>(token, &self.decoding_key, &self.validation)?;

        Ok(data.claims)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use jsonwebtoken::{EncodingKey, Header};
    use serde_json::Value;

    pub const SECRET: &str = "test-secret-that-is-long-enough-for-hs256";
    pub const ISSUER: &str = "https://id.example.com/realms/demo";
    pub const AUDIENCE: &str = "account";

    /// Standard claims (`iss`, `aud`, `exp`) merged with `extra`.
    pub fn claims(extra: Value) -> Value {
        let mut base = serde_json::json!({
            "iss": ISSUER,
            "aud": AUDIENCE,
            "exp": chrono::Utc::now().timestamp() + 600,
        });
        if let (Value::Object(base), Value::Object(extra)) = (&mut base, extra) {
            base.extend(extra);
        }
        base
    }

    pub fn sign(claims: &Value) -> String {
        jsonwebtoken::encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .expect("sign test token")
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use serde_json::json;

    fn verifier() -> AccessTokenVerifier {
        AccessTokenVerifier::new(
            &VerifierKey::Secret(SECRET.into()),
            Algorithm::HS256,
            ISSUER,
            AUDIENCE,
            0,
        )
        .unwrap()
    }

    #[test]
    fn accepts_valid_token_and_keeps_custom_claims() {
        let token = sign(&claims(json!({
            "sub": "u1",
            "resource_access": {"api": {"roles": ["admin"]}}
        })));

        let verified = verifier().verify(&token).unwrap();
        assert_eq!(verified.subject(), Ok(Some("u1")));
        assert!(verified.has_claim("resource_access"));
    }

    #[test]
    fn rejects_wrong_audience_and_expired() {
        let v = verifier();

        let wrong_aud = sign(&claims(json!({"sub": "u1", "aud": "someone-else"})));
        assert!(v.verify(&wrong_aud).is_err());

        let expired = sign(&claims(json!({
            "sub": "u1",
            "exp": chrono::Utc::now().timestamp() - 3600
        })));
        assert!(v.verify(&expired).is_err());
    }

    #[test]
    fn sub_is_optional_but_exp_and_iss_are_not() {
        let v = verifier();

        let no_sub = sign(&claims(json!({"email": "u1@x.com"})));
        let verified = v.verify(&no_sub).unwrap();
        assert_eq!(verified.subject(), Ok(None));
        assert_eq!(verified.claim_as_str("email"), Ok(Some("u1@x.com")));

        let mut no_iss = claims(json!({"sub": "u1"}));
        no_iss.as_object_mut().unwrap().remove("iss");
        assert!(v.verify(&sign(&no_iss)).is_err());
    }

    #[test]
    fn rejects_bad_signature() {
        let token = sign(&claims(json!({"sub": "u1"})));
        let other = AccessTokenVerifier::new(
            &VerifierKey::Secret("a-different-secret-of-sufficient-len".into()),
            Algorithm::HS256,
            ISSUER,
            AUDIENCE,
            0,
        )
        .unwrap();

        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn key_kind_must_match_algorithm() {
        let err = AccessTokenVerifier::new(
            &VerifierKey::Secret(SECRET.into()),
            Algorithm::RS256,
            ISSUER,
            AUDIENCE,
            0,
        )
        .unwrap_err();
        assert!(matches!(err, AccessJwtError::InvalidKey(_)));

        let err = AccessTokenVerifier::new(
            &VerifierKey::PublicPem("not a pem".into()),
            Algorithm::RS256,
            ISSUER,
            AUDIENCE,
            0,
        )
        .unwrap_err();
        assert!(matches!(err, AccessJwtError::InvalidKey(_)));
    }

    #[test]
    fn debug_hides_key_material() {
        let printed = format!("{:?}", VerifierKey::Secret(SECRET.into()));
        assert!(!printed.contains(SECRET));
    }
}
