/// Factory: build auth services from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::{AccessJwtError, AccessTokenVerifier, JwtAuthenticationConverter};

pub fn build_verifier(config: &Config) -> Result<Arc<AccessTokenVerifier>, AccessJwtError> {
    let verifier = AccessTokenVerifier::new(
        &config.access_jwt_key,
        config.access_jwt_algorithm,
        &config.auth_issuer,
        &config.auth_audience,
        config.access_token_leeway_seconds,
    )?;

    Ok(Arc::new(verifier))
}

pub fn build_converter(config: &Config) -> Arc<JwtAuthenticationConverter> {
    Arc::new(JwtAuthenticationConverter::new(
        config.converter.resource_id.clone(),
        config.converter.principal_attribute.clone(),
    ))
}
